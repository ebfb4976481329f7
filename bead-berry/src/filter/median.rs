use ndarray::{Array3, ArrayView3, ArrayViewMut2, Axis};

use crate::{Volume, VoxelGeometry};

cfg_if::cfg_if! {
    if #[cfg(feature = "rayon")] {
        use rayon::iter::{IndexedParallelIterator, IntoParallelIterator, ParallelIterator};
    }
}

/// 三维中值滤波, 用于在任何测量之前抑制散粒噪声.
///
/// 邻域为以体素为中心、半径为 `radius` (按 \[z, y, x\] 排列) 的长方体.
/// 越界的邻居取最近的边缘体素值 (即零通量 Neumann 边界). 邻域体素个数恒为奇数,
/// 因此中值唯一确定. `radius` 全为 0 时相当于拷贝.
///
/// 开启 `rayon` feature 时按 z 切片并行, 结果与串行完全一致.
pub fn median_filter(volume: &Volume, radius: [usize; 3]) -> Volume {
    if radius == [0; 3] {
        return volume.clone();
    }
    let src = volume.data();
    let window: usize = radius.iter().map(|r| 2 * r + 1).product();
    let mut out = Array3::<u16>::zeros(volume.shape());

    #[cfg(feature = "rayon")]
    out.axis_iter_mut(Axis(0))
        .into_par_iter()
        .enumerate()
        .for_each_init(
            || Vec::with_capacity(window),
            |buf, (z, slice)| filter_slice(&src, radius, z, slice, buf),
        );

    #[cfg(not(feature = "rayon"))]
    {
        let mut buf = Vec::with_capacity(window);
        for (z, slice) in out.axis_iter_mut(Axis(0)).enumerate() {
            filter_slice(&src, radius, z, slice, &mut buf);
        }
    }

    volume.with_data(out)
}

/// 计算第 `z` 层输出切片. `buf` 为复用的邻域缓冲区.
fn filter_slice(
    src: &ArrayView3<u16>,
    [rz, ry, rx]: [usize; 3],
    z: usize,
    mut out: ArrayViewMut2<u16>,
    buf: &mut Vec<u16>,
) {
    let (nz, ny, nx) = src.dim();
    for ((y, x), pix) in out.indexed_iter_mut() {
        buf.clear();
        for kz in 0..=2 * rz {
            let zz = clamp_offset(z, kz, rz, nz);
            for ky in 0..=2 * ry {
                let yy = clamp_offset(y, ky, ry, ny);
                for kx in 0..=2 * rx {
                    let xx = clamp_offset(x, kx, rx, nx);
                    buf.push(src[(zz, yy, xx)]);
                }
            }
        }
        let mid = buf.len() / 2;
        let (_, median, _) = buf.select_nth_unstable(mid);
        *pix = *median;
    }
}

/// 返回 `center - radius + k`, 并截断到 `[0, len)`.
#[inline]
const fn clamp_offset(center: usize, k: usize, radius: usize, len: usize) -> usize {
    let i = (center + k).saturating_sub(radius);
    if i >= len {
        len - 1
    } else {
        i
    }
}
