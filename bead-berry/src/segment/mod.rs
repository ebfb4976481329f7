//! 荧光珠分割: 在反色后的最大强度投影上做分水岭.
//!
//! 流程:
//!
//! 1. 反色 (`65535 - v`), 亮斑成为汇水盆地;
//! 2. h-minima, 高度为未反色投影的 `min + (max - min) / 2` (向下取整, 与整数强度对齐);
//! 3. 区域极小值作为标记, 并从标记出发优先级泛洪. 不生成分水线;
//! 4. 按面积降序重标记, 标签 `1` 为最大的荧光珠.

mod flood;
mod hminima;
mod minima;
mod relabel;

pub use flood::flood_from_markers;
pub use hminima::h_minima;
pub use minima::regional_minima;
pub use relabel::relabel_by_size;

use ndarray::{Array2, ArrayView2};

use crate::consts::intensity::MAX_POSSIBLE;
use crate::filter::Connectivity;
use crate::{LabelMap2d, Projection2d};

/// 分水岭水位: 未反色投影强度范围的中点. 每个文件只计算一次.
#[inline]
pub fn watershed_level(projection: &Projection2d) -> f64 {
    let (lo, hi) = projection.range();
    let (lo, hi) = (f64::from(lo), f64::from(hi));
    lo + (hi - lo) / 2.0
}

/// 形态学分水岭. `level` 为 h-minima 的高度 (向下取整到整数强度).
///
/// 返回 `(标签图, 标签个数)`, 标签按标记的光栅顺序编号.
pub fn watershed(image: ArrayView2<u16>, level: f64, conn: Connectivity) -> (Array2<u32>, u32) {
    let h = level.floor().clamp(0.0, f64::from(u16::MAX)) as u16;
    let suppressed = h_minima(image, h, conn);
    let (markers, n) = regional_minima(suppressed.view(), conn);
    log::trace!("watershed: h = {h}, {n} markers");
    (flood_from_markers(suppressed.view(), &markers, conn), n)
}

/// 将 z 方向最大强度投影分割为按面积降序排列的荧光珠标签图.
pub fn segment_beads(projection: &Projection2d, conn: Connectivity) -> LabelMap2d {
    let level = watershed_level(projection);
    let inverted = projection.invert(MAX_POSSIBLE);
    let (mut labels, n) = watershed(inverted.data(), level, conn);
    let sizes = relabel_by_size(&mut labels, n);
    log::debug!("watershed level {level}: {} beads", sizes.len());
    LabelMap2d::new(labels, sizes.len() as u32, projection.spacing())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::s;

    fn projection(data: Array2<u16>) -> Projection2d {
        Projection2d::new(data, [1.0, 1.0])
    }

    #[test]
    fn test_watershed_level_is_midpoint() {
        let p = projection(ndarray::arr2(&[[10, 20], [30, 40]]));
        assert_eq!(watershed_level(&p), 25.0);
        let p = projection(ndarray::arr2(&[[0, 1]]));
        assert_eq!(watershed_level(&p), 0.5);
    }

    #[test]
    fn test_flat_image_gives_one_bead() {
        let m = segment_beads(&projection(Array2::zeros((6, 6))), Connectivity::Four);
        assert_eq!(m.n_labels(), 1);
        assert!(m.data().iter().all(|&l| l == 1));
    }

    #[test]
    fn test_single_spot() {
        let mut data = Array2::<u16>::zeros((10, 10));
        data[(5, 5)] = 1000;
        let m = segment_beads(&projection(data), Connectivity::Four);
        assert_eq!(m.n_labels(), 1);
        assert_eq!(m[(5, 5)], 1);
    }

    #[test]
    fn test_two_blobs_two_labels_larger_first() {
        let mut data = Array2::<u16>::zeros((12, 20));
        data.slice_mut(s![3..9, 2..8]).fill(1000);
        data.slice_mut(s![5..7, 14..16]).fill(1000);
        let m = segment_beads(&projection(data), Connectivity::Four);
        assert_eq!(m.n_labels(), 2);
        assert_eq!(m[(5, 5)], 1);
        assert_eq!(m[(5, 14)], 2);
        assert!(m.area(1) + m.area(2) == 12 * 20);
    }

    #[test]
    fn test_unit_intensity_spots_stay_apart() {
        // 水位 0.5 向下取整为 0, 不做 h-minima.
        let mut data = Array2::<u16>::zeros((8, 16));
        data.slice_mut(s![2..6, 2..6]).fill(1);
        data.slice_mut(s![3..5, 11..13]).fill(1);
        let m = segment_beads(&projection(data), Connectivity::Four);
        assert_eq!(m.n_labels(), 2);
        assert_eq!(m[(3, 3)], 1);
        assert_eq!(m[(3, 11)], 2);
    }

    #[test]
    fn test_shallow_blob_merged() {
        // 亮度低于水位的斑点不足以形成独立的盆地.
        let mut data = Array2::<u16>::zeros((10, 20));
        data.slice_mut(s![3..7, 2..6]).fill(1000);
        data[(5, 15)] = 100;
        let m = segment_beads(&projection(data), Connectivity::Four);
        assert_eq!(m.n_labels(), 1);
    }
}
