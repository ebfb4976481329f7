//! h-minima 变换: 抑制深度不超过 `h` 的区域极小值.

use binary_heap_plus::BinaryHeap;
use ndarray::{Array2, ArrayView2};

use crate::filter::Connectivity;
use crate::Idx2d;

/// 对 `image` 做 h-minima 变换.
///
/// 即以 `image + h` (在 `u16::MAX` 处截断) 为标记、`image` 为掩膜的腐蚀重建.
/// 输出逐点不小于 `image`; 深度小于等于 `h` 的盆地被填平, 更深的盆地整体抬高 `h`.
/// `h == 0` 时直接返回拷贝.
pub fn h_minima(image: ArrayView2<u16>, h: u16, conn: Connectivity) -> Array2<u16> {
    if h == 0 {
        return image.to_owned();
    }
    let shape = image.dim();
    let mut out = image.mapv(|v| v.saturating_add(h));

    // (值, 入队序号, 位置). 堆顶为值最小者; 同值先入先出.
    let mut heap: BinaryHeap<(u16, u64, Idx2d), _> =
        BinaryHeap::new_by(|a: &(u16, u64, Idx2d), b: &(u16, u64, Idx2d)| {
            (b.0, b.1).cmp(&(a.0, a.1))
        });
    heap.reserve(out.len());
    let mut seq = 0u64;
    for (pos, &v) in out.indexed_iter() {
        heap.push((v, seq, pos));
        seq += 1;
    }

    while let Some((v, _, pos)) = heap.pop() {
        if v != out[pos] {
            continue; // 过期的条目
        }
        for q in conn.neighbours(pos, shape) {
            let lowered = v.max(image[q]);
            if lowered < out[q] {
                out[q] = lowered;
                heap.push((lowered, seq, q));
                seq += 1;
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr2;

    #[test]
    fn test_zero_height_is_identity() {
        let img = arr2(&[[3u16, 1, 3], [3, 3, 3]]);
        assert_eq!(h_minima(img.view(), 0, Connectivity::Four), img);
    }

    #[test]
    fn test_shallow_minimum_filled() {
        // 深度 2 的极小值, h = 5 时被填平. 全局最小区域整体抬高 h.
        let img = arr2(&[[9u16, 9, 9], [9, 7, 9], [9, 9, 9]]);
        let out = h_minima(img.view(), 5, Connectivity::Four);
        assert!(out.iter().all(|&v| v == 12));
    }

    #[test]
    fn test_deep_minimum_raised_by_h() {
        let img = arr2(&[[100u16, 100, 100], [100, 10, 100], [100, 100, 100]]);
        let out = h_minima(img.view(), 5, Connectivity::Four);
        assert_eq!(out[(1, 1)], 15);
        assert_eq!(out[(0, 0)], 100);
    }

    #[test]
    fn test_two_minima_keep_only_deep_one() {
        let img = arr2(&[[50u16, 50, 50, 50, 50], [50, 0, 50, 45, 50], [50, 50, 50, 50, 50]]);
        let out = h_minima(img.view(), 10, Connectivity::Four);
        assert_eq!(out[(1, 1)], 10);
        assert_eq!(out[(1, 3)], 50);
    }

    #[test]
    fn test_saturates_at_max() {
        let img = arr2(&[[u16::MAX, 0]]);
        let out = h_minima(img.view(), 100, Connectivity::Four);
        assert_eq!(out, arr2(&[[u16::MAX, 100]]));
    }
}
