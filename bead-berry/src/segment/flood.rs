//! 基于标记的优先级泛洪 (Meyer 分水岭), 不生成分水线.

use binary_heap_plus::BinaryHeap;
use ndarray::{Array2, ArrayView2};

use crate::consts::label::is_background;
use crate::filter::Connectivity;
use crate::Idx2d;

/// 从 `markers` 出发按 `image` 的高度泛洪.
///
/// 像素入队时即获得出队像素的标签; 队列按高度升序, 同高度先入先出.
/// 只要每个连通区域内至少有一个标记, 输出中就不存在背景像素.
pub fn flood_from_markers(
    image: ArrayView2<u16>,
    markers: &Array2<u32>,
    conn: Connectivity,
) -> Array2<u32> {
    debug_assert_eq!(image.dim(), markers.dim());
    let shape = image.dim();
    let mut labels = markers.clone();

    let mut heap: BinaryHeap<(u16, u64, Idx2d), _> =
        BinaryHeap::new_by(|a: &(u16, u64, Idx2d), b: &(u16, u64, Idx2d)| {
            (b.0, b.1).cmp(&(a.0, a.1))
        });
    let mut seq = 0u64;

    // 标记区域的边界像素作为初始前沿.
    for (pos, &l) in markers.indexed_iter() {
        if is_background(l) {
            continue;
        }
        for q in conn.neighbours(pos, shape) {
            if is_background(labels[q]) {
                labels[q] = l;
                heap.push((image[q], seq, q));
                seq += 1;
            }
        }
    }

    while let Some((_, _, pos)) = heap.pop() {
        let l = labels[pos];
        for q in conn.neighbours(pos, shape) {
            if is_background(labels[q]) {
                labels[q] = l;
                heap.push((image[q], seq, q));
                seq += 1;
            }
        }
    }
    labels
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr2;

    #[test]
    fn test_two_basins_split_at_ridge() {
        let img = arr2(&[[0u16, 1, 2, 9, 2, 1, 0]]);
        let markers = arr2(&[[1u32, 0, 0, 0, 0, 0, 2]]);
        let out = flood_from_markers(img.view(), &markers, Connectivity::Four);
        assert_eq!(&out.as_slice().unwrap()[..3], &[1, 1, 1]);
        assert_eq!(&out.as_slice().unwrap()[4..], &[2, 2, 2]);
        assert!(!is_background(out[(0, 3)]));
    }

    #[test]
    fn test_every_pixel_labelled() {
        let img = arr2(&[[5u16, 4, 3], [4, 3, 2], [3, 2, 1]]);
        let mut markers = Array2::zeros((3, 3));
        markers[(2, 2)] = 1;
        let out = flood_from_markers(img.view(), &markers, Connectivity::Eight);
        assert!(out.iter().all(|&l| l == 1));
    }

    #[test]
    fn test_low_pass_wins() {
        // 左侧标记通过低谷先到达 (1, 2).
        let img = arr2(&[[0u16, 9, 9, 9, 0], [1, 1, 1, 9, 9]]);
        let markers = arr2(&[[1u32, 0, 0, 0, 2], [0, 0, 0, 0, 0]]);
        let out = flood_from_markers(img.view(), &markers, Connectivity::Four);
        assert_eq!(out[(1, 2)], 1);
        assert_eq!(out[(1, 1)], 1);
        assert_eq!(out[(0, 3)], 2);
    }
}
