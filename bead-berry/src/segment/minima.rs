//! 区域极小值标记.

use std::collections::VecDeque;

use ndarray::{Array2, ArrayView2};

use crate::consts::label::BACKGROUND;
use crate::filter::Connectivity;

/// 找出 `image` 的所有区域极小值, 并以 `1..=n` 标记.
///
/// 区域极小值是等值连通平台, 其所有邻居都严格更高. 整幅图像为常数时,
/// 它本身算作一个极小值. 标签按平台首个像素的光栅顺序分配.
/// 非极小值像素为 [`BACKGROUND`]. 返回 `(标记图, n)`.
pub fn regional_minima(image: ArrayView2<u16>, conn: Connectivity) -> (Array2<u32>, u32) {
    let shape = image.dim();
    let mut markers = Array2::from_elem(shape, BACKGROUND);
    let mut visited = Array2::from_elem(shape, false);
    let mut queue = VecDeque::new();
    let mut plateau = Vec::new();
    let mut n = 0;

    for (start, &value) in image.indexed_iter() {
        if visited[start] {
            continue;
        }
        visited[start] = true;
        queue.push_back(start);
        plateau.clear();
        let mut is_min = true;

        while let Some(pos) = queue.pop_front() {
            plateau.push(pos);
            for q in conn.neighbours(pos, shape) {
                let v = image[q];
                if v < value {
                    is_min = false;
                } else if v == value && !visited[q] {
                    visited[q] = true;
                    queue.push_back(q);
                }
            }
        }

        if is_min {
            n += 1;
            for &pos in &plateau {
                markers[pos] = n;
            }
        }
    }
    (markers, n)
}
