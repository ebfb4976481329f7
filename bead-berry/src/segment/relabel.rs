//! 按区域大小重标记.

use itertools::Itertools;
use ndarray::{ArrayBase, DataMut, Dimension};

use crate::consts::label::is_background;

/// 将稠密标签 `1..=n_labels` 按区域大小降序重新编号, 大小相同时保持原标签的相对顺序.
///
/// 背景保持不变; 不出现的标签被丢弃. 返回新标签 `1..=N` 对应的大小.
pub fn relabel_by_size<S, D>(labels: &mut ArrayBase<S, D>, n_labels: u32) -> Vec<usize>
where
    S: DataMut<Elem = u32>,
    D: Dimension,
{
    let mut sizes = vec![0usize; n_labels as usize + 1];
    for &l in labels.iter() {
        sizes[l as usize] += 1;
    }

    let order = (1..=n_labels)
        .filter(|&l| sizes[l as usize] > 0)
        .sorted_by(|&a, &b| sizes[b as usize].cmp(&sizes[a as usize]).then(a.cmp(&b)))
        .collect_vec();

    let mut mapping = vec![0u32; n_labels as usize + 1];
    for (new, &old) in order.iter().enumerate() {
        mapping[old as usize] = new as u32 + 1;
    }
    labels.map_inplace(|l| {
        if !is_background(*l) {
            *l = mapping[*l as usize];
        }
    });

    order.into_iter().map(|l| sizes[l as usize]).collect()
}
