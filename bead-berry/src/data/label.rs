//! 荧光珠标签图.
//!
//! 标签 `0` 为背景, `1..=N` 为重标记后按面积 (体素数) 降序排列的连通区域.

use std::ops::{Index, RangeInclusive};

use ndarray::{Array2, Array3, ArrayView2, ArrayView3, Zip};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::VoxelGeometry;
use crate::consts::intensity::{INSIDE, OUTSIDE};
use crate::{Idx2d, Idx3d};

/// 二维标签图, 由分水岭分割最大强度投影得到.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct LabelMap2d {
    data: Array2<u32>,
    n_labels: u32,
    spacing: [f64; 2],
}

impl Index<Idx2d> for LabelMap2d {
    type Output = u32;

    #[inline]
    fn index(&self, index: Idx2d) -> &Self::Output {
        &self.data[index]
    }
}

impl LabelMap2d {
    /// 直接初始化. 调用方保证标签稠密, 即恰好使用了 `1..=n_labels`.
    #[inline]
    pub(crate) fn new(data: Array2<u32>, n_labels: u32, spacing: [f64; 2]) -> Self {
        debug_assert!(data.iter().all(|&l| l <= n_labels));
        Self {
            data,
            n_labels,
            spacing,
        }
    }

    /// 获得数据的一份不可变 shallow copy.
    #[inline]
    pub fn data(&self) -> ArrayView2<'_, u32> {
        self.data.view()
    }

    /// 图像的分辨率 (高, 宽).
    #[inline]
    pub fn shape(&self) -> Idx2d {
        self.data.dim()
    }

    /// 像素物理间距 \[y, x\].
    #[inline]
    pub fn spacing(&self) -> [f64; 2] {
        self.spacing
    }

    /// 标签个数 N, 即检测到的荧光珠个数.
    #[inline]
    pub fn n_labels(&self) -> u32 {
        self.n_labels
    }

    /// 是否没有任何前景标签?
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.n_labels == 0
    }

    /// 按升序迭代所有有效标签 `1..=N`.
    #[inline]
    pub fn labels(&self) -> RangeInclusive<u32> {
        1..=self.n_labels
    }

    /// 统计值为 `label` 的像素个数.
    #[inline]
    pub fn area(&self, label: u32) -> usize {
        self.data.iter().filter(|&&l| l == label).count()
    }

    /// 将二维标签沿 z 轴拉伸为三维标签图: 每个 z 切片都是本图的一份拷贝.
    ///
    /// `len_z` 和 `z_spacing` 取自同一文件的体数据. 拉伸结果与之后选择哪个标签无关.
    pub fn extrude(&self, len_z: usize, z_spacing: f64) -> LabelMap3d {
        debug_assert!(len_z > 0);
        debug_assert!(z_spacing.is_finite() && z_spacing > 0.0);

        let (h, w) = self.shape();
        let data = Array3::from_shape_fn((len_z, h, w), |(_, y, x)| self.data[(y, x)]);
        let [sy, sx] = self.spacing;
        LabelMap3d {
            data,
            n_labels: self.n_labels,
            spacing: [z_spacing, sy, sx],
        }
    }
}

/// 三维标签图, 由 [`LabelMap2d::extrude`] 得到.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct LabelMap3d {
    data: Array3<u32>,
    n_labels: u32,
    spacing: [f64; 3],
}

impl VoxelGeometry for LabelMap3d {
    #[inline]
    fn shape(&self) -> Idx3d {
        self.data.dim()
    }

    #[inline]
    fn spacing(&self) -> [f64; 3] {
        self.spacing
    }
}

impl Index<Idx3d> for LabelMap3d {
    type Output = u32;

    #[inline]
    fn index(&self, index: Idx3d) -> &Self::Output {
        &self.data[index]
    }
}

impl LabelMap3d {
    /// 获得数据的一份不可变 shallow copy.
    #[inline]
    pub fn data(&self) -> ArrayView3<'_, u32> {
        self.data.view()
    }

    /// 标签个数 N.
    #[inline]
    pub fn n_labels(&self) -> u32 {
        self.n_labels
    }

    /// 统计值为 `label` 的体素个数.
    #[inline]
    pub fn count(&self, label: u32) -> usize {
        self.data.iter().filter(|&&l| l == label).count()
    }

    /// 二值阈值选择: 标签落在 `[lower, upper]` 内的体素为 `INSIDE`, 其余为 `OUTSIDE`.
    pub fn threshold(&self, lower: u32, upper: u32) -> Array3<u8> {
        let mut mask = Array3::from_elem(self.data.dim(), OUTSIDE);
        Zip::from(&mut mask).and(&self.data).for_each(|m, &l| {
            if (lower..=upper).contains(&l) {
                *m = INSIDE;
            }
        });
        mask
    }

    /// 选出恰好一个标签的二值掩膜 (上下阈值均为 `label`).
    #[inline]
    pub fn select(&self, label: u32) -> Array3<u8> {
        self.threshold(label, label)
    }
}
