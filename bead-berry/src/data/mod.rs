use std::ops::Index;

use itertools::{Itertools, MinMaxResult};
use ndarray::{Array1, Array2, Array3, ArrayView1, ArrayView2, ArrayView3, Axis};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{Idx2d, Idx3d};

mod error;
pub mod label;
mod save;

pub use error::{OpenVolumeError, VolumeError};
pub use label::{LabelMap2d, LabelMap3d};
pub use save::ImgWrite;

/// 体数据构造结果.
pub type VolumeResult<T> = Result<T, VolumeError>;

/// z 轴 (光轴, 相邻切片方向). 三维数据以 (z, y, x) 存储.
pub const AXIS_Z: Axis = Axis(0);

/// y 轴 (自然图像的垂直方向).
pub const AXIS_Y: Axis = Axis(1);

/// x 轴 (自然图像的水平方向).
pub const AXIS_X: Axis = Axis(2);

/// 三维网格的几何属性及通用操作. 与 [`Volume`] 和 [`LabelMap3d`] 共用.
pub trait VoxelGeometry {
    /// 获取 (z, y, x) 形状.
    fn shape(&self) -> Idx3d;

    /// 获取体素物理间距, 按 \[z, y, x\] 排列.
    fn spacing(&self) -> [f64; 3];

    /// 获取水平切片个数.
    #[inline]
    fn len_z(&self) -> usize {
        self.shape().0
    }

    /// 获取 z 方向 (光轴) 体素间距.
    #[inline]
    fn z_spacing(&self) -> f64 {
        self.spacing()[0]
    }
}

/// 从 `spacing` 中去掉第 `axis` 个分量.
#[inline]
fn drop_spacing<const N: usize, const M: usize>(spacing: [f64; N], axis: Axis) -> [f64; M] {
    debug_assert_eq!(N, M + 1);
    let mut out = [0.0; M];
    for (dst, src) in out
        .iter_mut()
        .zip(spacing.iter().enumerate().filter(|(i, _)| *i != axis.index()))
    {
        *dst = *src.1;
    }
    out
}

/// 数据中的 (最小值, 最大值). 数据为空时返回 `(0, 0)`.
#[inline]
fn intensity_range<'a, I: Iterator<Item = &'a u16>>(it: I) -> (u16, u16) {
    match it.copied().minmax() {
        MinMaxResult::NoElements => (0, 0),
        MinMaxResult::OneElement(v) => (v, v),
        MinMaxResult::MinMax(lo, hi) => (lo, hi),
    }
}

/// 3D 荧光显微体数据, 包括强度体素和物理间距. 强度以 `u16` 保存.
///
/// 构造时保证每一维非空, 且间距均为有限正数. 构造后只读.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Volume {
    data: Array3<u16>,
    spacing: [f64; 3],
}

impl VoxelGeometry for Volume {
    #[inline]
    fn shape(&self) -> Idx3d {
        self.data.dim()
    }

    #[inline]
    fn spacing(&self) -> [f64; 3] {
        self.spacing
    }
}

impl Index<Idx3d> for Volume {
    type Output = u16;

    #[inline]
    fn index(&self, index: Idx3d) -> &Self::Output {
        &self.data[index]
    }
}

impl Volume {
    /// 由 (z, y, x) 排列的强度数据和 \[z, y, x\] 间距构造体数据.
    ///
    /// 任一维长度为 0, 或任一间距不是有限正数时返回 `Err`.
    pub fn new(data: Array3<u16>, spacing: [f64; 3]) -> VolumeResult<Self> {
        let (z, h, w) = data.dim();
        if z == 0 || h == 0 || w == 0 {
            return Err(VolumeError::EmptyDimension((z, h, w)));
        }
        if !spacing.iter().all(|s| s.is_finite() && *s > 0.0) {
            return Err(VolumeError::InvalidSpacing(spacing));
        }
        Ok(Self { data, spacing })
    }

    /// 用同样的几何属性包装新数据. 仅供内部滤波器使用, 调用方保证形状一致.
    #[inline]
    pub(crate) fn with_data(&self, data: Array3<u16>) -> Self {
        debug_assert_eq!(data.dim(), self.data.dim());
        Self {
            data,
            spacing: self.spacing,
        }
    }

    /// 获得数据的一份不可变 shallow copy.
    #[inline]
    pub fn data(&self) -> ArrayView3<'_, u16> {
        self.data.view()
    }

    /// 直接获得底层数据.
    #[inline]
    pub fn into_raw(self) -> Array3<u16> {
        self.data
    }

    /// 获取 (最小强度, 最大强度).
    #[inline]
    pub fn range(&self) -> (u16, u16) {
        intensity_range(self.data.iter())
    }

    /// 沿 `axis` 做最大强度投影. 被投影轴的间距被丢弃, 其余两轴的间距保留.
    ///
    /// 当 `axis` 越界 (不是 0, 1, 2) 时 panic.
    pub fn max_projection(&self, axis: Axis) -> Projection2d {
        let data = self.data.fold_axis(axis, u16::MIN, |acc, v| *acc.max(v));
        Projection2d {
            data,
            spacing: drop_spacing(self.spacing, axis),
        }
    }
}

/// 二维强度图, 由 [`Volume`] 沿某一轴投影得到.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Projection2d {
    data: Array2<u16>,
    spacing: [f64; 2],
}

impl Index<Idx2d> for Projection2d {
    type Output = u16;

    #[inline]
    fn index(&self, index: Idx2d) -> &Self::Output {
        &self.data[index]
    }
}

impl Projection2d {
    /// 直接初始化. 调用方保证数据非空.
    #[cfg(test)]
    pub(crate) fn new(data: Array2<u16>, spacing: [f64; 2]) -> Self {
        Self { data, spacing }
    }

    /// 获得数据的一份不可变 shallow copy.
    #[inline]
    pub fn data(&self) -> ArrayView2<'_, u16> {
        self.data.view()
    }

    /// 图像的分辨率 (高, 宽).
    #[inline]
    pub fn shape(&self) -> Idx2d {
        self.data.dim()
    }

    /// 两个剩余轴的物理间距.
    #[inline]
    pub fn spacing(&self) -> [f64; 2] {
        self.spacing
    }

    /// 获取 (最小强度, 最大强度).
    #[inline]
    pub fn range(&self) -> (u16, u16) {
        intensity_range(self.data.iter())
    }

    /// 反色: `new = max_possible - value`, 使亮斑成为分水岭的汇水盆地.
    pub fn invert(&self, max_possible: u16) -> Self {
        Self {
            data: self.data.mapv(|v| max_possible.saturating_sub(v)),
            spacing: self.spacing,
        }
    }

    /// 沿 `axis` 做最大强度投影, 得到一维强度曲线.
    ///
    /// 当 `axis` 越界 (不是 0, 1) 时 panic.
    pub fn max_projection(&self, axis: Axis) -> Profile1d {
        let data = self.data.fold_axis(axis, u16::MIN, |acc, v| *acc.max(v));
        let [spacing] = drop_spacing(self.spacing, axis);
        Profile1d { data, spacing }
    }

    /// 直接获得底层数据.
    #[inline]
    pub fn into_raw(self) -> Array2<u16> {
        self.data
    }
}

/// 一维强度曲线 (对荧光珠而言, 即沿 z 方向的轴向强度分布).
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Profile1d {
    data: Array1<u16>,
    spacing: f64,
}

impl Profile1d {
    /// 直接初始化.
    #[inline]
    pub(crate) fn new(data: Array1<u16>, spacing: f64) -> Self {
        Self { data, spacing }
    }

    /// 获得数据的一份不可变 shallow copy.
    #[inline]
    pub fn data(&self) -> ArrayView1<'_, u16> {
        self.data.view()
    }

    /// 采样点个数.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// 是否没有采样点.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// 相邻采样点之间的物理间距.
    #[inline]
    pub fn spacing(&self) -> f64 {
        self.spacing
    }

    /// 获取 (最小强度, 最大强度).
    #[inline]
    pub fn range(&self) -> (u16, u16) {
        intensity_range(self.data.iter())
    }
}
