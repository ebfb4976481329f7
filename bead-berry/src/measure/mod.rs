//! 单个荧光珠的隔离、轴向强度曲线提取和分辨率测量.

use ndarray::{Array1, Axis, Zip};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::consts::intensity::INSIDE;
use crate::segment::relabel_by_size;
use crate::{Idx2d, LabelMap2d, LabelMap3d, Profile1d, Volume, VoxelGeometry, AXIS_Y, AXIS_Z};

/// 测量结果的可信度标记. 仅作提示, 被标记的测量仍参与统计.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct AnomalyFlags {
    /// 主导前景段体素数低于阈值, 分辨率可能被离散化严重影响.
    pub low_volume: bool,

    /// 二值化后的前景段个数不为 1.
    pub multi_component: bool,
}

impl AnomalyFlags {
    /// 是否存在任何异常?
    #[inline]
    pub const fn any(&self) -> bool {
        self.low_volume || self.multi_component
    }
}

/// 单个荧光珠的测量结果.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BeadMeasurement {
    /// 荧光珠标签, `1` 为面积最大者.
    pub label: u32,

    /// 轴向分辨率, 单位与体素间距一致.
    pub resolution: f64,

    /// 主导前景段的体素个数.
    pub voxels: usize,

    /// 前景段个数.
    pub components: usize,

    /// 可信度标记.
    pub flags: AnomalyFlags,
}

/// 选出标签为 `label` 的荧光珠: 足迹之外的体素全部置 0.
///
/// `labels` 须由同一体数据的投影分割后拉伸得到.
pub fn isolate(volume: &Volume, labels: &LabelMap3d, label: u32) -> Volume {
    let mask = labels.select(label);
    let mut data = volume.data().to_owned();
    Zip::from(&mut data).and(&mask).for_each(|v, &m| {
        *v *= u16::from(m == INSIDE);
    });
    volume.with_data(data)
}

/// 沿 y 再沿 x 做最大强度投影, 得到 z 方向的一维强度曲线.
#[inline]
pub fn axial_profile(volume: &Volume) -> Profile1d {
    volume.max_projection(AXIS_Y).max_projection(Axis(1))
}

/// 直接由二维足迹计算标签为 `label` 的荧光珠的轴向强度曲线.
///
/// 结果与 `axial_profile(&isolate(volume, &labels.extrude(..), label))` 完全一致,
/// 但只访问足迹内的体素, 不构造任何三维中间数据.
pub fn footprint_profile(volume: &Volume, labels: &LabelMap2d, label: u32) -> Profile1d {
    let (_, h, w) = volume.shape();
    debug_assert_eq!(labels.shape(), (h, w));

    let footprint: Vec<Idx2d> = labels
        .data()
        .indexed_iter()
        .filter(|&(_, &l)| l == label)
        .map(|(pos, _)| pos)
        .collect();
    // 足迹外的体素在隔离后为 0, 因此最大值不小于 0.
    let data: Array1<u16> = volume
        .data()
        .axis_iter(AXIS_Z)
        .map(|slice| footprint.iter().map(|&p| slice[p]).max().unwrap_or(0))
        .collect();
    Profile1d::new(data, volume.z_spacing())
}

/// 对轴向强度曲线二值化并测量主导前景段的长度.
///
/// 阈值为 `(max - min) / 2`, 不小于阈值者为前景. 连续的前景段按长度降序重标记,
/// 分辨率 = 最长段的体素数 × z 间距.
pub fn measure_resolution(
    profile: &Profile1d,
    label: u32,
    low_volume_voxels: usize,
) -> BeadMeasurement {
    let (lo, hi) = profile.range();
    let threshold = (f64::from(hi) - f64::from(lo)) / 2.0;

    // 一维连通区域即连续的前景段, 按出现顺序编号.
    let mut n = 0u32;
    let mut prev_inside = false;
    let mut runs: Array1<u32> = profile
        .data()
        .iter()
        .map(|&v| {
            let inside = f64::from(v) >= threshold;
            if inside && !prev_inside {
                n += 1;
            }
            prev_inside = inside;
            if inside {
                n
            } else {
                0
            }
        })
        .collect();
    let sizes = relabel_by_size(&mut runs, n);

    let voxels = sizes.first().copied().unwrap_or(0);
    let components = sizes.len();
    BeadMeasurement {
        label,
        resolution: voxels as f64 * profile.spacing(),
        voxels,
        components,
        flags: AnomalyFlags {
            low_volume: voxels < low_volume_voxels,
            multi_component: components != 1,
        },
    }
}
