//! 逐文件的测量流程.
//!
//! 每个文件: 去噪 -> z 投影 -> 分割 (一次); 每个荧光珠: 足迹内的轴向曲线 -> 测量.
//! 逐珠测量只读取足迹内的体素, 不为每个荧光珠分配整份体数据.
//! 文件之间不共享任何状态.

mod error;

pub use error::PipelineError;

use std::path::Path;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::config::MeasureConfig;
use crate::filter::median_filter;
use crate::measure::{footprint_profile, measure_resolution, BeadMeasurement};
use crate::segment::{segment_beads, watershed_level};
use crate::source::open_volume;
use crate::stats::{StatsError, Summary};
use crate::{LabelMap2d, LabelMap3d, Projection2d, Volume, VoxelGeometry, AXIS_Z};

cfg_if::cfg_if! {
    if #[cfg(feature = "rayon")] {
        use rayon::iter::{IntoParallelIterator, ParallelIterator};
    }
}

/// 单个文件处理流程的结果.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// 一个文件的全部测量结果, 按标签升序排列.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct FileResult {
    source: String,
    beads: Vec<BeadMeasurement>,
}

impl FileResult {
    /// 直接初始化. `beads` 须按标签升序排列.
    pub fn new(source: impl Into<String>, beads: Vec<BeadMeasurement>) -> Self {
        debug_assert!(beads.windows(2).all(|w| w[0].label < w[1].label));
        Self {
            source: source.into(),
            beads,
        }
    }

    /// 数据来源 (通常是文件路径).
    #[inline]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// 各荧光珠的测量结果.
    #[inline]
    pub fn beads(&self) -> &[BeadMeasurement] {
        &self.beads
    }

    /// 测量到的荧光珠个数.
    #[inline]
    pub fn len(&self) -> usize {
        self.beads.len()
    }

    /// 是否没有测量到任何荧光珠?
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.beads.is_empty()
    }

    /// 按标签顺序排列的分辨率.
    pub fn resolutions(&self) -> Vec<f64> {
        self.beads.iter().map(|b| b.resolution).collect()
    }

    /// 分辨率的平均值和中位数. 没有荧光珠时返回 [`StatsError::Empty`].
    #[inline]
    pub fn summary(&self) -> Result<Summary, StatsError> {
        Summary::of(&self.resolutions())
    }
}

/// 一个文件的中间结果: 去噪后的体数据, 投影, 二维标签图.
///
/// 由 [`ResoZ::prepare`] 一次性构造, 之后只读. 每个荧光珠的测量都只依赖于它和标签值.
#[derive(Debug, Clone)]
pub struct BeadMap {
    denoised: Volume,
    projection: Projection2d,
    level: f64,
    labels: LabelMap2d,
}

impl BeadMap {
    /// 检测到的荧光珠个数 N.
    #[inline]
    pub fn n_beads(&self) -> u32 {
        self.labels.n_labels()
    }

    /// 去噪后的体数据.
    #[inline]
    pub fn denoised(&self) -> &Volume {
        &self.denoised
    }

    /// 去噪后沿 z 的最大强度投影.
    #[inline]
    pub fn projection(&self) -> &Projection2d {
        &self.projection
    }

    /// 分割所用的分水岭水位.
    #[inline]
    pub fn level(&self) -> f64 {
        self.level
    }

    /// 二维荧光珠标签图.
    #[inline]
    pub fn labels(&self) -> &LabelMap2d {
        &self.labels
    }

    /// 沿 z 拉伸后的三维标签图. 每次调用都重新构造, 仅用于导出和检查.
    pub fn extruded(&self) -> LabelMap3d {
        self.labels
            .extrude(self.denoised.len_z(), self.denoised.z_spacing())
    }

    /// 测量标签为 `label` 的荧光珠.
    pub fn measure(&self, label: u32, low_volume_voxels: usize) -> BeadMeasurement {
        let profile = footprint_profile(&self.denoised, &self.labels, label);
        let m = measure_resolution(&profile, label, low_volume_voxels);
        log::trace!(
            "bead {label}: {} voxel(s), {} component(s), resolution {}",
            m.voxels,
            m.components,
            m.resolution
        );
        m
    }

    /// 按标签升序逐个测量所有荧光珠.
    pub fn measure_beads(&self, low_volume_voxels: usize) -> Vec<BeadMeasurement> {
        self.labels
            .labels()
            .map(|l| self.measure(l, low_volume_voxels))
            .collect()
    }

    /// 并行测量所有荧光珠. 结果与 [`BeadMap::measure_beads`] 完全一致.
    #[cfg(feature = "rayon")]
    pub fn par_measure_beads(&self, low_volume_voxels: usize) -> Vec<BeadMeasurement> {
        self.labels
            .labels()
            .into_par_iter()
            .map(|l| self.measure(l, low_volume_voxels))
            .collect()
    }

    /// 测量所有荧光珠, 若可能则并行.
    #[cfg(feature = "rayon")]
    #[inline]
    fn measure_all(&self, low_volume_voxels: usize) -> Vec<BeadMeasurement> {
        self.par_measure_beads(low_volume_voxels)
    }

    /// 测量所有荧光珠.
    #[cfg(not(feature = "rayon"))]
    #[inline]
    fn measure_all(&self, low_volume_voxels: usize) -> Vec<BeadMeasurement> {
        self.measure_beads(low_volume_voxels)
    }
}

/// 轴向分辨率测量流程.
///
/// ```ignore
/// use bead_berry::prelude::*;
///
/// let result = ResoZ::default().run_path("beads.nii.gz")?;
/// let summary = result.summary()?;
/// println!("{}", summary.median);
/// ```
#[derive(Copy, Clone, Debug, Default)]
pub struct ResoZ {
    config: MeasureConfig,
}

impl ResoZ {
    /// 以给定参数构建.
    #[inline]
    pub const fn new(config: MeasureConfig) -> Self {
        Self { config }
    }

    /// 所用参数.
    #[inline]
    pub const fn config(&self) -> &MeasureConfig {
        &self.config
    }

    /// 计算一个文件的所有中间结果 (去噪, 投影, 分割).
    pub fn prepare(&self, volume: &Volume) -> BeadMap {
        let denoised = median_filter(volume, self.config.median_radius());
        let projection = denoised.max_projection(AXIS_Z);
        let level = watershed_level(&projection);
        let labels = segment_beads(&projection, self.config.connectivity());
        BeadMap {
            denoised,
            projection,
            level,
            labels,
        }
    }

    /// 测量 `map` 中所有荧光珠. 没有荧光珠时返回 [`PipelineError::NoBeads`].
    ///
    /// 每个异常标记输出一条 `warn` 日志.
    pub fn measure(&self, source: &str, map: &BeadMap) -> PipelineResult<FileResult> {
        if map.n_beads() == 0 {
            return Err(PipelineError::NoBeads);
        }
        let beads = map.measure_all(self.config.low_volume_voxels());
        for b in beads.iter() {
            if b.flags.low_volume {
                log::warn!(
                    "{source}: bead {}: only {} voxel(s) above threshold",
                    b.label,
                    b.voxels
                );
            }
            if b.flags.multi_component {
                log::warn!(
                    "{source}: bead {}: {} objects in axial profile",
                    b.label,
                    b.components
                );
            }
        }
        Ok(FileResult::new(source, beads))
    }

    /// 对一个已加载的体数据运行完整流程.
    pub fn run(&self, source: &str, volume: &Volume) -> PipelineResult<FileResult> {
        let (z, h, w) = volume.shape();
        log::debug!(
            "{source}: {z}x{h}x{w} voxels, spacing {:?}",
            volume.spacing()
        );
        let map = self.prepare(volume);
        log::debug!(
            "{source}: watershed level {}, {} bead(s)",
            map.level(),
            map.n_beads()
        );
        self.measure(source, &map)
    }

    /// 打开 `path` 处的文件并运行完整流程.
    pub fn run_path<P: AsRef<Path>>(&self, path: P) -> PipelineResult<FileResult> {
        let path = path.as_ref();
        let volume = open_volume(path)?;
        self.run(&path.display().to_string(), &volume)
    }
}
