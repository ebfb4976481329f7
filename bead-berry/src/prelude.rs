//! 🔬欢迎光临🔬
//!
//! 涵盖了本 crate 一系列常用的功能.

pub use crate::{Idx2d, Idx3d};

pub use crate::{
    ImgWrite, LabelMap2d, LabelMap3d, Profile1d, Projection2d, Volume, VoxelGeometry, AXIS_X,
    AXIS_Y, AXIS_Z,
};

pub use crate::config::MeasureConfig;
pub use crate::consts::{NB_OBJECTS_TAG, RESO_TAG};
pub use crate::measure::{AnomalyFlags, BeadMeasurement};
pub use crate::pipeline::{BeadMap, FileResult, PipelineError, PipelineResult, ResoZ};
pub use crate::source::{open_volume, volume_loader, AutoSource, VolumeSource};
pub use crate::stats::{StatsError, Summary};
