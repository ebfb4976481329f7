//! 单个文件处理流程的错误.

use std::fmt;

use crate::stats::StatsError;
use crate::{OpenVolumeError, VolumeError};

/// 处理单个文件时的错误. 出错时跳过该文件, 不影响其它文件.
#[derive(Debug)]
pub enum PipelineError {
    /// 文件无法打开或解析.
    Open(OpenVolumeError),

    /// 数据不构成合法体数据.
    Volume(VolumeError),

    /// 分割后没有任何荧光珠.
    NoBeads,

    /// 汇总统计失败.
    Stats(StatsError),
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open(e) => write!(f, "cannot open volume: {e}"),
            Self::Volume(e) => write!(f, "malformed volume: {e}"),
            Self::NoBeads => write!(f, "no beads measured"),
            Self::Stats(e) => write!(f, "cannot summarize: {e}"),
        }
    }
}

impl std::error::Error for PipelineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Open(e) => Some(e),
            Self::Volume(e) => Some(e),
            Self::NoBeads => None,
            Self::Stats(e) => Some(e),
        }
    }
}

impl From<OpenVolumeError> for PipelineError {
    #[inline]
    fn from(e: OpenVolumeError) -> Self {
        Self::Open(e)
    }
}

impl From<VolumeError> for PipelineError {
    #[inline]
    fn from(e: VolumeError) -> Self {
        Self::Volume(e)
    }
}

impl From<StatsError> for PipelineError {
    /// 没有数据可汇总即没有测到任何荧光珠.
    #[inline]
    fn from(e: StatsError) -> Self {
        match e {
            StatsError::Empty => Self::NoBeads,
            e => Self::Stats(e),
        }
    }
}
