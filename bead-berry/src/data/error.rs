//! 体数据构造与读取错误.

use std::fmt;
use std::io;
use std::path::PathBuf;

use crate::Idx2d;

/// 构造 [`crate::Volume`] 时的校验错误.
#[derive(Debug, Clone, PartialEq)]
pub enum VolumeError {
    /// 某一维长度为 0. 参数为 (z, y, x) 形状.
    EmptyDimension((usize, usize, usize)),

    /// 体素间距非有限值或不为正. 参数为 \[z, y, x\] 间距.
    InvalidSpacing([f64; 3]),

    /// 数据不是三维的. 参数为实际维数.
    WrongRank(usize),

    /// 数据在 z 之外还有长度大于 1 的维度 (多通道 / 时间序列).
    ExtraDimension(usize),
}

impl fmt::Display for VolumeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyDimension((z, y, x)) => {
                write!(f, "volume has a zero-sized dimension (z={z}, y={y}, x={x})")
            }
            Self::InvalidSpacing([z, y, x]) => {
                write!(f, "invalid voxel spacing (z={z}, y={y}, x={x})")
            }
            Self::WrongRank(r) => write!(f, "expected a 3D volume, got {r} dimension(s)"),
            Self::ExtraDimension(n) => {
                write!(f, "multi-channel volumes are not supported ({n} channels)")
            }
        }
    }
}

impl std::error::Error for VolumeError {}

/// 从文件打开体数据的错误.
#[derive(Debug)]
pub enum OpenVolumeError {
    /// 文件扩展名无法识别.
    UnsupportedFormat(PathBuf),

    /// 底层 I/O 错误.
    Io(io::Error),

    /// nifti 文件解析错误.
    Nifti(nifti::NiftiError),

    /// npy 文件解析错误.
    Npy(ndarray_npy::ReadNpyError),

    /// lsm / tiff 文件解析错误.
    Tiff(tiff::TiffError),

    /// tiff 切片不是 8 位或 16 位单通道灰度图.
    UnsupportedPixel(tiff::ColorType),

    /// 第 `index` 张切片 (从 0 开始, 不计缩略图) 的 (高, 宽) 与第一张不同.
    SliceShape {
        index: usize,
        expected: Idx2d,
        found: Idx2d,
    },

    /// 读出的数据不构成合法体数据.
    Volume(VolumeError),
}

impl fmt::Display for OpenVolumeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedFormat(p) => write!(f, "unsupported file format: {}", p.display()),
            Self::Io(e) => write!(f, "i/o error: {e}"),
            Self::Nifti(e) => write!(f, "cannot read nifti file: {e}"),
            Self::Npy(e) => write!(f, "cannot read npy file: {e}"),
            Self::Tiff(e) => write!(f, "cannot read tiff file: {e}"),
            Self::UnsupportedPixel(c) => write!(f, "unsupported tiff pixel type: {c:?}"),
            Self::SliceShape {
                index,
                expected,
                found,
            } => write!(
                f,
                "slice {index} has shape {found:?}, expected {expected:?}"
            ),
            Self::Volume(e) => write!(f, "malformed volume: {e}"),
        }
    }
}

impl std::error::Error for OpenVolumeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::UnsupportedFormat(_) | Self::UnsupportedPixel(_) | Self::SliceShape { .. } => None,
            Self::Io(e) => Some(e),
            Self::Nifti(e) => Some(e),
            Self::Npy(e) => Some(e),
            Self::Tiff(e) => Some(e),
            Self::Volume(e) => Some(e),
        }
    }
}

impl From<io::Error> for OpenVolumeError {
    #[inline]
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<nifti::NiftiError> for OpenVolumeError {
    #[inline]
    fn from(e: nifti::NiftiError) -> Self {
        Self::Nifti(e)
    }
}

impl From<ndarray_npy::ReadNpyError> for OpenVolumeError {
    #[inline]
    fn from(e: ndarray_npy::ReadNpyError) -> Self {
        Self::Npy(e)
    }
}

impl From<tiff::TiffError> for OpenVolumeError {
    #[inline]
    fn from(e: tiff::TiffError) -> Self {
        Self::Tiff(e)
    }
}

impl From<VolumeError> for OpenVolumeError {
    #[inline]
    fn from(e: VolumeError) -> Self {
        Self::Volume(e)
    }
}
