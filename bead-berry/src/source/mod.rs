//! 体数据来源: 将文件路径解析为 [`Volume`] (强度 + 体素间距).
//!
//! 目前支持:
//!
//! 1. nifti (`.nii`, `.nii.gz`), 间距取自 header 的 `pixdim`;
//! 2. NumPy (`.npy`, `.npy.gz`), 必须是 (z, y, x) 排列的三维 `u16` 数组.
//!   npy 不携带间距信息, 因此按各向同性单位间距处理;
//! 3. Zeiss LSM 与多页 tiff (`.lsm`, `.tif`, `.tiff`), 每个全分辨率页为一张 z 切片,
//!   间距取自 `CZ_LSMINFO` (微米), 缺失时按单位间距处理.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use flate2::read::GzDecoder;
use ndarray::{Array3, Axis, Ix3};
use ndarray_npy::ReadNpyExt;
use nifti::{IntoNdArray, NiftiObject, ReaderOptions};

use crate::data::{OpenVolumeError, Volume, VolumeError};

mod loader;
mod lsm;

pub use loader::{volume_loader, VolumeLoader};
pub use lsm::LsmSource;

/// 打开体数据的结果.
pub type OpenResult<T> = Result<T, OpenVolumeError>;

/// 能把文件路径解析为体数据的对象.
pub trait VolumeSource {
    /// 打开 `path` 处的体数据.
    fn open(&self, path: &Path) -> OpenResult<Volume>;
}

/// 由文件名推断出的数据格式.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Format {
    /// `.nii` 或 `.nii.gz`.
    Nifti,

    /// `.npy`.
    Npy,

    /// `.npy.gz`.
    NpyGz,

    /// `.lsm`, `.tif` 或 `.tiff`.
    Lsm,
}

impl Format {
    /// 根据扩展名 (不区分大小写) 推断格式. 无法识别时返回 `None`.
    pub fn from_path(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_str()?.to_ascii_lowercase();
        if name.ends_with(".nii") || name.ends_with(".nii.gz") {
            Some(Self::Nifti)
        } else if name.ends_with(".npy.gz") {
            Some(Self::NpyGz)
        } else if name.ends_with(".npy") {
            Some(Self::Npy)
        } else if [".lsm", ".tif", ".tiff"].iter().any(|e| name.ends_with(e)) {
            Some(Self::Lsm)
        } else {
            None
        }
    }
}

/// nifti 格式来源.
#[derive(Copy, Clone, Debug, Default)]
pub struct NiftiSource;

impl VolumeSource for NiftiSource {
    fn open(&self, path: &Path) -> OpenResult<Volume> {
        let obj = ReaderOptions::new().read_file(path)?;
        let pixdim = obj.header().pixdim;

        // [x, y, z, (t, ...)]. 尾部长度为 1 的维度直接去掉.
        let mut data = obj.into_volume().into_ndarray::<u16>()?;
        if data.ndim() < 3 {
            return Err(VolumeError::WrongRank(data.ndim()).into());
        }
        while data.ndim() > 3 {
            let extra = data.len_of(Axis(3));
            if extra != 1 {
                return Err(VolumeError::ExtraDimension(extra).into());
            }
            data = data.index_axis_move(Axis(3), 0);
        }
        let data = data
            .into_dimensionality::<Ix3>()
            .map_err(|_| VolumeError::WrongRank(3))?;

        // [x, y, z] -> [z, y, x].
        let data = data.permuted_axes([2, 1, 0]).as_standard_layout().into_owned();
        let spacing = [pixdim[3] as f64, pixdim[2] as f64, pixdim[1] as f64];
        Ok(Volume::new(data, spacing)?)
    }
}

/// NumPy 格式来源. 体素间距恒为 `[1.0, 1.0, 1.0]`.
#[derive(Copy, Clone, Debug, Default)]
pub struct NpySource {
    /// 文件是否经过 gzip 压缩.
    pub gzip: bool,
}

impl NpySource {
    /// 从任意字节流读取 (z, y, x) 排列的 `u16` 数组.
    pub fn read<R: Read>(&self, reader: R) -> OpenResult<Volume> {
        let data = if self.gzip {
            Array3::<u16>::read_npy(GzDecoder::new(reader))?
        } else {
            Array3::<u16>::read_npy(reader)?
        };
        Ok(Volume::new(data, [1.0; 3])?)
    }
}

impl VolumeSource for NpySource {
    fn open(&self, path: &Path) -> OpenResult<Volume> {
        log::warn!(
            "{}: npy carries no voxel spacing, assuming unit spacing",
            path.display()
        );
        self.read(BufReader::new(File::open(path)?))
    }
}

/// 根据扩展名自动选择格式的来源.
#[derive(Copy, Clone, Debug, Default)]
pub struct AutoSource;

impl VolumeSource for AutoSource {
    fn open(&self, path: &Path) -> OpenResult<Volume> {
        match Format::from_path(path) {
            Some(Format::Nifti) => NiftiSource.open(path),
            Some(Format::Npy) => NpySource { gzip: false }.open(path),
            Some(Format::NpyGz) => NpySource { gzip: true }.open(path),
            Some(Format::Lsm) => LsmSource.open(path),
            None => Err(OpenVolumeError::UnsupportedFormat(path.to_owned())),
        }
    }
}

/// 打开 `path` 处的体数据, 格式由扩展名决定.
#[inline]
pub fn open_volume<P: AsRef<Path>>(path: P) -> OpenResult<Volume> {
    AutoSource.open(path.as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use ndarray_npy::WriteNpyExt;
    use std::io::Write;
    use std::path::PathBuf;

    #[test]
    fn test_format_from_path() {
        let f = |s: &str| Format::from_path(Path::new(s));
        assert_eq!(f("beads.nii"), Some(Format::Nifti));
        assert_eq!(f("/data/Beads.NII.GZ"), Some(Format::Nifti));
        assert_eq!(f("stack.npy"), Some(Format::Npy));
        assert_eq!(f("stack.npy.gz"), Some(Format::NpyGz));
        assert_eq!(f("stack.lsm"), Some(Format::Lsm));
        assert_eq!(f("stack.TIF"), Some(Format::Lsm));
        assert_eq!(f("stack.tiff"), Some(Format::Lsm));
        assert_eq!(f("stack.czi"), None);
        assert_eq!(f("/"), None);
    }

    fn sample() -> Array3<u16> {
        Array3::from_shape_fn((3, 4, 5), |(z, y, x)| (z * 100 + y * 10 + x) as u16)
    }

    #[test]
    fn test_npy_plain_and_gzip() {
        let mut raw = Vec::new();
        sample().write_npy(&mut raw).unwrap();
        let v = NpySource { gzip: false }.read(raw.as_slice()).unwrap();
        assert_eq!(v.data(), sample());
        assert_eq!(crate::VoxelGeometry::spacing(&v), [1.0; 3]);

        let mut e = GzEncoder::new(Vec::new(), Compression::default());
        e.write_all(&raw).unwrap();
        let gz = e.finish().unwrap();
        let v = NpySource { gzip: true }.read(gz.as_slice()).unwrap();
        assert_eq!(v[(2, 3, 4)], 234);
    }

    /// 把 (x, y, z, ...) 排列的数组写成 nifti 临时文件, 再用 [`NiftiSource`] 读回.
    fn nifti_round_trip<D: ndarray::RemoveAxis>(
        name: &str,
        data: &ndarray::Array<u16, D>,
    ) -> OpenResult<Volume> {
        use nifti::writer::WriterOptions;
        use nifti::NiftiHeader;

        let dir = std::env::temp_dir().join(format!("bead-berry-nifti-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(format!("{name}.nii"));
        let header = NiftiHeader {
            pixdim: [1.0, 0.1, 0.2, 0.5, 1.0, 1.0, 1.0, 1.0],
            ..NiftiHeader::default()
        };
        WriterOptions::new(&path)
            .reference_header(&header)
            .write_nifti(data)
            .unwrap();
        let res = open_volume(&path);
        std::fs::remove_file(&path).unwrap();
        res
    }

    fn xyz(x: usize, y: usize, z: usize) -> u16 {
        (z * 100 + y * 10 + x) as u16
    }

    #[test]
    fn test_nifti_axes_and_spacing() {
        let data = ndarray::Array3::from_shape_fn((5, 4, 3), |(x, y, z)| xyz(x, y, z));
        let v = nifti_round_trip("xyz", &data).unwrap();
        assert_eq!(crate::VoxelGeometry::shape(&v), (3, 4, 5));
        let spacing = crate::VoxelGeometry::spacing(&v);
        for (s, e) in spacing.iter().zip([0.5, 0.2, 0.1]) {
            assert!((s - e).abs() < 1e-6, "{spacing:?}");
        }
        assert_eq!(v.data(), sample());
        assert_eq!(v[(2, 3, 4)], 234);
    }

    #[test]
    fn test_nifti_trailing_unit_axis_dropped() {
        let data = ndarray::Array4::from_shape_fn((5, 4, 3, 1), |(x, y, z, _)| xyz(x, y, z));
        let v = nifti_round_trip("xyzt1", &data).unwrap();
        assert_eq!(v.data(), sample());
    }

    #[test]
    fn test_nifti_multi_channel_rejected() {
        let data = ndarray::Array4::<u16>::zeros((5, 4, 3, 2));
        let e = nifti_round_trip("xyzt2", &data).unwrap_err();
        assert!(matches!(
            e,
            OpenVolumeError::Volume(VolumeError::ExtraDimension(2))
        ));
    }

    #[test]
    fn test_nifti_2d_rejected() {
        let data = ndarray::Array2::<u16>::zeros((5, 4));
        let e = nifti_round_trip("xy", &data).unwrap_err();
        assert!(matches!(e, OpenVolumeError::Volume(VolumeError::WrongRank(2))));
    }

    #[test]
    fn test_npy_empty_volume_rejected() {
        let mut raw = Vec::new();
        Array3::<u16>::zeros((0, 2, 2)).write_npy(&mut raw).unwrap();
        let e = NpySource::default().read(raw.as_slice()).unwrap_err();
        assert!(matches!(
            e,
            OpenVolumeError::Volume(VolumeError::EmptyDimension(_))
        ));
    }

    #[test]
    fn test_unsupported_and_missing() {
        let e = open_volume("beads.czi").unwrap_err();
        assert!(matches!(e, OpenVolumeError::UnsupportedFormat(p) if p == PathBuf::from("beads.czi")));

        let e = open_volume("/definitely/not/here.lsm").unwrap_err();
        assert!(matches!(e, OpenVolumeError::Io(_)));

        let e = open_volume("/definitely/not/here.nii").unwrap_err();
        assert!(matches!(e, OpenVolumeError::Nifti(_) | OpenVolumeError::Io(_)));
    }
}
