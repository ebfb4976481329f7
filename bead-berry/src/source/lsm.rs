//! Zeiss LSM 与普通多页 tiff 读取.
//!
//! lsm 本质上是多页 tiff: 每个全分辨率 IFD 是一张 z 切片, 其间穿插着缩略图 IFD
//! (`NewSubfileType` 最低位为 1). 体素间距保存在第一个 IFD 的私有标签 `CZ_LSMINFO` 中,
//! 单位为米.

use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use ndarray::Array3;
use tiff::decoder::{Decoder, DecodingResult, Limits};
use tiff::tags::Tag;
use tiff::ColorType;

use super::{OpenResult, VolumeSource};
use crate::data::{OpenVolumeError, Volume};
use crate::Idx2d;

/// `CZ_LSMINFO` 私有标签号.
pub(crate) const CZ_LSMINFO: u16 = 34412;

/// `CZ_LSMINFO` 结构体的两个合法魔数.
const LSM_MAGIC: [u32; 2] = [0x0300_494C, 0x0400_494C];

/// `VoxelSizeX` 在 `CZ_LSMINFO` 中的字节偏移, 其后紧跟 Y 与 Z, 均为小端 `f64`.
const VOXEL_SIZE_OFFSET: usize = 40;

/// 米 -> 微米.
const METRE_TO_MICRON: f64 = 1e6;

/// lsm / tiff 格式来源. 间距单位为微米.
///
/// 没有 `CZ_LSMINFO` 的普通 tiff 按各向同性单位间距处理.
#[derive(Copy, Clone, Debug, Default)]
pub struct LsmSource;

impl LsmSource {
    /// 从任意可随机访问的字节流读取.
    pub fn read<R: Read + Seek>(&self, reader: R) -> OpenResult<Volume> {
        self.read_with_spacing(reader).map(|(v, _)| v)
    }

    /// 读取体数据, 并告知间距是否来自文件本身.
    fn read_with_spacing<R: Read + Seek>(&self, reader: R) -> OpenResult<(Volume, bool)> {
        let mut decoder = Decoder::new(reader)?.with_limits(Limits::unlimited());
        let spacing = decoder
            .find_tag(Tag::Unknown(CZ_LSMINFO))?
            .and_then(|v| v.into_u8_vec().ok())
            .and_then(|info| lsm_voxel_size(&info));

        let mut shape: Option<Idx2d> = None;
        let mut n_slices = 0;
        let mut data = Vec::new();
        loop {
            if !is_thumbnail(&mut decoder)? {
                let (w, h) = decoder.dimensions()?;
                let found = (h as usize, w as usize);
                let expected = *shape.get_or_insert(found);
                if found != expected {
                    return Err(OpenVolumeError::SliceShape {
                        index: n_slices,
                        expected,
                        found,
                    });
                }
                read_slice(&mut decoder, &mut data)?;
                n_slices += 1;
            }
            if !decoder.more_images() {
                break;
            }
            decoder.next_image()?;
        }

        let (h, w) = shape.unwrap_or((0, 0));
        let data = Array3::from_shape_vec((n_slices, h, w), data).map_err(|_| {
            OpenVolumeError::SliceShape {
                index: n_slices.saturating_sub(1),
                expected: (h, w),
                found: (h, w),
            }
        })?;
        let volume = Volume::new(data, spacing.unwrap_or([1.0; 3]))?;
        Ok((volume, spacing.is_some()))
    }
}

impl VolumeSource for LsmSource {
    fn open(&self, path: &Path) -> OpenResult<Volume> {
        let (volume, has_spacing) = self.read_with_spacing(BufReader::new(File::open(path)?))?;
        if !has_spacing {
            log::warn!(
                "{}: no usable CZ_LSMINFO, assuming unit spacing",
                path.display()
            );
        }
        Ok(volume)
    }
}

/// 当前 IFD 是否为缩略图?
fn is_thumbnail<R: Read + Seek>(decoder: &mut Decoder<R>) -> OpenResult<bool> {
    let subfile = match decoder.find_tag(Tag::NewSubfileType)? {
        Some(v) => v.into_u32()?,
        None => 0,
    };
    Ok(subfile & 1 != 0)
}

/// 把当前 IFD 的像素追加到 `out` 中. 8 位数据直接扩展为 16 位.
fn read_slice<R: Read + Seek>(decoder: &mut Decoder<R>, out: &mut Vec<u16>) -> OpenResult<()> {
    match decoder.colortype()? {
        ColorType::Gray(8 | 16) => {}
        other => return Err(OpenVolumeError::UnsupportedPixel(other)),
    }
    match decoder.read_image()? {
        DecodingResult::U8(buf) => out.extend(buf.into_iter().map(u16::from)),
        DecodingResult::U16(buf) => out.extend_from_slice(&buf),
        // 只有 8 / 16 位灰度图能走到这里.
        _ => return Err(OpenVolumeError::UnsupportedPixel(decoder.colortype()?)),
    }
    Ok(())
}

/// 从 `CZ_LSMINFO` 中解析 \[z, y, x\] 体素间距 (微米).
///
/// 魔数不符, 长度不足, 或任一间距非有限正数时返回 `None`.
pub(crate) fn lsm_voxel_size(info: &[u8]) -> Option<[f64; 3]> {
    let magic = u32::from_le_bytes(info.get(..4)?.try_into().ok()?);
    if !LSM_MAGIC.contains(&magic) {
        return None;
    }
    let read_f64 = |axis: usize| -> Option<f64> {
        let at = VOXEL_SIZE_OFFSET + axis * 8;
        let v = f64::from_le_bytes(info.get(at..at + 8)?.try_into().ok()?);
        (v.is_finite() && v > 0.0).then_some(v * METRE_TO_MICRON)
    };
    let (x, y, z) = (read_f64(0)?, read_f64(1)?, read_f64(2)?);
    Some([z, y, x])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::VoxelGeometry;
    use std::io::Cursor;
    use tiff::encoder::{colortype, TiffEncoder};

    /// 构造一份 `CZ_LSMINFO`, 间距参数单位为米, 按 x, y, z 给出.
    fn lsm_info([x, y, z]: [f64; 3]) -> Vec<u8> {
        let mut info = vec![0u8; 224];
        info[..4].copy_from_slice(&LSM_MAGIC[1].to_le_bytes());
        for (i, v) in [x, y, z].into_iter().enumerate() {
            let at = VOXEL_SIZE_OFFSET + i * 8;
            info[at..at + 8].copy_from_slice(&v.to_le_bytes());
        }
        info
    }

    /// 把 `f` 写出的所有页编码为一份 tiff.
    fn encode(f: impl FnOnce(&mut TiffEncoder<Cursor<&mut Vec<u8>>>)) -> Vec<u8> {
        let mut bytes = Vec::new();
        {
            let mut tiff = TiffEncoder::new(Cursor::new(&mut bytes)).unwrap();
            f(&mut tiff);
        }
        bytes
    }

    fn close(a: [f64; 3], b: [f64; 3]) -> bool {
        a.iter().zip(b).all(|(x, y)| (x - y).abs() < 1e-9)
    }

    /// 3 张 6x4 的 16 位切片, 每张之后跟一张 2x2 RGB 缩略图.
    fn lsm_bytes() -> Vec<u8> {
        encode(|tiff| {
            for z in 0..3u16 {
                let slice: Vec<u16> = (0..24u16).map(|i| z * 100 + i).collect();
                let mut img = tiff.new_image::<colortype::Gray16>(6, 4).unwrap();
                if z == 0 {
                    let info = lsm_info([0.25e-6, 0.5e-6, 2e-6]);
                    img.encoder()
                        .write_tag(Tag::Unknown(CZ_LSMINFO), &info[..])
                        .unwrap();
                }
                img.write_data(&slice).unwrap();

                let mut thumb = tiff.new_image::<colortype::RGB8>(2, 2).unwrap();
                thumb.encoder().write_tag(Tag::NewSubfileType, 1u32).unwrap();
                thumb.write_data(&[255u8; 12]).unwrap();
            }
        })
    }

    #[test]
    fn test_lsm_slices_and_spacing() {
        let v = LsmSource.read(Cursor::new(lsm_bytes())).unwrap();
        assert_eq!(v.shape(), (3, 4, 6));
        assert!(close(v.spacing(), [2.0, 0.5, 0.25]));
        assert_eq!(v[(0, 0, 0)], 0);
        assert_eq!(v[(1, 0, 5)], 105);
        assert_eq!(v[(2, 3, 5)], 223);
    }

    #[test]
    fn test_plain_tiff_unit_spacing() {
        let bytes = encode(|tiff| {
            for z in 0..2u8 {
                tiff.write_image::<colortype::Gray8>(3, 2, &[z, 1, 2, 3, 4, 200])
                    .unwrap();
            }
        });
        let (v, has_spacing) = LsmSource.read_with_spacing(Cursor::new(bytes)).unwrap();
        assert!(!has_spacing);
        assert_eq!(v.shape(), (2, 2, 3));
        assert_eq!(v.spacing(), [1.0; 3]);
        assert_eq!(v[(1, 0, 0)], 1);
        assert_eq!(v[(0, 1, 2)], 200);
    }

    #[test]
    fn test_mismatched_slices_rejected() {
        let bytes = encode(|tiff| {
            tiff.write_image::<colortype::Gray16>(2, 2, &[0u16; 4]).unwrap();
            tiff.write_image::<colortype::Gray16>(3, 2, &[0u16; 6]).unwrap();
        });
        let e = LsmSource.read(Cursor::new(bytes)).unwrap_err();
        assert!(matches!(
            e,
            OpenVolumeError::SliceShape {
                index: 1,
                expected: (2, 2),
                found: (2, 3)
            }
        ));
    }

    #[test]
    fn test_rgb_slice_rejected() {
        let bytes = encode(|tiff| {
            tiff.write_image::<colortype::RGB8>(2, 2, &[0u8; 12]).unwrap();
        });
        let e = LsmSource.read(Cursor::new(bytes)).unwrap_err();
        assert!(matches!(e, OpenVolumeError::UnsupportedPixel(ColorType::RGB(8))));
    }

    #[test]
    fn test_lsm_voxel_size() {
        let s = lsm_voxel_size(&lsm_info([1e-7, 1e-7, 3e-7])).unwrap();
        assert!(close(s, [0.3, 0.1, 0.1]));

        let mut bad = lsm_info([1e-7, 1e-7, 3e-7]);
        bad[0] = 0;
        assert_eq!(lsm_voxel_size(&bad), None);
        // 二维扫描的 z 间距为 0.
        assert_eq!(lsm_voxel_size(&lsm_info([1e-7, 1e-7, 0.0])), None);
        assert_eq!(lsm_voxel_size(&[0x4c, 0x49]), None);
    }
}
