//! 投影图与标签图的持久化存储, 便于人工检查分割结果.

use std::path::Path;

use image::{ImageBuffer, ImageResult, Luma};

use super::{LabelMap2d, Projection2d};
use crate::consts::label::is_background;

/// 表明一个可以保存为灰度图片的二维对象.
///
/// 对于 [`Projection2d`], 强度按原样以 16 位灰度保存; 对于 [`LabelMap2d`],
/// 标签会映射到肉眼较易区分的 8 位灰度.
pub trait ImgWrite {
    /// 将图片保存到 `path` 路径. 格式由扩展名决定, 推荐使用 png.
    fn save<P: AsRef<Path>>(&self, path: P) -> ImageResult<()>;
}

/// 使标签更有利于单通道可视化: 背景为黑色, 标签 1 (最大的珠子) 为白色,
/// 其余标签按序号线性变暗, 但不低于 `FLOOR`.
#[inline]
fn pretty(label: u32, n_labels: u32) -> u8 {
    const FLOOR: u64 = 55;

    if is_background(label) {
        return 0;
    }
    debug_assert!(label <= n_labels);
    if n_labels <= 1 {
        return 255;
    }
    let span = u64::from(n_labels - 1);
    let rank = u64::from(n_labels - label);
    (FLOOR + (255 - FLOOR) * rank / span).min(255) as u8
}

impl ImgWrite for Projection2d {
    fn save<P: AsRef<Path>>(&self, path: P) -> ImageResult<()> {
        let (height, width) = self.shape();
        let mut buf: ImageBuffer<Luma<u16>, Vec<u16>> =
            ImageBuffer::new(width as u32, height as u32);
        for ((h, w), &pix) in self.data().indexed_iter() {
            buf.put_pixel(w as u32, h as u32, Luma([pix]));
        }
        buf.save(path)
    }
}

impl ImgWrite for LabelMap2d {
    fn save<P: AsRef<Path>>(&self, path: P) -> ImageResult<()> {
        let (height, width) = self.shape();
        let n = self.n_labels();
        let mut buf = image::GrayImage::new(width as u32, height as u32);
        for ((h, w), &l) in self.data().indexed_iter() {
            buf.put_pixel(w as u32, h as u32, Luma([pretty(l, n)]));
        }
        buf.save(path)
    }
}
