//! 迭代器风格的体数据加载器. 每次迭代才真正读取一个文件.

use std::path::{Path, PathBuf};

use super::{OpenResult, VolumeSource};
use crate::Volume;

/// 从一组路径和数据来源创建加载器. 路径按给出的顺序依次加载.
pub fn volume_loader<I, P, S>(paths: I, source: S) -> VolumeLoader<S>
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
    S: VolumeSource,
{
    let mut paths_rev: Vec<PathBuf> = paths.into_iter().map(|p| p.as_ref().to_owned()).collect();
    paths_rev.reverse();
    VolumeLoader { paths_rev, source }
}

/// 3D 体数据加载器.
///
/// 某个文件打不开时, 该项返回 `Err`, 但不影响之后的文件.
#[derive(Debug)]
pub struct VolumeLoader<S> {
    paths_rev: Vec<PathBuf>,
    source: S,
}

impl<S: VolumeSource> Iterator for VolumeLoader<S> {
    type Item = (PathBuf, OpenResult<Volume>);

    fn next(&mut self) -> Option<Self::Item> {
        let path = self.paths_rev.pop()?;
        let data = self.source.open(&path);
        Some((path, data))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.paths_rev.len(), Some(self.paths_rev.len()))
    }
}

impl<S: VolumeSource> ExactSizeIterator for VolumeLoader<S> {
    #[inline]
    fn len(&self) -> usize {
        self.paths_rev.len()
    }
}
