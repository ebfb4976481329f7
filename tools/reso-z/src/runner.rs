//! 程序运行函数.

use std::env;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use bead_berry::prelude::*;

use crate::report;

/// 若设置了该环境变量, 则把每个文件的投影图和标签图以 png 保存到其指向的目录.
const DUMP_DIR_ENV: &str = "RESO_Z_DUMP_DIR";

/// 获取中间结果保存目录. 环境变量 `$RESO_Z_DUMP_DIR` 未设置或为空时返回 `None`.
pub fn dump_dir_from_env() -> Option<PathBuf> {
    env::var_os(DUMP_DIR_ENV)
        .filter(|d| !d.is_empty())
        .map(PathBuf::from)
}

/// 一次运行的文件计数.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct RunStats {
    /// 处理过的文件数.
    pub processed: usize,

    /// 没有得到任何测量结果的文件数.
    pub failed: usize,
}

impl RunStats {
    /// 是否每个文件都失败了?
    #[inline]
    pub fn all_failed(&self) -> bool {
        self.processed > 0 && self.failed == self.processed
    }
}

/// 第 `index` 个输入文件 (从 1 开始) 的导出文件名前缀.
///
/// 带上序号, 不同目录下的同名文件不会互相覆盖.
fn dump_stem(index: usize, path: &Path) -> String {
    let name = path
        .file_name()
        .map_or_else(|| "volume".into(), |n| n.to_string_lossy());
    format!("{index:04}-{name}")
}

/// 保存投影图和标签图. 失败只记日志.
fn dump(dir: &Path, stem: &str, map: &BeadMap) {
    let projection = dir.join(format!("{stem}.projection.png"));
    let labels = dir.join(format!("{stem}.labels.png"));
    for (p, r) in [
        (&projection, map.projection().save(&projection)),
        (&labels, map.labels().save(&labels)),
    ] {
        match r {
            Ok(()) => log::debug!("saved {}", p.display()),
            Err(e) => log::warn!("cannot save {}: {e}", p.display()),
        }
    }
}

/// 处理一个已加载的文件.
fn process(
    pipeline: &ResoZ,
    index: usize,
    path: &Path,
    volume: &Volume,
    dump_dir: Option<&Path>,
) -> PipelineResult<(FileResult, Summary)> {
    let source = path.display().to_string();
    let map = pipeline.prepare(volume);
    log::debug!("{source}: {} bead(s)", map.n_beads());
    if let Some(dir) = dump_dir {
        dump(dir, &dump_stem(index, path), &map);
    }
    let res = pipeline.measure(&source, &map)?;
    let summary = res.summary()?;
    Ok((res, summary))
}

/// 依次处理 `paths` 中的每个文件, 并把结果写进 `out` 中.
///
/// 单个文件出错不影响其它文件. 只有写 `out` 失败时返回 `Err`.
pub fn run<W: Write>(paths: &[PathBuf], dump_dir: Option<PathBuf>, out: &mut W) -> io::Result<RunStats> {
    run_with(&ResoZ::default(), paths, dump_dir.as_deref(), out)
}

/// 以给定流程处理 `paths`.
pub fn run_with<W: Write>(
    pipeline: &ResoZ,
    paths: &[PathBuf],
    dump_dir: Option<&Path>,
    out: &mut W,
) -> io::Result<RunStats> {
    let mut stats = RunStats::default();
    for (path, volume) in volume_loader(paths, AutoSource) {
        stats.processed += 1;
        let source = path.display().to_string();
        let result = volume
            .map_err(PipelineError::from)
            .and_then(|v| process(pipeline, stats.processed, &path, &v, dump_dir));
        match result {
            Ok((res, summary)) => report::describe_into(&res, &summary, out)?,
            Err(PipelineError::NoBeads) => {
                log::warn!("{source}: no beads detected");
                report::no_beads_into(&source, out)?;
                stats.failed += 1;
            }
            Err(e) => {
                log::error!("{source}: {e}");
                stats.failed += 1;
            }
        }
    }
    Ok(stats)
}
