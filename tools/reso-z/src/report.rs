//! 结果输出格式.

use std::io::{self, Write};

use bead_berry::prelude::*;

/// 将一个荧光珠的结果写进 `w` 中. 不换行.
fn bead_into<W: Write>(source: &str, b: &BeadMeasurement, w: &mut W) -> io::Result<()> {
    write!(w, "{source}:\t{}\t{:.6}", b.label, b.resolution)?;
    if b.flags.low_volume {
        write!(w, "\t{RESO_TAG}")?;
    }
    if b.flags.multi_component {
        write!(w, "\t{NB_OBJECTS_TAG}")?;
    }
    Ok(())
}

/// 将一个文件的结果写进 `w` 中: 每个荧光珠一行, 然后是平均值、中位数和一个空行.
pub fn describe_into<W: Write>(res: &FileResult, summary: &Summary, w: &mut W) -> io::Result<()> {
    let source = res.source();
    for b in res.beads() {
        bead_into(source, b, w)?;
        writeln!(w)?;
    }
    writeln!(w, "{source}:\tmean\t{:.6}", summary.mean)?;
    writeln!(w, "{source}:\tmedian\t{:.6}", summary.median)?;
    writeln!(w)
}

/// 没有测到任何荧光珠时的报告.
pub fn no_beads_into<W: Write>(source: &str, w: &mut W) -> io::Result<()> {
    writeln!(w, "{source}:\tno beads measured")?;
    writeln!(w)
}
