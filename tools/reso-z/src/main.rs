//! `reso-z`: 从荧光珠体数据测量显微镜轴向分辨率.
//!
//! 每个文件输出每个荧光珠的分辨率, 以及平均值和中位数. 日志写到 stderr,
//! 默认级别为 `warn`, 可用 `RUST_LOG` 调整.

mod report;
mod runner;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::LevelFilter;
use simple_logger::SimpleLogger;

#[derive(Parser)]
#[command(name = "reso-z")]
#[command(about = "Measure the axial (z) resolution of a microscope from fluorescent bead volumes")]
#[command(version)]
struct Cli {
    /// Bead volumes (.lsm, .tif, .tiff, .nii, .nii.gz, .npy, .npy.gz).
    #[arg(required = true)]
    files: Vec<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = SimpleLogger::new()
        .with_level(LevelFilter::Warn)
        .env()
        .init()
    {
        eprintln!("cannot initialize logger: {e}");
    }

    let stdout = std::io::stdout();
    match runner::run(&cli.files, runner::dump_dir_from_env(), &mut stdout.lock()) {
        Ok(stats) if stats.all_failed() => ExitCode::FAILURE,
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("cannot write results: {e}");
            ExitCode::FAILURE
        }
    }
}
