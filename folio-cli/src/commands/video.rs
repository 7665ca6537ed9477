//! Video command - transcode a source video for the web.

use std::path::PathBuf;
use std::time::Duration;

use clap::ValueEnum;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use folio::assets::{optimize_video, SystemRunner, VideoFormat, VideoOptions};

use crate::error::CliError;
use crate::runner::CliRunner;

/// Output format selection for CLI arguments.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum VideoFormatArg {
    /// H.264 in MP4, widest compatibility
    Mp4,
    /// VP9 in WebM, smaller files
    Webm,
}

impl From<VideoFormatArg> for VideoFormat {
    fn from(arg: VideoFormatArg) -> Self {
        match arg {
            VideoFormatArg::Mp4 => VideoFormat::Mp4,
            VideoFormatArg::Webm => VideoFormat::Webm,
        }
    }
}

/// Arguments for the video command.
pub struct VideoArgs {
    pub input: PathBuf,
    pub out_dir: Option<PathBuf>,
    pub formats: Vec<VideoFormatArg>,
    pub crf: u8,
    pub max_width: Option<u32>,
    pub keep_audio: bool,
    pub no_overwrite: bool,
}

pub fn run(args: VideoArgs) -> Result<(), CliError> {
    let runner = CliRunner::new()?;
    runner.log_startup("video");
    let config = runner.config();

    let out_dir = args
        .out_dir
        .unwrap_or_else(|| config.assets.public_dir.join("video"));
    let mut options = VideoOptions {
        crf: args.crf,
        max_width: args.max_width,
        keep_audio: args.keep_audio,
        overwrite: !args.no_overwrite,
        ..VideoOptions::default()
    };
    if !args.formats.is_empty() {
        options.formats = args.formats.into_iter().map(VideoFormat::from).collect();
    }

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.enable_steady_tick(Duration::from_millis(120));
    spinner.set_message(format!("Transcoding {}", args.input.display()));

    let result = optimize_video(&SystemRunner, &args.input, &out_dir, &options);
    spinner.finish_and_clear();
    let outputs = result?;

    let source_bytes = std::fs::metadata(&args.input).map(|m| m.len()).unwrap_or(0);
    for output in &outputs {
        let ratio = if source_bytes > 0 {
            output.bytes as f64 / source_bytes as f64 * 100.0
        } else {
            0.0
        };
        println!(
            "  {} {:<5} {} ({} bytes, {:.0}% of source)",
            style("✓").green(),
            output.format,
            output.path.display(),
            output.bytes,
            ratio
        );
    }
    Ok(())
}
