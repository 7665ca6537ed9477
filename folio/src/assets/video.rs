//! Web video transcoding through `ffmpeg`.
//!
//! Argument construction is pure ([`ffmpeg_args`]); process execution sits
//! behind [`CommandRunner`] so it can be swapped in tests.

use std::ffi::OsString;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::str::FromStr;

use tracing::{debug, info};

use super::error::{AssetError, AssetResult};

pub const FFMPEG: &str = "ffmpeg";

/// Highest CRF accepted by both encoders.
pub const MAX_CRF: u8 = 51;

/// Output container and codec pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VideoFormat {
    /// H.264 in MP4 with the moov atom up front.
    Mp4,
    /// VP9 in WebM.
    Webm,
}

impl VideoFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            VideoFormat::Mp4 => "mp4",
            VideoFormat::Webm => "webm",
        }
    }
}

impl fmt::Display for VideoFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for VideoFormat {
    type Err = AssetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mp4" | "h264" => Ok(VideoFormat::Mp4),
            "webm" | "vp9" => Ok(VideoFormat::Webm),
            other => Err(AssetError::InvalidOption(format!(
                "unknown video format '{}', expected mp4 or webm",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VideoOptions {
    pub formats: Vec<VideoFormat>,
    /// Constant rate factor; lower is higher quality.
    pub crf: u8,
    /// Downscale wider sources to this width, keeping aspect ratio.
    pub max_width: Option<u32>,
    pub keep_audio: bool,
    pub overwrite: bool,
}

impl Default for VideoOptions {
    fn default() -> Self {
        Self {
            formats: vec![VideoFormat::Mp4, VideoFormat::Webm],
            crf: 28,
            max_width: None,
            keep_audio: false,
            overwrite: true,
        }
    }
}

impl VideoOptions {
    pub fn validate(&self) -> AssetResult<()> {
        if self.formats.is_empty() {
            return Err(AssetError::InvalidOption("no output formats".to_string()));
        }
        if self.crf > MAX_CRF {
            return Err(AssetError::InvalidOption(format!(
                "crf {} out of range 0-{}",
                self.crf, MAX_CRF
            )));
        }
        if self.max_width == Some(0) {
            return Err(AssetError::InvalidOption("max width must be positive".to_string()));
        }
        Ok(())
    }
}

/// `<out_dir>/<input stem>.<ext>`
pub fn output_path(input: &Path, out_dir: &Path, format: VideoFormat) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_os_string())
        .unwrap_or_else(|| OsString::from("video"));
    let mut name = stem;
    name.push(".");
    name.push(format.extension());
    out_dir.join(name)
}

/// Arguments for one ffmpeg invocation.
pub fn ffmpeg_args(input: &Path, output: &Path, format: VideoFormat, options: &VideoOptions) -> Vec<OsString> {
    let crf = options.crf.to_string();
    let mut flags: Vec<String> = Vec::new();

    match format {
        VideoFormat::Mp4 => flags.extend(
            [
                "-c:v", "libx264", "-preset", "slow", "-crf", crf.as_str(), "-pix_fmt", "yuv420p",
                "-movflags", "+faststart",
            ]
            .map(String::from),
        ),
        VideoFormat::Webm => flags.extend(
            ["-c:v", "libvpx-vp9", "-crf", crf.as_str(), "-b:v", "0", "-row-mt", "1"].map(String::from),
        ),
    }

    if let Some(width) = options.max_width {
        flags.push("-vf".to_string());
        flags.push(format!("scale='min({},iw)':-2", width));
    }

    if options.keep_audio {
        let (codec, bitrate) = match format {
            VideoFormat::Mp4 => ("aac", "128k"),
            VideoFormat::Webm => ("libopus", "96k"),
        };
        flags.extend(["-c:a", codec, "-b:a", bitrate].map(String::from));
    } else {
        flags.push("-an".to_string());
    }

    let overwrite = if options.overwrite { "-y" } else { "-n" };
    let mut args: Vec<OsString> = ["-hide_banner", overwrite, "-i"].map(OsString::from).to_vec();
    args.push(input.as_os_str().to_os_string());
    args.extend(flags.into_iter().map(OsString::from));
    args.push(output.as_os_str().to_os_string());
    args
}

/// Captured result of a finished process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub success: bool,
    /// Exit code, or a description when killed by a signal.
    pub status: String,
    pub stderr: String,
}

/// Runs external programs.
pub trait CommandRunner: Send + Sync {
    fn run(&self, program: &str, args: &[OsString]) -> AssetResult<CommandOutput>;
}

/// Runs programs with [`std::process::Command`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, program: &str, args: &[OsString]) -> AssetResult<CommandOutput> {
        let output = Command::new(program).args(args).output().map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                AssetError::CommandNotFound {
                    program: program.to_string(),
                }
            } else {
                AssetError::CommandFailed {
                    program: program.to_string(),
                    status: "spawn failure".to_string(),
                    stderr: e.to_string(),
                }
            }
        })?;

        Ok(CommandOutput {
            success: output.status.success(),
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// One transcoded file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoOutput {
    pub format: VideoFormat,
    pub path: PathBuf,
    pub bytes: u64,
}

/// Transcode `input` into every requested format under `out_dir`.
///
/// Formats run one after another; the first failure stops the batch.
pub fn optimize_video(
    runner: &dyn CommandRunner,
    input: &Path,
    out_dir: &Path,
    options: &VideoOptions,
) -> AssetResult<Vec<VideoOutput>> {
    options.validate()?;
    let source_bytes = std::fs::metadata(input)
        .map_err(|e| AssetError::read(input, e))?
        .len();
    std::fs::create_dir_all(out_dir).map_err(|e| AssetError::write(out_dir, e))?;

    let mut outputs = Vec::with_capacity(options.formats.len());
    for &format in &options.formats {
        let output = output_path(input, out_dir, format);
        if output == input {
            return Err(AssetError::InvalidOption(format!(
                "output would overwrite input {}",
                input.display()
            )));
        }

        let args = ffmpeg_args(input, &output, format, options);
        debug!(%format, ?args, "Running ffmpeg");
        let result = runner.run(FFMPEG, &args)?;
        if !result.success {
            return Err(AssetError::CommandFailed {
                program: FFMPEG.to_string(),
                status: result.status,
                stderr: stderr_tail(&result.stderr, 10),
            });
        }

        let bytes = std::fs::metadata(&output).map(|m| m.len()).unwrap_or(0);
        info!(
            %format,
            output = %output.display(),
            source_bytes,
            bytes,
            "Video transcoded"
        );
        outputs.push(VideoOutput {
            format,
            path: output,
            bytes,
        });
    }
    Ok(outputs)
}

/// Last `lines` lines of ffmpeg's stderr; the rest is banner noise.
fn stderr_tail(stderr: &str, lines: usize) -> String {
    let all: Vec<&str> = stderr.lines().collect();
    all[all.len().saturating_sub(lines)..].join("\n")
}
