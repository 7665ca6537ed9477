//! Folio CLI - serve the portfolio site and build its assets.

mod commands;
mod error;
mod runner;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use console::style;

use commands::config::ConfigCommands;
use commands::favicon::FaviconArgs;
use commands::serve::ServeArgs;
use commands::sitemap::SitemapArgs;
use commands::upload::UploadArgs;
use commands::video::{VideoArgs, VideoFormatArg};
use error::CliError;

#[derive(Parser)]
#[command(name = "folio")]
#[command(version, about = "Portfolio site server and asset toolchain", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the site and the health endpoint
    Serve {
        /// Listen address, overrides server.bind
        #[arg(long)]
        bind: Option<String>,

        /// Log to stderr only
        #[arg(long)]
        no_log_file: bool,

        /// Load every page module at startup
        #[arg(long)]
        warm: bool,
    },

    /// Print the route table
    Routes,

    /// Generate favicon.ico, PNG icons and site.webmanifest from one image
    Favicon {
        /// Source image, ideally square and at least 512px
        source: PathBuf,

        /// Output directory (default: assets.public_dir)
        #[arg(long, short)]
        out: Option<PathBuf>,

        /// Short name for the web manifest
        #[arg(long)]
        short_name: Option<String>,

        #[arg(long, default_value = "#ffffff")]
        theme_color: String,

        #[arg(long, default_value = "#ffffff")]
        background_color: String,
    },

    /// Write sitemap.xml for every navigable route
    Sitemap {
        /// Absolute site URL (default: site.base_url)
        #[arg(long)]
        base_url: Option<String>,

        /// Output directory (default: assets.public_dir)
        #[arg(long, short)]
        out: Option<PathBuf>,

        /// Also write sitemap.xml.gz
        #[arg(long)]
        gzip: bool,
    },

    /// Transcode a video into web formats with ffmpeg
    Video {
        input: PathBuf,

        /// Output directory (default: <public_dir>/video)
        #[arg(long, short)]
        out: Option<PathBuf>,

        /// Formats to produce (default: mp4 and webm)
        #[arg(long = "format", value_enum)]
        formats: Vec<VideoFormatArg>,

        /// Constant rate factor, 0-51, lower is better quality
        #[arg(long, default_value_t = 28)]
        crf: u8,

        /// Downscale wider videos to this width
        #[arg(long)]
        max_width: Option<u32>,

        /// Keep the audio track
        #[arg(long)]
        keep_audio: bool,

        /// Fail instead of replacing existing outputs
        #[arg(long)]
        no_overwrite: bool,
    },

    /// Upload files matching a glob pattern to the media host
    Upload {
        /// Glob pattern, e.g. "public/images/*.jpg"
        pattern: String,

        /// Remote folder (default: media.folder)
        #[arg(long)]
        folder: Option<String>,

        /// List the files without uploading
        #[arg(long)]
        dry_run: bool,
    },

    /// View or edit configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = dispatch(cli.command) {
        eprintln!("{} {}", style("Error:").red().bold(), e);
        process::exit(1);
    }
}

fn dispatch(command: Commands) -> Result<(), CliError> {
    match command {
        Commands::Serve {
            bind,
            no_log_file,
            warm,
        } => commands::serve::run(ServeArgs {
            bind,
            no_log_file,
            warm,
        }),
        Commands::Routes => commands::routes::run(),
        Commands::Favicon {
            source,
            out,
            short_name,
            theme_color,
            background_color,
        } => commands::favicon::run(FaviconArgs {
            source,
            out_dir: out,
            short_name,
            theme_color,
            background_color,
        }),
        Commands::Sitemap {
            base_url,
            out,
            gzip,
        } => commands::sitemap::run(SitemapArgs {
            base_url,
            out_dir: out,
            gzip,
        }),
        Commands::Video {
            input,
            out,
            formats,
            crf,
            max_width,
            keep_audio,
            no_overwrite,
        } => commands::video::run(VideoArgs {
            input,
            out_dir: out,
            formats,
            crf,
            max_width,
            keep_audio,
            no_overwrite,
        }),
        Commands::Upload {
            pattern,
            folder,
            dry_run,
        } => commands::upload::run(UploadArgs {
            pattern,
            folder,
            dry_run,
        }),
        Commands::Config { command } => commands::config::run(command),
    }
}
