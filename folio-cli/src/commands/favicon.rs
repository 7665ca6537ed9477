//! Favicon command - generate the icon set and web manifest.

use std::path::PathBuf;

use console::style;

use folio::assets::{generate_favicons, FaviconOptions};

use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the favicon command.
pub struct FaviconArgs {
    pub source: PathBuf,
    pub out_dir: Option<PathBuf>,
    pub short_name: Option<String>,
    pub theme_color: String,
    pub background_color: String,
}

pub fn run(args: FaviconArgs) -> Result<(), CliError> {
    let runner = CliRunner::new()?;
    runner.log_startup("favicon");
    let config = runner.config();

    let out_dir = args
        .out_dir
        .unwrap_or_else(|| config.assets.public_dir.clone());
    let mut options = FaviconOptions::new(&args.source, &out_dir, config.site.name.clone())
        .with_colors(args.theme_color, args.background_color);
    if let Some(short_name) = args.short_name {
        options = options.with_short_name(short_name);
    }

    println!("Generating favicons from {}", args.source.display());
    let written = generate_favicons(&options)?;
    for path in &written {
        println!("  {} {}", style("✓").green(), path.display());
    }
    println!();
    println!("Wrote {} files to {}", written.len(), out_dir.display());
    Ok(())
}
