//! Upload command - push files to the media host.

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::warn;

use folio::assets::{assign_public_ids, expand_inputs, MediaUploader, ReqwestTransport};

use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the upload command.
pub struct UploadArgs {
    pub pattern: String,
    pub folder: Option<String>,
    pub dry_run: bool,
}

pub fn run(args: UploadArgs) -> Result<(), CliError> {
    let runner = CliRunner::new()?;
    runner.log_startup("upload");

    let mut media = runner.config().media.clone();
    if let Some(folder) = args.folder {
        media.folder = folder.trim_matches('/').to_string();
    }

    let files = assign_public_ids(&expand_inputs(&args.pattern)?);
    if args.dry_run {
        println!("Would upload {} files to folder '{}':", files.len(), media.folder);
        for (file, public_id) in &files {
            println!("  {} -> {}", file.display(), public_id);
        }
        return Ok(());
    }

    let uploader = MediaUploader::new(ReqwestTransport::new()?, media)?;

    let progress = ProgressBar::new(files.len() as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );

    let mut failed = 0usize;
    for (file, public_id) in &files {
        progress.set_message(file.display().to_string());
        match uploader.upload_as(file, public_id) {
            Ok(result) => progress.println(format!(
                "  {} {} -> {} ({} bytes)",
                style("✓").green(),
                file.display(),
                result.secure_url,
                result.bytes
            )),
            Err(e) => {
                failed += 1;
                warn!(file = %file.display(), error = %e, "Upload failed");
                progress.println(format!("  {} {}: {}", style("✗").red(), file.display(), e));
            }
        }
        progress.inc(1);
    }
    progress.finish_and_clear();

    println!(
        "Uploaded {} of {} files",
        files.len() - failed,
        files.len()
    );
    if failed > 0 {
        return Err(CliError::Partial {
            failed,
            total: files.len(),
        });
    }
    Ok(())
}
