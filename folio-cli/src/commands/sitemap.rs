//! Sitemap command - write sitemap.xml from the route table.

use std::path::PathBuf;

use folio::assets::{entries_from_routes, today, write_sitemap};
use folio::pages::SiteContext;
use folio::routes::site_routes;

use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the sitemap command.
pub struct SitemapArgs {
    pub base_url: Option<String>,
    pub out_dir: Option<PathBuf>,
    pub gzip: bool,
}

pub fn run(args: SitemapArgs) -> Result<(), CliError> {
    let runner = CliRunner::new()?;
    runner.log_startup("sitemap");
    let config = runner.config();

    let base_url = args
        .base_url
        .unwrap_or_else(|| config.site.base_url.clone());
    if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
        return Err(CliError::Config(format!(
            "Base URL must be absolute, got '{}'. Set site.base_url or use --base-url.",
            base_url
        )));
    }
    let out_dir = args
        .out_dir
        .unwrap_or_else(|| config.assets.public_dir.clone());

    let table = site_routes(SiteContext::from_config(config))?;
    let entries = entries_from_routes(&table, &base_url, today());
    let written = write_sitemap(&entries, &out_dir, args.gzip)?;

    println!("Sitemap for {} ({} URLs)", base_url, entries.len());
    for entry in &entries {
        println!("  {:.1}  {}", entry.priority, entry.loc);
    }
    println!();
    for path in written {
        println!("Wrote {}", path.display());
    }
    Ok(())
}
