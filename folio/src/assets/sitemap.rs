//! `sitemap.xml` generation from the route table.

use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use flate2::write::GzEncoder;
use flate2::Compression;
use tracing::info;

use super::error::{AssetError, AssetResult};
use crate::pages::html::escape;
use crate::routes::RouteTable;

pub const SITEMAP_FILE: &str = "sitemap.xml";
pub const SITEMAP_GZ_FILE: &str = "sitemap.xml.gz";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeFreq {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl fmt::Display for ChangeFreq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ChangeFreq::Daily => "daily",
            ChangeFreq::Weekly => "weekly",
            ChangeFreq::Monthly => "monthly",
            ChangeFreq::Yearly => "yearly",
        })
    }
}

/// One `<url>` element.
#[derive(Debug, Clone, PartialEq)]
pub struct SitemapEntry {
    pub loc: String,
    pub lastmod: NaiveDate,
    pub changefreq: ChangeFreq,
    pub priority: f32,
}

/// Today's date in local time, the default `lastmod`.
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// One entry per declared route, in table order. The catch-all is skipped.
///
/// The root gets priority 1.0 and weekly change frequency; every other
/// route 0.8 and monthly.
pub fn entries_from_routes(table: &RouteTable, base_url: &str, lastmod: NaiveDate) -> Vec<SitemapEntry> {
    let base = base_url.trim_end_matches('/');

    table
        .navigation()
        .map(|entry| {
            let path = entry.pattern().as_str();
            let is_root = path == "/";
            SitemapEntry {
                loc: format!("{}{}", base, path),
                lastmod,
                changefreq: if is_root {
                    ChangeFreq::Weekly
                } else {
                    ChangeFreq::Monthly
                },
                priority: if is_root { 1.0 } else { 0.8 },
            }
        })
        .collect()
}

/// Render the XML document.
pub fn render_sitemap(entries: &[SitemapEntry]) -> String {
    let mut xml = String::from(concat!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n",
        "<urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n"
    ));
    for entry in entries {
        xml.push_str(&format!(
            concat!(
                "  <url>\n",
                "    <loc>{}</loc>\n",
                "    <lastmod>{}</lastmod>\n",
                "    <changefreq>{}</changefreq>\n",
                "    <priority>{:.1}</priority>\n",
                "  </url>\n"
            ),
            escape(&entry.loc),
            entry.lastmod.format("%Y-%m-%d"),
            entry.changefreq,
            entry.priority
        ));
    }
    xml.push_str("</urlset>\n");
    xml
}

/// Write `sitemap.xml`, and `sitemap.xml.gz` alongside when `gzip` is set.
pub fn write_sitemap(entries: &[SitemapEntry], out_dir: &Path, gzip: bool) -> AssetResult<Vec<PathBuf>> {
    std::fs::create_dir_all(out_dir).map_err(|e| AssetError::write(out_dir, e))?;
    let xml = render_sitemap(entries);

    let plain = out_dir.join(SITEMAP_FILE);
    std::fs::write(&plain, &xml).map_err(|e| AssetError::write(&plain, e))?;
    let mut written = vec![plain];

    if gzip {
        let path = out_dir.join(SITEMAP_GZ_FILE);
        let file = File::create(&path).map_err(|e| AssetError::write(&path, e))?;
        let mut encoder = GzEncoder::new(BufWriter::new(file), Compression::best());
        encoder
            .write_all(xml.as_bytes())
            .map_err(|e| AssetError::write(&path, e))?;
        encoder
            .finish()
            .and_then(|mut w| w.flush())
            .map_err(|e| AssetError::write(&path, e))?;
        written.push(path);
    }

    info!(urls = entries.len(), dir = %out_dir.display(), gzip, "Sitemap written");
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pages::SiteContext;
    use crate::routes::site_routes;
    use flate2::read::GzDecoder;
    use std::io::Read;
    use tempfile::TempDir;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 9).unwrap()
    }

    #[test]
    fn test_entries_skip_catch_all() {
        let table = site_routes(SiteContext::default()).unwrap();
        let entries = entries_from_routes(&table, "https://sam.dev/", date());

        let locs: Vec<_> = entries.iter().map(|e| e.loc.as_str()).collect();
        assert_eq!(
            locs,
            vec![
                "https://sam.dev/",
                "https://sam.dev/about",
                "https://sam.dev/gallery",
                "https://sam.dev/contact",
            ]
        );
        assert_eq!(entries[0].priority, 1.0);
        assert!(entries[1..].iter().all(|e| e.priority == 0.8));
    }

    #[test]
    fn test_render_document() {
        let xml = render_sitemap(&[SitemapEntry {
            loc: "https://sam.dev/?a=1&b=2".to_string(),
            lastmod: date(),
            changefreq: ChangeFreq::Weekly,
            priority: 1.0,
        }]);

        assert!(xml.starts_with("<?xml version=\"1.0\""));
        assert!(xml.contains("<loc>https://sam.dev/?a=1&amp;b=2</loc>"));
        assert!(xml.contains("<lastmod>2024-03-09</lastmod>"));
        assert!(xml.contains("<changefreq>weekly</changefreq>"));
        assert!(xml.contains("<priority>1.0</priority>"));
        assert!(xml.trim_end().ends_with("</urlset>"));
    }

    #[test]
    fn test_write_gzipped_copy() {
        let dir = TempDir::new().unwrap();
        let table = site_routes(SiteContext::default()).unwrap();
        let entries = entries_from_routes(&table, "https://sam.dev", date());

        let written = write_sitemap(&entries, dir.path(), true).unwrap();
        assert_eq!(written.len(), 2);

        let plain = std::fs::read_to_string(dir.path().join(SITEMAP_FILE)).unwrap();
        let mut unzipped = String::new();
        GzDecoder::new(File::open(dir.path().join(SITEMAP_GZ_FILE)).unwrap())
            .read_to_string(&mut unzipped)
            .unwrap();
        assert_eq!(plain, unzipped);
        assert_eq!(plain.matches("<url>").count(), 4);
    }
}
