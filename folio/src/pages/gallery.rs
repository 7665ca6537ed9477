//! Gallery page backed by the public gallery directory.

use std::io;
use std::path::Path;

use tracing::debug;

use super::html::escape;
use super::Page;

/// Image extensions picked up by the gallery scan.
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "avif", "gif"];

/// One image shown in the gallery grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryItem {
    /// Public URL of the image (`/gallery/<file>`).
    pub src: String,
    /// Alt text derived from the file name.
    pub alt: String,
}

impl GalleryItem {
    /// Build an item from a gallery file name, e.g. `02-harbour-at-dusk.jpg`.
    pub fn from_file_name(file_name: &str) -> Self {
        let stem = file_name
            .rsplit_once('.')
            .map(|(stem, _)| stem)
            .unwrap_or(file_name);

        // Drop a leading ordering prefix like "02-"
        let stem = match stem.split_once('-') {
            Some((prefix, rest)) if !rest.is_empty() && prefix.chars().all(|c| c.is_ascii_digit()) => {
                rest
            }
            _ => stem,
        };

        Self {
            src: format!("/gallery/{}", file_name),
            alt: stem.replace(['-', '_'], " "),
        }
    }
}

/// Gallery grid.
#[derive(Debug, Clone)]
pub struct GalleryPage {
    title: String,
    items: Vec<GalleryItem>,
}

impl GalleryPage {
    pub fn new(site_name: &str, items: Vec<GalleryItem>) -> Self {
        Self {
            title: format!("Gallery | {}", site_name),
            items,
        }
    }

    /// Scan `dir` for images, ordered by file name.
    ///
    /// A missing directory is an error; the route's error boundary reports it.
    pub async fn scan(site_name: &str, dir: &Path) -> io::Result<Self> {
        let mut entries = tokio::fs::read_dir(dir).await?;
        let mut names = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().to_string();
            let is_image = Path::new(&name)
                .extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
                .unwrap_or(false);
            if is_image {
                names.push(name);
            }
        }

        names.sort();
        debug!(dir = %dir.display(), images = names.len(), "Scanned gallery directory");

        let items = names
            .iter()
            .map(|name| GalleryItem::from_file_name(name))
            .collect();
        Ok(Self::new(site_name, items))
    }

    pub fn items(&self) -> &[GalleryItem] {
        &self.items
    }
}

impl Page for GalleryPage {
    fn title(&self) -> &str {
        &self.title
    }

    fn render(&self) -> String {
        let mut html = String::from("<section class=\"gallery\"><h1>Gallery</h1>");
        if self.items.is_empty() {
            html.push_str("<p>No images yet.</p>");
        } else {
            html.push_str("<ul class=\"grid\">");
            for item in &self.items {
                html.push_str(&format!(
                    "<li><img src=\"{}\" alt=\"{}\" loading=\"lazy\"></li>",
                    escape(&item.src),
                    escape(&item.alt)
                ));
            }
            html.push_str("</ul>");
        }
        html.push_str("</section>");
        html
    }
}
