//! Build-time asset tools.
//!
//! | Tool | Input | Output |
//! |------|-------|--------|
//! | [`favicon`] | one square-ish image | PNG icons, `favicon.ico`, `site.webmanifest` |
//! | [`sitemap`] | route table + base URL | `sitemap.xml` (+ `.gz`) |
//! | [`video`] | source video | MP4 (H.264) and/or WebM (VP9) via `ffmpeg` |
//! | [`upload`] | glob of files | signed uploads to the media host |
//!
//! All tools are synchronous; the CLI runs them outside the async runtime.

mod error;
pub mod favicon;
pub mod sitemap;
pub mod upload;
pub mod video;

pub use error::{AssetError, AssetResult};
pub use favicon::{generate_favicons, FaviconOptions};
pub use sitemap::{entries_from_routes, render_sitemap, today, write_sitemap, ChangeFreq, SitemapEntry};
pub use upload::{assign_public_ids, expand_inputs, MediaUploader, ReqwestTransport, UploadResult, UploadTransport};
pub use video::{optimize_video, CommandRunner, SystemRunner, VideoFormat, VideoOptions, VideoOutput};
