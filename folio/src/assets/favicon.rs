//! Favicon set generation from a single source image.
//!
//! The source is center-cropped to a square, then resized once per output.
//! PNG outputs are resized in parallel.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use image::codecs::ico::{IcoEncoder, IcoFrame};
use image::imageops::FilterType;
use image::{DynamicImage, ExtendedColorType, GenericImageView, ImageFormat};
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::error::{AssetError, AssetResult};

/// One PNG written by [`generate_favicons`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PngIcon {
    pub file_name: &'static str,
    pub size: u32,
}

/// PNG icons, in output order.
pub const PNG_ICONS: &[PngIcon] = &[
    PngIcon {
        file_name: "favicon-16x16.png",
        size: 16,
    },
    PngIcon {
        file_name: "favicon-32x32.png",
        size: 32,
    },
    PngIcon {
        file_name: "apple-touch-icon.png",
        size: 180,
    },
    PngIcon {
        file_name: "android-chrome-192x192.png",
        size: 192,
    },
    PngIcon {
        file_name: "android-chrome-512x512.png",
        size: 512,
    },
];

/// Frame sizes embedded in `favicon.ico`.
pub const ICO_SIZES: [u32; 3] = [16, 32, 48];

pub const ICO_FILE: &str = "favicon.ico";
pub const MANIFEST_FILE: &str = "site.webmanifest";

/// Inputs for [`generate_favicons`].
#[derive(Debug, Clone)]
pub struct FaviconOptions {
    pub source: PathBuf,
    pub out_dir: PathBuf,
    /// Manifest `name`.
    pub name: String,
    /// Manifest `short_name`.
    pub short_name: String,
    pub theme_color: String,
    pub background_color: String,
}

impl FaviconOptions {
    pub fn new(source: impl Into<PathBuf>, out_dir: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            source: source.into(),
            out_dir: out_dir.into(),
            short_name: name.clone(),
            name,
            theme_color: "#ffffff".to_string(),
            background_color: "#ffffff".to_string(),
        }
    }

    pub fn with_short_name(mut self, short_name: impl Into<String>) -> Self {
        self.short_name = short_name.into();
        self
    }

    pub fn with_colors(mut self, theme: impl Into<String>, background: impl Into<String>) -> Self {
        self.theme_color = theme.into();
        self.background_color = background.into();
        self
    }
}

#[derive(Debug, Serialize)]
struct ManifestIcon {
    src: String,
    sizes: String,
    #[serde(rename = "type")]
    mime: &'static str,
}

#[derive(Debug, Serialize)]
struct WebManifest<'a> {
    name: &'a str,
    short_name: &'a str,
    icons: Vec<ManifestIcon>,
    theme_color: &'a str,
    background_color: &'a str,
    display: &'static str,
}

/// Generate every icon plus the manifest. Returns the written paths.
pub fn generate_favicons(options: &FaviconOptions) -> AssetResult<Vec<PathBuf>> {
    let source = image::open(&options.source).map_err(|source| AssetError::Image {
        path: options.source.clone(),
        source,
    })?;
    let (width, height) = source.dimensions();
    if width.min(height) < 512 {
        warn!(
            source = %options.source.display(),
            width,
            height,
            "Source smaller than the largest icon, output will be upscaled"
        );
    }
    let square = square_crop(&source);

    std::fs::create_dir_all(&options.out_dir).map_err(|e| AssetError::write(&options.out_dir, e))?;

    let mut written: Vec<PathBuf> = PNG_ICONS
        .par_iter()
        .map(|icon| {
            let path = options.out_dir.join(icon.file_name);
            square
                .resize_exact(icon.size, icon.size, FilterType::Lanczos3)
                .to_rgba8()
                .save_with_format(&path, ImageFormat::Png)
                .map_err(|source| AssetError::Image {
                    path: path.clone(),
                    source,
                })?;
            debug!(path = %path.display(), size = icon.size, "Wrote icon");
            Ok::<_, AssetError>(path)
        })
        .collect::<AssetResult<_>>()?;

    written.push(write_ico(&square, &options.out_dir.join(ICO_FILE))?);
    written.push(write_manifest(options)?);

    info!(count = written.len(), dir = %options.out_dir.display(), "Favicons generated");
    Ok(written)
}

fn square_crop(image: &DynamicImage) -> DynamicImage {
    let (width, height) = image.dimensions();
    let side = width.min(height);
    image.crop_imm((width - side) / 2, (height - side) / 2, side, side)
}

fn write_ico(square: &DynamicImage, path: &Path) -> AssetResult<PathBuf> {
    let image_err = |source| AssetError::Image {
        path: path.to_path_buf(),
        source,
    };

    let buffers: Vec<(u32, Vec<u8>)> = ICO_SIZES
        .iter()
        .map(|&size| {
            let rgba = square.resize_exact(size, size, FilterType::Lanczos3).to_rgba8();
            (size, rgba.into_raw())
        })
        .collect();

    let frames = buffers
        .iter()
        .map(|(size, raw)| IcoFrame::as_png(raw, *size, *size, ExtendedColorType::Rgba8))
        .collect::<Result<Vec<_>, _>>()
        .map_err(image_err)?;

    let file = File::create(path).map_err(|e| AssetError::write(path, e))?;
    IcoEncoder::new(BufWriter::new(file))
        .encode_images(&frames)
        .map_err(image_err)?;
    Ok(path.to_path_buf())
}

fn write_manifest(options: &FaviconOptions) -> AssetResult<PathBuf> {
    let icons = PNG_ICONS
        .iter()
        .filter(|icon| icon.file_name.starts_with("android-chrome"))
        .map(|icon| ManifestIcon {
            src: format!("/{}", icon.file_name),
            sizes: format!("{0}x{0}", icon.size),
            mime: "image/png",
        })
        .collect();

    let manifest = WebManifest {
        name: &options.name,
        short_name: &options.short_name,
        icons,
        theme_color: &options.theme_color,
        background_color: &options.background_color,
        display: "standalone",
    };

    let path = options.out_dir.join(MANIFEST_FILE);
    let json = serde_json::to_string_pretty(&manifest)
        .map_err(|e| AssetError::InvalidOption(format!("manifest: {}", e)))?;
    std::fs::write(&path, json).map_err(|e| AssetError::write(&path, e))?;
    Ok(path)
}
