//! Signed uploads to a Cloudinary-style media host.
//!
//! Each upload is a multipart `POST` to
//! `<api_base>/<cloud_name>/<resource_type>/upload` carrying the file, the
//! API key, a timestamp, the public id, the folder and a signature. The
//! signature is the SHA-256 hex digest of the signed parameters sorted by
//! name, joined as `k=v&k=v`, with the API secret appended.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;

use regex::Regex;
use reqwest::blocking::{multipart, Client};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use super::error::{AssetError, AssetResult};
use crate::config::MediaSettings;

/// Default API base URL.
pub const DEFAULT_API_BASE: &str = "https://api.cloudinary.com/v1_1";

/// Default timeout for upload requests in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 600;

/// Host-side storage class, chosen from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceType {
    Image,
    Video,
    Raw,
}

impl ResourceType {
    pub fn for_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "jpg" | "jpeg" | "png" | "gif" | "webp" | "avif" | "svg" | "ico" => ResourceType::Image,
            "mp4" | "webm" | "mov" | "m4v" | "mp3" | "wav" => ResourceType::Video,
            _ => ResourceType::Raw,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::Image => "image",
            ResourceType::Video => "video",
            ResourceType::Raw => "raw",
        }
    }
}

/// Signature over `params` with `secret`.
pub fn sign_params(params: &BTreeMap<String, String>, secret: &str) -> String {
    let joined = params
        .iter()
        .filter(|(_, v)| !v.is_empty())
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha256::new();
    hasher.update(joined.as_bytes());
    hasher.update(secret.as_bytes());
    format!("{:x}", hasher.finalize())
}

fn slug_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[^a-z0-9_-]+").unwrap())
}

/// Public id from the file stem: lower case, runs of other characters
/// collapsed to `-`.
pub fn public_id_for(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    let slug = slug_pattern().replace_all(&stem, "-");
    let slug = slug.trim_matches('-');
    if slug.is_empty() {
        "asset".to_string()
    } else {
        slug.to_string()
    }
}

/// Public ids for a batch, unique within the batch.
///
/// Inputs sharing a stem (`hero.jpg`, `hero.png`) get the extension appended
/// to every colliding id; any remaining clash gets a numeric suffix.
pub fn assign_public_ids(files: &[PathBuf]) -> Vec<(PathBuf, String)> {
    let base: Vec<String> = files.iter().map(|f| public_id_for(f)).collect();
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for id in &base {
        *counts.entry(id.as_str()).or_default() += 1;
    }

    let mut taken = HashSet::new();
    let mut assigned = Vec::with_capacity(files.len());
    for (file, id) in files.iter().zip(&base) {
        let mut candidate = id.clone();
        if counts[id.as_str()] > 1 {
            let ext = file
                .extension()
                .map(|e| e.to_string_lossy().to_lowercase())
                .unwrap_or_default();
            let ext = slug_pattern().replace_all(&ext, "-");
            let ext = ext.trim_matches('-');
            if !ext.is_empty() {
                candidate = format!("{}-{}", id, ext);
            }
        }
        let mut unique = candidate.clone();
        let mut n = 2;
        while !taken.insert(unique.clone()) {
            unique = format!("{}-{}", candidate, n);
            n += 1;
        }
        if unique != *id {
            debug!(file = %file.display(), public_id = %unique, "Public id disambiguated");
        }
        assigned.push((file.clone(), unique));
    }
    assigned
}

/// Expand a glob into the files it matches, sorted.
pub fn expand_inputs(pattern: &str) -> AssetResult<Vec<PathBuf>> {
    let paths = glob::glob(pattern).map_err(|e| AssetError::InvalidPattern {
        pattern: pattern.to_string(),
        reason: e.to_string(),
    })?;

    let mut files = Vec::new();
    for entry in paths {
        let path = entry.map_err(|e| {
            let path = e.path().to_path_buf();
            AssetError::read(path, std::io::Error::from(e))
        })?;
        if path.is_file() {
            files.push(path);
        }
    }
    if files.is_empty() {
        return Err(AssetError::NoInputs(pattern.to_string()));
    }
    files.sort();
    Ok(files)
}

/// Fully prepared upload request.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadRequest {
    pub url: String,
    pub file: PathBuf,
    /// Form fields other than the file, signature included.
    pub fields: BTreeMap<String, String>,
}

/// Raw HTTP answer.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

/// Sends upload requests.
pub trait UploadTransport: Send + Sync {
    fn send(&self, request: &UploadRequest) -> AssetResult<TransportResponse>;
}

/// Blocking reqwest transport.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new() -> AssetResult<Self> {
        Self::with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    pub fn with_timeout(timeout: Duration) -> AssetResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AssetError::Http(format!("failed to create client: {}", e)))?;
        Ok(Self { client })
    }
}

impl UploadTransport for ReqwestTransport {
    fn send(&self, request: &UploadRequest) -> AssetResult<TransportResponse> {
        let mut form = multipart::Form::new();
        for (name, value) in &request.fields {
            form = form.text(name.clone(), value.clone());
        }
        let form = form
            .file("file", &request.file)
            .map_err(|e| AssetError::read(&request.file, e))?;

        let response = self
            .client
            .post(&request.url)
            .multipart(form)
            .send()
            .map_err(|e| AssetError::Http(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response.text().map_err(|e| AssetError::Http(e.to_string()))?;
        Ok(TransportResponse { status, body })
    }
}

/// Parsed success response.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UploadResult {
    pub secure_url: String,
    pub public_id: String,
    pub bytes: u64,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub resource_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Signs and sends uploads for one account.
pub struct MediaUploader<T> {
    transport: T,
    settings: MediaSettings,
    api_base: String,
}

impl<T: UploadTransport> MediaUploader<T> {
    /// Fails unless cloud name, key and secret are all set.
    pub fn new(transport: T, settings: MediaSettings) -> AssetResult<Self> {
        if settings.cloud_name.is_empty() {
            return Err(AssetError::MissingCredentials("media.cloud_name"));
        }
        if settings.api_key.is_empty() {
            return Err(AssetError::MissingCredentials("media.api_key"));
        }
        if settings.api_secret.is_empty() {
            return Err(AssetError::MissingCredentials("media.api_secret"));
        }
        Ok(Self {
            transport,
            settings,
            api_base: DEFAULT_API_BASE.to_string(),
        })
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    /// Build the signed request for `file` at `timestamp` (Unix seconds).
    pub fn build_request(&self, file: &Path, timestamp: i64) -> UploadRequest {
        self.build_request_as(file, &public_id_for(file), timestamp)
    }

    /// Like [`build_request`](Self::build_request) with an explicit public id.
    pub fn build_request_as(&self, file: &Path, public_id: &str, timestamp: i64) -> UploadRequest {
        let resource_type = ResourceType::for_path(file);

        let mut signed = BTreeMap::new();
        signed.insert("timestamp".to_string(), timestamp.to_string());
        signed.insert("public_id".to_string(), public_id.to_string());
        signed.insert("overwrite".to_string(), "true".to_string());
        if !self.settings.folder.is_empty() {
            signed.insert("folder".to_string(), self.settings.folder.clone());
        }

        let signature = sign_params(&signed, &self.settings.api_secret);
        let mut fields = signed;
        fields.insert("api_key".to_string(), self.settings.api_key.clone());
        fields.insert("signature".to_string(), signature);
        fields.insert("signature_algorithm".to_string(), "sha256".to_string());

        UploadRequest {
            url: format!(
                "{}/{}/{}/upload",
                self.api_base,
                self.settings.cloud_name,
                resource_type.as_str()
            ),
            file: file.to_path_buf(),
            fields,
        }
    }

    /// Upload one file.
    pub fn upload(&self, file: &Path) -> AssetResult<UploadResult> {
        self.upload_as(file, &public_id_for(file))
    }

    /// Upload one file under `public_id`, replacing any asset already there.
    pub fn upload_as(&self, file: &Path, public_id: &str) -> AssetResult<UploadResult> {
        let request = self.build_request_as(file, public_id, chrono::Utc::now().timestamp());
        debug!(file = %file.display(), url = %request.url, "Uploading");

        let response = self.transport.send(&request)?;
        if !(200..300).contains(&response.status) {
            let message = serde_json::from_str::<ErrorEnvelope>(&response.body)
                .map(|e| e.error.message)
                .unwrap_or_else(|_| response.body.chars().take(200).collect());
            return Err(AssetError::UploadRejected {
                path: file.to_path_buf(),
                status: response.status,
                message,
            });
        }

        let result: UploadResult = serde_json::from_str(&response.body)
            .map_err(|e| AssetError::InvalidResponse(e.to_string()))?;
        info!(
            file = %file.display(),
            public_id = %result.public_id,
            bytes = result.bytes,
            "Uploaded"
        );
        Ok(result)
    }
}

impl<T> std::fmt::Debug for MediaUploader<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaUploader")
            .field("settings", &self.settings)
            .field("api_base", &self.api_base)
            .finish_non_exhaustive()
    }
}
