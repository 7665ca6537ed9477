//! Health-check payloads.
//!
//! [`check`] never fails: a probe error or a panic inside the probe becomes
//! a `500` response with a message. Transport (the axum route) lives in
//! [`crate::server`].

use std::env;
use std::panic::{self, AssertUnwindSafe};

use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, trace};

use crate::config::ServerSettings;

/// Overrides `server.environment`.
pub const ENVIRONMENT_ENV: &str = "FOLIO_ENV";
/// Overrides `server.region`.
pub const REGION_ENV: &str = "FOLIO_REGION";

/// Response headers sent with every health payload.
pub const HEALTH_HEADERS: [(&str, &str); 4] = [
    ("content-type", "application/json"),
    (
        "cache-control",
        "no-store, no-cache, must-revalidate, proxy-revalidate",
    ),
    ("pragma", "no-cache"),
    ("expires", "0"),
];

#[derive(Debug, Clone, Error, PartialEq)]
pub enum HealthError {
    #[error("health probe failed: {0}")]
    Probe(String),
}

/// Facts reported by a healthy deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthInfo {
    pub environment: String,
    pub region: String,
    pub version: String,
}

/// Source of deployment facts.
pub trait HealthProbe: Send + Sync {
    fn report(&self) -> Result<HealthInfo, HealthError>;
}

/// Probe answering from configuration, with environment overrides.
#[derive(Debug, Clone)]
pub struct ConfiguredProbe {
    info: HealthInfo,
}

impl ConfiguredProbe {
    pub fn new(info: HealthInfo) -> Self {
        Self { info }
    }

    /// `FOLIO_ENV` and `FOLIO_REGION` take precedence over the settings.
    pub fn from_settings(settings: &ServerSettings) -> Self {
        let pick = |var: &str, fallback: &str| {
            env::var(var)
                .ok()
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| fallback.to_string())
        };
        Self::new(HealthInfo {
            environment: pick(ENVIRONMENT_ENV, &settings.environment),
            region: pick(REGION_ENV, &settings.region),
            version: crate::VERSION.to_string(),
        })
    }
}

impl HealthProbe for ConfiguredProbe {
    fn report(&self) -> Result<HealthInfo, HealthError> {
        Ok(self.info.clone())
    }
}

#[derive(Debug, Serialize)]
struct HealthyBody<'a> {
    status: &'static str,
    timestamp: &'a str,
    environment: &'a str,
    region: &'a str,
    version: &'a str,
}

#[derive(Debug, Serialize)]
struct FailedBody<'a> {
    status: &'static str,
    message: &'a str,
    timestamp: &'a str,
}

/// Status code and JSON body of one health check.
#[derive(Debug, Clone, PartialEq)]
pub struct HealthResponse {
    pub status: u16,
    pub body: serde_json::Value,
}

impl HealthResponse {
    pub fn is_healthy(&self) -> bool {
        self.status == 200
    }

    fn healthy(info: &HealthInfo, timestamp: &str) -> Self {
        let body = HealthyBody {
            status: "ok",
            timestamp,
            environment: &info.environment,
            region: &info.region,
            version: &info.version,
        };
        Self {
            status: 200,
            body: serde_json::to_value(body).unwrap_or_default(),
        }
    }

    fn failed(message: &str, timestamp: &str) -> Self {
        let body = FailedBody {
            status: "error",
            message,
            timestamp,
        };
        Self {
            status: 500,
            body: serde_json::to_value(body).unwrap_or_default(),
        }
    }
}

/// Current time as RFC 3339 UTC with millisecond precision.
pub fn timestamp_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Run the probe and build the response.
pub fn check(probe: &dyn HealthProbe) -> HealthResponse {
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| probe.report()));
    let timestamp = timestamp_now();

    match outcome {
        Ok(Ok(info)) => {
            trace!(environment = %info.environment, region = %info.region, "Health check ok");
            HealthResponse::healthy(&info, &timestamp)
        }
        Ok(Err(e)) => {
            error!(error = %e, "Health check failed");
            HealthResponse::failed(&e.to_string(), &timestamp)
        }
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            error!(panic = %message, "Health probe panicked");
            HealthResponse::failed(&message, &timestamp)
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "health probe panicked".to_string()
    }
}
