use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::document::header::Branding;

const DEFAULT_GEMINI_API_URL: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash:generateContent";

/// How the generated script body is placed into the PDF.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyMode {
    /// Rasterize the whole body and slice it across pages (default).
    Raster,
    /// Lay the body out as vector text with per-block page-break rules.
    Text,
}

impl BodyMode {
    fn parse(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "raster" => Ok(BodyMode::Raster),
            "text" => Ok(BodyMode::Text),
            other => anyhow::bail!("BODY_MODE must be 'raster' or 'text', got '{other}'"),
        }
    }
}

/// Application configuration loaded from environment variables.
/// Only the port and timeout are validated; everything else has a usable default.
#[derive(Debug, Clone)]
pub struct Config {
    /// Missing key means every generation falls back to the sample script.
    pub gemini_api_key: Option<String>,
    pub gemini_api_url: String,
    pub gemini_timeout_secs: u64,
    /// Unset → form state lives in process memory.
    pub redis_url: Option<String>,
    pub port: u16,
    pub rust_log: String,
    pub body_mode: BodyMode,
    pub logo_path: Option<PathBuf>,
    pub branding: Branding,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = Branding::default();

        Ok(Config {
            gemini_api_key: optional_env("GEMINI_API_KEY"),
            gemini_api_url: optional_env("GEMINI_API_URL")
                .unwrap_or_else(|| DEFAULT_GEMINI_API_URL.to_string()),
            gemini_timeout_secs: std::env::var("GEMINI_TIMEOUT_SECS")
                .unwrap_or_else(|_| "120".to_string())
                .parse::<u64>()
                .context("GEMINI_TIMEOUT_SECS must be a whole number of seconds")?,
            redis_url: optional_env("REDIS_URL"),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            body_mode: match optional_env("BODY_MODE") {
                Some(value) => BodyMode::parse(&value)?,
                None => BodyMode::Raster,
            },
            logo_path: optional_env("LOGO_PATH").map(PathBuf::from),
            branding: Branding {
                title: optional_env("BRAND_TITLE").unwrap_or(defaults.title),
                contact_name: optional_env("BRAND_CONTACT_NAME").unwrap_or(defaults.contact_name),
                contact_line: optional_env("BRAND_CONTACT_LINE").unwrap_or(defaults.contact_line),
            },
        })
    }
}

/// Returns the variable's value, treating unset and blank the same way.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_mode_parse_accepts_known_values() {
        assert_eq!(BodyMode::parse("raster").unwrap(), BodyMode::Raster);
        assert_eq!(BodyMode::parse(" TEXT ").unwrap(), BodyMode::Text);
    }

    #[test]
    fn test_body_mode_parse_rejects_unknown() {
        assert!(BodyMode::parse("html").is_err());
    }
}
