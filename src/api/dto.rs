//! Wire types shared by the REST client and the push channel.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::PathBuf;

/// A single feed post as returned by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct View {
    #[serde(rename = "_id")]
    pub id: String,
    pub text: String,
    /// Path relative to the backend base URL
    #[serde(default)]
    pub media_url: Option<String>,
    #[serde(default)]
    pub upvotes: u64,
    #[serde(default)]
    pub comments: Vec<Comment>,
}

impl View {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            media_url: None,
            upvotes: 0,
            comments: Vec::new(),
        }
    }

    pub fn media(mut self, media_url: impl Into<String>) -> Self {
        self.media_url = Some(media_url.into());
        self
    }

    pub fn upvotes(mut self, upvotes: u64) -> Self {
        self.upvotes = upvotes;
        self
    }
}

/// A comment attached to a view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub text: String,
    /// Receipt time when the backend sent nothing usable
    #[serde(default = "Utc::now", deserialize_with = "deserialize_timestamp")]
    pub timestamp: DateTime<Utc>,
}

impl Comment {
    /// A comment stamped with the current client time
    pub fn now(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Accepts RFC 3339 and naive ISO-8601 (read as UTC). Anything else is
/// logged and replaced by the current time so one bad comment cannot sink
/// a whole page.
fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    let parsed = raw.as_ref().and_then(|v| v.as_str()).and_then(parse_timestamp);

    Ok(parsed.unwrap_or_else(|| {
        tracing::warn!("Unreadable comment timestamp {:?}, using receipt time", raw);
        Utc::now()
    }))
}

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

pub(crate) fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|naive| naive.and_utc())
}

/// Response body of `GET /views`
#[derive(Debug, Deserialize)]
pub struct ViewsPage {
    #[serde(default)]
    pub views: Vec<View>,
}

/// Body of `POST /comment/{id}`
#[derive(Debug, Serialize)]
pub struct NewComment<'a> {
    pub text: &'a str,
}

/// Error body returned by the backend on non-2xx responses
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub detail: serde_json::Value,
}

impl ErrorBody {
    /// Human-readable detail; validation error lists are shown as compact JSON
    pub fn message(&self) -> String {
        match &self.detail {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

/// A view about to be submitted
#[derive(Debug, Clone)]
pub struct NewView {
    pub text: String,
    pub media: Option<MediaFile>,
}

/// An attachment loaded into memory for upload
#[derive(Debug, Clone)]
pub struct MediaFile {
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl MediaFile {
    /// Read a file from disk, guessing its MIME type from the extension
    pub async fn load(path: &std::path::Path) -> Result<Self, super::ApiError> {
        let bytes = tokio::fs::read(path).await.map_err(|e| super::ApiError::Media {
            path: PathBuf::from(path),
            error: e.to_string(),
        })?;

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "upload".to_string());

        let mime = mime_guess::from_path(path)
            .first_or_octet_stream()
            .essence_str()
            .to_string();

        Ok(Self {
            file_name,
            mime,
            bytes,
        })
    }
}
