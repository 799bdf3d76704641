use reqwest::{Client, StatusCode, Url, multipart};
use serde_json::Value;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::catalog::{RawVideo, VideoRecord};
use crate::upload::UploadRequest;

#[derive(Debug, Error)]
pub enum CatalogError {
  #[error("invalid base URL '{url}': {reason}")]
  BaseUrl { url: String, reason: String },
  #[error("request failed: {0}")]
  Transport(#[from] reqwest::Error),
  #[error("server returned {0}")]
  Status(StatusCode),
  #[error("unexpected response format")]
  UnexpectedShape,
  #[error("failed to read {}: {source}", .path.display())]
  File { path: PathBuf, source: std::io::Error },
  #[error("{0}")]
  Validation(&'static str),
  #[error("request task ended without a response")]
  Aborted,
}

impl CatalogError {
  /// Shape mismatches are recovered as an empty result on the search path.
  pub fn is_shape(&self) -> bool {
    matches!(self, CatalogError::UnexpectedShape)
  }
}

/// Pull the record list out of a decoded response body.
///
/// `/api/videos` wraps the list as `{"videos": [...]}` while `/api/search`
/// returns the bare array, so the caller says which one it asked for.
/// Only a non-array is a shape error; records that don't decode are skipped.
pub fn unwrap_listing(mut body: Value, filtered: bool) -> Result<Vec<VideoRecord>, CatalogError> {
  let list = if filtered { body } else { body.get_mut("videos").map(Value::take).unwrap_or(Value::Null) };
  let Value::Array(items) = list else {
    return Err(CatalogError::UnexpectedShape);
  };
  let videos = items
    .into_iter()
    .enumerate()
    .filter_map(|(index, item)| match serde_json::from_value::<RawVideo>(item) {
      Ok(raw) => Some(VideoRecord::from(raw)),
      Err(e) => {
        warn!(index, err = %e, "skipping malformed video record");
        None
      }
    })
    .collect();
  Ok(videos)
}

/// Content type sent with the uploaded file, picked from its extension.
fn video_mime(path: &Path) -> &'static str {
  let ext = path.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase);
  match ext.as_deref() {
    Some("mp4" | "m4v") => "video/mp4",
    Some("webm") => "video/webm",
    Some("mov") => "video/quicktime",
    Some("mkv") => "video/x-matroska",
    Some("avi") => "video/x-msvideo",
    Some("ogv") => "video/ogg",
    _ => "application/octet-stream",
  }
}

/// Thin client for the catalog service. Cheap to clone into spawned tasks.
#[derive(Debug, Clone)]
pub struct CatalogClient {
  http: Client,
  base: Url,
}

impl CatalogClient {
  pub fn new(base_url: &str) -> Result<Self, CatalogError> {
    let base = Url::parse(base_url)
      .map_err(|e| CatalogError::BaseUrl { url: base_url.to_string(), reason: e.to_string() })?;
    if base.cannot_be_a_base() {
      return Err(CatalogError::BaseUrl { url: base_url.to_string(), reason: "not a base URL".to_string() });
    }
    Ok(Self { http: Client::new(), base })
  }

  fn endpoint(&self, path: &str) -> Result<Url, CatalogError> {
    self.base.join(path).map_err(|e| CatalogError::BaseUrl { url: self.base.to_string(), reason: e.to_string() })
  }

  /// Resolve a record's relative path against the API origin.
  pub fn media_url(&self, record: &VideoRecord) -> Result<Url, CatalogError> {
    self.endpoint(&record.url)
  }

  async fn get_json(&self, url: Url) -> Result<Value, CatalogError> {
    debug!(url = %url, "GET");
    let response = self.http.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
      return Err(CatalogError::Status(status));
    }
    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|_| CatalogError::UnexpectedShape)
  }

  /// Fetch the whole catalog.
  pub async fn list_videos(&self) -> Result<Vec<VideoRecord>, CatalogError> {
    let body = self.get_json(self.endpoint("/api/videos")?).await?;
    let videos = unwrap_listing(body, false)?;
    info!(count = videos.len(), "fetched catalog");
    Ok(videos)
  }

  /// Fetch the videos matching `query`. An empty query is the full catalog.
  pub async fn search(&self, query: &str) -> Result<Vec<VideoRecord>, CatalogError> {
    if query.is_empty() {
      return self.list_videos().await;
    }
    let mut url = self.endpoint("/api/search")?;
    url.query_pairs_mut().append_pair("q", query);
    let body = self.get_json(url).await?;
    let videos = unwrap_listing(body, true)?;
    info!(query = %query, count = videos.len(), "search results");
    Ok(videos)
  }

  /// POST a new video as `multipart/form-data`.
  pub async fn upload(&self, request: &UploadRequest) -> Result<(), CatalogError> {
    let file_err = |source| CatalogError::File { path: request.file.clone(), source };
    let file = tokio::fs::File::open(&request.file).await.map_err(file_err)?;
    let size = file.metadata().await.map_err(file_err)?.len();
    let file_name = request.file.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();

    // Streamed from disk; videos can be large.
    let video = multipart::Part::stream_with_length(reqwest::Body::from(file), size)
      .file_name(file_name.clone())
      .mime_str(video_mime(&request.file))?;
    let form = multipart::Form::new()
      .text("title", request.title.clone())
      .text("description", request.description.clone())
      .part("video", video);

    info!(title = %request.title, file = %file_name, bytes = size, "uploading video");
    let response = self.http.post(self.endpoint("/api/upload")?).multipart(form).send().await?;
    let status = response.status();
    if !status.is_success() {
      return Err(CatalogError::Status(status));
    }
    Ok(())
  }
}
