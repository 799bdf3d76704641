//! In-memory catalog state: the fetched video list, the active selection and
//! the page the list pane is showing.
//!
//! Nothing here touches the network. `App` owns the single `CatalogState` and
//! is the only thing that mutates it.

use serde::Deserialize;

/// A video as the server stores it.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct RawVideo {
  #[serde(rename = "_id")]
  pub id: String,
  pub title: String,
  pub filename: String,
  #[serde(default)]
  pub description: Option<String>,
}

/// A video as the client displays it. `url` is relative to the API origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoRecord {
  pub id: String,
  pub name: String,
  pub url: String,
  pub description: String,
}

impl From<RawVideo> for VideoRecord {
  fn from(raw: RawVideo) -> Self {
    Self {
      id: raw.id,
      name: raw.title,
      url: format!("/videos/{}", raw.filename),
      description: raw.description.unwrap_or_default(),
    }
  }
}

/// One page of the catalog plus the page count it was cut from.
#[derive(Debug, PartialEq, Eq)]
pub struct PageSlice<'a> {
  pub items: &'a [VideoRecord],
  pub total_pages: usize,
}

/// Cut page `page` (1-based) out of `videos`.
///
/// Pages outside `1..=total_pages` give an empty slice rather than panicking,
/// so a page number left over from a longer list is harmless.
pub fn derive_page_slice(videos: &[VideoRecord], page: usize, page_size: usize) -> PageSlice<'_> {
  let page_size = page_size.max(1);
  let total_pages = videos.len().div_ceil(page_size);
  let start = page.saturating_sub(1).saturating_mul(page_size).min(videos.len());
  let end = page.saturating_mul(page_size).min(videos.len());
  PageSlice { items: &videos[start..end], total_pages }
}

#[derive(Debug, Clone)]
pub struct CatalogState {
  videos: Vec<VideoRecord>,
  current_video: Option<VideoRecord>,
  current_page: usize,
  page_size: usize,
}

impl CatalogState {
  pub fn new(page_size: usize) -> Self {
    Self { videos: Vec::new(), current_video: None, current_page: 1, page_size: page_size.max(1) }
  }

  pub fn videos(&self) -> &[VideoRecord] {
    &self.videos
  }

  pub fn current_video(&self) -> Option<&VideoRecord> {
    self.current_video.as_ref()
  }

  pub fn current_page(&self) -> usize {
    self.current_page
  }

  /// Swap in a freshly fetched list. The first video becomes the selection
  /// and the view returns to page 1.
  pub fn replace(&mut self, videos: Vec<VideoRecord>) {
    self.current_video = videos.first().cloned();
    self.videos = videos;
    self.current_page = 1;
  }

  pub fn clear(&mut self) {
    self.replace(Vec::new());
  }

  pub fn select_video(&mut self, video: VideoRecord) {
    self.current_video = Some(video);
  }

  /// Not clamped: the list pane only offers pages that exist.
  pub fn set_page(&mut self, page: usize) {
    self.current_page = page;
  }

  pub fn page_slice(&self) -> PageSlice<'_> {
    derive_page_slice(&self.videos, self.current_page, self.page_size)
  }

  pub fn total_pages(&self) -> usize {
    self.page_slice().total_pages
  }

  /// Selection is compared by `url`, the same key the highlight uses.
  pub fn is_current(&self, video: &VideoRecord) -> bool {
    self.current_video.as_ref().is_some_and(|v| v.url == video.url)
  }
}
