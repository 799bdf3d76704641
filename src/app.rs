use anyhow::Result;
use ratatui::widgets::ListState;
use std::time::Instant;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::api::{CatalogClient, CatalogError};
use crate::catalog::{CatalogState, PageSlice, VideoRecord};
use crate::config::Config;
use crate::constants::constants;
use crate::debounce::Debouncer;
use crate::player::{PlaybackSource, PlayerEvent, PlayerOptions, VideoPlayer};
use crate::theme::{THEMES, theme_index};
use crate::upload::UploadForm;

// --- Types ---

pub type FetchResult = Result<Vec<VideoRecord>, CatalogError>;
pub type UploadResult = Result<(), CatalogError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
  /// Typing in the search box.
  Input,
  /// Moving through the title list.
  Titles,
  /// Upload modal has focus.
  Upload,
}

/// Which endpoint a fetch went to. Decides how failures are recovered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchKind {
  Catalog,
  Search(String),
}

/// The most recently issued catalog/search request.
pub(crate) struct PendingFetch {
  pub(crate) seq: u64,
  pub(crate) kind: FetchKind,
  pub(crate) rx: oneshot::Receiver<FetchResult>,
  pub(crate) handle: JoinHandle<()>,
}

/// An upload in flight, tagged with the form that sent it.
pub(crate) struct PendingUpload {
  pub(crate) form_id: u64,
  pub(crate) rx: oneshot::Receiver<UploadResult>,
}

/// In-flight async task receivers and handles.
#[derive(Default)]
pub(crate) struct AsyncTasks {
  pub(crate) fetch: Option<PendingFetch>,
  pub(crate) upload: Option<PendingUpload>,
}

pub struct App {
  pub client: CatalogClient,
  pub catalog: CatalogState,
  pub mode: AppMode,
  pub theme_index: usize,
  /// Search box contents; updated on every keystroke.
  pub input: String,
  pub cursor_position: usize,
  pub input_scroll: usize,
  /// Keyboard cursor within the visible page (not the playing selection).
  pub list_state: ListState,
  /// `Some` while the upload modal is open.
  pub upload: Option<UploadForm>,
  pub player: VideoPlayer,
  pub last_error: Option<String>,
  pub status_message: Option<String>,
  pub should_quit: bool,
  debouncer: Debouncer,
  search_rx: mpsc::UnboundedReceiver<String>,
  /// Sequence number of the latest fetch issued. Only its response is applied.
  fetch_seq: u64,
  /// Bumped each time a fresh upload form is opened.
  upload_form_id: u64,
  pub(crate) tasks: AsyncTasks,
  config: Config,
  /// When the last error was set — used for auto-dismiss.
  error_time: Option<Instant>,
}

impl App {
  pub fn new(client: CatalogClient, page_size: usize, config: Config) -> Self {
    let (debouncer, search_rx) = Debouncer::new(constants().debounce_window());
    Self {
      client,
      catalog: CatalogState::new(page_size),
      mode: AppMode::Input,
      theme_index: theme_index(config.theme_name.as_deref()),
      input: String::new(),
      cursor_position: 0,
      input_scroll: 0,
      list_state: ListState::default(),
      upload: None,
      player: VideoPlayer::new(PlayerOptions::default()),
      last_error: None,
      status_message: None,
      should_quit: false,
      debouncer,
      search_rx,
      fetch_seq: 0,
      upload_form_id: 0,
      tasks: AsyncTasks::default(),
      config,
      error_time: None,
    }
  }

  pub fn theme(&self) -> &'static crate::theme::Theme {
    // Safety: theme_index is always bounded by modular arithmetic in next_theme()
    // and by theme_index() on initialization.
    &THEMES[self.theme_index]
  }

  pub fn next_theme(&mut self) {
    self.theme_index = (self.theme_index + 1) % THEMES.len();
    self.config.theme_name = Some(self.theme().name.to_string());
    self.config.save();
  }

  /// Set an error message with auto-dismiss tracking.
  pub fn set_error(&mut self, msg: String) {
    self.last_error = Some(msg);
    self.error_time = Some(Instant::now());
  }

  /// Clear the current error message and its expiry timer.
  pub fn clear_error(&mut self) {
    self.last_error = None;
    self.error_time = None;
  }

  /// Clear stale error messages.
  pub fn expire_error(&mut self) {
    if let Some(t) = self.error_time
      && t.elapsed() >= constants().error_dismiss()
    {
      self.last_error = None;
      self.error_time = None;
    }
  }

  pub fn is_fetching(&self) -> bool {
    self.tasks.fetch.is_some()
  }

  pub fn is_uploading(&self) -> bool {
    self.tasks.upload.is_some()
  }

  // --- Catalog ---

  /// Request the full catalog.
  pub fn load_catalog(&mut self) {
    self.start_fetch(FetchKind::Catalog);
  }

  /// Request videos matching `query`; an empty query reloads the catalog.
  pub fn search(&mut self, query: String) {
    if query.is_empty() {
      self.load_catalog();
    } else {
      self.start_fetch(FetchKind::Search(query));
    }
  }

  fn start_fetch(&mut self, kind: FetchKind) {
    if let Some(old) = self.tasks.fetch.take() {
      debug!(seq = old.seq, "superseding in-flight fetch");
      old.handle.abort();
    }
    self.fetch_seq += 1;
    let seq = self.fetch_seq;
    info!(seq, kind = ?kind, "fetch triggered");

    self.status_message = Some(match &kind {
      FetchKind::Catalog => "Loading videos…".to_string(),
      FetchKind::Search(q) => format!("Searching '{}'…", q),
    });

    let client = self.client.clone();
    let task_kind = kind.clone();
    let (tx, rx) = oneshot::channel();
    let handle = tokio::spawn(async move {
      let result = match task_kind {
        FetchKind::Catalog => client.list_videos().await,
        FetchKind::Search(q) => client.search(&q).await,
      };
      let _ = tx.send(result);
    });
    self.tasks.fetch = Some(PendingFetch { seq, kind, rx, handle });
  }

  /// Apply a fetch response, unless a newer request has been issued since.
  pub(crate) fn apply_fetch(&mut self, seq: u64, kind: FetchKind, result: FetchResult) {
    if seq != self.fetch_seq {
      debug!(seq, latest = self.fetch_seq, "dropping superseded response");
      return;
    }
    self.status_message = None;
    match (kind, result) {
      (_, Ok(videos)) => {
        debug!(count = videos.len(), "replacing catalog");
        self.catalog.replace(videos);
        self.reset_list_cursor();
      }
      (FetchKind::Search(query), Err(e)) if e.is_shape() => {
        warn!(query = %query, "unexpected search response format; showing no results");
        self.catalog.clear();
        self.reset_list_cursor();
      }
      (FetchKind::Catalog, Err(e)) => {
        error!(err = %e, "error fetching videos");
        self.set_error(format!("Failed to load videos: {}", e));
      }
      (FetchKind::Search(query), Err(e)) => {
        error!(err = %e, query = %query, "error searching videos");
        self.set_error(format!("Search failed: {}", e));
      }
    }
  }

  pub fn select_video(&mut self, video: VideoRecord) {
    debug!(id = %video.id, "video selected");
    self.catalog.select_video(video);
  }

  pub fn set_page(&mut self, page: usize) {
    self.catalog.set_page(page);
    self.reset_list_cursor();
  }

  pub fn page_slice(&self) -> PageSlice<'_> {
    self.catalog.page_slice()
  }

  fn reset_list_cursor(&mut self) {
    let first = if self.page_slice().items.is_empty() { None } else { Some(0) };
    self.list_state.select(first);
  }

  /// The video under the list cursor on the current page.
  pub fn cursor_video(&self) -> Option<&VideoRecord> {
    self.list_state.selected().and_then(|i| self.page_slice().items.get(i))
  }

  // --- Search box ---

  /// Feed the current search text to the debouncer.
  pub fn on_query_edited(&mut self) {
    self.debouncer.push(self.input.clone());
  }

  /// Search immediately, skipping the quiescence window.
  pub fn submit_query_now(&mut self) {
    self.debouncer.cancel();
    self.search(self.input.clone());
  }

  /// Latest value the debouncer has emitted since the last call.
  pub fn take_debounced_query(&mut self) -> Option<String> {
    let mut latest = None;
    while let Ok(query) = self.search_rx.try_recv() {
      latest = Some(query);
    }
    latest
  }

  // --- Upload modal ---

  pub fn open_upload(&mut self) {
    if self.upload.is_none() {
      self.upload_form_id += 1;
      self.upload = Some(UploadForm::default());
    }
    self.mode = AppMode::Upload;
  }

  pub fn close_upload(&mut self, did_succeed: bool) {
    self.upload = None;
    if self.mode == AppMode::Upload {
      self.mode = AppMode::Input;
    }
    if did_succeed {
      info!("upload finished; refreshing catalog");
      self.load_catalog();
    }
  }

  /// Validate the form and, if complete, send it in the background.
  pub fn submit_upload(&mut self) {
    let Some(form) = self.upload.as_mut() else { return };
    if self.tasks.upload.is_some() {
      form.message = Some("Previous upload is still in progress".to_string());
      return;
    }
    let request = match form.begin_submit() {
      Ok(Some(request)) => request,
      Ok(None) => return,
      Err(e) => {
        warn!(err = %e, "upload rejected before sending");
        return;
      }
    };

    let client = self.client.clone();
    let (tx, rx) = oneshot::channel();
    tokio::spawn(async move {
      let _ = tx.send(client.upload(&request).await);
    });
    self.tasks.upload = Some(PendingUpload { form_id: self.upload_form_id, rx });
  }

  /// Settle an upload. Only the form that sent it is updated or closed; if
  /// the user has since closed or reopened the modal, the new form is left alone.
  fn finish_upload(&mut self, form_id: u64, result: UploadResult) {
    let same_form = self.upload.is_some() && form_id == self.upload_form_id;
    if same_form && let Some(form) = self.upload.as_mut() {
      form.finish(&result);
    }
    match result {
      Ok(()) if same_form => self.close_upload(true),
      Ok(()) => {
        info!("background upload finished; refreshing catalog");
        self.load_catalog();
      }
      Err(e) => {
        error!(err = %e, "error uploading video");
        if !same_form {
          self.set_error(format!("Upload failed: {}", e));
        }
      }
    }
  }

  // --- Playback ---

  fn wanted_source(&self) -> Option<PlaybackSource> {
    let video = self.catalog.current_video()?;
    match self.client.media_url(video) {
      Ok(src) => Some(PlaybackSource {
        src: src.to_string(),
        title: video.name.clone(),
        description: video.description.clone(),
      }),
      Err(e) => {
        warn!(err = %e, url = %video.url, "cannot resolve media URL");
        None
      }
    }
  }

  pub async fn play_current(&mut self) {
    if let Err(e) = self.player.play().await {
      self.set_error(format!("Playback error: {}", e));
      let _ = self.player.stop().await;
    }
  }

  // --- Polling ---

  pub async fn check_pending(&mut self) -> Result<()> {
    if let Some(query) = self.take_debounced_query() {
      self.search(query);
    }

    if let Some(mut pending) = self.tasks.fetch.take() {
      match pending.rx.try_recv() {
        Ok(result) => {
          self.apply_fetch(pending.seq, pending.kind, result);
        }
        Err(oneshot::error::TryRecvError::Empty) => {
          self.tasks.fetch = Some(pending);
        }
        Err(oneshot::error::TryRecvError::Closed) => {
          self.status_message = None;
          self.set_error("Fetch task failed.".to_string());
        }
      }
    }

    if let Some(mut pending) = self.tasks.upload.take() {
      match pending.rx.try_recv() {
        Ok(result) => self.finish_upload(pending.form_id, result),
        Err(oneshot::error::TryRecvError::Empty) => {
          self.tasks.upload = Some(pending);
        }
        Err(oneshot::error::TryRecvError::Closed) => {
          self.finish_upload(pending.form_id, Err(CatalogError::Aborted));
        }
      }
    }

    let wanted = self.wanted_source();
    if let Err(e) = self.player.load(wanted).await {
      self.set_error(format!("Playback error: {}", e));
    }
    for event in self.player.poll_events() {
      if let PlayerEvent::Ready { src, pid } = event {
        info!(src = %src, pid = ?pid, "player ready");
      }
    }

    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::{Value, json};
  use std::time::Duration;
  use wiremock::matchers::{method, path, query_param};
  use wiremock::{Mock, MockServer, ResponseTemplate};

  fn raw(id: &str, title: &str) -> Value {
    json!({ "_id": id, "title": title, "filename": format!("{id}.mp4"), "description": "" })
  }

  fn catalog_body(n: usize) -> Value {
    let videos: Vec<Value> = (0..n).map(|i| raw(&format!("v{i}"), &format!("Video {i}"))).collect();
    json!({ "videos": videos })
  }

  fn make_app(base: &str) -> App {
    App::new(CatalogClient::new(base).unwrap(), 5, Config::default())
  }

  /// Poll until no fetch or upload is in flight.
  async fn settle(app: &mut App) {
    tokio::time::timeout(Duration::from_secs(5), async {
      loop {
        app.check_pending().await.unwrap();
        if !app.is_fetching() && !app.is_uploading() {
          break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
      }
    })
    .await
    .expect("app did not settle");
  }

  async fn mount_catalog(server: &MockServer, n: usize) {
    Mock::given(method("GET"))
      .and(path("/api/videos"))
      .respond_with(ResponseTemplate::new(200).set_body_json(catalog_body(n)))
      .mount(server)
      .await;
  }

  fn names(app: &App) -> Vec<String> {
    app.catalog.videos().iter().map(|v| v.name.clone()).collect()
  }

  // --- load_catalog ---

  #[tokio::test]
  async fn load_selects_first_video() {
    let server = MockServer::start().await;
    mount_catalog(&server, 7).await;
    let mut app = make_app(&server.uri());

    app.load_catalog();
    settle(&mut app).await;

    assert_eq!(app.catalog.videos().len(), 7);
    assert_eq!(app.catalog.current_video().map(|v| v.name.as_str()), Some("Video 0"));
    assert_eq!(app.page_slice().items.len(), 5);
    assert_eq!(app.page_slice().total_pages, 2);
    assert_eq!(app.list_state.selected(), Some(0));
    assert!(app.status_message.is_none());
  }

  #[tokio::test]
  async fn empty_catalog_has_no_selection() {
    let server = MockServer::start().await;
    mount_catalog(&server, 0).await;
    let mut app = make_app(&server.uri());

    app.load_catalog();
    settle(&mut app).await;

    assert!(app.catalog.current_video().is_none());
    assert!(app.page_slice().items.is_empty());
    assert_eq!(app.list_state.selected(), None);
  }

  #[tokio::test]
  async fn failed_reload_keeps_previous_state() {
    let server = MockServer::start().await;
    mount_catalog(&server, 3).await;
    let mut app = make_app(&server.uri());
    app.load_catalog();
    settle(&mut app).await;

    server.reset().await;
    Mock::given(method("GET")).and(path("/api/videos")).respond_with(ResponseTemplate::new(500)).mount(&server).await;
    app.load_catalog();
    settle(&mut app).await;

    assert_eq!(app.catalog.videos().len(), 3);
    assert!(app.catalog.current_video().is_some());
    assert!(app.last_error.is_some());
  }

  #[tokio::test]
  async fn malformed_catalog_keeps_previous_state() {
    let server = MockServer::start().await;
    mount_catalog(&server, 2).await;
    let mut app = make_app(&server.uri());
    app.load_catalog();
    settle(&mut app).await;

    server.reset().await;
    Mock::given(method("GET"))
      .and(path("/api/videos"))
      .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "items": [] })))
      .mount(&server)
      .await;
    app.load_catalog();
    settle(&mut app).await;

    assert_eq!(app.catalog.videos().len(), 2);
  }

  // --- search ---

  #[tokio::test]
  async fn search_replaces_list_and_empty_query_restores() {
    let server = MockServer::start().await;
    mount_catalog(&server, 6).await;
    Mock::given(method("GET"))
      .and(path("/api/search"))
      .and(query_param("q", "cat"))
      .respond_with(ResponseTemplate::new(200).set_body_json(json!([raw("c1", "Cat One"), raw("c2", "Cat Two")])))
      .mount(&server)
      .await;
    let mut app = make_app(&server.uri());

    app.search("cat".to_string());
    settle(&mut app).await;
    assert_eq!(names(&app), vec!["Cat One", "Cat Two"]);
    assert_eq!(app.catalog.current_video().map(|v| v.id.as_str()), Some("c1"));

    app.search(String::new());
    settle(&mut app).await;
    assert_eq!(app.catalog.videos().len(), 6);
    assert_eq!(app.catalog.current_video().map(|v| v.name.as_str()), Some("Video 0"));
  }

  #[tokio::test]
  async fn empty_search_result_clears_selection() {
    let server = MockServer::start().await;
    mount_catalog(&server, 3).await;
    Mock::given(method("GET"))
      .and(path("/api/search"))
      .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
      .mount(&server)
      .await;
    let mut app = make_app(&server.uri());
    app.load_catalog();
    settle(&mut app).await;

    app.search("zzz".to_string());
    settle(&mut app).await;
    assert!(app.catalog.videos().is_empty());
    assert!(app.catalog.current_video().is_none());
  }

  #[tokio::test]
  async fn malformed_search_yields_empty_list() {
    let server = MockServer::start().await;
    mount_catalog(&server, 3).await;
    Mock::given(method("GET"))
      .and(path("/api/search"))
      .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "videos": [raw("x", "X")] })))
      .mount(&server)
      .await;
    let mut app = make_app(&server.uri());
    app.load_catalog();
    settle(&mut app).await;

    app.search("x".to_string());
    settle(&mut app).await;
    assert!(app.catalog.videos().is_empty());
    assert!(app.catalog.current_video().is_none());
    assert!(app.last_error.is_none());
  }

  #[tokio::test]
  async fn incomplete_search_record_keeps_the_rest() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
      .and(path("/api/search"))
      .respond_with(
        ResponseTemplate::new(200).set_body_json(json!([raw("a", "Alpha"), { "_id": "b", "title": "Beta" }])),
      )
      .mount(&server)
      .await;
    let mut app = make_app(&server.uri());

    app.search("a".to_string());
    settle(&mut app).await;
    assert_eq!(names(&app), vec!["Alpha"]);
    assert_eq!(app.catalog.current_video().map(|v| v.id.as_str()), Some("a"));
    assert!(app.last_error.is_none());
  }

  #[tokio::test]
  async fn slow_catalog_cannot_overwrite_newer_search() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
      .and(path("/api/videos"))
      .respond_with(ResponseTemplate::new(200).set_body_json(catalog_body(4)).set_delay(Duration::from_millis(300)))
      .mount(&server)
      .await;
    Mock::given(method("GET"))
      .and(path("/api/search"))
      .respond_with(ResponseTemplate::new(200).set_body_json(json!([raw("s", "Searched")])))
      .mount(&server)
      .await;
    let mut app = make_app(&server.uri());

    app.load_catalog();
    app.search("s".to_string());
    settle(&mut app).await;
    tokio::time::sleep(Duration::from_millis(400)).await;
    app.check_pending().await.unwrap();

    assert_eq!(names(&app), vec!["Searched"]);
  }

  #[tokio::test]
  async fn stale_sequence_number_is_ignored() {
    let mut app = make_app("http://127.0.0.1:9");
    app.load_catalog();
    app.search("newer".to_string());
    let stale = vec![VideoRecord {
      id: "old".to_string(),
      name: "Old".to_string(),
      url: "/videos/old.mp4".to_string(),
      description: String::new(),
    }];

    app.apply_fetch(1, FetchKind::Catalog, Ok(stale.clone()));
    assert!(app.catalog.videos().is_empty());

    app.apply_fetch(2, FetchKind::Search("newer".to_string()), Ok(stale));
    assert_eq!(names(&app), vec!["Old"]);
  }

  // --- selection & paging ---

  #[tokio::test]
  async fn select_and_page_do_not_fetch() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
      .and(path("/api/videos"))
      .respond_with(ResponseTemplate::new(200).set_body_json(catalog_body(12)))
      .expect(1)
      .mount(&server)
      .await;
    let mut app = make_app(&server.uri());
    app.load_catalog();
    settle(&mut app).await;

    app.set_page(3);
    assert_eq!(app.page_slice().items.len(), 2);
    assert_eq!(app.cursor_video().map(|v| v.name.as_str()), Some("Video 10"));

    let pick = app.page_slice().items[1].clone();
    app.select_video(pick);
    assert_eq!(app.catalog.current_video().map(|v| v.name.as_str()), Some("Video 11"));
    assert!(!app.is_fetching());
    settle(&mut app).await;
    assert_eq!(app.player.source().map(|s| s.src.clone()), Some(format!("{}/videos/v11.mp4", server.uri())));
  }

  // --- debounced search box ---

  #[tokio::test(start_paused = true)]
  async fn typing_burst_debounces_to_final_query() {
    let mut app = make_app("http://127.0.0.1:9");
    for (i, c) in "cat".chars().enumerate() {
      if i > 0 {
        tokio::time::advance(Duration::from_millis(50)).await;
      }
      app.input.push(c);
      app.on_query_edited();
    }
    assert_eq!(app.take_debounced_query(), None);

    tokio::time::sleep(Duration::from_millis(350)).await;
    assert_eq!(app.take_debounced_query(), Some("cat".to_string()));
    assert_eq!(app.take_debounced_query(), None);
  }

  #[tokio::test(start_paused = true)]
  async fn clearing_the_box_emits_empty_query() {
    let mut app = make_app("http://127.0.0.1:9");
    app.input = "dog".to_string();
    app.on_query_edited();
    app.input.clear();
    app.on_query_edited();
    tokio::time::sleep(Duration::from_millis(350)).await;
    assert_eq!(app.take_debounced_query(), Some(String::new()));
  }

  // --- upload ---

  fn temp_video() -> tempfile::NamedTempFile {
    use std::io::Write;
    let mut file = tempfile::Builder::new().suffix(".mp4").tempfile().unwrap();
    file.write_all(b"demo bytes").unwrap();
    file
  }

  #[tokio::test]
  async fn successful_upload_closes_modal_and_refreshes() {
    let server = MockServer::start().await;
    Mock::given(method("POST")).and(path("/api/upload")).respond_with(ResponseTemplate::new(200)).expect(1).mount(&server).await;
    Mock::given(method("GET"))
      .and(path("/api/videos"))
      .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "videos": [raw("demo", "Demo")] })))
      .expect(1)
      .mount(&server)
      .await;
    let mut app = make_app(&server.uri());
    let file = temp_video();

    app.open_upload();
    let form = app.upload.as_mut().unwrap();
    form.title = "Demo".to_string();
    form.select_file(file.path()).unwrap();
    app.submit_upload();
    assert!(app.upload.as_ref().unwrap().is_submitting());

    settle(&mut app).await;
    assert!(app.upload.is_none());
    assert_eq!(app.mode, AppMode::Input);
    assert_eq!(names(&app), vec!["Demo"]);
  }

  #[tokio::test]
  async fn upload_without_title_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("POST")).respond_with(ResponseTemplate::new(200)).expect(0).mount(&server).await;
    let mut app = make_app(&server.uri());
    let file = temp_video();

    app.open_upload();
    app.upload.as_mut().unwrap().select_file(file.path()).unwrap();
    app.submit_upload();

    assert!(!app.is_uploading());
    let form = app.upload.as_ref().unwrap();
    assert!(!form.is_submitting());
    assert!(form.message.is_some());
  }

  #[tokio::test]
  async fn failed_upload_keeps_modal_open() {
    let server = MockServer::start().await;
    Mock::given(method("POST")).and(path("/api/upload")).respond_with(ResponseTemplate::new(413)).mount(&server).await;
    Mock::given(method("GET")).and(path("/api/videos")).respond_with(ResponseTemplate::new(200)).expect(0).mount(&server).await;
    let mut app = make_app(&server.uri());
    let file = temp_video();

    app.open_upload();
    let form = app.upload.as_mut().unwrap();
    form.title = "Demo".to_string();
    form.select_file(file.path()).unwrap();
    app.submit_upload();
    settle(&mut app).await;

    let form = app.upload.as_ref().unwrap();
    assert_eq!(form.title, "Demo");
    assert!(!form.is_submitting());
    assert!(form.message.as_deref().unwrap().contains("413"));
    assert_eq!(app.mode, AppMode::Upload);
  }

  #[tokio::test]
  async fn finished_upload_leaves_reopened_form_alone() {
    let server = MockServer::start().await;
    Mock::given(method("POST")).and(path("/api/upload")).respond_with(ResponseTemplate::new(200)).expect(1).mount(&server).await;
    Mock::given(method("GET"))
      .and(path("/api/videos"))
      .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "videos": [raw("first", "First")] })))
      .expect(1)
      .mount(&server)
      .await;
    let mut app = make_app(&server.uri());
    let file = temp_video();

    app.open_upload();
    let form = app.upload.as_mut().unwrap();
    form.title = "First".to_string();
    form.select_file(file.path()).unwrap();
    app.submit_upload();
    app.close_upload(false);

    app.open_upload();
    let form = app.upload.as_mut().unwrap();
    form.title = "Second draft".to_string();
    form.select_file(file.path()).unwrap();
    app.submit_upload();
    assert_eq!(app.upload.as_ref().unwrap().message.as_deref(), Some("Previous upload is still in progress"));

    settle(&mut app).await;
    let form = app.upload.as_ref().expect("reopened form kept");
    assert_eq!(form.title, "Second draft");
    assert!(!form.is_submitting());
    assert_eq!(app.mode, AppMode::Upload);
    assert_eq!(names(&app), vec!["First"]);
  }

  #[tokio::test]
  async fn closing_without_upload_does_not_refresh() {
    let mut app = make_app("http://127.0.0.1:9");
    app.open_upload();
    app.close_upload(false);
    assert!(app.upload.is_none());
    assert!(!app.is_fetching());
  }
}
