//! Upload modal state.
//!
//! The form only knows about its own fields and phase; the network call is
//! made by `App`, which feeds the outcome back through `finish`.

use std::path::{Path, PathBuf};

use crate::api::CatalogError;
use crate::constants::constants;

/// What gets sent to `POST /api/upload`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
  pub title: String,
  pub description: String,
  pub file: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadPhase {
  Idle,
  Submitting,
}

/// Which text field has the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadField {
  Title,
  Description,
  File,
}

impl UploadField {
  pub fn next(self) -> Self {
    match self {
      UploadField::Title => UploadField::Description,
      UploadField::Description => UploadField::File,
      UploadField::File => UploadField::Title,
    }
  }

  pub fn prev(self) -> Self {
    match self {
      UploadField::Title => UploadField::File,
      UploadField::Description => UploadField::Title,
      UploadField::File => UploadField::Description,
    }
  }
}

pub struct UploadForm {
  pub title: String,
  pub description: String,
  /// Path being typed into the file field; becomes `file` once selected.
  pub path_input: String,
  pub file: Option<PathBuf>,
  pub label: String,
  pub focus: UploadField,
  pub phase: UploadPhase,
  /// Validation or server message shown inside the modal.
  pub message: Option<String>,
}

impl Default for UploadForm {
  fn default() -> Self {
    Self {
      title: String::new(),
      description: String::new(),
      path_input: String::new(),
      file: None,
      label: constants().upload_label.clone(),
      focus: UploadField::Title,
      phase: UploadPhase::Idle,
      message: None,
    }
  }
}

impl UploadForm {
  pub fn is_submitting(&self) -> bool {
    self.phase == UploadPhase::Submitting
  }

  /// The text buffer behind the focused field.
  pub fn focused_text_mut(&mut self) -> &mut String {
    match self.focus {
      UploadField::Title => &mut self.title,
      UploadField::Description => &mut self.description,
      UploadField::File => &mut self.path_input,
    }
  }

  /// Pick `path` as the video to upload. Only existing regular files are
  /// accepted; anything else leaves the previous selection in place.
  pub fn select_file(&mut self, path: &Path) -> Result<(), String> {
    if !path.is_file() {
      return Err(format!("No such file: {}", path.display()));
    }
    let name = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
    self.label = format!("Your Video: {}", name);
    self.file = Some(path.to_path_buf());
    self.message = None;
    Ok(())
  }

  /// Select whatever path has been typed into the file field.
  pub fn select_typed_file(&mut self) -> Result<(), String> {
    let typed = self.path_input.trim().to_string();
    if typed.is_empty() {
      return Err("Type the path of a video file.".to_string());
    }
    self.select_file(Path::new(&typed))
  }

  /// Move `Idle -> Submitting` if the form is complete.
  ///
  /// Returns the request to send, or the validation error that kept the
  /// form idle. While already submitting nothing new is produced.
  pub fn begin_submit(&mut self) -> Result<Option<UploadRequest>, CatalogError> {
    if self.is_submitting() {
      return Ok(None);
    }
    let Some(file) = self.file.clone().filter(|_| !self.title.is_empty()) else {
      let err = CatalogError::Validation("Please enter a title and select a video file");
      self.message = Some(err.to_string());
      return Err(err);
    };
    self.phase = UploadPhase::Submitting;
    self.message = None;
    Ok(Some(UploadRequest { title: self.title.clone(), description: self.description.clone(), file }))
  }

  /// Record the server's answer. Fields are wiped only on success so a
  /// failed upload can be retried as-is.
  pub fn finish(&mut self, result: &Result<(), CatalogError>) {
    self.phase = UploadPhase::Idle;
    match result {
      Ok(()) => *self = Self::default(),
      Err(e) => self.message = Some(format!("Upload failed: {}", e)),
    }
  }
}
