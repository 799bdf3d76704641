//! Application constants loaded from `constants.ron` at compile time.
//!
//! The RON file is embedded via `include_str!` so it's always available —
//! no runtime file I/O. Parsed once on first access via `LazyLock`.

use serde::Deserialize;
use std::sync::LazyLock;
use std::time::Duration;

/// All tuneable application constants.
#[derive(Debug, Deserialize)]
pub struct Constants {
  /// API origin used when neither the CLI nor prefs.toml name one.
  pub default_base_url: String,

  // Catalog browsing
  pub page_size: usize,

  // Search box
  pub debounce_ms: u64,

  // Status line
  pub error_dismiss_secs: u64,

  // Upload modal
  pub upload_label: String,

  // mpv
  pub player_autofit: String,

  // Logging
  pub log_file_prefix: String,
}

impl Constants {
  pub fn debounce_window(&self) -> Duration {
    Duration::from_millis(self.debounce_ms)
  }

  pub fn error_dismiss(&self) -> Duration {
    Duration::from_secs(self.error_dismiss_secs)
  }
}

static CONSTANTS: LazyLock<Constants> = LazyLock::new(|| {
  // Safety: the RON file is embedded at compile time; if it's malformed this is a build-time error.
  ron::from_str(include_str!("../constants.ron")).expect("constants.ron must be valid RON (embedded at compile time)")
});

/// Returns a reference to the parsed application constants.
pub fn constants() -> &'static Constants {
  &CONSTANTS
}
