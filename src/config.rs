use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::constants::constants;

/// User preferences persisted in `prefs.toml` under the platform config dir.
#[derive(Serialize, Deserialize, Default, Debug, Clone, PartialEq, Eq)]
pub struct Config {
  pub base_url: Option<String>,
  pub page_size: Option<usize>,
  pub theme_name: Option<String>,
}

impl Config {
  pub fn load() -> Self {
    if let Some(proj_dirs) = ProjectDirs::from("", "", "clipcast") {
      let config_file = proj_dirs.config_dir().join("prefs.toml");
      if let Ok(content) = std::fs::read_to_string(&config_file) {
        match Self::parse(&content) {
          Some(config) => return config,
          None => warn!(path = %config_file.display(), "ignoring unreadable prefs.toml"),
        }
      }
    }
    Self::default()
  }

  fn parse(content: &str) -> Option<Self> {
    toml::from_str(content).ok()
  }

  pub fn save(&self) {
    if let Some(proj_dirs) = ProjectDirs::from("", "", "clipcast") {
      let config_dir = proj_dirs.config_dir();
      if std::fs::create_dir_all(config_dir).is_ok() {
        let config_file = config_dir.join("prefs.toml");
        if let Ok(content) = toml::to_string(self)
          && let Err(e) = std::fs::write(&config_file, content)
        {
          warn!(err = %e, path = %config_file.display(), "failed to save prefs.toml");
        }
      }
    }
  }

  /// API origin: CLI flag, then prefs, then the compiled-in default.
  pub fn resolve_base_url(&self, cli: Option<&str>) -> String {
    cli
      .map(str::to_string)
      .or_else(|| self.base_url.clone())
      .unwrap_or_else(|| constants().default_base_url.clone())
  }

  /// Titles per page with the same precedence as `resolve_base_url`.
  /// Zero is never returned.
  pub fn resolve_page_size(&self, cli: Option<usize>) -> usize {
    cli.or(self.page_size).filter(|n| *n > 0).unwrap_or(constants().page_size)
  }
}
