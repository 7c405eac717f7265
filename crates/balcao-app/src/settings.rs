//! Runtime configuration.
//!
//! Sources, lowest precedence first: built-in defaults, an optional TOML
//! file, then `BALCAO_*` environment variables.

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

pub const ENV_PREFIX: &str = "BALCAO";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
  /// Directory holding the database and the side-car files.
  pub data_dir:        PathBuf,
  pub database_file:   PathBuf,
  pub status_file:     PathBuf,
  pub categories_file: PathBuf,
  /// `EnvFilter` directive used when `RUST_LOG` is unset.
  pub log_filter:      String,
  /// Whether the "all" listing leaves out delivered orders.
  pub hide_completed:  bool,
}

impl Settings {
  /// Load settings, reading `path` if it is given and exists.
  pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
    let mut builder = Config::builder()
      .set_default("data_dir", default_data_dir().to_string_lossy().into_owned())?
      .set_default("database_file", "balcao.db")?
      .set_default("status_file", "status.json")?
      .set_default("categories_file", "categorias.json")?
      .set_default("log_filter", "info")?
      .set_default("hide_completed", true)?;

    if let Some(path) = path {
      builder = builder.add_source(File::from(path).required(false));
    }

    builder
      .add_source(Environment::with_prefix(ENV_PREFIX))
      .build()?
      .try_deserialize()
  }

  /// The data directory with a leading `~` expanded.
  pub fn data_dir(&self) -> PathBuf { expand_tilde(&self.data_dir) }

  pub fn database_path(&self) -> PathBuf { self.resolve(&self.database_file) }

  pub fn status_path(&self) -> PathBuf { self.resolve(&self.status_file) }

  pub fn categories_path(&self) -> PathBuf { self.resolve(&self.categories_file) }

  /// Relative paths live under the data directory.
  fn resolve(&self, path: &Path) -> PathBuf {
    let path = expand_tilde(path);
    if path.is_absolute() {
      path
    } else {
      self.data_dir().join(path)
    }
  }
}

fn home_dir() -> Option<PathBuf> {
  std::env::var_os("HOME")
    .or_else(|| std::env::var_os("USERPROFILE"))
    .filter(|h| !h.is_empty())
    .map(PathBuf::from)
}

/// `~/Documents/Balcao`, or `Balcao` in the working directory when no home
/// directory is known.
pub fn default_data_dir() -> PathBuf {
  match home_dir() {
    Some(home) => home.join("Documents").join("Balcao"),
    None => PathBuf::from("Balcao"),
  }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if s == "~"
    && let Some(home) = home_dir()
  {
    return home;
  }
  if let Some(rest) = s.strip_prefix("~/")
    && let Some(home) = home_dir()
  {
    return home.join(rest);
  }
  path.to_path_buf()
}

#[cfg(test)]
mod tests {
  use super::*;

  fn settings(data_dir: &str) -> Settings {
    Settings {
      data_dir:        data_dir.into(),
      database_file:   "balcao.db".into(),
      status_file:     "status.json".into(),
      categories_file: "/etc/balcao/categorias.json".into(),
      log_filter:      "info".into(),
      hide_completed:  true,
    }
  }

  #[test]
  fn relative_files_resolve_under_data_dir() {
    let s = settings("/srv/balcao");
    assert_eq!(s.database_path(), PathBuf::from("/srv/balcao/balcao.db"));
    assert_eq!(s.status_path(), PathBuf::from("/srv/balcao/status.json"));
    assert_eq!(
      s.categories_path(),
      PathBuf::from("/etc/balcao/categorias.json")
    );
  }

  #[test]
  fn tilde_is_expanded_when_home_is_known() {
    let Some(home) = home_dir() else { return };
    assert_eq!(expand_tilde(Path::new("~/Balcao")), home.join("Balcao"));
    assert_eq!(expand_tilde(Path::new("~")), home);
    assert_eq!(expand_tilde(Path::new("/tmp/x")), PathBuf::from("/tmp/x"));
  }

  #[test]
  fn defaults_apply_without_a_file() {
    let s = Settings::load(None).unwrap();
    assert_eq!(s.database_file, PathBuf::from("balcao.db"));
    assert_eq!(s.status_file, PathBuf::from("status.json"));
    assert_eq!(s.categories_file, PathBuf::from("categorias.json"));
    assert!(s.hide_completed);
  }
}
