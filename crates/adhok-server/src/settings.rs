//! Runtime server configuration, deserialised from `config.toml` and
//! `ADHOK_*` environment variables.

use std::path::{Path, PathBuf};

use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
  pub host:            String,
  pub port:            u16,
  pub store_path:      PathBuf,
  /// Header carrying the acting user's id, set by the identity provider.
  pub identity_header: String,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:            "127.0.0.1".to_string(),
      port:            8080,
      store_path:      PathBuf::from("adhok.db"),
      identity_header: "x-adhok-user".to_string(),
    }
  }
}

impl ServerConfig {
  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn empty_source_yields_defaults() {
    let cfg: ServerConfig = config::Config::builder()
      .build()
      .unwrap()
      .try_deserialize()
      .unwrap();
    assert_eq!(cfg.address(), "127.0.0.1:8080");
    assert_eq!(cfg.store_path, PathBuf::from("adhok.db"));
    assert_eq!(cfg.identity_header, "x-adhok-user");
  }

  #[test]
  fn partial_toml_overrides_only_given_keys() {
    let cfg: ServerConfig = config::Config::builder()
      .add_source(config::File::from_str(
        "port = 9000\nidentity_header = \"x-forwarded-user\"",
        config::FileFormat::Toml,
      ))
      .build()
      .unwrap()
      .try_deserialize()
      .unwrap();
    assert_eq!(cfg.port, 9000);
    assert_eq!(cfg.host, "127.0.0.1");
    assert_eq!(cfg.identity_header, "x-forwarded-user");
  }

  #[test]
  fn tilde_is_expanded_only_as_prefix() {
    let plain = Path::new("data/adhok.db");
    assert_eq!(expand_tilde(plain), plain);

    if let Ok(home) = std::env::var("HOME") {
      assert_eq!(
        expand_tilde(Path::new("~/adhok.db")),
        PathBuf::from(home).join("adhok.db")
      );
    }
  }
}
