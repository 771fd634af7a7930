//! Filesystem implementation of the asset-store capability.
//!
//! Files are named `contact_{id}_{hash}.img` where `hash` is a sha-256
//! prefix of the content; a replaced picture therefore never collides
//! with its predecessor.

use std::path::PathBuf;

use sha2::{Digest as _, Sha256};
use telbook_core::asset::AssetStore;

pub struct FsAssetStore {
  root:        PathBuf,
  public_base: String,
}

impl FsAssetStore {
  pub fn new(root: impl Into<PathBuf>, public_base: impl Into<String>) -> Self {
    let public_base = public_base.into().trim_end_matches('/').to_string();
    Self { root: root.into(), public_base }
  }

  fn file_name(bytes: &[u8], key: &str) -> String {
    let digest = Sha256::digest(bytes);
    format!("contact_{key}_{}.img", hex::encode(&digest[..8]))
  }
}

impl AssetStore for FsAssetStore {
  async fn store(&self, bytes: &[u8], key: &str) -> Option<String> {
    let name = Self::file_name(bytes, key);
    let path = self.root.join(&name);

    if let Err(e) = tokio::fs::create_dir_all(&self.root).await {
      tracing::warn!(error = %e, "could not create asset directory");
      return None;
    }
    match tokio::fs::write(&path, bytes).await {
      Ok(()) => Some(format!("{}/{name}", self.public_base)),
      Err(e) => {
        tracing::warn!(error = %e, asset = %name, "could not write asset");
        None
      }
    }
  }

  async fn delete(&self, url: &str) -> bool {
    // Only URLs this store issued resolve to a file.
    let Some(rest) = url.strip_prefix(&self.public_base) else {
      return false;
    };
    let name = rest.trim_start_matches('/');
    if name.is_empty() || name.contains('/') || name.contains("..") {
      return false;
    }
    tokio::fs::remove_file(self.root.join(name)).await.is_ok()
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn store_then_delete_roundtrip() {
    let dir = std::env::temp_dir().join("telbook-asset-test");
    let assets = FsAssetStore::new(&dir, "/assets/");

    let url = assets.store(b"pixels", "0001").await.unwrap();
    assert!(url.starts_with("/assets/contact_0001_"));

    assert!(assets.delete(&url).await);
    assert!(!assets.delete(&url).await);
  }

  #[tokio::test]
  async fn foreign_urls_are_refused() {
    let dir = std::env::temp_dir().join("telbook-asset-test-foreign");
    let assets = FsAssetStore::new(&dir, "/assets");

    assert!(!assets.delete("https://elsewhere.example/x.png").await);
    assert!(!assets.delete("/assets/../../etc/passwd").await);
  }
}
