//! Raw profile-picture payloads.
//!
//! Clients may submit `profile_picture` as a `data:image/...;base64,`
//! URI. The bytes go to the asset store and only the returned URL is ever
//! persisted — no binary data lives in the contact collection.

use base64::{Engine as _, engine::general_purpose::STANDARD};
use telbook_core::asset::AssetStore;

const DATA_URI_PREFIX: &str = "data:image/";

pub(crate) fn is_data_uri(value: &str) -> bool {
  value.starts_with(DATA_URI_PREFIX)
}

fn decode_data_uri(value: &str) -> Option<Vec<u8>> {
  let (_, payload) = value.split_once(";base64,")?;
  STANDARD.decode(payload.trim()).ok()
}

/// Decode and file the payload under `contact_id`. Soft-fails to `None`
/// so the surrounding write can proceed with the field unset.
pub(crate) async fn store_data_uri<A: AssetStore>(
  assets: &A,
  contact_id: &str,
  value: &str,
) -> Option<String> {
  let Some(bytes) = decode_data_uri(value) else {
    tracing::warn!(contact_id, "undecodable image payload; leaving picture unset");
    return None;
  };
  let url = assets.store(&bytes, contact_id).await;
  if url.is_none() {
    tracing::warn!(contact_id, "asset store rejected profile picture");
  }
  url
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn detects_image_data_uris() {
    assert!(is_data_uri("data:image/png;base64,iVBORw0KGgo="));
    assert!(!is_data_uri("https://cdn.example.com/contact_0001.png"));
    assert!(!is_data_uri("data:text/plain;base64,aGk="));
  }

  #[test]
  fn decodes_the_base64_payload() {
    let uri = format!("data:image/png;base64,{}", STANDARD.encode(b"pixels"));
    assert_eq!(decode_data_uri(&uri).unwrap(), b"pixels");
  }

  #[test]
  fn malformed_payloads_decode_to_none() {
    assert!(decode_data_uri("data:image/png;base64,@@@").is_none());
    assert!(decode_data_uri("data:image/png,raw-not-base64").is_none());
  }
}
