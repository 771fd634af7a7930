//! The binary-asset storage capability.
//!
//! Profile pictures never live in the contact collection; when a write
//! carries raw image bytes the record layer hands them to an `AssetStore`
//! and persists the returned URL instead. Failures are soft: a `None` from
//! [`AssetStore::store`] leaves the field unset rather than failing the
//! surrounding write.

use std::future::Future;

pub trait AssetStore: Send + Sync {
  /// Store `bytes` under a name derived from `key` (the contact id) and
  /// return the public URL, or `None` if the asset backend rejected it.
  fn store<'a>(
    &'a self,
    bytes: &'a [u8],
    key: &'a str,
  ) -> impl Future<Output = Option<String>> + Send + 'a;

  /// Best-effort removal of a previously returned URL. `true` iff an
  /// asset existed and was removed.
  fn delete<'a>(
    &'a self,
    url: &'a str,
  ) -> impl Future<Output = bool> + Send + 'a;
}
