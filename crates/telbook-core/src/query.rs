//! Listing parameters and supporting query types.
//!
//! All filters are optional and combine with logical AND; `search` is an OR
//! across `name`, `department`, `tags` and `designation`. The structure is
//! consumed by one query-translation function in the storage backend so
//! each predicate's semantics stays independently testable.

use serde::{Deserialize, Serialize};

use crate::contact::Contact;

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 100;

// ─── Sort ────────────────────────────────────────────────────────────────────

/// `name` and `department` sort ascending (case-insensitive); `extension`
/// sorts descending. The asymmetry is deliberate.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
  #[default]
  Name,
  Department,
  Extension,
}

impl SortKey {
  /// Parse a caller-supplied key; anything unrecognized falls back to
  /// name ascending.
  pub fn parse(s: &str) -> Self {
    match s {
      "department" => SortKey::Department,
      "extension" => SortKey::Extension,
      _ => SortKey::Name,
    }
  }
}

// ─── Query ───────────────────────────────────────────────────────────────────

/// Parameters for [`crate::store::ContactStore::list`].
#[derive(Debug, Clone)]
pub struct ContactQuery {
  /// Case-insensitive substring across name, department, tags, designation.
  pub search:              Option<String>,
  /// Substring match against any element of `tags`.
  pub tag:                 Option<String>,
  /// Substring match against any element of `languages`.
  pub language:            Option<String>,
  pub is_ert:              Option<bool>,
  pub is_ifa:              Option<bool>,
  pub is_third_party:      Option<bool>,
  /// Mask restricting to non-third-party records; applied on top of an
  /// explicit `is_third_party` filter when both are supplied.
  pub exclude_third_party: bool,
  pub sort_by:             SortKey,
  /// 1-based page number.
  pub page:                u32,
  pub page_size:           u32,
}

impl Default for ContactQuery {
  fn default() -> Self {
    Self {
      search:              None,
      tag:                 None,
      language:            None,
      is_ert:              None,
      is_ifa:              None,
      is_third_party:      None,
      exclude_third_party: false,
      sort_by:             SortKey::default(),
      page:                1,
      page_size:           DEFAULT_PAGE_SIZE,
    }
  }
}

impl ContactQuery {
  /// Rows to skip before the requested page.
  pub fn skip(&self) -> u64 {
    u64::from(self.page.saturating_sub(1)) * u64::from(self.page_size)
  }
}

// ─── Page ────────────────────────────────────────────────────────────────────

/// One page of results plus the total count over the filtered set
/// (computed before pagination).
#[derive(Debug, Clone, Serialize)]
pub struct ContactPage {
  pub contacts: Vec<Contact>,
  pub total:    u64,
}

impl ContactPage {
  pub fn total_pages(&self, page_size: u32) -> u64 {
    let size = u64::from(page_size.max(1));
    self.total.div_ceil(size)
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn unknown_sort_key_falls_back_to_name() {
    assert_eq!(SortKey::parse("extension"), SortKey::Extension);
    assert_eq!(SortKey::parse("department"), SortKey::Department);
    assert_eq!(SortKey::parse("salary"), SortKey::Name);
    assert_eq!(SortKey::parse(""), SortKey::Name);
  }

  #[test]
  fn skip_is_zero_based_from_page_one() {
    let q = ContactQuery { page: 1, page_size: 20, ..Default::default() };
    assert_eq!(q.skip(), 0);
    let q = ContactQuery { page: 3, page_size: 25, ..Default::default() };
    assert_eq!(q.skip(), 50);
  }

  #[test]
  fn total_pages_rounds_up() {
    let page = ContactPage { contacts: vec![], total: 41 };
    assert_eq!(page.total_pages(20), 3);
    let page = ContactPage { contacts: vec![], total: 0 };
    assert_eq!(page.total_pages(20), 0);
  }
}
