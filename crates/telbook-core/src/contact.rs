//! The canonical contact record and its creation input.
//!
//! A contact's `id` is a zero-padded 4-digit decimal string assigned by the
//! store; callers never supply it (the migration pipeline, which imports
//! external identifiers verbatim, is the one exception and builds `Contact`
//! values directly).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

// ─── Field limits ────────────────────────────────────────────────────────────

pub const MAX_NAME_LEN: usize = 200;
pub const MAX_EXTENSION_LEN: usize = 20;
pub const MAX_COMPANY_LEN: usize = 200;
pub const MAX_DEPARTMENT_LEN: usize = 200;
pub const MAX_DESIGNATION_LEN: usize = 200;
pub const MAX_MOBILE_LEN: usize = 50;
pub const MAX_LANDLINE_LEN: usize = 50;
pub const MAX_EMAIL_LEN: usize = 200;
pub const MAX_WEBSITE_LEN: usize = 500;

// ─── Contact ─────────────────────────────────────────────────────────────────

/// A persisted directory entry.
///
/// Optional scalars are `None` when not set — never an empty string; empty
/// strings are normalized away on every write path. `languages` and `tags`
/// are always sequences at the storage boundary, never delimited strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
  pub id:              String,
  pub name:            String,
  pub extension:       Option<String>,
  pub company:         Option<String>,
  pub department:      Option<String>,
  pub designation:     Option<String>,
  pub mobile:          Option<String>,
  pub landline:        Option<String>,
  pub email:           Option<String>,
  pub website:         Option<String>,
  pub comments:        Option<String>,
  #[serde(default)]
  pub languages:       Vec<String>,
  #[serde(default)]
  pub tags:            Vec<String>,
  /// Public-visibility flag.
  pub expose:          bool,
  /// Emergency Response Team member.
  pub is_ert:          bool,
  pub is_ifa:          bool,
  pub is_third_party:  bool,
  /// URL of the stored profile picture, if any.
  pub profile_picture: Option<String>,
  /// Immutable after first write.
  pub created_at:      DateTime<Utc>,
  /// Refreshed on every mutation.
  pub updated_at:      DateTime<Utc>,
}

// ─── NewContact ──────────────────────────────────────────────────────────────

/// Input to [`crate::store::ContactStore::create`].
/// The id and both timestamps are always set by the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewContact {
  pub name:            String,
  #[serde(default)]
  pub extension:       Option<String>,
  #[serde(default)]
  pub company:         Option<String>,
  #[serde(default)]
  pub department:      Option<String>,
  #[serde(default)]
  pub designation:     Option<String>,
  #[serde(default)]
  pub mobile:          Option<String>,
  #[serde(default)]
  pub landline:        Option<String>,
  #[serde(default)]
  pub email:           Option<String>,
  #[serde(default)]
  pub website:         Option<String>,
  #[serde(default)]
  pub comments:        Option<String>,
  #[serde(default)]
  pub languages:       Vec<String>,
  #[serde(default)]
  pub tags:            Vec<String>,
  #[serde(default = "default_expose")]
  pub expose:          bool,
  #[serde(default)]
  pub is_ert:          bool,
  #[serde(default)]
  pub is_ifa:          bool,
  #[serde(default)]
  pub is_third_party:  bool,
  #[serde(default)]
  pub profile_picture: Option<String>,
}

fn default_expose() -> bool { true }

impl NewContact {
  /// Convenience constructor with every optional field at its default.
  pub fn named(name: impl Into<String>) -> Self {
    Self {
      name:            name.into(),
      extension:       None,
      company:         None,
      department:      None,
      designation:     None,
      mobile:          None,
      landline:        None,
      email:           None,
      website:         None,
      comments:        None,
      languages:       Vec::new(),
      tags:            Vec::new(),
      expose:          true,
      is_ert:          false,
      is_ifa:          false,
      is_third_party:  false,
      profile_picture: None,
    }
  }

  /// Turn empty-string optional scalars into `None`.
  pub fn normalized(mut self) -> Self {
    for field in [
      &mut self.extension,
      &mut self.company,
      &mut self.department,
      &mut self.designation,
      &mut self.mobile,
      &mut self.landline,
      &mut self.email,
      &mut self.website,
      &mut self.comments,
      &mut self.profile_picture,
    ] {
      if field.as_deref().is_some_and(str::is_empty) {
        *field = None;
      }
    }
    self
  }

  /// Check field lengths before the record reaches the store.
  pub fn validate(&self) -> Result<()> {
    let name_len = self.name.chars().count();
    if name_len == 0 || name_len > MAX_NAME_LEN {
      return Err(Error::Validation {
        field:  "name",
        reason: format!("must be 1 to {MAX_NAME_LEN} characters"),
      });
    }
    check_len("extension", self.extension.as_deref(), MAX_EXTENSION_LEN)?;
    check_len("company", self.company.as_deref(), MAX_COMPANY_LEN)?;
    check_len("department", self.department.as_deref(), MAX_DEPARTMENT_LEN)?;
    check_len("designation", self.designation.as_deref(), MAX_DESIGNATION_LEN)?;
    check_len("mobile", self.mobile.as_deref(), MAX_MOBILE_LEN)?;
    check_len("landline", self.landline.as_deref(), MAX_LANDLINE_LEN)?;
    check_len("email", self.email.as_deref(), MAX_EMAIL_LEN)?;
    check_len("website", self.website.as_deref(), MAX_WEBSITE_LEN)?;
    Ok(())
  }

  /// Materialise the full record once the store has assigned an id.
  pub fn into_contact(self, id: String, now: DateTime<Utc>) -> Contact {
    Contact {
      id,
      name: self.name,
      extension: self.extension,
      company: self.company,
      department: self.department,
      designation: self.designation,
      mobile: self.mobile,
      landline: self.landline,
      email: self.email,
      website: self.website,
      comments: self.comments,
      languages: self.languages,
      tags: self.tags,
      expose: self.expose,
      is_ert: self.is_ert,
      is_ifa: self.is_ifa,
      is_third_party: self.is_third_party,
      profile_picture: self.profile_picture,
      created_at: now,
      updated_at: now,
    }
  }
}

pub(crate) fn check_len(
  field: &'static str,
  value: Option<&str>,
  max: usize,
) -> Result<()> {
  if let Some(v) = value
    && v.chars().count() > max
  {
    return Err(Error::Validation {
      field,
      reason: format!("must be at most {max} characters"),
    });
  }
  Ok(())
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn normalized_drops_empty_strings() {
    let mut c = NewContact::named("Alice");
    c.email = Some(String::new());
    c.company = Some("Acme".into());
    let c = c.normalized();
    assert_eq!(c.email, None);
    assert_eq!(c.company.as_deref(), Some("Acme"));
  }

  #[test]
  fn validate_rejects_empty_name() {
    let c = NewContact::named("");
    assert!(matches!(
      c.validate(),
      Err(Error::Validation { field: "name", .. })
    ));
  }

  #[test]
  fn validate_rejects_oversized_extension() {
    let mut c = NewContact::named("Alice");
    c.extension = Some("9".repeat(MAX_EXTENSION_LEN + 1));
    assert!(matches!(
      c.validate(),
      Err(Error::Validation { field: "extension", .. })
    ));
  }

  #[test]
  fn expose_defaults_to_true_when_absent_in_json() {
    let c: NewContact = serde_json::from_str(r#"{"name":"Alice"}"#).unwrap();
    assert!(c.expose);
    assert!(!c.is_ert);
    assert!(c.tags.is_empty());
  }
}
