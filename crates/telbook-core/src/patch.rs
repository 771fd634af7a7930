//! Partial-update payloads.
//!
//! [`Field`] makes "key absent" and "key present" distinct states, so a
//! patch can tell "don't touch this field" apart from "clear this field":
//! for an optional column the patch carries `Field<Option<String>>`, where
//! a missing key is `Absent`, JSON `null` is `Set(None)` (clear), and a
//! string is `Set(Some(..))`.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{
  Result,
  contact::{
    Contact, MAX_COMPANY_LEN, MAX_DEPARTMENT_LEN, MAX_DESIGNATION_LEN,
    MAX_EMAIL_LEN, MAX_EXTENSION_LEN, MAX_LANDLINE_LEN, MAX_MOBILE_LEN,
    MAX_NAME_LEN, MAX_WEBSITE_LEN, check_len,
  },
  error::Error,
};

// ─── Field ───────────────────────────────────────────────────────────────────

/// One cell of a patch: either left out of the payload or set to a value.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Field<T> {
  #[default]
  Absent,
  Set(T),
}

impl<T> Field<T> {
  pub fn is_absent(&self) -> bool { matches!(self, Field::Absent) }

  pub fn is_set(&self) -> bool { matches!(self, Field::Set(_)) }

  /// The patched value if set, otherwise the current one.
  pub fn resolve(self, current: T) -> T {
    match self {
      Field::Set(v) => v,
      Field::Absent => current,
    }
  }
}

// A present key always deserializes to `Set`; `Absent` only ever comes from
// `#[serde(default)]` on the containing struct.
impl<'de, T: Deserialize<'de>> Deserialize<'de> for Field<T> {
  fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
    T::deserialize(d).map(Field::Set)
  }
}

impl<T: Serialize> Serialize for Field<T> {
  fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
    match self {
      Field::Set(v) => v.serialize(s),
      Field::Absent => s.serialize_none(),
    }
  }
}

// ─── ContactPatch ────────────────────────────────────────────────────────────

/// Input to [`crate::store::ContactStore::update`]. Only `Set` fields are
/// merged; everything else is left untouched. The id and `created_at` can
/// never be patched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContactPatch {
  #[serde(default, skip_serializing_if = "Field::is_absent")]
  pub name:            Field<String>,
  #[serde(default, skip_serializing_if = "Field::is_absent")]
  pub extension:       Field<Option<String>>,
  #[serde(default, skip_serializing_if = "Field::is_absent")]
  pub company:         Field<Option<String>>,
  #[serde(default, skip_serializing_if = "Field::is_absent")]
  pub department:      Field<Option<String>>,
  #[serde(default, skip_serializing_if = "Field::is_absent")]
  pub designation:     Field<Option<String>>,
  #[serde(default, skip_serializing_if = "Field::is_absent")]
  pub mobile:          Field<Option<String>>,
  #[serde(default, skip_serializing_if = "Field::is_absent")]
  pub landline:        Field<Option<String>>,
  #[serde(default, skip_serializing_if = "Field::is_absent")]
  pub email:           Field<Option<String>>,
  #[serde(default, skip_serializing_if = "Field::is_absent")]
  pub website:         Field<Option<String>>,
  #[serde(default, skip_serializing_if = "Field::is_absent")]
  pub comments:        Field<Option<String>>,
  #[serde(default, skip_serializing_if = "Field::is_absent")]
  pub languages:       Field<Vec<String>>,
  #[serde(default, skip_serializing_if = "Field::is_absent")]
  pub tags:            Field<Vec<String>>,
  #[serde(default, skip_serializing_if = "Field::is_absent")]
  pub expose:          Field<bool>,
  #[serde(default, skip_serializing_if = "Field::is_absent")]
  pub is_ert:          Field<bool>,
  #[serde(default, skip_serializing_if = "Field::is_absent")]
  pub is_ifa:          Field<bool>,
  #[serde(default, skip_serializing_if = "Field::is_absent")]
  pub is_third_party:  Field<bool>,
  #[serde(default, skip_serializing_if = "Field::is_absent")]
  pub profile_picture: Field<Option<String>>,
}

impl ContactPatch {
  /// Turn `Set(Some(""))` into `Set(None)` on the optional scalars.
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
      if let Field::Set(Some(v)) = field
        && v.is_empty()
      {
        *field = Field::Set(None);
      }
    }
    self
  }

  /// Check field lengths on whatever is set.
  pub fn validate(&self) -> Result<()> {
    if let Field::Set(name) = &self.name {
      let len = name.chars().count();
      if len == 0 || len > MAX_NAME_LEN {
        return Err(Error::Validation {
          field:  "name",
          reason: format!("must be 1 to {MAX_NAME_LEN} characters"),
        });
      }
    }
    check_patch_len("extension", &self.extension, MAX_EXTENSION_LEN)?;
    check_patch_len("company", &self.company, MAX_COMPANY_LEN)?;
    check_patch_len("department", &self.department, MAX_DEPARTMENT_LEN)?;
    check_patch_len("designation", &self.designation, MAX_DESIGNATION_LEN)?;
    check_patch_len("mobile", &self.mobile, MAX_MOBILE_LEN)?;
    check_patch_len("landline", &self.landline, MAX_LANDLINE_LEN)?;
    check_patch_len("email", &self.email, MAX_EMAIL_LEN)?;
    check_patch_len("website", &self.website, MAX_WEBSITE_LEN)?;
    Ok(())
  }

  /// Merge the set fields into `contact`. Timestamps are the store's job.
  pub fn apply(self, contact: &mut Contact) {
    let c = contact;
    c.name = self.name.resolve(std::mem::take(&mut c.name));
    c.extension = self.extension.resolve(c.extension.take());
    c.company = self.company.resolve(c.company.take());
    c.department = self.department.resolve(c.department.take());
    c.designation = self.designation.resolve(c.designation.take());
    c.mobile = self.mobile.resolve(c.mobile.take());
    c.landline = self.landline.resolve(c.landline.take());
    c.email = self.email.resolve(c.email.take());
    c.website = self.website.resolve(c.website.take());
    c.comments = self.comments.resolve(c.comments.take());
    c.languages = self.languages.resolve(std::mem::take(&mut c.languages));
    c.tags = self.tags.resolve(std::mem::take(&mut c.tags));
    c.expose = self.expose.resolve(c.expose);
    c.is_ert = self.is_ert.resolve(c.is_ert);
    c.is_ifa = self.is_ifa.resolve(c.is_ifa);
    c.is_third_party = self.is_third_party.resolve(c.is_third_party);
    c.profile_picture = self.profile_picture.resolve(c.profile_picture.take());
  }
}

fn check_patch_len(
  field: &'static str,
  value: &Field<Option<String>>,
  max: usize,
) -> Result<()> {
  match value {
    Field::Set(v) => check_len(field, v.as_deref(), max),
    Field::Absent => Ok(()),
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use chrono::{TimeZone, Utc};

  use super::*;
  use crate::contact::NewContact;

  #[test]
  fn absent_null_and_value_are_distinct() {
    let p: ContactPatch = serde_json::from_str(r#"{}"#).unwrap();
    assert!(p.email.is_absent());

    let p: ContactPatch = serde_json::from_str(r#"{"email":null}"#).unwrap();
    assert_eq!(p.email, Field::Set(None));

    let p: ContactPatch =
      serde_json::from_str(r#"{"email":"a@b.example"}"#).unwrap();
    assert_eq!(p.email, Field::Set(Some("a@b.example".into())));
  }

  #[test]
  fn apply_touches_only_set_fields() {
    let now = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
    let mut base = NewContact::named("Alice");
    base.department = Some("Engineering".into());
    base.tags = vec!["Executive Office".into()];
    let mut contact = base.into_contact("0001".into(), now);
    let before = contact.clone();

    let patch = ContactPatch {
      name: Field::Set("Alicia".into()),
      ..ContactPatch::default()
    };
    patch.apply(&mut contact);

    assert_eq!(contact.name, "Alicia");
    assert_eq!(contact.department, before.department);
    assert_eq!(contact.tags, before.tags);
    assert_eq!(contact.created_at, before.created_at);
    assert_eq!(contact.updated_at, before.updated_at);
  }

  #[test]
  fn null_clears_an_optional_field() {
    let now = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
    let mut base = NewContact::named("Alice");
    base.email = Some("alice@example.com".into());
    let mut contact = base.into_contact("0001".into(), now);

    let patch: ContactPatch =
      serde_json::from_str(r#"{"email":null}"#).unwrap();
    patch.apply(&mut contact);
    assert_eq!(contact.email, None);
  }

  #[test]
  fn normalized_turns_empty_set_into_clear() {
    let patch: ContactPatch =
      serde_json::from_str(r#"{"mobile":""}"#).unwrap();
    let patch = patch.normalized();
    assert_eq!(patch.mobile, Field::Set(None));
  }
}
