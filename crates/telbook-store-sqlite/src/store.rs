//! [`SqliteStore`] — the SQLite implementation of [`ContactStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;

use telbook_core::{
  contact::{Contact, NewContact},
  patch::{ContactPatch, Field},
  query::{ContactPage, ContactQuery, SortKey},
  store::{BulkOutcome, ConflictPolicy, ContactStore},
};

use crate::{
  Error, Result,
  encode::{CONTACT_COLUMNS, contact_from_row, encode_dt, encode_list},
  schema::SCHEMA,
};

/// Insert attempts before giving up on id allocation. Each retry recomputes
/// the id after losing the race for the previous one.
const MAX_CREATE_ATTEMPTS: u32 = 3;

const UPSERT_SUFFIX: &str = "ON CONFLICT(contact_id) DO UPDATE SET \
   name = excluded.name, extension = excluded.extension, \
   company = excluded.company, department = excluded.department, \
   designation = excluded.designation, mobile = excluded.mobile, \
   landline = excluded.landline, email = excluded.email, \
   website = excluded.website, comments = excluded.comments, \
   languages = excluded.languages, tags = excluded.tags, \
   expose = excluded.expose, is_ert = excluded.is_ert, \
   is_ifa = excluded.is_ifa, is_third_party = excluded.is_third_party, \
   profile_picture = excluded.profile_picture, \
   updated_at = excluded.updated_at";

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Telbook contact store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(move |conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── Row helpers (run inside `conn.call`) ────────────────────────────────────

/// Current maximum id plus one, zero-padded to four digits. A non-numeric
/// maximum falls back to row count + 1 — deterministic, but only
/// best-effort against collisions; the primary key is the real arbiter.
fn next_id_in(conn: &rusqlite::Connection) -> rusqlite::Result<String> {
  let max: Option<String> = conn
    .query_row(
      "SELECT contact_id FROM contacts ORDER BY contact_id DESC LIMIT 1",
      [],
      |r| r.get(0),
    )
    .optional()?;

  let Some(max) = max else {
    return Ok("0001".to_string());
  };

  match max.parse::<u64>() {
    Ok(n) => Ok(format!("{:04}", n + 1)),
    Err(_) => {
      let count: u64 =
        conn.query_row("SELECT COUNT(*) FROM contacts", [], |r| r.get(0))?;
      Ok(format!("{:04}", count + 1))
    }
  }
}

/// The id of the record holding `email`, if any, excluding `exclude_id`.
fn email_holder(
  conn: &rusqlite::Connection,
  email: &str,
  exclude_id: Option<&str>,
) -> rusqlite::Result<Option<String>> {
  match exclude_id {
    Some(id) => conn
      .query_row(
        "SELECT contact_id FROM contacts
         WHERE email = ?1 AND contact_id != ?2 LIMIT 1",
        rusqlite::params![email, id],
        |r| r.get(0),
      )
      .optional(),
    None => conn
      .query_row(
        "SELECT contact_id FROM contacts WHERE email = ?1 LIMIT 1",
        rusqlite::params![email],
        |r| r.get(0),
      )
      .optional(),
  }
}

/// INSERT a full record, with an optional `ON CONFLICT` suffix.
/// Returns the number of rows changed.
fn write_contact(
  conn: &rusqlite::Connection,
  c: &Contact,
  conflict_suffix: &str,
) -> rusqlite::Result<usize> {
  let sql = format!(
    "INSERT INTO contacts ({CONTACT_COLUMNS})
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10,
             ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20)
     {conflict_suffix}"
  );
  conn.execute(
    &sql,
    rusqlite::params![
      c.id,
      c.name,
      c.extension,
      c.company,
      c.department,
      c.designation,
      c.mobile,
      c.landline,
      c.email,
      c.website,
      c.comments,
      encode_list(&c.languages)?,
      encode_list(&c.tags)?,
      c.expose,
      c.is_ert,
      c.is_ifa,
      c.is_third_party,
      c.profile_picture,
      encode_dt(c.created_at),
      encode_dt(c.updated_at),
    ],
  )
}

/// Full-row UPDATE by id; `created_at` is never touched.
fn rewrite_contact(
  conn: &rusqlite::Connection,
  c: &Contact,
) -> rusqlite::Result<usize> {
  conn.execute(
    "UPDATE contacts SET
       name = ?2, extension = ?3, company = ?4, department = ?5,
       designation = ?6, mobile = ?7, landline = ?8, email = ?9,
       website = ?10, comments = ?11, languages = ?12, tags = ?13,
       expose = ?14, is_ert = ?15, is_ifa = ?16, is_third_party = ?17,
       profile_picture = ?18, updated_at = ?19
     WHERE contact_id = ?1",
    rusqlite::params![
      c.id,
      c.name,
      c.extension,
      c.company,
      c.department,
      c.designation,
      c.mobile,
      c.landline,
      c.email,
      c.website,
      c.comments,
      encode_list(&c.languages)?,
      encode_list(&c.tags)?,
      c.expose,
      c.is_ert,
      c.is_ifa,
      c.is_third_party,
      c.profile_picture,
      encode_dt(c.updated_at),
    ],
  )
}

fn fetch_contact(
  conn: &rusqlite::Connection,
  id: &str,
) -> rusqlite::Result<Option<Contact>> {
  conn
    .query_row(
      &format!("SELECT {CONTACT_COLUMNS} FROM contacts WHERE contact_id = ?1"),
      rusqlite::params![id],
      contact_from_row,
    )
    .optional()
}

/// True when an insert lost the id race to a concurrent creator.
fn is_id_conflict(err: &tokio_rusqlite::Error) -> bool {
  matches!(
    err,
    tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(e, _))
      if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
  )
}

/// Transient lock contention, worth the same bounded retry as an id
/// collision before it surfaces.
fn is_busy(err: &tokio_rusqlite::Error) -> bool {
  matches!(
    err,
    tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(e, _))
      if matches!(
        e.code,
        rusqlite::ErrorCode::DatabaseBusy | rusqlite::ErrorCode::DatabaseLocked
      )
  )
}

// ─── Per-call outcome carriers ───────────────────────────────────────────────

enum CreateAttempt {
  Inserted(Box<Contact>),
  DuplicateEmail(String),
}

enum UpdateAttempt {
  Missing,
  DuplicateEmail(String),
  Updated(Box<Contact>),
}

enum ReconcileKind {
  Inserted,
  Updated,
  Skipped,
}

fn reconcile_one(
  conn: &rusqlite::Connection,
  c: &Contact,
  policy: ConflictPolicy,
) -> rusqlite::Result<ReconcileKind> {
  match policy {
    ConflictPolicy::SkipExisting => {
      let changed =
        write_contact(conn, c, "ON CONFLICT(contact_id) DO NOTHING")?;
      Ok(if changed > 0 {
        ReconcileKind::Inserted
      } else {
        ReconcileKind::Skipped
      })
    }
    ConflictPolicy::Overwrite => {
      let existed: bool = conn
        .query_row(
          "SELECT 1 FROM contacts WHERE contact_id = ?1",
          rusqlite::params![c.id],
          |_| Ok(true),
        )
        .optional()?
        .unwrap_or(false);
      write_contact(conn, c, UPSERT_SUFFIX)?;
      Ok(if existed {
        ReconcileKind::Updated
      } else {
        ReconcileKind::Inserted
      })
    }
  }
}

// ─── ContactStore impl ───────────────────────────────────────────────────────

impl ContactStore for SqliteStore {
  type Error = Error;

  async fn next_id(&self) -> Result<String> {
    let id = self.conn.call(move |conn| Ok(next_id_in(conn)?)).await?;
    Ok(id)
  }

  async fn create(&self, candidate: NewContact) -> Result<Contact> {
    let candidate = candidate.normalized();
    let mut attempts = 0;

    loop {
      attempts += 1;
      let input = candidate.clone();
      let now = Utc::now();

      let attempt = self
        .conn
        .call(move |conn| {
          if let Some(email) = input.email.as_deref()
            && email_holder(conn, email, None)?.is_some()
          {
            return Ok(CreateAttempt::DuplicateEmail(email.to_owned()));
          }

          let id = next_id_in(conn)?;
          let contact = input.into_contact(id, now);
          write_contact(conn, &contact, "")?;
          Ok(CreateAttempt::Inserted(Box::new(contact)))
        })
        .await;

      match attempt {
        Ok(CreateAttempt::Inserted(contact)) => return Ok(*contact),
        Ok(CreateAttempt::DuplicateEmail(email)) => {
          return Err(telbook_core::Error::DuplicateEmail(email).into());
        }
        // Lost the id race (or hit lock contention); recompute and retry.
        Err(e)
          if attempts < MAX_CREATE_ATTEMPTS
            && (is_id_conflict(&e) || is_busy(&e)) =>
        {
          continue;
        }
        Err(e) if is_id_conflict(&e) => {
          return Err(
            telbook_core::Error::IdAllocation { attempts: MAX_CREATE_ATTEMPTS }
              .into(),
          );
        }
        Err(e) => return Err(e.into()),
      }
    }
  }

  async fn get(&self, id: &str) -> Result<Option<Contact>> {
    let id = id.to_owned();
    let contact = self
      .conn
      .call(move |conn| Ok(fetch_contact(conn, &id)?))
      .await?;
    Ok(contact)
  }

  async fn update(
    &self,
    id: &str,
    patch: ContactPatch,
  ) -> Result<Option<Contact>> {
    let id = id.to_owned();
    let patch = patch.normalized();
    let now = Utc::now();

    let attempt = self
      .conn
      .call(move |conn| {
        let Some(mut contact) = fetch_contact(conn, &id)? else {
          return Ok(UpdateAttempt::Missing);
        };

        if let Field::Set(Some(email)) = &patch.email
          && email_holder(conn, email, Some(&id))?.is_some()
        {
          return Ok(UpdateAttempt::DuplicateEmail(email.clone()));
        }

        patch.apply(&mut contact);
        contact.updated_at = now;
        rewrite_contact(conn, &contact)?;
        Ok(UpdateAttempt::Updated(Box::new(contact)))
      })
      .await?;

    match attempt {
      UpdateAttempt::Missing => Ok(None),
      UpdateAttempt::DuplicateEmail(email) => {
        Err(telbook_core::Error::DuplicateEmail(email).into())
      }
      UpdateAttempt::Updated(contact) => Ok(Some(*contact)),
    }
  }

  async fn delete(&self, id: &str) -> Result<bool> {
    let id = id.to_owned();
    let removed = self
      .conn
      .call(move |conn| {
        let changed = conn.execute(
          "DELETE FROM contacts WHERE contact_id = ?1",
          rusqlite::params![id],
        )?;
        Ok(changed > 0)
      })
      .await?;
    Ok(removed)
  }

  async fn list(&self, query: &ContactQuery) -> Result<ContactPage> {
    let q = query.clone();

    let (contacts, total) = self
      .conn
      .call(move |conn| {
        use rusqlite::types::Value;

        // Translate the tagged filters into one WHERE clause. All filters
        // AND together; `search` ORs its four fields internally.
        let mut conds: Vec<String> = Vec::new();
        let mut args: Vec<Value> = Vec::new();

        if let Some(s) = &q.search {
          let pattern = format!("%{s}%");
          conds.push(
            "(name LIKE ? OR department LIKE ? OR designation LIKE ? \
             OR EXISTS (SELECT 1 FROM json_each(contacts.tags) \
                        WHERE json_each.value LIKE ?))"
              .to_string(),
          );
          for _ in 0..4 {
            args.push(Value::Text(pattern.clone()));
          }
        }
        if let Some(t) = &q.tag {
          conds.push(
            "EXISTS (SELECT 1 FROM json_each(contacts.tags) \
             WHERE json_each.value LIKE ?)"
              .to_string(),
          );
          args.push(Value::Text(format!("%{t}%")));
        }
        if let Some(l) = &q.language {
          conds.push(
            "EXISTS (SELECT 1 FROM json_each(contacts.languages) \
             WHERE json_each.value LIKE ?)"
              .to_string(),
          );
          args.push(Value::Text(format!("%{l}%")));
        }
        for (col, flag) in [
          ("is_ert", q.is_ert),
          ("is_ifa", q.is_ifa),
          ("is_third_party", q.is_third_party),
        ] {
          if let Some(b) = flag {
            conds.push(format!("{col} = ?"));
            args.push(Value::Integer(i64::from(b)));
          }
        }
        // Mask applies on top of any explicit is_third_party filter.
        if q.exclude_third_party {
          conds.push("is_third_party = 0".to_string());
        }

        let where_clause = if conds.is_empty() {
          String::new()
        } else {
          format!("WHERE {}", conds.join(" AND "))
        };

        // Total over the filtered set, before pagination.
        let total: u64 = conn.query_row(
          &format!("SELECT COUNT(*) FROM contacts {where_clause}"),
          rusqlite::params_from_iter(args.iter()),
          |r| r.get(0),
        )?;

        // NOCASE gives ASCII case-insensitive collation; extension is
        // deliberately descending.
        let order = match q.sort_by {
          SortKey::Name => "name COLLATE NOCASE ASC",
          SortKey::Department => "department COLLATE NOCASE ASC",
          SortKey::Extension => "extension DESC",
        };

        let sql = format!(
          "SELECT {CONTACT_COLUMNS} FROM contacts {where_clause}
           ORDER BY {order} LIMIT ? OFFSET ?"
        );
        args.push(Value::Integer(i64::from(q.page_size)));
        args.push(Value::Integer(q.skip() as i64));

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(args.iter()), contact_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok((rows, total))
      })
      .await?;

    Ok(ContactPage { contacts, total })
  }

  async fn distinct_tags(&self) -> Result<Vec<String>> {
    let tags = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT DISTINCT json_each.value
           FROM contacts, json_each(contacts.tags)
           ORDER BY json_each.value",
        )?;
        let rows = stmt
          .query_map([], |r| r.get::<_, String>(0))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(tags)
  }

  async fn distinct_languages(&self) -> Result<Vec<String>> {
    let mut languages = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT DISTINCT json_each.value
           FROM contacts, json_each(contacts.languages)
           ORDER BY json_each.value",
        )?;
        let rows = stmt
          .query_map([], |r| r.get::<_, String>(0))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    // Fixed business rule: English never appears as a facet.
    languages.retain(|l| !l.eq_ignore_ascii_case("english"));
    Ok(languages)
  }

  async fn bulk_reconcile(
    &self,
    records: Vec<Contact>,
    policy: ConflictPolicy,
  ) -> Result<BulkOutcome> {
    let outcome = self
      .conn
      .call(move |conn| {
        let mut outcome = BulkOutcome::default();
        for record in &records {
          match reconcile_one(conn, record, policy) {
            Ok(ReconcileKind::Inserted) => outcome.inserted += 1,
            Ok(ReconcileKind::Updated) => outcome.updated += 1,
            Ok(ReconcileKind::Skipped) => outcome.skipped += 1,
            // One bad record must not block the rest of the batch.
            Err(_) => outcome.errors += 1,
          }
        }
        Ok(outcome)
      })
      .await?;
    Ok(outcome)
  }
}
