//! SQL schema for the Telbook SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE ... IF NOT EXISTS`.
///
/// `languages` and `tags` are JSON arrays in TEXT columns; element lookups
/// go through `json_each`. The primary key on `contact_id` is the arbiter
/// for sequential-id collisions between concurrent creators.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS contacts (
    contact_id      TEXT PRIMARY KEY,
    name            TEXT NOT NULL,
    extension       TEXT,
    company         TEXT,
    department      TEXT,
    designation     TEXT,
    mobile          TEXT,
    landline        TEXT,
    email           TEXT,
    website         TEXT,
    comments        TEXT,
    languages       TEXT NOT NULL DEFAULT '[]',  -- JSON array
    tags            TEXT NOT NULL DEFAULT '[]',  -- JSON array
    expose          INTEGER NOT NULL DEFAULT 1,
    is_ert          INTEGER NOT NULL DEFAULT 0,
    is_ifa          INTEGER NOT NULL DEFAULT 0,
    is_third_party  INTEGER NOT NULL DEFAULT 0,
    profile_picture TEXT,
    created_at      TEXT NOT NULL,               -- RFC 3339 UTC
    updated_at      TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS contacts_name_idx        ON contacts(name);
CREATE INDEX IF NOT EXISTS contacts_department_idx  ON contacts(department);
CREATE INDEX IF NOT EXISTS contacts_extension_idx   ON contacts(extension);
CREATE INDEX IF NOT EXISTS contacts_email_idx       ON contacts(email);
CREATE INDEX IF NOT EXISTS contacts_ert_idx         ON contacts(is_ert);
CREATE INDEX IF NOT EXISTS contacts_ifa_idx         ON contacts(is_ifa);
CREATE INDEX IF NOT EXISTS contacts_third_party_idx ON contacts(is_third_party);

-- Common filter combinations.
CREATE INDEX IF NOT EXISTS contacts_name_department_idx
    ON contacts(name, department);
CREATE INDEX IF NOT EXISTS contacts_third_party_name_idx
    ON contacts(is_third_party, name);

PRAGMA user_version = 1;
";
