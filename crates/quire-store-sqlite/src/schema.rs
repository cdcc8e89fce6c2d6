//! SQL schema for the Quire SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS forms (
    form_id     TEXT PRIMARY KEY,
    title       TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    status      TEXT NOT NULL,              -- 'draft' | 'published' | 'closed'
    created_at  TEXT NOT NULL,
    version     INTEGER NOT NULL DEFAULT 1  -- bumped on every update
);

CREATE TABLE IF NOT EXISTS form_fields (
    field_id    TEXT PRIMARY KEY,
    form_id     TEXT NOT NULL REFERENCES forms(form_id) ON DELETE CASCADE,
    label       TEXT NOT NULL,              -- JSON {lang: text}
    placeholder TEXT NOT NULL,              -- JSON {lang: text}
    help_text   TEXT NOT NULL,              -- JSON {lang: text}
    field_type  TEXT NOT NULL,
    field_order INTEGER NOT NULL CHECK (field_order > 0),
    required    INTEGER NOT NULL DEFAULT 0,
    options     TEXT,                       -- JSON {key: label} or NULL
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS responses (
    response_id  TEXT PRIMARY KEY,
    form_id      TEXT NOT NULL REFERENCES forms(form_id) ON DELETE CASCADE,
    respondent   TEXT NOT NULL,             -- JSON object
    status       TEXT NOT NULL,
    submitted_at TEXT NOT NULL
);

-- Answers are written once, together with their response.
-- field_id has no foreign key: fields may be deleted while answers to
-- them are kept.
CREATE TABLE IF NOT EXISTS response_answers (
    answer_id   TEXT PRIMARY KEY,
    response_id TEXT NOT NULL REFERENCES responses(response_id) ON DELETE CASCADE,
    field_id    TEXT NOT NULL,
    field_type  TEXT NOT NULL,
    value       TEXT NOT NULL,              -- JSON {lang: any}
    position    INTEGER NOT NULL,
    created_at  TEXT NOT NULL,
    UNIQUE (response_id, position)
);

CREATE TABLE IF NOT EXISTS answer_vectors (
    vector_id  TEXT PRIMARY KEY,
    answer_id  TEXT NOT NULL REFERENCES response_answers(answer_id) ON DELETE CASCADE,
    embedding  BLOB NOT NULL,               -- little-endian f32 array
    dimension  INTEGER NOT NULL CHECK (dimension > 0),
    model      TEXT NOT NULL,
    created_at TEXT NOT NULL,
    UNIQUE (answer_id)
);

CREATE INDEX IF NOT EXISTS fields_form_idx      ON form_fields(form_id, field_order);
CREATE INDEX IF NOT EXISTS responses_form_idx   ON responses(form_id);
CREATE INDEX IF NOT EXISTS answers_response_idx ON response_answers(response_id);

PRAGMA user_version = 1;
";
