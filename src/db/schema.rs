pub(crate) const SCHEMA_V1: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS entries (
    id           TEXT PRIMARY KEY,
    kind         TEXT NOT NULL,
    name         TEXT NOT NULL,
    amount       TEXT NOT NULL,
    category     TEXT,
    cadence      TEXT NOT NULL DEFAULT 'monthly',
    date         TEXT,
    import_hash  TEXT NOT NULL DEFAULT '',
    created_at   TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_entries_kind ON entries(kind);
CREATE INDEX IF NOT EXISTS idx_entries_date ON entries(date);
CREATE UNIQUE INDEX IF NOT EXISTS idx_entries_hash_unique ON entries(import_hash) WHERE import_hash != '';

CREATE TABLE IF NOT EXISTS budget_caps (
    category  TEXT PRIMARY KEY,
    amount    TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS import_rules (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    pattern     TEXT NOT NULL,
    category    TEXT NOT NULL,
    is_regex    BOOLEAN NOT NULL DEFAULT 0,
    priority    INTEGER NOT NULL DEFAULT 0
);

"#;

pub(crate) const CURRENT_VERSION: i32 = 1;

/// Migrations from version N to N+1.
/// Each entry is (from_version, sql).
pub(crate) const MIGRATIONS: &[(i32, &str)] = &[];
