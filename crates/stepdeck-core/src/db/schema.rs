//! Canonical SQLite schema for stepdeck.
//!
//! The live tables and the version tables are deliberately parallel:
//! - `test_cases` / `test_steps` hold the mutable sibling sets
//! - `case_versions` / `step_versions` hold append-only snapshots with the
//!   same content columns and a `position` frozen at snapshot time
//!
//! The column is named `position` rather than `order` because `ORDER` is
//! an SQL keyword.

/// Migration v1: live tables, version tables, ownership cascades.
pub const MIGRATION_V1_SQL: &str = r"
CREATE TABLE IF NOT EXISTS projects (
    project_id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL CHECK (length(trim(name)) > 0),
    created_by TEXT NOT NULL,
    created_at_us INTEGER NOT NULL,
    updated_at_us INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS test_cases (
    case_id INTEGER PRIMARY KEY AUTOINCREMENT,
    project_id INTEGER NOT NULL REFERENCES projects(project_id) ON DELETE CASCADE,
    name TEXT NOT NULL CHECK (length(trim(name)) > 0),
    position INTEGER NOT NULL CHECK (position >= 0),
    created_by TEXT NOT NULL,
    updated_by TEXT NOT NULL,
    created_at_us INTEGER NOT NULL,
    updated_at_us INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS test_steps (
    step_id INTEGER PRIMARY KEY AUTOINCREMENT,
    case_id INTEGER NOT NULL REFERENCES test_cases(case_id) ON DELETE CASCADE,
    position INTEGER NOT NULL CHECK (position >= 0),
    action TEXT NOT NULL,
    data TEXT,
    expected TEXT,
    selector TEXT,
    generated_code TEXT,
    disabled INTEGER NOT NULL DEFAULT 0 CHECK (disabled IN (0, 1)),
    created_by TEXT NOT NULL,
    updated_by TEXT NOT NULL,
    created_at_us INTEGER NOT NULL,
    updated_at_us INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS case_versions (
    version_id INTEGER PRIMARY KEY AUTOINCREMENT,
    case_id INTEGER NOT NULL REFERENCES test_cases(case_id) ON DELETE CASCADE,
    name TEXT NOT NULL,
    created_by TEXT NOT NULL,
    created_at_us INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS step_versions (
    step_version_id INTEGER PRIMARY KEY AUTOINCREMENT,
    version_id INTEGER NOT NULL REFERENCES case_versions(version_id) ON DELETE CASCADE,
    position INTEGER NOT NULL CHECK (position >= 0),
    action TEXT NOT NULL,
    data TEXT,
    expected TEXT,
    selector TEXT,
    generated_code TEXT,
    disabled INTEGER NOT NULL DEFAULT 0 CHECK (disabled IN (0, 1))
);
";

/// Migration v2: read-path indexes for sibling-set and version queries.
pub const MIGRATION_V2_SQL: &str = r"
CREATE INDEX IF NOT EXISTS idx_test_cases_project_position
    ON test_cases(project_id, position);

CREATE INDEX IF NOT EXISTS idx_test_steps_case_position
    ON test_steps(case_id, position);

CREATE INDEX IF NOT EXISTS idx_case_versions_case_created
    ON case_versions(case_id, created_at_us DESC);

CREATE INDEX IF NOT EXISTS idx_step_versions_version_position
    ON step_versions(version_id, position);
";

/// Indexes expected by sibling-set and version read paths.
pub const REQUIRED_INDEXES: &[&str] = &[
    "idx_test_cases_project_position",
    "idx_test_steps_case_position",
    "idx_case_versions_case_created",
    "idx_step_versions_version_position",
];
