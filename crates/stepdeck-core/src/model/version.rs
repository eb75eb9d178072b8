use serde::{Deserialize, Serialize};

/// An immutable snapshot of a test case's scalar fields.
///
/// Rows are append-only: created once per snapshot event, never updated,
/// never deleted by the engine. Live reordering after the snapshot must
/// not be observable through a version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseVersion {
    pub id: i64,
    pub case_id: i64,
    pub name: String,
    pub created_by: String,
    pub created_at_us: i64,
}

/// An immutable copy of one step, owned by exactly one [`CaseVersion`].
///
/// `position` is the step's live position at snapshot time, frozen
/// forever.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepVersion {
    pub id: i64,
    pub version_id: i64,
    pub position: i64,
    pub action: String,
    pub data: Option<String>,
    pub expected: Option<String>,
    pub selector: Option<String>,
    pub generated_code: Option<String>,
    pub disabled: bool,
}
