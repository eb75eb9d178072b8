use serde::{Deserialize, Serialize};

/// A project: the grouping root that owns an ordered list of test cases.
///
/// Projects are otherwise external to the engine; only the fields needed
/// for ownership checks and audit stamping are modeled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: i64,
    pub name: String,
    pub created_by: String,
    pub created_at_us: i64,
    pub updated_at_us: i64,
}

/// A live test case. `position` orders it among its project's cases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCase {
    pub id: i64,
    pub project_id: i64,
    pub name: String,
    pub position: i64,
    pub created_by: String,
    pub updated_by: String,
    pub created_at_us: i64,
    pub updated_at_us: i64,
}

/// A live test step. `position` orders it among its case's steps; the
/// convention is a dense 1..N sequence, but readers must tolerate gaps
/// (the coordinator normalizes them away on the next delete).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestStep {
    pub id: i64,
    pub case_id: i64,
    pub position: i64,
    pub action: String,
    pub data: Option<String>,
    pub expected: Option<String>,
    pub selector: Option<String>,
    pub generated_code: Option<String>,
    pub disabled: bool,
    pub created_by: String,
    pub updated_by: String,
    pub created_at_us: i64,
    pub updated_at_us: i64,
}

/// Content fields for a step about to be created. Identity, position,
/// and audit fields are assigned by the coordinator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewStep {
    pub action: String,
    pub data: Option<String>,
    pub expected: Option<String>,
    pub selector: Option<String>,
    pub generated_code: Option<String>,
}

impl TestStep {
    /// Content fields of this step as a [`NewStep`], for cloning.
    ///
    /// The `disabled` flag is intentionally not part of the content:
    /// clones always start enabled.
    #[must_use]
    pub fn content(&self) -> NewStep {
        NewStep {
            action: self.action.clone(),
            data: self.data.clone(),
            expected: self.expected.clone(),
            selector: self.selector.clone(),
            generated_code: self.generated_code.clone(),
        }
    }
}
