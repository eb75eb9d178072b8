//! Plain data types for live entities and their immutable versions.

pub mod case;
pub mod version;

pub use case::{NewStep, Project, TestCase, TestStep};
pub use version::{CaseVersion, StepVersion};
