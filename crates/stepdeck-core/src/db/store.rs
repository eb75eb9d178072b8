//! Collaborator adapter: row mapping and CRUD over the store tables.
//!
//! These helpers are plain reads/writes with no transaction bracketing of
//! their own; [`crate::coordinator`] and [`crate::version`] compose them
//! inside a single transaction per operation. The `position` column of
//! live rows is only ever written through the coordinator.

use rusqlite::{Connection, OptionalExtension, Row, params};

use crate::error::{EntityKind, Error, Result};
use crate::model::{CaseVersion, NewStep, Project, StepVersion, TestCase, TestStep};

const CASE_COLUMNS: &str = "case_id, project_id, name, position, created_by, updated_by, \
                            created_at_us, updated_at_us";

const STEP_COLUMNS: &str = "step_id, case_id, position, action, data, expected, selector, \
                            generated_code, disabled, created_by, updated_by, created_at_us, \
                            updated_at_us";

const STEP_VERSION_COLUMNS: &str = "step_version_id, version_id, position, action, data, \
                                    expected, selector, generated_code, disabled";

fn project_from_row(row: &Row<'_>) -> rusqlite::Result<Project> {
    Ok(Project {
        id: row.get(0)?,
        name: row.get(1)?,
        created_by: row.get(2)?,
        created_at_us: row.get(3)?,
        updated_at_us: row.get(4)?,
    })
}

fn case_from_row(row: &Row<'_>) -> rusqlite::Result<TestCase> {
    Ok(TestCase {
        id: row.get(0)?,
        project_id: row.get(1)?,
        name: row.get(2)?,
        position: row.get(3)?,
        created_by: row.get(4)?,
        updated_by: row.get(5)?,
        created_at_us: row.get(6)?,
        updated_at_us: row.get(7)?,
    })
}

fn step_from_row(row: &Row<'_>) -> rusqlite::Result<TestStep> {
    Ok(TestStep {
        id: row.get(0)?,
        case_id: row.get(1)?,
        position: row.get(2)?,
        action: row.get(3)?,
        data: row.get(4)?,
        expected: row.get(5)?,
        selector: row.get(6)?,
        generated_code: row.get(7)?,
        disabled: row.get(8)?,
        created_by: row.get(9)?,
        updated_by: row.get(10)?,
        created_at_us: row.get(11)?,
        updated_at_us: row.get(12)?,
    })
}

fn case_version_from_row(row: &Row<'_>) -> rusqlite::Result<CaseVersion> {
    Ok(CaseVersion {
        id: row.get(0)?,
        case_id: row.get(1)?,
        name: row.get(2)?,
        created_by: row.get(3)?,
        created_at_us: row.get(4)?,
    })
}

fn step_version_from_row(row: &Row<'_>) -> rusqlite::Result<StepVersion> {
    Ok(StepVersion {
        id: row.get(0)?,
        version_id: row.get(1)?,
        position: row.get(2)?,
        action: row.get(3)?,
        data: row.get(4)?,
        expected: row.get(5)?,
        selector: row.get(6)?,
        generated_code: row.get(7)?,
        disabled: row.get(8)?,
    })
}

// ---------------------------------------------------------------------------
// Projects
// ---------------------------------------------------------------------------

/// Insert a project and return it with its assigned id.
///
/// # Errors
///
/// [`Error::Store`] on statement failure.
pub fn insert_project(conn: &Connection, name: &str, actor: &str, now_us: i64) -> Result<Project> {
    conn.execute(
        "INSERT INTO projects (name, created_by, created_at_us, updated_at_us)
         VALUES (?1, ?2, ?3, ?3)",
        params![name, actor, now_us],
    )?;
    let id = conn.last_insert_rowid();
    Ok(Project {
        id,
        name: name.to_string(),
        created_by: actor.to_string(),
        created_at_us: now_us,
        updated_at_us: now_us,
    })
}

/// Load a project by id.
///
/// # Errors
///
/// [`Error::NotFound`] if no such project; [`Error::Store`] otherwise.
pub fn get_project(conn: &Connection, project_id: i64) -> Result<Project> {
    conn.query_row(
        "SELECT project_id, name, created_by, created_at_us, updated_at_us
         FROM projects WHERE project_id = ?1",
        params![project_id],
        project_from_row,
    )
    .optional()?
    .ok_or(Error::not_found(EntityKind::Project, project_id))
}

/// All projects, oldest first.
///
/// # Errors
///
/// [`Error::Store`] on statement failure.
pub fn list_projects(conn: &Connection) -> Result<Vec<Project>> {
    let mut stmt = conn.prepare(
        "SELECT project_id, name, created_by, created_at_us, updated_at_us
         FROM projects ORDER BY project_id ASC",
    )?;
    let projects = stmt
        .query_map([], project_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(projects)
}

// ---------------------------------------------------------------------------
// Test cases
// ---------------------------------------------------------------------------

/// Load a test case by id, regardless of project.
///
/// # Errors
///
/// [`Error::NotFound`] if no such case; [`Error::Store`] otherwise.
pub fn get_case(conn: &Connection, case_id: i64) -> Result<TestCase> {
    conn.query_row(
        &format!("SELECT {CASE_COLUMNS} FROM test_cases WHERE case_id = ?1"),
        params![case_id],
        case_from_row,
    )
    .optional()?
    .ok_or(Error::not_found(EntityKind::Case, case_id))
}

/// Load a test case and verify it belongs to `project_id`.
///
/// A case that exists under a different project is reported as
/// [`Error::NotFound`], indistinguishable from a missing one.
///
/// # Errors
///
/// [`Error::NotFound`] or [`Error::Store`].
pub fn get_case_in_project(conn: &Connection, project_id: i64, case_id: i64) -> Result<TestCase> {
    conn.query_row(
        &format!(
            "SELECT {CASE_COLUMNS} FROM test_cases
             WHERE case_id = ?1 AND project_id = ?2"
        ),
        params![case_id, project_id],
        case_from_row,
    )
    .optional()?
    .ok_or(Error::not_found(EntityKind::Case, case_id))
}

/// The project's cases ordered by position ascending.
///
/// # Errors
///
/// [`Error::Store`] on statement failure.
pub fn list_cases(conn: &Connection, project_id: i64) -> Result<Vec<TestCase>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {CASE_COLUMNS} FROM test_cases
         WHERE project_id = ?1
         ORDER BY position ASC, case_id ASC"
    ))?;
    let cases = stmt
        .query_map(params![project_id], case_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(cases)
}

/// Highest case position in the project, `None` when it has no cases.
///
/// # Errors
///
/// [`Error::Store`] on statement failure.
pub fn max_case_position(conn: &Connection, project_id: i64) -> Result<Option<i64>> {
    let max: Option<i64> = conn.query_row(
        "SELECT MAX(position) FROM test_cases WHERE project_id = ?1",
        params![project_id],
        |row| row.get(0),
    )?;
    Ok(max)
}

/// Insert a test case at `position` and return it with its assigned id.
///
/// # Errors
///
/// [`Error::Store`] on statement failure.
pub fn insert_case(
    conn: &Connection,
    project_id: i64,
    name: &str,
    position: i64,
    actor: &str,
    now_us: i64,
) -> Result<TestCase> {
    conn.execute(
        "INSERT INTO test_cases (
            project_id, name, position, created_by, updated_by,
            created_at_us, updated_at_us
         ) VALUES (?1, ?2, ?3, ?4, ?4, ?5, ?5)",
        params![project_id, name, position, actor, now_us],
    )?;
    let id = conn.last_insert_rowid();
    Ok(TestCase {
        id,
        project_id,
        name: name.to_string(),
        position,
        created_by: actor.to_string(),
        updated_by: actor.to_string(),
        created_at_us: now_us,
        updated_at_us: now_us,
    })
}

/// Write one case's position. Coordinator-only write path.
///
/// # Errors
///
/// [`Error::Store`] on statement failure.
pub fn update_case_position(
    conn: &Connection,
    case_id: i64,
    position: i64,
    actor: &str,
    now_us: i64,
) -> Result<usize> {
    let changed = conn.execute(
        "UPDATE test_cases
         SET position = ?2, updated_by = ?3, updated_at_us = ?4
         WHERE case_id = ?1",
        params![case_id, position, actor, now_us],
    )?;
    Ok(changed)
}

/// Delete one case by id within a project. Returns the deleted row count.
///
/// # Errors
///
/// [`Error::Store`] on statement failure.
pub fn delete_case_row(conn: &Connection, project_id: i64, case_id: i64) -> Result<usize> {
    let deleted = conn.execute(
        "DELETE FROM test_cases WHERE case_id = ?1 AND project_id = ?2",
        params![case_id, project_id],
    )?;
    Ok(deleted)
}

// ---------------------------------------------------------------------------
// Test steps
// ---------------------------------------------------------------------------

/// Load a step by id, regardless of case.
///
/// # Errors
///
/// [`Error::NotFound`] if no such step; [`Error::Store`] otherwise.
pub fn get_step(conn: &Connection, step_id: i64) -> Result<TestStep> {
    conn.query_row(
        &format!("SELECT {STEP_COLUMNS} FROM test_steps WHERE step_id = ?1"),
        params![step_id],
        step_from_row,
    )
    .optional()?
    .ok_or(Error::not_found(EntityKind::Step, step_id))
}

/// Load a step verifying its full ancestry chain: the step must belong to
/// `case_id`, and that case must belong to `project_id`.
///
/// Any break in the chain is a uniform [`Error::NotFound`]: a step from
/// another project must not be distinguishable from a missing one.
///
/// # Errors
///
/// [`Error::NotFound`] or [`Error::Store`].
pub fn get_step_in_scope(
    conn: &Connection,
    project_id: i64,
    case_id: i64,
    step_id: i64,
) -> Result<TestStep> {
    conn.query_row(
        &format!(
            "SELECT {columns} FROM test_steps s
             JOIN test_cases c ON c.case_id = s.case_id
             WHERE s.step_id = ?1 AND s.case_id = ?2 AND c.project_id = ?3",
            columns = "s.step_id, s.case_id, s.position, s.action, s.data, s.expected, \
                       s.selector, s.generated_code, s.disabled, s.created_by, s.updated_by, \
                       s.created_at_us, s.updated_at_us"
        ),
        params![step_id, case_id, project_id],
        step_from_row,
    )
    .optional()?
    .ok_or(Error::not_found(EntityKind::Step, step_id))
}

/// The case's steps ordered by position ascending.
///
/// # Errors
///
/// [`Error::Store`] on statement failure.
pub fn list_steps(conn: &Connection, case_id: i64) -> Result<Vec<TestStep>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {STEP_COLUMNS} FROM test_steps
         WHERE case_id = ?1
         ORDER BY position ASC, step_id ASC"
    ))?;
    let steps = stmt
        .query_map(params![case_id], step_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(steps)
}

/// Ids of the case's steps ordered by position ascending.
///
/// # Errors
///
/// [`Error::Store`] on statement failure.
pub fn list_step_ids(conn: &Connection, case_id: i64) -> Result<Vec<i64>> {
    let mut stmt = conn.prepare(
        "SELECT step_id FROM test_steps
         WHERE case_id = ?1
         ORDER BY position ASC, step_id ASC",
    )?;
    let ids = stmt
        .query_map(params![case_id], |row| row.get(0))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(ids)
}

/// Highest step position in the case, `None` when it has no steps.
///
/// # Errors
///
/// [`Error::Store`] on statement failure.
pub fn max_step_position(conn: &Connection, case_id: i64) -> Result<Option<i64>> {
    let max: Option<i64> = conn.query_row(
        "SELECT MAX(position) FROM test_steps WHERE case_id = ?1",
        params![case_id],
        |row| row.get(0),
    )?;
    Ok(max)
}

/// Insert a step at `position` and return it with its assigned id.
///
/// `disabled` is always stored as its default here; new and cloned steps
/// start enabled.
///
/// # Errors
///
/// [`Error::Store`] on statement failure.
pub fn insert_step(
    conn: &Connection,
    case_id: i64,
    content: &NewStep,
    position: i64,
    actor: &str,
    now_us: i64,
) -> Result<TestStep> {
    conn.execute(
        "INSERT INTO test_steps (
            case_id, position, action, data, expected, selector,
            generated_code, disabled, created_by, updated_by,
            created_at_us, updated_at_us
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 0, ?8, ?8, ?9, ?9)",
        params![
            case_id,
            position,
            content.action,
            content.data,
            content.expected,
            content.selector,
            content.generated_code,
            actor,
            now_us
        ],
    )?;
    let id = conn.last_insert_rowid();
    Ok(TestStep {
        id,
        case_id,
        position,
        action: content.action.clone(),
        data: content.data.clone(),
        expected: content.expected.clone(),
        selector: content.selector.clone(),
        generated_code: content.generated_code.clone(),
        disabled: false,
        created_by: actor.to_string(),
        updated_by: actor.to_string(),
        created_at_us: now_us,
        updated_at_us: now_us,
    })
}

/// Write one step's position. Coordinator-only write path.
///
/// # Errors
///
/// [`Error::Store`] on statement failure.
pub fn update_step_position(
    conn: &Connection,
    step_id: i64,
    position: i64,
    actor: &str,
    now_us: i64,
) -> Result<usize> {
    let changed = conn.execute(
        "UPDATE test_steps
         SET position = ?2, updated_by = ?3, updated_at_us = ?4
         WHERE step_id = ?1",
        params![step_id, position, actor, now_us],
    )?;
    Ok(changed)
}

/// Write one step's disabled flag.
///
/// # Errors
///
/// [`Error::Store`] on statement failure.
pub fn set_step_disabled(conn: &Connection, step_id: i64, disabled: bool) -> Result<usize> {
    let changed = conn.execute(
        "UPDATE test_steps SET disabled = ?2 WHERE step_id = ?1",
        params![step_id, disabled],
    )?;
    Ok(changed)
}

/// Delete the given step ids scoped to one case. Ids outside the case are
/// ignored. Returns the number of rows actually deleted.
///
/// # Errors
///
/// [`Error::Store`] on statement failure.
pub fn delete_step_rows(conn: &Connection, case_id: i64, ids: &[i64]) -> Result<usize> {
    let mut deleted = 0;
    let mut stmt =
        conn.prepare("DELETE FROM test_steps WHERE step_id = ?1 AND case_id = ?2")?;
    for id in ids {
        deleted += stmt.execute(params![id, case_id])?;
    }
    Ok(deleted)
}

// ---------------------------------------------------------------------------
// Versions
// ---------------------------------------------------------------------------

/// Insert a case version row and return it with its assigned id.
///
/// # Errors
///
/// [`Error::Store`] on statement failure.
pub fn insert_case_version(
    conn: &Connection,
    case_id: i64,
    name: &str,
    actor: &str,
    now_us: i64,
) -> Result<CaseVersion> {
    conn.execute(
        "INSERT INTO case_versions (case_id, name, created_by, created_at_us)
         VALUES (?1, ?2, ?3, ?4)",
        params![case_id, name, actor, now_us],
    )?;
    let id = conn.last_insert_rowid();
    Ok(CaseVersion {
        id,
        case_id,
        name: name.to_string(),
        created_by: actor.to_string(),
        created_at_us: now_us,
    })
}

/// Copy one live step into a version. `position` is frozen from the step.
///
/// # Errors
///
/// [`Error::Store`] on statement failure.
pub fn insert_step_version(
    conn: &Connection,
    version_id: i64,
    step: &TestStep,
) -> Result<StepVersion> {
    conn.execute(
        "INSERT INTO step_versions (
            version_id, position, action, data, expected, selector,
            generated_code, disabled
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            version_id,
            step.position,
            step.action,
            step.data,
            step.expected,
            step.selector,
            step.generated_code,
            step.disabled
        ],
    )?;
    let id = conn.last_insert_rowid();
    Ok(StepVersion {
        id,
        version_id,
        position: step.position,
        action: step.action.clone(),
        data: step.data.clone(),
        expected: step.expected.clone(),
        selector: step.selector.clone(),
        generated_code: step.generated_code.clone(),
        disabled: step.disabled,
    })
}

/// Load a case version by id, regardless of owning case.
///
/// # Errors
///
/// [`Error::NotFound`] if no such version; [`Error::Store`] otherwise.
pub fn get_case_version(conn: &Connection, version_id: i64) -> Result<CaseVersion> {
    conn.query_row(
        "SELECT version_id, case_id, name, created_by, created_at_us
         FROM case_versions WHERE version_id = ?1",
        params![version_id],
        case_version_from_row,
    )
    .optional()?
    .ok_or(Error::not_found(EntityKind::Version, version_id))
}

/// The version's step copies ordered by their frozen position ascending.
///
/// # Errors
///
/// [`Error::Store`] on statement failure.
pub fn list_step_versions(conn: &Connection, version_id: i64) -> Result<Vec<StepVersion>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {STEP_VERSION_COLUMNS} FROM step_versions
         WHERE version_id = ?1
         ORDER BY position ASC, step_version_id ASC"
    ))?;
    let steps = stmt
        .query_map(params![version_id], step_version_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(steps)
}

/// The case's versions, newest first.
///
/// # Errors
///
/// [`Error::Store`] on statement failure.
pub fn list_case_versions(conn: &Connection, case_id: i64) -> Result<Vec<CaseVersion>> {
    let mut stmt = conn.prepare(
        "SELECT version_id, case_id, name, created_by, created_at_us
         FROM case_versions
         WHERE case_id = ?1
         ORDER BY created_at_us DESC, version_id DESC",
    )?;
    let versions = stmt
        .query_map(params![case_id], case_version_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(versions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_in_memory;
    use crate::error::Error;
    use crate::model::NewStep;

    fn step_content(action: &str) -> NewStep {
        NewStep {
            action: action.to_string(),
            ..NewStep::default()
        }
    }

    #[test]
    fn insert_and_get_round_trip() {
        let conn = open_in_memory().expect("open store");
        let project = insert_project(&conn, "Web", "alice", 10).expect("insert project");
        let case =
            insert_case(&conn, project.id, "Login", 1, "alice", 11).expect("insert case");
        let step =
            insert_step(&conn, case.id, &step_content("click"), 1, "alice", 12).expect("step");

        assert_eq!(get_project(&conn, project.id).expect("project"), project);
        assert_eq!(get_case(&conn, case.id).expect("case"), case);
        assert_eq!(get_step(&conn, step.id).expect("step"), step);
    }

    #[test]
    fn get_case_in_project_hides_foreign_cases() {
        let conn = open_in_memory().expect("open store");
        let mine = insert_project(&conn, "Mine", "alice", 1).expect("project");
        let other = insert_project(&conn, "Other", "alice", 1).expect("project");
        let case = insert_case(&conn, other.id, "Foreign", 1, "alice", 2).expect("case");

        let err = get_case_in_project(&conn, mine.id, case.id).unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));

        assert!(get_case_in_project(&conn, other.id, case.id).is_ok());
    }

    #[test]
    fn get_step_in_scope_checks_full_ancestry() {
        let conn = open_in_memory().expect("open store");
        let project_a = insert_project(&conn, "A", "alice", 1).expect("project");
        let project_b = insert_project(&conn, "B", "alice", 1).expect("project");
        let case_a = insert_case(&conn, project_a.id, "CA", 1, "alice", 2).expect("case");
        let case_b = insert_case(&conn, project_b.id, "CB", 1, "alice", 2).expect("case");
        let step = insert_step(&conn, case_a.id, &step_content("click"), 1, "alice", 3)
            .expect("step");

        // Right case, wrong project: the chain breaks at the project link.
        let err = get_step_in_scope(&conn, project_b.id, case_a.id, step.id).unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));

        // Wrong case in the right project.
        let err = get_step_in_scope(&conn, project_b.id, case_b.id, step.id).unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));

        assert!(get_step_in_scope(&conn, project_a.id, case_a.id, step.id).is_ok());
    }

    #[test]
    fn list_steps_orders_by_position() {
        let conn = open_in_memory().expect("open store");
        let project = insert_project(&conn, "Web", "alice", 1).expect("project");
        let case = insert_case(&conn, project.id, "Login", 1, "alice", 2).expect("case");

        insert_step(&conn, case.id, &step_content("third"), 3, "alice", 3).expect("step");
        insert_step(&conn, case.id, &step_content("first"), 1, "alice", 4).expect("step");
        insert_step(&conn, case.id, &step_content("second"), 2, "alice", 5).expect("step");

        let actions: Vec<String> = list_steps(&conn, case.id)
            .expect("list")
            .into_iter()
            .map(|step| step.action)
            .collect();
        assert_eq!(actions, vec!["first", "second", "third"]);
    }

    #[test]
    fn max_positions_are_none_for_empty_sets() {
        let conn = open_in_memory().expect("open store");
        let project = insert_project(&conn, "Web", "alice", 1).expect("project");
        let case = insert_case(&conn, project.id, "Empty", 1, "alice", 2).expect("case");

        assert_eq!(max_step_position(&conn, case.id).expect("max"), None);
        assert_eq!(
            max_case_position(&conn, project.id).expect("max"),
            Some(1)
        );
    }

    #[test]
    fn delete_step_rows_ignores_out_of_scope_ids() {
        let conn = open_in_memory().expect("open store");
        let project = insert_project(&conn, "Web", "alice", 1).expect("project");
        let case_a = insert_case(&conn, project.id, "A", 1, "alice", 2).expect("case");
        let case_b = insert_case(&conn, project.id, "B", 2, "alice", 2).expect("case");
        let step_a = insert_step(&conn, case_a.id, &step_content("a"), 1, "alice", 3)
            .expect("step");
        let step_b = insert_step(&conn, case_b.id, &step_content("b"), 1, "alice", 3)
            .expect("step");

        // step_b belongs to another case: not deleted, not counted.
        let deleted =
            delete_step_rows(&conn, case_a.id, &[step_a.id, step_b.id]).expect("delete");
        assert_eq!(deleted, 1);
        assert!(get_step(&conn, step_b.id).is_ok());
    }
}
