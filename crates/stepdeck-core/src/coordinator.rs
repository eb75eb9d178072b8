//! Mutation coordinator: structural changes to sibling sets.
//!
//! Every operation here follows the same contract:
//!
//! 1. validate the payload before touching the store (fail fast,
//!    [`Error::Validation`], zero store access on malformed input)
//! 2. verify the owning scope and, where cloning, the full ancestry chain
//!    (uniform [`Error::NotFound`]; cross-scope access never leaks
//!    existence)
//! 3. compute the new position assignment with [`crate::ordering`]
//! 4. commit every write inside one store transaction, so readers never
//!    observe a sibling set with duplicate or missing positions
//!    mid-operation
//!
//! Concurrent operations on the same sibling set serialize at SQLite's
//! transaction level; the last commit wins. No optimistic-concurrency
//! token is kept (see DESIGN.md).
//!
//! This module is the only writer of the `position` column on live rows.

use rusqlite::Connection;
use tracing::debug;

use crate::clock;
use crate::db::store;
use crate::error::{EntityKind, Error, ErrorCode, Result};
use crate::model::{NewStep, Project, TestCase, TestStep};
use crate::ordering::{
    self, OrderAssignment, OrderingError, compute_append_position, compute_reindex_after_removal,
};

fn map_ordering_error(error: OrderingError) -> Error {
    match error {
        OrderingError::UnknownSibling { id } => Error::not_found(EntityKind::Step, id),
    }
}

fn map_case_ordering_error(error: OrderingError) -> Error {
    match error {
        OrderingError::UnknownSibling { id } => Error::not_found(EntityKind::Case, id),
    }
}

// ---------------------------------------------------------------------------
// Creation
// ---------------------------------------------------------------------------

/// Create a project.
///
/// # Errors
///
/// [`Error::Validation`] on a blank name; [`Error::Store`] otherwise.
pub fn create_project(conn: &mut Connection, name: &str, actor: &str) -> Result<Project> {
    if name.trim().is_empty() {
        return Err(Error::validation("project name is empty", ErrorCode::MissingField));
    }

    let project = store::insert_project(conn, name, actor, clock::now_us())?;
    debug!(project_id = project.id, "created project");
    Ok(project)
}

/// Create a test case appended to the end of the project's case list.
///
/// # Errors
///
/// [`Error::Validation`] on a blank name; [`Error::NotFound`] if the
/// project does not exist; [`Error::Store`] otherwise.
pub fn create_case(
    conn: &mut Connection,
    project_id: i64,
    name: &str,
    actor: &str,
) -> Result<TestCase> {
    if name.trim().is_empty() {
        return Err(Error::validation("case name is empty", ErrorCode::MissingField));
    }

    let tx = conn.transaction()?;
    store::get_project(&tx, project_id)?;
    let position = compute_append_position(store::max_case_position(&tx, project_id)?);
    let case = store::insert_case(&tx, project_id, name, position, actor, clock::now_us())?;
    tx.commit()?;

    debug!(case_id = case.id, project_id, position, "created test case");
    Ok(case)
}

/// Create a step appended to the end of the case's step list.
///
/// # Errors
///
/// [`Error::Validation`] on a blank action; [`Error::NotFound`] if the
/// case does not exist; [`Error::Store`] otherwise.
pub fn create_step(
    conn: &mut Connection,
    case_id: i64,
    content: &NewStep,
    actor: &str,
) -> Result<TestStep> {
    if content.action.trim().is_empty() {
        return Err(Error::validation("step action is empty", ErrorCode::MissingField));
    }

    let tx = conn.transaction()?;
    store::get_case(&tx, case_id)?;
    let position = compute_append_position(store::max_step_position(&tx, case_id)?);
    let step = store::insert_step(&tx, case_id, content, position, actor, clock::now_us())?;
    tx.commit()?;

    debug!(step_id = step.id, case_id, position, "created test step");
    Ok(step)
}

// ---------------------------------------------------------------------------
// Reorder
// ---------------------------------------------------------------------------

/// Apply a caller-supplied position assignment to the steps of one case.
///
/// The requested positions are persisted verbatim (no renumbering); all
/// updates land in one transaction, so either the whole assignment is
/// visible or none of it is.
///
/// # Errors
///
/// [`Error::Validation`] on an empty payload; [`Error::NotFound`] if the
/// case is missing or any requested id is not one of its steps (nothing
/// is written in that case); [`Error::Store`] otherwise.
pub fn reorder_steps(
    conn: &mut Connection,
    case_id: i64,
    requested: &[OrderAssignment],
    actor: &str,
) -> Result<()> {
    if requested.is_empty() {
        return Err(Error::validation(
            "reorder payload is empty",
            ErrorCode::EmptyPayload,
        ));
    }

    let tx = conn.transaction()?;
    store::get_case(&tx, case_id)?;

    let current: Vec<OrderAssignment> = store::list_steps(&tx, case_id)?
        .iter()
        .map(|step| OrderAssignment {
            id: step.id,
            position: step.position,
        })
        .collect();
    let assignment =
        ordering::compute_reorder(&current, requested).map_err(map_ordering_error)?;

    let now_us = clock::now_us();
    for entry in &assignment {
        store::update_step_position(&tx, entry.id, entry.position, actor, now_us)?;
    }
    tx.commit()?;

    debug!(case_id, updated = assignment.len(), "reordered steps");
    Ok(())
}

/// Apply a caller-supplied position assignment to the cases of one project.
///
/// Same contract as [`reorder_steps`], one sibling level up.
///
/// # Errors
///
/// [`Error::Validation`], [`Error::NotFound`], or [`Error::Store`] as for
/// [`reorder_steps`].
pub fn reorder_cases(
    conn: &mut Connection,
    project_id: i64,
    requested: &[OrderAssignment],
    actor: &str,
) -> Result<()> {
    if requested.is_empty() {
        return Err(Error::validation(
            "reorder payload is empty",
            ErrorCode::EmptyPayload,
        ));
    }

    let tx = conn.transaction()?;
    store::get_project(&tx, project_id)?;

    let current: Vec<OrderAssignment> = store::list_cases(&tx, project_id)?
        .iter()
        .map(|case| OrderAssignment {
            id: case.id,
            position: case.position,
        })
        .collect();
    let assignment =
        ordering::compute_reorder(&current, requested).map_err(map_case_ordering_error)?;

    let now_us = clock::now_us();
    for entry in &assignment {
        store::update_case_position(&tx, entry.id, entry.position, actor, now_us)?;
    }
    tx.commit()?;

    debug!(project_id, updated = assignment.len(), "reordered cases");
    Ok(())
}

// ---------------------------------------------------------------------------
// Deletion
// ---------------------------------------------------------------------------

/// Delete a set of steps from one case, then reindex the survivors to a
/// dense 1..N sequence preserving their relative order.
///
/// Ids that do not belong to the case are ignored (and not counted).
/// Delete and reindex share one transaction, so no reader observes the
/// intermediate gapped state. Returns the number of steps deleted.
///
/// # Errors
///
/// [`Error::Validation`] on an empty id list; [`Error::NotFound`] if the
/// case does not exist; [`Error::Store`] otherwise.
pub fn bulk_delete_steps(
    conn: &mut Connection,
    case_id: i64,
    ids: &[i64],
    actor: &str,
) -> Result<usize> {
    if ids.is_empty() {
        return Err(Error::validation("ids list is empty", ErrorCode::EmptyPayload));
    }

    let tx = conn.transaction()?;
    store::get_case(&tx, case_id)?;

    let deleted = store::delete_step_rows(&tx, case_id, ids)?;

    let remaining = store::list_step_ids(&tx, case_id)?;
    let now_us = clock::now_us();
    for entry in compute_reindex_after_removal(&remaining) {
        store::update_step_position(&tx, entry.id, entry.position, actor, now_us)?;
    }
    tx.commit()?;

    debug!(case_id, deleted, survivors = remaining.len(), "bulk-deleted steps");
    Ok(deleted)
}

/// Delete one test case from a project, then reindex the remaining cases.
///
/// Step rows cascade with the case; sibling cases are renumbered to a
/// dense sequence in the same transaction.
///
/// # Errors
///
/// [`Error::NotFound`] if the case is missing or belongs to a different
/// project; [`Error::Store`] otherwise.
pub fn delete_case(
    conn: &mut Connection,
    project_id: i64,
    case_id: i64,
    actor: &str,
) -> Result<()> {
    let tx = conn.transaction()?;
    store::get_case_in_project(&tx, project_id, case_id)?;
    store::delete_case_row(&tx, project_id, case_id)?;

    let remaining: Vec<i64> = store::list_cases(&tx, project_id)?
        .iter()
        .map(|case| case.id)
        .collect();
    let now_us = clock::now_us();
    for entry in compute_reindex_after_removal(&remaining) {
        store::update_case_position(&tx, entry.id, entry.position, actor, now_us)?;
    }
    tx.commit()?;

    debug!(case_id, project_id, "deleted test case");
    Ok(())
}

// ---------------------------------------------------------------------------
// Clone
// ---------------------------------------------------------------------------

/// Clone a step to the end of its own case's step list.
///
/// The source is verified against the full ancestry chain (step → case →
/// project); content fields are copied, identity and position are fresh,
/// and the clone is always enabled regardless of the source's `disabled`
/// flag.
///
/// # Errors
///
/// [`Error::NotFound`] on any ancestry break; [`Error::Store`] otherwise.
pub fn clone_step(
    conn: &mut Connection,
    project_id: i64,
    case_id: i64,
    source_step_id: i64,
    actor: &str,
) -> Result<TestStep> {
    let tx = conn.transaction()?;
    let source = store::get_step_in_scope(&tx, project_id, case_id, source_step_id)?;

    let position = compute_append_position(store::max_step_position(&tx, case_id)?);
    let clone = store::insert_step(
        &tx,
        case_id,
        &source.content(),
        position,
        actor,
        clock::now_us(),
    )?;
    tx.commit()?;

    debug!(
        source_step_id,
        clone_step_id = clone.id,
        position,
        "cloned test step"
    );
    Ok(clone)
}

/// Clone a test case to the end of the project's case list, copying its
/// steps with their positions preserved.
///
/// Step clones keep the source steps' `disabled` flags — disabling is
/// part of a case's step sequence, unlike a single-step clone which
/// always starts enabled.
///
/// # Errors
///
/// [`Error::NotFound`] if the source case is missing or belongs to a
/// different project; [`Error::Store`] otherwise.
pub fn clone_case(
    conn: &mut Connection,
    project_id: i64,
    source_case_id: i64,
    actor: &str,
) -> Result<TestCase> {
    let tx = conn.transaction()?;
    let source = store::get_case_in_project(&tx, project_id, source_case_id)?;

    let now_us = clock::now_us();
    let position = compute_append_position(store::max_case_position(&tx, project_id)?);
    let clone = store::insert_case(
        &tx,
        project_id,
        &format!("{} (copy)", source.name),
        position,
        actor,
        now_us,
    )?;

    for step in store::list_steps(&tx, source_case_id)? {
        let copied =
            store::insert_step(&tx, clone.id, &step.content(), step.position, actor, now_us)?;
        if step.disabled {
            store::set_step_disabled(&tx, copied.id, true)?;
        }
    }
    tx.commit()?;

    debug!(
        source_case_id,
        clone_case_id = clone.id,
        position,
        "cloned test case"
    );
    Ok(clone)
}

// ---------------------------------------------------------------------------
// Single-position update
// ---------------------------------------------------------------------------

/// Write one step's position directly, without renumbering its siblings.
///
/// This is deliberately a lower-guarantee operation than a full reorder:
/// the caller is responsible for avoiding position collisions. The next
/// bulk delete normalizes the set back to a dense sequence.
///
/// # Errors
///
/// [`Error::Validation`] if `new_position` is negative;
/// [`Error::NotFound`] if the step does not exist; [`Error::Store`]
/// otherwise.
pub fn set_step_position(
    conn: &mut Connection,
    step_id: i64,
    new_position: i64,
    actor: &str,
) -> Result<()> {
    if new_position < 0 {
        return Err(Error::validation(
            format!("position {new_position} is negative"),
            ErrorCode::NegativePosition,
        ));
    }

    let tx = conn.transaction()?;
    store::get_step(&tx, step_id)?;
    store::update_step_position(&tx, step_id, new_position, actor, clock::now_us())?;
    tx.commit()?;

    debug!(step_id, new_position, "updated single step position");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_in_memory;
    use crate::error::{Error, ErrorCode};
    use crate::model::NewStep;

    fn harness() -> (Connection, i64, i64) {
        let mut conn = open_in_memory().expect("open store");
        let project = create_project(&mut conn, "Web checkout", "alice").expect("project");
        let case = create_case(&mut conn, project.id, "Login", "alice").expect("case");
        (conn, project.id, case.id)
    }

    fn add_step(conn: &mut Connection, case_id: i64, action: &str) -> TestStep {
        let content = NewStep {
            action: action.to_string(),
            ..NewStep::default()
        };
        create_step(conn, case_id, &content, "alice").expect("create step")
    }

    fn positions(conn: &Connection, case_id: i64) -> Vec<(i64, i64)> {
        store::list_steps(conn, case_id)
            .expect("list steps")
            .iter()
            .map(|step| (step.id, step.position))
            .collect()
    }

    #[test]
    fn create_step_appends_at_end() {
        let (mut conn, _, case_id) = harness();
        let first = add_step(&mut conn, case_id, "open");
        let second = add_step(&mut conn, case_id, "click");

        assert_eq!(first.position, 1);
        assert_eq!(second.position, 2);
    }

    #[test]
    fn create_step_rejects_blank_action() {
        let (mut conn, _, case_id) = harness();
        let err = create_step(&mut conn, case_id, &NewStep::default(), "alice").unwrap_err();
        assert_eq!(err.code(), ErrorCode::MissingField);
    }

    #[test]
    fn reorder_steps_persists_payload_verbatim() {
        let (mut conn, _, case_id) = harness();
        let a = add_step(&mut conn, case_id, "a");
        let b = add_step(&mut conn, case_id, "b");
        let c = add_step(&mut conn, case_id, "c");

        let requested = [
            OrderAssignment { id: c.id, position: 1 },
            OrderAssignment { id: a.id, position: 2 },
            OrderAssignment { id: b.id, position: 3 },
        ];
        reorder_steps(&mut conn, case_id, &requested, "alice").expect("reorder");

        assert_eq!(
            positions(&conn, case_id),
            vec![(c.id, 1), (a.id, 2), (b.id, 3)]
        );
    }

    #[test]
    fn reorder_steps_is_idempotent() {
        let (mut conn, _, case_id) = harness();
        let a = add_step(&mut conn, case_id, "a");
        let b = add_step(&mut conn, case_id, "b");

        let requested = [
            OrderAssignment { id: b.id, position: 1 },
            OrderAssignment { id: a.id, position: 2 },
        ];
        reorder_steps(&mut conn, case_id, &requested, "alice").expect("first");
        let after_once = positions(&conn, case_id);
        reorder_steps(&mut conn, case_id, &requested, "alice").expect("second");

        assert_eq!(positions(&conn, case_id), after_once);
    }

    #[test]
    fn reorder_steps_rejects_empty_payload() {
        let (mut conn, _, case_id) = harness();
        let err = reorder_steps(&mut conn, case_id, &[], "alice").unwrap_err();
        assert_eq!(err.code(), ErrorCode::EmptyPayload);
    }

    #[test]
    fn reorder_steps_unknown_id_writes_nothing() {
        let (mut conn, _, case_id) = harness();
        let a = add_step(&mut conn, case_id, "a");
        let b = add_step(&mut conn, case_id, "b");
        let before = positions(&conn, case_id);

        let requested = [
            OrderAssignment { id: b.id, position: 1 },
            OrderAssignment { id: 9_999, position: 2 },
            OrderAssignment { id: a.id, position: 3 },
        ];
        let err = reorder_steps(&mut conn, case_id, &requested, "alice").unwrap_err();

        assert!(matches!(err, Error::NotFound { .. }));
        assert_eq!(positions(&conn, case_id), before, "no partial writes");
    }

    #[test]
    fn reorder_steps_missing_case_is_not_found() {
        let (mut conn, _, _) = harness();
        let requested = [OrderAssignment { id: 1, position: 1 }];
        let err = reorder_steps(&mut conn, 404, &requested, "alice").unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
    }

    #[test]
    fn reorder_cases_reorders_project_siblings() {
        let (mut conn, project_id, first_case) = harness();
        let second_case = create_case(&mut conn, project_id, "Checkout", "alice")
            .expect("case")
            .id;

        let requested = [
            OrderAssignment { id: second_case, position: 1 },
            OrderAssignment { id: first_case, position: 2 },
        ];
        reorder_cases(&mut conn, project_id, &requested, "alice").expect("reorder");

        let ordered: Vec<i64> = store::list_cases(&conn, project_id)
            .expect("list")
            .iter()
            .map(|case| case.id)
            .collect();
        assert_eq!(ordered, vec![second_case, first_case]);
    }

    #[test]
    fn bulk_delete_reindexes_survivors_densely() {
        // Scenario: orders [1,2,3,4], delete the steps at 2 and 3,
        // survivors become [1,2].
        let (mut conn, _, case_id) = harness();
        let s1 = add_step(&mut conn, case_id, "s1");
        let s2 = add_step(&mut conn, case_id, "s2");
        let s3 = add_step(&mut conn, case_id, "s3");
        let s4 = add_step(&mut conn, case_id, "s4");

        let deleted =
            bulk_delete_steps(&mut conn, case_id, &[s2.id, s3.id], "alice").expect("delete");

        assert_eq!(deleted, 2);
        assert_eq!(positions(&conn, case_id), vec![(s1.id, 1), (s4.id, 2)]);
    }

    #[test]
    fn bulk_delete_rejects_empty_ids() {
        let (mut conn, _, case_id) = harness();
        let err = bulk_delete_steps(&mut conn, case_id, &[], "alice").unwrap_err();
        assert_eq!(err.code(), ErrorCode::EmptyPayload);
    }

    #[test]
    fn bulk_delete_counts_only_in_scope_rows() {
        let (mut conn, project_id, case_id) = harness();
        let other_case = create_case(&mut conn, project_id, "Other", "alice")
            .expect("case")
            .id;
        let mine = add_step(&mut conn, case_id, "mine");
        let foreign = add_step(&mut conn, other_case, "foreign");

        let deleted = bulk_delete_steps(&mut conn, case_id, &[mine.id, foreign.id], "alice")
            .expect("delete");

        assert_eq!(deleted, 1);
        assert_eq!(positions(&conn, other_case), vec![(foreign.id, 1)]);
    }

    #[test]
    fn delete_case_reindexes_remaining_cases() {
        let (mut conn, project_id, first_case) = harness();
        let second = create_case(&mut conn, project_id, "Second", "alice").expect("case");
        let third = create_case(&mut conn, project_id, "Third", "alice").expect("case");

        delete_case(&mut conn, project_id, second.id, "alice").expect("delete");

        let ordered: Vec<(i64, i64)> = store::list_cases(&conn, project_id)
            .expect("list")
            .iter()
            .map(|case| (case.id, case.position))
            .collect();
        assert_eq!(ordered, vec![(first_case, 1), (third.id, 2)]);
    }

    #[test]
    fn clone_step_appends_past_max_and_resets_disabled() {
        let (mut conn, project_id, case_id) = harness();
        let source = add_step(&mut conn, case_id, "click");
        conn.execute(
            "UPDATE test_steps SET disabled = 1, position = 5 WHERE step_id = ?1",
            [source.id],
        )
        .expect("mark source disabled at position 5");

        let clone = clone_step(&mut conn, project_id, case_id, source.id, "bob")
            .expect("clone");

        assert_eq!(clone.position, 6, "append lands past the set's max");
        assert!(!clone.disabled, "clones are always enabled");
        assert_eq!(clone.action, "click");
        assert_ne!(clone.id, source.id);
    }

    #[test]
    fn clone_step_source_from_other_case_is_not_found() {
        let (mut conn, project_id, case_id) = harness();
        let other_case = create_case(&mut conn, project_id, "Other", "alice")
            .expect("case")
            .id;
        let source = add_step(&mut conn, case_id, "click");

        // Source from a different case in the same project: ancestry breaks.
        let err = clone_step(&mut conn, project_id, other_case, source.id, "bob").unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
    }

    #[test]
    fn clone_step_rejects_cross_project_source() {
        let (mut conn, _, case_id) = harness();
        let other_project = create_project(&mut conn, "Mobile", "alice").expect("project");
        let source = add_step(&mut conn, case_id, "click");

        let err =
            clone_step(&mut conn, other_project.id, case_id, source.id, "bob").unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
    }

    #[test]
    fn clone_case_copies_steps_and_appends_case() {
        let (mut conn, project_id, case_id) = harness();
        add_step(&mut conn, case_id, "open");
        let disabled_source = add_step(&mut conn, case_id, "click");
        conn.execute(
            "UPDATE test_steps SET disabled = 1 WHERE step_id = ?1",
            [disabled_source.id],
        )
        .expect("disable step");

        let clone = clone_case(&mut conn, project_id, case_id, "bob").expect("clone");

        assert_eq!(clone.position, 2);
        assert_eq!(clone.name, "Login (copy)");

        let cloned_steps = store::list_steps(&conn, clone.id).expect("steps");
        assert_eq!(cloned_steps.len(), 2);
        assert_eq!(cloned_steps[0].position, 1);
        assert_eq!(cloned_steps[1].position, 2);
        assert!(cloned_steps[1].disabled, "case clone keeps step flags");
    }

    #[test]
    fn set_step_position_updates_one_row_only() {
        let (mut conn, _, case_id) = harness();
        let a = add_step(&mut conn, case_id, "a");
        let b = add_step(&mut conn, case_id, "b");

        set_step_position(&mut conn, a.id, 9, "alice").expect("set position");

        let rows = positions(&conn, case_id);
        assert!(rows.contains(&(b.id, 2)), "sibling untouched");
        assert!(rows.contains(&(a.id, 9)), "target moved, gap allowed");
    }

    #[test]
    fn set_step_position_rejects_negative() {
        let (mut conn, _, case_id) = harness();
        let a = add_step(&mut conn, case_id, "a");
        let err = set_step_position(&mut conn, a.id, -1, "alice").unwrap_err();
        assert_eq!(err.code(), ErrorCode::NegativePosition);
    }

    #[test]
    fn set_step_position_missing_step_is_not_found() {
        let (mut conn, _, _) = harness();
        let err = set_step_position(&mut conn, 404, 1, "alice").unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
    }
}
