//! Version snapshot store: append-only copies of a case and its steps.
//!
//! Versions are immutable history. A snapshot copies the live case's
//! scalar fields and every current step (position included) in one
//! transaction, so a reader never observes a version with a partial step
//! set. Nothing here ever updates or deletes a version row; later live
//! mutation, reordering included, is invisible through a version.
//!
//! Retrieval checks that the version belongs to the case id the caller
//! named. A mismatch is reported as [`Error::NotFound`], the same outcome
//! as a missing version, so guessed ids cannot probe other cases'
//! history.

use rusqlite::Connection;
use tracing::debug;

use crate::clock;
use crate::db::store;
use crate::error::{EntityKind, Error, Result};
use crate::model::{CaseVersion, StepVersion};

/// Snapshot the live case and all of its steps as one atomic batch.
///
/// Step copies freeze their live positions; the returned steps are in
/// ascending position order.
///
/// # Errors
///
/// [`Error::NotFound`] if the case does not exist; [`Error::Store`]
/// otherwise (on failure nothing of the snapshot is visible).
pub fn create_version(
    conn: &mut Connection,
    case_id: i64,
    actor: &str,
) -> Result<(CaseVersion, Vec<StepVersion>)> {
    let tx = conn.transaction()?;
    let case = store::get_case(&tx, case_id)?;
    let live_steps = store::list_steps(&tx, case_id)?;

    let version = store::insert_case_version(&tx, case_id, &case.name, actor, clock::now_us())?;
    let mut steps = Vec::with_capacity(live_steps.len());
    for step in &live_steps {
        steps.push(store::insert_step_version(&tx, version.id, step)?);
    }
    tx.commit()?;

    debug!(case_id, version_id = version.id, steps = steps.len(), "created version");
    Ok((version, steps))
}

/// Load a version and its step copies, verifying the owning case.
///
/// Steps come back ascending by their frozen position. Repeated calls
/// return identical results unless a new version is created — versions
/// themselves never change.
///
/// # Errors
///
/// [`Error::NotFound`] if the version is missing **or** owned by a
/// different case than `expected_case_id`; [`Error::Store`] otherwise.
pub fn get_version(
    conn: &Connection,
    expected_case_id: i64,
    version_id: i64,
) -> Result<(CaseVersion, Vec<StepVersion>)> {
    let version = store::get_case_version(conn, version_id)?;
    if version.case_id != expected_case_id {
        return Err(Error::not_found(EntityKind::Version, version_id));
    }

    let steps = store::list_step_versions(conn, version_id)?;
    Ok((version, steps))
}

/// The case's versions, newest first.
///
/// # Errors
///
/// [`Error::NotFound`] if the case does not exist; [`Error::Store`]
/// otherwise.
pub fn list_versions(conn: &Connection, case_id: i64) -> Result<Vec<CaseVersion>> {
    store::get_case(conn, case_id)?;
    store::list_case_versions(conn, case_id)
}
