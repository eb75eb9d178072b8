//! Parsing for command-line reorder payloads.

use anyhow::{Result, bail};
use stepdeck_core::ordering::OrderAssignment;

/// Parse one `ID:POSITION` pair, e.g. `12:3`.
///
/// # Errors
///
/// Returns an error on anything that is not two integers joined by `:`.
pub fn parse_assignment(raw: &str) -> Result<OrderAssignment> {
    let Some((id_part, position_part)) = raw.split_once(':') else {
        bail!("expected ID:POSITION, got '{raw}'");
    };

    let id: i64 = id_part
        .trim()
        .parse()
        .map_err(|_| anyhow::anyhow!("invalid id in '{raw}'"))?;
    let position: i64 = position_part
        .trim()
        .parse()
        .map_err(|_| anyhow::anyhow!("invalid position in '{raw}'"))?;

    Ok(OrderAssignment { id, position })
}

/// Parse a full reorder payload from repeated `ID:POSITION` arguments.
///
/// # Errors
///
/// Returns an error if any pair is malformed.
pub fn parse_assignments(raw: &[String]) -> Result<Vec<OrderAssignment>> {
    raw.iter().map(|pair| parse_assignment(pair)).collect()
}
