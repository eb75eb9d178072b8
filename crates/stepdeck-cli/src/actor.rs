//! Actor identity resolution for audit stamping.
//!
//! The core treats the actor as an opaque string; authentication lives
//! outside this tool. The CLI resolves it, in precedence order:
//!
//! 1. `--actor` flag
//! 2. `STEPDECK_ACTOR` env var
//! 3. config `actor.default`
//! 4. `USER` env var

use std::env;

/// Raised when no actor identity can be resolved for a mutating command.
#[derive(Debug)]
pub struct MissingActor {
    pub message: String,
    pub code: &'static str,
}

/// Resolve the actor for a mutating command.
///
/// # Errors
///
/// [`MissingActor`] if no source yields a non-empty identity.
pub fn require_actor(
    actor_flag: Option<&str>,
    config_default: Option<&str>,
) -> Result<String, MissingActor> {
    let candidates = [
        actor_flag.map(str::to_string),
        env::var("STEPDECK_ACTOR").ok(),
        config_default.map(str::to_string),
        env::var("USER").ok(),
    ];

    for candidate in candidates.into_iter().flatten() {
        let trimmed = candidate.trim();
        if !trimmed.is_empty() {
            return Ok(trimmed.to_string());
        }
    }

    Err(MissingActor {
        message: "no actor identity resolved".to_string(),
        code: "E1003",
    })
}
