//! Command validation
//!
//! Shape checks run before any side effect.

use crate::error::{QuorumError, Result};

use super::command::{Command, OperationKind, Request};

const COMMAND_NAME: usize = 0;
const KEY: usize = 1;
const VALUE: usize = 2;

/// Longest command name echoed back in an error
pub const MAX_ECHOED_NAME: usize = 128;

/// Check a raw command against the arity table and turn it into a `Request`
pub fn validate(command: Command) -> Result<Request> {
    if command.is_empty() {
        return Err(QuorumError::EmptyCommand);
    }

    // Table names are all shorter than the cut
    let raw = &command.args[COMMAND_NAME];
    let shown = &raw[..raw.len().min(MAX_ECHOED_NAME)];
    let name = String::from_utf8_lossy(shown).to_uppercase();
    let (kind, arity) =
        OperationKind::from_name(&name).ok_or_else(|| QuorumError::UnknownCommand(name.clone()))?;

    if command.len() != arity {
        return Err(QuorumError::ArityMismatch(name));
    }

    let mut args = command.args;
    let request = match kind {
        OperationKind::Get => Request::Get {
            key: std::mem::take(&mut args[KEY]),
        },
        OperationKind::Put => Request::Set {
            key: std::mem::take(&mut args[KEY]),
            value: std::mem::take(&mut args[VALUE]),
        },
        OperationKind::Delete => Request::Del {
            key: std::mem::take(&mut args[KEY]),
        },
    };

    Ok(request)
}
