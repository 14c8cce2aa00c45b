//! Reply definitions
//!
//! Represents replies sent back to clients.

use crate::error::QuorumError;

/// Index placed in redirect replies.
///
/// There is no slot or shard concept here; clients only read the address.
pub const REDIRECT_INDEX: i64 = -1;

/// A single reply to a single command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// `+OK`
    Simple(String),

    /// `-ERR ...` or `-MOVED ...`; holds the full text after the `-`
    Error(String),

    /// `:1`
    Integer(i64),

    /// `$<len>` followed by the bytes
    Bulk(Vec<u8>),

    /// `$-1`
    Null,
}

impl Reply {
    /// Create an OK status reply
    pub fn ok() -> Self {
        Reply::Simple("OK".to_string())
    }

    /// Create an error reply with the `ERR` token
    pub fn error(message: impl AsRef<str>) -> Self {
        Reply::Error(format!("ERR {}", message.as_ref()))
    }

    /// Create a redirect to the leader's client address
    pub fn moved(addr: &str) -> Self {
        Reply::Error(format!("MOVED {} {}", REDIRECT_INDEX, addr))
    }

    /// Whether this is an error reply
    pub fn is_error(&self) -> bool {
        matches!(self, Reply::Error(_))
    }

    /// The leader address if this is a redirect
    pub fn redirect_addr(&self) -> Option<&str> {
        match self {
            Reply::Error(text) => {
                let mut parts = text.splitn(3, ' ');
                match (parts.next(), parts.next(), parts.next()) {
                    (Some("MOVED"), Some(_), Some(addr)) => Some(addr),
                    _ => None,
                }
            }
            _ => None,
        }
    }
}

impl From<&QuorumError> for Reply {
    fn from(err: &QuorumError) -> Self {
        Reply::error(err.to_string())
    }
}

impl From<QuorumError> for Reply {
    fn from(err: QuorumError) -> Self {
        Reply::from(&err)
    }
}
