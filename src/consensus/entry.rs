//! Log entry definitions
//!
//! Write intents carried through the replicated log, and the outcomes the
//! state machine hands back once an entry is applied.
//!
//! ## Entry Frame
//! ```text
//! ┌─────────────┬─────────┬───────────────────────────┐
//! │ Version (1) │ CRC (4) │ bincode(LogEntry)         │
//! └─────────────┴─────────┴───────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{QuorumError, Result};

/// Current entry frame version
pub const ENTRY_VERSION: u8 = 1;

/// Header size: 1 byte version + 4 bytes CRC32
pub const HEADER_SIZE: usize = 5;

/// Write operations that can be logged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operation {
    Put,
    Delete,
}

/// A write intent, built right before submission and never mutated after
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub op: Operation,
    pub key: Vec<u8>,
    pub value: Option<Vec<u8>>,
}

impl LogEntry {
    pub fn put(key: Vec<u8>, value: Vec<u8>) -> Self {
        Self {
            op: Operation::Put,
            key,
            value: Some(value),
        }
    }

    pub fn delete(key: Vec<u8>) -> Self {
        Self {
            op: Operation::Delete,
            key,
            value: None,
        }
    }

    /// Serialize into a versioned, checksummed frame
    pub fn encode(&self) -> Result<Vec<u8>> {
        let payload = bincode::serialize(self)?;
        let crc = crc32fast::hash(&payload);

        let mut frame = Vec::with_capacity(HEADER_SIZE + payload.len());
        frame.push(ENTRY_VERSION);
        frame.extend_from_slice(&crc.to_be_bytes());
        frame.extend_from_slice(&payload);
        Ok(frame)
    }

    /// Parse a frame produced by `encode`
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_SIZE {
            return Err(QuorumError::Serialization(format!(
                "Incomplete entry header: expected {} bytes, got {}",
                HEADER_SIZE,
                bytes.len()
            )));
        }

        let version = bytes[0];
        if version != ENTRY_VERSION {
            return Err(QuorumError::Serialization(format!(
                "Unsupported entry version: {}",
                version
            )));
        }

        let expected = u32::from_be_bytes([bytes[1], bytes[2], bytes[3], bytes[4]]);
        let payload = &bytes[HEADER_SIZE..];
        let actual = crc32fast::hash(payload);
        if expected != actual {
            return Err(QuorumError::Serialization(format!(
                "Entry checksum mismatch: expected {:08x}, got {:08x}",
                expected, actual
            )));
        }

        let entry: LogEntry = bincode::deserialize(payload)?;
        match (entry.op, &entry.value) {
            (Operation::Put, None) => Err(QuorumError::Serialization(
                "Put entry without a value".to_string(),
            )),
            (Operation::Delete, Some(_)) => Err(QuorumError::Serialization(
                "Delete entry with a value".to_string(),
            )),
            _ => Ok(entry),
        }
    }
}

/// Application-level failure raised while applying an entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApplyFailure {
    KeyNotFound,
    Rejected(String),
}

/// What the state machine reports for one applied entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApplyOutcome {
    Applied { value: Option<Vec<u8>> },
    Failed(ApplyFailure),
}

impl ApplyOutcome {
    pub fn applied() -> Self {
        ApplyOutcome::Applied { value: None }
    }

    pub fn encode(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self> {
        Ok(bincode::deserialize(bytes)?)
    }

    /// Turn an embedded failure into an application error
    pub fn into_result(self) -> Result<Option<Vec<u8>>> {
        match self {
            ApplyOutcome::Applied { value } => Ok(value),
            ApplyOutcome::Failed(ApplyFailure::KeyNotFound) => Err(QuorumError::KeyNotFound),
            ApplyOutcome::Failed(ApplyFailure::Rejected(reason)) => {
                Err(QuorumError::Rejected(reason))
            }
        }
    }
}

/// Interpret the raw apply response returned by the consensus engine
pub fn decode_outcome(raw: &[u8]) -> Result<Option<Vec<u8>>> {
    ApplyOutcome::decode(raw)?.into_result()
}
