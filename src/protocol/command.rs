//! Command definitions
//!
//! Represents commands from clients, before and after validation.

/// Operation kinds understood by the dispatcher
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Get,
    Put,
    Delete,
}

/// Protocol name, kind and required argument count (name included).
///
/// New commands are added here; dispatch only ever looks at the kind.
pub const ARITY_TABLE: &[(&str, OperationKind, usize)] = &[
    ("GET", OperationKind::Get, 2),
    ("SET", OperationKind::Put, 3),
    ("DEL", OperationKind::Delete, 2),
];

impl OperationKind {
    /// Look up an upper-cased protocol name in the arity table
    pub fn from_name(name: &str) -> Option<(Self, usize)> {
        ARITY_TABLE
            .iter()
            .find(|(entry, _, _)| *entry == name)
            .map(|&(_, kind, arity)| (kind, arity))
    }

    /// Required argument count, including the command name
    pub fn arity(self) -> usize {
        ARITY_TABLE
            .iter()
            .find(|(_, kind, _)| *kind == self)
            .map(|&(_, _, arity)| arity)
            .unwrap_or(0)
    }

    /// Name used on the wire
    pub fn name(self) -> &'static str {
        ARITY_TABLE
            .iter()
            .find(|(_, kind, _)| *kind == self)
            .map(|&(name, _, _)| name)
            .unwrap_or("")
    }

    /// Whether this kind has to go through the consensus log
    pub fn is_write(self) -> bool {
        !matches!(self, OperationKind::Get)
    }
}

/// A raw command as framed off the wire
///
/// Element 0 is the command name, the rest are operands. Nothing about the
/// shape is guaranteed until it passes through the validator.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Command {
    pub args: Vec<Vec<u8>>,
}

impl Command {
    pub fn new(args: Vec<Vec<u8>>) -> Self {
        Self { args }
    }

    /// Build a command from string-like parts (handy for clients and tests)
    pub fn from_parts<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<[u8]>,
    {
        Self {
            args: parts.into_iter().map(|p| p.as_ref().to_vec()).collect(),
        }
    }

    /// Upper-cased command name, if any
    pub fn name(&self) -> Option<String> {
        self.args
            .first()
            .map(|name| String::from_utf8_lossy(name).to_uppercase())
    }

    pub fn len(&self) -> usize {
        self.args.len()
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }
}

/// A validated command with its operands pulled out
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// Read a key (served locally)
    Get { key: Vec<u8> },

    /// Write a key (routed through the log)
    Set { key: Vec<u8>, value: Vec<u8> },

    /// Remove a key (routed through the log)
    Del { key: Vec<u8> },
}

impl Request {
    pub fn kind(&self) -> OperationKind {
        match self {
            Request::Get { .. } => OperationKind::Get,
            Request::Set { .. } => OperationKind::Put,
            Request::Del { .. } => OperationKind::Delete,
        }
    }

    pub fn key(&self) -> &[u8] {
        match self {
            Request::Get { key } | Request::Set { key, .. } | Request::Del { key } => key,
        }
    }
}
