//! Protocol Module
//!
//! Client-facing wire protocol: a subset of RESP (the Redis serialization
//! protocol).
//!
//! ### Commands
//! ```text
//! | Command       | Args (incl. name) | Path         |
//! |---------------|-------------------|--------------|
//! | GET key       | 2                 | local read   |
//! | SET key value | 3                 | routed write |
//! | DEL key       | 2                 | routed write |
//! ```
//!
//! ### Replies
//! - `+OK` after a committed SET
//! - `:1` after a committed DEL
//! - `$<len>` bulk value or `$-1` null for GET
//! - `-ERR <message>` for any failure
//! - `-MOVED -1 <addr>` when this node is not the leader

mod command;
mod reply;
mod validator;
pub mod codec;

pub use command::{Command, OperationKind, Request, ARITY_TABLE};
pub use reply::{Reply, REDIRECT_INDEX};
pub use validator::{validate, MAX_ECHOED_NAME};
pub use codec::{
    decode_command, decode_reply, encode_command, encode_reply, read_command, read_reply,
    write_command, write_reply,
};
