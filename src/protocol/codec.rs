//! Protocol codec
//!
//! Encoding and decoding functions for the RESP wire protocol.
//!
//! ## Wire Format
//!
//! ### Request (Command) Format
//! ```text
//! *<argc>\r\n
//! $<len>\r\n<arg bytes>\r\n      (repeated argc times)
//! ```
//! Inline commands (`GET foo\r\n`) are accepted too, for telnet-style clients.
//!
//! ### Reply Format
//! ```text
//! +OK\r\n                simple string
//! -ERR message\r\n       error
//! :1\r\n                 integer
//! $<len>\r\n<bytes>\r\n  bulk string
//! $-1\r\n                null bulk
//! ```

use std::io::{self, BufRead, Cursor, Read, Write};

use bytes::{BufMut, Bytes, BytesMut};

use super::{Command, Reply};
use crate::error::{QuorumError, Result};

/// Line terminator
pub const CRLF: &[u8] = b"\r\n";

/// Maximum size of a single bulk string (16 MB)
pub const MAX_BULK_SIZE: i64 = 16 * 1024 * 1024;

/// Maximum number of elements in a request array
pub const MAX_ARRAY_LEN: i64 = 1024 * 1024;

/// Maximum length of an inline command or a header line
pub const MAX_INLINE_SIZE: usize = 64 * 1024;

/// Upper bound on memory reserved from a length header before data arrives
const MAX_PREALLOC: usize = 1024;

// =============================================================================
// Command Encoding/Decoding
// =============================================================================

/// Encode a command as a RESP array of bulk strings
pub fn encode_command(command: &Command) -> Bytes {
    let payload: usize = command.args.iter().map(|a| a.len() + 16).sum();
    let mut buf = BytesMut::with_capacity(16 + payload);

    put_header(&mut buf, b'*', command.args.len() as i64);
    for arg in &command.args {
        put_header(&mut buf, b'$', arg.len() as i64);
        buf.put_slice(arg);
        buf.put_slice(CRLF);
    }

    buf.freeze()
}

/// Decode a single command from a complete buffer
pub fn decode_command(bytes: &[u8]) -> Result<Command> {
    read_command(&mut Cursor::new(bytes))
}

/// Read the next command from a stream
///
/// Blank inline lines are skipped. Returns an `UnexpectedEof` I/O error when
/// the peer closes the stream between commands.
pub fn read_command<R: BufRead>(reader: &mut R) -> Result<Command> {
    loop {
        let first = match reader.fill_buf()?.first() {
            Some(byte) => *byte,
            None => return Err(io::Error::from(io::ErrorKind::UnexpectedEof).into()),
        };

        if first == b'*' {
            return read_array(reader);
        }

        let line = read_line(reader, MAX_INLINE_SIZE)?;
        let args: Vec<Vec<u8>> = line
            .split(|b| b.is_ascii_whitespace())
            .filter(|part| !part.is_empty())
            .map(|part| part.to_vec())
            .collect();

        if !args.is_empty() {
            return Ok(Command::new(args));
        }
    }
}

/// Write a command to a stream
pub fn write_command<W: Write>(writer: &mut W, command: &Command) -> Result<()> {
    writer.write_all(&encode_command(command))?;
    writer.flush()?;
    Ok(())
}

fn read_array<R: BufRead>(reader: &mut R) -> Result<Command> {
    let header = read_line(reader, MAX_INLINE_SIZE)?;
    let count = parse_length(&header[1..])?;

    // `*0` and the null array `*-1` both carry no command name
    if count <= 0 {
        return Ok(Command::default());
    }
    if count > MAX_ARRAY_LEN {
        return Err(QuorumError::Protocol(format!(
            "invalid multibulk length {}",
            count
        )));
    }

    let mut args = Vec::with_capacity((count as usize).min(MAX_PREALLOC));
    for _ in 0..count {
        let header = read_line(reader, MAX_INLINE_SIZE)?;
        if header.first() != Some(&b'$') {
            return Err(QuorumError::Protocol(format!(
                "expected '$', got '{}'",
                header.first().map(|b| *b as char).unwrap_or(' ')
            )));
        }

        let len = parse_length(&header[1..])?;
        if !(0..=MAX_BULK_SIZE).contains(&len) {
            return Err(QuorumError::Protocol(format!("invalid bulk length {}", len)));
        }

        args.push(read_bulk_body(reader, len as usize)?);
    }

    Ok(Command::new(args))
}

// =============================================================================
// Reply Encoding/Decoding
// =============================================================================

/// Encode a reply to bytes
pub fn encode_reply(reply: &Reply) -> Bytes {
    let mut buf = BytesMut::with_capacity(64);

    match reply {
        Reply::Simple(text) => {
            buf.put_u8(b'+');
            buf.put_slice(single_line(text).as_bytes());
            buf.put_slice(CRLF);
        }
        Reply::Error(text) => {
            buf.put_u8(b'-');
            buf.put_slice(single_line(text).as_bytes());
            buf.put_slice(CRLF);
        }
        Reply::Integer(n) => put_header(&mut buf, b':', *n),
        Reply::Bulk(value) => {
            buf.reserve(value.len() + 16);
            put_header(&mut buf, b'$', value.len() as i64);
            buf.put_slice(value);
            buf.put_slice(CRLF);
        }
        Reply::Null => put_header(&mut buf, b'$', -1),
    }

    buf.freeze()
}

/// Decode a single reply from a complete buffer
pub fn decode_reply(bytes: &[u8]) -> Result<Reply> {
    read_reply(&mut Cursor::new(bytes))
}

/// Read the next reply from a stream
pub fn read_reply<R: BufRead>(reader: &mut R) -> Result<Reply> {
    let line = read_line(reader, MAX_INLINE_SIZE)?;
    let (kind, rest) = match line.split_first() {
        Some((kind, rest)) => (*kind, rest),
        None => return Err(QuorumError::Protocol("empty reply line".to_string())),
    };

    match kind {
        b'+' => Ok(Reply::Simple(String::from_utf8_lossy(rest).into_owned())),
        b'-' => Ok(Reply::Error(String::from_utf8_lossy(rest).into_owned())),
        b':' => Ok(Reply::Integer(parse_length(rest)?)),
        b'$' => {
            let len = parse_length(rest)?;
            if len < 0 {
                return Ok(Reply::Null);
            }
            if len > MAX_BULK_SIZE {
                return Err(QuorumError::Protocol(format!("invalid bulk length {}", len)));
            }
            Ok(Reply::Bulk(read_bulk_body(reader, len as usize)?))
        }
        b'*' => match parse_length(rest)? {
            len if len < 0 => Ok(Reply::Null),
            _ => Err(QuorumError::Protocol("unexpected array reply".to_string())),
        },
        other => Err(QuorumError::Protocol(format!(
            "unexpected reply type '{}'",
            other as char
        ))),
    }
}

/// Write a reply to a stream
pub fn write_reply<W: Write>(writer: &mut W, reply: &Reply) -> Result<()> {
    writer.write_all(&encode_reply(reply))?;
    Ok(())
}

// =============================================================================
// Helpers
// =============================================================================

fn put_header(buf: &mut BytesMut, kind: u8, n: i64) {
    buf.put_u8(kind);
    buf.put_slice(n.to_string().as_bytes());
    buf.put_slice(CRLF);
}

/// Read one line, stripping `\n` or `\r\n`
fn read_line<R: BufRead>(reader: &mut R, limit: usize) -> Result<Vec<u8>> {
    let mut line = Vec::new();
    let read = reader
        .by_ref()
        .take(limit as u64 + 1)
        .read_until(b'\n', &mut line)?;

    if read == 0 {
        return Err(io::Error::from(io::ErrorKind::UnexpectedEof).into());
    }
    if line.last() != Some(&b'\n') {
        if line.len() > limit {
            return Err(QuorumError::Protocol("too big inline request".to_string()));
        }
        return Err(io::Error::from(io::ErrorKind::UnexpectedEof).into());
    }

    line.pop();
    if line.last() == Some(&b'\r') {
        line.pop();
    }
    Ok(line)
}

/// Read `len` bytes plus the trailing CRLF; the buffer grows only as data arrives
fn read_bulk_body<R: BufRead>(reader: &mut R, len: usize) -> Result<Vec<u8>> {
    let expected = len + CRLF.len();
    let mut body = Vec::with_capacity(expected.min(MAX_PREALLOC));
    reader
        .by_ref()
        .take(expected as u64)
        .read_to_end(&mut body)?;

    if body.len() < expected {
        return Err(io::Error::from(io::ErrorKind::UnexpectedEof).into());
    }
    if &body[len..] != CRLF {
        return Err(QuorumError::Protocol(
            "bulk string not terminated by CRLF".to_string(),
        ));
    }

    body.truncate(len);
    Ok(body)
}

fn parse_length(digits: &[u8]) -> Result<i64> {
    std::str::from_utf8(digits)
        .ok()
        .and_then(|s| s.parse::<i64>().ok())
        .ok_or_else(|| {
            QuorumError::Protocol(format!(
                "invalid length '{}'",
                String::from_utf8_lossy(digits)
            ))
        })
}

/// Status and error lines may not carry line breaks
fn single_line(text: &str) -> String {
    text.replace(['\r', '\n'], " ")
}
