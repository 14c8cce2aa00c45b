//! Codec Tests
//!
//! Tests for RESP command framing and reply encoding.

use std::io::{BufReader, Cursor};

use quorumkv::protocol::{
    decode_command, decode_reply, encode_command, encode_reply, read_command, read_reply,
    write_reply, Command, Reply,
};
use quorumkv::QuorumError;

// =============================================================================
// Command Decoding
// =============================================================================

#[test]
fn test_decode_array_command() {
    let cmd = decode_command(b"*2\r\n$3\r\nGET\r\n$5\r\nhello\r\n").unwrap();
    assert_eq!(cmd, Command::from_parts(["GET", "hello"]));
}

#[test]
fn test_decode_binary_safe_bulk() {
    let cmd = decode_command(b"*3\r\n$3\r\nSET\r\n$1\r\nk\r\n$4\r\na\r\nb\r\n").unwrap();
    assert_eq!(cmd.args[2], b"a\r\nb".to_vec());
}

#[test]
fn test_decode_empty_bulk() {
    let cmd = decode_command(b"*3\r\n$3\r\nSET\r\n$1\r\nk\r\n$0\r\n\r\n").unwrap();
    assert_eq!(cmd.args[2], Vec::<u8>::new());
}

#[test]
fn test_decode_empty_array() {
    let cmd = decode_command(b"*0\r\n").unwrap();
    assert!(cmd.is_empty());

    let cmd = decode_command(b"*-1\r\n").unwrap();
    assert!(cmd.is_empty());
}

#[test]
fn test_decode_inline_command() {
    let cmd = decode_command(b"SET  key   value\r\n").unwrap();
    assert_eq!(cmd, Command::from_parts(["SET", "key", "value"]));

    let cmd = decode_command(b"get key\n").unwrap();
    assert_eq!(cmd, Command::from_parts(["get", "key"]));
}

#[test]
fn test_blank_inline_lines_skipped() {
    let cmd = decode_command(b"\r\n   \r\nGET k\r\n").unwrap();
    assert_eq!(cmd, Command::from_parts(["GET", "k"]));
}

#[test]
fn test_pipelined_commands_read_in_order() {
    let input = b"*2\r\n$3\r\nGET\r\n$1\r\na\r\nDEL b\r\n*3\r\n$3\r\nSET\r\n$1\r\nc\r\n$1\r\n1\r\n";
    let mut reader = BufReader::new(Cursor::new(input.to_vec()));

    assert_eq!(read_command(&mut reader).unwrap(), Command::from_parts(["GET", "a"]));
    assert_eq!(read_command(&mut reader).unwrap(), Command::from_parts(["DEL", "b"]));
    assert_eq!(read_command(&mut reader).unwrap(), Command::from_parts(["SET", "c", "1"]));

    match read_command(&mut reader) {
        Err(QuorumError::Io(e)) => assert_eq!(e.kind(), std::io::ErrorKind::UnexpectedEof),
        other => panic!("Expected EOF, got {:?}", other),
    }
}

#[test]
fn test_encode_command_round_trip() {
    let cmd = Command::from_parts(["SET", "key", "value"]);
    let encoded = encode_command(&cmd);
    assert_eq!(
        &encoded[..],
        b"*3\r\n$3\r\nSET\r\n$3\r\nkey\r\n$5\r\nvalue\r\n"
    );
    assert_eq!(decode_command(&encoded).unwrap(), cmd);
}

// =============================================================================
// Malformed Input
// =============================================================================

#[test]
fn test_missing_dollar_rejected() {
    let err = decode_command(b"*1\r\n+GET\r\n").unwrap_err();
    assert!(matches!(err, QuorumError::Protocol(_)));
}

#[test]
fn test_bad_array_length_rejected() {
    let err = decode_command(b"*abc\r\n").unwrap_err();
    assert!(matches!(err, QuorumError::Protocol(_)));
}

#[test]
fn test_negative_bulk_length_rejected() {
    let err = decode_command(b"*1\r\n$-5\r\n").unwrap_err();
    assert!(matches!(err, QuorumError::Protocol(_)));
}

#[test]
fn test_oversized_bulk_rejected() {
    let err = decode_command(b"*1\r\n$999999999\r\n").unwrap_err();
    assert!(matches!(err, QuorumError::Protocol(_)));
}

#[test]
fn test_bulk_without_crlf_rejected() {
    let err = decode_command(b"*1\r\n$3\r\nGETxx").unwrap_err();
    assert!(matches!(err, QuorumError::Protocol(_)));
}

#[test]
fn test_truncated_bulk_is_eof() {
    let err = decode_command(b"*2\r\n$3\r\nGET\r\n$5\r\nhe").unwrap_err();
    match err {
        QuorumError::Io(e) => assert_eq!(e.kind(), std::io::ErrorKind::UnexpectedEof),
        other => panic!("Expected EOF, got {:?}", other),
    }
}

#[test]
fn test_huge_headers_without_body_fail_cleanly() {
    // Maximum array and bulk lengths announced, nothing behind them
    let err = decode_command(b"*1048576\r\n$16777216\r\n").unwrap_err();
    match err {
        QuorumError::Io(e) => assert_eq!(e.kind(), std::io::ErrorKind::UnexpectedEof),
        other => panic!("Expected EOF, got {:?}", other),
    }
}

#[test]
fn test_short_bulk_body_is_eof() {
    let err = decode_command(b"*1\r\n$1000000\r\nabc\r\n").unwrap_err();
    assert!(matches!(err, QuorumError::Io(ref e) if e.kind() == std::io::ErrorKind::UnexpectedEof));
}

#[test]
fn test_bulk_larger_than_initial_buffer() {
    let value = vec![b'z'; 100 * 1024];
    let cmd = Command::new(vec![b"SET".to_vec(), b"big".to_vec(), value.clone()]);

    let decoded = decode_command(&encode_command(&cmd)).unwrap();
    assert_eq!(decoded.args[2], value);
}

#[test]
fn test_oversized_inline_rejected() {
    let mut line = vec![b'a'; 70 * 1024];
    line.extend_from_slice(b"\r\n");
    let err = decode_command(&line).unwrap_err();
    assert!(matches!(err, QuorumError::Protocol(_)));
}

// =============================================================================
// Reply Encoding
// =============================================================================

#[test]
fn test_encode_simple() {
    assert_eq!(&encode_reply(&Reply::ok())[..], b"+OK\r\n");
}

#[test]
fn test_encode_error() {
    assert_eq!(
        &encode_reply(&Reply::error("key not found"))[..],
        b"-ERR key not found\r\n"
    );
}

#[test]
fn test_encode_moved() {
    assert_eq!(
        &encode_reply(&Reply::moved("10.0.0.2:6379"))[..],
        b"-MOVED -1 10.0.0.2:6379\r\n"
    );
}

#[test]
fn test_encode_integer() {
    assert_eq!(&encode_reply(&Reply::Integer(1))[..], b":1\r\n");
}

#[test]
fn test_encode_bulk_and_null() {
    assert_eq!(&encode_reply(&Reply::Bulk(b"bar".to_vec()))[..], b"$3\r\nbar\r\n");
    assert_eq!(&encode_reply(&Reply::Bulk(Vec::new()))[..], b"$0\r\n\r\n");
    assert_eq!(&encode_reply(&Reply::Null)[..], b"$-1\r\n");
}

#[test]
fn test_error_text_kept_on_one_line() {
    let encoded = encode_reply(&Reply::error("line one\r\nline two"));
    assert_eq!(&encoded[..], b"-ERR line one  line two\r\n");
}

#[test]
fn test_write_reply_to_stream() {
    let mut out = Vec::new();
    write_reply(&mut out, &Reply::Integer(1)).unwrap();
    write_reply(&mut out, &Reply::Null).unwrap();
    assert_eq!(out, b":1\r\n$-1\r\n");
}

// =============================================================================
// Reply Decoding
// =============================================================================

#[test]
fn test_decode_each_reply_type() {
    assert_eq!(decode_reply(b"+OK\r\n").unwrap(), Reply::ok());
    assert_eq!(
        decode_reply(b"-ERR boom\r\n").unwrap(),
        Reply::Error("ERR boom".to_string())
    );
    assert_eq!(decode_reply(b":42\r\n").unwrap(), Reply::Integer(42));
    assert_eq!(decode_reply(b"$2\r\nhi\r\n").unwrap(), Reply::Bulk(b"hi".to_vec()));
    assert_eq!(decode_reply(b"$-1\r\n").unwrap(), Reply::Null);
    assert_eq!(decode_reply(b"*-1\r\n").unwrap(), Reply::Null);
}

#[test]
fn test_decode_unknown_reply_type() {
    assert!(matches!(
        decode_reply(b"?what\r\n").unwrap_err(),
        QuorumError::Protocol(_)
    ));
}

#[test]
fn test_read_consecutive_replies() {
    let mut reader = BufReader::new(Cursor::new(b"+OK\r\n$1\r\nv\r\n:1\r\n".to_vec()));
    assert_eq!(read_reply(&mut reader).unwrap(), Reply::ok());
    assert_eq!(read_reply(&mut reader).unwrap(), Reply::Bulk(b"v".to_vec()));
    assert_eq!(read_reply(&mut reader).unwrap(), Reply::Integer(1));
}

#[test]
fn test_redirect_addr() {
    let moved = Reply::moved("127.0.0.1:7000");
    assert_eq!(moved.redirect_addr(), Some("127.0.0.1:7000"));
    assert!(moved.is_error());

    assert_eq!(Reply::error("nope").redirect_addr(), None);
    assert_eq!(Reply::ok().redirect_addr(), None);
}

#[test]
fn test_reply_from_error_has_err_token() {
    let reply = Reply::from(QuorumError::UnknownCommand("FOO".to_string()));
    assert_eq!(reply, Reply::Error("ERR unknown command 'FOO'".to_string()));
}
