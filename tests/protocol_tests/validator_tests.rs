//! Validator Tests
//!
//! Tests verify:
//! - Empty commands are rejected
//! - Unknown names are rejected, matching is case-insensitive
//! - Arity must match the table exactly
//! - Operands are extracted into the right request

use quorumkv::protocol::{validate, Command, OperationKind, Request, ARITY_TABLE, MAX_ECHOED_NAME};
use quorumkv::QuorumError;

// =============================================================================
// Rejections
// =============================================================================

#[test]
fn test_empty_command_rejected() {
    let err = validate(Command::default()).unwrap_err();
    assert!(matches!(err, QuorumError::EmptyCommand));
    assert_eq!(err.to_string(), "no command provided");
}

#[test]
fn test_unknown_command_rejected() {
    let err = validate(Command::from_parts(["PING"])).unwrap_err();
    match err {
        QuorumError::UnknownCommand(name) => assert_eq!(name, "PING"),
        other => panic!("Expected UnknownCommand, got {:?}", other),
    }
}

#[test]
fn test_unknown_command_message_uses_upper_case() {
    let err = validate(Command::from_parts(["flushall"])).unwrap_err();
    assert_eq!(err.to_string(), "unknown command 'FLUSHALL'");
}

#[test]
fn test_long_unknown_name_is_truncated() {
    let long = vec![b'x'; 1024 * 1024];
    let err = validate(Command::new(vec![long])).unwrap_err();
    match err {
        QuorumError::UnknownCommand(name) => {
            assert_eq!(name.len(), MAX_ECHOED_NAME);
            assert!(name.bytes().all(|b| b == b'X'));
        }
        other => panic!("Expected UnknownCommand, got {:?}", other),
    }
}

#[test]
fn test_known_name_with_long_suffix_is_unknown() {
    let mut name = b"GET".to_vec();
    name.extend(vec![b'!'; 500]);
    let err = validate(Command::new(vec![name, b"k".to_vec()])).unwrap_err();
    assert!(matches!(err, QuorumError::UnknownCommand(_)));
}

#[test]
fn test_get_with_wrong_arity() {
    for parts in [vec!["GET"], vec!["GET", "a", "b"]] {
        let err = validate(Command::from_parts(parts)).unwrap_err();
        match err {
            QuorumError::ArityMismatch(name) => assert_eq!(name, "GET"),
            other => panic!("Expected ArityMismatch, got {:?}", other),
        }
    }
}

#[test]
fn test_set_with_wrong_arity() {
    let err = validate(Command::from_parts(["SET", "key"])).unwrap_err();
    assert_eq!(
        err.to_string(),
        "wrong number of arguments for 'SET' command"
    );

    let err = validate(Command::from_parts(["SET", "key", "value", "EX"])).unwrap_err();
    assert!(matches!(err, QuorumError::ArityMismatch(_)));
}

#[test]
fn test_del_with_wrong_arity() {
    let err = validate(Command::from_parts(["DEL", "a", "b"])).unwrap_err();
    assert!(matches!(err, QuorumError::ArityMismatch(ref n) if n == "DEL"));
}

#[test]
fn test_rejections_are_protocol_errors() {
    assert!(validate(Command::default()).unwrap_err().is_protocol());
    assert!(validate(Command::from_parts(["NOPE"])).unwrap_err().is_protocol());
    assert!(validate(Command::from_parts(["GET"])).unwrap_err().is_protocol());
}

// =============================================================================
// Accepted Commands
// =============================================================================

#[test]
fn test_case_insensitive_names() {
    for name in ["get", "Get", "GET", "gEt"] {
        let request = validate(Command::from_parts([name, "k"])).unwrap();
        assert_eq!(request, Request::Get { key: b"k".to_vec() });
    }
}

#[test]
fn test_get_extracts_key() {
    let request = validate(Command::from_parts(["GET", "user:1"])).unwrap();
    assert_eq!(request.kind(), OperationKind::Get);
    assert_eq!(request.key(), b"user:1");
}

#[test]
fn test_set_extracts_key_and_value() {
    let request = validate(Command::from_parts(["set", "k", "v"])).unwrap();
    assert_eq!(
        request,
        Request::Set {
            key: b"k".to_vec(),
            value: b"v".to_vec()
        }
    );
}

#[test]
fn test_del_extracts_key() {
    let request = validate(Command::from_parts(["del", "gone"])).unwrap();
    assert_eq!(request, Request::Del { key: b"gone".to_vec() });
}

#[test]
fn test_binary_operands_preserved() {
    let command = Command::new(vec![b"SET".to_vec(), vec![0, 159, 146, 150], vec![0xff, 0x00]]);
    let request = validate(command).unwrap();
    assert_eq!(
        request,
        Request::Set {
            key: vec![0, 159, 146, 150],
            value: vec![0xff, 0x00]
        }
    );
}

// =============================================================================
// Arity Table
// =============================================================================

#[test]
fn test_arity_table_matches_kinds() {
    assert_eq!(OperationKind::Get.arity(), 2);
    assert_eq!(OperationKind::Put.arity(), 3);
    assert_eq!(OperationKind::Delete.arity(), 2);

    assert_eq!(OperationKind::Put.name(), "SET");
    assert_eq!(OperationKind::Delete.name(), "DEL");
    assert_eq!(ARITY_TABLE.len(), 3);
}

#[test]
fn test_write_kinds() {
    assert!(!OperationKind::Get.is_write());
    assert!(OperationKind::Put.is_write());
    assert!(OperationKind::Delete.is_write());
}

#[test]
fn test_from_name_requires_upper_case() {
    assert_eq!(OperationKind::from_name("GET"), Some((OperationKind::Get, 2)));
    assert_eq!(OperationKind::from_name("get"), None);
}
