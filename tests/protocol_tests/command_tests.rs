//! Command Tests
//!
//! Tests for command building, argument coercion, request encoding and
//! reply value helpers.

use bytes::Bytes;
use respipe::protocol::{encode_command, encode_command_to_vec, Command, Decoder, ReplyValue};
use respipe::RespipeError;

// =============================================================================
// Request Encoding Tests
// =============================================================================

#[test]
fn test_encode_get() {
    let cmd = Command::new("GET").arg("key");
    assert_eq!(encode_command_to_vec(&cmd), b"*2\r\n$3\r\nGET\r\n$3\r\nkey\r\n");
}

#[test]
fn test_encode_no_arguments() {
    let cmd = Command::new("PING");
    assert_eq!(encode_command_to_vec(&cmd), b"*1\r\n$4\r\nPING\r\n");
}

#[test]
fn test_encode_appends_to_buffer() {
    let mut buf = b"prefix".to_vec();
    encode_command(&Command::new("PING"), &mut buf);
    encode_command(&Command::new("PING"), &mut buf);
    assert_eq!(&buf, b"prefix*1\r\n$4\r\nPING\r\n*1\r\n$4\r\nPING\r\n");
}

#[test]
fn test_encode_binary_and_empty_arguments() {
    let cmd = Command::new("SET").arg(&b"k\r\n"[..]).arg("");
    assert_eq!(
        encode_command_to_vec(&cmd),
        b"*3\r\n$3\r\nSET\r\n$3\r\nk\r\n\r\n$0\r\n\r\n"
    );
}

#[test]
fn test_encode_multi_digit_lengths() {
    let value = vec![b'v'; 1234];
    let encoded = encode_command_to_vec(&Command::new("SET").arg("k").arg(value.clone()));

    let header = b"*3\r\n$3\r\nSET\r\n$1\r\nk\r\n$1234\r\n";
    assert_eq!(&encoded[..header.len()], header);
    assert_eq!(&encoded[header.len()..header.len() + 1234], &value[..]);
    assert_eq!(&encoded[header.len() + 1234..], b"\r\n");
}

// =============================================================================
// Argument Coercion Tests
// =============================================================================

#[test]
fn test_numbers_sent_as_text() {
    let cmd = Command::new("ZADD")
        .arg("scores")
        .arg(1.5f64)
        .arg(-42i64)
        .arg(7usize);

    let args: Vec<&[u8]> = cmd.args().iter().map(|a| &a[..]).collect();
    let expected: Vec<&[u8]> = vec![
        &b"ZADD"[..],
        &b"scores"[..],
        &b"1.5"[..],
        &b"-42"[..],
        &b"7"[..],
    ];
    assert_eq!(args, expected);
}

#[test]
fn test_from_args_mixed_owners() {
    let owned = String::from("value");
    let cmd = Command::from_args(vec!["SET".to_string(), "key".to_string(), owned]);

    assert_eq!(cmd.len(), 3);
    assert_eq!(cmd.name(), Some(&b"SET"[..]));
    assert_eq!(cmd.args()[2], Bytes::from_static(b"value"));
}

#[test]
fn test_push_arg_and_bytes() {
    let mut cmd = Command::new(Bytes::from_static(b"RPUSH"));
    cmd.push_arg(b"list");
    cmd.push_arg(vec![0u8, 255]);

    assert_eq!(
        encode_command_to_vec(&cmd),
        b"*3\r\n$5\r\nRPUSH\r\n$4\r\nlist\r\n$2\r\n\x00\xff\r\n"
    );
}

#[test]
fn test_default_command_is_empty() {
    let cmd = Command::default();
    assert!(cmd.is_empty());
    assert_eq!(cmd.name(), None);
}

// =============================================================================
// Reply Value Tests
// =============================================================================

#[test]
fn test_reply_encoding_decodes_back() {
    let value = ReplyValue::Array(vec![
        ReplyValue::simple("OK"),
        ReplyValue::error("ERR nope"),
        ReplyValue::Integer(-3),
        ReplyValue::bulk(&b"bin\r\nary"[..]),
        ReplyValue::Array(vec![]),
        ReplyValue::Nil,
    ]);

    let mut decoder = Decoder::new();
    decoder.feed(&value.to_bytes()).unwrap();
    assert_eq!(decoder.take_next(), Some(value));
}

#[test]
fn test_reply_accessors() {
    assert!(ReplyValue::simple("OK").is_ok());
    assert!(!ReplyValue::simple("QUEUED").is_ok());
    assert!(!ReplyValue::bulk(&b"OK"[..]).is_ok());
    assert!(ReplyValue::Nil.is_nil());
    assert!(ReplyValue::error("ERR").is_error());

    assert_eq!(ReplyValue::Integer(5).as_integer(), Some(5));
    assert_eq!(ReplyValue::bulk(&b"x"[..]).as_bytes(), Some(&b"x"[..]));
    assert_eq!(ReplyValue::simple("y").as_bytes(), Some(&b"y"[..]));
    assert_eq!(ReplyValue::Nil.as_bytes(), None);
    assert_eq!(ReplyValue::Array(vec![]).as_array().map(|a| a.len()), Some(0));
}

#[test]
fn test_into_result_surfaces_error_reply() {
    let err = ReplyValue::error("WRONGTYPE bad").into_result().unwrap_err();
    match err {
        RespipeError::ErrorResponse(message) => assert_eq!(message, "WRONGTYPE bad"),
        other => panic!("Expected ErrorResponse, got {:?}", other),
    }
    assert!(ReplyValue::Integer(1).into_result().is_ok());
}

#[test]
fn test_display_redis_cli_style() {
    assert_eq!(ReplyValue::simple("OK").to_string(), "OK");
    assert_eq!(ReplyValue::error("ERR x").to_string(), "(error) ERR x");
    assert_eq!(ReplyValue::Integer(3).to_string(), "(integer) 3");
    assert_eq!(ReplyValue::bulk(&b"a\nb"[..]).to_string(), "\"a\\nb\"");
    assert_eq!(ReplyValue::Nil.to_string(), "(nil)");
    assert_eq!(ReplyValue::Array(vec![]).to_string(), "(empty array)");

    let nested = ReplyValue::Array(vec![
        ReplyValue::Array(vec![ReplyValue::bulk(&b"badger"[..]), ReplyValue::Integer(99)]),
        ReplyValue::Array(vec![]),
    ]);
    assert_eq!(
        nested.to_string(),
        "1) 1) \"badger\"\n   2) (integer) 99\n2) (empty array)"
    );
}
