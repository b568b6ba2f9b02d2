use super::*;

fn sample_frame() -> Frame {
    Frame::request("token:move", Data::new())
        .with_map_id(Uuid::new_v4())
        .with_from("client-1")
        .with_data("tokenId", Uuid::new_v4().to_string())
        .with_data("x", 3.0)
        .with_data("y", 7.0)
}

// --- Lifecycle ---

#[test]
fn request_sets_fields() {
    let frame = Frame::request("map:join", Data::new());
    assert_eq!(frame.op, "map:join");
    assert_eq!(frame.status, Status::Request);
    assert!(frame.parent_id.is_none());
    assert!(frame.map_id.is_none());
    assert!(frame.ts > 0);
}

#[test]
fn reply_inherits_context() {
    let map_id = Uuid::new_v4();
    let req = Frame::request("token:move", Data::new()).with_map_id(map_id);
    let item = req.item(Data::new());

    assert_eq!(item.parent_id, Some(req.id));
    assert_eq!(item.map_id, Some(map_id));
    assert_eq!(item.op, "token:move");
    assert_eq!(item.status, Status::Item);
}

#[test]
fn done_is_terminal() {
    assert!(Status::Done.is_terminal());
    assert!(Status::Error.is_terminal());
    assert!(Status::Cancel.is_terminal());
    assert!(!Status::Request.is_terminal());
    assert!(!Status::Item.is_terminal());
}

#[test]
fn cancel_references_target() {
    let req = Frame::request("map:join", Data::new());
    let cancel = Frame::cancel(req.id);

    assert_eq!(cancel.parent_id, Some(req.id));
    assert_eq!(cancel.status, Status::Cancel);
}

#[test]
fn prefix_extraction() {
    let frame = Frame::request("fog:brush", Data::new());
    assert_eq!(frame.prefix(), "fog");

    let frame = Frame::request("noseparator", Data::new());
    assert_eq!(frame.prefix(), "noseparator");
}

#[test]
fn error_from_typed() {
    #[derive(Debug, thiserror::Error)]
    #[error("not the host")]
    struct Forbidden;

    impl ErrorCode for Forbidden {
        fn error_code(&self) -> &'static str {
            "E_FORBIDDEN"
        }
    }

    let req = Frame::request("wall:place", Data::new());
    let err = req.error_from(&Forbidden);

    assert_eq!(err.status, Status::Error);
    assert_eq!(err.data.get("code").and_then(|v| v.as_str()), Some("E_FORBIDDEN"));
    assert_eq!(err.data.get("message").and_then(|v| v.as_str()), Some("not the host"));
    assert_eq!(err.data.get("retryable").and_then(serde_json::Value::as_bool), Some(false));
}

// --- JSON serialization ---

#[test]
fn json_round_trip() {
    let original = sample_frame();
    let json = serde_json::to_string(&original).expect("serialize");
    let restored: Frame = serde_json::from_str(&json).expect("deserialize");

    assert_eq!(restored.id, original.id);
    assert_eq!(restored.map_id, original.map_id);
    assert_eq!(restored.op, "token:move");
    assert_eq!(restored.from.as_deref(), Some("client-1"));
    assert_eq!(restored.data.get("x"), original.data.get("x"));
}

#[test]
fn status_serializes_as_lowercase_json() {
    assert_eq!(serde_json::to_string(&Status::Request).expect("serialize"), "\"request\"");
    assert_eq!(serde_json::to_string(&Status::Error).expect("serialize"), "\"error\"");
}

// --- Wire codec ---

#[test]
fn status_numeric_mapping_matches_wire_enum() {
    assert_eq!(Status::Request.as_i32(), 0);
    assert_eq!(Status::Done.as_i32(), 1);
    assert_eq!(Status::Error.as_i32(), 2);
    assert_eq!(Status::Cancel.as_i32(), 3);
    assert_eq!(Status::Item.as_i32(), 4);
}

#[test]
fn encode_decode_round_trip_preserves_frame() {
    let frame = sample_frame();
    let decoded = decode_frame(&encode_frame(&frame)).expect("decode");
    assert_eq!(decoded, frame);
}

#[test]
fn decode_frame_rejects_malformed_bytes() {
    let err = decode_frame(&[0xff, 0x00, 0x01]).expect_err("bytes should fail");
    assert!(matches!(err, CodecError::Decode(_)));
}

#[test]
fn decode_frame_rejects_invalid_wire_status() {
    let wire = WireFrame {
        id: Uuid::new_v4().to_string(),
        parent_id: None,
        ts: 1,
        map_id: None,
        from: None,
        op: "map:join".to_owned(),
        status: 77,
        data: None,
    };
    let mut bytes = Vec::new();
    wire.encode(&mut bytes).expect("encode");

    let err = decode_frame(&bytes).expect_err("status should fail");
    assert!(matches!(err, CodecError::InvalidStatus(77)));
}

#[test]
fn decode_frame_rejects_non_uuid_id() {
    let wire = WireFrame {
        id: "not-a-uuid".to_owned(),
        parent_id: None,
        ts: 1,
        map_id: None,
        from: None,
        op: "map:join".to_owned(),
        status: Status::Request.as_i32(),
        data: None,
    };
    let mut bytes = Vec::new();
    wire.encode(&mut bytes).expect("encode");

    let err = decode_frame(&bytes).expect_err("id should fail");
    assert!(matches!(err, CodecError::InvalidId(_)));
}

#[test]
fn decode_frame_defaults_missing_data_to_empty_map() {
    let wire = WireFrame {
        id: Uuid::new_v4().to_string(),
        parent_id: None,
        ts: 1,
        map_id: None,
        from: None,
        op: "map:join".to_owned(),
        status: Status::Request.as_i32(),
        data: None,
    };
    let mut bytes = Vec::new();
    wire.encode(&mut bytes).expect("encode");

    let frame = decode_frame(&bytes).expect("decode");
    assert!(frame.data.is_empty());
}

#[test]
fn nested_payload_round_trips() {
    let mut data = Data::new();
    data.insert(
        "cells".to_owned(),
        serde_json::json!([{"x": 1.0, "y": 2.0}, {"x": 3.0, "y": 4.0}]),
    );
    data.insert("meta".to_owned(), serde_json::json!({"count": 2.0, "next": null}));
    let frame = Frame::request("fog:brush", data);

    let decoded = decode_frame(&encode_frame(&frame)).expect("decode");
    assert_eq!(decoded, frame);
}

#[test]
fn integer_json_numbers_are_normalized_to_float_numbers() {
    let frame = Frame::request("token:move", Data::new()).with_data("x", 2);
    let decoded = decode_frame(&encode_frame(&frame)).expect("decode");
    assert_eq!(decoded.data.get("x"), Some(&serde_json::json!(2.0)));
}
