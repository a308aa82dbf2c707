use crate::seq_token::SequenceToken;
use serde_json::json;

use super::*;

// ==================== Statement Tests ====================

#[test]
fn test_statement_wire_round_trip() {
    let statement = Statement::new("TERMINATE CSAS_PAGEVIEWS_0;").after(SequenceToken::new(17));

    let body = serde_json::to_string(&statement).unwrap();
    let parsed: Statement = serde_json::from_str(&body).unwrap();

    assert_eq!(parsed.ksql, "TERMINATE CSAS_PAGEVIEWS_0;");
    assert_eq!(parsed.prerequisite(), SequenceToken::new(17));
}

#[test]
fn test_statement_omits_zero_token_and_empty_properties() {
    let statement = Statement::new("LIST STREAMS;");
    let value = serde_json::to_value(&statement).unwrap();

    assert_eq!(value, json!({ "ksql": "LIST STREAMS;" }));
}

#[test]
fn test_statement_wire_field_names() {
    let statement = Statement::new("SELECT * FROM PAGEVIEWS;")
        .with_property("ksql.streams.auto.offset.reset", "earliest")
        .after(SequenceToken::new(3));
    let value = serde_json::to_value(&statement).unwrap();

    assert_eq!(value["commandSequenceNumber"], json!(3));
    assert_eq!(
        value["streamsProperties"]["ksql.streams.auto.offset.reset"],
        json!("earliest")
    );
}

#[test]
fn test_statement_token_only_moves_forward() {
    let mut statement = Statement::new("DROP STREAM X;").after(SequenceToken::new(9));
    statement.coordinate_in_sequence(&[SequenceToken::new(4), SequenceToken::new(6)]);
    assert_eq!(statement.prerequisite(), SequenceToken::new(9));

    statement.coordinate_in_sequence(&[SequenceToken::new(4), SequenceToken::new(11)]);
    assert_eq!(statement.prerequisite(), SequenceToken::new(11));
}

// ==================== ServerRecord Tests ====================

#[test]
fn test_decode_row_record() {
    let record = ServerRecord::decode_line(br#"{"row":{"columns":[1,"a"]}}"#)
        .unwrap()
        .unwrap();
    assert_eq!(record.columns().unwrap(), &[json!(1), json!("a")]);
}

#[test]
fn test_decode_blank_lines_yield_nothing() {
    assert!(ServerRecord::decode_line(b"").unwrap().is_none());
    assert!(ServerRecord::decode_line(b"   \t\r\n").unwrap().is_none());
}

#[test]
fn test_decode_error_record() {
    let line = br#"{"errorMessage":{"message":"boom","stackTrace":["a","b"]}}"#;
    let record = ServerRecord::decode_line(line).unwrap().unwrap();
    match record {
        ServerRecord::Error(error) => {
            assert_eq!(error.message, "boom");
            assert_eq!(error.trace(), "a\nb");
        }
        other => panic!("expected error record, got {:?}", other),
    }
}

#[test]
fn test_decode_row_wins_over_null_error() {
    let line = br#"{"row":{"columns":[true]},"errorMessage":null,"finalMessage":null}"#;
    let record = ServerRecord::decode_line(line).unwrap().unwrap();
    assert!(record.is_row());
}

#[test]
fn test_decode_final_message() {
    let line = br#"{"row":null,"errorMessage":null,"finalMessage":"Limit Reached"}"#;
    let record = ServerRecord::decode_line(line).unwrap().unwrap();
    assert_eq!(
        record,
        ServerRecord::Final {
            message: "Limit Reached".into()
        }
    );
}

#[test]
fn test_decode_malformed_line_is_decode_error() {
    let err = ServerRecord::decode_line(b"{\"row\":").unwrap_err();
    assert!(matches!(err, crate::KsqlLinkError::DecodeError { .. }));

    let err = ServerRecord::decode_line(b"{}").unwrap_err();
    assert!(matches!(err, crate::KsqlLinkError::DecodeError { .. }));
}

#[test]
fn test_decode_record_without_payload_names_missing_fields() {
    let err = ServerRecord::decode_line(br#"{"row":null,"finalMessage":null}"#).unwrap_err();
    match err {
        crate::KsqlLinkError::DecodeError { source, .. } => {
            assert!(source.to_string().contains("neither row, errorMessage nor finalMessage"));
        }
        other => panic!("expected decode error, got {:?}", other),
    }
}

// ==================== KsqlResponse Tests ====================

#[test]
fn test_response_streams_with_type() {
    let value = json!({
        "@type": "streams",
        "statementText": "LIST STREAMS;",
        "streams": [{"type": "STREAM", "name": "PAGEVIEWS", "topic": "pageviews", "format": "JSON"}]
    });
    match KsqlResponse::from_value(value).unwrap() {
        KsqlResponse::Streams(list) => {
            assert_eq!(list.sources.len(), 1);
            assert_eq!(list.sources[0].name, "PAGEVIEWS");
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_response_legacy_wrapped_tables() {
    let value = json!({
        "tables": {
            "statementText": "LIST TABLES;",
            "tables": [{"name": "USERS", "topic": "users", "format": "JSON", "isWindowed": false}]
        }
    });
    match KsqlResponse::from_value(value).unwrap() {
        KsqlResponse::Tables(list) => assert_eq!(list.sources[0].name, "USERS"),
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_response_current_status_carries_sequence() {
    let value = json!({
        "@type": "currentStatus",
        "statementText": "TERMINATE Q1;",
        "commandId": "terminate/Q1/execute",
        "commandStatus": {"status": "SUCCESS", "message": "Query terminated."},
        "commandSequenceNumber": 12
    });
    match KsqlResponse::from_value(value).unwrap() {
        KsqlResponse::CurrentStatus(status) => {
            assert_eq!(status.command_id, "terminate/Q1/execute");
            assert_eq!(status.state, CommandState::Succeeded);
            assert_eq!(status.sequence, SequenceToken::new(12));
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_response_flat_describe_without_type() {
    let value = json!({
        "statementText": "DESCRIBE TARGET;",
        "sourceDescription": {
            "name": "TARGET",
            "type": "STREAM",
            "readQueries": [],
            "writeQueries": [{"id": "Q1", "queryString": "CREATE STREAM TARGET AS ...", "sinks": ["TARGET"]}],
            "fields": [{"name": "ROWTIME", "schema": {"type": "BIGINT"}}]
        }
    });
    match KsqlResponse::from_value(value).unwrap() {
        KsqlResponse::SourceDescription(entity) => {
            let description = entity.source_description;
            assert_eq!(description.kind, ResourceKind::Stream);
            assert_eq!(description.write_queries[0].sinks, vec!["TARGET".to_string()]);
            assert_eq!(description.fields[0].schema.type_name, "BIGINT");
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_response_statement_error() {
    let value = json!({
        "@type": "statement_error",
        "error_code": 40001,
        "message": "Stream not found",
        "stackTrace": [],
        "statementText": "DESCRIBE NOPE;"
    });
    match KsqlResponse::from_value(value).unwrap() {
        KsqlResponse::StatementError(body) => {
            assert_eq!(body.error_code, 40001);
            assert_eq!(body.message, "Stream not found");
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_response_unknown_kind_is_other() {
    let value = json!({"@type": "properties", "properties": {}});
    let response = KsqlResponse::from_value(value).unwrap();
    assert_eq!(response.kind(), "properties");
}

// ==================== Status / Info Tests ====================

#[test]
fn test_status_body_states() {
    let body: StatusBody =
        serde_json::from_value(json!({"status": "PARSING", "message": ""})).unwrap();
    assert_eq!(body.status, CommandState::Queued);
    assert!(!body.status.is_done());

    let body: StatusBody =
        serde_json::from_value(json!({"status": "TERMINATED", "message": "gone"})).unwrap();
    assert!(body.status.is_done());
    assert_eq!(body.status.to_string(), "TERMINATED");
}

#[test]
fn test_server_info_body() {
    let body: server_info::InfoBody = serde_json::from_value(json!({
        "KsqlServerInfo": {"version": "5.1.0", "kafkaClusterId": "abc", "ksqlServiceId": "default_"}
    }))
    .unwrap();
    assert_eq!(body.server_info.version, "5.1.0");
    assert_eq!(body.server_info.ksql_service_id, "default_");
}

// ==================== ConnectionOptions Tests ====================

#[test]
fn test_connection_options_default() {
    let opts = ConnectionOptions::default();

    assert_eq!(opts.http_version, HttpVersion::Http1);
    assert_eq!(opts.pool_max_idle_per_host, 100);
    assert_eq!(opts.pool_idle_timeout_ms, 90_000);
}

#[test]
fn test_connection_options_partial_deserialization() {
    let opts: ConnectionOptions =
        serde_json::from_value(json!({"http_version": "http/2", "pool_max_idle_per_host": 4}))
            .unwrap();

    assert_eq!(opts.http_version, HttpVersion::Http2);
    assert_eq!(opts.pool_max_idle_per_host, 4);
    assert_eq!(opts.pool_idle_timeout_ms, 90_000);
}
