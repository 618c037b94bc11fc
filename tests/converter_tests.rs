//! Converter tests
//!
//! Covers schema case conversion, Gemini tool flattening and tool-call
//! correlation across a whole conversation.

use serde_json::json;
use tracereplay::capture::Role;
use tracereplay::config::LogLevel;
use tracereplay::converter::{MessageConverter, convert_gemini_tools, convert_schema};

#[test]
fn test_schema_conversion_is_recursive_and_idempotent() {
    let schema = json!({
        "type": "OBJECT",
        "required": ["tags"],
        "properties": {
            "tags": {"type": "ARRAY", "items": {"type": "STRING", "enum": ["A", "B"]}},
            "limit": {"type": "INTEGER", "description": "Max results"}
        }
    });

    let converted = convert_schema(&schema);
    assert_eq!(
        converted,
        json!({
            "type": "object",
            "required": ["tags"],
            "properties": {
                "tags": {"type": "array", "items": {"type": "string", "enum": ["A", "B"]}},
                "limit": {"type": "integer", "description": "Max results"}
            }
        })
    );
    assert_eq!(convert_schema(&converted), converted);
}

#[test]
fn test_gemini_tools_are_flattened_across_groups() {
    let groups = vec![
        json!({"functionDeclarations": [
            {"name": "a", "parameters": {"type": "OBJECT", "properties": {"x": {"type": "NUMBER"}}}},
            {"name": "b", "description": "B"}
        ]}),
        json!({"functionDeclarations": [{"name": "c"}]}),
    ];

    let tools = convert_gemini_tools(&groups).unwrap();
    let names: Vec<&str> = tools.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["a", "b", "c"]);
    assert_eq!(tools[0].parameters, json!({"type": "object", "properties": {"x": {"type": "number"}}}));
    assert_eq!(tools[1].parameters, json!({"type": "object", "properties": {}}));
    assert_eq!(tools[1].description, "B");
}

#[test]
fn test_gemini_declaration_without_name_is_rejected() {
    let groups = vec![json!({"functionDeclarations": [{"name": "ok"}, {"description": "nameless"}]})];
    let err = convert_gemini_tools(&groups).unwrap_err();
    assert!(err.is_invalid_capture());
    assert!(err.to_string().contains("tools[0].functionDeclarations[1]"));
}

#[test]
fn test_same_name_calls_pair_first_in_first_out() {
    let mut converter = MessageConverter::new(LogLevel::Info);

    let calls = converter
        .convert(
            &[
                json!({"functionCall": {"name": "lookup", "args": {"k": 1}}}),
                json!({"functionCall": {"name": "lookup", "args": {"k": 2}}}),
            ],
            Role::Assistant,
        )
        .unwrap();
    assert_eq!(calls[0].tool_calls[0].id, "tool_call_1");
    assert_eq!(calls[0].tool_calls[1].id, "tool_call_2");
    assert_eq!(converter.pending_calls(), 2);

    let responses = converter
        .convert(
            &[
                json!({"functionResponse": {"name": "lookup", "response": {"v": "first"}}}),
                json!({"functionResponse": {"name": "lookup", "response": {"v": "second"}}}),
            ],
            Role::User,
        )
        .unwrap();
    let ids: Vec<Option<&str>> = responses.iter().map(|m| m.tool_call_id.as_deref()).collect();
    assert_eq!(ids, vec![Some("tool_call_1"), Some("tool_call_2")]);
    assert_eq!(converter.pending_calls(), 0);
}

#[test]
fn test_exact_ids_pair_out_of_order() {
    let mut converter = MessageConverter::new(LogLevel::Info);
    converter
        .convert(
            &[
                json!({"type": "tool_call", "id": "c1", "name": "f", "arguments": "{}"}),
                json!({"type": "tool_call", "id": "c2", "name": "f", "arguments": "{}"}),
            ],
            Role::Assistant,
        )
        .unwrap();

    let responses = converter
        .convert(
            &[
                json!({"type": "tool_call_response", "id": "c2", "name": "f", "result": 2}),
                json!({"type": "tool_call_response", "id": "c1", "name": "f", "result": 1}),
            ],
            Role::User,
        )
        .unwrap();
    assert_eq!(responses[0].tool_call_id.as_deref(), Some("c2"));
    assert_eq!(responses[1].tool_call_id.as_deref(), Some("c1"));
}

#[test]
fn test_reused_call_id_links_both_responses() {
    let mut converter = MessageConverter::new(LogLevel::Info);
    converter
        .convert(
            &[
                json!({"functionCall": {"id": "x", "name": "f", "args": {}}}),
                json!({"functionCall": {"id": "x", "name": "f", "args": {}}}),
            ],
            Role::Assistant,
        )
        .unwrap();

    let responses = converter
        .convert(
            &[
                json!({"functionResponse": {"id": "x", "name": "f", "response": {"n": 1}}}),
                json!({"functionResponse": {"id": "x", "name": "f", "response": {"n": 2}}}),
            ],
            Role::User,
        )
        .unwrap();
    let ids: Vec<Option<&str>> = responses.iter().map(|m| m.tool_call_id.as_deref()).collect();
    assert_eq!(ids, vec![Some("x"), Some("x")]);
    assert_eq!(converter.pending_calls(), 0);
}

#[test]
fn test_unmatched_response_keeps_content_without_link() {
    let mut converter = MessageConverter::new(LogLevel::Info);
    let messages = converter
        .convert(&[json!({"functionResponse": {"name": "ghost", "response": "boo"}})], Role::User)
        .unwrap();

    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].role, Role::Tool);
    assert_eq!(messages[0].tool_call_id, None);
    assert_eq!(messages[0].content_text(), r#"{"name":"ghost","response":"boo"}"#);
}

#[test]
fn test_text_and_responses_in_one_message() {
    let mut converter = MessageConverter::new(LogLevel::Info);
    converter.convert(&[json!({"functionCall": {"name": "f", "args": {}}})], Role::Assistant).unwrap();

    let messages = converter
        .convert(
            &[
                json!({"text": "Here is the result"}),
                json!({"functionResponse": {"name": "f", "response": {}}}),
                json!({"text": "and a note"}),
            ],
            Role::User,
        )
        .unwrap();

    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].role, Role::User);
    assert_eq!(messages[0].content_text(), "Here is the result\nand a note");
    assert_eq!(messages[1].role, Role::Tool);
    assert_eq!(messages[1].tool_call_id.as_deref(), Some("tool_call_1"));
}

#[test]
fn test_unrecognized_parts_are_preserved_as_json_text() {
    let mut converter = MessageConverter::new(LogLevel::Info);
    let blob = json!({"inlineData": {"mimeType": "image/png", "data": "AAAA"}});

    let messages = converter.convert(&[blob.clone()], Role::User).unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].content_text(), blob.to_string());
}
