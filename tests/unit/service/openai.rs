use super::*;

#[test]
fn extracts_first_choice_content() {
    let json = serde_json::json!({
        "model": "gpt-4o",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": "{\"title\":\"x\"}" },
            "finish_reason": "stop"
        }]
    })
    .to_string();
    assert_eq!(parse_chat_content(&json).unwrap(), "{\"title\":\"x\"}");
}

#[test]
fn missing_choices_is_a_service_error() {
    let json = serde_json::json!({ "model": "gpt-4o", "choices": [] }).to_string();
    assert!(matches!(
        parse_chat_content(&json),
        Err(FlowError::Service(_))
    ));
}

#[test]
fn null_or_blank_content_is_empty_response() {
    let json = serde_json::json!({
        "choices": [{ "message": { "role": "assistant", "content": null } }]
    })
    .to_string();
    let err = parse_chat_content(&json).unwrap_err();
    assert!(err.to_string().contains("empty response"));
}

#[test]
fn request_body_uses_json_object_mode() {
    let body = ChatRequest {
        model: "gpt-4o",
        messages: [
            ChatMessage {
                role: "system",
                content: "sys",
            },
            ChatMessage {
                role: "user",
                content: "usr",
            },
        ],
        temperature: 0.3,
        response_format: Some(ResponseFormat {
            kind: "json_object",
        }),
    };
    let v = serde_json::to_value(&body).unwrap();
    assert_eq!(v["response_format"]["type"], "json_object");
    assert_eq!(v["messages"][1]["role"], "user");
}

#[test]
fn endpoint_joins_base_url() {
    let cfg = ServiceConfig::from_lookup(|k| {
        (k == crate::service::config::API_KEY_VAR).then(|| "sk-secret-123".to_string())
    })
    .unwrap();
    let client = OpenAiClient::new(&cfg);
    assert_eq!(
        client.endpoint(),
        "https://api.openai.com/v1/chat/completions"
    );
    assert!(!format!("{client:?}").contains("sk-secret"));
}
