use super::*;

#[test]
fn test_cdp_request_serialize() {
    let req = CdpRequest {
        id: 1,
        method: "Runtime.evaluate".to_string(),
        params: Some(serde_json::json!({"expression": "1 + 1"})),
        session_id: Some("session-1".to_string()),
    };
    let json = serde_json::to_string(&req).unwrap();
    assert!(json.contains("Runtime.evaluate"));
    assert!(json.contains("\"sessionId\":\"session-1\""));
}

#[test]
fn test_cdp_request_omits_empty_fields() {
    let req = CdpRequest {
        id: 7,
        method: "Page.enable".to_string(),
        params: None,
        session_id: None,
    };
    let json = serde_json::to_string(&req).unwrap();
    assert!(!json.contains("params"));
    assert!(!json.contains("sessionId"));
}

#[test]
fn test_cdp_response_deserialize() {
    let json = r#"{"id": 1, "result": {"result": {"type": "string", "value": "hi"}}}"#;
    let resp: CdpResponse = serde_json::from_str(json).unwrap();
    assert_eq!(resp.id, Some(1));
    assert!(resp.result.is_some());
}

#[test]
fn test_page_info_deserialize() {
    let json = r#"{
        "id": "page123",
        "type": "page",
        "title": "Photos",
        "url": "https://photos.google.com",
        "webSocketDebuggerUrl": "ws://localhost:9222/devtools/page/page123"
    }"#;
    let info: PageInfo = serde_json::from_str(json).unwrap();
    assert_eq!(info.id, "page123");
    assert!(info.is_page());
}

#[test]
fn test_extension_page_is_not_a_tab() {
    let json = r#"{
        "id": "bg",
        "type": "page",
        "title": "ext",
        "url": "chrome-extension://abc/background.html"
    }"#;
    let info: PageInfo = serde_json::from_str(json).unwrap();
    assert!(!info.is_page());
}

#[test]
fn test_exception_message_prefers_description() {
    let json = r#"{
        "text": "Uncaught",
        "lineNumber": 3,
        "columnNumber": 9,
        "exception": {"description": "TypeError: x is undefined"}
    }"#;
    let details: ExceptionDetails = serde_json::from_str(json).unwrap();
    assert_eq!(details.message(), "TypeError: x is undefined (line 3, col 9)");
}

#[test]
fn test_key_definition_lookup() {
    let end = key_definition("End").unwrap();
    assert_eq!(end.key_code, 35);
    assert_eq!(key_definition("arrowright").unwrap().code, "ArrowRight");
    assert!(key_definition("F13").is_none());
}

#[test]
fn test_mouse_button_serialize() {
    let json = serde_json::to_string(&MouseButton::Left).unwrap();
    assert_eq!(json, "\"left\"");
}
