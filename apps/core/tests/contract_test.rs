use tabspot_core::contract::{Ack, ErrorCode, MatchRequest};
use tabspot_core::model::TabId;

#[test]
fn index_request_uses_wire_action_name() {
    let encoded = serde_json::to_value(MatchRequest::ByIndex { index: 2 }).unwrap();
    assert_eq!(
        encoded,
        serde_json::json!({ "action": "activateTabByIndex", "index": 2 })
    );
}

#[test]
fn title_request_uses_wire_action_name() {
    let encoded = serde_json::to_value(MatchRequest::ByTitle {
        query: "alpha".into(),
    })
    .unwrap();
    assert_eq!(
        encoded,
        serde_json::json!({ "action": "activateTabByTitle", "query": "alpha" })
    );
}

#[test]
fn decodes_request_sent_by_page_script() {
    let decoded: MatchRequest =
        serde_json::from_str(r#"{"action":"activateTabByIndex","index":-1}"#).unwrap();
    assert_eq!(decoded, MatchRequest::ByIndex { index: -1 });
}

#[test]
fn rejects_unknown_action() {
    let decoded = serde_json::from_str::<MatchRequest>(r#"{"action":"closeTab","index":1}"#);
    assert!(decoded.is_err());
}

#[test]
fn ack_statuses_are_snake_case() {
    let activated = serde_json::to_string(&Ack::Activated { tab_id: TabId(7) }).unwrap();
    assert_eq!(activated, r#"{"status":"activated","tab_id":7}"#);

    let no_match = serde_json::to_string(&Ack::NoMatch).unwrap();
    assert_eq!(no_match, r#"{"status":"no_match"}"#);

    let failed = serde_json::to_value(Ack::Failed {
        code: ErrorCode::TabQuery,
        message: "boom".into(),
    })
    .unwrap();
    assert_eq!(failed["code"], "tab_query");
}
