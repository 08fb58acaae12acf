use super::*;

fn pending_with(id: u64) -> (PendingMap, oneshot::Receiver<Result<Value, CdpError>>) {
    let pending: PendingMap = Arc::new(Mutex::new(HashMap::new()));
    let (tx, rx) = oneshot::channel();
    pending.lock().insert(id, PendingRequest { tx });
    (pending, rx)
}

#[test]
fn test_request_id_increment() {
    let id = AtomicU64::new(1);
    assert_eq!(id.fetch_add(1, Ordering::SeqCst), 1);
    assert_eq!(id.fetch_add(1, Ordering::SeqCst), 2);
    assert_eq!(id.load(Ordering::SeqCst), 3);
}

#[test]
fn test_dispatch_resolves_result() {
    let (pending, mut rx) = pending_with(4);
    let resp: CdpResponse =
        serde_json::from_str(r#"{"id": 4, "result": {"value": 1}}"#).unwrap();

    CdpClient::dispatch(resp, &pending);

    let value = rx.try_recv().unwrap().unwrap();
    assert_eq!(value["value"], 1);
    assert!(pending.lock().is_empty());
}

#[test]
fn test_dispatch_maps_protocol_error() {
    let (pending, mut rx) = pending_with(9);
    let resp: CdpResponse = serde_json::from_str(
        r#"{"id": 9, "error": {"code": -32601, "message": "'Foo.bar' wasn't found"}}"#,
    )
    .unwrap();

    CdpClient::dispatch(resp, &pending);

    match rx.try_recv().unwrap() {
        Err(CdpError::Protocol { code, .. }) => assert_eq!(code, -32601),
        other => panic!("unexpected: {:?}", other),
    }
}

#[test]
fn test_dispatch_ignores_events_and_unknown_ids() {
    let (pending, mut rx) = pending_with(1);
    let event: CdpResponse =
        serde_json::from_str(r#"{"method": "Page.loadEventFired", "params": {}}"#).unwrap();
    let stray: CdpResponse = serde_json::from_str(r#"{"id": 77, "result": {}}"#).unwrap();

    CdpClient::dispatch(event, &pending);
    CdpClient::dispatch(stray, &pending);

    assert!(rx.try_recv().is_err());
    assert_eq!(pending.lock().len(), 1);
}

#[test]
fn test_new_page_query_is_appended_raw() {
    let endpoint = Url::parse("http://127.0.0.1:9222").unwrap();
    let mut create_url = endpoint.join("/json/new").unwrap();
    create_url.set_query(Some("https://photos.google.com"));
    assert_eq!(
        create_url.as_str(),
        "http://127.0.0.1:9222/json/new?https://photos.google.com"
    );
}
