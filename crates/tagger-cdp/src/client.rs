//! CDP WebSocket client.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use parking_lot::Mutex;
use serde_json::{Value, json};
use tokio::net::TcpStream;
use tokio::sync::oneshot;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, error, trace, warn};
use url::Url;

use crate::error::CdpError;
use crate::protocol::{BrowserVersion, CdpRequest, CdpResponse, PageInfo};
use crate::session::PageSession;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
pub(crate) type WsSink = SplitSink<WsStream, Message>;
type WsSource = SplitStream<WsStream>;
pub(crate) type PendingMap = Arc<Mutex<HashMap<u64, PendingRequest>>>;

/// Upper bound for a single CDP round trip.
pub(crate) const CALL_TIMEOUT: Duration = Duration::from_secs(30);

/// Pending request waiting for response.
pub(crate) struct PendingRequest {
    pub tx: oneshot::Sender<Result<Value, CdpError>>,
}

/// CDP client for browser automation.
///
/// Owns the browser-level WebSocket. Page sessions share its sink and
/// pending-request table, so every response is routed by the single
/// receive task spawned in [`CdpClient::connect`].
pub struct CdpClient {
    /// HTTP endpoint for page discovery.
    http_endpoint: Url,
    /// Browser WebSocket URL.
    browser_ws_url: String,
    /// WebSocket sender.
    ws_tx: Arc<tokio::sync::Mutex<WsSink>>,
    /// Request ID counter.
    request_id: Arc<AtomicU64>,
    /// Pending requests waiting for responses.
    pending: PendingMap,
    /// Background task handle.
    _recv_task: tokio::task::JoinHandle<()>,
}

impl CdpClient {
    /// Connect to Chrome at the given endpoint.
    ///
    /// # Arguments
    ///
    /// * `endpoint` - Chrome debugging endpoint (e.g., "http://127.0.0.1:9222")
    pub async fn connect(endpoint: &str) -> Result<Self, CdpError> {
        let http_endpoint = Url::parse(endpoint.trim_end_matches('/'))?;

        let version = Self::fetch_version(&http_endpoint)
            .await
            .map_err(|e| CdpError::ChromeNotAvailable(format!("{}: {}", endpoint, e)))?;
        debug!("Connected to browser: {}", version.browser);

        let browser_ws_url = version.web_socket_debugger_url;

        let (ws_stream, _) = tokio_tungstenite::connect_async(browser_ws_url.as_str())
            .await
            .map_err(|e| CdpError::ConnectionFailed(format!("WebSocket: {}", e)))?;

        let (ws_sink, ws_source) = ws_stream.split();
        let ws_tx = Arc::new(tokio::sync::Mutex::new(ws_sink));
        let pending: PendingMap = Arc::new(Mutex::new(HashMap::new()));

        let recv_task = {
            let pending = pending.clone();
            tokio::spawn(async move {
                Self::receive_loop(ws_source, pending).await;
            })
        };

        debug!("CDP client connected to {}", browser_ws_url);

        Ok(Self {
            http_endpoint,
            browser_ws_url,
            ws_tx,
            request_id: Arc::new(AtomicU64::new(1)),
            pending,
            _recv_task: recv_task,
        })
    }

    /// Fetch `/json/version` from a debugging endpoint.
    pub async fn fetch_version(endpoint: &Url) -> Result<BrowserVersion, CdpError> {
        let version_url = endpoint.join("/json/version")?;
        trace!("Fetching browser version from {}", version_url);
        let version = reqwest::get(version_url).await?.json().await?;
        Ok(version)
    }

    /// WebSocket receive loop.
    ///
    /// Responses resolve their pending request; events are only traced.
    /// When the socket closes every outstanding request fails with
    /// [`CdpError::SessionClosed`].
    async fn receive_loop(mut ws_source: WsSource, pending: PendingMap) {
        while let Some(msg) = ws_source.next().await {
            match msg {
                Ok(Message::Text(text)) => {
                    trace!("CDP recv: {}", text);
                    match serde_json::from_str::<CdpResponse>(&text) {
                        Ok(resp) => Self::dispatch(resp, &pending),
                        Err(e) => warn!("Failed to parse CDP message: {}", e),
                    }
                }
                Ok(Message::Close(_)) => {
                    debug!("WebSocket closed");
                    break;
                }
                Err(e) => {
                    error!("WebSocket error: {}", e);
                    break;
                }
                _ => {}
            }
        }

        for (_, req) in pending.lock().drain() {
            let _ = req.tx.send(Err(CdpError::SessionClosed));
        }
    }

    fn dispatch(resp: CdpResponse, pending: &PendingMap) {
        let Some(id) = resp.id else {
            if let Some(method) = resp.method {
                trace!(session = ?resp.session_id, "CDP event: {}", method);
            }
            return;
        };

        let Some(req) = pending.lock().remove(&id) else {
            return;
        };
        let result = match resp.error {
            Some(error) => Err(CdpError::Protocol {
                code: error.code,
                message: error.message,
            }),
            None => Ok(resp.result.unwrap_or(Value::Null)),
        };
        let _ = req.tx.send(result);
    }

    /// Send a CDP command and wait for response.
    pub async fn call(
        &self,
        method: &str,
        params: Option<Value>,
        session_id: Option<&str>,
    ) -> Result<Value, CdpError> {
        send_and_wait(
            &self.ws_tx,
            &self.pending,
            &self.request_id,
            method,
            params,
            session_id.map(|s| s.to_string()),
        )
        .await
    }

    /// Get browser WebSocket URL.
    pub fn browser_ws_url(&self) -> &str {
        &self.browser_ws_url
    }

    // ========================================================================
    // Target Management
    // ========================================================================

    /// List all targets reported by `/json/list`.
    pub async fn list_pages(&self) -> Result<Vec<PageInfo>, CdpError> {
        let url = self.http_endpoint.join("/json/list")?;
        let pages: Vec<PageInfo> = reqwest::get(url).await?.json().await?;
        Ok(pages)
    }

    /// First regular tab, if the browser has one open.
    pub async fn first_page(&self) -> Result<Option<PageInfo>, CdpError> {
        let pages = self.list_pages().await?;
        Ok(pages.into_iter().find(PageInfo::is_page))
    }

    /// Create a new page/tab.
    pub async fn new_page(&self, url: Option<&str>) -> Result<PageSession, CdpError> {
        let mut create_url = self.http_endpoint.join("/json/new")?;
        create_url.set_query(url);

        // Chrome requires PUT for /json/new
        let client = reqwest::Client::new();
        let page_info: PageInfo = client.put(create_url).send().await?.json().await?;
        debug!("Created new page: {} - {}", page_info.id, page_info.url);

        self.attach_page(&page_info.id).await
    }

    /// Attach to an existing page.
    pub async fn attach_page(&self, target_id: &str) -> Result<PageSession, CdpError> {
        let result = self
            .call(
                "Target.attachToTarget",
                Some(json!({
                    "targetId": target_id,
                    "flatten": true
                })),
                None,
            )
            .await?;

        let session_id = result["sessionId"]
            .as_str()
            .ok_or_else(|| CdpError::InvalidResponse("Missing sessionId".to_string()))?
            .to_string();

        let session = PageSession::new(
            target_id.to_string(),
            session_id,
            self.ws_tx.clone(),
            self.pending.clone(),
            self.request_id.clone(),
        );

        session.enable_domains().await?;

        Ok(session)
    }

    /// Close a page/target.
    pub async fn close_page(&self, target_id: &str) -> Result<(), CdpError> {
        self.call(
            "Target.closeTarget",
            Some(json!({"targetId": target_id})),
            None,
        )
        .await?;
        Ok(())
    }

    /// Ask the browser process to exit.
    pub async fn close_browser(&self) -> Result<(), CdpError> {
        self.call("Browser.close", None, None).await?;
        Ok(())
    }
}

impl Drop for CdpClient {
    fn drop(&mut self) {
        self._recv_task.abort();
    }
}

/// Serialize one request, register its reply slot and await the answer.
pub(crate) async fn send_and_wait(
    ws_tx: &tokio::sync::Mutex<WsSink>,
    pending: &PendingMap,
    request_id: &AtomicU64,
    method: &str,
    params: Option<Value>,
    session_id: Option<String>,
) -> Result<Value, CdpError> {
    let id = request_id.fetch_add(1, Ordering::SeqCst);

    let request = CdpRequest {
        id,
        method: method.to_string(),
        params,
        session_id,
    };

    let json = serde_json::to_string(&request)?;
    trace!("CDP send: {}", json);

    let (tx, rx) = oneshot::channel();
    pending.lock().insert(id, PendingRequest { tx });

    let sent = {
        let mut ws = ws_tx.lock().await;
        ws.send(Message::Text(json.into())).await
    };
    if let Err(e) = sent {
        pending.lock().remove(&id);
        return Err(e.into());
    }

    match tokio::time::timeout(CALL_TIMEOUT, rx).await {
        Ok(Ok(result)) => result,
        Ok(Err(_)) => Err(CdpError::SessionClosed),
        Err(_) => {
            pending.lock().remove(&id);
            Err(CdpError::Timeout(format!("Request {} timed out", method)))
        }
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
