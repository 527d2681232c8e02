//! OctoPrint REST client backing the printer status source.
//!
//! Only the connection endpoint is used: `GET /api/connection` to read the
//! current state and `POST /api/connection` with `{"command":"connect"}` to
//! open the serial link.

use async_trait::async_trait;
use hyper::client::HttpConnector;
use hyper::{header, Body, Client, Method, Request, Uri};
use printdeck_core::{ConnectionState, PrinterStatusSource, PrinterTarget, SourceError};
use serde::{Deserialize, Serialize};
use std::error::Error as StdError;
use std::time::Duration;
use tracing::debug;

pub const CONNECTION_PATH: &str = "/api/connection";
pub const API_KEY_HEADER: &str = "X-Api-Key";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(4);
const MAX_ERROR_BODY_CHARS: usize = 200;

#[derive(Debug, Clone, Deserialize)]
pub struct ConnectionResponse {
    pub current: CurrentConnection,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CurrentConnection {
    pub state: String,
    #[serde(default)]
    pub port: Option<String>,
    #[serde(default)]
    pub baudrate: Option<u32>,
    #[serde(default, rename = "printerProfile")]
    pub printer_profile: Option<String>,
}

/// Optional parameters of the connect command; unset fields use the server defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConnectOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub baudrate: Option<u32>,
    #[serde(
        rename = "printerProfile",
        skip_serializing_if = "Option::is_none"
    )]
    pub printer_profile: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub save: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub autoconnect: Option<bool>,
}

#[derive(Debug, Serialize)]
struct ConnectCommand<'a> {
    command: &'static str,
    #[serde(flatten)]
    options: &'a ConnectOptions,
}

pub struct OctoPrintClient {
    target: PrinterTarget,
    http: Client<HttpConnector>,
    timeout: Duration,
    connect_options: ConnectOptions,
}

impl OctoPrintClient {
    pub fn new(target: PrinterTarget) -> Self {
        Self {
            target,
            http: Client::new(),
            timeout: DEFAULT_REQUEST_TIMEOUT,
            connect_options: ConnectOptions::default(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_connect_options(mut self, options: ConnectOptions) -> Self {
        self.connect_options = options;
        self
    }

    pub async fn connection(&self) -> Result<ConnectionResponse, SourceError> {
        let body = self.send(Method::GET, CONNECTION_PATH, None).await?;
        serde_json::from_slice(&body).map_err(|err| SourceError::Decode(err.to_string()))
    }

    fn uri(&self, path: &str) -> Result<Uri, SourceError> {
        let base = self.target.endpoint.trim().trim_end_matches('/');
        format!("{base}{path}")
            .parse::<Uri>()
            .map_err(|err| SourceError::InvalidEndpoint(format!("{base}: {err}")))
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        json: Option<Vec<u8>>,
    ) -> Result<Vec<u8>, SourceError> {
        let uri = self.uri(path)?;
        let mut builder = Request::builder()
            .method(method.clone())
            .uri(uri)
            .header(header::ACCEPT, "application/json");
        if self.target.has_api_key() {
            builder = builder.header(API_KEY_HEADER, self.target.api_key.as_str());
        }
        let body = match json {
            Some(bytes) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(bytes)
            }
            None => Body::empty(),
        };
        let request = builder
            .body(body)
            .map_err(|err| SourceError::InvalidEndpoint(err.to_string()))?;

        debug!("octoprint_request: {method} {path}");
        let exchange = async {
            let response = self.http.request(request).await?;
            let status = response.status();
            let bytes = hyper::body::to_bytes(response.into_body()).await?;
            Ok::<_, hyper::Error>((status, bytes))
        };
        let (status, bytes) = tokio::time::timeout(self.timeout, exchange)
            .await
            .map_err(|_| SourceError::Timeout(self.timeout))?
            .map_err(|err| SourceError::Transport(error_chain(&err)))?;

        if !status.is_success() {
            let text = String::from_utf8_lossy(&bytes);
            return Err(SourceError::Status {
                status: status.as_u16(),
                body: text.trim().chars().take(MAX_ERROR_BODY_CHARS).collect(),
            });
        }
        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl PrinterStatusSource for OctoPrintClient {
    async fn connection_state(&self) -> Result<ConnectionState, SourceError> {
        let response = self.connection().await?;
        Ok(ConnectionState::from(response.current.state))
    }

    async fn connect(&self) -> Result<(), SourceError> {
        let command = ConnectCommand {
            command: "connect",
            options: &self.connect_options,
        };
        let payload =
            serde_json::to_vec(&command).map_err(|err| SourceError::Decode(err.to_string()))?;
        self.send(Method::POST, CONNECTION_PATH, Some(payload))
            .await
            .map(|_| ())
    }

    fn target(&self) -> &PrinterTarget {
        &self.target
    }
}

/// Flatten an error and its sources into one line.
///
/// hyper hides the OS error (e.g. "Connection refused") behind its connector
/// error, so the source chain is needed for a useful message.
pub fn error_chain(err: &(dyn StdError + 'static)) -> String {
    let mut text = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let cause_text = cause.to_string();
        if !text.contains(&cause_text) {
            text.push_str(": ");
            text.push_str(&cause_text);
        }
        source = cause.source();
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;

    /// Serve one HTTP exchange and hand back the raw request text.
    async fn serve_once(
        status_line: &'static str,
        body: &'static str,
    ) -> (String, oneshot::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let endpoint = format!("http://{}", listener.local_addr().unwrap());
        let (tx, rx) = oneshot::channel();
        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let request = read_request(&mut stream).await;
            let response = format!(
                "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(response.as_bytes()).await.unwrap();
            stream.shutdown().await.ok();
            let _ = tx.send(request);
        });
        (endpoint, rx)
    }

    async fn read_request(stream: &mut tokio::net::TcpStream) -> String {
        let mut data = Vec::new();
        let mut buf = [0u8; 1024];
        loop {
            let read = stream.read(&mut buf).await.unwrap();
            if read == 0 {
                break;
            }
            data.extend_from_slice(&buf[..read]);
            let text = String::from_utf8_lossy(&data).to_string();
            if let Some(split) = text.find("\r\n\r\n") {
                let content_length = text[..split]
                    .lines()
                    .find_map(|line| {
                        let (name, value) = line.split_once(':')?;
                        name.eq_ignore_ascii_case("content-length")
                            .then(|| value.trim().parse::<usize>().ok())
                            .flatten()
                    })
                    .unwrap_or(0);
                if data.len() >= split + 4 + content_length {
                    break;
                }
            }
        }
        String::from_utf8_lossy(&data).to_string()
    }

    #[test]
    fn parses_connection_response() {
        let raw = r#"{
            "current": {"state": "Operational", "port": "/dev/ttyACM0", "baudrate": 250000, "printerProfile": "_default"},
            "options": {"ports": ["/dev/ttyACM0"], "baudrates": [250000, 115200]}
        }"#;
        let parsed: ConnectionResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.current.state, "Operational");
        assert_eq!(parsed.current.port.as_deref(), Some("/dev/ttyACM0"));
        assert_eq!(parsed.current.baudrate, Some(250000));
        assert_eq!(parsed.current.printer_profile.as_deref(), Some("_default"));
    }

    #[test]
    fn connect_command_omits_unset_options() {
        let options = ConnectOptions::default();
        let command = ConnectCommand {
            command: "connect",
            options: &options,
        };
        assert_eq!(
            serde_json::to_string(&command).unwrap(),
            r#"{"command":"connect"}"#
        );

        let options = ConnectOptions {
            port: Some("/dev/ttyUSB0".to_string()),
            baudrate: Some(115200),
            ..ConnectOptions::default()
        };
        let command = ConnectCommand {
            command: "connect",
            options: &options,
        };
        let value = serde_json::to_value(&command).unwrap();
        assert_eq!(value["port"], "/dev/ttyUSB0");
        assert_eq!(value["baudrate"], 115200);
        assert!(value.get("printerProfile").is_none());
    }

    #[test]
    fn invalid_endpoint_is_reported() {
        let client = OctoPrintClient::new(PrinterTarget::new("not a url", ""));
        assert!(matches!(
            client.uri(CONNECTION_PATH),
            Err(SourceError::InvalidEndpoint(_))
        ));
    }

    #[tokio::test]
    async fn reads_state_and_sends_api_key() {
        let (endpoint, request) =
            serve_once("200 OK", r#"{"current":{"state":"Printing from SD"}}"#).await;
        let client = OctoPrintClient::new(PrinterTarget::new(format!("{endpoint}/"), "abc123"));

        let state = client.connection_state().await.unwrap();

        assert_eq!(state.label(), "Printing from SD");
        assert!(state.is_printing());
        let request = request.await.unwrap();
        assert!(request.starts_with("GET /api/connection HTTP/1.1"));
        assert!(request.to_ascii_lowercase().contains("x-api-key: abc123"));
    }

    #[tokio::test]
    async fn omits_api_key_header_when_unset() {
        let (endpoint, request) =
            serve_once("200 OK", r#"{"current":{"state":"Operational"}}"#).await;
        let client = OctoPrintClient::new(PrinterTarget::new(endpoint, ""));

        client.connection_state().await.unwrap();

        let request = request.await.unwrap();
        assert!(!request.to_ascii_lowercase().contains("x-api-key"));
    }

    #[tokio::test]
    async fn connect_posts_command_body() {
        let (endpoint, request) = serve_once("204 No Content", "").await;
        let client = OctoPrintClient::new(PrinterTarget::new(endpoint, "abc123"))
            .with_connect_options(ConnectOptions {
                baudrate: Some(250000),
                ..ConnectOptions::default()
            });

        client.connect().await.unwrap();

        let request = request.await.unwrap();
        assert!(request.starts_with("POST /api/connection HTTP/1.1"));
        assert!(request.contains(r#"{"command":"connect","baudrate":250000}"#));
    }

    #[tokio::test]
    async fn non_success_status_becomes_status_error() {
        let (endpoint, _request) =
            serve_once("403 FORBIDDEN", r#"{"error":"Invalid API key"}"#).await;
        let client = OctoPrintClient::new(PrinterTarget::new(endpoint, "wrong"));

        let err = client.connection_state().await.unwrap_err();

        match err {
            SourceError::Status { status, body } => {
                assert_eq!(status, 403);
                assert!(body.contains("Invalid API key"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn refused_connection_mentions_refusal() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let endpoint = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);
        let client = OctoPrintClient::new(PrinterTarget::new(endpoint.clone(), "abc123"));

        let err = client.connection_state().await.unwrap_err();

        let text = err.to_string();
        assert!(text.to_ascii_lowercase().contains("connection refused"), "{text}");
        let message = printdeck_core::describe_error(&text, client.target());
        assert!(message.contains(&endpoint));
        assert!(!message.contains("abc123"));
    }

    #[tokio::test]
    async fn timeout_covers_headers_and_body_together() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let endpoint = format!("http://{}", listener.local_addr().unwrap());
        let body = r#"{"current":{"state":"Operational"}}"#;
        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            read_request(&mut stream).await;
            tokio::time::sleep(Duration::from_millis(300)).await;
            let head = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\r\n",
                body.len()
            );
            stream.write_all(head.as_bytes()).await.unwrap();
            stream.flush().await.unwrap();
            tokio::time::sleep(Duration::from_millis(300)).await;
            let _ = stream.write_all(body.as_bytes()).await;
        });
        let client = OctoPrintClient::new(PrinterTarget::new(endpoint, ""))
            .with_timeout(Duration::from_millis(400));

        let result = client.connection_state().await;

        assert!(matches!(result, Err(SourceError::Timeout(_))), "{result:?}");
    }

    #[tokio::test]
    async fn malformed_body_is_a_decode_error() {
        let (endpoint, _request) = serve_once("200 OK", r#"{"unexpected":true}"#).await;
        let client = OctoPrintClient::new(PrinterTarget::new(endpoint, ""));

        assert!(matches!(
            client.connection_state().await,
            Err(SourceError::Decode(_))
        ));
    }
}
