use crate::client::request::{ApiRequest, Endpoint};
use crate::client::traits::ApiClient;
use crate::config::Credentials;
use crate::model::FetchError;

use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::{debug, warn};

const CLIENT_ID_HEADER: &str = "X-Naver-Client-Id";
const CLIENT_SECRET_HEADER: &str = "X-Naver-Client-Secret";

pub struct NaverClient {
    client: Client,
    base_url: String,
    credentials: Option<Credentials>,
}

impl NaverClient {
    /// Builds the client. Missing credentials are reported per request, not here.
    pub fn new(
        base_url: impl Into<String>,
        credentials: Option<Credentials>,
        timeout: Duration,
    ) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(concat!("naver-trends/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            credentials,
        })
    }

    fn build_url(&self, endpoint: Endpoint) -> String {
        format!("{}{}", self.base_url, endpoint.path())
    }
}

fn transport_error(e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Transport(format!("request timed out: {e}"))
    } else {
        FetchError::Transport(e.to_string())
    }
}

#[async_trait::async_trait]
impl ApiClient for NaverClient {
    async fn send(&self, request: &ApiRequest) -> Result<String, FetchError> {
        let credentials = self
            .credentials
            .as_ref()
            .ok_or(FetchError::MissingCredentials)?;

        let url = self.build_url(request.endpoint());
        debug!("Requesting {}", url);

        let builder = match request {
            ApiRequest::Post { body, .. } => self.client.post(&url).json(body),
            ApiRequest::Get { query, .. } => self.client.get(&url).query(query),
        };

        let response = builder
            .header(CLIENT_ID_HEADER, &credentials.client_id)
            .header(CLIENT_SECRET_HEADER, &credentials.client_secret)
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        let body = response.text().await.map_err(transport_error)?;

        if status != StatusCode::OK {
            warn!("Upstream error [{}] from {}: {}", status, request.endpoint(), body);
            return Err(FetchError::UpstreamHttp {
                status: status.as_u16(),
                body,
            });
        }

        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    fn credentials() -> Option<Credentials> {
        Some(Credentials {
            client_id: "id".into(),
            client_secret: "secret".into(),
        })
    }

    /// Answers one connection with `response` and hands back the raw request head.
    async fn serve_once(response: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut received = Vec::new();
            let mut buf = [0u8; 1024];
            while !received.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                received.extend_from_slice(&buf[..n]);
            }
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
            String::from_utf8_lossy(&received).to_lowercase()
        });
        (base_url, handle)
    }

    #[tokio::test]
    async fn non_200_carries_status_and_body() {
        let (base_url, server) = serve_once(
            "HTTP/1.1 503 Service Unavailable\r\nContent-Length: 4\r\nConnection: close\r\n\r\nbusy",
        )
        .await;
        let client = NaverClient::new(base_url, credentials(), Duration::from_secs(5)).unwrap();

        let result = client.send(&ApiRequest::shop("padding", 10)).await;
        assert_eq!(
            result,
            Err(FetchError::UpstreamHttp {
                status: 503,
                body: "busy".into()
            })
        );
        server.await.unwrap();
    }

    #[tokio::test]
    async fn ok_returns_body_and_sends_credential_headers() {
        let (base_url, server) = serve_once(
            "HTTP/1.1 200 OK\r\nContent-Length: 12\r\nConnection: close\r\n\r\n{\"items\":[]}",
        )
        .await;
        let client = NaverClient::new(base_url, credentials(), Duration::from_secs(5)).unwrap();

        let body = client.send(&ApiRequest::blog("padding", 10)).await.unwrap();
        assert_eq!(body, "{\"items\":[]}");

        let head = server.await.unwrap();
        assert!(head.starts_with("get /v1/search/blog.json?"));
        assert!(head.contains("x-naver-client-id: id"));
        assert!(head.contains("x-naver-client-secret: secret"));
    }

    #[tokio::test]
    async fn silent_upstream_times_out_as_transport_error() {
        // Connections queue in the backlog and are never answered.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let client = NaverClient::new(base_url, credentials(), Duration::from_millis(200)).unwrap();

        let result = client.send(&ApiRequest::shop("padding", 10)).await;
        match result {
            Err(FetchError::Transport(msg)) => assert!(msg.starts_with("request timed out"), "{msg}"),
            other => panic!("expected a transport timeout, got {other:?}"),
        }
        drop(listener);
    }

    #[tokio::test]
    async fn missing_credentials_fail_before_any_request() {
        // Port 9 (discard) is never contacted: the credential check runs first.
        let client = NaverClient::new("http://127.0.0.1:9/", None, Duration::from_secs(1)).unwrap();

        let result = client.send(&ApiRequest::shop("padding", 10)).await;
        assert_eq!(result, Err(FetchError::MissingCredentials));
    }

    #[test]
    fn urls_join_base_and_endpoint() {
        let client = NaverClient::new("https://openapi.naver.com/", None, Duration::from_secs(1)).unwrap();
        assert_eq!(
            client.build_url(Endpoint::DatalabSearch),
            "https://openapi.naver.com/v1/datalab/search"
        );
        assert_eq!(
            client.build_url(Endpoint::BlogSearch),
            "https://openapi.naver.com/v1/search/blog.json"
        );
    }
}
