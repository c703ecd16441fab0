//! Outbound client for the Telegram Bot API `sendMessage` method.

use crate::config::TelegramConfig;
use crate::error::{ProviderSetupError, TransportError};
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::{Method, Request, StatusCode, header};
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::client::legacy::{Client, connect::HttpConnector};
use hyper_util::rt::TokioExecutor;
use once_cell::sync::OnceCell;
use rustls::{ClientConfig, RootCertStore};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

/// Shared TLS configuration, built once per process.
static TLS_CONFIG: OnceCell<Arc<ClientConfig>> = OnceCell::new();

fn shared_tls_config() -> Result<Arc<ClientConfig>, ProviderSetupError> {
    TLS_CONFIG
        .get_or_try_init(|| {
            let mut root_cert_store = RootCertStore::empty();
            root_cert_store.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());

            let config = ClientConfig::builder_with_provider(Arc::new(
                rustls::crypto::ring::default_provider(),
            ))
            .with_safe_default_protocol_versions()?
            .with_root_certificates(root_cert_store)
            .with_no_client_auth();

            Ok::<_, ProviderSetupError>(Arc::new(config))
        })
        .cloned()
}

#[derive(Serialize)]
struct SendMessagePayload<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'a str,
}

/// What the provider answered. Any status is a completed exchange.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProviderResponse {
    pub status: StatusCode,
    pub body: String,
}

impl ProviderResponse {
    pub fn is_delivered(&self) -> bool {
        self.status == StatusCode::OK
    }
}

#[derive(Clone)]
pub struct TelegramClient {
    client: Client<HttpsConnector<HttpConnector>, Full<Bytes>>,
    api_base_url: String,
    bot_token: String,
    parse_mode: String,
    timeout: Duration,
}

impl fmt::Debug for TelegramClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramClient")
            .field("api_base_url", &self.api_base_url)
            .field("bot_token_set", &!self.bot_token.is_empty())
            .field("parse_mode", &self.parse_mode)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl TelegramClient {
    pub fn new(config: &TelegramConfig, bot_token: &str) -> Result<Self, ProviderSetupError> {
        let tls = shared_tls_config()?;
        let connector = HttpsConnectorBuilder::new()
            .with_tls_config((*tls).clone())
            .https_or_http()
            .enable_http1()
            .build();
        let client = Client::builder(TokioExecutor::new()).build(connector);

        Ok(Self {
            client,
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
            bot_token: bot_token.to_string(),
            parse_mode: config.parse_mode.clone(),
            timeout: config.timeout(),
        })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn send_message_url(&self) -> String {
        format!("{}/bot{}/sendMessage", self.api_base_url, self.bot_token)
    }

    /// Issue a single `sendMessage` call.
    ///
    /// The whole exchange, body included, is bounded by the configured timeout.
    /// `Ok` means the provider answered, whatever the status.
    #[tracing::instrument(skip(self, text), fields(text_len = text.len()))]
    pub async fn send_message(
        &self,
        chat_id: &str,
        text: &str,
    ) -> Result<ProviderResponse, TransportError> {
        let payload = serde_json::to_vec(&SendMessagePayload {
            chat_id,
            text,
            parse_mode: &self.parse_mode,
        })
        .map_err(|e| TransportError::InvalidRequest(e.to_string()))?;

        // The URL embeds the bot token; keep it out of every error string.
        let req = Request::builder()
            .method(Method::POST)
            .uri(self.send_message_url())
            .header(header::CONTENT_TYPE, "application/json")
            .header(
                header::USER_AGENT,
                concat!("telegram-relay/", env!("CARGO_PKG_VERSION")),
            )
            .body(Full::new(Bytes::from(payload)))
            .map_err(|e| TransportError::InvalidRequest(e.to_string()))?;

        match timeout(self.timeout, self.exchange(req)).await {
            Ok(result) => result,
            Err(_) => Err(TransportError::Timeout(self.timeout)),
        }
    }

    async fn exchange(&self, req: Request<Full<Bytes>>) -> Result<ProviderResponse, TransportError> {
        let resp = self
            .client
            .request(req)
            .await
            .map_err(|e| TransportError::Network(error_chain(&e)))?;
        let status = resp.status();
        let body = resp
            .into_body()
            .collect()
            .await
            .map_err(|e| TransportError::Body(error_chain(&e)))?
            .to_bytes();

        Ok(ProviderResponse {
            status,
            body: String::from_utf8_lossy(&body).into_owned(),
        })
    }
}

/// Render an error with its sources, `outer: inner: root`.
fn error_chain(e: &dyn std::error::Error) -> String {
    let mut out = e.to_string();
    let mut source = e.source();
    while let Some(inner) = source {
        out.push_str(": ");
        out.push_str(&inner.to_string());
        source = inner.source();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> TelegramClient {
        let config = TelegramConfig {
            api_base_url: base.into(),
            ..TelegramConfig::default()
        };
        TelegramClient::new(&config, "123:abc").unwrap()
    }

    #[test]
    fn builds_send_message_url() {
        let c = client("https://api.telegram.org/");
        assert_eq!(
            c.send_message_url(),
            "https://api.telegram.org/bot123:abc/sendMessage"
        );
    }

    #[test]
    fn debug_hides_token() {
        let c = client("https://api.telegram.org");
        let rendered = format!("{c:?}");
        assert!(!rendered.contains("123:abc"));
        assert!(rendered.contains("bot_token_set: true"));
    }

    #[test]
    fn only_200_counts_as_delivered() {
        let ok = ProviderResponse {
            status: StatusCode::OK,
            body: String::new(),
        };
        let created = ProviderResponse {
            status: StatusCode::CREATED,
            body: String::new(),
        };
        assert!(ok.is_delivered());
        assert!(!created.is_delivered());
    }

    #[tokio::test]
    async fn unreachable_host_is_a_network_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let c = client(&format!("http://{addr}"));
        let err = c.send_message("1", "hi").await.unwrap_err();
        assert!(matches!(
            err,
            TransportError::Network(_) | TransportError::Timeout(_)
        ));
    }
}
