use std::sync::Arc;
use std::time::Duration;

use ahash::AHashMap;
use async_trait::async_trait;
use parking_lot::RwLock;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{ConfigurationError, TransportFailure};

/// Status + raw body of a webhook response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self { status, body: body.into() }
    }

    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Anything able to POST a JSON body and hand back status + body.
///
/// Implementations must be `Send + Sync`; a single notifier may be cloned
/// across tasks and every clone shares the same transport.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Short label used in logs.
    fn name(&self) -> &str {
        "custom"
    }

    async fn post_json(&self, url: &str, body: &Value) -> Result<TransportResponse, TransportFailure>;
}

impl std::fmt::Debug for dyn Transport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transport").field("name", &self.name()).finish()
    }
}

/// Settings for the default reqwest-backed transport.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct HttpClientConfig {
    /// Whole-request timeout (ms). `None` keeps reqwest's default (no timeout).
    pub timeout_ms: Option<u64>,
    pub connect_timeout_ms: Option<u64>,
    pub user_agent: Option<String>,
}

/// Default transport: a plain JSON HTTP client.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self { client: Client::new() }
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    pub fn from_config(cfg: &HttpClientConfig) -> Result<Self, ConfigurationError> {
        let mut builder = Client::builder();
        if let Some(ms) = cfg.timeout_ms {
            builder = builder.timeout(Duration::from_millis(ms));
        }
        if let Some(ms) = cfg.connect_timeout_ms {
            builder = builder.connect_timeout(Duration::from_millis(ms));
        }
        if let Some(ua) = &cfg.user_agent {
            builder = builder.user_agent(ua.clone());
        }
        let client = builder
            .build()
            .map_err(|e| ConfigurationError::HttpClient(e.to_string()))?;
        Ok(Self { client })
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    fn name(&self) -> &str {
        "reqwest"
    }

    async fn post_json(&self, url: &str, body: &Value) -> Result<TransportResponse, TransportFailure> {
        let resp = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| TransportFailure::Transport(e.to_string()))?;

        let status = resp.status().as_u16();
        // body is diagnostic only; an unreadable one is logged as empty
        let body = resp.text().await.unwrap_or_default();
        Ok(TransportResponse { status, body })
    }
}

/// Named transports a host application hands to the builder.
///
/// Replaces looking a client up in an application-wide container: the
/// registry is an ordinary value and only the builders given it can see it.
#[derive(Default)]
pub struct TransportRegistry {
    inner: RwLock<AHashMap<String, Arc<dyn Transport>>>,
}

impl TransportRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `transport` under `id`, returning the one it replaced.
    pub fn register(&self, id: impl Into<String>, transport: Arc<dyn Transport>) -> Option<Arc<dyn Transport>> {
        self.inner.write().insert(id.into(), transport)
    }

    pub fn get(&self, id: &str) -> Option<Arc<dyn Transport>> {
        self.inner.read().get(id).cloned()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.inner.read().contains_key(id)
    }
}

/// How a notifier obtains its transport.
#[derive(Debug, Clone)]
pub enum TransportSpec {
    /// Use this transport as-is.
    Instance(Arc<dyn Transport>),
    /// Look the transport up in a [`TransportRegistry`] by id.
    Named(String),
    /// Build a [`ReqwestTransport`] from these settings.
    Client(HttpClientConfig),
}

impl Default for TransportSpec {
    fn default() -> Self {
        TransportSpec::Client(HttpClientConfig::default())
    }
}

impl TransportSpec {
    pub(crate) fn resolve(
        self,
        registry: Option<&TransportRegistry>,
    ) -> Result<Arc<dyn Transport>, ConfigurationError> {
        match self {
            TransportSpec::Instance(t) => Ok(t),
            TransportSpec::Named(id) => registry
                .and_then(|r| r.get(&id))
                .ok_or(ConfigurationError::UnknownTransport(id)),
            TransportSpec::Client(cfg) => Ok(Arc::new(ReqwestTransport::from_config(&cfg)?)),
        }
    }
}

impl From<Arc<dyn Transport>> for TransportSpec {
    fn from(t: Arc<dyn Transport>) -> Self {
        TransportSpec::Instance(t)
    }
}

impl From<HttpClientConfig> for TransportSpec {
    fn from(cfg: HttpClientConfig) -> Self {
        TransportSpec::Client(cfg)
    }
}


#[cfg(test)]
mod tests {
    use super::testing::RecordingTransport;
    use super::*;

    #[test]
    fn only_2xx_is_ok() {
        assert!(TransportResponse::new(200, "ok").is_ok());
        assert!(TransportResponse::new(204, "").is_ok());
        assert!(!TransportResponse::new(302, "").is_ok());
        assert!(!TransportResponse::new(500, "rate_limited").is_ok());
    }

    #[test]
    fn named_spec_resolves_from_registry() {
        let registry = TransportRegistry::new();
        registry.register("slack-http", RecordingTransport::replying(200, "ok"));

        assert!(registry.contains("slack-http"));
        assert!(!registry.contains("other"));

        let t = TransportSpec::Named("slack-http".into()).resolve(Some(&registry)).unwrap();
        assert_eq!(t.name(), "recording");
    }

    #[test]
    fn unknown_name_is_a_configuration_error() {
        let registry = TransportRegistry::new();
        let err = TransportSpec::Named("missing".into()).resolve(Some(&registry)).unwrap_err();
        assert_eq!(err, ConfigurationError::UnknownTransport("missing".into()));

        let err = TransportSpec::Named("missing".into()).resolve(None).unwrap_err();
        assert_eq!(err, ConfigurationError::UnknownTransport("missing".into()));
    }

    #[test]
    fn client_spec_builds_reqwest_transport() {
        let cfg = HttpClientConfig {
            timeout_ms: Some(5_000),
            connect_timeout_ms: Some(1_000),
            user_agent: Some("slackhook-test".into()),
        };
        let t = TransportSpec::Client(cfg).resolve(None).unwrap();
        assert_eq!(t.name(), "reqwest");
    }

    #[test]
    fn http_client_config_deserializes_with_defaults() {
        let cfg: HttpClientConfig = serde_json::from_str(r#"{"timeout_ms": 2500}"#).unwrap();
        assert_eq!(cfg.timeout_ms, Some(2500));
        assert_eq!(cfg.user_agent, None);
    }
}
