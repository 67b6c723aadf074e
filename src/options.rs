use std::sync::Arc;

use reqwest::Url;
use serde::Deserialize;

use crate::error::ConfigurationError;
use crate::notifier::Notifier;
use crate::transport::{Transport, TransportRegistry, TransportSpec};

pub const DEFAULT_TEXT: &str = "Message from application";

fn default_text() -> String {
    DEFAULT_TEXT.to_string()
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct NotifierConfig {
    /// Incoming-webhook URL messages are posted to
    pub endpoint_url: String,

    /// Sender username shown by the chat platform
    #[serde(default)]
    pub sender_name: Option<String>,

    /// Emoji code used as the sender avatar, e.g. `:robot_face:`
    #[serde(default)]
    pub default_icon: Option<String>,

    /// Body used when a message is sent without text (blocks-only messages)
    #[serde(default = "default_text")]
    pub default_text: String,

    /// Channel override applied when the caller names none
    #[serde(default)]
    pub default_channel: Option<String>,

    /// Fill a missing icon from `default_icon`. Off by default: the icon is
    /// normally a per-call choice only.
    #[serde(default)]
    pub icon_fallback: bool,
}

impl NotifierConfig {
    pub fn new(endpoint_url: impl Into<String>) -> Self {
        Self {
            endpoint_url: endpoint_url.into(),
            sender_name: None,
            default_icon: None,
            default_text: default_text(),
            default_channel: None,
            icon_fallback: false,
        }
    }

    pub fn sender_name(mut self, name: impl Into<String>) -> Self {
        self.sender_name = Some(name.into());
        self
    }

    pub fn default_icon(mut self, icon: impl Into<String>) -> Self {
        self.default_icon = Some(icon.into());
        self
    }

    pub fn default_text(mut self, text: impl Into<String>) -> Self {
        self.default_text = text.into();
        self
    }

    pub fn default_channel(mut self, channel: impl Into<String>) -> Self {
        self.default_channel = Some(channel.into());
        self
    }

    pub fn icon_fallback(mut self, enabled: bool) -> Self {
        self.icon_fallback = enabled;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        let url = self.endpoint_url.trim();
        if url.is_empty() {
            return Err(ConfigurationError::MissingEndpoint);
        }
        match Url::parse(url) {
            Ok(u) if matches!(u.scheme(), "http" | "https") => {}
            _ => return Err(ConfigurationError::InvalidEndpoint(url.to_string())),
        }
        if self.default_text.is_empty() {
            return Err(ConfigurationError::EmptyDefaultText);
        }
        Ok(())
    }
}

/// Validates a [`NotifierConfig`], resolves the transport and yields a [`Notifier`].
pub struct NotifierBuilder<'r> {
    config: NotifierConfig,
    transport: TransportSpec,
    registry: Option<&'r TransportRegistry>,
}

impl<'r> NotifierBuilder<'r> {
    pub fn new(config: NotifierConfig) -> Self {
        Self {
            config,
            transport: TransportSpec::default(),
            registry: None,
        }
    }

    pub fn transport(mut self, spec: impl Into<TransportSpec>) -> Self {
        self.transport = spec.into();
        self
    }

    pub fn transport_instance(self, transport: Arc<dyn Transport>) -> Self {
        self.transport(TransportSpec::Instance(transport))
    }

    pub fn transport_named(self, id: impl Into<String>) -> Self {
        self.transport(TransportSpec::Named(id.into()))
    }

    pub fn registry(mut self, registry: &'r TransportRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn build(self) -> Result<Notifier, ConfigurationError> {
        self.config.validate()?;
        let transport = self.transport.resolve(self.registry)?;
        // ensure delivery counters exist
        crate::prom::init_prometheus();
        tracing::debug!(
            target: "slackhook",
            transport = transport.name(),
            "slack notifier configured"
        );
        Ok(Notifier::from_parts(self.config, transport))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::testing::RecordingTransport;
    use crate::transport::HttpClientConfig;

    #[test]
    fn deserializes_with_original_defaults() {
        let cfg: NotifierConfig =
            serde_json::from_str(r#"{"endpoint_url": "https://hooks.example/T1"}"#).unwrap();
        assert_eq!(cfg, NotifierConfig::new("https://hooks.example/T1"));
        assert_eq!(cfg.default_text, DEFAULT_TEXT);
        assert!(!cfg.icon_fallback);
    }

    #[test]
    fn empty_endpoint_is_rejected() {
        let err = NotifierBuilder::new(NotifierConfig::new("   ")).build().unwrap_err();
        assert_eq!(err, ConfigurationError::MissingEndpoint);
    }

    #[test]
    fn non_http_endpoint_is_rejected() {
        for url in ["hooks.example/T1", "ftp://hooks.example/T1"] {
            let err = NotifierBuilder::new(NotifierConfig::new(url)).build().unwrap_err();
            assert!(matches!(err, ConfigurationError::InvalidEndpoint(_)), "{url}: {err:?}");
        }
    }

    #[test]
    fn empty_default_text_is_rejected() {
        let cfg = NotifierConfig::new("https://hooks.example/T1").default_text("");
        let err = NotifierBuilder::new(cfg).build().unwrap_err();
        assert_eq!(err, ConfigurationError::EmptyDefaultText);
    }

    #[test]
    fn unregistered_transport_name_fails_build() {
        let registry = TransportRegistry::new();
        let err = NotifierBuilder::new(NotifierConfig::new("https://hooks.example/T1"))
            .transport_named("httpclient")
            .registry(&registry)
            .build()
            .unwrap_err();
        assert_eq!(err, ConfigurationError::UnknownTransport("httpclient".into()));
    }

    #[test]
    fn builds_with_each_transport_form() {
        let cfg = NotifierConfig::new("https://hooks.example/T1");

        let registry = TransportRegistry::new();
        registry.register("httpclient", RecordingTransport::replying(200, "ok"));
        assert!(NotifierBuilder::new(cfg.clone())
            .transport_named("httpclient")
            .registry(&registry)
            .build()
            .is_ok());

        assert!(NotifierBuilder::new(cfg.clone())
            .transport_instance(RecordingTransport::replying(200, "ok"))
            .build()
            .is_ok());

        assert!(NotifierBuilder::new(cfg)
            .transport(HttpClientConfig::default())
            .build()
            .is_ok());
    }
}
