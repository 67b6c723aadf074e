use std::sync::Arc;

use serde_json::Value;
use tokio::task::JoinHandle;

use crate::error::{ConfigurationError, TransportFailure};
use crate::options::{NotifierBuilder, NotifierConfig};
use crate::payload::MessagePayload;
use crate::prom;
use crate::transport::Transport;

/// Posts messages to one incoming-webhook endpoint.
///
/// Cheap to clone: config and transport are shared, every call builds its
/// own payload, so clones can be used from concurrent tasks.
#[derive(Clone, Debug)]
pub struct Notifier {
    config: Arc<NotifierConfig>,
    transport: Arc<dyn Transport>,
}

impl Notifier {
    /// Validates `config` and wraps an already-built transport.
    pub fn new(config: NotifierConfig, transport: Arc<dyn Transport>) -> Result<Self, ConfigurationError> {
        NotifierBuilder::new(config).transport_instance(transport).build()
    }

    pub fn builder<'r>(config: NotifierConfig) -> NotifierBuilder<'r> {
        NotifierBuilder::new(config)
    }

    pub(crate) fn from_parts(config: NotifierConfig, transport: Arc<dyn Transport>) -> Self {
        Self { config: Arc::new(config), transport }
    }

    pub fn config(&self) -> &NotifierConfig {
        &self.config
    }

    /// Resolves defaults and assembles the body `send` would post.
    pub fn payload(
        &self,
        text: Option<&str>,
        icon: Option<&str>,
        blocks: Option<Vec<Value>>,
        channel: Option<&str>,
    ) -> MessagePayload {
        let cfg = &*self.config;
        let icon = match icon {
            Some(i) => Some(i.to_string()),
            None if cfg.icon_fallback => cfg.default_icon.clone(),
            None => None,
        };

        MessagePayload {
            text: text.map_or_else(|| cfg.default_text.clone(), str::to_string),
            username: cfg.sender_name.clone(),
            blocks: blocks.unwrap_or_default(),
            channel: channel.map(str::to_string).or_else(|| cfg.default_channel.clone()),
            icon_emoji: icon,
        }
    }

    /// Sends a message. Delivery failures are logged, never returned.
    pub async fn send(
        &self,
        text: Option<&str>,
        icon: Option<&str>,
        blocks: Option<Vec<Value>>,
        channel: Option<&str>,
    ) {
        let payload = self.payload(text, icon, blocks, channel);
        self.send_raw(&payload).await;
    }

    /// Plain-text message with every other field at its default.
    pub async fn send_text(&self, text: &str) {
        self.send(Some(text), None, None, None).await;
    }

    /// Like [`send`](Self::send) but hands the failure back instead of logging it.
    pub async fn try_send(
        &self,
        text: Option<&str>,
        icon: Option<&str>,
        blocks: Option<Vec<Value>>,
        channel: Option<&str>,
    ) -> Result<(), TransportFailure> {
        let payload = self.payload(text, icon, blocks, channel);
        self.try_send_raw(&payload).await
    }

    /// Posts a prebuilt payload; on failure logs the response body and returns normally.
    pub async fn send_raw(&self, payload: &MessagePayload) {
        if let Err(failure) = self.try_send_raw(payload).await {
            match &failure {
                TransportFailure::Status { status, body } => tracing::error!(
                    target: "slackhook",
                    status = *status,
                    response = %body,
                    "Slack sending failed"
                ),
                other => tracing::error!(
                    target: "slackhook",
                    reason = other.reason(),
                    response = %other.response(),
                    "Slack sending failed"
                ),
            }
        }
    }

    pub async fn try_send_raw(&self, payload: &MessagePayload) -> Result<(), TransportFailure> {
        let outcome = self.post(payload).await;
        match &outcome {
            Ok(()) => prom::inc_sent(),
            Err(f) => prom::inc_failed(f.reason()),
        }
        outcome
    }

    async fn post(&self, payload: &MessagePayload) -> Result<(), TransportFailure> {
        let body = payload
            .to_json()
            .map_err(|e| TransportFailure::Encode(e.to_string()))?;

        let resp = self.transport.post_json(&self.config.endpoint_url, &body).await?;
        if resp.is_ok() {
            Ok(())
        } else {
            Err(TransportFailure::Status { status: resp.status, body: resp.body })
        }
    }

    /// Fire-and-forget [`send`](Self::send) on the current tokio runtime.
    pub fn spawn_send(
        &self,
        text: Option<String>,
        icon: Option<String>,
        blocks: Option<Vec<Value>>,
        channel: Option<String>,
    ) -> JoinHandle<()> {
        let this = self.clone();
        tokio::spawn(async move {
            this.send(text.as_deref(), icon.as_deref(), blocks, channel.as_deref())
                .await
        })
    }
}
