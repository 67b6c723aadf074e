use crate::options::{NotifierBuilder, NotifierConfig};

/// One-shot text message to `webhook_url` with default settings.
pub async fn notify(webhook_url: Option<String>, text: String) {
    // unset or blank webhook: alerts are disabled
    let Some(url) = webhook_url.filter(|u| !u.trim().is_empty()) else {
        return;
    };

    match NotifierBuilder::new(NotifierConfig::new(url)).build() {
        Ok(notifier) => notifier.send_text(&text).await,
        Err(e) => tracing::warn!(
            target: "slackhook",
            "slack notify skipped: {}",
            e
        ),
    }
}
