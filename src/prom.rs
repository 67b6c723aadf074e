use once_cell::sync::OnceCell;
use prometheus::{Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};

static REGISTRY: OnceCell<Registry> = OnceCell::new();

static MESSAGES_SENT: OnceCell<IntCounter> = OnceCell::new();
static MESSAGES_FAILED: OnceCell<IntCounterVec> = OnceCell::new();

/// Registers the delivery counters. Idempotent; until called, recording is a no-op.
pub fn init_prometheus() {
    let registry = REGISTRY.get_or_init(Registry::new);

    // one initializer wins; the counter it registers is the one recorded into
    MESSAGES_SENT
        .get_or_try_init(|| {
            let sent = IntCounter::new("slackhook_messages_sent_total", "Webhook messages delivered")?;
            registry.register(Box::new(sent.clone()))?;
            Ok::<_, prometheus::Error>(sent)
        })
        .ok();

    MESSAGES_FAILED
        .get_or_try_init(|| {
            let failed = IntCounterVec::new(
                Opts::new("slackhook_messages_failed_total", "Webhook messages not delivered"),
                &["reason"], // status | transport | encode
            )?;
            registry.register(Box::new(failed.clone()))?;
            Ok::<_, prometheus::Error>(failed)
        })
        .ok();
}

pub fn registry() -> Option<&'static Registry> {
    REGISTRY.get()
}

// Called by the notifier
pub(crate) fn inc_sent() {
    if let Some(c) = MESSAGES_SENT.get() { c.inc(); }
}
pub(crate) fn inc_failed(reason: &str) {
    if let Some(c) = MESSAGES_FAILED.get() {
        c.with_label_values(&[reason]).inc();
    }
}

/// Text exposition of the crate's metrics, for a host `/metrics` handler.
pub fn gather() -> Result<String, prometheus::Error> {
    init_prometheus();
    let Some(registry) = REGISTRY.get() else {
        return Ok(String::new());
    };
    let encoder = TextEncoder::new();
    let mut buf = Vec::new();
    encoder.encode(&registry.gather(), &mut buf)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_show_up_in_exposition() {
        init_prometheus();
        inc_sent();
        inc_failed("status");

        let text = gather().unwrap();
        assert!(text.contains("slackhook_messages_sent_total"));
        assert!(text.contains(r#"slackhook_messages_failed_total{reason="status"}"#));
    }

    fn exported_sent_total() -> u64 {
        assert!(registry().is_some());
        gather()
            .unwrap()
            .lines()
            .find_map(|l| l.strip_prefix("slackhook_messages_sent_total "))
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(0)
    }

    #[test]
    fn concurrent_init_records_into_the_exported_counter() {
        let barrier = std::sync::Arc::new(std::sync::Barrier::new(8));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let barrier = barrier.clone();
                std::thread::spawn(move || {
                    barrier.wait();
                    init_prometheus();
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        let before = exported_sent_total();
        inc_sent();
        assert!(exported_sent_total() > before);
    }
}
