// -------------------------------------------------------
// TRACING SETUP
// -------------------------------------------------------

/// Installs a global fmt subscriber honouring `RUST_LOG`, with
/// `slackhook=debug` added on top. A subscriber already installed by the
/// host application wins; this is then a no-op.
pub fn initiate() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let mut filter = EnvFilter::from_default_env();
    if let Ok(directive) = "slackhook=debug".parse() {
        filter = filter.add_directive(directive);
    }

    let fmt_layer = fmt::layer().with_target(true);

    let subscriber = tracing_subscriber::registry().with(filter).with(fmt_layer);
    if subscriber.try_init().is_ok() {
        tracing::info!(target: "slackhook", "slackhook tracing initiated");
    }
}
