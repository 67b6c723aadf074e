pub mod error;
pub mod notifier;
pub mod options;
pub mod payload;
pub mod transport;

pub use error::{ConfigurationError, TransportFailure};
pub use notifier::Notifier;
pub use options::{NotifierBuilder, NotifierConfig};
pub use payload::MessagePayload;
pub use transport::{
    HttpClientConfig, ReqwestTransport, Transport, TransportRegistry, TransportResponse, TransportSpec,
};

// Tracing bootstrap for hosts without their own subscriber
pub mod logging;
pub use logging::initiate;

// Prometheus metrics
pub mod prom;

// One-shot helper
pub mod slack;
pub use slack::notify;
