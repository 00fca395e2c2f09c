pub mod api;
pub mod config;
pub mod error;
pub mod metrics_server;
pub mod observability;
pub mod pipeline;
pub mod service;
pub mod sinks;
pub mod sources;
pub mod store;
pub mod transform;

pub use api::{router, AppState};
pub use pipeline::{Envelope, Pipeline};
pub use service::EfficiencyService;
