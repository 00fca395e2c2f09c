pub mod store_sink;

pub use store_sink::{BackfillReport, StoreSink};
