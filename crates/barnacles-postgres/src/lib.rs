mod client;
mod config;
mod event_store;
mod sink;

pub use client::PostgresClient;
pub use config::{DynambOptions, EventsToStore, RaddecOptions, SinkConfig, SpatemOptions};
pub use event_store::PostgresEventStore;
pub use sink::PostgresSink;
