pub mod envelope;
pub mod fetcher;
pub mod types;
