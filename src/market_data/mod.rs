pub mod adapters;
pub mod collector;
pub mod fetcher;
pub mod types;
