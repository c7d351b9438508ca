mod client;
mod fetcher;

pub use client::new_client;
pub use fetcher::{FetchError, HttpSystemInfoSource, SystemInfoSource};
