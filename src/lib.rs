// src/lib.rs

pub mod aggregate;
pub mod error;
pub mod fetch;
pub mod render;
pub mod transform;

pub use error::ScrapeError;

/// Root of the source site. Every profile URL and every rewritten asset link
/// is rooted here.
pub const BASE_URL: &str = "https://www.policinglaw.info/";
