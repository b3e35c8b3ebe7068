//! # webcache core
//!
//! A lightweight in-memory cache to wrap around slow content generation
//! in a request path. Instead of
//!
//! ```rust,ignore
//! let body = complex_backend_function(); // takes a long time
//! respond(body);
//! ```
//!
//! keep the result in a [`CachedPage`] and let only one request at a time
//! rebuild it:
//!
//! ```rust
//! use std::time::Duration;
//! use webcache_core::CachedPage;
//!
//! # fn complex_backend_function() -> Vec<u8> { b"result".to_vec() }
//! let page = CachedPage::new(Duration::from_secs(10));
//!
//! if !page.is_valid() {
//!     if let Ok(mut update) = page.try_update() {
//!         update.append(&complex_backend_function()).unwrap();
//!         update.commit().unwrap();
//!     }
//! }
//! let body = page.read();
//! # assert_eq!(&body[..], b"result");
//! ```
//!
//! - **Cache**: [`CachedPage`], the single guarded artifact
//! - **Transactions**: [`UpdateGuard`] for scoped updates
//! - **Errors**: [`CacheError`]
//! - **Time**: [`Clock`] with [`SystemClock`] and [`ManualClock`]

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, clippy::all)]

mod cache;
mod clock;
mod config;
mod guard;
pub mod error;
pub mod http_date;

pub use cache::{CachedPage, PageStatus, Statistics};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{CacheConfig, DEFAULT_MAX_AGE_SECONDS};
pub use error::{CacheError, Result};
pub use guard::UpdateGuard;
