//! # Concurrent HTTP fetching with cancel-on-first-failure.
//!
//! [`Fetcher::fetch_all`] starts one GET per distinct URL on a [`JoinSet`](tokio::task::JoinSet),
//! all sharing a child of the caller's [`CancellationToken`](tokio_util::sync::CancellationToken).
//!
//! ```text
//! caller token
//!     └─► child token ──┬─► fetch(url 1) ──► Ok(body)
//!                       ├─► fetch(url 2) ──► Err(Status 500) ─► child.cancel()
//!                       └─► fetch(url 3) ──► Err(Canceled)   (ignored)
//! result: Err(Status 500)
//! ```
//!
//! ## Rules
//! - The first failure that is not a cancellation is the surfaced error.
//! - Cancellation of the caller's token surfaces as [`FetchError::Canceled`].
//! - No partial results are returned on error.

mod error;
mod fetcher;

pub use error::FetchError;
pub use fetcher::{Fetcher, fetch_all};
