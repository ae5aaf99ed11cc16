//! # Disposal
//!
//! Guaranteed, exactly-once release of resources after scoped work.
//!
//! Hand a resource (or a group of them) and a unit of work to one of the
//! scoped executions. The work runs first; then every resource is released,
//! whether the work returned a value, returned an error, panicked, or was
//! cancelled. The work's outcome comes back untouched, unless the work
//! succeeded and a release failed, in which case the release error is the
//! outcome.
//!
//! | | one resource | resource group |
//! |---|---|---|
//! | may suspend | [`using`](fn@using) | [`using_all`] (concurrent release) |
//! | never suspends | [`using_sync`] | [`using_all_sync`] (in-order release) |
//!
//! ## Quick Example
//!
//! ```rust
//! use disposal::{AsyncDisposable, using};
//!
//! struct Connection {
//!     open: bool,
//! }
//!
//! impl AsyncDisposable for Connection {
//!     type Error = String;
//!
//!     async fn dispose_async(self) -> Result<(), String> {
//!         // send goodbye, close socket
//!         Ok(())
//!     }
//! }
//!
//! # tokio_test::block_on(async {
//! let greeting = using(Connection { open: true }, async |conn| {
//!     if conn.open {
//!         Ok("Hello world!")
//!     } else {
//!         Err("connection closed".to_string())
//!     }
//! })
//! .await;
//!
//! assert_eq!(greeting, Ok("Hello world!"));
//! # });
//! ```
//!
//! ## Errors
//!
//! Release errors convert into the work's error type with `Into`. The plain
//! functions return `Result<T, E>`:
//!
//! - the work failed: its error, always; a failing release is logged with
//!   `tracing::warn!` as a suppressed error
//! - the work succeeded, a release failed: the release error (the first in
//!   group order; later ones are logged)
//!
//! The `_full` variants ([`using_full`], [`using_sync_full`],
//! [`using_all_full`], [`using_all_sync_full`]) return a [`UsingError`]
//! holding every error instead.
//!
//! ## Panics and cancellation
//!
//! A drop guard owns the resources while the work runs, and another owns the
//! release pass while it is awaited. If the work panics, or the future of
//! [`using`](fn@using)/[`using_all`] is dropped before it completes, the
//! guard releases the resources (or finishes the pass already under way)
//! from its destructor. Asynchronous
//! releases are driven to completion on the dropping thread there: through
//! `tokio::task::block_in_place` on a multi-threaded tokio runtime when the
//! `tokio` feature is enabled, otherwise with `futures::executor::block_on`.
//! Releases that need a single-threaded runtime's timers or I/O cannot make
//! progress on that path. Release errors on it are logged.
//!
//! ## Features
//!
//! - `tokio` - drive releases of cancelled executions on the tokio runtime

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod disposable;
pub mod error;
pub mod group;
mod guard;
pub mod using;

// Re-exports
pub use disposable::{
    on_dispose, on_dispose_async, AsyncDisposable, Disposable, OnDispose, OnDisposeAsync,
};
pub use error::{DisposeErrors, UsingError};
pub use group::{AsyncDisposeGroup, DisposeGroup};
pub use using::{
    using, using_all, using_all_full, using_all_sync, using_all_sync_full, using_full, using_sync,
    using_sync_full,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::disposable::{on_dispose, on_dispose_async, AsyncDisposable, Disposable};
    pub use crate::error::{DisposeErrors, UsingError};
    pub use crate::group::{AsyncDisposeGroup, DisposeGroup};
    pub use crate::using::{
        using, using_all, using_all_full, using_all_sync, using_all_sync_full, using_full,
        using_sync, using_sync_full,
    };
}
