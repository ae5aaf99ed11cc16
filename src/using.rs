//! Scoped executions: run work against resources, then always release them.
//!
//! | | one resource | resource group |
//! |---|---|---|
//! | may suspend | [`using`] | [`using_all`] (concurrent release) |
//! | never suspends | [`using_sync`] | [`using_all_sync`] (in-order release) |
//!
//! Every execution follows the same protocol:
//!
//! 1. The work runs with `&mut` access to the resource(s).
//! 2. Once the work has settled, every resource is released exactly once,
//!    whatever the work returned.
//! 3. The work's outcome is handed back. A work error is always the primary
//!    error; a release error only becomes the outcome when the work
//!    succeeded.
//!
//! The plain functions return `Result<T, E>` and log release errors that
//! lose to a work error (or to an earlier release error) with
//! `tracing::warn!`. The `_full` variants return [`UsingError`] with every
//! error kept.
//!
//! If the work panics, or the future of [`using`]/[`using_all`] is dropped
//! while the work or the release pass is pending, the releases still run to
//! completion from a drop guard (see the crate docs for how asynchronous
//! releases are driven there).

use std::fmt::Debug;

use crate::disposable::{AsyncDisposable, Disposable};
use crate::error::{settle, surface, UsingError};
use crate::group::{AsyncDisposeGroup, DisposeGroup};
use crate::guard::{release_abandoned, release_guarded, report_unwinding, Armed};

// ============================================================================
// Single resource
// ============================================================================

/// Run `work` against `resource`, then release it.
///
/// Release errors convert into the work's error type. If both the work and
/// the release fail, the work error is returned and the release error is
/// logged.
///
/// # Example
///
/// ```rust
/// use disposal::{on_dispose_async, using};
///
/// # tokio_test::block_on(async {
/// let conn = on_dispose_async(vec!["row"], |_| async { Ok::<_, String>(()) });
///
/// let rows = using(conn, async |conn| Ok::<_, String>(conn.len())).await;
/// assert_eq!(rows, Ok(1));
/// # });
/// ```
pub async fn using<R, F, T, E>(resource: R, work: F) -> Result<T, E>
where
    R: AsyncDisposable + Send,
    R::Error: Into<E> + Send,
    F: AsyncFnOnce(&mut R) -> Result<T, E>,
    E: Send + Debug,
{
    using_full(resource, work).await.map_err(surface)
}

/// Like [`using`], but reports every error through [`UsingError`].
///
/// # Example
///
/// ```rust
/// use disposal::{on_dispose_async, using_full, DisposeErrors, UsingError};
///
/// # tokio_test::block_on(async {
/// let conn = on_dispose_async((), |_| async { Err::<(), _>("close failed") });
///
/// let result = using_full(conn, async |_| Err::<(), _>("query failed")).await;
/// assert_eq!(
///     result,
///     Err(UsingError::Both {
///         work_error: "query failed",
///         dispose_errors: DisposeErrors::single("close failed"),
///     })
/// );
/// # });
/// ```
pub async fn using_full<R, F, T, E>(resource: R, work: F) -> Result<T, UsingError<E>>
where
    R: AsyncDisposable + Send,
    R::Error: Into<E> + Send,
    F: AsyncFnOnce(&mut R) -> Result<T, E>,
    E: Send + Debug,
{
    let mut guard = Armed::new(resource, |resource: R| {
        release_abandoned(AsyncDisposeGroup::<E>::dispose_all((resource,)))
    });
    let outcome = work(guard.get_mut()).await;
    let release = AsyncDisposeGroup::<E>::dispose_all((guard.disarm(),));
    let dispose_errors = release_guarded(release).await;
    settle(outcome, dispose_errors)
}

/// Run `work` against `resource`, then release it, without suspending.
///
/// # Example
///
/// ```rust
/// use disposal::{on_dispose, using_sync};
///
/// let file = on_dispose(String::from("report.csv"), |name| {
///     println!("closing {}", name);
///     Ok::<_, String>(())
/// });
///
/// let upper = using_sync(file, |name| Ok::<_, String>(name.to_uppercase()));
/// assert_eq!(upper, Ok("REPORT.CSV".to_string()));
/// ```
pub fn using_sync<R, F, T, E>(resource: R, work: F) -> Result<T, E>
where
    R: Disposable,
    R::Error: Into<E>,
    F: FnOnce(&mut R) -> Result<T, E>,
    E: Debug,
{
    using_sync_full(resource, work).map_err(surface)
}

/// Like [`using_sync`], but reports every error through [`UsingError`].
pub fn using_sync_full<R, F, T, E>(resource: R, work: F) -> Result<T, UsingError<E>>
where
    R: Disposable,
    R::Error: Into<E>,
    F: FnOnce(&mut R) -> Result<T, E>,
    E: Debug,
{
    let mut guard = Armed::new(resource, |resource: R| {
        report_unwinding(DisposeGroup::<E>::dispose_each((resource,)))
    });
    let outcome = work(guard.get_mut());
    let dispose_errors = DisposeGroup::<E>::dispose_each((guard.disarm(),));
    settle(outcome, dispose_errors)
}

// ============================================================================
// Resource groups
// ============================================================================

/// Run `work` against a group of resources, then release them all
/// concurrently.
///
/// Every release is started without waiting for the others, and the call
/// resumes once all of them finished, so teardown takes as long as the
/// slowest release. No order between releases is guaranteed.
///
/// If the work succeeded but several releases failed, the first failure in
/// group order is returned and the rest are logged. Use [`using_all_full`]
/// to receive all of them.
///
/// # Example
///
/// ```rust
/// use disposal::{on_dispose, on_dispose_async, using_all};
///
/// # tokio_test::block_on(async {
/// let cache = on_dispose(10, |_| Ok::<_, String>(()));
/// let db = on_dispose_async(32, |_| async { Ok::<_, String>(()) });
///
/// let total = using_all((cache, db), async |(cache, db)| {
///     Ok::<_, String>(**cache + **db)
/// })
/// .await;
/// assert_eq!(total, Ok(42));
/// # });
/// ```
pub async fn using_all<G, F, T, E>(group: G, work: F) -> Result<T, E>
where
    G: AsyncDisposeGroup<E>,
    F: AsyncFnOnce(&mut G) -> Result<T, E>,
    E: Debug,
{
    using_all_full(group, work).await.map_err(surface)
}

/// Like [`using_all`], but reports every error through [`UsingError`].
///
/// Release errors are aggregated in group order.
pub async fn using_all_full<G, F, T, E>(group: G, work: F) -> Result<T, UsingError<E>>
where
    G: AsyncDisposeGroup<E>,
    F: AsyncFnOnce(&mut G) -> Result<T, E>,
    E: Debug,
{
    let mut guard = Armed::new(group, |group: G| {
        release_abandoned(AsyncDisposeGroup::<E>::dispose_all(group))
    });
    let outcome = work(guard.get_mut()).await;
    let dispose_errors = release_guarded(AsyncDisposeGroup::<E>::dispose_all(guard.disarm())).await;
    if !dispose_errors.is_empty() {
        tracing::debug!(failed = dispose_errors.len(), "Resource group released with failures");
    }
    settle(outcome, dispose_errors)
}

/// Run `work` against a group of resources, then release them one by one in
/// group order, without suspending.
///
/// A failing release does not stop the pass: every later resource is still
/// released.
///
/// # Example
///
/// ```rust
/// use disposal::{on_dispose, using_all_sync};
///
/// let unlock = |_: &str| Ok::<_, String>(());
/// let locks = vec![on_dispose("a", unlock), on_dispose("b", unlock)];
///
/// let names = using_all_sync(locks, |locks| {
///     Ok::<_, String>(locks.iter().map(|l| **l).collect::<Vec<_>>().join(","))
/// });
/// assert_eq!(names, Ok("a,b".to_string()));
/// ```
pub fn using_all_sync<G, F, T, E>(group: G, work: F) -> Result<T, E>
where
    G: DisposeGroup<E>,
    F: FnOnce(&mut G) -> Result<T, E>,
    E: Debug,
{
    using_all_sync_full(group, work).map_err(surface)
}

/// Like [`using_all_sync`], but reports every error through [`UsingError`].
///
/// Release errors are aggregated in group order.
pub fn using_all_sync_full<G, F, T, E>(group: G, work: F) -> Result<T, UsingError<E>>
where
    G: DisposeGroup<E>,
    F: FnOnce(&mut G) -> Result<T, E>,
    E: Debug,
{
    let mut guard = Armed::new(group, |group: G| {
        report_unwinding(DisposeGroup::<E>::dispose_each(group))
    });
    let outcome = work(guard.get_mut());
    let dispose_errors = DisposeGroup::<E>::dispose_each(guard.disarm());
    if !dispose_errors.is_empty() {
        tracing::debug!(failed = dispose_errors.len(), "Resource group released with failures");
    }
    settle(outcome, dispose_errors)
}
