//! The disposable capability.
//!
//! A resource opts in by implementing one of two traits:
//!
//! - [`Disposable`] - release completes immediately
//! - [`AsyncDisposable`] - release may suspend
//!
//! Every `Disposable + Send` type is also an [`AsyncDisposable`], so
//! synchronous resources work with [`using`](fn@crate::using) and
//! [`using_all`](crate::using_all) and can share a group with asynchronous
//! ones.
//!
//! For resources without a dedicated type, [`on_dispose`] and
//! [`on_dispose_async`] pair any value with a release closure.

use std::future::Future;
use std::ops::{Deref, DerefMut};

/// A resource released synchronously.
///
/// `dispose` consumes the resource, so it can run at most once.
///
/// # Example
///
/// ```rust
/// use disposal::Disposable;
///
/// struct Lease {
///     id: u32,
/// }
///
/// impl Disposable for Lease {
///     type Error = String;
///
///     fn dispose(self) -> Result<(), String> {
///         println!("returning lease {}", self.id);
///         Ok(())
///     }
/// }
/// ```
pub trait Disposable {
    /// Error produced when release fails.
    type Error;

    /// Release the resource.
    fn dispose(self) -> Result<(), Self::Error>;
}

/// A resource whose release may suspend.
///
/// Implementations may use `async fn` directly:
///
/// ```rust
/// use disposal::AsyncDisposable;
///
/// struct Session;
///
/// impl AsyncDisposable for Session {
///     type Error = std::io::Error;
///
///     async fn dispose_async(self) -> Result<(), std::io::Error> {
///         // flush, say goodbye, close
///         Ok(())
///     }
/// }
/// ```
///
/// Types that implement [`Disposable`] get this trait for free and must not
/// implement it themselves.
pub trait AsyncDisposable {
    /// Error produced when release fails.
    type Error;

    /// Release the resource.
    fn dispose_async(self) -> impl Future<Output = Result<(), Self::Error>> + Send;
}

impl<T> AsyncDisposable for T
where
    T: Disposable + Send,
{
    type Error = <T as Disposable>::Error;

    fn dispose_async(self) -> impl Future<Output = Result<(), Self::Error>> + Send {
        async move { Disposable::dispose(self) }
    }
}

// ============================================================================
// Closure adapters
// ============================================================================

/// A value paired with a synchronous release closure.
///
/// Created by [`on_dispose`]. Derefs to the wrapped value.
pub struct OnDispose<T, F> {
    value: T,
    release: F,
}

/// Pair `value` with a synchronous release closure.
///
/// # Example
///
/// ```rust
/// use disposal::{on_dispose, using_sync};
///
/// let buffer = on_dispose(Vec::<u8>::new(), |buf| {
///     println!("dropping {} bytes", buf.len());
///     Ok::<_, String>(())
/// });
///
/// let len = using_sync(buffer, |buf| {
///     buf.extend_from_slice(b"hello");
///     Ok::<_, String>(buf.len())
/// });
///
/// assert_eq!(len, Ok(5));
/// ```
pub fn on_dispose<T, F, E>(value: T, release: F) -> OnDispose<T, F>
where
    F: FnOnce(T) -> Result<(), E>,
{
    OnDispose { value, release }
}

impl<T, F> OnDispose<T, F> {
    /// Take the value back without running the release closure.
    pub fn into_inner(self) -> T {
        self.value
    }
}

impl<T, F, E> Disposable for OnDispose<T, F>
where
    F: FnOnce(T) -> Result<(), E>,
{
    type Error = E;

    fn dispose(self) -> Result<(), E> {
        (self.release)(self.value)
    }
}

impl<T, F> Deref for OnDispose<T, F> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.value
    }
}

impl<T, F> DerefMut for OnDispose<T, F> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.value
    }
}

impl<T: std::fmt::Debug, F> std::fmt::Debug for OnDispose<T, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnDispose")
            .field("value", &self.value)
            .field("release", &"<function>")
            .finish()
    }
}

/// A value paired with an asynchronous release closure.
///
/// Created by [`on_dispose_async`]. Derefs to the wrapped value.
pub struct OnDisposeAsync<T, F> {
    value: T,
    release: F,
}

/// Pair `value` with an asynchronous release closure.
///
/// # Example
///
/// ```rust
/// use disposal::{on_dispose_async, using};
///
/// # tokio_test::block_on(async {
/// let conn = on_dispose_async(String::from("db://local"), |url| async move {
///     println!("closing {}", url);
///     Ok::<_, String>(())
/// });
///
/// let result = using(conn, async |url| Ok::<_, String>(url.len())).await;
/// assert_eq!(result, Ok(10));
/// # });
/// ```
pub fn on_dispose_async<T, F, Fut, E>(value: T, release: F) -> OnDisposeAsync<T, F>
where
    F: FnOnce(T) -> Fut,
    Fut: Future<Output = Result<(), E>> + Send,
{
    OnDisposeAsync { value, release }
}

impl<T, F> OnDisposeAsync<T, F> {
    /// Take the value back without running the release closure.
    pub fn into_inner(self) -> T {
        self.value
    }
}

impl<T, F, Fut, E> AsyncDisposable for OnDisposeAsync<T, F>
where
    F: FnOnce(T) -> Fut,
    Fut: Future<Output = Result<(), E>> + Send,
{
    type Error = E;

    fn dispose_async(self) -> impl Future<Output = Result<(), E>> + Send {
        (self.release)(self.value)
    }
}

impl<T, F> Deref for OnDisposeAsync<T, F> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.value
    }
}

impl<T, F> DerefMut for OnDisposeAsync<T, F> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.value
    }
}

impl<T: std::fmt::Debug, F> std::fmt::Debug for OnDisposeAsync<T, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnDisposeAsync")
            .field("value", &self.value)
            .field("release", &"<function>")
            .finish()
    }
}
