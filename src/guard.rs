//! Drop guards that release on abnormal exits.
//!
//! The scoped executions release resources explicitly once the work has
//! settled. If the work never settles normally (it panics, or the future
//! running it is dropped) the guard is dropped still armed and runs the
//! release from its destructor instead. An asynchronous release pass is
//! guarded the same way while it is awaited.

use std::future::Future;
use std::marker::PhantomData;
use std::mem::ManuallyDrop;
use std::pin::Pin;
use std::task::{Context, Poll};

/// Holds a value together with the release to run if the scope is left
/// without [`disarm`](Armed::disarm) being called.
pub(crate) struct Armed<G, F>
where
    F: FnOnce(G),
{
    value: ManuallyDrop<G>,
    on_abandon: ManuallyDrop<F>,
}

impl<G, F> Armed<G, F>
where
    F: FnOnce(G),
{
    pub(crate) fn new(value: G, on_abandon: F) -> Self {
        Armed {
            value: ManuallyDrop::new(value),
            on_abandon: ManuallyDrop::new(on_abandon),
        }
    }

    pub(crate) fn get_mut(&mut self) -> &mut G {
        &mut self.value
    }

    /// Take the value back; the abandon action will not run.
    pub(crate) fn disarm(self) -> G {
        let mut this = ManuallyDrop::new(self);
        // SAFETY: `this` is never dropped, so both fields are still
        // initialized and each is taken out exactly once here.
        unsafe {
            ManuallyDrop::drop(&mut this.on_abandon);
            ManuallyDrop::take(&mut this.value)
        }
    }
}

impl<G, F> Drop for Armed<G, F>
where
    F: FnOnce(G),
{
    fn drop(&mut self) {
        // SAFETY: a disarmed guard is never dropped, and `drop` runs once,
        // so both fields are initialized and never touched again.
        let (value, on_abandon) = unsafe {
            (
                ManuallyDrop::take(&mut self.value),
                ManuallyDrop::take(&mut self.on_abandon),
            )
        };
        on_abandon(value);
    }
}

impl<G, F> std::fmt::Debug for Armed<G, F>
where
    F: FnOnce(G),
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Armed").finish_non_exhaustive()
    }
}

/// A release pass that is finished from `Drop` if the caller stops polling
/// before it completes.
///
/// Releases that already completed keep their results inside the pass, so
/// finishing it never releases a resource twice. A pass that panics while
/// being polled is not resumed.
pub(crate) struct GuardedRelease<Fut, E>
where
    Fut: Future<Output = Vec<E>>,
    E: std::fmt::Debug,
{
    pass: Option<Pin<Box<Fut>>>,
    polling: bool,
    _errors: PhantomData<fn() -> E>,
}

pub(crate) fn release_guarded<Fut, E>(release: Fut) -> GuardedRelease<Fut, E>
where
    Fut: Future<Output = Vec<E>>,
    E: std::fmt::Debug,
{
    GuardedRelease {
        pass: Some(Box::pin(release)),
        polling: false,
        _errors: PhantomData,
    }
}

impl<Fut, E> Future for GuardedRelease<Fut, E>
where
    Fut: Future<Output = Vec<E>>,
    E: std::fmt::Debug,
{
    type Output = Vec<E>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Vec<E>> {
        let this = self.get_mut();
        let Some(pass) = this.pass.as_mut() else {
            return Poll::Ready(Vec::new());
        };
        this.polling = true;
        let poll = pass.as_mut().poll(cx);
        this.polling = false;
        if poll.is_ready() {
            this.pass = None;
        }
        poll
    }
}

impl<Fut, E> Drop for GuardedRelease<Fut, E>
where
    Fut: Future<Output = Vec<E>>,
    E: std::fmt::Debug,
{
    fn drop(&mut self) {
        let Some(pass) = self.pass.take() else {
            return;
        };
        if self.polling {
            tracing::error!("Release pass panicked; remaining releases abandoned");
            return;
        }
        release_abandoned(pass);
    }
}

impl<Fut, E> std::fmt::Debug for GuardedRelease<Fut, E>
where
    Fut: Future<Output = Vec<E>>,
    E: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GuardedRelease")
            .field("pending", &self.pass.is_some())
            .finish()
    }
}

/// Log release errors from a synchronous pass cut short by a panic.
pub(crate) fn report_unwinding<E: std::fmt::Debug>(errors: Vec<E>) {
    for err in &errors {
        tracing::error!(error = ?err, "Resource cleanup failed after panic");
    }
}

/// Drive an asynchronous release to completion from a destructor.
///
/// `Drop` cannot await. Inside a multi-threaded tokio runtime (with the
/// `tokio` feature) the worker is handed over with `block_in_place` and the
/// release runs on the runtime's handle, so it may use tokio timers and I/O.
/// Everywhere else the release is polled with `futures::executor::block_on`.
pub(crate) fn release_abandoned<Fut, E>(release: Fut)
where
    Fut: Future<Output = Vec<E>>,
    E: std::fmt::Debug,
{
    let panicking = std::thread::panicking();
    let errors = block_on_release(release);
    for err in &errors {
        if panicking {
            tracing::error!(error = ?err, "Resource cleanup failed after panic");
        } else {
            tracing::warn!(error = ?err, "Resource cleanup failed after cancellation");
        }
    }
}

fn block_on_release<Fut: Future>(release: Fut) -> Fut::Output {
    #[cfg(feature = "tokio")]
    if let Ok(handle) = tokio::runtime::Handle::try_current() {
        if matches!(
            handle.runtime_flavor(),
            tokio::runtime::RuntimeFlavor::MultiThread
        ) {
            return tokio::task::block_in_place(|| handle.block_on(release));
        }
    }
    futures::executor::block_on(release)
}
