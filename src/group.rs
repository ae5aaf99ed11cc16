//! Resource groups: several disposables released as one.
//!
//! A group is any ordered collection the scoped executions know how to
//! release:
//!
//! | Group | Work receives | Destructure |
//! |-------|---------------|-------------|
//! | `Vec<R>` | `&mut Vec<R>` | `\|rs\|` |
//! | `[R; N]` | `&mut [R; N]` | `\|[a, b]\|` |
//! | `(A, B, C)` | `&mut (A, B, C)` | `\|(a, b, c)\|` |
//!
//! Tuples hold heterogeneous resources (up to six); every member's error must
//! convert into the group's error type `E`.
//!
//! Release errors are always returned in group order, whether the members
//! were released one after another ([`DisposeGroup`]) or all at once
//! ([`AsyncDisposeGroup`]).

use std::future::Future;

use futures::future::join_all;

use crate::disposable::{AsyncDisposable, Disposable};

/// A group released synchronously, member by member, in order.
pub trait DisposeGroup<E> {
    /// Release every member in group order.
    ///
    /// A failing member does not stop the pass. Returns the errors of the
    /// failing members, in group order.
    fn dispose_each(self) -> Vec<E>;
}

/// A group released concurrently.
pub trait AsyncDisposeGroup<E> {
    /// Start every member's release at once and wait for all of them.
    ///
    /// Returns the errors of the failing members, in group order.
    fn dispose_all(self) -> impl Future<Output = Vec<E>> + Send;
}

impl<R, E> DisposeGroup<E> for Vec<R>
where
    R: Disposable,
    R::Error: Into<E>,
{
    fn dispose_each(self) -> Vec<E> {
        self.into_iter()
            .filter_map(|member| member.dispose().err())
            .map(Into::into)
            .collect()
    }
}

impl<R, E> AsyncDisposeGroup<E> for Vec<R>
where
    R: AsyncDisposable + Send,
    R::Error: Into<E> + Send,
    E: Send,
{
    fn dispose_all(self) -> impl Future<Output = Vec<E>> + Send {
        async move {
            let results = join_all(self.into_iter().map(AsyncDisposable::dispose_async)).await;
            results
                .into_iter()
                .filter_map(Result::err)
                .map(Into::into)
                .collect()
        }
    }
}

impl<R, E, const N: usize> DisposeGroup<E> for [R; N]
where
    R: Disposable,
    R::Error: Into<E>,
{
    fn dispose_each(self) -> Vec<E> {
        self.into_iter()
            .filter_map(|member| member.dispose().err())
            .map(Into::into)
            .collect()
    }
}

impl<R, E, const N: usize> AsyncDisposeGroup<E> for [R; N]
where
    R: AsyncDisposable + Send,
    R::Error: Into<E> + Send,
    E: Send,
{
    fn dispose_all(self) -> impl Future<Output = Vec<E>> + Send {
        async move {
            let results = join_all(self.into_iter().map(AsyncDisposable::dispose_async)).await;
            results
                .into_iter()
                .filter_map(Result::err)
                .map(Into::into)
                .collect()
        }
    }
}

// Tuple groups. Members keep their own types; only the errors are unified.
macro_rules! impl_tuple_group {
    ($($member:ident),+) => {
        impl<Failure, $($member),+> DisposeGroup<Failure> for ($($member,)+)
        where
            $($member: Disposable, $member::Error: Into<Failure>,)+
        {
            #[allow(non_snake_case)]
            fn dispose_each(self) -> Vec<Failure> {
                let ($($member,)+) = self;
                let mut errors: Vec<Failure> = Vec::new();
                $(
                    if let Err(e) = $member.dispose() {
                        errors.push(e.into());
                    }
                )+
                errors
            }
        }

        impl<Failure, $($member),+> AsyncDisposeGroup<Failure> for ($($member,)+)
        where
            Failure: Send,
            $($member: AsyncDisposable + Send, $member::Error: Into<Failure> + Send,)+
        {
            #[allow(non_snake_case)]
            fn dispose_all(self) -> impl Future<Output = Vec<Failure>> + Send {
                let ($($member,)+) = self;
                async move {
                    let ($($member,)+) = futures::join!($($member.dispose_async()),+);
                    let mut errors: Vec<Failure> = Vec::new();
                    $(
                        if let Err(e) = $member {
                            errors.push(e.into());
                        }
                    )+
                    errors
                }
            }
        }
    };
}

impl_tuple_group!(A);
impl_tuple_group!(A, B);
impl_tuple_group!(A, B, C);
impl_tuple_group!(A, B, C, D);
impl_tuple_group!(A, B, C, D, E);
impl_tuple_group!(A, B, C, D, E, F);
