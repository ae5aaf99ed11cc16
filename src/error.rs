//! Error type for scoped executions.

/// Release errors of one scoped execution, in group order.
///
/// Always holds at least one error, so [`UsingError::Dispose`] and
/// [`UsingError::Both`] always name a failing release.
///
/// # Example
///
/// ```
/// use disposal::DisposeErrors;
///
/// let errors = DisposeErrors::new("close failed", vec!["flush failed"]);
/// assert_eq!(errors.first(), &"close failed");
/// assert_eq!(errors.len(), 2);
///
/// assert!(DisposeErrors::<&str>::from_vec(Vec::new()).is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisposeErrors<E> {
    errors: Vec<E>,
}

impl<E> DisposeErrors<E> {
    /// Create from the first failure and any later ones.
    pub fn new(first: E, rest: Vec<E>) -> Self {
        let mut errors = Vec::with_capacity(1 + rest.len());
        errors.push(first);
        errors.extend(rest);
        DisposeErrors { errors }
    }

    /// Create from a single failure.
    pub fn single(error: E) -> Self {
        DisposeErrors {
            errors: vec![error],
        }
    }

    /// Returns `None` if `errors` is empty.
    pub fn from_vec(errors: Vec<E>) -> Option<Self> {
        if errors.is_empty() {
            None
        } else {
            Some(DisposeErrors { errors })
        }
    }

    /// The first failure in group order.
    pub fn first(&self) -> &E {
        &self.errors[0]
    }

    /// Number of failed releases. Always at least one.
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Always `false`.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// All failures as a slice.
    pub fn as_slice(&self) -> &[E] {
        &self.errors
    }

    /// Iterate over the failures in group order.
    pub fn iter(&self) -> std::slice::Iter<'_, E> {
        self.errors.iter()
    }

    /// Split into the first failure and the rest.
    pub fn split_first(self) -> (E, Vec<E>) {
        let mut rest = self.errors;
        let first = rest.remove(0);
        (first, rest)
    }

    /// Convert to a plain `Vec`.
    pub fn into_vec(self) -> Vec<E> {
        self.errors
    }

    /// Map every failure using the provided function.
    pub fn map<F, E2>(self, f: F) -> DisposeErrors<E2>
    where
        F: FnMut(E) -> E2,
    {
        DisposeErrors {
            errors: self.errors.into_iter().map(f).collect(),
        }
    }
}

impl<E> IntoIterator for DisposeErrors<E> {
    type Item = E;
    type IntoIter = std::vec::IntoIter<E>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

impl<'a, E> IntoIterator for &'a DisposeErrors<E> {
    type Item = &'a E;
    type IntoIter = std::slice::Iter<'a, E>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}

/// Complete outcome of a failed scoped execution.
///
/// Returned by the `_full` variants ([`using_full`](crate::using_full) and
/// friends). Each variant names which phase failed, so no combination is
/// lost:
///
/// - `Work` - the work failed, every release succeeded
/// - `Dispose` - the work succeeded, one or more releases failed
/// - `Both` - the work failed and one or more releases failed too
///
/// Release errors are always listed in group order. Whenever the work
/// failed, its error is the primary one; release errors are secondary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UsingError<E> {
    /// The work failed; every release succeeded.
    Work(E),
    /// The work succeeded; these releases failed.
    Dispose(DisposeErrors<E>),
    /// The work failed and releases failed as well.
    Both {
        /// The error from the work.
        work_error: E,
        /// The errors from the failing releases.
        dispose_errors: DisposeErrors<E>,
    },
}

impl<E> UsingError<E> {
    /// Returns the work error, if the work failed.
    pub fn work_error(&self) -> Option<&E> {
        match self {
            UsingError::Work(e) | UsingError::Both { work_error: e, .. } => Some(e),
            UsingError::Dispose(_) => None,
        }
    }

    /// Returns the release errors, empty if every release succeeded.
    pub fn dispose_errors(&self) -> &[E] {
        match self {
            UsingError::Work(_) => &[],
            UsingError::Dispose(errors)
            | UsingError::Both {
                dispose_errors: errors,
                ..
            } => errors.as_slice(),
        }
    }

    /// Returns true if the work failed.
    pub fn is_work(&self) -> bool {
        matches!(self, UsingError::Work(_) | UsingError::Both { .. })
    }

    /// Returns true if at least one release failed.
    pub fn is_dispose(&self) -> bool {
        matches!(self, UsingError::Dispose(_) | UsingError::Both { .. })
    }

    /// Maps every contained error using the provided function.
    pub fn map<F, E2>(self, mut f: F) -> UsingError<E2>
    where
        F: FnMut(E) -> E2,
    {
        match self {
            UsingError::Work(e) => UsingError::Work(f(e)),
            UsingError::Dispose(errors) => UsingError::Dispose(errors.map(f)),
            UsingError::Both {
                work_error,
                dispose_errors,
            } => UsingError::Both {
                work_error: f(work_error),
                dispose_errors: dispose_errors.map(f),
            },
        }
    }

    /// Splits into the primary error and the suppressed ones.
    ///
    /// The primary error is the work error when the work failed, otherwise
    /// the first release error in group order.
    pub fn into_parts(self) -> (E, Vec<E>) {
        match self {
            UsingError::Work(e) => (e, Vec::new()),
            UsingError::Both {
                work_error,
                dispose_errors,
            } => (work_error, dispose_errors.into_vec()),
            UsingError::Dispose(errors) => errors.split_first(),
        }
    }

    /// Returns the primary error, discarding the suppressed ones.
    ///
    /// Prefer [`into_parts`](Self::into_parts) when suppressed errors
    /// matter.
    pub fn into_primary(self) -> E {
        self.into_parts().0
    }
}

impl<E: std::fmt::Display> std::fmt::Display for UsingError<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UsingError::Work(e) => write!(f, "{}", e),
            UsingError::Dispose(errors) => {
                write!(f, "dispose failed")?;
                write_dispose_errors(f, errors)
            }
            UsingError::Both {
                work_error,
                dispose_errors,
            } => {
                write!(f, "{}; dispose also failed", work_error)?;
                write_dispose_errors(f, dispose_errors)
            }
        }
    }
}

fn write_dispose_errors<E: std::fmt::Display>(
    f: &mut std::fmt::Formatter<'_>,
    errors: &DisposeErrors<E>,
) -> std::fmt::Result {
    write!(f, ": {}", errors.first())?;
    if errors.len() > 1 {
        write!(f, " (and {} more)", errors.len() - 1)?;
    }
    Ok(())
}

impl<E: std::error::Error + 'static> std::error::Error for UsingError<E> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            UsingError::Work(e) | UsingError::Both { work_error: e, .. } => Some(e),
            UsingError::Dispose(errors) => Some(errors.first()),
        }
    }
}

/// Merge the work outcome with the release errors into the final outcome.
pub(crate) fn settle<T, E>(
    outcome: Result<T, E>,
    dispose_errors: Vec<E>,
) -> Result<T, UsingError<E>> {
    match (outcome, DisposeErrors::from_vec(dispose_errors)) {
        (Ok(value), None) => Ok(value),
        (Ok(_), Some(errors)) => Err(UsingError::Dispose(errors)),
        (Err(work_error), None) => Err(UsingError::Work(work_error)),
        (Err(work_error), Some(dispose_errors)) => Err(UsingError::Both {
            work_error,
            dispose_errors,
        }),
    }
}

/// Reduce a full outcome to its primary error, logging the suppressed ones.
pub(crate) fn surface<E: std::fmt::Debug>(error: UsingError<E>) -> E {
    let (primary, suppressed) = error.into_parts();
    for err in &suppressed {
        tracing::warn!(
            error = ?err,
            primary = ?primary,
            "Resource disposal failed; error suppressed"
        );
    }
    primary
}
