//! Scoped result iterators.
//!
//! Every scan a [`StateStore`](crate::StateStore) hands out holds an
//! underlying cursor. [`ResultsIterator`] ties the cursor's release to the
//! handle itself: it is released on [`ResultsIterator::close`] or when the
//! handle is dropped, whichever happens first, so an early `?` return can
//! never leak a cursor.

use crate::error::StateResult;
use std::fmt;

type Release = Box<dyn FnOnce() + Send>;

/// A forward-only, single-pass iterator over store results.
///
/// Items are `StateResult<T>` because the store may fail mid-scan.
pub struct ResultsIterator<T> {
    inner: Box<dyn Iterator<Item = StateResult<T>> + Send>,
    release: Option<Release>,
    yielded: usize,
}

impl<T: 'static> ResultsIterator<T> {
    /// Wraps an iterator that holds no external cursor.
    pub fn new<I>(inner: I) -> Self
    where
        I: Iterator<Item = StateResult<T>> + Send + 'static,
    {
        Self {
            inner: Box::new(inner),
            release: None,
            yielded: 0,
        }
    }

    /// Wraps an iterator whose cursor is released by `release`.
    ///
    /// `release` runs exactly once.
    pub fn with_release<I, F>(inner: I, release: F) -> Self
    where
        I: Iterator<Item = StateResult<T>> + Send + 'static,
        F: FnOnce() + Send + 'static,
    {
        Self {
            inner: Box::new(inner),
            release: Some(Box::new(release)),
            yielded: 0,
        }
    }

    /// Creates an iterator over already materialized items.
    pub fn from_items(items: Vec<T>) -> Self
    where
        T: Send,
    {
        Self::new(items.into_iter().map(Ok))
    }
}

impl<T> ResultsIterator<T> {
    /// Returns the number of items yielded so far.
    pub fn yielded(&self) -> usize {
        self.yielded
    }

    /// Releases the underlying cursor.
    ///
    /// Dropping the iterator has the same effect; this method only makes the
    /// release point explicit.
    pub fn close(mut self) {
        self.release_cursor();
    }

    fn release_cursor(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl<T> Iterator for ResultsIterator<T> {
    type Item = StateResult<T>;

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.inner.next()?;
        if item.is_ok() {
            self.yielded += 1;
        }
        Some(item)
    }
}

impl<T> Drop for ResultsIterator<T> {
    fn drop(&mut self) {
        self.release_cursor();
    }
}

impl<T> fmt::Debug for ResultsIterator<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResultsIterator")
            .field("yielded", &self.yielded)
            .field("open", &self.release.is_some())
            .finish_non_exhaustive()
    }
}
