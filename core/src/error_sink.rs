//! `ErrorSink` — Ordered, deduplicating collector for mismatches
//!
//! The sink is threaded by `&mut` through every recursive match call. It never
//! holds the same [`Mismatch`] twice, and supports transactional rollback so
//! combinators and wildcard retries can abandon a branch without leaking its
//! diagnostics.
//!
//! The sink also tracks the key path currently being matched. Every record
//! pushed while inside `a` → `b` is stamped with the path `a.b`.

use crate::{Mismatch, Reason};

/// A position in the sink, returned by [`ErrorSink::checkpoint`].
///
/// Rolling back to a checkpoint discards every record pushed after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use = "a checkpoint is only useful when passed to `rollback`"]
pub struct Checkpoint {
    len: usize,
    absorbed: usize,
}

/// Append-only, deduplicating sink for [`Mismatch`] records.
///
/// # INV: first occurrence wins
///
/// Pushing a record that is already present is a no-op, so the order of the
/// list is the order in which each distinct failure was first seen.
///
/// # Example
///
/// ```
/// use congruence::{ErrorSink, Reason};
///
/// let mut errors = ErrorSink::new();
/// errors.push(Reason::Custom("first".into()));
///
/// let checkpoint = errors.checkpoint();
/// errors.push(Reason::Custom("abandoned".into()));
/// errors.rollback(checkpoint);
///
/// errors.push(Reason::Custom("first".into())); // duplicate, ignored
/// assert_eq!(errors.messages(), vec!["first"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ErrorSink {
    entries: Vec<Mismatch>,
    path: Vec<String>,
    // Pushes that matched an existing record; reset by rollback.
    absorbed: usize,
}

impl ErrorSink {
    /// Create an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a reason at the current key path.
    ///
    /// Returns `true` if the record was new, `false` if an equal record was
    /// already present.
    pub fn push(&mut self, reason: Reason) -> bool {
        let mismatch = Mismatch::new(self.path.join("."), reason);
        if self.entries.contains(&mismatch) {
            self.absorbed += 1;
            return false;
        }
        self.entries.push(mismatch);
        true
    }

    /// Record a free-form reason at the current key path.
    ///
    /// This is how custom predicates explain their own failures.
    pub fn report(&mut self, message: impl Into<String>) -> bool {
        self.push(Reason::Custom(message.into()))
    }

    /// Mark the current end of the list.
    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            len: self.entries.len(),
            absorbed: self.absorbed,
        }
    }

    /// Discard everything pushed since `checkpoint`.
    pub fn rollback(&mut self, checkpoint: Checkpoint) {
        self.entries.truncate(checkpoint.len);
        self.absorbed = checkpoint.absorbed;
    }

    /// Returns `true` if anything was pushed since `checkpoint`.
    #[must_use]
    pub fn grew_since(&self, checkpoint: Checkpoint) -> bool {
        self.entries.len() > checkpoint.len
    }

    /// Returns `true` if a reason was recorded since `checkpoint`, including
    /// one that was already present and so left the list unchanged.
    #[must_use]
    pub fn reported_since(&self, checkpoint: Checkpoint) -> bool {
        self.grew_since(checkpoint) || self.absorbed > checkpoint.absorbed
    }

    /// Number of recorded mismatches.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove every record. The key path is left untouched.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Iterate over the records in first-occurrence order.
    pub fn iter(&self) -> std::slice::Iter<'_, Mismatch> {
        self.entries.iter()
    }

    /// Render every record to a string.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.entries.iter().map(ToString::to_string).collect()
    }

    /// Returns `true` if a record renders exactly as `message`.
    #[must_use]
    pub fn contains_message(&self, message: &str) -> bool {
        self.entries.iter().any(|m| m.to_string() == message)
    }

    /// Consume the sink, returning the records.
    #[must_use]
    pub fn into_vec(self) -> Vec<Mismatch> {
        self.entries
    }

    pub(crate) fn enter(&mut self, key: &str) {
        self.path.push(key.to_owned());
    }

    pub(crate) fn leave(&mut self) {
        self.path.pop();
    }
}

impl<'a> IntoIterator for &'a ErrorSink {
    type Item = &'a Mismatch;
    type IntoIter = std::slice::Iter<'a, Mismatch>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl IntoIterator for ErrorSink {
    type Item = Mismatch;
    type IntoIter = std::vec::IntoIter<Mismatch>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
