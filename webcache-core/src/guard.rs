//! Scoped update transactions.

use std::fmt;

use tracing::warn;

use crate::cache::CachedPage;
use crate::clock::Clock;
use crate::error::Result;

/// An open update transaction on a [`CachedPage`].
///
/// Created by [`CachedPage::try_update`]. The guard only acts on the
/// transaction it opened: if that transaction was closed through the raw
/// API and another one started, every guard operation returns
/// [`CacheError::NotUpdating`](crate::CacheError::NotUpdating) instead of
/// touching the newer one.
///
/// Dropping the guard without [`commit`](Self::commit) aborts.
#[must_use = "dropping the guard aborts the update"]
pub struct UpdateGuard<'a, C: Clock> {
    page: &'a CachedPage<C>,
    generation: u64,
    finished: bool,
}

impl<'a, C: Clock> UpdateGuard<'a, C> {
    pub(crate) fn new(page: &'a CachedPage<C>, generation: u64) -> Self {
        Self {
            page,
            generation,
            finished: false,
        }
    }

    /// Appends `bytes` to the staging buffer.
    pub fn append(&mut self, bytes: &[u8]) -> Result<usize> {
        self.page.stage(Some(self.generation), bytes)
    }

    /// Publishes everything appended so far.
    pub fn commit(mut self) -> Result<()> {
        self.finished = true;
        self.page.finish(Some(self.generation), true)
    }

    /// Discards everything appended so far.
    pub fn abort(mut self) -> Result<()> {
        self.finished = true;
        self.page.finish(Some(self.generation), false)
    }
}

impl<C: Clock> fmt::Write for UpdateGuard<'_, C> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.append(s.as_bytes()).map(|_| ()).map_err(|_| fmt::Error)
    }
}

impl<C: Clock> fmt::Debug for UpdateGuard<'_, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpdateGuard")
            .field("generation", &self.generation)
            .field("finished", &self.finished)
            .finish()
    }
}

impl<C: Clock> Drop for UpdateGuard<'_, C> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        if self.page.finish(Some(self.generation), false).is_ok() {
            warn!(generation = self.generation, "Update guard dropped without commit; update aborted");
        }
    }
}
