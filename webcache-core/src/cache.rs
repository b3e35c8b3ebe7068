//! Single-slot TTL cache for expensively generated content.

use std::time::Duration;

use bytes::{Bytes, BytesMut};
use chrono::{DateTime, TimeDelta, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::clock::{to_delta, Clock, SystemClock};
use crate::config::CacheConfig;
use crate::error::{CacheError, Result};
use crate::guard::UpdateGuard;
use crate::http_date::fmt_http_date;

/// Everything guarded by the page lock.
#[derive(Debug)]
struct PageState {
    /// Last published artifact
    content: Bytes,
    /// Bytes written during the open transaction
    staging: BytesMut,
    /// `None` until the first publish, or after an invalidation that
    /// cannot be represented as `now - max_age`
    last_published: Option<DateTime<Utc>>,
    updating: bool,
    /// Bumped on every successful `begin`; lets guards detect that their
    /// transaction was closed under them
    generation: u64,
    requests: u64,
    updates: u64,
}

impl PageState {
    fn new() -> Self {
        Self {
            content: Bytes::new(),
            staging: BytesMut::new(),
            last_published: None,
            updating: false,
            generation: 0,
            requests: 0,
            updates: 0,
        }
    }

    fn is_fresh(&self, now: DateTime<Utc>, max_age: TimeDelta) -> bool {
        self.last_published
            .is_some_and(|published| now.signed_duration_since(published) < max_age)
    }

    fn owns(&self, generation: Option<u64>) -> bool {
        self.updating && generation.map_or(true, |g| g == self.generation)
    }
}

/// Observable state of a [`CachedPage`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageStatus {
    /// Published content is within its max age.
    IdleValid,
    /// Content is older than its max age (or was never published).
    IdleExpired,
    /// An update transaction is open.
    Updating,
}

/// Request and update counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statistics {
    /// `read()` calls since the last reset
    pub requests: u64,
    /// Completed updates since the last reset
    pub updates: u64,
}

/// A cached artifact with a fixed max age and a single update slot.
///
/// Readers always get the last fully published content. At most one
/// caller at a time can hold the update transaction; while it is open the
/// page reports itself valid so concurrent callers keep serving the old
/// content instead of regenerating it themselves.
///
/// # Usage
///
/// ```rust
/// use std::time::Duration;
/// use webcache_core::CachedPage;
///
/// let page = CachedPage::new(Duration::from_secs(10));
/// if !page.is_valid() && page.begin_update().is_ok() {
///     page.append_to_staging(b"<h1>hello</h1>").unwrap();
///     page.complete_update().unwrap();
/// }
/// assert_eq!(&page.read()[..], b"<h1>hello</h1>");
/// ```
///
/// # Thread Safety
///
/// All operations take `&self` and hold the internal lock only for short
/// in-memory updates. Generation work happens outside the lock, between
/// `begin_update` and `complete_update`.
#[derive(Debug)]
pub struct CachedPage<C = SystemClock> {
    state: RwLock<PageState>,
    max_age: Duration,
    max_age_delta: TimeDelta,
    clock: C,
}

impl CachedPage<SystemClock> {
    /// Creates an empty, expired page whose content lives for `max_age`.
    pub fn new(max_age: Duration) -> Self {
        Self::with_clock(max_age, SystemClock)
    }

    /// Creates a page from a [`CacheConfig`].
    pub fn with_config(config: &CacheConfig) -> Self {
        Self::new(config.max_age())
    }
}

impl Default for CachedPage<SystemClock> {
    fn default() -> Self {
        Self::with_config(&CacheConfig::default())
    }
}

impl<C: Clock> CachedPage<C> {
    /// Creates a page that reads time from `clock`.
    pub fn with_clock(max_age: Duration, clock: C) -> Self {
        Self {
            state: RwLock::new(PageState::new()),
            max_age,
            max_age_delta: to_delta(max_age),
            clock,
        }
    }

    /// Returns the configured max age.
    pub fn max_age(&self) -> Duration {
        self.max_age
    }

    /// Reports whether the content can be served without regenerating it.
    ///
    /// True while the content is younger than the max age, and always true
    /// while an update is in progress.
    pub fn is_valid(&self) -> bool {
        let now = self.clock.now();
        let state = self.state.read();
        state.updating || state.is_fresh(now, self.max_age_delta)
    }

    /// Returns the current state of the page.
    pub fn status(&self) -> PageStatus {
        let now = self.clock.now();
        let state = self.state.read();
        if state.updating {
            PageStatus::Updating
        } else if state.is_fresh(now, self.max_age_delta) {
            PageStatus::IdleValid
        } else {
            PageStatus::IdleExpired
        }
    }

    /// Expires the content immediately. Always returns `true`.
    ///
    /// An update that is already running is not affected and will publish
    /// fresh content when it completes.
    pub fn invalidate(&self) -> bool {
        let now = self.clock.now();
        let expired_at = now.checked_sub_signed(self.max_age_delta);
        self.state.write().last_published = expired_at;
        debug!("Cache invalidated");
        true
    }

    /// Opens an update transaction and clears the staging buffer.
    ///
    /// Fails with [`CacheError::AlreadyUpdating`] without changing anything
    /// if another transaction is open.
    pub fn begin_update(&self) -> Result<()> {
        self.open().map(|_| ())
    }

    /// Appends `bytes` to the staging buffer and returns how many were taken.
    ///
    /// Either all bytes are staged or, outside a transaction, none are and
    /// [`CacheError::NotUpdating`] is returned.
    pub fn append_to_staging(&self, bytes: &[u8]) -> Result<usize> {
        self.stage(None, bytes)
    }

    /// Publishes the staging buffer as the new content.
    ///
    /// Without an open transaction this changes nothing and returns
    /// [`CacheError::NotUpdating`].
    pub fn complete_update(&self) -> Result<()> {
        self.finish(None, true)
    }

    /// Closes the open transaction and discards what was staged.
    ///
    /// Content, publish time and counters are left as they were.
    pub fn abort_update(&self) -> Result<()> {
        self.finish(None, false)
    }

    /// Opens an update transaction tied to the returned guard.
    ///
    /// Dropping the guard without calling [`UpdateGuard::commit`] aborts the
    /// transaction, so an early return or panic in the generation step
    /// cannot leave the page stuck in [`PageStatus::Updating`].
    pub fn try_update(&self) -> Result<UpdateGuard<'_, C>> {
        let generation = self.open()?;
        Ok(UpdateGuard::new(self, generation))
    }

    /// Returns the content, regenerating it first if it has expired and no
    /// one else is already doing so.
    pub fn fetch_with<F>(&self, generate: F) -> Bytes
    where
        F: FnOnce() -> Vec<u8>,
    {
        if !self.is_valid() {
            if let Ok(mut update) = self.try_update() {
                let body = generate();
                let published = update.append(&body).and_then(|_| update.commit());
                if let Err(err) = published {
                    warn!(error = %err, "Regenerated content was not published");
                }
            }
        }
        self.read()
    }

    /// Returns a snapshot of the last published content.
    ///
    /// Never waits for an in-progress update; the snapshot may be stale
    /// while one runs.
    pub fn read(&self) -> Bytes {
        let content = self.state.read().content.clone();
        self.state.write().requests += 1;
        content
    }

    /// Like [`read`](Self::read), but also returns the publish time of that
    /// same content, taken under one lock so the two always agree.
    pub fn read_with_timestamp(&self) -> (Bytes, DateTime<Utc>) {
        let mut state = self.state.write();
        state.requests += 1;
        let published = state
            .last_published
            .unwrap_or(DateTime::<Utc>::UNIX_EPOCH);
        (state.content.clone(), published)
    }

    /// Returns when the content was last published (epoch if never).
    pub fn last_published(&self) -> DateTime<Utc> {
        self.state
            .read()
            .last_published
            .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
    }

    /// Returns the last publish time as an HTTP-date for `Last-Modified`.
    pub fn last_modified(&self) -> String {
        fmt_http_date(self.last_published())
    }

    /// Returns the request and update counters.
    pub fn statistics(&self) -> Statistics {
        let state = self.state.read();
        Statistics {
            requests: state.requests,
            updates: state.updates,
        }
    }

    /// Zeroes the counters and returns their values from before the reset.
    pub fn reset_statistics(&self) -> Statistics {
        let mut state = self.state.write();
        Statistics {
            requests: std::mem::take(&mut state.requests),
            updates: std::mem::take(&mut state.updates),
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // TRANSACTION PRIMITIVES
    // ═══════════════════════════════════════════════════════════════════════

    fn open(&self) -> Result<u64> {
        let generation = {
            let mut state = self.state.write();
            if state.updating {
                return Err(CacheError::AlreadyUpdating);
            }
            state.updating = true;
            state.generation = state.generation.wrapping_add(1);
            state.staging.clear();
            state.generation
        };
        debug!(generation, "Update started");
        Ok(generation)
    }

    /// `generation` of `None` accepts whichever transaction is open.
    pub(crate) fn stage(&self, generation: Option<u64>, bytes: &[u8]) -> Result<usize> {
        let mut state = self.state.write();
        if !state.owns(generation) {
            drop(state);
            warn!(len = bytes.len(), "Write to staging buffer without an open update");
            return Err(CacheError::NotUpdating);
        }
        state.staging.extend_from_slice(bytes);
        Ok(bytes.len())
    }

    pub(crate) fn finish(&self, generation: Option<u64>, publish: bool) -> Result<()> {
        let now = self.clock.now();
        let mut state = self.state.write();
        if !state.owns(generation) {
            drop(state);
            warn!(publish, "Update finished without an open transaction");
            return Err(CacheError::NotUpdating);
        }
        state.updating = false;
        if publish {
            state.content = state.staging.split().freeze();
            state.last_published = Some(now);
            state.updates += 1;
            let len = state.content.len();
            drop(state);
            debug!(bytes = len, "Update published");
        } else {
            state.staging = BytesMut::new();
            drop(state);
            debug!("Update aborted");
        }
        Ok(())
    }
}
