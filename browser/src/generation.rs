//! Filter generation: the optimistic epoch that serializes all async work.
//!
//! Every filter-affecting action bumps the counter and cancels the previous
//! epoch's in-flight transport calls. Any continuation that captured an
//! earlier value must re-check it before touching shared state; the
//! cancellation token only shortens the wait, the epoch check is what keeps
//! late responses from being applied.

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use tokio_util::sync::CancellationToken;

#[derive(Clone, Debug, Default)]
pub struct Generation {
    inner: Arc<GenerationInner>,
}

#[derive(Debug, Default)]
struct GenerationInner {
    current: AtomicU64,
    token: Mutex<CancellationToken>,
}

impl Generation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> u64 {
        self.inner.current.load(Ordering::SeqCst)
    }

    pub fn is_current(&self, observed: u64) -> bool {
        self.current() == observed
    }

    /// Bump the epoch, cancel everything in flight under the previous one,
    /// and install a fresh cancellation token. Returns the new epoch.
    pub fn supersede(&self) -> u64 {
        let next = self.inner.current.fetch_add(1, Ordering::SeqCst) + 1;
        let fresh = CancellationToken::new();
        let old = std::mem::replace(&mut *self.lock_token(), fresh);
        old.cancel();
        next
    }

    /// Token covering work issued under the current epoch.
    pub fn token(&self) -> CancellationToken {
        self.lock_token().clone()
    }

    fn lock_token(&self) -> MutexGuard<'_, CancellationToken> {
        match self.inner.token.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn supersede_is_monotonic_and_cancels() {
        let generation = Generation::new();
        let observed = generation.current();
        let token = generation.token();
        assert!(generation.is_current(observed));

        let next = generation.supersede();
        assert_eq!(next, observed + 1);
        assert!(!generation.is_current(observed));
        assert!(token.is_cancelled());
        assert!(!generation.token().is_cancelled());
    }

    #[test]
    fn clones_share_the_same_epoch() {
        let generation = Generation::new();
        let handle = generation.clone();
        handle.supersede();
        assert_eq!(generation.current(), 1);
    }
}
