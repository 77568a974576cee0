//! One-shot end-of-track latch.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Latch that lets exactly one end-of-track notification through per track.
///
/// The decoder may report end of track several times; only the caller that
/// flips the latch acts on it. The controller clears it on every track change.
#[derive(Debug, Clone, Default)]
pub struct EndOfTrackFlag {
    signalled: Arc<AtomicBool>,
}

impl EndOfTrackFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the latch. Returns `true` only for the call that set it.
    pub fn try_set(&self) -> bool {
        self.signalled
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub fn clear(&self) {
        self.signalled.store(false, Ordering::Release);
    }

    pub fn is_set(&self) -> bool {
        self.signalled.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::thread;

    #[test]
    fn test_only_first_set_wins() {
        let flag = EndOfTrackFlag::new();
        assert!(!flag.is_set());
        assert!(flag.try_set());
        assert!(!flag.try_set());
        assert!(flag.is_set());

        flag.clear();
        assert!(flag.try_set());
    }

    #[test]
    fn test_racing_setters_produce_one_winner() {
        let flag = EndOfTrackFlag::new();
        let winners = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let flag = flag.clone();
                let winners = Arc::clone(&winners);
                thread::spawn(move || {
                    if flag.try_set() {
                        winners.fetch_add(1, Ordering::SeqCst);
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(winners.load(Ordering::SeqCst), 1);
    }
}
