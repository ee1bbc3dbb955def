use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Single-occupancy token for one origin.
#[derive(Debug, Default)]
pub struct RunSlot {
    busy: AtomicBool,
}

impl RunSlot {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Take the slot if it is free. The slot is released when the guard drops.
    pub fn try_acquire(self: &Arc<Self>) -> Option<SlotGuard> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| SlotGuard {
                slot: Arc::clone(self),
            })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

/// Holds a [`RunSlot`] until dropped.
#[derive(Debug)]
pub struct SlotGuard {
    slot: Arc<RunSlot>,
}

impl Drop for SlotGuard {
    fn drop(&mut self) {
        self.slot.busy.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_acquire_fails_until_release() {
        let slot = RunSlot::new();
        let guard = slot.try_acquire().expect("free slot");
        assert!(slot.is_busy());
        assert!(slot.try_acquire().is_none());
        drop(guard);
        assert!(!slot.is_busy());
        assert!(slot.try_acquire().is_some());
    }

    #[test]
    fn concurrent_acquire_has_one_winner() {
        let slot = RunSlot::new();
        let barrier = Arc::new(std::sync::Barrier::new(8));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let slot = Arc::clone(&slot);
                let barrier = Arc::clone(&barrier);
                std::thread::spawn(move || {
                    barrier.wait();
                    // leak the guard so the slot stays taken
                    slot.try_acquire().map(std::mem::forget).is_some()
                })
            })
            .collect();
        let winners = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|won| *won)
            .count();
        assert_eq!(winners, 1);
    }
}
