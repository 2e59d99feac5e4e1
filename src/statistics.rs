use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

#[derive(Default)]
struct Counts {
    accepted: AtomicU64,
    rejected: AtomicU64,
    errors: AtomicU64,
}

/// A snapshot of the registrar counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stats {
    pub accepted: u64,
    pub rejected: u64,
    pub errors: u64,
}

/// Registrar counters behind a cloneable handle.
///
/// The observer increments from the worker context; any number of
/// readers snapshot without coordination.
#[derive(Default, Clone)]
pub struct Statistics(Arc<Counts>);

impl Statistics {
    pub fn add_accepted(&self) {
        self.0.accepted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_rejected(&self) {
        self.0.rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_error(&self) {
        self.0.errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get(&self) -> Stats {
        Stats {
            accepted: self.0.accepted.load(Ordering::Relaxed),
            rejected: self.0.rejected.load(Ordering::Relaxed),
            errors: self.0.errors.load(Ordering::Relaxed),
        }
    }
}
