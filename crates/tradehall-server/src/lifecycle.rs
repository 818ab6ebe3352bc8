use std::sync::atomic::{AtomicBool, Ordering};

/// One-shot start flag owned by the composition root.
#[derive(Debug, Default)]
pub struct StartGuard {
    started: AtomicBool,
}

impl StartGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true only for the first caller.
    pub fn start(&self) -> bool {
        self.started
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use super::*;

    #[test]
    fn only_first_start_wins() {
        let guard = StartGuard::new();
        assert!(!guard.is_started());
        assert!(guard.start());
        assert!(guard.is_started());
        assert!(!guard.start());
    }

    #[test]
    fn concurrent_starts_have_one_winner() {
        let guard = Arc::new(StartGuard::new());
        let winners: usize = (0..16)
            .map(|_| {
                let guard = guard.clone();
                thread::spawn(move || guard.start())
            })
            .collect::<Vec<_>>()
            .into_iter()
            .map(|h| h.join().unwrap() as usize)
            .sum();
        assert_eq!(winners, 1);
    }
}
