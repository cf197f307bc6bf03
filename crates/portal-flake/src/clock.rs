use jiff::{SignedDuration, Timestamp};
use std::time::Duration;

const MIN_SLEEP: Duration = Duration::from_millis(1);

/// Time source of a [`Flake`](crate::Flake).
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;

    /// Blocks the calling thread until `now()` reaches `target`.
    fn wait_until(&self, target: Timestamp);
}

/// Wall-clock time. Waiting puts the current thread to sleep.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }

    fn wait_until(&self, target: Timestamp) {
        let mut now = Timestamp::now();
        while now < target {
            let gap = Duration::try_from(target.duration_since(now)).unwrap_or(MIN_SLEEP);
            std::thread::sleep(gap.max(MIN_SLEEP));
            now = Timestamp::now();
        }
    }
}

/// Gap between `target` and `now`, zero if `now` is already past it.
pub(crate) fn lag(now: Timestamp, target: Timestamp) -> SignedDuration {
    target.duration_since(now).max(SignedDuration::ZERO)
}

#[cfg(test)]
pub(crate) mod manual {
    use super::{lag, Clock};
    use jiff::{SignedDuration, Timestamp};
    use std::sync::{Arc, Mutex, MutexGuard};

    #[derive(Default)]
    struct State {
        now: Timestamp,
        waited: SignedDuration,
    }

    /// A clock that only moves when told to. Waiting jumps straight to the
    /// target and adds the skipped time to `waited`.
    #[derive(Clone, Default)]
    pub(crate) struct ManualClock {
        state: Arc<Mutex<State>>,
    }

    impl ManualClock {
        pub(crate) fn at_millis(millis: i64) -> Self {
            let clock = Self::default();
            clock.set_millis(millis);
            clock
        }

        fn lock(&self) -> MutexGuard<'_, State> {
            self.state.lock().expect("manual clock lock poisoned")
        }

        pub(crate) fn set_millis(&self, millis: i64) {
            self.lock().now = Timestamp::from_millisecond(millis).unwrap();
        }

        /// Total time callers have spent in `wait_until`.
        pub(crate) fn waited(&self) -> SignedDuration {
            self.lock().waited
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> Timestamp {
            self.lock().now
        }

        fn wait_until(&self, target: Timestamp) {
            let mut state = self.lock();
            let skipped = lag(state.now, target);
            if !skipped.is_zero() {
                state.now = target;
                state.waited += skipped;
            }
        }
    }

    #[test]
    fn waiting_advances_and_accumulates() {
        let clock = ManualClock::at_millis(1_000);

        clock.wait_until(Timestamp::from_millisecond(1_250).unwrap());
        clock.wait_until(Timestamp::from_millisecond(1_100).unwrap());

        assert_eq!(clock.now().as_millisecond(), 1_250);
        assert_eq!(clock.waited(), SignedDuration::from_millis(250));
    }
}
