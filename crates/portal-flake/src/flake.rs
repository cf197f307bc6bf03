use crate::{
    clock::{self, Clock, SystemClock},
    error::Error,
    FlakeId,
};
use jiff::{SignedDuration, Timestamp};
use std::sync::Mutex;
use typed_builder::TypedBuilder;

const TICK_MILLIS: i64 = 10;
const MAX_ELAPSED_TICKS: i64 = (1_i64 << 39) - 1;
const MAX_SEQUENCE: u8 = u8::MAX;

/// Configures a Flake generator instance.
#[derive(Debug, Clone, Copy, TypedBuilder)]
pub struct FlakeSettings {
    /// A unique machine index. Two live generators must never share one.
    #[builder(default = 0)]
    pub machine_id: u16,
    /// Custom epoch used as the zero point for the 39-bit elapsed field.
    #[builder]
    pub start_epoch: Timestamp,
    /// Largest backwards clock step `next_id` waits out. A bigger step is
    /// reported as [`Error::ClockRollback`] instead of blocking the caller.
    #[builder(default = SignedDuration::from_secs(1))]
    pub max_clock_rollback: SignedDuration,
}

#[derive(Debug, Default)]
struct GeneratorState {
    last_tick: Option<i64>,
    sequence: u8,
}

/// Flake ID generator with Sonyflake-style wait-on-overflow semantics.
pub struct Flake<C: Clock> {
    start_millis: i64,
    machine_id: u16,
    max_clock_rollback: SignedDuration,
    clock: C,
    state: Mutex<GeneratorState>,
}

impl Flake<SystemClock> {
    /// Creates a generator backed by the real system clock.
    pub fn new(settings: FlakeSettings) -> Result<Self, Error> {
        Self::with_clock(settings, SystemClock)
    }
}

impl<C: Clock> Flake<C> {
    pub fn with_clock(settings: FlakeSettings, clock: C) -> Result<Self, Error> {
        let now = clock.now();
        if settings.start_epoch > now {
            return Err(Error::EpochAhead {
                epoch: settings.start_epoch,
                now,
            });
        }

        Ok(Self {
            start_millis: settings.start_epoch.as_millisecond(),
            machine_id: settings.machine_id,
            max_clock_rollback: settings.max_clock_rollback,
            clock,
            state: Mutex::new(GeneratorState::default()),
        })
    }

    /// The machine id embedded in every generated id.
    pub fn machine_id(&self) -> u16 {
        self.machine_id
    }

    fn tick_of(&self, at: Timestamp) -> i64 {
        (at.as_millisecond() - self.start_millis) / TICK_MILLIS
    }

    fn tick_start(&self, tick: i64) -> Result<Timestamp, Error> {
        Timestamp::from_millisecond(self.start_millis + tick * TICK_MILLIS)
            .map_err(|_| Error::OverTimeLimit)
    }

    /// Generates the next unique FlakeId.
    ///
    /// Blocks the calling thread for at most one tick when the per-tick
    /// sequence runs out, and for at most `max_clock_rollback` when the
    /// clock has moved backwards.
    pub fn next_id(&self) -> Result<FlakeId, Error> {
        let mut state = self.state.lock().map_err(|_| Error::StatePoisoned)?;

        let mut tick = self.tick_of(self.clock.now());

        match state.last_tick {
            None => {
                state.sequence = 0;
            }
            Some(last) => {
                if tick < last {
                    // Reusing an earlier tick could repeat a (tick, sequence) pair.
                    let resume_at = self.tick_start(last)?;
                    let behind = clock::lag(self.clock.now(), resume_at);
                    if behind > self.max_clock_rollback {
                        return Err(Error::ClockRollback { behind });
                    }
                    self.clock.wait_until(resume_at);
                    tick = self.tick_of(self.clock.now());
                }

                if tick == last {
                    if state.sequence < MAX_SEQUENCE {
                        state.sequence += 1;
                    } else {
                        self.clock.wait_until(self.tick_start(last + 1)?);
                        tick = self.tick_of(self.clock.now());
                        state.sequence = 0;
                    }
                } else {
                    state.sequence = 0;
                }
            }
        }

        if tick > MAX_ELAPSED_TICKS {
            return Err(Error::OverTimeLimit);
        }

        let id = FlakeId::new()
            .with_elapsed(tick as u64)
            .with_sequence(state.sequence)
            .with_machine_id(self.machine_id);

        state.last_tick = Some(tick);

        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::manual::ManualClock;

    fn make_generator(machine_id: u16, clock_millis: i64) -> (Flake<ManualClock>, ManualClock) {
        let settings = FlakeSettings::builder()
            .machine_id(machine_id)
            .start_epoch(Timestamp::UNIX_EPOCH)
            .build();
        let clock = ManualClock::at_millis(clock_millis);
        (Flake::with_clock(settings, clock.clone()).unwrap(), clock)
    }

    #[test]
    fn first_id_has_sequence_zero() {
        let (gen, _) = make_generator(0, 1_000);
        let id = gen.next_id().unwrap();
        assert_eq!(id.sequence(), 0);
        assert_eq!(id.elapsed(), 100);
    }

    #[test]
    fn same_tick_increments_sequence() {
        let (gen, _) = make_generator(0, 1_000);
        let ids: Vec<_> = (0..3).map(|_| gen.next_id().unwrap()).collect();

        assert_eq!(
            ids.iter().map(FlakeId::sequence).collect::<Vec<_>>(),
            [0, 1, 2]
        );
        assert!(ids.windows(2).all(|w| w[0].as_u64() < w[1].as_u64()));
    }

    #[test]
    fn sequence_overflow_waits_one_tick() {
        let (gen, clock) = make_generator(0, 1_000);
        for _ in 0..=MAX_SEQUENCE {
            gen.next_id().unwrap();
        }

        let id = gen.next_id().unwrap();

        assert_eq!(id.sequence(), 0);
        assert_eq!(id.elapsed(), 101);
        assert_eq!(clock.waited(), SignedDuration::from_millis(TICK_MILLIS));
    }

    #[test]
    fn small_clock_rollback_is_waited_out() {
        let (gen, clock) = make_generator(0, 5_000);
        let first = gen.next_id().unwrap();

        clock.set_millis(4_500);
        let second = gen.next_id().unwrap();

        assert_eq!(second.elapsed(), first.elapsed());
        assert_eq!(second.sequence(), 1);
        assert!(second.as_u64() > first.as_u64());
        assert_eq!(clock.waited(), SignedDuration::from_millis(500));
    }

    #[test]
    fn large_clock_rollback_fails_without_blocking() {
        let (gen, clock) = make_generator(0, 10_000);
        gen.next_id().unwrap();

        clock.set_millis(4_000);

        assert_eq!(
            gen.next_id(),
            Err(Error::ClockRollback {
                behind: SignedDuration::from_secs(6)
            })
        );
        assert!(clock.waited().is_zero());

        // Once the clock is back within bounds, generation resumes.
        clock.set_millis(10_000);
        assert!(gen.next_id().is_ok());
    }

    #[test]
    fn machine_id_is_embedded() {
        let (gen, _) = make_generator(0xBEEF, 1_000);
        assert_eq!(gen.next_id().unwrap().machine_id(), 0xBEEF);
        assert_eq!(gen.machine_id(), 0xBEEF);
    }

    #[test]
    fn epoch_ahead_of_clock_is_rejected() {
        let settings = FlakeSettings::builder()
            .start_epoch(Timestamp::from_second(10).unwrap())
            .build();
        assert!(matches!(
            Flake::with_clock(settings, ManualClock::at_millis(5_000)),
            Err(Error::EpochAhead { .. })
        ));
    }

    #[test]
    fn overtime_limit_returns_error() {
        let (gen, _) = make_generator(0, (MAX_ELAPSED_TICKS + 1) * TICK_MILLIS);
        assert_eq!(gen.next_id(), Err(Error::OverTimeLimit));
    }
}
