use portal_core::{GeneratorError, TokenGenerator};
use portal_flake::{Clock, Error, Flake, FlakeSettings, SystemClock};

/// [`TokenGenerator`] backed by a [`Flake`].
///
/// `next_token` is synchronous and may block the calling thread, for at
/// most one 10 ms tick or the flake's `max_clock_rollback`.
pub struct FlakeGenerator<C: Clock = SystemClock> {
    flake: Flake<C>,
}

impl FlakeGenerator<SystemClock> {
    pub fn new(settings: FlakeSettings) -> Result<Self, Error> {
        Flake::new(settings).map(Self::from)
    }
}

impl<C: Clock> FlakeGenerator<C> {
    pub fn machine_id(&self) -> u16 {
        self.flake.machine_id()
    }
}

impl<C: Clock> From<Flake<C>> for FlakeGenerator<C> {
    fn from(flake: Flake<C>) -> Self {
        Self { flake }
    }
}

impl<C: Clock + 'static> TokenGenerator for FlakeGenerator<C> {
    fn next_token(&self) -> Result<u64, GeneratorError> {
        self.flake.next_id().map(u64::from).map_err(|e| match e {
            Error::OverTimeLimit => GeneratorError::Exhausted(e.to_string()),
            Error::EpochAhead { .. } | Error::ClockRollback { .. } => {
                GeneratorError::Clock(e.to_string())
            }
            Error::StatePoisoned => GeneratorError::State(e.to_string()),
        })
    }
}
