use modular_bitfield::prelude::*;
use std::fmt;

/// A Flake id. Fields are packed from the least significant bit upwards.
#[bitfield]
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct FlakeId {
    /// 16 bits for machine ID.
    pub machine_id: B16,
    /// 8 bits for sequence number (resets every tick).
    pub sequence: B8,
    /// 39 bits for elapsed time in 10 ms ticks since a custom epoch.
    pub elapsed: B39,
    #[skip]
    reserved: B1,
}

impl FlakeId {
    /// Returns the id as an unsigned integer with the same ordering as its timestamp.
    pub fn as_u64(&self) -> u64 {
        u64::from_le_bytes(self.into_bytes())
    }
}

impl From<FlakeId> for u64 {
    fn from(id: FlakeId) -> Self {
        id.as_u64()
    }
}

impl fmt::Debug for FlakeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlakeId")
            .field("elapsed", &self.elapsed())
            .field("sequence", &self.sequence())
            .field("machine_id", &self.machine_id())
            .finish()
    }
}
