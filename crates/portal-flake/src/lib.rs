//! Sonyflake-style generator of 64-bit, time-ordered unique ids.
//!
//! Layout, most significant bit first: 1 reserved bit, 39 bits of 10 ms
//! ticks since a custom epoch, 8 bits of per-tick sequence, 16 bits of
//! machine id.

mod clock;
pub mod error;
mod flake;
mod flake_id;

pub use clock::{Clock, SystemClock};
pub use error::Error;
pub use flake::{Flake, FlakeSettings};
pub use flake_id::FlakeId;
