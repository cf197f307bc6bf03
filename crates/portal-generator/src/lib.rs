pub mod flake;
pub mod hasher;
pub mod seq;

pub use flake::FlakeGenerator;
pub use hasher::Base62Hasher;
pub use seq::SeqGenerator;
