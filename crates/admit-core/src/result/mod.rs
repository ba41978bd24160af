pub mod model;
pub mod wire;

pub use model::{PolicyResult, Verdict};
pub use wire::{ResultWire, WireError};
