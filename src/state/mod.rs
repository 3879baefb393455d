/// Single configurations and their tallies.
pub mod configuration;
/// Pairs of configurations run under common randomness.
pub mod coupled;

pub use configuration::*;
pub use coupled::*;
