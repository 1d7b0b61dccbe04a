/// Phase state machine: frame ranges per animation phase.
pub mod phases;
