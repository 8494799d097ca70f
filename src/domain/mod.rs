// Domain engines - pure state transitions, no side effects
pub mod friendship;
pub mod interactions;
