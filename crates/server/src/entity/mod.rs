//! SeaORM entities backing the relay's persisted state.

pub mod send_attempt;
