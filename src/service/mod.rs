//! Use cases. Each function is an independent sequence of steps over the
//! store; nothing is held between calls.

pub mod accounts;
pub mod notes;
pub mod tags;
