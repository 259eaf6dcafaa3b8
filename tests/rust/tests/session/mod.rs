//! Session supervisor integration tests
//!
//! Drives a real supervisor against mock collaborators on a paused clock.

mod failures;
mod handoff;
mod watchdog;
