//! Keep-alive loop for the gateway session.
//!
//! Alternates between a network call (probe, login or keep-alive) and a timed
//! sleep until the process is told to stop.

mod runner;

pub use runner::KeepAliveLoop;
