//! Shared configuration primitives.
//!
//! This crate holds the pieces every other crate needs:
//!
//! - Environment selection (production vs sandbox) with the matching URLs
//! - Logging initialization for binaries

mod environment;
mod logging;

pub use environment::{ParseEnvironmentError, UpstoxEnvironment};
pub use logging::init_logging;
