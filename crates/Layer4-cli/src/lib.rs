//! Shared pieces of the `toolrelay` and `toolrelay-server` binaries

pub mod logging;
pub mod output;
pub mod provider;
