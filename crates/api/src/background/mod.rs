//! Background tasks and scheduled jobs.
//!
//! Each submodule provides a long-running async function intended to be
//! spawned via `tokio::spawn`. All tasks accept a [`CancellationToken`]
//! for graceful shutdown.
//!
//! [`CancellationToken`]: tokio_util::sync::CancellationToken

pub mod lockout_sweep;
