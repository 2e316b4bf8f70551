//! Account security: failed-login tracking and temporary IP blocks.

pub mod login_attempts;

pub use login_attempts::{InMemoryAttemptStore, LoginAttemptStore};
