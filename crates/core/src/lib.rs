//! Domain logic for the FuturistCards platform.
//!
//! Everything in this crate is pure (no I/O) so it can be shared by the
//! repository layer, the HTTP layer and their tests.

pub mod cards;
pub mod error;
pub mod lockout;
pub mod roles;
pub mod search;
pub mod types;
pub mod validation;
