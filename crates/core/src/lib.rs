//! `gatehouse-core`: shared primitives.
//!
//! This crate contains identifiers and the error model used by the
//! authorization boundary and the HTTP surface. No I/O, no framework types.

pub mod error;
pub mod id;

pub use error::DomainError;
pub use id::{RequestId, SubjectId};
