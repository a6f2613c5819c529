//! Domain logic for the Escutas backend.
//!
//! Everything in this crate is free of HTTP and SQL concerns: review
//! aggregation, history/calendar query helpers, blog validation and the
//! token lifecycle manager with its storage/refresh seams.

pub mod blog;
pub mod credentials;
pub mod error;
pub mod history;
pub mod review;
pub mod types;
