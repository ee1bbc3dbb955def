//! Dubforge-Common: shared error types used across the dubforge crates.
//!
//! Every fallible operation in the workspace funnels into [`Error`], whose
//! variants mirror the failure categories the pipeline executor reacts to.
//!
//! # Examples
//!
//! ```
//! use dubforge_common::{Error, Result};
//!
//! fn example() -> Result<()> {
//!     Err(Error::config("subtitle format is empty"))
//! }
//!
//! let err = example().unwrap_err();
//! assert_eq!(err.category(), "configuration");
//! ```

pub mod error;

pub use error::{Error, Result};
