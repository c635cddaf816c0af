//! Centralized error types for the profile fabric
//!
//! Every crate in the workspace reports failures through the types defined
//! here, so callers can classify an error without knowing which layer raised
//! it.
//!
//! # Architecture
//!
//! - [`common`]: the top-level [`FabricError`], its [`ErrorCategory`] and
//!   [`ErrorSeverity`], and the [`ErrorContext`] / [`ResultExt`] helpers
//! - [`profile`]: version and profile lookup, inheritance and lifecycle errors
//! - [`store`]: failures reported by a profile registry backend
//!
//! # Example
//!
//! ```
//! use fabric_errors::prelude::*;
//!
//! fn lookup(id: &str) -> Result<()> {
//!     if id.is_empty() {
//!         return Err(ProfileError::invalid_id(id, "profile id must not be empty").into());
//!     }
//!     Ok(())
//! }
//!
//! let err = lookup("").unwrap_err();
//! assert_eq!(err.category(), ErrorCategory::Invalid);
//! ```

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used)]
#![warn(missing_docs, rust_2018_idioms)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod common;
pub mod prelude;
pub mod profile;
pub mod store;

pub use common::{ErrorCategory, ErrorContext, ErrorSeverity, FabricError, ResultExt};
pub use profile::ProfileError;
pub use store::StoreError;

/// A specialized `Result` type for fabric operations.
pub type Result<T> = std::result::Result<T, FabricError>;
