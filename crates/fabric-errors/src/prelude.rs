//! Prelude module for convenient error handling imports.
//!
//! # Example
//!
//! ```
//! use fabric_errors::prelude::*;
//! use fabric_errors::error_context;
//!
//! # fn example() -> Result<()> {
//! let result: std::result::Result<(), StoreError> = Ok(());
//! let ctx = error_context!("create_version", "version" => "1.0");
//! result.context(ctx)?;
//! # Ok(())
//! # }
//! ```

pub use crate::{
    Result,
    common::{ErrorCategory, ErrorContext, ErrorSeverity, FabricError, ResultExt},
    profile::ProfileError,
    store::StoreError,
};

/// Macro for creating an error context with key-value pairs.
#[macro_export]
macro_rules! error_context {
    ($operation:expr $(, $key:expr => $value:expr)* $(,)?) => {
        {
            let ctx = $crate::ErrorContext::new($operation);
            $(
                let ctx = ctx.with($key, $value);
            )*
            ctx
        }
    };
}
