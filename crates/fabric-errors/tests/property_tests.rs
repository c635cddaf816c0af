//! Property-based tests for error classification and context preservation.

use fabric_errors::{
    common::{ErrorCategory, ErrorContext, FabricError, ResultExt},
    profile::ProfileError,
    store::StoreError,
};
use proptest::prelude::*;

proptest! {
    #[test]
    fn test_not_found_message_names_version_and_profile(
        version in "[0-9]\\.[0-9]",
        profile in "[a-z][a-z0-9-]{0,15}",
    ) {
        let msg = ProfileError::not_found(&version, &profile).to_string();
        let expected = format!("{version}/{profile}");
        prop_assert!(msg.contains(&expected));
    }

    #[test]
    fn test_cycle_chain_is_preserved(chain in proptest::collection::vec("[a-z]{1,6}", 1..6)) {
        let joined = chain.join(" -> ");
        let err: FabricError = ProfileError::circular_inheritance(&joined).into();
        prop_assert_eq!(err.category(), ErrorCategory::Cycle);
        prop_assert!(err.to_string().contains(&joined));
    }

    #[test]
    fn test_error_context_preserves_operation(operation in "[a-z_]{1,20}") {
        let ctx = ErrorContext::new(&operation);
        prop_assert!(ctx.to_string().contains(&operation));
    }

    #[test]
    fn test_context_never_reclassifies_profile_errors(kind in 0u8..4) {
        let err = match kind {
            0 => ProfileError::not_found("1.0", "a"),
            1 => ProfileError::circular_inheritance("a -> a"),
            2 => ProfileError::already_exists("1.0", "a"),
            _ => ProfileError::invalid_id("", "empty"),
        };
        let expected = err.category();
        let result: Result<(), ProfileError> = Err(err);
        match result.with_context("op") {
            Ok(()) => prop_assert!(false, "error must survive context"),
            Err(e) => prop_assert_eq!(e.category(), expected),
        }
    }

    #[test]
    fn test_store_errors_become_persistence(reason in "[a-z ]{1,30}") {
        let result: Result<(), StoreError> = Err(StoreError::Backend(reason.clone()));
        match result.with_context("write") {
            Ok(()) => prop_assert!(false, "error must survive context"),
            Err(e) => {
                prop_assert_eq!(e.category(), ErrorCategory::Persistence);
                prop_assert!(e.to_string().contains(&reason));
            }
        }
    }
}
