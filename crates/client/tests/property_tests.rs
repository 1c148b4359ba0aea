//! Property tests for client construction and error classification.

mod common;

use common::*;
use confsync_client::ClientError;
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Only rate limiting and gateway failures are worth another attempt.
    #[test]
    fn prop_api_errors_retry_only_on_transient_status(status in 100u16..600) {
        let err = ClientError::ApiError {
            status,
            url: "http://authority/configs".to_string(),
            message: String::new(),
        };
        prop_assert_eq!(err.is_retryable(), matches!(status, 429 | 502 | 503 | 504));
        prop_assert_eq!(err.is_auth_error(), matches!(status, 401 | 403));
    }

    /// Trailing slashes are dropped and nothing else about the URL changes.
    #[test]
    fn prop_base_url_loses_only_trailing_slashes(
        host in "[a-z]{1,12}(\\.[a-z]{2,6}){0,2}",
        path in "(/[a-z0-9]{1,8}){0,3}",
        slashes in 0usize..4,
    ) {
        let base = format!("https://{host}{path}");
        let client = shared_secret_client(&format!("{base}{}", "/".repeat(slashes)));

        prop_assert_eq!(client.base_url(), base.as_str());
    }
}
