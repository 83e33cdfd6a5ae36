// SPDX-FileCopyrightText: 2026 Qwenmux Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for qwenmux.
//!
//! This crate provides the error type, the provider trait used to talk to the
//! remote model API, and the request/response types shared by the router,
//! the analysis orchestrator, and the gateway.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::QwenmuxError;
pub use traits::GenerationProvider;
pub use types::{
    Credential, GenerationRequest, GenerationResponse, ModelListRequest, ModelListing,
    RemoteModel, TokenUsage,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn qwenmux_error_has_all_variants() {
        let _config = QwenmuxError::Config("test".into());
        let _provider = QwenmuxError::Provider {
            message: "test".into(),
            source: None,
        };
        let _catalog = QwenmuxError::Catalog {
            message: "test".into(),
            source: Some(Box::new(std::io::Error::other("test"))),
        };
        let _gateway = QwenmuxError::Gateway {
            message: "test".into(),
            source: None,
        };
        let _timeout = QwenmuxError::Timeout {
            duration: std::time::Duration::from_secs(30),
        };
        let _internal = QwenmuxError::Internal("test".into());
    }

    #[test]
    fn provider_error_display_carries_message() {
        let err = QwenmuxError::Provider {
            message: "InvalidApiKey: bad key".into(),
            source: None,
        };
        assert_eq!(err.to_string(), "provider error: InvalidApiKey: bad key");
    }

    #[test]
    fn provider_trait_is_object_safe() {
        fn _assert_dyn(_: &dyn GenerationProvider) {}
    }
}
