// SPDX-FileCopyrightText: 2026 Qwenmux Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for qwenmux.
//!
//! Provides a scripted [`MockProvider`] so selector, orchestrator, and
//! gateway tests run without network access.

pub mod mock_provider;

pub use mock_provider::MockProvider;
