// SPDX-FileCopyrightText: 2026 Qwenmux Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait definitions at the seams between qwenmux components.

pub mod provider;

pub use provider::GenerationProvider;
