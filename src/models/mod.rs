// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod audio;
pub mod user;

pub use audio::AudioFile;
pub use user::{ExternalProfile, User};
