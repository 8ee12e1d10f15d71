// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod directory;
pub mod oauth;
pub mod storage;
pub mod token;

pub use oauth::OAuthClient;
pub use storage::AudioStore;
pub use token::{Claims, TokenService};
