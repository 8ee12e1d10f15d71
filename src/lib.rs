// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Audio-Depot: personal audio storage behind third-party OAuth login
//!
//! This crate provides the backend API: OAuth login, short-lived session
//! tokens, profile management and audio file uploads.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use config::Config;
use db::Database;
use services::{AudioStore, OAuthClient, TokenService};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: Database,
    pub token_service: TokenService,
    pub oauth_client: OAuthClient,
    pub audio_store: AudioStore,
}

impl AppState {
    /// Build the services from configuration around an existing database handle.
    pub fn new(config: Config, db: Database) -> Self {
        let token_service = TokenService::from_config(&config);
        let oauth_client = OAuthClient::new(&config);
        let audio_store = AudioStore::new(config.audio_dir.clone());

        Self {
            config,
            db,
            token_service,
            oauth_client,
            audio_store,
        }
    }
}
