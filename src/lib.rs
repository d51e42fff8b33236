// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Concept Hub: articles about an AI coding assistant, with likes and
//! threaded comments.
//!
//! This crate provides the backend API: the static concept catalog, the
//! engagement layer (likes, comments, one level of replies) and account
//! flows backed by an external identity provider.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::ContentStore;
use services::{AccountService, ConceptCatalog, EngagementService, IdentityProvider, RouteCache};
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub catalog: ConceptCatalog,
    pub engagement: EngagementService,
    pub accounts: AccountService,
    pub identity: Arc<dyn IdentityProvider>,
}

impl AppState {
    /// Wire the services over one store and identity provider.
    pub fn new(
        config: Config,
        catalog: ConceptCatalog,
        store: Arc<dyn ContentStore>,
        identity: Arc<dyn IdentityProvider>,
    ) -> Self {
        let route_cache = Arc::new(RouteCache::new(config.route_cache_ttl));

        Self {
            engagement: EngagementService::new(Arc::clone(&store), route_cache),
            accounts: AccountService::new(store, Arc::clone(&identity)),
            config,
            catalog,
            identity,
        }
    }
}
