// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod accounts;
pub mod catalog;
pub mod engagement;
pub mod identity;
pub mod route_cache;

pub use accounts::AccountService;
pub use catalog::ConceptCatalog;
pub use engagement::{EngagementService, EngagementSnapshot};
pub use identity::{GoTrueClient, IdentityProvider, IdentityUser, SignUpOutcome};
pub use route_cache::RouteCache;
