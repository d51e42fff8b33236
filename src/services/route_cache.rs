// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Route-keyed cache for data behind concept pages.
//!
//! Mutations call [`RouteCache::invalidate`] with the route of the page they
//! affect. Readers take a generation ticket before loading from the store
//! and only publish their result if no invalidation happened in between, so
//! a slow read cannot overwrite the cache with data older than a write.

use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

struct Slot<T> {
    generation: u64,
    value: Option<(Arc<T>, Instant)>,
}

impl<T> Default for Slot<T> {
    fn default() -> Self {
        Self {
            generation: 0,
            value: None,
        }
    }
}

/// Ticket returned by [`RouteCache::ticket`], redeemed by [`RouteCache::publish`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheTicket(u64);

/// Process-local cache keyed by route path.
pub struct RouteCache<T> {
    slots: DashMap<String, Slot<T>>,
    ttl: Duration,
}

impl<T> RouteCache<T> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            slots: DashMap::new(),
            ttl,
        }
    }

    /// Fresh cached value for a route, if any.
    pub fn get(&self, route: &str) -> Option<Arc<T>> {
        let slot = self.slots.get(route)?;
        let (value, stored_at) = slot.value.as_ref()?;
        if stored_at.elapsed() >= self.ttl {
            return None;
        }
        Some(Arc::clone(value))
    }

    /// Take a ticket before loading a route's data from the store.
    pub fn ticket(&self, route: &str) -> CacheTicket {
        CacheTicket(self.slots.entry(route.to_string()).or_default().generation)
    }

    /// Store a value loaded under `ticket`.
    ///
    /// Returns `false` (and stores nothing) if the route was invalidated
    /// since the ticket was taken.
    pub fn publish(&self, route: &str, ticket: CacheTicket, value: Arc<T>) -> bool {
        let mut slot = self.slots.entry(route.to_string()).or_default();
        if slot.generation != ticket.0 {
            return false;
        }
        slot.value = Some((value, Instant::now()));
        true
    }

    /// Mark a route's cached data as stale.
    ///
    /// Routes nobody has read have no slot and are left alone: a reader
    /// always creates the slot when it takes its ticket.
    pub fn invalidate(&self, route: &str) {
        let Some(mut slot) = self.slots.get_mut(route) else {
            return;
        };
        slot.generation = slot.generation.wrapping_add(1);
        slot.value = None;
        tracing::debug!(route, generation = slot.generation, "Route invalidated");
    }
}
