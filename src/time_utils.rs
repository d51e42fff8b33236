// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time formatting.

use chrono::{DateTime, SecondsFormat, Utc};

/// Format a UTC timestamp for storage.
///
/// Fixed microsecond precision keeps lexical order identical to
/// chronological order, which the stores rely on for `created_at` sorting.
pub fn format_utc_storage(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Current time in storage format.
pub fn now_storage() -> String {
    format_utc_storage(Utc::now())
}
