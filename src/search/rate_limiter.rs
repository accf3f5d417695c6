// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Rate limiting for search requests

use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter as GovRateLimiter};
use std::num::NonZeroU32;

use super::types::SearchError;

const DEFAULT_REQUESTS_PER_MINUTE: NonZeroU32 = match NonZeroU32::new(60) {
    Some(v) => v,
    None => unreachable!(),
};

/// Rate limiter for outgoing search requests
pub struct SearchRateLimiter {
    limiter: GovRateLimiter<NotKeyed, InMemoryState, DefaultClock>,
    requests_per_minute: u32,
}

impl SearchRateLimiter {
    /// Create a new rate limiter; zero falls back to 60 requests per minute
    pub fn new(requests_per_minute: u32) -> Self {
        let rpm = NonZeroU32::new(requests_per_minute).unwrap_or(DEFAULT_REQUESTS_PER_MINUTE);
        let limiter = GovRateLimiter::direct(Quota::per_minute(rpm));

        Self {
            limiter,
            requests_per_minute: rpm.get(),
        }
    }

    /// Check if a request is allowed
    ///
    /// Returns Ok(()) if allowed, or SearchError::RateLimited if not.
    /// Callers never wait here: an exhausted quota surfaces as a job failure.
    pub fn check(&self) -> Result<(), SearchError> {
        self.limiter
            .check()
            .map_err(|_| SearchError::RateLimited {
                retry_after_secs: 60,
            })
    }

    /// Get the configured requests per minute
    pub fn requests_per_minute(&self) -> u32 {
        self.requests_per_minute
    }
}
