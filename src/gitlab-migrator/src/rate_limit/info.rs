//! Rate limit information.

use std::fmt;

/// Core request quota of the authenticated GitHub user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitInfo {
    /// Requests remaining in the current window.
    pub remaining: u32,

    /// Unix timestamp when the rate limit resets.
    pub reset: u64,

    /// Total requests allowed per window.
    pub limit: u32,
}

impl RateLimitInfo {
    /// Requests used since `earlier`, assuming both readings fall in the same window.
    ///
    /// Returns `None` when the window was reset in between.
    #[must_use]
    pub fn consumed_since(&self, earlier: &RateLimitInfo) -> Option<u32> {
        if self.reset != earlier.reset {
            return None;
        }
        earlier.remaining.checked_sub(self.remaining)
    }
}

impl fmt::Display for RateLimitInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{} remaining", self.remaining, self.limit)
    }
}
