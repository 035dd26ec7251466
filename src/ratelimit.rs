use governor::{DefaultDirectRateLimiter, Quota};
use nonzero_ext::nonzero;
use std::{num::NonZeroU32, time::Duration};

// stats.nba.com throttles aggressive clients; keep well below that.
const REQ_PER_MIN: NonZeroU32 = nonzero!(30u32);
const MS_BETWEEN_REQ: Duration = Duration::from_millis(600);

pub struct RateLimiter {
    req_per_min: DefaultDirectRateLimiter,
    ms_between_req: DefaultDirectRateLimiter,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::with_limits(REQ_PER_MIN, MS_BETWEEN_REQ)
    }

    pub fn with_limits(req_per_min: NonZeroU32, ms_between_req: Duration) -> Self {
        // Limit to X total req/min on average.
        let req_per_min = DefaultDirectRateLimiter::direct(Quota::per_minute(req_per_min));

        // No two requests closer than Y ms. A zero period disables the spacing.
        let spacing = Quota::with_period(ms_between_req)
            .unwrap_or_else(|| Quota::per_second(nonzero!(1_000_000u32)));
        let ms_between_req = DefaultDirectRateLimiter::direct(spacing);

        RateLimiter {
            req_per_min,
            ms_between_req,
        }
    }

    /// Limiter that never waits in practice, for tests against local mocks.
    pub fn unthrottled() -> Self {
        Self::with_limits(nonzero!(1_000_000u32), Duration::ZERO)
    }

    pub async fn wait_until_ready(&self) {
        // Average budget first, then the spacing check, so callers that
        // clear the budget still leave the minimum gap between requests.
        self.req_per_min.until_ready().await;
        self.ms_between_req.until_ready().await;
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}
