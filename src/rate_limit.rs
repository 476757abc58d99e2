//! In-memory rate limiting for assistant requests.
//!
//! DESIGN
//! ======
//! Sliding-window counters keyed by user id. Three limits are enforced
//! before a generative-text call goes out:
//! - Per-user: `RATE_LIMIT_PER_USER` requests per window (default 10/min)
//! - Global: `RATE_LIMIT_GLOBAL` requests per window (default 30/min)
//! - Token budget: `RATE_LIMIT_TOKEN_BUDGET` tokens per user per hour
//!
//! A rejected request never reaches the provider; the assistant turns the
//! rejection into its fallback answer.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use crate::config::env_parse;
use crate::error::ErrorCode;

const DEFAULT_PER_USER_LIMIT: usize = 10;
const DEFAULT_GLOBAL_LIMIT: usize = 30;
const DEFAULT_WINDOW_SECS: u64 = 60;
const DEFAULT_TOKEN_BUDGET: u64 = 50_000;
const TOKEN_WINDOW: Duration = Duration::from_secs(3600);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub per_user_limit: usize,
    pub global_limit: usize,
    pub window: Duration,
    pub token_budget: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            per_user_limit: DEFAULT_PER_USER_LIMIT,
            global_limit: DEFAULT_GLOBAL_LIMIT,
            window: Duration::from_secs(DEFAULT_WINDOW_SECS),
            token_budget: DEFAULT_TOKEN_BUDGET,
        }
    }
}

impl RateLimitConfig {
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            per_user_limit: env_parse("RATE_LIMIT_PER_USER", DEFAULT_PER_USER_LIMIT),
            global_limit: env_parse("RATE_LIMIT_GLOBAL", DEFAULT_GLOBAL_LIMIT),
            window: Duration::from_secs(env_parse("RATE_LIMIT_WINDOW_SECS", DEFAULT_WINDOW_SECS)),
            token_budget: env_parse("RATE_LIMIT_TOKEN_BUDGET", DEFAULT_TOKEN_BUDGET),
        }
    }
}

// =============================================================================
// ERROR TYPE
// =============================================================================

#[derive(Debug, thiserror::Error)]
#[allow(clippy::enum_variant_names)]
pub enum RateLimitError {
    #[error("per-user rate limit exceeded (max {limit} requests/{window_secs}s)")]
    PerUserExceeded { limit: usize, window_secs: u64 },
    #[error("global rate limit exceeded (max {limit} requests/{window_secs}s)")]
    GlobalExceeded { limit: usize, window_secs: u64 },
    #[error("token budget exceeded (max {budget} tokens/hour)")]
    TokenBudgetExceeded { budget: u64 },
}

impl ErrorCode for RateLimitError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::PerUserExceeded { .. } => "E_RATE_LIMIT_USER",
            Self::GlobalExceeded { .. } => "E_RATE_LIMIT_GLOBAL",
            Self::TokenBudgetExceeded { .. } => "E_TOKEN_BUDGET",
        }
    }

    fn retryable(&self) -> bool {
        true
    }
}

// =============================================================================
// RATE LIMITER
// =============================================================================

#[derive(Clone)]
pub struct RateLimiter {
    inner: Arc<Mutex<Windows>>,
    config: RateLimitConfig,
}

#[derive(Default)]
struct Windows {
    per_user: HashMap<String, VecDeque<Instant>>,
    global: VecDeque<Instant>,
    tokens: HashMap<String, VecDeque<(Instant, u64)>>,
}

impl RateLimiter {
    #[must_use]
    pub fn new(config: RateLimitConfig) -> Self {
        Self { inner: Arc::new(Mutex::new(Windows::default())), config }
    }

    #[must_use]
    pub fn config(&self) -> RateLimitConfig {
        self.config
    }

    /// Check every limit for `user_id` and record the request if all pass.
    ///
    /// # Errors
    ///
    /// Returns the first limit that would be exceeded; nothing is recorded.
    pub fn check_and_record(&self, user_id: &str) -> Result<(), RateLimitError> {
        self.check_and_record_at(user_id, Instant::now())
    }

    fn check_and_record_at(&self, user_id: &str, now: Instant) -> Result<(), RateLimitError> {
        let mut guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let inner = &mut *guard;
        let cfg = self.config;
        let window_secs = cfg.window.as_secs();

        prune(&mut inner.global, now, cfg.window, |t| *t);
        if inner.global.len() >= cfg.global_limit {
            return Err(RateLimitError::GlobalExceeded { limit: cfg.global_limit, window_secs });
        }

        // Users with nothing left in a window are dropped from the maps.
        inner.per_user.retain(|_, requests| {
            prune(requests, now, cfg.window, |t| *t);
            !requests.is_empty()
        });
        inner.tokens.retain(|_, spent| {
            prune(spent, now, TOKEN_WINDOW, |(t, _)| *t);
            !spent.is_empty()
        });

        let used: u64 = inner.tokens.get(user_id).map_or(0, |spent| spent.iter().map(|(_, n)| n).sum());
        if used >= cfg.token_budget {
            return Err(RateLimitError::TokenBudgetExceeded { budget: cfg.token_budget });
        }

        let in_window = inner.per_user.get(user_id).map_or(0, VecDeque::len);
        if in_window >= cfg.per_user_limit {
            return Err(RateLimitError::PerUserExceeded { limit: cfg.per_user_limit, window_secs });
        }

        inner.per_user.entry(user_id.to_owned()).or_default().push_back(now);
        inner.global.push_back(now);
        Ok(())
    }

    /// Charge `tokens` against the user's hourly budget.
    pub fn record_tokens(&self, user_id: &str, tokens: u64) {
        self.record_tokens_at(user_id, tokens, Instant::now());
    }

    fn record_tokens_at(&self, user_id: &str, tokens: u64, now: Instant) {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let spent = inner.tokens.entry(user_id.to_owned()).or_default();
        prune(spent, now, TOKEN_WINDOW, |(t, _)| *t);
        spent.push_back((now, tokens));
    }
}

#[cfg(test)]
impl RateLimiter {
    /// Users currently holding request and token entries.
    fn tracked_users(&self) -> (usize, usize) {
        let inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        (inner.per_user.len(), inner.tokens.len())
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(RateLimitConfig::default())
    }
}

fn prune<T>(deque: &mut VecDeque<T>, now: Instant, window: Duration, at: impl Fn(&T) -> Instant) {
    while deque.front().is_some_and(|front| now.duration_since(at(front)) > window) {
        deque.pop_front();
    }
}

#[cfg(test)]
#[path = "rate_limit_test.rs"]
mod tests;
