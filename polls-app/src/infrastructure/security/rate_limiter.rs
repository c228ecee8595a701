use dashmap::DashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use uuid::Uuid;

const MAX_VOTES_PER_MINUTE: u32 = 10;
const MAX_VOTES_PER_HOUR: u32 = 60;
const CLEANUP_INTERVAL_SECS: u64 = 300;

#[derive(Clone)]
struct SubmissionRecord {
    minute_count: u32,
    hour_count: u32,
    minute_start: Instant,
    hour_start: Instant,
}

impl SubmissionRecord {
    fn starting_at(now: Instant) -> Self {
        Self {
            minute_count: 0,
            hour_count: 0,
            minute_start: now,
            hour_start: now,
        }
    }
}

/// Fixed-window limiter for vote submissions, keyed by user.
#[derive(Clone)]
pub struct RateLimiter {
    submissions: Arc<DashMap<Uuid, SubmissionRecord>>,
    last_cleanup: Arc<Mutex<Instant>>,
    per_minute: u32,
    per_hour: u32,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::with_limits(MAX_VOTES_PER_MINUTE, MAX_VOTES_PER_HOUR)
    }

    pub fn with_limits(per_minute: u32, per_hour: u32) -> Self {
        Self {
            submissions: Arc::new(DashMap::new()),
            last_cleanup: Arc::new(Mutex::new(Instant::now())),
            per_minute,
            per_hour,
        }
    }

    pub fn check(&self, user_id: Uuid) -> Result<(), RateLimitError> {
        self.check_at(user_id, Instant::now())
    }

    fn check_at(&self, user_id: Uuid, now: Instant) -> Result<(), RateLimitError> {
        self.maybe_cleanup(now);

        let mut record = self
            .submissions
            .entry(user_id)
            .or_insert_with(|| SubmissionRecord::starting_at(now));

        if now.duration_since(record.minute_start) > Duration::from_secs(60) {
            record.minute_count = 0;
            record.minute_start = now;
        }

        if now.duration_since(record.hour_start) > Duration::from_secs(3600) {
            record.hour_count = 0;
            record.hour_start = now;
        }

        if record.minute_count >= self.per_minute {
            let wait_secs = 60u64.saturating_sub(now.duration_since(record.minute_start).as_secs());
            return Err(RateLimitError::PerMinute(wait_secs));
        }

        if record.hour_count >= self.per_hour {
            let wait_secs = 3600u64.saturating_sub(now.duration_since(record.hour_start).as_secs());
            return Err(RateLimitError::PerHour(wait_secs));
        }

        record.minute_count += 1;
        record.hour_count += 1;

        Ok(())
    }

    fn maybe_cleanup(&self, now: Instant) {
        let mut last_cleanup = self.last_cleanup.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if now.duration_since(*last_cleanup) > Duration::from_secs(CLEANUP_INTERVAL_SECS) {
            self.submissions
                .retain(|_, v| now.duration_since(v.hour_start) <= Duration::from_secs(3600));
            *last_cleanup = now;
        }
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RateLimitError {
    #[error("too many votes, retry in {0}s")]
    PerMinute(u64),
    #[error("hourly vote limit reached, retry in {0}s")]
    PerHour(u64),
}

impl RateLimitError {
    pub fn user_message(&self) -> String {
        match self {
            Self::PerMinute(secs) => format!("Too many votes! Please wait {secs} seconds."),
            Self::PerHour(secs) => {
                format!("You have reached the hourly vote limit. Please wait {} minutes.", secs.div_ceil(60))
            }
        }
    }
}

impl From<RateLimitError> for polls_errors::AppError {
    fn from(err: RateLimitError) -> Self {
        polls_errors::AppError::RateLimited(err.user_message())
    }
}
