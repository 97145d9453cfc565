//! Wall-clock budget for a carving run.

use crate::error::{CarveError, Result};
use std::time::{Duration, Instant};

/// Optional deadline checked at coarse intervals by the scanner and reconciler
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    started: Instant,
    limit: Option<Duration>,
}

impl Deadline {
    pub fn new(limit: Option<Duration>) -> Self {
        Self {
            started: Instant::now(),
            limit,
        }
    }

    pub fn unlimited() -> Self {
        Self::new(None)
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn check(&self, phase: &'static str) -> Result<()> {
        match self.limit {
            Some(limit) if self.started.elapsed() > limit => {
                Err(CarveError::DeadlineExceeded { phase, limit })
            }
            _ => Ok(()),
        }
    }
}

impl Default for Deadline {
    fn default() -> Self {
        Self::unlimited()
    }
}
