//! Device health data - optional, best-effort step counts

use anyhow::Result;
use tracing::{debug, warn};

use crate::error::FlowError;

/// Platform health API (HealthKit on iOS)
pub trait HealthSource {
    /// Ask for read access; returns whether it was granted
    fn init(&mut self) -> bool;

    /// Steps recorded today
    fn step_count(&self) -> Result<i64>;
}

/// Source for platforms without a health API
#[derive(Debug, Default)]
pub struct Unavailable;

impl HealthSource for Unavailable {
    fn init(&mut self) -> bool {
        false
    }

    fn step_count(&self) -> Result<i64> {
        Err(FlowError::PermissionDenied.into())
    }
}

/// Fixed step count, for manual entry and tests
#[derive(Debug, Default)]
pub struct ManualSteps {
    pub steps: i64,
    granted: bool,
}

impl ManualSteps {
    pub fn new(steps: i64) -> Self {
        Self { steps, granted: false }
    }
}

impl HealthSource for ManualSteps {
    fn init(&mut self) -> bool {
        self.granted = true;
        true
    }

    fn step_count(&self) -> Result<i64> {
        if !self.granted {
            return Err(FlowError::PermissionDenied.into());
        }
        Ok(self.steps)
    }
}

/// Today's steps, or `None` when the source is missing, denied or failing.
/// Never blocks anything else.
pub fn read_steps<H: HealthSource + ?Sized>(source: &mut H) -> Option<i64> {
    if !source.init() {
        debug!("Health data not granted, skipping step count");
        return None;
    }
    match source.step_count() {
        Ok(steps) => Some(steps),
        Err(e) => {
            warn!("Step count unavailable: {:#}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Flaky;

    impl HealthSource for Flaky {
        fn init(&mut self) -> bool {
            true
        }

        fn step_count(&self) -> Result<i64> {
            anyhow::bail!("sensor offline")
        }
    }

    #[test]
    fn test_unavailable_source() {
        assert_eq!(read_steps(&mut Unavailable), None);
    }

    #[test]
    fn test_manual_steps() {
        let mut source = ManualSteps::new(8421);
        assert!(source.step_count().is_err());
        assert_eq!(read_steps(&mut source), Some(8421));
    }

    #[test]
    fn test_failing_source_is_swallowed() {
        assert_eq!(read_steps(&mut Flaky), None);
    }
}
