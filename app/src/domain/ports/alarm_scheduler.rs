//! Port for the device alarm library.
//!
//! Scheduling is fire-and-forget: delivery is the operating system's job and
//! is not tracked.

use async_trait::async_trait;

use crate::domain::AlarmRequest;

use super::define_port_error;

define_port_error! {
    /// Errors raised by alarm scheduler adapters.
    pub enum AlarmSchedulerError {
        /// The device refused to register the alarm.
        Rejected { message: String } => "alarm rejected: {message}",
        /// No alarm facility is available.
        Unavailable { message: String } => "alarm scheduler unavailable: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AlarmScheduler: Send + Sync {
    async fn schedule(&self, request: &AlarmRequest) -> Result<(), AlarmSchedulerError>;
}

/// Fixture scheduler that accepts and drops every request.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureAlarmScheduler;

#[async_trait]
impl AlarmScheduler for FixtureAlarmScheduler {
    async fn schedule(&self, _request: &AlarmRequest) -> Result<(), AlarmSchedulerError> {
        Ok(())
    }
}
