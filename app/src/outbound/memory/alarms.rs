//! Alarm scheduler that records requests instead of touching the OS.

use std::sync::Mutex;

use async_trait::async_trait;
use tracing::info;

use super::lock;
use crate::domain::AlarmRequest;
use crate::domain::ports::{AlarmScheduler, AlarmSchedulerError};

#[derive(Debug, Default)]
pub struct RecordingAlarmScheduler {
    scheduled: Mutex<Vec<AlarmRequest>>,
}

impl RecordingAlarmScheduler {
    /// Requests received so far, oldest first.
    pub fn scheduled(&self) -> Vec<AlarmRequest> {
        lock(&self.scheduled).clone()
    }
}

#[async_trait]
impl AlarmScheduler for RecordingAlarmScheduler {
    async fn schedule(&self, request: &AlarmRequest) -> Result<(), AlarmSchedulerError> {
        info!(
            fire_at = %request.iso_timestamp(),
            active = request.active,
            "alarm recorded"
        );
        lock(&self.scheduled).push(request.clone());
        Ok(())
    }
}
