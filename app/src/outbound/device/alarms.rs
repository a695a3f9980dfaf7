//! Alarm scheduler that hands requests to the platform alarm service.
//!
//! Requests are queued on a bounded channel; the platform layer owns the
//! receiving end and registers each request with the OS.

use async_trait::async_trait;
use tokio::sync::mpsc::{self, Receiver, Sender, error::TrySendError};
use tracing::debug;

use crate::domain::AlarmRequest;
use crate::domain::ports::{AlarmScheduler, AlarmSchedulerError};

/// Requests that may wait for the platform layer before scheduling fails.
pub const ALARM_QUEUE_CAPACITY: usize = 64;

pub struct ChannelAlarmScheduler {
    sender: Sender<AlarmRequest>,
}

impl ChannelAlarmScheduler {
    /// Scheduler plus the receiver the platform layer drains.
    pub fn channel() -> (Self, Receiver<AlarmRequest>) {
        Self::with_capacity(ALARM_QUEUE_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> (Self, Receiver<AlarmRequest>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (Self { sender }, receiver)
    }
}

#[async_trait]
impl AlarmScheduler for ChannelAlarmScheduler {
    async fn schedule(&self, request: &AlarmRequest) -> Result<(), AlarmSchedulerError> {
        match self.sender.try_send(request.clone()) {
            Ok(()) => {
                debug!(fire_at = %request.iso_timestamp(), "alarm queued");
                Ok(())
            }
            Err(TrySendError::Full(_)) => {
                Err(AlarmSchedulerError::unavailable("alarm queue is full"))
            }
            Err(TrySendError::Closed(_)) => Err(AlarmSchedulerError::unavailable(
                "platform alarm service stopped",
            )),
        }
    }
}
