use std::collections::VecDeque;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::application::ports::{SecurityEvent, SecurityEventError, SecurityEventLogger};

pub const DEFAULT_RECORDER_CAPACITY: usize = 1000;

/// Bounded in-memory event log.
///
/// Oldest events are dropped once `capacity` is reached. Constructed
/// explicitly and shared through `Arc`; there is no global instance.
pub struct InMemorySecurityEventRecorder {
    capacity: usize,
    events: Mutex<VecDeque<SecurityEvent>>,
}

impl InMemorySecurityEventRecorder {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            events: Mutex::new(VecDeque::with_capacity(capacity.min(DEFAULT_RECORDER_CAPACITY))),
        }
    }

    pub fn record(&self, event: SecurityEvent) {
        let mut events = self.events.lock();
        if events.len() == self.capacity {
            events.pop_front();
        }
        events.push_back(event);
    }

    /// Up to `limit` most recent events, oldest first
    pub fn recent(&self, limit: usize) -> Vec<SecurityEvent> {
        let events = self.events.lock();
        let skip = events.len().saturating_sub(limit);
        events.iter().skip(skip).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drop every recorded event
    pub fn reset(&self) {
        self.events.lock().clear();
    }
}

impl Default for InMemorySecurityEventRecorder {
    fn default() -> Self {
        Self::new(DEFAULT_RECORDER_CAPACITY)
    }
}

#[async_trait]
impl SecurityEventLogger for InMemorySecurityEventRecorder {
    async fn log_event(&self, event: SecurityEvent) -> Result<(), SecurityEventError> {
        self.record(event);
        Ok(())
    }
}
