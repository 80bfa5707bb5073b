use async_trait::async_trait;
use tracing::{error, info, warn};

use crate::application::ports::{
    SecurityEvent, SecurityEventError, SecurityEventLogger, SecurityEventType,
};

/// Writes every event to the tracing subscriber; the level follows the event type
pub struct TracingSecurityEventLogger;

#[async_trait]
impl SecurityEventLogger for TracingSecurityEventLogger {
    async fn log_event(&self, event: SecurityEvent) -> Result<(), SecurityEventError> {
        let payload = serde_json::to_string(&event)?;

        match event.event_type {
            SecurityEventType::InternalError => error!(
                target: "security",
                event_type = %event.event_type,
                request_id = %event.request_id,
                "SECURITY: {}",
                payload
            ),
            SecurityEventType::AuthenticationFailure
            | SecurityEventType::AuthorizationDenied
            | SecurityEventType::TenantViolation => warn!(
                target: "security",
                event_type = %event.event_type,
                request_id = %event.request_id,
                "SECURITY: {}",
                payload
            ),
            SecurityEventType::AuthenticationSuccess | SecurityEventType::AuthorizationGranted => {
                info!(
                    target: "security",
                    event_type = %event.event_type,
                    request_id = %event.request_id,
                    "SECURITY: {}",
                    payload
                )
            }
        }

        Ok(())
    }
}

/// Forwards each event to several loggers.
///
/// A failing sink is logged and skipped so the others still receive the event.
/// The call fails only when no sink accepted the event.
pub struct FanOutSecurityEventLogger {
    sinks: Vec<std::sync::Arc<dyn SecurityEventLogger>>,
}

impl FanOutSecurityEventLogger {
    pub fn new(sinks: Vec<std::sync::Arc<dyn SecurityEventLogger>>) -> Self {
        Self { sinks }
    }
}

#[async_trait]
impl SecurityEventLogger for FanOutSecurityEventLogger {
    async fn log_event(&self, event: SecurityEvent) -> Result<(), SecurityEventError> {
        let mut delivered = 0usize;
        let mut last_error = None;
        for sink in &self.sinks {
            match sink.log_event(event.clone()).await {
                Ok(()) => delivered += 1,
                Err(e) => {
                    error!("Security event sink failed: {}", e);
                    last_error = Some(e);
                }
            }
        }

        match last_error {
            Some(e) if delivered == 0 => Err(e),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::security_events::InMemorySecurityEventRecorder;
    use std::sync::Arc;
    use uuid::Uuid;

    struct BrokenSink;

    #[async_trait]
    impl SecurityEventLogger for BrokenSink {
        async fn log_event(&self, _event: SecurityEvent) -> Result<(), SecurityEventError> {
            Err(SecurityEventError::Unavailable("disk full".to_string()))
        }
    }

    fn event() -> SecurityEvent {
        SecurityEvent::new(
            SecurityEventType::AuthorizationDenied,
            Uuid::new_v4(),
            "GET",
            "/api/admin/users",
        )
    }

    #[tokio::test]
    async fn test_tracing_logger_accepts_all_types() {
        for event_type in [
            SecurityEventType::AuthenticationSuccess,
            SecurityEventType::AuthenticationFailure,
            SecurityEventType::AuthorizationGranted,
            SecurityEventType::AuthorizationDenied,
            SecurityEventType::TenantViolation,
            SecurityEventType::InternalError,
        ] {
            let event = SecurityEvent::new(event_type, Uuid::new_v4(), "GET", "/");
            assert!(TracingSecurityEventLogger.log_event(event).await.is_ok());
        }
    }

    #[tokio::test]
    async fn test_fan_out_survives_broken_sink() {
        let recorder = Arc::new(InMemorySecurityEventRecorder::new(10));
        let broken: Arc<dyn SecurityEventLogger> = Arc::new(BrokenSink);
        let recorded: Arc<dyn SecurityEventLogger> = recorder.clone();
        let logger = FanOutSecurityEventLogger::new(vec![broken, recorded]);

        assert!(logger.log_event(event()).await.is_ok());
        assert_eq!(recorder.len(), 1);
    }

    #[tokio::test]
    async fn test_single_broken_sink_reports_error() {
        let broken: Arc<dyn SecurityEventLogger> = Arc::new(BrokenSink);
        let logger = FanOutSecurityEventLogger::new(vec![broken]);
        assert!(logger.log_event(event()).await.is_err());
    }

    #[tokio::test]
    async fn test_all_sinks_broken_reports_error() {
        let first: Arc<dyn SecurityEventLogger> = Arc::new(BrokenSink);
        let second: Arc<dyn SecurityEventLogger> = Arc::new(BrokenSink);
        let logger = FanOutSecurityEventLogger::new(vec![first, second]);

        let violation = SecurityEvent::new(
            SecurityEventType::TenantViolation,
            Uuid::new_v4(),
            "GET",
            "/api/organizations/org-b/cases",
        );
        assert!(matches!(
            logger.log_event(violation).await,
            Err(SecurityEventError::Unavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_no_sinks_is_ok() {
        let logger = FanOutSecurityEventLogger::new(Vec::new());
        assert!(logger.log_event(event()).await.is_ok());
    }
}
