//! Structured tracing helpers shared by the audit pipeline

use std::time::Instant;

/// Measures a pipeline operation and reports its duration when dropped
pub struct Timer {
    start: Instant,
    operation: &'static str,
}

impl Timer {
    pub fn start(operation: &'static str) -> Self {
        Self {
            start: Instant::now(),
            operation,
        }
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        tracing::debug!(
            operation = self.operation,
            duration_ms = self.start.elapsed().as_millis() as u64,
            "Operation completed"
        );
    }
}

/// Report a recovered failure with its error kind
pub fn log_error(operation: &str, error: &impl std::error::Error) {
    tracing::error!(
        operation = %operation,
        error = %error,
        error_kind = std::any::type_name_of_val(error),
        "Operation failed"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_timer_logs_on_drop() {
        let timer = Timer::start("sweep");
        thread::sleep(Duration::from_millis(10));
        drop(timer);
    }

    #[test]
    fn test_log_error_accepts_io_error() {
        let err = std::io::Error::other("disk full");
        log_error("audit_write", &err);
    }
}
