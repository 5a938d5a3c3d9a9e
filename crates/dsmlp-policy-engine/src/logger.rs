use tracing::{debug, error, info};

use crate::{constants::AUDIT_LOG_TARGET, errors::error_chain};

/// Sink for the audit trail of the validation pipeline
pub trait Logger: Send + Sync {
    fn debug(&self, message: &str);
    fn info(&self, message: &str);
    fn exception(&self, error: &(dyn std::error::Error + 'static));
}

/// Forwards the audit trail to the `tracing` subscriber installed by the
/// process. Exceptions are emitted at error level with the whole chain of
/// causes.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn debug(&self, message: &str) {
        debug!(target: AUDIT_LOG_TARGET, "{message}");
    }

    fn info(&self, message: &str) {
        info!(target: AUDIT_LOG_TARGET, "{message}");
    }

    fn exception(&self, error: &(dyn std::error::Error + 'static)) {
        error!(
            target: AUDIT_LOG_TARGET,
            error = error_chain(error).as_str(),
            "exception"
        );
    }
}
