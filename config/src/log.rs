//! `LogSink` that forwards to `tracing`.

use cm_core::{LogContext, LogSink};

/// Emits sink messages as `tracing` events with the context as fields.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogSink;

impl LogSink for TracingLogSink {
    fn info(&self, ctx: &LogContext, message: &str) {
        match &ctx.config_dir {
            Some(dir) => tracing::info!(
                component = ctx.component,
                config_dir = %dir.display(),
                "{}",
                message
            ),
            None => tracing::info!(component = ctx.component, "{}", message),
        }
    }

    fn error(&self, ctx: &LogContext, message: &str, cause: &dyn std::error::Error) {
        match &ctx.config_dir {
            Some(dir) => tracing::error!(
                component = ctx.component,
                config_dir = %dir.display(),
                error = %cause,
                "{}",
                message
            ),
            None => tracing::error!(component = ctx.component, error = %cause, "{}", message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    #[test]
    #[traced_test]
    fn test_info_is_forwarded() {
        let ctx = LogContext::new("recovery").with_config_dir("/opt/lucee/context");
        TracingLogSink.info(&ctx, "Config file [lucee-server.xml] was not valid");
        assert!(logs_contain("was not valid"));
        assert!(logs_contain("/opt/lucee/context"));
    }

    #[test]
    #[traced_test]
    fn test_error_includes_cause() {
        let cause = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only volume");
        TracingLogSink.error(&LogContext::new("version"), "required-extension", &cause);
        assert!(logs_contain("required-extension"));
        assert!(logs_contain("read-only volume"));
    }
}
