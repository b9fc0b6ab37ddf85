use rungs_core::error::{CoreError, Payload, Severity};

/// Report an error that has no caller to return to (posting from a lane,
/// background teardown) at the tracing level matching its severity.
pub fn log_core_error(err: CoreError) {
    let context = match &err.payload {
        Payload::None => String::new(),
        Payload::Context { key, value } => format!("{key}={value}"),
        Payload::Component { type_name, tag } => format!("{type_name}[{tag}]"),
    };

    match err.severity {
        Severity::Trace => tracing::trace!(domain = ?err.domain, %context, "{err}"),
        Severity::Debug => tracing::debug!(domain = ?err.domain, %context, "{err}"),
        Severity::Info => tracing::info!(domain = ?err.domain, %context, "{err}"),
        Severity::Warn => tracing::warn!(domain = ?err.domain, %context, "{err}"),
        Severity::Error | Severity::Fatal => {
            tracing::error!(domain = ?err.domain, %context, "{err}")
        }
    }
}
