// User-facing feedback taxonomy: success, recoverable error, informational.
// The engine classifies; the surrounding UI decides how to render.

/// A toast-style message with optional auto-dismiss.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Feedback {
    Success {
        message: String,
        auto_dismiss_ms: Option<u64>,
    },
    Error {
        message: String,
    },
    Info {
        message: String,
        auto_dismiss_ms: Option<u64>,
    },
}

impl Feedback {
    pub fn success(message: impl Into<String>) -> Self {
        Feedback::Success {
            message: message.into(),
            auto_dismiss_ms: Some(3_000),
        }
    }

    /// Errors stay on screen until dismissed.
    pub fn error(message: impl Into<String>) -> Self {
        Feedback::Error {
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Feedback::Info {
            message: message.into(),
            auto_dismiss_ms: Some(5_000),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Feedback::Success { message, .. }
            | Feedback::Error { message }
            | Feedback::Info { message, .. } => message,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Feedback::Error { .. })
    }
}

/// Where feedback goes. The surrounding UI implements this.
pub trait FeedbackSink: Send + Sync {
    fn publish(&self, feedback: Feedback);
}

/// Default sink: structured log lines instead of toasts.
#[derive(Debug, Default)]
pub struct TracingFeedback;

impl FeedbackSink for TracingFeedback {
    fn publish(&self, feedback: Feedback) {
        match &feedback {
            Feedback::Success { message, .. } => tracing::info!(feedback = "success", "{message}"),
            Feedback::Error { message } => tracing::error!(feedback = "error", "{message}"),
            Feedback::Info { message, .. } => tracing::info!(feedback = "info", "{message}"),
        }
    }
}
