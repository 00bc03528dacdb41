/// Broad failure category, used for exit codes and for deciding how the UI
/// recovers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing or malformed form input. Shown inline, never propagated.
    Validation,
    /// The request never produced an HTTP response (connect, timeout, ...).
    Network,
    /// The backend answered with a non-2xx status.
    Http { status: u16 },
    /// The response body did not match the expected schema.
    Decode,
    /// Local store, history, or export file failure.
    Storage,
    Config,
    Terminal,
}

#[derive(Clone)]
pub struct AppError {
    kind: ErrorKind,
    message: String,
}

impl AppError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Network, message)
    }

    /// Non-2xx response; the message carries the status and the raw body.
    pub fn http(status: u16, body: &str) -> Self {
        Self::new(ErrorKind::Http { status }, format!("API error {status}: {body}"))
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Decode, message)
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Storage, message)
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Config, message)
    }

    pub fn terminal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Terminal, message)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn exit_code(&self) -> u8 {
        match self.kind {
            ErrorKind::Validation | ErrorKind::Config => 2,
            ErrorKind::Network | ErrorKind::Http { .. } | ErrorKind::Decode => 3,
            ErrorKind::Storage => 4,
            ErrorKind::Terminal => 5,
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("kind", &self.kind)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_error_carries_status_and_body() {
        let err = AppError::http(500, "{\"error\":\"boom\"}");
        assert_eq!(err.kind(), ErrorKind::Http { status: 500 });
        assert_eq!(err.to_string(), "API error 500: {\"error\":\"boom\"}");
        assert_eq!(err.exit_code(), 3);
    }
}
