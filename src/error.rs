use thiserror::Error;

#[derive(Debug, Error)]
pub enum BlockpadError {
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Command failed ({code}): {description}")]
    Command { code: i32, description: String },
    #[error("Config error: {0}")]
    Config(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("TOML parse error: {0}")]
    TomlDe(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, BlockpadError>;

/// Structured error data for the message channel
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorInfo {
    Api { status: u16, body: String },
    Network(String),
    Command { name: String, code: i32 },
}

impl ErrorInfo {
    pub fn from_blockpad_error(e: &BlockpadError) -> Self {
        match e {
            BlockpadError::Api { status, message } => ErrorInfo::Api {
                status: *status,
                body: message.clone(),
            },
            _ => ErrorInfo::Network(e.to_string()),
        }
    }
}

/// Ready-to-render error popup data
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorPopup {
    pub title: String,
    pub message: String,
    pub hint: String,
}

impl ErrorPopup {
    pub fn from_error_info(info: &ErrorInfo) -> Self {
        match info {
            ErrorInfo::Api { status, body } => Self::from_api(*status, body),
            ErrorInfo::Network(msg) => Self {
                title: "Network Error".into(),
                message: truncate(msg, 80),
                hint: "Check that the backend is reachable".into(),
            },
            ErrorInfo::Command { name, code } => Self {
                title: "Command Failed".into(),
                message: format!("{} returned error code {}", name, code),
                hint: "Nothing was changed, try again".into(),
            },
        }
    }

    fn from_api(status: u16, body: &str) -> Self {
        let extracted_message = extract_json_message(body);

        match status {
            401 => Self {
                title: "Unauthorized".into(),
                message: "Invalid backend token".into(),
                hint: "Check your config.toml".into(),
            },
            404 => Self {
                title: "Not Found".into(),
                message: extracted_message.unwrap_or_else(|| "Unknown command".into()),
                hint: "Check backend.url in your config".into(),
            },
            500 => Self {
                title: "Server Error".into(),
                message: "The backend returned an error".into(),
                hint: "Try again later".into(),
            },
            _ => Self {
                title: format!("API Error ({})", status),
                message: extracted_message.unwrap_or_else(|| truncate(body, 200)),
                hint: "Try again later".into(),
            },
        }
    }
}

fn extract_json_message(body: &str) -> Option<String> {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message")?.as_str().map(String::from))
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max).collect();
        format!("{}...", truncated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_displays_status_and_message() {
        let err = BlockpadError::Api {
            status: 401,
            message: "Unauthorized".into(),
        };
        assert_eq!(err.to_string(), "API error (401): Unauthorized");
    }

    #[test]
    fn command_error_displays_code() {
        let err = BlockpadError::Command {
            code: 3,
            description: "block not found".into(),
        };
        assert_eq!(err.to_string(), "Command failed (3): block not found");
    }

    #[test]
    fn io_error_converts_from_std() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: BlockpadError = io_err.into();
        assert!(matches!(err, BlockpadError::Io(_)));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn json_error_converts_from_serde() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid").unwrap_err();
        let err: BlockpadError = json_err.into();
        assert!(matches!(err, BlockpadError::Json(_)));
    }

    #[test]
    fn toml_error_converts_from_toml_de() {
        let toml_err = toml::from_str::<toml::Value>("= invalid").unwrap_err();
        let err: BlockpadError = toml_err.into();
        assert!(matches!(err, BlockpadError::TomlDe(_)));
    }

    #[test]
    fn error_popup_from_401() {
        let info = ErrorInfo::Api {
            status: 401,
            body: "".into(),
        };
        let popup = ErrorPopup::from_error_info(&info);
        assert_eq!(popup.title, "Unauthorized");
        assert_eq!(popup.hint, "Check your config.toml");
    }

    #[test]
    fn error_popup_from_404_extracts_message() {
        let info = ErrorInfo::Api {
            status: 404,
            body: r#"{"message":"no such command: blockFoo"}"#.into(),
        };
        let popup = ErrorPopup::from_error_info(&info);
        assert_eq!(popup.title, "Not Found");
        assert_eq!(popup.message, "no such command: blockFoo");
    }

    #[test]
    fn error_popup_from_unknown_status_plain_text() {
        let info = ErrorInfo::Api {
            status: 502,
            body: "some plain error".into(),
        };
        let popup = ErrorPopup::from_error_info(&info);
        assert_eq!(popup.title, "API Error (502)");
        assert_eq!(popup.message, "some plain error");
    }

    #[test]
    fn error_popup_from_command_failure() {
        let info = ErrorInfo::Command {
            name: "blockMerge".into(),
            code: 2,
        };
        let popup = ErrorPopup::from_error_info(&info);
        assert_eq!(popup.title, "Command Failed");
        assert_eq!(popup.message, "blockMerge returned error code 2");
    }

    #[test]
    fn error_popup_truncates_long_message() {
        let long_msg = "a".repeat(100);
        let info = ErrorInfo::Network(long_msg);
        let popup = ErrorPopup::from_error_info(&info);
        assert!(popup.message.len() <= 83); // 80 + "..."
        assert!(popup.message.ends_with("..."));
    }

    #[test]
    fn error_info_from_non_api_error_becomes_network() {
        let err = BlockpadError::Config("bad config".into());
        let info = ErrorInfo::from_blockpad_error(&err);
        assert!(matches!(info, ErrorInfo::Network(_)));
    }
}
