pub mod config;
pub mod plan;
pub mod recipes;

use serde::Serialize;

pub const EXIT_CONFIG: u8 = 2;
pub const EXIT_INVALID_REQUEST: u8 = 2;
pub const EXIT_INFEASIBLE: u8 = 3;
pub const EXIT_CATALOG: u8 = 4;

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    error_class: Option<String>,
    message: String,
}

impl CommandResult {
    /// Successful command whose JSON body is `payload`.
    pub fn success_with<T: Serialize>(payload: &T) -> Self {
        Self { exit_code: 0, output: serialize_payload(payload) }
    }

    /// Successful command with human-readable output.
    pub fn text(output: impl Into<String>) -> Self {
        Self { exit_code: 0, output: output.into() }
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: message.into(),
        };
        Self { exit_code, output: serialize_payload(&payload) }
    }
}

fn serialize_payload<T: Serialize>(payload: &T) -> String {
    serde_json::to_string(payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}
