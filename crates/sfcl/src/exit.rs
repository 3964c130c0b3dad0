use std::process::ExitCode;

/// Outcome of a command, with an optional closing message for stderr.
#[derive(Debug)]
pub struct Exit {
    code: ExitCode,
    message: Option<String>,
}

impl Exit {
    #[must_use]
    pub fn success() -> Self {
        Self {
            code: ExitCode::SUCCESS,
            message: None,
        }
    }

    #[must_use]
    pub fn error() -> Self {
        Self {
            code: ExitCode::FAILURE,
            message: None,
        }
    }

    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn report(self) -> ExitCode {
        if let Some(message) = self.message {
            eprintln!("{message}");
        }
        self.code
    }
}
