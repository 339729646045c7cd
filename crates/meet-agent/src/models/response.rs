use serde::Serialize;

/// Uniform result of a query: data when it succeeded, an error message when it did not.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response {
    success: bool,
    data: Option<String>,
    error: Option<String>,
}

impl Response {
    pub fn success<S: Into<String>>(data: S) -> Self {
        Self {
            success: true,
            data: Some(data.into()),
            error: None,
        }
    }

    pub fn failure<S: Into<String>>(error: S) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn data(&self) -> Option<&str> {
        self.data.as_deref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Plain-text rendering for a supervising agent that calls this one as a tool
    pub fn into_tool_output(self) -> String {
        match (self.success, self.data, self.error) {
            (true, Some(data), _) if !data.is_empty() => data,
            (true, _, _) => "No data returned".to_string(),
            (false, _, error) => format!("Error: {}", error.unwrap_or_default()),
        }
    }
}
