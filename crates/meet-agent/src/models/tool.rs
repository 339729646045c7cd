use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter};

/// A named grouping of broker tools for one external service
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter,
)]
#[serde(rename_all = "lowercase")]
pub enum Toolkit {
    #[strum(to_string = "Google Meet")]
    GoogleMeet,
    #[strum(to_string = "Google Drive")]
    GoogleDrive,
}

impl Toolkit {
    /// The identifier the broker uses for this toolkit
    pub fn slug(&self) -> &'static str {
        match self {
            Toolkit::GoogleMeet => "googlemeet",
            Toolkit::GoogleDrive => "googledrive",
        }
    }

    /// Broker tool names are prefixed with the upper-cased toolkit slug
    pub fn for_tool(tool_name: &str) -> Option<Toolkit> {
        Toolkit::iter().find(|toolkit| {
            tool_name
                .strip_prefix(toolkit.slug().to_uppercase().as_str())
                .is_some_and(|rest| rest.starts_with('_'))
        })
    }
}

/// A tool the model may ask the broker to run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Tool {
    /// The name of the tool
    pub name: String,
    /// A description of what the tool does
    pub description: String,
    /// A json schema of the accepted arguments
    pub input_schema: Value,
    /// The toolkit the broker listed it under
    pub toolkit: Toolkit,
}

impl Tool {
    pub fn new<N, D>(name: N, description: D, input_schema: Value, toolkit: Toolkit) -> Self
    where
        N: Into<String>,
        D: Into<String>,
    {
        Tool {
            name: name.into(),
            description: description.into(),
            input_schema,
            toolkit,
        }
    }
}

/// A tool invocation requested by the model
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolCall {
    /// Identifier chosen by the model, echoed back with the result
    pub id: String,
    pub name: String,
    pub arguments: Value,
}

impl ToolCall {
    pub fn new<I: Into<String>, S: Into<String>>(id: I, name: S, arguments: Value) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments,
        }
    }
}

/// Name and shortened description, for listing tools to a person
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ToolSummary {
    pub name: String,
    pub description: String,
}

const SUMMARY_DESCRIPTION_LIMIT: usize = 100;

impl From<&Tool> for ToolSummary {
    fn from(tool: &Tool) -> Self {
        let description = if tool.description.is_empty() {
            "No description".to_string()
        } else if tool.description.chars().count() > SUMMARY_DESCRIPTION_LIMIT {
            let kept: String = tool
                .description
                .chars()
                .take(SUMMARY_DESCRIPTION_LIMIT - 3)
                .collect();
            format!("{}...", kept)
        } else {
            tool.description.clone()
        };

        ToolSummary {
            name: tool.name.clone(),
            description,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_toolkit_names() {
        assert_eq!(Toolkit::GoogleMeet.slug(), "googlemeet");
        assert_eq!(Toolkit::GoogleDrive.to_string(), "Google Drive");
        assert_eq!(
            serde_json::to_value(Toolkit::GoogleMeet).unwrap(),
            json!("googlemeet")
        );
    }

    #[test]
    fn test_toolkit_for_tool() {
        assert_eq!(
            Toolkit::for_tool("GOOGLEMEET_LIST_CONFERENCE_RECORDS"),
            Some(Toolkit::GoogleMeet)
        );
        assert_eq!(
            Toolkit::for_tool("GOOGLEDRIVE_LIST_FILES"),
            Some(Toolkit::GoogleDrive)
        );
        assert_eq!(Toolkit::for_tool("GOOGLEMEETING_X"), None);
        assert_eq!(Toolkit::for_tool("SLACK_SEND"), None);
    }

    #[test]
    fn test_summary_truncates_long_descriptions() {
        let tool = Tool::new(
            "GOOGLEMEET_GET_CONFERENCE_RECORD",
            "x".repeat(150),
            json!({"type": "object", "properties": {}}),
            Toolkit::GoogleMeet,
        );
        let summary = ToolSummary::from(&tool);
        assert_eq!(summary.description.chars().count(), 100);
        assert!(summary.description.ends_with("..."));
    }

    #[test]
    fn test_summary_keeps_short_descriptions() {
        let tool = Tool::new("A", "Lists things", json!({}), Toolkit::GoogleMeet);
        assert_eq!(ToolSummary::from(&tool).description, "Lists things");

        let bare = Tool::new("B", "", json!({}), Toolkit::GoogleMeet);
        assert_eq!(ToolSummary::from(&bare).description, "No description");
    }
}
