//! Request and history types exchanged with the agent endpoint

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Default streaming endpoint of the hosted weather agent
pub const DEFAULT_ENDPOINT: &str =
    "https://millions-screeching-vultur.mastra.cloud/api/agents/weatherAgent/stream";

/// Who authored a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    /// Get a human-readable label for this role
    pub fn label(&self) -> &'static str {
        match self {
            Role::User => "You",
            Role::Assistant => "Weather Agent",
        }
    }

    /// Wire name of the role
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// One `{role, content}` pair of outbound conversation history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub role: Role,
    pub content: String,
}

impl HistoryEntry {
    /// Create a user history entry
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Create an assistant history entry
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Per-request run parameters sent alongside the history
#[derive(Debug, Clone, PartialEq)]
pub struct RunOptions {
    /// Identifier for the agent run
    pub run_id: String,
    /// Resource identifier for the agent
    pub resource_id: String,
    /// Maximum number of retry attempts (performed server-side)
    pub max_retries: u32,
    /// Maximum number of processing steps
    pub max_steps: u32,
    /// Sampling temperature
    pub temperature: f32,
    /// Nucleus sampling cutoff
    pub top_p: f32,
    /// Opaque runtime context forwarded to the agent
    pub runtime_context: HashMap<String, serde_json::Value>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            run_id: "weatherAgent".to_string(),
            resource_id: "weatherAgent".to_string(),
            max_retries: 2,
            max_steps: 5,
            temperature: 0.5,
            top_p: 1.0,
            runtime_context: HashMap::new(),
        }
    }
}

/// Request body for the agent stream endpoint
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentRequest {
    pub messages: Vec<HistoryEntry>,
    pub run_id: String,
    pub max_retries: u32,
    pub max_steps: u32,
    pub temperature: f32,
    pub top_p: f32,
    pub runtime_context: HashMap<String, serde_json::Value>,
    pub thread_id: String,
    pub resource_id: String,
}

impl AgentRequest {
    /// Assemble a request from history, thread id and run options
    pub fn new(messages: Vec<HistoryEntry>, thread_id: &str, options: &RunOptions) -> Self {
        Self {
            messages,
            run_id: options.run_id.clone(),
            max_retries: options.max_retries,
            max_steps: options.max_steps,
            temperature: options.temperature,
            top_p: options.top_p,
            runtime_context: options.runtime_context.clone(),
            thread_id: thread_id.to_string(),
            resource_id: options.resource_id.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serializes_camel_case() {
        let request = AgentRequest::new(
            vec![HistoryEntry::user("weather in Oslo?")],
            "thread-1",
            &RunOptions::default(),
        );
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"], "weather in Oslo?");
        assert_eq!(json["runId"], "weatherAgent");
        assert_eq!(json["resourceId"], "weatherAgent");
        assert_eq!(json["maxRetries"], 2);
        assert_eq!(json["maxSteps"], 5);
        assert_eq!(json["topP"], 1.0);
        assert_eq!(json["threadId"], "thread-1");
        assert!(json["runtimeContext"].as_object().unwrap().is_empty());
    }

    #[test]
    fn test_role_wire_names() {
        assert_eq!(serde_json::to_string(&Role::Assistant).unwrap(), "\"assistant\"");
        assert_eq!(Role::User.as_str(), "user");
        assert_eq!(Role::Assistant.label(), "Weather Agent");
    }
}
