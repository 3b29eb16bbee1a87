//! OpenAI-compatible chat completions backend.
//!
//! Works with any endpoint that speaks `POST {base_url}/chat/completions`
//! with function-style tool calling.

use crate::model::{
    Backend, Message, ModelError, ModelRequest, ModelResponse, Role, ToolCall, ToolChoice,
    ToolSpec, Usage,
};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

// ─────────────────────────────────────────────────────────────────────────────
// API Wire Types
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ApiRequest<'a> {
    model: &'a str,
    messages: Vec<ApiMessage>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<ApiTool<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<&'static str>,
}

#[derive(Debug, Serialize)]
struct ApiMessage {
    role: &'static str,
    content: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tool_calls: Vec<ApiToolCall>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ApiToolCall {
    id: String,
    #[serde(rename = "type", default = "function_type")]
    call_type: String,
    function: ApiFunctionCall,
}

#[derive(Debug, Serialize, Deserialize)]
struct ApiFunctionCall {
    name: String,
    #[serde(default)]
    arguments: String,
}

#[derive(Debug, Serialize)]
struct ApiTool<'a> {
    #[serde(rename = "type")]
    tool_type: &'static str,
    function: ApiFunction<'a>,
}

#[derive(Debug, Serialize)]
struct ApiFunction<'a> {
    name: &'a str,
    description: &'a str,
    parameters: &'a Value,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    choices: Vec<ApiChoice>,
    #[serde(default)]
    usage: Option<ApiUsage>,
}

#[derive(Debug, Deserialize)]
struct ApiChoice {
    message: ApiResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ApiResponseMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<ApiToolCall>>,
}

#[derive(Debug, Deserialize)]
struct ApiUsage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
}

fn function_type() -> String {
    "function".to_string()
}

// ─────────────────────────────────────────────────────────────────────────────
// Backend Implementation
// ─────────────────────────────────────────────────────────────────────────────

/// Builder for creating an OpenAI-compatible backend.
#[derive(Debug, Clone)]
pub struct OpenAiBackendBuilder {
    base_url: String,
    api_key: Option<String>,
    model: String,
    timeout: Duration,
}

impl OpenAiBackendBuilder {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            model: model.into(),
            timeout: REQUEST_TIMEOUT,
        }
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Bearer credential. Local endpoints often need none.
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into()).filter(|k: &String| !k.is_empty());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn build(self) -> Result<OpenAiBackend> {
        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| Error::Config(format!("failed to create HTTP client: {e}")))?;

        Ok(OpenAiBackend {
            client,
            base_url: self.base_url.trim_end_matches('/').to_string(),
            api_key: self.api_key,
            model: self.model,
        })
    }
}

/// OpenAI-compatible chat completions backend.
pub struct OpenAiBackend {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
}

impl OpenAiBackend {
    pub fn builder(model: impl Into<String>) -> OpenAiBackendBuilder {
        OpenAiBackendBuilder::new(model)
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn role_to_api(role: Role) -> &'static str {
        role.as_str()
    }

    fn message_to_api(msg: &Message) -> ApiMessage {
        // Assistant turns that only carry tool calls go out with null content.
        let content = if msg.has_tool_calls() && msg.content.is_empty() {
            None
        } else {
            Some(msg.content.clone())
        };

        ApiMessage {
            role: Self::role_to_api(msg.role),
            content,
            tool_calls: msg
                .tool_calls
                .iter()
                .map(|call| ApiToolCall {
                    id: call.id.clone(),
                    call_type: function_type(),
                    function: ApiFunctionCall {
                        name: call.name.clone(),
                        arguments: call.arguments.clone(),
                    },
                })
                .collect(),
            tool_call_id: msg.tool_call_id.clone(),
        }
    }

    fn tool_to_api(spec: &ToolSpec) -> ApiTool<'_> {
        ApiTool {
            tool_type: "function",
            function: ApiFunction {
                name: &spec.name,
                description: &spec.description,
                parameters: &spec.schema,
            },
        }
    }

    fn build_request<'a>(&'a self, request: &ModelRequest<'a>) -> ApiRequest<'a> {
        let mut messages = Vec::with_capacity(request.messages.len() + 1);
        if let Some(system) = request.system {
            messages.push(Self::message_to_api(&Message::system(system)));
        }
        messages.extend(
            request
                .messages
                .iter()
                .filter(|m| m.role != Role::System)
                .map(Self::message_to_api),
        );

        let tools: Vec<ApiTool<'a>> = request.tools.iter().map(Self::tool_to_api).collect();
        let tool_choice = (!tools.is_empty()).then_some(match request.tool_choice {
            ToolChoice::Auto => "auto",
        });

        ApiRequest {
            model: &self.model,
            messages,
            tools,
            tool_choice,
        }
    }

    fn response_to_model(response: ApiResponse) -> std::result::Result<ModelResponse, ModelError> {
        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ModelError::InvalidResponse("no choices in response".into()))?;

        let calls: Vec<ToolCall> = choice
            .message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(|tc| ToolCall::new(tc.id, tc.function.name, tc.function.arguments))
            .collect();

        let content = choice.message.content.unwrap_or_default();
        let message = Message::assistant_with_tool_calls(content, calls);

        let usage = response
            .usage
            .map(|u| Usage {
                input_tokens: u.prompt_tokens,
                output_tokens: u.completion_tokens,
            })
            .unwrap_or_default();

        Ok(ModelResponse { message, usage })
    }
}

impl std::fmt::Display for OpenAiBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "openai({}, {})", self.model, self.base_url)
    }
}

impl Backend for OpenAiBackend {
    async fn call(
        &self,
        request: ModelRequest<'_>,
    ) -> std::result::Result<ModelResponse, ModelError> {
        let api_request = self.build_request(&request);
        let url = format!("{}/chat/completions", self.base_url);

        debug!(
            model = %self.model,
            messages = api_request.messages.len(),
            tools = api_request.tools.len(),
            "sending chat completion request"
        );

        let mut req = self
            .client
            .post(&url)
            .header("content-type", "application/json")
            .header("accept", "application/json");

        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }

        let response = req
            .json(&api_request)
            .send()
            .await
            .map_err(|e| ModelError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!(%status, "model endpoint returned error");
            return Err(ModelError::Api(format!("{status}: {body}")));
        }

        let api_response: ApiResponse = response
            .json()
            .await
            .map_err(|e| ModelError::InvalidResponse(e.to_string()))?;

        let response = Self::response_to_model(api_response)?;
        debug!(
            tool_calls = response.message.tool_calls.len(),
            input_tokens = response.usage.input_tokens,
            output_tokens = response.usage.output_tokens,
            "chat completion received"
        );
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn backend() -> OpenAiBackend {
        OpenAiBackend::builder("gpt-4o-mini")
            .base_url("http://localhost:8000/v1/")
            .build()
            .unwrap()
    }

    fn parse(body: Value) -> std::result::Result<ModelResponse, ModelError> {
        let api: ApiResponse = serde_json::from_value(body).unwrap();
        OpenAiBackend::response_to_model(api)
    }

    #[test]
    fn builder_trims_trailing_slash_and_empty_key() {
        let backend = OpenAiBackend::builder("m")
            .base_url("http://host/v1/")
            .api_key("")
            .build()
            .unwrap();
        assert_eq!(backend.base_url(), "http://host/v1");
        assert!(backend.api_key.is_none());
        assert_eq!(backend.to_string(), "openai(m, http://host/v1)");
    }

    #[test]
    fn request_puts_system_first_and_declares_tools() {
        let backend = backend();
        let messages = vec![
            Message::user("read notes.txt"),
            Message::assistant_with_tool_calls(
                "",
                vec![ToolCall::new("call_1", "read", r#"{"path":"notes.txt"}"#)],
            ),
            Message::tool_result("call_1", "   1 | hello"),
        ];
        let tools = vec![ToolSpec {
            name: "read".into(),
            description: "Read file".into(),
            schema: json!({"type": "object", "properties": {}, "required": []}),
        }];
        let request = ModelRequest {
            system: Some("be brief"),
            messages: &messages,
            tools: &tools,
            tool_choice: ToolChoice::Auto,
        };

        let body = serde_json::to_value(backend.build_request(&request)).unwrap();
        assert_eq!(body["model"], "gpt-4o-mini");
        assert_eq!(body["tool_choice"], "auto");
        assert_eq!(body["tools"][0]["type"], "function");
        assert_eq!(body["tools"][0]["function"]["name"], "read");

        let msgs = body["messages"].as_array().unwrap();
        assert_eq!(msgs.len(), 4);
        assert_eq!(msgs[0]["role"], "system");
        assert_eq!(msgs[0]["content"], "be brief");
        assert_eq!(msgs[2]["role"], "assistant");
        assert!(msgs[2]["content"].is_null());
        assert_eq!(msgs[2]["tool_calls"][0]["id"], "call_1");
        assert_eq!(msgs[2]["tool_calls"][0]["type"], "function");
        assert_eq!(msgs[3]["role"], "tool");
        assert_eq!(msgs[3]["tool_call_id"], "call_1");
    }

    #[test]
    fn request_without_tools_omits_tool_choice() {
        let backend = backend();
        let messages = vec![Message::user("hi")];
        let request = ModelRequest {
            system: None,
            messages: &messages,
            tools: &[],
            tool_choice: ToolChoice::Auto,
        };
        let body = serde_json::to_value(backend.build_request(&request)).unwrap();
        assert!(body.get("tools").is_none());
        assert!(body.get("tool_choice").is_none());
        assert_eq!(body["messages"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn parses_plain_answer() {
        let response = parse(json!({
            "choices": [{"message": {"role": "assistant", "content": "4"}}],
            "usage": {"prompt_tokens": 12, "completion_tokens": 1, "total_tokens": 13}
        }))
        .unwrap();
        assert_eq!(response.message.content, "4");
        assert!(!response.message.has_tool_calls());
        assert_eq!(response.usage.total_tokens(), 13);
    }

    #[test]
    fn parses_multiple_tool_calls_with_null_content() {
        let response = parse(json!({
            "choices": [{"message": {
                "role": "assistant",
                "content": null,
                "tool_calls": [
                    {"id": "a", "type": "function", "function": {"name": "glob", "arguments": "{\"pat\":\"*.rs\"}"}},
                    {"id": "b", "type": "function", "function": {"name": "bash", "arguments": "{\"cmd\":\"ls\"}"}}
                ]
            }}]
        }))
        .unwrap();
        assert!(response.message.content.is_empty());
        let ids: Vec<_> = response
            .message
            .tool_calls
            .iter()
            .map(|c| c.id.as_str())
            .collect();
        assert_eq!(ids, ["a", "b"]);
        assert_eq!(response.usage, Usage::default());
    }

    #[test]
    fn empty_choices_is_invalid_response() {
        let err = parse(json!({"choices": []})).unwrap_err();
        assert!(matches!(err, ModelError::InvalidResponse(_)));
    }
}
