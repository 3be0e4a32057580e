//! Chat-completion reasoning backend
//!
//! Renders the tool list and lookup history into a single prompt, asks an
//! OpenAI-compatible endpoint for one turn and parses the reply.

use super::agent::{AgentStep, AgentTurn, ReasoningBackend, ToolSpec};
use super::grammar::parse_step;
use crate::error::AppError;
use crate::http::{client_with_timeout, ensure_success, PROVIDER_TIMEOUT};
use async_trait::async_trait;
use reqwest::Client;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use tracing::debug;

const STOP_SEQUENCE: &str = "\nObservation:";

const PROMPT_TEMPLATE: &str = "You're given the name of a restaurant by a user. It may be correct, but it will most likely contain a few errors.

Use the tools at your disposal to determine the name of the restaurant the user is referring to. If you are reasonably confident, proceed to providing the answer.

{tools}

Use the following format:

Search: the name provided by the user
Thought: you should always think about what to do
Action: the action to take, should be one of [{tool_names}]
Action Input: the input to the action
Observation: the result of the action
... (this Thought/Action/Action Input/Observation can repeat {max_actions} times or until you have all the required information, whichever comes sooner)
Thought: I now know the final answer
Final Answer: the final answer should be the name of the establishment, with no additional information

---

Begin!
User input: {input}
{scratchpad}";

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    stop: [&'a str; 1],
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

/// Render the prompt for one turn
pub fn render_prompt(user_input: &str, tools: &[ToolSpec], history: &[AgentTurn], max_actions: usize) -> String {
    let tool_lines = tools
        .iter()
        .map(|t| format!("{}: {}", t.name, t.description))
        .collect::<Vec<_>>()
        .join("\n");
    let tool_names = tools
        .iter()
        .map(|t| t.name.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    let mut scratchpad = String::new();
    for turn in history {
        scratchpad.push_str(&format!(
            "Action: {}\nAction Input: {}\nObservation: {}\nThought: ",
            turn.tool, turn.input, turn.observation
        ));
    }

    let max_actions = max_actions.to_string();

    // Single pass, so substituted text is never scanned for placeholders
    placeholder_regex()
        .replace_all(PROMPT_TEMPLATE, |caps: &Captures| match &caps[1] {
            "tools" => tool_lines.clone(),
            "tool_names" => tool_names.clone(),
            "max_actions" => max_actions.clone(),
            "input" => user_input.to_string(),
            "scratchpad" => scratchpad.clone(),
            _ => caps[0].to_string(),
        })
        .into_owned()
}

fn placeholder_regex() -> &'static Regex {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER.get_or_init(|| Regex::new(r"\{(\w+)\}").expect("valid placeholder regex"))
}

/// Reasoning backend backed by an OpenAI-compatible chat endpoint
pub struct ChatBackend {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    max_actions: usize,
}

impl ChatBackend {
    pub fn new(base_url: &str, api_key: &str, model: &str, max_actions: usize) -> Result<Self, AppError> {
        Ok(Self {
            client: client_with_timeout(PROVIDER_TIMEOUT)?,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            max_actions,
        })
    }
}

#[async_trait]
impl ReasoningBackend for ChatBackend {
    async fn next_step(
        &self,
        user_input: &str,
        tools: &[ToolSpec],
        history: &[AgentTurn],
    ) -> Result<AgentStep, AppError> {
        let prompt = render_prompt(user_input, tools, history, self.max_actions);
        let request = ChatRequest {
            model: &self.model,
            temperature: 0.0,
            stop: [STOP_SEQUENCE],
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt,
            }],
        };

        let url = format!("{}/chat/completions", self.base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;
        let response = ensure_success(response, "Chat completion").await?;
        let body: ChatResponse = response.json().await?;

        let text = body
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| AppError::ProviderError("chat completion returned no choices".to_string()))?;
        debug!("Reasoning output: {}", text);

        Ok(parse_step(&text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    fn tools() -> Vec<ToolSpec> {
        vec![ToolSpec {
            name: "Search".to_string(),
            description: "look up a place name".to_string(),
        }]
    }

    #[test]
    fn test_render_prompt_includes_history() {
        let history = vec![AgentTurn {
            tool: "Search".to_string(),
            input: "mcdnalds".to_string(),
            observation: "McDonald's, Oktogon".to_string(),
        }];
        let prompt = render_prompt("mcdnalds", &tools(), &history, 3);

        assert!(prompt.contains("Search: look up a place name"));
        assert!(prompt.contains("one of [Search]"));
        assert!(prompt.contains("User input: mcdnalds"));
        assert!(prompt.ends_with("Observation: McDonald's, Oktogon\nThought: "));
    }

    #[test]
    fn test_render_prompt_keeps_braces_in_user_input() {
        let history = vec![AgentTurn {
            tool: "Search".to_string(),
            input: "{tools}".to_string(),
            observation: "nothing".to_string(),
        }];
        let prompt = render_prompt("pizza {scratchpad} {tools}", &tools(), &history, 3);

        assert!(prompt.contains("User input: pizza {scratchpad} {tools}\nAction: Search"));
        assert!(prompt.contains("Action Input: {tools}\nObservation: nothing"));
        assert_eq!(prompt.matches("Search: look up a place name").count(), 1);
    }

    #[tokio::test]
    async fn test_next_step_parses_reply() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer sk-test")
            .match_body(Matcher::PartialJson(json!({
                "model": "gpt-3.5-turbo",
                "temperature": 0.0,
                "stop": ["\nObservation:"]
            })))
            .with_status(200)
            .with_body(
                json!({"choices": [{"message": {"role": "assistant", "content": "Thought: done\nFinal Answer: McDonald's"}}]})
                    .to_string(),
            )
            .create_async()
            .await;

        let backend = ChatBackend::new(&server.url(), "sk-test", "gpt-3.5-turbo", 3).unwrap();
        let step = backend.next_step("mcdnalds", &tools(), &[]).await.unwrap();
        assert_eq!(
            step,
            AgentStep::Final {
                value: "McDonald's".to_string()
            }
        );
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_unparseable_reply_is_parse_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body(json!({"choices": [{"message": {"role": "assistant", "content": "hmm"}}]}).to_string())
            .create_async()
            .await;

        let backend = ChatBackend::new(&server.url(), "sk-test", "gpt-3.5-turbo", 3).unwrap();
        let err = backend.next_step("x", &tools(), &[]).await.unwrap_err();
        assert_eq!(err.error_code(), "parse_error");
    }

    #[tokio::test]
    async fn test_http_failure_is_provider_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(401)
            .with_body("bad key")
            .create_async()
            .await;

        let backend = ChatBackend::new(&server.url(), "sk-bad", "gpt-3.5-turbo", 3).unwrap();
        let err = backend.next_step("x", &tools(), &[]).await.unwrap_err();
        assert_eq!(err.error_code(), "provider_error");
    }
}
