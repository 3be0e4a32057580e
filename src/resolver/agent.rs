//! Bounded tool-using name resolution
//!
//! The loop alternates between asking a reasoning backend for its next step
//! and running the requested lookup tool:
//!
//! ```text
//! AWAITING_ACTION --NextAction--> AWAITING_OBSERVATION --observation--> AWAITING_ACTION
//!        |                                                                    |
//!        +--Final--> RESOLVED              budget spent + NextAction --> EXHAUSTED
//! ```
//!
//! A backend parse failure aborts from any state.

use super::tools::LookupTool;
use crate::error::AppError;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

/// What the reasoning backend wants to do next
#[derive(Debug, Clone, PartialEq)]
pub enum AgentStep {
    NextAction { tool: String, input: String },
    Final { value: String },
}

/// A completed lookup and what it returned
#[derive(Debug, Clone, PartialEq)]
pub struct AgentTurn {
    pub tool: String,
    pub input: String,
    pub observation: String,
}

/// Name and description of a tool, as shown to the backend
#[derive(Debug, Clone, PartialEq)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
}

/// Decides the next step from the user input and the lookups so far
#[async_trait]
pub trait ReasoningBackend: Send + Sync {
    async fn next_step(
        &self,
        user_input: &str,
        tools: &[ToolSpec],
        history: &[AgentTurn],
    ) -> Result<AgentStep, AppError>;
}

/// Turns a noisy establishment name into a canonical one
pub struct NameResolver {
    backend: Arc<dyn ReasoningBackend>,
    tools: Vec<Arc<dyn LookupTool>>,
    max_actions: usize,
}

impl NameResolver {
    pub fn new(
        backend: Arc<dyn ReasoningBackend>,
        tools: Vec<Arc<dyn LookupTool>>,
        max_actions: usize,
    ) -> Self {
        Self {
            backend,
            tools,
            max_actions,
        }
    }

    fn tool_specs(&self) -> Vec<ToolSpec> {
        self.tools
            .iter()
            .map(|t| ToolSpec {
                name: t.name().to_string(),
                description: t.description().to_string(),
            })
            .collect()
    }

    fn find_tool(&self, name: &str) -> Option<&Arc<dyn LookupTool>> {
        self.tools
            .iter()
            .find(|t| t.name().eq_ignore_ascii_case(name.trim()))
    }

    /// Run the loop until a final answer or the action budget runs out
    pub async fn resolve(&self, user_input: &str) -> Result<String, AppError> {
        let specs = self.tool_specs();
        let mut history: Vec<AgentTurn> = Vec::new();

        loop {
            let step = self
                .backend
                .next_step(user_input, &specs, &history)
                .await?;

            match step {
                AgentStep::Final { value } => {
                    let name = value.trim().to_string();
                    if name.is_empty() {
                        return Err(AppError::ParseError("final answer is empty".to_string()));
                    }
                    info!(
                        "Resolved '{}' to '{}' after {} lookups",
                        user_input,
                        name,
                        history.len()
                    );
                    return Ok(name);
                }
                AgentStep::NextAction { tool, input } => {
                    if history.len() >= self.max_actions {
                        return Err(AppError::ResolutionExhausted(format!(
                            "no final answer for '{}' after {} lookups",
                            user_input, self.max_actions
                        )));
                    }

                    let observation = match self.find_tool(&tool) {
                        Some(lookup) => lookup.invoke(&input).await?,
                        None => format!("{} is not a valid tool, try another one.", tool),
                    };
                    debug!("Action {}({}) observed: {}", tool, input, observation);

                    history.push(AgentTurn {
                        tool,
                        input,
                        observation,
                    });
                }
            }
        }
    }
}
