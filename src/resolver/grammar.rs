//! Reasoning text grammar
//!
//! Chat backends answer in free text. Two shapes are accepted:
//!
//! ```text
//! Thought: I should look this up
//! Action: Search
//! Action Input: "mcdnalds budapest"
//! ```
//!
//! or a line containing `Final Answer: <name>`. Anything else is a parse error.

use super::agent::AgentStep;
use crate::error::AppError;
use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;

const FINAL_ANSWER: &str = "Final Answer:";

#[derive(Debug, Error, PartialEq)]
pub enum GrammarError {
    #[error("no action or final answer in `{0}`")]
    NoMatch(String),
    #[error("final answer is empty")]
    EmptyFinalAnswer,
    #[error("action has no tool name")]
    EmptyTool,
}

impl From<GrammarError> for AppError {
    fn from(err: GrammarError) -> Self {
        AppError::ParseError(err.to_string())
    }
}

fn action_regex() -> &'static Regex {
    static ACTION: OnceLock<Regex> = OnceLock::new();
    ACTION.get_or_init(|| {
        Regex::new(r"(?s)Action\s*\d*\s*:(.*?)\nAction\s*\d*\s*Input\s*\d*\s*:[\s]*(.*)")
            .expect("action regex is valid")
    })
}

/// Parse one reasoning turn into the next step
pub fn parse_step(text: &str) -> Result<AgentStep, GrammarError> {
    if let Some((_, answer)) = text.rsplit_once(FINAL_ANSWER) {
        let value = answer.trim().trim_matches('"').trim().to_string();
        if value.is_empty() {
            return Err(GrammarError::EmptyFinalAnswer);
        }
        return Ok(AgentStep::Final { value });
    }

    let captures = action_regex()
        .captures(text)
        .ok_or_else(|| GrammarError::NoMatch(text.trim().to_string()))?;

    let tool = captures[1].trim().to_string();
    if tool.is_empty() {
        return Err(GrammarError::EmptyTool);
    }
    let input = captures[2].trim().trim_matches(' ').trim_matches('"').to_string();

    Ok(AgentStep::NextAction { tool, input })
}
