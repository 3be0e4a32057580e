//! Fake collaborators shared by unit tests

use crate::error::AppError;
use crate::resolver::{
    AgentStep, AgentTurn, LookupTool, PlaceCandidate, PlaceDetails, PlaceProvider,
    ReasoningBackend, ToolSpec,
};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

pub fn next_action(tool: &str, input: &str) -> Result<AgentStep, AppError> {
    Ok(AgentStep::NextAction {
        tool: tool.to_string(),
        input: input.to_string(),
    })
}

pub fn final_answer(value: &str) -> Result<AgentStep, AppError> {
    Ok(AgentStep::Final {
        value: value.to_string(),
    })
}

/// Replays a fixed list of steps and records the history it was shown
pub struct ScriptedBackend {
    steps: Mutex<VecDeque<Result<AgentStep, AppError>>>,
    seen: Mutex<Vec<Vec<AgentTurn>>>,
}

impl ScriptedBackend {
    pub fn new(steps: Vec<Result<AgentStep, AppError>>) -> Self {
        Self {
            steps: Mutex::new(steps.into()),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn histories(&self) -> Vec<Vec<AgentTurn>> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl ReasoningBackend for ScriptedBackend {
    async fn next_step(
        &self,
        _user_input: &str,
        _tools: &[ToolSpec],
        history: &[AgentTurn],
    ) -> Result<AgentStep, AppError> {
        self.seen.lock().unwrap().push(history.to_vec());
        self.steps
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(AppError::ParseError("script exhausted".to_string())))
    }
}

/// Answers every lookup with `result for <input>`
pub struct EchoTool {
    name: String,
    calls: Mutex<Vec<String>>,
}

impl EchoTool {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl LookupTool for EchoTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "echoes its input"
    }

    async fn invoke(&self, input: &str) -> Result<String, AppError> {
        self.calls.lock().unwrap().push(input.to_string());
        Ok(format!("result for {}", input))
    }
}

/// In-memory place provider keyed by exact query
#[derive(Default)]
pub struct FakePlaces {
    ids: HashMap<String, String>,
    details: HashMap<String, PlaceDetails>,
    candidates: Vec<PlaceCandidate>,
}

impl FakePlaces {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_place(mut self, query: &str, id: &str, details: PlaceDetails) -> Self {
        self.ids.insert(query.to_string(), id.to_string());
        self.details.insert(id.to_string(), details);
        self
    }

    /// Candidates returned for any query
    pub fn with_candidates(mut self, candidates: Vec<PlaceCandidate>) -> Self {
        self.candidates = candidates;
        self
    }
}

#[async_trait]
impl PlaceProvider for FakePlaces {
    async fn search_candidates(
        &self,
        query: &str,
        _category: &str,
        _locality: &str,
    ) -> Result<Vec<PlaceCandidate>, AppError> {
        if let Some(id) = self.ids.get(query) {
            return Ok(vec![PlaceCandidate {
                id: id.clone(),
                name: query.to_string(),
                address: None,
            }]);
        }
        Ok(self.candidates.clone())
    }

    async fn fetch_details(&self, place_id: &str) -> Result<PlaceDetails, AppError> {
        self.details
            .get(place_id)
            .cloned()
            .ok_or_else(|| AppError::ProviderError(format!("unknown place id {}", place_id)))
    }
}
