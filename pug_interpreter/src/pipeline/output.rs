//! Run results and the serializable editor report

use super::PipelineError;
use crate::file_processor::FileMetadata;
use crate::runtime::{RuntimeValue, VariableTable};
use crate::tokens::Token;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;

/// Result of one tokenize → evaluate run
#[derive(Debug, Clone)]
pub struct RunResult {
    pub tokens: Vec<Token>,
    /// Statement values with `None` results dropped
    pub values: Vec<RuntimeValue>,
    pub metadata: Option<FileMetadata>,
    pub lexing_duration: Duration,
    pub evaluation_duration: Duration,
}

impl RunResult {
    pub fn new(
        tokens: Vec<Token>,
        values: Vec<RuntimeValue>,
        lexing_duration: Duration,
        evaluation_duration: Duration,
    ) -> Self {
        Self {
            tokens,
            values: values.into_iter().filter(|v| !v.is_none()).collect(),
            metadata: None,
            lexing_duration,
            evaluation_duration,
        }
    }

    pub fn with_metadata(mut self, metadata: FileMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn total_duration(&self) -> Duration {
        self.lexing_duration + self.evaluation_duration
    }

    pub fn log_success(&self) {
        crate::log_success!(
            crate::logging::codes::success::PIPELINE_COMPLETE,
            "Pipeline completed",
            "tokens" => self.tokens.len(),
            "values" => self.values.len(),
            "lexing_ms" => self.lexing_duration.as_secs_f64() * 1000.0,
            "evaluation_ms" => self.evaluation_duration.as_secs_f64() * 1000.0
        );
    }
}

/// Everything an editor front end needs to render one execution
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionReport {
    pub tokens: Vec<Token>,
    pub variables: VariableTable,
    pub values: Vec<RuntimeValue>,
    pub output: Vec<String>,
    pub current_token: Option<Token>,
    pub has_error: bool,
    pub executed_at: DateTime<Utc>,
}

impl ExecutionReport {
    /// Successful run. Blank output lines are dropped.
    pub fn success(result: RunResult, variables: VariableTable, output: Vec<String>) -> Self {
        Self {
            tokens: result.tokens,
            variables,
            values: result.values,
            output: output
                .into_iter()
                .filter(|line| !line.trim().is_empty())
                .collect(),
            current_token: None,
            has_error: false,
            executed_at: Utc::now(),
        }
    }

    /// Failed run. The output is replaced by the error message.
    pub fn failure(error: &PipelineError) -> Self {
        let (variables, values) = match error {
            PipelineError::Evaluation(e) => (
                e.variables().clone(),
                e.values().iter().filter(|v| !v.is_none()).cloned().collect(),
            ),
            _ => (VariableTable::new(), Vec::new()),
        };

        Self {
            tokens: error.tokens().to_vec(),
            variables,
            values,
            output: vec![error.to_string()],
            current_token: error.current_token(),
            has_error: true,
            executed_at: Utc::now(),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
