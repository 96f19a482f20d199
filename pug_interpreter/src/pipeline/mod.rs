//! End-to-end execution: file or source text → tokens → values.
//!
//! `run_source` and `run_file` serve the command line, `Session` drives the
//! REPL, and `execute` produces the self-contained report an editor front
//! end renders.

mod error;
pub mod output;
mod session;

pub use error::PipelineError;
pub use output::{ExecutionReport, RunResult};
pub use session::{Session, SessionReply};

use crate::config::runtime::RuntimeConfig;
use crate::logging;
use crate::runtime::{Host, MemoryHost, VariableTable};
use std::path::Path;
use std::time::Instant;

/// Tokenize and evaluate `source` against `variables` with default preferences
pub fn run_source(
    source: &str,
    variables: &mut VariableTable,
    host: &mut dyn Host,
) -> Result<RunResult, PipelineError> {
    run_source_with_config(source, variables, host, &RuntimeConfig::default())
}

pub fn run_source_with_config(
    source: &str,
    variables: &mut VariableTable,
    host: &mut dyn Host,
    config: &RuntimeConfig,
) -> Result<RunResult, PipelineError> {
    let lexing_start = Instant::now();
    let tokens = crate::lexical::tokenize_with_preferences(source, config.lexical.clone())?;
    let lexing_duration = lexing_start.elapsed();

    let evaluation_start = Instant::now();
    let values = crate::syntax::evaluate_with_preferences(
        variables,
        &tokens,
        host,
        config.evaluator.clone(),
    )?;

    let evaluation_duration = evaluation_start.elapsed();

    crate::log_debug!("Source evaluated",
        "tokens" => tokens.len(),
        "lexing_ms" => lexing_duration.as_secs_f64() * 1000.0,
        "evaluation_ms" => evaluation_duration.as_secs_f64() * 1000.0
    );

    Ok(RunResult::new(tokens, values, lexing_duration, evaluation_duration))
}

/// Read a script through the file processor and run it with a fresh variable table
pub fn run_file<P: AsRef<Path>>(path: P, host: &mut dyn Host) -> Result<RunResult, PipelineError> {
    run_file_with_config(path, host, &RuntimeConfig::default())
}

pub fn run_file_with_config<P: AsRef<Path>>(
    path: P,
    host: &mut dyn Host,
    config: &RuntimeConfig,
) -> Result<RunResult, PipelineError> {
    let path = path.as_ref();

    logging::with_file_context(path.to_path_buf(), || {
        crate::log_info!("Running Pug script", "file" => path.display());

        let processor = crate::file_processor::create_processor_from_preferences(&config.file_processor);
        let script = processor.process_file(path)?;

        let mut variables = VariableTable::new();
        let result = run_source_with_config(&script.source, &mut variables, host, config)?
            .with_metadata(script.metadata);

        result.log_success();
        Ok(result)
    })
}

/// Run `source` in isolation and capture everything an editor displays.
/// Never fails: errors are folded into the report.
pub fn execute(source: &str) -> ExecutionReport {
    execute_with_host(source, &mut MemoryHost::new())
}

/// Like `execute`, with a caller-supplied capture host (for scripted `read` input)
pub fn execute_with_host(source: &str, host: &mut MemoryHost) -> ExecutionReport {
    execute_with_config(source, host, &RuntimeConfig::default())
}

pub fn execute_with_config(
    source: &str,
    host: &mut MemoryHost,
    config: &RuntimeConfig,
) -> ExecutionReport {
    let mut variables = VariableTable::new();
    match run_source_with_config(source, &mut variables, host, config) {
        Ok(result) => ExecutionReport::success(result, variables, host.take_output()),
        Err(error) => ExecutionReport::failure(&error),
    }
}
