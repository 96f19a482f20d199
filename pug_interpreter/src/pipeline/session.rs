//! REPL session state and command handling

use super::{run_source_with_config, PipelineError, RunResult};
use crate::config::runtime::RuntimeConfig;
use crate::runtime::{Host, VariableTable};

const QUIT_COMMAND: &str = "/quit";
const CLEAR_COMMAND: &str = "/cls";
const TOGGLE_TOKENS_COMMAND: &str = ":t";

/// What the REPL front end should do with one line of input
#[derive(Debug)]
pub enum SessionReply {
    Quit,
    Cleared,
    TokenPrinting(bool),
    /// `print_tokens` mirrors the session toggle at evaluation time
    Evaluated { result: RunResult, print_tokens: bool },
    Failed(PipelineError),
}

/// Interactive state kept across REPL lines
#[derive(Debug, Default)]
pub struct Session {
    variables: VariableTable,
    print_tokens: bool,
    config: RuntimeConfig,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: RuntimeConfig) -> Self {
        Self {
            print_tokens: config.repl.print_tokens,
            variables: VariableTable::new(),
            config,
        }
    }

    pub fn variables(&self) -> &VariableTable {
        &self.variables
    }

    pub fn print_tokens(&self) -> bool {
        self.print_tokens
    }

    pub fn prompt(&self) -> &str {
        &self.config.repl.prompt
    }

    pub fn color_output(&self) -> bool {
        self.config.repl.color_output
    }

    /// Handle one input line. Commands are matched case-insensitively; an
    /// empty line ends the session, a blank one evaluates to nothing.
    pub fn handle_line(&mut self, line: &str, host: &mut dyn Host) -> SessionReply {
        let command = line.trim();

        if line.is_empty() || command.eq_ignore_ascii_case(QUIT_COMMAND) {
            return SessionReply::Quit;
        }

        if command.eq_ignore_ascii_case(CLEAR_COMMAND) {
            return match host.clear() {
                Ok(()) => SessionReply::Cleared,
                Err(e) => SessionReply::Failed(PipelineError::pipeline_error(&e.to_string())),
            };
        }

        if command.eq_ignore_ascii_case(TOGGLE_TOKENS_COMMAND) {
            self.print_tokens = !self.print_tokens;
            return SessionReply::TokenPrinting(self.print_tokens);
        }

        match run_source_with_config(line, &mut self.variables, host, &self.config) {
            Ok(result) => SessionReply::Evaluated {
                result,
                print_tokens: self.print_tokens,
            },
            Err(error) => SessionReply::Failed(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::{MemoryHost, RuntimeValue};
    use assert_matches::assert_matches;

    #[test]
    fn test_commands_are_case_insensitive() {
        let mut session = Session::new();
        let mut host = MemoryHost::new();

        assert_matches!(session.handle_line("/QUIT", &mut host), SessionReply::Quit);
        assert_matches!(session.handle_line("", &mut host), SessionReply::Quit);
        assert_matches!(session.handle_line("/Cls", &mut host), SessionReply::Cleared);
        assert_eq!(host.clear_count(), 1);
    }

    #[test]
    fn test_blank_line_is_not_quit() {
        let mut session = Session::new();
        let mut host = MemoryHost::new();

        match session.handle_line("   ", &mut host) {
            SessionReply::Evaluated { result, .. } => assert!(result.values.is_empty()),
            other => panic!("unexpected reply: {:?}", other),
        }
        assert_matches!(session.handle_line("", &mut host), SessionReply::Quit);
    }

    #[test]
    fn test_toggle_token_printing() {
        let mut session = Session::new();
        let mut host = MemoryHost::new();
        let initial = session.print_tokens();

        assert_matches!(
            session.handle_line(":T", &mut host),
            SessionReply::TokenPrinting(enabled) if enabled != initial
        );
        assert_matches!(
            session.handle_line("1", &mut host),
            SessionReply::Evaluated { print_tokens, .. } if print_tokens != initial
        );
    }

    #[test]
    fn test_variables_persist_across_lines() {
        let mut session = Session::new();
        let mut host = MemoryHost::new();

        session.handle_line("int total = 5", &mut host);
        let reply = session.handle_line("total * 2", &mut host);

        match reply {
            SessionReply::Evaluated { result, .. } => {
                assert_eq!(result.values, vec![RuntimeValue::Double(10.0)]);
            }
            other => panic!("unexpected reply: {:?}", other),
        }
        assert_eq!(session.variables().len(), 1);
    }

    #[test]
    fn test_failure_keeps_session_alive() {
        let mut session = Session::new();
        let mut host = MemoryHost::new();

        assert_matches!(
            session.handle_line("xpto + 1", &mut host),
            SessionReply::Failed(PipelineError::Evaluation(_))
        );
        assert_matches!(
            session.handle_line("print(\"still here\")", &mut host),
            SessionReply::Evaluated { .. }
        );
        assert_eq!(host.output(), &["still here"]);
    }
}
