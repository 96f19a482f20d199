use pug_interpreter::config::runtime::RuntimeConfig;
use pug_interpreter::pipeline::{self, PipelineError, Session, SessionReply};
use pug_interpreter::runtime::{ConsoleHost, MemoryHost};
use pug_interpreter::{file_processor, lexical, logging, log_success};
use std::env;
use std::io::{self, BufRead, IsTerminal, Write};

const GREEN: &str = "\x1B[32m";
const BLUE: &str = "\x1B[34m";
const RED: &str = "\x1B[31m";
const RESET: &str = "\x1B[0m";

#[derive(Debug, Default, PartialEq)]
struct CliOptions {
    script: Option<String>,
    json: bool,
    print_tokens: bool,
    config_path: Option<String>,
    help: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();
    let options = parse_options(&args[1..]);

    if options.help {
        print_help(&args[0]);
        return Ok(());
    }

    let config = match &options.config_path {
        Some(path) => RuntimeConfig::load(path)?,
        None => RuntimeConfig::default(),
    };

    // Initialize global logging system
    logging::config::init_runtime_preferences(config.logging.clone())?;
    logging::init_global_logging()?;

    match &options.script {
        Some(path) => run_script(path, &options, &config),
        None => run_repl(config),
    }
}

fn parse_options(args: &[String]) -> CliOptions {
    let mut options = CliOptions::default();

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => options.help = true,
            "--json" => options.json = true,
            "--tokens" => options.print_tokens = true,
            "--config" => {
                if i + 1 < args.len() {
                    options.config_path = Some(args[i + 1].clone());
                    i += 1;
                } else {
                    eprintln!("Warning: --config requires a file path");
                }
            }
            other if other.starts_with("--") => {
                eprintln!("Warning: Unknown option '{}'", other);
            }
            other => {
                if options.script.is_none() {
                    options.script = Some(other.to_string());
                } else {
                    eprintln!("Warning: Ignoring extra argument '{}'", other);
                }
            }
        }
        i += 1;
    }

    options
}

fn print_help(program_name: &str) {
    println!("Pug Interpreter v{}", env!("CARGO_PKG_VERSION"));
    println!("Runs Pug scripts or starts an interactive session");
    println!();
    println!("USAGE:");
    println!("    {}                        # Start the REPL", program_name);
    println!("    {} <script.pug> [options] # Run a script", program_name);
    println!();
    println!("OPTIONS:");
    println!("    --help              Show this help message");
    println!("    --json              Print the execution report as JSON");
    println!("    --tokens            Print the token stream before running");
    println!("    --config <file>     Load runtime preferences from a TOML file");
    println!();
    println!("REPL COMMANDS:");
    println!("    /quit               Leave the session (an empty line also quits)");
    println!("    /cls                Clear the screen");
    println!("    :t                  Toggle token printing");
    println!();
    for line in logging::get_system_diagnostics().lines() {
        println!("    {}", line);
    }
}

fn run_script(
    path: &str,
    options: &CliOptions,
    config: &RuntimeConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let processor = file_processor::create_processor_from_preferences(&config.file_processor);

    if options.json {
        let script = processor.process_file(path)?;
        let mut host = MemoryHost::new();
        // Piped stdin feeds read(); an interactive terminal cannot be captured
        if !io::stdin().is_terminal() {
            let lines = io::stdin().lock().lines().collect::<Result<Vec<_>, _>>()?;
            host = host.with_input(lines);
        }
        let report = pipeline::execute_with_config(&script.source, &mut host, config);
        println!("{}", report.to_json()?);
        if report.has_error {
            std::process::exit(1);
        }
        return Ok(());
    }

    if options.print_tokens {
        let script = processor.process_file(path)?;
        // Lexer failures are reported by the run below
        if let Ok(tokens) = lexical::tokenize(&script.source) {
            for token in &tokens {
                println!("{}", token);
            }
        }
    }

    let mut host = ConsoleHost::new();
    match pipeline::run_file_with_config(path, &mut host, config) {
        Ok(result) => {
            for value in &result.values {
                println!("{}", value);
            }
        }
        Err(error) => {
            print_error(&error, false);
            std::process::exit(1);
        }
    }

    Ok(())
}

fn run_repl(config: RuntimeConfig) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = Session::with_config(config);
    let mut host = ConsoleHost::new();
    let color = session.color_output();

    log_success!(
        logging::codes::success::SESSION_STARTED,
        "Interactive session started",
        "print_tokens" => session.print_tokens()
    );

    let stdin = io::stdin();
    loop {
        write_colored(&mut io::stdout(), session.prompt(), GREEN, color, false)?;
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }

        match session.handle_line(line.trim_end_matches(['\r', '\n']), &mut host) {
            SessionReply::Quit => break,
            SessionReply::Cleared => {}
            SessionReply::TokenPrinting(enabled) => println!("Print tokens: {}", enabled),
            SessionReply::Evaluated {
                result,
                print_tokens,
            } => {
                if print_tokens {
                    for token in &result.tokens {
                        println!("{}", token);
                    }
                }
                for value in &result.values {
                    write_colored(&mut io::stdout(), &value.to_string(), BLUE, color, true)?;
                }
            }
            SessionReply::Failed(error) => print_error(&error, color),
        }
    }

    Ok(())
}

fn print_error(error: &PipelineError, color: bool) {
    logging::safe_log_error(error.error_code(), &error.to_string());
    let message = format!("Error [{}]: {}", error.error_code(), error);
    let _ = write_colored(&mut io::stderr(), &message, RED, color, true);
    if let Some(token) = error.current_token() {
        eprintln!("  at {}", token);
    }
}

fn write_colored<W: Write>(
    out: &mut W,
    text: &str,
    ansi: &str,
    color: bool,
    newline: bool,
) -> io::Result<()> {
    let terminator = if newline { "\n" } else { "" };
    if color {
        write!(out, "{}{}{}{}", ansi, text, RESET, terminator)
    } else {
        write!(out, "{}{}", text, terminator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_script_and_flags() {
        let options = parse_options(&args(&["demo.pug", "--json", "--tokens"]));

        assert_eq!(options.script.as_deref(), Some("demo.pug"));
        assert!(options.json);
        assert!(options.print_tokens);
        assert!(!options.help);
    }

    #[test]
    fn test_parse_config_path() {
        let options = parse_options(&args(&["--config", "pug.toml"]));

        assert_eq!(options.config_path.as_deref(), Some("pug.toml"));
        assert!(options.script.is_none());
    }

    #[test]
    fn test_parse_missing_config_value() {
        let options = parse_options(&args(&["--config"]));
        assert_eq!(options, CliOptions::default());
    }

    #[test]
    fn test_write_colored() {
        let mut buffer = Vec::new();
        write_colored(&mut buffer, "42", BLUE, true, true).unwrap();
        assert_eq!(String::from_utf8(buffer).unwrap(), "\x1B[34m42\x1B[0m\n");

        let mut plain = Vec::new();
        write_colored(&mut plain, "> ", GREEN, false, false).unwrap();
        assert_eq!(String::from_utf8(plain).unwrap(), "> ");
    }
}
