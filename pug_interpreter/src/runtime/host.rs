//! Side effects reachable from scripts: console output, console input,
//! screen clearing and random numbers.
//!
//! `ConsoleHost` talks to the real terminal. `MemoryHost` captures output
//! and replays scripted input so evaluations can be asserted on.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

const CLEAR_SCREEN: &str = "\x1B[2J\x1B[1;1H";

pub trait Host {
    fn print_line(&mut self, text: &str) -> io::Result<()>;

    /// One line of input without its terminator. Empty at end of input.
    fn read_line(&mut self) -> io::Result<String>;

    fn clear(&mut self) -> io::Result<()>;

    /// Uniform in `[0, 1)`
    fn random_unit(&mut self) -> f64;

    /// Uniform in `[min, max)`. Returns `min` when the range is empty.
    fn random_range(&mut self, min: i64, max: i64) -> i64;
}

#[derive(Debug, Default)]
pub struct ConsoleHost;

impl ConsoleHost {
    pub fn new() -> Self {
        Self
    }
}

impl Host for ConsoleHost {
    fn print_line(&mut self, text: &str) -> io::Result<()> {
        let mut stdout = io::stdout().lock();
        writeln!(stdout, "{}", text)?;
        stdout.flush()
    }

    fn read_line(&mut self) -> io::Result<String> {
        let mut line = String::new();
        io::stdin().lock().read_line(&mut line)?;
        Ok(strip_line_ending(line))
    }

    fn clear(&mut self) -> io::Result<()> {
        let mut stdout = io::stdout().lock();
        write!(stdout, "{}", CLEAR_SCREEN)?;
        stdout.flush()
    }

    fn random_unit(&mut self) -> f64 {
        rand::thread_rng().gen::<f64>()
    }

    fn random_range(&mut self, min: i64, max: i64) -> i64 {
        if min >= max {
            return min;
        }
        rand::thread_rng().gen_range(min..max)
    }
}

/// In-memory host with a seedable generator
#[derive(Debug)]
pub struct MemoryHost {
    output: Vec<String>,
    input: VecDeque<String>,
    clear_count: usize,
    rng: StdRng,
}

impl Default for MemoryHost {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryHost {
    pub fn new() -> Self {
        Self {
            output: Vec::new(),
            input: VecDeque::new(),
            clear_count: 0,
            rng: StdRng::from_entropy(),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            ..Self::new()
        }
    }

    pub fn with_input<I, S>(mut self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.input.extend(lines.into_iter().map(Into::into));
        self
    }

    pub fn output(&self) -> &[String] {
        &self.output
    }

    pub fn take_output(&mut self) -> Vec<String> {
        std::mem::take(&mut self.output)
    }

    pub fn clear_count(&self) -> usize {
        self.clear_count
    }
}

impl Host for MemoryHost {
    fn print_line(&mut self, text: &str) -> io::Result<()> {
        self.output.push(text.to_string());
        Ok(())
    }

    fn read_line(&mut self) -> io::Result<String> {
        Ok(self.input.pop_front().unwrap_or_default())
    }

    fn clear(&mut self) -> io::Result<()> {
        self.clear_count += 1;
        Ok(())
    }

    fn random_unit(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }

    fn random_range(&mut self, min: i64, max: i64) -> i64 {
        if min >= max {
            return min;
        }
        self.rng.gen_range(min..max)
    }
}

fn strip_line_ending(mut line: String) -> String {
    while line.ends_with('\n') || line.ends_with('\r') {
        line.pop();
    }
    line
}
