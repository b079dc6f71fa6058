pub mod error;
pub mod history;
pub mod readline;
pub mod state;
pub mod syntax;

pub use self::error::{Error, Result};
use self::readline::LineSource;
use self::state::jobs::Job;
use self::state::{BuiltinHandler, Expansion, ShellState};
use self::syntax::ast::Pipeline;
use self::syntax::tokens::Token;
use self::syntax::{lexer, ParseError};
use nix::sys::signal::{self, SaFlags, SigAction, SigHandler, SigSet, Signal};

pub const DEFAULT_HISTORY_SIZE: usize = 100;

/// Exit status recorded for a line that failed to parse.
const SYNTAX_ERROR_STATUS: i32 = 2;

#[derive(Debug, Clone)]
pub struct Config {
    pub history_size: usize,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            history_size: DEFAULT_HISTORY_SIZE,
        }
    }
}

/// What the read loop should do after a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

pub struct Shell {
    state: ShellState,
}

/// Ignores keyboard signals in the shell process for as long as it lives,
/// restoring the previous dispositions on drop.
struct SignalGuard {
    saved: Vec<(Signal, SigAction)>,
}

impl SignalGuard {
    fn ignore(signals: &[Signal]) -> SignalGuard {
        let ignore = SigAction::new(SigHandler::SigIgn, SaFlags::empty(), SigSet::empty());
        let mut saved = Vec::new();
        for &sig in signals {
            match unsafe { signal::sigaction(sig, &ignore) } {
                Ok(old) => saved.push((sig, old)),
                Err(e) => warn!("failed to ignore {}: {}", sig, e),
            }
        }
        SignalGuard { saved: saved }
    }
}

impl Drop for SignalGuard {
    fn drop(&mut self) {
        for (sig, action) in self.saved.drain(..).rev() {
            if let Err(e) = unsafe { signal::sigaction(sig, &action) } {
                warn!("failed to restore {}: {}", sig, e);
            }
        }
    }
}

impl Shell {
    pub fn new(config: Config) -> Self {
        Shell {
            state: ShellState::new(config.history_size),
        }
    }

    pub fn state(&self) -> &ShellState {
        &self.state
    }

    /// Reads and runs lines until `exit` or end of input. Returns the status
    /// of the last command.
    pub fn run_interactive<L: LineSource>(&mut self, source: &mut L) -> Result<i32> {
        let _signals = SignalGuard::ignore(&[Signal::SIGINT, Signal::SIGQUIT]);
        loop {
            let prompt = self.state.prompt();
            let line = match source.next_line(&prompt)? {
                Some(line) => line,
                None => break,
            };
            let recorded = self.state.history().last_number();
            match self.handle_line(&line) {
                Ok(Flow::Exit) => break,
                Ok(Flow::Continue) => {}
                Err(e) => {
                    eprintln!("{}", e);
                    self.state.set_last_status(1);
                }
            }
            if self.state.history().last_number() != recorded {
                if let Some(entry) = self.state.history().last() {
                    source.remember(&entry.command);
                }
            }
        }
        Ok(self.state.last_status())
    }

    /// Expands, dispatches and runs one line of input.
    pub fn handle_line(&mut self, line: &str) -> Result<Flow> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(Flow::Continue);
        }
        let line = match self.state.expand_bangs(line) {
            Expansion::Line(expanded) => expanded.into_owned(),
            Expansion::Miss => return Ok(Flow::Continue),
        };
        if line.starts_with('#') {
            return Ok(Flow::Continue);
        }

        let mut words = lexer::tokenize(&line);
        if let Some(comment) = words
            .iter()
            .position(|w| Token::classify(w) == Token::Comment)
        {
            words.truncate(comment);
        }
        match words.first() {
            Some(&"exit") => return Ok(Flow::Exit),
            Some(name) if self.state.is_builtin(name) => {
                self.state.record_history(&line);
                match self.state.handle_builtin(name, &words[1..]) {
                    Ok(status) => self.state.set_last_status(status),
                    Err(e) => {
                        self.state.set_last_status(1);
                        return Err(e);
                    }
                }
                return Ok(Flow::Continue);
            }
            _ => {}
        }

        let pipeline = match syntax::parser::parse(&words) {
            Ok(pipeline) => pipeline,
            Err(ParseError::Empty) => return Ok(Flow::Continue),
            Err(e) => {
                eprintln!("syntax error: {}", e);
                self.state.set_last_status(SYNTAX_ERROR_STATUS);
                return Ok(Flow::Continue);
            }
        };
        self.state.record_history(&line);
        let status = self.run_pipeline(&pipeline)?;
        self.state.set_last_status(status);
        Ok(Flow::Continue)
    }

    /// Compiles and runs a line directly, bypassing history and builtins.
    pub fn compile_and_run(&mut self, line: &str) -> Result<i32> {
        let pipeline = syntax::compile(line)?;
        self.run_pipeline(&pipeline)
    }

    fn run_pipeline(&mut self, pipeline: &Pipeline) -> Result<i32> {
        let mut job = Job::from_pipeline(pipeline)?;
        job.run()?;
        let status = job.wait_until_complete()?;
        debug!("pipeline finished with status {}", status);
        Ok(status)
    }
}
