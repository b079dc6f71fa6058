use anyhow::{Context, Result};
use bangsh::shell::readline::{Editor, ScriptReader};
use bangsh::shell::{Config, Shell, DEFAULT_HISTORY_SIZE};
use clap::Parser;
use log::info;
use std::io;
use std::process;

/// A small Unix shell with pipelines, redirection and history recall.
#[derive(Parser, Debug)]
#[command(name = "bangsh")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Run one line and exit with its status
    #[arg(short = 'c')]
    command: Option<String>,

    /// Number of commands kept in history
    #[arg(long, default_value_t = DEFAULT_HISTORY_SIZE, value_parser = parse_history_size)]
    history_size: usize,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn parse_history_size(s: &str) -> std::result::Result<usize, String> {
    match s.parse::<usize>() {
        Ok(0) => Err(String::from("history size must be at least 1")),
        Ok(n) => Ok(n),
        Err(e) => Err(e.to_string()),
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let mut shell = Shell::new(Config {
        history_size: args.history_size,
    });

    if let Some(line) = args.command {
        shell.handle_line(&line).context("failed to run command")?;
        process::exit(shell.state().last_status());
    }

    let status = if nix::unistd::isatty(nix::libc::STDIN_FILENO).unwrap_or(false) {
        let mut editor = Editor::new().context("failed to initialize line editor")?;
        shell.run_interactive(&mut editor)?
    } else {
        info!("stdin is not a terminal; reading commands without a prompt");
        let stdin = io::stdin();
        let mut reader = ScriptReader::new(stdin.lock());
        shell.run_interactive(&mut reader)?
    };
    process::exit(status);
}
