use super::error::{Error, Result};
use super::history::History;
use std::borrow::Cow;
use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use users::os::unix::UserExt;

pub mod jobs;

const GOOD_STATUS: &str = "😋";
const BAD_STATUS: &str = "😭";

/// Result of looking up a `!` line in history.
#[derive(Debug, PartialEq, Eq)]
pub enum Expansion<'a> {
    Line(Cow<'a, str>),
    /// Nothing matched; the line should be dropped without running anything.
    Miss,
}

pub trait BuiltinHandler {
    fn is_builtin(&self, name: &str) -> bool;
    fn handle_builtin(&mut self, name: &str, args: &[&str]) -> Result<i32>;
}

/// Everything the shell remembers between lines.
pub struct ShellState {
    history: History,
    last_status: i32,
}

impl ShellState {
    pub fn new(history_size: usize) -> Self {
        ShellState {
            history: History::new(history_size),
            last_status: 0,
        }
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn record_history(&mut self, line: &str) {
        self.history.add_command(line);
    }

    pub fn last_status(&self) -> i32 {
        self.last_status
    }

    pub fn set_last_status(&mut self, status: i32) {
        self.last_status = status;
    }

    /// Resolves `!!`, `!N` and `!prefix`. Other lines pass through untouched.
    pub fn expand_bangs<'a>(&self, line: &'a str) -> Expansion<'a> {
        let rest = match line.strip_prefix('!') {
            Some(rest) => rest,
            None => return Expansion::Line(Cow::Borrowed(line)),
        };
        let found = if rest == "!" {
            self.history.search_number(self.history.last_number())
        } else if !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit()) {
            rest.parse::<u64>()
                .ok()
                .and_then(|n| self.history.search_number(n))
        } else {
            self.history.search_prefix(rest)
        };
        match found {
            Some(command) => {
                debug!("expanded '{}' to '{}'", line, command);
                Expansion::Line(Cow::Owned(String::from(command)))
            }
            None => {
                debug!("no history match for '{}'", line);
                Expansion::Miss
            }
        }
    }

    pub fn prompt(&self) -> String {
        let status = if self.last_status == 0 {
            GOOD_STATUS
        } else {
            BAD_STATUS
        };
        let username = current_username()
            .map(|u| u.to_string_lossy().into_owned())
            .unwrap_or_else(|| String::from("(none)"));
        let host = nix::unistd::gethostname()
            .map(|h| h.to_string_lossy().into_owned())
            .unwrap_or_else(|_| String::from("(none)"));
        let cwd = match env::current_dir() {
            Ok(dir) => abbreviate_home(&dir, home_dir().as_deref()),
            Err(e) => format!("(error: {})", e),
        };
        format!(
            "[{status}]-[{number}]-[{username}@{host}:{cwd}]$ ",
            status = status,
            number = self.history.last_number() + 1,
            username = username,
            host = host,
            cwd = cwd
        )
    }

    fn change_directory(&self, target: Option<&str>) -> Result<()> {
        let path = match target {
            Some(dir) => PathBuf::from(dir),
            None => home_dir().ok_or(Error::NoHome)?,
        };
        debug!("cd {}", path.display());
        env::set_current_dir(&path).map_err(|e| Error::ChangeDirectory {
            path: path,
            source: e,
        })
    }
}

impl BuiltinHandler for ShellState {
    fn is_builtin(&self, name: &str) -> bool {
        name == "cd" || name == "history"
    }

    fn handle_builtin(&mut self, name: &str, args: &[&str]) -> Result<i32> {
        match name {
            "cd" => {
                self.change_directory(args.first().copied())?;
                Ok(0)
            }
            "history" => {
                self.history.print()?;
                Ok(0)
            }
            _ => Ok(127),
        }
    }
}

fn current_username() -> Option<OsString> {
    users::get_current_username()
}

/// Home directory of the invoking user, looked up by account name.
pub fn home_dir() -> Option<PathBuf> {
    let name = current_username()?;
    users::get_user_by_name(&name).map(|user| user.home_dir().to_path_buf())
}

fn abbreviate_home(dir: &Path, home: Option<&Path>) -> String {
    if let Some(home) = home {
        if let Ok(rest) = dir.strip_prefix(home) {
            if rest.as_os_str().is_empty() {
                return String::from("~");
            }
            return format!("~/{}", rest.display());
        }
    }
    dir.display().to_string()
}
