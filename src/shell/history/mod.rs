use std::collections::vec_deque;
use std::collections::VecDeque;
use std::io::{self, Write};

mod model;
pub use self::model::Entry;

/// The most recent commands, each tagged with a permanent sequence number.
///
/// Numbers keep counting across evictions, so the oldest retained entry is
/// not necessarily number 1.
#[derive(Debug)]
pub struct History {
    entries: VecDeque<Entry>,
    capacity: usize,
    count: u64,
}

impl History {
    pub fn new(capacity: usize) -> History {
        History {
            entries: VecDeque::new(),
            capacity: capacity,
            count: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The most recently recorded entry still retained.
    pub fn last(&self) -> Option<&Entry> {
        self.entries.back()
    }

    pub fn entries(&self) -> vec_deque::Iter<Entry> {
        self.entries.iter()
    }

    /// Appends `command` unless it is empty, evicting the oldest entry when full.
    pub fn add_command(&mut self, command: &str) {
        if command.is_empty() {
            return;
        }
        self.count += 1;
        if self.entries.len() >= self.capacity {
            if let Some(evicted) = self.entries.pop_front() {
                trace!("history: evicting {}", evicted);
            }
        }
        if self.capacity > 0 {
            self.entries.push_back(Entry {
                number: self.count,
                command: String::from(command),
            });
        }
        debug!("history: recorded #{} '{}'", self.count, command);
    }

    /// Sequence number of the latest recorded command, or 0 before the first.
    pub fn last_number(&self) -> u64 {
        self.count
    }

    pub fn search_number(&self, number: u64) -> Option<&str> {
        let oldest = self.entries.front()?.number;
        if number < oldest {
            return None;
        }
        let offset = usize::try_from(number - oldest).ok()?;
        self.entries.get(offset).map(|e| e.command.as_str())
    }

    /// Newest command starting with `prefix`.
    pub fn search_prefix(&self, prefix: &str) -> Option<&str> {
        self.entries
            .iter()
            .rev()
            .find(|e| e.command.starts_with(prefix))
            .map(|e| e.command.as_str())
    }

    pub fn write_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        for entry in &self.entries {
            writeln!(out, "{}", entry)?;
        }
        Ok(())
    }

    pub fn print(&self) -> io::Result<()> {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        self.write_to(&mut handle)?;
        handle.flush()
    }
}
