use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::io::BufRead;

use super::error::Result;

/// Where the shell gets its next line from.
pub trait LineSource {
    /// Blocks for one line. `None` means input is exhausted.
    fn next_line(&mut self, prompt: &str) -> Result<Option<String>>;

    /// Called with every line that made it into the shell's history.
    fn remember(&mut self, _line: &str) {}
}

/// Interactive terminal input with line editing.
pub struct Editor {
    editor: DefaultEditor,
}

impl Editor {
    pub fn new() -> Result<Editor> {
        Ok(Editor {
            editor: DefaultEditor::new()?,
        })
    }
}

impl LineSource for Editor {
    fn next_line(&mut self, prompt: &str) -> Result<Option<String>> {
        match self.editor.readline(prompt) {
            Ok(line) => Ok(Some(line)),
            // ^C abandons the line being typed
            Err(ReadlineError::Interrupted) => Ok(Some(String::new())),
            Err(ReadlineError::Eof) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn remember(&mut self, line: &str) {
        if let Err(e) = self.editor.add_history_entry(line) {
            warn!("could not add line to editor history: {}", e);
        }
    }
}

/// Non-interactive input: one line per read, no prompt.
pub struct ScriptReader<R> {
    reader: R,
}

impl<R: BufRead> ScriptReader<R> {
    pub fn new(reader: R) -> ScriptReader<R> {
        ScriptReader { reader: reader }
    }
}

impl<R: BufRead> LineSource for ScriptReader<R> {
    fn next_line(&mut self, _prompt: &str) -> Result<Option<String>> {
        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        while line.ends_with('\n') || line.ends_with('\r') {
            line.pop();
        }
        Ok(Some(line))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn script_reader_strips_line_endings() {
        let mut source = ScriptReader::new(Cursor::new("ls\r\n\necho hi"));
        assert_eq!(source.next_line("$ ").unwrap(), Some(String::from("ls")));
        assert_eq!(source.next_line("$ ").unwrap(), Some(String::new()));
        assert_eq!(source.next_line("$ ").unwrap(), Some(String::from("echo hi")));
        assert_eq!(source.next_line("$ ").unwrap(), None);
    }
}
