//! Logical line source
//!
//! Reads logical command lines from a stack of script files. `executescript`
//! pushes an include onto the stack; reading always proceeds from the top,
//! and an exhausted file is popped so reading resumes on its parent. Comment
//! lines are dropped, physically-continued lines are joined into one logical
//! line, and blank logical lines are skipped.
//!
//! Popping a file is observable through [`LineSource::take_closed`] so the
//! owner can restore per-file defaults (the quote delimiter) at the file
//! boundary — and only there, never mid-file.

use std::fs::File;
use std::io::{BufRead, BufReader};

use crate::error::ScriptError;

/// Default comment marker: a line whose trimmed text starts with it is dropped.
pub const DEFAULT_COMMENT: char = '#';
/// Default continuation marker: a physical line ending in it joins the next.
pub const DEFAULT_CONTINUATION: char = '\\';

/// One logical line, with the physical line number it ended on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLine {
    pub text: String,
    pub number: usize,
}

struct OpenFile {
    name: String,
    reader: BufReader<File>,
    line_number: usize,
}

/// A stack of open script files yielding logical lines.
pub struct LineSource {
    stack: Vec<OpenFile>,
    comment: char,
    continuation: char,
    /// Set when one or more files were popped by the last `read_line` call.
    closed: bool,
    /// Name and line counter of the file last read from, retained after
    /// the stack empties so results can still be attributed.
    current_name: String,
    current_line: usize,
}

impl LineSource {
    pub fn new() -> Self {
        Self::with_markers(DEFAULT_COMMENT, DEFAULT_CONTINUATION)
    }

    pub fn with_markers(comment: char, continuation: char) -> Self {
        Self {
            stack: Vec::new(),
            comment,
            continuation,
            closed: false,
            current_name: String::new(),
            current_line: 0,
        }
    }

    /// Open `name` and push it on top of the stack. On failure the stack is
    /// untouched: already-open files stay readable.
    pub fn push_file(&mut self, name: &str) -> Result<(), ScriptError> {
        let file = File::open(name).map_err(|_| ScriptError::file_not_found(name))?;
        self.stack.push(OpenFile {
            name: name.to_string(),
            reader: BufReader::new(file),
            line_number: 0,
        });
        self.current_name = name.to_string();
        self.current_line = 0;
        Ok(())
    }

    /// Physical line number within the file currently being read (1-based).
    pub fn line_number(&self) -> usize {
        self.current_line
    }

    /// Name of the file currently being read.
    pub fn current_file(&self) -> &str {
        &self.current_name
    }

    /// True once all files have been exhausted.
    pub fn is_exhausted(&self) -> bool {
        self.stack.is_empty()
    }

    /// Report and clear the file-closed notification. Returns true when one
    /// or more files were popped during the last `read_line` call.
    pub fn take_closed(&mut self) -> bool {
        std::mem::take(&mut self.closed)
    }

    /// Next logical line, or `None` when every file on the stack is done.
    pub fn read_line(&mut self) -> Result<Option<SourceLine>, ScriptError> {
        loop {
            let mut text = match self.read_physical()? {
                Some(line) => line,
                None => return Ok(None),
            };

            // Comment lines are dropped whole, before continuation joining,
            // so a commented-out line cannot swallow its successor.
            if text.trim_start().starts_with(self.comment) {
                continue;
            }

            while text.ends_with(self.continuation) {
                text.pop();
                match self.read_physical()? {
                    Some(next) => text.push_str(&next),
                    None => break,
                }
            }

            if text.trim().is_empty() {
                continue;
            }
            return Ok(Some(SourceLine {
                text,
                number: self.current_line,
            }));
        }
    }

    /// One physical line from the top of the stack, popping exhausted files.
    fn read_physical(&mut self) -> Result<Option<String>, ScriptError> {
        loop {
            let top = match self.stack.last_mut() {
                Some(top) => top,
                None => return Ok(None),
            };
            let mut buf = String::new();
            let n = top.reader.read_line(&mut buf)?;
            if n == 0 {
                if let Some(finished) = self.stack.pop() {
                    self.closed = true;
                    self.current_name = finished.name;
                    self.current_line = finished.line_number;
                }
                if let Some(parent) = self.stack.last() {
                    self.current_name = parent.name.clone();
                    self.current_line = parent.line_number;
                }
                continue;
            }
            top.line_number += 1;
            self.current_line = top.line_number;
            self.current_name = top.name.clone();
            while buf.ends_with('\n') || buf.ends_with('\r') {
                buf.pop();
            }
            return Ok(Some(buf));
        }
    }
}

impl Default for LineSource {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::Path;

    fn write_script(dir: &Path, name: &str, content: &str) -> String {
        let path = dir.join(name);
        let mut f = File::create(&path).unwrap();
        f.write_all(content.as_bytes()).unwrap();
        path.to_string_lossy().into_owned()
    }

    fn collect(source: &mut LineSource) -> Vec<String> {
        let mut lines = Vec::new();
        while let Some(line) = source.read_line().unwrap() {
            lines.push(line.text);
        }
        lines
    }

    #[test]
    fn test_missing_file_leaves_stack_intact() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_script(dir.path(), "a.txt", "echo one\n");
        let mut source = LineSource::new();
        source.push_file(&a).unwrap();
        let err = source.push_file("no-such-file.txt").unwrap_err();
        assert!(err.message.contains("File not found"));
        // parent still readable
        assert_eq!(collect(&mut source), vec!["echo one"]);
    }

    #[test]
    fn test_comments_and_blanks_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_script(dir.path(), "a.txt", "# header\n\necho one\n   # indented\necho two\n");
        let mut source = LineSource::new();
        source.push_file(&a).unwrap();
        assert_eq!(collect(&mut source), vec!["echo one", "echo two"]);
    }

    #[test]
    fn test_continuation_joins_and_counts_physical_lines() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_script(dir.path(), "a.txt", "echo a \\\nb \\\nc\necho d\n");
        let mut source = LineSource::new();
        source.push_file(&a).unwrap();
        let first = source.read_line().unwrap().unwrap();
        assert_eq!(first.text, "echo a b c");
        // three physical lines consumed
        assert_eq!(first.number, 3);
        let second = source.read_line().unwrap().unwrap();
        assert_eq!(second.text, "echo d");
        assert_eq!(second.number, 4);
    }

    #[test]
    fn test_stacked_files_resume_parent() {
        let dir = tempfile::tempdir().unwrap();
        let child = write_script(dir.path(), "child.txt", "child one\nchild two\n");
        let parent = write_script(dir.path(), "parent.txt", "parent one\nparent two\n");
        let mut source = LineSource::new();
        source.push_file(&parent).unwrap();
        assert_eq!(source.read_line().unwrap().unwrap().text, "parent one");
        source.push_file(&child).unwrap();
        assert_eq!(source.read_line().unwrap().unwrap().text, "child one");
        assert!(!source.take_closed());
        assert_eq!(source.read_line().unwrap().unwrap().text, "child two");
        // child pops here; parent resumes with its own line numbering
        let line = source.read_line().unwrap().unwrap();
        assert_eq!(line.text, "parent two");
        assert!(source.take_closed());
        assert_eq!(line.number, 2);
        assert!(source.read_line().unwrap().is_none());
    }

    #[test]
    fn test_line_numbers_are_per_file() {
        let dir = tempfile::tempdir().unwrap();
        let child = write_script(dir.path(), "child.txt", "child one\n");
        let parent = write_script(dir.path(), "parent.txt", "parent one\nparent two\n");
        let mut source = LineSource::new();
        source.push_file(&parent).unwrap();
        source.read_line().unwrap();
        assert_eq!(source.line_number(), 1);
        source.push_file(&child).unwrap();
        source.read_line().unwrap();
        assert_eq!(source.line_number(), 1);
        assert!(source.current_file().ends_with("child.txt"));
        source.read_line().unwrap();
        assert_eq!(source.line_number(), 2);
        assert!(source.current_file().ends_with("parent.txt"));
    }
}
