//! Autoexec file support.
//!
//! The file holds one statement per line. Blank lines and lines starting with
//! `//` are kept verbatim. A line `watch <statement>` runs the statement and
//! marks its command as watched: later console calls of that command with
//! arguments replace the recorded statement, and the file is rewritten with
//! the new value in place.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use bevy::prelude::*;

use crate::core::{parse_statement, CommandContext, ConsoleError, ConsoleResult, StatementForm};

const WATCH_PREFIX: &str = "watch ";

/// One line of an autoexec file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AutoexecLine {
    /// Blank line or `//` comment, kept as written.
    Comment(String),
    /// A statement run on load.
    Statement(String),
    /// A statement run on load whose command is watched.
    Watch {
        /// The watched command name.
        function: String,
        /// The most recent statement calling it.
        statement: String,
    },
}

impl AutoexecLine {
    /// Classify a raw line.
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with("//") {
            return AutoexecLine::Comment(line.to_string());
        }
        match trimmed.strip_prefix(WATCH_PREFIX) {
            Some(statement) => {
                let statement = statement.trim();
                AutoexecLine::Watch {
                    function: parse_statement(statement).function.to_string(),
                    statement: statement.to_string(),
                }
            }
            None => AutoexecLine::Statement(trimmed.to_string()),
        }
    }

    /// The statement to run, if any.
    pub fn statement(&self) -> Option<&str> {
        match self {
            AutoexecLine::Comment(_) => None,
            AutoexecLine::Statement(statement) | AutoexecLine::Watch { statement, .. } => Some(statement),
        }
    }

    fn render(&self) -> String {
        match self {
            AutoexecLine::Comment(text) => text.clone(),
            AutoexecLine::Statement(statement) => statement.clone(),
            AutoexecLine::Watch { statement, .. } => format!("{}{}", WATCH_PREFIX, statement),
        }
    }
}

/// Resource managing the autoexec file.
///
/// # Examples
///
/// ```
/// use bevy_console_lang::AutoexecManager;
///
/// let mut autoexec = AutoexecManager::parse("autoexec.cfg", "// settings\nwatch sv_gravity 800\n");
/// assert!(autoexec.is_watched("sv_gravity"));
///
/// assert!(autoexec.observe("sv_gravity(400)"));
/// autoexec.watch("cl_fov 90");
/// assert_eq!(autoexec.render(), "// settings\nwatch sv_gravity(400)\nwatch cl_fov 90\n");
/// ```
#[derive(Resource, Debug, Clone, Default)]
pub struct AutoexecManager {
    path: PathBuf,
    lines: Vec<AutoexecLine>,
    dirty: bool,
}

impl AutoexecManager {
    /// Create an empty manager that will save to `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lines: Vec::new(),
            dirty: false,
        }
    }

    /// Build a manager from file contents.
    pub fn parse(path: impl Into<PathBuf>, contents: &str) -> Self {
        Self {
            path: path.into(),
            lines: contents.lines().map(AutoexecLine::parse).collect(),
            dirty: false,
        }
    }

    /// Read a file. A missing file gives an empty manager.
    pub fn load(path: impl AsRef<Path>) -> ConsoleResult<Self> {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(contents) => Ok(Self::parse(path, &contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Self::new(path)),
            Err(e) => Err(ConsoleError::Io(path.display().to_string(), e.to_string())),
        }
    }

    /// The file path.
    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All lines in file order.
    #[inline]
    pub fn lines(&self) -> &[AutoexecLine] {
        &self.lines
    }

    /// Whether there are changes not yet saved.
    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Names of watched commands in file order.
    pub fn watches(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().filter_map(|line| match line {
            AutoexecLine::Watch { function, .. } => Some(function.as_str()),
            _ => None,
        })
    }

    /// Whether a command is watched.
    pub fn is_watched(&self, function: &str) -> bool {
        self.watches().any(|name| name == function)
    }

    /// Run every statement in file order, stopping at the first failure.
    ///
    /// Returns the number of statements run.
    pub fn run(&self, ctx: &mut CommandContext<'_>) -> ConsoleResult<usize> {
        let mut count = 0;
        for (index, line) in self.lines.iter().enumerate() {
            let Some(statement) = line.statement() else {
                continue;
            };
            ctx.try_execute(statement).map_err(|err| ConsoleError::Autoexec {
                line: index + 1,
                message: err.to_string(),
            })?;
            count += 1;
        }
        Ok(count)
    }

    /// Watch the command called by `statement`, recording the statement.
    ///
    /// An existing watch is updated in place; a new one goes at the end.
    pub fn watch(&mut self, statement: &str) {
        let statement = statement.trim();
        let function = parse_statement(statement).function;
        if self.update_watch(function, statement).is_some() {
            return;
        }
        self.lines.push(AutoexecLine::Watch {
            function: function.to_string(),
            statement: statement.to_string(),
        });
        self.dirty = true;
    }

    /// Stop watching a command. Returns `false` if it was not watched.
    pub fn unwatch(&mut self, function: &str) -> bool {
        let before = self.lines.len();
        self.lines.retain(|line| {
            !matches!(line, AutoexecLine::Watch { function: name, .. } if name == function)
        });
        let removed = self.lines.len() != before;
        self.dirty |= removed;
        removed
    }

    /// Record a statement the console ran.
    ///
    /// Only calls with arguments to a watched command are recorded. Returns
    /// `true` if the recorded statement changed.
    pub fn observe(&mut self, statement: &str) -> bool {
        let statement = statement.trim();
        let parsed = parse_statement(statement);
        if parsed.form == StatementForm::Bare || parsed.arguments.trim().is_empty() {
            return false;
        }
        self.update_watch(parsed.function, statement).unwrap_or(false)
    }

    // `None` if `function` is not watched, otherwise whether the statement changed.
    fn update_watch(&mut self, function: &str, statement: &str) -> Option<bool> {
        let mut changed = None;
        for line in &mut self.lines {
            if let AutoexecLine::Watch { function: name, statement: recorded } = line {
                if name.as_str() == function {
                    let differs = recorded.as_str() != statement;
                    if differs {
                        *recorded = statement.to_string();
                        self.dirty = true;
                    }
                    changed = Some(changed.unwrap_or(false) || differs);
                }
            }
        }
        changed
    }

    /// The file contents as they would be saved.
    pub fn render(&self) -> String {
        let mut contents = String::new();
        for line in &self.lines {
            contents.push_str(&line.render());
            contents.push('\n');
        }
        contents
    }

    /// Write the file, creating parent directories if needed.
    pub fn save(&mut self) -> ConsoleResult<()> {
        let io_error = |path: &Path, e: io::Error| ConsoleError::Io(path.display().to_string(), e.to_string());

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| io_error(parent, e))?;
            }
        }

        fs::write(&self.path, self.render()).map_err(|e| io_error(&self.path, e))?;
        self.dirty = false;
        debug!("Console: Saved autoexec to '{}'", self.path.display());
        Ok(())
    }
}
