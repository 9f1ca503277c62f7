//! Command-line interface module for file-sorter.
//!
//! The undo history only lives as long as the process, so the binary runs an
//! interactive session: the user organizes one or more folders and can undo
//! them, newest first, until they quit.
//!
//! ```text
//! > organize ~/Downloads
//! > undo
//! > quit
//! ```

use crate::audit::AuditLog;
use crate::config::SorterConfig;
use crate::events::{NoopListener, OrganizeListener};
use crate::file_organizer::FileOrganizer;
use crate::output::{ConsoleListener, OutputFormatter};
use crate::undo::UndoOutcome;
use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};
use serde::Serialize;
use std::io::{self, BufRead, IsTerminal, Write};
use std::path::{Path, PathBuf};

/// Command-line arguments.
#[derive(Debug, Parser)]
#[command(
    name = "file-sorter",
    version,
    about = "Sort files into category folders by extension, with undo"
)]
pub struct Args {
    /// Folder to organize immediately
    pub folder: Option<PathBuf>,

    /// Configuration file (defaults to .file-sorter.toml or ~/.config/file-sorter/config.toml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Append the audit log here instead of the configured location
    #[arg(long, conflicts_with = "no_log")]
    pub log_file: Option<PathBuf>,

    /// Do not write an audit log
    #[arg(long)]
    pub no_log: bool,

    /// Also walk into existing category folders (Images, Text, ...)
    #[arg(long)]
    pub walk_category_dirs: bool,

    /// Print reports as JSON
    #[arg(long)]
    pub json: bool,

    /// Organize FOLDER and exit instead of starting a session
    #[arg(long, requires = "folder")]
    pub once: bool,
}

/// One command typed into the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    Organize(PathBuf),
    Preview(PathBuf),
    Undo,
    History,
    Help,
    Quit,
}

impl SessionCommand {
    /// Parses a line of input. Blank lines yield `Ok(None)`.
    ///
    /// The argument is everything after the command word, so paths may contain
    /// spaces; surrounding quotes are stripped.
    pub fn parse(line: &str) -> Result<Option<Self>, String> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };
        let folder = || -> Result<PathBuf, String> {
            let path = rest.trim_matches(|c| c == '"' || c == '\'');
            if path.is_empty() {
                Err(format!("'{}' needs a folder path", word))
            } else {
                Ok(expand_home(path))
            }
        };

        let command = match word.to_lowercase().as_str() {
            "organize" | "o" => SessionCommand::Organize(folder()?),
            "preview" | "p" => SessionCommand::Preview(folder()?),
            "undo" | "u" => SessionCommand::Undo,
            "history" | "h" => SessionCommand::History,
            "help" | "?" => SessionCommand::Help,
            "quit" | "exit" | "q" => SessionCommand::Quit,
            other => return Err(format!("Unknown command '{}'. Type 'help'.", other)),
        };
        Ok(Some(command))
    }
}

fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/")
        && let Ok(home) = std::env::var("HOME")
    {
        return PathBuf::from(home).join(rest);
    }
    PathBuf::from(path)
}

/// An interactive session around one [`FileOrganizer`].
pub struct Session {
    organizer: FileOrganizer,
    json: bool,
}

impl Session {
    pub fn new(organizer: FileOrganizer, json: bool) -> Self {
        Self { organizer, json }
    }

    pub fn organizer(&self) -> &FileOrganizer {
        &self.organizer
    }

    /// Runs one command. Returns `Ok(false)` when the session should end.
    ///
    /// Failures of the command itself (a bad folder, files that could not be
    /// moved) are shown to the user and do not end the session.
    pub fn execute(&mut self, command: SessionCommand) -> Result<bool> {
        match command {
            SessionCommand::Organize(folder) => self.organize(&folder)?,
            SessionCommand::Preview(folder) => self.preview(&folder)?,
            SessionCommand::Undo => self.undo()?,
            SessionCommand::History => {
                if self.json {
                    let batches: Vec<_> = self.organizer.history().iter().collect();
                    print_json(&batches)?;
                } else {
                    OutputFormatter::history(self.organizer.history());
                }
            }
            SessionCommand::Help => print_help(),
            SessionCommand::Quit => return Ok(false),
        }
        Ok(true)
    }

    /// Reads commands from `input` until EOF or `quit`.
    pub fn run<R: BufRead>(&mut self, input: R, prompt: bool) -> Result<()> {
        if prompt {
            OutputFormatter::plain("Welcome to file-sorter! Type 'help' for commands.");
            show_prompt()?;
        }
        for line in input.lines() {
            let line = line.context("failed to read command")?;
            match SessionCommand::parse(&line) {
                Ok(Some(command)) => {
                    if !self.execute(command)? {
                        break;
                    }
                }
                Ok(None) => {}
                Err(message) => OutputFormatter::error(&message),
            }
            if prompt {
                show_prompt()?;
            }
        }
        Ok(())
    }

    fn organize(&mut self, folder: &Path) -> Result<()> {
        if !self.json {
            OutputFormatter::info(&format!("Organizing contents of: {}", folder.display()));
        }
        let mut console = ConsoleListener::new();
        let mut quiet = NoopListener;
        let listener: &mut dyn OrganizeListener = if self.json {
            &mut quiet
        } else {
            &mut console
        };

        let result = self.organizer.organize_with(folder, listener);
        console.finish();
        match result {
            Ok(report) if self.json => print_json(&report)?,
            Ok(report) => OutputFormatter::organize_report(&report),
            Err(e) => {
                warn!("Rejected folder {}: {}", folder.display(), e);
                OutputFormatter::error(&format!("Invalid folder: {}", e));
            }
        }
        Ok(())
    }

    fn preview(&self, folder: &Path) -> Result<()> {
        match self.organizer.plan(folder) {
            Ok(planned) if self.json => print_json(&planned)?,
            Ok(planned) => OutputFormatter::plan(&folder.display().to_string(), &planned),
            Err(e) => OutputFormatter::error(&format!("Invalid folder: {}", e)),
        }
        Ok(())
    }

    fn undo(&mut self) -> Result<()> {
        let mut console = ConsoleListener::new();
        let mut quiet = NoopListener;
        let listener: &mut dyn OrganizeListener = if self.json {
            &mut quiet
        } else {
            &mut console
        };

        let outcome = self.organizer.undo_last_with(listener);
        console.finish();
        if self.json {
            return print_json(&outcome);
        }
        match outcome {
            UndoOutcome::NothingToUndo => OutputFormatter::nothing_to_undo(),
            UndoOutcome::Undone(report) => OutputFormatter::undo_report(&report),
        }
        Ok(())
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("failed to serialize report")?;
    println!("{}", json);
    Ok(())
}

fn show_prompt() -> Result<()> {
    print!("> ");
    io::stdout().flush().context("failed to flush stdout")
}

fn print_help() {
    OutputFormatter::header("COMMANDS");
    OutputFormatter::plain("  organize <folder>   sort every file under <folder> into category folders");
    OutputFormatter::plain("  preview <folder>    show what organize would do, without moving anything");
    OutputFormatter::plain("  undo                move the files of the last organize back");
    OutputFormatter::plain("  history             list organize runs that can still be undone");
    OutputFormatter::plain("  help                show this help");
    OutputFormatter::plain("  quit                leave (history is discarded)");
}

/// Builds the organizer described by the arguments and configuration.
pub fn build_organizer(args: &Args) -> Result<FileOrganizer> {
    let config = SorterConfig::load(args.config.as_deref())?;
    let mut organizer = FileOrganizer::from_config(&config)?;
    if args.walk_category_dirs {
        organizer = organizer.skip_category_dirs(false);
    }

    if !args.no_log {
        let log_path = args
            .log_file
            .clone()
            .unwrap_or_else(|| config.organizer.log_file.clone());
        let audit = AuditLog::open(&log_path)
            .with_context(|| format!("cannot open audit log {}", log_path.display()))?;
        info!("Audit log: {}", log_path.display());
        organizer = organizer.with_audit_log(audit);
    }

    Ok(organizer)
}

/// Runs the application with parsed arguments.
pub fn run(args: Args) -> Result<()> {
    let organizer = build_organizer(&args)?;
    let mut session = Session::new(organizer, args.json);

    if let Some(folder) = &args.folder {
        session.execute(SessionCommand::Organize(folder.clone()))?;
        if args.once {
            return Ok(());
        }
    }

    let stdin = io::stdin();
    let interactive = stdin.is_terminal();
    session.run(stdin.lock(), interactive)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file_category::FileMapper;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_parse_commands() {
        assert_eq!(
            SessionCommand::parse("organize /tmp/a b").unwrap(),
            Some(SessionCommand::Organize(PathBuf::from("/tmp/a b")))
        );
        assert_eq!(
            SessionCommand::parse("  PREVIEW \"/tmp/x\"  ").unwrap(),
            Some(SessionCommand::Preview(PathBuf::from("/tmp/x")))
        );
        assert_eq!(SessionCommand::parse("u").unwrap(), Some(SessionCommand::Undo));
        assert_eq!(SessionCommand::parse("exit").unwrap(), Some(SessionCommand::Quit));
        assert_eq!(SessionCommand::parse("   ").unwrap(), None);
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(SessionCommand::parse("organize").is_err());
        assert!(SessionCommand::parse("format c:").is_err());
    }

    #[test]
    fn test_args_once_requires_folder() {
        assert!(Args::try_parse_from(["file-sorter", "--once"]).is_err());
        let args = Args::try_parse_from(["file-sorter", "/tmp", "--once", "--no-log"]).unwrap();
        assert!(args.once);
        assert!(args.no_log);
    }

    #[test]
    fn test_session_script() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root = temp_dir.path();
        fs::write(root.join("photo.png"), "png").unwrap();

        let mut session = Session::new(FileOrganizer::new(FileMapper::default()), false);
        let script = format!(
            "organize {}\nhistory\nbogus\n\nundo\nundo\nquit\norganize {}\n",
            root.display(),
            root.display()
        );
        session.run(script.as_bytes(), false).expect("session failed");

        assert!(root.join("photo.png").exists());
        assert!(!root.join("Images").join("photo.png").exists());
        assert!(session.organizer().history().is_empty());
    }

    #[test]
    fn test_session_survives_invalid_folder() {
        let mut session = Session::new(FileOrganizer::new(FileMapper::default()), true);
        let keep_going = session
            .execute(SessionCommand::Organize(PathBuf::from("/no/such/folder")))
            .unwrap();
        assert!(keep_going);
        assert!(session.organizer().history().is_empty());
    }
}
