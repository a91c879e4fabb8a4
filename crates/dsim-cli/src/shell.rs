//! Interactive workspace - a line-oriented front end over one [`Session`].
//!
//! The shell holds the session for its whole lifetime, so switching views
//! and searching reuse the last result without contacting the service.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use dsim_core::{ActiveView, ParseViewError, Session, SimulationBackend, SubmitOutcome};
use dsim_ingest::{UploadedFile, mapping_coverage, suggest_mapping};
use dsim_model::MappingConfig;
use thiserror::Error;
use tracing::{debug, info};

use crate::render::Renderer;
use crate::settings::read_mapping_file;

pub const PROMPT: &str = "dsim> ";

pub const HELP: &str = "\
Commands:
  open <path>          select a CSV file
  mapping              show the mapping text
  mapping set <json>   replace the mapping text
  mapping load <path>  read the mapping text from a file
  mapping suggest      propose a mapping from the file's header
  mapping reset        restore the default mapping
  submit               run the simulation
  view <name>          table, anomaly, forecast, importance or report
  search [term]        filter predictions by district or state
  show                 print the active view
  status               summarize the workspace
  dismiss              hide the error banner
  help                 show this list
  quit                 leave the shell";

/// One parsed shell line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Open(PathBuf),
    ShowMapping,
    SetMapping(String),
    LoadMapping(PathBuf),
    SuggestMapping,
    ResetMapping,
    Submit,
    View(ActiveView),
    Search(String),
    Show,
    Status,
    Dismiss,
    Help,
    Quit,
    /// Blank line.
    Nothing,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseCommandError {
    #[error("unknown command '{0}' (type 'help' for a list)")]
    Unknown(String),

    #[error("'{command}' needs {what}")]
    MissingArgument {
        command: &'static str,
        what: &'static str,
    },

    #[error(transparent)]
    View(#[from] ParseViewError),
}

/// Parses one input line.
///
/// The first word is the command, matched without regard to case. For
/// `mapping set` and `search` the rest of the line is taken verbatim.
pub fn parse_command(line: &str) -> Result<ShellCommand, ParseCommandError> {
    let line = line.trim();
    let (word, rest) = line
        .split_once(char::is_whitespace)
        .map_or((line, ""), |(word, rest)| (word, rest.trim()));

    let command = match word.to_lowercase().as_str() {
        "" => ShellCommand::Nothing,
        "open" | "file" => ShellCommand::Open(required_path("open", rest)?),
        "mapping" => parse_mapping(rest)?,
        "submit" | "run" => ShellCommand::Submit,
        "view" | "tab" => {
            if rest.is_empty() {
                return Err(ParseCommandError::MissingArgument {
                    command: "view",
                    what: "a view name",
                });
            }
            ShellCommand::View(rest.parse()?)
        }
        "search" => ShellCommand::Search(rest.to_string()),
        "show" => ShellCommand::Show,
        "status" => ShellCommand::Status,
        "dismiss" => ShellCommand::Dismiss,
        "help" | "?" => ShellCommand::Help,
        "quit" | "exit" => ShellCommand::Quit,
        other => {
            // A bare view name switches to that view.
            match other.parse::<ActiveView>() {
                Ok(view) if rest.is_empty() => ShellCommand::View(view),
                _ => return Err(ParseCommandError::Unknown(word.to_string())),
            }
        }
    };
    Ok(command)
}

fn parse_mapping(rest: &str) -> Result<ShellCommand, ParseCommandError> {
    let (action, argument) = rest
        .split_once(char::is_whitespace)
        .map_or((rest, ""), |(action, argument)| (action, argument.trim()));
    match action.to_lowercase().as_str() {
        "" | "show" => Ok(ShellCommand::ShowMapping),
        "set" => {
            if argument.is_empty() {
                return Err(ParseCommandError::MissingArgument {
                    command: "mapping set",
                    what: "the mapping text",
                });
            }
            Ok(ShellCommand::SetMapping(argument.to_string()))
        }
        "load" => Ok(ShellCommand::LoadMapping(required_path(
            "mapping load",
            argument,
        )?)),
        "suggest" => Ok(ShellCommand::SuggestMapping),
        "reset" => Ok(ShellCommand::ResetMapping),
        _ => Err(ParseCommandError::Unknown(format!("mapping {action}"))),
    }
}

fn required_path(command: &'static str, argument: &str) -> Result<PathBuf, ParseCommandError> {
    if argument.is_empty() {
        return Err(ParseCommandError::MissingArgument {
            command,
            what: "a file path",
        });
    }
    Ok(PathBuf::from(argument))
}

/// What the loop should do after a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellStep {
    /// Print this text and read the next line.
    Continue(String),
    Quit,
}

/// A session plus the backend it submits to.
pub struct Shell<'a> {
    session: Session,
    backend: &'a dyn SimulationBackend,
    renderer: Renderer,
}

impl<'a> Shell<'a> {
    pub fn new(session: Session, backend: &'a dyn SimulationBackend, renderer: Renderer) -> Self {
        Self {
            session,
            backend,
            renderer,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Parses and runs one line.
    pub fn handle_line(&mut self, line: &str) -> ShellStep {
        match parse_command(line) {
            Ok(command) => self.execute(command),
            Err(error) => ShellStep::Continue(format!("error: {error}")),
        }
    }

    /// Runs one command against the session.
    pub fn execute(&mut self, command: ShellCommand) -> ShellStep {
        debug!(?command, "Shell command");
        let output = match command {
            ShellCommand::Nothing => String::new(),
            ShellCommand::Quit => return ShellStep::Quit,
            ShellCommand::Help => HELP.to_string(),
            ShellCommand::Open(path) => match self.session.select_path(&path) {
                Ok(()) => self.file_summary(),
                Err(error) => format!("error: {error}"),
            },
            ShellCommand::ShowMapping => self.session.mapping().text().to_string(),
            ShellCommand::SetMapping(text) => {
                self.session.set_mapping_text(text);
                self.coverage_or("Mapping updated.")
            }
            ShellCommand::LoadMapping(path) => match read_mapping_file(&path) {
                Ok(mapping) => {
                    self.session.set_mapping_text(mapping.into_text());
                    self.coverage_or("Mapping loaded.")
                }
                Err(error) => format!("error: {error:#}"),
            },
            ShellCommand::SuggestMapping => self.suggest(),
            ShellCommand::ResetMapping => {
                self.session
                    .set_mapping_text(MappingConfig::default().into_text());
                "Mapping reset to default.".to_string()
            }
            ShellCommand::Submit => self.submit(),
            ShellCommand::View(view) => {
                self.session.set_view(view);
                self.renderer.workspace(&mut self.session)
            }
            ShellCommand::Search(term) => {
                self.session.set_search_term(term);
                if self.session.view() == ActiveView::Table {
                    self.renderer.active_view(&mut self.session)
                } else {
                    format!(
                        "Search set; it applies to the {} view.",
                        ActiveView::Table.label()
                    )
                }
            }
            ShellCommand::Show => self.renderer.workspace(&mut self.session),
            ShellCommand::Status => self.renderer.status(&self.session),
            ShellCommand::Dismiss => {
                self.session.dismiss_error();
                String::new()
            }
        };
        ShellStep::Continue(output)
    }

    /// Reads commands from `input` until `quit` or end of input.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, mut output: W) -> io::Result<()> {
        writeln!(output, "Type 'help' for commands.")?;
        write!(output, "{PROMPT}")?;
        output.flush()?;
        for line in input.lines() {
            match self.handle_line(&line?) {
                ShellStep::Quit => return Ok(()),
                ShellStep::Continue(text) => {
                    if !text.is_empty() {
                        writeln!(output, "{text}")?;
                    }
                }
            }
            write!(output, "{PROMPT}")?;
            output.flush()?;
        }
        writeln!(output)?;
        Ok(())
    }

    fn submit(&mut self) -> String {
        let warnings = self.coverage_warnings();
        let outcome = self.session.submit(self.backend);
        info!(?outcome, "Shell submission finished");
        let body = match outcome {
            SubmitOutcome::NoFile => "Select a CSV file first (open <path>).".to_string(),
            SubmitOutcome::Busy => "A simulation is already running.".to_string(),
            SubmitOutcome::Succeeded => self.renderer.workspace(&mut self.session),
            SubmitOutcome::Failed { message } => self.renderer.banner(&message),
        };
        if warnings.is_empty() {
            body
        } else {
            format!("{warnings}\n{body}")
        }
    }

    fn suggest(&mut self) -> String {
        let Some(headers) = self.session.file().and_then(UploadedFile::headers) else {
            return "Select a CSV file with a header row first.".to_string();
        };
        let suggestion = suggest_mapping(&headers);
        self.session
            .set_mapping_text(suggestion.to_mapping().into_text());
        format!(
            "{}\n{}",
            self.renderer.suggestion(&suggestion),
            self.session.mapping().text()
        )
    }

    fn file_summary(&self) -> String {
        let Some(file) = self.session.file() else {
            return String::new();
        };
        let mut summary = format!("Selected {} ({} bytes).", file.name(), file.len());
        if let Some(headers) = file.headers() {
            summary.push_str(&format!("\nColumns: {}", headers.columns.join(", ")));
        }
        let warnings = self.coverage_warnings();
        if !warnings.is_empty() {
            summary.push('\n');
            summary.push_str(&warnings);
        }
        summary
    }

    fn coverage_or(&self, message: &str) -> String {
        let warnings = self.coverage_warnings();
        if warnings.is_empty() {
            message.to_string()
        } else {
            format!("{message}\n{warnings}")
        }
    }

    /// Advisory warnings for the current mapping and file; empty if either
    /// is missing.
    fn coverage_warnings(&self) -> String {
        match self.session.file().and_then(UploadedFile::headers) {
            Some(headers) => self
                .renderer
                .coverage(&mapping_coverage(self.session.mapping(), &headers)),
            None => String::new(),
        }
    }
}
