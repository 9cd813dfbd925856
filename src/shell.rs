//! Interactive shell: two input fields and two triggers on a terminal.
//!
//! Requests run on spawned tasks and report back over a channel; the
//! event loop is the only place that touches the session, so overlapping
//! submissions resolve last-submission-wins.

use crate::client::LearnerTransport;
use crate::models::{AutodidactError, Result, ServerResponse, TransportError};
use crate::render::{TerminalChart, write_summary};
use crate::session::{Action, Outcome, PendingRequest, Phase, Session};
use std::io::{self, Write};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::debug;

const HELP: &str = "\
Commands:
  example <bits>          set the example field (e.g. 1,0,1,0,1)
  label <label>           set the label field (e.g. 1, 0, ?)
  submit [<bits> <label>] send the current fields (or the given ones)
  reset                   reset the learner and clear the fields
  show                    redraw the current hypothesis
  status                  show fields and request state
  help                    show this help
  quit                    leave the shell";

/// A parsed shell line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    SetExample(String),
    SetLabel(String),
    Submit(Option<(String, String)>),
    Reset,
    Show,
    Status,
    Help,
    Quit,
    Empty,
}

/// Parse one line of shell input.
pub fn parse_command(line: &str) -> std::result::Result<ShellCommand, String> {
    let line = line.trim();
    let (head, rest) = match line.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (line, ""),
    };

    match head.to_ascii_lowercase().as_str() {
        "" => Ok(ShellCommand::Empty),
        "example" | "e" => Ok(ShellCommand::SetExample(rest.to_string())),
        "label" | "l" => Ok(ShellCommand::SetLabel(rest.to_string())),
        "submit" | "s" if rest.is_empty() => Ok(ShellCommand::Submit(None)),
        "submit" | "s" => match rest.rsplit_once(char::is_whitespace) {
            Some((example, label)) => Ok(ShellCommand::Submit(Some((
                example.trim().to_string(),
                label.trim().to_string(),
            )))),
            None => Err("usage: submit <example> <label>".to_string()),
        },
        "reset" | "r" => Ok(ShellCommand::Reset),
        "show" => Ok(ShellCommand::Show),
        "status" => Ok(ShellCommand::Status),
        "help" | "?" => Ok(ShellCommand::Help),
        "quit" | "exit" | "q" => Ok(ShellCommand::Quit),
        other => Err(format!("unknown command '{other}' (try 'help')")),
    }
}

/// Draw the latest projection, or a hint if there is none yet.
pub fn render<T, W>(session: &Session<T, TerminalChart>, out: &mut W) -> io::Result<()>
where
    T: LearnerTransport,
    W: Write,
{
    match (session.projection(), session.surface()) {
        (Some(projection), Some(chart)) => {
            write_summary(out, &projection.summary)?;
            writeln!(out)?;
            chart.draw(out)
        }
        _ => writeln!(out, "No hypothesis yet. Submit an example or reset the learner."),
    }
}

fn terminal_error(e: io::Error) -> AutodidactError {
    AutodidactError::io("writing to terminal", e)
}

type Completion = (PendingRequest, std::result::Result<ServerResponse, TransportError>);

/// Interactive driver around a session.
pub struct Shell<T> {
    session: Session<T, TerminalChart>,
    endpoint: String,
    completions_tx: mpsc::UnboundedSender<Completion>,
    completions_rx: mpsc::UnboundedReceiver<Completion>,
}

impl<T> Shell<T>
where
    T: LearnerTransport + 'static,
{
    pub fn new(session: Session<T, TerminalChart>, endpoint: impl Into<String>) -> Self {
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        Self {
            session,
            endpoint: endpoint.into(),
            completions_tx,
            completions_rx,
        }
    }

    pub fn session(&self) -> &Session<T, TerminalChart> {
        &self.session
    }

    /// Issue `action` and send it in the background.
    fn trigger(&mut self, action: Action, out: &mut impl Write) -> io::Result<()> {
        let request = match self.session.begin(action) {
            Ok(request) => request,
            Err(_) => return self.print_notice(out),
        };

        let transport = Arc::clone(self.session.transport());
        let tx = self.completions_tx.clone();
        tokio::spawn(async move {
            let result = request.send(transport.as_ref()).await;
            // Receiver only goes away when the shell exits
            let _ = tx.send((request, result));
        });

        writeln!(out, "… waiting for learner")
    }

    fn print_notice(&self, out: &mut impl Write) -> io::Result<()> {
        match self.session.notice() {
            Some(notice) => writeln!(out, "! {notice}"),
            None => Ok(()),
        }
    }

    fn on_completion(&mut self, completion: Completion, out: &mut impl Write) -> Result<()> {
        let (request, result) = completion;
        match self.session.complete(&request, result) {
            Outcome::Applied => render(&self.session, out).map_err(terminal_error),
            Outcome::Rejected(e) => self.on_rejected(e, out),
            Outcome::Superseded => Ok(()),
        }
    }

    /// Show the notice for a failed action, or end the shell if the
    /// session cannot go on.
    fn on_rejected(&self, e: AutodidactError, out: &mut impl Write) -> Result<()> {
        if !e.is_recoverable() {
            return Err(e);
        }
        debug!(error = %e, "Action failed");
        self.print_notice(out).map_err(terminal_error)
    }

    /// Handle one input line. Returns `false` when the user quits.
    fn on_line(&mut self, line: &str, out: &mut impl Write) -> io::Result<bool> {
        let command = match parse_command(line) {
            Ok(command) => command,
            Err(message) => {
                writeln!(out, "! {message}")?;
                return Ok(true);
            }
        };

        match command {
            ShellCommand::SetExample(example) => self.session.set_example(example),
            ShellCommand::SetLabel(label) => self.session.set_label(label),
            ShellCommand::Submit(fields) => {
                if let Some((example, label)) = fields {
                    self.session.set_example(example);
                    self.session.set_label(label);
                }
                self.trigger(Action::Submit, out)?;
            }
            ShellCommand::Reset => self.trigger(Action::Reset, out)?,
            ShellCommand::Show => render(&self.session, out)?,
            ShellCommand::Status => {
                let inputs = self.session.inputs();
                writeln!(out, "example: {:?}", inputs.example)?;
                writeln!(out, "label:   {:?}", inputs.label)?;
                let phase = match self.session.phase() {
                    Phase::Idle => "idle",
                    Phase::AwaitingResponse => "awaiting response",
                    Phase::Displaying => "displaying",
                };
                writeln!(out, "state:   {phase}")?;
            }
            ShellCommand::Help => writeln!(out, "{HELP}")?,
            ShellCommand::Quit => return Ok(false),
            ShellCommand::Empty => {}
        }
        Ok(true)
    }

    /// Run until stdin closes or the user quits.
    pub async fn run(mut self) -> Result<()> {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut out = io::stdout();
        writeln!(out, "Learner at {}. Type 'help' for commands.", self.endpoint)
            .map_err(terminal_error)?;

        loop {
            tokio::select! {
                line = lines.next_line() => {
                    let line = line.map_err(|e| AutodidactError::io("reading stdin", e))?;
                    let Some(line) = line else { break };
                    if !self.on_line(&line, &mut out).map_err(terminal_error)? {
                        break;
                    }
                }
                Some(completion) = self.completions_rx.recv() => {
                    self.on_completion(completion, &mut out)?;
                }
            }
            out.flush().map_err(terminal_error)?;
        }

        Ok(())
    }
}
