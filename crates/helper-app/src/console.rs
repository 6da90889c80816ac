//! Interactive console: the chat and admin tabs over stdin/stdout.

use std::io::Write;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use helper_admin::{AdminOperations, IngestRun};
use helper_chat::{ConversationSession, RejectReason, SubmitOutcome};
use helper_core::types::Role;

use crate::render::{render_metrics, render_turn, HELP_TEXT};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Chat,
    Admin,
}

/// One line of console input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Question(String),
    SwitchTab(Tab),
    Ingest,
    Refresh,
    Help,
    Quit,
    Unknown(String),
}

impl ConsoleCommand {
    /// Lines starting with `/` are commands; anything else is a question.
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        let Some(command) = trimmed.strip_prefix('/') else {
            return ConsoleCommand::Question(line.to_string());
        };
        match command.to_ascii_lowercase().as_str() {
            "chat" => ConsoleCommand::SwitchTab(Tab::Chat),
            "admin" => ConsoleCommand::SwitchTab(Tab::Admin),
            "ingest" => ConsoleCommand::Ingest,
            "refresh" => ConsoleCommand::Refresh,
            "help" | "?" => ConsoleCommand::Help,
            "quit" | "exit" | "q" => ConsoleCommand::Quit,
            _ => ConsoleCommand::Unknown(trimmed.to_string()),
        }
    }
}

/// Terminal front end driving one conversation and one admin view.
pub struct Console<W> {
    session: ConversationSession,
    admin: AdminOperations,
    tab: Tab,
    out: W,
}

impl<W: Write> Console<W> {
    pub fn new(session: ConversationSession, admin: AdminOperations, out: W) -> Self {
        Self {
            session,
            admin,
            tab: Tab::Chat,
            out,
        }
    }

    pub fn tab(&self) -> Tab {
        self.tab
    }

    pub fn session(&self) -> &ConversationSession {
        &self.session
    }

    pub fn admin(&self) -> &AdminOperations {
        &self.admin
    }

    /// Read lines until end of input or `/quit`.
    pub async fn run<R>(&mut self, input: R) -> std::io::Result<()>
    where
        R: AsyncBufRead + Unpin,
    {
        writeln!(self.out, "Policy & Product Helper. Type /help for commands.")?;
        let mut lines = input.lines();
        loop {
            self.prompt()?;
            let Some(line) = lines.next_line().await? else {
                break;
            };
            if !self.handle(&line).await? {
                break;
            }
        }
        writeln!(self.out)?;
        Ok(())
    }

    /// Handle one line; returns `false` when the console should exit.
    pub async fn handle(&mut self, line: &str) -> std::io::Result<bool> {
        match ConsoleCommand::parse(line) {
            ConsoleCommand::Question(text) => self.question(&text).await?,
            ConsoleCommand::SwitchTab(tab) => self.switch_tab(tab).await?,
            ConsoleCommand::Ingest => self.ingest().await?,
            ConsoleCommand::Refresh => self.refresh().await?,
            ConsoleCommand::Help => writeln!(self.out, "{}", HELP_TEXT)?,
            ConsoleCommand::Quit => return Ok(false),
            ConsoleCommand::Unknown(cmd) => {
                writeln!(self.out, "Unknown command {}. Type /help for commands.", cmd)?
            }
        }
        Ok(true)
    }

    fn prompt(&mut self) -> std::io::Result<()> {
        let label = match self.tab {
            Tab::Chat => "chat",
            Tab::Admin => "admin",
        };
        write!(self.out, "{}> ", label)?;
        self.out.flush()
    }

    async fn question(&mut self, text: &str) -> std::io::Result<()> {
        if self.tab == Tab::Admin {
            if !text.trim().is_empty() {
                writeln!(self.out, "Switch to the chat tab (/chat) to ask questions.")?;
            }
            return Ok(());
        }

        self.session.update_draft(text);
        if !text.trim().is_empty() {
            writeln!(self.out, "Thinking...")?;
        }

        let before = self.session.turn_count();
        match self.session.submit(text).await {
            SubmitOutcome::Rejected(RejectReason::Empty) => return Ok(()),
            SubmitOutcome::Rejected(RejectReason::Pending) => {
                writeln!(self.out, "Still waiting for the previous answer.")?;
                return Ok(());
            }
            SubmitOutcome::Answered | SubmitOutcome::Failed(_) => {}
        }

        for turn in self
            .session
            .turns()
            .iter()
            .skip(before)
            .filter(|t| t.role == Role::Assistant)
        {
            writeln!(self.out, "{}", render_turn(turn))?;
        }
        Ok(())
    }

    async fn switch_tab(&mut self, tab: Tab) -> std::io::Result<()> {
        self.tab = tab;
        if tab == Tab::Chat {
            return writeln!(self.out, "Chat. Ask about policies or products.");
        }

        if let Some(Err(e)) = self.admin.activate().await {
            writeln!(self.out, "{}", e)?;
        }
        self.print_metrics()
    }

    async fn ingest(&mut self) -> std::io::Result<()> {
        writeln!(self.out, "Indexing...")?;
        match self.admin.run_ingest().await {
            Ok(IngestRun::Completed(report)) => writeln!(
                self.out,
                "Indexed {} documents ({} chunks).",
                report.indexed_docs, report.indexed_chunks
            )?,
            Ok(IngestRun::Skipped) => writeln!(self.out, "An ingest is already running.")?,
            Err(e) => writeln!(self.out, "{}", e)?,
        }
        self.print_metrics()
    }

    async fn refresh(&mut self) -> std::io::Result<()> {
        if let Err(e) = self.admin.refresh_metrics().await {
            writeln!(self.out, "{}", e)?;
        }
        self.print_metrics()
    }

    fn print_metrics(&mut self) -> std::io::Result<()> {
        writeln!(self.out, "{}", render_metrics(&self.admin.view()))
    }
}
