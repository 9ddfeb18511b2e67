use std::io::BufRead;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{bail, Context};
use gist_core::{
    update, AppState, DraftFile, Effect, GistDraft, ListSource, Msg, MutationOutcome, Severity,
};
use gist_logging::{gist_debug, gist_info};

use super::cli::{Command, ListArgs};
use super::effects::EffectRunner;
use super::render::{render, render_notice};
use super::shell::{parse_line, ShellCommand, HELP};

const SHELL_POLL: Duration = Duration::from_millis(50);

/// Owns the state machine: feeds it messages, runs its effects and prints what changed.
pub struct Controller {
    state: AppState,
    runner: EffectRunner,
    per_page: u32,
    wait: Duration,
    failed: bool,
}

impl Controller {
    pub fn new(runner: EffectRunner, per_page: u32, wait: Duration) -> Self {
        Self {
            state: AppState::new(),
            runner,
            per_page,
            wait,
            failed: false,
        }
    }

    /// Applies `msg`, prints its notices and hands off its effects. Returns true if any effect ran.
    fn dispatch(&mut self, msg: Msg) -> bool {
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        for notice in state.drain_notices() {
            if notice.severity == Severity::Error {
                self.failed = true;
                eprintln!("{}", render_notice(&notice));
            } else {
                println!("{}", render_notice(&notice));
            }
        }
        self.state = state;
        let issued = !effects.is_empty();
        self.runner.enqueue(effects);
        issued
    }

    /// Dispatches engine messages until one satisfies `done`. Fails once the wait budget is spent.
    fn pump_until(&mut self, mut done: impl FnMut(&Msg) -> bool) -> anyhow::Result<()> {
        let deadline = Instant::now() + self.wait;
        while let Some(left) = deadline.checked_duration_since(Instant::now()) {
            if let Some(msg) = self.runner.next_msg(left) {
                let finished = done(&msg);
                self.dispatch(msg);
                if finished {
                    return Ok(());
                }
            }
        }
        bail!("timed out after {:?} waiting for the server", self.wait)
    }

    fn print_view(&mut self) {
        self.state.consume_dirty();
        print!("{}", render(&self.state.view()));
    }

    fn finish(&self) -> anyhow::Result<()> {
        if self.failed {
            bail!("command failed");
        }
        Ok(())
    }

    pub fn run_command(&mut self, command: Command) -> anyhow::Result<()> {
        match command {
            Command::Public(args) => self.list(ListSource::Public, args),
            Command::Mine(args) => self.list(ListSource::Mine, args),
            Command::Starred(args) => self.list(ListSource::Starred, args),
            Command::Search {
                query,
                page,
                per_page,
            } => self.list(
                ListSource::Search(query),
                ListArgs {
                    page,
                    per_page,
                    filter: None,
                },
            ),
            Command::Show { id } => self.show(id),
            Command::Create {
                files,
                description,
                secret,
            } => self.create(&files, description, !secret),
            Command::Star { id } => self.toggle_star(id, true),
            Command::Unstar { id } => self.toggle_star(id, false),
            Command::Fork { id } => self.fork(id),
            Command::Whoami => self.whoami(),
            Command::Shell => self.shell(),
        }
    }

    fn list(&mut self, source: ListSource, args: ListArgs) -> anyhow::Result<()> {
        // Set the term before the view exists so it does not reset the requested page.
        if let Some(filter) = args.filter {
            self.dispatch(Msg::SearchTermChanged(filter));
        }
        self.dispatch(Msg::ListOpened {
            source,
            page: args.page,
            per_page: args.per_page.unwrap_or(self.per_page),
        });
        self.pump_until(|msg| matches!(msg, Msg::ListLoaded { .. }))?;
        self.print_view();
        self.finish()
    }

    fn show(&mut self, gist_id: String) -> anyhow::Result<()> {
        self.dispatch(Msg::DetailOpened { gist_id });
        self.pump_until(|msg| matches!(msg, Msg::DetailLoaded { .. }))?;
        self.print_view();
        self.finish()
    }

    fn create(&mut self, entries: &[String], description: String, public: bool) -> anyhow::Result<()> {
        let mut files = Vec::with_capacity(entries.len());
        for entry in entries {
            let (name, path) = entry
                .split_once('=')
                .with_context(|| format!("expected NAME=PATH, got {entry:?}"))?;
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {path:?}"))?;
            files.push(DraftFile::new(name, content));
        }
        let draft = GistDraft::with_files(description, public, files);
        draft.validate().context("invalid gist")?;

        self.dispatch(Msg::CreateOpened);
        self.dispatch(Msg::DraftChanged(draft));
        if self.dispatch(Msg::CreateSubmitted) {
            self.pump_until(|msg| matches!(msg, Msg::CreateFinished(_)))?;
            self.print_view();
        }
        self.finish()
    }

    /// Loads the starred set first so the outcome reflects what was already starred.
    fn toggle_star(&mut self, gist_id: String, star: bool) -> anyhow::Result<()> {
        self.runner.enqueue(vec![Effect::RefreshStarred]);
        self.pump_until(|msg| {
            matches!(msg, Msg::StarredChanged(_) | Msg::StarredLoadFailed(_))
        })?;
        if self.failed {
            return self.finish();
        }

        let effect = if star {
            Effect::Star { gist_id }
        } else {
            Effect::Unstar { gist_id }
        };
        self.runner.enqueue(vec![effect]);
        let mut unchanged = false;
        self.pump_until(|msg| match msg {
            Msg::MutationFinished { result, .. } => {
                unchanged = matches!(result, Ok(MutationOutcome::Unchanged));
                true
            }
            _ => false,
        })?;
        if unchanged {
            println!("info: nothing to change");
        }
        self.finish()
    }

    fn fork(&mut self, gist_id: String) -> anyhow::Result<()> {
        self.runner.enqueue(vec![Effect::LoadOwned]);
        self.pump_until(|msg| matches!(msg, Msg::OwnedLoaded(_)))?;
        if self.dispatch(Msg::ForkClicked { gist_id }) {
            self.pump_until(|msg| matches!(msg, Msg::MutationFinished { .. }))?;
        }
        self.finish()
    }

    fn whoami(&mut self) -> anyhow::Result<()> {
        self.runner.enqueue(vec![Effect::VerifyUser]);
        self.pump_until(|msg| matches!(msg, Msg::UserVerified(_)))?;
        if let Some(user) = self.state.view().user {
            println!("{user}");
        }
        self.finish()
    }

    fn shell(&mut self) -> anyhow::Result<()> {
        let (line_tx, line_rx) = mpsc::channel();
        thread::spawn(move || {
            for line in std::io::stdin().lock().lines() {
                let Ok(line) = line else { break };
                if line_tx.send(line).is_err() {
                    break;
                }
            }
        });

        gist_info!("shell started");
        println!("{HELP}");
        self.dispatch(Msg::SessionStarted);
        loop {
            while let Some(msg) = self.runner.next_msg(SHELL_POLL) {
                self.dispatch(msg);
            }
            if self.state.consume_dirty() {
                print!("{}", render(&self.state.view()));
            }
            match line_rx.try_recv() {
                Ok(line) => {
                    gist_debug!("shell input {line:?}");
                    match parse_line(&line) {
                        Ok(Some(ShellCommand::Quit)) => break,
                        Ok(Some(command)) => self.shell_command(command),
                        Ok(None) => {}
                        Err(usage) => eprintln!("{usage}"),
                    }
                }
                Err(mpsc::TryRecvError::Empty) => {}
                Err(mpsc::TryRecvError::Disconnected) => break,
            }
        }
        self.dispatch(Msg::ViewClosed);
        Ok(())
    }

    fn shell_command(&mut self, command: ShellCommand) {
        let current_page = self.state.view().page.page;
        let msg = match command {
            ShellCommand::List(source) => Msg::ListOpened {
                source,
                page: 1,
                per_page: self.per_page,
            },
            ShellCommand::Open(gist_id) => Msg::DetailOpened { gist_id },
            ShellCommand::Page(page) => Msg::PageChanged(page),
            ShellCommand::Next => Msg::PageChanged(current_page.saturating_add(1)),
            ShellCommand::Prev => Msg::PageChanged(current_page.saturating_sub(1).max(1)),
            ShellCommand::Filter(term) => {
                self.runner.publish_search_term(&term);
                return;
            }
            ShellCommand::Star(gist_id) => Msg::StarToggled { gist_id },
            ShellCommand::Fork(gist_id) => Msg::ForkClicked { gist_id },
            ShellCommand::Close => Msg::ViewClosed,
            ShellCommand::Help => {
                println!("{HELP}");
                return;
            }
            ShellCommand::Quit => return,
        };
        self.dispatch(msg);
    }
}
