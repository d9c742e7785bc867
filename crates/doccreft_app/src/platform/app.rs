use std::collections::VecDeque;
use std::io::{self, BufRead};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use doccreft_core::{update, AppState, Msg};
use doccreft_engine::{ClientSettings, EngineHandle};
use doccreft_logging::{dc_debug, dc_info, dc_warn};

use super::cli::Cli;
use super::config::{load_config, AppConfig};
use super::effects::{EffectRunner, EffectSink};
use super::logging;
use super::ui::commands::{parse_command, ShellCommand, HELP};
use super::ui::render::render;

/// Everything the shell loop reacts to.
pub enum Input {
    User(ShellCommand),
    Background(Msg),
    EndOfInput,
}

pub fn run_app() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let loaded = load_config(&cli.config);
    let (mut config, config_error) = match loaded {
        Ok(config) => (config, None),
        Err(err) => (AppConfig::default(), Some(err)),
    };
    config.apply_cli(&cli);

    logging::initialize(config.log_destination);
    if let Some(err) = config_error {
        dc_warn!("using default configuration: {}", err);
        eprintln!("Warning: {err}; using defaults");
    }
    dc_info!("doccreft starting against {}", config.api_base);

    let settings = config.client_settings();
    let (engine, events) = EngineHandle::new(settings.clone(), config.download_dir.clone())
        .context("failed to start the network worker")?;

    let (input_tx, input_rx) = mpsc::channel::<Input>();
    let runner = EffectRunner::new(engine, events, input_tx.clone());

    spawn_stdin_reader(input_tx.clone());
    spawn_counter_ticker(input_tx, config.counter_interval());

    let mut shell = Shell::new(runner, settings);
    if let Some(mode) = cli.mode {
        shell.dispatch(Msg::ModeSelected(mode.into()));
    }
    if !cli.files.is_empty() {
        shell.dispatch(Msg::FilesSelected(cli.files));
    }
    shell.render(true);

    for input in input_rx {
        if shell.handle(input) {
            break;
        }
    }
    dc_info!("doccreft exiting");
    Ok(())
}

fn spawn_stdin_reader(tx: mpsc::Sender<Input>) {
    thread::spawn(move || read_commands(io::stdin().lock(), &tx));
}

/// Feeds parsed lines to the shell until end of input.
///
/// Lines are decoded lossily so stray non-UTF-8 bytes only spoil that line.
fn read_commands(mut reader: impl BufRead, tx: &mpsc::Sender<Input>) {
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) => break,
            Ok(_) => {}
            Err(err) => {
                dc_warn!("stdin read failed: {}", err);
                break;
            }
        }
        let line = String::from_utf8_lossy(&buf);
        match parse_command(&line) {
            Ok(Some(command)) => {
                if tx.send(Input::User(command)).is_err() {
                    return;
                }
            }
            Ok(None) => {}
            Err(message) => eprintln!("{message}"),
        }
    }
    let _ = tx.send(Input::EndOfInput);
}

/// Refreshes the usage counter right away and then on every interval.
fn spawn_counter_ticker(tx: mpsc::Sender<Input>, interval: Duration) {
    thread::spawn(move || {
        while tx.send(Input::Background(Msg::CounterTick)).is_ok() {
            thread::sleep(interval);
        }
    });
}

struct Shell<S: EffectSink> {
    state: AppState,
    runner: S,
    settings: ClientSettings,
    waiting: bool,
    deferred: VecDeque<ShellCommand>,
    input_closed: bool,
}

impl<S: EffectSink> Shell<S> {
    fn new(runner: S, settings: ClientSettings) -> Self {
        Self {
            state: AppState::new(),
            runner,
            settings,
            waiting: false,
            deferred: VecDeque::new(),
            input_closed: false,
        }
    }

    /// Returns true when the shell should stop.
    fn handle(&mut self, input: Input) -> bool {
        match input {
            Input::Background(msg) => {
                self.dispatch(msg);
                self.render(false);
            }
            Input::User(command) if self.waiting => self.deferred.push_back(command),
            Input::User(command) => {
                if self.command(command) {
                    return true;
                }
            }
            Input::EndOfInput => self.input_closed = true,
        }
        self.drain_deferred()
    }

    /// Replays commands held back by `wait` once nothing is in flight.
    fn drain_deferred(&mut self) -> bool {
        if self.waiting && self.state.pending() == 0 {
            dc_debug!("wait finished; {} deferred commands", self.deferred.len());
            self.waiting = false;
        }
        while !self.waiting {
            let Some(command) = self.deferred.pop_front() else {
                break;
            };
            if self.command(command) {
                return true;
            }
        }
        self.input_closed && !self.waiting && self.state.pending() == 0
    }

    /// Returns true on `quit`.
    fn command(&mut self, command: ShellCommand) -> bool {
        match command {
            ShellCommand::Dispatch(msg) => {
                self.dispatch(msg);
                self.render(false);
            }
            ShellCommand::Wait => self.waiting = self.state.pending() > 0,
            ShellCommand::Show => self.render(true),
            ShellCommand::Help => println!("{HELP}"),
            ShellCommand::Quit => return true,
        }
        false
    }

    fn dispatch(&mut self, msg: Msg) {
        let state = std::mem::take(&mut self.state);
        let (state, effects) = update(state, msg);
        self.state = state;
        self.runner.run(effects);
    }

    fn render(&mut self, force: bool) {
        let dirty = self.state.consume_dirty();
        if !(dirty || force) {
            return;
        }
        for line in render(&self.state.view(), &self.settings) {
            println!("{line}");
        }
        println!();
    }
}
