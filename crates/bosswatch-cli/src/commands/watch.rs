use clap::Args;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;

use bosswatch_core::{
    parse_duration_override, Config, Event, RestoreOutcome, SnapshotStore, TickDriver, Tracker,
    TrackerHandle,
};

use super::{channel_index, resolve_entity};
use crate::render;

const HELP: &str = "commands: kill <boss> <channel> [duration] | status | history | clear | quit";

#[derive(Args)]
pub struct WatchArgs {
    /// Print events as JSON lines
    #[arg(long)]
    pub json: bool,
    /// Also print one event per slot per tick
    #[arg(long)]
    pub ticks: bool,
}

/// A line typed on stdin while watching.
#[derive(Debug, PartialEq, Eq)]
enum Input {
    Kill {
        entity: String,
        channel: usize,
        duration: Option<String>,
    },
    Status,
    History,
    Clear,
    Help,
    Quit,
    Empty,
}

fn parse_input(line: &str) -> Result<Input, String> {
    let mut words = line.split_whitespace();
    let Some(command) = words.next() else {
        return Ok(Input::Empty);
    };

    match command.to_ascii_lowercase().as_str() {
        "kill" | "k" => {
            let entity = words.next().ok_or("usage: kill <boss> <channel> [duration]")?;
            let channel = words
                .next()
                .ok_or("usage: kill <boss> <channel> [duration]")?
                .parse::<usize>()
                .map_err(|_| "channel must be a number".to_string())?;
            Ok(Input::Kill {
                entity: entity.to_string(),
                channel,
                duration: words.next().map(str::to_string),
            })
        }
        "status" | "s" => Ok(Input::Status),
        "history" | "h" => Ok(Input::History),
        "clear" => Ok(Input::Clear),
        "help" | "?" => Ok(Input::Help),
        "quit" | "exit" | "q" => Ok(Input::Quit),
        other => Err(format!("unknown command '{other}'. {HELP}")),
    }
}

pub fn run(args: WatchArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(watch(config, args))
}

async fn watch(config: Config, args: WatchArgs) -> Result<(), Box<dyn std::error::Error>> {
    let store = SnapshotStore::new(config.state_path()?);
    let mut tracker = Tracker::new(&config, store)?;
    tracker.acquire_state_lock()?;
    let mut events = tracker.subscribe();
    match tracker.restore() {
        RestoreOutcome::ColdStart => eprintln!("no saved timers, all channels idle"),
        RestoreOutcome::Resumed(n) => eprintln!("resumed {n} countdown(s)"),
        RestoreOutcome::Degraded => eprintln!("saved timers unreadable, starting idle"),
    }

    let tracker = TrackerHandle::new(tracker);
    let driver = TickDriver::new(tracker.clone(), config.tick_interval()).spawn();
    eprintln!("{HELP}");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = &mut ctrl_c => break,
            line = lines.next_line(), if stdin_open => match line? {
                Some(line) => {
                    match parse_input(&line) {
                        Ok(Input::Quit) => break,
                        Ok(input) => handle_input(&tracker, input),
                        Err(message) => eprintln!("{message}"),
                    }
                }
                None => stdin_open = false,
            },
            event = events.recv() => match event {
                Ok(event) => print_event(&event, &args)?,
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "event output fell behind");
                }
                Err(RecvError::Closed) => break,
            },
        }
    }

    driver.abort();
    Ok(())
}

fn handle_input(tracker: &TrackerHandle, input: Input) {
    match input {
        Input::Kill {
            entity,
            channel,
            duration,
        } => {
            let index = match channel_index(channel) {
                Ok(index) => index,
                Err(message) => {
                    eprintln!("{message}");
                    return;
                }
            };
            let duration_override = duration
                .as_deref()
                .and_then(parse_duration_override)
                .map(i64::from);
            let entity = resolve_entity(tracker.lock().entities(), &entity).to_string();
            if let Err(e) = tracker.mark_killed(&entity, index, duration_override) {
                eprintln!("error: {e}");
            }
        }
        Input::Status => {
            let guard = tracker.lock();
            print!(
                "{}",
                render::status_table(&guard.all_slots(), guard.channel_count())
            );
        }
        Input::History => {
            let entries = tracker.lock().history_entries();
            if entries.is_empty() {
                println!("(no history)");
            }
            for entry in entries {
                println!("{entry}");
            }
        }
        Input::Clear => tracker.clear_history(),
        Input::Help => eprintln!("{HELP}"),
        Input::Quit | Input::Empty => {}
    }
}

fn print_event(event: &Event, args: &WatchArgs) -> Result<(), serde_json::Error> {
    if !args.ticks && matches!(event, Event::SlotTicked { .. }) {
        return Ok(());
    }
    if args.json {
        println!("{}", serde_json::to_string(event)?);
    } else if let Some(line) = render::event_line(event) {
        println!("{line}");
    }
    Ok(())
}
