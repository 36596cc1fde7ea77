use clap::Args;
use bosswatch_core::{
    format_remaining, parse_duration_override, Config, CoreError, PersistenceError, Tracker,
};

use super::{channel_index, resolve_entity};

#[derive(Args)]
pub struct KillArgs {
    /// Boss name (case-insensitive)
    pub entity: String,
    /// Channel number, starting at 1
    pub channel: usize,
    /// Respawn time override: seconds, mm:ss or hh:mm:ss
    #[arg(long, short)]
    pub duration: Option<String>,
}

pub fn run(args: KillArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let mut tracker = match Tracker::open(&config) {
        Ok(tracker) => tracker,
        Err(CoreError::Persistence(e @ PersistenceError::Locked { .. })) => {
            let hint = "type `kill` into the running `bosswatch watch` instead";
            return Err(format!("{e}; {hint}").into());
        }
        Err(e) => return Err(e.into()),
    };

    let entity = resolve_entity(tracker.entities(), &args.entity).to_string();
    let channel = channel_index(args.channel)?;
    let duration_override = args
        .duration
        .as_deref()
        .and_then(parse_duration_override)
        .map(i64::from);
    if args.duration.is_some() && duration_override.is_none() {
        tracing::debug!(input = ?args.duration, "ignoring invalid duration override");
    }

    tracker.mark_killed(&entity, channel, duration_override)?;
    let remaining = tracker.get_remaining(&entity, channel)?;
    println!(
        "{entity} channel {}: respawn in {}",
        args.channel,
        format_remaining(remaining)
    );
    Ok(())
}
