use bosswatch_core::{Config, Tracker};

use crate::render;

pub fn run(json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let tracker = Tracker::open_read_only(&config)?;
    let slots = tracker.all_slots();

    if json {
        println!("{}", serde_json::to_string_pretty(&slots)?);
    } else {
        print!("{}", render::status_table(&slots, tracker.channel_count()));
    }
    Ok(())
}
