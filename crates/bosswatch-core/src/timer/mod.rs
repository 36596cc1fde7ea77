mod duration;
mod registry;
mod slot;

pub use duration::{effective_duration, format_remaining, parse_duration_override};
pub use registry::{SlotId, SlotView, TimerRegistry};
pub use slot::{SlotState, TickOutcome, TimerSlot};
