mod event_sink;
mod relay_event;

pub use event_sink::*;
pub use relay_event::*;
