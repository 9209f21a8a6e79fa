pub mod helpers;
pub mod writer;

pub use crate::config::EventsOutConfig;
pub use helpers::{spawn_mirror, write_outbound_event, write_state_event};
pub use writer::{start_events_out, EventsOutTx};
