//! Interaction execution
//!
//! Runs one descriptor through the turn channel, classifying each response
//! and dispatching control events to a prioritized handler table.

mod classifier;
mod executor;
mod handlers;

pub use classifier::{classify, Classification, EventKind};
pub use executor::{Interaction, MAX_RESPOND_CHAIN};
pub use handlers::{CustomHandler, EventHandler, EventPattern, HandlerAction, HandlerTable};
