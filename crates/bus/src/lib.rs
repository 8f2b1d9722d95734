//! In-process publish/subscribe exchange for world signals.
//!
//! The bus is an explicitly owned instance constructed once at host startup
//! and handed to every producer and consumer -- never a hidden global. Any
//! thread may publish; handlers run synchronously on the publishing thread.

pub mod bus;
pub mod signal;

pub use bus::{SignalBus, SubscriptionId, WILDCARD};
pub use signal::Signal;
