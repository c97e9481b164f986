//! Due-time notifications.
//!
//! [`NotificationSweep`] periodically flags due tasks and hands them to the
//! [`EventBroadcaster`], which fans them out to every connected client.

pub mod broadcaster;
pub mod sweep;

pub use broadcaster::{EventBroadcaster, NotificationEvent, Subscription};
pub use sweep::{NotificationSweep, SweepHandle, SweepReport};
