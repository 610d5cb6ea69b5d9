//! Download cycle orchestration.
//!
//! [`SessionController`] owns the framer/sink pair of the current cycle and
//! walks it through `Idle → HeaderScan → BodyStream → Complete → Idle`,
//! reporting every line, progress step, and terminal outcome to an
//! [`Observer`]. The async drivers in this module pull bytes from a
//! [`ByteFeed`](crate::feed::ByteFeed) into the controller in arrival order.

mod config;
mod controller;
mod driver;
mod error;
mod event;

pub use config::{DEFAULT_IDLE_TIMEOUT_SECS, SessionConfig};
pub use controller::{SessionController, SessionState};
pub use driver::{pump, run_session};
pub use error::SessionError;
pub use event::{Observer, SessionEvent};
