//! vecdeck-poller — the collection-metadata polling service.
//!
//! Registers, per connection scope, a 5-second job that re-fetches
//! collection metadata from the active client and pushes a
//! [`vecdeck_events::Event::CollectionsChanged`] to subscribed sessions.
//!
//! A tick that fails — `NotConnected`, or the list call erroring because
//! the server went away — stops its own job: a poller must not hammer a
//! dead connection forever. The job stays registered, so an explicit
//! start resumes it after the operator reconnects.

pub mod error;
pub mod service;

pub use error::{PollError, PollResult};
pub use service::{JobName, PollingService, ToggleAction};
