//! vecdeck-scheduler — keyed periodic background jobs.
//!
//! The [`ScheduleRegistry`] maps a (scope, job-name) key to one running
//! loop. Registration is idempotent-with-replace: installing a job under
//! a live key stops the previous loop first, exactly once. Jobs can be
//! paused and resumed without losing their registration.
//!
//! A plain periodic ticker is the only cadence primitive — the product
//! needs one fixed interval, not a cron grammar.

pub mod registry;

pub use registry::{COLLECTION_POLL_CADENCE, JobKey, JobState, JobTask, ScheduleRegistry};
