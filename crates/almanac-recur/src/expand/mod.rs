//! Recurrence expansion.
//!
//! The stepper computes one next occurrence, the expander drives it across a
//! query window, and the materializer turns each kept date into an instance.

mod expander;
mod materialize;
mod stepper;
mod window;

pub use expander::{ExpansionOptions, Occurrences, SeedMode, expand};
pub use materialize::{expand_instances, instance_id, materialize};
pub use stepper::next_occurrence;
pub use window::ExpansionWindow;
