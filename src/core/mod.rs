//! Core controllers
//!
//! The selection set and the search controller. Each owns its own slice of
//! the UI state and knows nothing about the other.

pub mod search_controller;
pub mod selection;

pub use search_controller::{InputOutcome, SearchConfig, SearchController, SearchDispatch};
pub use selection::{AddOutcome, SelectionSet, ToggleOutcome, MAX_SELECTED};
