//! State management components
//!
//! The partitioned UI state, the events that change it, the controller that
//! applies them and the event loop that drives the controller.

pub mod controller;
pub mod dispatcher;
pub mod events;
pub mod ui_state;

pub use controller::{AppController, ControllerSettings};
pub use dispatcher::{Runtime, RuntimeHandle, StateSubscriber};
pub use events::{ApiRequest, Event};
pub use ui_state::{CatalogState, LoadingFlags, UiState};
