// State management module
// Shared configuration, tool registry and the single-run gate

pub mod app_state;

pub use app_state::AppState;
