mod app;
mod message;
mod screens;
mod state;

pub use app::{FingerprintApp, run};
pub use message::Message;
pub use state::AppState;
