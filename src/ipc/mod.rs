mod error;
mod handlers;
mod helpers;
mod router;
mod types;

pub(crate) use handlers::core::open_workspace;
pub use router::handle_request;
pub use types::{AppState, Request};
