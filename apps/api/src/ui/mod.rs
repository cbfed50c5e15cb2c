// The single analyzer page: view state machine, HTML rendering and its two routes.

pub mod handlers;
pub mod render;
pub mod state;
