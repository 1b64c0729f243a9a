// Server module entry point
// Listener creation, the sequential serve loop and shutdown signals

pub mod connection;
pub mod listener;
pub mod signal;

// `loop` is a keyword, so the file is mounted as server_loop
#[path = "loop.rs"]
pub mod server_loop;

pub use listener::bind_listener;
pub use server_loop::serve;
pub use signal::ShutdownSignal;
