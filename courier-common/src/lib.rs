pub mod logging;

pub use tracing;

/// Control signal broadcast to long-running service loops.
#[derive(Debug, Clone, Copy)]
pub enum Signal {
    Shutdown,
}
