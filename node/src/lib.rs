//! The arena backend node: configuration, subsystem wiring, the periodic
//! auto-resolution scheduler, metrics, and graceful shutdown.

pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod node;
pub mod scheduler;
pub mod shutdown;

pub use config::ArenaConfig;
pub use error::NodeError;
pub use logging::{init_logging, LogFormat};
pub use metrics::ArenaMetrics;
pub use node::ArenaNode;
pub use scheduler::SweepScheduler;
pub use shutdown::ShutdownController;
