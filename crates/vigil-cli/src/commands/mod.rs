//! Command implementations.

pub mod check;
pub mod config;
pub mod evict;
pub mod lookup;
pub mod sweep;
pub mod watch;

pub use self::check::execute_check;
pub use self::config::execute_config;
pub use self::evict::{execute_clear, execute_evict};
pub use self::lookup::execute_lookup;
pub use self::sweep::execute_sweep;
pub use self::watch::execute_watch;
