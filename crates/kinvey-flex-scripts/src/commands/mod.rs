//! Command implementations.
//!
//! - [`start`] - dev relay in front of the local service
//! - [`deploy`] - versioned deploy through the Kinvey CLI
//! - [`init`] - turn an npm project into a flex service
//! - [`create`] - new service directory, then `init`
//!
//! Each command provides an `execute` function that takes the parsed
//! arguments and returns a Result.

pub mod create;
pub mod deploy;
pub mod init;
pub mod start;
pub(crate) mod utils;

// Re-export execute functions for convenience
pub use create::execute as create_execute;
pub use deploy::execute as deploy_execute;
pub use init::execute as init_execute;
pub use start::execute as start_execute;
