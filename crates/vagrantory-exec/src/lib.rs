//! vagrantory-exec: Process invocation for the Vagrant CLI
//!
//! Provides the command runner trait and a local implementation that runs the
//! tool inside a given project directory.

pub mod error;
pub mod local;
pub mod result;
pub mod traits;

pub use error::ExecError;
pub use local::LocalExecutor;
pub use result::CommandResult;
pub use traits::CommandRunner;
