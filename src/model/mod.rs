pub mod question;
pub mod topic;
pub mod config;
pub mod workspace;

pub use question::*;
pub use topic::*;
pub use config::*;
pub use workspace::*;
