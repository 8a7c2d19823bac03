//! The workflow step taxonomy: nodes, their typed configs and conditions.
pub mod condition;
pub mod config;
pub mod container;
pub mod node;

pub use condition::*;
pub use config::*;
pub use container::*;
pub use node::*;
