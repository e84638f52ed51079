pub mod config;
pub mod node;

pub use config::Config;
pub use node::*;
