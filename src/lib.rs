mod utils;
mod amf;
mod protocol;
mod config;
mod chunk;
mod message;
mod connection;

// Re-export commonly used types at crate root
pub use utils::*;
pub use amf::*;
pub use protocol::*;
pub use config::*;
pub use chunk::*;
pub use message::*;
pub use connection::*;
