mod packet;
pub mod constants;

pub use packet::*;
pub use constants::*;
