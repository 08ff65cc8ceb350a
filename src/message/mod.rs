mod aggregate;
mod command;
mod control;
mod data;
mod factory;
mod media;
mod rtmp_message;
mod shared_object;
mod types;
mod user_control;

pub use aggregate::*;
pub use command::{CommandAmf0, CommandAmf3};
pub use control::*;
pub use data::*;
pub use factory::*;
pub use media::*;
pub use rtmp_message::*;
pub use shared_object::*;
pub use types::*;
pub use user_control::*;
