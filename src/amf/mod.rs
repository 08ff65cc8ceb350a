mod value;
mod decoder;
mod encoder;

pub use value::*;
pub use decoder::*;
pub use encoder::*;
