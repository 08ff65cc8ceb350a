mod chunker;
mod header;
mod reader;
mod stream;
mod writer;

pub use chunker::*;
pub use header::*;
pub use reader::*;
pub use stream::*;
pub use writer::*;
