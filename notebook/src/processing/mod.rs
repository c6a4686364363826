mod loader;
mod parser;

pub use loader::SourceLoader;
pub use parser::{DocumentParser, PlainTextParser};
