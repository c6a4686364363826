mod artifact;
mod chat;
mod graph;
mod source;

pub use artifact::*;
pub use chat::*;
pub use graph::*;
pub use source::*;
