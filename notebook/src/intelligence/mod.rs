pub mod citations;
pub mod graph;
pub mod keywords;

pub use citations::extract_citations;
pub use graph::KnowledgeGraphService;
pub use keywords::extract_keywords;
