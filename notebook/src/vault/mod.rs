mod frontmatter;
mod obsidian;

pub use obsidian::{sanitize_title, ObsidianVault, NOTEBOOK_FOLDER};
