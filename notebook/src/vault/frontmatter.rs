use serde::Serialize;

use crate::error::Result;

pub const NOTEBOOK_TAG: &str = "ai-notebook";

#[derive(Debug, Serialize)]
pub struct NoteFrontmatter<'a> {
    pub title: &'a str,
    pub created: String,
    pub tags: Vec<&'static str>,
    pub sources: &'a [String],
}

/// Render `---\n{yaml}---\n\n{body}\n`.
pub fn render(frontmatter: &NoteFrontmatter<'_>, body: &str) -> Result<String> {
    let yaml = serde_yaml::to_string(frontmatter)?;

    let mut output = String::with_capacity(yaml.len() + body.len() + 16);
    output.push_str("---\n");
    output.push_str(&yaml);
    output.push_str("---\n\n");
    output.push_str(body.trim_end());
    output.push('\n');
    Ok(output)
}

/// Return the note body without a leading YAML frontmatter block.
///
/// Text without a well-formed block is returned unchanged.
pub fn strip(input: &str) -> &str {
    let Some(rest) = input
        .strip_prefix("---\n")
        .or_else(|| input.strip_prefix("---\r\n"))
    else {
        return input;
    };

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == "---" {
            return rest[offset + line.len()..].trim_start_matches(['\r', '\n']);
        }
        offset += line.len();
    }
    input
}
