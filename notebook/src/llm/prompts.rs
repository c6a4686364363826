//! Prompts for asking questions, generating artifacts and suggesting
//! follow-ups.
//!
//! Every prompt embeds the aggregated source context verbatim and asks the
//! model to cite sources as `[Name]`, the form `extract_citations` reads back.

use crate::models::{ArtifactType, ChatMessage};

/// Number of prior chat messages replayed into a question prompt.
pub const MAX_HISTORY_MESSAGES: usize = 6;

/// Number of follow-up questions requested by default.
pub const DEFAULT_FOLLOW_UP_COUNT: usize = 3;

/// Generate the system instruction used for every grounded request
///
/// Tells the model to stay within the provided sources and to cite them by
/// name in square brackets, which is what citation extraction looks for.
///
/// # Arguments
/// * `language` - Optional response language preference
///
/// # Example
/// ```
/// use notebook::llm::prompts::grounded_system_instruction;
///
/// let instruction = grounded_system_instruction(Some("German"));
/// assert!(instruction.contains("Respond in German."));
/// ```
pub fn grounded_system_instruction(language: Option<&str>) -> String {
    let language_line = match language.map(str::trim).filter(|l| !l.is_empty()) {
        Some(language) => format!("\nRespond in {language}."),
        None => String::new(),
    };

    format!(
        r#"You are a research assistant working strictly from the user's sources.
Base every statement on the provided sources. If the sources do not contain the answer, say so plainly instead of guessing.
Cite the source of each claim by its exact name in square brackets, for example [Lecture Notes.pdf].
Format your answer as Markdown.{language_line}"#
    )
}

/// Generate the prompt for answering a question over the aggregated context
///
/// # Arguments
/// * `context` - The aggregated, delimited source context
/// * `history` - Prior chat messages; only the last few are included
/// * `question` - The user's question
///
/// # Example
/// ```
/// use notebook::llm::prompts::question_prompt;
///
/// let prompt = question_prompt("--- SOURCE: a.md ---\nRust\n--- END SOURCE: a.md ---", &[], "What is Rust?");
/// assert!(prompt.contains("What is Rust?"));
/// assert!(!prompt.contains("Conversation so far"));
/// ```
pub fn question_prompt(context: &str, history: &[ChatMessage], question: &str) -> String {
    let start = history.len().saturating_sub(MAX_HISTORY_MESSAGES);
    let conversation = history[start..]
        .iter()
        .map(|msg| format!("[{}]: {}", msg.role, msg.content))
        .collect::<Vec<_>>()
        .join("\n");

    let conversation_section = if conversation.is_empty() {
        String::new()
    } else {
        format!("Conversation so far:\n{conversation}\n\n")
    };

    format!(
        r#"Sources:
{context}

{conversation_section}Question: {question}

Answer using only the sources above and cite them as [Source Name]."#
    )
}

fn artifact_instructions(artifact_type: ArtifactType) -> &'static str {
    match artifact_type {
        ArtifactType::Faq => {
            "Write a FAQ of 8 to 12 questions a reader of these sources would ask. \
Use a level-3 heading for each question followed by a concise answer."
        }
        ArtifactType::StudyGuide => {
            "Write a study guide with these sections: Key Concepts (term and definition), \
Short-Answer Quiz (5 questions), Answer Key, and Essay Questions (3 prompts)."
        }
        ArtifactType::PodcastScript => {
            "Write a conversational podcast script between two hosts, HOST A and HOST B, \
discussing the sources. Open with a hook, cover the main ideas in order and close with a recap. \
Prefix every line with the speaker label."
        }
        ArtifactType::NotebookGuide => {
            "Write a notebook guide: a one-paragraph overview of what the sources cover, \
a bulleted list of the main topics, and five suggested questions to explore next."
        }
        ArtifactType::Summary => {
            "Write an executive summary of the sources in three to five paragraphs, \
leading with the single most important takeaway."
        }
        ArtifactType::Outline => {
            "Write a hierarchical outline of the sources using nested Markdown bullet lists, \
at most three levels deep."
        }
        ArtifactType::Timeline => {
            "Write a chronological timeline of the events and dates in the sources as a bulleted list, \
followed by a short cast of the people involved."
        }
        ArtifactType::BriefingDoc => {
            "Write a briefing document: Executive Summary, Key Themes (with supporting quotes), \
Open Questions and Recommended Next Steps."
        }
    }
}

/// Generate the prompt for a derivative artifact
///
/// # Arguments
/// * `artifact_type` - Which artifact to generate
/// * `context` - The aggregated, delimited source context
///
/// # Example
/// ```
/// use notebook::llm::prompts::artifact_prompt;
/// use notebook::models::ArtifactType;
///
/// let prompt = artifact_prompt(ArtifactType::Faq, "--- SOURCE: a.md ---\ntext");
/// assert!(prompt.contains("FAQ"));
/// ```
pub fn artifact_prompt(artifact_type: ArtifactType, context: &str) -> String {
    let name = artifact_type.display_name();
    let instructions = artifact_instructions(artifact_type);

    format!(
        r#"Create a {name} from the sources below.

{instructions}

Cite the sources you draw from as [Source Name]. Return only the Markdown document, no preamble.

Sources:
{context}"#
    )
}

/// Generate the prompt for suggesting follow-up questions
///
/// # Arguments
/// * `context` - The aggregated, delimited source context
/// * `question` - The last question the user asked
/// * `answer` - The assistant's answer to it
/// * `count` - How many questions to request
///
/// # Example
/// ```
/// use notebook::llm::prompts::follow_up_prompt;
///
/// let prompt = follow_up_prompt("ctx", "What is ownership?", "Ownership is...", 3);
/// assert!(prompt.contains("3 follow-up questions"));
/// ```
pub fn follow_up_prompt(context: &str, question: &str, answer: &str, count: usize) -> String {
    format!(
        r#"Based on the sources and the exchange below, suggest {count} follow-up questions the user could ask next.
Each question must be answerable from the sources and must not repeat the original question.

Sources:
{context}

Question: {question}

Answer: {answer}

Respond with exactly {count} follow-up questions, one per line, with no numbering and no explanation."#
    )
}

/// Parse a follow-up response into questions
///
/// Accepts one question per line and tolerates bullets (`-`, `*`, `•`) and
/// numbering (`1.`, `2)`) even though the prompt asks for neither.
pub fn parse_follow_up_questions(response: &str, max: usize) -> Vec<String> {
    response
        .lines()
        .map(strip_list_marker)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .take(max)
        .collect()
}

fn strip_list_marker(line: &str) -> &str {
    let line = line.trim();
    let line = line
        .strip_prefix(['-', '*', '•'])
        .map(str::trim_start)
        .unwrap_or(line);

    let digits = line.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits > 0 {
        let rest = &line[digits..];
        if let Some(stripped) = rest.strip_prefix(['.', ')']) {
            return stripped.trim();
        }
    }

    line.trim_matches('"').trim()
}
