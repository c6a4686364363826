use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactType {
    Faq,
    StudyGuide,
    PodcastScript,
    NotebookGuide,
    Summary,
    Outline,
    Timeline,
    BriefingDoc,
}

impl ArtifactType {
    pub const ALL: [ArtifactType; 8] = [
        ArtifactType::Faq,
        ArtifactType::StudyGuide,
        ArtifactType::PodcastScript,
        ArtifactType::NotebookGuide,
        ArtifactType::Summary,
        ArtifactType::Outline,
        ArtifactType::Timeline,
        ArtifactType::BriefingDoc,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Faq => "FAQ",
            Self::StudyGuide => "Study Guide",
            Self::PodcastScript => "Podcast Script",
            Self::NotebookGuide => "Notebook Guide",
            Self::Summary => "Summary",
            Self::Outline => "Outline",
            Self::Timeline => "Timeline",
            Self::BriefingDoc => "Briefing Document",
        }
    }
}

impl std::fmt::Display for ArtifactType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Faq => write!(f, "faq"),
            Self::StudyGuide => write!(f, "study_guide"),
            Self::PodcastScript => write!(f, "podcast_script"),
            Self::NotebookGuide => write!(f, "notebook_guide"),
            Self::Summary => write!(f, "summary"),
            Self::Outline => write!(f, "outline"),
            Self::Timeline => write!(f, "timeline"),
            Self::BriefingDoc => write!(f, "briefing_doc"),
        }
    }
}

impl std::str::FromStr for ArtifactType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "faq" => Ok(Self::Faq),
            "study_guide" | "studyguide" => Ok(Self::StudyGuide),
            "podcast_script" | "podcast" => Ok(Self::PodcastScript),
            "notebook_guide" | "guide" => Ok(Self::NotebookGuide),
            "summary" => Ok(Self::Summary),
            "outline" => Ok(Self::Outline),
            "timeline" => Ok(Self::Timeline),
            "briefing_doc" | "briefing" => Ok(Self::BriefingDoc),
            _ => Err(format!("Unknown artifact type: {s}")),
        }
    }
}

/// A generated document derived from the included sources. Never mutated
/// after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artifact {
    pub id: String,
    #[serde(rename = "type")]
    pub artifact_type: ArtifactType,
    pub title: String,
    pub content: String,
    pub generated_at: DateTime<Utc>,
    pub source_names: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub citations: Vec<String>,
}

impl Artifact {
    pub fn new(
        artifact_type: ArtifactType,
        title: String,
        content: String,
        source_names: Vec<String>,
        citations: Vec<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            artifact_type,
            title,
            content,
            generated_at: Utc::now(),
            source_names,
            citations,
        }
    }
}
