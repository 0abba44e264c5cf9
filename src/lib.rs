pub mod config;
pub mod error;
pub mod prompt;
pub mod rewrite;
pub mod scoring;
pub mod source;

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::str::FromStr;
use std::sync::OnceLock;

use crate::config::EngineConfig;
use crate::error::OptimizerError;
use crate::scoring::{LexiconReport, ScoringPipeline};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DraftMode {
    #[default]
    Manual,
    LinkDerived,
}

impl DraftMode {
    pub fn label(self) -> &'static str {
        match self {
            DraftMode::Manual => "manual",
            DraftMode::LinkDerived => "link",
        }
    }
}

/// A post draft as submitted for analysis.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PostDraft {
    pub text: String,
    pub media_description: Option<String>,
    pub hashtags: Vec<String>,
    pub has_video_hint: bool,
    pub link_present: bool,
    pub mode: DraftMode,
}

impl PostDraft {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn with_media_description(mut self, description: impl Into<String>) -> Self {
        let description = description.into();
        self.media_description = if description.trim().is_empty() {
            None
        } else {
            Some(description)
        };
        self
    }

    pub fn with_hashtags<I, S>(mut self, hashtags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let raw: Vec<String> = hashtags
            .into_iter()
            .map(|tag| tag.as_ref().to_string())
            .collect();
        self.hashtags = normalize_hashtags(&raw);
        self
    }

    pub fn with_video_hint(mut self, has_video: bool) -> Self {
        self.has_video_hint = has_video;
        self
    }

    pub fn with_link(mut self, link_present: bool) -> Self {
        self.link_present = link_present;
        self
    }

    pub fn with_mode(mut self, mode: DraftMode) -> Self {
        self.mode = mode;
        self
    }

    /// Media description with surrounding whitespace removed, `None` when blank.
    pub fn media(&self) -> Option<&str> {
        self.media_description
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }

    /// Text and media description joined by a single space.
    pub fn combined_content(&self) -> String {
        match self.media() {
            Some(media) => format!("{} {}", self.text, media),
            None => self.text.clone(),
        }
    }

    pub fn require_text(&self) -> Result<(), OptimizerError> {
        if self.text.trim().is_empty() {
            return Err(OptimizerError::InvalidInput(
                "post text is required".to_string(),
            ));
        }
        Ok(())
    }
}

/// Strips a leading `#`, trims and drops empty or repeated (case-insensitive) tags.
pub fn normalize_hashtags(raw: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut tags = Vec::new();
    for tag in raw {
        let cleaned = tag.trim().trim_start_matches('#').trim();
        if cleaned.is_empty() {
            continue;
        }
        if seen.insert(cleaned.to_lowercase()) {
            tags.push(cleaned.to_string());
        }
    }
    tags
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signal {
    pub name: String,
    pub passed: bool,
    pub points: i32,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScoreTier {
    Low,
    Medium,
    High,
}

impl ScoreTier {
    pub fn from_score(score: u8) -> Self {
        if score < 40 {
            ScoreTier::Low
        } else if score < 70 {
            ScoreTier::Medium
        } else {
            ScoreTier::High
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ScoreTier::Low => "Low",
            ScoreTier::Medium => "Medium",
            ScoreTier::High => "High",
        }
    }
}

pub const MAX_SCORE: u8 = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub signals: Vec<Signal>,
    pub total_score: u8,
    pub tier: ScoreTier,
}

impl ScoreBreakdown {
    /// Points left to the ceiling, the "remainder" slice of a score chart.
    pub fn remainder(&self) -> u8 {
        MAX_SCORE - self.total_score
    }

    pub fn signal(&self, name: &str) -> Option<&Signal> {
        self.signals.iter().find(|signal| signal.name == name)
    }

    pub fn failing(&self) -> impl Iterator<Item = &Signal> {
        self.signals.iter().filter(|signal| !signal.passed)
    }
}

/// Output of the weighted strategy: score breakdown plus the rewritten draft.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostAnalysis {
    pub draft_id: String,
    pub breakdown: ScoreBreakdown,
    pub optimized_text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringStrategy {
    #[default]
    Weighted,
    LexiconBlend,
}

impl FromStr for ScoringStrategy {
    type Err = OptimizerError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "weighted" | "signals" | "default" => Ok(ScoringStrategy::Weighted),
            "lexicon" | "lexicon_blend" | "blend" | "sentiment" => {
                Ok(ScoringStrategy::LexiconBlend)
            }
            _ => Err(OptimizerError::Config(format!("unknown strategy: {}", value))),
        }
    }
}

impl ScoringStrategy {
    pub fn label(self) -> &'static str {
        match self {
            ScoringStrategy::Weighted => "weighted",
            ScoringStrategy::LexiconBlend => "lexicon",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum StrategyOutcome {
    Weighted(PostAnalysis),
    LexiconBlend {
        draft_id: String,
        report: LexiconReport,
        optimized_text: String,
    },
}

impl StrategyOutcome {
    pub fn optimized_text(&self) -> &str {
        match self {
            StrategyOutcome::Weighted(analysis) => &analysis.optimized_text,
            StrategyOutcome::LexiconBlend { optimized_text, .. } => optimized_text,
        }
    }

    pub fn draft_id(&self) -> &str {
        match self {
            StrategyOutcome::Weighted(analysis) => &analysis.draft_id,
            StrategyOutcome::LexiconBlend { draft_id, .. } => draft_id,
        }
    }
}

fn default_pipeline() -> &'static ScoringPipeline {
    static PIPELINE: OnceLock<ScoringPipeline> = OnceLock::new();
    PIPELINE.get_or_init(|| {
        ScoringPipeline::from_config(&EngineConfig::default())
            .expect("default engine config compiles")
    })
}

/// Scores and rewrites a draft with the built-in signal table.
pub fn analyze(draft: &PostDraft) -> PostAnalysis {
    default_pipeline().analyze(draft)
}

/// Runs the lexicon blend strategy with the built-in word lists.
pub fn blend(draft: &PostDraft) -> LexiconReport {
    default_pipeline().blend(draft)
}

/// Stable identifier for a draft's combined content.
pub fn draft_fingerprint(draft: &PostDraft) -> String {
    format!("draft_{:x}", stable_hash64(&draft.combined_content()))
}

fn stable_hash64(value: &str) -> u64 {
    use sha2::{Digest, Sha256};

    let mut hasher = Sha256::new();
    hasher.update(value.as_bytes());
    let digest = hasher.finalize();
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_be_bytes(bytes)
}

pub fn clamp01(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.max(0.0).min(1.0)
}

pub fn format_float(value: f64, digits: usize) -> String {
    format!("{:.1$}", value, digits)
}
