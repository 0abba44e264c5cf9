use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use crate::error::OptimizerError;
use crate::scoring::LexicalDiversity;
use crate::PostDraft;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalKind {
    ReplyInvitation,
    LongForm,
    VideoMention,
    LowNegativeRisk,
    MediaSignal,
    Hashtags,
    ExternalLink,
}

impl SignalKind {
    pub fn name(self) -> &'static str {
        match self {
            SignalKind::ReplyInvitation => "reply_invitation",
            SignalKind::LongForm => "long_form",
            SignalKind::VideoMention => "video_mention",
            SignalKind::LowNegativeRisk => "low_negative_risk",
            SignalKind::MediaSignal => "media_signal",
            SignalKind::Hashtags => "hashtags",
            SignalKind::ExternalLink => "external_link",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    pub reply_triggers: Vec<String>,
    pub video_triggers: Vec<String>,
    pub spam_triggers: Vec<String>,
    pub media_triggers: Vec<String>,
    pub diversity_threshold: f64,
    pub long_form_words: usize,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            reply_triggers: words(&[
                "qué piensas",
                "qué opinas",
                "opinas",
                "piensas",
                "opinión",
                "opinion",
                "dime",
                "responde",
                "comparte",
                "cuéntame",
                "cuentame",
                "debate",
            ]),
            video_triggers: words(&[
                "video", "vídeo", "clip", "short", "duración", "duracion", "mp4", "ver", "reel",
            ]),
            spam_triggers: words(&[
                "compra", "venta", "vende", "gratis", "spam", "oferta", "crypto", "bitcoin", "nsfw",
            ]),
            media_triggers: words(&[
                "imagen", "foto", "video", "link", "http", "jpg", "png", "mp4", "gif",
            ]),
            diversity_threshold: 0.8,
            long_form_words: 100,
        }
    }
}

fn words(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

/// Case-insensitive, word-bounded alternation over a list of trigger phrases.
#[derive(Debug, Clone)]
pub struct TriggerSet {
    pattern: Option<Regex>,
}

impl TriggerSet {
    pub fn new(triggers: &[String]) -> Result<Self, OptimizerError> {
        let alternatives: Vec<String> = triggers
            .iter()
            .map(|trigger| trigger.trim())
            .filter(|trigger| !trigger.is_empty())
            .map(regex::escape)
            .collect();
        if alternatives.is_empty() {
            return Ok(Self { pattern: None });
        }

        let source = format!(r"\b(?:{})\b", alternatives.join("|"));
        let pattern = RegexBuilder::new(&source).case_insensitive(true).build()?;
        Ok(Self {
            pattern: Some(pattern),
        })
    }

    pub fn matches(&self, text: &str) -> bool {
        self.pattern
            .as_ref()
            .map(|pattern| pattern.is_match(text))
            .unwrap_or(false)
    }
}

fn hashtag_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"#\w+").expect("valid hashtag pattern"))
}

fn link_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?i)\bhttps?://\S+").expect("valid link pattern"))
}

/// Whitespace token count, never below one.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count().max(1)
}

pub fn has_hashtags(text: &str) -> bool {
    hashtag_pattern().is_match(text)
}

/// Hashtags written in the text, without the leading `#`, in order of appearance.
pub fn extract_hashtags(text: &str) -> Vec<String> {
    hashtag_pattern()
        .find_iter(text)
        .map(|found| found.as_str().trim_start_matches('#').to_string())
        .collect()
}

pub fn has_external_link(text: &str) -> bool {
    link_pattern().is_match(text)
}

/// Everything the detectors read from a draft, computed once.
#[derive(Debug, Clone)]
pub struct ContentView {
    pub combined: String,
    pub word_count: usize,
    pub media_description: Option<String>,
    pub has_video_hint: bool,
    pub link_present: bool,
    pub draft_hashtags: usize,
}

impl ContentView {
    pub fn from_draft(draft: &PostDraft) -> Self {
        let combined = draft.combined_content();
        let word_count = word_count(&combined);
        Self {
            combined,
            word_count,
            media_description: draft.media().map(str::to_string),
            has_video_hint: draft.has_video_hint,
            link_present: draft.link_present,
            draft_hashtags: crate::normalize_hashtags(&draft.hashtags).len(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SignalDetectors {
    reply: TriggerSet,
    video: TriggerSet,
    spam: TriggerSet,
    media: TriggerSet,
    diversity: LexicalDiversity,
    long_form_words: usize,
}

impl SignalDetectors {
    pub fn new(config: &DetectorConfig) -> Result<Self, OptimizerError> {
        if !config.diversity_threshold.is_finite() {
            return Err(OptimizerError::Config(format!(
                "diversity_threshold must be a finite number, got {}",
                config.diversity_threshold
            )));
        }
        Ok(Self {
            reply: TriggerSet::new(&config.reply_triggers)?,
            video: TriggerSet::new(&config.video_triggers)?,
            spam: TriggerSet::new(&config.spam_triggers)?,
            media: TriggerSet::new(&config.media_triggers)?,
            diversity: LexicalDiversity::new(config.diversity_threshold),
            long_form_words: config.long_form_words,
        })
    }

    pub fn long_form_words(&self) -> usize {
        self.long_form_words
    }

    pub fn has_reply_invitation(&self, text: &str) -> bool {
        text.contains('?') || self.reply.matches(text)
    }

    pub fn has_video_mention(&self, text: &str) -> bool {
        self.video.matches(text)
    }

    /// Diverse enough and free of spam triggers. Both must hold.
    pub fn is_low_negative_risk(&self, text: &str, word_count: usize) -> bool {
        self.diversity.is_diverse(text, word_count) && !self.spam.matches(text)
    }

    pub fn has_media_signal(&self, text: &str, media_description: Option<&str>) -> bool {
        self.media.matches(text)
            || text.contains("http")
            || media_description
                .map(|media| !media.trim().is_empty())
                .unwrap_or(false)
    }

    pub fn is_long_form(&self, word_count: usize) -> bool {
        word_count > self.long_form_words
    }

    /// Evaluates one signal, folding in the draft's explicit flags.
    pub fn evaluate(&self, kind: SignalKind, content: &ContentView) -> bool {
        let text = content.combined.as_str();
        match kind {
            SignalKind::ReplyInvitation => self.has_reply_invitation(text),
            SignalKind::LongForm => self.is_long_form(content.word_count),
            SignalKind::VideoMention => content.has_video_hint || self.has_video_mention(text),
            SignalKind::LowNegativeRisk => self.is_low_negative_risk(text, content.word_count),
            SignalKind::MediaSignal => {
                self.has_media_signal(text, content.media_description.as_deref())
            }
            SignalKind::Hashtags => content.draft_hashtags > 0 || has_hashtags(text),
            SignalKind::ExternalLink => content.link_present || has_external_link(text),
        }
    }
}
