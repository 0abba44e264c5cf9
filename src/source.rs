//! Turns raw user input (a post URL, free text, a media description) into a
//! [`PostDraft`] for the engine.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use crate::error::OptimizerError;
use crate::{DraftMode, PostDraft};

fn status_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?:x\.com|twitter\.com)/\w+/status/(\d{1,19})")
            .expect("valid status url pattern")
    })
}

/// Extracts the numeric status id from an x.com or twitter.com post URL.
pub fn extract_post_id(url: &str) -> Result<String, OptimizerError> {
    let trimmed = url.trim();
    status_pattern()
        .captures(trimmed)
        .and_then(|captures| captures.get(1))
        .map(|id| id.as_str().to_string())
        .ok_or_else(|| OptimizerError::MalformedUrl(trimmed.to_string()))
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DraftRequest {
    pub url: Option<String>,
    pub text: Option<String>,
    pub media_description: Option<String>,
    #[serde(default)]
    pub hashtags: Vec<String>,
    #[serde(default)]
    pub has_video: bool,
    #[serde(default)]
    pub link_present: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SourcedDraft {
    pub draft: PostDraft,
    pub post_id: Option<String>,
    pub notices: Vec<String>,
}

impl DraftRequest {
    pub fn resolve(self) -> Result<SourcedDraft, OptimizerError> {
        let text = non_blank(self.text);
        let media = non_blank(self.media_description);
        let url = non_blank(self.url);
        let has_content = text.is_some() || media.is_some();

        let mut notices = Vec::new();
        let post_id = match url.as_deref() {
            Some(url) => match extract_post_id(url) {
                Ok(id) => Some(id),
                Err(err) if has_content => {
                    notices.push(format!("{}; analizando en modo manual", err));
                    None
                }
                Err(err) => return Err(err),
            },
            None => None,
        };

        if !has_content && post_id.is_none() {
            return Err(OptimizerError::InvalidInput(
                "no hay contenido suficiente: pega URL, texto o media".to_string(),
            ));
        }

        let mode = if post_id.is_some() {
            DraftMode::LinkDerived
        } else {
            DraftMode::Manual
        };

        let text = match (text, post_id.as_deref()) {
            (Some(text), _) => text,
            (None, Some(id)) if media.is_none() => {
                notices.push(
                    "Modo link sin texto ni media: análisis genérico. Pega el texto del post para más precisión."
                        .to_string(),
                );
                format!(
                    "Post {} enlazado sin texto (supuesto basado en URL).",
                    id
                )
            }
            (None, _) => String::new(),
        };

        let mut draft = PostDraft::new(text)
            .with_hashtags(&self.hashtags)
            .with_video_hint(self.has_video)
            .with_link(self.link_present)
            .with_mode(mode);
        if let Some(media) = media {
            draft = draft.with_media_description(media);
        }

        Ok(SourcedDraft {
            draft,
            post_id,
            notices,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
