use serde::{Deserialize, Serialize};
use post_optimizer::source::{DraftRequest, SourcedDraft};
use post_optimizer::{ScoringStrategy, StrategyOutcome};

use crate::enrichment::Enrichment;

#[derive(Debug, Deserialize)]
pub struct ApiAnalyzeRequest {
    pub request_id: Option<String>,
    pub url: Option<String>,
    pub text: Option<String>,
    pub media_description: Option<String>,
    pub hashtags: Option<Vec<String>>,
    pub has_video: Option<bool>,
    pub link_present: Option<bool>,
    pub strategy: Option<String>,
    pub enrich: Option<bool>,
}

impl ApiAnalyzeRequest {
    pub fn into_draft(self) -> Result<(SourcedDraft, Option<ScoringStrategy>), String> {
        let strategy = match self.strategy.as_deref() {
            Some(value) => Some(
                value
                    .parse::<ScoringStrategy>()
                    .map_err(|_| format!("invalid strategy: {}", value))?,
            ),
            None => None,
        };

        let request = DraftRequest {
            url: self.url,
            text: self.text,
            media_description: self.media_description,
            hashtags: self.hashtags.unwrap_or_default(),
            has_video: self.has_video.unwrap_or(false),
            link_present: self.link_present.unwrap_or(false),
        };
        let sourced = request.resolve().map_err(|err| err.to_string())?;
        Ok((sourced, strategy))
    }
}

#[derive(Debug, Serialize)]
pub struct ApiAnalyzeResponse {
    pub request_id: String,
    pub post_id: Option<String>,
    pub mode: String,
    pub result: StrategyOutcome,
    pub prompt: String,
    pub enrichment: Option<Enrichment>,
    pub warnings: Vec<String>,
}
