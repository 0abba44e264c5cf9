use serde::{Deserialize, Serialize};

use crate::scoring::detectors::has_hashtags;
use crate::scoring::{ContentView, SignalDetectors, SignalKind};
use crate::{normalize_hashtags, PostDraft};

const CLAUSE_SEPARATOR: &str = "\n\n";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RewriteConfig {
    pub fallback_hashtags: Vec<String>,
    pub reply_clause: String,
    pub context_clause: String,
    pub video_clause: String,
    pub media_clause: String,
    pub media_label: String,
    pub link_clause: String,
    pub include_video_clause: bool,
    pub include_media_clause: bool,
}

impl Default for RewriteConfig {
    fn default() -> Self {
        Self {
            fallback_hashtags: vec!["NoticiasGlobales".to_string(), "Actualidad".to_string()],
            reply_clause: "¿Qué opinas sobre esto? ¡Comparte en replies! 👇".to_string(),
            context_clause: "Contexto adicional: Amplía con detalles específicos para más dwell time. Usa threads: 1/3 Intro, 2/3 Análisis, 3/3 Conclusión.".to_string(),
            video_clause: "Video: Acompaña el post con un clip corto y un hook en los primeros 3 segundos.".to_string(),
            media_clause: "Imagen: Añade una foto o un link visual para mejorar P(click).".to_string(),
            media_label: "Media".to_string(),
            link_clause: "Fuente: [Agrega link relevante aquí para aumentar engagement]".to_string(),
            include_video_clause: true,
            include_media_clause: true,
        }
    }
}

/// Appends remediation clauses to a draft. Every check runs against the
/// original content, so the output never depends on earlier clauses.
#[derive(Debug, Clone)]
pub struct RewriteGenerator {
    config: RewriteConfig,
}

impl RewriteGenerator {
    pub fn new(config: RewriteConfig) -> Self {
        Self { config }
    }

    pub fn rewrite(&self, draft: &PostDraft, detectors: &SignalDetectors) -> String {
        let content = ContentView::from_draft(draft);
        self.clauses(draft, &content, detectors)
            .into_iter()
            .fold(draft.text.clone(), |mut optimized, clause| {
                optimized.push_str(CLAUSE_SEPARATOR);
                optimized.push_str(&clause);
                optimized
            })
    }

    /// Clauses in append order.
    pub fn clauses(
        &self,
        draft: &PostDraft,
        content: &ContentView,
        detectors: &SignalDetectors,
    ) -> Vec<String> {
        let mut clauses = Vec::new();

        if !has_hashtags(&content.combined) {
            if let Some(tags) = self.hashtag_clause(&draft.hashtags) {
                clauses.push(tags);
            }
        }
        if !detectors.evaluate(SignalKind::ReplyInvitation, content) {
            clauses.push(self.config.reply_clause.clone());
        }
        if content.word_count < detectors.long_form_words() {
            clauses.push(self.config.context_clause.clone());
        }
        if self.config.include_video_clause
            && !detectors.evaluate(SignalKind::VideoMention, content)
        {
            clauses.push(self.config.video_clause.clone());
        }
        if self.config.include_media_clause
            && !detectors.evaluate(SignalKind::MediaSignal, content)
        {
            clauses.push(self.config.media_clause.clone());
        }
        if let Some(media) = draft.media() {
            clauses.push(format!("{}: {}", self.config.media_label, media));
        }
        if !detectors.evaluate(SignalKind::ExternalLink, content) {
            clauses.push(self.config.link_clause.clone());
        }

        clauses.retain(|clause| !clause.trim().is_empty());
        clauses
    }

    /// The draft's own tags when it has any, otherwise the configured fallback.
    fn hashtag_clause(&self, draft_tags: &[String]) -> Option<String> {
        let mut tags = normalize_hashtags(draft_tags);
        if tags.is_empty() {
            tags = normalize_hashtags(&self.config.fallback_hashtags);
        }
        if tags.is_empty() {
            return None;
        }
        Some(
            tags.iter()
                .map(|tag| format!("#{}", tag))
                .collect::<Vec<_>>()
                .join(" "),
        )
    }
}
