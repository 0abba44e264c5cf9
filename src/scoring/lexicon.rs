use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::OptimizerError;
use crate::scoring::detectors::extract_hashtags;
use crate::scoring::TriggerSet;
use crate::{clamp01, format_float, PostDraft};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LexiconConfig {
    pub positive_words: Vec<String>,
    pub negative_words: Vec<String>,
    pub reply_triggers: Vec<String>,
    pub reply_hit: f64,
    pub reply_miss: f64,
    pub dwell_chars: usize,
    pub video_bonus: f64,
    pub link_penalty: f64,
    pub hashtag_step: f64,
    pub hashtag_cap: f64,
}

impl Default for LexiconConfig {
    fn default() -> Self {
        Self {
            positive_words: [
                "bien",
                "bueno",
                "excelente",
                "genial",
                "positivo",
                "mejor",
                "fantástico",
                "maravilloso",
                "feliz",
                "impresionante",
            ]
            .iter()
            .map(|word| word.to_string())
            .collect(),
            negative_words: [
                "mal",
                "malo",
                "horrible",
                "terrible",
                "negativo",
                "peor",
                "desastre",
                "odio",
                "triste",
                "molesto",
            ]
            .iter()
            .map(|word| word.to_string())
            .collect(),
            reply_triggers: vec!["qué".to_string(), "por qué".to_string()],
            reply_hit: 0.7,
            reply_miss: 0.2,
            dwell_chars: 280,
            video_bonus: 0.2,
            link_penalty: 0.1,
            hashtag_step: 0.15,
            hashtag_cap: 0.45,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SentimentScore {
    pub score: f64,
    pub positive: usize,
    pub negative: usize,
}

impl SentimentScore {
    pub fn label(&self) -> &'static str {
        if self.score >= 0.0 {
            "positivo"
        } else {
            "negativo"
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LexiconReport {
    pub char_count: usize,
    pub reply_score: f64,
    pub dwell_score: f64,
    pub video_bonus: f64,
    pub link_penalty: f64,
    pub hashtag_count: usize,
    pub hashtag_score: f64,
    pub sentiment: SentimentScore,
    pub overall: f64,
    pub summary: Vec<String>,
    pub suggestions: Vec<String>,
}

/// Continuous 0..1 blend of reply, dwell, media, hashtag and sentiment
/// sub-scores. Independent of the weighted signal table.
#[derive(Debug, Clone)]
pub struct LexiconBlendScorer {
    positive: HashSet<String>,
    negative: HashSet<String>,
    reply: TriggerSet,
    config: LexiconConfig,
}

impl LexiconBlendScorer {
    pub fn new(config: LexiconConfig) -> Result<Self, OptimizerError> {
        Ok(Self {
            positive: lowercase_set(&config.positive_words),
            negative: lowercase_set(&config.negative_words),
            reply: TriggerSet::new(&config.reply_triggers)?,
            config,
        })
    }

    pub fn sentiment(&self, text: &str) -> SentimentScore {
        let mut positive = 0usize;
        let mut negative = 0usize;
        let lowered = text.to_lowercase();
        for token in lowered.split(|ch: char| !ch.is_alphanumeric()) {
            if token.is_empty() {
                continue;
            }
            if self.positive.contains(token) {
                positive += 1;
            }
            if self.negative.contains(token) {
                negative += 1;
            }
        }
        let total = (positive + negative).max(1);
        SentimentScore {
            score: (positive as f64 - negative as f64) / total as f64,
            positive,
            negative,
        }
    }

    pub fn score(&self, draft: &PostDraft) -> LexiconReport {
        let text = draft.text.as_str();
        let char_count = text.chars().count();

        let reply_score = if text.contains('?') || text.contains('¿') || self.reply.matches(text) {
            self.config.reply_hit
        } else {
            self.config.reply_miss
        };
        let dwell_score = (char_count as f64 / self.config.dwell_chars.max(1) as f64).min(1.0);
        let video_bonus = if draft.has_video_hint {
            self.config.video_bonus
        } else {
            0.0
        };
        let link_penalty = if draft.link_present {
            -self.config.link_penalty
        } else {
            0.0
        };
        let hashtag_count = distinct_hashtags(draft);
        let hashtag_score = (hashtag_count as f64 * self.config.hashtag_step).min(self.config.hashtag_cap);
        let sentiment = self.sentiment(text);

        let overall = clamp01(
            reply_score + dwell_score + video_bonus + hashtag_score + link_penalty + sentiment.score,
        );

        let summary = vec![
            format!("Longitud del texto: {} caracteres", char_count),
            format!(
                "Puntuación de invitación a respuestas: {}%",
                format_float(reply_score * 100.0, 1)
            ),
            format!(
                "Puntuación de tiempo de lectura: {}%",
                format_float(dwell_score * 100.0, 1)
            ),
            format!("Tiene vídeo: {}", yes_no(draft.has_video_hint)),
            format!("Número de hashtags: {}", hashtag_count),
            format!("Contiene enlace: {}", yes_no(draft.link_present)),
            format!(
                "Sentimiento: {} ({})",
                sentiment.label(),
                format_float(sentiment.score, 2)
            ),
            format!("Puntuación global: {}%", format_float(overall * 100.0, 1)),
        ];

        let suggestions = build_suggestions(
            reply_score,
            dwell_score,
            draft.has_video_hint,
            draft.link_present,
            hashtag_count,
            sentiment.score,
        );

        LexiconReport {
            char_count,
            reply_score,
            dwell_score,
            video_bonus,
            link_penalty,
            hashtag_count,
            hashtag_score,
            sentiment,
            overall,
            summary,
            suggestions,
        }
    }
}

fn lowercase_set(words: &[String]) -> HashSet<String> {
    words.iter().map(|word| word.trim().to_lowercase()).collect()
}

/// Union of the draft's hashtag list and hashtags written in the text.
fn distinct_hashtags(draft: &PostDraft) -> usize {
    let mut all = draft.hashtags.clone();
    all.extend(extract_hashtags(&draft.text));
    crate::normalize_hashtags(&all).len()
}

fn build_suggestions(
    reply_score: f64,
    dwell_score: f64,
    has_video: bool,
    link_present: bool,
    hashtag_count: usize,
    sentiment: f64,
) -> Vec<String> {
    let mut suggestions = Vec::new();
    if reply_score < 0.3 {
        suggestions.push("Incluye una pregunta o llamada a la acción para fomentar respuestas.");
    }
    if dwell_score < 0.3 {
        suggestions.push("Aumenta ligeramente el texto para incrementar el tiempo de lectura.");
    } else if dwell_score > 0.8 {
        suggestions.push("Considera acortar el texto para mantener la atención del lector.");
    }
    if !has_video {
        suggestions.push("Añadir un vídeo o imagen atractiva puede aumentar el interés.");
    }
    if link_present {
        suggestions.push("Reduce el número de enlaces o ponlos al final para no distraer al lector.");
    }
    if hashtag_count == 0 {
        suggestions.push("Añade uno o dos hashtags relevantes para mejorar el descubrimiento.");
    } else if hashtag_count > 3 {
        suggestions.push("Usa un máximo de tres hashtags para evitar saturar el post.");
    }
    if sentiment < -0.3 {
        suggestions.push("Evita el lenguaje muy negativo; puede disuadir a los lectores.");
    } else if sentiment > 0.5 {
        suggestions.push("El tono positivo es bueno, pero asegúrate de mantener autenticidad.");
    }
    suggestions.into_iter().map(str::to_string).collect()
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "sí"
    } else {
        "no"
    }
}
