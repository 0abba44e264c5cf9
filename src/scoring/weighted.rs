use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::OptimizerError;
use crate::scoring::{ContentView, SignalDetectors, SignalKind};
use crate::{ScoreBreakdown, ScoreTier, Signal, MAX_SCORE};

/// One row of the point table. `{points}` in either message is replaced by
/// `points_if_true`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalRule {
    pub kind: SignalKind,
    pub points_if_true: i32,
    #[serde(default)]
    pub points_if_false: i32,
    pub pass_message: String,
    pub fail_message: String,
}

impl SignalRule {
    pub fn new(
        kind: SignalKind,
        points_if_true: i32,
        points_if_false: i32,
        pass_message: &str,
        fail_message: &str,
    ) -> Self {
        Self {
            kind,
            points_if_true,
            points_if_false,
            pass_message: pass_message.to_string(),
            fail_message: fail_message.to_string(),
        }
    }

    pub fn points(&self, passed: bool) -> i32 {
        if passed {
            self.points_if_true
        } else {
            self.points_if_false
        }
    }

    pub fn render_message(&self, passed: bool) -> String {
        let template = if passed {
            &self.pass_message
        } else {
            &self.fail_message
        };
        template.replace("{points}", &self.points_if_true.to_string())
    }
}

pub fn default_signal_rules() -> Vec<SignalRule> {
    vec![
        SignalRule::new(
            SignalKind::ReplyInvitation,
            30,
            0,
            "✅ Invitación a replies fuerte → +{points} (P(reply) alto). Mejora: Agrega preguntas específicas como \"¿Cómo impacta esto en tu región?\".",
            "❌ Sin replies → Agrega \"¿Qué opinas?\" para +{points}. Ideal para abrir debate.",
        ),
        SignalRule::new(
            SignalKind::LongForm,
            20,
            0,
            "✅ Buen dwell time (texto extenso) → +{points}. Mejora: Usa threads para contenido largo.",
            "❌ Corto → Extiende con subpuntos para +{points}. Ej: 1. Contexto, 2. Impacto.",
        ),
        SignalRule::new(
            SignalKind::VideoMention,
            15,
            0,
            "✅ Video → +{points}. Mejora: Hook rápido en los primeros 3 segundos para alto P(video_view).",
            "❌ Sin video → Agrega clip corto para +{points}. Perfecto para contenido visual.",
        ),
        SignalRule::new(
            SignalKind::LowNegativeRisk,
            20,
            -15,
            "✅ Bajo riesgo negatives → +{points}. Mantén tono informativo y neutral.",
            "❌ Riesgo negatives → Limpia repeticiones o spam para recuperación +{points}.",
        ),
        SignalRule::new(
            SignalKind::MediaSignal,
            15,
            0,
            "✅ Media → +{points}. Mejora: Agrega alt-text descriptivo para accesibilidad.",
            "❌ Sin media → Agrega imagen/video para +{points} y mejor P(click).",
        ),
        SignalRule::new(
            SignalKind::Hashtags,
            10,
            0,
            "✅ Hashtags → +{points}. Mejora: Usa hashtags relevantes y específicos.",
            "❌ Sin hashtags → Agrega uno o dos hashtags para +{points} y mejor discovery.",
        ),
        SignalRule::new(
            SignalKind::ExternalLink,
            10,
            0,
            "✅ Enlaces → +{points}. Mejora: Fuentes confiables para credibilidad.",
            "❌ Sin enlaces → Agrega fuente externa para +{points} y P(share).",
        ),
    ]
}

#[derive(Debug, Clone)]
pub struct WeightedScorer {
    rules: Vec<SignalRule>,
}

impl WeightedScorer {
    /// Each signal kind may appear at most once in the table.
    pub fn new(rules: Vec<SignalRule>) -> Result<Self, OptimizerError> {
        let mut seen = HashSet::new();
        for rule in &rules {
            if !seen.insert(rule.kind) {
                return Err(OptimizerError::Config(format!(
                    "signal {} is listed more than once",
                    rule.kind.name()
                )));
            }
        }
        Ok(Self { rules })
    }

    pub fn score(&self, detectors: &SignalDetectors, content: &ContentView) -> ScoreBreakdown {
        let mut score: i32 = 0;
        let mut signals = Vec::with_capacity(self.rules.len());

        for rule in &self.rules {
            let passed = detectors.evaluate(rule.kind, content);
            let points = rule.points(passed);
            score = score.saturating_add(points);
            signals.push(Signal {
                name: rule.kind.name().to_string(),
                passed,
                points,
                message: rule.render_message(passed),
            });
        }

        let total_score = clamp_score(score);
        ScoreBreakdown {
            signals,
            total_score,
            tier: ScoreTier::from_score(total_score),
        }
    }
}

/// Plain clamp; sums above the ceiling are truncated, not rescaled.
fn clamp_score(score: i32) -> u8 {
    score.clamp(0, MAX_SCORE as i32) as u8
}
