use tracing::debug;

use crate::config::EngineConfig;
use crate::error::OptimizerError;
use crate::rewrite::RewriteGenerator;
use crate::scoring::{ContentView, LexiconBlendScorer, LexiconReport, SignalDetectors, WeightedScorer};
use crate::{draft_fingerprint, PostAnalysis, PostDraft, ScoreBreakdown, ScoringStrategy, StrategyOutcome};

/// Compiled engine: detectors, both scoring strategies and the rewrite rules.
/// Immutable once built and safe to share across threads.
#[derive(Debug, Clone)]
pub struct ScoringPipeline {
    detectors: SignalDetectors,
    weighted: WeightedScorer,
    lexicon: LexiconBlendScorer,
    rewriter: RewriteGenerator,
    strategy: ScoringStrategy,
}

impl ScoringPipeline {
    pub fn new(
        detectors: SignalDetectors,
        weighted: WeightedScorer,
        lexicon: LexiconBlendScorer,
        rewriter: RewriteGenerator,
        strategy: ScoringStrategy,
    ) -> Self {
        Self {
            detectors,
            weighted,
            lexicon,
            rewriter,
            strategy,
        }
    }

    pub fn from_config(config: &EngineConfig) -> Result<Self, OptimizerError> {
        Ok(Self::new(
            SignalDetectors::new(&config.detectors)?,
            WeightedScorer::new(config.weighted.signals.clone())?,
            LexiconBlendScorer::new(config.lexicon.clone())?,
            RewriteGenerator::new(config.rewrite.clone()),
            config.strategy.to_strategy()?,
        ))
    }

    pub fn strategy(&self) -> ScoringStrategy {
        self.strategy
    }

    pub fn score(&self, draft: &PostDraft) -> ScoreBreakdown {
        let content = ContentView::from_draft(draft);
        self.weighted.score(&self.detectors, &content)
    }

    pub fn rewrite(&self, draft: &PostDraft) -> String {
        self.rewriter.rewrite(draft, &self.detectors)
    }

    pub fn analyze(&self, draft: &PostDraft) -> PostAnalysis {
        let breakdown = self.score(draft);
        debug!(
            mode = draft.mode.label(),
            score = breakdown.total_score,
            tier = breakdown.tier.label(),
            "scored draft"
        );
        PostAnalysis {
            draft_id: draft_fingerprint(draft),
            breakdown,
            optimized_text: self.rewrite(draft),
        }
    }

    pub fn blend(&self, draft: &PostDraft) -> LexiconReport {
        let report = self.lexicon.score(draft);
        debug!(overall = report.overall, "blended draft");
        report
    }

    pub fn evaluate(&self, draft: &PostDraft, strategy: ScoringStrategy) -> StrategyOutcome {
        match strategy {
            ScoringStrategy::Weighted => StrategyOutcome::Weighted(self.analyze(draft)),
            ScoringStrategy::LexiconBlend => StrategyOutcome::LexiconBlend {
                draft_id: draft_fingerprint(draft),
                report: self.blend(draft),
                optimized_text: self.rewrite(draft),
            },
        }
    }

    /// Evaluates with the strategy this pipeline was configured for.
    pub fn run(&self, draft: &PostDraft) -> StrategyOutcome {
        self.evaluate(draft, self.strategy)
    }
}
