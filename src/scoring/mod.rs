pub mod detectors;
pub mod diversity;
pub mod lexicon;
pub mod pipeline;
pub mod weighted;

pub use detectors::{word_count, ContentView, DetectorConfig, SignalDetectors, SignalKind, TriggerSet};
pub use diversity::LexicalDiversity;
pub use lexicon::{LexiconBlendScorer, LexiconConfig, LexiconReport, SentimentScore};
pub use pipeline::ScoringPipeline;
pub use weighted::{default_signal_rules, SignalRule, WeightedScorer};
