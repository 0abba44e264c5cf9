use post_optimizer::scoring::{LexiconBlendScorer, LexiconConfig};
use post_optimizer::{blend, PostDraft};

fn scorer() -> LexiconBlendScorer {
    LexiconBlendScorer::new(LexiconConfig::default()).unwrap()
}

#[test]
fn sentiment_counts_both_lists() {
    let sentiment = scorer().sentiment("Es un día genial y EXCELENTE, nada malo.");

    assert_eq!(sentiment.positive, 2);
    assert_eq!(sentiment.negative, 1);
    assert!((sentiment.score - 1.0 / 3.0).abs() < 1e-6);
    assert_eq!(sentiment.label(), "positivo");
}

#[test]
fn sentiment_without_lexicon_words_is_neutral() {
    let sentiment = scorer().sentiment("");
    assert_eq!(sentiment.positive, 0);
    assert_eq!(sentiment.negative, 0);
    assert!((sentiment.score - 0.0).abs() < 1e-6);
}

#[test]
fn sentiment_tokenizes_on_punctuation() {
    let sentiment = scorer().sentiment("¡horrible!terrible...desastre");
    assert_eq!(sentiment.negative, 3);
    assert!((sentiment.score + 1.0).abs() < 1e-6);
}

#[test]
fn blend_adds_subscores_and_clamps() {
    let draft = PostDraft::new("¿Qué tal?")
        .with_video_hint(true)
        .with_hashtags(["a", "b", "c", "d"]);
    let report = blend(&draft);

    assert!((report.reply_score - 0.7).abs() < 1e-6);
    assert!((report.dwell_score - 9.0 / 280.0).abs() < 1e-6);
    assert!((report.video_bonus - 0.2).abs() < 1e-6);
    assert_eq!(report.hashtag_count, 4);
    assert!((report.hashtag_score - 0.45).abs() < 1e-6);
    assert!((report.overall - 1.0).abs() < 1e-6);
    assert!(report
        .suggestions
        .iter()
        .any(|s| s.contains("máximo de tres hashtags")));
}

#[test]
fn negative_linked_text_floors_at_zero() {
    let draft = PostDraft::new("Horrible y terrible").with_link(true);
    let report = blend(&draft);

    assert!((report.reply_score - 0.2).abs() < 1e-6);
    assert!((report.link_penalty + 0.1).abs() < 1e-6);
    assert!((report.sentiment.score + 1.0).abs() < 1e-6);
    assert!((report.overall - 0.0).abs() < 1e-6);
    assert!(report.suggestions.iter().any(|s| s.contains("lenguaje muy negativo")));
    assert!(report.suggestions.iter().any(|s| s.contains("enlaces")));
    assert!(report.suggestions.iter().any(|s| s.contains("pregunta")));
}

#[test]
fn dwell_score_saturates_at_280_chars() {
    let report = blend(&PostDraft::new("a".repeat(600)));
    assert!((report.dwell_score - 1.0).abs() < 1e-6);
    assert!(report.suggestions.iter().any(|s| s.contains("acortar")));
}

#[test]
fn hashtags_from_list_and_text_are_merged() {
    let draft = PostDraft::new("Hola #Uno #dos").with_hashtags(["uno"]);
    assert_eq!(blend(&draft).hashtag_count, 2);
}

#[test]
fn summary_reports_each_metric() {
    let report = blend(&PostDraft::new("Un buen día"));

    assert_eq!(report.summary.len(), 8);
    assert_eq!(report.summary[0], "Longitud del texto: 11 caracteres");
    assert_eq!(report.summary[3], "Tiene vídeo: no");
    assert_eq!(report.summary[6], "Sentimiento: positivo (0.00)");
}
