use post_optimizer::config::EngineConfig;
use post_optimizer::error::OptimizerError;
use post_optimizer::prompt::review_prompt;
use post_optimizer::scoring::ScoringPipeline;
use post_optimizer::source::{extract_post_id, DraftRequest};
use post_optimizer::{DraftMode, PostDraft, ScoringStrategy};

#[test]
fn extracts_status_id_from_supported_hosts() {
    assert_eq!(
        extract_post_id("https://x.com/user/status/1234567890123456789").unwrap(),
        "1234567890123456789"
    );
    assert_eq!(
        extract_post_id(" https://twitter.com/some_user/status/42?s=20 ").unwrap(),
        "42"
    );
}

#[test]
fn rejects_urls_without_status_id() {
    for url in ["https://example.com/user/status/1", "https://x.com/user", "not a url"] {
        assert!(matches!(
            extract_post_id(url),
            Err(OptimizerError::MalformedUrl(_))
        ));
    }
}

#[test]
fn url_only_request_builds_link_derived_placeholder() {
    let sourced = DraftRequest {
        url: Some("https://x.com/user/status/987".to_string()),
        ..DraftRequest::default()
    }
    .resolve()
    .unwrap();

    assert_eq!(sourced.post_id.as_deref(), Some("987"));
    assert_eq!(sourced.draft.mode, DraftMode::LinkDerived);
    assert!(sourced.draft.text.contains("987"));
    assert_eq!(sourced.notices.len(), 1);
}

#[test]
fn malformed_url_with_text_falls_back_to_manual() {
    let sourced = DraftRequest {
        url: Some("https://example.com/post".to_string()),
        text: Some("Texto del post".to_string()),
        ..DraftRequest::default()
    }
    .resolve()
    .unwrap();

    assert_eq!(sourced.post_id, None);
    assert_eq!(sourced.draft.mode, DraftMode::Manual);
    assert_eq!(sourced.draft.text, "Texto del post");
    assert_eq!(sourced.notices.len(), 1);
}

#[test]
fn malformed_url_without_content_is_an_error() {
    let result = DraftRequest {
        url: Some("https://example.com/post".to_string()),
        ..DraftRequest::default()
    }
    .resolve();
    assert!(matches!(result, Err(OptimizerError::MalformedUrl(_))));
}

#[test]
fn empty_request_is_invalid_input() {
    let result = DraftRequest {
        text: Some("   ".to_string()),
        ..DraftRequest::default()
    }
    .resolve();
    assert!(matches!(result, Err(OptimizerError::InvalidInput(_))));
}

#[test]
fn media_only_request_keeps_empty_text() {
    let sourced = DraftRequest {
        media_description: Some("foto del evento".to_string()),
        hashtags: vec!["#Evento".to_string(), "evento".to_string()],
        ..DraftRequest::default()
    }
    .resolve()
    .unwrap();

    assert_eq!(sourced.draft.text, "");
    assert_eq!(sourced.draft.media(), Some("foto del evento"));
    assert_eq!(sourced.draft.hashtags, vec!["Evento".to_string()]);
    assert!(sourced.draft.require_text().is_err());
}

#[test]
fn review_prompt_mentions_draft_details() {
    let draft = PostDraft::new("Gran noticia")
        .with_hashtags(["uno", "dos"])
        .with_video_hint(true);
    let prompt = review_prompt(&draft, None);

    assert!(prompt.contains("Gran noticia"));
    assert!(prompt.contains("uno, dos"));
    assert!(prompt.contains("**Tiene vídeo?** Sí"));
    assert!(prompt.contains("(ID manual)"));

    let prompt = review_prompt(&draft.with_mode(DraftMode::LinkDerived), Some("55"));
    assert!(prompt.contains("modo link (ID 55)"));
}

#[test]
fn partial_config_overrides_the_point_table() {
    let config = EngineConfig::from_toml(
        r#"
[strategy]
name = "lexicon"

[detectors]
diversity_threshold = 0.75

[[weighted.signals]]
kind = "reply_invitation"
points_if_true = 50
pass_message = "ok +{points}"
fail_message = "falta +{points}"
"#,
    )
    .unwrap();

    assert_eq!(config.detectors.long_form_words, 100);
    assert!((config.detectors.diversity_threshold - 0.75).abs() < 1e-6);

    let pipeline = ScoringPipeline::from_config(&config).unwrap();
    assert_eq!(pipeline.strategy(), ScoringStrategy::LexiconBlend);

    let breakdown = pipeline.score(&PostDraft::new("¿hola?"));
    assert_eq!(breakdown.signals.len(), 1);
    assert_eq!(breakdown.total_score, 50);
    assert_eq!(breakdown.signals[0].message, "ok +50");

    let breakdown = pipeline.score(&PostDraft::new("hola"));
    assert_eq!(breakdown.total_score, 0);
    assert_eq!(breakdown.signals[0].message, "falta +50");
}

#[test]
fn duplicate_signal_rules_are_rejected() {
    let mut config = EngineConfig::default();
    let first = config.weighted.signals[0].clone();
    config.weighted.signals.push(first);

    assert!(matches!(
        ScoringPipeline::from_config(&config),
        Err(OptimizerError::Config(_))
    ));
}

#[test]
fn non_finite_diversity_threshold_is_rejected() {
    let mut config = EngineConfig::default();
    config.detectors.diversity_threshold = f64::NAN;
    assert!(matches!(
        ScoringPipeline::from_config(&config),
        Err(OptimizerError::Config(_))
    ));

    let config = EngineConfig::from_toml("[detectors]\ndiversity_threshold = inf\n").unwrap();
    assert!(matches!(
        ScoringPipeline::from_config(&config),
        Err(OptimizerError::Config(_))
    ));
}

#[test]
fn unknown_strategy_is_rejected() {
    let mut config = EngineConfig::default();
    config.strategy.name = "magic".to_string();
    assert!(ScoringPipeline::from_config(&config).is_err());
}

#[test]
fn strategy_names_parse_with_aliases() {
    assert_eq!("weighted".parse::<ScoringStrategy>().unwrap(), ScoringStrategy::Weighted);
    assert_eq!(" Lexicon ".parse::<ScoringStrategy>().unwrap(), ScoringStrategy::LexiconBlend);
    assert_eq!("blend".parse::<ScoringStrategy>().unwrap(), ScoringStrategy::LexiconBlend);
    assert!(matches!(
        "magic".parse::<ScoringStrategy>(),
        Err(OptimizerError::Config(_))
    ));
}

#[test]
fn written_config_loads_back() {
    let path = std::env::temp_dir().join(format!(
        "post-optimizer-{}/optimizer.toml",
        std::process::id()
    ));
    EngineConfig::default().write(&path).unwrap();

    let (config, loaded_from) = EngineConfig::load(Some(path.clone())).unwrap();

    assert_eq!(loaded_from.as_deref(), Some(path.as_path()));
    assert_eq!(config.weighted.signals.len(), 7);
    assert_eq!(config.rewrite.fallback_hashtags.len(), 2);

    let _ = std::fs::remove_dir_all(path.parent().unwrap());
}
