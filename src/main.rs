mod api;
mod enrichment;
mod server;

use clap::{Args, Parser, Subcommand};
use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use enrichment::{Enrichment, EnrichmentClient};
use post_optimizer::config::EngineConfig;
use post_optimizer::prompt::review_prompt;
use post_optimizer::scoring::{LexiconReport, ScoringPipeline};
use post_optimizer::source::{DraftRequest, SourcedDraft};
use post_optimizer::{format_float, PostAnalysis, ScoringStrategy, StrategyOutcome, MAX_SCORE};

#[derive(Parser)]
#[command(name = "post-optimizer", about = "Post draft engagement scorer and optimizer")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Score a draft and print the optimized version
    Analyze(AnalyzeArgs),
    /// Print a review prompt for an external assistant
    Prompt(DraftArgs),
    /// Run the HTTP API and progress stream
    Serve(ServeArgs),
    /// Write the default configuration file
    InitConfig(InitConfigArgs),
}

#[derive(Args, Debug, Clone, Default)]
struct DraftArgs {
    #[arg(long)]
    text: Option<String>,
    #[arg(long)]
    url: Option<String>,
    #[arg(long)]
    media: Option<String>,
    #[arg(long = "hashtag")]
    hashtags: Vec<String>,
    #[arg(long)]
    video: bool,
    #[arg(long)]
    link: bool,
}

#[derive(Args, Debug, Clone, Default)]
struct AnalyzeArgs {
    #[command(flatten)]
    draft: DraftArgs,
    /// weighted | lexicon
    #[arg(long)]
    strategy: Option<ScoringStrategy>,
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    json: bool,
    #[arg(long)]
    enrich: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    #[arg(long, default_value = "127.0.0.1")]
    host: String,
    #[arg(long, default_value_t = 8787)]
    port: u16,
    #[arg(long)]
    web_root: Option<String>,
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
struct InitConfigArgs {
    #[arg(long, default_value = "config/optimizer.toml")]
    path: PathBuf,
}

#[tokio::main]
async fn main() {
    load_dotenv();
    init_tracing();
    if let Err(err) = run().await {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), String> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Command::Analyze(AnalyzeArgs::default()));

    match command {
        Command::Analyze(args) => run_analyze(args).await,
        Command::Prompt(args) => run_prompt(args),
        Command::Serve(args) => server::serve(args).await,
        Command::InitConfig(args) => {
            EngineConfig::default()
                .write(&args.path)
                .map_err(|err| err.to_string())?;
            println!("Wrote default config to {}", args.path.display());
            Ok(())
        }
    }
}

async fn run_analyze(args: AnalyzeArgs) -> Result<(), String> {
    let (config, _) = EngineConfig::load(args.config).map_err(|err| err.to_string())?;
    let pipeline = ScoringPipeline::from_config(&config).map_err(|err| err.to_string())?;
    let strategy = args.strategy.unwrap_or_else(|| pipeline.strategy());

    let sourced = resolve_draft(args.draft)?;
    let enrichment = if args.enrich {
        let client = EnrichmentClient::from_env(&config.enrichment)?;
        Some(client.enrich(&sourced.draft.combined_content()).await)
    } else {
        None
    };

    let outcome = pipeline.evaluate(&sourced.draft, strategy);

    if args.json {
        let payload = serde_json::json!({
            "post_id": sourced.post_id,
            "mode": sourced.draft.mode.label(),
            "result": outcome,
            "enrichment": enrichment,
            "warnings": sourced.notices,
        });
        let rendered = serde_json::to_string_pretty(&payload)
            .map_err(|err| format!("failed to serialize result: {}", err))?;
        println!("{}", rendered);
        return Ok(());
    }

    for notice in &sourced.notices {
        println!("Aviso: {}", notice);
    }
    let id = sourced
        .post_id
        .clone()
        .unwrap_or_else(|| outcome.draft_id().to_string());
    println!("Modo: {} | ID: {}", sourced.draft.mode.label(), id);

    match &outcome {
        StrategyOutcome::Weighted(analysis) => print_weighted(analysis),
        StrategyOutcome::LexiconBlend { report, .. } => print_lexicon(report),
    }

    if let Some(enrichment) = enrichment.as_ref() {
        print_enrichment(enrichment);
    }

    println!("\nVersión optimizada:\n{}", outcome.optimized_text());
    Ok(())
}

fn run_prompt(args: DraftArgs) -> Result<(), String> {
    let sourced = resolve_draft(args)?;
    println!(
        "{}",
        review_prompt(&sourced.draft, sourced.post_id.as_deref())
    );
    Ok(())
}

fn print_weighted(analysis: &PostAnalysis) {
    let breakdown = &analysis.breakdown;
    println!(
        "Score estimado: {}/{} ({})",
        breakdown.total_score,
        MAX_SCORE,
        breakdown.tier.label()
    );
    println!(
        "{} score {} | restante {}",
        score_bar(breakdown.total_score, 20),
        breakdown.total_score,
        breakdown.remainder()
    );
    let failing = breakdown.failing().count();
    if failing > 0 {
        println!("Señales pendientes: {} de {}", failing, breakdown.signals.len());
    }
    println!("\nSugerencias detalladas:");
    for signal in &breakdown.signals {
        println!("- [{:+}] {}", signal.points, signal.message);
    }
}

fn print_lexicon(report: &LexiconReport) {
    for line in &report.summary {
        println!("{}", line);
    }
    println!(
        "Overall: {} (sentiment {})",
        format_float(report.overall, 2),
        format_float(report.sentiment.score, 2)
    );
    if !report.suggestions.is_empty() {
        println!("\nSugerencias:");
        for suggestion in &report.suggestions {
            println!("- {}", suggestion);
        }
    }
}

fn print_enrichment(enrichment: &Enrichment) {
    if !enrichment.articles.is_empty() {
        println!("\nNoticias relacionadas:");
        for article in &enrichment.articles {
            println!(
                "- {} ({}, {}) {}",
                article.title, article.source, article.provider, article.url
            );
        }
    }
    if let Some(sentiment) = enrichment.sentiment.as_ref() {
        println!(
            "\nSentimiento externo: {} | score {} | palabras clave: {}",
            sentiment.kind,
            format_float(sentiment.score, 2),
            sentiment.keywords.join(", ")
        );
    }
    for notice in &enrichment.notices {
        println!("Aviso: {}", notice);
    }
}

/// Proportion of score against the remainder, `#` for score and `-` for the rest.
fn score_bar(score: u8, width: usize) -> String {
    let filled = (score as usize * width + MAX_SCORE as usize / 2) / MAX_SCORE as usize;
    let filled = filled.min(width);
    format!("[{}{}]", "#".repeat(filled), "-".repeat(width - filled))
}

fn resolve_draft(args: DraftArgs) -> Result<SourcedDraft, String> {
    let text = match args.text {
        Some(text) => Some(text),
        None if args.url.is_none() && args.media.is_none() => read_stdin()?,
        None => None,
    };

    DraftRequest {
        url: args.url,
        text,
        media_description: args.media,
        hashtags: args.hashtags,
        has_video: args.video,
        link_present: args.link,
    }
    .resolve()
    .map_err(|err| err.to_string())
}

fn read_stdin() -> Result<Option<String>, String> {
    let mut stdin = io::stdin();
    if stdin.is_terminal() {
        return Ok(None);
    }
    let mut buffer = String::new();
    stdin
        .read_to_string(&mut buffer)
        .map_err(|err| format!("failed reading stdin: {}", err))?;
    Ok(Some(buffer))
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn load_dotenv() {
    let _ = dotenvy::dotenv();
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    let manifest_path = Path::new(manifest_dir).join(".env");
    let _ = dotenvy::from_path(manifest_path);
}

#[cfg(test)]
mod tests {
    use super::score_bar;

    #[test]
    fn score_bar_splits_score_and_remainder() {
        assert_eq!(score_bar(0, 10), "[----------]");
        assert_eq!(score_bar(50, 10), "[#####-----]");
        assert_eq!(score_bar(100, 10), "[##########]");
    }
}
