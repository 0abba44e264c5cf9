use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse,
    },
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::{
    collections::HashMap,
    net::SocketAddr,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::{Duration, SystemTime, UNIX_EPOCH},
};
use tokio::sync::{broadcast, Mutex};
use tokio_stream::{wrappers::BroadcastStream, StreamExt};
use tower_http::services::{ServeDir, ServeFile};
use tracing::{info, warn};

use crate::api::{ApiAnalyzeRequest, ApiAnalyzeResponse};
use crate::enrichment::EnrichmentClient;
use post_optimizer::config::EngineConfig;
use post_optimizer::prompt::review_prompt;
use post_optimizer::scoring::ScoringPipeline;

type Channels = Arc<Mutex<HashMap<String, broadcast::Sender<StreamEvent>>>>;

#[derive(Clone)]
struct AppState {
    pipeline: Arc<ScoringPipeline>,
    enrichment: Option<EnrichmentClient>,
    channels: Channels,
}

#[derive(Clone, Serialize)]
struct StreamEvent {
    event: String,
    message: String,
    timestamp_ms: u128,
}

#[derive(serde::Deserialize)]
struct StreamQuery {
    request_id: String,
}

static REQUEST_COUNTER: AtomicUsize = AtomicUsize::new(0);

const CHANNEL_LINGER: Duration = Duration::from_secs(10);
/// Channels opened by a stream listener expire after this even if no analysis
/// ever reports on them.
const STREAM_TTL: Duration = Duration::from_secs(120);

pub async fn serve(args: crate::ServeArgs) -> Result<(), String> {
    let (config, config_path) = EngineConfig::load(args.config).map_err(|err| err.to_string())?;
    let pipeline = ScoringPipeline::from_config(&config).map_err(|err| err.to_string())?;
    let enrichment = match EnrichmentClient::from_env(&config.enrichment) {
        Ok(client) => {
            if !client.is_configured() {
                info!("no enrichment keys set; reports will use the basic analysis only");
            }
            Some(client)
        }
        Err(err) => {
            warn!(error = %err, "enrichment disabled");
            None
        }
    };

    let state = AppState {
        pipeline: Arc::new(pipeline),
        enrichment,
        channels: Arc::new(Mutex::new(HashMap::new())),
    };

    let mut app = Router::new()
        .route("/api/health", get(health))
        .route("/api/analyze", post(analyze_handler))
        .route("/api/analyze/stream", get(stream_handler));

    if let Some(web_root) = args.web_root {
        let index_path = format!("{}/index.html", web_root.trim_end_matches('/'));
        let static_service = ServeDir::new(web_root).not_found_service(ServeFile::new(index_path));
        app = app.nest_service("/", static_service);
    }
    let app = app.with_state(state);

    let addr: SocketAddr = format!("{}:{}", args.host, args.port)
        .parse()
        .map_err(|err| format!("invalid bind address: {}", err))?;

    info!(
        %addr,
        config = ?config_path,
        strategy = config.strategy.name.as_str(),
        "serving post optimizer"
    );

    axum::serve(
        tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|err| format!("failed to bind server: {}", err))?,
        app,
    )
    .await
    .map_err(|err| format!("server error: {}", err))?;

    Ok(())
}

async fn health() -> impl IntoResponse {
    StatusCode::OK
}

async fn analyze_handler(
    State(state): State<AppState>,
    Json(request): Json<ApiAnalyzeRequest>,
) -> Result<Json<ApiAnalyzeResponse>, (StatusCode, String)> {
    let use_enrichment = request.enrich.unwrap_or(false);
    let request_id = request
        .request_id
        .clone()
        .unwrap_or_else(generate_request_id);
    let (sourced, strategy) = request
        .into_draft()
        .map_err(|err| (StatusCode::BAD_REQUEST, err))?;
    let channel = if use_enrichment {
        Some(get_or_create_channel(&state.channels, &request_id).await.0)
    } else {
        None
    };

    let mut warnings = sourced.notices.clone();
    let enrichment = if use_enrichment {
        match &state.enrichment {
            Some(client) => {
                if let Some(sender) = channel.as_ref() {
                    send_event(sender, "calling", "Consultando APIs de enriquecimiento");
                }
                let enrichment = client.enrich(&sourced.draft.combined_content()).await;
                if let Some(sender) = channel.as_ref() {
                    send_event(sender, "received", "Enriquecimiento recibido");
                }
                Some(enrichment)
            }
            None => {
                warnings.push("Enriquecimiento no disponible".to_string());
                if let Some(sender) = channel.as_ref() {
                    send_event(sender, "error", "Enriquecimiento no disponible");
                }
                None
            }
        }
    } else {
        None
    };

    let strategy = strategy.unwrap_or_else(|| state.pipeline.strategy());
    let result = state.pipeline.evaluate(&sourced.draft, strategy);
    if let Some(sender) = channel.as_ref() {
        send_event(sender, "done", "Análisis completo");
        schedule_cleanup(state.channels.clone(), request_id.clone(), CHANNEL_LINGER);
    }

    Ok(Json(ApiAnalyzeResponse {
        request_id,
        prompt: review_prompt(&sourced.draft, sourced.post_id.as_deref()),
        post_id: sourced.post_id,
        mode: sourced.draft.mode.label().to_string(),
        result,
        enrichment,
        warnings,
    }))
}

async fn stream_handler(
    State(state): State<AppState>,
    Query(query): Query<StreamQuery>,
) -> Result<Sse<impl tokio_stream::Stream<Item = Result<Event, std::convert::Infallible>>>, StatusCode>
{
    let (sender, receiver) = subscribe_progress(&state.channels, &query.request_id, STREAM_TTL).await;
    let stream = BroadcastStream::new(receiver).filter_map(|event| match event {
        Ok(event) => {
            let data = serde_json::to_string(&event).unwrap_or_default();
            Some(Ok(Event::default().data(data)))
        }
        Err(_) => None,
    });

    send_event(&sender, "connected", "Escuchando progreso del análisis");
    Ok(Sse::new(stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(8))))
}

/// Returns the channel for `request_id` and whether this call created it.
async fn get_or_create_channel(
    channels: &Channels,
    request_id: &str,
) -> (broadcast::Sender<StreamEvent>, bool) {
    let mut guard = channels.lock().await;
    if let Some(sender) = guard.get(request_id) {
        return (sender.clone(), false);
    }
    let (sender, _) = broadcast::channel(32);
    guard.insert(request_id.to_string(), sender.clone());
    (sender, true)
}

async fn subscribe_progress(
    channels: &Channels,
    request_id: &str,
    ttl: Duration,
) -> (broadcast::Sender<StreamEvent>, broadcast::Receiver<StreamEvent>) {
    let (sender, created) = get_or_create_channel(channels, request_id).await;
    if created {
        schedule_cleanup(channels.clone(), request_id.to_string(), ttl);
    }
    let receiver = sender.subscribe();
    (sender, receiver)
}

fn send_event(sender: &broadcast::Sender<StreamEvent>, event: &str, message: &str) {
    let _ = sender.send(StreamEvent {
        event: event.to_string(),
        message: message.to_string(),
        timestamp_ms: now_ms(),
    });
}

fn schedule_cleanup(channels: Channels, request_id: String, after: Duration) {
    tokio::spawn(async move {
        tokio::time::sleep(after).await;
        let mut guard = channels.lock().await;
        guard.remove(&request_id);
    });
}

fn generate_request_id() -> String {
    let counter = REQUEST_COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("req-{}-{}", now_ms(), counter)
}

fn now_ms() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|duration| duration.as_millis())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn channels() -> Channels {
        Arc::new(Mutex::new(HashMap::new()))
    }

    #[tokio::test]
    async fn listener_only_channels_expire() {
        let channels = channels();
        let (_sender, _receiver) =
            subscribe_progress(&channels, "req-listener", Duration::from_millis(20)).await;
        assert!(channels.lock().await.contains_key("req-listener"));

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(channels.lock().await.is_empty());
    }

    #[tokio::test]
    async fn existing_channel_is_shared_with_listeners() {
        let channels = channels();
        let (sender, created) = get_or_create_channel(&channels, "req-shared").await;
        assert!(created);

        let (_, mut receiver) =
            subscribe_progress(&channels, "req-shared", Duration::from_secs(60)).await;
        send_event(&sender, "done", "ok");

        let event = receiver.recv().await.unwrap();
        assert_eq!(event.event, "done");
        assert_eq!(channels.lock().await.len(), 1);
    }
}
