use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use tree_translate::{Dialect, OutputFormat, flatten, parse};
use tree_translate_mt::{
    BatchOptions, GatewayErrorKind, LANGUAGES, Language, MtError, PartialResult, ProxyGateway,
    TranslationGateway, TreeTranslator,
};

const BIND_VAR: &str = "TREE_TRANSLATE_BIND";
const DEFAULT_BIND: &str = "127.0.0.1:3000";

fn default_source() -> String {
    "auto".to_string()
}

#[derive(Serialize, Deserialize)]
pub struct TranslateRequest {
    pub text: String,
    /// Detected from the text when absent
    #[serde(default)]
    pub dialect: Option<Dialect>,
    #[serde(default = "default_source")]
    pub from: String,
    pub to: String,
    /// Same format as the input when absent
    #[serde(default)]
    pub output: Option<OutputFormat>,
    #[serde(default)]
    pub export: bool,
    #[serde(default)]
    pub chunk_size: Option<usize>,
}

#[derive(Serialize, Deserialize)]
pub struct TranslateResponse {
    pub output: String,
    pub dialect: Dialect,
    pub missing: usize,
    pub total: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

#[derive(Serialize, Deserialize)]
pub struct ParseRequest {
    pub text: String,
    #[serde(default)]
    pub dialect: Option<Dialect>,
}

#[derive(Serialize, Deserialize)]
pub struct ParseResponse {
    pub dialect: Dialect,
    pub strings: Vec<String>,
    pub tree: Value,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<GatewayErrorKind>,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<dyn TranslationGateway>,
    /// Pause between gateway calls of one request
    pub pace: Duration,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let gateway = ProxyGateway::from_env()
        .map_err(|e| format!("Failed to initialize translator: {}", e))?;
    info!(proxy_url = %gateway.config().proxy_url, "Using translation proxy");

    let state = AppState {
        gateway: Arc::new(gateway),
        pace: BatchOptions::default().pace,
    };

    let bind = std::env::var(BIND_VAR).unwrap_or_else(|_| DEFAULT_BIND.to_string());
    let listener = tokio::net::TcpListener::bind(&bind).await?;
    info!("Server running at http://{}", bind);

    axum::serve(listener, app(state)).await?;

    Ok(())
}

fn app(state: AppState) -> Router {
    Router::new()
        .route("/api/translate", post(translate_document))
        .route("/api/parse", post(parse_document))
        .route("/api/languages", get(list_languages))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn error_response(error: MtError) -> ApiError {
    let (status, kind) = match &error {
        MtError::Format(_) | MtError::InvalidLanguage(_) | MtError::QueryTooLong { .. } => {
            (StatusCode::BAD_REQUEST, None)
        }
        MtError::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, None),
        MtError::Superseded => (StatusCode::CONFLICT, None),
        MtError::Gateway(e) => {
            let status = match e.kind {
                GatewayErrorKind::Timeout => StatusCode::GATEWAY_TIMEOUT,
                GatewayErrorKind::QuotaExceeded => StatusCode::TOO_MANY_REQUESTS,
                _ => StatusCode::BAD_GATEWAY,
            };
            (status, Some(e.kind))
        }
    };
    (
        status,
        Json(ErrorResponse {
            error: error.to_string(),
            kind,
        }),
    )
}

fn default_output(dialect: Dialect) -> OutputFormat {
    match dialect {
        Dialect::Php => OutputFormat::Php,
        Dialect::Text => OutputFormat::Text,
        Dialect::Json | Dialect::SimpleJson => OutputFormat::Json,
    }
}

async fn translate_document(
    State(state): State<AppState>,
    Json(request): Json<TranslateRequest>,
) -> Result<Json<TranslateResponse>, ApiError> {
    let dialect = request
        .dialect
        .unwrap_or_else(|| Dialect::detect(&request.text));
    info!(
        "Translating {} input ({} bytes) from {} to {}",
        dialect,
        request.text.len(),
        &request.from,
        &request.to
    );

    let mut options = BatchOptions::for_dialect(dialect).with_pace(state.pace);
    if let Some(chunk_size) = request.chunk_size {
        options = options.with_chunk_size(chunk_size);
    }

    // One session per request: concurrent HTTP clients never supersede each other
    let translator = TreeTranslator::new(Arc::clone(&state.gateway)).with_options(options);
    let translated = translator
        .translate_document(&request.text, dialect, &request.from, &request.to)
        .await
        .map_err(error_response)?;

    let format = request.output.unwrap_or_else(|| default_output(dialect));
    let output = translated.render(&format, request.export);
    let warning = translated.partial().as_ref().map(PartialResult::to_string);

    info!(
        "Translated {} strings ({} missing)",
        translated.total, translated.missing
    );

    Ok(Json(TranslateResponse {
        output,
        dialect,
        missing: translated.missing,
        total: translated.total,
        warning,
    }))
}

async fn parse_document(Json(request): Json<ParseRequest>) -> Result<Json<ParseResponse>, ApiError> {
    let dialect = request
        .dialect
        .unwrap_or_else(|| Dialect::detect(&request.text));
    let tree = parse(&request.text, dialect).map_err(|e| error_response(e.into()))?;

    Ok(Json(ParseResponse {
        dialect,
        strings: flatten(&tree),
        tree: Value::from(&tree),
    }))
}

async fn list_languages() -> Json<&'static [Language]> {
    Json(LANGUAGES)
}
