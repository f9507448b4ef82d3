use std::sync::{Arc, Mutex};

use tracing_subscriber::EnvFilter;

use lerrokatu::align::{AlignmentGenerator, ClaudeClient};
use lerrokatu::analysis::{self, Analyzer, Readiness, StanzaClient};
use lerrokatu::api::types::ApiContext;
use lerrokatu::cache::AlignmentCache;
use lerrokatu::config::{Config, APP_VERSION};
use lerrokatu::db;
use lerrokatu::pipeline::Pipeline;
use lerrokatu::quota::QuotaGate;
use lerrokatu::server;
use lerrokatu::translate::{ItzuliClient, Translator};

const ITZULI_TIMEOUT_SECS: u64 = 30;
const STANZA_TIMEOUT_SECS: u64 = 60;
const CLAUDE_TIMEOUT_SECS: u64 = 120;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(Config::default_log_filter())),
        )
        .init();

    tracing::info!("Lerrokatu starting v{APP_VERSION}");
    let config = Config::from_env();

    let conn = match db::open_database(&config.db_path) {
        Ok(conn) => Arc::new(Mutex::new(conn)),
        Err(e) => {
            tracing::error!(path = %config.db_path.display(), error = %e, "Cannot open database");
            std::process::exit(1);
        }
    };

    // Credentials may be absent here: the endpoints surface that as a
    // configuration error at request time, matching the HTTP contract.
    let translator: Arc<dyn Translator> = Arc::new(ItzuliClient::new(
        &config.itzuli_api_url,
        config.itzuli_api_key.as_deref().unwrap_or_default(),
        ITZULI_TIMEOUT_SECS,
    ));
    let analyzer: Arc<dyn Analyzer> =
        Arc::new(StanzaClient::new(&config.stanza_api_url, STANZA_TIMEOUT_SECS));
    let generator = Arc::new(AlignmentGenerator::new(Box::new(ClaudeClient::new(
        config.claude_api_key.as_deref().unwrap_or_default(),
        &config.claude_model,
        CLAUDE_TIMEOUT_SECS,
    ))));

    let pipeline = Pipeline::new(
        translator.clone(),
        analyzer.clone(),
        generator,
        Arc::new(AlignmentCache::new(conn.clone())),
        Arc::new(QuotaGate::new(conn, config.daily_limit)),
    );

    let readiness = Readiness::new();
    analysis::spawn_warm_up(analyzer.clone(), readiness.clone());

    let host = config.host.clone();
    let port = config.port;
    let ctx = ApiContext {
        config: Arc::new(config),
        pipeline,
        translator,
        analyzer,
        readiness,
    };

    let mut server = match server::start(ctx, &host, port).await {
        Ok(server) => server,
        Err(e) => {
            tracing::error!(%host, port, error = %e, "Failed to bind alignment server");
            std::process::exit(1);
        }
    };

    let _ = tokio::signal::ctrl_c().await;
    server.shutdown();
    server.stopped().await;
}
