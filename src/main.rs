//! PolyRisk service
//!
//! Main entry point for the PolyRisk polypharmacy risk assessment
//! service.

use std::fs::File;
use std::io::BufReader;
use std::sync::Arc;
use std::time::Duration;

use actix_cors::Cors;
use actix_files as fs;
use actix_web::{web, App, HttpServer};
use anyhow::Context;
use dotenv::dotenv;
use tracing::info;
use tracing_actix_web::TracingLogger;
use tracing_subscriber::EnvFilter;

use polyrisk::ai::GeminiClient;
use polyrisk::api::{self, AppState};
use polyrisk::catalog::{CatalogOptions, DrugCatalog};
use polyrisk::config;
use polyrisk::interactions::InteractionTable;
use polyrisk::store::FileStore;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    init_tracing();

    // Load configuration
    let config = config::load_config().context("failed to load configuration")?;

    // Load the drug catalog and interaction table
    let catalog = DrugCatalog::load_from_file(
        std::path::Path::new(&config.catalog.drugs_path),
        CatalogOptions {
            min_query_len: config.catalog.min_query_len,
            default_limit: config.catalog.search_limit,
        },
    );
    let interactions = InteractionTable::load_from_file(
        std::path::Path::new(&config.catalog.interactions_path),
        config.catalog.max_interaction_rows,
    );
    info!(
        "catalog ready: {} drugs ({:?}), {} interactions",
        catalog.len(),
        catalog.source(),
        interactions.len()
    );

    // Open the record store
    let store = FileStore::open(&config.store.data_dir)
        .await
        .context("failed to open the record store")?;

    // Build the AI client
    let ai = GeminiClient::new(
        &config.ai.base_url,
        &config.ai.model,
        &config.ai.api_key,
        Duration::from_secs(config.ai.timeout_secs),
    )
    .context("failed to build the AI client")?;

    // Create app state
    let app_state = web::Data::new(AppState {
        catalog: Arc::new(catalog),
        interactions: Arc::new(interactions),
        store,
        ai,
        auth: config.auth.clone(),
    });

    let server_config = config.server.clone();
    let bind_addr = format!("{}:{}", server_config.host, server_config.port);
    info!("starting PolyRisk on {}", bind_addr);

    // Start HTTP server
    let server = HttpServer::new(move || {
        let mut app = App::new()
            // Add app state
            .app_data(app_state.clone())
            .app_data(api::json_config())
            // Request tracing
            .wrap(TracingLogger::default())
            .wrap(build_cors(&server_config.cors_origins))
            // API routes
            .configure(api::configure);
        // Serve the bundled web UI when configured
        if let Some(web_root) = &server_config.web_root {
            app = app.service(fs::Files::new("/", web_root).index_file("index.html"));
        }
        app
    });

    match &config.server.tls {
        Some(tls) => {
            let rustls_config = load_rustls_config(&tls.cert_path, &tls.key_path)?;
            server
                .bind_rustls_021(&bind_addr, rustls_config)
                .with_context(|| format!("failed to bind {} with TLS", bind_addr))?
                .run()
                .await?;
        }
        None => {
            server
                .bind(&bind_addr)
                .with_context(|| format!("failed to bind {}", bind_addr))?
                .run()
                .await?;
        }
    }

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("polyrisk=info,actix_web=info"));
    let json_logs = std::env::var("POLYRISK_LOG_JSON").map(|v| v == "1").unwrap_or(false);
    if json_logs {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

fn build_cors(origins: &[String]) -> Cors {
    if origins.is_empty() {
        return Cors::permissive();
    }
    let cors = origins.iter().fold(Cors::default(), |cors, origin| {
        cors.allowed_origin(origin)
    });
    cors.allowed_methods(vec!["GET", "POST", "DELETE"])
        .allow_any_header()
        .max_age(3600)
}

fn load_rustls_config(cert_path: &str, key_path: &str) -> anyhow::Result<rustls::ServerConfig> {
    let cert_file = &mut BufReader::new(
        File::open(cert_path).with_context(|| format!("failed to open {}", cert_path))?,
    );
    let key_file = &mut BufReader::new(
        File::open(key_path).with_context(|| format!("failed to open {}", key_path))?,
    );

    let certs = rustls_pemfile::certs(cert_file)
        .context("failed to read certificate chain")?
        .into_iter()
        .map(rustls::Certificate)
        .collect();
    let mut keys = rustls_pemfile::pkcs8_private_keys(key_file)
        .context("failed to read private keys")?;
    if keys.is_empty() {
        anyhow::bail!("no PKCS#8 private key found in {}", key_path);
    }

    rustls::ServerConfig::builder()
        .with_safe_defaults()
        .with_no_client_auth()
        .with_single_cert(certs, rustls::PrivateKey(keys.remove(0)))
        .context("failed to assemble the TLS configuration")
}
