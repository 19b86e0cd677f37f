//! Route ACL
//!
//! Evaluates requests against an ACL rule file, or serves HTTP behind it.

use axum::{Router, extract::Request, middleware};
use clap::{Parser, Subcommand};
use route_acl::{
    Acl, AppConfig, AppError, Decision, RequestView,
    config::{LogFormat, load_config},
    middleware::{Role, authorize},
};
use std::process::ExitCode;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Route ACL - role-based access control for HTTP routes
#[derive(Parser, Debug)]
#[command(name = "route-acl")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, env = "ROUTE_ACL_CONFIG", global = true)]
    config: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "ROUTE_ACL_LOG_LEVEL", global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Evaluate a single request against the rules
    Check {
        /// Role of the caller (falls back to the configured default role)
        #[arg(long)]
        role: Option<String>,

        /// HTTP method
        #[arg(long, default_value = "GET")]
        method: String,

        /// Request path
        #[arg(long)]
        path: String,
    },

    /// Serve HTTP with every request checked against the rules
    Serve {
        /// HTTP server host
        #[arg(long)]
        host: Option<String>,

        /// HTTP server port
        #[arg(long)]
        port: Option<u16>,
    },
}

fn init_logging(config: &AppConfig, level: Option<&str>) {
    let level = level.unwrap_or(&config.logging.level);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let registry = tracing_subscriber::registry().with(filter);
    match config.logging.format {
        LogFormat::Pretty => registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init(),
    }
}

fn build_acl(config: &AppConfig) -> Result<Acl, AppError> {
    let settings = config.acl.clone().unwrap_or_default();
    let acl = Acl::new(&settings).inspect_err(|e| error!(error = %e, "Failed to load ACL rules"))?;

    info!(
        roles = acl.table().role_count(),
        role_header = %acl.role_header(),
        default_role = ?acl.default_role(),
        "ACL ready"
    );

    Ok(acl)
}

async fn echo(request: Request) -> String {
    let role = request
        .extensions()
        .get::<Role>()
        .map(|r| r.0.as_str())
        .unwrap_or("-");
    format!("{} {} as {}\n", request.method(), request.uri().path(), role)
}

/// Bind the listener; `host` may be a name, an IPv4 or an IPv6 address
async fn bind_listener(host: &str, port: u16) -> Result<TcpListener, AppError> {
    TcpListener::bind((host, port))
        .await
        .map_err(|e| AppError::Server(format!("Failed to bind {}:{}: {}", host, port, e)))
}

async fn serve(acl: Acl, host: &str, port: u16) -> Result<(), AppError> {
    let app = Router::new()
        .fallback(echo)
        .layer(middleware::from_fn_with_state(Arc::new(acl), authorize))
        .layer(TraceLayer::new_for_http());

    let listener = bind_listener(host, port).await?;
    if let Ok(addr) = listener.local_addr() {
        info!("Listening on http://{}", addr);
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Received shutdown signal");
        })
        .await
        .map_err(|e| AppError::Server(e.to_string()))?;

    info!("Server stopped");
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();

    let config = load_config(args.config.as_deref())?;
    init_logging(&config, args.log_level.as_deref());

    info!(version = env!("CARGO_PKG_VERSION"), "Starting route-acl");

    let acl = build_acl(&config)?;

    match args.command {
        Command::Check { role, method, path } => {
            let mut request = RequestView { method, path, role };
            match acl.authorize(&mut request) {
                Decision::Allow => {
                    println!("allow");
                    Ok(ExitCode::SUCCESS)
                }
                Decision::Deny(err) => {
                    println!("deny ({}): {}", err.status, err);
                    Ok(ExitCode::FAILURE)
                }
            }
        }
        Command::Serve { host, port } => {
            let host = host.unwrap_or(config.server.host.clone());
            let port = port.unwrap_or(config.server.port);
            serve(acl, &host, port)
                .await
                .inspect_err(|e| error!(error = %e, "Server failed"))?;
            Ok(ExitCode::SUCCESS)
        }
    }
}
