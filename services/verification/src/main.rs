use std::time::Duration;

use sea_orm::{ConnectOptions, Database};
use tracing::{info, warn};

use cheatplace_core::config::Config;
use cheatplace_core::tracing::init_tracing;
use cheatplace_verification::config::VerificationConfig;
use cheatplace_verification::infra::mailer::ResendMailer;
use cheatplace_verification::router::build_router;
use cheatplace_verification::state::AppState;
use cheatplace_verification::usecase::sweep::PurgeExpiredCodesUseCase;

#[tokio::main]
async fn main() {
    init_tracing();

    let config = VerificationConfig::from_env();
    let upstream_timeout = config.upstream_timeout();

    let statement_timeout = config.statement_timeout();
    let mut db_options = ConnectOptions::new(config.database_url.clone());
    db_options
        .connect_timeout(upstream_timeout)
        .acquire_timeout(upstream_timeout)
        .sqlx_logging(false)
        .map_sqlx_postgres_opts(move |opts| {
            opts.options([("statement_timeout", statement_timeout.as_str())])
        });
    let db = Database::connect(db_options)
        .await
        .expect("failed to connect to database");

    let mailer = ResendMailer::new(
        config.resend_api_url.clone(),
        config.resend_api_key.clone(),
        config.mail_from.clone(),
        upstream_timeout,
    )
    .expect("failed to build mailer");

    let state = AppState {
        db,
        mailer,
        platform_jwt_secret: config.platform_jwt_secret.clone(),
    };

    spawn_sweeper(state.clone(), config.sweep_interval());

    let router = build_router(state);
    let addr = format!("0.0.0.0:{}", config.verification_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind");

    info!("verification service listening on {addr}");
    axum::serve(listener, router).await.expect("server error");
}

/// Periodically delete codes that fell out of the rate window.
fn spawn_sweeper(state: AppState, every: Duration) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        loop {
            ticker.tick().await;
            let usecase = PurgeExpiredCodesUseCase {
                codes: state.code_repo(),
                clock: state.clock(),
            };
            if let Err(e) = usecase.execute().await {
                warn!(error = ?e, "expired code sweep failed");
            }
        }
    });
}
