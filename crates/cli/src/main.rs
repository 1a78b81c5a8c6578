use clap::Parser;
use folio_core::fetch::{RemoteStockFetcher, ReqwestTransport};
use folio_core::presentation::{PortfolioViewModel, ViewPhase};
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod render;
mod settings;

#[derive(Debug, Parser)]
#[command(name = "folio")]
struct Args {
    /// Portfolio endpoint. Overrides PORTFOLIO_ENDPOINT and the built-in URL.
    #[arg(long)]
    endpoint: Option<String>,

    /// Print the fetched stocks as JSON instead of a table.
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();

    let settings = settings::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();
    let endpoint = settings.resolve_endpoint(args.endpoint.as_deref());

    let transport = match ReqwestTransport::new() {
        Ok(transport) => transport,
        Err(err) => {
            sentry_anyhow::capture_anyhow(&err);
            return Err(err);
        }
    };

    let fetcher = Arc::new(RemoteStockFetcher::with_endpoint(transport, endpoint));
    tracing::debug!(endpoint = fetcher.endpoint(), "loading portfolio");
    let view_model = PortfolioViewModel::new(fetcher);
    let state = view_model.settled().await;

    match state.phase {
        ViewPhase::Ready => {
            let mut out = std::io::stdout().lock();
            if args.json {
                render::write_json(&mut out, &state.stocks)?;
            } else {
                render::write_table(&mut out, &state.stocks)?;
            }
            Ok(ExitCode::SUCCESS)
        }
        ViewPhase::Failed | ViewPhase::Loading => {
            match state.last_error.as_deref() {
                Some(msg) => eprintln!("{msg}"),
                None => eprintln!("Unexpected error while loading the portfolio."),
            }
            Ok(ExitCode::FAILURE)
        }
    }
}

fn init_sentry(settings: &settings::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
