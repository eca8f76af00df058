use hockey_standings_lambda_rust::config::Config;
use hockey_standings_lambda_rust::handler::TeamsResource;
use hockey_standings_lambda_rust::model::request::Request;
use hockey_standings_lambda_rust::store::PgTeamStore;
use lambda_runtime::{service_fn, Error, LambdaEvent};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Initialize structured logging with tracing
    let _ = tracing_subscriber::fmt()
        .json()
        .with_max_level(tracing::Level::INFO)
        .with_current_span(false)
        .with_target(false)
        .with_ansi(false)
        .without_time()
        .try_init();

    // Config is read once per cold start and handed to the store and handler
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Invalid configuration");
            return Err(e.into());
        }
    };
    info!("Configuration loaded");

    let resource = TeamsResource::new(PgTeamStore::new(&config), &config);
    let resource = &resource;

    lambda_runtime::run(service_fn(move |event: LambdaEvent<Request>| async move {
        resource.handle_event(event).await
    }))
    .await
}
