use anyhow::Result;
use cohortboard::app::{http_fetcher, App};
use cohortboard::config::Config;
use cohortboard::logging::{log, obj, v_str, Domain, Level};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env();
    log(
        Level::Info,
        Domain::System,
        "starting",
        obj(&[("data_base", v_str(&config.data_base))]),
    );

    let mut app = App::new(&config);

    // Cached snapshot first so the dashboard is usable immediately, then a
    // network refresh replaces it wholesale.
    let from_cache = app.bootstrap_from_cache();
    if from_cache {
        log(Level::Info, Domain::System, "serving_cached_snapshot", obj(&[]));
    }

    let fetcher = http_fetcher(&config)?;
    app.refresh(&fetcher).await;

    cohortboard::server::run(app, &config.listen_addr)
}
