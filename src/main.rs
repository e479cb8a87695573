use clap::{Parser, Subcommand};
use std::process::ExitCode;
use std::sync::Arc;

use pass_o_mat::api::{HttpPredictionApi, PassQuery, PredictionApi};
use pass_o_mat::config::Config;
use pass_o_mat::map::MapSync;
use pass_o_mat::scheduler::{Engine, SystemClock};
use pass_o_mat::selection::pick_active_or_next;
use pass_o_mat::view::text;

#[derive(Parser)]
#[command(name = "pass-o-mat")]
#[command(about = "Live satellite pass display")]
struct Cli {
    /// Configuration file (YAML)
    #[arg(short, long)]
    config: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that the prediction service is reachable
    Health,
    /// List satellites known to the service
    Catalog,
    /// Print the upcoming passes for a satellite
    Passes { satellite: Option<String> },
    /// Follow a satellite live until interrupted
    Watch { satellite: Option<String> },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => match Config::from_file(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Config error: {}", e);
                return ExitCode::FAILURE;
            }
        },
        None => Config::default(),
    };

    let api = match HttpPredictionApi::new(&config.service.base_url, config.service.timeout) {
        Ok(api) => api,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match cli.command {
        Commands::Health => health(&api).await,
        Commands::Catalog => catalog(&api).await,
        Commands::Passes { satellite } => passes(&api, &config, satellite).await,
        Commands::Watch { satellite } => watch(api, &config, satellite).await,
    }
}

async fn health(api: &HttpPredictionApi) -> ExitCode {
    match api.health().await {
        Ok(health) => {
            println!("{} is {} (server time {})", api.base_url(), health.status, health.utc);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn catalog(api: &HttpPredictionApi) -> ExitCode {
    let satellites = match api.satellites().await {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let status = match api.tle_status().await {
        Ok(status) => status,
        Err(e) => {
            log::warn!("TLE status unavailable: {}", e);
            Vec::new()
        }
    };

    for sat in &satellites {
        let tle = status.iter().find(|s| s.key == sat.key);
        let age = match sat.tle_age_seconds {
            Some(secs) => format!("{:.1}h", secs / 3600.0),
            None => "-".to_string(),
        };
        let ttl = match tle {
            Some(t) => format!("/{}h", t.ttl_seconds / 3600),
            None => String::new(),
        };
        let source = tle
            .and_then(|t| t.meta.as_ref())
            .and_then(|m| m.source.as_deref())
            .or(sat.source.as_deref())
            .unwrap_or("-");
        println!(
            "  {:<12} {:>6}  TLE {:>7}{:<4} {}{}",
            sat.key,
            sat.catalog_number,
            age,
            ttl,
            source,
            if sat.stale { " (stale)" } else { "" }
        );
    }
    ExitCode::SUCCESS
}

async fn passes(api: &HttpPredictionApi, config: &Config, satellite: Option<String>) -> ExitCode {
    let Some(satellite) = satellite.or_else(|| config.satellites.preferred.clone()) else {
        eprintln!("No satellite given and none preferred in config");
        return ExitCode::FAILURE;
    };

    let query = PassQuery {
        satellite,
        hours: config.passes.window_hours,
        min_elevation_deg: config.passes.min_elevation_deg,
        start: None,
    };
    let window = match api.passes(&query).await {
        Ok(w) => w,
        Err(e) if e.code() == Some(503) => {
            eprintln!("No orbital data for {} yet: {}", query.satellite, e);
            return ExitCode::FAILURE;
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    println!(
        "{} ({}) passes above {}° from {} to {}",
        window.satellite.key,
        window.satellite.catalog_number,
        window.min_elevation_deg,
        window.start_utc,
        window.end_utc
    );
    let next = pick_active_or_next(&window.passes, chrono::Utc::now()).map(|p| p.id());
    for pass in &window.passes {
        println!(
            "  {}{}{} -> {} max {:.1}°",
            if Some(pass.id()) == next { '>' } else { ' ' },
            if pass.rise_estimated { '~' } else { ' ' },
            pass.rise_local.format("%Y-%m-%d %H:%M:%S"),
            pass.set_local.format("%H:%M:%S"),
            pass.max_elevation_deg
        );
    }
    ExitCode::SUCCESS
}

async fn watch(api: HttpPredictionApi, config: &Config, satellite: Option<String>) -> ExitCode {
    let mut settings = config.sync_settings();
    if satellite.is_some() {
        settings.preferred_satellite = satellite;
    }

    log::info!("Following {} from {}", display_name(&settings.preferred_satellite), api.base_url());

    let (engine, handle) = Engine::new(Arc::new(api), Arc::new(SystemClock), settings);
    let engine_task = tokio::spawn(engine.run());

    let mut view = handle.view();
    let mut map = MapSync::new();

    loop {
        {
            let model = view.borrow_and_update();
            let frame = map.sync(model.pass_track.as_ref(), model.orbit_track.as_ref());
            if !frame.is_idle() {
                log::debug!("Map update: {:?}", frame);
            }
            for line in text::render(&model, &frame) {
                println!("{}", line);
            }
            println!();
        }

        tokio::select! {
            changed = view.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                log::info!("Interrupted, shutting down");
                if let Err(e) = handle.shutdown().await {
                    log::warn!("{}", e);
                }
                break;
            }
        }
    }

    if let Err(e) = engine_task.await {
        eprintln!("Sync engine failed: {}", e);
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

fn display_name(satellite: &Option<String>) -> &str {
    satellite.as_deref().unwrap_or("first catalog satellite")
}
