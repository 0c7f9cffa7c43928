use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use log::warn;
use serde::Serialize;

use paddock::analysis::format::format_lap_time;
use paddock::analysis::{self, DriverLapSeries, LapSelection, TimeAxis, WeatherChannel};
use paddock::circuits::{GeoBounds, GeoPoint, find_circuit};
use paddock::{
    AppConfig, ArchiveProvider, CircuitMap, CircuitSource, Compound, DashboardContext, Lap,
    PaddockError, Session, SessionCatalog, SessionRepository,
};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Args {
    /// Session archive directory, overrides the config file
    #[arg(long, global = true)]
    archive: Option<PathBuf>,

    /// OpenF1 API base URL, overrides the config file
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args, Debug, Clone)]
struct SessionArgs {
    #[arg(short, long)]
    year: i32,

    #[arg(short, long)]
    circuit: String,

    #[arg(short, long)]
    session: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Circuits raced in a season
    Circuits {
        #[arg(short, long)]
        year: i32,
    },
    /// Session types held at a circuit in a season
    Sessions {
        #[arg(short, long)]
        year: i32,

        #[arg(short, long)]
        circuit: String,
    },
    /// Laps of a session, valid laps unless --quick is given
    Laps {
        #[command(flatten)]
        session: SessionArgs,

        #[arg(long)]
        quick: bool,
    },
    /// Drivers with quick laps in a session
    Drivers {
        #[command(flatten)]
        session: SessionArgs,
    },
    /// Fastest lap of a driver
    Fastest {
        #[command(flatten)]
        session: SessionArgs,

        #[arg(short, long)]
        driver: String,
    },
    /// Tire stints per driver
    Stints {
        #[command(flatten)]
        session: SessionArgs,
    },
    /// Telemetry of two driver laps
    Compare {
        #[command(flatten)]
        session: SessionArgs,

        #[arg(long)]
        driver_a: String,

        #[arg(long)]
        lap_a: u32,

        #[arg(long)]
        driver_b: String,

        #[arg(long)]
        lap_b: u32,
    },
    /// One weather channel over the session
    Weather {
        #[command(flatten)]
        session: SessionArgs,

        #[arg(long, default_value = "AirTemp")]
        channel: WeatherChannel,
    },
    /// Lap time series per driver with the shared time axis
    Trend {
        #[command(flatten)]
        session: SessionArgs,

        #[arg(long, value_enum, default_value_t = TrendLaps::Valid)]
        laps: TrendLaps,
    },
    /// Circuit layouts, or the map positions of one circuit
    Tracks {
        #[arg(short, long)]
        name: Option<String>,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum TrendLaps {
    /// Laps the timing provider classes as quick
    Quick,
    /// Every lap between 30s and 300s
    Valid,
}

impl From<TrendLaps> for LapSelection {
    fn from(value: TrendLaps) -> Self {
        match value {
            TrendLaps::Quick => LapSelection::Quick,
            TrendLaps::Valid => LapSelection::Valid,
        }
    }
}

#[derive(Serialize)]
struct LapRow {
    driver: String,
    lap_number: u32,
    lap_time_s: Option<f64>,
    lap_time: String,
    compound: Compound,
    stint: u32,
}

impl From<Lap> for LapRow {
    fn from(value: Lap) -> Self {
        Self {
            lap_time: format_lap_time(value.lap_time_s),
            driver: value.driver,
            lap_number: value.lap_number,
            lap_time_s: value.lap_time_s,
            compound: value.compound,
            stint: value.stint,
        }
    }
}

#[derive(Serialize)]
struct TrackRow {
    name: String,
    location: String,
    country: String,
    opened: Option<u32>,
    first_gp: Option<u32>,
    length_m: Option<f64>,
    altitude_m: Option<f64>,
}

impl From<&CircuitMap> for TrackRow {
    fn from(value: &CircuitMap) -> Self {
        Self {
            name: value.name.clone(),
            location: value.location.clone(),
            country: value.country.clone(),
            opened: value.opened,
            first_gp: value.first_gp,
            length_m: value.length_m,
            altitude_m: value.altitude_m,
        }
    }
}

#[derive(Serialize)]
struct TrendView {
    axis: Option<TimeAxis>,
    series: Vec<DriverLapSeries>,
}

#[derive(Serialize)]
struct TrackView<'a> {
    circuit: &'a CircuitMap,
    start_finish: Option<GeoPoint>,
    centroid: Option<GeoPoint>,
    bounds: Option<GeoBounds>,
}

fn print_json<T: Serialize>(value: &T) -> Result<(), PaddockError> {
    let output = serde_json::to_string_pretty(value)
        .map_err(|e| PaddockError::WriterError { source: e.into() })?;
    println!("{}", output);
    Ok(())
}

fn load_config(args: &Args) -> AppConfig {
    let mut config = match AppConfig::from_local_file() {
        Ok(Some(config)) => config,
        Ok(None) => AppConfig::default(),
        Err(e) => {
            warn!("Ignoring unreadable config file: {}", e);
            AppConfig::default()
        }
    };
    if let Some(archive) = &args.archive {
        config.archive_dir = archive.clone();
    }
    if let Some(api_url) = &args.api_url {
        config.openf1_base_url = api_url.clone();
    }
    config
}

async fn load_session(config: &AppConfig, args: &SessionArgs) -> Result<Arc<Session>, PaddockError> {
    let provider = ArchiveProvider::new(config.archive_dir.clone())
        .with_quick_lap_threshold(config.quick_lap_threshold);
    let repository = SessionRepository::new(provider)
        .with_ttl(config.cache_ttl())
        .with_capacity(config.cache_capacity)
        .with_load_timeout(config.session_load_timeout());

    let mut context = DashboardContext::new();
    context.select_year(args.year);
    context.select_circuit(args.circuit.clone());
    context.select_session(args.session.clone());
    context
        .load_selected(&repository)
        .await?
        .ok_or_else(|| PaddockError::DataShape {
            reason: "incomplete session selection".to_string(),
        })
}

async fn run(config: AppConfig, command: Commands) -> Result<(), PaddockError> {
    let catalog =
        SessionCatalog::new(config.openf1_base_url.clone()).with_timeout(config.request_timeout());

    match command {
        Commands::Circuits { year } => print_json(&catalog.circuits_for_year(year).await),
        Commands::Sessions { year, circuit } => {
            print_json(&catalog.session_types_for_circuit(year, &circuit).await)
        }
        Commands::Laps { session, quick } => {
            let session = load_session(&config, &session).await?;
            let laps = if quick {
                analysis::quick_laps(&session)
            } else {
                analysis::valid_laps(&session)
            };
            print_json(&laps.into_iter().map(LapRow::from).collect::<Vec<_>>())
        }
        Commands::Drivers { session } => {
            let session = load_session(&config, &session).await?;
            print_json(&analysis::drivers_in_session(&session))
        }
        Commands::Fastest { session, driver } => {
            let session = load_session(&config, &session).await?;
            print_json(&LapRow::from(analysis::fastest_lap(&session, &driver)?))
        }
        Commands::Stints { session } => {
            let session = load_session(&config, &session).await?;
            print_json(&analysis::stints(&session))
        }
        Commands::Compare {
            session,
            driver_a,
            lap_a,
            driver_b,
            lap_b,
        } => {
            let session = load_session(&config, &session).await?;
            print_json(&analysis::compare(
                &session, &driver_a, lap_a, &driver_b, lap_b,
            )?)
        }
        Commands::Weather { session, channel } => {
            let session = load_session(&config, &session).await?;
            print_json(&analysis::weather_series(&session, channel))
        }
        Commands::Trend { session, laps } => {
            let session = load_session(&config, &session).await?;
            let series = analysis::lap_time_series(&session, laps.into());
            print_json(&TrendView {
                axis: analysis::time_axis(&series),
                series,
            })
        }
        Commands::Tracks { name } => {
            let source = CircuitSource::new(config.circuits_geojson_url.clone())
                .with_timeout(config.request_timeout());
            let circuits = source.fetch().await?;
            match name {
                Some(name) => {
                    let circuit = find_circuit(&circuits, &name).ok_or_else(|| {
                        PaddockError::DataShape {
                            reason: format!("no circuit layout named {}", name),
                        }
                    })?;
                    print_json(&TrackView {
                        circuit,
                        start_finish: circuit.start_finish(),
                        centroid: circuit.centroid(),
                        bounds: circuit.bounds(),
                    })
                }
                None => print_json(&circuits.iter().map(TrackRow::from).collect::<Vec<_>>()),
            }
        }
    }
}

fn main() -> ExitCode {
    #[cfg(debug_assertions)]
    colog::init();

    let cli = Args::parse();
    let config = load_config(&cli);

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Could not start async runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(config, cli.command)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{:?} error: {}", e.kind(), e);
            ExitCode::FAILURE
        }
    }
}
