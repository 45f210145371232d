//! # CLI
//!
//! clap-based command line interface.
//!
//! ```text
//! placemark init [--force]
//! placemark import <FILE>
//! placemark reverse --lat <LAT> --lon <LON> [--json] [--local-only]
//! placemark serve [--host <HOST>] [--port <PORT>] [--api-key <KEY>]
//! ```
//!
//! Each command is a plain `cmd_*` function so it can be driven from tests
//! without going through argument parsing.

use crate::api::{self, AppState};
use crate::config::{
    DEFAULT_HOST, DEFAULT_PORT, DEFAULT_RATE_LIMIT, DEFAULT_TIMEOUT_SECS, NominatimConfig,
    ServerConfig, default_user_agent,
};
use crate::geocoder::HybridGeocoder;
use crate::nominatim::NominatimClient;
use clap::{Parser, Subcommand};
use placemark_core::storage::parse_records;
use placemark_core::{
    Error, GeoPoint, PlaceRepository, RedbPlaces, ResponseFormat, ReverseGeocodeResult,
};
use std::num::NonZeroU32;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

// =============================================================================
// ARGUMENTS
// =============================================================================

#[derive(Debug, Parser)]
#[command(
    name = "placemark",
    version,
    about = "Reverse geocoding with a Nominatim backend and a local fallback"
)]
pub struct Cli {
    /// Local place database (redb).
    #[arg(long, env = "PLACEMARK_DB", default_value = "placemark.redb", global = true)]
    pub db: PathBuf,

    /// Nominatim base URL. Remote lookups are skipped when unset.
    #[arg(long, env = "PLACEMARK_NOMINATIM_URL", global = true)]
    pub nominatim_url: Option<String>,

    /// Response format requested from Nominatim (json or xml).
    #[arg(long, default_value = "json", global = true)]
    pub format: ResponseFormat,

    /// Nominatim request timeout in seconds.
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS, global = true)]
    pub timeout_secs: u64,

    /// Maximum Nominatim requests per second.
    #[arg(long, default_value_t = DEFAULT_RATE_LIMIT, global = true)]
    pub rate_limit: u32,

    /// User-Agent sent to Nominatim.
    #[arg(long, global = true)]
    pub user_agent: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create an empty local place database.
    Init {
        /// Overwrite an existing database.
        #[arg(long)]
        force: bool,
    },

    /// Import places from a JSON array of {latitude, longitude, country, state, city}.
    Import { file: PathBuf },

    /// Reverse geocode a coordinate.
    Reverse {
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,

        #[arg(long, allow_negative_numbers = true)]
        lon: f64,

        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,

        /// Skip Nominatim and only consult the local database.
        #[arg(long)]
        local_only: bool,
    },

    /// Run the HTTP API.
    Serve {
        #[arg(long, default_value = DEFAULT_HOST)]
        host: String,

        #[arg(long, default_value_t = DEFAULT_PORT)]
        port: u16,

        /// Bearer token required by the API (except /health).
        #[arg(long, env = "PLACEMARK_API_KEY")]
        api_key: Option<String>,
    },
}

impl Cli {
    /// Nominatim settings from the global options.
    pub fn nominatim_config(&self) -> Result<NominatimConfig, Error> {
        let requests_per_second = NonZeroU32::new(self.rate_limit)
            .ok_or_else(|| Error::Config("--rate-limit must be at least 1".to_string()))?;
        Ok(NominatimConfig {
            url: self.nominatim_url.clone(),
            format: self.format,
            timeout: Duration::from_secs(self.timeout_secs),
            user_agent: self.user_agent.clone().unwrap_or_else(default_user_agent),
            requests_per_second,
        })
    }
}

/// Dispatch a parsed command line.
pub async fn run(cli: Cli) -> Result<(), Error> {
    let nominatim = cli.nominatim_config()?;
    match cli.command {
        Commands::Init { force } => cmd_init(&cli.db, force),
        Commands::Import { ref file } => cmd_import(&cli.db, file).map(|_| ()),
        Commands::Reverse {
            lat,
            lon,
            json,
            local_only,
        } => cmd_reverse(&cli.db, nominatim, lat, lon, json, local_only)
            .await
            .map(|_| ()),
        Commands::Serve {
            ref host,
            port,
            ref api_key,
        } => {
            let server = ServerConfig {
                host: host.clone(),
                port,
                api_key: api_key.clone(),
            };
            cmd_serve(&cli.db, nominatim, server).await
        }
    }
}

// =============================================================================
// DATABASE HELPERS
// =============================================================================

/// Open the database if it exists, create it otherwise.
pub fn open_or_create_places(db_path: &Path) -> Result<RedbPlaces, Error> {
    if db_path.exists() {
        RedbPlaces::open(db_path)
    } else {
        RedbPlaces::create(db_path)
    }
}

/// Local repository for lookups, if a database exists at `db_path`.
pub fn local_repository(db_path: &Path) -> Result<Option<Arc<dyn PlaceRepository>>, Error> {
    if !db_path.exists() {
        info!(
            "No local place database at {}, local fallback disabled",
            db_path.display()
        );
        return Ok(None);
    }
    let places: Arc<dyn PlaceRepository> = Arc::new(RedbPlaces::open(db_path)?);
    Ok(Some(places))
}

// =============================================================================
// COMMANDS
// =============================================================================

/// Create an empty database at `db_path`.
pub fn cmd_init(db_path: &Path, force: bool) -> Result<(), Error> {
    if db_path.exists() {
        if !force {
            return Err(Error::AlreadyExists(db_path.to_path_buf()));
        }
        std::fs::remove_file(db_path)?;
    }
    RedbPlaces::create(db_path)?;
    println!("Initialized place database at {}", db_path.display());
    Ok(())
}

/// Import a JSON gazetteer file. Returns the number of records written.
pub fn cmd_import(db_path: &Path, file: &Path) -> Result<usize, Error> {
    let content = std::fs::read_to_string(file)?;
    let records = parse_records(&content)?;
    let places = open_or_create_places(db_path)?;
    let count = places.import(&records)?;
    println!(
        "Imported {} places into {} ({} cells occupied)",
        count,
        db_path.display(),
        places.len()?
    );
    Ok(count)
}

/// Reverse geocode one coordinate and print the result.
pub async fn cmd_reverse(
    db_path: &Path,
    nominatim: NominatimConfig,
    lat: f64,
    lon: f64,
    json: bool,
    local_only: bool,
) -> Result<Option<ReverseGeocodeResult>, Error> {
    let point = GeoPoint::new(lat, lon)?;
    let geocoder = HybridGeocoder::new(
        NominatimClient::new(nominatim)?,
        local_repository(db_path)?,
    );

    let result = if local_only {
        geocoder.reverse_geocode_local(&point).await?
    } else {
        geocoder.reverse_geocode(&point).await?
    };

    print_result(&point, result.as_ref(), json)?;
    Ok(result)
}

/// Run the HTTP API until Ctrl-C.
pub async fn cmd_serve(
    db_path: &Path,
    nominatim: NominatimConfig,
    server: ServerConfig,
) -> Result<(), Error> {
    let remote = NominatimClient::new(nominatim)?;
    if !remote.is_configured() {
        info!("No Nominatim URL configured, serving from the local database only");
    }
    let geocoder = HybridGeocoder::new(remote, local_repository(db_path)?);
    let state = Arc::new(AppState::new(geocoder, server.api_key.clone()));
    api::serve(state, &server.addr()).await
}

fn print_result(
    point: &GeoPoint,
    result: Option<&ReverseGeocodeResult>,
    json: bool,
) -> Result<(), Error> {
    if json {
        let list: Vec<&ReverseGeocodeResult> = result.into_iter().collect();
        println!("{}", serde_json::to_string_pretty(&list)?);
        return Ok(());
    }

    let Some(result) = result else {
        println!("No place found for {}", point);
        return Ok(());
    };
    println!("Country: {}", result.country.as_deref().unwrap_or("-"));
    println!("State:   {}", result.state.as_deref().unwrap_or("-"));
    println!("City:    {}", result.city.as_deref().unwrap_or("-"));
    Ok(())
}
