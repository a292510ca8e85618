#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line runner for the food access map pipelines.
//!
//! Runs the same processing the dashboard performs, writing CSV artifacts
//! instead of rendering a map:
//!
//! - `score` — load the tract dataset and write the combined-score table.
//! - `geocode` — ingest an address upload and write the geocoded /
//!   failed-address exports.
//! - `markers` — ingest uploads and write the deduplicated marker groups.

use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use food_access_map_geocoder::nominatim::Nominatim;
use food_access_map_models::{ScoreWeights, TractRecord, VehicleMode, columns};
use food_access_map_overlay::{write_failed_csv, write_mapped_csv};
use food_access_map_session::{AppConfig, Session};

#[derive(Parser)]
#[command(name = "food_access_map_cli", about = "Food access map pipeline runner")]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compute combined need scores and write the tract table.
    Score {
        /// Poverty weight (defaults to the configured value).
        #[arg(long)]
        poverty_weight: Option<f64>,
        /// Vehicle-access weight.
        #[arg(long)]
        vehicle_weight: Option<f64>,
        /// Food-insecurity weight.
        #[arg(long)]
        food_weight: Option<f64>,
        /// Force normalized scores even when the config disables them.
        #[arg(long, conflicts_with = "no_normalize")]
        normalize: bool,
        /// Use raw percentages instead of normalized scores.
        #[arg(long)]
        no_normalize: bool,
        /// Count households with fewer vehicles than members.
        #[arg(long)]
        fewer_vehicles: bool,
        /// Output CSV path.
        #[arg(long, default_value = "scored_tracts.csv")]
        output: PathBuf,
    },

    /// Geocode an uploaded address file and write the two-way export.
    Geocode {
        /// The CSV or XLSX file to ingest.
        #[arg(long)]
        file: PathBuf,
        /// Output path for rows with coordinates.
        #[arg(long, default_value = "geocoded_addresses.csv")]
        mapped_output: PathBuf,
        /// Output path for rows the geocoder failed on.
        #[arg(long, default_value = "addresses_geocoder_failed_on.csv")]
        failed_output: PathBuf,
    },

    /// Ingest upload files and write deduplicated marker groups.
    Markers {
        /// CSV or XLSX files to ingest.
        #[arg(long, required = true)]
        file: Vec<PathBuf>,
        /// Program types to keep (empty keeps everything).
        #[arg(long)]
        program_type: Vec<String>,
        /// Output CSV path.
        #[arg(long, default_value = "markers.csv")]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    pretty_env_logger::init_custom_env("RUST_LOG");

    let cli = Cli::parse();
    if let Err(err) = run(cli).await {
        log::error!("{err}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load(&cli.config)?;
    let mut session = Session::new(config);

    match cli.command {
        Command::Score {
            poverty_weight,
            vehicle_weight,
            food_weight,
            normalize,
            no_normalize,
            fewer_vehicles,
            output,
        } => {
            let configured = session.config().weights.score_weights()?;
            let weights = ScoreWeights {
                poverty: poverty_weight.unwrap_or(configured.poverty),
                vehicle: vehicle_weight.unwrap_or(configured.vehicle),
                food: food_weight.unwrap_or(configured.food),
                normalize: resolve_normalize(normalize, no_normalize, configured.normalize),
                vehicle_mode: if fewer_vehicles {
                    VehicleMode::FewerVehicles
                } else {
                    configured.vehicle_mode
                },
            };

            let scored = session.scored(&weights)?;
            write_scored_csv(&scored, &output)?;
            log::info!("Wrote {} tracts to {}", scored.len(), output.display());
        }

        Command::Geocode {
            file,
            mapped_output,
            failed_output,
        } => {
            let service = nominatim_service(&session)?;
            let bytes = fs::read(&file)?;
            let name = file_name(&file);

            let (rows, geocoded) = session.ingest_upload(&name, &bytes, &service).await?;
            log::info!("Ingested {rows} rows from {name:?}; geocoded {geocoded}");

            let (mapped, failed) = session.export_split();
            write_mapped_csv(&mapped, fs::File::create(&mapped_output)?)?;
            log::info!("Wrote {} mapped rows to {}", mapped.len(), mapped_output.display());

            write_failed_csv(&failed, fs::File::create(&failed_output)?)?;
            log::info!("Wrote {} failed rows to {}", failed.len(), failed_output.display());
        }

        Command::Markers {
            file,
            program_type,
            output,
        } => {
            let service = nominatim_service(&session)?;
            for path in &file {
                let bytes = fs::read(path)?;
                let name = file_name(path);
                let (rows, geocoded) = session.ingest_upload(&name, &bytes, &service).await?;
                log::info!("Ingested {rows} rows from {name:?}; geocoded {geocoded}");
            }

            let selected: BTreeSet<String> = program_type.into_iter().collect();
            let groups = session.markers(&selected);
            write_markers_csv(&groups, &output)?;
            log::info!("Wrote {} marker groups to {}", groups.len(), output.display());
        }
    }

    Ok(())
}

fn nominatim_service(session: &Session) -> Result<Nominatim, reqwest::Error> {
    let client = reqwest::Client::builder()
        .user_agent("food-access-map")
        .build()?;
    Ok(Nominatim::new(
        client,
        session.config().geocoder.base_url.clone(),
    ))
}

fn file_name(path: &std::path::Path) -> String {
    path.file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned())
}

fn write_scored_csv(records: &[TractRecord], output: &std::path::Path) -> Result<(), Box<dyn std::error::Error>> {
    let mut writer = csv::Writer::from_path(output)?;
    writer.write_record([
        columns::COUNTY,
        columns::TRACT,
        columns::PCT_POVERTY,
        columns::PCT_VEHICLE,
        columns::PCT_FOOD_INSECURE,
        columns::COMBINED_PCT,
    ])?;

    for record in records {
        writer.write_record([
            record.county.clone(),
            record.tract.clone(),
            optional(record.pct_poverty),
            optional(record.pct_vehicle),
            optional(record.pct_food_insecure),
            format!("{:.4}", record.combined_pct),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

fn write_markers_csv(
    groups: &[food_access_map_models::AddressGroup],
    output: &std::path::Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut writer = csv::Writer::from_path(output)?;
    writer.write_record(["key", "lat", "lon", "program_types", "members", "description"])?;

    for group in groups {
        writer.write_record([
            group.key.clone(),
            format!("{:.6}", group.lat),
            format!("{:.6}", group.lon),
            group.program_types.join("; "),
            group.members.to_string(),
            group.description.clone(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

fn optional(value: Option<f64>) -> String {
    value.map_or_else(String::new, |v| format!("{v:.4}"))
}

/// Either flag overrides the configured value; neither keeps it.
const fn resolve_normalize(normalize: bool, no_normalize: bool, configured: bool) -> bool {
    if normalize {
        true
    } else if no_normalize {
        false
    } else {
        configured
    }
}

#[cfg(test)]
mod tests {
    use super::resolve_normalize;

    #[test]
    fn flags_override_configured_normalization_in_both_directions() {
        assert!(resolve_normalize(true, false, false));
        assert!(!resolve_normalize(false, true, true));
    }

    #[test]
    fn configured_value_wins_without_flags() {
        assert!(resolve_normalize(false, false, true));
        assert!(!resolve_normalize(false, false, false));
    }
}
