use crate::auth::Authenticator;
use crate::catalog::CatalogQuery;
use crate::config::{resolve_credentials, ResolvedConfig, SearchConfigFile};
use crate::constants::DEFAULT_COLLECTION;
use crate::downloader::ArchiveFetcher;
use crate::errors::{AppError, AppResult};
use crate::extractor::extract_all;
use crate::models::{AreaOfInterest, CatalogItem, Credentials, DateRange, SearchFilter};
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::path::PathBuf;
use tracing::{info, warn};

// CLI metadata constants
const APP_VERSION: &str = env!("CARGO_PKG_VERSION");
const APP_AUTHOR: &str = env!("CARGO_PKG_AUTHORS");
const APP_ABOUT: &str = env!("CARGO_PKG_DESCRIPTION");

/// Parses command-line arguments and executes the requested subcommand.
///
/// Subcommands:
/// - `search`: list the products matching a filter (no credentials needed)
/// - `download`: authenticate, search, download every match, optionally extract
/// - `extract`: unpack every archive in a directory
/// - `toml`: run the download workflow from a TOML file
///
/// Credentials are read from `CDSE_USERNAME` and `CDSE_PASSWORD`; the `toml`
/// subcommand also accepts them from the file.
pub async fn cli() -> AppResult<()> {
    let cmd = build_command();
    let mut cmd_for_help = cmd.clone();
    let matches = cmd.get_matches();

    match matches.subcommand() {
        Some(("search", sub)) => {
            let (filter, config) = parse_search_args(sub)?;
            let items = run_search(&filter, &config).await?;
            for item in &items {
                println!("{}\t{}", item.id, item.name);
            }
        }
        Some(("download", sub)) => {
            let (filter, mut config) = parse_search_args(sub)?;
            if let Some(dir) = sub.get_one::<PathBuf>("dir") {
                config.download_dir = dir.clone();
            }
            let credentials = resolve_credentials(None, None)?;
            run_workflow(&filter, credentials, &config, sub.get_flag("extract")).await?;
        }
        Some(("extract", sub)) => {
            let dir = sub.get_one::<PathBuf>("dir").expect("dir is required");
            let extracted = extract_all(dir).await?;
            info!(archives = extracted.len(), "Extraction finished");
        }
        Some(("toml", sub)) => {
            let config_path = sub
                .get_one::<PathBuf>("config")
                .expect("config is required");

            let file_config = SearchConfigFile::from_toml_file(config_path)?;
            let filter = file_config.search_filter()?;
            let credentials = file_config.credentials()?;
            run_workflow(
                &filter,
                credentials,
                &file_config.resolved,
                file_config.extract,
            )
            .await?;
        }
        _ => {
            cmd_for_help
                .print_help()
                .map_err(|e| AppError::Io(format!("Failed to print help: {e}")))?;
        }
    }

    Ok(())
}

pub(crate) fn build_command() -> Command<'static> {
    Command::new("sentinel-fetch")
        .version(APP_VERSION)
        .author(APP_AUTHOR)
        .about(APP_ABOUT)
        .subcommand(with_search_args(
            Command::new("search").about("List products matching an area, a date range and a name"),
        ))
        .subcommand(
            with_search_args(
                Command::new("download")
                    .about("Search, then download every matching archive")
                    .after_help("Credentials are read from CDSE_USERNAME and CDSE_PASSWORD.\nExample:\n  sentinel-fetch download -n SLC --bbox 119.76 -1.05 119.96 -0.65 -s 2018-09-10 -e 2018-09-22 --extract"),
            )
            .arg(
                Arg::new("dir")
                    .short('d')
                    .long("dir")
                    .help("Directory the archives are written to")
                    .value_parser(clap::value_parser!(PathBuf))
                    .action(ArgAction::Set),
            )
            .arg(
                Arg::new("extract")
                    .short('x')
                    .long("extract")
                    .help("Unpack the downloaded archives")
                    .action(ArgAction::SetTrue),
            ),
        )
        .subcommand(
            Command::new("extract")
                .about("Unpack every ZIP archive in a directory")
                .arg(
                    Arg::new("dir")
                        .help("Directory containing the archives")
                        .required(true)
                        .value_parser(clap::value_parser!(PathBuf)),
                ),
        )
        .subcommand(
            Command::new("toml")
                .about("Run the download workflow using a TOML configuration file")
                .arg(
                    Arg::new("config")
                        .help("Path to the TOML config file")
                        .required(true)
                        .value_parser(clap::value_parser!(PathBuf)),
                ),
        )
}

fn with_search_args(cmd: Command<'static>) -> Command<'static> {
    cmd.allow_negative_numbers(true)
        .arg(
            Arg::new("collection")
                .short('C')
                .long("collection")
                .help("Collection name, e.g. SENTINEL-1 or SENTINEL-2")
                .default_value(DEFAULT_COLLECTION)
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("name")
                .short('n')
                .long("name")
                .help("Substring the product name must contain, e.g. SLC")
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("bbox")
                .short('b')
                .long("bbox")
                .help("Area of interest as LON_MIN LAT_MIN LON_MAX LAT_MAX (degrees)")
                .required(true)
                .number_of_values(4)
                .value_names(&["LON_MIN", "LAT_MIN", "LON_MAX", "LAT_MAX"])
                .value_parser(clap::value_parser!(f64)),
        )
        .arg(
            Arg::new("start")
                .short('s')
                .long("start")
                .help("First acquisition date, inclusive (YYYY-MM-DD)")
                .required(true)
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("end")
                .short('e')
                .long("end")
                .help("Last acquisition date, exclusive (YYYY-MM-DD)")
                .required(true)
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("paginate")
                .short('p')
                .long("paginate")
                .help("Follow all result pages instead of stopping after the first")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("timeout")
                .short('t')
                .long("timeout")
                .help("Request timeout in seconds")
                .value_parser(clap::value_parser!(u64))
                .action(ArgAction::Set),
        )
}

fn parse_search_args(sub: &ArgMatches) -> AppResult<(SearchFilter, ResolvedConfig)> {
    let collection = sub
        .get_one::<String>("collection")
        .expect("collection has default_value");
    let name = sub
        .get_one::<String>("name")
        .map(String::as_str)
        .unwrap_or_default();
    let bbox: Vec<f64> = sub
        .get_many::<f64>("bbox")
        .expect("bbox is required")
        .copied()
        .collect();
    let [lon_min, lat_min, lon_max, lat_max] = bbox[..] else {
        return Err(AppError::InvalidInput(format!(
            "Expected 4 bounding box values, got {}",
            bbox.len()
        )));
    };
    let start = sub.get_one::<String>("start").expect("start is required");
    let end = sub.get_one::<String>("end").expect("end is required");

    let filter = SearchFilter::builder(collection.as_str())
        .name_contains(name)
        .area(AreaOfInterest::rectangle(lon_min, lat_min, lon_max, lat_max)?)
        .dates(DateRange::parse(start, end)?)
        .build()?;

    let mut config = ResolvedConfig::default();
    if sub.get_flag("paginate") {
        config.paginate = true;
    }
    if let Some(&timeout) = sub.get_one::<u64>("timeout") {
        config.timeout_secs = timeout;
    }
    config.validate()?;

    Ok((filter, config))
}

async fn run_search(filter: &SearchFilter, config: &ResolvedConfig) -> AppResult<Vec<CatalogItem>> {
    let client = config.http_client()?;
    let items = CatalogQuery::new(client, config).search(filter).await?;
    info!(found = items.len(), "Found {} images", items.len());
    Ok(items)
}

/// Authenticates, searches, downloads each match in turn, then optionally extracts.
async fn run_workflow(
    filter: &SearchFilter,
    credentials: Credentials,
    config: &ResolvedConfig,
    extract: bool,
) -> AppResult<()> {
    let client = config.http_client()?;

    let authenticator = Authenticator::login(client.clone(), config, credentials).await?;

    let ids = CatalogQuery::new(client.clone(), config)
        .search_ids(filter)
        .await?;
    print_download_info(filter, config, ids.len());

    let mut fetcher = ArchiveFetcher::new(client, config, authenticator);
    let report = fetcher
        .fetch_all(&ids, &config.download_dir, filter.name_contains())
        .await?;

    let extraction = if !extract {
        Ok(())
    } else if report.written.is_empty() {
        info!("No archives written, skipping extraction");
        Ok(())
    } else {
        info!("Starting extraction phase");
        extract_all(&config.download_dir).await.map(|_| ())
    };

    // Fetch failures take precedence over an extraction failure
    if let Err(e) = report.ensure_success() {
        if let Err(extract_err) = &extraction {
            warn!(error = %extract_err, "Extraction failed");
        }
        return Err(e);
    }
    extraction?;

    info!(
        collection = filter.collection(),
        archives = report.written.len(),
        "All operations completed successfully"
    );
    Ok(())
}

fn print_download_info(filter: &SearchFilter, config: &ResolvedConfig, products: usize) {
    info!(
        collection = filter.collection(),
        name_contains = filter.name_contains(),
        start = %filter.dates().start(),
        end = %filter.dates().end(),
        products = products,
        download_dir = %config.download_dir.display(),
        "Starting download"
    );
}
