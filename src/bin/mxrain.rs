use std::time::Duration;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use mxrain::config::{Config, DEFAULT_BASE_URL, DEFAULT_CONCURRENCY, DEFAULT_LANG};
use mxrain::dashboard::{refresh, AppState};
use mxrain::fetch::WeatherClient;
use mxrain::location::{find_state, states_in, Region};
use mxrain::views;

#[derive(Parser)]
#[command(name = "mxrain")]
#[command(about = "Rain outlook for the states of Mexico, from OpenWeather")]
#[command(arg_required_else_help = true)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// OpenWeather API key
    #[arg(long, global = true, env = "OPENWEATHER_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Base URL of the OpenWeather data API
    #[arg(long, global = true, env = "OPENWEATHER_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Language of the weather descriptions
    #[arg(long, global = true, default_value = DEFAULT_LANG)]
    lang: String,

    /// IANA timezone that defines calendar days and displayed times
    #[arg(long, global = true, default_value = "America/Mexico_City")]
    timezone: String,

    /// Only show states of this region
    #[arg(long, global = true, value_enum, default_value_t = RegionArg::All)]
    region: RegionArg,

    /// Number of states fetched at the same time (1 = one after another)
    #[arg(long, global = true, default_value_t = DEFAULT_CONCURRENCY)]
    concurrency: usize,

    /// How long provider responses are reused
    #[arg(long, global = true, value_name = "SECONDS", default_value_t = 3600)]
    cache_ttl: u64,

    /// Refresh and redraw every N minutes instead of exiting
    #[arg(long, global = true, value_name = "MINUTES")]
    watch: Option<u64>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Rain probability map markers
    Map {
        /// Output a GeoJSON FeatureCollection instead of a table
        #[arg(long)]
        geojson: bool,
    },
    /// Current conditions per state
    Current,
    /// Rain forecast per state for the next 5 days
    Forecast {
        /// Also show the day-by-day forecast of this state
        #[arg(long)]
        state: Option<String>,
    },
    /// Average rain outlook per region
    Regions,
    /// Descriptive statistics and correlations
    Stats,
    /// Output one JSON object per state
    Json,
}

#[derive(Clone, Copy, ValueEnum)]
enum RegionArg {
    All,
    Norte,
    Centro,
    Sur,
}

impl From<RegionArg> for Option<Region> {
    fn from(arg: RegionArg) -> Self {
        match arg {
            RegionArg::All => None,
            RegionArg::Norte => Some(Region::Norte),
            RegionArg::Centro => Some(Region::Centro),
            RegionArg::Sur => Some(Region::Sur),
        }
    }
}

fn init_logging(verbose: bool) {
    // Fetch failures already reach the user through the footer.
    let default = if verbose { "mxrain=debug" } else { "error" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn build_config(cli: &Cli) -> anyhow::Result<Config> {
    Ok(Config::new(cli.api_key.clone())?
        .base_url(&cli.base_url)
        .lang(&cli.lang)
        .timezone(&cli.timezone)?
        .concurrency(cli.concurrency)
        .cache_ttl(Duration::from_secs(cli.cache_ttl)))
}

/// Pause between refreshes in watch mode; at least one minute.
fn watch_interval(minutes: u64) -> Duration {
    Duration::from_secs(minutes.max(1).saturating_mul(60))
}

/// Print the view selected by `command` for the current state.
///
/// Machine-readable outputs keep stdout clean and send the footer to stderr.
fn render(command: &Command, state: &AppState) -> anyhow::Result<()> {
    let machine_readable = match command {
        Command::Map { geojson: true } => {
            let geojson = views::map_geojson(state);
            println!("{}", serde_json::to_string_pretty(&geojson)?);
            true
        }
        Command::Map { geojson: false } => {
            print!("{}", views::map_view(state));
            false
        }
        Command::Current => {
            print!("{}", views::current_view(state));
            false
        }
        Command::Forecast { state: selected } => {
            print!("{}", views::forecast_view(state));
            if let Some(name) = selected {
                let result = state
                    .result(name)
                    .with_context(|| format!("no result for state '{name}'"))?;
                println!();
                print!("{}", views::daily_view(result));
            }
            false
        }
        Command::Regions => {
            print!("{}", views::regions_view(state));
            false
        }
        Command::Stats => {
            print!("{}", views::stats_view(state));
            false
        }
        Command::Json => {
            print!("{}", views::json_lines(state)?);
            true
        }
    };

    if machine_readable {
        eprint!("{}", views::footer(state));
    } else {
        println!();
        print!("{}", views::footer(state));
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    // Everything that can fail without the network fails here, before any request is made.
    let config = build_config(&cli)?;
    let locations = states_in(cli.region.into());
    if let Command::Forecast { state: Some(name) } = &cli.command {
        if find_state(&locations, name).is_none() {
            bail!("unknown state '{name}' for the selected region");
        }
    }
    let client = WeatherClient::new(config).context("failed to build HTTP client")?;

    let mut state = AppState::default();
    loop {
        if state.is_loaded() {
            tracing::info!("refreshing; previous results stay on screen until done");
        }
        state = refresh(&client, &locations).await;
        render(&cli.command, &state)?;

        let Some(minutes) = cli.watch else {
            break;
        };
        tokio::time::sleep(watch_interval(minutes)).await;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn watch_interval_bounds() {
        assert_eq!(watch_interval(0), Duration::from_secs(60));
        assert_eq!(watch_interval(15), Duration::from_secs(900));
        assert_eq!(watch_interval(u64::MAX), Duration::from_secs(u64::MAX));
    }
}
