use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use planetary_adjuster_lib::config::{AdjustmentPlan, Settings, SourceKind};
use planetary_adjuster_lib::fetcher::worldbank::DEFAULT_API_BASE;
use planetary_adjuster_lib::limits::registry::LimitKind;
use planetary_adjuster_lib::limits::LimitParameters;
use planetary_adjuster_lib::{build_source, process_all, report};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "planetary-adjuster", version, about = "Planetary-boundary adjusted economic indicators")]
struct Cli {
    /// Where raw series come from
    #[arg(long, env = "PLANETARY_SOURCE", value_enum, default_value = "worldbank", global = true)]
    source: SourceKind,

    /// Directory holding World Bank CSV exports (<series code>.csv)
    #[arg(long, env = "PLANETARY_DATA_DIR", default_value = "./data", global = true)]
    data_dir: PathBuf,

    /// World Bank API base URL
    #[arg(long, env = "WORLDBANK_API_BASE", default_value = DEFAULT_API_BASE, global = true)]
    api_base: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Adjust an indicator for one region
    Adjust {
        /// ISO3 region code
        #[arg(long, default_value = "FRA")]
        region: String,

        #[arg(long, default_value = "gdp")]
        indicator: String,

        /// JSON plan file; defaults to a single water-stress limit
        #[arg(long)]
        plan: Option<PathBuf>,

        /// First year to show (inclusive)
        #[arg(long)]
        from: Option<i32>,

        /// Last year to show (inclusive)
        #[arg(long)]
        to: Option<i32>,

        /// Restrict output to the years where every column is present
        #[arg(long)]
        complete_only: bool,

        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,
    },
    /// List registered indicators and limit configurations
    List,
    /// Sample a limit's response curve
    Curve {
        #[arg(long, default_value = "water_general_wb")]
        config: String,

        /// Take curve overrides from this plan...
        #[arg(long, requires = "limit")]
        plan: Option<PathBuf>,

        /// ...for this limit
        #[arg(long, requires = "plan")]
        limit: Option<String>,

        /// Penalized extrapolation slope past the last point
        #[arg(long)]
        penalty: Option<f64>,

        #[arg(long, default_value_t = 0.0)]
        inf: f64,

        #[arg(long, default_value_t = 1.2)]
        sup: f64,

        #[arg(long, default_value_t = 25)]
        steps: usize,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    Table,
    Csv,
    Json,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let settings = Settings {
        source: cli.source,
        data_dir: cli.data_dir,
        api_base: cli.api_base,
    };

    match cli.command {
        Command::Adjust {
            region,
            indicator,
            plan,
            from,
            to,
            complete_only,
            format,
        } => {
            let plan = match plan {
                Some(path) => AdjustmentPlan::from_file(&path)?,
                None => AdjustmentPlan::default_for(&region),
            };
            info!("Starting adjustment of '{}' for {} ({:?} source)", indicator, region, settings.source);

            let source = build_source(&settings);
            let table = process_all(&region, &indicator, &plan, source).await?;

            let (from, to) = match (complete_only, table.complete_year_range()) {
                (true, Some((first, last))) => (Some(from.map_or(first, |f| f.max(first))), Some(to.map_or(last, |t| t.min(last)))),
                (true, None) => anyhow::bail!("No year has data for every column"),
                (false, _) => (from, to),
            };
            let shown = table.window(from, to);

            match format {
                OutputFormat::Table => print!("{}", report::render_table(&shown)),
                OutputFormat::Csv => shown.write_csv(std::io::stdout())?,
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&shown)?),
            }
        }
        Command::List => print!("{}", report::render_registry()),
        Command::Curve {
            config,
            plan,
            limit,
            penalty,
            inf,
            sup,
            steps,
        } => {
            let kind: LimitKind = config.parse()?;
            let mut parameters = match (plan, limit) {
                (Some(path), Some(name)) => AdjustmentPlan::from_file(&path)?
                    .get(&name)
                    .map(|c| c.parameters.clone())
                    .with_context(|| format!("Limit '{}' not found in plan", name))?,
                _ => LimitParameters::default(),
            };
            if penalty.is_some() {
                parameters.penalty_coefficient = penalty;
            }

            let curve = parameters.curve(kind.default_points())?;
            print!("{}", report::render_curve(&curve.sample(inf, sup, steps)?));
        }
    }

    Ok(())
}
