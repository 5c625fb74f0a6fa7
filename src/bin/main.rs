//! mf-translate CLI - Translate MetricFlow models for BI tools
//!
//! Usage:
//!   mf-translate translate --model <name> --to-looker-view <view>
//!   mf-translate translate --model <name> --to-cube-cube <cube>
//!   mf-translate translate --model <name> --to-lightdash [<dbt_model>]
//!   mf-translate merge-yaml <source.yml> <update.yml>
//!   mf-translate looker-query --metrics <a,b> [--group-by <x,y>] [--order-by <-a>]
//!
//! Examples:
//!   mf-translate --manifest-dir jaffle/target translate --model orders --to-looker-view orders
//!   mf-translate looker-query --metrics order_total --group-by order_id__ordered_at --looker-model jaffle

use clap::{ArgGroup, Parser, Subcommand, ValueEnum};
use mf_translate::assemble::ViewAssembler;
use mf_translate::compose::FilterStyle;
use mf_translate::config::Settings;
use mf_translate::dialect::Dialect;
use mf_translate::emit::emit;
use mf_translate::manifest::{load_dir, ManifestStore};
use mf_translate::merge::merge_dbt_yaml;
use mf_translate::query::{to_looker_query, MetricFlowQuery};
use std::error::Error;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

type CmdResult = Result<(), Box<dyn Error>>;

#[derive(Parser)]
#[command(name = "mf-translate")]
#[command(about = "Translate MetricFlow semantic models into LookML, Cube and Lightdash")]
#[command(version)]
struct Cli {
    /// Path to a mf-translate.toml config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// dbt target directory holding the manifests (overrides the config)
    #[arg(long, global = true)]
    manifest_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Translate one semantic model and its metrics
    #[command(group(
        ArgGroup::new("target")
            .required(true)
            .args(["to_looker_view", "to_cube_cube", "to_lightdash"])
    ))]
    Translate {
        /// Semantic model to translate
        #[arg(short, long)]
        model: String,

        /// Emit a LookML view with this name
        #[arg(long)]
        to_looker_view: Option<String>,

        /// Emit a Cube cube with this name
        #[arg(long)]
        to_cube_cube: Option<String>,

        /// Emit Lightdash dbt YAML, optionally for a differently named dbt model
        #[arg(long, num_args = 0..=1, default_missing_value = "")]
        to_lightdash: Option<String>,

        /// How metric filters are expressed (overrides the config)
        #[arg(long)]
        filter_style: Option<FilterStyleArg>,

        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Merge a generated dbt schema YAML file into an existing one
    MergeYaml {
        /// Existing schema file
        source: PathBuf,

        /// Generated schema file
        update: PathBuf,

        /// Overwrite the source file instead of printing the result
        #[arg(long)]
        in_place: bool,
    },

    /// Translate a MetricFlow query into a Looker query (JSON)
    LookerQuery {
        /// Metrics to query
        #[arg(long, value_delimiter = ',', required = true)]
        metrics: Vec<String>,

        /// Group-by fields (`entity__dimension`)
        #[arg(long, value_delimiter = ',')]
        group_by: Vec<String>,

        /// Order-by fields, `-` prefix for descending
        #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
        order_by: Vec<String>,

        /// Explore to query (defaults to the metrics' semantic model)
        #[arg(long)]
        explore: Option<String>,

        /// Looker model (overrides the config)
        #[arg(long)]
        looker_model: Option<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum FilterStyleArg {
    CaseWhen,
    MeasureFilters,
}

impl From<FilterStyleArg> for FilterStyle {
    fn from(arg: FilterStyleArg) -> Self {
        match arg {
            FilterStyleArg::CaseWhen => FilterStyle::CaseWhen,
            FilterStyleArg::MeasureFilters => FilterStyle::MeasureFilters,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut settings = match load_settings(&cli) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            return ExitCode::FAILURE;
        }
    };
    init_logging(&settings.logging.level);

    if let Some(dir) = &cli.manifest_dir {
        settings.manifest.dir = dir.display().to_string();
    }

    let result = match cli.command {
        Commands::Translate {
            model,
            to_looker_view,
            to_cube_cube,
            to_lightdash,
            filter_style,
            output,
        } => translate_target(&model, to_looker_view, to_cube_cube, to_lightdash).and_then(
            |(dialect, view_name)| {
                if let Some(style) = filter_style {
                    settings.cube.filter_style = style.into();
                }
                cmd_translate(&settings, &model, dialect, view_name, output)
            },
        ),
        Commands::MergeYaml {
            source,
            update,
            in_place,
        } => cmd_merge_yaml(source, update, in_place),
        Commands::LookerQuery {
            metrics,
            group_by,
            order_by,
            explore,
            looker_model,
        } => {
            let mut query = MetricFlowQuery::new(metrics)
                .group_by(group_by)
                .order_by(order_by);
            if let Some(explore) = explore {
                query = query.explore(explore);
            }
            let looker_model = looker_model.or_else(|| settings.looker.model.clone());
            cmd_looker_query(&settings, &query, looker_model.as_deref())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Dialect and output name from the mutually exclusive target flags.
fn translate_target(
    model: &str,
    looker_view: Option<String>,
    cube: Option<String>,
    lightdash: Option<String>,
) -> Result<(Dialect, String), Box<dyn Error>> {
    match (looker_view, cube, lightdash) {
        (Some(view), _, _) => Ok((Dialect::Looker, view)),
        (_, Some(cube), _) => Ok((Dialect::Cube, cube)),
        (_, _, Some(dbt_model)) if dbt_model.is_empty() => Ok((Dialect::Lightdash, model.to_string())),
        (_, _, Some(dbt_model)) => Ok((Dialect::Lightdash, dbt_model)),
        (None, None, None) => Err("no translation target given".into()),
    }
}

fn load_settings(cli: &Cli) -> Result<Settings, Box<dyn Error>> {
    let settings = match &cli.config {
        Some(path) => {
            let mut settings = Settings::from_file(path)?;
            settings.apply_env_overrides();
            settings
        }
        None => Settings::load()?,
    };
    Ok(settings)
}

/// Log to stderr; `RUST_LOG` wins over the configured level.
fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_store(settings: &Settings) -> Result<ManifestStore, Box<dyn Error>> {
    let dir = settings.manifest.resolved_dir()?;
    tracing::debug!(dir = %dir.display(), "loading manifests");
    Ok(load_dir(
        &dir,
        &settings.manifest.semantic_manifest,
        &settings.manifest.build_manifest,
    )?)
}

fn cmd_translate(
    settings: &Settings,
    model: &str,
    dialect: Dialect,
    view_name: String,
    output: Option<PathBuf>,
) -> CmdResult {
    let store = load_store(settings)?;
    let options = settings.assemble_options()?.with_view_name(view_name);
    let view = ViewAssembler::with_options(&store, dialect, options).assemble(model)?;

    let rendered = emit(&view)?;
    match output {
        Some(path) => {
            fs::write(&path, rendered)?;
            eprintln!("Wrote {} to {}", dialect, path.display());
        }
        None => print!("{}", rendered),
    }
    Ok(())
}

fn cmd_merge_yaml(source: PathBuf, update: PathBuf, in_place: bool) -> CmdResult {
    let source_yaml = fs::read_to_string(&source)
        .map_err(|e| format!("reading '{}': {}", source.display(), e))?;
    let update_yaml = fs::read_to_string(&update)
        .map_err(|e| format!("reading '{}': {}", update.display(), e))?;

    let merged = merge_dbt_yaml(&source_yaml, &update_yaml)?;
    if in_place {
        fs::write(&source, merged)?;
    } else {
        print!("{}", merged);
    }
    Ok(())
}

fn cmd_looker_query(
    settings: &Settings,
    query: &MetricFlowQuery,
    looker_model: Option<&str>,
) -> CmdResult {
    let store = load_store(settings)?;
    let looker_query = to_looker_query(&store, query, looker_model)?;
    println!("{}", serde_json::to_string_pretty(&looker_query)?);
    Ok(())
}
