use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use elastic::config::LoggingConfig;
use elastic::schema::SchemaLoader;
use elastic::Config;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "elastic")]
#[command(about = "Render and lint elasticmodel schema definitions")]
#[command(version)]
struct Cli {
    /// Path to the TOML config file
    #[arg(short, long, env = "ELASTIC_CONFIG", default_value = "elastic.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the mapping document of a schema file
    Mapping {
        /// Schema YAML file
        #[arg(short, long)]
        schema: PathBuf,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// List the fully qualified field names of a schema file
    Fields {
        /// Schema YAML file
        #[arg(short, long)]
        schema: PathBuf,
    },

    /// Load every schema in a directory and check that each renders
    Lint {
        /// Schema directory (defaults to schemas_dir from the config)
        #[arg(short, long)]
        dir: Option<PathBuf>,
    },
}

fn init_logging(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| logging.level.clone()),
    );
    let registry = tracing_subscriber::registry().with(filter);
    if logging.json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn loader(config: &Config, dir: &Path) -> SchemaLoader {
    SchemaLoader::new(dir).with_inference_default(config.mapping.inference_enabled)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load_or_default(&cli.config)
        .with_context(|| format!("loading config {}", cli.config.display()))?;
    init_logging(&config.logging);

    match cli.command {
        Commands::Mapping { schema, pretty } => {
            let loaded = loader(&config, Path::new("."))
                .load_schema(&schema)
                .with_context(|| format!("loading schema {}", schema.display()))?;
            let mapping = serde_json::Value::Object(loaded.definition.as_mapping()?);
            let out = if pretty {
                serde_json::to_string_pretty(&mapping)?
            } else {
                serde_json::to_string(&mapping)?
            };
            println!("{}", out);
        }
        Commands::Fields { schema } => {
            let loaded = loader(&config, Path::new("."))
                .load_schema(&schema)
                .with_context(|| format!("loading schema {}", schema.display()))?;
            for name in loaded.definition.expanded_field_names() {
                println!("{}", name);
            }
        }
        Commands::Lint { dir } => {
            let dir = dir.unwrap_or_else(|| config.schemas_dir.clone());
            tracing::info!("Linting schemas in {}", dir.display());

            let schemas = loader(&config, &dir).load_all()?;
            let mut failures = 0;
            for (name, schema) in &schemas {
                match schema.definition.as_mapping() {
                    Ok(_) => tracing::info!("{}: ok", name),
                    Err(e) => {
                        failures += 1;
                        tracing::error!("{}: {}", name, e);
                    }
                }
            }

            if failures > 0 {
                anyhow::bail!("{} of {} schemas failed to render", failures, schemas.len());
            }
            println!("{} schemas ok", schemas.len());
        }
    }

    Ok(())
}
