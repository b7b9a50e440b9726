use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use break_advisor::catalog::seed::{builtin_catalog, load_catalog};
use break_advisor::catalog::{ActivityCatalog, Category, InMemoryCatalog, Location};
use break_advisor::config::{Config, ConfigOverrides};
use break_advisor::engine::{EngineOptions, RecommendationEngine};
use break_advisor::feedback::{FeedbackRecord, InMemoryFeedbackStore};
use break_advisor::output::render_json;
use break_advisor::output::table::{
    render_catalog_table, render_preferences_table, render_recommendations_table,
    render_summary_table,
};
use break_advisor::profile::{InMemoryProfileStore, UserProfile};
use break_advisor::selection::ConstraintQuery;
use break_advisor::signal::adapter::PreferenceAdapter;
use break_advisor::signal::gemini::{GeminiGenerator, TextGenerator};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::warn;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "break-advisor", about = "Micro-break activity recommendations")]
struct Cli {
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// JSON file with the activity catalog (overrides the config).
    #[arg(long)]
    catalog: Option<PathBuf>,
    /// JSON file with feedback records.
    #[arg(long)]
    feedback: Option<PathBuf>,
    /// JSON file with user profiles.
    #[arg(long)]
    profiles: Option<PathBuf>,
    /// Gemini model name (overrides the config).
    #[arg(long)]
    model: Option<String>,
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    output: OutputFormat,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Recommend activities for the current situation.
    Recommend {
        #[arg(long)]
        fatigue: u8,
        #[arg(long)]
        location: String,
        #[arg(long)]
        duration: u32,
        #[arg(long)]
        category: Option<String>,
        /// Personalize for this user when their profile is available.
        #[arg(long)]
        user: Option<i64>,
    },
    /// Show a user's feedback summary.
    Summary {
        #[arg(long)]
        user: i64,
    },
    /// Show a user's high-rated category preferences.
    Preferences {
        #[arg(long)]
        user: i64,
        #[arg(long, default_value_t = 5)]
        limit: usize,
    },
    /// Suggest categories for a user's current situation.
    Categories {
        #[arg(long)]
        user: i64,
        #[arg(long)]
        fatigue: u8,
        #[arg(long)]
        location: String,
    },
    /// List the loaded activity catalog.
    Catalog,
    Config {
        #[arg(long)]
        init: bool,
        #[arg(long)]
        show: bool,
    },
}

/// Stands in for the Gemini generator when no API key is configured. Every
/// call fails, which the adapter resolves to its documented fallbacks.
struct UnconfiguredGenerator {
    api_key_env: String,
}

#[async_trait]
impl TextGenerator for UnconfiguredGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String> {
        Err(anyhow!(
            "text generation unavailable: {} is not set",
            self.api_key_env
        ))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);
    let mut config = Config::load(Some(&config_path))?;
    config.apply_overrides(ConfigOverrides {
        catalog_path: cli
            .catalog
            .as_ref()
            .map(|p| p.to_string_lossy().into_owned()),
        model: cli.model.clone(),
    });

    if let Commands::Config { init, show } = &cli.command {
        if *init {
            Config::write_template(&config_path)?;
            println!("Wrote config template to {}", config_path.display());
        }
        if *show || !*init {
            println!("{}", render_json(&config)?);
        }
        return Ok(());
    }

    let catalog = resolve_catalog(&config)?;
    let feedback = match &cli.feedback {
        Some(path) => InMemoryFeedbackStore::new(load_feedback(path)?),
        None => InMemoryFeedbackStore::default(),
    };
    let profiles = match &cli.profiles {
        Some(path) => InMemoryProfileStore::new(load_profiles(path)?),
        None => InMemoryProfileStore::default(),
    };

    let generator: Arc<dyn TextGenerator> = match std::env::var(&config.ai.api_key_env) {
        Ok(api_key) => Arc::new(GeminiGenerator::new(api_key, config.ai.model.clone())),
        Err(_) => {
            warn!(
                "{} not set, personalization will use fallback lists",
                config.ai.api_key_env
            );
            Arc::new(UnconfiguredGenerator {
                api_key_env: config.ai.api_key_env.clone(),
            })
        }
    };

    let engine = RecommendationEngine::new(
        Arc::new(catalog),
        Arc::new(feedback),
        Arc::new(profiles),
        PreferenceAdapter::new(generator),
        EngineOptions {
            max_results: config.engine.max_results,
            feedback_window: config.engine.feedback_window,
            summary_window: config.engine.summary_window,
        },
    );

    match &cli.command {
        Commands::Recommend {
            fatigue,
            location,
            duration,
            category,
            user,
        } => {
            let query = ConstraintQuery {
                fatigue_level: *fatigue,
                location: parse_location(location)?,
                duration: *duration,
                category: category.as_deref().map(parse_category).transpose()?,
            };
            let outcome = engine.recommend(query, *user).await?;
            match cli.output {
                OutputFormat::Table => println!("{}", render_recommendations_table(&outcome)),
                OutputFormat::Json => println!("{}", render_json(&outcome)?),
            }
        }
        Commands::Summary { user } => {
            let summary = engine.user_summary(*user).await?;
            match cli.output {
                OutputFormat::Table => println!("{}", render_summary_table(&summary)),
                OutputFormat::Json => println!("{}", render_json(&summary)?),
            }
        }
        Commands::Preferences { user, limit } => {
            let preferences = engine.user_preferences(*user, *limit).await?;
            match cli.output {
                OutputFormat::Table => println!("{}", render_preferences_table(&preferences)),
                OutputFormat::Json => println!("{}", render_json(&preferences)?),
            }
        }
        Commands::Categories {
            user,
            fatigue,
            location,
        } => {
            let categories = engine
                .situational_categories(*user, *fatigue, parse_location(location)?)
                .await?;
            let slugs: Vec<&str> = categories.iter().map(Category::as_slug).collect();
            match cli.output {
                OutputFormat::Table => println!("{}", slugs.join(", ")),
                OutputFormat::Json => println!("{}", render_json(&slugs)?),
            }
        }
        Commands::Catalog => {
            let activities = resolve_catalog(&config)?.fetch_all().await?;
            match cli.output {
                OutputFormat::Table => println!("{}", render_catalog_table(&activities)),
                OutputFormat::Json => println!("{}", render_json(&activities)?),
            }
        }
        Commands::Config { .. } => unreachable!("config command handled before dispatch"),
    }

    Ok(())
}

fn resolve_catalog(config: &Config) -> Result<InMemoryCatalog> {
    match config.resolved_catalog_path() {
        Some(path) => load_catalog(&path),
        None => Ok(builtin_catalog()),
    }
}

fn parse_location(raw: &str) -> Result<Location> {
    Location::from_str(raw).map_err(|e| anyhow!(e))
}

fn parse_category(raw: &str) -> Result<Category> {
    Category::from_str(raw).map_err(|e| anyhow!(e))
}

fn load_feedback(path: &Path) -> Result<Vec<FeedbackRecord>> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("failed reading feedback file: {}", path.display()))?;
    serde_json::from_str(&data)
        .with_context(|| format!("invalid feedback JSON: {}", path.display()))
}

fn load_profiles(path: &Path) -> Result<Vec<UserProfile>> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("failed reading profiles file: {}", path.display()))?;
    serde_json::from_str(&data)
        .with_context(|| format!("invalid profiles JSON: {}", path.display()))
}
