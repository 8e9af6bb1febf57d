//! Pantry Kernel
//!
//! HTTP server and command-line recipe browser.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::http::{HeaderValue, Method};
use clap::{Parser, Subcommand};
use tower_http::cors::CorsLayer;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use pantry_kernel::condition::QueryScope;
use pantry_kernel::config::{Config, DeviceClass};
use pantry_kernel::db;
use pantry_kernel::feed::{PageOutcome, RecipeFeed};
use pantry_kernel::filter::{BoolOperator, FilterConditions, FilterGroup};
use pantry_kernel::routes;
use pantry_kernel::state::AppState;
use pantry_kernel::store::{FacetSource, HouseholdStore, PgStore};

/// Household recipe filtering server and browser.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server (default).
    Serve,

    /// Print a household's facet catalog as JSON.
    Facets {
        #[arg(long)]
        household: Uuid,
    },

    /// Page through a household's recipes.
    Browse(BrowseArgs),
}

#[derive(clap::Args, Debug)]
struct BrowseArgs {
    #[arg(long)]
    household: Uuid,

    /// Free text matched against recipe names.
    #[arg(long, default_value = "")]
    search: String,

    /// Required tag (repeatable).
    #[arg(long = "tag")]
    tags: Vec<Uuid>,

    /// Required meal (repeatable).
    #[arg(long = "meal")]
    meals: Vec<Uuid>,

    /// Accepted cuisine (repeatable).
    #[arg(long = "cuisine")]
    cuisines: Vec<Uuid>,

    /// Required ingredient (repeatable).
    #[arg(long = "ingredient")]
    ingredients: Vec<Uuid>,

    /// Excluded tag (repeatable).
    #[arg(long = "exclude-tag")]
    exclude_tags: Vec<Uuid>,

    /// Match any selected facet instead of all of them.
    #[arg(long)]
    any: bool,

    /// Maximum number of pages to load.
    #[arg(long, default_value = "3")]
    pages: u32,

    /// Use the mobile page size.
    #[arg(long)]
    mobile: bool,
}

impl BrowseArgs {
    fn conditions(&self) -> FilterConditions {
        let operator = if self.any {
            BoolOperator::Or
        } else {
            BoolOperator::And
        };

        let mut conditions = FilterConditions {
            search_term: self.search.clone(),
            include_operator: operator,
            ..Default::default()
        };
        conditions.include.meals = FilterGroup::new(operator, self.meals.iter().copied());
        conditions.include.tags = FilterGroup::new(operator, self.tags.iter().copied());
        conditions.include.ingredients =
            FilterGroup::new(operator, self.ingredients.iter().copied());
        conditions.include.cuisines.items = self.cuisines.iter().copied().collect();
        conditions.exclude.tags = self.exclude_tags.iter().copied().collect();
        conditions
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    init_tracing();

    let cli = Cli::parse();
    let config = Config::from_env().context("failed to load configuration")?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config).await,
        Command::Facets { household } => print_facets(&config, household).await,
        Command::Browse(args) => browse(&config, args).await,
    }
}

async fn serve(config: Config) -> Result<()> {
    info!(port = config.port, "Starting Pantry kernel");

    let state = AppState::new(&config)
        .await
        .context("failed to initialize application state")?;
    info!("Database connection established");

    let cors = build_cors_layer(&config);
    let app = routes::app(state).layer(cors);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("failed to bind to address")?;

    info!(%addr, "Server listening");

    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}

async fn connect(config: &Config) -> Result<PgStore> {
    let pool = db::create_pool(config)
        .await
        .context("failed to create database pool")?;
    Ok(PgStore::new(pool, config.query_timeout))
}

async fn print_facets(config: &Config, household: Uuid) -> Result<()> {
    let store = connect(config).await?;
    let catalog = store
        .load_facets(household)
        .await
        .context("failed to load facets")?;
    println!("{}", serde_json::to_string_pretty(&catalog)?);
    Ok(())
}

async fn browse(config: &Config, args: BrowseArgs) -> Result<()> {
    let store = Arc::new(connect(config).await?);
    let household = store
        .find_household(args.household)
        .await
        .context("failed to load household")?
        .with_context(|| format!("household {} not found", args.household))?;

    let device = if args.mobile {
        DeviceClass::Mobile
    } else {
        DeviceClass::Desktop
    };
    let conditions = args.conditions();
    let criteria = conditions.active_criteria_count();

    let feed = RecipeFeed::begin(
        store,
        QueryScope::for_household(&household),
        config.page_size(device),
        conditions,
    )
    .context("failed to compile filter")?;

    println!(
        "{} ({} active filters, snapshot {})",
        household.name,
        criteria,
        feed.snapshot_at().to_rfc3339()
    );

    let mut printed = 0;
    let mut retried = false;
    while feed.page_index() < args.pages && feed.has_more() {
        match feed.load_next_page().await {
            PageOutcome::Loaded { .. } => {
                let recipes = feed.recipes();
                println!("-- page {} --", feed.page_index());
                for recipe in &recipes[printed..] {
                    match recipe.score {
                        Some(score) => println!("{}  {:.2}  {}", recipe.id, score, recipe.name),
                        None => println!("{}  {}", recipe.id, recipe.name),
                    }
                }
                printed = recipes.len();
                retried = false;
            }
            PageOutcome::Failed(e) if !retried => {
                warn!(error = %e, "page failed, retrying once");
                retried = true;
                tokio::time::sleep(Duration::from_millis(500)).await;
            }
            PageOutcome::Failed(e) => return Err(e).context("failed to load recipes"),
            PageOutcome::Stale | PageOutcome::InFlight => break,
        }
    }

    match feed.total() {
        Some(total) => println!("{printed} of {total} recipes"),
        None => println!("{printed} recipes (total unavailable)"),
    }
    Ok(())
}

fn build_cors_layer(config: &Config) -> CorsLayer {
    let methods = [Method::GET, Method::POST, Method::OPTIONS];

    if config.cors_allowed_origins.len() == 1 && config.cors_allowed_origins[0] == "*" {
        CorsLayer::new()
            .allow_origin(tower_http::cors::Any)
            .allow_methods(methods)
            .allow_headers(tower_http::cors::Any)
    } else {
        let origins: Vec<HeaderValue> = config
            .cors_allowed_origins
            .iter()
            .filter_map(|o| match o.parse::<HeaderValue>() {
                Ok(v) => Some(v),
                Err(_) => {
                    warn!(origin = %o, "ignoring unparseable CORS origin");
                    None
                }
            })
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers(tower_http::cors::Any)
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug,sqlx=warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
