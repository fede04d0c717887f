//! BeautyMarket catalog - admin CLI
//!
//! Manage categories, base services and offerings, and watch the live
//! discovery view of a base service.
//!
//! ```sh
//! # Run with default config (~/.config/beautymarket-catalog/config.toml)
//! catalog-admin category list
//!
//! # Custom config path
//! catalog-admin --config /etc/beautymarket/catalog.toml service list --published-only
//!
//! # Validate config and exit
//! catalog-admin --check
//!
//! # Stream provider snapshots as JSON lines until Ctrl+C
//! catalog-admin providers watch --service <BASE_SERVICE_ID>
//! ```

mod retry;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::{error, info};

use beautymarket_catalog::application::BaseServiceFilter;
use beautymarket_catalog::config::AppConfig;
use beautymarket_catalog::domain::document::SortDirection;
use beautymarket_catalog::domain::{
    BaseServicePatch, CategoryPatch, NewBaseService, NewCategory, OfferingFilter, OfferingOrder,
    OfferingPatch, OfferingSortField, ProfessionalProfile,
};
use beautymarket_catalog::{default_config_path, init_tracing, Catalog, DomainError, DomainResult};

use retry::{retry_transient, RetryConfig};

/// BeautyMarket service catalog administration.
#[derive(Parser, Debug)]
#[command(
    name = "catalog-admin",
    version,
    about = "Administer the BeautyMarket service catalog",
    long_about = "Administer categories, base services and professional offerings \
                  of the BeautyMarket service catalog.\n\n\
                  Default config: ~/.config/beautymarket-catalog/config.toml"
)]
struct Cli {
    /// Path to the configuration file (TOML).
    #[arg(short, long, env = "CATALOG_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(short, long, global = true)]
    log_level: Option<String>,

    /// Validate the configuration file and exit.
    #[arg(long)]
    check: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Service categories
    #[command(subcommand)]
    Category(CategoryCommand),
    /// Admin-defined base services
    #[command(subcommand)]
    Service(ServiceCommand),
    /// Professional offerings
    #[command(subcommand)]
    Offering(OfferingCommand),
    /// Client discovery view
    #[command(subcommand)]
    Providers(ProvidersCommand),
    /// Professional display profiles
    #[command(subcommand)]
    Profile(ProfileCommand),
}

#[derive(Subcommand, Debug)]
enum CategoryCommand {
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        image_url: Option<String>,
    },
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        image_url: Option<String>,
    },
    Delete {
        id: String,
    },
    List,
}

#[derive(Subcommand, Debug)]
enum ServiceCommand {
    Create {
        #[arg(long)]
        category: String,
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        description: String,
        /// Price floor for every offering
        #[arg(long)]
        price: f64,
        /// Reference duration in minutes
        #[arg(long)]
        duration: u32,
        /// Create as a draft hidden from professionals
        #[arg(long)]
        unpublished: bool,
    },
    Update {
        id: String,
        /// Move to another category
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        price: Option<f64>,
        #[arg(long)]
        duration: Option<u32>,
        #[arg(long)]
        published: Option<bool>,
    },
    Delete {
        id: String,
    },
    List {
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        published_only: bool,
    },
}

#[derive(Subcommand, Debug)]
enum OfferingCommand {
    Create {
        #[arg(long)]
        professional: String,
        #[arg(long)]
        service: String,
        #[arg(long)]
        price: f64,
        #[arg(long)]
        duration: u32,
    },
    Update {
        id: String,
        #[arg(long)]
        price: Option<f64>,
        #[arg(long)]
        duration: Option<u32>,
        #[arg(long)]
        active: Option<bool>,
    },
    Delete {
        id: String,
    },
    List(OfferingListArgs),
    /// Check a price and duration without saving
    Check {
        #[arg(long)]
        service: String,
        #[arg(long)]
        price: f64,
        #[arg(long)]
        duration: u32,
    },
}

#[derive(Args, Debug)]
struct OfferingListArgs {
    #[arg(long)]
    professional: String,
    #[arg(long)]
    category: Option<String>,
    #[arg(long)]
    active: Option<bool>,
    /// createdAt, price, duration, bookings, earnings or averageRating
    #[arg(long)]
    sort: Option<OfferingSortField>,
    #[arg(long)]
    desc: bool,
}

#[derive(Subcommand, Debug)]
enum ProvidersCommand {
    List {
        #[arg(long, conflicts_with = "category", required_unless_present = "category")]
        service: Option<String>,
        #[arg(long)]
        category: Option<String>,
    },
    /// Print a JSON line per snapshot until Ctrl+C
    Watch {
        #[arg(long)]
        service: String,
    },
}

#[derive(Subcommand, Debug)]
enum ProfileCommand {
    Set {
        id: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        photo_url: Option<String>,
    },
}

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{}", text),
        Err(e) => error!("Cannot render output: {}", e),
    }
}

async fn run_category(catalog: &Catalog, command: CategoryCommand) -> DomainResult<()> {
    match command {
        CategoryCommand::Create {
            name,
            description,
            image_url,
        } => {
            let category = catalog
                .create_category(NewCategory {
                    name,
                    description,
                    image_url,
                })
                .await?;
            print_json(&category);
        }
        CategoryCommand::Update {
            id,
            name,
            description,
            image_url,
        } => {
            let patch = CategoryPatch {
                name,
                description,
                image_url,
            };
            print_json(&catalog.update_category(&id, patch).await?);
        }
        CategoryCommand::Delete { id } => {
            catalog.delete_category(&id).await?;
            info!(category_id = %id, "Category deleted");
        }
        CategoryCommand::List => {
            let categories =
                retry_transient(&RetryConfig::default(), "list_categories", || catalog.list_categories())
                    .await?;
            print_json(&categories);
        }
    }
    Ok(())
}

async fn run_service(catalog: &Catalog, command: ServiceCommand) -> DomainResult<()> {
    match command {
        ServiceCommand::Create {
            category,
            name,
            description,
            price,
            duration,
            unpublished,
        } => {
            let mut input = NewBaseService::new(category, name, description, price, duration);
            input.is_published = !unpublished;
            print_json(&catalog.create_base_service(input).await?);
        }
        ServiceCommand::Update {
            id,
            category,
            name,
            description,
            price,
            duration,
            published,
        } => {
            let patch = BaseServicePatch {
                name,
                description,
                category_id: category,
                base_price: price,
                base_duration: duration,
                is_published: published,
                ..Default::default()
            };
            print_json(&catalog.update_base_service(&id, patch).await?);
        }
        ServiceCommand::Delete { id } => {
            catalog.delete_base_service(&id).await?;
            info!(base_service_id = %id, "Base service deleted");
        }
        ServiceCommand::List {
            category,
            published_only,
        } => {
            let filter = BaseServiceFilter {
                category_id: category,
                published_only,
            };
            let services = retry_transient(&RetryConfig::default(), "list_base_services", || {
                catalog.list_base_services(&filter)
            })
            .await?;
            print_json(&services);
        }
    }
    Ok(())
}

async fn run_offering(catalog: &Catalog, command: OfferingCommand) -> DomainResult<()> {
    match command {
        OfferingCommand::Create {
            professional,
            service,
            price,
            duration,
        } => {
            let offering = retry_transient(&RetryConfig::once(), "create_offering", || {
                catalog.create_offering(&professional, &service, price, duration)
            })
            .await?;
            print_json(&offering);
        }
        OfferingCommand::Update {
            id,
            price,
            duration,
            active,
        } => {
            let patch = OfferingPatch {
                price,
                duration,
                is_active: active,
            };
            print_json(&catalog.update_offering(&id, patch).await?);
        }
        OfferingCommand::Delete { id } => {
            catalog.delete_offering(&id).await?;
            info!(offering_id = %id, "Offering deleted");
        }
        OfferingCommand::List(args) => {
            let filter = OfferingFilter {
                category_id: args.category,
                is_active: args.active,
            };
            let direction = if args.desc {
                SortDirection::Desc
            } else {
                SortDirection::Asc
            };
            let order = args.sort.map(|field| OfferingOrder::new(field, direction));
            let offerings = retry_transient(&RetryConfig::default(), "list_offerings", || {
                catalog.list_offerings(&args.professional, &filter, order)
            })
            .await?;
            print_json(&offerings);
        }
        OfferingCommand::Check {
            service,
            price,
            duration,
        } => {
            catalog.check_offering(&service, price, duration).await?;
            let bounds = catalog.duration_bounds(&service).await?;
            println!(
                "Offering is valid (duration range {}-{} minutes)",
                bounds.min, bounds.max
            );
        }
    }
    Ok(())
}

async fn run_providers(catalog: &Catalog, command: ProvidersCommand) -> DomainResult<()> {
    match command {
        ProvidersCommand::List { service, category } => {
            let discovery = catalog.discovery();
            let rows = retry_transient(&RetryConfig::default(), "list_providers", || async {
                match (&service, &category) {
                    (Some(service), _) => discovery.providers_for_service(service).await,
                    (None, Some(category)) => discovery.providers_in_category(category).await,
                    (None, None) => Err(DomainError::Validation(
                        "either --service or --category is required".to_string(),
                    )),
                }
            })
            .await?;
            print_json(&rows);
        }
        ProvidersCommand::Watch { service } => {
            let subscription = catalog
                .subscribe_providers_for_service(&service, |rows| match serde_json::to_string(&rows) {
                    Ok(line) => println!("{}", line),
                    Err(e) => error!("Cannot render snapshot: {}", e),
                })
                .await?;
            info!(base_service_id = %service, "Watching providers. Press Ctrl+C to stop.");

            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Cannot listen for Ctrl+C: {}", e);
            }
            subscription.unsubscribe();
        }
    }
    Ok(())
}

async fn run(catalog: &Catalog, command: Command) -> DomainResult<()> {
    match command {
        Command::Category(cmd) => run_category(catalog, cmd).await,
        Command::Service(cmd) => run_service(catalog, cmd).await,
        Command::Offering(cmd) => run_offering(catalog, cmd).await,
        Command::Providers(cmd) => run_providers(catalog, cmd).await,
        Command::Profile(ProfileCommand::Set {
            id,
            name,
            photo_url,
        }) => {
            let mut profile = ProfessionalProfile::new(id, name);
            profile.photo_url = photo_url;
            catalog.save_profile(&profile).await?;
            print_json(&profile);
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // ── Load configuration ──────────────────────────────────────
    let config_path = cli.config.clone().unwrap_or_else(default_config_path);
    let loaded = if config_path.exists() {
        AppConfig::load(&config_path).map(Some)
    } else {
        Ok(None)
    };

    let mut config = match loaded {
        Ok(Some(cfg)) => cfg,
        Ok(None) => AppConfig::default(),
        Err(e) => {
            init_tracing(&AppConfig::default().logging);
            error!("Failed to load config from {}: {}", config_path.display(), e);
            return ExitCode::FAILURE;
        }
    };

    // ── Apply CLI overrides ─────────────────────────────────────
    if let Some(ref level) = cli.log_level {
        config.logging.level = level.clone();
    }
    init_tracing(&config.logging);
    if config_path.exists() {
        info!("Configuration loaded from {}", config_path.display());
    } else {
        info!("No configuration at {}; using defaults", config_path.display());
    }

    // ── Config validation mode ──────────────────────────────────
    if cli.check {
        println!("Configuration is valid");
        println!("   Config file : {}", config_path.display());
        println!("   Backend     : {:?}", config.store.backend);
        println!("   Database    : {}", config.store.database_url);
        println!("   Timeout     : {} ms", config.store.operation_timeout_ms);
        println!("   Log level   : {}", config.logging.level);
        return ExitCode::SUCCESS;
    }

    let Some(command) = cli.command else {
        error!("No command given; see --help");
        return ExitCode::FAILURE;
    };

    // ── Open catalog and run ────────────────────────────────────
    let catalog = match Catalog::open(&config).await {
        Ok(catalog) => catalog,
        Err(e) => {
            error!("Cannot open catalog: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match run(&catalog, command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            match serde_json::to_string(&e.payload()) {
                Ok(body) => eprintln!("{}", body),
                Err(_) => eprintln!("{}", e),
            }
            ExitCode::FAILURE
        }
    }
}
