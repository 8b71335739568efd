//! Delicious CLI - Database migrations and store management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! dl-cli migrate
//!
//! # Run migrations and add the unique slug index (strict slug mode)
//! dl-cli migrate --unique-slugs
//!
//! # Create a store
//! dl-cli store add -n "Wok Star" -a "1 Queen St" --lng -79.4 --lat 43.6 -t noodles --author 1
//!
//! # Browse
//! dl-cli stores --page 2
//! dl-cli tags --tag noodles
//! dl-cli search "wok"
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `store add|edit|show` - Manage a single store
//! - `stores` - Paginated store listing
//! - `tags` - Tag vocabulary with counts
//! - `search` - Text search over names and descriptions

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "dl-cli")]
#[command(author, version, about = "Delicious store directory CLI tools")]
struct Cli {
    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate {
        /// Also add the unique slug index strict slug mode relies on
        #[arg(long)]
        unique_slugs: bool,
    },
    /// Create, edit and inspect stores
    Store {
        #[command(subcommand)]
        action: StoreAction,
    },
    /// List stores, newest first
    Stores {
        /// Page number (starting at 1)
        #[arg(short, long, default_value_t = 1)]
        page: u32,
    },
    /// Show the tag vocabulary, optionally with the stores for one tag
    Tags {
        /// Only list stores carrying this tag
        #[arg(short, long)]
        tag: Option<String>,
    },
    /// Search store names and descriptions
    Search {
        /// Free-text query
        query: String,
    },
}

#[derive(Subcommand)]
enum StoreAction {
    /// Create a new store
    Add {
        #[command(flatten)]
        fields: StoreArgs,

        /// Id of the user creating the store
        #[arg(long)]
        author: i32,
    },
    /// Edit an existing store
    Edit {
        /// Store id
        id: i32,

        /// Id of the user making the edit (must be the author)
        #[arg(long)]
        editor: i32,

        #[command(flatten)]
        fields: StoreArgs,
    },
    /// Show a store by slug
    Show {
        /// Store slug
        slug: String,
    },
}

/// Store fields shared by `add` and `edit`.
#[derive(Args)]
struct StoreArgs {
    /// Store name
    #[arg(short, long)]
    name: String,

    /// Store description
    #[arg(short, long)]
    description: Option<String>,

    /// Tag (repeatable)
    #[arg(short = 't', long = "tag")]
    tags: Vec<String>,

    /// Longitude
    #[arg(long, allow_hyphen_values = true)]
    lng: f64,

    /// Latitude
    #[arg(long, allow_hyphen_values = true)]
    lat: f64,

    /// Street address
    #[arg(short, long)]
    address: String,

    /// Photo filename from the upload service
    #[arg(long)]
    photo: Option<String>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.log_json);

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

/// Initialize tracing with `EnvFilter`, writing to stderr so stdout stays
/// clean for command output.
fn init_tracing(json: bool) {
    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "delicious_directory=info,delicious_cli=info".into());

    let registry = tracing_subscriber::registry().with(env_filter);
    if json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let output = commands::Output::new(cli.json);

    match cli.command {
        Commands::Migrate { unique_slugs } => commands::migrate::run(unique_slugs).await?,
        Commands::Store { action } => match action {
            StoreAction::Add { fields, author } => {
                commands::store::add(&output, fields.into_form(Some(author))).await?;
            }
            StoreAction::Edit { id, editor, fields } => {
                commands::store::edit(&output, id, editor, fields.into_form(None)).await?;
            }
            StoreAction::Show { slug } => commands::store::show(&output, &slug).await?,
        },
        Commands::Stores { page } => commands::store::list(&output, page).await?,
        Commands::Tags { tag } => commands::tags::run(&output, tag.as_deref()).await?,
        Commands::Search { query } => commands::store::search(&output, &query).await?,
    }
    Ok(())
}

impl StoreArgs {
    fn into_form(self, author: Option<i32>) -> delicious_directory::models::StoreForm {
        delicious_directory::models::StoreForm {
            name: Some(self.name),
            description: self.description,
            tags: self.tags,
            lng: Some(self.lng),
            lat: Some(self.lat),
            address: Some(self.address),
            photo: self.photo,
            author: author.map(delicious_core::UserId::new),
        }
    }
}
