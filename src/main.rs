use std::sync::Arc;

use clap::{
    Args,
    Parser,
    Subcommand,
};
use pokedex::{
    core::models::POKEMON_TYPES,
    custom::{
        is_custom_id,
        CustomStats,
        NewCustomRecord,
    },
    persistence,
    HydratedRecord,
    PageRequest,
    RecordCache,
    Settings,
};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "pokedex")]
#[command(version, about = "Browse PokeAPI creatures and manage custom entries", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Records per page (overrides settings.json)
    #[arg(long, global = true)]
    page_size: Option<u32>,

    /// Base URL of the creature data API
    #[arg(long, global = true)]
    provider_url: Option<String>,

    /// Base URL of the custom record store
    #[arg(long, global = true)]
    store_url: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show one page of records
    Page {
        /// Page number, starting at 1
        #[arg(short, long, default_value_t = 1)]
        page: u32,

        /// Case-insensitive name search
        #[arg(short, long, default_value = "")]
        search: String,

        /// Type tag to filter on ("all" for no filter)
        #[arg(short = 't', long = "type", default_value = "")]
        type_filter: String,

        /// Print records as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the full details of one record
    Show {
        id: u32,

        #[arg(long)]
        json: bool,
    },

    /// Manage custom records
    #[command(subcommand)]
    Custom(CustomCommand),

    /// Print the effective settings, optionally saving them
    Settings {
        #[arg(long)]
        save: bool,

        /// Delete the saved settings file and fall back to defaults
        #[arg(long, conflicts_with = "save")]
        reset: bool,
    },
}

#[derive(Subcommand)]
enum CustomCommand {
    /// List all custom records
    List,
    /// Add a custom record
    Add(CustomFields),
    /// Replace the fields of a custom record
    Update {
        id: u32,
        #[command(flatten)]
        fields: CustomFields,
    },
    /// Delete a custom record
    Delete { id: u32 },
}

#[derive(Args)]
struct CustomFields {
    #[arg(long)]
    name: String,

    #[arg(long = "type", value_parser = POKEMON_TYPES, default_value = "normal")]
    kind: String,

    #[arg(long, default_value = "")]
    image_url: String,

    /// Value used for every stat
    #[arg(long, default_value = "45")]
    stat: String,

    #[arg(long, default_value = "")]
    description: String,

    #[arg(long, default_value = "")]
    evolves_from: String,
}

impl From<CustomFields> for NewCustomRecord {
    fn from(fields: CustomFields) -> Self {
        NewCustomRecord {
            name: fields.name.trim().to_string(),
            image_url: fields.image_url.trim().to_string(),
            kind: fields.kind,
            stats: CustomStats::uniform(&fields.stat),
            description: fields.description,
            evolves_from: fields.evolves_from,
        }
    }
}

fn print_summary(record: &HydratedRecord) {
    println!("#{:<5} {:<14} {}", record.id, record.name, record.types.join("/"));
}

fn print_details(record: &HydratedRecord) {
    println!("#{} {}", record.id, record.name);
    println!("Types: {}", record.types.join(", "));
    if let Some(image) = &record.image {
        println!("Image: {}", image);
    }
    for stat in &record.stats {
        println!("  {:<16} {}", stat.name, stat.value);
    }
    if let Some(species) = &record.species {
        println!("Evolves from: {}", species.evolves_from.as_deref().unwrap_or("None"));
        if let Some(description) = species.description("en") {
            println!("{}", description);
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let mut settings = Settings::load();
    if let Some(page_size) = cli.page_size {
        settings.page_size = page_size;
    }
    if let Some(url) = cli.provider_url {
        settings.provider_url = url;
    }
    if let Some(url) = cli.store_url {
        settings.custom_store_url = url;
    }
    let settings = settings.sanitized();

    let cache = Arc::new(RecordCache::new());
    let (walker, store) = pokedex::connect(&settings, cache.clone())?;

    match cli.command {
        Commands::Page { page, search, type_filter, json } => {
            let request = PageRequest::new(page, &search, &type_filter);
            let result = walker.get_page(&request).await?;

            if json {
                let records: Vec<&HydratedRecord> =
                    result.records.iter().map(|r| r.as_ref()).collect();
                println!("{}", serde_json::to_string_pretty(&records)?);
            } else {
                for record in &result.records {
                    print_summary(record);
                }
                println!("Page {} of ~{}", page, result.total_pages);
            }
        }
        Commands::Show { id, json } => {
            let record = if is_custom_id(id) {
                Arc::new(HydratedRecord::from(store.find(id).await?))
            } else {
                walker.record(id).await?
            };
            if json {
                println!("{}", serde_json::to_string_pretty(record.as_ref())?);
            } else {
                print_details(&record);
            }
        }
        Commands::Custom(command) => match command {
            CustomCommand::List => {
                for record in store.list().await? {
                    print_summary(&HydratedRecord::from(record));
                }
            }
            CustomCommand::Add(fields) => {
                let created = store.create(&fields.into()).await?;
                print_details(&HydratedRecord::from(created));
            }
            CustomCommand::Update { id, fields } => {
                let updated = store.update(id, &fields.into()).await?;
                print_details(&HydratedRecord::from(updated));
            }
            CustomCommand::Delete { id } => {
                store.delete(id).await?;
                println!("Deleted {}", id);
            }
        },
        Commands::Settings { save, reset } => {
            if reset {
                if Settings::reset()? {
                    println!("Saved settings removed, defaults restored");
                } else {
                    println!("No saved settings to remove");
                }
                return Ok(());
            }

            println!("{}", serde_json::to_string_pretty(&settings)?);
            if !Settings::is_saved() {
                println!("(defaults, no settings file saved)");
            }
            if save {
                settings.save()?;
                println!(
                    "Saved to {}",
                    persistence::get_data_file_path(pokedex::core::config::SETTINGS_FILE)
                        .display()
                );
            }
        }
    }

    let stats = cache.stats();
    tracing::debug!(
        "Cache: {} entries, {} hits, {} misses ({:.0}% hit ratio)",
        cache.len(),
        stats.hits(),
        stats.misses(),
        stats.hit_ratio() * 100.0
    );

    Ok(())
}
