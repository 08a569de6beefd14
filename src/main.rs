//! Thin CLI consumer of the catalog surface: load once, apply a query,
//! print the projection.

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use pokedex::api::RemoteCatalogClient;
use pokedex::cache::CatalogCache;
use pokedex::engine::{IdBucket, SortField, SortOrder, ViewQuery, ID_BUCKETS};
use pokedex::nav::NavigationIndex;
use pokedex::view;

/// Browse the first 251 Pokemon from the PokeAPI catalog
#[derive(Parser, Debug)]
#[command(name = "pokedex")]
#[command(about = "Browse the PokeAPI catalog from the terminal")]
struct Args {
    /// Retry entries whose detail fetch failed before rendering
    #[arg(long)]
    retry_failed: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the catalog as a sorted, searchable list
    List {
        #[arg(long, value_enum, default_value_t = SortFieldArg::Name)]
        sort: SortFieldArg,

        #[arg(long, value_enum, default_value_t = SortOrderArg::Asc)]
        order: SortOrderArg,

        /// Case-insensitive name substring
        #[arg(long, default_value = "")]
        search: String,
    },
    /// Print the gallery with its id-bucket and type filters
    Gallery {
        /// One of the fixed id buckets, e.g. 1-50 or 201-251
        #[arg(long)]
        bucket: Option<String>,

        /// Type name, e.g. grass
        #[arg(long = "type")]
        type_filter: Option<String>,
    },
    /// Show one entry with its circular previous/next neighbours
    Show { name: String },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum SortFieldArg {
    Id,
    Name,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum SortOrderArg {
    Asc,
    Desc,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let cache = CatalogCache::new(RemoteCatalogClient::new());
    let catalog = match cache.ensure_loaded().await {
        Ok(catalog) => catalog,
        Err(err) => {
            eprintln!("Error: could not load the catalog: {err}");
            std::process::exit(1);
        }
    };

    let catalog = if args.retry_failed && !catalog.is_complete() {
        match cache.retry_failed().await {
            Ok(catalog) => catalog,
            Err(err) => {
                eprintln!("Error: retry failed: {err}");
                std::process::exit(1);
            }
        }
    } else {
        catalog
    };

    if !catalog.is_complete() {
        eprintln!(
            "Warning: {} of {} entries failed to load: {}",
            catalog.failed_names().len(),
            catalog.len(),
            catalog.failed_names().join(", ")
        );
    }

    match args.command {
        Command::List {
            sort,
            order,
            search,
        } => {
            let query = ViewQuery {
                search,
                sort: Some((sort.into(), order.into())),
                ..Default::default()
            };
            let items = view::list_view(&catalog, &query);
            if items.is_empty() {
                println!("No matches.");
            }
            for item in items {
                println!("#{:<4} {}", item.id, item.name);
            }
        }
        Command::Gallery {
            bucket,
            type_filter,
        } => {
            let bucket = match bucket {
                Some(label) => match IdBucket::parse(&label) {
                    Some(bucket) => Some(bucket),
                    None => {
                        let labels: Vec<String> =
                            ID_BUCKETS.iter().map(IdBucket::label).collect();
                        eprintln!(
                            "Error: unknown bucket '{label}'; expected one of {}",
                            labels.join(", ")
                        );
                        std::process::exit(1);
                    }
                },
                None => None,
            };
            let query = ViewQuery {
                bucket,
                type_filter,
                ..Default::default()
            };
            let page = view::gallery_view(&catalog, &query);
            println!("Types: {}", page.type_roster.join(", "));
            for item in page.items {
                println!("#{:<4} {:<12} [{}]", item.id, item.name, item.types.join("/"));
            }
        }
        Command::Show { name } => {
            let nav = NavigationIndex::from_catalog(&catalog);
            match view::detail_page(&catalog, &nav, &name) {
                Ok(page) => {
                    let detail = &page.detail;
                    println!("{} #{}", detail.name, detail.id);
                    println!("  height:    {}", detail.height);
                    println!("  weight:    {}", detail.weight);
                    println!("  abilities: {}", detail.abilities.join(", "));
                    println!("  types:     {}", detail.types.join(", "));
                    if let Some(url) = &detail.artwork_url {
                        println!("  artwork:   {url}");
                    }
                    println!(
                        "  ({}/{})  previous: {}  next: {}",
                        page.position + 1,
                        page.total,
                        page.previous,
                        page.next
                    );
                }
                Err(err) => {
                    eprintln!("Error: {err}");
                    std::process::exit(1);
                }
            }
        }
    }
}

impl From<SortFieldArg> for SortField {
    fn from(arg: SortFieldArg) -> Self {
        match arg {
            SortFieldArg::Id => SortField::Id,
            SortFieldArg::Name => SortField::Name,
        }
    }
}

impl From<SortOrderArg> for SortOrder {
    fn from(arg: SortOrderArg) -> Self {
        match arg {
            SortOrderArg::Asc => SortOrder::Ascending,
            SortOrderArg::Desc => SortOrder::Descending,
        }
    }
}
