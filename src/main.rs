use book_shelf_rust::catalog::query::{BookQuery, SortKey, SortOrder};
use book_shelf_rust::seed::{read_catalog, CatalogSeeder};
use book_shelf_rust::{config, create_postgres_services, Services};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::error;

#[derive(Parser)]
#[command(name = "book-shelf", about = "Book catalog administration")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Import a JSON catalog file, skipping books already present
    Seed {
        #[arg(long)]
        file: PathBuf,
    },

    /// Print one page of the catalog
    List {
        #[arg(long)]
        search: Option<String>,

        #[arg(long)]
        genre: Option<String>,

        /// One of title, author, price, rating, date
        #[arg(long, default_value = "title")]
        sort: String,

        /// asc or desc
        #[arg(long, default_value = "asc")]
        order: String,

        #[arg(long, default_value_t = 1)]
        page: usize,

        #[arg(long, default_value_t = 10)]
        size: usize,
    },

    /// Print the featured books
    Featured {
        #[arg(long, default_value_t = 4)]
        limit: usize,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    config::load_dotenv();
    let app_config = config::load_config()
        .unwrap_or_else(|e| panic!("Cannot load config: {}", e));
    config::log::set_global_logging_config(app_config.logger());

    let pool = config::connect_to_database(app_config.db());
    let services = create_postgres_services(pool, app_config.refine());

    let result = match cli.command {
        Command::Seed { file } => run_seed(&services, &file),
        Command::List { search, genre, sort, order, page, size } => {
            run_list(&services, search, genre, &sort, &order, page, size)
        }
        Command::Featured { limit } => run_featured(&services, limit),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            error!("{}", message);
            ExitCode::FAILURE
        }
    }
}

fn run_seed(services: &Services, file: &Path) -> Result<(), String> {
    let books = read_catalog(file).map_err(|e| e.to_string())?;
    let seeder = CatalogSeeder::new(services.catalog.clone());
    let written = seeder.seed(&books).map_err(|e| e.to_string())?;

    println!("imported {} of {} books", written, books.len());
    Ok(())
}

fn run_list(
    services: &Services,
    search: Option<String>,
    genre: Option<String>,
    sort: &str,
    order: &str,
    page: usize,
    size: usize,
) -> Result<(), String> {
    let mut builder = BookQuery::builder()
        .page(page)
        .size(size)
        .sort(SortKey::from_param(sort))
        .order(SortOrder::from_param(order));
    if let Some(search) = search {
        builder = builder.search(search);
    }
    if let Some(genre) = genre {
        builder = builder.genre(genre);
    }
    let query = builder.build().map_err(|e| e.to_string())?;

    let listing = services.books.list(&query).map_err(|e| e.to_string())?;
    for book in &listing.books {
        println!("#{:<5} {} by {} ({:.2})", book.id(), book.title(), book.author(), book.price());
    }
    println!("{} matches", listing.total);
    Ok(())
}

fn run_featured(services: &Services, limit: usize) -> Result<(), String> {
    let featured = services.books.featured(limit).map_err(|e| e.to_string())?;
    for book in &featured {
        println!("#{:<5} {} by {}", book.id(), book.title(), book.author());
    }
    Ok(())
}
