//! CLI entry point for headless-blog

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use headless_blog::preview::PreviewContext;
use headless_blog::Blog;

#[derive(Parser)]
#[command(name = "headless-blog")]
#[command(version)]
#[command(about = "A blog front-end backend for a headless CMS", long_about = None)]
struct Cli {
    /// Set the base directory (defaults to current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Serve documents from a JSON fixture instead of the content API
    #[arg(short, long, global = true)]
    fixture: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new blog directory
    Init {
        /// Directory to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        folder: PathBuf,
    },

    /// Start the JSON API server
    #[command(alias = "s")]
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// IP address to bind to
        #[arg(short, long, default_value = "localhost")]
        ip: String,
    },

    /// List posts, following the listing pages
    List {
        /// Stop after this many pages
        #[arg(long)]
        pages: Option<usize>,

        /// Preview content version ref
        #[arg(long = "ref")]
        version_ref: Option<String>,
    },

    /// Show a single post with its neighbours
    Show {
        /// Post uid
        uid: String,

        /// Preview content version ref
        #[arg(long = "ref")]
        version_ref: Option<String>,

        /// Print the view model as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the post paths to pre-render
    Paths,

    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "headless_blog=debug,tower_http=debug,info"
    } else {
        "headless_blog=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine base directory
    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    let open_blog = || -> Result<Blog> {
        match &cli.fixture {
            Some(fixture) => {
                let fixture = if fixture.is_absolute() {
                    fixture.clone()
                } else {
                    base_dir.join(fixture)
                };
                tracing::info!("Serving offline from {:?}", fixture);
                Blog::offline(&base_dir, fixture)
            }
            None => Blog::new(&base_dir),
        }
    };

    match cli.command {
        Commands::Init { ref folder } => {
            let target_dir = if folder.is_absolute() {
                folder.clone()
            } else {
                base_dir.join(folder)
            };
            tracing::info!("Initializing blog in {:?}", target_dir);
            headless_blog::commands::init::init_site(&target_dir)?;
            println!("Initialized blog in {:?}", target_dir);
        }

        Commands::Serve { port, ref ip } => {
            let blog = open_blog()?;
            tracing::info!("Starting server at http://{}:{}", ip, port);
            headless_blog::server::start(&blog, ip, port).await?;
        }

        Commands::List {
            pages,
            ref version_ref,
        } => {
            let blog = open_blog()?;
            let preview = PreviewContext::from_ref(version_ref.clone());
            headless_blog::commands::list::run(&blog, &preview, pages).await?;
        }

        Commands::Show {
            ref uid,
            ref version_ref,
            json,
        } => {
            let blog = open_blog()?;
            let preview = PreviewContext::from_ref(version_ref.clone());
            headless_blog::commands::show::run(&blog, uid, &preview, json).await?;
        }

        Commands::Paths => {
            let blog = open_blog()?;
            headless_blog::commands::paths::run(&blog).await?;
        }

        Commands::Version => {
            println!("headless-blog version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
