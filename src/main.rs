use clap::{Parser, Subcommand};
use log::{error, info};
use mealie_import::extractors::inspect_sections;
use mealie_import::fetcher::RequestFetcher;
use mealie_import::page::inspect;
use mealie_import::{
    analyze, find_sections, Dispatcher, ImportError, ImportSettings, Importer, MealieClient,
    MethodChoice, Page, RecipeImporter, Request,
};
use std::path::{Path, PathBuf};
use std::process;

#[derive(Parser)]
#[command(name = "mealie-import")]
#[command(about = "Import recipes from web pages into Mealie", long_about = None)]
struct Cli {
    /// Settings file (default: mealie.toml in the working directory, if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import a recipe page
    Import {
        url: String,
        /// auto, url, jsonld or html
        #[arg(long, default_value = "auto")]
        method: MethodChoice,
        /// Keep the page's tags (URL import only)
        #[arg(long)]
        include_tags: bool,
        /// Use saved markup instead of downloading the page
        #[arg(long)]
        html_file: Option<PathBuf>,
    },
    /// Show what recipe data a page carries and which method would be used
    Analyze {
        url: String,
        #[arg(long)]
        html_file: Option<PathBuf>,
    },
    /// Show the narrative sections found on a page and the markup around them
    Sections {
        url: String,
        #[arg(long)]
        html_file: Option<PathBuf>,
    },
    /// Check the server URL and API token
    TestConnection,
    /// Show what the server would scrape from a URL, without saving a recipe
    TestScrape { url: String },
    /// Answer one JSON request message and print the response
    Message {
        /// e.g. '{"action": "ping"}'
        request: String,
        /// Page the request refers to, for getHTML and getRecipeData
        #[arg(long)]
        url: Option<String>,
        #[arg(long)]
        html_file: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Import {
            url,
            method,
            include_tags,
            html_file,
        } => {
            let settings = load_settings(cli.config.as_deref())?;
            let mut builder = RecipeImporter::builder()
                .url(&url)
                .method(method)
                .settings(settings);
            if include_tags {
                builder = builder.include_tags(true);
            }
            if let Some(path) = html_file {
                builder = builder.html(&url, tokio::fs::read_to_string(path).await?);
            }

            match builder.build().await {
                Ok(outcome) => {
                    info!("Imported via {}", outcome.method.label());
                    println!("{}", outcome.recipe_url);
                }
                Err(e) => {
                    error!("{}", e);
                    eprintln!("{}", e.user_message());
                    if e.suggests_other_method() {
                        eprintln!("Try another method with --method url, jsonld or html");
                    }
                    process::exit(1);
                }
            }
        }
        Commands::Analyze { url, html_file } => {
            let settings = load_settings(cli.config.as_deref())?;
            let page = load_page(&url, html_file.as_deref()).await?;
            let analysis = analyze(&page);
            let recommended =
                mealie_import::choose_method(&analysis.domain, &page.url, &analysis, &settings);

            println!("{}", analysis.detection_summary());
            println!("{}", MethodChoice::Auto.hint(recommended));
            println!("{}", recommended.description());
            println!("{}", serde_json::to_string_pretty(&inspect(&page))?);
        }
        Commands::Sections { url, html_file } => {
            let page = load_page(&url, html_file.as_deref()).await?;
            let sections = find_sections(&page.document);
            if sections.is_empty() {
                println!("No additional sections found");
            }
            for section in &sections {
                println!("## {}\n\n{}\n", section.title, section.content);
            }
            println!("{}", serde_json::to_string_pretty(&inspect_sections(&page))?);
        }
        Commands::TestConnection => {
            let settings = load_settings(cli.config.as_deref())?;
            let client = MealieClient::from_settings(&settings)?;
            match client.test_connection().await {
                Ok(user) => println!("Connected as {}", user.display_name()),
                Err(e) => {
                    error!("{}", e);
                    eprintln!("{}", e.user_message());
                    process::exit(1);
                }
            }
        }
        Commands::TestScrape { url } => {
            let settings = load_settings(cli.config.as_deref())?;
            let client = MealieClient::from_settings(&settings)?;
            match client.test_scrape_url(&url).await {
                Ok(preview) => println!("{}", serde_json::to_string_pretty(&preview)?),
                Err(e) => {
                    error!("{}", e);
                    eprintln!("{}", e.user_message());
                    process::exit(1);
                }
            }
        }
        Commands::Message {
            request,
            url,
            html_file,
        } => {
            let request: Request = serde_json::from_str(&request)?;
            let settings = load_settings(cli.config.as_deref())?;
            let importer = Importer::from_settings(settings)?;
            let mut dispatcher = Dispatcher::new(importer);
            if let Some(url) = url {
                dispatcher.set_page(Some(load_page(&url, html_file.as_deref()).await?));
            }

            let response = dispatcher.handle(request).await;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
    }

    Ok(())
}

fn load_settings(path: Option<&Path>) -> Result<ImportSettings, ImportError> {
    Ok(match path {
        Some(path) => ImportSettings::load_from(path)?,
        None => ImportSettings::load()?,
    })
}

async fn load_page(url: &str, html_file: Option<&Path>) -> Result<Page, ImportError> {
    let html = match html_file {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .map_err(|e| ImportError::FetchError(format!("{}: {e}", path.display())))?,
        None => RequestFetcher::new(None)?.fetch(url).await?,
    };
    Ok(Page::parse(url, &html))
}
