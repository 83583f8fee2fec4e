use std::time::Duration;

use log::warn;

use crate::{
    fetcher::RequestFetcher, ImportError, ImportMethod, ImportOutcome, ImportSettings, Importer,
    MethodChoice, Page,
};

/// Where the page to import comes from
#[derive(Debug, Clone)]
pub enum PageSource {
    /// Download the page before analyzing it
    Url(String),
    /// Markup already at hand, e.g. saved from a logged-in browser session
    Html { url: String, html: String },
}

/// Builder for configuring and executing recipe imports
#[derive(Debug, Default)]
pub struct RecipeImporterBuilder {
    source: Option<PageSource>,
    choice: MethodChoice,
    include_tags: Option<bool>,
    settings: Option<ImportSettings>,
    timeout: Option<Duration>,
}

impl RecipeImporterBuilder {
    /// Import the page at `url`
    ///
    /// # Example
    /// ```
    /// use mealie_import::RecipeImporter;
    ///
    /// let builder = RecipeImporter::builder()
    ///     .url("https://example.com/recipe");
    /// ```
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.source = Some(PageSource::Url(url.into()));
        self
    }

    /// Import markup that was already downloaded from `url`
    ///
    /// No request is made for the page itself; `url` is used for the domain
    /// and for URL imports.
    pub fn html(mut self, url: impl Into<String>, html: impl Into<String>) -> Self {
        self.source = Some(PageSource::Html {
            url: url.into(),
            html: html.into(),
        });
        self
    }

    /// Force a method instead of the recommended one
    ///
    /// # Example
    /// ```
    /// use mealie_import::{ImportMethod, MethodChoice, RecipeImporter};
    ///
    /// let builder = RecipeImporter::builder()
    ///     .url("https://example.com/recipe")
    ///     .method(MethodChoice::Fixed(ImportMethod::HtmlParse));
    /// ```
    pub fn method(mut self, choice: MethodChoice) -> Self {
        self.choice = choice;
        self
    }

    /// Ask the server to keep the page's tags on URL imports
    pub fn include_tags(mut self, include: bool) -> Self {
        self.include_tags = Some(include);
        self
    }

    /// Use these settings instead of loading `mealie.toml` and the environment
    pub fn settings(mut self, settings: ImportSettings) -> Self {
        self.settings = Some(settings);
        self
    }

    /// Set a timeout for downloading the page
    ///
    /// # Example
    /// ```
    /// use mealie_import::RecipeImporter;
    /// use std::time::Duration;
    ///
    /// let builder = RecipeImporter::builder()
    ///     .url("https://example.com/recipe")
    ///     .timeout(Duration::from_secs(10));
    /// ```
    pub fn timeout(mut self, duration: Duration) -> Self {
        self.timeout = Some(duration);
        self
    }

    /// Build and execute the import
    ///
    /// # Errors
    /// Returns `ImportError` if:
    /// - No page source was specified
    /// - The connection is not configured
    /// - The server rejects the recipe
    ///
    /// # Example
    /// ```no_run
    /// # use mealie_import::{ImportSettings, RecipeImporter};
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let outcome = RecipeImporter::builder()
    ///     .url("https://example.com/recipe")
    ///     .settings(ImportSettings::new("https://mealie.example.com", "token"))
    ///     .build()
    ///     .await?;
    /// println!("{}", outcome.recipe_url);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn build(self) -> Result<ImportOutcome, ImportError> {
        let source = self.source.ok_or_else(|| {
            ImportError::BuilderError("No page source specified. Use .url() or .html()".to_string())
        })?;

        let settings = match self.settings {
            Some(settings) => settings,
            None => ImportSettings::load()?,
        };
        settings.ensure_configured()?;
        let mut importer = Importer::from_settings(settings)?;

        let page = match source {
            PageSource::Html { url, html } => Page::parse(url, &html),
            PageSource::Url(url) => {
                // The server fetches the page itself for URL imports
                if self.choice == MethodChoice::Fixed(ImportMethod::UrlImport) {
                    return importer.import_url(&url, self.include_tags).await;
                }

                let fetched = RequestFetcher::new(self.timeout)?.fetch(&url).await;
                match fetched {
                    Ok(html) => Page::parse(url, &html),
                    Err(e) if self.choice == MethodChoice::Auto => {
                        warn!("Could not analyze {} locally ({}), using URL import", url, e);
                        return importer.import_url(&url, self.include_tags).await;
                    }
                    Err(e) => return Err(e),
                }
            }
        };

        importer
            .import(&page, self.choice, self.include_tags)
            .await
    }
}

/// Main entry point for the builder API
pub struct RecipeImporter;

impl RecipeImporter {
    /// Creates a new builder for importing recipes
    ///
    /// # Example
    /// ```
    /// use mealie_import::RecipeImporter;
    ///
    /// let builder = RecipeImporter::builder();
    /// ```
    pub fn builder() -> RecipeImporterBuilder {
        RecipeImporterBuilder::default()
    }
}
