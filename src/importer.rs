use crate::client::{MealieClient, RecipeApi};
use crate::config::ImportSettings;
use crate::error::ImportError;
use crate::extractors::{extract, ImportPayload};
use crate::model::{ImportMethod, ImportOutcome, MethodChoice, PageAnalysis};
use crate::page::{analyze, Page};
use crate::preferences::{JsonFileStore, PreferenceStore};
use crate::strategy::{choose_method, domain_of};
use log::{info, warn};

/// Runs the analyze, choose, extract and submit steps against one Mealie server.
///
/// Successful imports are remembered per domain so the next page from the
/// same site starts with the method that worked.
pub struct Importer<A: RecipeApi, S: PreferenceStore> {
    api: A,
    settings: ImportSettings,
    store: S,
}

impl Importer<MealieClient, JsonFileStore> {
    /// HTTP client plus a preference file at `settings.preferences_path`.
    ///
    /// Succeeds for blank connection settings too; imports then fail with
    /// `NotConfigured` before any request is made.
    pub fn from_settings(settings: ImportSettings) -> Result<Self, ImportError> {
        let api = MealieClient::new(&settings.server_url, &settings.api_token)?;
        let store = JsonFileStore::new(settings.preferences_path.clone());
        Importer::new(api, settings, store)
    }
}

impl<A: RecipeApi, S: PreferenceStore> Importer<A, S> {
    /// Learned preferences in `store` take precedence over those in `settings`.
    /// An unreadable store only costs the learned hints.
    pub fn new(api: A, mut settings: ImportSettings, store: S) -> Result<Self, ImportError> {
        match store.load() {
            Ok(stored) => settings.domain_preferences.extend(stored),
            Err(e) => warn!("Ignoring stored domain preferences: {}", e),
        }
        Ok(Importer {
            api,
            settings,
            store,
        })
    }

    pub fn settings(&self) -> &ImportSettings {
        &self.settings
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn recommend(&self, page: &Page, analysis: &PageAnalysis) -> ImportMethod {
        choose_method(&analysis.domain, &page.url, analysis, &self.settings)
    }

    /// Import `page` with the chosen (or recommended) method.
    ///
    /// `include_tags` only affects URL imports and falls back to the
    /// configured default.
    pub async fn import(
        &mut self,
        page: &Page,
        choice: MethodChoice,
        include_tags: Option<bool>,
    ) -> Result<ImportOutcome, ImportError> {
        self.settings.ensure_configured()?;

        let analysis = analyze(page);
        let method = choice.resolve(self.recommend(page, &analysis));
        info!("Importing {} using {}", page.url, method.label());

        let payload = extract(page, method);
        let include_tags = include_tags.unwrap_or(self.settings.include_tags_default);
        let slug = self.submit(payload, include_tags).await?;

        self.remember(&analysis.domain, method);
        Ok(self.outcome(slug, method))
    }

    /// Hand a bare URL to the server without looking at the page
    pub async fn import_url(
        &mut self,
        url: &str,
        include_tags: Option<bool>,
    ) -> Result<ImportOutcome, ImportError> {
        self.settings.ensure_configured()?;
        let include_tags = include_tags.unwrap_or(self.settings.include_tags_default);
        let slug = self
            .submit(ImportPayload::Url(url.to_string()), include_tags)
            .await?;

        self.remember(&domain_of(url), ImportMethod::UrlImport);
        Ok(self.outcome(slug, ImportMethod::UrlImport))
    }

    /// Hand raw markup to the server; nothing is remembered since there is no domain
    pub async fn import_html(&mut self, html: &str) -> Result<ImportOutcome, ImportError> {
        self.settings.ensure_configured()?;
        let slug = self
            .submit(ImportPayload::Html(html.to_string()), false)
            .await?;
        Ok(self.outcome(slug, ImportMethod::HtmlParse))
    }

    async fn submit(&self, payload: ImportPayload, include_tags: bool) -> Result<String, ImportError> {
        let slug = match payload {
            ImportPayload::Url(url) => self.api.create_from_url(&url, include_tags).await?,
            ImportPayload::Html(html) => self.api.create_from_html(&html).await?,
            ImportPayload::Structured(recipe) => {
                if !recipe.found {
                    return Err(ImportError::NoRecipeFound);
                }

                let slug = self.api.create_from_json(&recipe.primary_data).await?;
                if !recipe.auxiliary_sections.is_empty() {
                    if let Err(e) = self
                        .api
                        .add_notes(&slug, &recipe.auxiliary_sections)
                        .await
                    {
                        warn!("Recipe {} created but adding notes failed: {}", slug, e);
                    }
                }
                slug
            }
        };

        info!("Created recipe {}", slug);
        Ok(slug)
    }

    fn remember(&mut self, domain: &str, method: ImportMethod) {
        if domain.is_empty() {
            return;
        }
        self.settings
            .domain_preferences
            .insert(domain.to_string(), method);
        if let Err(e) = self.store.save(domain, method) {
            warn!("Could not save preference for {}: {}", domain, e);
        }
    }

    fn outcome(&self, slug: String, method: ImportMethod) -> ImportOutcome {
        ImportOutcome {
            recipe_url: self.settings.recipe_url(&slug),
            slug,
            method,
        }
    }
}
