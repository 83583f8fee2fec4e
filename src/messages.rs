//! JSON request/response contract between the user-facing surfaces and the
//! importer. Every [`Request`] gets exactly one [`Response`].

use crate::client::RecipeApi;
use crate::error::ImportError;
use crate::extractors::{extract_recipe_data, RecipeData};
use crate::importer::Importer;
use crate::model::{ImportMethod, ImportOutcome};
use crate::page::Page;
use crate::preferences::PreferenceStore;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Request {
    ImportFromUrl {
        url: String,
        #[serde(rename = "includeTags", default)]
        include_tags: Option<bool>,
    },
    ImportFromHtml {
        html: String,
    },
    GetSettings,
    #[serde(rename = "getHTML")]
    GetHtml,
    GetRecipeData,
    Ping,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Response {
    Import(ImportReply),
    Settings(SettingsSnapshot),
    Page(PageSnapshot),
    RecipeData(RecipeData),
    Status { status: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReply {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<ImportedRecipe>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Set when another import method might succeed where this one failed
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub try_another_method: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportedRecipe {
    pub slug: String,
    pub recipe_url: String,
}

impl ImportReply {
    fn failure(message: impl Into<String>) -> Self {
        ImportReply {
            success: false,
            data: None,
            error: Some(message.into()),
            try_another_method: false,
        }
    }
}

impl From<Result<ImportOutcome, ImportError>> for ImportReply {
    fn from(result: Result<ImportOutcome, ImportError>) -> Self {
        match result {
            Ok(outcome) => ImportReply {
                success: true,
                data: Some(ImportedRecipe {
                    slug: outcome.slug,
                    recipe_url: outcome.recipe_url,
                }),
                error: None,
                try_another_method: false,
            },
            Err(e) => ImportReply {
                try_another_method: e.suggests_other_method(),
                ..ImportReply::failure(e.user_message())
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsSnapshot {
    pub server_url: String,
    pub api_token: String,
    pub group_slug: String,
    pub include_tags_default: bool,
    pub domain_preferences: HashMap<String, ImportMethod>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageSnapshot {
    pub html: String,
    pub url: String,
    pub title: String,
}

/// Answers requests with one importer and, optionally, the page being viewed
pub struct Dispatcher<A: RecipeApi, S: PreferenceStore> {
    importer: Importer<A, S>,
    page: Option<Page>,
}

impl<A: RecipeApi, S: PreferenceStore> Dispatcher<A, S> {
    pub fn new(importer: Importer<A, S>) -> Self {
        Dispatcher {
            importer,
            page: None,
        }
    }

    pub fn with_page(mut self, page: Page) -> Self {
        self.page = Some(page);
        self
    }

    pub fn set_page(&mut self, page: Option<Page>) {
        self.page = page;
    }

    pub fn importer(&self) -> &Importer<A, S> {
        &self.importer
    }

    pub async fn handle(&mut self, request: Request) -> Response {
        debug!("Handling {} request", request_name(&request));
        match request {
            Request::ImportFromUrl { url, include_tags } => {
                Response::Import(self.importer.import_url(&url, include_tags).await.into())
            }
            Request::ImportFromHtml { html } => {
                Response::Import(self.importer.import_html(&html).await.into())
            }
            Request::GetSettings => Response::Settings(self.settings_snapshot()),
            Request::GetHtml => match &self.page {
                Some(page) => Response::Page(PageSnapshot {
                    html: page.markup().to_string(),
                    url: page.url.clone(),
                    title: page.title().unwrap_or_default(),
                }),
                None => no_page(),
            },
            Request::GetRecipeData => match &self.page {
                Some(page) => Response::RecipeData(extract_recipe_data(page)),
                None => no_page(),
            },
            Request::Ping => Response::Status {
                status: "ok".to_string(),
            },
        }
    }

    fn settings_snapshot(&self) -> SettingsSnapshot {
        let settings = self.importer.settings();
        SettingsSnapshot {
            server_url: settings.server_url.clone(),
            api_token: settings.api_token.clone(),
            group_slug: settings.group_slug.clone(),
            include_tags_default: settings.include_tags_default,
            domain_preferences: settings.domain_preferences.clone(),
        }
    }
}

fn no_page() -> Response {
    Response::Import(ImportReply::failure("No page loaded"))
}

fn request_name(request: &Request) -> &'static str {
    match request {
        Request::ImportFromUrl { .. } => "importFromUrl",
        Request::ImportFromHtml { .. } => "importFromHtml",
        Request::GetSettings => "getSettings",
        Request::GetHtml => "getHTML",
        Request::GetRecipeData => "getRecipeData",
        Request::Ping => "ping",
    }
}
