use crate::config::{normalize_server_url, ImportSettings};
use crate::error::ImportError;
use crate::model::AuxiliarySection;
use async_trait::async_trait;
use log::debug;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

/// Recipe-creating operations of the Mealie API
#[async_trait]
pub trait RecipeApi: Send + Sync {
    /// Let the server fetch and scrape `url`; returns the new recipe's slug
    async fn create_from_url(&self, url: &str, include_tags: bool) -> Result<String, ImportError>;

    /// Let the server parse raw page markup
    async fn create_from_html(&self, html: &str) -> Result<String, ImportError>;

    /// Create from a schema.org Recipe object
    async fn create_from_json(&self, recipe: &Value) -> Result<String, ImportError>;

    /// Attach notes to an existing recipe
    async fn add_notes(&self, slug: &str, notes: &[AuxiliarySection]) -> Result<(), ImportError>;
}

/// The user the API token belongs to
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentUser {
    pub full_name: Option<String>,
    pub username: Option<String>,
    pub email: Option<String>,
}

impl CurrentUser {
    pub fn display_name(&self) -> &str {
        [&self.full_name, &self.username, &self.email]
            .into_iter()
            .flatten()
            .map(String::as_str)
            .find(|name| !name.is_empty())
            .unwrap_or("User")
    }
}

pub struct MealieClient {
    client: Client,
    base_url: String,
    api_token: String,
}

impl MealieClient {
    /// Build a client without checking the connection settings; use
    /// [`MealieClient::from_settings`] to fail early on a blank URL or token.
    pub fn new(base_url: &str, api_token: &str) -> Result<Self, ImportError> {
        let base_url = normalize_server_url(base_url);
        let api_token = api_token.trim().to_string();

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = Client::builder().default_headers(headers).build()?;

        Ok(MealieClient {
            client,
            base_url,
            api_token,
        })
    }

    pub fn from_settings(settings: &ImportSettings) -> Result<Self, ImportError> {
        settings.ensure_configured()?;
        Self::new(&settings.server_url, &settings.api_token)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send with the bearer token and turn non-success statuses into errors
    async fn send(&self, request: RequestBuilder) -> Result<Response, ImportError> {
        let response = request.bearer_auth(&self.api_token).send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        debug!("Mealie responded {}: {}", status, body);
        Err(ImportError::from_status(status.as_u16(), body))
    }

    async fn post_for_slug(&self, path: &str, body: Value) -> Result<String, ImportError> {
        let response = self
            .send(self.client.post(self.endpoint(path)).json(&body))
            .await?;
        normalize_slug(&body_text(response).await?)
    }

    /// Check the URL and token by fetching the current user
    pub async fn test_connection(&self) -> Result<CurrentUser, ImportError> {
        let response = self
            .send(self.client.get(self.endpoint("/api/users/self")))
            .await?;
        read_json(response).await
    }

    /// Ask the server to scrape a URL without saving anything
    pub async fn test_scrape_url(&self, url: &str) -> Result<Value, ImportError> {
        let response = self
            .send(
                self.client
                    .post(self.endpoint("/api/recipes/test-scrape-url"))
                    .json(&json!({ "url": url })),
            )
            .await?;
        read_json(response).await
    }
}

#[async_trait]
impl RecipeApi for MealieClient {
    async fn create_from_url(&self, url: &str, include_tags: bool) -> Result<String, ImportError> {
        self.post_for_slug(
            "/api/recipes/create/url",
            json!({ "url": url, "include_tags": include_tags }),
        )
        .await
    }

    async fn create_from_html(&self, html: &str) -> Result<String, ImportError> {
        self.post_for_slug("/api/recipes/create/html-or-json", json!({ "html": html }))
            .await
    }

    async fn create_from_json(&self, recipe: &Value) -> Result<String, ImportError> {
        // The endpoint wants the recipe as a JSON string, not a nested object
        let data = serde_json::to_string(recipe)?;
        self.post_for_slug("/api/recipes/create/html-or-json", json!({ "data": data }))
            .await
    }

    async fn add_notes(&self, slug: &str, notes: &[AuxiliarySection]) -> Result<(), ImportError> {
        let notes: Vec<Value> = notes
            .iter()
            .map(|note| json!({ "title": note.title, "text": note.content }))
            .collect();
        self.send(
            self.client
                .patch(self.endpoint(&format!("/api/recipes/{slug}")))
                .json(&json!({ "notes": notes })),
        )
        .await?;
        Ok(())
    }
}

/// Body of a successful response; a body that cannot be read is the
/// server's fault, not the connection's
async fn body_text(response: Response) -> Result<String, ImportError> {
    response
        .text()
        .await
        .map_err(|e| ImportError::UnexpectedResponse(format!("unreadable body: {e}")))
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ImportError> {
    let body = body_text(response).await?;
    serde_json::from_str(&body)
        .map_err(|e| ImportError::UnexpectedResponse(format!("{e}: {body}")))
}

/// Read a slug from a create response.
///
/// The server answers either with a JSON string (possibly quoted twice), an
/// object with a `slug` field, or bare text.
pub fn normalize_slug(body: &str) -> Result<String, ImportError> {
    let slug = match serde_json::from_str::<Value>(body.trim()) {
        Ok(Value::String(slug)) => slug,
        Ok(Value::Object(object)) => object
            .get("slug")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| ImportError::UnexpectedResponse(body.to_string()))?,
        _ => body.to_string(),
    };

    let slug = slug.replace('"', "").trim().to_string();
    if slug.is_empty() {
        return Err(ImportError::UnexpectedResponse(body.to_string()));
    }
    Ok(slug)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    #[test]
    fn test_normalize_slug_shapes() {
        assert_eq!(normalize_slug("\"abc123\"").unwrap(), "abc123");
        assert_eq!(normalize_slug("\"\\\"abc123\\\"\"").unwrap(), "abc123");
        assert_eq!(normalize_slug("abc123\n").unwrap(), "abc123");
        assert_eq!(
            normalize_slug(r#"{"slug": "pan-pizza", "id": 4}"#).unwrap(),
            "pan-pizza"
        );
        assert!(normalize_slug(r#"{"id": 4}"#).is_err());
        assert!(normalize_slug("\"\"").is_err());
    }

    #[test]
    fn test_display_name_fallbacks() {
        let user = CurrentUser {
            full_name: Some(String::new()),
            username: Some("chef".to_string()),
            email: Some("chef@example.com".to_string()),
        };
        assert_eq!(user.display_name(), "chef");
        assert_eq!(CurrentUser::default().display_name(), "User");
    }

    #[test]
    fn test_from_settings_requires_url_and_token() {
        assert!(matches!(
            MealieClient::from_settings(&ImportSettings::new("", "token")),
            Err(ImportError::NotConfigured)
        ));
        assert!(matches!(
            MealieClient::from_settings(&ImportSettings::new("https://mealie.example.com", "  ")),
            Err(ImportError::NotConfigured)
        ));
        let client = MealieClient::new("https://mealie.example.com/", "token").unwrap();
        assert_eq!(client.base_url(), "https://mealie.example.com");
    }

    #[tokio::test]
    async fn test_connection_returns_user() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/api/users/self")
            .match_header("authorization", "Bearer secret")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"fullName": "Julia Child", "username": "julia"}"#)
            .create_async()
            .await;

        let client = MealieClient::new(&format!("{}/", server.url()), "secret").unwrap();
        let user = client.test_connection().await.unwrap();
        assert_eq!(user.display_name(), "Julia Child");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_connection_unauthorized() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/users/self")
            .with_status(401)
            .with_body(r#"{"detail": "Not authenticated"}"#)
            .create_async()
            .await;

        let client = MealieClient::new(&server.url(), "bad").unwrap();
        let result = client.test_connection().await;
        assert!(matches!(result, Err(ImportError::AuthenticationFailed(_))));
    }

    #[tokio::test]
    async fn test_connection_with_non_json_body() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/users/self")
            .with_status(200)
            .with_body("<html>Login</html>")
            .create_async()
            .await;

        let client = MealieClient::new(&server.url(), "token").unwrap();
        let result = client.test_connection().await;
        assert!(matches!(result, Err(ImportError::UnexpectedResponse(_))));
    }

    #[tokio::test]
    async fn test_scrape_url_returns_preview() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/api/recipes/test-scrape-url")
            .match_header("authorization", "Bearer token")
            .match_body(Matcher::Json(json!({"url": "https://example.com/flan"})))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"name": "Flan", "recipeIngredient": ["4 eggs"]}"#)
            .create_async()
            .await;

        let client = MealieClient::new(&server.url(), "token").unwrap();
        let preview = client
            .test_scrape_url("https://example.com/flan")
            .await
            .unwrap();
        assert_eq!(preview["name"], "Flan");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_create_from_json_sends_stringified_data() {
        let mut server = Server::new_async().await;
        let recipe = json!({"@type": "Recipe", "name": "Flan"});
        let mock = server
            .mock("POST", "/api/recipes/create/html-or-json")
            .match_header("content-type", "application/json")
            .match_body(Matcher::Json(
                json!({ "data": serde_json::to_string(&recipe).unwrap() }),
            ))
            .with_status(201)
            .with_body(r#""flan""#)
            .create_async()
            .await;

        let client = MealieClient::new(&server.url(), "token").unwrap();
        assert_eq!(client.create_from_json(&recipe).await.unwrap(), "flan");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_add_notes_patches_recipe() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("PATCH", "/api/recipes/flan")
            .match_body(Matcher::Json(json!({
                "notes": [{"title": "Before You Begin", "text": "Use a water bath."}]
            })))
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;

        let client = MealieClient::new(&server.url(), "token").unwrap();
        client
            .add_notes(
                "flan",
                &[AuxiliarySection {
                    title: "Before You Begin".to_string(),
                    content: "Use a water bath.".to_string(),
                }],
            )
            .await
            .unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_unreachable_server_is_network_error() {
        // Nothing listens on port 9 on the loopback interface
        let client = MealieClient::new("http://127.0.0.1:9", "token").unwrap();
        let result = client.create_from_url("https://example.com", false).await;
        assert!(matches!(result, Err(ImportError::NetworkError(_))));
    }
}
