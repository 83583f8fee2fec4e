use thiserror::Error;

/// Errors that can occur during recipe import operations
#[derive(Error, Debug)]
pub enum ImportError {
    /// Server URL or API token is missing
    #[error("Mealie not configured. Please set up your connection first.")]
    NotConfigured,

    /// The server rejected the API token (HTTP 401)
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The server could not parse a recipe from what was sent (HTTP 400/422)
    #[error("Could not parse recipe (HTTP {status}): {body}")]
    UnparsableRecipe { status: u16, body: String },

    /// Transport failure: unreachable host, TLS, CORS-style refusals
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// Any other non-success status
    #[error("Server error (HTTP {status}): {body}")]
    ServerError { status: u16, body: String },

    /// Structured extraction was requested on a page without a JSON-LD recipe
    #[error("No recipe data found on this page")]
    NoRecipeFound,

    /// The server answered 2xx with a body we could not read a slug from
    #[error("Unexpected response from server: {0}")]
    UnexpectedResponse(String),

    /// A URL could not be parsed
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Failed to download the page to analyze
    #[error("Failed to fetch page: {0}")]
    FetchError(String),

    /// Builder configuration error
    #[error("Builder error: {0}")]
    BuilderError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(#[from] config::ConfigError),

    /// Reading or writing the domain preference file failed
    #[error("Preference storage error: {0}")]
    PreferenceError(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl ImportError {
    /// Classify a non-success HTTP status from the recipe endpoints
    pub fn from_status(status: u16, body: String) -> Self {
        match status {
            401 => ImportError::AuthenticationFailed(body),
            400 | 422 => ImportError::UnparsableRecipe { status, body },
            _ => ImportError::ServerError { status, body },
        }
    }

    /// True when retrying with a different import method may help
    pub fn suggests_other_method(&self) -> bool {
        matches!(
            self,
            ImportError::UnparsableRecipe { .. } | ImportError::NoRecipeFound
        )
    }

    /// Message suitable for showing to the person doing the import
    pub fn user_message(&self) -> String {
        match self {
            ImportError::NotConfigured => {
                "Connect to your Mealie instance to start importing recipes.".to_string()
            }
            ImportError::AuthenticationFailed(_) => {
                "Authentication failed. Check your API token in settings.".to_string()
            }
            ImportError::UnparsableRecipe { .. } => {
                "Could not parse recipe. Try a different method.".to_string()
            }
            ImportError::NetworkError(_) => {
                "Cannot connect to Mealie. Check the URL and ensure CORS is enabled.".to_string()
            }
            ImportError::ServerError { status, .. } => format!("Import failed (HTTP {status})"),
            other => other.to_string(),
        }
    }
}
