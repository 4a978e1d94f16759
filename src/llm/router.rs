use crate::error::{ExtractionError, Result};
use crate::llm::client::{GeminiClient, OpenAiClient, DEFAULT_GEMINI_MODEL, DEFAULT_OPENAI_MODEL};
use crate::llm::completion::TextCompletion;
use log::{debug, info, warn};
use std::collections::BTreeMap;
use std::thread;
use tokio::runtime::{Builder, Handle, Runtime};

pub const OPENAI: &str = "openai";
pub const GOOGLE: &str = "google";

const DEFAULT_PROVIDER_LIST: &str = GOOGLE;

/// Provider selection and credentials, usually read from the environment.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderSettings {
    /// Configured providers; the first one is the default.
    pub providers: Vec<String>,
    pub openai_api_key: Option<String>,
    pub google_api_key: Option<String>,
    pub openai_model: String,
    pub gemini_model: String,
    /// Overrides the OpenAI API root, e.g. for a compatible proxy.
    pub openai_base_url: Option<String>,
    pub gemini_base_url: Option<String>,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            providers: vec![GOOGLE.to_string()],
            openai_api_key: None,
            google_api_key: None,
            openai_model: DEFAULT_OPENAI_MODEL.to_string(),
            gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
            openai_base_url: None,
            gemini_base_url: None,
        }
    }
}

impl ProviderSettings {
    /// Reads `LLM_PROVIDER`, the `OPENAI_*`/`GOOGLE_API_KEY` credentials,
    /// the model names and the optional `*_BASE_URL` overrides.
    pub fn from_env() -> Self {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());

        Self {
            providers: parse_provider_list(
                &var("LLM_PROVIDER").unwrap_or_else(|| DEFAULT_PROVIDER_LIST.to_string()),
            ),
            openai_api_key: var("OPENAI_API_KEY"),
            google_api_key: var("GOOGLE_API_KEY"),
            openai_model: var("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
            gemini_model: var("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            openai_base_url: var("OPENAI_BASE_URL"),
            gemini_base_url: var("GEMINI_BASE_URL"),
        }
    }

    pub fn default_provider(&self) -> Option<&str> {
        self.providers.first().map(String::as_str)
    }
}

pub fn parse_provider_list(raw: &str) -> Vec<String> {
    let mut providers: Vec<String> = Vec::new();
    for name in raw.split(',') {
        let name = name.trim().to_lowercase();
        if !name.is_empty() && !providers.contains(&name) {
            providers.push(name);
        }
    }
    if providers.is_empty() {
        providers.push(DEFAULT_PROVIDER_LIST.to_string());
    }
    providers
}

enum ProviderClient {
    OpenAi(OpenAiClient),
    Gemini(GeminiClient),
}

/// Blocking [`TextCompletion`] over the configured HTTP providers.
///
/// The router owns a current-thread tokio runtime and drives each request
/// to completion on it. When called from inside another tokio runtime the
/// request is driven on a short-lived helper thread instead, so the caller's
/// runtime is never blocked re-entrantly.
///
/// Retry selection is not the router's concern: callers pick the retry
/// provider (see `ExtractorConfig::retry_provider`) and check it with
/// [`TextCompletion::supports`].
pub struct ProviderRouter {
    runtime: Option<Runtime>,
    clients: BTreeMap<String, ProviderClient>,
    default_provider: String,
}

impl ProviderRouter {
    pub fn new(settings: ProviderSettings) -> Result<Self> {
        let mut clients = BTreeMap::new();

        for name in &settings.providers {
            let client = match name.as_str() {
                OPENAI => {
                    let key = settings
                        .openai_api_key
                        .clone()
                        .ok_or_else(|| ExtractionError::MissingApiKey("OPENAI_API_KEY".to_string()))?;
                    let mut client = OpenAiClient::with_model(key, &settings.openai_model);
                    if let Some(url) = &settings.openai_base_url {
                        client = client.with_base_url(url);
                    }
                    ProviderClient::OpenAi(client)
                }
                GOOGLE => {
                    let key = settings
                        .google_api_key
                        .clone()
                        .ok_or_else(|| ExtractionError::MissingApiKey("GOOGLE_API_KEY".to_string()))?;
                    let mut client = GeminiClient::with_model(key, &settings.gemini_model);
                    if let Some(url) = &settings.gemini_base_url {
                        client = client.with_base_url(url);
                    }
                    ProviderClient::Gemini(client)
                }
                other => return Err(ExtractionError::UnknownProvider(other.to_string())),
            };
            clients.insert(name.clone(), client);
        }

        let default_provider = settings
            .default_provider()
            .ok_or_else(|| ExtractionError::InvalidConfig("no LLM provider configured".to_string()))?
            .to_string();

        let runtime = Builder::new_current_thread().enable_all().build()?;

        info!(
            "Initialized LLM providers {:?} (default: {})",
            clients.keys().collect::<Vec<_>>(),
            default_provider
        );

        Ok(Self {
            runtime: Some(runtime),
            clients,
            default_provider,
        })
    }

    pub fn from_env() -> Result<Self> {
        Self::new(ProviderSettings::from_env())
    }

    pub fn providers(&self) -> impl Iterator<Item = &str> {
        self.clients.keys().map(String::as_str)
    }

    fn resolve(&self, requested: Option<&str>) -> Result<(&str, &ProviderClient)> {
        let name = match requested {
            Some(name) if self.clients.contains_key(name) => name,
            Some(name) => {
                warn!(
                    "Provider {} not available, using default provider {}",
                    name, self.default_provider
                );
                self.default_provider.as_str()
            }
            None => self.default_provider.as_str(),
        };
        self.clients
            .get_key_value(name)
            .map(|(k, v)| (k.as_str(), v))
            .ok_or_else(|| ExtractionError::UnknownProvider(name.to_string()))
    }

    fn send(&self, name: &str, client: &ProviderClient, prompt: &str) -> Result<String> {
        let runtime = self
            .runtime
            .as_ref()
            .ok_or_else(|| ExtractionError::InvalidConfig("provider runtime is shut down".to_string()))?;

        let request = || match client {
            ProviderClient::OpenAi(c) => runtime.block_on(c.chat_completion(prompt)),
            ProviderClient::Gemini(c) => runtime.block_on(c.generate_content(prompt)),
        };

        if Handle::try_current().is_err() {
            return request();
        }

        debug!("Called from inside a tokio runtime, sending {} request from a helper thread", name);
        thread::scope(|scope| scope.spawn(request).join()).unwrap_or_else(|_| {
            Err(ExtractionError::CompletionFailed {
                provider: name.to_string(),
                message: "request thread panicked".to_string(),
            })
        })
    }
}

impl Drop for ProviderRouter {
    fn drop(&mut self) {
        // Dropping a runtime blocks, which tokio forbids inside another runtime.
        if let Some(runtime) = self.runtime.take() {
            if Handle::try_current().is_ok() {
                runtime.shutdown_background();
            }
        }
    }
}

impl TextCompletion for ProviderRouter {
    fn complete(&self, prompt: &str, provider: Option<&str>) -> Result<String> {
        let (name, client) = self.resolve(provider)?;
        info!("Generating text with {} provider", name);

        self.send(name, client, prompt).map_err(|e| match e {
            ExtractionError::CompletionFailed { .. } => e,
            other => ExtractionError::CompletionFailed {
                provider: name.to_string(),
                message: other.to_string(),
            },
        })
    }

    fn default_provider(&self) -> Option<&str> {
        Some(self.default_provider.as_str())
    }

    fn supports(&self, provider: &str) -> bool {
        self.clients.contains_key(provider)
    }
}
