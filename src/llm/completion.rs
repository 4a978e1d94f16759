use crate::error::Result;
use std::sync::Arc;

/// A text-completion capability: given a prompt, return the model's text.
///
/// `provider` names a specific backend (e.g. `"openai"`, `"google"`);
/// `None` means the implementation's default.
pub trait TextCompletion {
    fn complete(&self, prompt: &str, provider: Option<&str>) -> Result<String>;

    /// The provider used when `complete` is called with `None`.
    fn default_provider(&self) -> Option<&str> {
        None
    }

    /// Whether `provider` can be requested explicitly.
    fn supports(&self, provider: &str) -> bool {
        let _ = provider;
        false
    }
}

impl<T: TextCompletion + ?Sized> TextCompletion for &T {
    fn complete(&self, prompt: &str, provider: Option<&str>) -> Result<String> {
        (**self).complete(prompt, provider)
    }

    fn default_provider(&self) -> Option<&str> {
        (**self).default_provider()
    }

    fn supports(&self, provider: &str) -> bool {
        (**self).supports(provider)
    }
}

impl<T: TextCompletion + ?Sized> TextCompletion for Box<T> {
    fn complete(&self, prompt: &str, provider: Option<&str>) -> Result<String> {
        (**self).complete(prompt, provider)
    }

    fn default_provider(&self) -> Option<&str> {
        (**self).default_provider()
    }

    fn supports(&self, provider: &str) -> bool {
        (**self).supports(provider)
    }
}

impl<T: TextCompletion + ?Sized> TextCompletion for Arc<T> {
    fn complete(&self, prompt: &str, provider: Option<&str>) -> Result<String> {
        (**self).complete(prompt, provider)
    }

    fn default_provider(&self) -> Option<&str> {
        (**self).default_provider()
    }

    fn supports(&self, provider: &str) -> bool {
        (**self).supports(provider)
    }
}
