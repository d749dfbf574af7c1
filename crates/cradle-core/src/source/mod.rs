//! Endpoint sources.
//!
//! A [`GenerationRequest`] comes from one of three places: the built-in demo
//! catalog, a generation provider answering a free-text requirement, or the
//! rule-based fallback when providers fail and the source runs in
//! [`SourceMode::Fallback`].

pub mod catalog;

// Internal imports (std, crate)
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::config::Config;
use crate::endpoint::GenerationRequest;
use crate::error::{Error, Result};
use crate::providers::{build_providers, GenerationProvider};

// External imports (alphabetized)
use futures::future::join_all;
use serde::{Deserialize, Serialize};

/// Message reported for an empty free-text requirement
pub const EMPTY_REQUIREMENT_MESSAGE: &str = "Please enter a requirement to generate a custom API.";

/// What to do when providers cannot deliver an endpoint list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceMode {
    /// Substitute the rule-based endpoint list and attach a note
    #[default]
    Fallback,
    /// Report the failure to the caller
    Strict,
}

impl FromStr for SourceMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fallback" => Ok(Self::Fallback),
            "strict" => Ok(Self::Strict),
            _ => Err(format!(
                "Unknown source mode: {} (expected fallback or strict)",
                s
            )),
        }
    }
}

impl fmt::Display for SourceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Fallback => "fallback",
            Self::Strict => "strict",
        })
    }
}

/// Where a request came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceOrigin {
    Demo(String),
    Provider(String),
    Fallback,
}

impl fmt::Display for SourceOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Demo(key) => write!(f, "demo catalog ({})", key),
            Self::Provider(name) => write!(f, "provider {}", name),
            Self::Fallback => f.write_str("rule-based fallback"),
        }
    }
}

/// A request together with how it was obtained
#[derive(Debug, Clone)]
pub struct SourceOutput {
    pub request: GenerationRequest,
    pub origin: SourceOrigin,
    /// Informational notes for the user, such as why the fallback was used
    pub notes: Vec<String>,
}

/// Produces generation requests from demo keys or free text
pub struct EndpointSource {
    /// Providers in priority order
    providers: Vec<Box<dyn GenerationProvider>>,
    mode: SourceMode,
    timeout: Duration,
}

impl EndpointSource {
    pub fn new(
        providers: Vec<Box<dyn GenerationProvider>>,
        mode: SourceMode,
        timeout: Duration,
    ) -> Self {
        Self {
            providers,
            mode,
            timeout,
        }
    }

    /// Build the providers named by a configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(
            build_providers(&config.providers)?,
            config.mode,
            config.timeout(),
        ))
    }

    pub fn mode(&self) -> SourceMode {
        self.mode
    }

    /// Look up a demo API by key
    pub fn from_demo(key: &str) -> Result<GenerationRequest> {
        match catalog::find_demo(key) {
            Some(demo) => demo.request(),
            None => Err(Error::invalid_input(format!(
                "Unknown demo API '{}'. Available demos: {}",
                key.trim(),
                catalog::demo_keys().collect::<Vec<_>>().join(", ")
            ))),
        }
    }

    /// Obtain a request for a free-text requirement.
    ///
    /// Empty text fails with `InvalidInput` before any provider is asked.
    /// Every other failure is either reported or replaced by the rule-based
    /// fallback, depending on the mode.
    pub async fn from_free_text(&self, text: &str) -> Result<SourceOutput> {
        let requirement = text.trim();
        if requirement.is_empty() {
            return Err(Error::invalid_input(EMPTY_REQUIREMENT_MESSAGE));
        }

        match self.query_providers(requirement).await {
            Ok((name, request)) => {
                log::info!(
                    "Provider {} produced {} endpoints",
                    name,
                    request.endpoints().len()
                );
                Ok(SourceOutput {
                    request,
                    origin: SourceOrigin::Provider(name),
                    notes: Vec::new(),
                })
            }
            Err(err) => match self.mode {
                SourceMode::Strict => Err(err),
                SourceMode::Fallback => {
                    log::warn!("Using rule-based fallback: {}", err);
                    let mut output = Self::rule_based_fallback(requirement)?;
                    output
                        .notes
                        .push(format!("Generated with the rule-based fallback. {}", err));
                    Ok(output)
                }
            },
        }
    }

    /// The fixed list/create pair. The text is ignored.
    pub fn rule_based_fallback(_text: &str) -> Result<SourceOutput> {
        Ok(SourceOutput {
            request: catalog::fallback_request()?,
            origin: SourceOrigin::Fallback,
            notes: Vec::new(),
        })
    }

    /// Ask every available provider at once and pick the first success in
    /// priority order.
    async fn query_providers(&self, requirement: &str) -> Result<(String, GenerationRequest)> {
        let available: Vec<&dyn GenerationProvider> = self
            .providers
            .iter()
            .map(|p| &**p)
            .filter(|p| {
                let available = p.is_available();
                if !available {
                    log::debug!("Skipping unavailable provider {}", p.name());
                }
                available
            })
            .collect();
        if available.is_empty() {
            return Err(Error::unavailable(
                "No generation provider is configured. Set OPENAI_API_KEY or configure a provider.",
            ));
        }

        let timeout = self.timeout;
        let attempts = available.iter().map(|provider| async move {
            let result = match tokio::time::timeout(timeout, provider.generate(requirement)).await {
                Ok(draft) => draft.and_then(|draft| draft.into_request()),
                Err(_) => Err(Error::unavailable(format!(
                    "{} did not answer within {:?}",
                    provider.name(),
                    timeout
                ))),
            };
            (provider.name().to_string(), result)
        });

        let mut first_error = None;
        for (name, result) in join_all(attempts).await {
            match result {
                Ok(request) => return Ok((name, request)),
                Err(err) => {
                    log::warn!("Provider {} failed: {}", name, err);
                    first_error.get_or_insert(err);
                }
            }
        }
        Err(first_error.unwrap_or_else(|| Error::unavailable("no provider answered")))
    }
}
