//! Client capability signals for serving the WebP alternate.
//!
//! Both headers must agree before the alternate is served: the `Accept`
//! header has to list the format and the `User-Agent` has to name an engine
//! known to render it. Missing headers count as "no".

use crate::config::NegotiationConfig;

/// Read-only capability signals taken from one HTTP request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClientHints {
    /// `Accept` contains the alternate's media type.
    pub accepts_alt: bool,
    /// `User-Agent` names a capable browser engine.
    pub capable_browser: bool,
}

impl ClientHints {
    pub fn new(accepts_alt: bool, capable_browser: bool) -> Self {
        Self {
            accepts_alt,
            capable_browser,
        }
    }

    /// Derive hints from raw header values.
    ///
    /// The `Accept` match is case-sensitive, the `User-Agent` match is not.
    pub fn from_headers(
        accept: Option<&str>,
        user_agent: Option<&str>,
        config: &NegotiationConfig,
    ) -> Self {
        let accepts_alt = accept.is_some_and(|a| a.contains(config.accept_token.as_str()));
        let token = config.user_agent_token.to_ascii_lowercase();
        let capable_browser =
            user_agent.is_some_and(|ua| ua.to_ascii_lowercase().contains(&token));
        Self {
            accepts_alt,
            capable_browser,
        }
    }

    /// `true` only when both signals are positive.
    pub fn prefers_alternate(&self) -> bool {
        self.accepts_alt && self.capable_browser
    }
}
