//! Save proposals from form detection.
//!
//! When a login form is submitted on a site, the autofill relay hands the
//! core a `SaveProposal`.  Proposals wait in a volatile queue until the
//! user accepts or dismisses them; nothing is merged into the vault
//! without that confirmation.

use chrono::{DateTime, Utc};
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::item::{ItemDraft, ItemKind};

/// A credential captured from a submitted form, awaiting review.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct SaveProposal {
    pub url: String,
    pub username: String,
    pub password: String,
    #[zeroize(skip)]
    pub timestamp: DateTime<Utc>,
}

impl std::fmt::Debug for SaveProposal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SaveProposal")
            .field("url", &self.url)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("timestamp", &self.timestamp)
            .finish()
    }
}

impl SaveProposal {
    pub fn new(
        url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            username: username.into(),
            password: password.into(),
            timestamp: Utc::now(),
        }
    }

    /// The site's host name, used as the title of the saved login.
    ///
    /// IPv6 literals keep their brackets, as in `[::1]`.
    pub fn site(&self) -> &str {
        let rest = self
            .url
            .split_once("://")
            .map_or(self.url.as_str(), |(_, rest)| rest);
        let authority = rest.split(['/', '?', '#']).next().unwrap_or(rest);
        let host = authority
            .rsplit_once('@')
            .map_or(authority, |(_, host)| host);
        if host.starts_with('[') {
            return host.find(']').map_or(host, |end| &host[..=end]);
        }
        host.split(':').next().unwrap_or(host)
    }

    /// A login draft carrying this proposal's fields.
    pub fn to_draft(&self) -> ItemDraft {
        let site = self.site();
        let title = if site.is_empty() { &self.url } else { site };
        ItemDraft {
            kind: ItemKind::Login,
            title: title.to_string(),
            username: self.username.clone(),
            password: self.password.clone(),
            url: self.url.clone(),
            ..ItemDraft::default()
        }
    }
}
