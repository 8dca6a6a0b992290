//! Vault item types.
//!
//! A `VaultItem` only ever exists inside an unlocked `Vault`.  Its `id`
//! and `created_at` are fixed when the item is inserted; `updated_at` is
//! refreshed on every mutation and never moves backwards.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::errors::{Result, VaultError};

/// Unique, immutable identifier of a vault item.
pub type ItemId = Uuid;

/// The closed set of item types.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    #[default]
    Login,
    Card,
    Note,
    Identity,
}

impl ItemKind {
    pub const ALL: [ItemKind; 4] = [
        ItemKind::Login,
        ItemKind::Card,
        ItemKind::Note,
        ItemKind::Identity,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::Login => "login",
            ItemKind::Card => "card",
            ItemKind::Note => "note",
            ItemKind::Identity => "identity",
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemKind {
    type Err = VaultError;

    fn from_str(s: &str) -> Result<Self> {
        ItemKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                VaultError::InvalidItem(format!(
                    "unknown item type '{s}': expected login, card, note or identity"
                ))
            })
    }
}

/// A single record stored in the vault.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(rename_all = "camelCase")]
pub struct VaultItem {
    #[zeroize(skip)]
    id: ItemId,

    #[zeroize(skip)]
    #[serde(rename = "type")]
    pub kind: ItemKind,

    pub title: String,
    pub username: String,
    pub password: String,
    pub url: String,
    pub notes: String,
    pub category: String,

    /// Ordered, set-like.  Duplicates are tolerated.
    pub tags: Vec<String>,

    pub favorite: bool,

    #[zeroize(skip)]
    created_at: DateTime<Utc>,

    #[zeroize(skip)]
    updated_at: DateTime<Utc>,
}

impl VaultItem {
    pub(crate) fn from_draft(id: ItemId, draft: ItemDraft, now: DateTime<Utc>) -> Result<Self> {
        let draft = draft.normalized()?;
        Ok(Self {
            id,
            kind: draft.kind,
            title: draft.title,
            username: draft.username,
            password: draft.password,
            url: draft.url,
            notes: draft.notes,
            category: draft.category,
            tags: draft.tags,
            favorite: draft.favorite,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn id(&self) -> ItemId {
        self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Apply a partial update and bump `updated_at`.
    pub(crate) fn apply(&mut self, update: &ItemUpdate, now: DateTime<Utc>) -> Result<()> {
        if let Some(title) = &update.title {
            let title = title.trim();
            if title.is_empty() {
                return Err(VaultError::InvalidItem("title cannot be empty".into()));
            }
            self.title = title.to_string();
        }
        if let Some(kind) = update.kind {
            self.kind = kind;
        }
        if let Some(username) = &update.username {
            self.username = username.trim().to_string();
        }
        if let Some(password) = &update.password {
            self.password.zeroize();
            self.password = password.clone();
        }
        if let Some(url) = &update.url {
            self.url = url.trim().to_string();
        }
        if let Some(notes) = &update.notes {
            self.notes = notes.clone();
        }
        if let Some(category) = &update.category {
            self.category = category.trim().to_string();
        }
        if let Some(tags) = &update.tags {
            self.tags = normalize_tags(tags);
        }
        if let Some(favorite) = update.favorite {
            self.favorite = favorite;
        }
        self.touch(now);
        Ok(())
    }

    pub(crate) fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now.max(self.updated_at);
    }

    /// Case-insensitive substring match over title, username, url and tags.
    pub fn matches(&self, query: &str) -> bool {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        self.title.to_lowercase().contains(&needle)
            || self.username.to_lowercase().contains(&needle)
            || self.url.to_lowercase().contains(&needle)
            || self
                .tags
                .iter()
                .any(|t| t.to_lowercase().contains(&needle))
    }
}

impl fmt::Debug for VaultItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VaultItem")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("title", &self.title)
            .field("password", &"[REDACTED]")
            .field("updated_at", &self.updated_at)
            .finish_non_exhaustive()
    }
}

/// Fields for a new item.  `title` is required; everything else may be
/// left at its default.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemDraft {
    pub kind: ItemKind,
    pub title: String,
    pub username: String,
    pub password: String,
    pub url: String,
    pub notes: String,
    pub category: String,
    pub tags: Vec<String>,
    pub favorite: bool,
}

impl ItemDraft {
    /// Start a draft of the given kind with a title.
    pub fn new(kind: ItemKind, title: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            ..Self::default()
        }
    }

    /// Trim text fields, drop blank tags and check the title.
    fn normalized(&self) -> Result<Self> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(VaultError::InvalidItem("title cannot be empty".into()));
        }
        Ok(Self {
            kind: self.kind,
            title: title.to_string(),
            username: self.username.trim().to_string(),
            password: self.password.clone(),
            url: self.url.trim().to_string(),
            notes: self.notes.clone(),
            category: self.category.trim().to_string(),
            tags: normalize_tags(&self.tags),
            favorite: self.favorite,
        })
    }
}

/// A partial update: `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemUpdate {
    pub kind: Option<ItemKind>,
    pub title: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub url: Option<String>,
    pub notes: Option<String>,
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
    pub favorite: Option<bool>,
}

impl ItemUpdate {
    /// Returns `true` if the update would change nothing.
    pub fn is_empty(&self) -> bool {
        self.kind.is_none()
            && self.title.is_none()
            && self.username.is_none()
            && self.password.is_none()
            && self.url.is_none()
            && self.notes.is_none()
            && self.category.is_none()
            && self.tags.is_none()
            && self.favorite.is_none()
    }
}

fn normalize_tags(tags: &[String]) -> Vec<String> {
    tags.iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn now() -> DateTime<Utc> {
        Utc::now()
    }

    #[test]
    fn draft_is_trimmed() {
        let mut draft = ItemDraft::new(ItemKind::Login, "  Example  ");
        draft.username = " a@b.com ".into();
        draft.tags = vec![" work ".into(), "".into(), "  ".into(), "mail".into()];

        let item = VaultItem::from_draft(Uuid::new_v4(), draft, now()).unwrap();
        assert_eq!(item.title, "Example");
        assert_eq!(item.username, "a@b.com");
        assert_eq!(item.tags, vec!["work".to_string(), "mail".to_string()]);
        assert_eq!(item.created_at(), item.updated_at());
    }

    #[test]
    fn blank_title_is_rejected() {
        let draft = ItemDraft::new(ItemKind::Note, "   ");
        let result = VaultItem::from_draft(Uuid::new_v4(), draft, now());
        assert!(matches!(result, Err(VaultError::InvalidItem(_))));
    }

    #[test]
    fn update_bumps_updated_at_only() {
        let t0 = now();
        let mut item =
            VaultItem::from_draft(Uuid::new_v4(), ItemDraft::new(ItemKind::Login, "A"), t0)
                .unwrap();
        let update = ItemUpdate {
            notes: Some("hello".into()),
            ..ItemUpdate::default()
        };
        item.apply(&update, t0 + Duration::seconds(5)).unwrap();
        assert_eq!(item.created_at(), t0);
        assert_eq!(item.updated_at(), t0 + Duration::seconds(5));
        assert_eq!(item.notes, "hello");
    }

    #[test]
    fn updated_at_never_moves_backwards() {
        let t0 = now();
        let mut item =
            VaultItem::from_draft(Uuid::new_v4(), ItemDraft::new(ItemKind::Login, "A"), t0)
                .unwrap();
        item.touch(t0 - Duration::seconds(30));
        assert_eq!(item.updated_at(), t0);
    }

    #[test]
    fn update_rejects_blank_title() {
        let mut item =
            VaultItem::from_draft(Uuid::new_v4(), ItemDraft::new(ItemKind::Card, "Visa"), now())
                .unwrap();
        let update = ItemUpdate {
            title: Some(" ".into()),
            ..ItemUpdate::default()
        };
        assert!(item.apply(&update, now()).is_err());
        assert_eq!(item.title, "Visa");
    }

    #[test]
    fn kind_parses_case_insensitively() {
        assert_eq!("Login".parse::<ItemKind>().unwrap(), ItemKind::Login);
        assert_eq!("IDENTITY".parse::<ItemKind>().unwrap(), ItemKind::Identity);
        assert!("wallet".parse::<ItemKind>().is_err());
    }

    #[test]
    fn serializes_with_type_tag() {
        let item =
            VaultItem::from_draft(Uuid::new_v4(), ItemDraft::new(ItemKind::Card, "Visa"), now())
                .unwrap();
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["type"], "card");
        assert!(json.get("createdAt").is_some());
        assert!(json.get("updatedAt").is_some());
    }

    #[test]
    fn matches_searches_several_fields() {
        let mut draft = ItemDraft::new(ItemKind::Login, "GitHub");
        draft.username = "octo@example.com".into();
        draft.tags = vec!["Work".into()];
        let item = VaultItem::from_draft(Uuid::new_v4(), draft, now()).unwrap();

        assert!(item.matches("github"));
        assert!(item.matches("OCTO"));
        assert!(item.matches("work"));
        assert!(item.matches(""));
        assert!(!item.matches("gitlab"));
    }
}
