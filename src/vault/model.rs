//! The plaintext vault aggregate that gets sealed as one unit.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::item::{ItemDraft, ItemId, ItemKind, ItemUpdate, VaultItem};
use crate::errors::{Result, VaultError};

/// Schema version written inside every sealed vault.
pub const SCHEMA_VERSION: u32 = 1;

/// Ordered collection of items with unique ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vault {
    schema_version: u32,
    items: Vec<VaultItem>,
}

/// Criteria for `Vault::filter`.  All set criteria must match.
#[derive(Debug, Clone, Default)]
pub struct ItemFilter {
    pub kind: Option<ItemKind>,
    pub favorites_only: bool,
    pub query: Option<String>,
}

impl Default for Vault {
    fn default() -> Self {
        Self::new()
    }
}

impl Vault {
    /// An empty vault at the current schema version.
    pub fn new() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            items: Vec::new(),
        }
    }

    /// Check a freshly opened vault: known schema, unique ids, and for
    /// each item a non-blank title and `updated_at >= created_at`.
    pub(crate) fn validate(&self) -> Result<()> {
        if self.schema_version == 0 || self.schema_version > SCHEMA_VERSION {
            return Err(VaultError::UnsupportedSchema(self.schema_version));
        }
        let mut seen = HashSet::with_capacity(self.items.len());
        for item in &self.items {
            if !seen.insert(item.id())
                || item.title.trim().is_empty()
                || item.updated_at() < item.created_at()
            {
                return Err(VaultError::VaultCorrupted);
            }
        }
        Ok(())
    }

    pub fn schema_version(&self) -> u32 {
        self.schema_version
    }

    /// All items, in insertion order.
    pub fn items(&self) -> &[VaultItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: ItemId) -> Option<&VaultItem> {
        self.items.iter().find(|item| item.id() == id)
    }

    /// Items matching every criterion in `filter`, in insertion order.
    pub fn filter(&self, filter: &ItemFilter) -> Vec<&VaultItem> {
        self.items
            .iter()
            .filter(|item| filter.kind.map_or(true, |k| item.kind == k))
            .filter(|item| !filter.favorites_only || item.favorite)
            .filter(|item| filter.query.as_deref().map_or(true, |q| item.matches(q)))
            .collect()
    }

    /// Resolve a full id or a unique id prefix.
    pub fn find_by_prefix(&self, prefix: &str) -> Result<&VaultItem> {
        let prefix = prefix.trim().to_lowercase();
        if let Ok(id) = Uuid::parse_str(&prefix) {
            return self.get(id).ok_or(VaultError::ItemNotFound(id));
        }

        let mut matches = self
            .items
            .iter()
            .filter(|item| !prefix.is_empty() && item.id().to_string().starts_with(&prefix));
        match (matches.next(), matches.next()) {
            (Some(item), None) => Ok(item),
            (None, _) => Err(VaultError::InvalidItem(format!(
                "no item id starts with '{prefix}'"
            ))),
            (Some(_), Some(_)) => Err(VaultError::InvalidItem(format!(
                "id prefix '{prefix}' is ambiguous"
            ))),
        }
    }

    // ------------------------------------------------------------------
    // Mutations (only reachable through an unlocked session)
    // ------------------------------------------------------------------

    pub(crate) fn insert(&mut self, draft: ItemDraft, now: DateTime<Utc>) -> Result<ItemId> {
        let mut id = Uuid::new_v4();
        while self.get(id).is_some() {
            id = Uuid::new_v4();
        }
        let item = VaultItem::from_draft(id, draft, now)?;
        self.items.push(item);
        Ok(id)
    }

    pub(crate) fn update(
        &mut self,
        id: ItemId,
        update: &ItemUpdate,
        now: DateTime<Utc>,
    ) -> Result<()> {
        self.get_mut(id)?.apply(update, now)
    }

    pub(crate) fn toggle_favorite(&mut self, id: ItemId, now: DateTime<Utc>) -> Result<bool> {
        let item = self.get_mut(id)?;
        item.favorite = !item.favorite;
        item.touch(now);
        Ok(item.favorite)
    }

    pub(crate) fn remove(&mut self, id: ItemId) -> Result<()> {
        let idx = self
            .items
            .iter()
            .position(|item| item.id() == id)
            .ok_or(VaultError::ItemNotFound(id))?;
        self.items.remove(idx);
        Ok(())
    }

    fn get_mut(&mut self, id: ItemId) -> Result<&mut VaultItem> {
        self.items
            .iter_mut()
            .find(|item| item.id() == id)
            .ok_or(VaultError::ItemNotFound(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(kind: ItemKind, title: &str) -> ItemDraft {
        ItemDraft::new(kind, title)
    }

    #[test]
    fn new_vault_is_empty_and_current() {
        let vault = Vault::new();
        assert!(vault.is_empty());
        assert_eq!(vault.schema_version(), SCHEMA_VERSION);
        assert!(vault.validate().is_ok());
    }

    fn stored_item(title: &str, created: &str, updated: &str) -> serde_json::Value {
        serde_json::json!({
            "id": Uuid::new_v4(),
            "type": "note",
            "title": title,
            "username": "",
            "password": "",
            "url": "",
            "notes": "",
            "category": "",
            "tags": [],
            "favorite": false,
            "createdAt": created,
            "updatedAt": updated,
        })
    }

    fn stored_vault(items: Vec<serde_json::Value>) -> Vault {
        serde_json::from_value(serde_json::json!({ "schemaVersion": 1, "items": items })).unwrap()
    }

    #[test]
    fn validate_accepts_well_formed_items() {
        let vault = stored_vault(vec![stored_item(
            "Wifi",
            "2024-01-01T00:00:00Z",
            "2024-02-01T00:00:00Z",
        )]);
        assert!(vault.validate().is_ok());
    }

    #[test]
    fn validate_rejects_blank_title() {
        let vault = stored_vault(vec![stored_item(
            " \t ",
            "2024-01-01T00:00:00Z",
            "2024-01-01T00:00:00Z",
        )]);
        assert!(matches!(vault.validate(), Err(VaultError::VaultCorrupted)));
    }

    #[test]
    fn validate_rejects_update_before_creation() {
        let vault = stored_vault(vec![stored_item(
            "Wifi",
            "2024-02-01T00:00:00Z",
            "2024-01-01T00:00:00Z",
        )]);
        assert!(matches!(vault.validate(), Err(VaultError::VaultCorrupted)));
    }

    #[test]
    fn insert_assigns_distinct_ids_in_order() {
        let mut vault = Vault::new();
        let a = vault.insert(draft(ItemKind::Login, "A"), Utc::now()).unwrap();
        let b = vault.insert(draft(ItemKind::Note, "B"), Utc::now()).unwrap();
        assert_ne!(a, b);
        assert_eq!(vault.items()[0].id(), a);
        assert_eq!(vault.items()[1].id(), b);
    }

    #[test]
    fn remove_unknown_id_fails() {
        let mut vault = Vault::new();
        let id = Uuid::new_v4();
        assert!(matches!(vault.remove(id), Err(VaultError::ItemNotFound(x)) if x == id));
    }

    #[test]
    fn filter_combines_criteria() {
        let mut vault = Vault::new();
        let gh = vault.insert(draft(ItemKind::Login, "GitHub"), Utc::now()).unwrap();
        vault.insert(draft(ItemKind::Login, "GitLab"), Utc::now()).unwrap();
        vault.insert(draft(ItemKind::Card, "Visa"), Utc::now()).unwrap();
        vault.toggle_favorite(gh, Utc::now()).unwrap();

        let logins = vault.filter(&ItemFilter {
            kind: Some(ItemKind::Login),
            ..ItemFilter::default()
        });
        assert_eq!(logins.len(), 2);

        let favorites = vault.filter(&ItemFilter {
            favorites_only: true,
            ..ItemFilter::default()
        });
        assert_eq!(favorites.len(), 1);
        assert_eq!(favorites[0].id(), gh);

        let git = vault.filter(&ItemFilter {
            query: Some("git".into()),
            kind: Some(ItemKind::Login),
            favorites_only: false,
        });
        assert_eq!(git.len(), 2);
    }

    #[test]
    fn duplicate_ids_fail_validation() {
        let mut vault = Vault::new();
        vault.insert(draft(ItemKind::Login, "A"), Utc::now()).unwrap();
        let copy = vault.items[0].clone();
        vault.items.push(copy);
        assert!(matches!(vault.validate(), Err(VaultError::VaultCorrupted)));
    }

    #[test]
    fn future_schema_is_rejected() {
        let json = r#"{"schemaVersion": 99, "items": []}"#;
        let vault: Vault = serde_json::from_str(json).unwrap();
        assert!(matches!(
            vault.validate(),
            Err(VaultError::UnsupportedSchema(99))
        ));
    }

    #[test]
    fn prefix_lookup() {
        let mut vault = Vault::new();
        let id = vault.insert(draft(ItemKind::Login, "A"), Utc::now()).unwrap();
        let full = id.to_string();

        assert_eq!(vault.find_by_prefix(&full).unwrap().id(), id);
        assert_eq!(vault.find_by_prefix(&full[..8]).unwrap().id(), id);
        assert!(vault.find_by_prefix("").is_err());
        assert!(vault.find_by_prefix("zzzz").is_err());
    }
}
