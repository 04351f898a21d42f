//! Checklist model
//!
//! A checklist belongs to exactly one user and holds an ordered list of item
//! references. Two items are the same entry when both `itemId` and `itemType`
//! match; any other fields the client sent are stored as given.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Reference to a place (or anything else) saved in a checklist
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChecklistItem {
    #[serde(rename = "itemId")]
    pub item_id: String,
    #[serde(rename = "itemType")]
    pub item_type: String,
    /// Descriptive fields such as `name` or `image`
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ChecklistItem {
    pub fn new(item_id: impl Into<String>, item_type: impl Into<String>) -> Self {
        Self {
            item_id: item_id.into(),
            item_type: item_type.into(),
            extra: Map::new(),
        }
    }

    /// Build an item from a raw JSON payload.
    ///
    /// `itemId` and `itemType` must be non-empty strings.
    pub fn from_json(value: Value) -> Result<Self, &'static str> {
        let Value::Object(mut fields) = value else {
            return Err("Item must be a JSON object");
        };

        let item_id = take_key(&mut fields, "itemId").ok_or("itemId is required")?;
        let item_type = take_key(&mut fields, "itemType").ok_or("itemType is required")?;

        Ok(Self {
            item_id,
            item_type,
            extra: fields,
        })
    }

    /// Whether this item is the entry identified by `(item_id, item_type)`
    pub fn matches(&self, item_id: &str, item_type: &str) -> bool {
        self.item_id == item_id && self.item_type == item_type
    }
}

fn take_key(fields: &mut Map<String, Value>, key: &str) -> Option<String> {
    match fields.remove(key) {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s),
        _ => None,
    }
}

/// Checklist entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Checklist {
    pub id: String,
    /// Owner. Opaque reference, not checked against the users table.
    pub user_id: String,
    pub items: Vec<ChecklistItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Checklist {
    /// Create an empty checklist for a user
    pub fn new(user_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            items: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn contains(&self, item_id: &str, item_type: &str) -> bool {
        self.items.iter().any(|item| item.matches(item_id, item_type))
    }

    /// Append the item unless an entry with the same keys exists.
    ///
    /// Returns true if the item was appended. `updated_at` is refreshed either way.
    pub fn add_item(&mut self, item: ChecklistItem) -> bool {
        let added = !self.contains(&item.item_id, &item.item_type);
        if added {
            self.items.push(item);
        }
        self.updated_at = Utc::now();
        added
    }

    /// Drop every entry matching both keys and return how many were removed.
    pub fn remove_item(&mut self, item_id: &str, item_type: &str) -> usize {
        let before = self.items.len();
        self.items.retain(|item| !item.matches(item_id, item_type));
        self.updated_at = Utc::now();
        before - self.items.len()
    }
}

/// Checklist as returned by `GET /api/checklists/{user_id}`.
///
/// Users without a stored checklist get an empty one with null id and timestamps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChecklistView {
    pub id: Option<String>,
    pub user_id: String,
    pub items: Vec<ChecklistItem>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl ChecklistView {
    pub fn empty(user_id: impl Into<String>) -> Self {
        Self {
            id: None,
            user_id: user_id.into(),
            items: Vec::new(),
            created_at: None,
            updated_at: None,
        }
    }
}

impl From<Checklist> for ChecklistView {
    fn from(checklist: Checklist) -> Self {
        Self {
            id: Some(checklist.id),
            user_id: checklist.user_id,
            items: checklist.items,
            created_at: Some(checklist.created_at),
            updated_at: Some(checklist.updated_at),
        }
    }
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    fn item_strategy() -> impl Strategy<Value = ChecklistItem> {
        ("[a-c]", prop_oneof![Just("attraction"), Just("restaurant")])
            .prop_map(|(id, ty)| ChecklistItem::new(id, ty))
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(50))]

        /// No two entries ever share both keys, whatever order items arrive in
        #[test]
        fn items_stay_unique(items in prop::collection::vec(item_strategy(), 0..30)) {
            let mut checklist = Checklist::new("u1");
            for item in items.iter().cloned() {
                checklist.add_item(item);
            }

            for (i, a) in checklist.items.iter().enumerate() {
                for b in checklist.items.iter().skip(i + 1) {
                    prop_assert!(!(a.item_id == b.item_id && a.item_type == b.item_type));
                }
            }
            for item in &items {
                prop_assert!(checklist.contains(&item.item_id, &item.item_type));
            }
        }

        /// Removal only drops the matching entry and keeps the rest in order
        #[test]
        fn remove_keeps_other_items(
            items in prop::collection::vec(item_strategy(), 0..20),
            target in item_strategy(),
        ) {
            let mut checklist = Checklist::new("u1");
            for item in items {
                checklist.add_item(item);
            }
            let expected: Vec<ChecklistItem> = checklist
                .items
                .iter()
                .filter(|i| !i.matches(&target.item_id, &target.item_type))
                .cloned()
                .collect();

            checklist.remove_item(&target.item_id, &target.item_type);

            prop_assert_eq!(checklist.items, expected);
        }
    }
}
