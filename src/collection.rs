//! Optimistic Collection Store
//!
//! An in-memory, ordered collection of records (users, products, ...) seeded
//! from the dashboard API and mutated locally without any server round-trip.
//!
//! - **seed**: wholesale replacement, lenient about payload shape
//! - **add**: prepend a record built from a draft plus a generated id
//! - **filter**: lazy, read-only projection by search term and discriminator
//!
//! Local mutations are never sent anywhere and are lost with the store.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

/// Length of generated record ids
const GENERATED_ID_LEN: usize = 12;

/// A record that can live in a [`CollectionStore`]
pub trait Record: Clone + DeserializeOwned {
    /// Name of the array field in an object-shaped payload (`{ "users": [...] }`)
    const COLLECTION: &'static str;

    /// Caller-supplied fields for a locally added record
    type Draft;

    fn id(&self) -> &str;

    /// Fields matched case-insensitively by the search term
    fn search_fields(&self) -> Vec<&str>;

    /// Field matched exactly by the category/status filter
    fn discriminator(&self) -> &str;

    /// Build a record from a draft, filling collection defaults
    fn from_draft(draft: Self::Draft, id: String, now: DateTime<Utc>) -> Self;
}

/// Category/status selector
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Discriminator {
    /// No filtering
    #[default]
    All,
    /// Exact match against the record's discriminator field
    Only(String),
}

impl From<String> for Discriminator {
    fn from(value: String) -> Self {
        if value == "all" {
            Discriminator::All
        } else {
            Discriminator::Only(value)
        }
    }
}

impl From<&str> for Discriminator {
    fn from(value: &str) -> Self {
        Discriminator::from(value.to_string())
    }
}

impl From<Discriminator> for String {
    fn from(value: Discriminator) -> Self {
        match value {
            Discriminator::All => "all".to_string(),
            Discriminator::Only(v) => v,
        }
    }
}

/// Search term plus category/status filter
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCriteria {
    #[serde(default)]
    pub search_term: String,
    #[serde(default)]
    pub category_or_status: Discriminator,
}

impl FilterCriteria {
    /// Criteria that match every record
    pub fn all() -> Self {
        Self::default()
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search_term = term.into();
        self
    }

    pub fn only(mut self, value: impl Into<Discriminator>) -> Self {
        self.category_or_status = value.into();
        self
    }

    fn matcher(&self) -> Matcher<'_> {
        Matcher {
            needle: self.search_term.to_lowercase(),
            discriminator: &self.category_or_status,
        }
    }
}

/// Criteria with the search term lowercased once per `filter` call
struct Matcher<'a> {
    needle: String,
    discriminator: &'a Discriminator,
}

impl Matcher<'_> {
    fn matches<R: Record>(&self, record: &R) -> bool {
        let search_ok = self.needle.is_empty()
            || record
                .search_fields()
                .iter()
                .any(|field| field.to_lowercase().contains(&self.needle));

        let discriminator_ok = match self.discriminator {
            Discriminator::All => true,
            Discriminator::Only(value) => record.discriminator() == value,
        };

        search_ok && discriminator_ok
    }
}

/// Ordered, client-only collection of records
#[derive(Debug, Clone)]
pub struct CollectionStore<R> {
    items: Vec<R>,
}

impl<R: Record> CollectionStore<R> {
    /// Create an empty store
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Replace the whole content.
    ///
    /// Later duplicates of an id already seen are dropped.
    pub fn seed(&mut self, items: Vec<R>) {
        let mut seen = HashSet::with_capacity(items.len());
        let before = items.len();
        self.items = items
            .into_iter()
            .filter(|item| seen.insert(item.id().to_string()))
            .collect();

        if self.items.len() != before {
            tracing::warn!(
                collection = R::COLLECTION,
                dropped = before - self.items.len(),
                "Dropped records with duplicate ids"
            );
        }
        tracing::debug!(collection = R::COLLECTION, count = self.items.len(), "Collection seeded");
    }

    /// Seed from a raw API payload, falling back to empty on any unexpected shape
    pub fn seed_payload(&mut self, payload: &serde_json::Value) {
        self.seed(extract_records(payload, R::COLLECTION));
    }

    /// Seed with nothing, as after a failed fetch
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Prepend a locally created record and return it.
    ///
    /// The store performs no validation on the draft.
    pub fn add(&mut self, draft: R::Draft) -> R {
        let id = self.generate_id();
        let record = R::from_draft(draft, id, Utc::now());
        self.items.insert(0, record.clone());
        tracing::debug!(collection = R::COLLECTION, id = record.id(), "Record added locally");
        record
    }

    /// Remove a record locally
    pub fn remove(&mut self, id: &str) -> Option<R> {
        let index = self.items.iter().position(|item| item.id() == id)?;
        Some(self.items.remove(index))
    }

    pub fn get(&self, id: &str) -> Option<&R> {
        self.items.iter().find(|item| item.id() == id)
    }

    /// All records in display order
    pub fn items(&self) -> &[R] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Records matching `criteria`, in store order.
    ///
    /// Linear scan over the borrowed items; the store is never modified.
    pub fn filter<'a>(&'a self, criteria: &'a FilterCriteria) -> impl Iterator<Item = &'a R> + 'a {
        let matcher = criteria.matcher();
        self.items.iter().filter(move |item| matcher.matches(*item))
    }

    pub fn count_matching(&self, criteria: &FilterCriteria) -> usize {
        self.filter(criteria).count()
    }

    fn generate_id(&self) -> String {
        loop {
            let mut id = Uuid::new_v4().simple().to_string();
            id.truncate(GENERATED_ID_LEN);
            if self.get(&id).is_none() {
                return id;
            }
        }
    }
}

impl<R: Record> Default for CollectionStore<R> {
    fn default() -> Self {
        Self::new()
    }
}

/// Pull a record sequence out of a payload.
///
/// Accepts a bare array or an object with an array under `field`. Any other
/// shape yields an empty sequence. Elements that do not decode are skipped.
pub fn extract_records<R: DeserializeOwned>(payload: &serde_json::Value, field: &str) -> Vec<R> {
    let elements = match payload {
        serde_json::Value::Array(elements) => elements,
        serde_json::Value::Object(map) => match map.get(field) {
            Some(serde_json::Value::Array(elements)) => elements,
            _ => {
                tracing::warn!(field, "Payload has no record array, using empty list");
                return Vec::new();
            }
        },
        _ => {
            tracing::warn!(field, "Unexpected payload shape, using empty list");
            return Vec::new();
        }
    };

    elements
        .iter()
        .enumerate()
        .filter_map(|(index, element)| match R::deserialize(element) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!(field, index, error = %e, "Skipping malformed record");
                None
            }
        })
        .collect()
}

/// Deserialize an id given as either a JSON string or a number
pub fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Int(i64),
        Float(f64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(s) => s,
        RawId::Int(n) => n.to_string(),
        RawId::Float(n) => n.to_string(),
    })
}
