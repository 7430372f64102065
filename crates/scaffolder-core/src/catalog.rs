//! Boilerplate registry, grouping and selection

use crate::error::ScaffoldError;
use crate::prompt::{Choice, Prompter};
use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

/// Group name for boilerplates that declare no category
pub const FALLBACK_GROUP: &str = "other";

/// Registry a descriptor was loaded from
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RegistryRef {
    pub name: String,
    pub version: String,
}

/// One selectable boilerplate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoilerplateDescriptor {
    /// Registry key, also accepted by `--type`
    pub key: String,
    pub name: String,
    pub description: String,
    pub category: Option<String>,
    /// Package id handed to the fetcher
    pub package: String,
    pub source: Arc<RegistryRef>,
}

/// Registry document as written in YAML
#[derive(Debug, Deserialize)]
struct RegistryDocument {
    #[serde(default)]
    name: String,

    #[serde(default)]
    version: String,

    #[serde(default, deserialize_with = "unique_entries")]
    boilerplate: IndexMap<String, RegistryEntry>,
}

/// Registry entries in document order; a repeated key is an error instead of
/// replacing the earlier entry
fn unique_entries<'de, D>(
    deserializer: D,
) -> std::result::Result<IndexMap<String, RegistryEntry>, D::Error>
where
    D: Deserializer<'de>,
{
    struct EntriesVisitor;

    impl<'de> Visitor<'de> for EntriesVisitor {
        type Value = IndexMap<String, RegistryEntry>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a mapping of boilerplate keys to entries")
        }

        fn visit_unit<E>(self) -> std::result::Result<Self::Value, E> {
            Ok(IndexMap::new())
        }

        fn visit_map<A>(self, mut map: A) -> std::result::Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut entries = IndexMap::new();
            while let Some((key, entry)) = map.next_entry::<String, RegistryEntry>()? {
                if entries.contains_key(&key) {
                    return Err(serde::de::Error::custom(format!(
                        "duplicate boilerplate key '{}'",
                        key
                    )));
                }
                entries.insert(key, entry);
            }
            Ok(entries)
        }
    }

    deserializer.deserialize_map(EntriesVisitor)
}

#[derive(Debug, Deserialize)]
struct RegistryEntry {
    package: String,

    #[serde(default)]
    description: String,

    #[serde(default)]
    category: Option<String>,

    /// Display name (defaults to the key)
    #[serde(default)]
    name: Option<String>,
}

/// Ordered collection of boilerplates keyed by registry key
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: IndexMap<String, BoilerplateDescriptor>,
}

impl Catalog {
    /// Parse a registry document
    ///
    /// ```yaml
    /// name: lweb-init
    /// version: 1.0.0
    /// boilerplate:
    ///   egg-backend:
    ///     package: boilerplates/egg-backend
    ///     description: egg backend service
    ///     category: backend
    /// ```
    pub fn from_yaml(content: &str) -> Result<Self> {
        let document: RegistryDocument = serde_yaml::from_str(content)
            .map_err(|e| ScaffoldError::config(format!("malformed boilerplate registry: {}", e)))?;

        let source = Arc::new(RegistryRef {
            name: document.name,
            version: document.version,
        });

        let entries = document
            .boilerplate
            .into_iter()
            .map(|(key, entry)| {
                let descriptor = BoilerplateDescriptor {
                    name: entry.name.unwrap_or_else(|| key.clone()),
                    key: key.clone(),
                    description: entry.description,
                    category: entry.category,
                    package: entry.package,
                    source: Arc::clone(&source),
                };
                (key, descriptor)
            })
            .collect();

        Ok(Self { entries })
    }

    /// Read a registry document from disk
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read registry {}", path.display()))?;
        Self::from_yaml(&content)
    }

    /// Build a catalog from descriptors, rejecting duplicate keys
    pub fn from_descriptors(
        descriptors: impl IntoIterator<Item = BoilerplateDescriptor>,
    ) -> Result<Self> {
        let mut entries = IndexMap::new();
        for descriptor in descriptors {
            if entries.contains_key(&descriptor.key) {
                return Err(ScaffoldError::config(format!(
                    "duplicate boilerplate key '{}'",
                    descriptor.key
                ))
                .into());
            }
            entries.insert(descriptor.key.clone(), descriptor);
        }
        Ok(Self { entries })
    }

    pub fn get(&self, key: &str) -> Option<&BoilerplateDescriptor> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Entries grouped by category, uncategorized ones under [`FALLBACK_GROUP`]
    pub fn groups(&self) -> IndexMap<String, IndexMap<String, &BoilerplateDescriptor>> {
        group_by(&self.entries, |d| d.category.as_deref(), FALLBACK_GROUP)
    }
}

/// Partition `entries` by the value `category_of` reports for each entry.
///
/// Entries without a category are collected under `fallback`. Group and
/// entry order follow first appearance in `entries`.
pub fn group_by<'a, K, V, F>(
    entries: &'a IndexMap<K, V>,
    category_of: F,
    fallback: &str,
) -> IndexMap<String, IndexMap<K, &'a V>>
where
    K: Clone + Hash + Eq,
    F: Fn(&V) -> Option<&str>,
{
    let mut groups: IndexMap<String, IndexMap<K, &'a V>> = IndexMap::new();
    for (key, value) in entries {
        let group = category_of(value).unwrap_or(fallback);
        groups
            .entry(group.to_string())
            .or_default()
            .insert(key.clone(), value);
    }
    groups
}

/// Choose a boilerplate, either the pre-selected `--type` or by asking
pub fn select_boilerplate<'a>(
    catalog: &'a Catalog,
    preselected: Option<&str>,
    prompter: &dyn Prompter,
) -> Result<&'a BoilerplateDescriptor> {
    if let Some(key) = preselected {
        return catalog.get(key).ok_or_else(|| {
            let available: Vec<&str> = catalog.keys().collect();
            ScaffoldError::config(format!(
                "boilerplate type '{}' not found. Available types: {}",
                key,
                available.join(", ")
            ))
            .into()
        });
    }

    if catalog.is_empty() {
        return Err(ScaffoldError::config("no boilerplates registered").into());
    }

    let mut groups = catalog.groups();
    let group = if groups.len() > 1 {
        let names: Vec<Choice> = groups.keys().map(Choice::item).collect();
        let idx = prompter.select("Please select a boilerplate category", &names)?;
        groups
            .swap_remove_index(idx)
            .map(|(_, group)| group)
            .ok_or_else(|| ScaffoldError::config("selected category does not exist"))?
    } else {
        groups
            .pop()
            .map(|(_, group)| group)
            .ok_or_else(|| ScaffoldError::config("no boilerplate categories"))?
    };

    if group.is_empty() {
        return Err(ScaffoldError::config("selected category has no boilerplates").into());
    }

    let mut choices = vec![Choice::Separator];
    choices.extend(
        group
            .iter()
            .map(|(key, item)| Choice::item(format!("{} - {}", key, item.description))),
    );

    let idx = prompter.select("Please select a boilerplate type", &choices)?;
    let position = choices[..idx.min(choices.len())]
        .iter()
        .filter(|c| c.is_selectable())
        .count();

    group
        .get_index(position)
        .map(|(_, descriptor)| *descriptor)
        .ok_or_else(|| ScaffoldError::config("selected boilerplate does not exist").into())
}
