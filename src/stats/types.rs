//! Stats document data model
//!
//! A stats document is the JSON object a bundler emits for one build. Only
//! `assets` is decoded; every other top-level key is either kept as raw JSON
//! or skipped, depending on [`ExtraKeys`].

use serde::de::{self, DeserializeSeed, Deserializer, IgnoredAny, MapAccess, Visitor};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;
use std::collections::BTreeMap;
use std::fmt;

/// Identifier of a chunk an artifact belongs to.
///
/// Bundlers emit either numeric or string ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChunkId {
    /// Numeric chunk id
    Number(u64),
    /// Named chunk id
    Name(String),
}

impl fmt::Display for ChunkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{}", n),
            Self::Name(s) => f.write_str(s),
        }
    }
}

/// One build output entry inside a stats document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    /// Emitted file name, possibly with a directory and a content hash
    pub name: String,
    /// Size in bytes
    #[serde(default)]
    pub size: u64,
    /// Names of the chunks this artifact belongs to
    #[serde(default)]
    pub chunk_names: Vec<String>,
    /// Ids of the chunks this artifact belongs to
    #[serde(default, rename = "chunks", alias = "chunkIds")]
    pub chunk_ids: Vec<ChunkId>,
}

impl Artifact {
    /// Create an artifact with no chunk associations
    pub fn new(name: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            size,
            chunk_names: Vec::new(),
            chunk_ids: Vec::new(),
        }
    }

    /// Attach chunk names
    pub fn with_chunk_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.chunk_names = names.into_iter().map(Into::into).collect();
        self
    }

    /// Attach chunk ids
    pub fn with_chunk_ids(mut self, ids: impl IntoIterator<Item = ChunkId>) -> Self {
        self.chunk_ids = ids.into_iter().collect();
        self
    }
}

/// What to do with top-level keys other than `assets`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExtraKeys {
    /// Keep them as raw, unparsed JSON
    #[default]
    Preserve,
    /// Discard them while parsing
    Skip,
}

/// Parsed stats document
#[derive(Debug, Clone, Default)]
pub struct StatsDocument {
    /// Build output entries
    pub assets: Vec<Artifact>,
    /// Other top-level keys, verbatim
    pub extra: BTreeMap<String, Box<RawValue>>,
}

impl StatsDocument {
    /// Document holding only the given assets
    pub fn from_assets(assets: Vec<Artifact>) -> Self {
        Self {
            assets,
            extra: BTreeMap::new(),
        }
    }
}

impl Serialize for StatsDocument {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.extra.len() + 1))?;
        map.serialize_entry("assets", &self.assets)?;
        for (key, value) in &self.extra {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for StatsDocument {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        ExtraKeys::Preserve.deserialize(deserializer)
    }
}

impl<'de> DeserializeSeed<'de> for ExtraKeys {
    type Value = StatsDocument;

    fn deserialize<D: Deserializer<'de>>(self, deserializer: D) -> Result<StatsDocument, D::Error> {
        deserializer.deserialize_map(StatsVisitor(self))
    }
}

struct StatsVisitor(ExtraKeys);

impl<'de> Visitor<'de> for StatsVisitor {
    type Value = StatsDocument;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a stats object")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<StatsDocument, A::Error> {
        let mut doc = StatsDocument::default();
        let mut seen_assets = false;

        while let Some(key) = map.next_key::<String>()? {
            if key == "assets" {
                if seen_assets {
                    return Err(de::Error::duplicate_field("assets"));
                }
                seen_assets = true;
                doc.assets = map.next_value::<Option<Vec<Artifact>>>()?.unwrap_or_default();
                continue;
            }

            match self.0 {
                ExtraKeys::Preserve => {
                    let raw: Box<RawValue> = map.next_value()?;
                    doc.extra.insert(key, raw);
                }
                ExtraKeys::Skip => {
                    map.next_value::<IgnoredAny>()?;
                }
            }
        }

        Ok(doc)
    }
}
