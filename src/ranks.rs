//! Global value→rank mapping.
//!
//! The rank index is built once from the union of every value observed across
//! all tables, then treated as read-only for the rest of the run. Histograms
//! bucket rank positions rather than raw values, which gives text and numeric
//! columns a common axis. The index can be persisted so repeated runs over
//! the same corpus skip the corpus-wide sort.

use std::collections::{BTreeSet, HashMap};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::data::Value;

const RANKS_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
pub struct RankIndex {
    version: u32,
    ranks: HashMap<Value, u32>,
}

impl RankIndex {
    /// Builds the index from the union of all observed values. Ranks are
    /// 1-based ordinals in the corpus-wide total order.
    pub fn build<'a, I>(values: I) -> Self
    where
        I: IntoIterator<Item = &'a Value>,
    {
        let ordered: BTreeSet<&Value> = values.into_iter().collect();
        let ranks = ordered
            .into_iter()
            .enumerate()
            .map(|(position, value)| (value.clone(), position as u32 + 1))
            .collect();
        Self {
            version: RANKS_VERSION,
            ranks,
        }
    }

    pub fn rank(&self, value: &Value) -> Option<u32> {
        self.ranks.get(value).copied()
    }

    pub fn len(&self) -> usize {
        self.ranks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranks.is_empty()
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let file =
            File::create(path).with_context(|| format!("Creating rank index file {path:?}"))?;
        let mut writer = BufWriter::new(file);
        let bytes = bincode::serde::encode_to_vec(self, bincode::config::standard())
            .context("Encoding rank index")?;
        writer.write_all(&bytes).context("Writing rank index file")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let bytes =
            std::fs::read(path).with_context(|| format!("Opening rank index file {path:?}"))?;
        let (index, _): (RankIndex, usize) =
            bincode::serde::decode_from_slice(&bytes, bincode::config::standard())
                .context("Reading rank index file")?;
        if index.version != RANKS_VERSION {
            return Err(anyhow!(
                "Unsupported rank index version {} (expected {RANKS_VERSION})",
                index.version
            ));
        }
        Ok(index)
    }
}
