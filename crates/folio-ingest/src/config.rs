//! Ingestion configuration.
//!
//! The coordinator receives everything it needs at construction: the
//! operator (archive) channel, the authorized operator ids, the pinned
//! status message, and the immutable thread-to-category mapping. Nothing is
//! read from global state after startup.

use std::collections::{HashMap, HashSet};

use serde::Deserialize;

use folio_core::{CategoryMap, ChatId, Error, MessageId, Result};

/// Runtime configuration for the ingestion coordinator and stats reporter.
#[derive(Debug, Clone)]
pub struct IngestConfig {
    /// Operator-only channel receiving archival copies and removal audits.
    pub operator_chat: ChatId,
    /// Identities allowed to issue the remove command.
    pub operators: HashSet<i64>,
    /// Chat holding the pinned status message.
    pub status_chat: ChatId,
    /// The well-known pinned message the stats report is edited into.
    pub status_message: MessageId,
    /// Thread-to-category mapping.
    pub categories: CategoryMap,
}

/// On-disk shape of the configuration.
#[derive(Debug, Deserialize)]
struct ConfigFile {
    operator_chat: i64,
    operators: Vec<i64>,
    status_chat: i64,
    status_message: i64,
    categories: HashMap<i64, String>,
}

impl IngestConfig {
    /// Parse a JSON configuration document.
    pub fn from_json(raw: &str) -> Result<Self> {
        let file: ConfigFile =
            serde_json::from_str(raw).map_err(|e| Error::Config(e.to_string()))?;
        if file.categories.is_empty() {
            return Err(Error::Config(
                "category mapping must not be empty".to_string(),
            ));
        }
        Ok(Self {
            operator_chat: ChatId(file.operator_chat),
            operators: file.operators.into_iter().collect(),
            status_chat: ChatId(file.status_chat),
            status_message: MessageId(file.status_message),
            categories: file.categories.into_iter().collect(),
        })
    }

    pub fn is_operator(&self, user: i64) -> bool {
        self.operators.contains(&user)
    }
}
