use std::collections::HashMap;
use std::sync::Arc;

use tradehall_broker::BrokerClient;
use tradehall_types::OutputEncoding;
use tradehall_types::api::BrokerSummary;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub brokers: BrokerRegistry,
    /// HS256 secret for service tokens.
    pub service_secret: String,
}

/// A configured broker: its client plus the output encoding, if the scheme has one.
#[derive(Clone)]
pub struct BrokerEntry {
    pub client: BrokerClient,
    pub encoding: Option<OutputEncoding>,
}

impl BrokerEntry {
    pub fn summary(&self) -> BrokerSummary {
        let profile = self.client.profile();
        BrokerSummary {
            name: profile.name.clone(),
            scheme: self.client.signer().scheme(),
            encoding: self.encoding,
            base_url: profile.base_url.to_string(),
        }
    }
}

/// Brokers keyed by lowercase name.
#[derive(Clone, Default)]
pub struct BrokerRegistry {
    entries: HashMap<String, BrokerEntry>,
}

impl BrokerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a broker under its profile name. Returns false if the name was taken.
    pub fn register(&mut self, client: BrokerClient, encoding: Option<OutputEncoding>) -> bool {
        let key = client.profile().name.to_ascii_lowercase();
        if self.entries.contains_key(&key) {
            return false;
        }
        self.entries.insert(key, BrokerEntry { client, encoding });
        true
    }

    pub fn get(&self, name: &str) -> Option<&BrokerEntry> {
        self.entries.get(&name.to_ascii_lowercase())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Summaries sorted by name.
    pub fn summaries(&self) -> Vec<BrokerSummary> {
        let mut out: Vec<BrokerSummary> = self.entries.values().map(BrokerEntry::summary).collect();
        out.sort_by(|a, b| a.name.cmp(&b.name));
        out
    }
}
