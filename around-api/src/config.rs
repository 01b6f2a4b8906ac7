use crate::lexicon::{LexiconLoadError, read_lexicon_file};
use around_common::spam::SpamLexicon;
use around_db::client::DEFAULT_MAX_HITS;
use around_db::record::POST_INDEX;
use serde::Deserialize;
use std::{
    net::{IpAddr, SocketAddr},
    path::PathBuf,
};

pub const DEFAULT_STORE_URL: &str = "http://localhost:9200";

/// Process configuration, read from the environment.
#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize)]
pub struct Env {
    pub server_address: IpAddr,
    pub server_port: u16,
    #[serde(default = "default_store_url")]
    pub store_url: String,
    #[serde(default = "default_store_index")]
    pub store_index: String,
    #[serde(default = "default_search_max_hits")]
    pub search_max_hits: usize,
    /// Comma separated banned words.
    pub spam_lexicon: Option<String>,
    /// File with one banned word per line. Takes precedence over `spam_lexicon`.
    pub spam_lexicon_path: Option<PathBuf>,
}

fn default_store_url() -> String {
    DEFAULT_STORE_URL.to_owned()
}

fn default_store_index() -> String {
    POST_INDEX.to_owned()
}

fn default_search_max_hits() -> usize {
    DEFAULT_MAX_HITS
}

impl Env {
    #[must_use]
    pub fn socket_address(&self) -> SocketAddr {
        SocketAddr::new(self.server_address, self.server_port)
    }

    pub fn load_lexicon(&self) -> Result<SpamLexicon, LexiconLoadError> {
        if let Some(path) = &self.spam_lexicon_path {
            return read_lexicon_file(path);
        }

        Ok(self
            .spam_lexicon
            .as_deref()
            .map_or_else(SpamLexicon::builtin, SpamLexicon::from_list))
    }
}
