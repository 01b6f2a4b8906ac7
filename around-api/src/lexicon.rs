//! Loading the spam lexicon from disk, and swapping it while the server runs.

use around_common::spam::{LexiconHandle, SpamLexicon};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
#[error("Error reading lexicon file {path:?}: {source}")]
pub struct LexiconLoadError {
    path: PathBuf,
    source: std::io::Error,
}

pub fn read_lexicon_file(path: &Path) -> Result<SpamLexicon, LexiconLoadError> {
    let contents = std::fs::read_to_string(path).map_err(|source| LexiconLoadError {
        path: path.to_owned(),
        source,
    })?;

    Ok(SpamLexicon::from_lines(&contents))
}

/// Re-reads `path` into `handle`. On failure the current lexicon stays in place.
pub async fn reload_lexicon(handle: &LexiconHandle, path: &Path) -> Result<u64, LexiconLoadError> {
    let contents = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| LexiconLoadError {
            path: path.to_owned(),
            source,
        })?;

    Ok(handle.replace(SpamLexicon::from_lines(&contents)))
}

#[cfg(unix)]
pub async fn reload_on_hangup(
    handle: std::sync::Arc<LexiconHandle>,
    path: PathBuf,
    shutdown: tokio_util::sync::CancellationToken,
) {
    use tokio::signal::unix::{SignalKind, signal};
    use tracing::{error, info};

    let mut hangup = match signal(SignalKind::hangup()) {
        Ok(hangup) => hangup,
        Err(err) => {
            error!(error = %err, "Could not listen for SIGHUP, lexicon reloading is disabled");
            return;
        }
    };

    loop {
        tokio::select! {
            () = shutdown.cancelled() => break,
            received = hangup.recv() => {
                if received.is_none() {
                    break;
                }

                match reload_lexicon(&handle, &path).await {
                    Ok(version) => {
                        let size = handle.snapshot().len();
                        info!(version, size, "Reloaded spam lexicon");
                    }
                    Err(err) => error!(error = %err, "Keeping previous spam lexicon"),
                }
            }
        }
    }
}
