use crate::config::Config;
use crate::fetcher::{FetchError, HttpStatusFetcher, StatusFetcher};
use crate::types::{CheckResult, Outcome, Summary};
use futures::future::join_all;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::{Stream, StreamExt};
use tracing::{debug, warn};

pub struct VersionChecker {
    config: Config,
    fetcher: Arc<dyn StatusFetcher>,
}

impl VersionChecker {
    pub fn new(config: Config) -> Result<Self, FetchError> {
        let fetcher = HttpStatusFetcher::new(&config)?;
        Ok(Self::with_fetcher(config, Arc::new(fetcher)))
    }

    pub fn with_fetcher(config: Config, fetcher: Arc<dyn StatusFetcher>) -> Self {
        Self { config, fetcher }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Checks every configured instance once and tallies the outcomes.
    pub async fn check_all(&self) -> Summary {
        let results = dispatch(&self.config, Arc::clone(&self.fetcher));
        aggregate(ReceiverStream::new(results)).await
    }
}

pub async fn compare(fetcher: &dyn StatusFetcher, instance: String, expected: &str) -> CheckResult {
    let outcome = match fetcher.fetch(&instance).await {
        Err(e) => Outcome::FetchFailed {
            reason: e.to_string(),
        },
        Ok(actual) if actual != expected => Outcome::Mismatched {
            expected: expected.to_string(),
            actual,
        },
        Ok(version) => Outcome::Matched { version },
    };

    CheckResult { instance, outcome }
}

/// Starts one comparison per instance and returns the receiving end of the
/// result channel. The channel closes once every comparison has reported.
pub fn dispatch(config: &Config, fetcher: Arc<dyn StatusFetcher>) -> mpsc::Receiver<CheckResult> {
    // Capacity covers every instance so no comparison waits on the reader.
    let (tx, rx) = mpsc::channel(config.instances.len().max(1));

    let comparisons: Vec<(String, JoinHandle<()>)> = config
        .instances
        .iter()
        .map(|instance| {
            let fetcher = Arc::clone(&fetcher);
            let tx = tx.clone();
            let expected = config.expected_version.clone();
            let name = instance.clone();

            let handle = tokio::spawn(async move {
                let result = compare(fetcher.as_ref(), name, &expected).await;
                if tx.send(result).await.is_err() {
                    debug!("result receiver dropped before all results were sent");
                }
            });
            (instance.clone(), handle)
        })
        .collect();

    tokio::spawn(async move {
        let (instances, handles): (Vec<String>, Vec<JoinHandle<()>>) =
            comparisons.into_iter().unzip();

        let joined = join_all(handles).await;
        for (instance, result) in instances.into_iter().zip(joined) {
            if let Err(e) = result {
                warn!(%instance, error = %e, "comparison task failed");
                let failed = CheckResult {
                    instance,
                    outcome: Outcome::FetchFailed {
                        reason: format!("task failed: {}", e),
                    },
                };
                let _ = tx.send(failed).await;
            }
        }
        // Last sender goes out of scope here, closing the stream.
    });

    rx
}

pub async fn aggregate<S>(mut results: S) -> Summary
where
    S: Stream<Item = CheckResult> + Unpin,
{
    let mut summary = Summary::default();
    while let Some(result) = results.next().await {
        debug!(instance = %result.instance, "{}", result);
        summary.record(&result.outcome);
    }
    summary
}
