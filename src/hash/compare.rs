// Compare module
// Digests up to two inputs and derives an equality verdict from both digest pairs

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::error::{DigestError, ErrorReport};
use super::hash::{Algorithm, DigestEngine, DigestPair, DigestResult};

/// Which of the two inputs a result belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InputSlot {
    First,
    Second,
}

impl InputSlot {
    pub fn number(&self) -> usize {
        match self {
            InputSlot::First => 1,
            InputSlot::Second => 2,
        }
    }
}

impl fmt::Display for InputSlot {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "File {}", self.number())
    }
}

/// Terminal state of one `evaluate` call
#[derive(Debug)]
pub enum ComparisonOutcome {
    /// Neither path was supplied
    NoInput,

    /// Exactly one path was supplied; no comparison ran
    SingleResult { slot: InputSlot, result: DigestResult },

    /// Both digests of both inputs agree
    Equal { first: DigestPair, second: DigestPair },

    /// At least one digest differs
    Different { first: DigestPair, second: DigestPair },

    /// Two paths were supplied and at least one could not be hashed
    PartialFailure { first: DigestResult, second: DigestResult },
}

impl ComparisonOutcome {
    /// Combine two independently computed results
    pub fn from_results(first: DigestResult, second: DigestResult) -> Self {
        match (first, second) {
            (Ok(first), Ok(second)) => {
                if first.matches(&second) {
                    ComparisonOutcome::Equal { first, second }
                } else {
                    ComparisonOutcome::Different { first, second }
                }
            }
            (first, second) => ComparisonOutcome::PartialFailure { first, second },
        }
    }

    pub fn is_equal(&self) -> bool {
        matches!(self, ComparisonOutcome::Equal { .. })
    }

    /// Slots whose digest computation failed
    pub fn failed_inputs(&self) -> Vec<(InputSlot, &DigestError)> {
        match self {
            ComparisonOutcome::SingleResult { slot, result: Err(e) } => vec![(*slot, e)],
            ComparisonOutcome::PartialFailure { first, second } => {
                let mut failed = Vec::new();
                if let Err(e) = first {
                    failed.push((InputSlot::First, e));
                }
                if let Err(e) = second {
                    failed.push((InputSlot::Second, e));
                }
                failed
            }
            _ => Vec::new(),
        }
    }

    /// Every result carried by the outcome, in slot order
    pub fn results(&self) -> Vec<(InputSlot, Result<&DigestPair, &DigestError>)> {
        match self {
            ComparisonOutcome::NoInput => Vec::new(),
            ComparisonOutcome::SingleResult { slot, result } => vec![(*slot, result.as_ref())],
            ComparisonOutcome::Equal { first, second }
            | ComparisonOutcome::Different { first, second } => vec![
                (InputSlot::First, Ok(first)),
                (InputSlot::Second, Ok(second)),
            ],
            ComparisonOutcome::PartialFailure { first, second } => vec![
                (InputSlot::First, first.as_ref()),
                (InputSlot::Second, second.as_ref()),
            ],
        }
    }

    /// One-line verdict for display
    pub fn verdict(&self) -> &'static str {
        match self {
            ComparisonOutcome::NoInput => "No files selected",
            ComparisonOutcome::SingleResult { .. } => "Comparison requires two files",
            ComparisonOutcome::Equal { .. } => "The Files Are The Same",
            ComparisonOutcome::Different { .. } => "The Files Are Different",
            ComparisonOutcome::PartialFailure { .. } => "Comparison failed",
        }
    }

    fn status(&self) -> &'static str {
        match self {
            ComparisonOutcome::NoInput => "no_input",
            ComparisonOutcome::SingleResult { .. } => "single_result",
            ComparisonOutcome::Equal { .. } => "equal",
            ComparisonOutcome::Different { .. } => "different",
            ComparisonOutcome::PartialFailure { .. } => "partial_failure",
        }
    }

    /// Format the outcome as plain text, digests first and verdict last
    pub fn to_plain_text(&self) -> String {
        let mut output = self.digest_text();
        output.push_str(self.verdict());
        output.push('\n');
        output
    }

    /// Digest and error lines for every input, without the verdict
    pub fn digest_text(&self) -> String {
        let mut output = String::new();

        for (slot, result) in self.results() {
            match result {
                Ok(pair) => {
                    for algorithm in Algorithm::ALL {
                        output.push_str(&format!("{} ({}): {}\n", algorithm.label(), slot, pair.get(algorithm)));
                    }
                }
                Err(e) => {
                    output.push_str(&format!("Error ({}): {}\n", slot, e.reason()));
                }
            }
        }

        output
    }

    /// Format the outcome as a JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        #[derive(serde::Serialize)]
        struct JsonOutput {
            metadata: Metadata,
            status: &'static str,
            verdict: &'static str,
            inputs: Vec<InputJson>,
        }

        #[derive(serde::Serialize)]
        struct Metadata {
            timestamp: String,
        }

        #[derive(serde::Serialize)]
        struct InputJson {
            slot: InputSlot,
            #[serde(skip_serializing_if = "Option::is_none")]
            digests: Option<DigestPair>,
            #[serde(skip_serializing_if = "Option::is_none")]
            error: Option<ErrorReport>,
        }

        let output = JsonOutput {
            metadata: Metadata {
                timestamp: chrono::Utc::now().to_rfc3339(),
            },
            status: self.status(),
            verdict: self.verdict(),
            inputs: self.results().into_iter().map(|(slot, result)| match result {
                Ok(pair) => InputJson {
                    slot,
                    digests: Some(pair.clone()),
                    error: None,
                },
                Err(e) => InputJson {
                    slot,
                    digests: None,
                    error: Some(ErrorReport::from(e)),
                },
            }).collect(),
        };

        serde_json::to_string_pretty(&output)
    }
}

/// Format per-file results of `compute_each` as a JSON string
pub fn hash_results_to_json(results: &[(PathBuf, DigestResult)]) -> Result<String, serde_json::Error> {
    #[derive(serde::Serialize)]
    struct HashJson {
        path: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        digests: Option<DigestPair>,
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<ErrorReport>,
    }

    let output: Vec<HashJson> = results
        .iter()
        .map(|(path, result)| HashJson {
            path: path.display().to_string(),
            digests: result.as_ref().ok().cloned(),
            error: result.as_ref().err().map(ErrorReport::from),
        })
        .collect();

    serde_json::to_string_pretty(&output)
}

/// Orchestrates the digest engine over zero, one or two inputs
#[derive(Debug, Clone)]
pub struct ComparisonService {
    engine: DigestEngine,
    concurrent: bool,
}

impl ComparisonService {
    /// Create a new ComparisonService hashing both inputs concurrently
    pub fn new() -> Self {
        Self {
            engine: DigestEngine::new(),
            concurrent: true,
        }
    }

    /// Create a ComparisonService around a configured engine
    pub fn with_engine(engine: DigestEngine) -> Self {
        Self {
            engine,
            concurrent: true,
        }
    }

    /// Choose whether two inputs are hashed in parallel or one after the other
    pub fn with_concurrency(mut self, concurrent: bool) -> Self {
        self.concurrent = concurrent;
        self
    }

    pub fn engine(&self) -> &DigestEngine {
        &self.engine
    }

    /// Digest and compare up to two inputs
    ///
    /// # Returns
    /// `NoInput` with no paths, `SingleResult` with one, and `Equal`,
    /// `Different` or `PartialFailure` with two. A failure on one input
    /// never hides the other input's digests.
    pub fn evaluate(&self, path1: Option<&Path>, path2: Option<&Path>) -> ComparisonOutcome {
        let outcome = match (path1, path2) {
            (None, None) => ComparisonOutcome::NoInput,
            (Some(path), None) => ComparisonOutcome::SingleResult {
                slot: InputSlot::First,
                result: self.engine.compute_digests(path),
            },
            (None, Some(path)) => ComparisonOutcome::SingleResult {
                slot: InputSlot::Second,
                result: self.engine.compute_digests(path),
            },
            (Some(first), Some(second)) => {
                let (first, second) = self.compute_both(first, second);
                ComparisonOutcome::from_results(first, second)
            }
        };

        info!(status = outcome.status(), "{}", outcome.verdict());
        outcome
    }

    /// Run `evaluate` on the blocking pool and await the outcome
    ///
    /// # Errors
    /// Only if the blocking task itself could not complete (it panicked or
    /// the runtime shut down). Digest failures stay inside the outcome.
    pub async fn evaluate_async(
        &self,
        path1: Option<PathBuf>,
        path2: Option<PathBuf>,
    ) -> anyhow::Result<ComparisonOutcome> {
        let service = self.clone();
        let outcome = tokio::task::spawn_blocking(move || {
            service.evaluate(path1.as_deref(), path2.as_deref())
        })
        .await?;
        Ok(outcome)
    }

    /// Digest every path independently, in order
    ///
    /// # Errors
    /// `DigestError::InputMissing` when `paths` is empty. Per-file failures
    /// are reported in the returned list instead.
    pub fn compute_each(&self, paths: &[PathBuf]) -> Result<Vec<(PathBuf, DigestResult)>, DigestError> {
        if paths.is_empty() {
            return Err(DigestError::InputMissing);
        }

        Ok(paths
            .iter()
            .map(|path| (path.clone(), self.engine.compute_digests(path)))
            .collect())
    }

    fn compute_both(&self, first: &Path, second: &Path) -> (DigestResult, DigestResult) {
        if self.concurrent {
            debug!("hashing both inputs concurrently");
            rayon::join(
                || self.engine.compute_digests(first),
                || self.engine.compute_digests(second),
            )
        } else {
            (self.engine.compute_digests(first), self.engine.compute_digests(second))
        }
    }
}

impl Default for ComparisonService {
    fn default() -> Self {
        Self::new()
    }
}
