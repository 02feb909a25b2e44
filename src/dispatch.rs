use crate::error::PlatformError;
use crate::resolver::{FileTarget, TargetResolver};

/// Whether an open call waits for the shell to finish dispatching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    /// Block until the viewer launch has been dispatched. Used when the
    /// process exits right after opening.
    Synchronous,
    /// Fire and forget. Used by the resident server so its event loop never
    /// waits on the shell.
    Asynchronous,
}

impl OpenMode {
    pub fn is_synchronous(self) -> bool {
        matches!(self, OpenMode::Synchronous)
    }
}

/// The platform's "open this file with that handler" primitive.
pub trait Opener {
    fn open(&self, path: &str, target: &FileTarget, mode: OpenMode) -> Result<(), PlatformError>;
}

/// First failed item of a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchFailure {
    pub path: String,
    pub error: PlatformError,
}

/// Outcome of opening every file of one batch.
///
/// Only the first failure is kept. Later failures are counted but their
/// errors are discarded.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BatchResult {
    total: usize,
    attempted: usize,
    failed: usize,
    first_failure: Option<BatchFailure>,
}

impl BatchResult {
    pub fn total(&self) -> usize {
        self.total
    }

    pub fn attempted(&self) -> usize {
        self.attempted
    }

    pub fn failed(&self) -> usize {
        self.failed
    }

    /// `true` once every path of the batch has been tried.
    pub fn completed(&self) -> bool {
        self.attempted == self.total
    }

    pub fn is_success(&self) -> bool {
        self.first_failure.is_none()
    }

    pub fn first_failure(&self) -> Option<&BatchFailure> {
        self.first_failure.as_ref()
    }

    /// Process exit status for this batch: the first failure's code, or 0.
    pub fn exit_code(&self) -> i32 {
        self.first_failure.as_ref().map_or(0, |f| f.error.code)
    }

    fn record(&mut self, path: &str, outcome: Result<(), PlatformError>) {
        self.attempted += 1;
        if let Err(error) = outcome {
            self.failed += 1;
            if self.first_failure.is_none() {
                self.first_failure = Some(BatchFailure {
                    path: path.to_string(),
                    error,
                });
            }
        }
    }
}

/// Resolves a viewer per file and hands it to the open primitive.
pub struct Dispatcher {
    resolver: TargetResolver,
    opener: Box<dyn Opener>,
}

impl Dispatcher {
    pub fn new(resolver: TargetResolver, opener: Box<dyn Opener>) -> Self {
        Self { resolver, opener }
    }

    pub fn open_one(&self, path: &str, mode: OpenMode) -> Result<(), PlatformError> {
        let target = self.resolver.resolve(path);
        tracing::debug!(
            path,
            verb = %target.verb,
            handler = %target.handler,
            synchronous = mode.is_synchronous(),
            "opening file"
        );
        self.opener.open(path, &target, mode).inspect_err(|e| {
            tracing::warn!(path, error = %e, "failed to open file");
        })
    }

    /// Open every path in order. A failure never stops the remaining paths.
    pub fn open_batch<S: AsRef<str>>(&self, paths: &[S], mode: OpenMode) -> BatchResult {
        let mut result = BatchResult {
            total: paths.len(),
            ..BatchResult::default()
        };
        for path in paths {
            let path = path.as_ref();
            result.record(path, self.open_one(path, mode));
        }
        if result.failed > 0 {
            tracing::info!(
                total = result.total,
                failed = result.failed,
                "batch finished with failures"
            );
        }
        result
    }
}
