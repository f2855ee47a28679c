use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, OnceLock};

use tracing::{debug_span, info, warn};

use furi_core::tokenizer::{panic_message, Tokenizer, TokenizerError};

type Loader = Box<dyn Fn() -> Result<Arc<dyn Tokenizer>, TokenizerError> + Send + Sync>;

/// A tokenizer that is loaded on first use.
///
/// The loader runs at most once per lifecycle: concurrent first callers block
/// on the same load, and a failed or panicking load is remembered (as
/// [`TokenizerError::Unavailable`]) until [`reset`](Self::reset).
pub struct TokenizerHandle {
    loader: Loader,
    cell: OnceLock<Result<Arc<dyn Tokenizer>, TokenizerError>>,
}

impl TokenizerHandle {
    pub fn new<F>(loader: F) -> Self
    where
        F: Fn() -> Result<Arc<dyn Tokenizer>, TokenizerError> + Send + Sync + 'static,
    {
        Self {
            loader: Box::new(loader),
            cell: OnceLock::new(),
        }
    }

    /// A handle that is ready from the start.
    pub fn ready(tokenizer: Arc<dyn Tokenizer>) -> Self {
        let handle = Self::new({
            let tokenizer = Arc::clone(&tokenizer);
            move || Ok(Arc::clone(&tokenizer))
        });
        let _ = handle.cell.set(Ok(tokenizer));
        handle
    }

    /// A handle whose loads always fail.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        let reason = reason.into();
        Self::new(move || Err(TokenizerError::Unavailable(reason.clone())))
    }

    pub fn get(&self) -> Result<Arc<dyn Tokenizer>, TokenizerError> {
        self.cell
            .get_or_init(|| {
                let _span = debug_span!("tokenizer_load").entered();
                let loaded = panic::catch_unwind(AssertUnwindSafe(|| (self.loader)()))
                    .unwrap_or_else(|payload| {
                        Err(TokenizerError::Unavailable(format!(
                            "loader panicked: {}",
                            panic_message(&*payload)
                        )))
                    });
                match loaded {
                    Ok(tokenizer) => {
                        info!("tokenizer ready");
                        Ok(tokenizer)
                    }
                    Err(e) => {
                        warn!(error = %e, "tokenizer failed to load");
                        Err(match e {
                            TokenizerError::Unavailable(msg) | TokenizerError::Failed(msg) => {
                                TokenizerError::Unavailable(msg)
                            }
                        })
                    }
                }
            })
            .clone()
    }

    /// True once a load has succeeded.
    pub fn is_ready(&self) -> bool {
        matches!(self.cell.get(), Some(Ok(_)))
    }

    /// True once a load has been attempted, successful or not.
    pub fn is_initialized(&self) -> bool {
        self.cell.get().is_some()
    }

    /// Forget the loaded tokenizer (or the memoized failure); the next
    /// [`get`](Self::get) runs the loader again.
    pub fn reset(&mut self) {
        self.cell.take();
    }
}

impl fmt::Debug for TokenizerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match self.cell.get() {
            None => "pending",
            Some(Ok(_)) => "ready",
            Some(Err(_)) => "unavailable",
        };
        f.debug_struct("TokenizerHandle")
            .field("state", &state)
            .finish()
    }
}
