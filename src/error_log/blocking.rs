//! Blocking twins of the async operations, for hosts without a runtime.
//!
//! Each call drives its future on a fresh current-thread runtime. Called
//! from a runtime worker thread, the call first moves out of the worker with
//! `block_in_place`, so it must not be made from a current-thread runtime's
//! own task. `spawn_blocking` closures and plain threads are fine.

use super::ErrorLog;
use crate::domain::{ErrorLogEntry, ErrorLogError, ErrorRecord};
use std::future::Future;
use tokio::runtime::{Builder, Handle};
use tokio::task::block_in_place;

impl ErrorLog {
    /// Blocking form of [`ErrorLog::log`].
    pub fn log_blocking(&self, error: &ErrorRecord) -> Result<String, ErrorLogError> {
        block_on(self.log(error))
    }

    /// Blocking form of [`ErrorLog::get_error`].
    pub fn get_error_blocking(&self, id: &str) -> Result<ErrorLogEntry, ErrorLogError> {
        block_on(self.get_error(id))
    }

    /// Blocking form of [`ErrorLog::get_errors`].
    pub fn get_errors_blocking(
        &self,
        page_index: usize,
        page_size: usize,
        entries: &mut Vec<ErrorLogEntry>,
    ) -> Result<usize, ErrorLogError> {
        block_on(self.get_errors(page_index, page_size, entries))
    }
}

fn block_on<T>(
    pending: impl Future<Output = Result<T, ErrorLogError>>,
) -> Result<T, ErrorLogError> {
    match Handle::try_current() {
        Ok(_) => block_in_place(|| run_to_completion(pending)),
        Err(_) => run_to_completion(pending),
    }
}

fn run_to_completion<T>(
    pending: impl Future<Output = Result<T, ErrorLogError>>,
) -> Result<T, ErrorLogError> {
    Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(ErrorLogError::Runtime)?
        .block_on(pending)
}
