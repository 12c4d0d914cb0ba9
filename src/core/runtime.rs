//! Driving async backends from synchronous callers.

use std::future::Future;

use tokio::runtime::{Builder, Handle, RuntimeFlavor};

use crate::error::SerializerError;

/// Run `future` to completion from synchronous code.
///
/// Inside a multi-thread tokio runtime the current worker is handed over to
/// the blocking pool while the future runs on that runtime. Outside any
/// runtime a private current-thread runtime is started for the call.
///
/// # Errors
///
/// `SerializerError::NestedRuntime` when called from a current-thread
/// runtime, which cannot be blocked without deadlocking, and
/// `SerializerError::Runtime` if the private runtime fails to start.
pub fn block_on<F: Future>(future: F) -> Result<F::Output, SerializerError> {
    match Handle::try_current() {
        Ok(handle) => match handle.runtime_flavor() {
            RuntimeFlavor::MultiThread => {
                Ok(tokio::task::block_in_place(|| handle.block_on(future)))
            }
            _ => Err(SerializerError::NestedRuntime),
        },
        Err(_) => {
            let rt = Builder::new_current_thread()
                .enable_all()
                .build()
                .map_err(SerializerError::Runtime)?;
            Ok(rt.block_on(future))
        }
    }
}
