//! Selecting pods and evicting them

mod invoker;
mod retry;
mod selection;
#[cfg(test)]
mod testing;

pub use retry::{DEFAULT_RETRY_INTERVAL, RetryMode, RetryPolicy, run};
pub use selection::{SelectionArgs, resolve_targets};
