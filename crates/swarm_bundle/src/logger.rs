//! Build-level reporting injected by the host.
//!
//! Internal diagnostics go through `tracing`. A [`BuildLogger`] carries the
//! handful of messages a host shows its user: stage progress, warnings about
//! skipped inputs, and the final failure with its cause.

use std::error::Error as StdError;

pub trait BuildLogger: Send + Sync {
    fn info(&self, msg: &str);

    fn error(&self, msg: &str);

    fn error_with_cause(&self, msg: &str, cause: &(dyn StdError + 'static));
}

/// Discards every message.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopLogger;

impl BuildLogger for NoopLogger {
    fn info(&self, _msg: &str) {}

    fn error(&self, _msg: &str) {}

    fn error_with_cause(&self, _msg: &str, _cause: &(dyn StdError + 'static)) {}
}

/// Forwards messages to `tracing` under the `swarm_bundle::build` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogger;

impl BuildLogger for TracingLogger {
    fn info(&self, msg: &str) {
        tracing::info!(target: "swarm_bundle::build", "{}", msg);
    }

    fn error(&self, msg: &str) {
        tracing::error!(target: "swarm_bundle::build", "{}", msg);
    }

    fn error_with_cause(&self, msg: &str, cause: &(dyn StdError + 'static)) {
        let mut chain = vec![cause.to_string()];
        let mut source = cause.source();
        while let Some(inner) = source {
            chain.push(inner.to_string());
            source = inner.source();
        }
        tracing::error!(target: "swarm_bundle::build", cause = %chain.join(": "), "{}", msg);
    }
}
