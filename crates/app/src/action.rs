//! Action execution — runs registered handlers on their own tokio tasks.
//!
//! Each accepted request becomes one spawned task. The task moves the
//! action to `running`, awaits the handler, then records exactly one
//! terminal state. Handlers suspend cooperatively (`ActionContext::sleep`)
//! so any number of actions can be outstanding at once.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use serde_json::Value as JsonValue;
use tokio_util::sync::CancellationToken;
use wothub_domain::error::ExecutionError;
use wothub_domain::id::ActionId;

use crate::ports::ActionHandler;
use crate::thing::Thing;

/// Everything an action body gets to work with.
pub struct ActionContext {
    thing: Thing,
    id: ActionId,
    name: String,
    input: Option<JsonValue>,
    cancellation: CancellationToken,
}

impl ActionContext {
    #[must_use]
    pub fn id(&self) -> ActionId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The validated request input.
    #[must_use]
    pub fn input(&self) -> Option<&JsonValue> {
        self.input.as_ref()
    }

    /// One field of an object input.
    #[must_use]
    pub fn input_field(&self, field: &str) -> Option<&JsonValue> {
        self.input.as_ref().and_then(|input| input.get(field))
    }

    /// Handle on the owning thing. Writes through it take the same path as
    /// any network client.
    #[must_use]
    pub fn thing(&self) -> &Thing {
        &self.thing
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    /// Fail fast when cancellation was requested.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutionError::Cancelled`] once the action was cancelled.
    pub fn check_cancelled(&self) -> Result<(), ExecutionError> {
        if self.is_cancelled() {
            Err(ExecutionError::Cancelled)
        } else {
            Ok(())
        }
    }

    /// Wait for `duration`, waking early if the action is cancelled.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutionError::Cancelled`] when cancelled before the
    /// duration elapsed.
    pub async fn sleep(&self, duration: Duration) -> Result<(), ExecutionError> {
        tokio::select! {
            () = self.cancellation.cancelled() => Err(ExecutionError::Cancelled),
            () = tokio::time::sleep(duration) => Ok(()),
        }
    }
}

/// A pending action waiting to be started.
pub(crate) struct ScheduledAction {
    pub(crate) thing: Thing,
    pub(crate) handler: Arc<dyn ActionHandler>,
    pub(crate) id: ActionId,
    pub(crate) name: String,
    pub(crate) input: Option<JsonValue>,
    pub(crate) cancellation: CancellationToken,
}

/// Hand the action to the current tokio runtime.
///
/// Returns the action back when no runtime is available.
pub(crate) fn schedule(job: ScheduledAction) -> Result<(), ScheduledAction> {
    match tokio::runtime::Handle::try_current() {
        Ok(handle) => {
            handle.spawn(run(job));
            Ok(())
        }
        Err(_) => Err(job),
    }
}

async fn run(job: ScheduledAction) {
    let ScheduledAction {
        thing,
        handler,
        id,
        name,
        input,
        cancellation,
    } = job;

    if !thing.begin_action(&name, id) {
        tracing::debug!(action = %name, %id, "action no longer pending, not starting it");
        return;
    }

    let ctx = ActionContext {
        thing: thing.clone(),
        id,
        name: name.clone(),
        input,
        cancellation,
    };
    let outcome = AssertUnwindSafe(handler.perform(ctx)).catch_unwind().await;
    let result = outcome.unwrap_or_else(|_| {
        Err(ExecutionError::Other(anyhow::anyhow!(
            "action handler panicked"
        )))
    });

    thing.finish_action(&name, id, result);
}
