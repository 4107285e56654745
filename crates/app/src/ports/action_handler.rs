//! Action handler port — the executable body registered for an action type.

use std::future::Future;

use futures::FutureExt;
use futures::future::BoxFuture;
use wothub_domain::error::ExecutionError;

use crate::action::ActionContext;

/// Body executed for each requested instance of an action type.
///
/// Plain `async fn(ActionContext) -> Result<(), ExecutionError>` functions
/// implement this trait.
pub trait ActionHandler: Send + Sync {
    /// Run the action to completion. Returning an error moves the action to
    /// the `error` state with the error's message as reason.
    fn perform(&self, ctx: ActionContext) -> BoxFuture<'static, Result<(), ExecutionError>>;
}

impl<F, Fut> ActionHandler for F
where
    F: Fn(ActionContext) -> Fut + Send + Sync,
    Fut: Future<Output = Result<(), ExecutionError>> + Send + 'static,
{
    fn perform(&self, ctx: ActionContext) -> BoxFuture<'static, Result<(), ExecutionError>> {
        self(ctx).boxed()
    }
}
