//! Value — the single-slot cell behind a property.

use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};

use serde_json::Value as JsonValue;
use wothub_domain::error::ActuationError;

use crate::ports::Forwarder;

type UpdateHook = Box<dyn Fn(&JsonValue) -> anyhow::Result<()> + Send + Sync>;

/// Current reading of a property, plus what happens when it changes.
///
/// The optional [`Forwarder`] runs before the value is stored and can veto
/// the write. Update hooks run after every accepted write, including writes
/// that store an identical value.
pub struct Value {
    current: JsonValue,
    forwarder: Option<Box<dyn Forwarder>>,
    hooks: Vec<UpdateHook>,
}

impl Value {
    #[must_use]
    pub fn new(initial: impl Into<JsonValue>) -> Self {
        Self {
            current: initial.into(),
            forwarder: None,
            hooks: Vec::new(),
        }
    }

    /// Route every write through `forwarder` before storing it.
    #[must_use]
    pub fn with_forwarder(mut self, forwarder: impl Forwarder + 'static) -> Self {
        self.forwarder = Some(Box::new(forwarder));
        self
    }

    /// Register a hook called with the new value after each accepted update.
    ///
    /// A failing or panicking hook is logged and does not affect the write or
    /// the other hooks. Hooks run while the owning thing is locked, so they
    /// must not call back into that thing.
    #[must_use]
    pub fn on_update(
        mut self,
        hook: impl Fn(&JsonValue) -> anyhow::Result<()> + Send + Sync + 'static,
    ) -> Self {
        self.hooks.push(Box::new(hook));
        self
    }

    #[must_use]
    pub fn get(&self) -> &JsonValue {
        &self.current
    }

    /// Store `value` after the forwarder (if any) accepted it.
    ///
    /// # Errors
    ///
    /// Returns [`ActuationError`] when the forwarder refuses; the current
    /// value is unchanged and no hook runs.
    pub fn set(&mut self, value: JsonValue) -> Result<(), ActuationError> {
        if let Some(forwarder) = &self.forwarder {
            forwarder.forward(&value)?;
        }
        self.current = value;
        self.run_hooks();
        Ok(())
    }

    /// Record a reading that originated on the device itself.
    ///
    /// Skips the forwarder, and skips the update entirely when the reading
    /// equals the current value. Returns whether the value changed.
    pub fn notify_of_external_update(&mut self, value: JsonValue) -> bool {
        if self.current == value {
            return false;
        }
        self.current = value;
        self.run_hooks();
        true
    }

    fn run_hooks(&self) {
        for (index, hook) in self.hooks.iter().enumerate() {
            match catch_unwind(AssertUnwindSafe(|| hook(&self.current))) {
                Ok(Ok(())) => {}
                Ok(Err(err)) => {
                    tracing::warn!(hook = index, error = %err, "value update hook failed");
                }
                Err(_) => tracing::warn!(hook = index, "value update hook panicked"),
            }
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Value")
            .field("current", &self.current)
            .field("forwarder", &self.forwarder.is_some())
            .field("hooks", &self.hooks.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_hook(
        counter: Arc<AtomicUsize>,
    ) -> impl Fn(&JsonValue) -> anyhow::Result<()> + Send + Sync + 'static {
        move |_: &JsonValue| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[test]
    fn should_store_value_and_run_hooks() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut value = Value::new(50).on_update(counting_hook(Arc::clone(&calls)));

        value.set(json!(40)).unwrap();

        assert_eq!(value.get(), &json!(40));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn should_notify_even_when_value_is_unchanged() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut value = Value::new(true).on_update(counting_hook(Arc::clone(&calls)));

        value.set(json!(true)).unwrap();
        value.set(json!(true)).unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn should_leave_value_untouched_when_forwarder_fails() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut value = Value::new(10)
            .with_forwarder(|_: &JsonValue| -> Result<(), ActuationError> {
                Err(ActuationError::msg("relay stuck"))
            })
            .on_update(counting_hook(Arc::clone(&calls)));

        let result = value.set(json!(20));

        assert!(result.is_err());
        assert_eq!(value.get(), &json!(10));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn should_forward_before_storing() {
        let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let mut value =
            Value::new(0).with_forwarder(move |v: &JsonValue| -> Result<(), ActuationError> {
                sink.lock().unwrap().push(v.clone());
                Ok(())
            });

        value.set(json!(7)).unwrap();

        assert_eq!(*seen.lock().unwrap(), vec![json!(7)]);
    }

    #[test]
    fn should_isolate_failing_hook() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut value = Value::new(0)
            .on_update(|_| Err(anyhow::anyhow!("display offline")))
            .on_update(counting_hook(Arc::clone(&calls)));

        assert!(value.set(json!(1)).is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn should_isolate_panicking_hook() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut value = Value::new(0)
            .on_update(|_| panic!("display driver crashed"))
            .on_update(counting_hook(Arc::clone(&calls)));

        assert!(value.set(json!(1)).is_ok());
        assert!(value.notify_of_external_update(json!(2)));

        assert_eq!(value.get(), &json!(2));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn should_skip_unchanged_external_update() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut value = Value::new(1.5).on_update(counting_hook(Arc::clone(&calls)));

        assert!(!value.notify_of_external_update(json!(1.5)));
        assert!(value.notify_of_external_update(json!(2.5)));

        assert_eq!(value.get(), &json!(2.5));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
