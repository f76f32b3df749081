use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Session payloads resolved for the current request.
///
/// [`SessionLayer`](crate::SessionLayer) places this in the request extensions
/// and stores the decoded payload under the configured `context_name`. A
/// request without a valid session simply has no entry for that name.
///
/// # Example
///
/// ```rust
/// use ttl_session::SessionContext;
///
/// let mut context = SessionContext::default();
/// context.insert("session", String::from("alice"));
///
/// assert_eq!(context.get::<String>("session").map(String::as_str), Some("alice"));
/// assert!(context.get::<u64>("session").is_none());
/// ```
#[derive(Clone, Default)]
pub struct SessionContext {
    values: HashMap<String, Arc<dyn Any + Send + Sync>>,
}

impl SessionContext {
    /// Stores `value` under `name`, replacing any previous value.
    pub fn insert<T>(&mut self, name: impl Into<String>, value: T)
    where
        T: Send + Sync + 'static,
    {
        self.values.insert(name.into(), Arc::new(value));
    }

    /// Returns the value stored under `name` if it has type `T`.
    pub fn get<T: 'static>(&self, name: &str) -> Option<&T> {
        self.values
            .get(name)
            .and_then(|value| (**value).downcast_ref::<T>())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.values.keys()).finish()
    }
}
