use std::fmt;

use color_eyre::Result;
use color_eyre::eyre::eyre;
use serde_json::{Map, Value};

use super::dialog::InitHook;

/// Property bag handed to a dialog factory.
///
/// Values are arbitrary JSON. The session additionally injects an [`InitHook`]
/// before mounting, which the host must fire once the dialog exists.
#[derive(Clone, Default)]
pub struct Props {
    values: Map<String, Value>,
    init_hook: Option<InitHook>,
}

impl Props {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build props from a JSON object.
    pub fn from_json(value: Value) -> Result<Self> {
        match value {
            Value::Object(values) => Ok(Self {
                values,
                init_hook: None,
            }),
            other => Err(eyre!("Dialog props must be a JSON object, got: {}", other)),
        }
    }

    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    pub fn bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(Value::as_bool)
    }

    /// Overlay `other` on top of these props. Keys in `other` win.
    #[must_use]
    pub fn merge(mut self, other: Self) -> Self {
        self.values.extend(other.values);
        self
    }

    /// Get a string prop that the dialog cannot do without.
    pub fn require_str(&self, key: &str) -> Result<&str> {
        self.str(key)
            .ok_or_else(|| eyre!("Missing required dialog prop '{}'", key))
    }

    pub(crate) fn with_init_hook(mut self, hook: InitHook) -> Self {
        self.init_hook = Some(hook);
        self
    }

    /// Remove the init hook so the host can fire it after instantiation.
    pub fn take_init_hook(&mut self) -> Option<InitHook> {
        self.init_hook.take()
    }
}

impl fmt::Debug for Props {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Props")
            .field("values", &self.values)
            .field("init_hook", &self.init_hook.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_typed_access() {
        let props = Props::new()
            .with("title", "Delete")
            .with("danger", true)
            .with("retries", 3);

        assert_eq!(props.str("title"), Some("Delete"));
        assert_eq!(props.bool("danger"), Some(true));
        assert_eq!(props.get("retries"), Some(&json!(3)));
        assert_eq!(props.str("danger"), None);
        assert_eq!(props.get("missing"), None);
    }

    #[test]
    fn test_merge_overrides_keys() {
        let props = Props::new()
            .with("title", "Delete")
            .with("danger", true)
            .merge(Props::from_json(json!({"title": "Remove", "message": "Sure?"})).unwrap());

        assert_eq!(props.str("title"), Some("Remove"));
        assert_eq!(props.bool("danger"), Some(true));
        assert_eq!(props.str("message"), Some("Sure?"));
    }

    #[test]
    fn test_from_json_requires_object() {
        let props = Props::from_json(json!({"message": "hi"})).unwrap();
        assert_eq!(props.require_str("message").unwrap(), "hi");

        assert!(Props::from_json(json!(["message"])).is_err());
        assert!(Props::from_json(json!("message")).is_err());
    }

    #[test]
    fn test_missing_required_prop() {
        let props = Props::new().with("title", "Empty");
        let error = props.require_str("message").unwrap_err();
        assert!(error.to_string().contains("message"));
    }
}
