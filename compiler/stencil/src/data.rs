//! Render input.

use std::any::Any;

use stencil_eval::value::TypeAccessors;
use stencil_eval::{AccessorRegistry, Value, ValueMap};

/// The data context of a render: top-level variables in insertion order,
/// plus the field accessors for any host objects among them.
///
/// ```text
/// let data = Data::new()
///     .with("customer", customer_value)
///     .with_type::<Invoice>(|t| t.field("total", |i| Value::from(i.total)));
/// ```
#[derive(Clone, Default)]
pub struct Data {
    values: ValueMap,
    registry: AccessorRegistry,
}

impl Data {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(key, value.into());
    }

    /// Register the fields templates may read (and write) on host type `T`.
    #[must_use]
    pub fn with_type<T: Any + Send + Sync>(
        mut self,
        fields: impl FnOnce(TypeAccessors<'_, T>) -> TypeAccessors<'_, T>,
    ) -> Self {
        let _ = fields(self.registry.register::<T>());
        self
    }

    pub fn values(&self) -> &ValueMap {
        &self.values
    }

    pub fn registry(&self) -> &AccessorRegistry {
        &self.registry
    }
}

impl From<ValueMap> for Data {
    fn from(values: ValueMap) -> Self {
        Data {
            values,
            registry: AccessorRegistry::new(),
        }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Data {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut data = Data::new();
        for (key, value) in iter {
            data.insert(key, value);
        }
        data
    }
}
