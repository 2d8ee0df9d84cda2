//! Host objects and their field accessors.
//!
//! Templates read fields of application types (`{invoice.customer.name}`)
//! without reflection: the host registers, per Rust type, a getter for each
//! exposed field and optionally a setter. Lookups go through the object's
//! `TypeId`.

use std::any::{Any, TypeId};
use std::marker::PhantomData;
use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use super::Value;
use crate::NativeError;

/// An application value exposed to templates.
#[derive(Clone)]
pub struct HostObject {
    type_name: &'static str,
    inner: Arc<RwLock<Box<dyn Any + Send + Sync>>>,
}

impl HostObject {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        HostObject {
            type_name: short_type_name::<T>(),
            inner: Arc::new(RwLock::new(Box::new(value))),
        }
    }

    /// Unqualified Rust type name, e.g. `Invoice`.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    fn type_id(&self) -> TypeId {
        (**self.inner.read()).type_id()
    }

    /// Run `f` against the wrapped value if it is a `T`.
    pub fn with<T: Any, R>(&self, f: impl FnOnce(&T) -> R) -> Option<R> {
        let guard = self.inner.read();
        guard.downcast_ref::<T>().map(f)
    }

    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Arc::ptr_eq(&a.inner, &b.inner)
    }
}

fn short_type_name<T>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

type Getter = Arc<dyn Fn(&dyn Any) -> Option<Value> + Send + Sync>;
type Setter = Arc<dyn Fn(&mut dyn Any, Value) -> Result<(), NativeError> + Send + Sync>;

#[derive(Clone)]
struct FieldAccessor {
    get: Getter,
    set: Option<Setter>,
}

/// Why a host field could not be assigned.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SetFieldError {
    Undefined,
    ReadOnly,
    Rejected(NativeError),
}

/// Per-type field accessor table.
#[derive(Clone, Default)]
pub struct AccessorRegistry {
    types: FxHashMap<TypeId, FxHashMap<String, FieldAccessor>>,
}

impl AccessorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start registering fields for `T`.
    ///
    /// ```text
    /// registry.register::<Person>()
    ///     .field("name", |p| Value::from(p.name.as_str()))
    ///     .field_mut("age", |p| Value::Int(p.age), |p, v| { ... });
    /// ```
    pub fn register<T: Any + Send + Sync>(&mut self) -> TypeAccessors<'_, T> {
        TypeAccessors {
            fields: self.types.entry(TypeId::of::<T>()).or_default(),
            _marker: PhantomData,
        }
    }

    pub fn is_registered<T: Any>(&self) -> bool {
        self.types.contains_key(&TypeId::of::<T>())
    }

    /// Read `field`, or `None` if the type does not expose it.
    pub fn get(&self, object: &HostObject, field: &str) -> Option<Value> {
        let accessor = self.types.get(&object.type_id())?.get(field)?;
        let guard = object.inner.read();
        (accessor.get)(&**guard)
    }

    pub fn set(&self, object: &HostObject, field: &str, value: Value) -> Result<(), SetFieldError> {
        let accessor = self
            .types
            .get(&object.type_id())
            .and_then(|fields| fields.get(field))
            .ok_or(SetFieldError::Undefined)?;
        let setter = accessor.set.as_ref().ok_or(SetFieldError::ReadOnly)?;
        let mut guard = object.inner.write();
        setter(&mut **guard, value).map_err(SetFieldError::Rejected)
    }
}

/// Builder returned by [`AccessorRegistry::register`].
pub struct TypeAccessors<'r, T> {
    fields: &'r mut FxHashMap<String, FieldAccessor>,
    _marker: PhantomData<fn(&T)>,
}

impl<T: Any + Send + Sync> TypeAccessors<'_, T> {
    /// Expose a read-only field.
    #[must_use]
    pub fn field(self, name: &str, get: impl Fn(&T) -> Value + Send + Sync + 'static) -> Self {
        self.insert(name, get, None)
    }

    /// Expose a field that templates may also assign.
    #[must_use]
    pub fn field_mut(
        self,
        name: &str,
        get: impl Fn(&T) -> Value + Send + Sync + 'static,
        set: impl Fn(&mut T, Value) -> Result<(), NativeError> + Send + Sync + 'static,
    ) -> Self {
        let setter: Setter = Arc::new(move |any: &mut dyn Any, value| match any.downcast_mut::<T>() {
            Some(target) => set(target, value),
            None => Err(NativeError::new("Host object type mismatch.")),
        });
        self.insert(name, get, Some(setter))
    }

    fn insert(
        self,
        name: &str,
        get: impl Fn(&T) -> Value + Send + Sync + 'static,
        set: Option<Setter>,
    ) -> Self {
        let getter: Getter = Arc::new(move |any: &dyn Any| any.downcast_ref::<T>().map(&get));
        self.fields
            .insert(name.to_owned(), FieldAccessor { get: getter, set });
        self
    }
}
