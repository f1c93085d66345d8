//! Dynamic value model.
//!
//! Everything the descriptor can inspect is a [`Value`]. Scalars are held
//! inline; heap objects live behind [`ObjectRef`], a shared, identity-bearing
//! handle, so that arbitrary (including cyclic) object graphs can be built
//! and inspected.

use std::cell::{Ref, RefCell};
use std::fmt;
use std::rc::Rc;

use chrono::{DateTime, Utc};

use crate::describe::DescribeContext;
use crate::description::Segment;

/// Any inspectable runtime value.
#[derive(Clone, Default)]
pub enum Value {
    /// Absence of a value.
    #[default]
    Undefined,
    /// Explicit null.
    Null,
    /// Boolean scalar.
    Bool(bool),
    /// Double-precision number.
    Number(f64),
    /// String scalar.
    String(String),
    /// Arbitrary-size integer (bounded to `i128` here).
    BigInt(i128),
    /// Unique symbol.
    Symbol(Symbol),
    /// Callable or class.
    Function(Rc<Function>),
    /// Heap object with identity.
    Object(ObjectRef),
}

impl Value {
    /// Builds an array object.
    pub fn array<I>(elements: I) -> Self
    where
        I: IntoIterator<Item = Value>,
    {
        Self::Object(ObjectRef::new(ObjectKind::Array(elements.into_iter().collect())))
    }

    /// Builds a plain object with enumerable string-keyed properties.
    pub fn object<K, I>(properties: I) -> Self
    where
        K: Into<PropertyKey>,
        I: IntoIterator<Item = (K, Value)>,
    {
        let object = ObjectRef::plain();
        for (key, value) in properties {
            object.set(key, value);
        }
        Self::Object(object)
    }

    /// Builds a plain object that reports `class_name` as its constructor.
    pub fn instance<K, I>(class_name: impl Into<String>, properties: I) -> Self
    where
        K: Into<PropertyKey>,
        I: IntoIterator<Item = (K, Value)>,
    {
        let value = Self::object(properties);
        if let Self::Object(object) = &value {
            object.set_class_name(class_name);
        }
        value
    }

    /// Builds a set, dropping duplicates under SameValueZero.
    pub fn set<I>(elements: I) -> Self
    where
        I: IntoIterator<Item = Value>,
    {
        let object = ObjectRef::new(ObjectKind::Set(Vec::new()));
        for element in elements {
            object.add(element);
        }
        Self::Object(object)
    }

    /// Builds a map; later entries replace earlier ones with an equal key.
    pub fn map<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (Value, Value)>,
    {
        let object = ObjectRef::new(ObjectKind::Map(Vec::new()));
        for (key, value) in entries {
            object.insert(key, value);
        }
        Self::Object(object)
    }

    /// Builds a regular expression object.
    pub fn regexp(source: impl Into<String>, flags: impl Into<String>) -> Self {
        Self::Object(ObjectRef::new(ObjectKind::RegExp {
            source: source.into(),
            flags: flags.into(),
        }))
    }

    /// Builds a date object.
    pub fn date(at: DateTime<Utc>) -> Self {
        Self::Object(ObjectRef::new(ObjectKind::Date(at)))
    }

    /// Builds a fixed-size numeric buffer.
    pub fn typed_array(kind: TypedArrayKind, elements: Vec<f64>) -> Self {
        Self::Object(ObjectRef::new(ObjectKind::TypedArray { kind, elements }))
    }

    /// Builds a raw byte window such as a `DataView`.
    pub fn byte_view(name: impl Into<String>, byte_length: usize) -> Self {
        Self::Object(ObjectRef::new(ObjectKind::ByteView {
            name: name.into(),
            byte_length,
        }))
    }

    /// Builds an object whose contents cannot be observed.
    pub fn opaque(kind: OpaqueKind) -> Self {
        Self::Object(ObjectRef::new(ObjectKind::Opaque(kind)))
    }

    /// Builds an error object.
    pub fn error_object(
        name: impl Into<String>,
        message: impl Into<String>,
        stack: Option<String>,
    ) -> Self {
        Self::Object(ObjectRef::new(ObjectKind::Error {
            name: name.into(),
            message: message.into(),
            stack,
        }))
    }

    /// Builds an error object from a Rust error, rendering its source chain
    /// as the stack text.
    pub fn error(err: &(dyn std::error::Error + 'static)) -> Self {
        let message = err.to_string();
        let mut source = err.source();
        let stack = if source.is_some() {
            let mut stack = format!("Error: {message}");
            while let Some(cause) = source {
                stack.push_str("\n    caused by: ");
                stack.push_str(&cause.to_string());
                source = cause.source();
            }
            Some(stack)
        } else {
            None
        };
        Self::error_object("Error", message, stack)
    }

    /// Builds a fresh symbol.
    pub fn symbol(description: impl Into<String>) -> Self {
        Self::Symbol(Symbol::new(description))
    }

    /// Builds a function value from its name and source text.
    pub fn function(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self::Function(Rc::new(Function::new(Some(name.into()), source)))
    }

    /// Builds a nameless function value.
    pub fn anonymous_function(source: impl Into<String>) -> Self {
        Self::Function(Rc::new(Function::new(None, source)))
    }

    /// Builds a class value.
    pub fn class(name: impl Into<String>) -> Self {
        let name = name.into();
        let source = format!("class {name} {{}}");
        Self::Function(Rc::new(Function::new(Some(name), source)))
    }

    /// Returns the object handle if this is a heap object.
    #[must_use]
    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Self::Object(object) => Some(object),
            _ => None,
        }
    }

    /// SameValueZero equality: scalars compare by value (NaN equals NaN,
    /// `0` equals `-0`), symbols, functions and objects by identity.
    #[must_use]
    pub fn same_value_zero(&self, other: &Value) -> bool {
        match (self, other) {
            (Self::Undefined, Self::Undefined) | (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Number(a), Self::Number(b)) => a == b || (a.is_nan() && b.is_nan()),
            (Self::String(a), Self::String(b)) => a == b,
            (Self::BigInt(a), Self::BigInt(b)) => a == b,
            (Self::Symbol(a), Self::Symbol(b)) => a == b,
            (Self::Function(a), Self::Function(b)) => Rc::ptr_eq(a, b),
            (Self::Object(a), Self::Object(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    // Objects print as a handle so that cyclic graphs do not recurse.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Undefined => f.write_str("Undefined"),
            Self::Null => f.write_str("Null"),
            Self::Bool(b) => write!(f, "Bool({b})"),
            Self::Number(n) => write!(f, "Number({n})"),
            Self::String(s) => write!(f, "String({s:?})"),
            Self::BigInt(n) => write!(f, "BigInt({n})"),
            Self::Symbol(s) => write!(f, "{s}"),
            Self::Function(func) => write!(f, "Function({:?})", func.name()),
            Self::Object(object) => write!(f, "{object:?}"),
        }
    }
}

/// A unique symbol. Two symbols are equal only if they are the same symbol.
#[derive(Clone)]
pub struct Symbol(Rc<Option<String>>);

impl Symbol {
    /// Creates a symbol with a description.
    pub fn new(description: impl Into<String>) -> Self {
        Self(Rc::new(Some(description.into())))
    }

    /// Creates a symbol without a description.
    #[must_use]
    pub fn anonymous() -> Self {
        Self(Rc::new(None))
    }

    /// The symbol's description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Symbol {}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({})", self.description().unwrap_or_default())
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// A callable value, identified by its name and source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Function {
    name: Option<String>,
    source: String,
}

impl Function {
    /// Creates a function description from an optional name and its source.
    pub fn new(name: Option<String>, source: impl Into<String>) -> Self {
        Self {
            name: name.filter(|n| !n.is_empty()),
            source: source.into(),
        }
    }

    /// Declared name, if the function has one.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Source text of the function.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Whether the source text declares a class.
    #[must_use]
    pub fn is_class(&self) -> bool {
        self.source.starts_with("class")
    }
}

/// Key of a plain-object property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyKey {
    /// String key.
    String(String),
    /// Symbol key.
    Symbol(Symbol),
}

impl From<&str> for PropertyKey {
    fn from(key: &str) -> Self {
        Self::String(key.to_string())
    }
}

impl From<String> for PropertyKey {
    fn from(key: String) -> Self {
        Self::String(key)
    }
}

impl From<Symbol> for PropertyKey {
    fn from(key: Symbol) -> Self {
        Self::Symbol(key)
    }
}

impl From<PropertyKey> for Value {
    fn from(key: PropertyKey) -> Self {
        match key {
            PropertyKey::String(s) => Value::String(s),
            PropertyKey::Symbol(s) => Value::Symbol(s),
        }
    }
}

/// Own property of a plain object.
#[derive(Debug, Clone)]
pub struct Property {
    /// Property key.
    pub key: PropertyKey,
    /// Property value.
    pub value: Value,
    /// Hidden properties are skipped by the descriptor.
    pub enumerable: bool,
}

/// Element type of a fixed-size numeric buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypedArrayKind {
    Int8,
    Uint8,
    Uint8Clamped,
    Int16,
    Uint16,
    Int32,
    Uint32,
    Float32,
    Float64,
}

impl TypedArrayKind {
    /// Constructor name of the buffer type.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Int8 => "Int8Array",
            Self::Uint8 => "Uint8Array",
            Self::Uint8Clamped => "Uint8ClampedArray",
            Self::Int16 => "Int16Array",
            Self::Uint16 => "Uint16Array",
            Self::Int32 => "Int32Array",
            Self::Uint32 => "Uint32Array",
            Self::Float32 => "Float32Array",
            Self::Float64 => "Float64Array",
        }
    }
}

/// Containers whose contents are deliberately not introspected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpaqueKind {
    WeakMap,
    WeakSet,
    WeakRef,
    Promise,
}

impl OpaqueKind {
    /// Constructor name of the container type.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::WeakMap => "WeakMap",
            Self::WeakSet => "WeakSet",
            Self::WeakRef => "WeakRef",
            Self::Promise => "Promise",
        }
    }
}

/// Structural kind of a heap object.
#[derive(Debug, Clone)]
pub enum ObjectKind {
    /// Ordered, indexed list.
    Array(Vec<Value>),
    /// Fixed-size numeric buffer.
    TypedArray {
        kind: TypedArrayKind,
        elements: Vec<f64>,
    },
    /// Raw window over bytes; never treated as array-like.
    ByteView { name: String, byte_length: usize },
    /// Insertion-ordered set.
    Set(Vec<Value>),
    /// Insertion-ordered map.
    Map(Vec<(Value, Value)>),
    /// Regular expression.
    RegExp { source: String, flags: String },
    /// Point in time.
    Date(DateTime<Utc>),
    /// Unobservable container.
    Opaque(OpaqueKind),
    /// Error with optional trace text.
    Error {
        name: String,
        message: String,
        stack: Option<String>,
    },
    /// Generic keyed object.
    Plain(Vec<Property>),
}

/// Hook invoked by the descriptor to override an object's description.
///
/// Returning the same object falls through to generic classification;
/// returning anything else describes that value in its place.
pub type CustomHook = Rc<dyn Fn(&ObjectRef, &DescribeContext<'_>) -> Value>;

/// Reserved capability attached to an object.
#[derive(Clone)]
pub enum Marker {
    /// Pre-built raw content, used verbatim.
    Raw(Vec<Segment>),
    /// Custom description hook.
    Custom(CustomHook),
}

impl fmt::Debug for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Raw(segments) => f.debug_tuple("Raw").field(segments).finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Contents of a heap object.
#[derive(Debug, Clone)]
pub struct ObjectData {
    /// Constructor name; `None` means the default for the kind.
    pub class_name: Option<String>,
    /// Structural kind and contents.
    pub kind: ObjectKind,
    /// Optional reserved capability.
    pub marker: Option<Marker>,
}

/// Shared handle to a heap object. Clones refer to the same object.
#[derive(Clone)]
pub struct ObjectRef(Rc<RefCell<ObjectData>>);

impl ObjectRef {
    /// Allocates a new object of the given kind.
    #[must_use]
    pub fn new(kind: ObjectKind) -> Self {
        Self(Rc::new(RefCell::new(ObjectData {
            class_name: None,
            kind,
            marker: None,
        })))
    }

    /// Allocates an empty plain object.
    #[must_use]
    pub fn plain() -> Self {
        Self::new(ObjectKind::Plain(Vec::new()))
    }

    /// Allocates an empty array.
    #[must_use]
    pub fn array() -> Self {
        Self::new(ObjectKind::Array(Vec::new()))
    }

    /// Stable identity of this object for the lifetime of the allocation.
    #[must_use]
    pub fn id(&self) -> usize {
        Rc::as_ptr(&self.0).cast::<()>() as usize
    }

    /// Whether both handles point at the same object.
    #[must_use]
    pub fn ptr_eq(&self, other: &ObjectRef) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Borrows the object's contents.
    ///
    /// # Panics
    ///
    /// Panics if the object is currently mutably borrowed.
    #[must_use]
    pub fn borrow(&self) -> Ref<'_, ObjectData> {
        self.0.borrow()
    }

    #[cfg(test)]
    pub(crate) fn borrow_mut(&self) -> std::cell::RefMut<'_, ObjectData> {
        self.0.borrow_mut()
    }

    /// Copies the object's contents, or `None` while it is mutably borrowed.
    #[must_use]
    pub fn snapshot(&self) -> Option<ObjectData> {
        self.0.try_borrow().ok().map(|data| data.clone())
    }

    /// Wraps this handle as a [`Value`].
    #[must_use]
    pub fn to_value(&self) -> Value {
        Value::Object(self.clone())
    }

    /// Sets the constructor name.
    pub fn set_class_name(&self, name: impl Into<String>) {
        self.0.borrow_mut().class_name = Some(name.into());
    }

    /// Attaches a reserved capability, replacing any previous one.
    pub fn set_marker(&self, marker: Marker) {
        self.0.borrow_mut().marker = Some(marker);
    }

    /// Attaches a custom description hook.
    pub fn set_custom_hook<F>(&self, hook: F)
    where
        F: Fn(&ObjectRef, &DescribeContext<'_>) -> Value + 'static,
    {
        self.set_marker(Marker::Custom(Rc::new(hook)));
    }

    /// Sets an enumerable property on a plain object, replacing an existing
    /// property with the same key in place. No-op on other kinds.
    pub fn set(&self, key: impl Into<PropertyKey>, value: Value) {
        self.define(key.into(), value, true);
    }

    /// Sets a non-enumerable property on a plain object.
    pub fn set_hidden(&self, key: impl Into<PropertyKey>, value: Value) {
        self.define(key.into(), value, false);
    }

    fn define(&self, key: PropertyKey, value: Value, enumerable: bool) {
        let mut data = self.0.borrow_mut();
        if let ObjectKind::Plain(properties) = &mut data.kind {
            match properties.iter_mut().find(|p| p.key == key) {
                Some(existing) => {
                    existing.value = value;
                    existing.enumerable = enumerable;
                }
                None => properties.push(Property {
                    key,
                    value,
                    enumerable,
                }),
            }
        }
    }

    /// Appends to an array. No-op on other kinds.
    pub fn push(&self, value: Value) {
        if let ObjectKind::Array(elements) = &mut self.0.borrow_mut().kind {
            elements.push(value);
        }
    }

    /// Adds to a set unless an equal element is present. No-op on other kinds.
    pub fn add(&self, value: Value) {
        if let ObjectKind::Set(elements) = &mut self.0.borrow_mut().kind {
            if !elements.iter().any(|e| e.same_value_zero(&value)) {
                elements.push(value);
            }
        }
    }

    /// Inserts into a map, replacing the value of an equal key in place.
    /// No-op on other kinds.
    pub fn insert(&self, key: Value, value: Value) {
        if let ObjectKind::Map(entries) = &mut self.0.borrow_mut().kind {
            match entries.iter_mut().find(|(k, _)| k.same_value_zero(&key)) {
                Some(entry) => entry.1 = value,
                None => entries.push((key, value)),
            }
        }
    }
}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Object(#{:x})", self.id())
    }
}

impl From<ObjectRef> for Value {
    fn from(object: ObjectRef) -> Self {
        Value::Object(object)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_deduplicates_with_same_value_zero() {
        let value = Value::set([
            Value::Number(1.0),
            Value::Number(f64::NAN),
            Value::Number(1.0),
            Value::Number(f64::NAN),
        ]);
        let object = value.as_object().unwrap();
        match &object.borrow().kind {
            ObjectKind::Set(elements) => assert_eq!(elements.len(), 2),
            other => panic!("unexpected kind {other:?}"),
        }
    }

    #[test]
    fn map_insert_replaces_existing_key() {
        let value = Value::map([
            (Value::String("a".into()), Value::Number(1.0)),
            (Value::String("a".into()), Value::Number(2.0)),
        ]);
        let object = value.as_object().unwrap();
        match &object.borrow().kind {
            ObjectKind::Map(entries) => {
                assert_eq!(entries.len(), 1);
                assert!(entries[0].1.same_value_zero(&Value::Number(2.0)));
            }
            other => panic!("unexpected kind {other:?}"),
        }
    }

    #[test]
    fn set_replaces_property_in_place() {
        let object = ObjectRef::plain();
        object.set("a", Value::Number(1.0));
        object.set("b", Value::Number(2.0));
        object.set("a", Value::Number(3.0));
        match &object.borrow().kind {
            ObjectKind::Plain(props) => {
                assert_eq!(props.len(), 2);
                assert_eq!(props[0].key, PropertyKey::from("a"));
                assert!(props[0].value.same_value_zero(&Value::Number(3.0)));
            }
            other => panic!("unexpected kind {other:?}"),
        }
    }

    #[test]
    fn symbols_compare_by_identity() {
        let a = Symbol::new("x");
        let b = Symbol::new("x");
        assert_ne!(a, b);
        assert_eq!(a, a.clone());
        assert_eq!(a.to_string(), "Symbol(x)");
        assert_eq!(Symbol::anonymous().to_string(), "Symbol()");
    }

    #[test]
    fn debug_of_cyclic_object_terminates() {
        let object = ObjectRef::plain();
        object.set("self", object.to_value());
        let text = format!("{:?}", object.to_value());
        assert!(text.starts_with("Object(#"));
    }

    #[test]
    fn error_value_renders_source_chain() {
        #[derive(Debug)]
        struct Outer(std::io::Error);
        impl std::fmt::Display for Outer {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str("load failed")
            }
        }
        impl std::error::Error for Outer {
            fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
                Some(&self.0)
            }
        }

        let err = Outer(std::io::Error::new(std::io::ErrorKind::Other, "disk gone"));
        let value = Value::error(&err);
        let object = value.as_object().unwrap();
        match &object.borrow().kind {
            ObjectKind::Error { message, stack, .. } => {
                assert_eq!(message, "load failed");
                let stack = stack.as_deref().unwrap();
                assert!(stack.contains("caused by: disk gone"));
            }
            other => panic!("unexpected kind {other:?}"),
        }
    }
}
