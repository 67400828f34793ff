//! Runtime schema model of the interface.
//!
//! `IdlType` describes a value shape, `TypeEnv` holds named (possibly
//! recursive) definitions, and `ServiceSchema` lists the remote methods.
//! `IdlSchema` is implemented by every Rust type on the call surface so the
//! declared types can be checked against the schema the factory builds.

use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use thiserror::Error;

use crate::nat::{Int, Nat};
use crate::principal::Principal;

/// Shape of a value on the call surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdlType {
    /// Unit value
    Null,
    /// Boolean
    Bool,
    /// Unbounded natural
    Nat,
    /// 8-bit natural
    Nat8,
    /// 16-bit natural
    Nat16,
    /// 32-bit natural
    Nat32,
    /// 64-bit natural
    Nat64,
    /// Unbounded integer
    Int,
    /// 8-bit integer
    Int8,
    /// 16-bit integer
    Int16,
    /// 32-bit integer
    Int32,
    /// 64-bit integer
    Int64,
    /// 64-bit float
    Float64,
    /// UTF-8 text
    Text,
    /// Actor identity
    Principal,
    /// Optional value
    Opt(Box<IdlType>),
    /// Sequence
    Vec(Box<IdlType>),
    /// Positional record
    Tuple(Vec<IdlType>),
    /// Named fields, sorted by name
    Record(Vec<Field>),
    /// Tagged alternatives, sorted by tag
    Variant(Vec<Field>),
    /// Reference to a definition in a [`TypeEnv`]
    Named(String),
}

/// A record field or variant case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Field name or variant tag
    pub name: String,
    /// Field type
    pub ty: IdlType,
}

impl IdlType {
    /// `opt inner`
    #[must_use]
    pub fn opt(inner: Self) -> Self {
        Self::Opt(Box::new(inner))
    }

    /// `vec inner`
    #[must_use]
    pub fn vec(inner: Self) -> Self {
        Self::Vec(Box::new(inner))
    }

    /// `record { a; b; ... }`
    #[must_use]
    pub fn tuple(items: impl IntoIterator<Item = Self>) -> Self {
        Self::Tuple(items.into_iter().collect())
    }

    /// `record { name : ty; ... }` with fields sorted by name.
    #[must_use]
    pub fn record<'a>(fields: impl IntoIterator<Item = (&'a str, Self)>) -> Self {
        Self::Record(sorted_fields(fields))
    }

    /// `variant { tag : ty; ... }` with cases sorted by tag.
    #[must_use]
    pub fn variant<'a>(cases: impl IntoIterator<Item = (&'a str, Self)>) -> Self {
        Self::Variant(sorted_fields(cases))
    }

    /// `variant { Ok : ok; Err : err }`
    #[must_use]
    pub fn result(ok: Self, err: Self) -> Self {
        Self::variant([("Ok", ok), ("Err", err)])
    }

    /// Reference to a named definition.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }

    /// Check a JSON value against this type.
    ///
    /// # Errors
    ///
    /// Returns the first mismatch found, with the JSON path where it occurred.
    pub fn validate(&self, value: &Value, env: &TypeEnv) -> Result<(), SchemaError> {
        self.validate_at(value, env, "$")
    }

    fn validate_at(&self, value: &Value, env: &TypeEnv, path: &str) -> Result<(), SchemaError> {
        let mismatch = || SchemaError::Mismatch {
            path: path.to_string(),
            expected: self.to_string(),
            found: describe(value),
        };

        match self {
            Self::Null => value.is_null().then_some(()).ok_or_else(mismatch),
            Self::Bool => value.is_boolean().then_some(()).ok_or_else(mismatch),
            Self::Nat => match value {
                Value::String(s) if s.parse::<u128>().is_ok() => Ok(()),
                Value::Number(n) if n.is_u64() => Ok(()),
                _ => Err(mismatch()),
            },
            Self::Int => match value {
                Value::String(s) if s.parse::<i128>().is_ok() => Ok(()),
                Value::Number(n) if n.is_u64() || n.is_i64() => Ok(()),
                _ => Err(mismatch()),
            },
            Self::Nat8 => unsigned_within(value, u8::MAX).ok_or_else(mismatch),
            Self::Nat16 => unsigned_within(value, u16::MAX).ok_or_else(mismatch),
            Self::Nat32 => unsigned_within(value, u32::MAX).ok_or_else(mismatch),
            Self::Nat64 => unsigned_within(value, u64::MAX).ok_or_else(mismatch),
            Self::Int8 => signed_within(value, i8::MIN, i8::MAX).ok_or_else(mismatch),
            Self::Int16 => signed_within(value, i16::MIN, i16::MAX).ok_or_else(mismatch),
            Self::Int32 => signed_within(value, i32::MIN, i32::MAX).ok_or_else(mismatch),
            Self::Int64 => signed_within(value, i64::MIN, i64::MAX).ok_or_else(mismatch),
            Self::Float64 => value.is_number().then_some(()).ok_or_else(mismatch),
            Self::Text => value.is_string().then_some(()).ok_or_else(mismatch),
            Self::Principal => match value {
                Value::String(s) if Principal::from_text(s).is_ok() => Ok(()),
                _ => Err(mismatch()),
            },
            Self::Opt(inner) => {
                if value.is_null() {
                    Ok(())
                } else {
                    inner.validate_at(value, env, path)
                }
            }
            Self::Vec(inner) => {
                let items = value.as_array().ok_or_else(mismatch)?;
                for (i, item) in items.iter().enumerate() {
                    inner.validate_at(item, env, &format!("{path}[{i}]"))?;
                }
                Ok(())
            }
            Self::Tuple(types) => {
                let items = value.as_array().ok_or_else(mismatch)?;
                if items.len() != types.len() {
                    return Err(mismatch());
                }
                for (i, (ty, item)) in types.iter().zip(items).enumerate() {
                    ty.validate_at(item, env, &format!("{path}[{i}]"))?;
                }
                Ok(())
            }
            Self::Record(fields) => {
                let object = value.as_object().ok_or_else(mismatch)?;
                if let Some(unknown) = object
                    .keys()
                    .find(|key| !fields.iter().any(|f| &f.name == *key))
                {
                    return Err(SchemaError::UnknownField {
                        path: path.to_string(),
                        field: unknown.clone(),
                    });
                }
                for field in fields {
                    let field_path = format!("{path}.{}", field.name);
                    match object.get(&field.name) {
                        Some(item) => field.ty.validate_at(item, env, &field_path)?,
                        None => field.ty.validate_at(&Value::Null, env, &field_path)?,
                    }
                }
                Ok(())
            }
            Self::Variant(cases) => {
                let (tag, payload) = match value {
                    Value::String(tag) => (tag.as_str(), &Value::Null),
                    Value::Object(map) if map.len() == 1 => match map.iter().next() {
                        Some((tag, payload)) => (tag.as_str(), payload),
                        None => return Err(mismatch()),
                    },
                    _ => return Err(mismatch()),
                };
                let Some(case) = cases.iter().find(|case| case.name == tag) else {
                    return Err(SchemaError::UnknownTag {
                        path: path.to_string(),
                        tag: tag.to_string(),
                    });
                };
                case.ty.validate_at(payload, env, &format!("{path}.{tag}"))
            }
            Self::Named(name) => env
                .get(name)
                .ok_or_else(|| SchemaError::Undefined(name.clone()))?
                .validate_at(value, env, path),
        }
    }

    /// Structural equality of `self` in `env` and `other` in `other_env`.
    ///
    /// Named references are followed; recursive definitions are compared
    /// coinductively.
    #[must_use]
    pub fn equivalent(&self, env: &TypeEnv, other: &Self, other_env: &TypeEnv) -> bool {
        let mut assumed = HashSet::new();
        equivalent_in(self, env, other, other_env, &mut assumed)
    }
}

fn sorted_fields<'a>(fields: impl IntoIterator<Item = (&'a str, IdlType)>) -> Vec<Field> {
    let mut fields: Vec<Field> = fields
        .into_iter()
        .map(|(name, ty)| Field {
            name: name.to_string(),
            ty,
        })
        .collect();
    fields.sort_by(|a, b| a.name.cmp(&b.name));
    fields
}

fn unsigned_within(value: &Value, max: impl Into<u64>) -> Option<()> {
    let max = max.into();
    value.as_u64().filter(|v| *v <= max).map(|_| ())
}

fn signed_within<T: Into<i64>>(value: &Value, min: T, max: T) -> Option<()> {
    let range = min.into()..=max.into();
    value.as_i64().filter(|v| range.contains(v)).map(|_| ())
}

fn describe(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => format!("bool {b}"),
        Value::Number(n) => format!("number {n}"),
        Value::String(s) => format!("string {s:?}"),
        Value::Array(items) => format!("array of {}", items.len()),
        Value::Object(_) => "object".to_string(),
    }
}

fn equivalent_in(
    a: &IdlType,
    env_a: &TypeEnv,
    b: &IdlType,
    env_b: &TypeEnv,
    assumed: &mut HashSet<(String, String)>,
) -> bool {
    use IdlType as T;

    match (a, b) {
        (T::Named(x), T::Named(y)) => {
            if !assumed.insert((x.clone(), y.clone())) {
                return true;
            }
            match (env_a.get(x), env_b.get(y)) {
                (Some(ta), Some(tb)) => equivalent_in(ta, env_a, tb, env_b, assumed),
                _ => false,
            }
        }
        (T::Named(x), other) => env_a
            .get(x)
            .is_some_and(|ta| equivalent_in(ta, env_a, other, env_b, assumed)),
        (other, T::Named(y)) => env_b
            .get(y)
            .is_some_and(|tb| equivalent_in(other, env_a, tb, env_b, assumed)),
        (T::Opt(x), T::Opt(y)) | (T::Vec(x), T::Vec(y)) => {
            equivalent_in(x, env_a, y, env_b, assumed)
        }
        (T::Tuple(xs), T::Tuple(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .zip(ys)
                    .all(|(x, y)| equivalent_in(x, env_a, y, env_b, assumed))
        }
        (T::Record(xs), T::Record(ys)) | (T::Variant(xs), T::Variant(ys)) => {
            let same_names = xs.iter().map(|f| &f.name).eq(ys.iter().map(|f| &f.name));
            same_names
                && xs
                    .iter()
                    .zip(ys)
                    .all(|(x, y)| equivalent_in(&x.ty, env_a, &y.ty, env_b, assumed))
        }
        (x, y) => x == y,
    }
}

impl fmt::Display for IdlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool => f.write_str("bool"),
            Self::Nat => f.write_str("nat"),
            Self::Nat8 => f.write_str("nat8"),
            Self::Nat16 => f.write_str("nat16"),
            Self::Nat32 => f.write_str("nat32"),
            Self::Nat64 => f.write_str("nat64"),
            Self::Int => f.write_str("int"),
            Self::Int8 => f.write_str("int8"),
            Self::Int16 => f.write_str("int16"),
            Self::Int32 => f.write_str("int32"),
            Self::Int64 => f.write_str("int64"),
            Self::Float64 => f.write_str("float64"),
            Self::Text => f.write_str("text"),
            Self::Principal => f.write_str("principal"),
            Self::Opt(inner) => write!(f, "opt {inner}"),
            Self::Vec(inner) => write!(f, "vec {inner}"),
            Self::Tuple(items) => {
                f.write_str("record {")?;
                for (i, item) in items.iter().enumerate() {
                    let sep = if i + 1 == items.len() { "" } else { ";" };
                    write!(f, " {item}{sep}")?;
                }
                f.write_str(" }")
            }
            Self::Record(fields) | Self::Variant(fields) => {
                let keyword = if matches!(self, Self::Record(_)) {
                    "record"
                } else {
                    "variant"
                };
                write!(f, "{keyword} {{")?;
                for field in fields {
                    if field.ty == Self::Null && keyword == "variant" {
                        write!(f, " {};", field.name)?;
                    } else {
                        write!(f, " {} : {};", field.name, field.ty)?;
                    }
                }
                f.write_str(" }")
            }
            Self::Named(name) => f.write_str(name),
        }
    }
}

/// Named type definitions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeEnv {
    definitions: BTreeMap<String, IdlType>,
}

impl TypeEnv {
    /// Create an empty environment.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a definition.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&IdlType> {
        self.definitions.get(name)
    }

    /// Insert or replace a definition.
    pub fn insert(&mut self, name: impl Into<String>, ty: IdlType) {
        self.definitions.insert(name.into(), ty);
    }

    /// Define `name` once and return a reference to it.
    ///
    /// The name is reserved before `build` runs, so a definition may refer to
    /// itself.
    pub fn define(&mut self, name: &str, build: impl FnOnce(&mut Self) -> IdlType) -> IdlType {
        if !self.definitions.contains_key(name) {
            self.definitions.insert(name.to_string(), IdlType::Null);
            let ty = build(self);
            self.definitions.insert(name.to_string(), ty);
        }
        IdlType::named(name)
    }

    /// Iterate definitions in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &IdlType)> {
        self.definitions
            .iter()
            .map(|(name, ty)| (name.as_str(), ty))
    }

    /// Number of definitions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Whether the environment has no definitions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

/// Whether a method reads or mutates state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FuncMode {
    /// Read-only
    Query,
    /// State-changing
    Update,
}

/// A remote method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Method {
    /// Method name on the wire
    pub name: String,
    /// Argument types
    pub args: Vec<IdlType>,
    /// Return types
    pub rets: Vec<IdlType>,
    /// Call mode
    pub mode: FuncMode,
}

/// Complete description of a service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceSchema {
    /// Named definitions shared by methods and init
    pub env: TypeEnv,
    /// Initialization argument types
    pub init: Vec<IdlType>,
    /// Methods sorted by name
    pub methods: Vec<Method>,
}

impl ServiceSchema {
    /// Find a method by wire name.
    #[must_use]
    pub fn method(&self, name: &str) -> Option<&Method> {
        self.methods
            .binary_search_by(|m| m.name.as_str().cmp(name))
            .ok()
            .map(|i| &self.methods[i])
    }
}

/// Schema validation failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// Value does not have the expected shape
    #[error("at {path}: expected {expected}, found {found}")]
    Mismatch {
        /// JSON path
        path: String,
        /// Expected type
        expected: String,
        /// Description of the value found
        found: String,
    },

    /// Record carries a field the type does not declare
    #[error("at {path}: unknown field `{field}`")]
    UnknownField {
        /// JSON path
        path: String,
        /// Offending field
        field: String,
    },

    /// Variant tag not declared by the type
    #[error("at {path}: unknown variant tag `{tag}`")]
    UnknownTag {
        /// JSON path
        path: String,
        /// Offending tag
        tag: String,
    },

    /// Named type missing from the environment
    #[error("undefined type `{0}`")]
    Undefined(String),

    /// Wrong number of arguments
    #[error("expected {expected} values, found {found}")]
    Arity {
        /// Declared count
        expected: usize,
        /// Supplied count
        found: usize,
    },
}

/// Validate a positional value list against a type list.
///
/// # Errors
///
/// Returns [`SchemaError::Arity`] on a count mismatch, otherwise the first
/// per-value error with the path prefixed by the position.
pub fn validate_values(
    types: &[IdlType],
    values: &[Value],
    env: &TypeEnv,
) -> Result<(), SchemaError> {
    if types.len() != values.len() {
        return Err(SchemaError::Arity {
            expected: types.len(),
            found: values.len(),
        });
    }
    for (i, (ty, value)) in types.iter().zip(values).enumerate() {
        ty.validate_at(value, env, &format!("${i}"))?;
    }
    Ok(())
}

/// Types that know their shape on the call surface.
pub trait IdlSchema {
    /// Return the type, registering any named definitions in `env`.
    fn idl_type(env: &mut TypeEnv) -> IdlType;
}

/// Positional value lists (method arguments and returns).
pub trait IdlArgs {
    /// Return the type list, registering any named definitions in `env`.
    fn idl_args(env: &mut TypeEnv) -> Vec<IdlType>;
}

macro_rules! primitive_schema {
    ($($rust:ty => $idl:ident),* $(,)?) => {
        $(
            impl IdlSchema for $rust {
                fn idl_type(_env: &mut TypeEnv) -> IdlType {
                    IdlType::$idl
                }
            }
        )*
    };
}

primitive_schema! {
    () => Null,
    bool => Bool,
    u8 => Nat8,
    u16 => Nat16,
    u32 => Nat32,
    u64 => Nat64,
    i8 => Int8,
    i16 => Int16,
    i32 => Int32,
    i64 => Int64,
    f64 => Float64,
    String => Text,
    Nat => Nat,
    Int => Int,
    Principal => Principal,
}

impl<T: IdlSchema> IdlSchema for Option<T> {
    fn idl_type(env: &mut TypeEnv) -> IdlType {
        IdlType::opt(T::idl_type(env))
    }
}

impl<T: IdlSchema> IdlSchema for Vec<T> {
    fn idl_type(env: &mut TypeEnv) -> IdlType {
        IdlType::vec(T::idl_type(env))
    }
}

impl<T: IdlSchema, E: IdlSchema> IdlSchema for Result<T, E> {
    fn idl_type(env: &mut TypeEnv) -> IdlType {
        IdlType::result(T::idl_type(env), E::idl_type(env))
    }
}

impl<A: IdlSchema, B: IdlSchema> IdlSchema for (A, B) {
    fn idl_type(env: &mut TypeEnv) -> IdlType {
        IdlType::tuple([A::idl_type(env), B::idl_type(env)])
    }
}

impl IdlArgs for () {
    fn idl_args(_env: &mut TypeEnv) -> Vec<IdlType> {
        Vec::new()
    }
}

impl<A: IdlSchema> IdlArgs for (A,) {
    fn idl_args(env: &mut TypeEnv) -> Vec<IdlType> {
        vec![A::idl_type(env)]
    }
}

impl<A: IdlSchema, B: IdlSchema> IdlArgs for (A, B) {
    fn idl_args(env: &mut TypeEnv) -> Vec<IdlType> {
        vec![A::idl_type(env), B::idl_type(env)]
    }
}

impl<A: IdlSchema, B: IdlSchema, C: IdlSchema> IdlArgs for (A, B, C) {
    fn idl_args(env: &mut TypeEnv) -> Vec<IdlType> {
        vec![A::idl_type(env), B::idl_type(env), C::idl_type(env)]
    }
}
