//! Runtime values.
//!
//! `Object` is a cheap-to-clone value: aggregates and functions sit behind
//! `Rc`, so copying an object never deep-copies an array or a closure.

use std::fmt;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::ast::{BlockStatement, Identifier};
use crate::env::Env;

pub const TRUE: Object = Object::Boolean(true);
pub const FALSE: Object = Object::Boolean(false);
pub const NULL: Object = Object::Null;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectType {
    Integer,
    Boolean,
    Null,
    String,
    Array,
    Hash,
    Function,
    Builtin,
    ReturnValue,
    Error,
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ObjectType::Integer => "integer",
            ObjectType::Boolean => "boolean",
            ObjectType::Null => "null",
            ObjectType::String => "string",
            ObjectType::Array => "array",
            ObjectType::Hash => "hash",
            ObjectType::Function => "func",
            ObjectType::Builtin => "builtin",
            ObjectType::ReturnValue => "returnValue",
            ObjectType::Error => "error",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone)]
pub enum Object {
    Integer(i64),
    Boolean(bool),
    Null,
    String(String),
    Array(Rc<Vec<Object>>),
    Hash(Rc<HashObject>),
    Function(Rc<Function>),
    Builtin(BuiltinFunction),
    ReturnValue(Box<Object>),
    Error(String),
}

impl Object {
    pub fn from_bool(value: bool) -> Object {
        if value {
            TRUE
        } else {
            FALSE
        }
    }

    pub fn error(message: impl Into<String>) -> Object {
        Object::Error(message.into())
    }

    pub fn object_type(&self) -> ObjectType {
        match self {
            Object::Integer(_) => ObjectType::Integer,
            Object::Boolean(_) => ObjectType::Boolean,
            Object::Null => ObjectType::Null,
            Object::String(_) => ObjectType::String,
            Object::Array(_) => ObjectType::Array,
            Object::Hash(_) => ObjectType::Hash,
            Object::Function(_) => ObjectType::Function,
            Object::Builtin(_) => ObjectType::Builtin,
            Object::ReturnValue(_) => ObjectType::ReturnValue,
            Object::Error(_) => ObjectType::Error,
        }
    }

    /// Only `null` and `false` are falsy.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Object::Null | Object::Boolean(false))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Object::Error(_))
    }

    /// The key this value hashes under, or `None` when the kind cannot be
    /// used as a hash key.
    pub fn hash_key(&self) -> Option<HashKey> {
        match self {
            Object::Integer(value) => Some(HashKey::Integer(*value)),
            Object::Boolean(value) => Some(HashKey::Boolean(*value)),
            Object::String(value) => Some(HashKey::String(value.clone())),
            _ => None,
        }
    }
}

impl PartialEq for Object {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Object::Null, Object::Null) => true,
            (Object::Integer(a), Object::Integer(b)) => a == b,
            (Object::Boolean(a), Object::Boolean(b)) => a == b,
            (Object::String(a), Object::String(b)) => a == b,
            (Object::Array(a), Object::Array(b)) => a == b,
            (Object::Hash(a), Object::Hash(b)) => a == b,
            (Object::ReturnValue(a), Object::ReturnValue(b)) => a == b,
            (Object::Error(a), Object::Error(b)) => a == b,
            // functions and builtins have no identity to compare
            _ => false,
        }
    }
}

impl fmt::Display for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Object::Integer(value) => write!(f, "{}", value),
            Object::Boolean(value) => write!(f, "{}", value),
            Object::Null => f.write_str("null"),
            Object::String(value) => f.write_str(value),
            Object::Array(elements) => {
                let elements: Vec<String> = elements.iter().map(|e| e.to_string()).collect();
                write!(f, "[{}]", elements.join(", "))
            }
            Object::Hash(hash) => {
                let pairs: Vec<String> = hash.iter().map(|p| format!("{}: {}", p.key, p.value)).collect();
                write!(f, "{{{}}}", pairs.join(", "))
            }
            Object::Function(func) => write!(f, "{}", func),
            Object::Builtin(builtin) => write!(f, "builtin function {}", builtin.name),
            Object::ReturnValue(value) => write!(f, "{}", value),
            Object::Error(message) => write!(f, "ERROR: {}", message),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum HashKey {
    Integer(i64),
    Boolean(bool),
    String(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct HashPair {
    pub key: Object,
    pub value: Object,
}

/// Hash map value. Lookups go through `index`; `pairs` keeps insertion order
/// for display.
#[derive(Debug, Clone, Default)]
pub struct HashObject {
    index: FxHashMap<HashKey, usize>,
    pairs: Vec<HashPair>,
}

impl HashObject {
    pub fn new() -> Self {
        HashObject::default()
    }

    /// Inserts a pair. Re-inserting an existing key replaces its value in place.
    pub fn insert(&mut self, hash_key: HashKey, key: Object, value: Object) {
        match self.index.get(&hash_key) {
            Some(&slot) => self.pairs[slot].value = value,
            None => {
                self.index.insert(hash_key, self.pairs.len());
                self.pairs.push(HashPair { key, value });
            }
        }
    }

    pub fn get(&self, key: &HashKey) -> Option<&Object> {
        self.index.get(key).map(|&slot| &self.pairs[slot].value)
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &HashPair> {
        self.pairs.iter()
    }
}

impl PartialEq for HashObject {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .index
                .iter()
                .all(|(key, &slot)| other.get(key) == Some(&self.pairs[slot].value))
    }
}

/// A closure: the literal's parameters and body plus the frame it was
/// created in.
pub struct Function {
    pub parameters: Rc<Vec<Identifier>>,
    pub body: Rc<BlockStatement>,
    pub env: Env,
}

// The captured frame can reach this function again, so it stays out of Debug.
impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("parameters", &self.parameters)
            .field("body", &self.body.to_string())
            .finish()
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let params: Vec<&str> = self.parameters.iter().map(|p| p.value.as_str()).collect();
        write!(f, "fn({}) {{{}}}", params.join(", "), self.body)
    }
}

pub type BuiltinFn = fn(Vec<Object>) -> Object;

#[derive(Clone, Copy)]
pub struct BuiltinFunction {
    pub name: &'static str,
    pub func: BuiltinFn,
}

impl BuiltinFunction {
    pub const fn new(name: &'static str, func: BuiltinFn) -> Self {
        BuiltinFunction { name, func }
    }

    pub fn call(&self, args: Vec<Object>) -> Object {
        (self.func)(args)
    }
}

impl fmt::Debug for BuiltinFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BuiltinFunction({})", self.name)
    }
}
