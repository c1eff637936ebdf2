use core::cell::RefCell;
use core::fmt;
use std::rc::Rc;

use crate::values::{
    Function, FunctionKind, JsxNode, Object, PropertyMap,
    coerce::{number_to_string, to_string},
};

/// Runtime value.
///
/// Arrays, objects and functions are shared by reference; cloning a `Value`
/// never copies their contents.
#[derive(Clone, Default)]
pub enum Value<'a> {
    #[default]
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    String(Rc<str>),
    Array(Rc<RefCell<Vec<Value<'a>>>>),
    Object(Rc<RefCell<Object<'a>>>),
    Function(Rc<Function<'a>>),
    Node(Rc<JsxNode<'a>>),
}

impl<'a> Value<'a> {
    pub fn string(s: impl Into<Rc<str>>) -> Self {
        Value::String(s.into())
    }

    pub fn array(elements: Vec<Value<'a>>) -> Self {
        Value::Array(Rc::new(RefCell::new(elements)))
    }

    pub fn object(properties: PropertyMap<'a>) -> Self {
        Value::Object(Rc::new(RefCell::new(Object::new(properties))))
    }

    /// An object holding the given enumerable data properties, in order.
    pub fn from_entries<K, I>(entries: I) -> Self
    where
        K: Into<Rc<str>>,
        I: IntoIterator<Item = (K, Value<'a>)>,
    {
        let mut properties = PropertyMap::new();
        for (key, value) in entries {
            properties.set_data(key, value);
        }
        Value::object(properties)
    }

    pub fn function(function: Function<'a>) -> Self {
        Value::Function(Rc::new(function))
    }

    pub fn is_nullish(&self) -> bool {
        matches!(self, Value::Undefined | Value::Null)
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    pub fn is_callable(&self) -> bool {
        matches!(self, Value::Function(_))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&Rc<Function<'a>>> {
        match self {
            Value::Function(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_node(&self) -> Option<&Rc<JsxNode<'a>>> {
        match self {
            Value::Node(node) => Some(node),
            _ => None,
        }
    }

    /// Result of the `typeof` operator.
    pub fn type_of(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null | Value::Array(_) | Value::Object(_) | Value::Node(_) => "object",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Function(_) => "function",
        }
    }

    /// `===`: primitives by value, everything else by identity.
    pub fn strict_equals(&self, other: &Value<'a>) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => Rc::ptr_eq(a, b),
            (Value::Object(a), Value::Object(b)) => Rc::ptr_eq(a, b),
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            (Value::Node(a), Value::Node(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Like `===` but `NaN` equals itself; used by `includes`.
    pub fn same_value_zero(&self, other: &Value<'a>) -> bool {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) if a.is_nan() && b.is_nan() => true,
            _ => self.strict_equals(other),
        }
    }

    /// Developer-facing rendering used by `console.*` and the CLI: strings are
    /// quoted inside containers, objects list their enumerable data properties.
    pub fn inspect(&self) -> String {
        let mut out = String::new();
        inspect_into(self, &mut out, 0, true);
        out
    }
}

const MAX_INSPECT_DEPTH: usize = 4;

fn inspect_into(value: &Value<'_>, out: &mut String, depth: usize, top: bool) {
    match value {
        Value::String(s) if top => out.push_str(s),
        Value::String(s) => {
            out.push('"');
            out.push_str(&escape_string(s));
            out.push('"');
        }
        Value::Array(elements) => {
            if depth >= MAX_INSPECT_DEPTH {
                out.push_str("[Array]");
                return;
            }
            out.push('[');
            for (i, element) in elements.borrow().iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                inspect_into(element, out, depth + 1, false);
            }
            out.push(']');
        }
        Value::Object(object) => {
            if depth >= MAX_INSPECT_DEPTH {
                out.push_str("[Object]");
                return;
            }
            let object = object.borrow();
            let mut first = true;
            out.push('{');
            for (key, property) in object.properties.iter() {
                if !property.is_enumerable() {
                    continue;
                }
                out.push_str(if first { " " } else { ", " });
                first = false;
                out.push_str(key);
                out.push_str(": ");
                match property.data_value() {
                    Some(v) => inspect_into(v, out, depth + 1, false),
                    None => out.push_str("[Getter/Setter]"),
                }
            }
            out.push_str(if first { "}" } else { " }" });
        }
        Value::Function(f) => match &f.kind {
            FunctionKind::Class(_) => out.push_str(&format!("[class {}]", f.display_name())),
            _ => out.push_str(&format!("[Function: {}]", f.display_name())),
        },
        Value::Node(node) => out.push_str(&format!("{:?}", node)),
        other => out.push_str(&to_string(other)),
    }
}

/// Escape special characters for a double-quoted string literal.
pub(crate) fn escape_string(s: &str) -> String {
    s.chars()
        .flat_map(|c| match c {
            '"' => vec!['\\', '"'],
            '\\' => vec!['\\', '\\'],
            '\n' => vec!['\\', 'n'],
            '\r' => vec!['\\', 'r'],
            '\t' => vec!['\\', 't'],
            c if c.is_control() => format!("\\u{:04x}", c as u32).chars().collect(),
            c => vec![c],
        })
        .collect()
}

impl<'a> fmt::Debug for Value<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{}", number_to_string(*n)),
            Value::String(s) => write!(f, "\"{}\"", escape_string(s)),
            other => f.write_str(&other.inspect()),
        }
    }
}

/// Same as `String(value)` for values that need no user code to convert.
impl<'a> fmt::Display for Value<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&to_string(self))
    }
}

impl<'a> From<bool> for Value<'a> {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl<'a> From<f64> for Value<'a> {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl<'a> From<i32> for Value<'a> {
    fn from(n: i32) -> Self {
        Value::Number(n as f64)
    }
}

impl<'a> From<usize> for Value<'a> {
    fn from(n: usize) -> Self {
        Value::Number(n as f64)
    }
}

impl<'a> From<&str> for Value<'a> {
    fn from(s: &str) -> Self {
        Value::String(Rc::from(s))
    }
}

impl<'a> From<String> for Value<'a> {
    fn from(s: String) -> Self {
        Value::String(Rc::from(s))
    }
}

impl<'a> From<Rc<str>> for Value<'a> {
    fn from(s: Rc<str>) -> Self {
        Value::String(s)
    }
}

impl<'a> From<JsxNode<'a>> for Value<'a> {
    fn from(node: JsxNode<'a>) -> Self {
        Value::Node(Rc::new(node))
    }
}
