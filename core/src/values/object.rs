use std::rc::Rc;

use crate::values::{ClassId, Function, Value};

/// A property slot: either a plain value or a getter/setter pair.
#[derive(Clone, Debug)]
pub enum Property<'a> {
    Data {
        value: Value<'a>,
        enumerable: bool,
        writable: bool,
        configurable: bool,
    },
    Accessor {
        get: Option<Value<'a>>,
        set: Option<Value<'a>>,
        enumerable: bool,
        configurable: bool,
    },
}

impl<'a> Property<'a> {
    /// Writable, enumerable and configurable, as created by assignment.
    pub fn data(value: Value<'a>) -> Self {
        Property::Data {
            value,
            enumerable: true,
            writable: true,
            configurable: true,
        }
    }

    /// Writable but neither enumerable nor configurable; used for class methods
    /// and bookkeeping slots such as `super`.
    pub fn hidden(value: Value<'a>) -> Self {
        Property::Data {
            value,
            enumerable: false,
            writable: true,
            configurable: false,
        }
    }

    pub fn is_enumerable(&self) -> bool {
        match self {
            Property::Data { enumerable, .. } | Property::Accessor { enumerable, .. } => *enumerable,
        }
    }

    pub fn data_value(&self) -> Option<&Value<'a>> {
        match self {
            Property::Data { value, .. } => Some(value),
            Property::Accessor { .. } => None,
        }
    }
}

/// Insertion-ordered property table.
///
/// Objects in rendered markup rarely carry more than a handful of keys, so a
/// linear scan beats hashing here.
#[derive(Clone, Debug, Default)]
pub struct PropertyMap<'a> {
    entries: Vec<(Rc<str>, Property<'a>)>,
}

impl<'a> PropertyMap<'a> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Property<'a>> {
        self.entries
            .iter()
            .find(|(k, _)| &**k == key)
            .map(|(_, p)| p)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Property<'a>> {
        self.entries
            .iter_mut()
            .find(|(k, _)| &**k == key)
            .map(|(_, p)| p)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Inserts or replaces a property, keeping the original position of an
    /// existing key.
    pub fn insert(&mut self, key: impl Into<Rc<str>>, property: Property<'a>) {
        let key = key.into();
        match self.get_mut(&key) {
            Some(slot) => *slot = property,
            None => self.entries.push((key, property)),
        }
    }

    /// Stores `value` the way plain assignment would: an existing data slot keeps
    /// its attributes, anything else becomes a fresh enumerable data property.
    pub fn set_data(&mut self, key: impl Into<Rc<str>>, value: Value<'a>) {
        let key = key.into();
        match self.get_mut(&key) {
            Some(Property::Data { value: slot, .. }) => *slot = value,
            Some(slot) => *slot = Property::data(value),
            None => self.entries.push((key, Property::data(value))),
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<Property<'a>> {
        let index = self.entries.iter().position(|(k, _)| &**k == key)?;
        Some(self.entries.remove(index).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Rc<str>, &Property<'a>)> {
        self.entries.iter().map(|(k, p)| (k, p))
    }

    pub fn keys(&self) -> impl Iterator<Item = &Rc<str>> {
        self.entries.iter().map(|(k, _)| k)
    }

    pub fn enumerable_keys(&self) -> impl Iterator<Item = &Rc<str>> {
        self.entries
            .iter()
            .filter(|(_, p)| p.is_enumerable())
            .map(|(k, _)| k)
    }
}

/// A plain or class-instance object.
#[derive(Clone, Debug, Default)]
pub struct Object<'a> {
    pub properties: PropertyMap<'a>,
    /// Class whose prototype chain backs property lookups on this object.
    pub class: Option<ClassId>,
    /// Non-class constructor that created the object via `new`, for `instanceof`.
    pub constructor: Option<Rc<Function<'a>>>,
}

impl<'a> Object<'a> {
    pub fn new(properties: PropertyMap<'a>) -> Self {
        Self {
            properties,
            class: None,
            constructor: None,
        }
    }

    pub fn instance_of(class: ClassId) -> Self {
        Self {
            properties: PropertyMap::new(),
            class: Some(class),
            constructor: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_keeps_position() {
        let mut map = PropertyMap::new();
        map.set_data("a", Value::from(1));
        map.set_data("b", Value::from(2));
        map.set_data("a", Value::from(3));

        let keys: Vec<&str> = map.keys().map(|k| &**k).collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(map.get("a").and_then(|p| p.data_value()).and_then(|v| v.as_number()), Some(3.0));
    }

    #[test]
    fn test_hidden_properties_are_not_enumerable() {
        let mut map = PropertyMap::new();
        map.insert("super", Property::hidden(Value::Null));
        map.set_data("x", Value::Null);

        let keys: Vec<&str> = map.enumerable_keys().map(|k| &**k).collect();
        assert_eq!(keys, vec!["x"]);
        assert!(map.contains_key("super"));
    }

    #[test]
    fn test_set_data_keeps_attributes() {
        let mut map = PropertyMap::new();
        map.insert("m", Property::hidden(Value::Null));
        map.set_data("m", Value::from(1));
        assert!(!map.get("m").is_some_and(|p| p.is_enumerable()));
    }

    #[test]
    fn test_remove() {
        let mut map = PropertyMap::new();
        map.set_data("a", Value::from(1));
        assert!(map.remove("a").is_some());
        assert!(map.remove("a").is_none());
        assert!(map.is_empty());
    }
}
