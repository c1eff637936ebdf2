use std::rc::Rc;

use hashbrown::HashMap;

use crate::values::Value;

/// Override bindings consulted before the scope chain when resolving
/// identifiers.
///
/// A renderer passes live values (props, signals) through here when it invokes
/// a [`NodeThunk`](crate::values::NodeThunk). Cloning is cheap; the mapping
/// itself is immutable once built.
#[derive(Clone, Default)]
pub struct Bindings<'a> {
    values: Option<Rc<HashMap<Rc<str>, Value<'a>>>>,
}

impl<'a> Bindings<'a> {
    pub fn new() -> Self {
        Self { values: None }
    }

    pub fn get(&self, name: &str) -> Option<&Value<'a>> {
        self.values.as_ref().and_then(|values| values.get(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.values.as_ref().is_none_or(|values| values.is_empty())
    }

    /// A copy of these bindings with `name` set to `value`.
    pub fn with(&self, name: impl Into<Rc<str>>, value: Value<'a>) -> Self {
        let mut values = self
            .values
            .as_ref()
            .map(|values| (**values).clone())
            .unwrap_or_default();
        values.insert(name.into(), value);
        Self {
            values: Some(Rc::new(values)),
        }
    }
}

impl<'a, K: Into<Rc<str>>> FromIterator<(K, Value<'a>)> for Bindings<'a> {
    fn from_iter<I: IntoIterator<Item = (K, Value<'a>)>>(iter: I) -> Self {
        let values: HashMap<Rc<str>, Value<'a>> =
            iter.into_iter().map(|(k, v)| (k.into(), v)).collect();
        Self {
            values: Some(Rc::new(values)),
        }
    }
}

impl<'a> core::fmt::Debug for Bindings<'a> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut map = f.debug_map();
        if let Some(values) = &self.values {
            for (k, v) in values.iter() {
                map.entry(k, v);
            }
        }
        map.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_does_not_mutate_original() {
        let base = Bindings::new().with("a", Value::from(1));
        let extended = base.with("b", Value::from(2));

        assert!(base.contains("a"));
        assert!(!base.contains("b"));
        assert!(extended.contains("a"));
        assert!(extended.contains("b"));
    }

    #[test]
    fn test_presence_not_truthiness() {
        let bindings: Bindings = [("zero", Value::from(0)), ("none", Value::Undefined)]
            .into_iter()
            .collect();
        assert!(bindings.contains("zero"));
        assert!(bindings.contains("none"));
        assert!(!bindings.contains("other"));
        assert!(Bindings::new().is_empty());
    }
}
