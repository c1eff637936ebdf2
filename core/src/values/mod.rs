mod bindings;
pub mod coerce;
mod function;
mod node;
mod object;
mod value;

pub use bindings::Bindings;
pub use coerce::number_to_string;
pub use function::{BoundFunction, ClassId, Closure, Function, FunctionKind, NativeFn, NativeFunction};
pub use node::{Component, ElementNode, FragmentNode, JsxNode, NodeThunk, Text, ThunkKind};
pub use object::{Object, Property, PropertyMap};
pub use value::Value;

pub(crate) use value::escape_string;
