//! Lexical scope chain for variable bindings.
//!
//! Frames are reference-counted and linked innermost-to-outermost, so a
//! closure (or a JSX child thunk) can keep the chain it was created in alive
//! and re-enter it later. Each frame owns the variables declared in it.
//!
//! ```text
//! global ── function ── block      <- current
//!    └───── component ── block     <- captured by a thunk
//! ```

use core::cell::RefCell;
use core::fmt;
use std::rc::Rc;

use hashbrown::HashMap;

use crate::ast::DeclarationKind;
use crate::values::{ClassId, Value};

/// A declared variable.
#[derive(Clone, Debug)]
pub struct Variable<'a> {
    pub name: Rc<str>,
    pub value: Value<'a>,
    pub kind: DeclarationKind,
}

/// Error from declaring or assigning a binding.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScopeError {
    #[error("Identifier '{0}' has already been declared")]
    AlreadyDeclared(String),
    #[error("Assignment to constant variable '{0}'")]
    ConstAssignment(String),
    #[error("{0} is not defined")]
    NotDefined(String),
}

pub struct Frame<'a> {
    vars: RefCell<HashMap<Rc<str>, Variable<'a>>>,
    /// Class whose methods run in this frame; resolves `super`.
    home: Option<ClassId>,
    parent: Option<Rc<Frame<'a>>>,
}

impl<'a> Frame<'a> {
    /// The outermost frame, holding globals.
    pub fn root() -> Rc<Self> {
        Rc::new(Self {
            vars: RefCell::new(HashMap::new()),
            home: None,
            parent: None,
        })
    }

    pub fn child(parent: &Rc<Self>) -> Rc<Self> {
        Self::child_with_home(parent, None)
    }

    pub fn child_with_home(parent: &Rc<Self>, home: Option<ClassId>) -> Rc<Self> {
        Rc::new(Self {
            vars: RefCell::new(HashMap::new()),
            home,
            parent: Some(parent.clone()),
        })
    }

    pub fn parent(&self) -> Option<&Rc<Frame<'a>>> {
        self.parent.as_ref()
    }

    /// Innermost enclosing class, if any.
    pub fn home(&self) -> Option<ClassId> {
        let mut frame = Some(self);
        while let Some(f) = frame {
            if f.home.is_some() {
                return f.home;
            }
            frame = f.parent.as_deref();
        }
        None
    }

    /// Searches innermost-to-outermost.
    pub fn lookup(&self, name: &str) -> Option<Variable<'a>> {
        let mut frame = Some(self);
        while let Some(f) = frame {
            if let Some(var) = f.vars.borrow().get(name) {
                return Some(var.clone());
            }
            frame = f.parent.as_deref();
        }
        None
    }

    pub fn contains_own(&self, name: &str) -> bool {
        self.vars.borrow().contains_key(name)
    }

    /// Declares `name` in this frame.
    ///
    /// `var` may be redeclared (the value is replaced); any redeclaration
    /// involving `let` or `const` fails.
    pub fn declare(
        &self,
        name: &str,
        value: Value<'a>,
        kind: DeclarationKind,
    ) -> Result<(), ScopeError> {
        let mut vars = self.vars.borrow_mut();
        if let Some(existing) = vars.get_mut(name) {
            if existing.kind != DeclarationKind::Var || kind != DeclarationKind::Var {
                return Err(ScopeError::AlreadyDeclared(name.to_string()));
            }
            existing.value = value;
            return Ok(());
        }
        let name: Rc<str> = Rc::from(name);
        vars.insert(name.clone(), Variable { name, value, kind });
        Ok(())
    }

    /// Assigns to the nearest frame declaring `name`.
    pub fn assign(&self, name: &str, value: Value<'a>) -> Result<(), ScopeError> {
        let mut frame = Some(self);
        while let Some(f) = frame {
            if let Some(var) = f.vars.borrow_mut().get_mut(name) {
                if var.kind == DeclarationKind::Const {
                    return Err(ScopeError::ConstAssignment(name.to_string()));
                }
                var.value = value;
                return Ok(());
            }
            frame = f.parent.as_deref();
        }
        Err(ScopeError::NotDefined(name.to_string()))
    }

    /// Number of frames from the root, the root itself being 0.
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut frame = self.parent.as_deref();
        while let Some(f) = frame {
            depth += 1;
            frame = f.parent.as_deref();
        }
        depth
    }

    /// Names declared directly in this frame, sorted.
    pub fn own_names(&self) -> Vec<Rc<str>> {
        let mut names: Vec<Rc<str>> = self.vars.borrow().keys().cloned().collect();
        names.sort_unstable();
        names
    }
}

impl<'a> fmt::Debug for Frame<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Frame")
            .field("names", &self.own_names())
            .field("depth", &self.depth())
            .finish()
    }
}
