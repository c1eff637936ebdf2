//! Statement execution.
//!
//! Control flow is expressed through [`Completion`] values rather than
//! unwinding: `break`, `continue` and `return` travel up the statement
//! evaluator as ordinary return values until a loop, labeled statement or
//! function boundary consumes them.

use tracing::{debug, trace};

use crate::ast::{
    CatchClause, DeclarationKind, ExprKind, ForHead, ForInit, Program, Stmt, StmtKind, SwitchCase,
    VariableDeclaration,
};
use crate::evaluator::{Context, EvalError};
use crate::stack::ensure_sufficient_stack;
use crate::values::{Bindings, Value, coerce::to_boolean};

/// How a statement finished.
#[derive(Debug, Clone)]
pub enum Completion<'a> {
    Normal,
    Break(Option<&'a str>),
    Continue(Option<&'a str>),
    Return(Value<'a>),
}

/// What a loop does with the completion of one iteration.
enum Flow<'a> {
    Next,
    Exit,
    Propagate(Completion<'a>),
}

fn loop_flow<'a>(completion: Completion<'a>, label: Option<&'a str>) -> Flow<'a> {
    match completion {
        Completion::Normal | Completion::Continue(None) => Flow::Next,
        Completion::Break(None) => Flow::Exit,
        Completion::Continue(Some(l)) if Some(l) == label => Flow::Next,
        Completion::Break(Some(l)) if Some(l) == label => Flow::Exit,
        other => Flow::Propagate(other),
    }
}

impl<'a> Context<'a> {
    /// Runs a program in module mode and returns the value of the last
    /// top-level expression statement.
    pub fn exec_program(
        &mut self,
        program: &'a Program<'a>,
        bindings: &Bindings<'a>,
    ) -> Result<Value<'a>, EvalError<'a>> {
        debug!(statements = program.body.len(), "executing program");
        self.hoist_declarations(program.body, bindings)?;
        let mut last = Value::Undefined;
        for stmt in program.body {
            if let StmtKind::Expression(expr) = stmt.kind {
                last = self
                    .eval_expr(expr, bindings)
                    .map_err(|e| e.at(&stmt.loc, "ExpressionStatement"))?;
                continue;
            }
            match self.exec_stmt(stmt, bindings)? {
                Completion::Normal => {}
                Completion::Return(value) => return Ok(value),
                Completion::Break(_) | Completion::Continue(_) => break,
            }
        }
        Ok(last)
    }

    /// Executes a statement list in the current frame, after hoisting its
    /// function declarations.
    pub fn exec_statements(
        &mut self,
        statements: &'a [Stmt<'a>],
        bindings: &Bindings<'a>,
    ) -> Result<Completion<'a>, EvalError<'a>> {
        self.hoist_declarations(statements, bindings)?;
        for stmt in statements {
            match self.exec_stmt(stmt, bindings)? {
                Completion::Normal => {}
                abrupt => return Ok(abrupt),
            }
        }
        Ok(Completion::Normal)
    }

    fn hoist_declarations(
        &mut self,
        statements: &'a [Stmt<'a>],
        bindings: &Bindings<'a>,
    ) -> Result<(), EvalError<'a>> {
        for stmt in statements {
            let def = match stmt.kind {
                StmtKind::FunctionDeclaration(def) => def,
                StmtKind::ExportDeclaration(&Stmt {
                    kind: StmtKind::FunctionDeclaration(def),
                    ..
                }) => def,
                _ => continue,
            };
            let Some(name) = def.id else {
                continue;
            };
            trace!(name, "hoisting function");
            let function = self
                .make_closure(def, bindings, None)
                .map_err(|e| e.at(&stmt.loc, "FunctionDeclaration"))?;
            self.declare(name, function, DeclarationKind::Var)?;
        }
        Ok(())
    }

    pub fn exec_stmt(
        &mut self,
        stmt: &'a Stmt<'a>,
        bindings: &Bindings<'a>,
    ) -> Result<Completion<'a>, EvalError<'a>> {
        ensure_sufficient_stack(|| self.exec_stmt_inner(stmt, bindings))
            .map_err(|e| e.at(&stmt.loc, stmt_kind_name(&stmt.kind)))
    }

    fn exec_stmt_inner(
        &mut self,
        stmt: &'a Stmt<'a>,
        bindings: &Bindings<'a>,
    ) -> Result<Completion<'a>, EvalError<'a>> {
        match stmt.kind {
            StmtKind::Expression(expr) => {
                self.eval_expr(expr, bindings)?;
                Ok(Completion::Normal)
            }
            StmtKind::Block(body) => {
                let mut scope = self.push_scope();
                scope.exec_statements(body, bindings)
            }
            StmtKind::Empty | StmtKind::Debugger => Ok(Completion::Normal),
            StmtKind::VariableDeclaration(decl) => {
                self.exec_var_decl(decl, bindings)?;
                Ok(Completion::Normal)
            }
            // Hoisted.
            StmtKind::FunctionDeclaration(_) => Ok(Completion::Normal),
            StmtKind::ClassDeclaration(def) => {
                let class = self.build_class(def, bindings)?;
                if let Some(name) = def.id {
                    self.declare(name, class, DeclarationKind::Const)?;
                }
                Ok(Completion::Normal)
            }
            StmtKind::If {
                test,
                consequent,
                alternate,
            } => {
                if to_boolean(&self.eval_expr(test, bindings)?) {
                    self.exec_stmt(consequent, bindings)
                } else if let Some(alternate) = alternate {
                    self.exec_stmt(alternate, bindings)
                } else {
                    Ok(Completion::Normal)
                }
            }
            StmtKind::For {
                ref init,
                test,
                update,
                body,
            } => self.exec_for(init.as_ref(), test, update, body, bindings),
            StmtKind::ForIn {
                ref left,
                right,
                body,
            } => {
                let label = self.label.take();
                let object = self.eval_expr(right, bindings)?;
                let keys = self
                    .enumerate_keys(&object)
                    .into_iter()
                    .map(Value::String)
                    .collect();
                self.exec_for_each(label, left, keys, body, bindings)
            }
            StmtKind::ForOf {
                ref left,
                right,
                body,
            } => {
                let label = self.label.take();
                let iterable = self.eval_expr(right, bindings)?;
                let items = self.iterate(&iterable)?;
                self.exec_for_each(label, left, items, body, bindings)
            }
            StmtKind::While { test, body } => {
                let label = self.label.take();
                while to_boolean(&self.eval_expr(test, bindings)?) {
                    match loop_flow(self.exec_stmt(body, bindings)?, label) {
                        Flow::Next => {}
                        Flow::Exit => break,
                        Flow::Propagate(completion) => return Ok(completion),
                    }
                }
                Ok(Completion::Normal)
            }
            StmtKind::DoWhile { body, test } => {
                let label = self.label.take();
                loop {
                    match loop_flow(self.exec_stmt(body, bindings)?, label) {
                        Flow::Next => {}
                        Flow::Exit => break,
                        Flow::Propagate(completion) => return Ok(completion),
                    }
                    if !to_boolean(&self.eval_expr(test, bindings)?) {
                        break;
                    }
                }
                Ok(Completion::Normal)
            }
            StmtKind::Break(label) => Ok(Completion::Break(label)),
            StmtKind::Continue(label) => Ok(Completion::Continue(label)),
            StmtKind::Return(argument) => {
                let value = match argument {
                    Some(expr) => self.eval_expr(expr, bindings)?,
                    None => Value::Undefined,
                };
                Ok(Completion::Return(value))
            }
            StmtKind::Throw(argument) => {
                let value = self.eval_expr(argument, bindings)?;
                Err(EvalError::thrown(value))
            }
            StmtKind::Try {
                block,
                ref handler,
                finalizer,
            } => {
                let result = {
                    let mut scope = self.push_scope();
                    scope.exec_statements(block, bindings)
                };
                let result = match (result, handler) {
                    (Err(error), Some(handler)) if error.is_catchable() => {
                        debug!(error = %error, "caught");
                        let value = self.error_value(error);
                        self.exec_catch(handler, value, bindings)
                    }
                    (result, _) => result,
                };
                if let Some(finalizer) = finalizer {
                    let mut scope = self.push_scope();
                    match scope.exec_statements(finalizer, bindings)? {
                        Completion::Normal => {}
                        abrupt => return Ok(abrupt),
                    }
                }
                result
            }
            StmtKind::Switch {
                discriminant,
                cases,
            } => self.exec_switch(discriminant, cases, bindings),
            StmtKind::Labeled { label, body } => {
                if is_loop(body) {
                    self.label = Some(label);
                    let completion = self.exec_stmt(body, bindings);
                    self.label = None;
                    return match completion? {
                        Completion::Break(Some(l)) if l == label => Ok(Completion::Normal),
                        other => Ok(other),
                    };
                }
                self.label = None;
                match self.exec_stmt(body, bindings)? {
                    Completion::Break(None) => Ok(Completion::Normal),
                    Completion::Break(Some(l)) if l == label => Ok(Completion::Normal),
                    other => Ok(other),
                }
            }
            StmtKind::With { .. } => Err(EvalError::unsupported("with")),
            StmtKind::Import => Err(EvalError::unsupported("import")),
            StmtKind::ExportAll => Err(EvalError::unsupported("export all")),
            StmtKind::ExportNamed { specifiers, .. } => {
                for specifier in specifiers {
                    let value = self.lookup(specifier.local, bindings).unwrap_or_default();
                    self.set_export(specifier.exported, value);
                }
                Ok(Completion::Normal)
            }
            StmtKind::ExportDeclaration(declaration) => {
                let completion = self.exec_stmt(declaration, bindings)?;
                for name in declared_names(declaration) {
                    let value = self.lookup(name, bindings).unwrap_or_default();
                    self.set_export(name, value);
                }
                Ok(completion)
            }
            StmtKind::ExportDefault(expr) => {
                let value = self.eval_expr(expr, bindings)?;
                match expr.kind {
                    ExprKind::Function(def) => {
                        if let Some(name) = def.id {
                            self.declare(name, value.clone(), DeclarationKind::Var)?;
                        }
                    }
                    ExprKind::Class(def) => {
                        if let Some(name) = def.id {
                            self.declare(name, value.clone(), DeclarationKind::Const)?;
                        }
                    }
                    _ => {}
                }
                self.set_export("default", value);
                Ok(Completion::Normal)
            }
        }
    }

    /// Runs a catch clause with `value` bound to its parameter. A failed
    /// parameter binding is returned like any error from the body, so an
    /// enclosing `finally` still runs.
    fn exec_catch(
        &mut self,
        handler: &CatchClause<'a>,
        value: Value<'a>,
        bindings: &Bindings<'a>,
    ) -> Result<Completion<'a>, EvalError<'a>> {
        let mut scope = self.push_scope();
        if let Some(param) = handler.param {
            let binding = scope.resolve_pattern(param, bindings)?;
            scope.set_binding(&binding, value, Some(DeclarationKind::Let), bindings)?;
        }
        scope.exec_statements(handler.body, bindings)
    }

    fn exec_var_decl(
        &mut self,
        decl: &'a VariableDeclaration<'a>,
        bindings: &Bindings<'a>,
    ) -> Result<(), EvalError<'a>> {
        for declarator in decl.declarations {
            // `var x;` leaves an existing `x` alone.
            if decl.kind == DeclarationKind::Var && declarator.init.is_none() {
                if let crate::ast::Pattern::Identifier(name) = declarator.id {
                    if self.scope().contains_own(name) {
                        continue;
                    }
                }
            }
            let binding = self.resolve_pattern(declarator.id, bindings)?;
            let value = match declarator.init {
                Some(init) => self.eval_expr(init, bindings)?,
                None => Value::Undefined,
            };
            self.set_binding(&binding, value, Some(decl.kind), bindings)?;
        }
        Ok(())
    }

    fn exec_for(
        &mut self,
        init: Option<&'a ForInit<'a>>,
        test: Option<&'a crate::ast::Expr<'a>>,
        update: Option<&'a crate::ast::Expr<'a>>,
        body: &'a Stmt<'a>,
        bindings: &Bindings<'a>,
    ) -> Result<Completion<'a>, EvalError<'a>> {
        let label = self.label.take();
        let mut head = self.push_scope();

        // `let` bindings are copied into a fresh frame per iteration, so
        // closures created in the body see that iteration's values.
        let mut per_iteration = Vec::new();
        match init {
            Some(ForInit::Declaration(decl)) => {
                head.exec_var_decl(decl, bindings)?;
                if decl.kind == DeclarationKind::Let {
                    for declarator in decl.declarations {
                        declarator.id.bound_names(&mut per_iteration);
                    }
                }
            }
            Some(ForInit::Expression(expr)) => {
                head.eval_expr(expr, bindings)?;
            }
            None => {}
        }

        loop {
            if let Some(test) = test {
                if !to_boolean(&head.eval_expr(test, bindings)?) {
                    break;
                }
            }

            let completion = if per_iteration.is_empty() {
                head.exec_stmt(body, bindings)?
            } else {
                let (completion, values) = {
                    let mut iteration = head.push_scope();
                    for name in &per_iteration {
                        let value = iteration.lookup(name, &Bindings::new()).unwrap_or_default();
                        iteration.declare(name, value, DeclarationKind::Let)?;
                    }
                    let completion = iteration.exec_stmt(body, bindings)?;
                    let values: Vec<_> = per_iteration
                        .iter()
                        .map(|name| iteration.lookup(name, &Bindings::new()).unwrap_or_default())
                        .collect();
                    (completion, values)
                };
                for (name, value) in per_iteration.iter().zip(values) {
                    head.assign(name, value)?;
                }
                completion
            };

            match loop_flow(completion, label) {
                Flow::Next => {}
                Flow::Exit => break,
                Flow::Propagate(completion) => return Ok(completion),
            }

            if let Some(update) = update {
                head.eval_expr(update, bindings)?;
            }
        }
        Ok(Completion::Normal)
    }

    /// Shared body of `for-in` and `for-of`: binds each item in a fresh frame
    /// and runs the body.
    fn exec_for_each(
        &mut self,
        label: Option<&'a str>,
        head: &'a ForHead<'a>,
        items: Vec<Value<'a>>,
        body: &'a Stmt<'a>,
        bindings: &Bindings<'a>,
    ) -> Result<Completion<'a>, EvalError<'a>> {
        for item in items {
            let completion = {
                let mut iteration = self.push_scope();
                match *head {
                    ForHead::Declaration { kind, target } => {
                        let binding = iteration.resolve_pattern(target, bindings)?;
                        iteration.set_binding(&binding, item, Some(kind), bindings)?;
                    }
                    ForHead::Pattern(target) => {
                        let binding = iteration.resolve_pattern(target, bindings)?;
                        iteration.set_binding(&binding, item, None, bindings)?;
                    }
                }
                iteration.exec_stmt(body, bindings)?
            };
            match loop_flow(completion, label) {
                Flow::Next => {}
                Flow::Exit => break,
                Flow::Propagate(completion) => return Ok(completion),
            }
        }
        Ok(Completion::Normal)
    }

    /// Cases match in source order; a `default` matches once reached, and
    /// every consequent after the first match runs until a `break`.
    fn exec_switch(
        &mut self,
        discriminant: &'a crate::ast::Expr<'a>,
        cases: &'a [SwitchCase<'a>],
        bindings: &Bindings<'a>,
    ) -> Result<Completion<'a>, EvalError<'a>> {
        let label = self.label.take();
        let value = self.eval_expr(discriminant, bindings)?;
        let mut scope = self.push_scope();
        let mut matched = false;
        for case in cases {
            if !matched {
                matched = match case.test {
                    Some(test) => scope.eval_expr(test, bindings)?.strict_equals(&value),
                    None => true,
                };
            }
            if !matched {
                continue;
            }
            match scope.exec_statements(case.consequent, bindings)? {
                Completion::Normal => {}
                Completion::Break(None) => break,
                Completion::Break(Some(l)) if Some(l) == label => break,
                abrupt => return Ok(abrupt),
            }
        }
        Ok(Completion::Normal)
    }
}

fn is_loop(stmt: &Stmt<'_>) -> bool {
    matches!(
        stmt.kind,
        StmtKind::For { .. }
            | StmtKind::ForIn { .. }
            | StmtKind::ForOf { .. }
            | StmtKind::While { .. }
            | StmtKind::DoWhile { .. }
            | StmtKind::Switch { .. }
    )
}

/// Names an exported declaration introduces.
fn declared_names<'a>(stmt: &'a Stmt<'a>) -> Vec<&'a str> {
    let mut names = Vec::new();
    match stmt.kind {
        StmtKind::VariableDeclaration(decl) => {
            for declarator in decl.declarations {
                declarator.id.bound_names(&mut names);
            }
        }
        StmtKind::FunctionDeclaration(def) => names.extend(def.id),
        StmtKind::ClassDeclaration(def) => names.extend(def.id),
        _ => {}
    }
    names
}

fn stmt_kind_name(kind: &StmtKind<'_>) -> &'static str {
    match kind {
        StmtKind::Expression(_) => "ExpressionStatement",
        StmtKind::Block(_) => "BlockStatement",
        StmtKind::Empty => "EmptyStatement",
        StmtKind::Debugger => "DebuggerStatement",
        StmtKind::VariableDeclaration(_) => "VariableDeclaration",
        StmtKind::FunctionDeclaration(_) => "FunctionDeclaration",
        StmtKind::ClassDeclaration(_) => "ClassDeclaration",
        StmtKind::If { .. } => "IfStatement",
        StmtKind::For { .. } => "ForStatement",
        StmtKind::ForIn { .. } => "ForInStatement",
        StmtKind::ForOf { .. } => "ForOfStatement",
        StmtKind::While { .. } => "WhileStatement",
        StmtKind::DoWhile { .. } => "DoWhileStatement",
        StmtKind::Break(_) => "BreakStatement",
        StmtKind::Continue(_) => "ContinueStatement",
        StmtKind::Return(_) => "ReturnStatement",
        StmtKind::Throw(_) => "ThrowStatement",
        StmtKind::Try { .. } => "TryStatement",
        StmtKind::Switch { .. } => "SwitchStatement",
        StmtKind::Labeled { .. } => "LabeledStatement",
        StmtKind::With { .. } => "WithStatement",
        StmtKind::Import => "ImportDeclaration",
        StmtKind::ExportNamed { .. } => "ExportNamedDeclaration",
        StmtKind::ExportDeclaration(_) => "ExportNamedDeclaration",
        StmtKind::ExportDefault(_) => "ExportDefaultDeclaration",
        StmtKind::ExportAll => "ExportAllDeclaration",
    }
}
