//! Converts pest pairs into the arena-allocated AST.

use core::cell::Cell;

use bumpalo::Bump;
use pest::iterators::{Pair, Pairs};

use crate::ast::*;
use crate::parser::error::{ParseError, ParseErrorKind};
use crate::parser::parser::{PRATT_PARSER, Rule};
use crate::parser::syntax::{LineIndex, Span};
use crate::stack::ensure_sufficient_stack;

type Result<T> = core::result::Result<T, ParseError>;

pub(crate) struct Builder<'a> {
    arena: &'a Bump,
    source: &'a str,
    lines: LineIndex,
    depth: Cell<usize>,
    max_depth: usize,
}

impl<'a> Builder<'a> {
    pub(crate) fn new(arena: &'a Bump, source: &'a str, max_depth: usize) -> Self {
        Self {
            arena,
            source,
            lines: LineIndex::new(source),
            depth: Cell::new(0),
            max_depth,
        }
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn alloc<T>(&self, value: T) -> &'a T {
        self.arena.alloc(value)
    }

    fn alloc_slice<T>(&self, values: Vec<T>) -> &'a [T] {
        self.arena.alloc_slice_fill_iter(values)
    }

    fn loc_at(&self, start: usize, end: usize) -> Option<SourceLocation> {
        Some(SourceLocation {
            start: self.lines.position(self.source, start),
            span: Span::new(start, end),
        })
    }

    fn loc(&self, pair: &Pair<'a, Rule>) -> Option<SourceLocation> {
        let span = pair.as_span();
        self.loc_at(span.start(), span.end())
    }

    fn error(&self, kind: ParseErrorKind, span: Span) -> ParseError {
        ParseError::new(kind, self.source.to_string(), span)
    }

    fn invalid_target(&self, loc: &Option<SourceLocation>) -> ParseError {
        let span = loc.as_ref().map(|l| l.span.clone()).unwrap_or_default();
        self.error(ParseErrorKind::InvalidAssignmentTarget, span)
    }

    fn missing(&self, pair_span: pest::Span<'a>) -> ParseError {
        self.error(
            ParseErrorKind::Other {
                message: "missing expected pair in rule".to_string(),
            },
            pair_span.into(),
        )
    }

    fn next(&self, pairs: &mut Pairs<'a, Rule>, parent: pest::Span<'a>) -> Result<Pair<'a, Rule>> {
        pairs.next().ok_or_else(|| self.missing(parent))
    }

    fn expr_node(&self, kind: ExprKind<'a>, loc: Option<SourceLocation>) -> &'a Expr<'a> {
        self.alloc(Expr { kind, loc })
    }

    /// Location spanning from the start of `from` to the end of `to`.
    fn loc_between(&self, from: &Expr<'a>, to_end: usize) -> Option<SourceLocation> {
        from.loc.as_ref().map(|l| SourceLocation {
            start: l.start,
            span: Span::new(l.span.0.start, to_end),
        })
    }

    fn end_of(expr: &Expr<'a>) -> usize {
        expr.loc.as_ref().map_or(0, |l| l.span.0.end)
    }

    fn enter(&self, pair: &Pair<'a, Rule>) -> Result<()> {
        let depth = self.depth.get() + 1;
        if depth > self.max_depth {
            return Err(self.error(
                ParseErrorKind::MaxDepthExceeded {
                    depth,
                    max_depth: self.max_depth,
                },
                pair.as_span().into(),
            ));
        }
        self.depth.set(depth);
        Ok(())
    }

    fn leave(&self) {
        self.depth.set(self.depth.get().saturating_sub(1));
    }

    // -----------------------------------------------------------------------
    // Program and statements
    // -----------------------------------------------------------------------

    pub(crate) fn program(&self, pair: Pair<'a, Rule>) -> Result<&'a [Stmt<'a>]> {
        let mut body = Vec::new();
        for p in pair.into_inner() {
            if p.as_rule() == Rule::EOI {
                continue;
            }
            body.push(self.statement(p)?);
        }
        Ok(self.alloc_slice(body))
    }

    fn statements(&self, pairs: Pairs<'a, Rule>) -> Result<&'a [Stmt<'a>]> {
        let mut body = Vec::new();
        for p in pairs {
            body.push(self.statement(p)?);
        }
        Ok(self.alloc_slice(body))
    }

    fn block_body(&self, pair: Pair<'a, Rule>) -> Result<&'a [Stmt<'a>]> {
        self.statements(pair.into_inner())
    }

    fn boxed_statement(&self, pair: Pair<'a, Rule>) -> Result<&'a Stmt<'a>> {
        let stmt = self.statement(pair)?;
        Ok(self.alloc(stmt))
    }

    fn statement(&self, pair: Pair<'a, Rule>) -> Result<Stmt<'a>> {
        ensure_sufficient_stack(|| self.statement_inner(pair))
    }

    fn statement_inner(&self, pair: Pair<'a, Rule>) -> Result<Stmt<'a>> {
        let loc = self.loc(&pair);
        let span = pair.as_span();
        let kind = match pair.as_rule() {
            Rule::block => StmtKind::Block(self.block_body(pair)?),
            Rule::empty_statement => StmtKind::Empty,
            Rule::debugger_statement => StmtKind::Debugger,
            Rule::variable_statement => {
                let decl = self.next(&mut pair.into_inner(), span)?;
                StmtKind::VariableDeclaration(self.variable_declaration(decl)?)
            }
            Rule::expression_statement => {
                let expr = self.next(&mut pair.into_inner(), span)?;
                StmtKind::Expression(self.expr(expr)?)
            }
            Rule::if_statement => {
                let mut test = None;
                let mut branches = Vec::new();
                for p in pair.into_inner() {
                    match p.as_rule() {
                        Rule::kw_if | Rule::kw_else => {}
                        Rule::expression => test = Some(self.expr(p)?),
                        _ => branches.push(self.boxed_statement(p)?),
                    }
                }
                let test = test.ok_or_else(|| self.missing(span))?;
                let mut branches = branches.into_iter();
                let consequent = branches.next().ok_or_else(|| self.missing(span))?;
                StmtKind::If {
                    test,
                    consequent,
                    alternate: branches.next(),
                }
            }
            Rule::for_statement => {
                let mut init = None;
                let mut test = None;
                let mut update = None;
                let mut body = None;
                for p in pair.into_inner() {
                    match p.as_rule() {
                        Rule::kw_for => {}
                        Rule::for_init => {
                            let inner = self.next(&mut p.into_inner(), span)?;
                            init = Some(match inner.as_rule() {
                                Rule::variable_declaration => {
                                    ForInit::Declaration(self.variable_declaration(inner)?)
                                }
                                _ => ForInit::Expression(self.expr(inner)?),
                            });
                        }
                        Rule::for_test => test = Some(self.expr(self.next(&mut p.into_inner(), span)?)?),
                        Rule::for_update => {
                            update = Some(self.expr(self.next(&mut p.into_inner(), span)?)?)
                        }
                        _ => body = Some(self.boxed_statement(p)?),
                    }
                }
                StmtKind::For {
                    init,
                    test,
                    update,
                    body: body.ok_or_else(|| self.missing(span))?,
                }
            }
            Rule::for_in_of_statement => {
                let mut head = None;
                let mut is_of = false;
                let mut right = None;
                let mut body = None;
                for p in pair.into_inner() {
                    match p.as_rule() {
                        Rule::kw_for => {}
                        Rule::kw_of => is_of = true,
                        Rule::in_op => is_of = false,
                        Rule::for_binding => head = Some(self.for_head(p)?),
                        Rule::expression => right = Some(self.expr(p)?),
                        _ => body = Some(self.boxed_statement(p)?),
                    }
                }
                let left = head.ok_or_else(|| self.missing(span))?;
                let right = right.ok_or_else(|| self.missing(span))?;
                let body = body.ok_or_else(|| self.missing(span))?;
                if is_of {
                    StmtKind::ForOf { left, right, body }
                } else {
                    StmtKind::ForIn { left, right, body }
                }
            }
            Rule::while_statement => {
                let mut test = None;
                let mut body = None;
                for p in pair.into_inner() {
                    match p.as_rule() {
                        Rule::kw_while => {}
                        Rule::expression => test = Some(self.expr(p)?),
                        _ => body = Some(self.boxed_statement(p)?),
                    }
                }
                StmtKind::While {
                    test: test.ok_or_else(|| self.missing(span))?,
                    body: body.ok_or_else(|| self.missing(span))?,
                }
            }
            Rule::do_while_statement => {
                let mut test = None;
                let mut body = None;
                for p in pair.into_inner() {
                    match p.as_rule() {
                        Rule::kw_do | Rule::kw_while => {}
                        Rule::expression => test = Some(self.expr(p)?),
                        _ => body = Some(self.boxed_statement(p)?),
                    }
                }
                StmtKind::DoWhile {
                    body: body.ok_or_else(|| self.missing(span))?,
                    test: test.ok_or_else(|| self.missing(span))?,
                }
            }
            Rule::break_statement | Rule::continue_statement => {
                let is_break = pair.as_rule() == Rule::break_statement;
                let label = pair
                    .into_inner()
                    .find(|p| p.as_rule() == Rule::label)
                    .map(|p| p.as_str());
                if is_break {
                    StmtKind::Break(label)
                } else {
                    StmtKind::Continue(label)
                }
            }
            Rule::return_statement => {
                let argument = pair
                    .into_inner()
                    .find(|p| p.as_rule() == Rule::expression)
                    .map(|p| self.expr(p))
                    .transpose()?;
                StmtKind::Return(argument)
            }
            Rule::throw_statement => {
                let argument = pair
                    .into_inner()
                    .find(|p| p.as_rule() == Rule::expression)
                    .ok_or_else(|| self.missing(span))?;
                StmtKind::Throw(self.expr(argument)?)
            }
            Rule::try_statement => {
                let mut block = None;
                let mut handler = None;
                let mut finalizer = None;
                for p in pair.into_inner() {
                    match p.as_rule() {
                        Rule::block => block = Some(self.block_body(p)?),
                        Rule::catch_clause => {
                            let mut param = None;
                            let mut body = None;
                            for c in p.into_inner() {
                                match c.as_rule() {
                                    Rule::binding_target => param = Some(self.binding_target(c)?),
                                    Rule::block => body = Some(self.block_body(c)?),
                                    _ => {}
                                }
                            }
                            handler = Some(CatchClause {
                                param,
                                body: body.ok_or_else(|| self.missing(span))?,
                            });
                        }
                        Rule::finally_clause => {
                            let body = p
                                .into_inner()
                                .find(|c| c.as_rule() == Rule::block)
                                .ok_or_else(|| self.missing(span))?;
                            finalizer = Some(self.block_body(body)?);
                        }
                        _ => {}
                    }
                }
                StmtKind::Try {
                    block: block.ok_or_else(|| self.missing(span))?,
                    handler,
                    finalizer,
                }
            }
            Rule::switch_statement => {
                let mut discriminant = None;
                let mut cases = Vec::new();
                for p in pair.into_inner() {
                    match p.as_rule() {
                        Rule::expression => discriminant = Some(self.expr(p)?),
                        Rule::switch_case => cases.push(self.switch_case(p)?),
                        _ => {}
                    }
                }
                StmtKind::Switch {
                    discriminant: discriminant.ok_or_else(|| self.missing(span))?,
                    cases: self.alloc_slice(cases),
                }
            }
            Rule::function_declaration => StmtKind::FunctionDeclaration(self.function(pair)?),
            Rule::class_declaration => StmtKind::ClassDeclaration(self.class(pair)?),
            Rule::labeled_statement => {
                let mut inner = pair.into_inner();
                let label = self.next(&mut inner, span)?.as_str();
                let body = self.boxed_statement(self.next(&mut inner, span)?)?;
                StmtKind::Labeled { label, body }
            }
            Rule::with_statement => {
                let mut object = None;
                let mut body = None;
                for p in pair.into_inner() {
                    match p.as_rule() {
                        Rule::kw_with => {}
                        Rule::expression => object = Some(self.expr(p)?),
                        _ => body = Some(self.boxed_statement(p)?),
                    }
                }
                StmtKind::With {
                    object: object.ok_or_else(|| self.missing(span))?,
                    body: body.ok_or_else(|| self.missing(span))?,
                }
            }
            Rule::import_declaration => StmtKind::Import,
            Rule::export_declaration => self.export(pair)?,
            rule => {
                return Err(self.error(
                    ParseErrorKind::Other {
                        message: format!("Unhandled statement rule: {:?}", rule),
                    },
                    span.into(),
                ));
            }
        };
        Ok(Stmt { kind, loc })
    }

    fn variable_declaration(&self, pair: Pair<'a, Rule>) -> Result<&'a VariableDeclaration<'a>> {
        let span = pair.as_span();
        let mut inner = pair.into_inner();
        let kind = declaration_kind(self.next(&mut inner, span)?.as_str());
        let mut declarations = Vec::new();
        for declarator in inner {
            let dspan = declarator.as_span();
            let mut parts = declarator.into_inner();
            let id = self.binding_target(self.next(&mut parts, dspan)?)?;
            let init = parts.next().map(|p| self.expr(p)).transpose()?;
            if init.is_none() && kind == DeclarationKind::Const {
                return Err(self.error(ParseErrorKind::MissingInitializer, dspan.into()));
            }
            declarations.push(VariableDeclarator { id, init });
        }
        Ok(self.alloc(VariableDeclaration {
            kind,
            declarations: self.alloc_slice(declarations),
        }))
    }

    fn for_head(&self, pair: Pair<'a, Rule>) -> Result<ForHead<'a>> {
        let span = pair.as_span();
        let mut inner = pair.into_inner();
        let first = self.next(&mut inner, span)?;
        match first.as_rule() {
            Rule::var_kind => {
                let kind = declaration_kind(first.as_str());
                let target = self.binding_target(self.next(&mut inner, span)?)?;
                Ok(ForHead::Declaration { kind, target })
            }
            _ => {
                let expr = self.expr(first)?;
                Ok(ForHead::Pattern(self.to_pattern(expr, false)?))
            }
        }
    }

    fn switch_case(&self, pair: Pair<'a, Rule>) -> Result<SwitchCase<'a>> {
        let mut test = None;
        let mut consequent = Vec::new();
        for p in pair.into_inner() {
            match p.as_rule() {
                Rule::kw_case | Rule::kw_default => {}
                Rule::expression if test.is_none() && consequent.is_empty() => {
                    test = Some(self.expr(p)?)
                }
                _ => consequent.push(self.statement(p)?),
            }
        }
        Ok(SwitchCase {
            test,
            consequent: self.alloc_slice(consequent),
        })
    }

    fn export(&self, pair: Pair<'a, Rule>) -> Result<StmtKind<'a>> {
        let span = pair.as_span();
        let body = pair
            .into_inner()
            .find(|p| p.as_rule() != Rule::kw_export)
            .ok_or_else(|| self.missing(span))?;
        match body.as_rule() {
            Rule::export_default => {
                let expr = body
                    .into_inner()
                    .find(|p| p.as_rule() == Rule::assignment)
                    .ok_or_else(|| self.missing(span))?;
                Ok(StmtKind::ExportDefault(self.expr(expr)?))
            }
            Rule::export_all => Ok(StmtKind::ExportAll),
            Rule::export_named => {
                let mut specifiers = Vec::new();
                let mut source = None;
                for p in body.into_inner() {
                    match p.as_rule() {
                        Rule::export_specifier => {
                            let names: Vec<&'a str> = p
                                .into_inner()
                                .filter(|n| n.as_rule() == Rule::identifier_name)
                                .map(|n| n.as_str())
                                .collect();
                            let local = names.first().copied().ok_or_else(|| self.missing(span))?;
                            let exported = names.get(1).copied().unwrap_or(local);
                            specifiers.push(ExportSpecifier { local, exported });
                        }
                        Rule::string => source = Some(self.string_literal(p)?),
                        _ => {}
                    }
                }
                Ok(StmtKind::ExportNamed {
                    specifiers: self.alloc_slice(specifiers),
                    source,
                })
            }
            Rule::export_decl => {
                let decl = self.next(&mut body.into_inner(), span)?;
                Ok(StmtKind::ExportDeclaration(self.boxed_statement(decl)?))
            }
            rule => Err(self.error(
                ParseErrorKind::Other {
                    message: format!("Unhandled export rule: {:?}", rule),
                },
                span.into(),
            )),
        }
    }

    // -----------------------------------------------------------------------
    // Expressions
    // -----------------------------------------------------------------------

    pub(crate) fn expr(&self, pair: Pair<'a, Rule>) -> Result<&'a Expr<'a>> {
        let nests = matches!(pair.as_rule(), Rule::assignment);
        if nests {
            self.enter(&pair)?;
        }
        let result = ensure_sufficient_stack(|| self.expr_inner(pair));
        if nests {
            self.leave();
        }
        result
    }

    fn expr_inner(&self, pair: Pair<'a, Rule>) -> Result<&'a Expr<'a>> {
        let loc = self.loc(&pair);
        let span = pair.as_span();
        match pair.as_rule() {
            Rule::expression => {
                let mut items = Vec::new();
                for p in pair.into_inner() {
                    items.push(self.expr(p)?);
                }
                if items.len() == 1 {
                    Ok(items[0])
                } else {
                    Ok(self.expr_node(ExprKind::Sequence(self.alloc_slice(items)), loc))
                }
            }

            Rule::assignment => {
                let mut inner = pair.into_inner();
                let first = self.next(&mut inner, span)?;
                let left = self.expr(first)?;
                let Some(op) = inner.next() else {
                    return Ok(left);
                };
                let value = self.expr(self.next(&mut inner, span)?)?;
                let op = assign_op(op.as_str());
                let target = match op {
                    AssignOp::Assign => self.to_pattern(left, false)?,
                    _ => self.simple_target(left)?,
                };
                Ok(self.expr_node(ExprKind::Assignment { op, target, value }, loc))
            }

            Rule::conditional => {
                let mut inner = pair.into_inner();
                let test = self.expr(self.next(&mut inner, span)?)?;
                if inner.next().is_none() {
                    return Ok(test);
                }
                let consequent = self.expr(self.next(&mut inner, span)?)?;
                let alternate = self.expr(self.next(&mut inner, span)?)?;
                Ok(self.expr_node(
                    ExprKind::Conditional {
                        test,
                        consequent,
                        alternate,
                    },
                    loc,
                ))
            }

            Rule::binary => {
                let mut inner = pair.into_inner();
                if inner.clone().count() == 1 {
                    return self.expr(self.next(&mut inner, span)?);
                }
                PRATT_PARSER
                    .map_primary(|primary| self.expr(primary))
                    .map_infix(|lhs, op, rhs| {
                        let left = lhs?;
                        let right = rhs?;
                        let loc = self.loc_between(left, Self::end_of(right));
                        let kind = match op.as_rule() {
                            Rule::and => ExprKind::Logical {
                                op: LogicalOp::And,
                                left,
                                right,
                            },
                            Rule::or => ExprKind::Logical {
                                op: LogicalOp::Or,
                                left,
                                right,
                            },
                            Rule::nullish => ExprKind::Logical {
                                op: LogicalOp::Nullish,
                                left,
                                right,
                            },
                            rule => ExprKind::Binary {
                                op: binary_op(rule).ok_or_else(|| self.missing(op.as_span()))?,
                                left,
                                right,
                            },
                        };
                        Ok(self.expr_node(kind, loc))
                    })
                    .parse(inner)
            }

            Rule::unary => {
                let parts: Vec<Pair<'a, Rule>> = pair.into_inner().collect();
                let (operand, ops) = parts.split_last().ok_or_else(|| self.missing(span))?;
                let mut expr = self.expr(operand.clone())?;
                for op in ops.iter().rev() {
                    let loc = self.loc_at(op.as_span().start(), Self::end_of(expr));
                    let kind = match op.as_rule() {
                        Rule::op_pre_inc | Rule::op_pre_dec => ExprKind::Update {
                            op: if op.as_rule() == Rule::op_pre_inc {
                                UpdateOp::Increment
                            } else {
                                UpdateOp::Decrement
                            },
                            prefix: true,
                            argument: self.update_target(expr)?,
                        },
                        Rule::op_await => ExprKind::Await(expr),
                        rule => ExprKind::Unary {
                            op: unary_op(rule).ok_or_else(|| self.missing(op.as_span()))?,
                            argument: expr,
                        },
                    };
                    expr = self.expr_node(kind, loc);
                }
                Ok(expr)
            }

            Rule::postfix_expr => {
                let mut inner = pair.into_inner();
                let argument = self.expr(self.next(&mut inner, span)?)?;
                match inner.next() {
                    None => Ok(argument),
                    Some(op) => {
                        let op = if op.as_str() == "++" {
                            UpdateOp::Increment
                        } else {
                            UpdateOp::Decrement
                        };
                        Ok(self.expr_node(
                            ExprKind::Update {
                                op,
                                prefix: false,
                                argument: self.update_target(argument)?,
                            },
                            loc,
                        ))
                    }
                }
            }

            Rule::lhs | Rule::new_callee => self.chain(pair),

            Rule::new_expr => {
                let mut callee = None;
                let mut arguments: &'a [Argument<'a>] = &[];
                for p in pair.into_inner() {
                    match p.as_rule() {
                        Rule::kw_new => {}
                        Rule::new_callee => callee = Some(self.expr(p)?),
                        Rule::arguments => arguments = self.arguments(p)?,
                        _ => {}
                    }
                }
                Ok(self.expr_node(
                    ExprKind::New {
                        callee: callee.ok_or_else(|| self.missing(span))?,
                        arguments,
                    },
                    loc,
                ))
            }

            Rule::meta_property => {
                let mut inner = pair.into_inner();
                let meta = self.next(&mut inner, span)?.as_str();
                let property = self.next(&mut inner, span)?.as_str();
                Ok(self.expr_node(ExprKind::MetaProperty { meta, property }, loc))
            }

            Rule::import_call => {
                let args = pair
                    .into_inner()
                    .find(|p| p.as_rule() == Rule::arguments)
                    .ok_or_else(|| self.missing(span))?;
                Ok(self.expr_node(ExprKind::Import(self.arguments(args)?), loc))
            }

            Rule::super_expr => Ok(self.expr_node(ExprKind::Super, loc)),
            Rule::this_expr => Ok(self.expr_node(ExprKind::This, loc)),
            Rule::null_lit => Ok(self.expr_node(ExprKind::Literal(Literal::Null), loc)),
            Rule::true_lit => Ok(self.expr_node(ExprKind::Literal(Literal::Bool(true)), loc)),
            Rule::false_lit => Ok(self.expr_node(ExprKind::Literal(Literal::Bool(false)), loc)),

            Rule::number => {
                let value = parse_number(pair.as_str()).ok_or_else(|| {
                    self.error(
                        ParseErrorKind::InvalidNumber {
                            text: pair.as_str().to_string(),
                        },
                        span.into(),
                    )
                })?;
                Ok(self.expr_node(ExprKind::Literal(Literal::Number(value)), loc))
            }

            Rule::string => {
                let value = self.string_literal(pair)?;
                Ok(self.expr_node(ExprKind::Literal(Literal::String(value)), loc))
            }

            Rule::template => {
                let template = self.template(pair)?;
                Ok(self.expr_node(ExprKind::TemplateLiteral(template), loc))
            }

            Rule::identifier => Ok(self.expr_node(ExprKind::Identifier(pair.as_str()), loc)),

            Rule::paren_expr => self.expr(self.next(&mut pair.into_inner(), span)?),

            Rule::array_literal => {
                let mut elements = Vec::new();
                for p in pair.into_inner() {
                    elements.push(match p.as_rule() {
                        Rule::hole => ArrayElement::Hole,
                        Rule::spread_element => {
                            ArrayElement::Spread(self.expr(self.next(&mut p.into_inner(), span)?)?)
                        }
                        _ => ArrayElement::Expr(self.expr(p)?),
                    });
                }
                if matches!(elements.last(), Some(ArrayElement::Hole)) {
                    elements.pop();
                }
                Ok(self.expr_node(ExprKind::Array(self.alloc_slice(elements)), loc))
            }

            Rule::object_literal => {
                let mut members = Vec::new();
                for p in pair.into_inner() {
                    members.push(self.object_member(p)?);
                }
                Ok(self.expr_node(ExprKind::Object(self.alloc_slice(members)), loc))
            }

            Rule::function_expr => {
                let def = self.function(pair)?;
                Ok(self.expr_node(ExprKind::Function(def), loc))
            }

            Rule::arrow_function => {
                let def = self.arrow(pair)?;
                Ok(self.expr_node(ExprKind::ArrowFunction(def), loc))
            }

            Rule::class_expr => {
                let def = self.class(pair)?;
                Ok(self.expr_node(ExprKind::Class(def), loc))
            }

            Rule::yield_expr => {
                let argument = pair
                    .into_inner()
                    .find(|p| p.as_rule() == Rule::assignment)
                    .map(|p| self.expr(p))
                    .transpose()?;
                Ok(self.expr_node(ExprKind::Yield(argument), loc))
            }

            Rule::jsx_element => {
                let element = self.jsx_element(pair)?;
                Ok(self.expr_node(ExprKind::JsxElement(element), loc))
            }

            Rule::jsx_fragment => {
                let fragment = self.jsx_fragment(pair)?;
                Ok(self.expr_node(ExprKind::JsxFragment(fragment), loc))
            }

            rule => Err(self.error(
                ParseErrorKind::Other {
                    message: format!("Unhandled rule: {:?}", rule),
                },
                span.into(),
            )),
        }
    }

    /// Builds a head expression followed by member/call/template suffixes.
    fn chain(&self, pair: Pair<'a, Rule>) -> Result<&'a Expr<'a>> {
        let span = pair.as_span();
        let mut inner = pair.into_inner();
        let mut expr = self.expr(self.next(&mut inner, span)?)?;
        let mut optional_seen = false;

        for suffix in inner {
            let end = suffix.as_span().end();
            let loc = self.loc_between(expr, end);
            let sspan = suffix.as_span();
            let kind = match suffix.as_rule() {
                Rule::arguments => ExprKind::Call {
                    callee: expr,
                    arguments: self.arguments(suffix)?,
                    optional: false,
                },
                Rule::optional_call => {
                    optional_seen = true;
                    ExprKind::Call {
                        callee: expr,
                        arguments: self.arguments(self.next(&mut suffix.into_inner(), sspan)?)?,
                        optional: true,
                    }
                }
                Rule::member_access | Rule::optional_member => {
                    let optional = suffix.as_rule() == Rule::optional_member;
                    optional_seen |= optional;
                    let name = self.next(&mut suffix.into_inner(), sspan)?;
                    let property = match name.as_rule() {
                        Rule::private_name => MemberProperty::Private(&name.as_str()[1..]),
                        _ => MemberProperty::Identifier(name.as_str()),
                    };
                    ExprKind::Member {
                        object: expr,
                        property,
                        optional,
                    }
                }
                Rule::computed_member | Rule::optional_computed => {
                    let optional = suffix.as_rule() == Rule::optional_computed;
                    optional_seen |= optional;
                    let key = self.expr(self.next(&mut suffix.into_inner(), sspan)?)?;
                    ExprKind::Member {
                        object: expr,
                        property: MemberProperty::Computed(key),
                        optional,
                    }
                }
                Rule::template => ExprKind::TaggedTemplate {
                    tag: expr,
                    quasi: self.template(suffix)?,
                },
                rule => {
                    return Err(self.error(
                        ParseErrorKind::Other {
                            message: format!("Unhandled suffix rule: {:?}", rule),
                        },
                        sspan.into(),
                    ));
                }
            };
            expr = self.expr_node(kind, loc);
        }

        if optional_seen {
            let loc = expr.loc.clone();
            expr = self.expr_node(ExprKind::Chain(expr), loc);
        }
        Ok(expr)
    }

    fn arguments(&self, pair: Pair<'a, Rule>) -> Result<&'a [Argument<'a>]> {
        let span = pair.as_span();
        let mut args = Vec::new();
        for p in pair.into_inner() {
            args.push(match p.as_rule() {
                Rule::spread_element => Argument::Spread(self.expr(self.next(&mut p.into_inner(), span)?)?),
                _ => Argument::Expr(self.expr(p)?),
            });
        }
        Ok(self.alloc_slice(args))
    }

    fn string_literal(&self, pair: Pair<'a, Rule>) -> Result<&'a str> {
        let raw = pair.as_str();
        let inner = &raw[1..raw.len() - 1];
        if !inner.contains('\\') {
            return Ok(inner);
        }
        let cooked = unescape(inner).ok_or_else(|| {
            self.error(
                ParseErrorKind::InvalidEscape {
                    text: raw.to_string(),
                },
                pair.as_span().into(),
            )
        })?;
        Ok(self.arena.alloc_str(&cooked))
    }

    fn template(&self, pair: Pair<'a, Rule>) -> Result<&'a TemplateLiteral<'a>> {
        let span = pair.as_span();
        let mut quasis = Vec::new();
        let mut expressions = Vec::new();
        let mut quasi_start = span.start() + 1;
        let mut quasi_raw: &'a str = "";

        for p in pair.into_inner() {
            match p.as_rule() {
                Rule::template_chars => {
                    quasi_start = p.as_span().start();
                    quasi_raw = p.as_str();
                }
                Rule::template_substitution => {
                    quasis.push(self.template_element(quasi_raw, quasi_start)?);
                    let pspan = p.as_span();
                    expressions.push(self.expr(self.next(&mut p.into_inner(), pspan)?)?);
                    quasi_start = pspan.end();
                    quasi_raw = "";
                }
                _ => {}
            }
        }
        quasis.push(self.template_element(quasi_raw, quasi_start)?);

        Ok(self.alloc(TemplateLiteral {
            quasis: self.alloc_slice(quasis),
            expressions: self.alloc_slice(expressions),
        }))
    }

    fn template_element(&self, raw: &'a str, start: usize) -> Result<TemplateElement<'a>> {
        let end = start + raw.len();
        let cooked = if raw.contains('\\') {
            let cooked = unescape(raw).ok_or_else(|| {
                self.error(
                    ParseErrorKind::InvalidEscape {
                        text: raw.to_string(),
                    },
                    Span::new(start, end),
                )
            })?;
            &*self.arena.alloc_str(&cooked)
        } else {
            raw
        };
        Ok(TemplateElement {
            cooked,
            raw,
            loc: self.loc_at(start, end),
        })
    }

    fn object_member(&self, pair: Pair<'a, Rule>) -> Result<ObjectMember<'a>> {
        let span = pair.as_span();
        let loc = self.loc(&pair);
        match pair.as_rule() {
            Rule::spread_element => Ok(ObjectMember::Spread(
                self.expr(self.next(&mut pair.into_inner(), span)?)?,
            )),
            Rule::object_property => {
                let mut inner = pair.into_inner();
                let key = self.property_key(self.next(&mut inner, span)?)?;
                let value = self.expr(self.next(&mut inner, span)?)?;
                Ok(ObjectMember::Property(Property {
                    key,
                    value,
                    kind: PropertyKind::Init,
                    method: false,
                    shorthand: false,
                }))
            }
            Rule::shorthand_property => {
                let name = pair.as_str();
                Ok(ObjectMember::Property(Property {
                    key: PropertyKey::Static(name),
                    value: self.expr_node(ExprKind::Identifier(name), loc),
                    kind: PropertyKind::Init,
                    method: false,
                    shorthand: true,
                }))
            }
            Rule::cover_initialized => {
                let mut inner = pair.into_inner();
                let name = self.next(&mut inner, span)?.as_str();
                let default = self.expr(self.next(&mut inner, span)?)?;
                Ok(ObjectMember::CoverInitialized { name, default })
            }
            Rule::object_method | Rule::object_getter | Rule::object_setter => {
                let kind = match pair.as_rule() {
                    Rule::object_getter => PropertyKind::Get,
                    Rule::object_setter => PropertyKind::Set,
                    _ => PropertyKind::Init,
                };
                let (key, def) = self.method(pair)?;
                Ok(ObjectMember::Property(Property {
                    key,
                    value: self.expr_node(ExprKind::Function(def), loc),
                    kind,
                    method: kind == PropertyKind::Init,
                    shorthand: false,
                }))
            }
            rule => Err(self.error(
                ParseErrorKind::Other {
                    message: format!("Unhandled object member: {:?}", rule),
                },
                span.into(),
            )),
        }
    }

    fn property_key(&self, pair: Pair<'a, Rule>) -> Result<PropertyKey<'a>> {
        let span = pair.as_span();
        let key = self.next(&mut pair.into_inner(), span)?;
        match key.as_rule() {
            Rule::identifier_name => Ok(PropertyKey::Static(key.as_str())),
            Rule::string => Ok(PropertyKey::Static(self.string_literal(key)?)),
            Rule::number => {
                let value = parse_number(key.as_str()).ok_or_else(|| {
                    self.error(
                        ParseErrorKind::InvalidNumber {
                            text: key.as_str().to_string(),
                        },
                        span.into(),
                    )
                })?;
                let name = crate::values::number_to_string(value);
                Ok(PropertyKey::Static(self.arena.alloc_str(&name)))
            }
            Rule::private_name => Ok(PropertyKey::Private(&key.as_str()[1..])),
            Rule::computed_key => Ok(PropertyKey::Computed(
                self.expr(self.next(&mut key.into_inner(), span)?)?,
            )),
            rule => Err(self.error(
                ParseErrorKind::Other {
                    message: format!("Unhandled property key: {:?}", rule),
                },
                span.into(),
            )),
        }
    }

    // -----------------------------------------------------------------------
    // Functions and classes
    // -----------------------------------------------------------------------

    fn function(&self, pair: Pair<'a, Rule>) -> Result<&'a FunctionDef<'a>> {
        let loc = self.loc(&pair);
        let span = pair.as_span();
        let mut def = FunctionDef {
            id: None,
            params: &[],
            rest: None,
            body: FunctionBody::Block(&[]),
            is_arrow: false,
            is_async: false,
            is_generator: false,
            loc,
        };
        let mut has_body = false;
        for p in pair.into_inner() {
            match p.as_rule() {
                Rule::kw_async => def.is_async = true,
                Rule::generator_star => def.is_generator = true,
                Rule::identifier => def.id = Some(p.as_str()),
                Rule::params => (def.params, def.rest) = self.params(p)?,
                Rule::function_body => {
                    def.body = FunctionBody::Block(self.block_body(p)?);
                    has_body = true;
                }
                _ => {}
            }
        }
        if !has_body {
            return Err(self.missing(span));
        }
        Ok(self.alloc(def))
    }

    /// Object/class methods and accessors: `[async] [*] key(params) { body }`.
    fn method(&self, pair: Pair<'a, Rule>) -> Result<(PropertyKey<'a>, &'a FunctionDef<'a>)> {
        let loc = self.loc(&pair);
        let span = pair.as_span();
        let mut key = None;
        let mut def = FunctionDef {
            id: None,
            params: &[],
            rest: None,
            body: FunctionBody::Block(&[]),
            is_arrow: false,
            is_async: false,
            is_generator: false,
            loc,
        };
        for p in pair.into_inner() {
            match p.as_rule() {
                Rule::kw_async => def.is_async = true,
                Rule::generator_star => def.is_generator = true,
                Rule::property_key => key = Some(self.property_key(p)?),
                Rule::params => (def.params, def.rest) = self.params(p)?,
                Rule::function_body => def.body = FunctionBody::Block(self.block_body(p)?),
                _ => {}
            }
        }
        let key = key.ok_or_else(|| self.missing(span))?;
        if let PropertyKey::Static(name) = key {
            def.id = Some(name);
        }
        Ok((key, self.alloc(def)))
    }

    fn arrow(&self, pair: Pair<'a, Rule>) -> Result<&'a FunctionDef<'a>> {
        let loc = self.loc(&pair);
        let span = pair.as_span();
        let mut def = FunctionDef {
            id: None,
            params: &[],
            rest: None,
            body: FunctionBody::Block(&[]),
            is_arrow: true,
            is_async: false,
            is_generator: false,
            loc,
        };
        let mut has_body = false;
        for p in pair.into_inner() {
            match p.as_rule() {
                Rule::kw_async => def.is_async = true,
                Rule::arrow_params => {
                    let inner = self.next(&mut p.into_inner(), span)?;
                    match inner.as_rule() {
                        Rule::identifier => {
                            let param: &'a Pattern<'a> = self.alloc(Pattern::Identifier(inner.as_str()));
                            def.params = self.alloc_slice(vec![param]);
                        }
                        _ => (def.params, def.rest) = self.params(inner)?,
                    }
                }
                Rule::function_body => {
                    def.body = FunctionBody::Block(self.block_body(p)?);
                    has_body = true;
                }
                _ => {
                    def.body = FunctionBody::Expression(self.expr(p)?);
                    has_body = true;
                }
            }
        }
        if !has_body {
            return Err(self.missing(span));
        }
        Ok(self.alloc(def))
    }

    #[allow(clippy::type_complexity)]
    fn params(
        &self,
        pair: Pair<'a, Rule>,
    ) -> Result<(&'a [&'a Pattern<'a>], Option<&'a Pattern<'a>>)> {
        let mut params = Vec::new();
        let mut rest = None;
        for p in pair.into_inner() {
            if rest.is_some() {
                return Err(self.error(ParseErrorKind::RestNotLast, p.as_span().into()));
            }
            match p.as_rule() {
                Rule::rest_element => rest = Some(self.rest_element(p)?),
                _ => params.push(self.binding_element(p)?),
            }
        }
        Ok((self.alloc_slice(params), rest))
    }

    fn class(&self, pair: Pair<'a, Rule>) -> Result<&'a ClassDef<'a>> {
        let loc = self.loc(&pair);
        let span = pair.as_span();
        let mut id = None;
        let mut super_class = None;
        let mut body = Vec::new();
        for p in pair.into_inner() {
            match p.as_rule() {
                Rule::identifier => id = Some(p.as_str()),
                Rule::class_heritage => {
                    let lhs = p
                        .into_inner()
                        .find(|c| c.as_rule() == Rule::lhs)
                        .ok_or_else(|| self.missing(span))?;
                    super_class = Some(self.expr(lhs)?);
                }
                Rule::class_body => {
                    for element in p.into_inner() {
                        body.push(self.class_member(element)?);
                    }
                }
                _ => {}
            }
        }
        Ok(self.alloc(ClassDef {
            id,
            super_class,
            body: self.alloc_slice(body),
            loc,
        }))
    }

    fn class_member(&self, pair: Pair<'a, Rule>) -> Result<ClassMember<'a>> {
        let loc = self.loc(&pair);
        let span = pair.as_span();
        let mut is_static = false;
        for p in pair.into_inner() {
            match p.as_rule() {
                Rule::kw_static => is_static = true,
                Rule::class_field => {
                    let fspan = p.as_span();
                    let mut inner = p.into_inner();
                    let key = self.property_key(self.next(&mut inner, fspan)?)?;
                    let value = inner.next().map(|v| self.expr(v)).transpose()?;
                    return Ok(ClassMember {
                        key,
                        kind: ClassMemberKind::Property,
                        value,
                        is_static,
                        loc,
                    });
                }
                Rule::class_method | Rule::class_getter | Rule::class_setter => {
                    let rule = p.as_rule();
                    let mloc = self.loc(&p);
                    let (key, def) = self.method(p)?;
                    let kind = match rule {
                        Rule::class_getter => ClassMemberKind::Get,
                        Rule::class_setter => ClassMemberKind::Set,
                        _ if !is_static && matches!(key, PropertyKey::Static("constructor")) => {
                            ClassMemberKind::Constructor
                        }
                        _ => ClassMemberKind::Method,
                    };
                    return Ok(ClassMember {
                        key,
                        kind,
                        value: Some(self.expr_node(ExprKind::Function(def), mloc)),
                        is_static,
                        loc,
                    });
                }
                _ => {}
            }
        }
        Err(self.missing(span))
    }

    // -----------------------------------------------------------------------
    // Patterns
    // -----------------------------------------------------------------------

    fn binding_target(&self, pair: Pair<'a, Rule>) -> Result<&'a Pattern<'a>> {
        let span = pair.as_span();
        let inner = match pair.as_rule() {
            Rule::binding_target => self.next(&mut pair.into_inner(), span)?,
            _ => pair,
        };
        match inner.as_rule() {
            Rule::identifier => Ok(self.alloc(Pattern::Identifier(inner.as_str()))),
            Rule::object_pattern => self.object_pattern(inner),
            Rule::array_pattern => self.array_pattern(inner),
            rule => Err(self.error(
                ParseErrorKind::Other {
                    message: format!("Unhandled binding target: {:?}", rule),
                },
                span.into(),
            )),
        }
    }

    fn binding_element(&self, pair: Pair<'a, Rule>) -> Result<&'a Pattern<'a>> {
        let span = pair.as_span();
        let mut inner = pair.into_inner();
        let target = self.binding_target(self.next(&mut inner, span)?)?;
        match inner.next() {
            None => Ok(target),
            Some(default) => Ok(self.alloc(Pattern::Assignment {
                target,
                default: self.expr(default)?,
            })),
        }
    }

    fn rest_element(&self, pair: Pair<'a, Rule>) -> Result<&'a Pattern<'a>> {
        let span = pair.as_span();
        self.binding_target(self.next(&mut pair.into_inner(), span)?)
    }

    fn object_pattern(&self, pair: Pair<'a, Rule>) -> Result<&'a Pattern<'a>> {
        let mut properties = Vec::new();
        let mut rest = None;
        for p in pair.into_inner() {
            if rest.is_some() {
                return Err(self.error(ParseErrorKind::RestNotLast, p.as_span().into()));
            }
            let span = p.as_span();
            match p.as_rule() {
                Rule::rest_element => rest = Some(self.rest_element(p)?),
                Rule::pattern_property => {
                    let mut inner = p.into_inner();
                    let key = self.property_key(self.next(&mut inner, span)?)?;
                    let value = self.binding_element(self.next(&mut inner, span)?)?;
                    properties.push(PatternProperty { key, value });
                }
                Rule::shorthand_pattern => {
                    let mut inner = p.into_inner();
                    let name = self.next(&mut inner, span)?.as_str();
                    let target: &'a Pattern<'a> = self.alloc(Pattern::Identifier(name));
                    let value = match inner.next() {
                        None => target,
                        Some(default) => self.alloc(Pattern::Assignment {
                            target,
                            default: self.expr(default)?,
                        }),
                    };
                    properties.push(PatternProperty {
                        key: PropertyKey::Static(name),
                        value,
                    });
                }
                _ => {}
            }
        }
        Ok(self.alloc(Pattern::Object {
            properties: self.alloc_slice(properties),
            rest,
        }))
    }

    fn array_pattern(&self, pair: Pair<'a, Rule>) -> Result<&'a Pattern<'a>> {
        let mut elements = Vec::new();
        let mut rest = None;
        for p in pair.into_inner() {
            if rest.is_some() {
                if p.as_rule() == Rule::hole {
                    continue;
                }
                return Err(self.error(ParseErrorKind::RestNotLast, p.as_span().into()));
            }
            match p.as_rule() {
                Rule::hole => elements.push(None),
                Rule::rest_element => rest = Some(self.rest_element(p)?),
                _ => elements.push(Some(self.binding_element(p)?)),
            }
        }
        if rest.is_none() && matches!(elements.last(), Some(None)) {
            elements.pop();
        }
        Ok(self.alloc(Pattern::Array {
            elements: self.alloc_slice(elements),
            rest,
        }))
    }

    /// Reinterprets an expression parsed in assignment position as a pattern.
    fn to_pattern(&self, expr: &'a Expr<'a>, allow_default: bool) -> Result<&'a Pattern<'a>> {
        match &expr.kind {
            ExprKind::Identifier(name) => Ok(self.alloc(Pattern::Identifier(name))),
            ExprKind::Member {
                optional: false, ..
            } => Ok(self.alloc(Pattern::Member(expr))),
            ExprKind::Assignment {
                op: AssignOp::Assign,
                target,
                value,
            } if allow_default => Ok(self.alloc(Pattern::Assignment {
                target,
                default: value,
            })),
            ExprKind::Array(items) => {
                let mut elements = Vec::new();
                let mut rest = None;
                for (i, item) in items.iter().enumerate() {
                    match item {
                        ArrayElement::Hole => elements.push(None),
                        ArrayElement::Expr(e) => elements.push(Some(self.to_pattern(e, true)?)),
                        ArrayElement::Spread(e) if i + 1 == items.len() => {
                            rest = Some(self.to_pattern(e, false)?)
                        }
                        ArrayElement::Spread(_) => return Err(self.invalid_target(&expr.loc)),
                    }
                }
                Ok(self.alloc(Pattern::Array {
                    elements: self.alloc_slice(elements),
                    rest,
                }))
            }
            ExprKind::Object(members) => {
                let mut properties = Vec::new();
                let mut rest = None;
                for (i, member) in members.iter().enumerate() {
                    match member {
                        ObjectMember::Property(Property {
                            key,
                            value,
                            kind: PropertyKind::Init,
                            method: false,
                            ..
                        }) => properties.push(PatternProperty {
                            key: *key,
                            value: self.to_pattern(value, true)?,
                        }),
                        ObjectMember::CoverInitialized { name, default } => {
                            let target: &'a Pattern<'a> = self.alloc(Pattern::Identifier(name));
                            properties.push(PatternProperty {
                                key: PropertyKey::Static(name),
                                value: self.alloc(Pattern::Assignment { target, default }),
                            });
                        }
                        ObjectMember::Spread(e) if i + 1 == members.len() => {
                            rest = Some(self.to_pattern(e, false)?)
                        }
                        _ => return Err(self.invalid_target(&expr.loc)),
                    }
                }
                Ok(self.alloc(Pattern::Object {
                    properties: self.alloc_slice(properties),
                    rest,
                }))
            }
            _ => Err(self.invalid_target(&expr.loc)),
        }
    }

    /// Targets of compound assignment must be an identifier or a member.
    fn simple_target(&self, expr: &'a Expr<'a>) -> Result<&'a Pattern<'a>> {
        match &expr.kind {
            ExprKind::Identifier(_) | ExprKind::Member { optional: false, .. } => {
                self.to_pattern(expr, false)
            }
            _ => Err(self.invalid_target(&expr.loc)),
        }
    }

    fn update_target(&self, expr: &'a Expr<'a>) -> Result<&'a Expr<'a>> {
        match &expr.kind {
            ExprKind::Identifier(_) | ExprKind::Member { optional: false, .. } => Ok(expr),
            _ => Err(self.invalid_target(&expr.loc)),
        }
    }

    // -----------------------------------------------------------------------
    // JSX
    // -----------------------------------------------------------------------

    fn jsx_element(&self, pair: Pair<'a, Rule>) -> Result<&'a JsxElement<'a>> {
        self.enter(&pair)?;
        let loc = self.loc(&pair);
        let span = pair.as_span();
        let mut name = None;
        let mut attributes = Vec::new();
        let mut children = Vec::new();
        let mut self_closing = false;

        for p in pair.into_inner() {
            match p.as_rule() {
                Rule::jsx_open_tag => {
                    for part in p.into_inner() {
                        match part.as_rule() {
                            Rule::jsx_name => name = Some(self.jsx_name(part)?),
                            Rule::jsx_plain_attribute => attributes.push(self.jsx_attribute(part)?),
                            Rule::jsx_spread_attribute => {
                                let pspan = part.as_span();
                                let arg = self.expr(self.next(&mut part.into_inner(), pspan)?)?;
                                attributes.push(JsxAttribute::Spread(arg));
                            }
                            _ => {}
                        }
                    }
                }
                Rule::jsx_self_closing => self_closing = true,
                Rule::jsx_closing => {
                    let cspan = p.as_span();
                    let closing = self.jsx_name(self.next(&mut p.into_inner(), cspan)?)?;
                    let opening = name.as_ref().map(|n: &JsxTagName<'a>| n.to_name());
                    let closing = closing.to_name();
                    if opening.as_deref() != Some(closing.as_str()) {
                        return Err(self.error(
                            ParseErrorKind::MismatchedClosingTag {
                                expected: opening.unwrap_or_default(),
                                found: closing,
                            },
                            cspan.into(),
                        ));
                    }
                }
                _ => {
                    if let Some(child) = self.jsx_child(p)? {
                        children.push(child);
                    }
                }
            }
        }

        self.leave();
        Ok(self.alloc(JsxElement {
            name: name.ok_or_else(|| self.missing(span))?,
            attributes: self.alloc_slice(attributes),
            children: self.alloc_slice(children),
            self_closing,
            loc,
        }))
    }

    fn jsx_fragment(&self, pair: Pair<'a, Rule>) -> Result<&'a JsxFragment<'a>> {
        self.enter(&pair)?;
        let loc = self.loc(&pair);
        let mut children = Vec::new();
        for p in pair.into_inner() {
            match p.as_rule() {
                Rule::jsx_fragment_open | Rule::jsx_fragment_close => {}
                _ => {
                    if let Some(child) = self.jsx_child(p)? {
                        children.push(child);
                    }
                }
            }
        }
        self.leave();
        Ok(self.alloc(JsxFragment {
            children: self.alloc_slice(children),
            loc,
        }))
    }

    fn jsx_child(&self, pair: Pair<'a, Rule>) -> Result<Option<JsxChild<'a>>> {
        let span = pair.as_span();
        match pair.as_rule() {
            Rule::jsx_text => {
                let cleaned = clean_jsx_text(pair.as_str());
                if cleaned.is_empty() {
                    return Ok(None);
                }
                let decoded = html_escape::decode_html_entities(&cleaned);
                Ok(Some(JsxChild::Text(self.arena.alloc_str(&decoded))))
            }
            Rule::jsx_expression_container => {
                let expr = pair.into_inner().next().map(|p| self.expr(p)).transpose()?;
                Ok(Some(JsxChild::Expression(expr)))
            }
            Rule::jsx_spread_child => {
                let expr = self.expr(self.next(&mut pair.into_inner(), span)?)?;
                Ok(Some(JsxChild::Spread(expr)))
            }
            Rule::jsx_element => Ok(Some(JsxChild::Element(self.jsx_element(pair)?))),
            Rule::jsx_fragment => Ok(Some(JsxChild::Fragment(self.jsx_fragment(pair)?))),
            rule => Err(self.error(
                ParseErrorKind::Other {
                    message: format!("Unhandled JSX child: {:?}", rule),
                },
                span.into(),
            )),
        }
    }

    fn jsx_name(&self, pair: Pair<'a, Rule>) -> Result<JsxTagName<'a>> {
        let span = pair.as_span();
        let inner = match pair.as_rule() {
            Rule::jsx_name => self.next(&mut pair.into_inner(), span)?,
            _ => pair,
        };
        match inner.as_rule() {
            Rule::jsx_identifier => Ok(JsxTagName::Identifier(inner.as_str())),
            Rule::jsx_namespaced_name => {
                let mut parts = inner.into_inner();
                let namespace = self.next(&mut parts, span)?.as_str();
                let name = self.next(&mut parts, span)?.as_str();
                Ok(JsxTagName::Namespaced { namespace, name })
            }
            Rule::jsx_member_name => {
                let segments: Vec<&'a str> = inner.into_inner().map(|p| p.as_str()).collect();
                Ok(JsxTagName::Member(self.alloc_slice(segments)))
            }
            rule => Err(self.error(
                ParseErrorKind::Other {
                    message: format!("Unhandled JSX name: {:?}", rule),
                },
                span.into(),
            )),
        }
    }

    fn jsx_attribute(&self, pair: Pair<'a, Rule>) -> Result<JsxAttribute<'a>> {
        let span = pair.as_span();
        let mut inner = pair.into_inner();
        let name_pair = self.next(&mut inner, span)?;
        let name_inner = self.next(&mut name_pair.into_inner(), span)?;
        let name = match name_inner.as_rule() {
            Rule::jsx_namespaced_name => {
                let mut parts = name_inner.into_inner();
                JsxAttributeName::Namespaced {
                    namespace: self.next(&mut parts, span)?.as_str(),
                    name: self.next(&mut parts, span)?.as_str(),
                }
            }
            _ => JsxAttributeName::Identifier(name_inner.as_str()),
        };
        let value = match inner.next() {
            None => None,
            Some(v) => Some(match v.as_rule() {
                Rule::jsx_string => {
                    let raw = v.as_str();
                    let decoded = html_escape::decode_html_entities(&raw[1..raw.len() - 1]);
                    JsxAttributeValue::String(self.arena.alloc_str(&decoded))
                }
                Rule::jsx_expression_container => {
                    JsxAttributeValue::Expression(v.into_inner().next().map(|e| self.expr(e)).transpose()?)
                }
                Rule::jsx_element => JsxAttributeValue::Element(self.jsx_element(v)?),
                Rule::jsx_fragment => JsxAttributeValue::Fragment(self.jsx_fragment(v)?),
                rule => {
                    return Err(self.error(
                        ParseErrorKind::Other {
                            message: format!("Unhandled JSX attribute value: {:?}", rule),
                        },
                        span.into(),
                    ));
                }
            }),
        };
        Ok(JsxAttribute::Attribute { name, value })
    }
}

// ---------------------------------------------------------------------------
// Token helpers
// ---------------------------------------------------------------------------

fn declaration_kind(text: &str) -> DeclarationKind {
    match text {
        "const" => DeclarationKind::Const,
        "let" => DeclarationKind::Let,
        _ => DeclarationKind::Var,
    }
}

fn assign_op(text: &str) -> AssignOp {
    match text {
        "+=" => AssignOp::Compound(BinaryOp::Add),
        "-=" => AssignOp::Compound(BinaryOp::Sub),
        "*=" => AssignOp::Compound(BinaryOp::Mul),
        "/=" => AssignOp::Compound(BinaryOp::Div),
        "%=" => AssignOp::Compound(BinaryOp::Rem),
        "**=" => AssignOp::Compound(BinaryOp::Pow),
        "<<=" => AssignOp::Compound(BinaryOp::Shl),
        ">>=" => AssignOp::Compound(BinaryOp::Shr),
        ">>>=" => AssignOp::Compound(BinaryOp::UShr),
        "&=" => AssignOp::Compound(BinaryOp::BitAnd),
        "|=" => AssignOp::Compound(BinaryOp::BitOr),
        "^=" => AssignOp::Compound(BinaryOp::BitXor),
        "&&=" => AssignOp::Logical(LogicalOp::And),
        "||=" => AssignOp::Logical(LogicalOp::Or),
        "??=" => AssignOp::Logical(LogicalOp::Nullish),
        _ => AssignOp::Assign,
    }
}

fn binary_op(rule: Rule) -> Option<BinaryOp> {
    Some(match rule {
        Rule::add => BinaryOp::Add,
        Rule::sub => BinaryOp::Sub,
        Rule::mul => BinaryOp::Mul,
        Rule::div => BinaryOp::Div,
        Rule::rem => BinaryOp::Rem,
        Rule::pow => BinaryOp::Pow,
        Rule::eq => BinaryOp::Eq,
        Rule::ne => BinaryOp::NotEq,
        Rule::strict_eq => BinaryOp::StrictEq,
        Rule::strict_ne => BinaryOp::StrictNotEq,
        Rule::lt => BinaryOp::Lt,
        Rule::le => BinaryOp::LtEq,
        Rule::gt => BinaryOp::Gt,
        Rule::ge => BinaryOp::GtEq,
        Rule::shl => BinaryOp::Shl,
        Rule::shr => BinaryOp::Shr,
        Rule::ushr => BinaryOp::UShr,
        Rule::bit_and => BinaryOp::BitAnd,
        Rule::bit_or => BinaryOp::BitOr,
        Rule::bit_xor => BinaryOp::BitXor,
        Rule::in_op => BinaryOp::In,
        Rule::instanceof => BinaryOp::InstanceOf,
        _ => return None,
    })
}

fn unary_op(rule: Rule) -> Option<UnaryOp> {
    Some(match rule {
        Rule::op_minus => UnaryOp::Minus,
        Rule::op_plus => UnaryOp::Plus,
        Rule::op_not => UnaryOp::Not,
        Rule::op_bit_not => UnaryOp::BitNot,
        Rule::op_typeof => UnaryOp::TypeOf,
        Rule::op_void => UnaryOp::Void,
        Rule::op_delete => UnaryOp::Delete,
        _ => return None,
    })
}

pub(crate) fn parse_number(text: &str) -> Option<f64> {
    let text: String = text.chars().filter(|c| *c != '_').collect();
    let radix = match text.get(..2) {
        Some("0x") | Some("0X") => 16,
        Some("0o") | Some("0O") => 8,
        Some("0b") | Some("0B") => 2,
        _ => return text.parse::<f64>().ok(),
    };
    let mut value = 0f64;
    for c in text[2..].chars() {
        value = value * radix as f64 + c.to_digit(radix)? as f64;
    }
    Some(value)
}

/// Processes escape sequences of string and template literals.
pub(crate) fn unescape(raw: &str) -> Option<String> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let escaped = chars.next()?;
        match escaped {
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            'b' => out.push('\u{8}'),
            'f' => out.push('\u{c}'),
            'v' => out.push('\u{b}'),
            '0' if !chars.peek().is_some_and(|c| c.is_ascii_digit()) => out.push('\0'),
            'x' => {
                let hex: String = (0..2).filter_map(|_| chars.next()).collect();
                out.push(char::from_u32(u32::from_str_radix(&hex, 16).ok()?)?);
            }
            'u' => {
                let code = if chars.peek() == Some(&'{') {
                    chars.next();
                    let mut hex = String::new();
                    loop {
                        match chars.next()? {
                            '}' => break,
                            h => hex.push(h),
                        }
                    }
                    u32::from_str_radix(&hex, 16).ok()?
                } else {
                    let hex: String = (0..4).filter_map(|_| chars.next()).collect();
                    u32::from_str_radix(&hex, 16).ok()?
                };
                if (0xD800..0xDC00).contains(&code) {
                    // High surrogate: try to pair with a following `\uXXXX`.
                    let mut lookahead = chars.clone();
                    let low = if lookahead.next() == Some('\\') && lookahead.next() == Some('u') {
                        let hex: String = (0..4).filter_map(|_| lookahead.next()).collect();
                        u32::from_str_radix(&hex, 16).ok()
                    } else {
                        None
                    };
                    match low {
                        Some(low) if (0xDC00..0xE000).contains(&low) => {
                            let combined = 0x10000 + ((code - 0xD800) << 10) + (low - 0xDC00);
                            out.push(char::from_u32(combined)?);
                            chars = lookahead;
                        }
                        _ => out.push('\u{FFFD}'),
                    }
                } else {
                    out.push(char::from_u32(code).unwrap_or('\u{FFFD}'));
                }
            }
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
            }
            '\n' | '\u{2028}' | '\u{2029}' => {}
            other => out.push(other),
        }
    }
    Some(out)
}

/// Collapses JSX text the way JSX compilers do: lines are trimmed, blank lines
/// dropped and the remaining lines joined with a single space.
pub(crate) fn clean_jsx_text(text: &str) -> String {
    let lines: Vec<&str> = text.split('\n').map(|l| l.strip_suffix('\r').unwrap_or(l)).collect();
    let last_non_empty = lines
        .iter()
        .rposition(|line| line.chars().any(|c| c != ' ' && c != '\t'));

    let mut out = String::new();
    for (i, line) in lines.iter().enumerate() {
        let mut trimmed = line.replace('\t', " ");
        if i != 0 {
            trimmed = trimmed.trim_start_matches(' ').to_string();
        }
        if i != lines.len() - 1 {
            trimmed = trimmed.trim_end_matches(' ').to_string();
        }
        if !trimmed.is_empty() {
            out.push_str(&trimmed);
            if Some(i) != last_non_empty {
                out.push(' ');
            }
        }
    }
    out
}
