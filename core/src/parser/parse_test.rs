use bumpalo::Bump;
use pest::Parser;
use pest::iterators::Pair;
use pretty_assertions::assert_eq;

use super::parser::{parse, parse_with_options};
use crate::api::ParseOptions;
use crate::ast::*;
use crate::parser::{JsxParser, ParseErrorKind, Rule};

// Renders an expression as a parenthesized tree so that two sources can be
// compared structurally, ignoring locations.
fn sexp(expr: &Expr) -> String {
    match &expr.kind {
        ExprKind::Literal(Literal::Null) => "null".to_string(),
        ExprKind::Literal(Literal::Bool(b)) => b.to_string(),
        ExprKind::Literal(Literal::Number(n)) => n.to_string(),
        ExprKind::Literal(Literal::String(s)) => format!("{:?}", s),
        ExprKind::Identifier(name) => name.to_string(),
        ExprKind::This => "this".to_string(),
        ExprKind::Binary { op, left, right } => format!("({} {} {})", op, sexp(left), sexp(right)),
        ExprKind::Logical { op, left, right } => {
            let op = match op {
                LogicalOp::And => "&&",
                LogicalOp::Or => "||",
                LogicalOp::Nullish => "??",
            };
            format!("({} {} {})", op, sexp(left), sexp(right))
        }
        ExprKind::Unary { op, argument } => format!("({:?} {})", op, sexp(argument)),
        ExprKind::Update {
            op,
            prefix,
            argument,
        } => format!("({:?}{} {})", op, if *prefix { "Pre" } else { "Post" }, sexp(argument)),
        ExprKind::Conditional {
            test,
            consequent,
            alternate,
        } => format!("(? {} {} {})", sexp(test), sexp(consequent), sexp(alternate)),
        ExprKind::Assignment { op, target, value } => {
            format!("(= {:?} {} {})", op, pattern(target), sexp(value))
        }
        ExprKind::Member {
            object,
            property,
            optional,
        } => {
            let dot = if *optional { "?." } else { "." };
            match property {
                MemberProperty::Identifier(name) => format!("{}{}{}", sexp(object), dot, name),
                MemberProperty::Private(name) => format!("{}{}#{}", sexp(object), dot, name),
                MemberProperty::Computed(key) => format!("{}{}[{}]", sexp(object), dot, sexp(key)),
            }
        }
        ExprKind::Call {
            callee,
            arguments,
            optional,
        } => format!(
            "{}{}({})",
            sexp(callee),
            if *optional { "?." } else { "" },
            args(arguments)
        ),
        ExprKind::New { callee, arguments } => format!("new {}({})", sexp(callee), args(arguments)),
        ExprKind::Chain(inner) => format!("chain[{}]", sexp(inner)),
        ExprKind::Sequence(items) => {
            let items: Vec<String> = items.iter().map(|e| sexp(e)).collect();
            format!("(, {})", items.join(" "))
        }
        ExprKind::Array(elements) => {
            let items: Vec<String> = elements
                .iter()
                .map(|e| match e {
                    ArrayElement::Expr(e) => sexp(e),
                    ArrayElement::Spread(e) => format!("...{}", sexp(e)),
                    ArrayElement::Hole => "_".to_string(),
                })
                .collect();
            format!("[{}]", items.join(", "))
        }
        ExprKind::Await(e) => format!("(await {})", sexp(e)),
        other => format!("<{:?}>", std::mem::discriminant(other)),
    }
}

fn args(arguments: &[Argument]) -> String {
    arguments
        .iter()
        .map(|a| match a {
            Argument::Expr(e) => sexp(e),
            Argument::Spread(e) => format!("...{}", sexp(e)),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn pattern(p: &Pattern) -> String {
    match p {
        Pattern::Identifier(name) => name.to_string(),
        Pattern::Member(e) => sexp(e),
        Pattern::Assignment { target, default } => format!("{}={}", pattern(target), sexp(default)),
        Pattern::Array { elements, rest } => {
            let mut items: Vec<String> = elements
                .iter()
                .map(|e| e.map_or("_".to_string(), pattern))
                .collect();
            if let Some(rest) = rest {
                items.push(format!("...{}", pattern(rest)));
            }
            format!("[{}]", items.join(", "))
        }
        Pattern::Object { properties, rest } => {
            let mut items: Vec<String> = properties
                .iter()
                .map(|p| match p.key {
                    PropertyKey::Static(k) => format!("{}: {}", k, pattern(p.value)),
                    _ => format!("[..]: {}", pattern(p.value)),
                })
                .collect();
            if let Some(rest) = rest {
                items.push(format!("...{}", pattern(rest)));
            }
            format!("{{{}}}", items.join(", "))
        }
    }
}

fn expr<'a>(arena: &'a Bump, source: &'a str) -> &'a Expr<'a> {
    let program = parse(arena, source)
        .unwrap_or_else(|e| panic!("Parsing failed: {}\n{}", source, e));
    match program.body {
        [Stmt {
            kind: StmtKind::Expression(e),
            ..
        }] => e,
        other => panic!("Expected a single expression statement, got {:?}", other),
    }
}

fn tree(source: &str) -> String {
    let arena = Bump::new();
    sexp(expr(&arena, source))
}

fn statements<'a>(arena: &'a Bump, source: &'a str) -> &'a [Stmt<'a>] {
    parse(arena, source)
        .unwrap_or_else(|e| panic!("Parsing failed: {}\n{}", source, e))
        .body
}

fn error_kind(source: &str) -> ParseErrorKind {
    let arena = Bump::new();
    match parse(&arena, source) {
        Ok(program) => panic!("Expected a parse error for {:?}, got {:?}", source, program.body),
        Err(e) => e.kind,
    }
}

// ---------------------------------------------------------------------------
// Precedence
// ---------------------------------------------------------------------------

#[test]
fn test_additive_vs_multiplicative() {
    assert_eq!(tree("a + b * c"), tree("a + (b * c)"));
    assert_eq!(tree("a * b + c"), tree("(a * b) + c"));
    assert_eq!(tree("a - b + c"), tree("(a - b) + c"));
}

#[test]
fn test_exponent_is_right_associative() {
    assert_eq!(tree("a ** b ** c"), tree("a ** (b ** c)"));
    assert_eq!(tree("a * b ** c"), tree("a * (b ** c)"));
}

#[test]
fn test_logical_precedence() {
    assert_eq!(tree("a || b && c"), tree("a || (b && c)"));
    assert_eq!(tree("a && b | c"), tree("a && (b | c)"));
    assert_eq!(tree("a == b && c < d"), tree("(a == b) && (c < d)"));
    assert_eq!(tree("a ?? b"), "(?? a b)");
}

#[test]
fn test_relational_and_shift() {
    assert_eq!(tree("a < b << c"), tree("a < (b << c)"));
    assert_eq!(tree("a instanceof B === true"), tree("(a instanceof B) === true"));
    assert_eq!(tree("'x' in o"), "(in \"x\" o)");
    assert_eq!(tree("a >>> 1"), "(>>> a 1)");
}

#[test]
fn test_unary_and_update() {
    assert_eq!(tree("-a + b"), tree("(-a) + b"));
    assert_eq!(tree("a + -b"), "(+ a (Minus b))");
    assert_eq!(tree("!typeof x"), "(Not (TypeOf x))");
    assert_eq!(tree("++a"), "(IncrementPre a)");
    assert_eq!(tree("a--"), "(DecrementPost a)");
    assert_eq!(tree("- -a"), "(Minus (Minus a))");
}

#[test]
fn test_conditional_and_assignment() {
    assert_eq!(tree("a ? b : c ? d : e"), tree("a ? b : (c ? d : e)"));
    assert_eq!(tree("a = b = 1"), "(= Assign a (= Assign b 1))");
    assert_eq!(tree("a += 2"), "(= Compound(Add) a 2)");
    assert_eq!(tree("a ??= b"), "(= Logical(Nullish) a b)");
    assert_eq!(tree("a, b"), "(, a b)");
}

// ---------------------------------------------------------------------------
// Member access and calls
// ---------------------------------------------------------------------------

#[test]
fn test_member_and_call_chain() {
    assert_eq!(tree("a.b[c](d, ...e)"), "a.b[c](d, ...e)");
    assert_eq!(tree("new Foo(1).bar"), "new Foo(1).bar");
    assert_eq!(tree("new a.b.C()"), "new a.b.C()");
    assert_eq!(tree("arr[0].x"), "arr[0].x");
}

#[test]
fn test_optional_chain_is_wrapped() {
    assert_eq!(tree("a?.b.c"), "chain[a?.b.c]");
    assert_eq!(tree("a?.[0]"), "chain[a?.[0]]");
    assert_eq!(tree("f?.(1)"), "chain[f?.(1)]");
    // `?.5` is a conditional followed by a number.
    assert_eq!(tree("a?.5:1"), "(? a 0.5 1)");
}

#[test]
fn test_literals() {
    assert_eq!(tree("0x1F"), "31");
    assert_eq!(tree("0b101"), "5");
    assert_eq!(tree("0o17"), "15");
    assert_eq!(tree("1_000"), "1000");
    assert_eq!(tree("1.5e2"), "150");
    assert_eq!(tree(".5"), "0.5");
    assert_eq!(tree(r#""a\nb""#), "\"a\\nb\"");
    assert_eq!(tree(r#"'\u{1F600}'"#), "\"😀\"");
    assert_eq!(tree(r#"'😀'"#), "\"😀\"");
    assert_eq!(tree(r#"'\x41'"#), "\"A\"");
    assert_eq!(tree("[1, , 2, ]"), "[1, _, 2]");
    assert_eq!(tree("[]"), "[]");
}

#[test]
fn test_keyword_prefixed_identifiers() {
    assert_eq!(tree("newValue + instanceCount"), "(+ newValue instanceCount)");
    assert_eq!(tree("typeofX"), "typeofX");
    assert_eq!(tree("inside in obj"), "(in inside obj)");
}

// ---------------------------------------------------------------------------
// Patterns
// ---------------------------------------------------------------------------

#[test]
fn test_destructuring_assignment_patterns() {
    assert_eq!(tree("[a, , b = 1, ...c] = x"), "(= Assign [a, _, b=1, ...c] x)");
    assert_eq!(tree("({ a, b: { c }, d = 2, ...e } = x)"), "(= Assign {a: a, b: {c: c}, d: d=2, ...e} x)");
    assert_eq!(tree("o.p = 1"), "(= Assign o.p 1)");
}

#[test]
fn test_invalid_assignment_targets() {
    assert_eq!(error_kind("1 = 2"), ParseErrorKind::InvalidAssignmentTarget);
    assert_eq!(error_kind("f() += 1"), ParseErrorKind::InvalidAssignmentTarget);
    assert_eq!(error_kind("[a] += 1"), ParseErrorKind::InvalidAssignmentTarget);
    assert_eq!(error_kind("a?.b = 1"), ParseErrorKind::InvalidAssignmentTarget);
    assert_eq!(error_kind("1++"), ParseErrorKind::InvalidAssignmentTarget);
}

#[test]
fn test_declaration_patterns() {
    let arena = Bump::new();
    let stmts = statements(&arena, "const { a, b: [c, ...d] } = o, e = 1;");
    let StmtKind::VariableDeclaration(decl) = &stmts[0].kind else {
        panic!("Expected a declaration, got {:?}", stmts[0].kind);
    };
    assert_eq!(decl.kind, DeclarationKind::Const);
    assert_eq!(decl.declarations.len(), 2);
    assert_eq!(pattern(decl.declarations[0].id), "{a: a, b: [c, ...d]}");

    let mut names = Vec::new();
    decl.declarations[0].id.bound_names(&mut names);
    assert_eq!(names, vec!["a", "c", "d"]);
}

#[test]
fn test_const_requires_initializer() {
    assert_eq!(error_kind("const a;"), ParseErrorKind::MissingInitializer);
}

#[test]
fn test_rest_must_be_last() {
    assert_eq!(error_kind("function f(...a, b) {}"), ParseErrorKind::RestNotLast);
}

// ---------------------------------------------------------------------------
// Statements
// ---------------------------------------------------------------------------

#[test]
fn test_statement_kinds() {
    let arena = Bump::new();
    let source = indoc::indoc! {r#"
        var x = 1;
        if (x) { x++ } else x--;
        for (let i = 0; i < 3; i++) {}
        for (const k in o) {}
        for (v of list) ;
        while (false) {}
        do { } while (false)
        try { throw 1 } catch (e) {} finally {}
        switch (x) { case 1: break; default: }
        outer: for (;;) { break outer; }
        function f(a, b = 2, ...rest) { return a }
        class A extends B { static x = 1; #y; get z() { return 1 } constructor() { super() } }
        debugger;
    "#};
    let kinds: Vec<&str> = statements(&arena, source)
        .iter()
        .map(|s| match s.kind {
            StmtKind::VariableDeclaration(_) => "var",
            StmtKind::If { .. } => "if",
            StmtKind::For { .. } => "for",
            StmtKind::ForIn { .. } => "for-in",
            StmtKind::ForOf { .. } => "for-of",
            StmtKind::While { .. } => "while",
            StmtKind::DoWhile { .. } => "do-while",
            StmtKind::Try { .. } => "try",
            StmtKind::Switch { .. } => "switch",
            StmtKind::Labeled { .. } => "labeled",
            StmtKind::FunctionDeclaration(_) => "function",
            StmtKind::ClassDeclaration(_) => "class",
            StmtKind::Debugger => "debugger",
            _ => "other",
        })
        .collect();
    assert_eq!(
        kinds,
        vec![
            "var", "if", "for", "for-in", "for-of", "while", "do-while", "try", "switch",
            "labeled", "function", "class", "debugger"
        ]
    );
}

#[test]
fn test_class_members() {
    let arena = Bump::new();
    let stmts = statements(
        &arena,
        "class A { constructor(x) {} static make() {} get v() {} set v(x) {} f = 1; static constructor() {} }",
    );
    let StmtKind::ClassDeclaration(class) = &stmts[0].kind else {
        panic!("Expected a class");
    };
    let kinds: Vec<(ClassMemberKind, bool)> =
        class.body.iter().map(|m| (m.kind, m.is_static)).collect();
    assert_eq!(
        kinds,
        vec![
            (ClassMemberKind::Constructor, false),
            (ClassMemberKind::Method, true),
            (ClassMemberKind::Get, false),
            (ClassMemberKind::Set, false),
            (ClassMemberKind::Property, false),
            (ClassMemberKind::Method, true),
        ]
    );
}

#[test]
fn test_break_label_must_share_line() {
    let arena = Bump::new();
    let stmts = statements(&arena, "a: while (1) { break\na }");
    let StmtKind::Labeled { body, .. } = &stmts[0].kind else {
        panic!("Expected labeled statement");
    };
    let StmtKind::While { body, .. } = &body.kind else {
        panic!("Expected while");
    };
    let StmtKind::Block(inner) = &body.kind else {
        panic!("Expected block");
    };
    assert!(matches!(inner[0].kind, StmtKind::Break(None)));
    assert!(matches!(inner[1].kind, StmtKind::Expression(_)));
}

#[test]
fn test_module_statements() {
    let arena = Bump::new();
    let source = indoc::indoc! {r#"
        import React from "react"
        export const a = 1;
        export default function App() {}
        export { a as b, c };
    "#};
    let stmts = statements(&arena, source);
    assert!(matches!(stmts[0].kind, StmtKind::Import));
    assert!(matches!(stmts[1].kind, StmtKind::ExportDeclaration(_)));
    assert!(matches!(stmts[2].kind, StmtKind::ExportDefault(_)));
    let StmtKind::ExportNamed { specifiers, source } = &stmts[3].kind else {
        panic!("Expected named export");
    };
    assert_eq!(source, &None);
    let pairs: Vec<(&str, &str)> = specifiers.iter().map(|s| (s.local, s.exported)).collect();
    assert_eq!(pairs, vec![("a", "b"), ("c", "c")]);
}

#[test]
fn test_template_literal_parts() {
    let arena = Bump::new();
    let ExprKind::TemplateLiteral(t) = &expr(&arena, "`a${1}\\n${x}`").kind else {
        panic!("Expected template");
    };
    let cooked: Vec<&str> = t.quasis.iter().map(|q| q.cooked).collect();
    assert_eq!(cooked, vec!["a", "\n", ""]);
    assert_eq!(t.expressions.len(), 2);
    assert_eq!(t.quasis[2].start(), Position { line: 1, column: 12 });
}

#[test]
fn test_positions() {
    let arena = Bump::new();
    let stmts = statements(&arena, "let a = 1;\n  foo(bar);");
    let StmtKind::Expression(call) = &stmts[1].kind else {
        panic!("Expected expression");
    };
    assert_eq!(call.start(), Position { line: 2, column: 2 });
    let ExprKind::Call { arguments, .. } = &call.kind else {
        panic!("Expected call");
    };
    let Argument::Expr(arg) = arguments[0] else {
        panic!("Expected argument");
    };
    assert_eq!(arg.start(), Position { line: 2, column: 6 });
}

#[test]
fn test_max_depth() {
    let arena = Bump::new();
    let source = format!("{}1{}", "(".repeat(20), ")".repeat(20));
    let options = ParseOptions {
        max_depth: 10,
        ..Default::default()
    };
    let err = parse_with_options(&arena, &source, &options).unwrap_err();
    assert!(matches!(err.kind, ParseErrorKind::MaxDepthExceeded { max_depth: 10, .. }));
}

#[test]
fn test_deep_nesting_within_limit_parses() {
    let arena = Bump::new();
    let source = format!("{}1{}", "(".repeat(50), ")".repeat(50));
    assert!(parse_with_options(&arena, &source, &ParseOptions::default()).is_ok());
    let markup = format!("{}x{}", "<b>".repeat(100), "</b>".repeat(100));
    assert!(parse_with_options(&arena, &markup, &ParseOptions::default()).is_ok());
}

#[test]
fn test_excessive_nesting_is_rejected_before_parsing() {
    let arena = Bump::new();
    let source = format!("{}1{}", "(".repeat(100_000), ")".repeat(100_000));
    let err = parse_with_options(&arena, &source, &ParseOptions::default()).unwrap_err();
    assert!(matches!(err.kind, ParseErrorKind::MaxDepthExceeded { max_depth: 256, .. }));
    let chain = "a = ".repeat(10_000) + "1";
    let err = parse_with_options(&arena, &chain, &ParseOptions::default()).unwrap_err();
    assert!(matches!(err.kind, ParseErrorKind::MaxDepthExceeded { .. }));
}

#[test]
fn test_comments_are_skipped() {
    assert_eq!(tree("a /* x */ + // y\n b"), "(+ a b)");
}

// ---------------------------------------------------------------------------
// Rule coverage
// ---------------------------------------------------------------------------

fn contains_rule(pair: Pair<Rule>, target: Rule) -> bool {
    if pair.as_rule() == target {
        return true;
    }
    pair.into_inner().any(|inner| contains_rule(inner, target))
}

macro_rules! rule_examples {
    ( $($rule:ident => [$($src:expr),* $(,)?]),* $(,)? ) => {
        $(
            #[test]
            fn $rule() {
                for input in [$($src),*] {
                    let result = JsxParser::parse(Rule::program, input)
                        .unwrap_or_else(|e| panic!("Failed to parse '{}': {}", input, e));
                    let root = result.into_iter().next().unwrap();
                    assert!(
                        contains_rule(root, Rule::$rule),
                        "Expected to find rule {:?} in parse tree for input '{}'",
                        Rule::$rule,
                        input
                    );
                }
            }
        )*
    };
}

rule_examples! {
    arrow_function => ["x => x", "(a, b) => { return a }", "async () => 1", "({ a }) => a"],
    object_method => ["({ f() {} })", "({ async g() {} })", "({ *h() {} })"],
    object_getter => ["({ get x() { return 1 } })"],
    cover_initialized => ["({ a = 1 } = {})"],
    computed_key => ["({ [k]: 1 })"],
    spread_element => ["[...a]", "f(...a)", "({ ...o })"],
    meta_property => ["function f() { new.target }"],
    yield_expr => ["function* g() { yield 1 }"],
    template_substitution => ["`a${b}c`"],
    with_statement => ["with (o) { a }"],
    export_all => ["export * from 'x'"],
    jsx_namespaced_name => ["<a:b />"],
    jsx_member_name => ["<A.B.C />"],
    jsx_spread_attribute => ["<a {...p} />"],
    jsx_spread_child => ["<a>{...c}</a>"],
}
