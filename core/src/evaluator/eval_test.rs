//! Unit tests for expression evaluation, functions, classes and the sandbox
//! options.

use std::rc::Rc;

use bumpalo::Bump;
use pretty_assertions::assert_eq;

use crate::api::EvaluateOptions;
use crate::evaluator::{Context, ErrorKind, EvalError};
use crate::parser;
use crate::test_utils::{eval, eval_ok, eval_with};
use crate::values::{Bindings, Function, Value};

// ============================================================================
// Operators
// ============================================================================

#[test]
fn test_arithmetic() {
    assert_eq!(eval_ok("1 + 2 * 3"), "7");
    assert_eq!(eval_ok("(1 + 2) * 3"), "9");
    assert_eq!(eval_ok("7 % 3"), "1");
    assert_eq!(eval_ok("-7 % 3"), "-1");
    assert_eq!(eval_ok("2 ** 3 ** 2"), "512");
    assert_eq!(eval_ok("1 / 0"), "Infinity");
    assert_eq!(eval_ok("0 / 0"), "NaN");
    assert_eq!(eval_ok("0.1 + 0.2"), "0.30000000000000004");
}

#[test]
fn test_string_concatenation_and_coercion() {
    assert_eq!(eval_ok("'a' + 1"), "a1");
    assert_eq!(eval_ok("1 + '2'"), "12");
    assert_eq!(eval_ok("'3' * '4'"), "12");
    assert_eq!(eval_ok("[1, 2] + ''"), "1,2");
    assert_eq!(eval_ok("({}) + ''"), "[object Object]");
    assert_eq!(eval_ok("true + 1"), "2");
    assert_eq!(eval_ok("null + 1"), "1");
    assert_eq!(eval_ok("undefined + 1"), "NaN");
}

#[test]
fn test_objects_become_strings_before_operators() {
    assert_eq!(eval_ok("[1] + 1"), "11");
    assert_eq!(eval_ok("({}) + 1"), "[object Object]1");
    assert_eq!(eval_ok("[] + []"), "");
    assert_eq!(eval_ok("[2] < [10]"), "false");
    assert_eq!(eval_ok("[10] > 9"), "true");
    assert_eq!(eval_ok("[1] == 1"), "true");
    assert_eq!(eval_ok("({ toString() { return 'x'; } }) + 1"), "x1");
    assert_eq!(eval_ok("class A { toString() { return '7'; } }; new A() * 2"), "14");
}

#[test]
fn test_bitwise() {
    assert_eq!(eval_ok("5 & 3"), "1");
    assert_eq!(eval_ok("5 | 3"), "7");
    assert_eq!(eval_ok("5 ^ 3"), "6");
    assert_eq!(eval_ok("~5"), "-6");
    assert_eq!(eval_ok("1 << 31"), "-2147483648");
    assert_eq!(eval_ok("-16 >> 2"), "-4");
    assert_eq!(eval_ok("-16 >>> 28"), "15");
}

#[test]
fn test_equality() {
    assert_eq!(eval_ok("1 == '1'"), "true");
    assert_eq!(eval_ok("1 === '1'"), "false");
    assert_eq!(eval_ok("null == undefined"), "true");
    assert_eq!(eval_ok("null === undefined"), "false");
    assert_eq!(eval_ok("NaN == NaN"), "false");
    assert_eq!(eval_ok("const o = {}; o === o"), "true");
    assert_eq!(eval_ok("({}) === ({})"), "false");
    assert_eq!(eval_ok("'b' > 'a'"), "true");
    assert_eq!(eval_ok("'10' < '9'"), "true");
    assert_eq!(eval_ok("10 < 9"), "false");
}

#[test]
fn test_logical_operators_short_circuit() {
    assert_eq!(eval_ok("0 || 'fallback'"), "fallback");
    assert_eq!(eval_ok("0 ?? 'fallback'"), "0");
    assert_eq!(eval_ok("null ?? 'fallback'"), "fallback");
    assert_eq!(eval_ok("'' && explode()"), "");
    assert_eq!(eval_ok("let n = 0; true || n++; n"), "0");
}

#[test]
fn test_unary() {
    assert_eq!(eval_ok("typeof 1"), "number");
    assert_eq!(eval_ok("typeof 'a'"), "string");
    assert_eq!(eval_ok("typeof null"), "object");
    assert_eq!(eval_ok("typeof (() => 1)"), "function");
    assert_eq!(eval_ok("typeof notDeclared"), "undefined");
    assert_eq!(eval_ok("!''"), "true");
    assert_eq!(eval_ok("+'3'"), "3");
    assert_eq!(eval_ok("void 1"), "undefined");
    assert_eq!(eval_ok("const o = { a: 1 }; delete o.a; o"), "{}");
}

#[test]
fn test_update_and_compound_assignment() {
    assert_eq!(eval_ok("let i = 1; [i++, i]"), "[1, 2]");
    assert_eq!(eval_ok("let i = 1; [++i, i]"), "[2, 2]");
    assert_eq!(eval_ok("let i = 10; i -= 3; i *= 2; i"), "14");
    assert_eq!(eval_ok("const o = { n: 1 }; o.n += 4; o.n"), "5");
    assert_eq!(eval_ok("let a = null; a ??= 3; a"), "3");
    assert_eq!(eval_ok("let a = 1; a ||= 3; a"), "1");
    assert_eq!(eval_ok("let a = 1; a &&= 3; a"), "3");
}

#[test]
fn test_conditional_and_sequence() {
    assert_eq!(eval_ok("1 > 2 ? 'yes' : 'no'"), "no");
    assert_eq!(eval_ok("(1, 2, 3)"), "3");
}

// ============================================================================
// Literals and member access
// ============================================================================

#[test]
fn test_template_literals() {
    assert_eq!(eval_ok("const n = 3; `n=${n}, twice=${n * 2}`"), "n=3, twice=6");
    assert_eq!(eval_ok("`a${[1, 2]}b`"), "a1,2b");
    assert_eq!(eval_ok("`line\\n`.length"), "5");
}

#[test]
fn test_tagged_template() {
    assert_eq!(
        eval_ok("function tag(strings, ...values) { return strings.join('|') + values.join(','); } tag`a${1}b${2}c`"),
        "a|b|c1,2"
    );
}

#[test]
fn test_object_literals() {
    assert_eq!(eval_ok("const k = 'b'; ({ a: 1, [k]: 2, ['c' + 1]: 3 })"), "{ a: 1, b: 2, c1: 3 }");
    assert_eq!(eval_ok("const a = 1; ({ a })"), "{ a: 1 }");
    assert_eq!(eval_ok("({ ...{ a: 1, b: 2 }, b: 3 })"), "{ a: 1, b: 3 }");
    assert_eq!(eval_ok("({ ...null, a: 1 })"), "{ a: 1 }");
    assert_eq!(eval_ok("({ f() { return this.x; }, x: 7 }).f()"), "7");
}

#[test]
fn test_object_accessors() {
    assert_eq!(
        eval_ok("const o = { _v: 1, get v() { return this._v * 10; }, set v(x) { this._v = x; } }; o.v = 5; o.v"),
        "50"
    );
}

#[test]
fn test_array_literals() {
    assert_eq!(eval_ok("[1, ...[2, 3], ...'ab']"), "[1, 2, 3, \"a\", \"b\"]");
    assert_eq!(eval_ok("[1, , 3]"), "[1, undefined, 3]");
    assert_eq!(eval_ok("const a = [1]; a[3] = 4; a"), "[1, undefined, undefined, 4]");
    assert_eq!(eval_ok("const a = [1, 2, 3]; a.length = 1; a"), "[1]");
}

#[test]
fn test_array_growth_is_bounded() {
    let err = eval("const a = []; a.length = 1e15; a.length").unwrap_err();
    assert!(err.contains("RangeError: Invalid array length"), "{}", err);
    let err = eval("const a = []; a[4000000000000] = 1").unwrap_err();
    assert!(err.contains("RangeError"), "{}", err);
    assert_eq!(
        eval_ok("const a = [1]; try { a.length = -1; } catch (e) { e.name + ' ' + a.length }"),
        "RangeError 1"
    );
    let err = eval("let s = 'x'; for (let i = 0; i < 40; i++) { s = s + s; }").unwrap_err();
    assert!(err.contains("Invalid string length"), "{}", err);
}

#[test]
fn test_optional_chaining() {
    assert_eq!(eval_ok("const o = null; o?.a.b.c"), "undefined");
    assert_eq!(eval_ok("const o = { a: null }; o.a?.b"), "undefined");
    assert_eq!(eval_ok("const o = {}; o.f?.()"), "undefined");
    assert_eq!(eval_ok("const o = { a: { b: 2 } }; o?.a?.['b']"), "2");
}

#[test]
fn test_reading_from_nullish_is_a_type_error() {
    let err = eval("const o = undefined; o.x").unwrap_err();
    assert_eq!(err, "Cannot read properties of undefined (reading 'x')");
}

#[test]
fn test_string_indexing() {
    assert_eq!(eval_ok("'hey'[1]"), "e");
    assert_eq!(eval_ok("'hey'.length"), "3");
}

// ============================================================================
// Functions
// ============================================================================

#[test]
fn test_closures_capture_scope() {
    assert_eq!(
        eval_ok("function counter() { let n = 0; return () => ++n; } const c = counter(); c(); c(); c()"),
        "3"
    );
}

#[test]
fn test_default_and_rest_parameters() {
    assert_eq!(eval_ok("function f(a, b = a + 1) { return [a, b]; } f(1)"), "[1, 2]");
    assert_eq!(eval_ok("function f(a, ...rest) { return rest; } f(1, 2, 3)"), "[2, 3]");
    assert_eq!(eval_ok("((a, b) => a + b)(...[1, 2])"), "3");
}

#[test]
fn test_function_hoisting() {
    assert_eq!(eval_ok("const r = f(); function f() { return 'hoisted'; } r"), "hoisted");
}

#[test]
fn test_named_function_expression_sees_itself() {
    assert_eq!(
        eval_ok("const fact = function f(n) { return n <= 1 ? 1 : n * f(n - 1); }; fact(5)"),
        "120"
    );
}

#[test]
fn test_arrow_functions_capture_this() {
    assert_eq!(
        eval_ok("const o = { x: 1, f() { return [2, 3].map(y => this.x + y); } }; o.f()"),
        "[3, 4]"
    );
}

#[test]
fn test_new_with_plain_function() {
    assert_eq!(eval_ok("function P(x) { this.x = x; } const p = new P(4); [p.x, p instanceof P]"), "[4, true]");
}

#[test]
fn test_arrow_is_not_a_constructor() {
    let err = eval("const A = () => {}; new A()").unwrap_err();
    assert_eq!(err, "A is not a constructor");
}

#[test]
fn test_calling_non_function() {
    let err = eval("const x = 1; x()").unwrap_err();
    assert_eq!(err, "x is not a function");
}

#[test]
fn test_call_depth_limit() {
    let options = EvaluateOptions {
        max_call_depth: 20,
        ..Default::default()
    };
    let err = eval_with("function f() { return f(); } f()", options).unwrap_err();
    assert_eq!(
        err,
        "Maximum call stack size exceeded: depth 21 exceeds maximum of 20"
    );
}

#[test]
fn test_stack_overflow_is_not_catchable() {
    let options = EvaluateOptions {
        max_call_depth: 10,
        ..Default::default()
    };
    let result = eval_with(
        "function f() { return f(); } let caught = false; try { f(); } catch (e) { caught = true; } caught",
        options,
    );
    assert!(result.is_err());
}

#[test]
fn test_recursion_up_to_the_default_call_depth() {
    assert_eq!(
        eval_ok("function f(n) { return n <= 0 ? 0 : 1 + f(n - 1); } f(250)"),
        "250"
    );
    let err = eval("function f(n) { return n <= 0 ? 0 : 1 + f(n - 1); } f(300)").unwrap_err();
    assert!(err.starts_with("Maximum call stack size exceeded"), "{}", err);
}

#[test]
fn test_deeply_nested_expressions_evaluate() {
    let source = format!("{}1{}", "[".repeat(200), "]".repeat(200));
    let result = eval_ok(&format!("const a = {}; a.length", source));
    assert_eq!(result, "1");
}

// ============================================================================
// Classes
// ============================================================================

#[test]
fn test_class_basics() {
    let source = "
        class Point {
            constructor(x, y) { this.x = x; this.y = y; }
            sum() { return this.x + this.y; }
            get norm1() { return Math.abs(this.x) + Math.abs(this.y); }
            static origin() { return new Point(0, 0); }
        }
        const p = new Point(3, -4);
        [p.sum(), p.norm1, Point.origin().x, p instanceof Point]
    ";
    assert_eq!(eval_ok(source), "[-1, 7, 0, true]");
}

#[test]
fn test_class_inheritance_and_super() {
    let source = "
        class Animal {
            constructor(name) { this.name = name; }
            speak() { return this.name + ' makes a sound'; }
        }
        class Dog extends Animal {
            constructor(name) { super(name); this.kind = 'dog'; }
            speak() { return super.speak() + ' (woof)'; }
        }
        const d = new Dog('Rex');
        [d.speak(), d.kind, d instanceof Animal, d instanceof Dog]
    ";
    assert_eq!(
        eval_ok(source),
        "[\"Rex makes a sound (woof)\", \"dog\", true, true]"
    );
}

#[test]
fn test_class_fields_and_implicit_constructor() {
    let source = "
        class Base { constructor(v) { this.v = v; } }
        class Child extends Base { extra = 2; }
        const c = new Child(1);
        [c.v, c.extra]
    ";
    assert_eq!(eval_ok(source), "[1, 2]");
}

#[test]
fn test_static_members() {
    assert_eq!(eval_ok("class C { static count = 3; static twice() { return this.count * 2; } } C.twice()"), "6");
}

#[test]
fn test_calling_class_without_new() {
    let err = eval("class C {} C()").unwrap_err();
    assert_eq!(err, "Class constructor C cannot be invoked without 'new'");
}

#[test]
fn test_extends_non_constructor() {
    let err = eval("class C extends 3 {}").unwrap_err();
    assert_eq!(err, "Class extends value 3 is not a constructor or null");
}

// ============================================================================
// Sandbox options
// ============================================================================

#[test]
fn test_unresolved_identifiers_are_undefined_by_default() {
    assert_eq!(eval_ok("missing"), "undefined");
}

#[test]
fn test_raise_reference_error() {
    let options = EvaluateOptions {
        raise_reference_error: true,
        ..Default::default()
    };
    assert_eq!(eval_with("missing", options).unwrap_err(), "missing is not defined");
}

#[test]
fn test_disable_call_skips_callee_and_arguments() {
    let options = EvaluateOptions {
        disable_call: true,
        ..Default::default()
    };
    assert_eq!(
        eval_with("let n = 0; const f = () => n++; [f(n++), n]", options).unwrap(),
        "[undefined, 0]"
    );
}

#[test]
fn test_disable_new() {
    let options = EvaluateOptions {
        disable_new: true,
        ..Default::default()
    };
    assert_eq!(eval_with("class C {} [new C(), Math.abs(-1)]", options).unwrap(), "[undefined, 1]");
}

fn run_with_whitelist(source: &'static str, allow_user_defined_function: bool) -> Result<String, String> {
    let arena = Bump::new();
    let program = parser::parse(&arena, source).map_err(|e| e.to_string())?;
    let allowed = Value::function(Function::native("allowed", |_, _, _| Ok(Value::from("ok"))));
    let denied = Value::function(Function::native("denied", |_, _, _| Ok(Value::from("no"))));
    let mut ctx = Context::builder()
        .options(EvaluateOptions {
            allow_user_defined_function,
            ..Default::default()
        })
        .global("allowed", allowed.clone())
        .global("denied", denied)
        .allowed_functions([allowed])
        .build();
    ctx.exec_program(program, &Bindings::new())
        .map(|v| v.inspect())
        .map_err(|e| e.to_string())
}

#[test]
fn test_whitelist_admits_listed_functions() {
    assert_eq!(run_with_whitelist("allowed()", false).unwrap(), "ok");
}

#[test]
fn test_whitelist_rejects_unlisted_functions() {
    assert_eq!(
        run_with_whitelist("denied()", false).unwrap_err(),
        "denied is not allowed function"
    );
}

#[test]
fn test_whitelist_violation_is_not_catchable() {
    assert_eq!(
        run_with_whitelist("try { denied(); } catch (e) {} 1", false).unwrap_err(),
        "denied is not allowed function"
    );
}

#[test]
fn test_whitelist_and_user_defined_functions() {
    assert_eq!(
        run_with_whitelist("const f = () => 1; f()", false).unwrap_err(),
        "f is not allowed function"
    );
    assert_eq!(run_with_whitelist("const f = () => 1; f()", true).unwrap(), "1");
}

#[test]
fn test_admitted_functions_leave_whitelist_unchanged() {
    let arena = Bump::new();
    let source = "const fs = []; \
        for (let i = 0; i < 100; i++) { fs.push(() => i); } \
        class A { value() { return fs[99](); } } \
        new A().value() + allowed().length";
    let program = parser::parse(&arena, source).unwrap();
    let allowed = Value::function(Function::native("allowed", |_, _, _| Ok(Value::from("ok"))));
    let mut ctx = Context::builder()
        .options(EvaluateOptions {
            allow_user_defined_function: true,
            ..Default::default()
        })
        .global("allowed", allowed.clone())
        .allowed_functions([allowed])
        .build();
    let value = ctx.exec_program(program, &Bindings::new()).unwrap();
    assert_eq!(value.inspect(), "101");
    assert_eq!(ctx.allowed_count(), Some(1));
}

#[test]
fn test_intrinsics_bypass_whitelist() {
    assert_eq!(run_with_whitelist("[1, 2].map(x => x).length", false).unwrap(), "2");
}

#[test]
fn test_override_bindings_shadow_scope() {
    let arena = Bump::new();
    let program = parser::parse(&arena, "const x = 1; x + y").unwrap();
    let mut ctx = Context::new(EvaluateOptions::default());
    let bindings = Bindings::new()
        .with("x", Value::from(10))
        .with("y", Value::from(5));
    let value = ctx.exec_program(program, &bindings).unwrap();
    assert_eq!(value.inspect(), "15");
}

#[test]
fn test_unsupported_constructs() {
    assert_eq!(eval("async function f() {}").unwrap_err(), "async function is not supported");
    assert_eq!(eval("function* g() {}").unwrap_err(), "generator function is not supported");
}

#[test]
fn test_failed_program_restores_context_state() {
    let arena = Bump::new();
    let source = "class Boom { \
            constructor(items) { \
                for (const item of items) { \
                    [item].map(x => { if (x > 1) throw new Error('boom ' + x); return x; }); \
                } \
            } \
        } \
        new Boom([1, 2, 3]);";
    let program = parser::parse(&arena, source).unwrap();
    let mut ctx = Context::new(EvaluateOptions::default());
    let scope = ctx.scope().clone();

    let err = ctx.exec_program(program, &Bindings::new()).unwrap_err();
    assert_eq!(err.to_string(), "Uncaught Error: boom 2");
    assert_eq!(ctx.receiver_depth(), 0);
    assert_eq!(ctx.call_depth(), 0);
    assert!(Rc::ptr_eq(ctx.scope(), &scope));

    let program = parser::parse(&arena, "typeof Boom").unwrap();
    let value = ctx.exec_program(program, &Bindings::new()).unwrap();
    assert_eq!(value.inspect(), "function");
}

#[test]
fn test_error_trail_names_each_node_once() {
    let arena = Bump::new();
    let program = parser::parse(&arena, "const o = null;\no.a;").unwrap();
    let mut ctx = Context::new(EvaluateOptions::default());
    let err = ctx.exec_program(program, &Bindings::new()).unwrap_err();
    assert_eq!(err.context, vec!["MemberExpression", "ExpressionStatement"]);

    let program = parser::parse(&arena, "const f = (x) => x;\nf(o.a.b);").unwrap();
    let err = ctx.exec_program(program, &Bindings::new()).unwrap_err();
    assert_eq!(
        err.context,
        vec!["MemberExpression", "CallExpression", "ExpressionStatement"]
    );
}

#[test]
fn test_error_records_location_and_trail() {
    let arena = Bump::new();
    let program = parser::parse(&arena, "const o = null;\nconst v = o.prop;").unwrap();
    let mut ctx = Context::new(EvaluateOptions::default());
    let err: EvalError<'_> = ctx.exec_program(program, &Bindings::new()).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::Type(_)));
    let loc = err.loc.expect("location");
    assert_eq!(loc.start.line, 2);
    assert_eq!(err.context.first().map(String::as_str), Some("MemberExpression"));
    assert_eq!(err.context.last().map(String::as_str), Some("VariableDeclaration"));
}
