//! Tests for the array methods.

use crate::test_utils::{eval, eval_ok};
use pretty_assertions::assert_eq;

#[test]
fn test_push_pop_shift_unshift() {
    assert_eq!(eval_ok("const a = [1]; a.push(2, 3)"), "3");
    assert_eq!(eval_ok("const a = [1, 2]; a.pop(); a"), "[1]");
    assert_eq!(eval_ok("[].pop()"), "undefined");
    assert_eq!(eval_ok("const a = [1, 2]; [a.shift(), a]"), "[1, [2]]");
    assert_eq!(eval_ok("const a = [3]; a.unshift(1, 2); a"), "[1, 2, 3]");
}

#[test]
fn test_slice_and_splice() {
    assert_eq!(eval_ok("[1, 2, 3, 4].slice(1, -1)"), "[2, 3]");
    assert_eq!(eval_ok("[1, 2, 3].slice(-2)"), "[2, 3]");
    assert_eq!(eval_ok("[1, 2, 3].slice(2, 1)"), "[]");
    assert_eq!(
        eval_ok("const a = [1, 2, 3, 4]; const removed = a.splice(1, 2, 'x'); [removed, a]"),
        "[[2, 3], [1, \"x\", 4]]"
    );
    assert_eq!(eval_ok("const a = [1, 2, 3]; a.splice(1); a"), "[1]");
}

#[test]
fn test_concat_join_flat() {
    assert_eq!(eval_ok("[1].concat([2, 3], 4)"), "[1, 2, 3, 4]");
    assert_eq!(eval_ok("[1, null, 'a', undefined].join('-')"), "1--a-");
    assert_eq!(eval_ok("[1, 2].join()"), "1,2");
    assert_eq!(eval_ok("[1, [2, [3, [4]]]].flat()"), "[1, 2, [3, [4]]]");
    assert_eq!(eval_ok("[1, [2, [3, [4]]]].flat(Infinity)"), "[1, 2, 3, 4]");
}

#[test]
fn test_search() {
    assert_eq!(eval_ok("[1, 2, 3].indexOf(2)"), "1");
    assert_eq!(eval_ok("[1, 2, 3].indexOf('2')"), "-1");
    assert_eq!(eval_ok("[NaN].indexOf(NaN)"), "-1");
    assert_eq!(eval_ok("[NaN].includes(NaN)"), "true");
    assert_eq!(eval_ok("[1, 2, 3].at(-1)"), "3");
    assert_eq!(eval_ok("[1, 2, 3].at(5)"), "undefined");
}

#[test]
fn test_callbacks() {
    assert_eq!(eval_ok("[1, 2, 3].map((x, i) => x * i)"), "[0, 2, 6]");
    assert_eq!(eval_ok("[1, 2, 3, 4].filter(x => x % 2 === 0)"), "[2, 4]");
    assert_eq!(eval_ok("let s = 0; [1, 2, 3].forEach(x => { s += x; }); s"), "6");
    assert_eq!(eval_ok("[1, 2, 3].reduce((a, b) => a + b)"), "6");
    assert_eq!(eval_ok("[1, 2, 3].reduce((a, b) => a + b, 10)"), "16");
    assert_eq!(eval_ok("[5, 8, 12].find(x => x > 6)"), "8");
    assert_eq!(eval_ok("[5, 8, 12].findIndex(x => x > 100)"), "-1");
    assert_eq!(eval_ok("[1, 2].some(x => x > 1)"), "true");
    assert_eq!(eval_ok("[1, 2].every(x => x > 1)"), "false");
}

#[test]
fn test_callback_sees_snapshot() {
    assert_eq!(
        eval_ok("const a = [1, 2]; let n = 0; a.forEach(x => { a.push(x); n++; }); [n, a.length]"),
        "[2, 4]"
    );
}

#[test]
fn test_reduce_empty_without_initial_value() {
    let err = eval("[].reduce((a, b) => a + b)").unwrap_err();
    assert_eq!(err, "Reduce of empty array with no initial value");
}

#[test]
fn test_map_requires_callable() {
    let err = eval("[1].map(3)").unwrap_err();
    assert_eq!(err, "3 is not a function");
}

#[test]
fn test_sort() {
    assert_eq!(eval_ok("[10, 9, 1, undefined, 2].sort()"), "[1, 10, 2, 9, undefined]");
    assert_eq!(eval_ok("[10, 9, 1, 2].sort((a, b) => a - b)"), "[1, 2, 9, 10]");
    assert_eq!(
        eval_ok("[{ k: 1, v: 'a' }, { k: 0, v: 'b' }, { k: 1, v: 'c' }].sort((x, y) => x.k - y.k).map(o => o.v)"),
        "[\"b\", \"a\", \"c\"]"
    );
}

#[test]
fn test_sort_propagates_comparator_errors() {
    let err = eval("[2, 1].sort(() => { throw new Error('boom'); })").unwrap_err();
    assert_eq!(err, "Uncaught Error: boom");
}

#[test]
fn test_reverse_in_place() {
    assert_eq!(eval_ok("const a = [1, 2, 3]; const b = a.reverse(); [a, a === b]"), "[[3, 2, 1], true]");
}

#[test]
fn test_array_globals() {
    assert_eq!(eval_ok("Array.isArray([])"), "true");
    assert_eq!(eval_ok("Array.isArray({})"), "false");
    assert_eq!(eval_ok("Array.from('ab')"), "[\"a\", \"b\"]");
    assert_eq!(eval_ok("Array.from([1, 2], x => x + 1)"), "[2, 3]");
    assert_eq!(eval_ok("Array(3).length"), "3");
    assert_eq!(eval_ok("[] instanceof Array"), "true");
}

#[test]
fn test_length_property() {
    assert_eq!(eval_ok("[1, 2, 3].length"), "3");
}
