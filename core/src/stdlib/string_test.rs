//! Tests for the string methods.

use crate::test_utils::{eval, eval_ok};
use pretty_assertions::assert_eq;

#[test]
fn test_inspection() {
    assert_eq!(eval_ok("'héllo'.length"), "5");
    assert_eq!(eval_ok("'abc'.charAt(1)"), "b");
    assert_eq!(eval_ok("'abc'.charAt(9)"), "");
    assert_eq!(eval_ok("'A'.charCodeAt(0)"), "65");
    assert_eq!(eval_ok("'abcabc'.indexOf('c')"), "2");
    assert_eq!(eval_ok("'abcabc'.indexOf('c', 3)"), "5");
    assert_eq!(eval_ok("'héllo'.indexOf('l')"), "2");
    assert_eq!(eval_ok("'abc'.includes('bc')"), "true");
    assert_eq!(eval_ok("'abc'.startsWith('ab')"), "true");
    assert_eq!(eval_ok("'abc'.endsWith('b', 2)"), "true");
    assert_eq!(eval_ok("'abc'.at(-1)"), "c");
}

#[test]
fn test_extraction() {
    assert_eq!(eval_ok("'hello'.slice(1, -1)"), "ell");
    assert_eq!(eval_ok("'hello'.slice(-3)"), "llo");
    assert_eq!(eval_ok("'hello'.substring(3, 1)"), "el");
    assert_eq!(eval_ok("'hello'.substring(-2, 2)"), "he");
    assert_eq!(eval_ok("'a,b,,c'.split(',')"), "[\"a\", \"b\", \"\", \"c\"]");
    assert_eq!(eval_ok("'abc'.split('')"), "[\"a\", \"b\", \"c\"]");
    assert_eq!(eval_ok("'a b c'.split(' ', 2)"), "[\"a\", \"b\"]");
    assert_eq!(eval_ok("'abc'.split()"), "[\"abc\"]");
}

#[test]
fn test_case_and_whitespace() {
    assert_eq!(eval_ok("'MiXeD'.toUpperCase()"), "MIXED");
    assert_eq!(eval_ok("'MiXeD'.toLowerCase()"), "mixed");
    assert_eq!(eval_ok("'  x  '.trim() + '|'"), "x|");
    assert_eq!(eval_ok("'  x  '.trimStart() + '|'"), "x  |");
    assert_eq!(eval_ok("'|' + '  x  '.trimEnd()"), "|  x");
}

#[test]
fn test_replace() {
    assert_eq!(eval_ok("'a-b-c'.replace('-', '+')"), "a+b-c");
    assert_eq!(eval_ok("'a-b-c'.replaceAll('-', '+')"), "a+b+c");
    assert_eq!(eval_ok("'abc'.replace('b', '[$&]')"), "a[b]c");
    assert_eq!(eval_ok("'abc'.replace('b', '$$')"), "a$c");
    assert_eq!(eval_ok("'aXbX'.replaceAll('X', (m, i) => i)"), "a1b3");
    assert_eq!(eval_ok("'abc'.replace('z', 'y')"), "abc");
}

#[test]
fn test_building() {
    assert_eq!(eval_ok("'ab'.repeat(3)"), "ababab");
    assert_eq!(eval_ok("'5'.padStart(3, '0')"), "005");
    assert_eq!(eval_ok("'5'.padEnd(4, 'ab')"), "5aba");
    assert_eq!(eval_ok("'long'.padStart(2)"), "long");
    assert_eq!(eval_ok("'a'.concat(1, true)"), "a1true");
}

#[test]
fn test_repeat_rejects_negative_counts() {
    let err = eval("'a'.repeat(-1)").unwrap_err();
    assert_eq!(err, "Uncaught RangeError: Invalid count value: -1");
}

#[test]
fn test_string_conversion() {
    assert_eq!(eval_ok("String(12)"), "12");
    assert_eq!(eval_ok("String(null)"), "null");
    assert_eq!(eval_ok("String({ toString() { return 'custom'; } })"), "custom");
    assert_eq!(eval_ok("String()"), "");
}
