mod cases;

use indoc::indoc;

test_case!(
    named_and_default_exports,
    input: indoc! {"
        export const a = 1, b = 2;
        export function double(x) { return x * 2; }
        const hidden = 'h';
        export { hidden as visible };
        export default double(21);
    "},
    exports: Ok(indoc! {r#"
        a = 1
        b = 2
        default = 42
        double = [Function: double]
        visible = h"#}),
);

test_case!(
    exported_class,
    input: "export class Card {} export let count = 0; count = 5;",
    exports: Ok("Card = [class Card]\ncount = 0"),
);

test_case!(
    export_default_function_is_declared,
    input: "export default function main() { return 'ran'; } main()",
    value: Ok("ran"),
    exports: Ok("default = [Function: main]"),
);

test_case!(
    completion_value_alongside_exports,
    input: "export const n = 2; n * 3",
    value: Ok("6"),
    exports: Ok("n = 2"),
);

test_case!(
    imports_are_rejected,
    input: "import x from 'y';",
    value: Err("UnsupportedError: import is not supported"),
);

test_case!(
    no_exports,
    input: "1 + 1",
    exports: Ok(""),
);
