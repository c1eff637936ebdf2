mod cases;

use indoc::indoc;

test_case!(
    getters_and_static_methods,
    input: indoc! {"
        class A {
            constructor(x) { this.x = x; }
            get double() { return this.x * 2; }
            static make() { return new A(4); }
        }
        A.make().double
    "},
    value: Ok("8"),
);

test_case!(
    setters_run_on_assignment,
    input: indoc! {"
        class T {
            set v(x) { this._v = x * 10; }
            get v() { return this._v; }
        }
        const t = new T();
        t.v = 2;
        t.v
    "},
    value: Ok("20"),
);

test_case!(
    inheritance_and_super_calls,
    input: indoc! {"
        class Animal {
            constructor(name) { this.name = name; }
            speak() { return this.name + ' makes a sound'; }
        }
        class Dog extends Animal {
            constructor(name) { super(name); }
            speak() { return super.speak() + ' (woof)'; }
        }
        new Dog('Rex').speak()
    "},
    value: Ok("Rex makes a sound (woof)"),
);

test_case!(
    instance_fields_start_from_initializer,
    input: indoc! {"
        class Counter {
            count = 0;
            inc() { this.count++; return this; }
        }
        new Counter().inc().inc().count
    "},
    value: Ok("2"),
);

test_case!(
    instanceof_follows_the_class_chain,
    input: "class A {} class B extends A {} const b = new B(); [b instanceof B, b instanceof A, {} instanceof A]",
    value: Ok("[true, true, false]"),
);

test_case!(
    static_fields,
    input: "class Config { static version = 3; } Config.version",
    value: Ok("3"),
);

test_case!(
    class_requires_new,
    input: "class C {} C()",
    value: Err("TypeError: Class constructor C cannot be invoked without 'new'"),
);

test_case!(
    extends_non_constructor,
    input: "class C extends 3 {}",
    value: Err("TypeError: Class extends value 3 is not a constructor or null"),
);

test_case!(
    classes_inspect_by_name,
    input: "class Widget {} Widget",
    value: Ok("[class Widget]"),
);
