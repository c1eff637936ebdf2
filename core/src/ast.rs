//! Arena-allocated syntax tree for the ECMAScript + JSX subset.
//!
//! Nodes are allocated in a `bumpalo::Bump` owned by the caller and borrow from it
//! for `'a`. Every expression, statement, template element and JSX element carries
//! an optional [`SourceLocation`]; the evaluator treats a missing location as
//! `{ line: 0, column: 0 }`.

use core::fmt;

use crate::parser::Span;

/// Start position of a node. Lines are 1-based, columns 0-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Hash)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    pub start: Position,
    pub span: Span,
}

#[derive(Debug)]
pub struct Program<'a> {
    pub source: &'a str,
    pub body: &'a [Stmt<'a>],
}

// ---------------------------------------------------------------------------
// Expressions
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct Expr<'a> {
    pub kind: ExprKind<'a>,
    pub loc: Option<SourceLocation>,
}

impl<'a> Expr<'a> {
    pub fn start(&self) -> Position {
        self.loc.as_ref().map(|l| l.start).unwrap_or_default()
    }
}

#[derive(Debug)]
pub enum ExprKind<'a> {
    Literal(Literal<'a>),
    Identifier(&'a str),
    This,
    Super,
    Array(&'a [ArrayElement<'a>]),
    Object(&'a [ObjectMember<'a>]),
    Function(&'a FunctionDef<'a>),
    ArrowFunction(&'a FunctionDef<'a>),
    Class(&'a ClassDef<'a>),
    TemplateLiteral(&'a TemplateLiteral<'a>),
    TaggedTemplate {
        tag: &'a Expr<'a>,
        quasi: &'a TemplateLiteral<'a>,
    },
    Unary {
        op: UnaryOp,
        argument: &'a Expr<'a>,
    },
    Update {
        op: UpdateOp,
        prefix: bool,
        argument: &'a Expr<'a>,
    },
    Binary {
        op: BinaryOp,
        left: &'a Expr<'a>,
        right: &'a Expr<'a>,
    },
    Logical {
        op: LogicalOp,
        left: &'a Expr<'a>,
        right: &'a Expr<'a>,
    },
    Assignment {
        op: AssignOp,
        target: &'a Pattern<'a>,
        value: &'a Expr<'a>,
    },
    Conditional {
        test: &'a Expr<'a>,
        consequent: &'a Expr<'a>,
        alternate: &'a Expr<'a>,
    },
    Call {
        callee: &'a Expr<'a>,
        arguments: &'a [Argument<'a>],
        optional: bool,
    },
    New {
        callee: &'a Expr<'a>,
        arguments: &'a [Argument<'a>],
    },
    Member {
        object: &'a Expr<'a>,
        property: MemberProperty<'a>,
        optional: bool,
    },
    /// Wraps a member/call chain that contains at least one `?.` link.
    Chain(&'a Expr<'a>),
    Sequence(&'a [&'a Expr<'a>]),
    Await(&'a Expr<'a>),
    Yield(Option<&'a Expr<'a>>),
    Import(&'a [Argument<'a>]),
    MetaProperty {
        meta: &'a str,
        property: &'a str,
    },
    JsxElement(&'a JsxElement<'a>),
    JsxFragment(&'a JsxFragment<'a>),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Literal<'a> {
    Null,
    Bool(bool),
    Number(f64),
    /// Cooked string contents (escapes already processed).
    String(&'a str),
}

#[derive(Debug)]
pub enum ArrayElement<'a> {
    Expr(&'a Expr<'a>),
    Spread(&'a Expr<'a>),
    Hole,
}

#[derive(Debug)]
pub enum Argument<'a> {
    Expr(&'a Expr<'a>),
    Spread(&'a Expr<'a>),
}

#[derive(Debug)]
pub enum ObjectMember<'a> {
    Property(Property<'a>),
    Spread(&'a Expr<'a>),
    /// `{ a = 1 }`; only valid once converted into a destructuring pattern.
    CoverInitialized {
        name: &'a str,
        default: &'a Expr<'a>,
    },
}

#[derive(Debug)]
pub struct Property<'a> {
    pub key: PropertyKey<'a>,
    pub value: &'a Expr<'a>,
    pub kind: PropertyKind,
    pub method: bool,
    pub shorthand: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyKind {
    Init,
    Get,
    Set,
}

#[derive(Debug, Clone, Copy)]
pub enum PropertyKey<'a> {
    /// Identifier, string or number key, already converted to its string form.
    Static(&'a str),
    Computed(&'a Expr<'a>),
    Private(&'a str),
}

#[derive(Debug, Clone, Copy)]
pub enum MemberProperty<'a> {
    Identifier(&'a str),
    Private(&'a str),
    Computed(&'a Expr<'a>),
}

#[derive(Debug)]
pub struct TemplateLiteral<'a> {
    pub quasis: &'a [TemplateElement<'a>],
    pub expressions: &'a [&'a Expr<'a>],
}

#[derive(Debug)]
pub struct TemplateElement<'a> {
    pub cooked: &'a str,
    pub raw: &'a str,
    pub loc: Option<SourceLocation>,
}

impl<'a> TemplateElement<'a> {
    pub fn start(&self) -> Position {
        self.loc.as_ref().map(|l| l.start).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Minus,
    Plus,
    Not,
    BitNot,
    TypeOf,
    Void,
    Delete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOp {
    Increment,
    Decrement,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Pow,
    Eq,
    NotEq,
    StrictEq,
    StrictNotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    Shl,
    Shr,
    UShr,
    BitAnd,
    BitOr,
    BitXor,
    In,
    InstanceOf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
    And,
    Or,
    Nullish,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    Assign,
    /// Compound assignment such as `+=`.
    Compound(BinaryOp),
    /// `&&=`, `||=` and `??=`.
    Logical(LogicalOp),
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
            BinaryOp::Pow => "**",
            BinaryOp::Eq => "==",
            BinaryOp::NotEq => "!=",
            BinaryOp::StrictEq => "===",
            BinaryOp::StrictNotEq => "!==",
            BinaryOp::Lt => "<",
            BinaryOp::LtEq => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::GtEq => ">=",
            BinaryOp::Shl => "<<",
            BinaryOp::Shr => ">>",
            BinaryOp::UShr => ">>>",
            BinaryOp::BitAnd => "&",
            BinaryOp::BitOr => "|",
            BinaryOp::BitXor => "^",
            BinaryOp::In => "in",
            BinaryOp::InstanceOf => "instanceof",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// Functions and classes
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct FunctionDef<'a> {
    pub id: Option<&'a str>,
    pub params: &'a [&'a Pattern<'a>],
    pub rest: Option<&'a Pattern<'a>>,
    pub body: FunctionBody<'a>,
    pub is_arrow: bool,
    pub is_async: bool,
    pub is_generator: bool,
    pub loc: Option<SourceLocation>,
}

#[derive(Debug)]
pub enum FunctionBody<'a> {
    Block(&'a [Stmt<'a>]),
    Expression(&'a Expr<'a>),
}

#[derive(Debug)]
pub struct ClassDef<'a> {
    pub id: Option<&'a str>,
    pub super_class: Option<&'a Expr<'a>>,
    pub body: &'a [ClassMember<'a>],
    pub loc: Option<SourceLocation>,
}

#[derive(Debug)]
pub struct ClassMember<'a> {
    pub key: PropertyKey<'a>,
    pub kind: ClassMemberKind,
    /// Function definition for methods and accessors, initializer for fields.
    pub value: Option<&'a Expr<'a>>,
    pub is_static: bool,
    pub loc: Option<SourceLocation>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassMemberKind {
    Constructor,
    Method,
    Get,
    Set,
    Property,
}

// ---------------------------------------------------------------------------
// Patterns
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub enum Pattern<'a> {
    Identifier(&'a str),
    Object {
        properties: &'a [PatternProperty<'a>],
        rest: Option<&'a Pattern<'a>>,
    },
    Array {
        elements: &'a [Option<&'a Pattern<'a>>],
        rest: Option<&'a Pattern<'a>>,
    },
    Assignment {
        target: &'a Pattern<'a>,
        default: &'a Expr<'a>,
    },
    /// A member expression used as an assignment target (`a.b = 1`).
    Member(&'a Expr<'a>),
}

#[derive(Debug)]
pub struct PatternProperty<'a> {
    pub key: PropertyKey<'a>,
    pub value: &'a Pattern<'a>,
}

impl<'a> Pattern<'a> {
    /// Names introduced by this pattern, in source order.
    pub fn bound_names(&self, out: &mut Vec<&'a str>) {
        match self {
            Pattern::Identifier(name) => out.push(name),
            Pattern::Object { properties, rest } => {
                for prop in properties.iter() {
                    prop.value.bound_names(out);
                }
                if let Some(rest) = rest {
                    rest.bound_names(out);
                }
            }
            Pattern::Array { elements, rest } => {
                for element in elements.iter().flatten() {
                    element.bound_names(out);
                }
                if let Some(rest) = rest {
                    rest.bound_names(out);
                }
            }
            Pattern::Assignment { target, .. } => target.bound_names(out),
            Pattern::Member(_) => {}
        }
    }
}

// ---------------------------------------------------------------------------
// Statements
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct Stmt<'a> {
    pub kind: StmtKind<'a>,
    pub loc: Option<SourceLocation>,
}

#[derive(Debug)]
pub enum StmtKind<'a> {
    Expression(&'a Expr<'a>),
    Block(&'a [Stmt<'a>]),
    Empty,
    Debugger,
    VariableDeclaration(&'a VariableDeclaration<'a>),
    FunctionDeclaration(&'a FunctionDef<'a>),
    ClassDeclaration(&'a ClassDef<'a>),
    If {
        test: &'a Expr<'a>,
        consequent: &'a Stmt<'a>,
        alternate: Option<&'a Stmt<'a>>,
    },
    For {
        init: Option<ForInit<'a>>,
        test: Option<&'a Expr<'a>>,
        update: Option<&'a Expr<'a>>,
        body: &'a Stmt<'a>,
    },
    ForIn {
        left: ForHead<'a>,
        right: &'a Expr<'a>,
        body: &'a Stmt<'a>,
    },
    ForOf {
        left: ForHead<'a>,
        right: &'a Expr<'a>,
        body: &'a Stmt<'a>,
    },
    While {
        test: &'a Expr<'a>,
        body: &'a Stmt<'a>,
    },
    DoWhile {
        body: &'a Stmt<'a>,
        test: &'a Expr<'a>,
    },
    Break(Option<&'a str>),
    Continue(Option<&'a str>),
    Return(Option<&'a Expr<'a>>),
    Throw(&'a Expr<'a>),
    Try {
        block: &'a [Stmt<'a>],
        handler: Option<CatchClause<'a>>,
        finalizer: Option<&'a [Stmt<'a>]>,
    },
    Switch {
        discriminant: &'a Expr<'a>,
        cases: &'a [SwitchCase<'a>],
    },
    Labeled {
        label: &'a str,
        body: &'a Stmt<'a>,
    },
    With {
        object: &'a Expr<'a>,
        body: &'a Stmt<'a>,
    },
    Import,
    ExportNamed {
        specifiers: &'a [ExportSpecifier<'a>],
        source: Option<&'a str>,
    },
    ExportDeclaration(&'a Stmt<'a>),
    ExportDefault(&'a Expr<'a>),
    ExportAll,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclarationKind {
    Var,
    Let,
    Const,
}

impl fmt::Display for DeclarationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DeclarationKind::Var => "var",
            DeclarationKind::Let => "let",
            DeclarationKind::Const => "const",
        })
    }
}

#[derive(Debug)]
pub struct VariableDeclaration<'a> {
    pub kind: DeclarationKind,
    pub declarations: &'a [VariableDeclarator<'a>],
}

#[derive(Debug)]
pub struct VariableDeclarator<'a> {
    pub id: &'a Pattern<'a>,
    pub init: Option<&'a Expr<'a>>,
}

#[derive(Debug)]
pub enum ForInit<'a> {
    Declaration(&'a VariableDeclaration<'a>),
    Expression(&'a Expr<'a>),
}

#[derive(Debug)]
pub enum ForHead<'a> {
    Declaration {
        kind: DeclarationKind,
        target: &'a Pattern<'a>,
    },
    Pattern(&'a Pattern<'a>),
}

#[derive(Debug)]
pub struct CatchClause<'a> {
    pub param: Option<&'a Pattern<'a>>,
    pub body: &'a [Stmt<'a>],
}

#[derive(Debug)]
pub struct SwitchCase<'a> {
    pub test: Option<&'a Expr<'a>>,
    pub consequent: &'a [Stmt<'a>],
}

#[derive(Debug)]
pub struct ExportSpecifier<'a> {
    pub local: &'a str,
    pub exported: &'a str,
}

// ---------------------------------------------------------------------------
// JSX
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct JsxElement<'a> {
    pub name: JsxTagName<'a>,
    pub attributes: &'a [JsxAttribute<'a>],
    pub children: &'a [JsxChild<'a>],
    pub self_closing: bool,
    pub loc: Option<SourceLocation>,
}

#[derive(Debug)]
pub struct JsxFragment<'a> {
    pub children: &'a [JsxChild<'a>],
    pub loc: Option<SourceLocation>,
}

#[derive(Debug, Clone, Copy)]
pub enum JsxTagName<'a> {
    Identifier(&'a str),
    /// `a.b.c`, stored as its segments.
    Member(&'a [&'a str]),
    Namespaced {
        namespace: &'a str,
        name: &'a str,
    },
}

#[derive(Debug)]
pub enum JsxAttribute<'a> {
    Attribute {
        name: JsxAttributeName<'a>,
        value: Option<JsxAttributeValue<'a>>,
    },
    Spread(&'a Expr<'a>),
}

#[derive(Debug, Clone, Copy)]
pub enum JsxAttributeName<'a> {
    Identifier(&'a str),
    Namespaced { namespace: &'a str, name: &'a str },
}

#[derive(Debug)]
pub enum JsxAttributeValue<'a> {
    String(&'a str),
    /// `{expr}`; `None` for an empty container.
    Expression(Option<&'a Expr<'a>>),
    Element(&'a JsxElement<'a>),
    Fragment(&'a JsxFragment<'a>),
}

#[derive(Debug)]
pub enum JsxChild<'a> {
    Text(&'a str),
    /// `{expr}`; `None` for `{}` or a comment-only container.
    Expression(Option<&'a Expr<'a>>),
    Spread(&'a Expr<'a>),
    Element(&'a JsxElement<'a>),
    Fragment(&'a JsxFragment<'a>),
}

impl<'a> JsxTagName<'a> {
    /// Reduces the tag name to a single string: `a.b` or `ns:name`.
    pub fn to_name(&self) -> String {
        match self {
            JsxTagName::Identifier(name) => (*name).to_string(),
            JsxTagName::Member(segments) => segments.join("."),
            JsxTagName::Namespaced { namespace, name } => format!("{}:{}", namespace, name),
        }
    }
}

impl<'a> JsxAttributeName<'a> {
    pub fn to_name(&self) -> String {
        match self {
            JsxAttributeName::Identifier(name) => (*name).to_string(),
            JsxAttributeName::Namespaced { namespace, name } => format!("{}:{}", namespace, name),
        }
    }
}
