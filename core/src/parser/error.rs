use crate::api::{Diagnostic, Severity};
use crate::parser::{Rule, Span};

/// Parser error with the source it was raised against.
#[derive(Debug, Clone)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub source: String,
    pub span: Span,
}

/// Specific kinds of parse errors
#[derive(Debug, Clone, PartialEq)]
pub enum ParseErrorKind {
    /// Unexpected token
    UnexpectedToken { expected: String, found: String },
    /// Invalid number literal
    InvalidNumber { text: String },
    /// Malformed escape sequence in a string or template
    InvalidEscape { text: String },
    /// Maximum nesting depth exceeded
    MaxDepthExceeded { depth: usize, max_depth: usize },
    /// Left side of an assignment (or update) is not assignable
    InvalidAssignmentTarget,
    /// `const` declaration without an initializer
    MissingInitializer,
    /// A rest element followed by more elements
    RestNotLast,
    /// JSX closing tag does not match its opening tag
    MismatchedClosingTag { expected: String, found: String },
    /// Other parse errors (catch-all for Pest errors we don't specifically handle)
    Other { message: String },
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, source: String, span: Span) -> Self {
        Self { kind, source, span }
    }

    /// Convert to a Diagnostic for API boundary
    pub fn to_diagnostic(&self) -> Diagnostic {
        let (message, code, help) = match &self.kind {
            ParseErrorKind::UnexpectedToken { expected, found } => (
                format!("Expected {}, found {}", expected, found),
                "P001",
                vec![],
            ),
            ParseErrorKind::InvalidNumber { text } => (
                format!("Invalid number literal '{}'", text),
                "P003",
                vec!["Check the number format".to_string()],
            ),
            ParseErrorKind::MaxDepthExceeded { max_depth, .. } => (
                format!("Nesting depth exceeds maximum of {} levels", max_depth),
                "P004",
                vec!["Reduce nesting or simplify the expression".to_string()],
            ),
            ParseErrorKind::InvalidEscape { text } => (
                format!("Invalid escape sequence in {}", text),
                "P005",
                vec![],
            ),
            ParseErrorKind::InvalidAssignmentTarget => (
                "Invalid assignment target".to_string(),
                "P006",
                vec!["Only identifiers, member expressions and patterns can be assigned".to_string()],
            ),
            ParseErrorKind::MissingInitializer => (
                "Missing initializer in const declaration".to_string(),
                "P007",
                vec![],
            ),
            ParseErrorKind::RestNotLast => (
                "Rest element must be last".to_string(),
                "P008",
                vec![],
            ),
            ParseErrorKind::MismatchedClosingTag { expected, found } => (
                format!("Expected corresponding JSX closing tag for <{}>, found </{}>", expected, found),
                "P009",
                vec![],
            ),
            ParseErrorKind::Other { message } => (message.clone(), "P999", vec![]),
        };

        Diagnostic {
            severity: Severity::Error,
            message,
            span: self.span.clone(),
            related: Vec::new(),
            help,
            code: Some(code.to_string()),
        }
    }
}

impl core::fmt::Display for ParseError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let diagnostic = self.to_diagnostic();
        write!(f, "{}: {}", diagnostic.severity, diagnostic.message)?;

        if let Some(ref code) = diagnostic.code {
            write!(f, " [{}]", code)?;
        }

        for help_msg in &diagnostic.help {
            write!(f, "\nhelp: {}", help_msg)?;
        }

        Ok(())
    }
}

impl std::error::Error for ParseError {}

/// Convert Pest error to human-readable ParseError
pub fn convert_pest_error(err: pest::error::Error<Rule>, source: &str) -> ParseError {
    use pest::error::ErrorVariant;

    let span = match err.location {
        pest::error::InputLocation::Pos(pos) => Span(pos..pos),
        pest::error::InputLocation::Span((start, end)) => Span(start..end),
    };

    let kind = match err.variant {
        ErrorVariant::ParsingError {
            positives,
            negatives,
        } => {
            let expected = format_expected_rules(&positives);
            let found = describe_found(source, span.0.start, &negatives);
            ParseErrorKind::UnexpectedToken { expected, found }
        }
        ErrorVariant::CustomError { message } => ParseErrorKind::Other { message },
    };

    ParseError::new(kind, source.to_string(), span)
}

fn concept(rule: &Rule) -> &'static str {
    match rule {
        Rule::null_lit
        | Rule::true_lit
        | Rule::false_lit
        | Rule::number
        | Rule::string
        | Rule::template => "literal",
        Rule::identifier | Rule::identifier_name | Rule::label | Rule::private_name => "identifier",
        Rule::jsx_element
        | Rule::jsx_fragment
        | Rule::jsx_closing
        | Rule::jsx_fragment_close
        | Rule::jsx_self_closing => "JSX element",
        Rule::jsx_name | Rule::jsx_identifier | Rule::jsx_attribute_name => "JSX name",
        Rule::block
        | Rule::variable_statement
        | Rule::if_statement
        | Rule::for_statement
        | Rule::for_in_of_statement
        | Rule::while_statement
        | Rule::do_while_statement
        | Rule::return_statement
        | Rule::throw_statement
        | Rule::try_statement
        | Rule::switch_statement
        | Rule::function_declaration
        | Rule::class_declaration
        | Rule::expression_statement
        | Rule::labeled_statement => "statement",
        Rule::binding_target | Rule::binding_element | Rule::object_pattern | Rule::array_pattern => {
            "binding pattern"
        }
        Rule::property_key => "property name",
        Rule::EOI => "end of input",
        _ => "expression",
    }
}

/// Format expected rules in a human-readable way
fn format_expected_rules(rules: &[Rule]) -> String {
    let mut concepts: Vec<&str> = Vec::new();
    for rule in rules {
        let c = concept(rule);
        if !concepts.contains(&c) {
            concepts.push(c);
        }
    }

    match concepts.len() {
        0 => "something else".to_string(),
        1 => concepts[0].to_string(),
        _ => {
            let last = concepts.pop().unwrap_or_default();
            format!("{} or {}", concepts.join(", "), last)
        }
    }
}

/// Describes what sits at the error position, falling back to the rules pest
/// reported as unwanted.
fn describe_found(source: &str, pos: usize, negatives: &[Rule]) -> String {
    if let Some(rule) = negatives.first() {
        return concept(rule).to_string();
    }
    match source.get(pos..).and_then(|rest| rest.chars().next()) {
        None => "end of input".to_string(),
        Some(c) => format!("'{}'", c),
    }
}
