//! Configuration options for parsing and evaluation.

/// Configuration options for parsing.
///
/// # Example
///
/// ```
/// use jsx_eval_core::api::ParseOptions;
///
/// let options = ParseOptions {
///     force_expression: true,
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Wrap the source in `<>…</>` before parsing, so top-level markup does not
    /// need an enclosing element.
    ///
    /// Default: false
    pub force_expression: bool,

    /// Maximum nesting depth of expressions and JSX elements.
    ///
    /// Default: 256
    pub max_depth: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            force_expression: false,
            max_depth: 256,
        }
    }
}

/// Security and behavior flags for evaluation.
///
/// The defaults are permissive; hosts running untrusted input will usually turn
/// on `raise_reference_error` and supply a whitelist through
/// [`ContextBuilder::allowed_functions`](crate::evaluator::ContextBuilder::allowed_functions).
///
/// # Example
///
/// ```
/// use jsx_eval_core::api::EvaluateOptions;
///
/// let options = EvaluateOptions {
///     disable_call: true,
///     max_call_depth: 64,
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct EvaluateOptions {
    /// Admit every function, arrow and class created during evaluation into the
    /// whitelist (only meaningful when a whitelist is active).
    ///
    /// Default: false
    pub allow_user_defined_function: bool,

    /// Fail on unresolved identifiers instead of yielding `undefined`.
    ///
    /// Default: false
    pub raise_reference_error: bool,

    /// Every call (and `new`) evaluates to `undefined` without evaluating the
    /// callee or its arguments.
    ///
    /// Default: false
    pub disable_call: bool,

    /// `new` expressions evaluate to `undefined`.
    ///
    /// Default: false
    pub disable_new: bool,

    /// Do not attach generated `key` props to JSX elements.
    ///
    /// Default: false
    pub disable_key_generation: bool,

    /// Log timings for parse, evaluation and render passes at debug level.
    ///
    /// Default: false
    pub debug: bool,

    /// Maximum depth of nested function invocations.
    ///
    /// Default: 256
    pub max_call_depth: usize,
}

impl Default for EvaluateOptions {
    fn default() -> Self {
        Self {
            allow_user_defined_function: false,
            raise_reference_error: false,
            disable_call: false,
            disable_new: false,
            disable_key_generation: false,
            debug: false,
            max_call_depth: 256,
        }
    }
}
