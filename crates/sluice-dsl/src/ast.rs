// ── Literal ───────────────────────────────────────────────────────────────

/// An argument literal.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// `null` / `nil`
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    /// Quoted string, either quote style.
    Str(String),
    /// `[a, b, c]`
    Seq(Vec<Literal>),
    /// `{key: value, ...}` in source order, keys unique.
    Map(Vec<(String, Literal)>),
}

// ── Call ──────────────────────────────────────────────────────────────────

/// One `name(args) { body }` expression.
///
/// ```text
/// parser("csv") {
///     charset "UTF-8"
/// }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub name: String,
    /// Positional arguments as written. Arity is not checked here.
    pub args: Vec<Literal>,
    /// `None` when no `{ }` follows the call, `Some(vec![])` for an empty body.
    pub block: Option<Vec<Call>>,
    /// 1-based position of the call name.
    pub line: usize,
    pub col: usize,
}

// ── Program ───────────────────────────────────────────────────────────────

/// The top-level parse result: the calls of a source file, in order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    pub calls: Vec<Call>,
}
