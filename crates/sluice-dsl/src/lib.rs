//! Lexer, parser, and AST for the **sluice** pipeline configuration DSL.
//!
//! The DSL is a sequence of Ruby-flavoured calls, each with at most a few
//! literal arguments and an optional nested body:
//!
//! ```text
//! input("file") {
//!     path_prefix "example/csv/sample_"
//!     decoders [{type: "gzip"}]
//!     parser("csv") { charset "UTF-8" }
//! }
//! output("stdout") {}
//! ```
//!
//! This crate only produces syntax. Giving calls a meaning (which names are
//! reserved, how many arguments are allowed) is the job of `sluice-config`.
//!
//! # Structure
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`ast`] | `Program`, `Call`, `Literal` |
//! | [`error`] | `ParseError` |
//! | [`lexer`] | `Lexer`, `Token`, `TokenWithPos` |
//! | [`parser`] | `parse_str` entry point |
//!
//! # Quick start
//!
//! ```rust
//! use sluice_dsl::parse_str;
//!
//! let program = parse_str(r#"output("stdout") { }"#).unwrap();
//! assert_eq!(program.calls[0].name, "output");
//! ```

pub mod ast;
pub mod error;
pub mod lexer;
pub mod parser;

pub use ast::{Call, Literal, Program};
pub use error::ParseError;
pub use parser::parse_str;

#[cfg(test)]
mod parse_tests {
    use super::*;

    fn ok(src: &str) { parse_str(src).unwrap(); }
    fn err(src: &str) { parse_str(src).unwrap_err(); }

    #[test] fn empty_source() { ok(""); }
    #[test] fn only_comments() { ok("# nothing here\n// nor here\n"); }
    #[test] fn csv_pipeline() {
        ok(r#"
            input("file") {
                path_prefix "example/csv/sample_"
                decoders [
                    {type: "gzip"}
                ]
                parser("csv") {
                    charset "UTF-8"
                    newline "CRLF"
                    skip_header_lines 1
                    columns [
                        {name: "id", type: "long"},
                        {name: "time", type: "timestamp", format: "%Y-%m-%d %H:%M:%S"},
                        {name: "comment", type: "string"}
                    ]
                }
            }

            output("stdout") {
            }
        "#);
    }
    #[test] fn events() {
        ok(r#"
            on_start { banner "starting" }
            on_complete { notify "ops"; retries 3 }
        "#);
    }
    #[test] fn semicolons() { ok("a 1; b 2;; c(3);"); }
    #[test] fn err_unterminated_string() { err(r#"foo "oops"#); }
    #[test] fn err_unclosed_sequence() { err("foo [1, 2"); }
    #[test] fn err_double_comma() { err("foo(1,, 2)"); }
    #[test] fn err_mapping_as_bare_argument() { err("foo {a: 1}"); }
}
