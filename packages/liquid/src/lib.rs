pub mod ast;
pub mod error;
pub mod extractor;
pub mod fragment;
pub mod lexer;
pub mod parser;
pub mod token;

pub use error::{ParseError, ParseResult};
pub use extractor::{extract, extract_tags, extract_variables};
pub use fragment::{normalize_quotes, Fragment, FragmentKind, Fragments, Position};
pub use lexer::{lex, Token as LexToken};
pub use parser::{parse_output, Parser};
pub use token::{generate_token, Token, TOKEN_WIDTH};
