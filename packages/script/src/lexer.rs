//! Lexer for component modules using logos
//!
//! The logos token set covers the context-free part of the language. A
//! [`Cursor`] drives it and handles the context-dependent literals: a `/` or
//! `<` where an expression may start begins a regular expression, a JSX
//! element or a type parameter list, which are scanned by hand and surfaced
//! as single tokens.

use crate::ast::Span;
use crate::error::{ScriptError, ScriptResult};
use crate::scan;
use logos::{Lexer, Logos};

/// Kinds of tokens produced by a [`Cursor`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    Import,
    Export,
    Default,
    Function,
    Class,
    Const,
    Let,
    Var,
    Ident,
    String,
    Template,
    Number,
    Regex,
    Jsx,
    /// `<T,>` or `<T extends U>` before a generic arrow function
    TypeParams,
    LBrace,
    RBrace,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Semi,
    Comma,
    Slash,
    /// Any other operator; the parser looks at its text
    Punct,
    /// Input no other token accepts
    Unknown,
}

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\f]+")]
#[logos(skip r"//[^\n]*")]
#[logos(skip r"/\*[^*]*\*+(?:[^/*][^*]*\*+)*/")]
enum Raw {
    #[token("\n")]
    Newline,

    // Keywords
    #[token("import")]
    Import,
    #[token("export")]
    Export,
    #[token("default")]
    Default,
    #[token("function")]
    Function,
    #[token("class")]
    Class,
    #[token("const")]
    Const,
    #[token("let")]
    Let,
    #[token("var")]
    Var,

    #[regex(r"[A-Za-z_$][A-Za-z0-9_$]*")]
    Ident,

    // Literals
    #[regex(r#""([^"\\\n]|\\.)*""#)]
    #[regex(r"'([^'\\\n]|\\.)*'")]
    String,

    #[token("`", template)]
    Template,

    #[regex(r"[0-9][0-9_]*(\.[0-9_]*)?([eE][+-]?[0-9]+)?n?")]
    #[regex(r"\.[0-9][0-9_]*([eE][+-]?[0-9]+)?")]
    #[regex(r"0[xXoObB][0-9a-fA-F_]+n?")]
    Number,

    // Punctuation
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token(";")]
    Semi,
    #[token(",")]
    Comma,
    #[token("/")]
    #[token("/=")]
    Slash,

    // Any other operator
    #[regex(r"=>|\.\.\.|\?\?=?|\?\.|&&=?|\|\|=?|\*\*=?|<<=?|>>>?=?|\+\+|--|[-+*%&|^<>!=]=?=?|[~?:.@#]")]
    Punct,
}

impl Token {
    fn from_raw(raw: Raw) -> Option<Self> {
        Some(match raw {
            Raw::Newline => return None,
            Raw::Import => Token::Import,
            Raw::Export => Token::Export,
            Raw::Default => Token::Default,
            Raw::Function => Token::Function,
            Raw::Class => Token::Class,
            Raw::Const => Token::Const,
            Raw::Let => Token::Let,
            Raw::Var => Token::Var,
            Raw::Ident => Token::Ident,
            Raw::String => Token::String,
            Raw::Template => Token::Template,
            Raw::Number => Token::Number,
            Raw::LBrace => Token::LBrace,
            Raw::RBrace => Token::RBrace,
            Raw::LParen => Token::LParen,
            Raw::RParen => Token::RParen,
            Raw::LBracket => Token::LBracket,
            Raw::RBracket => Token::RBracket,
            Raw::Semi => Token::Semi,
            Raw::Comma => Token::Comma,
            Raw::Slash => Token::Slash,
            Raw::Punct => Token::Punct,
        })
    }
}

fn template(lex: &mut Lexer<Raw>) -> bool {
    match scan::template_len(lex.remainder()) {
        Some(len) => {
            lex.bump(len);
            true
        }
        None => false,
    }
}

/// Keywords whose parenthesized head is followed by a statement
const CONTROL_KEYWORDS: &[&str] = &["if", "while", "for", "with"];

/// Identifiers after which an expression, not an operator, follows
const EXPRESSION_KEYWORDS: &[&str] = &[
    "return", "typeof", "case", "do", "else", "in", "of", "new", "delete", "void", "throw",
    "yield", "await", "instanceof",
];

/// A token with its text and position
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lexeme<'src> {
    pub token: Token,
    pub span: Span,
    pub text: &'src str,
    /// A line break separates this token from the previous one
    pub newline_before: bool,
}

/// Context-aware token stream over module source
pub struct Cursor<'src> {
    source: &'src str,
    lexer: Lexer<'src, Raw>,
    previous: Option<(Token, &'src str)>,
    /// One entry per open `(`: whether it opened a control statement head
    parens: Vec<bool>,
    /// The last token closed a control statement head
    after_control_head: bool,
}

impl<'src> Cursor<'src> {
    pub fn new(source: &'src str) -> Self {
        Self::at(source, 0)
    }

    /// Start lexing at byte `offset`, as if an expression may start there
    pub fn at(source: &'src str, offset: usize) -> Self {
        let mut lexer = Raw::lexer(source);
        lexer.bump(offset);
        Self {
            source,
            lexer,
            previous: None,
            parens: Vec::new(),
            after_control_head: false,
        }
    }

    pub fn next_lexeme(&mut self) -> ScriptResult<Option<Lexeme<'src>>> {
        let mut newline_before = false;

        loop {
            let Some(result) = self.lexer.next() else {
                return Ok(None);
            };
            let span = self.lexer.span();

            let token = match result.map(Token::from_raw) {
                Ok(None) => {
                    newline_before = true;
                    continue;
                }
                Ok(Some(Token::Slash)) if self.expression_may_start() => {
                    let end = scan::regex_end(self.source, span.start)?;
                    self.lexer.bump(end - span.end);
                    Token::Regex
                }
                Ok(Some(Token::Punct))
                    if self.lexer.slice().starts_with('<') && self.expression_may_start() =>
                {
                    if let Some(end) = scan::type_params_end(self.source, span.start) {
                        self.lexer.bump(end - span.end);
                        Token::TypeParams
                    } else {
                        let end = scan::jsx_end(self.source, span.start)?;
                        self.lexer.bump(end - span.end);
                        Token::Jsx
                    }
                }
                Ok(Some(token)) => token,
                Err(()) => {
                    let span = Span::new(span.start, span.end);
                    match self.lexer.slice().chars().next() {
                        Some('`') => {
                            return Err(ScriptError::unterminated(span, "template literal"))
                        }
                        Some('"' | '\'') => {
                            return Err(ScriptError::unterminated(span, "string literal"))
                        }
                        _ => Token::Unknown,
                    }
                }
            };

            let span = self.lexer.span();
            let text = &self.source[span.clone()];
            self.track_parens(token);
            self.previous = Some((token, text));

            return Ok(Some(Lexeme {
                token,
                span: Span::new(span.start, span.end),
                text,
                newline_before,
            }));
        }
    }

    fn track_parens(&mut self, token: Token) {
        self.after_control_head = false;
        match token {
            Token::LParen => {
                let control = matches!(
                    self.previous,
                    Some((Token::Ident, text)) if CONTROL_KEYWORDS.contains(&text)
                );
                self.parens.push(control);
            }
            Token::RParen => self.after_control_head = self.parens.pop().unwrap_or(false),
            _ => {}
        }
    }

    fn expression_may_start(&self) -> bool {
        if self.after_control_head {
            return true;
        }
        match self.previous {
            None => true,
            Some((Token::Ident, text)) => EXPRESSION_KEYWORDS.contains(&text),
            Some((
                Token::Number
                | Token::String
                | Token::Template
                | Token::Regex
                | Token::Jsx
                | Token::RParen
                | Token::RBracket
                | Token::RBrace,
                _,
            )) => false,
            Some((Token::Punct, text)) => text != "++" && text != "--",
            Some(_) => true,
        }
    }
}

/// Lex a whole module
pub fn lex(source: &str) -> ScriptResult<Vec<Lexeme<'_>>> {
    let mut cursor = Cursor::new(source);
    let mut lexemes = Vec::new();
    while let Some(lexeme) = cursor.next_lexeme()? {
        lexemes.push(lexeme);
    }
    Ok(lexemes)
}

/// Offset just past the `}` matching a `{` that ends right before `offset`
pub fn skip_block(source: &str, offset: usize) -> ScriptResult<usize> {
    let mut cursor = Cursor::at(source, offset);
    let mut depth = 0usize;

    while let Some(lexeme) = cursor.next_lexeme()? {
        match lexeme.token {
            Token::LBrace | Token::LParen | Token::LBracket => depth += 1,
            Token::RBrace if depth == 0 => return Ok(lexeme.span.end),
            Token::RBrace | Token::RParen | Token::RBracket => depth = depth.saturating_sub(1),
            _ => {}
        }
    }

    Err(ScriptError::unexpected_eof("`}`"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(source: &str) -> Vec<(Token, &str)> {
        lex(source)
            .unwrap()
            .into_iter()
            .map(|l| (l.token, l.text))
            .collect()
    }

    #[test]
    fn test_keywords_and_identifiers() {
        assert_eq!(
            tokens("import x from 'y'"),
            vec![
                (Token::Import, "import"),
                (Token::Ident, "x"),
                (Token::Ident, "from"),
                (Token::String, "'y'"),
            ]
        );
    }

    #[test]
    fn test_comments_are_skipped() {
        let toks = tokens("// import a from 'a'\n/* export default b */ c");
        assert_eq!(toks, vec![(Token::Ident, "c")]);
    }

    #[test]
    fn test_template_literal_is_one_token() {
        let toks = tokens("const s = `a ${ `b` } c`;");
        assert_eq!(toks[3], (Token::Template, "`a ${ `b` } c`"));
        assert_eq!(toks[4].0, Token::Semi);
    }

    #[test]
    fn test_regex_versus_division() {
        let toks = tokens("a = b / c / d; e = /x\\/y/g.test(s)");
        let slashes = toks.iter().filter(|(t, _)| *t == Token::Slash).count();
        assert_eq!(slashes, 2);
        assert!(toks.contains(&(Token::Regex, "/x\\/y/g")));
    }

    #[test]
    fn test_jsx_is_one_token() {
        let toks = tokens("const App = () => <div class=\"a\">{ a < b ? 'x' : 'y' }</div>;");
        assert!(toks
            .iter()
            .any(|(t, text)| *t == Token::Jsx && text.ends_with("</div>")));
        assert_eq!(toks.last().map(|t| t.0), Some(Token::Semi));
    }

    #[test]
    fn test_less_than_after_operand_is_an_operator() {
        let toks = tokens("if (a < b) {}");
        assert!(toks.contains(&(Token::Punct, "<")));
    }

    #[test]
    fn test_newline_flag() {
        let lexemes = lex("a\nb c").unwrap();
        assert!(!lexemes[0].newline_before);
        assert!(lexemes[1].newline_before);
        assert!(!lexemes[2].newline_before);
    }

    #[test]
    fn test_doc_comments_are_skipped() {
        let toks = tokens("/** Hero banner\n * @param {string} a\n */\nconst a = 1; /* x * y */");
        assert_eq!(toks[0], (Token::Const, "const"));
        assert_eq!(toks.last().map(|t| t.0), Some(Token::Semi));
        assert!(!toks.iter().any(|(t, _)| *t == Token::Regex));
    }

    #[test]
    fn test_generic_arrow_type_parameters() {
        let toks = tokens("const f = <T,>(x: T) => x;");
        assert_eq!(toks[3], (Token::TypeParams, "<T,>"));
        assert_eq!(toks[4].0, Token::LParen);

        let toks = tokens("const g = <K extends keyof Props>(k: K) => k;");
        assert_eq!(toks[3], (Token::TypeParams, "<K extends keyof Props>"));
    }

    #[test]
    fn test_regex_after_control_statement_head() {
        let toks = tokens("if (x) /a'/.test(y);");
        assert!(toks.contains(&(Token::Regex, "/a'/")));

        let toks = tokens("const r = (a) / 2;");
        assert!(toks.contains(&(Token::Slash, "/")));
    }

    #[test]
    fn test_unterminated_template_is_an_error() {
        assert!(matches!(
            lex("const a = `oops"),
            Err(ScriptError::Unterminated { .. })
        ));
    }
}
