use crate::ast::*;
use crate::error::{ScriptError, ScriptResult};
use crate::lexer::{lex, Lexeme, Token};
use crate::scan::unescape;

/// Identifiers that stand for a value, not a binding
const LITERAL_WORDS: &[&str] = &[
    "true", "false", "null", "undefined", "this", "NaN", "Infinity",
];

/// Identifiers that continue an expression onto the next line
const OPERATOR_WORDS: &[&str] = &["instanceof", "in", "as", "satisfies"];

/// Parser for the top level of a component module
pub struct Parser<'src> {
    source: &'src str,
    tokens: Vec<Lexeme<'src>>,
    pos: usize,
}

impl<'src> Parser<'src> {
    pub fn new(source: &'src str) -> ScriptResult<Self> {
        Ok(Self {
            source,
            tokens: lex(source)?,
            pos: 0,
        })
    }

    /// Parse a complete module
    pub fn parse_module(&mut self) -> ScriptResult<Module> {
        let mut items = Vec::new();

        while let Some(lexeme) = self.peek() {
            match lexeme.token {
                Token::Import if self.at_import_declaration() => {
                    items.push(Item::Import(self.parse_import()?));
                }
                Token::Export => items.extend(self.parse_export()?),
                Token::Function => items.push(Item::Function(self.parse_function(false)?)),
                Token::Ident if self.at_async_function() => {
                    items.push(Item::Function(self.parse_function(false)?));
                }
                Token::Class => items.push(Item::Class(self.parse_class(false)?)),
                Token::Const | Token::Let | Token::Var => {
                    items.push(Item::Variable(self.parse_variable(false)?));
                }
                Token::Semi => {
                    self.advance();
                }
                _ => {
                    let span = self.skip_statement();
                    items.push(Item::Statement { span });
                }
            }
        }

        Ok(Module { items })
    }

    /// `import` starting a declaration, not `import(..)`, `import.meta` or a
    /// type-only import
    fn at_import_declaration(&self) -> bool {
        match self.peek_ahead(1) {
            Some(next) if next.token == Token::LParen => false,
            Some(next) if next.token == Token::Punct && next.text == "." => false,
            Some(next) if next.token == Token::Ident && next.text == "type" => {
                // `import type from "./x"` binds a default named `type`
                matches!(self.peek_ahead(2), Some(after) if after.token == Token::Ident && after.text == "from")
                    || matches!(self.peek_ahead(2), Some(after) if after.token == Token::Comma)
            }
            _ => true,
        }
    }

    /// Parse an import declaration
    fn parse_import(&mut self) -> ScriptResult<ImportDecl> {
        let start = self.expect(Token::Import)?.span.start;
        let mut bindings = Vec::new();

        if !self.check(Token::String) {
            if self.check(Token::Ident) {
                let local = self.expect_ident()?;
                bindings.push(ImportBinding::Default { local });
                self.match_token(Token::Comma);
            }

            if self.check_punct("*") {
                self.advance();
                self.expect_word("as")?;
                let local = self.expect_ident()?;
                bindings.push(ImportBinding::Namespace { local });
            } else if self.match_token(Token::LBrace) {
                while !self.match_token(Token::RBrace) {
                    let imported = self.expect_export_name()?;
                    let local = if self.match_word("as") {
                        self.expect_ident()?
                    } else {
                        imported.clone()
                    };
                    bindings.push(ImportBinding::Named { imported, local });

                    if !self.match_token(Token::Comma) {
                        self.expect(Token::RBrace)?;
                        break;
                    }
                }
            }

            self.expect_word("from")?;
        }

        let specifier = self.expect_string()?;

        // Import attributes: `with { type: "json" }`
        if (self.check_word("with") || self.check_word("assert"))
            && matches!(self.peek_ahead(1), Some(next) if next.token == Token::LBrace)
        {
            self.advance();
            self.skip_balanced()?;
        }
        self.match_token(Token::Semi);

        Ok(ImportDecl {
            span: Span::new(start, self.previous_end()),
            specifier,
            bindings,
        })
    }

    /// Parse an export statement; a default-exported named declaration
    /// yields the declaration and the export
    fn parse_export(&mut self) -> ScriptResult<Vec<Item>> {
        let start = self.expect(Token::Export)?.span.start;
        let Some(next) = self.peek() else {
            return Err(ScriptError::unexpected_eof("declaration after `export`"));
        };

        match next.token {
            Token::Default => {
                self.advance();
                self.parse_export_default(start)
            }
            Token::Function => Ok(vec![Item::Function(self.parse_function(true)?)]),
            Token::Ident if self.at_async_function() => {
                Ok(vec![Item::Function(self.parse_function(true)?)])
            }
            Token::Class => Ok(vec![Item::Class(self.parse_class(true)?)]),
            Token::Const | Token::Let | Token::Var => {
                Ok(vec![Item::Variable(self.parse_variable(true)?)])
            }
            Token::LBrace => Ok(vec![Item::ExportList(self.parse_export_list(start)?)]),
            _ => {
                // `export * from`, TypeScript type exports
                let span = self.skip_statement();
                Ok(vec![Item::Statement {
                    span: Span::new(start, span.end),
                }])
            }
        }
    }

    fn parse_export_default(&mut self, start: usize) -> ScriptResult<Vec<Item>> {
        let declaration = if self.check(Token::Function) || self.at_async_function() {
            let function = self.parse_function(false)?;
            Some((function.name.clone(), function.span, Item::Function(function)))
        } else if self.check(Token::Class) {
            let class = self.parse_class(false)?;
            Some((class.name.clone(), class.span, Item::Class(class)))
        } else {
            None
        };

        let items = match declaration {
            Some((Some(name), _, item)) => vec![
                item,
                Item::ExportDefault(ExportDefault {
                    span: Span::new(start, self.previous_end()),
                    target: DefaultTarget::Declaration(name),
                }),
            ],
            Some((None, span, _)) => vec![Item::ExportDefault(ExportDefault {
                span: Span::new(start, span.end),
                target: DefaultTarget::Expression(Expr {
                    span,
                    kind: ExprKind::Other,
                }),
            })],
            None => {
                let expr = self.parse_expression()?;
                self.match_token(Token::Semi);
                vec![Item::ExportDefault(ExportDefault {
                    span: Span::new(start, self.previous_end()),
                    target: DefaultTarget::Expression(expr),
                })]
            }
        };

        Ok(items)
    }

    /// `export { a, b as c }` with an optional `from "..."`
    fn parse_export_list(&mut self, start: usize) -> ScriptResult<ExportList> {
        self.expect(Token::LBrace)?;
        let mut specifiers = Vec::new();

        while !self.match_token(Token::RBrace) {
            let local = self.expect_export_name()?;
            let exported = if self.match_word("as") {
                self.expect_export_name()?
            } else {
                local.clone()
            };
            specifiers.push(ExportSpecifier { local, exported });

            if !self.match_token(Token::Comma) {
                self.expect(Token::RBrace)?;
                break;
            }
        }

        let from = if self.match_word("from") {
            Some(self.expect_string()?)
        } else {
            None
        };
        self.match_token(Token::Semi);

        Ok(ExportList {
            span: Span::new(start, self.previous_end()),
            specifiers,
            from,
        })
    }

    /// Parse a function declaration, from `async`/`function` through the body
    fn parse_function(&mut self, exported: bool) -> ScriptResult<FunctionDecl> {
        let start = self.peek_span().start;
        if self.check_word("async") {
            self.advance();
        }
        self.expect(Token::Function)?;
        if self.check_punct("*") {
            self.advance();
        }

        let name = if self.check(Token::Ident) {
            Some(self.expect_ident()?)
        } else {
            None
        };

        // Type parameters, then parameters, then a return type
        self.skip_until(Token::LParen)?;
        self.skip_balanced()?;
        self.skip_until(Token::LBrace)?;
        self.skip_balanced()?;

        Ok(FunctionDecl {
            name,
            span: Span::new(start, self.previous_end()),
            exported,
        })
    }

    fn parse_class(&mut self, exported: bool) -> ScriptResult<ClassDecl> {
        let start = self.expect(Token::Class)?.span.start;
        let name = if self.check(Token::Ident) && !self.check_word("extends") {
            Some(self.expect_ident()?)
        } else {
            None
        };

        self.skip_until(Token::LBrace)?;
        self.skip_balanced()?;

        Ok(ClassDecl {
            name,
            span: Span::new(start, self.previous_end()),
            exported,
        })
    }

    /// Parse `const`/`let`/`var` with one or more declarators
    fn parse_variable(&mut self, exported: bool) -> ScriptResult<VariableDecl> {
        let keyword = self.advance_or_eof("variable declaration")?;
        let kind = match keyword.token {
            Token::Const => VariableKind::Const,
            Token::Let => VariableKind::Let,
            _ => VariableKind::Var,
        };

        let mut declarators = Vec::new();
        loop {
            let name = match self.peek().map(|l| l.token) {
                Some(Token::Ident) => Some(self.expect_ident()?),
                Some(Token::LBrace | Token::LBracket) => {
                    self.skip_balanced()?;
                    None
                }
                _ => {
                    return Err(ScriptError::unexpected_token(
                        self.peek_span(),
                        "binding name",
                        self.format_token(self.peek()),
                    ))
                }
            };

            // TypeScript: `let a!: T`, `const a: T = ..`
            if self.check_punct("!") {
                self.advance();
            }
            if self.check_punct(":") {
                self.advance();
                self.skip_type_annotation();
            }

            let init = if self.check_punct("=") {
                self.advance();
                Some(self.parse_expression()?)
            } else {
                None
            };
            declarators.push(Declarator { name, init });

            if !self.match_token(Token::Comma) {
                break;
            }
        }
        self.match_token(Token::Semi);

        Ok(VariableDecl {
            kind,
            declarators,
            exported,
            span: Span::new(keyword.span.start, self.previous_end()),
        })
    }

    /// Consume one expression, stopping before a `,` `;` or closing bracket
    /// at depth zero, or at a line break where a new statement begins
    fn parse_expression(&mut self) -> ScriptResult<Expr> {
        let first = self.pos;
        let mut depth = 0usize;

        while let Some(lexeme) = self.peek() {
            if depth == 0 {
                if matches!(
                    lexeme.token,
                    Token::Comma | Token::Semi | Token::RParen | Token::RBracket | Token::RBrace
                ) {
                    break;
                }
                if self.pos > first && self.at_statement_boundary() {
                    break;
                }
            }
            match lexeme.token {
                Token::LParen | Token::LBracket | Token::LBrace => depth += 1,
                Token::RParen | Token::RBracket | Token::RBrace => depth -= 1,
                _ => {}
            }
            self.advance();
        }

        let consumed = &self.tokens[first..self.pos];
        let (Some(head), Some(last)) = (consumed.first(), consumed.last()) else {
            return Err(match self.peek() {
                Some(_) => ScriptError::unexpected_token(
                    self.peek_span(),
                    "expression",
                    self.format_token(self.peek()),
                ),
                None => ScriptError::unexpected_eof("expression"),
            });
        };

        let kind = if consumed.len() == 1 {
            classify(head)
        } else {
            ExprKind::Other
        };

        Ok(Expr {
            span: Span::new(head.span.start, last.span.end),
            kind,
        })
    }

    /// Skip a type annotation up to `=`, `,` or the end of the declaration
    fn skip_type_annotation(&mut self) {
        let first = self.pos;
        let mut depth = 0usize;

        while let Some(lexeme) = self.peek() {
            if depth == 0 {
                let ends = match lexeme.token {
                    Token::Comma | Token::Semi | Token::RParen | Token::RBracket | Token::RBrace => {
                        true
                    }
                    Token::Punct => lexeme.text == "=",
                    _ => self.pos > first && self.at_statement_boundary(),
                };
                if ends {
                    break;
                }
            }
            match (lexeme.token, lexeme.text) {
                (Token::LParen | Token::LBracket | Token::LBrace, _) | (Token::Punct, "<") => {
                    depth += 1
                }
                (Token::RParen | Token::RBracket | Token::RBrace, _) | (Token::Punct, ">") => {
                    depth = depth.saturating_sub(1)
                }
                (Token::Punct, ">>") => depth = depth.saturating_sub(2),
                _ => {}
            }
            self.advance();
        }
    }

    /// Skip any other statement, returning its span
    fn skip_statement(&mut self) -> Span {
        let start = self.peek_span().start;
        let first = self.pos;
        let mut depth = 0usize;

        while let Some(lexeme) = self.peek() {
            if depth == 0 && self.pos > first && self.at_statement_boundary() {
                break;
            }
            self.advance();
            match lexeme.token {
                Token::LParen | Token::LBracket | Token::LBrace => depth += 1,
                Token::RParen | Token::RBracket | Token::RBrace => {
                    if depth == 0 {
                        break;
                    }
                    depth -= 1;
                }
                Token::Semi if depth == 0 => break,
                _ => {}
            }
        }

        Span::new(start, self.previous_end().max(start))
    }

    /// Consume an opening bracket through its matching closing bracket
    fn skip_balanced(&mut self) -> ScriptResult<Span> {
        let open = self.advance_or_eof("opening bracket")?;
        let mut depth = 1usize;

        while depth > 0 {
            let Some(lexeme) = self.advance() else {
                return Err(ScriptError::unexpected_eof(format!(
                    "closing bracket for `{}` at {}",
                    open.text, open.span.start
                )));
            };
            match lexeme.token {
                Token::LParen | Token::LBracket | Token::LBrace => depth += 1,
                Token::RParen | Token::RBracket | Token::RBrace => depth -= 1,
                _ => {}
            }
        }

        Ok(Span::new(open.span.start, self.previous_end()))
    }

    fn skip_until(&mut self, token: Token) -> ScriptResult<()> {
        while !self.check(token) {
            if self.advance().is_none() {
                return Err(ScriptError::unexpected_eof(format_expected(token)));
            }
        }
        Ok(())
    }

    /// A line break between a complete operand and a token that begins a
    /// new statement
    fn at_statement_boundary(&self) -> bool {
        let (Some(previous), Some(current)) = (self.previous(), self.peek()) else {
            return false;
        };
        current.newline_before && ends_operand(&previous) && starts_statement(&current)
    }

    fn at_async_function(&self) -> bool {
        self.check_word("async")
            && matches!(
                self.peek_ahead(1),
                Some(next) if next.token == Token::Function && !next.newline_before
            )
    }

    // Helper methods

    fn peek(&self) -> Option<Lexeme<'src>> {
        self.tokens.get(self.pos).copied()
    }

    fn peek_ahead(&self, offset: usize) -> Option<Lexeme<'src>> {
        self.tokens.get(self.pos + offset).copied()
    }

    fn previous(&self) -> Option<Lexeme<'src>> {
        self.pos
            .checked_sub(1)
            .and_then(|i| self.tokens.get(i))
            .copied()
    }

    fn advance(&mut self) -> Option<Lexeme<'src>> {
        let lexeme = self.peek();
        if lexeme.is_some() {
            self.pos += 1;
        }
        lexeme
    }

    fn advance_or_eof(&mut self, expected: &str) -> ScriptResult<Lexeme<'src>> {
        self.advance()
            .ok_or_else(|| ScriptError::unexpected_eof(expected))
    }

    fn check(&self, token: Token) -> bool {
        matches!(self.peek(), Some(lexeme) if lexeme.token == token)
    }

    fn check_word(&self, word: &str) -> bool {
        matches!(self.peek(), Some(lexeme) if lexeme.token == Token::Ident && lexeme.text == word)
    }

    fn check_punct(&self, punct: &str) -> bool {
        matches!(self.peek(), Some(lexeme) if lexeme.token == Token::Punct && lexeme.text == punct)
    }

    fn match_token(&mut self, token: Token) -> bool {
        if self.check(token) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn match_word(&mut self, word: &str) -> bool {
        if self.check_word(word) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: Token) -> ScriptResult<Lexeme<'src>> {
        match self.peek() {
            Some(lexeme) if lexeme.token == token => {
                self.advance();
                Ok(lexeme)
            }
            Some(_) => Err(ScriptError::unexpected_token(
                self.peek_span(),
                format_expected(token),
                self.format_token(self.peek()),
            )),
            None => Err(ScriptError::unexpected_eof(format_expected(token))),
        }
    }

    fn expect_word(&mut self, word: &str) -> ScriptResult<()> {
        if self.match_word(word) {
            return Ok(());
        }
        match self.peek() {
            Some(_) => Err(ScriptError::unexpected_token(
                self.peek_span(),
                format!("'{}'", word),
                self.format_token(self.peek()),
            )),
            None => Err(ScriptError::unexpected_eof(format!("'{}'", word))),
        }
    }

    fn expect_ident(&mut self) -> ScriptResult<String> {
        Ok(self.expect(Token::Ident)?.text.to_string())
    }

    fn expect_string(&mut self) -> ScriptResult<String> {
        Ok(unescape(self.expect(Token::String)?.text))
    }

    /// A name in an import or export list: identifier, keyword or string
    fn expect_export_name(&mut self) -> ScriptResult<String> {
        match self.peek() {
            Some(lexeme) if lexeme.token == Token::String => self.expect_string(),
            Some(lexeme)
                if lexeme.text.chars().next().is_some_and(|c| c.is_alphabetic() || c == '_' || c == '$') =>
            {
                self.advance();
                Ok(lexeme.text.to_string())
            }
            Some(_) => Err(ScriptError::unexpected_token(
                self.peek_span(),
                "export name",
                self.format_token(self.peek()),
            )),
            None => Err(ScriptError::unexpected_eof("export name")),
        }
    }

    fn previous_end(&self) -> usize {
        self.previous().map(|l| l.span.end).unwrap_or(0)
    }

    /// Span of the next token, or an empty span at the end of input
    fn peek_span(&self) -> Span {
        self.peek().map(|l| l.span).unwrap_or_else(|| {
            let end = self.source.len();
            Span::new(end, end)
        })
    }

    /// Format a token for display in error messages
    fn format_token(&self, lexeme: Option<Lexeme>) -> String {
        match lexeme {
            None => "end of file".to_string(),
            Some(lexeme) => match lexeme.token {
                Token::Ident => format!("identifier '{}'", lexeme.text),
                Token::String => format!("string {}", lexeme.text),
                Token::Number => format!("number {}", lexeme.text),
                Token::Template => "template literal".to_string(),
                Token::Jsx => "JSX element".to_string(),
                Token::Regex => "regular expression".to_string(),
                _ => format!("'{}'", lexeme.text),
            },
        }
    }
}

fn format_expected(token: Token) -> String {
    match token {
        Token::LBrace => "'{'".to_string(),
        Token::RBrace => "'}'".to_string(),
        Token::LParen => "'('".to_string(),
        Token::RParen => "')'".to_string(),
        Token::Ident => "identifier".to_string(),
        Token::String => "string literal".to_string(),
        Token::Import => "keyword 'import'".to_string(),
        Token::Export => "keyword 'export'".to_string(),
        Token::Function => "keyword 'function'".to_string(),
        Token::Class => "keyword 'class'".to_string(),
        token => format!("{:?}", token),
    }
}

fn classify(lexeme: &Lexeme) -> ExprKind {
    match lexeme.token {
        Token::Ident if !LITERAL_WORDS.contains(&lexeme.text) => {
            ExprKind::Identifier(lexeme.text.to_string())
        }
        Token::String => ExprKind::String(unescape(lexeme.text)),
        Token::Template => ExprKind::Template(lexeme.text[1..lexeme.text.len() - 1].to_string()),
        _ => ExprKind::Other,
    }
}

fn ends_operand(lexeme: &Lexeme) -> bool {
    match lexeme.token {
        Token::Ident
        | Token::Number
        | Token::String
        | Token::Template
        | Token::Regex
        | Token::Jsx
        | Token::RParen
        | Token::RBracket
        | Token::RBrace => true,
        Token::Punct => lexeme.text == "++" || lexeme.text == "--",
        _ => false,
    }
}

fn starts_statement(lexeme: &Lexeme) -> bool {
    match lexeme.token {
        Token::Import
        | Token::Export
        | Token::Function
        | Token::Class
        | Token::Const
        | Token::Let
        | Token::Var
        | Token::Number
        | Token::String
        | Token::Template
        | Token::Jsx => true,
        Token::Ident => !OPERATOR_WORDS.contains(&lexeme.text),
        _ => false,
    }
}

/// Parse module source
pub fn parse_module(source: &str) -> ScriptResult<Module> {
    Parser::new(source)?.parse_module()
}
