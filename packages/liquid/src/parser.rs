use crate::ast::*;
use crate::error::{ParseError, ParseResult};
use crate::lexer::{lex, Token, TokenSpan};

/// Recursive-descent parser for Liquid output markup
pub struct Parser<'src> {
    tokens: Vec<(Token<'src>, TokenSpan)>,
    pos: usize,
    source_len: usize,
}

impl<'src> Parser<'src> {
    pub fn new(source: &'src str) -> ParseResult<Self> {
        let mut tokens = Vec::new();
        for result in lex(source) {
            match result {
                Ok(spanned) => tokens.push((spanned.token, spanned.span)),
                Err(e) => {
                    return Err(ParseError::LexError {
                        span: e.span,
                        message: e.message,
                    })
                }
            }
        }
        Ok(Self {
            tokens,
            pos: 0,
            source_len: source.len(),
        })
    }

    /// Parse the whole input as exactly one output: an expression and its
    /// filters, with nothing left over
    pub fn parse_output(&mut self) -> ParseResult<Output> {
        let start = self.current_pos();
        let expression = self.parse_expression()?;

        let mut filters = Vec::new();
        while self.match_token(&Token::Pipe) {
            filters.push(self.parse_filter()?);
        }

        if let Some((token, span)) = self.peek() {
            return Err(ParseError::unexpected_token(
                *span,
                "'|' or end of markup",
                format!("{:?}", token),
            ));
        }

        Ok(Output {
            expression,
            filters,
            span: TokenSpan {
                start,
                end: self.source_len,
            },
        })
    }

    fn parse_filter(&mut self) -> ParseResult<Filter> {
        let name = self.expect_ident("filter name")?;
        let mut args = Vec::new();

        if self.match_token(&Token::Colon) {
            loop {
                args.push(self.parse_filter_argument()?);
                if !self.match_token(&Token::Comma) {
                    break;
                }
            }
        }

        Ok(Filter { name, args })
    }

    fn parse_filter_argument(&mut self) -> ParseResult<FilterArgument> {
        // `key: value` named arguments
        if let (Some((Token::Ident(name), _)), Some((Token::Colon, _))) =
            (self.peek(), self.tokens.get(self.pos + 1))
        {
            let name = name.to_string();
            self.advance();
            self.advance();
            let value = self.parse_expression()?;
            return Ok(FilterArgument::Named { name, value });
        }
        Ok(FilterArgument::Positional(self.parse_expression()?))
    }

    fn parse_expression(&mut self) -> ParseResult<Expression> {
        let Some((token, span)) = self.peek().cloned() else {
            return Err(ParseError::unexpected_eof("expression"));
        };

        let literal = match token {
            Token::String(s) | Token::SingleQuoteString(s) => Some(Literal::String(s.to_string())),
            Token::Number(n) => Some(Literal::Number(n.to_string())),
            Token::True => Some(Literal::Boolean(true)),
            Token::False => Some(Literal::Boolean(false)),
            Token::Nil | Token::Null => Some(Literal::Nil),
            Token::Empty => Some(Literal::Empty),
            Token::Blank => Some(Literal::Blank),
            _ => None,
        };
        if let Some(value) = literal {
            self.advance();
            return Ok(Expression::Literal { value });
        }

        match token {
            Token::LParen => self.parse_range(),
            Token::Ident(_) | Token::LBracket => self.parse_lookup().map(Expression::Variable),
            other => Err(ParseError::unexpected_token(
                span,
                "expression",
                format!("{:?}", other),
            )),
        }
    }

    fn parse_range(&mut self) -> ParseResult<Expression> {
        self.expect(Token::LParen, "'('")?;
        let start = self.parse_expression()?;
        self.expect(Token::DotDot, "'..'")?;
        let end = self.parse_expression()?;
        self.expect(Token::RParen, "')'")?;
        Ok(Expression::Range {
            start: Box::new(start),
            end: Box::new(end),
        })
    }

    fn parse_lookup(&mut self) -> ParseResult<VariableLookup> {
        let mut lookups = Vec::new();
        let name = match self.peek() {
            Some((Token::Ident(name), _)) => {
                let name = name.to_string();
                self.advance();
                Some(name)
            }
            _ => {
                lookups.push(self.parse_index()?);
                None
            }
        };

        loop {
            match self.peek() {
                Some((Token::Dot, _)) => {
                    self.advance();
                    lookups.push(Lookup::Property(self.expect_property()?));
                }
                Some((Token::LBracket, _)) => lookups.push(self.parse_index()?),
                _ => break,
            }
        }

        Ok(VariableLookup { name, lookups })
    }

    fn parse_index(&mut self) -> ParseResult<Lookup> {
        self.expect(Token::LBracket, "'['")?;
        let index = self.parse_expression()?;
        self.expect(Token::RBracket, "']'")?;
        Ok(Lookup::Index(Box::new(index)))
    }

    /// Property names after `.` may collide with keywords (`a.empty`,
    /// `list.first`)
    fn expect_property(&mut self) -> ParseResult<String> {
        let name = match self.peek() {
            Some((Token::Ident(name), _)) => name.to_string(),
            Some((Token::Empty, _)) => "empty".to_string(),
            Some((Token::Blank, _)) => "blank".to_string(),
            Some((Token::Nil, _)) => "nil".to_string(),
            Some((token, span)) => {
                return Err(ParseError::unexpected_token(
                    *span,
                    "property name",
                    format!("{:?}", token),
                ))
            }
            None => return Err(ParseError::unexpected_eof("property name")),
        };
        self.advance();
        Ok(name)
    }

    // Helper methods

    fn peek(&self) -> Option<&(Token<'src>, TokenSpan)> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) {
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
    }

    fn current_pos(&self) -> usize {
        self.peek().map(|(_, span)| span.start).unwrap_or(self.source_len)
    }

    fn match_token(&mut self, expected: &Token) -> bool {
        if self.peek().map(|(t, _)| t == expected).unwrap_or(false) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: Token, description: &str) -> ParseResult<()> {
        match self.peek() {
            Some((token, _)) if *token == expected => {
                self.advance();
                Ok(())
            }
            Some((token, span)) => Err(ParseError::unexpected_token(
                *span,
                description,
                format!("{:?}", token),
            )),
            None => Err(ParseError::unexpected_eof(description)),
        }
    }

    fn expect_ident(&mut self, description: &str) -> ParseResult<String> {
        match self.peek() {
            Some((Token::Ident(name), _)) => {
                let name = name.to_string();
                self.advance();
                Ok(name)
            }
            Some((token, span)) => Err(ParseError::unexpected_token(
                *span,
                description,
                format!("{:?}", token),
            )),
            None => Err(ParseError::unexpected_eof(description)),
        }
    }
}

/// Parse the markup of a Liquid interpolation (the text between `{{` and
/// `}}`). Succeeds only when the whole markup is a single expression with an
/// optional filter chain.
pub fn parse_output(markup: &str) -> ParseResult<Output> {
    Parser::new(markup)?.parse_output()
}
