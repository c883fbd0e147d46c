use crate::lexer::TokenSpan;
use serde::Serialize;

/// Parsed markup of a `{{ ... }}` interpolation: one expression and its
/// filter chain
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Output {
    pub expression: Expression,
    pub filters: Vec<Filter>,
    pub span: TokenSpan,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Expression {
    Literal { value: Literal },
    Range {
        start: Box<Expression>,
        end: Box<Expression>,
    },
    Variable(VariableLookup),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Literal {
    String(String),
    Number(String),
    Boolean(bool),
    Nil,
    Empty,
    Blank,
}

/// `name.prop[expr]...`; `name` is absent for lookups that start with
/// a bracket (`['key']`)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariableLookup {
    pub name: Option<String>,
    pub lookups: Vec<Lookup>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Lookup {
    Property(String),
    Index(Box<Expression>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Filter {
    pub name: String,
    pub args: Vec<FilterArgument>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum FilterArgument {
    Positional(Expression),
    Named { name: String, value: Expression },
}
