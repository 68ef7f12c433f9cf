//! Literal micro-parser for dot-notation arguments.
//!
//! Grammar:
//!
//! ```text
//! arguments := ( literal ( ',' literal )* )?
//! literal   := string | number | boolean | dict
//! dict      := '{' ( string ':' scalar ( ',' string ':' scalar )* ','? )? '}'
//! scalar    := string | number | boolean
//! string    := '"' ... '"' | '\'' ... '\''      (backslash escapes)
//! boolean   := true | false | True | False
//! ```

use std::iter::Peekable;
use std::str::CharIndices;

use thiserror::Error;

use crate::models::Value;

#[derive(Debug, Error, PartialEq)]
pub enum ParseError {
    #[error("unterminated string starting at {0}")]
    UnterminatedString(usize),

    #[error("unexpected `{found}` at {at}")]
    Unexpected { found: char, at: usize },

    #[error("unexpected end of input")]
    UnexpectedEnd,

    #[error("invalid number `{0}`")]
    InvalidNumber(String),

    #[error("`{0}` is not a literal")]
    NotALiteral(String),

    #[error("dictionary keys must be strings")]
    NonStringKey,

    #[error("dictionary values must be primitive")]
    NestedDict,
}

/// One parsed argument.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Scalar(Value),
    /// Key/value pairs in source order.
    Dict(Vec<(String, Value)>),
}

/// Parse a comma-separated argument list.
pub fn parse_arguments(input: &str) -> Result<Vec<Literal>, ParseError> {
    let args = parse_arguments_with_source(input)?;
    Ok(args.into_iter().map(|(literal, _)| literal).collect())
}

/// As [`parse_arguments`], pairing each literal with the text it came from.
pub(crate) fn parse_arguments_with_source(
    input: &str,
) -> Result<Vec<(Literal, &str)>, ParseError> {
    let mut cursor = Cursor::new(input);
    let mut args = Vec::new();

    cursor.skip_whitespace();
    if cursor.at_end() {
        return Ok(args);
    }

    loop {
        let start = cursor.offset();
        let literal = cursor.literal()?;
        let end = cursor.offset();
        args.push((literal, &input[start..end]));
        cursor.skip_whitespace();
        match cursor.next() {
            None => return Ok(args),
            Some((_, ',')) => cursor.skip_whitespace(),
            Some((at, found)) => return Err(ParseError::Unexpected { found, at }),
        }
    }
}

/// Character cursor shared with the verb-first word splitter.
pub(crate) struct Cursor<'a> {
    src: &'a str,
    chars: Peekable<CharIndices<'a>>,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(src: &'a str) -> Self {
        Self {
            src,
            chars: src.char_indices().peekable(),
        }
    }

    pub(crate) fn peek(&mut self) -> Option<char> {
        self.chars.peek().map(|&(_, c)| c)
    }

    fn next(&mut self) -> Option<(usize, char)> {
        self.chars.next()
    }

    fn offset(&mut self) -> usize {
        self.chars.peek().map_or(self.src.len(), |&(i, _)| i)
    }

    pub(crate) fn at_end(&mut self) -> bool {
        self.chars.peek().is_none()
    }

    pub(crate) fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.chars.next();
        }
    }

    /// Consume characters while `pred` holds and return them as a slice.
    pub(crate) fn take_while(&mut self, pred: impl Fn(char) -> bool) -> &'a str {
        let start = self.offset();
        while self.peek().is_some_and(&pred) {
            self.chars.next();
        }
        let end = self.offset();
        let src = self.src;
        &src[start..end]
    }

    /// A quoted string; the cursor must sit on the opening quote.
    pub(crate) fn string(&mut self) -> Result<String, ParseError> {
        let (start, quote) = self.next().ok_or(ParseError::UnexpectedEnd)?;
        let mut out = String::new();
        loop {
            match self.next() {
                None => return Err(ParseError::UnterminatedString(start)),
                Some((_, c)) if c == quote => return Ok(out),
                Some((_, '\\')) => match self.next() {
                    None => return Err(ParseError::UnterminatedString(start)),
                    Some((_, 'n')) => out.push('\n'),
                    Some((_, 't')) => out.push('\t'),
                    Some((_, c)) => out.push(c),
                },
                Some((_, c)) => out.push(c),
            }
        }
    }

    fn literal(&mut self) -> Result<Literal, ParseError> {
        match self.peek() {
            Some('{') => self.dict(),
            _ => self.scalar().map(Literal::Scalar),
        }
    }

    fn scalar(&mut self) -> Result<Value, ParseError> {
        match self.peek() {
            None => Err(ParseError::UnexpectedEnd),
            Some('"') | Some('\'') => self.string().map(Value::Str),
            Some('{') => Err(ParseError::NestedDict),
            Some(c) if c.is_ascii_digit() || matches!(c, '-' | '+' | '.') => self.number(),
            Some(c) if c.is_alphabetic() || c == '_' => {
                let word = self.take_while(|c| c.is_alphanumeric() || c == '_');
                match word {
                    "true" | "True" => Ok(Value::Bool(true)),
                    "false" | "False" => Ok(Value::Bool(false)),
                    other => Err(ParseError::NotALiteral(other.to_string())),
                }
            }
            Some(found) => Err(ParseError::Unexpected {
                found,
                at: self.offset(),
            }),
        }
    }

    fn number(&mut self) -> Result<Value, ParseError> {
        let text =
            self.take_while(|c| c.is_ascii_digit() || matches!(c, '-' | '+' | '.' | 'e' | 'E'));
        match Value::coerce(text) {
            Value::Str(s) => Err(ParseError::InvalidNumber(s)),
            number => Ok(number),
        }
    }

    fn dict(&mut self) -> Result<Literal, ParseError> {
        self.next(); // '{'
        let mut pairs: Vec<(String, Value)> = Vec::new();
        loop {
            self.skip_whitespace();
            match self.peek() {
                None => return Err(ParseError::UnexpectedEnd),
                Some('}') => {
                    self.next();
                    return Ok(Literal::Dict(pairs));
                }
                Some('"') | Some('\'') => {}
                Some(_) => return Err(ParseError::NonStringKey),
            }

            let key = self.string()?;
            self.skip_whitespace();
            self.expect(':')?;
            self.skip_whitespace();
            let value = self.scalar()?;
            pairs.push((key, value));

            self.skip_whitespace();
            match self.next() {
                Some((_, ',')) => continue,
                Some((_, '}')) => return Ok(Literal::Dict(pairs)),
                Some((at, found)) => return Err(ParseError::Unexpected { found, at }),
                None => return Err(ParseError::UnexpectedEnd),
            }
        }
    }

    fn expect(&mut self, want: char) -> Result<(), ParseError> {
        match self.next() {
            Some((_, c)) if c == want => Ok(()),
            Some((at, found)) => Err(ParseError::Unexpected { found, at }),
            None => Err(ParseError::UnexpectedEnd),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scalar(v: impl Into<Value>) -> Literal {
        Literal::Scalar(v.into())
    }

    #[test]
    fn test_empty_arguments() {
        assert_eq!(parse_arguments(""), Ok(vec![]));
        assert_eq!(parse_arguments("   "), Ok(vec![]));
    }

    #[test]
    fn test_id_key_value() {
        let args = parse_arguments(r#""U1", "age", 36"#).expect("parse");
        assert_eq!(args, vec![scalar("U1"), scalar("age"), scalar(36i64)]);
    }

    #[test]
    fn test_source_text_of_each_argument() {
        let args = parse_arguments_with_source(r#" 0012 , "U1",{"a": 1}"#).expect("parse");
        let sources: Vec<&str> = args.iter().map(|(_, source)| *source).collect();
        assert_eq!(sources, vec!["0012", r#""U1""#, r#"{"a": 1}"#]);
        assert_eq!(args[0].0, scalar(12i64));
    }

    #[test]
    fn test_single_quotes_and_escapes() {
        let args = parse_arguments(r#"'it\'s', "say \"hi\"""#).expect("parse");
        assert_eq!(args, vec![scalar("it's"), scalar("say \"hi\"")]);
    }

    #[test]
    fn test_numbers_and_booleans() {
        let args = parse_arguments("-3, 2.5, True, false").expect("parse");
        assert_eq!(
            args,
            vec![scalar(-3i64), scalar(2.5), scalar(true), scalar(false)]
        );
    }

    #[test]
    fn test_dict_keeps_source_order() {
        let args = parse_arguments(r#""U1", {"age": 36, 'name': 'Sam', "ratio": 0.5,}"#)
            .expect("parse");
        assert_eq!(
            args,
            vec![
                scalar("U1"),
                Literal::Dict(vec![
                    ("age".into(), Value::Int(36)),
                    ("name".into(), Value::from("Sam")),
                    ("ratio".into(), Value::Float(0.5)),
                ]),
            ]
        );
    }

    #[test]
    fn test_empty_dict() {
        assert_eq!(parse_arguments("{}"), Ok(vec![Literal::Dict(vec![])]));
    }

    #[test]
    fn test_rejects_non_literals() {
        assert_eq!(
            parse_arguments("some_var"),
            Err(ParseError::NotALiteral("some_var".into()))
        );
        assert_eq!(
            parse_arguments(r#""U1" "age""#),
            Err(ParseError::Unexpected { found: '"', at: 5 })
        );
        assert_eq!(
            parse_arguments(r#""U1"#),
            Err(ParseError::UnterminatedString(0))
        );
        assert_eq!(
            parse_arguments("1.2.3"),
            Err(ParseError::InvalidNumber("1.2.3".into()))
        );
        assert_eq!(parse_arguments(r#""U1","#), Err(ParseError::UnexpectedEnd));
    }

    #[test]
    fn test_rejects_bad_dicts() {
        assert_eq!(parse_arguments("{age: 36}"), Err(ParseError::NonStringKey));
        assert_eq!(
            parse_arguments(r#"{"a": {"b": 1}}"#),
            Err(ParseError::NestedDict)
        );
        assert_eq!(parse_arguments(r#"{"a": 1"#), Err(ParseError::UnexpectedEnd));
    }
}
