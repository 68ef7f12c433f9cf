//! Command parsing.
//!
//! Two surface grammars produce the same [`Command`]:
//!
//! | Form | Example |
//! |------|---------|
//! | Verb-first | `update User 1234 email "a@b.com"` |
//! | Dot-notation | `User.update("1234", "email", "a@b.com")` |
//! | Dot-notation, dictionary | `User.update("1234", {"age": 36, "name": "Sam"})` |

use thiserror::Error;

use super::literal::{parse_arguments_with_source, Cursor, Literal, ParseError};
use crate::models::Value;

/// The verbs the console understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    Create,
    Show,
    Destroy,
    All,
    Count,
    Update,
    Help,
    Quit,
    Eof,
    Clear,
}

impl Verb {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Show => "show",
            Self::Destroy => "destroy",
            Self::All => "all",
            Self::Count => "count",
            Self::Update => "update",
            Self::Help => "help",
            Self::Quit => "quit",
            Self::Eof => "EOF",
            Self::Clear => "cls",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "create" => Some(Self::Create),
            "show" => Some(Self::Show),
            "destroy" => Some(Self::Destroy),
            "all" => Some(Self::All),
            "count" => Some(Self::Count),
            "update" => Some(Self::Update),
            "help" => Some(Self::Help),
            "quit" => Some(Self::Quit),
            "EOF" => Some(Self::Eof),
            "cls" => Some(Self::Clear),
            _ => None,
        }
    }

    /// Verbs that read or write the object store. Only these are reachable
    /// through dot-notation.
    pub fn is_data(&self) -> bool {
        matches!(
            self,
            Self::Create | Self::Show | Self::Destroy | Self::All | Self::Count | Self::Update
        )
    }
}

/// A parsed input line, independent of which grammar produced it.
///
/// For `help`, the topic travels in `class_name`.
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    pub verb: Verb,
    pub class_name: Option<String>,
    pub id: Option<String>,
    pub positional_args: Vec<Value>,
    /// Only set by the dictionary form of dot-notation `update`.
    pub dict_arg: Option<Vec<(String, Value)>>,
}

impl Command {
    pub fn new(verb: Verb) -> Self {
        Self {
            verb,
            class_name: None,
            id: None,
            positional_args: Vec::new(),
            dict_arg: None,
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum SyntaxError {
    #[error("unknown command `{0}`")]
    UnknownVerb(String),

    #[error("malformed method call")]
    MalformedCall,

    #[error("`{0}` cannot be called on a class")]
    NotCallable(String),

    #[error("unsupported argument list")]
    ArgumentShape,

    #[error(transparent)]
    Literal(#[from] ParseError),
}

/// Parse one input line. Blank lines yield `Ok(None)`.
pub fn parse_line(line: &str) -> Result<Option<Command>, SyntaxError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    if let Some(topic) = line.strip_prefix('?') {
        let mut cmd = Command::new(Verb::Help);
        cmd.class_name = topic.split_whitespace().next().map(String::from);
        return Ok(Some(cmd));
    }

    let first = line.split_whitespace().next().unwrap_or_default();
    if let Some(verb) = Verb::from_str(first) {
        return parse_verb_first(verb, line).map(Some);
    }
    if first.contains('.') {
        return parse_dot_notation(line).map(Some);
    }
    Err(SyntaxError::UnknownVerb(first.to_string()))
}

/// `<verb> [<class>] [<id>] [<key> <value> ...]`
fn parse_verb_first(verb: Verb, line: &str) -> Result<Command, SyntaxError> {
    let words = split_words(line)?;
    let mut words = words.into_iter().skip(1);

    let mut cmd = Command::new(verb);
    cmd.class_name = words.next().map(|w| w.text());
    cmd.id = words.next().map(|w| w.text());
    cmd.positional_args = words.map(|w| w.value()).collect();
    Ok(cmd)
}

/// `<Class>.<verb>(<args>)`
fn parse_dot_notation(line: &str) -> Result<Command, SyntaxError> {
    let (class_name, rest) = line.split_once('.').ok_or(SyntaxError::MalformedCall)?;
    let open = rest.find('(').ok_or(SyntaxError::MalformedCall)?;
    let method = &rest[..open];
    let args_src = rest[open + 1..]
        .strip_suffix(')')
        .ok_or(SyntaxError::MalformedCall)?;
    if !is_identifier(class_name) || !is_identifier(method) {
        return Err(SyntaxError::MalformedCall);
    }

    let verb = Verb::from_str(method)
        .filter(Verb::is_data)
        .ok_or_else(|| SyntaxError::NotCallable(method.to_string()))?;

    let mut cmd = Command::new(verb);
    cmd.class_name = Some(class_name.to_string());

    let mut args = parse_arguments_with_source(args_src)?.into_iter();
    match args.next() {
        None => return Ok(cmd),
        Some((Literal::Scalar(Value::Str(id)), _)) => cmd.id = Some(id),
        // Bare ids are taken as written, not as the number they spell.
        Some((Literal::Scalar(_), source)) => cmd.id = Some(source.to_string()),
        Some((Literal::Dict(_), _)) => return Err(SyntaxError::ArgumentShape),
    }
    let mut args = args.map(|(literal, _)| literal);
    match args.next() {
        None => {}
        Some(Literal::Dict(pairs)) => {
            if args.next().is_some() {
                return Err(SyntaxError::ArgumentShape);
            }
            cmd.dict_arg = Some(pairs);
        }
        Some(Literal::Scalar(key)) => {
            cmd.positional_args.push(key);
            for arg in args {
                match arg {
                    Literal::Scalar(value) => cmd.positional_args.push(value),
                    Literal::Dict(_) => return Err(SyntaxError::ArgumentShape),
                }
            }
        }
    }
    Ok(cmd)
}

fn is_identifier(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_alphanumeric() || c == '_')
}

enum Word<'a> {
    Bare(&'a str),
    Quoted(String),
}

impl Word<'_> {
    fn text(&self) -> String {
        match self {
            Self::Bare(s) => s.to_string(),
            Self::Quoted(s) => s.clone(),
        }
    }

    /// Quoted words are always strings; bare words get numeric coercion.
    fn value(&self) -> Value {
        match self {
            Self::Bare(s) => Value::coerce(s),
            Self::Quoted(s) => Value::Str(s.clone()),
        }
    }
}

fn split_words(line: &str) -> Result<Vec<Word<'_>>, ParseError> {
    let mut cursor = Cursor::new(line);
    let mut words = Vec::new();
    loop {
        cursor.skip_whitespace();
        match cursor.peek() {
            None => return Ok(words),
            Some('"') | Some('\'') => words.push(Word::Quoted(cursor.string()?)),
            Some(_) => words.push(Word::Bare(cursor.take_while(|c| !c.is_whitespace()))),
        }
    }
}
