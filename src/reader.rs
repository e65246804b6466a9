// ABOUTME: Tokenizer and recursive-descent parser turning source text into Value

use crate::error::EvalError;
use crate::string_codec::unescape;
use crate::value::{MapKey, Value};
use nom::branch::alt;
use nom::bytes::complete::{tag, take_while, take_while1};
use nom::character::complete::char;
use nom::combinator::recognize;
use nom::sequence::pair;
use nom::IResult;
use std::collections::HashMap;

fn is_ws(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r' | ',')
}

fn is_symbol_boundary(c: char) -> bool {
    is_ws(c) || matches!(c, '[' | ']' | '{' | '}' | '(' | ')' | '\'' | '"' | '`' | ';')
}

fn ws(input: &str) -> IResult<&str, &str> {
    take_while(is_ws)(input)
}

fn tok_special2(input: &str) -> IResult<&str, &str> {
    tag("~@")(input)
}

fn tok_special1(input: &str) -> IResult<&str, &str> {
    recognize(alt((
        char('['),
        char(']'),
        char('{'),
        char('}'),
        char('('),
        char(')'),
        char('\''),
        char('`'),
        char('~'),
        char('^'),
        char('@'),
    )))(input)
}

fn tok_comment(input: &str) -> IResult<&str, &str> {
    recognize(pair(char(';'), take_while(|c| c != '\n')))(input)
}

fn tok_symbol(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| !is_symbol_boundary(c))(input)
}

/// Scans a string literal starting at the opening `"`. Returns the full
/// token text (quotes included) and whether a closing quote was found.
fn scan_string(input: &str) -> (&str, bool) {
    let mut end = input.len();
    let mut closed = false;
    let mut chars = input.char_indices();
    chars.next(); // opening quote
    while let Some((i, c)) = chars.next() {
        if c == '\\' {
            chars.next();
            continue;
        }
        if c == '"' {
            end = i + c.len_utf8();
            closed = true;
            break;
        }
    }
    (&input[..end], closed)
}

fn next_non_string_token(input: &str) -> IResult<&str, &str> {
    alt((tok_special2, tok_special1, tok_symbol))(input)
}

/// Splits `input` into tokens per the tokeniser grammar, discarding
/// whitespace, commas, and comments. Errors on an unterminated string or an
/// unrecognized character.
fn tokenize(input: &str) -> Result<Vec<String>, EvalError> {
    let mut tokens = Vec::new();
    let mut s = input;
    loop {
        let (rest, _) = ws(s).unwrap_or((s, ""));
        s = rest;
        if s.is_empty() {
            break;
        }
        if s.starts_with('"') {
            let (tok, closed) = scan_string(s);
            if !closed {
                return Err(EvalError::Reader("unterminated string".to_string()));
            }
            s = &s[tok.len()..];
            tokens.push(tok.to_string());
            continue;
        }
        if s.starts_with(';') {
            let (rest, _) = tok_comment(s)
                .map_err(|_| EvalError::Reader("tokenizer error in comment".to_string()))?;
            s = rest;
            continue;
        }
        match next_non_string_token(s) {
            Ok((rest, tok)) => {
                tokens.push(tok.to_string());
                s = rest;
            }
            Err(_) => {
                let bad = s.chars().next().unwrap_or(' ');
                return Err(EvalError::Reader(format!("unexpected character '{bad}'")));
            }
        }
    }
    Ok(tokens)
}

struct Reader {
    tokens: Vec<String>,
    pos: usize,
}

impl Reader {
    fn peek(&self) -> Option<&str> {
        self.tokens.get(self.pos).map(|s| s.as_str())
    }

    fn advance(&mut self) -> Option<String> {
        let tok = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        tok
    }
}

/// Reads one form from `input`. Returns `Ok(None)` when `input` contains no
/// forms (only whitespace/comments), which the REPL treats as a no-op.
pub fn read_str(input: &str) -> Result<Option<Value>, EvalError> {
    let tokens = tokenize(input)?;
    if tokens.is_empty() {
        return Ok(None);
    }
    let mut reader = Reader { tokens, pos: 0 };
    let form = read_form(&mut reader)?;
    Ok(Some(form))
}

fn wrap(symbol: &str, form: Value) -> Value {
    Value::list(vec![Value::Symbol(symbol.to_string()), form])
}

fn read_form(r: &mut Reader) -> Result<Value, EvalError> {
    let tok = r
        .peek()
        .ok_or_else(|| EvalError::Reader("unexpected EOF".to_string()))?
        .to_string();
    match tok.as_str() {
        "(" => {
            r.advance();
            read_list(r, ")", false)
        }
        "[" => {
            r.advance();
            read_list(r, "]", true)
        }
        "{" => {
            r.advance();
            read_hashmap(r)
        }
        ")" | "]" | "}" => Err(EvalError::Reader(format!("unexpected '{tok}'"))),
        "'" => {
            r.advance();
            Ok(wrap("quote", read_form(r)?))
        }
        "`" => {
            r.advance();
            Ok(wrap("quasiquote", read_form(r)?))
        }
        "~" => {
            r.advance();
            Ok(wrap("unquote", read_form(r)?))
        }
        "~@" => {
            r.advance();
            Ok(wrap("splice-unquote", read_form(r)?))
        }
        "@" => {
            r.advance();
            Ok(wrap("deref", read_form(r)?))
        }
        _ => {
            r.advance();
            read_atom(&tok)
        }
    }
}

fn read_list(r: &mut Reader, closer: &str, is_vector: bool) -> Result<Value, EvalError> {
    let mut items = Vec::new();
    loop {
        match r.peek() {
            None => return Err(EvalError::Reader(format!("expected '{closer}', got EOF"))),
            Some(t) if t == closer => {
                r.advance();
                break;
            }
            _ => items.push(read_form(r)?),
        }
    }
    Ok(Value::List {
        items,
        is_vector,
        meta: None,
    })
}

fn value_to_map_key(v: &Value) -> Result<MapKey, EvalError> {
    match v {
        Value::Str(s) => Ok(MapKey(s.clone())),
        Value::Keyword(k) => Ok(MapKey(k.clone())),
        other => Err(EvalError::Reader(format!(
            "invalid hash-map key: {}",
            other.type_name()
        ))),
    }
}

fn read_hashmap(r: &mut Reader) -> Result<Value, EvalError> {
    let mut entries = HashMap::new();
    loop {
        match r.peek() {
            None => return Err(EvalError::Reader("expected '}', got EOF".to_string())),
            Some(t) if t == "}" => {
                r.advance();
                break;
            }
            _ => {
                let key = read_form(r)?;
                let map_key = value_to_map_key(&key)?;
                if matches!(r.peek(), None | Some("}")) {
                    return Err(EvalError::Reader(
                        "hash-map literal requires an even number of forms".to_string(),
                    ));
                }
                let value = read_form(r)?;
                entries.insert(map_key, value);
            }
        }
    }
    Ok(Value::Map { entries, meta: None })
}

fn read_atom(token: &str) -> Result<Value, EvalError> {
    if let Some(stripped) = token.strip_prefix('"') {
        let interior = stripped.strip_suffix('"').unwrap_or(stripped);
        return Ok(Value::Str(unescape(interior)));
    }
    if token.starts_with(':') {
        return Ok(Value::Keyword(token.to_string()));
    }
    match token {
        "true" => return Ok(Value::Bool(true)),
        "false" => return Ok(Value::Bool(false)),
        "nil" => return Ok(Value::Nil),
        _ => {}
    }
    if let Ok(n) = token.parse::<f64>() {
        return Ok(Value::Number(n));
    }
    Ok(Value::Symbol(token.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::printer::pr_str;

    fn read(input: &str) -> Value {
        read_str(input).unwrap().unwrap()
    }

    #[test]
    fn reads_empty_list_as_empty_list_not_nil() {
        let v = read("()");
        assert!(matches!(v, Value::List { ref items, is_vector: false, .. } if items.is_empty()));
    }

    #[test]
    fn reads_nested_list() {
        let v = read("(1 (2 3) 4)");
        assert_eq!(pr_str(&v, true), "(1 (2 3) 4)");
    }

    #[test]
    fn reads_vector_and_hashmap() {
        assert_eq!(pr_str(&read("[1 2 3]"), true), "[1 2 3]");
        let m = read("{\"a\" 1}");
        assert!(matches!(m, Value::Map { .. }));
    }

    #[test]
    fn reader_macros_expand_to_wrapped_forms() {
        assert_eq!(pr_str(&read("'x"), true), "(quote x)");
        assert_eq!(pr_str(&read("`x"), true), "(quasiquote x)");
        assert_eq!(pr_str(&read("~x"), true), "(unquote x)");
        assert_eq!(pr_str(&read("~@x"), true), "(splice-unquote x)");
        assert_eq!(pr_str(&read("@x"), true), "(deref x)");
    }

    #[test]
    fn strings_are_unescaped() {
        let v = read(r#""a\nb""#);
        assert!(v.mal_eq(&Value::Str("a\nb".to_string())));
    }

    #[test]
    fn comments_are_discarded() {
        let v = read("1 ; comment\n");
        assert!(v.mal_eq(&Value::Number(1.0)));
    }

    #[test]
    fn whitespace_only_input_reads_nothing() {
        assert!(read_str("  , ,\n; comment\n").unwrap().is_none());
    }

    #[test]
    fn unbalanced_paren_is_an_error() {
        assert!(read_str("(1 2").is_err());
    }

    #[test]
    fn unterminated_string_is_an_error() {
        assert!(read_str("\"abc").is_err());
    }

    #[test]
    fn keywords_and_booleans_and_nil() {
        assert!(read(":foo").mal_eq(&Value::Keyword(":foo".to_string())));
        assert!(read("true").mal_eq(&Value::Bool(true)));
        assert!(read("nil").mal_eq(&Value::Nil));
    }
}
