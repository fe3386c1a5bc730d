//! Restricted literal reader.
//!
//! Accepts only data: strings, numbers, `True`/`False`/`None`, lists, tuples
//! and mappings. Names, calls, operators (other than a sign on a number) and
//! anything else that would need evaluation are rejected.

use crate::errors::LiteralError;
use crate::model::LiteralValue;

pub const MAX_NESTING_DEPTH: usize = 64;

/// Integers are unbounded; those that overflow `i64` keep their digits.
fn big_int(negative: bool, signed: &str) -> LiteralValue {
    let digits = signed.trim_start_matches('-').trim_start_matches('0');
    if negative {
        LiteralValue::BigInt(format!("-{digits}"))
    } else {
        LiteralValue::BigInt(digits.to_string())
    }
}

/// Parses one literal value; the whole input must be consumed.
pub fn parse_literal(input: &str) -> Result<LiteralValue, LiteralError> {
    let mut reader = Reader::new(input);
    let value = reader.value()?;
    reader.skip_whitespace();
    if reader.pos < input.len() {
        return Err(LiteralError::TrailingContent { offset: reader.pos });
    }
    Ok(value)
}

/// Parses a cell that must hold a list (or tuple) of records.
pub fn parse_record_list(input: &str) -> Result<Vec<LiteralValue>, LiteralError> {
    match parse_literal(input)? {
        LiteralValue::List(items) | LiteralValue::Tuple(items) => Ok(items),
        other => Err(LiteralError::NotAList {
            found: other.kind(),
        }),
    }
}

struct Reader<'a> {
    src: &'a str,
    pos: usize,
    depth: usize,
}

impl<'a> Reader<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            pos: 0,
            depth: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.peek() {
            if ch.is_whitespace() {
                self.pos += ch.len_utf8();
            } else {
                break;
            }
        }
    }

    fn expect_more(&self, expected: &'static str) -> Result<char, LiteralError> {
        self.peek().ok_or(LiteralError::UnexpectedEnd {
            offset: self.pos,
            expected,
        })
    }

    fn value(&mut self) -> Result<LiteralValue, LiteralError> {
        self.skip_whitespace();
        let ch = self.expect_more("a value")?;
        match ch {
            '[' => self.nested(|r| r.sequence(']').map(LiteralValue::List)),
            '(' => self.nested(Reader::tuple),
            '{' => self.nested(Reader::dict),
            '\'' | '"' => self.strings().map(LiteralValue::Str),
            '-' | '+' | '.' | '0'..='9' => self.number(),
            c if c.is_alphabetic() || c == '_' => self.keyword(),
            found => Err(LiteralError::UnexpectedChar {
                offset: self.pos,
                found,
                expected: "a value",
            }),
        }
    }

    fn nested(
        &mut self,
        inner: impl FnOnce(&mut Self) -> Result<LiteralValue, LiteralError>,
    ) -> Result<LiteralValue, LiteralError> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(LiteralError::TooDeep {
                offset: self.pos,
                limit: MAX_NESTING_DEPTH,
            });
        }
        self.depth += 1;
        let result = inner(self);
        self.depth -= 1;
        result
    }

    /// Reads comma-separated values up to `close`; the opening bracket is still pending.
    fn sequence(&mut self, close: char) -> Result<Vec<LiteralValue>, LiteralError> {
        self.bump();
        self.items_until(Vec::new(), close)
    }

    fn items_until(
        &mut self,
        mut items: Vec<LiteralValue>,
        close: char,
    ) -> Result<Vec<LiteralValue>, LiteralError> {
        loop {
            self.skip_whitespace();
            if self.expect_more("a value or closing bracket")? == close {
                self.bump();
                return Ok(items);
            }
            items.push(self.value()?);
            if !self.separator(close)? {
                return Ok(items);
            }
        }
    }

    /// After an element: consumes `,` (returns true) or the closing bracket (returns false).
    fn separator(&mut self, close: char) -> Result<bool, LiteralError> {
        self.skip_whitespace();
        let ch = self.expect_more("',' or closing bracket")?;
        if ch == ',' {
            self.bump();
            Ok(true)
        } else if ch == close {
            self.bump();
            Ok(false)
        } else {
            Err(LiteralError::UnexpectedChar {
                offset: self.pos,
                found: ch,
                expected: "',' or closing bracket",
            })
        }
    }

    fn tuple(&mut self) -> Result<LiteralValue, LiteralError> {
        self.bump();
        self.skip_whitespace();
        if self.expect_more("a value or ')'")? == ')' {
            self.bump();
            return Ok(LiteralValue::Tuple(Vec::new()));
        }

        let first = self.value()?;
        self.skip_whitespace();
        match self.expect_more("',' or ')'")? {
            // A parenthesised single value without a comma is just that value.
            ')' => {
                self.bump();
                Ok(first)
            }
            ',' => {
                self.bump();
                self.items_until(vec![first], ')').map(LiteralValue::Tuple)
            }
            found => Err(LiteralError::UnexpectedChar {
                offset: self.pos,
                found,
                expected: "',' or ')'",
            }),
        }
    }

    fn dict(&mut self) -> Result<LiteralValue, LiteralError> {
        self.bump();
        let mut entries = Vec::new();
        loop {
            self.skip_whitespace();
            if self.expect_more("a key or '}'")? == '}' {
                self.bump();
                return Ok(LiteralValue::Dict(entries));
            }

            let key_offset = self.pos;
            let key = self.value()?;
            if !key.is_hashable() {
                return Err(LiteralError::UnhashableKey { offset: key_offset });
            }

            self.skip_whitespace();
            match self.expect_more("':'")? {
                ':' => {
                    self.bump();
                }
                found => {
                    return Err(LiteralError::UnexpectedChar {
                        offset: self.pos,
                        found,
                        expected: "':'",
                    })
                }
            }

            let value = self.value()?;
            entries.push((key, value));
            if !self.separator('}')? {
                return Ok(LiteralValue::Dict(entries));
            }
        }
    }

    /// One or more adjacent string literals, concatenated.
    fn strings(&mut self) -> Result<String, LiteralError> {
        let mut out = self.string()?;
        loop {
            let save = self.pos;
            self.skip_whitespace();
            match self.peek() {
                Some('\'') | Some('"') => out.push_str(&self.string()?),
                _ => {
                    self.pos = save;
                    return Ok(out);
                }
            }
        }
    }

    fn string(&mut self) -> Result<String, LiteralError> {
        let start = self.pos;
        let quote = self
            .bump()
            .ok_or(LiteralError::UnterminatedString { offset: start })?;
        let mut out = String::new();

        loop {
            let ch = self
                .bump()
                .ok_or(LiteralError::UnterminatedString { offset: start })?;
            match ch {
                c if c == quote => return Ok(out),
                '\n' => return Err(LiteralError::UnterminatedString { offset: start }),
                '\\' => self.escape(&mut out, start)?,
                c => out.push(c),
            }
        }
    }

    fn escape(&mut self, out: &mut String, start: usize) -> Result<(), LiteralError> {
        let offset = self.pos - 1;
        let ch = self
            .bump()
            .ok_or(LiteralError::UnterminatedString { offset: start })?;
        match ch {
            '\\' => out.push('\\'),
            '\'' => out.push('\''),
            '"' => out.push('"'),
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            '0' => out.push('\0'),
            'a' => out.push('\u{07}'),
            'b' => out.push('\u{08}'),
            'f' => out.push('\u{0c}'),
            'v' => out.push('\u{0b}'),
            // Line continuation.
            '\n' => {}
            'x' => out.push(self.hex_escape(2, offset)?),
            'u' => out.push(self.hex_escape(4, offset)?),
            'U' => out.push(self.hex_escape(8, offset)?),
            other => {
                out.push('\\');
                out.push(other);
            }
        }
        Ok(())
    }

    fn hex_escape(&mut self, digits: usize, offset: usize) -> Result<char, LiteralError> {
        let end = self.pos + digits;
        let text = self
            .src
            .get(self.pos..end)
            .filter(|t| t.chars().all(|c| c.is_ascii_hexdigit()))
            .ok_or_else(|| LiteralError::InvalidEscape {
                offset,
                message: format!("expected {digits} hex digits"),
            })?;
        let code = u32::from_str_radix(text, 16).map_err(|err| LiteralError::InvalidEscape {
            offset,
            message: err.to_string(),
        })?;
        let ch = char::from_u32(code).ok_or_else(|| LiteralError::InvalidEscape {
            offset,
            message: format!("U+{code:X} is not a valid character"),
        })?;
        self.pos = end;
        Ok(ch)
    }

    fn number(&mut self) -> Result<LiteralValue, LiteralError> {
        let start = self.pos;
        let mut negative = false;
        if let Some(sign @ ('-' | '+')) = self.peek() {
            self.bump();
            negative = sign == '-';
            self.skip_whitespace();
        }

        let body_start = self.pos;
        let mut is_float = false;
        while let Some(ch) = self.peek() {
            match ch {
                '0'..='9' | '_' => {}
                '.' | 'e' | 'E' => is_float = true,
                '-' | '+' if matches!(self.prev_char(), Some('e' | 'E')) => {}
                _ => break,
            }
            self.bump();
        }

        let body = &self.src[body_start..self.pos];
        let invalid = || LiteralError::InvalidNumber {
            offset: start,
            text: self.src[start..self.pos].to_string(),
        };
        if body.is_empty()
            || body.starts_with('_')
            || body.ends_with('_')
            || body.contains("__")
            || !body.chars().any(|c| c.is_ascii_digit())
        {
            return Err(invalid());
        }

        let digits: String = body.chars().filter(|c| *c != '_').collect();
        if is_float {
            let value: f64 = digits.parse().map_err(|_| invalid())?;
            Ok(LiteralValue::Float(if negative { -value } else { value }))
        } else {
            let signed = if negative {
                format!("-{digits}")
            } else {
                digits
            };
            match signed.parse::<i64>() {
                Ok(value) => Ok(LiteralValue::Int(value)),
                Err(_) => Ok(big_int(negative, &signed)),
            }
        }
    }

    fn prev_char(&self) -> Option<char> {
        self.src[..self.pos].chars().next_back()
    }

    fn keyword(&mut self) -> Result<LiteralValue, LiteralError> {
        let start = self.pos;
        while let Some(ch) = self.peek() {
            if ch.is_alphanumeric() || ch == '_' {
                self.bump();
            } else {
                break;
            }
        }
        match &self.src[start..self.pos] {
            "True" => Ok(LiteralValue::Bool(true)),
            "False" => Ok(LiteralValue::Bool(false)),
            "None" => Ok(LiteralValue::None),
            name => Err(LiteralError::NotALiteral {
                offset: start,
                name: name.to_string(),
            }),
        }
    }
}
