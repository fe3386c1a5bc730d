use std::fmt::{self, Write as _};

/// A value written in literal data syntax: the subset of Python literals the
/// dataset uses for its embedded lists of records.
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    None,
    Bool(bool),
    Int(i64),
    /// An integer outside the `i64` range, kept as its decimal digits with an
    /// optional leading `-`.
    BigInt(String),
    Float(f64),
    Str(String),
    List(Vec<LiteralValue>),
    Tuple(Vec<LiteralValue>),
    /// Mapping entries in source order.
    Dict(Vec<(LiteralValue, LiteralValue)>),
}

impl LiteralValue {
    pub fn kind(&self) -> &'static str {
        match self {
            LiteralValue::None => "None",
            LiteralValue::Bool(_) => "bool",
            LiteralValue::Int(_) | LiteralValue::BigInt(_) => "int",
            LiteralValue::Float(_) => "float",
            LiteralValue::Str(_) => "str",
            LiteralValue::List(_) => "list",
            LiteralValue::Tuple(_) => "tuple",
            LiteralValue::Dict(_) => "dict",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            LiteralValue::Str(value) => Some(value),
            _ => None,
        }
    }

    /// Items of a list or tuple.
    pub fn as_sequence(&self) -> Option<&[LiteralValue]> {
        match self {
            LiteralValue::List(items) | LiteralValue::Tuple(items) => Some(items),
            _ => None,
        }
    }

    /// Looks up a string key in a mapping. Later duplicates win, as in a Python dict.
    pub fn get(&self, key: &str) -> Option<&LiteralValue> {
        match self {
            LiteralValue::Dict(entries) => entries
                .iter()
                .rev()
                .find(|(k, _)| k.as_str() == Some(key))
                .map(|(_, v)| v),
            _ => None,
        }
    }

    /// The `name` of a record, when this is a mapping with a string `name`.
    pub fn record_name(&self) -> Option<&str> {
        self.get("name").and_then(LiteralValue::as_str)
    }

    pub(crate) fn is_hashable(&self) -> bool {
        match self {
            LiteralValue::List(_) | LiteralValue::Dict(_) => false,
            LiteralValue::Tuple(items) => items.iter().all(LiteralValue::is_hashable),
            _ => true,
        }
    }
}

impl fmt::Display for LiteralValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LiteralValue::None => f.write_str("None"),
            LiteralValue::Bool(true) => f.write_str("True"),
            LiteralValue::Bool(false) => f.write_str("False"),
            LiteralValue::Int(value) => write!(f, "{value}"),
            LiteralValue::BigInt(digits) => f.write_str(digits),
            LiteralValue::Float(value) => write_float(f, *value),
            LiteralValue::Str(value) => write_quoted(f, value),
            LiteralValue::List(items) => {
                f.write_char('[')?;
                write_items(f, items)?;
                f.write_char(']')
            }
            LiteralValue::Tuple(items) => {
                f.write_char('(')?;
                write_items(f, items)?;
                if items.len() == 1 {
                    f.write_char(',')?;
                }
                f.write_char(')')
            }
            LiteralValue::Dict(entries) => {
                f.write_char('{')?;
                for (idx, (key, value)) in entries.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key}: {value}")?;
                }
                f.write_char('}')
            }
        }
    }
}

fn write_items(f: &mut fmt::Formatter<'_>, items: &[LiteralValue]) -> fmt::Result {
    for (idx, item) in items.iter().enumerate() {
        if idx > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

fn write_float(f: &mut fmt::Formatter<'_>, value: f64) -> fmt::Result {
    if value.is_nan() {
        return f.write_str("nan");
    }
    if value.is_infinite() {
        return f.write_str(if value > 0.0 { "inf" } else { "-inf" });
    }
    let text = value.to_string();
    if text.contains(['.', 'e', 'E']) {
        f.write_str(&text)
    } else {
        write!(f, "{text}.0")
    }
}

// Quote selection and escaping follow Python's str repr.
fn write_quoted(f: &mut fmt::Formatter<'_>, value: &str) -> fmt::Result {
    let quote = if value.contains('\'') && !value.contains('"') {
        '"'
    } else {
        '\''
    };

    f.write_char(quote)?;
    for ch in value.chars() {
        match ch {
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            '\r' => f.write_str("\\r")?,
            '\t' => f.write_str("\\t")?,
            c if c == quote => {
                f.write_char('\\')?;
                f.write_char(c)?;
            }
            c if c.is_control() => {
                let code = c as u32;
                if code < 0x100 {
                    write!(f, "\\x{code:02x}")?;
                } else {
                    write!(f, "\\u{code:04x}")?;
                }
            }
            c => f.write_char(c)?,
        }
    }
    f.write_char(quote)
}

/// Ordered `name` values drawn from a list of records.
///
/// Used for the genre and keyword columns, which downstream consumers only
/// ever read as names. Items that are not mappings, or have no string `name`,
/// are skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamedList {
    names: Vec<String>,
}

impl NamedList {
    pub fn from_records(records: &[LiteralValue]) -> Self {
        let names = records
            .iter()
            .filter_map(LiteralValue::record_name)
            .map(str::to_string)
            .collect();
        Self { names }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl fmt::Display for NamedList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.names.join(", "))
    }
}
