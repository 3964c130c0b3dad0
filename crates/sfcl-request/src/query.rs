use std::fmt;

use percent_encoding::percent_decode_str;
use percent_encoding::utf8_percent_encode;
use percent_encoding::AsciiSet;
use percent_encoding::NON_ALPHANUMERIC;
use serde::Serialize;

/// Everything except `A-Z a-z 0-9 - _ . ! ~ * ' ( )` is escaped.
const QUERY_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

#[must_use]
pub fn escape(component: &str) -> String {
    utf8_percent_encode(component, QUERY_COMPONENT).to_string()
}

#[must_use]
pub fn unescape(component: &str) -> String {
    let spaced = component.replace('+', " ");
    percent_decode_str(&spaced).decode_utf8_lossy().into_owned()
}

/// One `key` or `key=value` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Param {
    pub key: String,
    pub value: Option<String>,
}

/// An ordered query string.
///
/// Keys may repeat and order is kept, so serializing a parsed query gives
/// back an equivalent string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Query(Vec<Param>);

impl Query {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `a=1&b&c=x%20y`. A leading `?` is ignored.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let raw = raw.strip_prefix('?').unwrap_or(raw);
        raw.split('&')
            .filter(|part| !part.is_empty())
            .map(|part| match part.split_once('=') {
                Some((key, value)) => Param {
                    key: unescape(key),
                    value: Some(unescape(value)),
                },
                None => Param {
                    key: unescape(part),
                    value: None,
                },
            })
            .collect()
    }

    pub fn push(&mut self, key: impl Into<String>, value: Option<String>) {
        self.0.push(Param {
            key: key.into(),
            value,
        });
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.0.iter().any(|param| param.key == key)
    }

    /// First value for `key`. A bare key yields `Some("")`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|param| param.key == key)
            .map(|param| param.value.as_deref().unwrap_or(""))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Param> {
        self.0.iter()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Serialized pairs, each preceded by `&`.
    #[must_use]
    pub fn to_suffix(&self) -> String {
        let mut out = String::new();
        for param in &self.0 {
            out.push('&');
            write_param(&mut out, param);
        }
        out
    }
}

fn write_param(out: &mut String, param: &Param) {
    out.push_str(&escape(&param.key));
    if let Some(value) = &param.value {
        out.push('=');
        out.push_str(&escape(value));
    }
}

impl FromIterator<Param> for Query {
    fn from_iter<T: IntoIterator<Item = Param>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let suffix = self.to_suffix();
        f.write_str(suffix.strip_prefix('&').unwrap_or(&suffix))
    }
}
