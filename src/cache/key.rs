//! Cache key construction
//!
//! Keys are either a literal request URL or a logical name followed by a
//! canonical, name-sorted parameter list. Absent parameters are dropped and
//! every value is stringified, so `5` and `"5"` produce the same key.
//! Names and values are form-encoded, so a value containing `&` or `=`
//! cannot pass for extra parameters.

use std::collections::BTreeMap;
use std::fmt::Display;

use serde_json::{Map, Value};
use url::form_urlencoded;

/// Builder for composite cache keys
///
/// ```
/// use ibgefetch::cache::CacheKey;
///
/// let key = CacheKey::new("agregados")
///     .param("periodo", 2022)
///     .param("localidade", "N3[33]")
///     .opt_param::<&str>("classificacao", None)
///     .build();
///
/// assert_eq!(key, "agregados?localidade=N3%5B33%5D&periodo=2022");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheKey {
    base: String,
    params: BTreeMap<String, String>,
}

impl CacheKey {
    /// Starts a key from a URL or logical endpoint name
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            params: BTreeMap::new(),
        }
    }

    /// Adds a parameter, replacing any earlier value under the same name
    pub fn param(mut self, name: impl Into<String>, value: impl Display) -> Self {
        self.params.insert(name.into(), value.to_string());
        self
    }

    /// Adds a parameter only when a value is present
    pub fn opt_param<V: Display>(self, name: impl Into<String>, value: Option<V>) -> Self {
        match value {
            Some(value) => self.param(name, value),
            None => self,
        }
    }

    /// Renders the key string
    pub fn build(&self) -> String {
        render(&self.base, &self.params)
    }
}

/// Builds a cache key from a base identifier and a JSON object of parameters
///
/// `null` values are omitted. Strings are taken as-is, other scalars via
/// their JSON text, and arrays or objects as compact JSON, all before
/// form encoding.
pub fn cache_key(base: &str, params: Option<&Map<String, Value>>) -> String {
    let canonical: BTreeMap<String, String> = params
        .into_iter()
        .flatten()
        .filter_map(|(name, value)| stringify(value).map(|v| (name.clone(), v)))
        .collect();

    render(base, &canonical)
}

fn stringify(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn render(base: &str, params: &BTreeMap<String, String>) -> String {
    if params.is_empty() {
        return base.to_string();
    }

    let query = form_urlencoded::Serializer::new(String::new())
        .extend_pairs(params)
        .finish();

    // A URL base may already carry a query string
    let separator = if base.contains('?') { '&' } else { '?' };
    format!("{}{}{}", base, separator, query)
}
