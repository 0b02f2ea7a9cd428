use url::form_urlencoded;

/// Query string with an optional opaque leading fragment. The fragment
/// (a category's `query`) is emitted verbatim; pairs are form-encoded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct QueryString {
    fragment: Option<String>,
    pairs: Vec<(String, String)>,
}

impl QueryString {
    pub fn new() -> Self {
        QueryString::default()
    }

    pub fn with_fragment(fragment: &str) -> Self {
        let fragment = fragment.trim().trim_start_matches('?').trim_matches('&');
        QueryString {
            fragment: (!fragment.is_empty()).then(|| fragment.to_string()),
            pairs: Vec::new(),
        }
    }

    pub fn push(&mut self, key: &str, value: impl ToString) -> &mut Self {
        self.pairs.push((key.to_string(), value.to_string()));
        self
    }

    /// Appends the pair only when `value` is present and non-blank.
    pub fn push_opt<V: ToString>(&mut self, key: &str, value: Option<V>) -> &mut Self {
        if let Some(value) = value {
            let value = value.to_string();
            if !value.trim().is_empty() {
                self.pairs.push((key.to_string(), value));
            }
        }
        self
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    pub fn count(&self, key: &str) -> usize {
        self.pairs.iter().filter(|(k, _)| k == key).count()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn render(&self) -> String {
        let encoded = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.pairs.iter())
            .finish();
        match (&self.fragment, encoded.is_empty()) {
            (Some(fragment), true) => fragment.clone(),
            (Some(fragment), false) => format!("{}&{}", fragment, encoded),
            (None, _) => encoded,
        }
    }
}

impl std::fmt::Display for QueryString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.render())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fragment_is_kept_verbatim() {
        let mut qs = QueryString::with_fragment("?cat=8126&subject=41");
        qs.push("shard", "bl_shirts").push("pages", 2);
        assert_eq!(qs.render(), "cat=8126&subject=41&shard=bl_shirts&pages=2");
    }

    #[test]
    fn blank_optionals_are_skipped() {
        let mut qs = QueryString::new();
        qs.push_opt("maxSaleCount", Some(""))
            .push_opt::<u32>("limit", None)
            .push_opt("regDate", Some("2024-01-01"));
        assert_eq!(qs.render(), "regDate=2024-01-01");
    }

    #[test]
    fn values_are_encoded() {
        let mut qs = QueryString::new();
        qs.push("q", "tea & coffee");
        assert_eq!(qs.render(), "q=tea+%26+coffee");
    }
}
