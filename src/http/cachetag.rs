//! Cache tags: exact labels or regular-expression patterns.

use regex::Regex;
use std::fmt;

/// A label attached to cached entries and to invalidation requests.
#[derive(Debug, Clone)]
pub enum CacheTag {
    Literal(String),
    Pattern(Regex),
}

impl CacheTag {
    /// Compile a pattern tag.
    pub fn pattern(source: &str) -> Result<Self, regex::Error> {
        Regex::new(source).map(CacheTag::Pattern)
    }

    /// The tag's string form: the literal itself, or the pattern source.
    pub fn as_str(&self) -> &str {
        match self {
            CacheTag::Literal(s) => s,
            CacheTag::Pattern(re) => re.as_str(),
        }
    }

    /// Two tags match when they are equal literals, or when either one is a
    /// pattern matching the other's string form. Symmetric.
    pub fn matches(&self, other: &CacheTag) -> bool {
        if let (CacheTag::Literal(a), CacheTag::Literal(b)) = (self, other) {
            if a == b {
                return true;
            }
        }

        if let CacheTag::Pattern(re) = self {
            if re.is_match(other.as_str()) {
                return true;
            }
        }

        if let CacheTag::Pattern(re) = other {
            if re.is_match(self.as_str()) {
                return true;
            }
        }

        false
    }
}

/// True if any tag in `a` matches any tag in `b`.
pub fn any_match(a: &[CacheTag], b: &[CacheTag]) -> bool {
    a.iter().any(|x| b.iter().any(|y| x.matches(y)))
}

impl fmt::Display for CacheTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheTag::Literal(s) => f.write_str(s),
            CacheTag::Pattern(re) => write!(f, "/{}/", re.as_str()),
        }
    }
}

impl From<&str> for CacheTag {
    fn from(s: &str) -> Self {
        CacheTag::Literal(s.to_owned())
    }
}

impl From<String> for CacheTag {
    fn from(s: String) -> Self {
        CacheTag::Literal(s)
    }
}

impl From<Regex> for CacheTag {
    fn from(re: Regex) -> Self {
        CacheTag::Pattern(re)
    }
}
