use std::fmt;

/// Lowercase, trimmed hostname without scheme or trailing slash.
pub fn normalize_host(host: &str) -> String {
    let host = host.trim();
    let host = host
        .strip_prefix("https://")
        .or_else(|| host.strip_prefix("http://"))
        .unwrap_or(host);
    host.trim_end_matches('/').to_ascii_lowercase()
}

/// One community this run intends to see blocked.
///
/// Equality is by `(name, instance)`; the desired `block` state does not
/// take part. The target list is never deduplicated, so two equal targets
/// in one list simply cause two lookups.
#[derive(Debug, Clone)]
pub struct BlockTarget {
    pub name: String,
    pub instance: String,
    pub block: bool,
}

impl BlockTarget {
    pub fn new(name: impl Into<String>, instance: &str) -> Self {
        Self::with_state(name, instance, true)
    }

    pub fn with_state(name: impl Into<String>, instance: &str, block: bool) -> Self {
        Self {
            name: name.into().trim().to_string(),
            instance: normalize_host(instance),
            block,
        }
    }

    /// `name@instance`, the form Lemmy resolves across federation.
    pub fn qualified_name(&self) -> String {
        format!("{}@{}", self.name, self.instance)
    }
}

impl PartialEq for BlockTarget {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.instance == other.instance
    }
}

impl Eq for BlockTarget {}

impl std::hash::Hash for BlockTarget {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.instance.hash(state);
    }
}

impl fmt::Display for BlockTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.instance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_ignores_desired_state() {
        let a = BlockTarget::new("memes", "lemmy.ml");
        let b = BlockTarget::with_state("memes", "lemmy.ml", false);
        let c = BlockTarget::new("memes", "lemmy.world");

        assert!(a.block);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn instance_is_normalized() {
        let target = BlockTarget::new(" news ", "https://Lemmy.ML/");
        assert_eq!(target.instance, "lemmy.ml");
        assert_eq!(target.qualified_name(), "news@lemmy.ml");
        assert_eq!(target.to_string(), "news@lemmy.ml");
    }
}
