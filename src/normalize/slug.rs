//! URL slugs with per-kind uniqueness.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

static NON_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\w\s-]").unwrap());
static SEPARATORS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[-\s]+").unwrap());

/// Build a slug: NFKD fold to ASCII, lowercase, drop punctuation, and join
/// words with single hyphens.
pub fn slugify(text: &str) -> String {
    let ascii: String = text.nfkd().filter(|c| c.is_ascii()).collect();
    let lowered = ascii.to_lowercase();
    let stripped = NON_WORD.replace_all(lowered.trim(), "");
    let joined = SEPARATORS.replace_all(&stripped, "-");
    joined.trim_matches('-').to_string()
}

/// Hands out slugs that are unique against a set loaded at batch start.
#[derive(Debug, Default, Clone)]
pub struct SlugAllocator {
    taken: HashSet<String>,
}

impl SlugAllocator {
    pub fn new<I, S>(existing: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            taken: existing.into_iter().map(Into::into).collect(),
        }
    }

    /// Allocate a slug for `name`, falling back to `fallback` when the name
    /// has no sluggable characters. Collisions get `-1`, `-2`, ... appended.
    pub fn allocate(&mut self, name: &str, fallback: &str) -> String {
        let mut base = slugify(name);
        if base.is_empty() {
            base = slugify(fallback);
        }
        if base.is_empty() {
            base = "item".to_string();
        }

        let mut candidate = base.clone();
        let mut counter = 1;
        while self.taken.contains(&candidate) {
            candidate = format!("{}-{}", base, counter);
            counter += 1;
        }
        self.taken.insert(candidate.clone());
        candidate
    }

    pub fn contains(&self, slug: &str) -> bool {
        self.taken.contains(slug)
    }
}
