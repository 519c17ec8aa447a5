use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::ValueEnum;

use crate::error::SearchError;

/// Alphabet used when cleaning raw words.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum Language {
    #[default]
    #[value(name = "de")]
    German,
    #[value(name = "en")]
    English,
}

impl Language {
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::German => "de",
            Self::English => "en",
        }
    }

    /// Whether `c` (already lowercased) belongs to this language's letter set.
    #[must_use]
    pub fn permits(self, c: char) -> bool {
        if c.is_ascii_lowercase() {
            return true;
        }
        match self {
            Self::German => matches!(c, 'ä' | 'ö' | 'ü' | 'ß'),
            Self::English => false,
        }
    }
}

/// A validated isogram word with its precomputed slices.
#[derive(Clone, Debug)]
pub struct Entry {
    word: String,
    len: usize,
    chars: HashSet<char>,
    prefix2: String,
    prefix3: String,
    suffix2: String,
    suffix3: String,
}

impl Entry {
    /// Build an entry from an already-cleaned word.
    ///
    /// Returns `None` for empty words and for words with a repeated character.
    #[must_use]
    pub fn new(word: &str) -> Option<Self> {
        if word.is_empty() || !is_isogram(word) {
            return None;
        }
        Some(Self {
            word: word.to_string(),
            len: word.chars().count(),
            chars: word.chars().collect(),
            prefix2: char_prefix(word, 2),
            prefix3: char_prefix(word, 3),
            suffix2: char_suffix(word, 2),
            suffix3: char_suffix(word, 3),
        })
    }

    #[must_use]
    pub fn word(&self) -> &str {
        &self.word
    }

    /// Length in characters, not bytes. Never zero.
    #[must_use]
    pub fn char_len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn chars(&self) -> &HashSet<char> {
        &self.chars
    }

    #[must_use]
    pub fn prefix2(&self) -> &str {
        &self.prefix2
    }

    #[must_use]
    pub fn prefix3(&self) -> &str {
        &self.prefix3
    }

    #[must_use]
    pub fn suffix2(&self) -> &str {
        &self.suffix2
    }

    #[must_use]
    pub fn suffix3(&self) -> &str {
        &self.suffix3
    }

    #[must_use]
    pub fn is_disjoint(&self, used: &HashSet<char>) -> bool {
        self.chars.is_disjoint(used)
    }
}

/// First `n` characters of `word`, or the whole word if it is shorter.
#[must_use]
pub fn char_prefix(word: &str, n: usize) -> String {
    word.chars().take(n).collect()
}

/// Last `n` characters of `word`, or the whole word if it is shorter.
#[must_use]
pub fn char_suffix(word: &str, n: usize) -> String {
    let count = word.chars().count();
    word.chars().skip(count.saturating_sub(n)).collect()
}

#[must_use]
pub fn is_isogram(word: &str) -> bool {
    let mut seen = HashSet::new();
    word.chars().all(|c| seen.insert(c))
}

/// Lowercase, strip foreign characters and validate.
///
/// Returns the cleaned word when it is a non-empty isogram.
#[must_use]
pub fn clean_and_check_isogram(word: &str, language: Language) -> Option<String> {
    let cleaned: String = word
        .to_lowercase()
        .chars()
        .filter(|&c| language.permits(c))
        .collect();
    let cleaned = cleaned.trim();
    if !cleaned.is_empty() && is_isogram(cleaned) {
        Some(cleaned.to_string())
    } else {
        None
    }
}

/// Clean every token, keep the first occurrence of each isogram and sort by descending length.
fn unique_isograms<'a>(tokens: impl Iterator<Item = &'a str>, language: Language) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut words: Vec<String> = tokens
        .filter_map(|token| clean_and_check_isogram(token, language))
        .filter(|word| seen.insert(word.clone()))
        .collect();
    // Stable, so equal lengths keep input order and repeated runs agree.
    words.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()));
    words
}

/// Parse a newline-delimited word list into search entries, longest first.
#[must_use]
pub fn parse_entries(text: &str, language: Language) -> Vec<Arc<Entry>> {
    let tokens = text.lines().map(str::trim).filter(|line| !line.is_empty());
    unique_isograms(tokens, language)
        .iter()
        .filter_map(|word| Entry::new(word))
        .map(Arc::new)
        .collect()
}

/// Extract isograms from arbitrary text, splitting on any run of non-letters.
///
/// The result is suitable for writing back as a one-word-per-line list.
#[must_use]
pub fn prepare_wordlist(text: &str, language: Language) -> Vec<String> {
    let tokens = text
        .split(|c: char| !is_word_char(c, language))
        .filter(|token| !token.is_empty());
    unique_isograms(tokens, language)
}

fn is_word_char(c: char, language: Language) -> bool {
    c.to_lowercase().all(|lower| language.permits(lower))
}

pub fn load_wordlist_from_file<P: AsRef<Path>>(path: P) -> Result<String, SearchError> {
    Ok(fs::read_to_string(path)?)
}

/// Per-language word list location, e.g. `~/.local/share/isogram-finder/de.txt`.
#[must_use]
pub fn default_wordlist_path(language: Language) -> Option<PathBuf> {
    dirs::data_dir().map(|dir| {
        dir.join("isogram-finder")
            .join(format!("{}.txt", language.code()))
    })
}
