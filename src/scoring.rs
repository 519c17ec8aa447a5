//! Heuristic desirability score for a sequence of words.
//!
//! Longer words dominate through the `len^1.3` base term. Adjacent pairs earn bonuses when
//! the boundary looks like a plausible German compound: matching slices, a derivational
//! suffix on the left word, a derivational prefix on the right word, or a linking element.

use std::sync::Arc;

use crate::wordlist::Entry;

pub const LENGTH_EXPONENT: f64 = 1.3;
pub const LONG_WORD_MIN: usize = 8;
pub const LONG_WORD_BONUS: f64 = 5.0;
pub const SHORT_WORD_MAX: usize = 3;
pub const SHORT_WORD_PENALTY: f64 = 3.0;
pub const SLICE2_MATCH_BONUS: f64 = 3.5;
pub const SLICE3_MATCH_BONUS: f64 = 5.0;
pub const SUFFIX_BONUS: f64 = 3.0;
pub const PREFIX_BONUS: f64 = 5.0;
pub const LINK_BONUS: f64 = 4.0;
pub const PARTIAL_LINK_BONUS: f64 = 2.0;
pub const WORD_COUNT_FREE: usize = 4;
pub const EXTRA_WORD_PENALTY: f64 = 1.5;

pub const SUFFIXES: &[&str] = &[
    "ung", "keit", "heit", "schaft", "tum", "ion", "ismus", "ist", "ling", "erei", "ler", "ner",
    "chen", "lein", "nis", "sal", "in", "enz", "anz", "or", "ör", "ität", "ment", "age", "ur",
    "tät", "ik", "loge", "iker", "graph", "gramm", "tion", "eur", "eurin", "euren", "ation",
    "logie", "phie", "är", "ärin", "ärchen", "sel", "er", "erin",
];

pub const PREFIXES: &[&str] = &[
    "un", "ver", "be", "ent", "er", "ab", "auf", "aus", "an", "ein", "mit", "nach", "über", "um",
    "unter", "vor", "wider", "zer", "zurück", "zu", "bei", "fort", "gegen", "her", "hin", "los",
    "miss", "wieder", "ur", "voll", "zwischen", "durch", "ober", "nieder", "heim", "fern",
    "manch", "viel", "wenig", "hoch", "fehl", "ge", "trans", "auto", "anti", "ex", "prä", "post",
    "sub", "super", "inter", "infra", "hyper", "para", "mono", "poly", "tri", "multi", "bi",
    "semi", "ko", "kontra", "re", "pseudo", "quasi", "neo", "sozio",
];

/// Checked in order; the first hit decides the pair's linking bonus.
pub const LINKING_ELEMENTS: &[&str] = &["s", "es", "n", "en", "er", "e"];

#[must_use]
pub fn compute_score(combo: &[Arc<Entry>]) -> f64 {
    let mut score = 0.0;
    for (i, word) in combo.iter().enumerate() {
        score += word_score(word);
        if i > 0 {
            score += pair_bonus(&combo[i - 1], word);
        }
    }
    if combo.len() > WORD_COUNT_FREE {
        score -= (combo.len() - WORD_COUNT_FREE) as f64 * EXTRA_WORD_PENALTY;
    }
    score
}

fn word_score(word: &Entry) -> f64 {
    let mut score = (word.char_len() as f64).powf(LENGTH_EXPONENT);
    if word.char_len() >= LONG_WORD_MIN {
        score += LONG_WORD_BONUS;
    }
    if word.char_len() <= SHORT_WORD_MAX {
        score -= SHORT_WORD_PENALTY;
    }
    score
}

fn pair_bonus(prev: &Entry, cur: &Entry) -> f64 {
    let mut bonus = 0.0;
    if prev.suffix2() == cur.prefix2() {
        bonus += SLICE2_MATCH_BONUS;
    }
    if prev.suffix3() == cur.prefix3() {
        bonus += SLICE3_MATCH_BONUS;
    }
    if SUFFIXES
        .iter()
        .any(|suf| prev.suffix3().ends_with(suf) || prev.suffix2().ends_with(suf))
    {
        bonus += SUFFIX_BONUS;
    }
    if PREFIXES
        .iter()
        .any(|pre| cur.prefix3().starts_with(pre) || cur.prefix2().starts_with(pre))
    {
        bonus += PREFIX_BONUS;
    }
    bonus + linking_bonus(prev, cur)
}

fn linking_bonus(prev: &Entry, cur: &Entry) -> f64 {
    for link in LINKING_ELEMENTS {
        if !prev.word().ends_with(link) {
            continue;
        }
        if cur.word().starts_with(link) {
            return LINK_BONUS;
        }
        let overlap = partial_link(link, prev.char_len(), cur.char_len());
        if !overlap.is_empty() && cur.word().starts_with(overlap.as_str()) {
            return PARTIAL_LINK_BONUS;
        }
    }
    0.0
}

/// Leading part of `link` that the right-hand word is allowed to start with.
///
/// The end bound `cur_len - prev_len + link_len` is clamped to `[0, link_len]`.
fn partial_link(link: &str, prev_len: usize, cur_len: usize) -> String {
    let link_len = link.chars().count();
    let end = (cur_len + link_len).saturating_sub(prev_len).min(link_len);
    link.chars().take(end).collect()
}
