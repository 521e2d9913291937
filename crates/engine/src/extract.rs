//! Entity extraction from question text.
//!
//! Whole-word, case-insensitive matching against the vocabulary plus a few
//! numeric patterns. Extraction never fails on unmatched text; an empty
//! [`EntitySet`] is a valid result.

use crate::types::{CropCategory, EntitySet, RankingFocus};
use crate::vocabulary::{lookup_key, Vocabulary};
use regex::Regex;
use samarth_core::{AppError, AppResult};

const NUMBER_WORDS: &str = "one|two|three|four|five|six|seven|eight|nine|ten";

/// Lead words that the district phrase pattern may capture but never name a district.
const DISTRICT_NOISE: [&str; 16] = [
    "identify", "which", "what", "compare", "list", "top", "lowest", "highest", "best", "show",
    "the", "in", "find", "rank", "and", "of",
];

const MAX_RANGE_SPAN: i32 = 50;

/// A vocabulary term compiled to a whole-word regex.
#[derive(Debug, Clone)]
struct Term<T> {
    pattern: Regex,
    value: T,
}

/// A match of a vocabulary term in the text.
#[derive(Debug, Clone)]
struct Hit<'a, T> {
    start: usize,
    end: usize,
    value: &'a T,
}

/// Compiled extractor. Build once, share freely.
#[derive(Debug, Clone)]
pub struct EntityExtractor {
    vocab: Vocabulary,
    states: Vec<Term<String>>,
    crops: Vec<Term<Vec<String>>>,
    districts: Vec<Term<String>>,
    categories: Vec<Term<CropCategory>>,
    district_phrase: Regex,
    year: Regex,
    year_range: Regex,
    last_n: Regex,
    last_decade: Regex,
    last_year: Regex,
    top_m: Regex,
    lowest: Regex,
    highest: Regex,
}

impl EntityExtractor {
    pub fn new(vocab: &Vocabulary) -> AppResult<Self> {
        let mut states = Vec::new();
        for state in &vocab.states {
            states.push(term(state, state.clone(), false)?);
        }
        // Short and dotted aliases ("up", "a.p.") collide with ordinary words.
        let free_text: Vec<(&String, &String)> = vocab
            .state_aliases
            .iter()
            .filter(|(alias, _)| alias.chars().count() >= 5 && !alias.contains('.'))
            .collect();
        for (alias, canonical) in &free_text {
            // "Punjab and Chandigarh" in a question names two states, not one subdivision.
            if names_other_state(alias, canonical, vocab, &free_text) {
                continue;
            }
            states.push(term(alias, (*canonical).clone(), false)?);
        }

        let mut crops = Vec::new();
        for crop in &vocab.crops {
            crops.push(term(crop, vec![crop.clone()], true)?);
        }
        for (alias, canonical) in &vocab.crop_aliases {
            crops.push(term(alias, vec![canonical.clone()], true)?);
        }
        for (group, members) in &vocab.crop_groups {
            crops.push(term(group, members.clone(), true)?);
        }

        let mut districts = Vec::new();
        for district in &vocab.districts {
            districts.push(term(district, district.clone(), false)?);
        }

        let mut categories = Vec::new();
        for (phrase, category) in &vocab.category_terms {
            categories.push(term(phrase, *category, false)?);
        }

        Ok(Self {
            vocab: vocab.clone(),
            states,
            crops,
            districts,
            categories,
            district_phrase: compile(r"\b([A-Z][a-z]+(?:\s+[A-Z][a-z]+){0,2})\s+[Dd]istricts?\b")?,
            year: compile(r"\b(19\d{2}|20\d{2})\b")?,
            year_range: compile(
                r"(?i)\bbetween\s+(19\d{2}|20\d{2})\s+and\s+(19\d{2}|20\d{2})\b|\b(19\d{2}|20\d{2})\s*(?:to|till|until|-)\s*(19\d{2}|20\d{2})\b",
            )?,
            last_n: compile(&format!(
                r"(?i)\b(?:last|past|previous|recent)\s+(\d{{1,3}}|{})\s+(?:available\s+)?years?\b",
                NUMBER_WORDS
            ))?,
            last_decade: compile(r"(?i)\b(?:last|past|previous)\s+decade\b")?,
            last_year: compile(r"(?i)\b(?:last|past|previous)\s+year\b")?,
            top_m: compile(&format!(r"(?i)\btop\s+(\d{{1,3}}|{})\b", NUMBER_WORDS))?,
            lowest: compile(r"(?i)\b(?:lowest|least|minimum|smallest|bottom|lagging|worst)\b")?,
            highest: compile(r"(?i)\b(?:highest|most|maximum|largest|leading|best)\b")?,
        })
    }

    /// Extract every recognised entity from `text`.
    pub fn extract(&self, text: &str) -> EntitySet {
        let states = first_seen(longest_hits(&self.states, text).into_iter().map(|h| h.value.clone()));
        let crops = first_seen(
            longest_hits(&self.crops, text)
                .into_iter()
                .flat_map(|h| h.value.iter().cloned()),
        );

        EntitySet {
            districts: self.extract_districts(text),
            years: self.extract_years(text),
            last_n_years: self.extract_last_n(text),
            top_m: self
                .top_m
                .captures(text)
                .and_then(|c| parse_count(&c[1]))
                .filter(|n| *n > 0),
            crop_category: self.extract_category(text),
            ranking_focus: self.extract_focus(text),
            states,
            crops,
        }
    }

    fn extract_districts(&self, text: &str) -> Vec<String> {
        let mut found: Vec<(usize, String)> = longest_hits(&self.districts, text)
            .into_iter()
            .map(|h| (h.start, h.value.clone()))
            .collect();

        for caps in self.district_phrase.captures_iter(text) {
            let Some(m) = caps.get(1) else { continue };
            let words: Vec<&str> = m.as_str().split_whitespace().collect();
            let skip = words
                .iter()
                .take_while(|w| DISTRICT_NOISE.contains(&w.to_lowercase().as_str()))
                .count();
            if skip == words.len() {
                continue;
            }
            let name = words[skip..].join(" ");
            if self.vocab.is_state(&name) || self.is_crop(&name) {
                continue;
            }
            found.push((m.start(), name));
        }

        found.sort_by_key(|(start, _)| *start);
        first_seen(found.into_iter().map(|(_, name)| name))
    }

    fn is_crop(&self, name: &str) -> bool {
        let canonical = self.vocab.canonical_crop(name);
        self.vocab.crops.iter().any(|c| *c == canonical)
    }

    fn extract_years(&self, text: &str) -> Vec<i32> {
        let mut years: Vec<i32> = self
            .year
            .captures_iter(text)
            .filter_map(|c| c[1].parse().ok())
            .collect();

        for caps in self.year_range.captures_iter(text) {
            let bounds = match (caps.get(1), caps.get(2)) {
                (Some(a), Some(b)) => (a, b),
                _ => match (caps.get(3), caps.get(4)) {
                    (Some(a), Some(b)) => (a, b),
                    _ => continue,
                },
            };
            let (Ok(a), Ok(b)) = (bounds.0.as_str().parse::<i32>(), bounds.1.as_str().parse::<i32>()) else {
                continue;
            };
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            if hi - lo <= MAX_RANGE_SPAN {
                years.extend(lo..=hi);
            }
        }

        years.sort_unstable();
        years.dedup();
        years
    }

    fn extract_last_n(&self, text: &str) -> Option<usize> {
        if let Some(n) = self.last_n.captures(text).and_then(|c| parse_count(&c[1])) {
            return (n > 0).then_some(n);
        }
        if self.last_decade.is_match(text) {
            return Some(10);
        }
        if self.last_year.is_match(text) {
            return Some(1);
        }
        None
    }

    /// "top N" only sets a count, so "lowest ... top 3" still ranks from the bottom.
    fn extract_focus(&self, text: &str) -> Option<RankingFocus> {
        if self.highest.is_match(text) {
            Some(RankingFocus::Highest)
        } else if self.lowest.is_match(text) {
            Some(RankingFocus::Lowest)
        } else if self.top_m.is_match(text) {
            Some(RankingFocus::Highest)
        } else {
            None
        }
    }

    /// The category term appearing earliest in the text.
    fn extract_category(&self, text: &str) -> Option<CropCategory> {
        longest_hits(&self.categories, text)
            .first()
            .map(|h| *h.value)
    }
}

/// True when `alias` contains, as whole words, a state or alias that maps elsewhere.
fn names_other_state(alias: &str, canonical: &str, vocab: &Vocabulary, aliases: &[(&String, &String)]) -> bool {
    let padded = format!(" {} ", lookup_key(alias).replace('&', " & ").replace(',', " "));
    let padded = format!(" {} ", padded.split_whitespace().collect::<Vec<_>>().join(" "));
    let contains = |name: &str| padded.contains(&format!(" {} ", lookup_key(name)));

    vocab.states.iter().any(|s| s != canonical && contains(s))
        || aliases
            .iter()
            .any(|(other, target)| other.as_str() != alias && target.as_str() != canonical && contains(other))
}

fn compile(pattern: &str) -> AppResult<Regex> {
    Regex::new(pattern).map_err(|e| AppError::Engine(format!("Invalid pattern '{}': {}", pattern, e)))
}

/// Whole-word, case-insensitive pattern for a vocabulary term. Internal
/// whitespace matches any run of whitespace; `plural` accepts a trailing
/// `s`/`es`.
fn term<T>(phrase: &str, value: T, plural: bool) -> AppResult<Term<T>> {
    let key = lookup_key(phrase);
    let body = key
        .split(' ')
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(r"\s+");
    // A group word such as "millets" already ends in `s`; make it optional.
    let suffix = match (plural, key.ends_with('s')) {
        (false, _) => "",
        (true, true) => "?",
        (true, false) => "(?:s|es)?",
    };
    // `\b` only applies next to word characters ("j & k" ends in one, "a.p." does not).
    let lead = if key.starts_with(|c: char| c.is_alphanumeric()) { r"\b" } else { "" };
    let trail = if key.ends_with(|c: char| c.is_alphanumeric()) { r"\b" } else { "" };
    let pattern = compile(&format!("(?i){}{}{}{}", lead, body, suffix, trail))?;
    Ok(Term { pattern, value })
}

/// All matches of `terms`, keeping the longest span where matches overlap,
/// ordered by position.
fn longest_hits<'a, T>(terms: &'a [Term<T>], text: &str) -> Vec<Hit<'a, T>> {
    let mut hits: Vec<Hit<'a, T>> = terms
        .iter()
        .flat_map(|t| {
            t.pattern.find_iter(text).map(move |m| Hit {
                start: m.start(),
                end: m.end(),
                value: &t.value,
            })
        })
        .collect();

    hits.sort_by(|a, b| a.start.cmp(&b.start).then((b.end - b.start).cmp(&(a.end - a.start))));

    let mut kept: Vec<Hit<'a, T>> = Vec::new();
    for hit in hits {
        if kept.iter().any(|k| hit.start < k.end && k.start < hit.end) {
            continue;
        }
        kept.push(hit);
    }
    kept
}

fn first_seen(items: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for item in items {
        if !out.contains(&item) {
            out.push(item);
        }
    }
    out
}

/// Parse "5" or "five".
fn parse_count(raw: &str) -> Option<usize> {
    if let Ok(n) = raw.parse() {
        return Some(n);
    }
    NUMBER_WORDS
        .split('|')
        .position(|w| w.eq_ignore_ascii_case(raw))
        .map(|i| i + 1)
}
