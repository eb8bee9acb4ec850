//! Entry organization for display.
//!
//! Given the full entry list of a glossary, the current search term with its
//! results, and an optional selected letter, [`organize`] produces the sorted
//! flat list and the same list bucketed by initial. It keeps no state between
//! calls: the same inputs always give the same output.
//!
//! An active search term always wins over letter navigation. [`ViewState`]
//! keeps the two mutually exclusive on the input side as well.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::database::models::Entry;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrganizedEntries {
    /// Working set, sorted and filtered
    pub entries: Vec<Entry>,
    /// `entries` partitioned by uppercased initial, keys ascending
    pub groups: BTreeMap<String, Vec<Entry>>,
}

impl OrganizedEntries {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Computes the display list and its letter groups.
///
/// `search_results` are only consulted when `search_term` is non-empty, in which
/// case `all_entries` and `selected_letter` are ignored.
pub fn organize(
    all_entries: &[Entry],
    search_term: &str,
    search_results: &[Entry],
    selected_letter: Option<&str>,
) -> OrganizedEntries {
    let searching = !search_term.is_empty();
    let source = if searching { search_results } else { all_entries };

    let mut entries = source.to_vec();
    entries.sort_by(compare_entries);

    if let (Some(letter), false) = (selected_letter, searching) {
        entries.retain(|e| initial_of(&e.term).as_deref() == Some(letter));
    }

    let mut groups: BTreeMap<String, Vec<Entry>> = BTreeMap::new();
    for entry in &entries {
        let key = initial_of(&entry.term).unwrap_or_default();
        groups.entry(key).or_default().push(entry.clone());
    }

    OrganizedEntries { entries, groups }
}

/// Uppercased first character of a term. `ß` yields `SS`.
pub fn initial_of(term: &str) -> Option<String> {
    term.chars().next().map(|c| c.to_uppercase().collect())
}

/// Total order over entries: [`compare_terms`], then id ascending
pub fn compare_entries(a: &Entry, b: &Entry) -> Ordering {
    compare_terms(&a.term, &b.term).then(a.id.cmp(&b.id))
}

/// Locale-style term comparison.
///
/// Primary strength ignores case and Latin diacritics, secondary tells accents
/// apart, tertiary puts lowercase before uppercase. Falls back to code points
/// so that distinct strings never compare equal.
pub fn compare_terms(a: &str, b: &str) -> Ordering {
    primary_key(a)
        .cmp(&primary_key(b))
        .then_with(|| a.to_lowercase().cmp(&b.to_lowercase()))
        .then_with(|| case_key(a).cmp(&case_key(b)))
        .then_with(|| a.cmp(b))
}

fn primary_key(term: &str) -> String {
    let mut key = String::with_capacity(term.len());
    for c in term.chars().flat_map(char::to_lowercase) {
        match fold_diacritic(c) {
            Some(folded) => key.push_str(folded),
            None => key.push(c),
        }
    }
    key
}

fn case_key(term: &str) -> Vec<bool> {
    term.chars().map(char::is_uppercase).collect()
}

fn fold_diacritic(c: char) -> Option<&'static str> {
    let folded = match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ā' | 'ă' | 'ą' => "a",
        'æ' => "ae",
        'ç' | 'ć' | 'č' | 'ĉ' | 'ċ' => "c",
        'ď' | 'đ' => "d",
        'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ė' | 'ę' | 'ě' => "e",
        'ğ' | 'ĝ' | 'ġ' | 'ģ' => "g",
        'ì' | 'í' | 'î' | 'ï' | 'ī' | 'į' | 'ı' => "i",
        'ł' | 'ľ' | 'ĺ' | 'ļ' => "l",
        'ñ' | 'ń' | 'ň' | 'ņ' => "n",
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' | 'ō' | 'ő' => "o",
        'œ' => "oe",
        'ŕ' | 'ř' => "r",
        'ś' | 'š' | 'ş' | 'ș' => "s",
        'ß' => "ss",
        'ť' | 'ţ' | 'ț' => "t",
        'ù' | 'ú' | 'û' | 'ü' | 'ū' | 'ů' | 'ű' | 'ų' => "u",
        'ý' | 'ÿ' => "y",
        'ź' | 'ž' | 'ż' => "z",
        _ => return None,
    };
    Some(folded)
}

/// Search box and letter bar state of a glossary view
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewState {
    pub search_term: String,
    pub selected_letter: Option<String>,
}

impl ViewState {
    /// Typing in the search box drops the letter selection
    pub fn set_search(&mut self, text: impl Into<String>) {
        self.search_term = text.into();
        self.selected_letter = None;
    }

    /// Picking a letter clears the search. The letter is stored uppercased.
    pub fn select_letter(&mut self, letter: &str) {
        self.search_term.clear();
        self.selected_letter = initial_of(letter);
    }

    pub fn is_searching(&self) -> bool {
        !self.search_term.is_empty()
    }

    pub fn organize(&self, all_entries: &[Entry], search_results: &[Entry]) -> OrganizedEntries {
        organize(
            all_entries,
            &self.search_term,
            search_results,
            self.selected_letter.as_deref(),
        )
    }
}
