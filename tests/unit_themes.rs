// Unit tests for the theme vocabulary and keyword matcher.

use themetag::themes::matcher::ThemeMatcher;
use themetag::themes::vocabulary::{read_vocabulary, ThemeVocabulary};

fn vocab(themes: &[(&str, &[&str])]) -> ThemeVocabulary {
    let mut v = ThemeVocabulary::new();
    for (name, keywords) in themes {
        v.add_theme(name, keywords.iter()).unwrap();
    }
    v
}

// ============================================================
// ThemeMatcher: whole-word, case-insensitive counting
// ============================================================

#[test]
fn whole_word_match_excludes_partial_words() {
    let matcher = ThemeMatcher::new(&vocab(&[("AI", &[])])).unwrap();
    assert_eq!(matcher.count("We invested in AI").get(0), 1);
    assert_eq!(matcher.count("We invested in AI.").get(0), 1);
    assert_eq!(matcher.count("The AIRLINE business").get(0), 0);
    assert_eq!(matcher.count("said the chairman").get(0), 0);
}

#[test]
fn matching_ignores_case() {
    let matcher = ThemeMatcher::new(&vocab(&[("AI", &[])])).unwrap();
    assert_eq!(matcher.count("ai and Ai and AI").get(0), 3);
}

#[test]
fn plural_keyword_matches_after_shorter_alternative_fails() {
    let matcher =
        ThemeMatcher::new(&vocab(&[("Tariff", &["tariff", "tariffs", "trade war"])])).unwrap();
    assert_eq!(matcher.count("Tariffs hurt margins.").get(0), 1);
    assert_eq!(matcher.count("The trade war and a tariff.").get(0), 2);
}

#[test]
fn overlapping_keywords_count_for_each_theme() {
    let matcher = ThemeMatcher::new(&vocab(&[
        ("AI", &["automation"]),
        ("Efficiency", &["automation", "productivity"]),
    ]))
    .unwrap();
    let hits = matcher.count("Automation drove productivity gains.");
    assert_eq!(hits.as_slice(), &[1, 2]);
    assert_eq!(hits.total(), 3);
}

#[test]
fn keywords_with_regex_metacharacters_are_literal() {
    let matcher = ThemeMatcher::new(&vocab(&[("Index", &["S&P 500", "C++"])])).unwrap();
    assert_eq!(matcher.count("The S&P 500 rallied").get(0), 1);
    assert_eq!(matcher.count("S P 500").get(0), 0);
}

#[test]
fn empty_sentence_has_all_zero_hits() {
    let matcher = ThemeMatcher::new(&vocab(&[("AI", &[]), ("Tariff", &[])])).unwrap();
    let hits = matcher.count("");
    assert_eq!(hits.as_slice(), &[0, 0]);
}

#[test]
fn empty_vocabulary_counts_nothing() {
    let matcher = ThemeMatcher::new(&ThemeVocabulary::new()).unwrap();
    assert_eq!(matcher.theme_count(), 0);
    assert_eq!(matcher.count("AI tariffs everywhere.").total(), 0);
}

// ============================================================
// read_vocabulary: spreadsheet layout
// ============================================================

#[test]
fn vocabulary_columns_with_blank_cells() {
    let csv = "AI,Supply Chain\n\
               machine learning,logistics\n\
               ,freight\n\
               genai,\n";
    let v = read_vocabulary(csv.as_bytes(), "vocab.csv").unwrap();
    assert_eq!(v.len(), 2);
    assert_eq!(v.themes()[0].keywords, vec!["AI", "machine learning", "genai"]);
    assert_eq!(
        v.themes()[1].keywords,
        vec!["Supply Chain", "logistics", "freight"]
    );
    assert_eq!(
        v.count_columns(),
        vec!["AI_keyword_count", "Supply_Chain_keyword_count"]
    );
}

#[test]
fn duplicate_theme_header_is_fatal() {
    let csv = "AI,AI\nx,y\n";
    let err = read_vocabulary(csv.as_bytes(), "vocab.csv").unwrap_err();
    assert!(format!("{err:#}").contains("Duplicate theme"), "{err:#}");
}

#[test]
fn blank_header_column_is_skipped() {
    let csv = "AI,,Tariff\nx,ignored,y\n";
    let v = read_vocabulary(csv.as_bytes(), "vocab.csv").unwrap();
    let names: Vec<_> = v.themes().iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["AI", "Tariff"]);
}

#[test]
fn themes_sharing_a_count_column_are_fatal() {
    let csv = "Supply Chain,Supply_Chain\nlogistics,freight\n";
    let err = read_vocabulary(csv.as_bytes(), "vocab.csv").unwrap_err();
    let msg = format!("{err:#}");
    assert!(msg.contains("Supply_Chain_keyword_count"), "{msg}");

    let mut v = ThemeVocabulary::new();
    v.add_theme("Supply Chain", ["logistics"]).unwrap();
    assert!(v.add_theme("Supply\tChain", ["freight"]).is_err());
    assert_eq!(v.count_columns(), vec!["Supply_Chain_keyword_count"]);
}
