use std::collections::BTreeSet;
use std::sync::OnceLock;

use phonenumber::{country, Mode};
use rapidfuzz::fuzz;
use regex::Regex;

pub const EG_CITIES: [&str; 27] = [
    "Cairo", "Giza", "Alexandria", "Qalyubia", "Sharqia", "Dakahlia", "Gharbia", "Kafr El Sheikh",
    "Monufia", "Beheira", "Ismailia", "Suez", "Port Said", "Damietta", "Fayoum", "Beni Suef", "Minya",
    "Asyut", "Sohag", "Qena", "Luxor", "Aswan", "Red Sea", "New Valley", "Matrouh", "North Sinai",
    "South Sinai",
];

pub const CITY_SCORE_CUTOFF: f64 = 80.0;

fn phone_noise_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^+\d]").expect("static phone regex"))
}

fn digit_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d$").expect("static digit regex"))
}

fn is_decimal_digit(c: char) -> bool {
    let mut buf = [0u8; 4];
    digit_regex().is_match(c.encode_utf8(&mut buf))
}

// Decimal digits of every script sit in runs starting at zero, so the value is the
// number of digits directly before `c` in its run, mod 10.
fn ascii_digit(c: char) -> Option<char> {
    if c.is_ascii_digit() {
        return Some(c);
    }
    if !is_decimal_digit(c) {
        return None;
    }
    let mut run = 0u32;
    let mut code = c as u32;
    while let Some(prev) = code.checked_sub(1).and_then(char::from_u32) {
        if !is_decimal_digit(prev) {
            break;
        }
        run += 1;
        code -= 1;
    }
    char::from_digit(run % 10, 10)
}

pub fn normalize_phone(raw: &str) -> Option<String> {
    let kept: String = phone_noise_regex()
        .replace_all(raw, "")
        .chars()
        .filter_map(|c| if c == '+' { Some(c) } else { ascii_digit(c) })
        .collect();
    // Only a leading plus survives.
    let (plus, digits) = match kept.strip_prefix('+') {
        Some(rest) => ("+", rest.replace('+', "")),
        None => ("", kept.replace('+', "")),
    };
    if digits.is_empty() {
        return None;
    }
    let cleaned = format!("{}{}", plus, digits);

    let number = phonenumber::parse(Some(country::Id::EG), &cleaned).ok()?;
    if !phonenumber::is_valid(&number) {
        return None;
    }
    Some(number.format().mode(Mode::E164).to_string())
}

// Ties go to the earlier entry of `EG_CITIES`.
pub fn normalize_city(raw: &str) -> Option<String> {
    let query = preprocess(raw);
    if query.is_empty() {
        return None;
    }

    let mut best: Option<(&str, f64)> = None;
    for candidate in EG_CITIES {
        let score = wratio(&query, &preprocess(candidate));
        if best.map_or(true, |(_, top)| score > top) {
            best = Some((candidate, score));
        }
    }

    best.filter(|(_, score)| *score >= CITY_SCORE_CUTOFF)
        .map(|(city, _)| city.to_string())
}

fn preprocess(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_alphanumeric() { c.to_ascii_lowercase() } else { ' ' })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn ratio_chars(a: &[char], b: &[char]) -> f64 {
    let total = a.len() + b.len();
    if total == 0 {
        return 100.0;
    }
    100.0 * fuzz::ratio(a.iter().copied(), b.iter().copied())
}

pub fn ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    ratio_chars(&a, &b)
}

pub fn partial_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let (short, long) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    if short.is_empty() {
        return 0.0;
    }

    let m = short.len();
    let n = long.len();
    let mut best = 0.0f64;
    for end in 1..m {
        best = best.max(ratio_chars(&short, &long[..end]));
    }
    for start in 0..=(n - m) {
        best = best.max(ratio_chars(&short, &long[start..start + m]));
        if best >= 100.0 {
            return 100.0;
        }
    }
    for start in (n - m + 1)..n {
        best = best.max(ratio_chars(&short, &long[start..]));
    }
    best
}

fn token_set(text: &str) -> BTreeSet<&str> {
    text.split_whitespace().collect()
}

fn joined<'a>(tokens: impl IntoIterator<Item = &'a &'a str>) -> String {
    tokens.into_iter().copied().collect::<Vec<_>>().join(" ")
}

pub fn token_sort_ratio(a: &str, b: &str) -> f64 {
    let mut ta: Vec<&str> = a.split_whitespace().collect();
    let mut tb: Vec<&str> = b.split_whitespace().collect();
    ta.sort_unstable();
    tb.sort_unstable();
    ratio(&ta.join(" "), &tb.join(" "))
}

pub fn token_set_ratio(a: &str, b: &str) -> f64 {
    let ta = token_set(a);
    let tb = token_set(b);
    if ta.is_empty() || tb.is_empty() {
        return 0.0;
    }

    let sect: Vec<&&str> = ta.intersection(&tb).collect();
    let diff_ab: Vec<&&str> = ta.difference(&tb).collect();
    let diff_ba: Vec<&&str> = tb.difference(&ta).collect();
    if !sect.is_empty() && (diff_ab.is_empty() || diff_ba.is_empty()) {
        return 100.0;
    }

    let diff_ab = joined(diff_ab);
    let diff_ba = joined(diff_ba);
    let sect = joined(sect);

    let mut best = ratio(&diff_ab, &diff_ba);
    if sect.is_empty() {
        return best;
    }

    let sect_len = sect.chars().count() as f64;
    for diff in [&diff_ab, &diff_ba] {
        // sect vs "sect diff": the distance is the separator plus the diff itself.
        let diff_len = diff.chars().count() as f64;
        let combined_len = sect_len + 1.0 + diff_len;
        let score = 100.0 * (1.0 - (1.0 + diff_len) / (sect_len + combined_len));
        best = best.max(score);
    }
    best
}

fn partial_token_ratio(a: &str, b: &str) -> f64 {
    let ta = token_set(a);
    let tb = token_set(b);
    if ta.is_empty() || tb.is_empty() {
        return 0.0;
    }
    if ta.intersection(&tb).next().is_some() {
        return 100.0;
    }
    partial_ratio(&joined(&ta), &joined(&tb))
}

pub fn wratio(a: &str, b: &str) -> f64 {
    const UNBASE_SCALE: f64 = 0.95;

    let len_a = a.chars().count();
    let len_b = b.chars().count();
    if len_a == 0 || len_b == 0 {
        return 0.0;
    }

    let len_ratio = len_a.max(len_b) as f64 / len_a.min(len_b) as f64;
    let mut score = ratio(a, b);

    if len_ratio < 1.5 {
        let token = token_sort_ratio(a, b).max(token_set_ratio(a, b));
        return score.max(token * UNBASE_SCALE);
    }

    let partial_scale = if len_ratio < 8.0 { 0.9 } else { 0.6 };
    score = score.max(partial_ratio(a, b) * partial_scale);
    score.max(partial_token_ratio(a, b) * UNBASE_SCALE * partial_scale)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phone_formats_collapse_to_one_canonical_form() {
        let expected = Some("+201001234567".to_string());
        for raw in [
            "0100 123 4567",
            "0100-123-4567",
            "01001234567",
            "+20 100 123 4567",
            "00201001234567",
            "tel: (0100) 123-4567",
        ] {
            assert_eq!(normalize_phone(raw), expected, "input {:?}", raw);
        }
    }

    #[test]
    fn arabic_indic_digits_are_read_as_ascii() {
        let expected = Some("+201001234567".to_string());
        assert_eq!(normalize_phone("٠١٠٠ ١٢٣ ٤٥٦٧"), expected);
        assert_eq!(normalize_phone("۰۱۰۰-۱۲۳-۴۵۶۷"), expected);
        assert_eq!(normalize_phone("+٢٠ 100 ١٢٣ 4567"), expected);
    }

    #[test]
    fn script_digits_map_to_their_value() {
        assert_eq!(ascii_digit('٠'), Some('0'));
        assert_eq!(ascii_digit('٩'), Some('9'));
        assert_eq!(ascii_digit('۷'), Some('7'));
        assert_eq!(ascii_digit('５'), Some('5'));
        assert_eq!(ascii_digit('x'), None);
    }

    #[test]
    fn invalid_phones_are_absent() {
        assert_eq!(normalize_phone("abc"), None);
        assert_eq!(normalize_phone("123"), None);
        assert_eq!(normalize_phone(""), None);
        assert_eq!(normalize_phone("+++"), None);
    }

    #[test]
    fn exact_city_names_return_themselves() {
        for city in EG_CITIES {
            assert_eq!(normalize_city(city).as_deref(), Some(city));
        }
    }

    #[test]
    fn city_matching_ignores_case_and_padding() {
        assert_eq!(normalize_city("Giza ").as_deref(), Some("Giza"));
        assert_eq!(normalize_city("  port   SAID").as_deref(), Some("Port Said"));
    }

    #[test]
    fn misspelled_cities_resolve() {
        assert_eq!(normalize_city("Alexandira").as_deref(), Some("Alexandria"));
        assert_eq!(normalize_city("Caro").as_deref(), Some("Cairo"));
        assert_eq!(normalize_city("Ismailiya").as_deref(), Some("Ismailia"));
    }

    #[test]
    fn tied_scores_go_to_the_earlier_city() {
        let query = preprocess("Sinai");
        assert_eq!(
            wratio(&query, &preprocess("North Sinai")),
            wratio(&query, &preprocess("South Sinai"))
        );
        assert_eq!(normalize_city("Sinai").as_deref(), Some("North Sinai"));
    }

    #[test]
    fn unrelated_text_is_absent() {
        assert_eq!(normalize_city("xyz123"), None);
        assert_eq!(normalize_city(""), None);
        assert_eq!(normalize_city("   "), None);
    }

    #[test]
    fn scorer_basics() {
        assert_eq!(ratio("giza", "giza"), 100.0);
        assert_eq!(ratio("abc", "xyz"), 0.0);
        assert_eq!(partial_ratio("said", "port said"), 100.0);
        assert_eq!(token_sort_ratio("sinai north", "north sinai"), 100.0);
        assert_eq!(token_set_ratio("north sinai", "sinai"), 100.0);
        assert!(wratio("new cairo city", "cairo") >= CITY_SCORE_CUTOFF);
    }
}
