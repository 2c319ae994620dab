//! Case conversions for labels drawn in the model.
//!
//! Labels are free text ("Add Building", "add-building", "addBuilding"), so
//! every conversion first splits the input into words.

/// Splits a label into words on separators, lower→upper transitions and
/// acronym boundaries (`HTTPRequest` → `HTTP`, `Request`).
pub fn split_words(s: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let chars: Vec<char> = s.chars().collect();

    for (i, &c) in chars.iter().enumerate() {
        if !c.is_alphanumeric() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            continue;
        }

        if c.is_uppercase() && !current.is_empty() {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            let boundary = prev.is_lowercase()
                || prev.is_ascii_digit()
                || (prev.is_uppercase() && next_is_lower);
            if boundary {
                words.push(std::mem::take(&mut current));
            }
        }
        current.push(c);
    }

    if !current.is_empty() {
        words.push(current);
    }
    words
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().chain(chars).collect(),
    }
}

/// Converts a label to PascalCase.
pub fn to_pascal_case(s: &str) -> String {
    split_words(s).iter().map(|w| capitalize(w)).collect()
}

/// Converts a label to camelCase.
pub fn to_camel_case(s: &str) -> String {
    let words = split_words(s);
    let mut out = String::new();
    for (i, word) in words.iter().enumerate() {
        if i == 0 {
            out.push_str(&word.to_lowercase());
        } else {
            out.push_str(&capitalize(word));
        }
    }
    out
}

/// Converts a label to snake_case.
pub fn to_snake_case(s: &str) -> String {
    split_words(s)
        .iter()
        .map(|w| w.to_lowercase())
        .collect::<Vec<_>>()
        .join("_")
}

/// Converts a label to UPPER_SNAKE_CASE.
pub fn to_upper_snake_case(s: &str) -> String {
    split_words(s)
        .iter()
        .map(|w| w.to_uppercase())
        .collect::<Vec<_>>()
        .join("_")
}

/// Converts a label to kebab-case.
pub fn to_kebab_case(s: &str) -> String {
    split_words(s)
        .iter()
        .map(|w| w.to_lowercase())
        .collect::<Vec<_>>()
        .join("-")
}

/// English plural of the last word, keeping the rest of the string as is.
pub fn pluralize(s: &str) -> String {
    if s.is_empty() {
        return String::new();
    }
    let lower = s.to_lowercase();
    let consonant_y = lower.ends_with('y')
        && lower
            .chars()
            .rev()
            .nth(1)
            .is_some_and(|c| !"aeiou".contains(c));

    if consonant_y {
        let stem = &s[..s.len() - 1];
        let upper = s.ends_with('Y');
        return format!("{}{}", stem, if upper { "IES" } else { "ies" });
    }
    let needs_es = ["s", "x", "z", "ch", "sh"].iter().any(|end| lower.ends_with(end));
    let upper = s.chars().last().is_some_and(|c| c.is_uppercase());
    let suffix = match (needs_es, upper) {
        (true, true) => "ES",
        (true, false) => "es",
        (false, true) => "S",
        (false, false) => "s",
    };
    format!("{}{}", s, suffix)
}
