//! City-name normalization.
//!
//! Every component keys on the canonical form produced here, so the same city
//! typed with different casing or stray whitespace always lands on the same
//! history bucket and cache slot.

/// Multi-word cities whose display form is not plain title case.
const OVERRIDES: &[(&str, &str)] = &[
    ("new york", "New York"),
    ("los angeles", "Los Angeles"),
    ("rio de janeiro", "Rio de Janeiro"),
];

/// Canonicalize a free-form city string.
///
/// Returns `None` for empty or whitespace-only input. Idempotent: feeding the
/// output back in yields the same value.
pub fn normalize_city(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let lower = trimmed.to_lowercase();
    if let Some((_, canonical)) = OVERRIDES.iter().find(|(key, _)| *key == lower) {
        return Some((*canonical).to_string());
    }

    Some(title_case(trimmed))
}

fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_and_whitespace_are_rejected() {
        assert_eq!(normalize_city(""), None);
        assert_eq!(normalize_city("   "), None);
        assert_eq!(normalize_city("\t\n"), None);
    }

    #[test]
    fn title_cases_simple_names() {
        assert_eq!(normalize_city("london").as_deref(), Some("London"));
        assert_eq!(normalize_city("PARIS").as_deref(), Some("Paris"));
        assert_eq!(normalize_city("  tokyo  ").as_deref(), Some("Tokyo"));
    }

    #[test]
    fn override_table_wins_over_title_case() {
        assert_eq!(normalize_city("new york").as_deref(), Some("New York"));
        assert_eq!(normalize_city("RIO DE JANEIRO").as_deref(), Some("Rio de Janeiro"));
        assert_eq!(normalize_city("los angeles").as_deref(), Some("Los Angeles"));
    }

    #[test]
    fn normalization_is_idempotent() {
        for raw in ["london", "NEW york", "rio de janeiro", "saN FRANcisco", "  delhi "] {
            let once = normalize_city(raw).expect("non-empty input");
            let twice = normalize_city(&once).expect("canonical input");
            assert_eq!(once, twice, "normalize must be idempotent for {raw:?}");
        }
    }

    #[test]
    fn collapses_inner_whitespace() {
        assert_eq!(normalize_city("san   francisco").as_deref(), Some("San Francisco"));
    }
}
