//! Natural ordering for member names ("page2.jpg" < "page10.jpg")

use std::cmp::Ordering;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum Part {
    Num(u64),
    Str(String),
}

fn natural_key(s: &str) -> Vec<Part> {
    let mut parts = Vec::new();
    let mut num = String::new();
    let mut text = String::new();

    for c in s.chars() {
        if c.is_ascii_digit() {
            if !text.is_empty() {
                parts.push(Part::Str(text.to_lowercase()));
                text.clear();
            }
            num.push(c);
        } else {
            if !num.is_empty() {
                push_number(&mut parts, &num);
                num.clear();
            }
            text.push(c);
        }
    }

    if !num.is_empty() {
        push_number(&mut parts, &num);
    }
    if !text.is_empty() {
        parts.push(Part::Str(text.to_lowercase()));
    }

    parts
}

fn push_number(parts: &mut Vec<Part>, digits: &str) {
    match digits.parse::<u64>() {
        Ok(n) => parts.push(Part::Num(n)),
        // Longer than u64: compare as text
        Err(_) => parts.push(Part::Str(digits.to_string())),
    }
}

/// Case-insensitive natural comparison, ties broken by the exact string
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    natural_key(a).cmp(&natural_key(b)).then_with(|| a.cmp(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_runs() {
        assert_eq!(natural_cmp("page2.jpg", "page10.jpg"), Ordering::Less);
        assert_eq!(natural_cmp("page10.jpg", "page9.jpg"), Ordering::Greater);
    }

    #[test]
    fn test_case_insensitive_with_stable_tiebreak() {
        assert_eq!(natural_cmp("apple", "Banana"), Ordering::Less);
        assert_ne!(natural_cmp("A.txt", "a.txt"), Ordering::Equal);
    }
}
