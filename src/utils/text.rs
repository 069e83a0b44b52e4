/// Trims a CSV cell and drops the non-breaking spaces that the classifier
/// exports scatter through codes and names.
pub fn clean_cell(value: &str) -> String {
    value.replace('\u{a0}', "").trim().to_string()
}

pub fn non_empty(value: &str) -> Option<String> {
    let cleaned = clean_cell(value);
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned)
    }
}

/// Splits `"011 Name"` into `("011", "Name")` on the first space.
pub fn split_code_name(value: &str) -> Option<(String, String)> {
    let cleaned = clean_cell(value);
    let (code, name) = cleaned.split_once(' ')?;
    let name = name.trim();
    if code.is_empty() || name.is_empty() {
        return None;
    }
    Some((code.to_string(), name.to_string()))
}

pub fn is_digits(value: &str, min: usize, max: usize) -> bool {
    let len = value.chars().count();
    len >= min && len <= max && value.chars().all(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_cell_strips_nbsp_and_whitespace() {
        assert_eq!(clean_cell(" 1110\u{a0} "), "1110");
        assert_eq!(clean_cell("\u{a0}"), "");
    }

    #[test]
    fn split_code_name_on_first_space() {
        assert_eq!(
            split_code_name("011 Освітні, педагогічні науки"),
            Some(("011".to_string(), "Освітні, педагогічні науки".to_string()))
        );
        assert_eq!(split_code_name("011"), None);
        assert_eq!(split_code_name(""), None);
    }

    #[test]
    fn digit_bounds() {
        assert!(is_digits("12345678", 8, 10));
        assert!(!is_digits("1234567", 8, 10));
        assert!(!is_digits("12345678a", 8, 10));
    }
}
