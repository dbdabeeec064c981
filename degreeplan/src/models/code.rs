// Normalización de códigos de curso ("COSC111" -> "COSC 111") y extracción
// de códigos desde texto libre de prerequisitos.
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::OnceLock;

static CODE_IN_TEXT: OnceLock<Regex> = OnceLock::new();
static LOOSE_CODE: OnceLock<Regex> = OnceLock::new();

fn code_in_text() -> &'static Regex {
    CODE_IN_TEXT.get_or_init(|| Regex::new(r"[A-Z]{4} \d{3}").expect("static course code pattern"))
}

fn loose_code() -> &'static Regex {
    LOOSE_CODE.get_or_init(|| Regex::new(r"^([A-Za-z]+)\s*(\d+[A-Za-z]?)$").expect("static loose code pattern"))
}

/// Normaliza un código de curso a la forma `LETRAS DIGITOS`.
///
/// Acepta `"COSC111"`, `"cosc 111"` o `"  COSC   111 "`. Si el texto no tiene
/// forma de código se devuelve recortado y en mayúsculas, sin más cambios.
pub fn normalize_code(raw: &str) -> String {
    let trimmed = raw.trim();
    match loose_code().captures(trimmed) {
        Some(caps) => format!("{} {}", caps[1].to_uppercase(), caps[2].to_uppercase()),
        None => trimmed.to_uppercase(),
    }
}

/// Todos los códigos `XXXX ###` que aparecen en un texto de prerequisitos.
pub fn codes_in_text(text: &str) -> BTreeSet<String> {
    code_in_text()
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Parte alfabética del código (`"COSC 111"` -> `"COSC"`).
pub fn subject_of(code: &str) -> &str {
    code.split_whitespace().next().unwrap_or("")
}

/// Parte numérica del código (`"COSC 111"` -> `"111"`).
pub fn number_of(code: &str) -> &str {
    code.split_whitespace().nth(1).unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_code_variants() {
        assert_eq!(normalize_code("COSC111"), "COSC 111");
        assert_eq!(normalize_code(" cosc   111 "), "COSC 111");
        assert_eq!(normalize_code("MATH 100"), "MATH 100");
        assert_eq!(normalize_code("ELEC"), "ELEC");
    }

    #[test]
    fn test_codes_in_text() {
        let found = codes_in_text("One of COSC 111, COSC 123 and a score of 60% in MATH 100.");
        let expected: Vec<&str> = vec!["COSC 111", "COSC 123", "MATH 100"];
        assert_eq!(found.iter().map(String::as_str).collect::<Vec<_>>(), expected);
    }

    #[test]
    fn test_subject_and_number() {
        assert_eq!(subject_of("COSC 304"), "COSC");
        assert_eq!(number_of("COSC 304"), "304");
        assert_eq!(number_of("ELEC"), "");
    }
}
