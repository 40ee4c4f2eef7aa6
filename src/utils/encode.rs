use htmlentity::entity::{CharacterSet, EncodeType, ICodedDataTrait};

/// Escapes text for interpolation into HTML element content or quoted attributes.
pub(crate) fn escape(input: &str) -> String {
    input
        .chars()
        .map(|char| match char {
            '<' | '>' | '&' | '"' | '\'' => encode_char(char),
            _ if !char.is_ascii() => encode_char(char),
            _ => char.to_string(),
        })
        .collect()
}

fn encode_char(char: char) -> String {
    htmlentity::entity::encode(
        char.encode_utf8(&mut [0; 4]).as_bytes(),
        &EncodeType::Decimal,
        &CharacterSet::All,
    )
    .to_string()
    .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup() {
        let escaped = escape(r#"<script>alert("hi") & 'bye'</script>"#);

        assert!(!escaped.contains('<'));
        assert!(!escaped.contains('>'));
        assert!(!escaped.contains('"'));
        assert!(!escaped.contains('\''));
        assert!(escaped.starts_with("&#60;script&#62;"));
    }

    #[test]
    fn leaves_plain_text_alone() {
        assert_eq!(escape("Hello, world 123"), "Hello, world 123");
    }

    #[test]
    fn encodes_non_ascii() {
        assert_eq!(escape("é"), "&#233;");
    }
}
