use crate::geometry::Point;

/// XML 1.0 valid char ranges:
/// - 0x09, 0x0A, 0x0D
/// - 0x20..=0xD7FF
/// - 0xE000..=0xFFFD
/// - 0x10000..=0x10FFFF
fn is_valid_xml_char(c: char) -> bool {
    matches!(
        c as u32,
        0x09 | 0x0A | 0x0D | 0x20..=0xD7FF | 0xE000..=0xFFFD | 0x10000..=0x10FFFF
    )
}

/// Escapes label text for element content or attribute values, dropping characters XML
/// cannot carry at all.
pub fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars().filter(|&c| is_valid_xml_char(c)) {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// `points` attribute value for `<polygon>`.
pub fn points_attr(points: &[Point]) -> String {
    points
        .iter()
        .map(|p| format!("{:.2},{:.2}", p.x, p.y))
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn document(size: f64, background: &str, body: &str) -> String {
    format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {size} {size}" width="{size}" height="{size}"><rect width="100%" height="100%" fill="{}" />{}</svg>"#,
        escape_xml(background),
        body,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_text_drops_control_chars() {
        assert_eq!(escape_xml("Team\u{0007}s"), "Teams");
        assert_eq!(escape_xml("a\tb"), "a\tb");
    }

    #[test]
    fn label_text_escapes_markup() {
        assert_eq!(
            escape_xml(r#"R&D <"core"> 'ops'"#),
            "R&amp;D &lt;&quot;core&quot;&gt; &apos;ops&apos;"
        );
    }

    #[test]
    fn polygon_points_are_space_separated_pairs() {
        let pts = [Point::new(1.0, 2.5), Point::new(-3.126, 4.0)];
        assert_eq!(points_attr(&pts), "1.00,2.50 -3.13,4.00");
    }

    #[test]
    fn document_wraps_body_with_background() {
        let svg = document(400.0, "#fff", "<g/>");
        assert!(svg.starts_with("<svg "));
        assert!(svg.contains(r#"viewBox="0 0 400 400""#));
        assert!(svg.contains(r##"fill="#fff""##));
        assert!(svg.ends_with("<g/></svg>"));
    }
}
