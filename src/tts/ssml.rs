//! SSML document construction for the synthesis endpoint.

/// Locale prefix of a neural voice name (`"es-BO-MarceloNeural"` → `"es-BO"`).
///
/// Falls back to the whole name when it has fewer than three dash-separated
/// parts.
pub fn voice_locale(voice: &str) -> &str {
    let mut dashes = voice.match_indices('-').map(|(i, _)| i);
    match (dashes.next(), dashes.next()) {
        (Some(_), Some(second)) => &voice[..second],
        _ => voice,
    }
}

/// Escape the five XML special characters.
pub fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

/// Wrap `text` in a single-voice `<speak>` document.
pub fn build_ssml(voice: &str, text: &str) -> String {
    let lang = voice_locale(voice);
    format!(
        "<speak version='1.0' xml:lang='{lang}'><voice xml:lang='{lang}' name='{voice}'>{}</voice></speak>",
        escape_xml(text)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locale_from_voice_name() {
        assert_eq!(voice_locale("es-BO-MarceloNeural"), "es-BO");
        assert_eq!(voice_locale("en-US-JennyMultilingualNeural"), "en-US");
        assert_eq!(voice_locale("es-ES"), "es-ES");
        assert_eq!(voice_locale("custom"), "custom");
    }

    #[test]
    fn escapes_markup_characters() {
        assert_eq!(
            escape_xml(r#"Tom & "Jerry" <'cat'>"#),
            "Tom &amp; &quot;Jerry&quot; &lt;&apos;cat&apos;&gt;"
        );
    }

    #[test]
    fn ssml_embeds_voice_and_escaped_text() {
        let ssml = build_ssml("es-BO-MarceloNeural", "Curie & Pierre");
        assert_eq!(
            ssml,
            "<speak version='1.0' xml:lang='es-BO'><voice xml:lang='es-BO' name='es-BO-MarceloNeural'>Curie &amp; Pierre</voice></speak>"
        );
    }

    #[test]
    fn apostrophes_in_apology_survive_escaping() {
        let ssml = build_ssml(
            "es-BO-MarceloNeural",
            "Por favor, comienza tu pregunta con 'Alessandro'",
        );
        assert!(ssml.contains("con &apos;Alessandro&apos;"));
    }
}
