//! Human-readable output for the CLI.

use unicode_width::UnicodeWidthStr;

use furi_engine::ruby::{classify, length_ratio, LengthRatioClass};
use furi_engine::segment::ReadingSpan;
use furi_engine::settings::RubySettings;
use furi_engine::{AnnotatedPair, Token};

fn pad(label: &str, width: usize) -> String {
    let display_width = UnicodeWidthStr::width(label);
    if display_width < width {
        format!("{label}{}", " ".repeat(width - display_width))
    } else {
        label.to_string()
    }
}

/// Tokens with their char ranges, then the spans the segmenter kept with
/// their length ratio and `<rt>` class.
pub fn format_segmentation(
    text: &str,
    tokens: &[Token],
    spans: &[ReadingSpan],
    style: &RubySettings,
) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "=== Tokens for \"{}\" ({} tokens) ===\n",
        text,
        tokens.len()
    ));

    let mut pos = 0;
    for token in tokens {
        let len = token.surface_form.chars().count();
        out.push_str(&format!(
            "  [{},{}] {} {}\n",
            pos,
            pos + len,
            pad(&token.surface_form, 12),
            token.reading.as_deref().unwrap_or("-"),
        ));
        pos += len;
    }

    if spans.is_empty() {
        out.push_str("\nNo spans.\n");
        return out;
    }

    out.push_str(&format!("\n=== Spans ({}) ===\n", spans.len()));
    for span in spans {
        let ratio = length_ratio(&span.kanji_run, &span.reading, style.width_factor);
        let class = match classify(&span.kanji_run, &span.reading, style) {
            LengthRatioClass::None => "-",
            LengthRatioClass::Scaled => style.long_class.as_str(),
            LengthRatioClass::Hidden => style.hidden_class.as_str(),
        };
        out.push_str(&format!(
            "  @{:<3} {} {} ratio={:.2} class={}\n",
            span.position,
            pad(&span.kanji_run, 8),
            pad(&span.reading, 12),
            ratio,
            class,
        ));
    }

    out
}

/// One output line: JSON, or the annotated text with its translation after a
/// tab.
pub fn format_pair(pair: &AnnotatedPair, json: bool) -> Result<String, serde_json::Error> {
    if json {
        return serde_json::to_string(pair);
    }
    Ok(match &pair.english {
        Some(en) => format!("{}\t{}", pair.japanese, en),
        None => pair.japanese.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use furi_engine::pipeline::{AnnotateError, AnnotationStatus};
    use furi_engine::settings::{parse_settings_toml, DEFAULT_SETTINGS_TOML};

    fn style() -> RubySettings {
        parse_settings_toml(DEFAULT_SETTINGS_TOML).unwrap().ruby
    }

    #[test]
    fn pad_uses_display_width() {
        assert_eq!(pad("猫", 4), "猫  ");
        assert_eq!(pad("ab", 4), "ab  ");
        assert_eq!(pad("ねこねこ", 4), "ねこねこ");
    }

    #[test]
    fn segmentation_table() {
        let tokens = vec![Token::new("猫", "ネコ"), Token::bare("は"), Token::new("魚", "サカナ")];
        let spans = vec![
            ReadingSpan {
                kanji_run: "猫".into(),
                reading: "ねこ".into(),
                position: 0,
            },
            ReadingSpan {
                kanji_run: "魚".into(),
                reading: "さかな".into(),
                position: 2,
            },
        ];
        let out = format_segmentation("猫は魚", &tokens, &spans, &style());
        assert!(out.starts_with("=== Tokens for \"猫は魚\" (3 tokens) ===\n"));
        assert!(out.contains("  [1,2] は           -\n"));
        assert!(out.contains("=== Spans (2) ===\n"));
        assert!(out.contains("ratio=1.33 class=-\n"));
        assert!(out.contains("ratio=2.00 class=long-reading\n"));
    }

    #[test]
    fn segmentation_without_spans() {
        let out = format_segmentation("です", &[Token::bare("です")], &[], &style());
        assert!(out.ends_with("\nNo spans.\n"));
    }

    #[test]
    fn pair_as_text_and_json() {
        let pair = AnnotatedPair {
            japanese: "<ruby>猫<rt>ねこ</rt></ruby>".into(),
            english: Some("cat".into()),
            status: AnnotationStatus::Annotated,
        };
        assert_eq!(
            format_pair(&pair, false).unwrap(),
            "<ruby>猫<rt>ねこ</rt></ruby>\tcat"
        );
        let json: serde_json::Value =
            serde_json::from_str(&format_pair(&pair, true).unwrap()).unwrap();
        assert_eq!(json["status"], "annotated");
        assert_eq!(json["english"], "cat");

        let degraded = AnnotatedPair {
            japanese: "猫".into(),
            english: None,
            status: AnnotationStatus::Degraded(AnnotateError::TokenizerUnavailable("x".into())),
        };
        assert_eq!(format_pair(&degraded, false).unwrap(), "猫");
    }
}
