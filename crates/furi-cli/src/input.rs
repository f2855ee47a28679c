//! Sentence input for `furitool annotate`.
//!
//! One sentence per line. Plain and bracketed lines may carry a translation
//! after a tab; JSONL lines use the `{"japanese", "english"}` record shape.

use std::fs;
use std::io::{self, Read};

use furi_engine::pipeline::parse_bracketed;
use furi_engine::{parse_sentence_json, Sentence};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputFormat {
    #[default]
    Plain,
    /// Inline readings such as `猫(ねこ)`.
    Bracketed,
    Jsonl,
}

#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("line {line}: {reason}")]
    Line { line: usize, reason: String },
}

/// Read `path`, or stdin when `path` is `None` or `-`.
pub fn read_source(path: Option<&str>) -> Result<String, InputError> {
    match path {
        None | Some("-") => {
            let mut content = String::new();
            io::stdin()
                .read_to_string(&mut content)
                .map_err(|source| InputError::Io {
                    path: "<stdin>".to_string(),
                    source,
                })?;
            Ok(content)
        }
        Some(p) => fs::read_to_string(p).map_err(|source| InputError::Io {
            path: p.to_string(),
            source,
        }),
    }
}

pub fn parse_line(line: &str, format: InputFormat) -> Result<Sentence, String> {
    if format == InputFormat::Jsonl {
        return parse_sentence_json(line).map_err(|e| e.to_string());
    }
    let (japanese, english) = match line.split_once('\t') {
        Some((ja, en)) => (ja, Some(en.trim())),
        None => (line, None),
    };
    let sentence = match format {
        InputFormat::Bracketed => Sentence::new(parse_bracketed(japanese)),
        _ => Sentence::new(japanese),
    };
    Ok(match english {
        Some(en) if !en.is_empty() => sentence.with_english(en),
        _ => sentence,
    })
}

/// Parse every non-blank line. Line numbers in errors are 1-based.
pub fn parse_sentences(content: &str, format: InputFormat) -> Vec<Result<Sentence, InputError>> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| {
            parse_line(line.trim_end_matches('\r'), format).map_err(|reason| InputError::Line {
                line: idx + 1,
                reason,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use furi_engine::{SentenceInput, StructuredSentence};

    #[test]
    fn plain_line_with_translation() {
        let s = parse_line("猫です\tIt is a cat.", InputFormat::Plain).unwrap();
        assert_eq!(s.japanese, SentenceInput::Plain("猫です".into()));
        assert_eq!(s.english.as_deref(), Some("It is a cat."));
    }

    #[test]
    fn plain_line_without_translation() {
        let s = parse_line("猫です", InputFormat::Plain).unwrap();
        assert_eq!(s.english, None);
        let s = parse_line("猫です\t ", InputFormat::Plain).unwrap();
        assert_eq!(s.english, None);
    }

    #[test]
    fn bracketed_line() {
        let s = parse_line("猫(ねこ)です", InputFormat::Bracketed).unwrap();
        match s.japanese {
            SentenceInput::Structured(StructuredSentence {
                cleaned, readings, ..
            }) => {
                assert_eq!(cleaned, "猫です");
                assert_eq!(readings.len(), 1);
            }
            other => panic!("expected structured input, got {other:?}"),
        }
    }

    #[test]
    fn jsonl_lines() {
        let content = "{\"japanese\":\"猫\",\"english\":\"cat\"}\n\n\"魚\"\nnot json\n";
        let parsed = parse_sentences(content, InputFormat::Jsonl);
        assert_eq!(parsed.len(), 3);
        assert_eq!(parsed[0].as_ref().unwrap().english.as_deref(), Some("cat"));
        assert_eq!(
            parsed[1].as_ref().unwrap().japanese,
            SentenceInput::Plain("魚".into())
        );
        match &parsed[2] {
            Err(InputError::Line { line, .. }) => assert_eq!(*line, 4),
            other => panic!("expected a line error, got {other:?}"),
        }
    }

    #[test]
    fn read_source_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("in.txt");
        fs::write(&path, "猫\n").unwrap();
        let content = read_source(path.to_str()).unwrap();
        assert_eq!(content, "猫\n");
        assert!(matches!(
            read_source(Some("/nonexistent/furi/input.txt")),
            Err(InputError::Io { .. })
        ));
    }
}
