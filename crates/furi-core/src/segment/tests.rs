use super::*;

fn cat_sentence() -> Vec<Token> {
    vec![
        Token::new("猫", "ネコ"),
        Token::bare("は"),
        Token::new("魚", "サカナ"),
        Token::bare("が"),
        Token::new("好き", "スキ"),
        Token::bare("です"),
        Token::bare("。"),
    ]
}

fn pairs(spans: &[ReadingSpan]) -> Vec<(&str, &str, usize)> {
    spans
        .iter()
        .map(|s| (s.kanji_run.as_str(), s.reading.as_str(), s.position))
        .collect()
}

fn per_char() -> SegmentOptions {
    SegmentOptions::default()
}

fn token_mode() -> SegmentOptions {
    SegmentOptions {
        split: ReadingSplit::Token,
        merge_adjacent: false,
    }
}

#[test]
fn cat_likes_fish_per_character() {
    let spans = segment("猫は魚が好きです。", &cat_sentence(), per_char()).unwrap();
    assert_eq!(
        pairs(&spans),
        vec![("猫", "ねこ", 0), ("魚", "さかな", 2), ("好", "す", 4)]
    );
}

#[test]
fn cat_likes_fish_token_mode() {
    let spans = segment("猫は魚が好きです。", &cat_sentence(), token_mode()).unwrap();
    assert_eq!(
        pairs(&spans),
        vec![("猫", "ねこ", 0), ("魚", "さかな", 2), ("好", "す", 4)]
    );
}

#[test]
fn per_character_slices_with_ceiling() {
    // ceil(3 / 2) = 2 chars each: a known misalignment for 今日.
    let tokens = vec![Token::new("今日", "キョウ")];
    let spans = segment("今日", &tokens, per_char()).unwrap();
    assert_eq!(pairs(&spans), vec![("今", "きょ", 0), ("日", "う", 1)]);
}

#[test]
fn per_character_drops_empty_slices() {
    // ceil(2 / 3) = 1: 一→い, 二→ち, nothing left for 三.
    let tokens = vec![Token::new("一二三", "イチ")];
    let spans = segment("一二三", &tokens, per_char()).unwrap();
    assert_eq!(pairs(&spans), vec![("一", "い", 0), ("二", "ち", 1)]);
}

#[test]
fn merge_adjacent_rebuilds_runs() {
    let tokens = vec![Token::new("今日", "キョウ"), Token::bare("は")];
    let options = SegmentOptions {
        split: ReadingSplit::PerCharacter,
        merge_adjacent: true,
    };
    let spans = segment("今日は", &tokens, options).unwrap();
    assert_eq!(pairs(&spans), vec![("今日", "きょう", 0)]);
}

#[test]
fn merge_does_not_cross_tokens() {
    let tokens = vec![Token::new("日本", "ニホン"), Token::new("語", "ゴ")];
    let options = SegmentOptions {
        split: ReadingSplit::Token,
        merge_adjacent: true,
    };
    let spans = segment("日本語", &tokens, options).unwrap();
    assert_eq!(pairs(&spans), vec![("日本", "にほん", 0), ("語", "ご", 2)]);
}

#[test]
fn token_without_reading_is_left_alone() {
    let tokens = vec![Token::bare("猫"), Token::bare("は")];
    assert!(segment("猫は", &tokens, per_char()).unwrap().is_empty());
}

#[test]
fn katakana_and_latin_pass_through() {
    let tokens = vec![Token::new("テスト", "テスト"), Token::new("abc", "エービーシー")];
    assert!(segment("テストabc", &tokens, token_mode()).unwrap().is_empty());
}

#[test]
fn skipped_positions_are_not_annotated() {
    let tokens = vec![Token::new("一員", "イチイン"), Token::new("猫", "ネコ")];
    let spans = segment_with("一員猫", &tokens, per_char(), |p| p < 2).unwrap();
    assert_eq!(pairs(&spans), vec![("猫", "ねこ", 2)]);
}

#[test]
fn token_mode_falls_back_when_token_touches_skipped_chars() {
    let tokens = vec![Token::new("今日", "キョウ")];
    let spans = segment_with("今日", &tokens, token_mode(), |p| p == 0).unwrap();
    assert_eq!(pairs(&spans), vec![("日", "う", 1)]);
}

#[test]
fn mismatched_token_is_an_error() {
    let tokens = vec![Token::new("犬", "イヌ")];
    let err = segment("猫", &tokens, per_char()).unwrap_err();
    assert_eq!(
        err,
        SegmentError::TokenMismatch {
            index: 0,
            offset: 0,
            surface: "犬".to_string(),
        }
    );
}

#[test]
fn overlong_token_is_an_error() {
    let tokens = vec![Token::new("猫は", "ネコハ")];
    assert!(matches!(
        segment("猫", &tokens, per_char()),
        Err(SegmentError::TokenMismatch { .. })
    ));
}

#[test]
fn short_coverage_is_an_error() {
    let tokens = vec![Token::new("猫", "ネコ")];
    let err = segment("猫は", &tokens, per_char()).unwrap_err();
    assert_eq!(err, SegmentError::IncompleteCoverage { covered: 1, len: 2 });
}

#[test]
fn empty_text() {
    assert!(segment("", &[], per_char()).unwrap().is_empty());
}

#[test]
fn reading_split_parses() {
    assert_eq!("token".parse::<ReadingSplit>(), Ok(ReadingSplit::Token));
    assert_eq!(
        "per-character".parse::<ReadingSplit>(),
        Ok(ReadingSplit::PerCharacter)
    );
    assert!("word".parse::<ReadingSplit>().is_err());
    assert_eq!(ReadingSplit::Token.to_string(), "token");
}
