use crate::unicode::{is_cjk_ideograph, is_kana, katakana_to_hiragana_char as hira};

use super::ReadingSpan;

#[derive(Debug, Clone, Copy)]
struct Run {
    kana: bool,
    start: usize,
    end: usize,
}

fn runs(surface: &[char]) -> Vec<Run> {
    let mut runs: Vec<Run> = Vec::new();
    for (i, &c) in surface.iter().enumerate() {
        let kana = is_kana(c);
        match runs.last_mut() {
            Some(run) if run.kana == kana => run.end = i + 1,
            _ => runs.push(Run {
                kana,
                start: i,
                end: i + 1,
            }),
        }
    }
    runs
}

fn kana_matches(surface: &[char], reading: &[char]) -> bool {
    surface.len() <= reading.len()
        && surface
            .iter()
            .zip(reading)
            .all(|(&s, &r)| hira(s) == r)
}

/// Assign a reading range to every non-kana run, anchoring on the kana runs
/// between them. Shorter readings are tried first.
fn match_runs(
    runs: &[Run],
    surface: &[char],
    reading: &[char],
    rpos: usize,
) -> Option<Vec<(Run, usize, usize)>> {
    let Some((run, rest)) = runs.split_first() else {
        return (rpos == reading.len()).then(Vec::new);
    };
    let remaining = &reading[rpos..];

    if run.kana {
        let kana = &surface[run.start..run.end];
        if !kana_matches(kana, remaining) {
            return None;
        }
        return match_runs(rest, surface, reading, rpos + kana.len());
    }

    if remaining.is_empty() {
        return None;
    }
    if rest.is_empty() {
        return Some(vec![(*run, rpos, reading.len())]);
    }
    (1..=remaining.len()).find_map(|take| {
        let mut tail = match_runs(rest, surface, reading, rpos + take)?;
        tail.insert(0, (*run, rpos, rpos + take));
        Some(tail)
    })
}

/// Strip the kana prefix and suffix shared by surface and reading and give
/// what is left to a single span.
fn trim_common_kana(surface: &[char], reading: &[char], offset: usize) -> Vec<ReadingSpan> {
    let mut head = 0;
    while head < surface.len()
        && head < reading.len()
        && is_kana(surface[head])
        && hira(surface[head]) == reading[head]
    {
        head += 1;
    }
    let mut tail = 0;
    while tail < surface.len() - head
        && tail < reading.len() - head
        && is_kana(surface[surface.len() - 1 - tail])
        && hira(surface[surface.len() - 1 - tail]) == reading[reading.len() - 1 - tail]
    {
        tail += 1;
    }

    let core = &surface[head..surface.len() - tail];
    let core_reading = &reading[head..reading.len() - tail];
    if core_reading.is_empty() || !core.iter().any(|&c| is_cjk_ideograph(c)) {
        return Vec::new();
    }
    vec![ReadingSpan {
        kanji_run: core.iter().collect(),
        reading: core_reading.iter().collect(),
        position: offset + head,
    }]
}

/// Okurigana-aware alignment of one token. `reading` is hiragana.
pub(super) fn align(surface: &[char], reading: &[char], offset: usize) -> Vec<ReadingSpan> {
    let runs = runs(surface);
    match match_runs(&runs, surface, reading, 0) {
        Some(assigned) => assigned
            .into_iter()
            .filter_map(|(run, from, to)| {
                let kanji = &surface[run.start..run.end];
                kanji.iter().any(|&c| is_cjk_ideograph(c)).then(|| ReadingSpan {
                    kanji_run: kanji.iter().collect(),
                    reading: reading[from..to].iter().collect(),
                    position: offset + run.start,
                })
            })
            .collect(),
        None => trim_common_kana(surface, reading, offset),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn align_str(surface: &str, reading: &str) -> Vec<(String, String, usize)> {
        let s: Vec<char> = surface.chars().collect();
        let r: Vec<char> = reading.chars().collect();
        align(&s, &r, 0)
            .into_iter()
            .map(|sp| (sp.kanji_run, sp.reading, sp.position))
            .collect()
    }

    fn span(k: &str, r: &str, p: usize) -> (String, String, usize) {
        (k.to_string(), r.to_string(), p)
    }

    #[test]
    fn single_kanji() {
        assert_eq!(align_str("猫", "ねこ"), vec![span("猫", "ねこ", 0)]);
    }

    #[test]
    fn trailing_okurigana() {
        assert_eq!(align_str("好き", "すき"), vec![span("好", "す", 0)]);
        assert_eq!(align_str("食べる", "たべる"), vec![span("食", "た", 0)]);
    }

    #[test]
    fn compound_kept_whole() {
        assert_eq!(align_str("今日", "きょう"), vec![span("今日", "きょう", 0)]);
    }

    #[test]
    fn interior_kana_anchor() {
        assert_eq!(
            align_str("取り扱い", "とりあつかい"),
            vec![span("取", "と", 0), span("扱", "あつか", 2)]
        );
    }

    #[test]
    fn katakana_in_surface() {
        assert_eq!(align_str("ガス代", "がすだい"), vec![span("代", "だい", 2)]);
    }

    #[test]
    fn anchor_takes_shortest_fit() {
        assert_eq!(align_str("行う", "おこなう"), vec![span("行", "おこな", 0)]);
    }

    #[test]
    fn mismatch_falls_back_to_trim() {
        // The trailing き never appears in the reading.
        assert_eq!(align_str("書き", "しょ"), vec![span("書き", "しょ", 0)]);
    }

    #[test]
    fn leading_kana() {
        assert_eq!(align_str("お茶", "おちゃ"), vec![span("茶", "ちゃ", 1)]);
    }

    #[test]
    fn kana_only_yields_nothing() {
        assert!(align_str("です", "です").is_empty());
    }
}
