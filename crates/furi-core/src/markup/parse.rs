use std::sync::OnceLock;

use regex::Regex;

/// A `<ruby>` element found in text, in byte offsets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RubyElement<'a> {
    pub start: usize,
    pub end: usize,
    pub base: &'a str,
    pub reading: &'a str,
    pub markup: &'a str,
}

fn ruby_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"<ruby>([^<]*)(?:<rp>[^<]*</rp>)?<rt(?:\s[^>]*)?>([^<]*)</rt>(?:<rp>[^<]*</rp>)?</ruby>",
        )
        .expect("ruby pattern must compile")
    })
}

/// Scan `text` for complete ruby elements. Unterminated or nested markup is
/// not matched and stays plain text.
pub fn find_ruby(text: &str) -> Vec<RubyElement<'_>> {
    ruby_regex()
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            Some(RubyElement {
                start: whole.start(),
                end: whole.end(),
                base: caps.get(1)?.as_str(),
                reading: caps.get(2)?.as_str(),
                markup: whole.as_str(),
            })
        })
        .collect()
}
