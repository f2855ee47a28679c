use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;

use tracing::{debug, debug_span, warn};

use furi_core::pipeline::{AnnotateError, AnnotatedSentence, Annotator, SentenceInput};
use furi_core::settings::{settings, Settings};
use furi_core::tokenizer::{LexiconTokenizer, Tokenizer, TokenizerError};

use super::{AnnotatedPair, Sentence, TokenizerHandle};

/// The annotation context: one configured [`Annotator`] plus the tokenizer it
/// feeds from. Owned by the caller; share it by reference across threads.
#[derive(Debug)]
pub struct FuriganaEngine {
    annotator: Annotator,
    tokenizer: TokenizerHandle,
    max_threads: usize,
}

impl FuriganaEngine {
    /// Global settings, tokenizer loaded by `loader` on first use.
    pub fn new<F>(loader: F) -> Self
    where
        F: Fn() -> Result<Arc<dyn Tokenizer>, TokenizerError> + Send + Sync + 'static,
    {
        Self::with_handle(settings(), TokenizerHandle::new(loader))
    }

    pub fn with_handle(settings: &Settings, tokenizer: TokenizerHandle) -> Self {
        Self {
            annotator: Annotator::new(settings),
            tokenizer,
            max_threads: settings.batch.max_threads,
        }
    }

    pub fn with_tokenizer(tokenizer: Arc<dyn Tokenizer>) -> Self {
        Self::with_handle(settings(), TokenizerHandle::ready(tokenizer))
    }

    /// Lexicon file (TSV or compiled) loaded on first use.
    pub fn from_lexicon_path(path: impl AsRef<Path>) -> Self {
        let path: PathBuf = path.as_ref().to_path_buf();
        Self::new(move || {
            let lexicon = LexiconTokenizer::load(&path).map_err(|e| {
                TokenizerError::Unavailable(format!("{}: {e}", path.display()))
            })?;
            Ok(Arc::new(lexicon) as Arc<dyn Tokenizer>)
        })
    }

    pub fn with_annotator(mut self, annotator: Annotator) -> Self {
        self.annotator = annotator;
        self
    }

    pub fn with_max_threads(mut self, max_threads: usize) -> Self {
        self.max_threads = max_threads.max(1);
        self
    }

    pub fn annotator(&self) -> &Annotator {
        &self.annotator
    }

    /// Load the tokenizer now instead of on first use.
    pub fn initialize(&self) -> Result<(), AnnotateError> {
        self.tokenizer.get().map(|_| ()).map_err(AnnotateError::from)
    }

    pub fn is_ready(&self) -> bool {
        self.tokenizer.is_ready()
    }

    /// Drop the tokenizer (or a remembered load failure).
    pub fn reset(&mut self) {
        self.tokenizer.reset();
    }

    /// Annotate one sentence. Structured input with explicit readings never
    /// touches the tokenizer.
    pub fn annotate(&self, input: &SentenceInput) -> AnnotatedSentence {
        if !input.needs_tokenizer() {
            return self.annotator.annotate(input, None);
        }
        match self.tokenizer.get() {
            Ok(tokenizer) => self.annotator.annotate(input, Some(tokenizer.as_ref())),
            Err(e) => AnnotatedSentence::degraded(input, e.into()),
        }
    }

    pub fn annotate_sentence(&self, sentence: &Sentence) -> AnnotatedPair {
        AnnotatedPair::new(self.annotate(&sentence.japanese), sentence.english.clone())
    }

    /// Annotate a batch on up to `max_threads` threads. Output order matches
    /// input order, and a failing sentence only degrades itself.
    pub fn annotate_batch(&self, sentences: &[Sentence]) -> Vec<AnnotatedPair> {
        let _span = debug_span!("annotate_batch", sentences = sentences.len()).entered();

        let threads = self.max_threads.min(sentences.len()).max(1);
        if threads == 1 {
            return sentences.iter().map(|s| self.annotate_sentence(s)).collect();
        }
        let chunk = sentences.len().div_ceil(threads);
        debug!(threads, chunk);

        thread::scope(|scope| {
            let workers: Vec<_> = sentences
                .chunks(chunk)
                .enumerate()
                .map(|(i, part)| {
                    let spawned = thread::Builder::new()
                        .name(format!("furi-batch-{i}"))
                        .spawn_scoped(scope, move || {
                            part.iter()
                                .map(|s| self.annotate_sentence(s))
                                .collect::<Vec<_>>()
                        });
                    (part, spawned)
                })
                .collect();

            let mut out = Vec::with_capacity(sentences.len());
            for (part, spawned) in workers {
                match spawned {
                    Ok(handle) => match handle.join() {
                        Ok(done) => out.extend(done),
                        Err(_) => {
                            warn!("batch worker panicked");
                            out.extend(part.iter().map(|s| {
                                degraded_pair(s, "batch worker panicked".to_string())
                            }));
                        }
                    },
                    Err(e) => {
                        warn!(error = %e, "could not spawn batch worker, running inline");
                        out.extend(part.iter().map(|s| self.annotate_sentence(s)));
                    }
                }
            }
            out
        })
    }

    /// Rewrite `text` entirely in hiragana; `text` unchanged on failure.
    pub fn to_hiragana(&self, text: &str) -> String {
        match self.tokenizer.get() {
            Ok(tokenizer) => self.annotator.to_hiragana(text, Some(tokenizer.as_ref())),
            Err(e) => {
                warn!(error = %e, "hiragana conversion degraded");
                text.to_string()
            }
        }
    }
}

fn degraded_pair(sentence: &Sentence, reason: String) -> AnnotatedPair {
    AnnotatedPair::new(
        AnnotatedSentence::degraded(&sentence.japanese, AnnotateError::ConversionFailure(reason)),
        sentence.english.clone(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use furi_core::pipeline::{AnnotationStatus, ExplicitReading, StructuredSentence};
    use furi_core::settings::{parse_settings_toml, DEFAULT_SETTINGS_TOML};
    use furi_core::tokenizer::Token;

    fn lexicon() -> Arc<dyn Tokenizer> {
        Arc::new(LexiconTokenizer::from_entries([
            ("猫", "ネコ"),
            ("魚", "サカナ"),
            ("好き", "スキ"),
            ("犬", "イヌ"),
        ]))
    }

    fn engine() -> FuriganaEngine {
        let settings = parse_settings_toml(DEFAULT_SETTINGS_TOML).unwrap();
        FuriganaEngine::with_handle(&settings, TokenizerHandle::ready(lexicon()))
    }

    #[test]
    fn annotate_plain() {
        let out = engine().annotate(&"猫は魚".into());
        assert_eq!(out.status, AnnotationStatus::Annotated);
        assert_eq!(
            out.html,
            "<ruby>猫<rt class=\"\">ねこ</rt></ruby>は<ruby>魚<rt class=\"long-reading\">さかな</rt></ruby>"
        );
    }

    #[test]
    fn english_passes_through() {
        let pair = engine().annotate_sentence(&Sentence::new("犬").with_english("A dog <b>"));
        assert_eq!(pair.japanese, "<ruby>犬<rt class=\"\">いぬ</rt></ruby>");
        assert_eq!(pair.english.as_deref(), Some("A dog <b>"));
    }

    #[test]
    fn unavailable_tokenizer_degrades_every_plain_sentence() {
        let settings = parse_settings_toml(DEFAULT_SETTINGS_TOML).unwrap();
        let engine =
            FuriganaEngine::with_handle(&settings, TokenizerHandle::unavailable("offline"));
        let batch = vec![Sentence::new("猫"), Sentence::new("魚").with_english("fish")];
        let out = engine.annotate_batch(&batch);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].japanese, "猫");
        assert_eq!(out[1].japanese, "魚");
        assert_eq!(out[1].english.as_deref(), Some("fish"));
        assert!(out.iter().all(|p| matches!(
            p.status,
            AnnotationStatus::Degraded(AnnotateError::TokenizerUnavailable(_))
        )));
        assert!(engine.initialize().is_err());
    }

    #[test]
    fn structured_input_skips_tokenizer_load() {
        let loads = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&loads);
        let engine = FuriganaEngine::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Err(TokenizerError::Unavailable("offline".into()))
        });
        let input = SentenceInput::Structured(StructuredSentence {
            raw: "猫(ねこ)".into(),
            cleaned: "猫".into(),
            readings: vec![ExplicitReading {
                reading: "ねこ".into(),
                kanji: "猫".into(),
                position: 0,
            }],
        });
        let out = engine.annotate(&input);
        assert_eq!(out.html, "<ruby>猫<rt class=\"\">ねこ</rt></ruby>");
        assert_eq!(loads.load(Ordering::SeqCst), 0);
        assert!(!engine.is_ready());
    }

    #[test]
    fn lazy_load_and_reset() {
        let loads = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&loads);
        let mut engine = FuriganaEngine::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(lexicon())
        });
        assert!(!engine.is_ready());
        engine.initialize().unwrap();
        engine.annotate(&"猫".into());
        assert_eq!(loads.load(Ordering::SeqCst), 1);
        engine.reset();
        assert!(!engine.is_ready());
        engine.annotate(&"猫".into());
        assert_eq!(loads.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn batch_preserves_order_across_threads() {
        let engine = engine().with_max_threads(3);
        let texts = ["猫", "魚", "犬", "好き", "猫は魚", "です", "犬と猫"];
        let batch: Vec<Sentence> = texts
            .iter()
            .enumerate()
            .map(|(i, t)| Sentence::new(*t).with_english(i.to_string()))
            .collect();
        let out = engine.annotate_batch(&batch);
        assert_eq!(out.len(), texts.len());
        for (i, (pair, sentence)) in out.iter().zip(&batch).enumerate() {
            assert_eq!(pair.english.as_deref(), Some(i.to_string().as_str()));
            assert_eq!(*pair, engine.annotate_sentence(sentence));
        }
    }

    #[test]
    fn one_bad_sentence_does_not_abort_batch() {
        let tok = |text: &str| -> Result<Vec<Token>, TokenizerError> {
            if text.contains('犬') {
                Err(TokenizerError::Failed("boom".into()))
            } else {
                Ok(vec![Token::new(text, "ネコ")])
            }
        };
        let engine = FuriganaEngine::with_tokenizer(Arc::new(tok)).with_max_threads(2);
        let batch = vec![Sentence::new("猫"), Sentence::new("犬"), Sentence::new("猫")];
        let out = engine.annotate_batch(&batch);
        assert!(!out[0].is_degraded());
        assert!(out[1].is_degraded());
        assert_eq!(out[1].japanese, "犬");
        assert!(!out[2].is_degraded());
    }

    fn panics_on_dog(text: &str) -> Result<Vec<Token>, TokenizerError> {
        if text.contains('犬') {
            panic!("tokenizer crashed on {text}");
        }
        Ok(vec![Token::new(text, "ネコ")])
    }

    fn degraded_flags(out: &[AnnotatedPair]) -> Vec<bool> {
        out.iter().map(AnnotatedPair::is_degraded).collect()
    }

    #[test]
    fn panic_degrades_only_its_sentence_across_threads() {
        let engine = FuriganaEngine::with_tokenizer(Arc::new(panics_on_dog)).with_max_threads(2);
        let batch: Vec<Sentence> = ["猫", "犬", "猫", "猫"].map(Sentence::new).into();
        let out = engine.annotate_batch(&batch);
        assert_eq!(degraded_flags(&out), [false, true, false, false]);
        assert_eq!(out[1].japanese, "犬");
        assert!(matches!(
            out[1].status,
            AnnotationStatus::Degraded(AnnotateError::ConversionFailure(_))
        ));
    }

    #[test]
    fn panic_is_contained_on_a_single_thread() {
        let engine = FuriganaEngine::with_tokenizer(Arc::new(panics_on_dog)).with_max_threads(1);
        let out = engine.annotate_batch(&[Sentence::new("猫"), Sentence::new("犬")]);
        assert_eq!(degraded_flags(&out), [false, true]);
        assert!(engine.annotate(&"犬".into()).is_degraded());
        assert_eq!(engine.to_hiragana("犬"), "犬");
    }

    #[test]
    fn panicking_loader_degrades_instead_of_propagating() {
        let engine = FuriganaEngine::new(|| panic!("lexicon missing"));
        let out = engine.annotate(&"猫".into());
        assert_eq!(out.html, "猫");
        assert!(matches!(
            out.status,
            AnnotationStatus::Degraded(AnnotateError::TokenizerUnavailable(_))
        ));
        assert!(!engine.is_ready());
    }

    #[test]
    fn empty_batch() {
        assert!(engine().annotate_batch(&[]).is_empty());
    }

    #[test]
    fn hiragana() {
        assert_eq!(engine().to_hiragana("猫は魚が好き"), "ねこはさかながすき");
        let settings = parse_settings_toml(DEFAULT_SETTINGS_TOML).unwrap();
        let offline = FuriganaEngine::with_handle(&settings, TokenizerHandle::unavailable("x"));
        assert_eq!(offline.to_hiragana("猫"), "猫");
    }

    #[test]
    fn lexicon_path_missing_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let engine = FuriganaEngine::from_lexicon_path(dir.path().join("missing.tsv"));
        assert!(matches!(
            engine.initialize(),
            Err(AnnotateError::TokenizerUnavailable(_))
        ));
    }

    #[test]
    fn lexicon_path_loads_tsv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("words.tsv");
        std::fs::write(&path, "猫\tねこ\n").unwrap();
        let engine = FuriganaEngine::from_lexicon_path(&path);
        assert_eq!(engine.annotate(&"猫".into()).html, "<ruby>猫<rt class=\"\">ねこ</rt></ruby>");
    }
}
