use crate::error::ConfigError;
use crate::matches::Matches;
use crate::traits::Pattern;
use regex::{Regex, RegexBuilder};
use regex_automata::hybrid::dfa::{Cache, DFA};
use regex_automata::util::pool::Pool;
use regex_automata::util::{start, syntax};
use regex_automata::Anchored;
use std::sync::Arc;
use stream_framework::{CharStream, StreamResult};
use tracing::trace;

/// Flags applied when compiling a [`RegexPattern`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatternOptions {
    /// `^` and `$` also match at embedded line breaks. On by default.
    pub multi_line: bool,
    pub case_insensitive: bool,
}

impl Default for PatternOptions {
    fn default() -> Self {
        Self {
            multi_line: true,
            case_insensitive: false,
        }
    }
}

/// The default [`Pattern`]: a regular expression anchored at the current
/// stream position.
///
/// The same expression is compiled twice. A lazy DFA bounds the streaming
/// probe, feeding it one character at a time until it can no longer reach a
/// match; its states are built on demand, so registering a rule stays cheap
/// even for large Unicode classes. A `Regex` then produces the authoritative
/// match and captures from the buffered text.
pub struct RegexPattern {
    source: String,
    regex: Regex,
    probe: Arc<DFA>,
    caches: Pool<Cache, CacheFn>,
    names: Arc<[Option<String>]>,
}

type CacheFn = Box<dyn Fn() -> Cache + Send + Sync>;

impl RegexPattern {
    pub fn new(pattern: &str) -> Result<Self, ConfigError> {
        Self::with_options(pattern, PatternOptions::default())
    }

    pub fn with_options(pattern: &str, options: PatternOptions) -> Result<Self, ConfigError> {
        let anchored = format!(r"\A(?:{pattern})");

        let regex = RegexBuilder::new(&anchored)
            .multi_line(options.multi_line)
            .case_insensitive(options.case_insensitive)
            .build()
            .map_err(|source| ConfigError::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            })?;

        // Unicode \b is only supported on ASCII input; anything else hits a
        // quit state, which `probe` handles by reading on.
        let probe = DFA::builder()
            .configure(DFA::config().unicode_word_boundary(true))
            .syntax(
                syntax::Config::new()
                    .multi_line(options.multi_line)
                    .case_insensitive(options.case_insensitive),
            )
            .build(&anchored)
            .map_err(|source| ConfigError::Automaton {
                pattern: pattern.to_string(),
                source: Box::new(source),
            })?;

        let names = regex
            .capture_names()
            .map(|name| name.map(str::to_string))
            .collect::<Vec<_>>();

        let probe = Arc::new(probe);
        let for_caches = Arc::clone(&probe);
        let caches: Pool<Cache, CacheFn> = Pool::new(Box::new(move || for_caches.create_cache()));

        Ok(Self {
            source: pattern.to_string(),
            regex,
            probe,
            caches,
            names: Arc::from(names),
        })
    }
}

impl std::fmt::Debug for RegexPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegexPattern")
            .field("source", &self.source)
            .field("groups", &self.names.len())
            .finish_non_exhaustive()
    }
}

impl Pattern for RegexPattern {
    fn probe(&self, stream: &mut dyn CharStream) -> StreamResult<()> {
        let mut cache = self.caches.get();
        let config = start::Config::new().anchored(Anchored::Yes);
        let Ok(mut state) = self.probe.start_state(&mut cache, &config) else {
            return read_to_end(stream);
        };

        let mut utf8 = [0u8; 4];
        while let Some(ch) = stream.read_char()? {
            for &byte in ch.encode_utf8(&mut utf8).as_bytes() {
                state = match self.probe.next_state(&mut cache, state, byte) {
                    Ok(next) => next,
                    Err(_) => {
                        trace!(pattern = %self.source, "probe cache exhausted, buffering rest of input");
                        return read_to_end(stream);
                    }
                };
                if state.is_dead() || state.is_quit() {
                    break;
                }
            }
            if state.is_dead() {
                return Ok(());
            }
            if state.is_quit() {
                trace!(pattern = %self.source, "probe gave up, buffering rest of input");
                return read_to_end(stream);
            }
        }
        Ok(())
    }

    fn captures(&self, text: &str) -> Option<Matches> {
        let caps = self.regex.captures(text)?;
        Some(Matches::from_captures(&caps, &self.names))
    }

    fn as_str(&self) -> &str {
        &self.source
    }
}

fn read_to_end(stream: &mut dyn CharStream) -> StreamResult<()> {
    while stream.read_char()?.is_some() {}
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use stream_framework::{CharReader, RecallStream};

    fn probe_text(pattern: &RegexPattern, input: &str) -> String {
        let mut recall = RecallStream::new(CharReader::from(input));
        pattern.probe(&mut recall).unwrap();
        recall.recall().to_string()
    }

    #[test]
    fn test_probe_stops_after_dead_char() {
        let digits = RegexPattern::new(r"\d+").unwrap();
        let read = probe_text(&digits, "123+45");
        assert!(read.starts_with("123"));
        assert!(read.len() <= "123+4".len());
    }

    #[test]
    fn test_probe_reads_to_end_when_alive() {
        let digits = RegexPattern::new(r"\d+").unwrap();
        assert_eq!(probe_text(&digits, "2024"), "2024");
    }

    #[test]
    fn test_probe_on_immediate_mismatch() {
        let digits = RegexPattern::new(r"\d+").unwrap();
        assert_eq!(probe_text(&digits, "abc"), "a");
    }

    #[test]
    fn test_captures_are_anchored() {
        let word = RegexPattern::new(r"[a-z]+").unwrap();
        assert!(word.captures("12abc").is_none());
        assert_eq!(word.captures("abc12").unwrap().whole(), "abc");
    }

    #[test]
    fn test_named_groups() {
        let pattern = RegexPattern::new(r"(?P<key>\w+)=(?P<value>\w*)").unwrap();
        let matches = pattern.captures("name=glow;").unwrap();
        assert_eq!(matches.name("key"), Some("name"));
        assert_eq!(matches.name("value"), Some("glow"));
        assert_eq!(&matches[0], "name=glow");
    }

    #[test]
    fn test_alternation_with_shared_prefix() {
        let pattern = RegexPattern::new("ab|abcd").unwrap();
        let read = probe_text(&pattern, "abcx");
        let matches = pattern.captures(&read).unwrap();
        assert_eq!(matches.whole(), "ab");
    }

    #[test]
    fn test_multi_line_anchor() {
        let pattern = RegexPattern::new(r"\w+$").unwrap();
        assert_eq!(pattern.captures("end\nnext").unwrap().whole(), "end");

        let single = RegexPattern::with_options(
            r"\w+$",
            PatternOptions {
                multi_line: false,
                ..PatternOptions::default()
            },
        )
        .unwrap();
        assert!(single.captures("end\nnext").is_none());
    }

    #[test]
    fn test_case_insensitive() {
        let pattern = RegexPattern::with_options(
            "select",
            PatternOptions {
                case_insensitive: true,
                ..PatternOptions::default()
            },
        )
        .unwrap();
        assert_eq!(pattern.captures("SeLeCt *").unwrap().whole(), "SeLeCt");
    }

    #[test]
    fn test_invalid_pattern() {
        let err = RegexPattern::new("(unclosed").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPattern { .. }));
    }

    #[test]
    fn test_unicode_word_boundary_falls_back() {
        let pattern = RegexPattern::new(r"\w+\b").unwrap();
        assert_eq!(probe_text(&pattern, "héllo wörld"), "héllo wörld");
        assert_eq!(pattern.captures("héllo wörld").unwrap().whole(), "héllo");
    }

    #[test]
    fn test_bounded_unicode_repetition() {
        let pattern = RegexPattern::new(r"\w{1,20}").unwrap();
        let read = probe_text(&pattern, "日本語テキスト and more");
        assert!(read.starts_with("日本語テキスト "));
        assert!(!read.contains("and"));
        assert_eq!(
            pattern.captures("日本語テキスト and more").unwrap().whole(),
            "日本語テキスト"
        );
    }

    #[test]
    fn test_shared_across_threads() {
        let pattern = Arc::new(RegexPattern::new(r"[a-z]+").unwrap());
        let handles = (0..4)
            .map(|_| {
                let pattern = Arc::clone(&pattern);
                std::thread::spawn(move || probe_text(&pattern, "abc1"))
            })
            .collect::<Vec<_>>();
        for handle in handles {
            assert!(handle.join().unwrap().starts_with("abc1"));
        }
    }
}
