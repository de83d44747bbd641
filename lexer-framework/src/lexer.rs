use crate::error::{ConfigError, ScanError};
use crate::injector::{BoxedAction, IntoAction, Requirement, StateRegistry};
use crate::pattern::{PatternOptions, RegexPattern};
use crate::scanner::Scanner;
use crate::traits::Pattern;
use std::any::Any;
use std::io::Read;
use stream_framework::{CharReader, CharStream};
use tracing::debug;

/// A pattern paired with the action to run when it matches.
pub struct Rule<Tok> {
    pub(crate) pattern: Box<dyn Pattern>,
    pub(crate) action: BoxedAction<Tok>,
    requirements: Vec<Requirement>,
}

impl<Tok> Rule<Tok> {
    pub fn pattern(&self) -> &dyn Pattern {
        self.pattern.as_ref()
    }

    /// State types the action needs.
    pub fn requirements(&self) -> &[Requirement] {
        &self.requirements
    }
}

impl<Tok> std::fmt::Debug for Rule<Tok> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule")
            .field("pattern", &self.pattern.as_str())
            .field("requirements", &self.requirements)
            .finish_non_exhaustive()
    }
}

#[derive(Debug)]
struct StateDecl {
    requirement: Requirement,
    init: fn() -> Box<dyn Any + Send>,
}

fn init_default<T: Default + Any + Send>() -> Box<dyn Any + Send> {
    Box::new(T::default())
}

/// Collects rules and state declarations, then freezes them into a [`Lexer`].
///
/// Rules are tried in the order they are added. Pattern options apply to the
/// rules added after they are set.
pub struct LexerBuilder<Tok> {
    rules: Vec<Rule<Tok>>,
    states: Vec<StateDecl>,
    options: PatternOptions,
}

impl<Tok> LexerBuilder<Tok> {
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            states: Vec::new(),
            options: PatternOptions::default(),
        }
    }

    /// Lets `^`/`$` match at embedded line breaks (the default).
    pub fn multi_line(&mut self, yes: bool) -> &mut Self {
        self.options.multi_line = yes;
        self
    }

    pub fn case_insensitive(&mut self, yes: bool) -> &mut Self {
        self.options.case_insensitive = yes;
        self
    }

    /// Declares a state type. Every scan run gets its own `T::default()`.
    pub fn declare_state<T: Default + Any + Send>(&mut self) -> &mut Self {
        self.states.push(StateDecl {
            requirement: Requirement::of::<T>(),
            init: init_default::<T>,
        });
        self
    }

    /// Adds a rule matching the regular expression `pattern` at the current
    /// position.
    pub fn add_rule<M, A>(&mut self, pattern: &str, action: A) -> Result<&mut Self, ConfigError>
    where
        M: 'static,
        A: IntoAction<Tok, M>,
    {
        let pattern = RegexPattern::with_options(pattern, self.options)?;
        self.add_pattern_rule(pattern, action)
    }

    /// Adds a rule driven by a custom matcher.
    pub fn add_pattern_rule<P, M, A>(&mut self, pattern: P, action: A) -> Result<&mut Self, ConfigError>
    where
        P: Pattern + 'static,
        M: 'static,
        A: IntoAction<Tok, M>,
    {
        let requirements = A::requirements();
        for (i, requirement) in requirements.iter().enumerate() {
            if requirements[..i].contains(requirement) {
                return Err(ConfigError::DuplicateParam {
                    type_name: requirement.type_name,
                });
            }
        }

        self.rules.push(Rule {
            pattern: Box::new(pattern),
            action: action.into_action(),
            requirements,
        });
        Ok(self)
    }

    /// Checks every action against the declared states and freezes the lexer.
    pub fn build(self) -> Result<Lexer<Tok>, ConfigError> {
        for (i, decl) in self.states.iter().enumerate() {
            if self.states[..i]
                .iter()
                .any(|earlier| earlier.requirement == decl.requirement)
            {
                return Err(ConfigError::DuplicateState {
                    type_name: decl.requirement.type_name,
                });
            }
        }

        for (index, rule) in self.rules.iter().enumerate() {
            for requirement in &rule.requirements {
                if !self.states.iter().any(|decl| decl.requirement == *requirement) {
                    return Err(ConfigError::UnresolvedParam {
                        rule: index,
                        type_name: requirement.type_name,
                    });
                }
            }
        }

        debug!(
            rules = self.rules.len(),
            states = self.states.len(),
            "lexer built"
        );
        Ok(Lexer {
            rules: self.rules,
            states: self.states,
        })
    }
}

impl<Tok> Default for LexerBuilder<Tok> {
    fn default() -> Self {
        Self::new()
    }
}

/// An immutable rule table plus the state types each run instantiates.
///
/// A `Lexer` is shared read-only by all of its runs, so one instance can
/// drive scanners on several threads at once.
pub struct Lexer<Tok> {
    pub(crate) rules: Vec<Rule<Tok>>,
    states: Vec<StateDecl>,
}

impl<Tok> Lexer<Tok> {
    pub fn builder() -> LexerBuilder<Tok> {
        LexerBuilder::new()
    }

    pub fn rules(&self) -> &[Rule<Tok>] {
        &self.rules
    }

    /// Starts a run over a byte source.
    pub fn scan<R: Read>(&self, source: R) -> Scanner<'_, Tok, CharReader<R>> {
        self.scan_stream(CharReader::new(source))
    }

    /// Starts a run over an in-memory string.
    pub fn scan_str<'s>(&self, input: &'s str) -> Scanner<'_, Tok, CharReader<&'s [u8]>> {
        self.scan_stream(CharReader::from(input))
    }

    /// Starts a run over any character stream.
    pub fn scan_stream<S: CharStream>(&self, stream: S) -> Scanner<'_, Tok, S> {
        Scanner::new(self, stream)
    }

    /// Collects every token of a run, stopping at the first error.
    pub fn tokenize<R: Read>(&self, source: R) -> Result<Vec<Tok>, ScanError> {
        self.scan(source).collect()
    }

    pub(crate) fn new_states(&self) -> StateRegistry {
        let mut registry = StateRegistry::new();
        for decl in &self.states {
            registry.insert_boxed(decl.requirement, (decl.init)());
        }
        registry
    }
}

impl<Tok> std::fmt::Debug for Lexer<Tok> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lexer")
            .field("rules", &self.rules)
            .field(
                "states",
                &self
                    .states
                    .iter()
                    .map(|decl| decl.requirement.type_name)
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}
