//! 流式文本词法分析器示例
//! 从文件或标准输入逐字符读取，输出单词、数字与标点及其位置，最后打印统计。
//!
//! Usage: `line-lexer [FILE]`.

use lexer_framework::{ConfigError, Lexer, Matches, Position, ScanError, State};
use std::fs::File;
use std::io::{self, Read};
use std::process::ExitCode;
use tracing::trace;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, PartialEq)]
enum TextToken {
    Word { text: String, position: Position },
    Number { text: String, position: Position },
    Punct { ch: char, position: Position },
}

#[derive(Debug, Default)]
struct Tally {
    words: usize,
    numbers: usize,
    punct: usize,
}

/// Splits a hyphenated compound into one word per part, keeping each part's
/// own position on the line.
fn split_compound(text: &str, at: Position) -> Vec<TextToken> {
    let mut position = at;
    text.split('-')
        .map(|part| {
            let token = TextToken::Word {
                text: part.to_string(),
                position,
            };
            let width = part.chars().count() + 1;
            position.column += width;
            position.offset += width;
            token
        })
        .collect()
}

fn text_lexer() -> Result<Lexer<TextToken>, ConfigError> {
    let mut builder = Lexer::builder();
    builder.declare_state::<Tally>();
    builder
        .add_rule(r"\s+", || {})?
        .add_rule(
            r"\d+(?:[.,]\d+)*",
            |m: &Matches, at: Position, mut tally: State<Tally>| {
                tally.numbers += 1;
                Some(TextToken::Number {
                    text: m.whole().to_string(),
                    position: at,
                })
            },
        )?
        .add_rule(
            r"\w+(?:-\w+)+",
            |m: &Matches, at: Position, mut tally: State<Tally>| {
                let parts = split_compound(m.whole(), at);
                tally.words += parts.len();
                parts
            },
        )?
        .add_rule(r"\w+", |m: &Matches, at: Position, mut tally: State<Tally>| {
            tally.words += 1;
            Some(TextToken::Word {
                text: m.whole().to_string(),
                position: at,
            })
        })?
        .add_rule(r"[^\w\s]", |m: &Matches, at: Position, mut tally: State<Tally>| {
            tally.punct += 1;
            let ch = m.whole().chars().next()?;
            Some(TextToken::Punct { ch, position: at })
        })?;
    builder.build()
}

fn run<R: Read>(lexer: &Lexer<TextToken>, source: R) -> Result<(), ScanError> {
    let mut scanner = lexer.scan(source);
    scanner.set_line_hook(|line| trace!(line, "line changed"));

    while let Some(token) = scanner.next_token()? {
        match token {
            TextToken::Word { text, position } => println!("{position}\tword\t{text}"),
            TextToken::Number { text, position } => println!("{position}\tnumber\t{text}"),
            TextToken::Punct { ch, position } => println!("{position}\tpunct\t{ch}"),
        }
    }

    let lines = scanner.position().line;
    if let Some(tally) = scanner.state::<Tally>() {
        println!(
            "-- {lines} lines, {} words, {} numbers, {} punctuation",
            tally.words, tally.numbers, tally.punct
        );
    }
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let lexer = match text_lexer() {
        Ok(lexer) => lexer,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    };

    let result = match std::env::args().nth(1) {
        Some(path) => match File::open(&path) {
            Ok(file) => run(&lexer, file),
            Err(err) => {
                eprintln!("error: cannot open {path}: {err}");
                return ExitCode::FAILURE;
            }
        },
        None => run(&lexer, io::stdin().lock()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
