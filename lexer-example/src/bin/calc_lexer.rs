//! 计算器词法分析器示例
//! 用 lexer-framework 的规则表对算术表达式分词，并用共享状态统计行号。
//!
//! Usage: `calc-lexer [EXPR...]`, or `calc-lexer -` to read from stdin.
//! Set `RUST_LOG=lexer_framework=debug` to watch rule matching.

use lexer_framework::{ConfigError, Lexer, Matches, Position, State};
use std::io::{self, Read};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// 计算器 Token 类型
#[derive(Debug, Clone, PartialEq)]
pub enum CalcToken {
    Number { value: f64, position: Position },
    Binary { op: BinaryOp, position: Position },
    LineFeed { line: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Plus,
    Minus,
    Times,
    Div,
}

/// 已经越过的换行数
#[derive(Debug, Default)]
struct LineCounter(usize);

fn calc_lexer() -> Result<Lexer<CalcToken>, ConfigError> {
    let mut builder = Lexer::builder();
    builder.declare_state::<LineCounter>();
    builder
        .add_rule(r"[\t ]+", || {})?
        .add_rule(r"\n+", |m: &Matches, mut lines: State<LineCounter>| {
            lines.0 += m.whole().len();
            Some(CalcToken::LineFeed { line: lines.0 + 1 })
        })?
        .add_rule(r"-?\d+(\.?\d+)?", |m: &Matches, at: Position| {
            let value = m.whole().parse().ok()?;
            Some(CalcToken::Number {
                value,
                position: at,
            })
        })?
        .add_rule(r"\+|-|\*|/", |m: &Matches, at: Position| {
            let op = match m.whole() {
                "+" => BinaryOp::Plus,
                "-" => BinaryOp::Minus,
                "*" => BinaryOp::Times,
                _ => BinaryOp::Div,
            };
            Some(CalcToken::Binary { op, position: at })
        })?;
    builder.build()
}

fn read_input() -> io::Result<String> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.as_slice() {
        [] => Ok("1 + 1\n2 * 3".to_string()),
        [dash] if dash == "-" => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
        _ => Ok(args.join(" ")),
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let lexer = match calc_lexer() {
        Ok(lexer) => lexer,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    };
    let input = match read_input() {
        Ok(input) => input,
        Err(err) => {
            eprintln!("error: cannot read input: {err}");
            return ExitCode::FAILURE;
        }
    };

    println!("Line #1");
    for token in lexer.scan_str(&input) {
        match token {
            Ok(CalcToken::LineFeed { line }) => println!("\nLine #{line}"),
            Ok(token) => println!("  {token:?}"),
            Err(err) => {
                eprintln!("error: {err}");
                return ExitCode::FAILURE;
            }
        }
    }
    ExitCode::SUCCESS
}
