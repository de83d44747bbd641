//! Calculator lexer example.
//! Defines calculator-style tokens as a rule table and prints them per expression.

use lexer_framework::{ConfigError, Lexer, Matches, Position};

/// Token definition used by the calculator example (kept intentionally small).
#[derive(Debug, Clone, PartialEq)]
pub enum CalcToken {
    Number { value: f64, position: Position },
    Plus { position: Position },
    Minus { position: Position },
    Multiply { position: Position },
    Divide { position: Position },
    Power { position: Position },
    LeftParen { position: Position },
    RightParen { position: Position },
}

fn operator(symbol: &str, position: Position) -> Option<CalcToken> {
    Some(match symbol {
        "+" => CalcToken::Plus { position },
        "-" => CalcToken::Minus { position },
        "*" => CalcToken::Multiply { position },
        "/" => CalcToken::Divide { position },
        "^" => CalcToken::Power { position },
        "(" => CalcToken::LeftParen { position },
        ")" => CalcToken::RightParen { position },
        _ => return None,
    })
}

pub fn calc_lexer() -> Result<Lexer<CalcToken>, ConfigError> {
    let mut builder = Lexer::builder();
    builder
        .add_rule(r"\s+", || {})?
        // Floating-point numbers: `3`, `3.14`, `.5`, `2.`
        .add_rule(r"\d+\.?\d*|\.\d+", |m: &Matches, at: Position| {
            let value = m.whole().parse().ok()?;
            Some(CalcToken::Number {
                value,
                position: at,
            })
        })?
        .add_rule(r"[+\-*/^()]", |m: &Matches, at: Position| operator(m.whole(), at))?;
    builder.build()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let lexer = calc_lexer()?;
    let expressions = vec!["3 + 4", "2 * 3.14", "(1 + 2) * 3", "2 ^ 8", "10 / 2.5"];

    for expr in expressions {
        println!("Expression: {}", expr);
        println!("Tokens:");
        for token in lexer.scan_str(expr) {
            println!("  {:?}", token?);
        }
        println!();
    }
    Ok(())
}
