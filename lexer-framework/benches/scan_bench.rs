use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use lexer_framework::{ConfigError, Lexer, LexerBuilder, Matches, State};

// --- Token Definition ---
#[derive(Debug, Clone, PartialEq)]
enum BenchToken {
    Number(i64),
    Identifier(String),
    Operator(char),
    Newline(usize),
    Unknown(char),
}

#[derive(Debug)]
struct Lines(usize);

impl Default for Lines {
    fn default() -> Self {
        Lines(1)
    }
}

// --- Rules ---

fn first_char(m: &Matches) -> Option<char> {
    m.whole().chars().next()
}

fn compile_rules() -> Result<Lexer<BenchToken>, ConfigError> {
    let mut builder = LexerBuilder::<BenchToken>::new();
    builder.declare_state::<Lines>();
    builder
        .add_rule(r"[ \t]+", || {})?
        .add_rule(r"\n", |mut lines: State<Lines>| {
            lines.0 += 1;
            Some(BenchToken::Newline(lines.0))
        })?
        .add_rule(r"\d+", |m: &Matches| {
            m.whole().parse().ok().map(BenchToken::Number)
        })?
        .add_rule(r"[\p{Alphabetic}_][\p{Alphabetic}\d_]*", |m: &Matches| {
            Some(BenchToken::Identifier(m.whole().to_string()))
        })?
        .add_rule(r"[+\-*/=;(){}]", |m: &Matches| first_char(m).map(BenchToken::Operator))?
        .add_rule(r"(?s:.)", |m: &Matches| first_char(m).map(BenchToken::Unknown))?;
    builder.build()
}

fn bench_lexer_rules() -> Lexer<BenchToken> {
    compile_rules().expect("bench rules should compile")
}

// --- Input Generators ---

fn generate_english(size_kb: usize) -> String {
    let words = [
        "let", "variable", "function", "return", "if", "else", "while", "for", "match",
    ];
    let mut s = String::with_capacity(size_kb * 1024);
    while s.len() < size_kb * 1024 {
        for w in words {
            s.push_str(w);
            s.push_str(" = 12345 + value_");
            s.push_str(w);
            s.push_str(";\n");
        }
    }
    s
}

fn generate_chinese(size_kb: usize) -> String {
    let words = ["变量", "函数", "返回", "如果", "否则", "循环"];
    let mut s = String::with_capacity(size_kb * 1024);
    while s.len() < size_kb * 1024 {
        for w in words {
            s.push_str(w);
            s.push_str(" = 甲乙_");
            s.push_str(w);
            s.push_str(" * 67890;\n");
        }
    }
    s
}

fn generate_emoji(size_kb: usize) -> String {
    // emoji are neither alphabetic nor digits, so they land on the catch-all rule
    let emojis = ["😀", "🚀", "🦀", "💻", "🔥", "✨", "🎉", "📦"];
    let mut s = String::with_capacity(size_kb * 1024);
    while s.len() < size_kb * 1024 {
        for e in emojis {
            s.push_str(e);
            s.push_str(" + ");
        }
        s.push('\n');
    }
    s
}

fn generate_mixed(size_kb: usize) -> String {
    let mut s = String::with_capacity(size_kb * 1024);
    let eng = generate_english(1);
    let cn = generate_chinese(1);
    let emo = generate_emoji(1);

    while s.len() < size_kb * 1024 {
        s.push_str(&eng);
        s.push_str(&cn);
        s.push_str(&emo);
    }
    s
}

// --- Benchmarks ---

fn bench_scan(c: &mut Criterion) {
    let lexer = bench_lexer_rules();
    let mut group = c.benchmark_group("scan");

    let size_kb = 32;
    let inputs = [
        ("english_32kb", generate_english(size_kb)),
        ("chinese_32kb", generate_chinese(size_kb)),
        ("emoji_32kb", generate_emoji(size_kb)),
        ("mixed_32kb", generate_mixed(size_kb)),
    ];

    for (name, text) in &inputs {
        group.throughput(Throughput::Bytes(text.len() as u64));
        group.bench_function(*name, |b| {
            b.iter(|| {
                let tokens = lexer.tokenize(black_box(text.as_bytes()));
                black_box(tokens.map(|tokens| tokens.len()).unwrap_or(0))
            })
        });
    }

    group.finish();
}

fn bench_build(c: &mut Criterion) {
    c.bench_function("build_rules", |b| b.iter(bench_lexer_rules));
}

criterion_group!(benches, bench_scan, bench_build);
criterion_main!(benches);
