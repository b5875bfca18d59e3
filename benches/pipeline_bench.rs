use arithc::{emit, generate, lex, optimize, parse, Compiler, ScalarType, TypeMap};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

const STATEMENT: &str = "total = (price * qty + 2.5) / (rate - 1) * (a + b * (c - 4))";

fn type_hints() -> TypeMap {
    [
        ("price", ScalarType::Float),
        ("qty", ScalarType::Int),
        ("rate", ScalarType::Float),
        ("a", ScalarType::Int),
        ("b", ScalarType::Int),
        ("c", ScalarType::Int),
    ]
    .into_iter()
    .collect()
}

fn lexer_benchmark(c: &mut Criterion) {
    c.bench_function("lex statement", |b| {
        b.iter(|| lex(black_box(STATEMENT)).unwrap())
    });
}

fn backend_benchmark(c: &mut Criterion) {
    let types = type_hints();
    let (tokens, _) = lex(STATEMENT).unwrap();
    let tree = arithc::analyze(&parse(tokens).unwrap(), &types);
    let ir = generate(&tree);

    c.bench_function("optimize IR", |b| b.iter(|| optimize(black_box(&ir))));

    let optimized = optimize(&ir);
    c.bench_function("emit assembly", |b| {
        b.iter(|| emit(black_box(&optimized), &types))
    });
}

fn pipeline_benchmark(c: &mut Criterion) {
    let types = type_hints();
    let compiler = Compiler::default();

    c.bench_function("compile statement", |b| {
        b.iter(|| compiler.compile(black_box(STATEMENT), &types).unwrap())
    });
}

criterion_group!(benches, lexer_benchmark, backend_benchmark, pipeline_benchmark);
criterion_main!(benches);
