use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use spn_parser::Parser;

fn program(source: &str) {
    let _ast = Parser::new().parse(&source.into()).unwrap();
}

fn long_expr(c: &mut Criterion) {
    let mut group = c.benchmark_group("long-expr");

    let mut source = "1".to_string();
    for _i in 0..1000 {
        source.push_str(" + 1");
    }
    source.push(';');
    group.throughput(Throughput::Bytes(source.len() as u64));
    group.bench_function("long-expr", |b| b.iter(|| program(&source)));
}

fn stress_precedence(c: &mut Criterion) {
    let mut group = c.benchmark_group("stress-precedence");

    let mut source = "1".to_string();
    for _i in 0..200 {
        source.push_str(" == 2 < 3 + 5 * 5 .. a[0] || b && c");
    }
    source.push(';');
    group.throughput(Throughput::Bytes(source.len() as u64));
    group.bench_function("stress-precedence", |b| b.iter(|| program(&source)));
}

fn assignment_chain(c: &mut Criterion) {
    let mut group = c.benchmark_group("assignment-chain");

    let mut source = "a".to_string();
    for _i in 0..1000 {
        source.push_str(" = a");
    }
    source.push(';');
    group.throughput(Throughput::Bytes(source.len() as u64));
    group.bench_function("assignment-chain", |b| b.iter(|| program(&source)));
}

fn statements(c: &mut Criterion) {
    let mut group = c.benchmark_group("statements");

    let mut source = String::new();
    for i in 0..200 {
        source.push_str(&format!(
            "function f{}(a, b) {{ var x = a, y; if x {{ return b; }} else {{ foreach k as v in a {{ y = v; }} }} }}\n",
            i
        ));
    }
    group.throughput(Throughput::Bytes(source.len() as u64));
    group.bench_function("statements", |b| b.iter(|| program(&source)));
}

criterion_group!(benches, long_expr, stress_precedence, assignment_chain, statements);
criterion_main!(benches);
