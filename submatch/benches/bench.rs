use criterion::{Criterion, black_box, criterion_group, criterion_main};
use submatch::Registry;

fn date_registry() -> Registry {
    let mut registry = Registry::standard();
    registry.add("year", "(?<year>(?:19|20)\\d\\d)");
    registry.add("month", "(?<month>${range(1,12,2)})");
    registry.add("day", "(?<day>${range(1,31,2)})");
    registry.add("date", "${year}-${month}-${day}");
    registry.add("date", "${day}/${month}/${year}");
    registry
}

fn bench_compile(c: &mut Criterion) {
    c.bench_function("compile_nested", |b| {
        b.iter(|| {
            let registry = date_registry();
            black_box(registry.compile(black_box("on ${date}")).unwrap())
        })
    });
}

fn bench_compile_memoized(c: &mut Criterion) {
    let registry = date_registry();
    registry.compile("${date}").unwrap();

    c.bench_function("compile_memoized", |b| {
        b.iter(|| black_box(registry.compile(black_box("on ${date}")).unwrap()))
    });
}

fn bench_find(c: &mut Criterion) {
    let compiled = date_registry().compile("on ${date}").unwrap();
    let input = "the meeting was moved twice and now happens on 14/03/2025 at noon";

    c.bench_function("find", |b| {
        b.iter(|| black_box(compiled.find(black_box(input))))
    });
}

fn bench_sub_match(c: &mut Criterion) {
    let compiled = date_registry().compile("on ${date}").unwrap();
    let input = "on 2025-03-14";

    c.bench_function("sub_match", |b| {
        b.iter(|| {
            let m = compiled.find(black_box(input)).unwrap();
            let date = m.sub_match("date").unwrap();
            black_box(date.sub_match("day").map(|d| d.as_str()))
        })
    });
}

fn bench_find_iter(c: &mut Criterion) {
    let compiled = date_registry().compile("${date}").unwrap();
    let input = "2024-01-02, 03/04/2024, 2025-12-31 and 31/12/1999";

    c.bench_function("find_iter_dates", |b| {
        b.iter(|| black_box(compiled.find_iter(black_box(input)).count()))
    });
}

criterion_group!(
    benches,
    bench_compile,
    bench_compile_memoized,
    bench_find,
    bench_sub_match,
    bench_find_iter
);
criterion_main!(benches);
