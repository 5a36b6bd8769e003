use criterion::{criterion_group, criterion_main, Criterion};
use pathfilter_rs::{ChangeStatus, ChangedFile, FilterSet, PredicateQuantifier};

const CONFIG: &str = "
src:
  - 'src/**'
  - 'crates/*/src/**'
docs:
  - added|modified: ['docs/**', '**/*.md']
ci:
  - '.github/workflows/**'
  - 'scripts/**'
tests:
  - '**/tests/**'
";

const TEST_PATHS: &[&str] = &[
    "src/lib.rs",
    "crates/core/src/parser.rs",
    "docs/guide/intro.md",
    "README.md",
    ".github/workflows/ci.yml",
    "crates/core/tests/parse.rs",
    "assets/logo.svg",
];

fn build_filterset() -> FilterSet {
    pathfilter_rs::from_yaml_str(CONFIG).unwrap()
}

fn matcher_benchmark(c: &mut Criterion) {
    c.bench_function("building", |b| b.iter(build_filterset));

    let filters = build_filterset();
    let files: Vec<ChangedFile> = TEST_PATHS
        .iter()
        .map(|&path| ChangedFile::new(path, ChangeStatus::Modified))
        .collect();
    c.bench_function("matching", |b| {
        b.iter(|| filters.match_files(&files, PredicateQuantifier::Some))
    });
}

criterion_group!(benches, matcher_benchmark);
criterion_main!(benches);
