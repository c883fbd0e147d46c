use criterion::{black_box, criterion_group, criterion_main, Criterion};
use liquify_bridge::PipelineAdapter;
use liquify_compiler_css::{compile_scss, compile_style, SassCompiler};

fn style_source(rules: usize) -> String {
    let mut source = String::from("$gap: 8px;\n");
    for i in 0..rules {
        source.push_str(&format!(
            ".block-{i} {{\n  padding: $gap;\n  color: {{{{ section.settings.color_{i} }}}};\n  &:hover {{ opacity: 0.8; }}\n  @media (max-width: 600px) {{\n    {{% if section.settings.stack %}}display: block;{{% endif %}}\n  }}\n}}\n"
        ));
    }
    source
}

fn bench_compile_scss(c: &mut Criterion) {
    let tokenized = PipelineAdapter::style_sheet("")
        .tokenize(&style_source(50))
        .expect("bench source tokenizes");
    let source = tokenized.source().to_string();
    c.bench_function("compile_scss_50_rules", |b| {
        b.iter(|| compile_scss(black_box(&source)))
    });
}

fn bench_compile_style(c: &mut Criterion) {
    let source = style_source(50);
    c.bench_function("compile_style_50_rules", |b| {
        b.iter(|| compile_style(black_box(&source), &SassCompiler, ""))
    });
}

criterion_group!(benches, bench_compile_scss, bench_compile_style);
criterion_main!(benches);
