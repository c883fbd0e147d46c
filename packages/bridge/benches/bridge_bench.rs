use criterion::{black_box, criterion_group, criterion_main, Criterion};
use liquify_bridge::PipelineAdapter;
use liquify_liquid::extract;

const SECTION: &str = r#"
<style type="text/scss">
  .hero {
    background: {{ section.settings.background }};
    {% if section.settings.full_width %}
    width: 100%;
    {% endif %}
    .title { color: {{ section.settings.title_color | default: "#000" }}; }
  }
</style>
<div class="hero">
  {% for block in section.blocks %}
    <h2 {{ block.shopify_attributes }}>{{ block.settings.title | escape }}</h2>
    {% render 'card', block: block %}
  {% endfor %}
</div>
"#;

fn extract_section(c: &mut Criterion) {
    c.bench_function("extract_section", |b| {
        b.iter(|| extract(black_box(SECTION), ""))
    });
}

fn tokenize_section(c: &mut Criterion) {
    let adapter = PipelineAdapter::style_sheet("");
    c.bench_function("tokenize_section", |b| {
        b.iter(|| adapter.tokenize(black_box(SECTION)))
    });
}

fn round_trip_large(c: &mut Criterion) {
    let source = SECTION.repeat(50);
    let adapter = PipelineAdapter::component("");
    c.bench_function("round_trip_large", |b| {
        b.iter(|| {
            let tokenized = adapter.tokenize(black_box(&source)).unwrap();
            tokenized.hydrate(tokenized.source())
        })
    });
}

criterion_group!(benches, extract_section, tokenize_section, round_trip_large);
criterion_main!(benches);
