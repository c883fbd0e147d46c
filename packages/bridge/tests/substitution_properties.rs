use liquify_bridge::{Host, PipelineAdapter, Restore};
use liquify_liquid::{extract, generate_token, TOKEN_WIDTH};
use proptest::prelude::*;

const SECTION: &str = r#"{% comment %}Hero banner{% endcomment %}
<section class="hero hero--{{ section.settings.layout }}" data-id="{{ section.id }}">
  {%- if section.settings.heading != blank -%}
    <h1>{{ section.settings.heading | escape }}</h1>
  {%- endif -%}
  {% for block in section.blocks %}{{ block.settings.text }}{% endfor %}
  <img src="{{ section.settings.image | image_url: width: 1200 }}" alt="{{ "Hero" | t }}">
</section>"#;

fn hosts() -> [PipelineAdapter; 3] {
    [
        PipelineAdapter::style_sheet("salt"),
        PipelineAdapter::markup("salt"),
        PipelineAdapter::component("salt"),
    ]
}

#[test]
fn test_round_trip_identity_for_every_host() {
    for adapter in hosts() {
        let tokenized = adapter.tokenize(SECTION).unwrap();
        let hydrated = tokenized.hydrate_with(tokenized.source(), Restore::Original);
        assert_eq!(hydrated.output, SECTION, "host {:?}", adapter.host());
        assert!(hydrated.is_complete());
    }
}

#[test]
fn test_tokenized_text_has_no_liquid_delimiters() {
    for adapter in hosts() {
        if adapter.host() == Host::Markup {
            continue;
        }
        let tokenized = adapter.tokenize(SECTION).unwrap();
        assert!(!tokenized.source().contains("{{"));
        assert!(!tokenized.source().contains("{%"));
    }
}

#[test]
fn test_tokens_are_deterministic() {
    let first = PipelineAdapter::component("salt").tokenize(SECTION).unwrap();
    let second = PipelineAdapter::component("salt").tokenize(SECTION).unwrap();
    assert_eq!(first.source(), second.source());

    let fragments = extract("{{ a }} {% if b %} {{ a }}", "salt");
    assert_eq!(fragments.variables[0].token, fragments.variables[1].token);
    assert_eq!(
        fragments.variables[0].token,
        generate_token("{{ a }}", "salt")
    );
}

#[test]
fn test_whitespace_reformatting_recovers_fragments() {
    let adapter = PipelineAdapter::style_sheet("");
    let source = ".a{color:{{ settings.color }};{% if x %}margin:0;{% endif %}}";
    let tokenized = adapter.tokenize(source).unwrap();

    // A printer that puts every statement on its own indented line
    let reformatted = tokenized
        .source()
        .replace('{', " {\n  ")
        .replace(';', ";\n  ")
        .replace('}', "\n}\n");

    let hydrated = tokenized.hydrate(&reformatted);
    assert!(hydrated.is_complete());
    for fragment in tokenized.fragments().ordered() {
        assert!(
            hydrated.output.contains(&fragment.source),
            "missing {}",
            fragment.source
        );
    }
}

#[test]
fn test_hydration_leaves_lookalike_numbers_alone() {
    let adapter = PipelineAdapter::component("");
    let source = "<p>{{ price }}</p>";
    let tokenized = adapter.tokenize(source).unwrap();
    let token = tokenized.fragments().variables[0].token;

    // Transform output that happens to contain the token's digits inside
    // other numeric literals
    let transformed = format!(
        "const big = 9{token}; const frac = 0.{token}; const tail = {token}1;\n{}",
        tokenized.source()
    );
    let hydrated = tokenized.hydrate(&transformed);

    assert!(hydrated.output.contains(&format!("9{token};")));
    assert!(hydrated.output.contains(&format!("0.{token};")));
    assert!(hydrated.output.contains(&format!("{token}1;")));
    assert!(hydrated.output.ends_with("<p>{{ price }}</p>"));
}

#[test]
fn test_dropped_placeholder_is_a_miss() {
    let adapter = PipelineAdapter::style_sheet("");
    let hydrated = adapter
        .run("a { b: {{ unused }}; c: {{ kept }}; }", "style", |tokenized| {
            let kept = tokenized.split(';').nth(1).unwrap_or_default();
            Ok(format!("a {{{kept}; }}"))
        })
        .unwrap();

    assert_eq!(hydrated.misses.len(), 1);
    assert_eq!(hydrated.misses[0].source, "{{ unused }}");
    assert!(hydrated.output.contains("c: {{ kept }}"));
}

/// Host text free of digits, braces and the characters that join numbers
/// or comments, so it can never be mistaken for a placeholder
fn host_text_strategy() -> impl Strategy<Value = String> {
    "[a-z <>/=;:\"#\n]{0,12}"
}

fn variable_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-z]{1,6}".prop_map(|name| format!("{{{{ {} }}}}", name)),
        ("[a-z]{1,6}", "[a-z]{1,6}").prop_map(|(a, b)| format!("{{{{ {}.{} }}}}", a, b)),
        "[a-z]{1,6}".prop_map(|name| format!("{{{{ {} | upcase }}}}", name)),
    ]
}

fn tag_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-z]{1,6}".prop_map(|name| format!("{{% if {} %}}", name)),
        Just("{% endif %}".to_string()),
        ("[a-z]{1,6}", "[a-z]{1,6}").prop_map(|(a, b)| format!("{{% assign {} = {} %}}", a, b)),
    ]
}

/// Host text interleaved with Liquid fragments
fn template_strategy() -> impl Strategy<Value = String> {
    let piece = prop_oneof![host_text_strategy(), variable_strategy(), tag_strategy()];
    prop::collection::vec(piece, 0..12).prop_map(|pieces| pieces.concat())
}

fn host_strategy() -> impl Strategy<Value = PipelineAdapter> {
    prop_oneof![
        "[a-z]{0,4}".prop_map(|salt| PipelineAdapter::style_sheet(salt)),
        "[a-z]{0,4}".prop_map(|salt| PipelineAdapter::markup(salt)),
        "[a-z]{0,4}".prop_map(|salt| PipelineAdapter::component(salt)),
    ]
}

proptest! {
    #[test]
    fn test_untouched_tokenized_text_hydrates_to_the_source(
        source in template_strategy(),
        adapter in host_strategy(),
    ) {
        let tokenized = adapter.tokenize(&source).unwrap();
        let hydrated = tokenized.hydrate_with(tokenized.source(), Restore::Original);
        prop_assert_eq!(hydrated.output, source);
        prop_assert!(hydrated.misses.is_empty());
    }

    #[test]
    fn test_tokenizing_is_repeatable(source in template_strategy(), salt in "[a-z]{0,8}") {
        let first = PipelineAdapter::component(salt.clone()).tokenize(&source).unwrap();
        let second = PipelineAdapter::component(salt).tokenize(&source).unwrap();
        prop_assert_eq!(first.source(), second.source());
    }

    #[test]
    fn test_tokens_depend_only_on_text_and_salt(text in ".{0,40}", salt in ".{0,8}") {
        let token = generate_token(&text, &salt);
        prop_assert_eq!(token, generate_token(&text, &salt));
        prop_assert_eq!(token.to_string().len(), TOKEN_WIDTH);
    }

    #[test]
    fn test_token_digits_inside_other_numbers_survive(
        name in "[a-z]{1,6}",
        digits in "[1-9][0-9]{0,13}",
    ) {
        let source = format!("<p>{{{{ {} }}}}</p>", name);
        let tokenized = PipelineAdapter::component("").tokenize(&source).unwrap();
        let token = tokenized.fragments().variables[0].token;

        let lookalikes = [
            format!("{}{}", digits, token),
            format!("{}{}", token, digits),
            format!("0.{}", token),
            format!("{}.5", token),
        ];
        let transformed = format!("{} {}", lookalikes.join(" "), tokenized.source());
        let hydrated = tokenized.hydrate(&transformed);

        for lookalike in &lookalikes {
            prop_assert!(hydrated.output.contains(lookalike.as_str()), "lost {}", lookalike);
        }
        prop_assert!(hydrated.output.ends_with(&source));
    }
}
