//! Totality checks over mutated and random input.
//!
//! LLM output arrives truncated, with markers dropped or doubled and fences
//! left open. Every variant produced here must convert without panicking,
//! leave no placeholder sentinel behind, and yield properly nested tags
//! with no stray angle brackets.

use telemark_core::{convert, Converter};

struct Lcg {
    state: u64,
}

const SEED: u64 = 0x5eed;
const MAX_VARIANT_LEN: usize = 32_000;
const MAX_MUTATION_STEPS: usize = 4;
const VARIANT_COUNT: usize = 64;
const SOUP_CASES: usize = 500;
const SOUP_MAX_LEN: usize = 200;

type MutationList = &'static [&'static str];

const MUTATIONS: MutationList = &[
    "drop_code_fence_end",
    "drop_backtick",
    "drop_star",
    "double_star",
    "drop_blank_line",
    "truncate_tail",
    "truncate_tail_small",
    "inject_bracket",
    "inject_sentinel",
    "crlf",
];

const SOUP_ALPHABET: &[&str] = &[
    "*", "**", "***", "_", "__", "~~", "||", "`", "```", "[", "]", "(", ")", "!", ">", "**>",
    "#", "- ", " ", "\n", "\n\n\n", "a", "1", "&", "<", "é", "\u{E000}", "\u{E001}",
];

/// Sample answers in the shape chat models produce.
const CORPUS: &[&str] = &[
    r#"# Summary

Here is **what changed** and _why_:

- Fixed the `parse()` bug
- Added ~~old~~ new handling
  * nested item with ||spoiler||

```rust
fn main() {
    println!("<hello> & bye");
}
```

> Note: quoted
> across lines

See [the docs [v2]](https://example.com/docs?a=1&b=2) or ![logo](img.png).
"#,
    r#"**>Expandable details
>hidden line one
>hidden line two

Regular text with 2 * 3 = 6 and x*y, but *italic* here.

***Bold italic*** and ___underline italic___ and __underline__.

1. First
2. Second

Inline `<code>` and `a_b_c` identifiers."#,
    r#"Ось список:

*  **Парадокс кота:** Чи може кіт бути живим? 🤔
*  **Ефект метелика:** Мала зміна. 🦋

```
plain block with **stars** and [brackets](x)
```
| col | col |
|-----|-----|
| a   | b   |
"#,
];

impl Lcg {
    fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_mul(6364136223846793005).wrapping_add(1);
        (self.state >> 32) as u32
    }

    fn choose(&mut self, max: usize) -> usize {
        if max == 0 {
            return 0;
        }
        (self.next_u32() as usize) % max
    }
}

/// Largest char boundary at or below `at`.
fn floor_boundary(text: &str, mut at: usize) -> usize {
    at = at.min(text.len());
    while !text.is_char_boundary(at) {
        at -= 1;
    }
    at
}

fn apply_mutations(mut input: String, mutations: MutationList, rng: &mut Lcg) -> String {
    let steps = 1 + rng.choose(MAX_MUTATION_STEPS);
    for _ in 0..steps {
        let pick = rng.choose(mutations.len());
        match mutations[pick] {
            "drop_code_fence_end" => {
                if let Some(pos) = input.rfind("```") {
                    input.replace_range(pos..pos + 3, "");
                }
            }
            "drop_backtick" => {
                if let Some(pos) = input.find('`') {
                    input.remove(pos);
                }
            }
            "drop_star" => {
                if let Some(pos) = input.rfind('*') {
                    input.remove(pos);
                }
            }
            "double_star" => {
                input = input.replacen("**", "***", 1);
            }
            "drop_blank_line" => {
                if let Some(pos) = input.find("\n\n") {
                    input.replace_range(pos..pos + 2, "\n");
                }
            }
            "truncate_tail" => {
                let len = input.len();
                if len > 8 {
                    let cut = rng.choose(len / 2).max(1);
                    let at = floor_boundary(&input, len - cut);
                    input.truncate(at);
                }
            }
            "truncate_tail_small" => {
                let len = input.len();
                if len > 16 {
                    let cut = rng.choose(len / 20).max(1);
                    let at = floor_boundary(&input, len - cut);
                    input.truncate(at);
                }
            }
            "inject_bracket" => {
                let at = floor_boundary(&input, rng.choose(input.len() + 1));
                input.insert(at, '[');
            }
            "inject_sentinel" => {
                let at = floor_boundary(&input, rng.choose(input.len() + 1));
                input.insert(at, '\u{E000}');
            }
            "crlf" => {
                input = input.replace('\n', "\r\n");
            }
            _ => {}
        }
        if input.len() > MAX_VARIANT_LEN {
            let at = floor_boundary(&input, MAX_VARIANT_LEN);
            input.truncate(at);
            break;
        }
    }
    input
}

fn generate_variants(input: &str, seed: u64, mutations: MutationList) -> Vec<String> {
    let mut rng = Lcg::new(seed);
    (0..VARIANT_COUNT)
        .map(|_| apply_mutations(input.to_string(), mutations, &mut rng))
        .collect()
}

fn marker_soup(rng: &mut Lcg) -> String {
    let len = rng.choose(SOUP_MAX_LEN);
    (0..len)
        .map(|_| SOUP_ALPHABET[rng.choose(SOUP_ALPHABET.len())])
        .collect()
}

/// Every tag the converter can emit, longest forms first. The `">` closing
/// an anchor or a code class goes last.
const EMITTED_TAGS: &[&str] = &[
    "<span class=\"tg-spoiler\">",
    "</span>",
    "<blockquote expandable>",
    "<blockquote>",
    "</blockquote>",
    "<code class=\"language-",
    "<code>",
    "</code>",
    "<pre>",
    "</pre>",
    "<a href=\"",
    "</a>",
    "<b>",
    "</b>",
    "<i>",
    "</i>",
    "<u>",
    "</u>",
    "<s>",
    "</s>",
    "\">",
];

fn check_output(input: &str, output: &str) {
    assert!(
        !output.contains(['\u{E000}', '\u{E001}']),
        "sentinel leaked for input {:?}: {:?}",
        input,
        output
    );

    let mut open: Vec<&str> = Vec::new();
    let mut rest = output;
    while let Some(lt) = rest.find('<') {
        let Some(gt) = rest[lt..].find('>') else {
            break;
        };
        let tag = &rest[lt + 1..lt + gt];
        rest = &rest[lt + gt + 1..];
        let name = tag.trim_start_matches('/').split(' ').next().unwrap_or("");
        if tag.starts_with('/') {
            assert_eq!(
                open.pop(),
                Some(name),
                "crossed </{}> for input {:?}: {:?}",
                name,
                input,
                output
            );
        } else {
            open.push(name);
        }
    }
    assert!(
        open.is_empty(),
        "unclosed {:?} for input {:?}: {:?}",
        open,
        input,
        output
    );

    let mut rest = output.to_string();
    for tag in EMITTED_TAGS {
        rest = rest.replace(tag, "");
    }
    assert!(
        !rest.contains(['<', '>']),
        "stray angle bracket for input {:?}: {:?}",
        input,
        output
    );
}

// ============================================================================
// Mutation Tests
// ============================================================================

#[test]
fn test_corpus_converts_cleanly() {
    for sample in CORPUS {
        check_output(sample, &convert(sample));
    }
}

#[test]
fn test_mutated_corpus_converts_cleanly() {
    for (i, sample) in CORPUS.iter().enumerate() {
        for variant in generate_variants(sample, SEED + i as u64, MUTATIONS) {
            check_output(&variant, &convert(&variant));
        }
    }
}

#[test]
fn test_every_streaming_prefix_converts_cleanly() {
    for sample in CORPUS {
        for (at, _) in sample.char_indices() {
            let prefix = &sample[..at];
            check_output(prefix, &convert(prefix));
        }
    }
}

#[test]
fn test_marker_soup_converts_cleanly() {
    let mut rng = Lcg::new(SEED);
    for _ in 0..SOUP_CASES {
        let soup = marker_soup(&mut rng);
        check_output(&soup, &convert(&soup));
    }
}

#[test]
fn test_recovery_output_matches_plain_conversion() {
    let converter = Converter::new();
    for (i, sample) in CORPUS.iter().enumerate() {
        for variant in generate_variants(sample, SEED ^ i as u64, MUTATIONS) {
            let result = converter.convert_with_recovery(&variant);
            assert!(!result.has_fatal_errors());
            assert!(result.errors.len() <= 2);
            assert_eq!(result.output, convert(&variant));
        }
    }
}

#[test]
fn test_size_ceiling_holds_for_all_variants() {
    let converter = Converter::new().with_max_input_len(256);
    for variant in generate_variants(CORPUS[0], SEED, MUTATIONS) {
        let result = converter.convert(&variant);
        assert_eq!(result.is_err(), variant.len() > 256, "input {:?}", variant);
    }
}

// ============================================================================
// Pathological Input Tests
// ============================================================================

#[test]
fn test_long_unclosed_runs_finish() {
    let inputs = [
        "*a ".repeat(50_000),
        "**a ".repeat(50_000),
        "||a ".repeat(50_000),
        "[[]".repeat(50_000),
        "[a](".repeat(50_000),
        "> x\n".repeat(50_000),
        "`a` ".repeat(50_000),
    ];
    for input in &inputs {
        let output = convert(input);
        assert!(!output.is_empty());
    }
}
