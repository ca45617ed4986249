//! Randomized example-program generation.
//!
//! Each supported topic owns a pair of templates — a simple variant and a
//! nested/multi-statement variant — whose slots are filled from fixed value
//! pools (operators, function names, string methods, sample texts) and
//! bounded random integers. The random source is injected: the same
//! `(topic, complexity, seed)` always produces the same text, which is what
//! makes generation testable.
//!
//! Operands that can land in a divisor position are drawn from a pool that
//! excludes zero, so a generated example never faults on division by zero.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::types::GeneratedExample;

/// Returned for a topic with no generator templates. Display text, not an error.
pub const FALLBACK_EXAMPLE: &str = "# Example not available for this concept";

/// Topics with generator templates, in display order.
pub const GENERATOR_TOPICS: &[&str] = &["math", "loops", "strings", "functions"];

// ── Value pools ──────────────────────────────────────────────────────────────

const OPERATORS: &[&str] = &["+", "-", "*", "/", "//", "%", "**"];
const FUNCTION_NAMES: &[&str] = &["calculate", "process", "compute", "analyze", "transform"];
const STRING_METHODS: &[&str] = &["upper", "lower", "title", "strip"];
const SAMPLE_TEXTS: &[&str] = &["Hello World", "Python Programming", "Learn to Code"];

/// `true` if `op` divides by its right-hand operand.
fn divides(op: &str) -> bool {
    matches!(op, "/" | "//" | "%")
}

fn pick<'a, R: Rng + ?Sized>(rng: &mut R, pool: &[&'a str]) -> &'a str {
    pool.choose(rng).copied().expect("value pools are non-empty")
}

fn left_operand<R: Rng + ?Sized>(rng: &mut R) -> i64 {
    rng.gen_range(0..=10)
}

/// Draw a right-hand operand for `op` — never zero when `op` divides by it.
fn right_operand<R: Rng + ?Sized>(rng: &mut R, op: &str) -> i64 {
    if divides(op) {
        rng.gen_range(1..=10)
    } else {
        rng.gen_range(0..=10)
    }
}

fn binary_operands<R: Rng + ?Sized>(rng: &mut R, op: &str) -> (i64, i64) {
    let left = left_operand(rng);
    let right = right_operand(rng, op);
    (left, right)
}

// ── Public API ───────────────────────────────────────────────────────────────

/// Whether `topic` has generator templates.
pub fn supports(topic: &str) -> bool {
    GENERATOR_TOPICS.contains(&topic)
}

/// Generate one example for `topic`.
///
/// `complexity` 1 selects the simple template; 2 and above select the
/// nested/multi-statement variant. Unknown topics yield
/// [`FALLBACK_EXAMPLE`] — never an error. The output is always non-empty
/// and syntactically valid Python.
pub fn generate<R: Rng + ?Sized>(rng: &mut R, topic: &str, complexity: u8) -> String {
    match topic {
        "math" => math_example(rng, complexity),
        "loops" => loop_example(rng, complexity),
        "strings" => string_example(rng, complexity),
        "functions" => function_example(rng, complexity),
        _ => FALLBACK_EXAMPLE.to_string(),
    }
}

/// Generate exactly `count` labeled examples for `topic`.
///
/// Labels run `"Example 1"` through `"Example N"`. Complexity escalates every
/// two examples: entries 1–2 use complexity 1, entries 3–4 complexity 2, and
/// so on — non-decreasing across the sequence.
pub fn generate_batch<R: Rng + ?Sized>(
    rng: &mut R,
    topic: &str,
    count: usize,
) -> Vec<GeneratedExample> {
    (0..count)
        .map(|i| GeneratedExample {
            label: format!("Example {}", i + 1),
            source: generate(rng, topic, (i / 2 + 1) as u8),
        })
        .collect()
}

// ── Per-topic templates ──────────────────────────────────────────────────────

fn math_example<R: Rng + ?Sized>(rng: &mut R, complexity: u8) -> String {
    if complexity <= 1 {
        let op = pick(rng, OPERATORS);
        let (a, b) = binary_operands(rng, op);
        format!("# Simple math operation\nresult = {a} {op} {b}\nprint(result)\n")
    } else {
        let name = pick(rng, FUNCTION_NAMES);
        let mut ops = OPERATORS.choose_multiple(rng, 2);
        let op1 = *ops.next().expect("two operators sampled");
        let op2 = *ops.next().expect("two operators sampled");
        // x feeds op1's left side; y is op1's divisor, z is op2's.
        let x = left_operand(rng);
        let y = right_operand(rng, op1);
        let z = right_operand(rng, op2);
        format!(
            "# Combined math operations\n\
             def {name}(x, y, z):\n\
             \x20   result = (x {op1} y) {op2} z\n\
             \x20   return result\n\
             \n\
             # Test the function\n\
             print({name}({x}, {y}, {z}))\n"
        )
    }
}

fn loop_example<R: Rng + ?Sized>(rng: &mut R, complexity: u8) -> String {
    if complexity <= 1 {
        let n: i64 = rng.gen_range(5..=10);
        format!(
            "# Simple loop\n\
             for i in range({n}):\n\
             \x20   print(f\"Iteration {{i}}\")\n"
        )
    } else {
        let n: i64 = rng.gen_range(3..=6);
        let m: i64 = rng.gen_range(2..=4);
        format!(
            "# Nested loop with condition\n\
             for i in range({n}):\n\
             \x20   for j in range({m}):\n\
             \x20       if (i + j) % 2 == 0:\n\
             \x20           print(f\"i: {{i}}, j: {{j}}\")\n"
        )
    }
}

fn string_example<R: Rng + ?Sized>(rng: &mut R, complexity: u8) -> String {
    let text = pick(rng, SAMPLE_TEXTS);
    let method = pick(rng, STRING_METHODS);
    if complexity <= 1 {
        format!(
            "# String method call\n\
             text = '{text}'\n\
             print(text.{method}())\n"
        )
    } else {
        format!(
            "# Rebuild the text one character at a time\n\
             text = '{text}'\n\
             pieces = [ch.{method}() for ch in text]\n\
             print(''.join(pieces))\n"
        )
    }
}

fn function_example<R: Rng + ?Sized>(rng: &mut R, complexity: u8) -> String {
    let name = pick(rng, FUNCTION_NAMES);
    if complexity <= 1 {
        let op = pick(rng, OPERATORS);
        let (a, b) = binary_operands(rng, op);
        format!(
            "# Define and call a function\n\
             def {name}(a, b):\n\
             \x20   return a {op} b\n\
             \n\
             print({name}({a}, {b}))\n"
        )
    } else {
        let limit: i64 = rng.gen_range(4..=8);
        let step = pick(rng, &["+", "-"]);
        format!(
            "# Function with a loop inside\n\
             def {name}(limit):\n\
             \x20   total = 0\n\
             \x20   for i in range(limit):\n\
             \x20       total = total {step} i\n\
             \x20   return total\n\
             \n\
             print({name}({limit}))\n"
        )
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// Slot tokens from the template definitions; none may survive into output.
    const SLOT_TOKENS: &[&str] = &[
        "{op}", "{op1}", "{op2}", "{a}", "{b}", "{x}", "{y}", "{z}", "{n}", "{m}", "{name}",
        "{method}", "{text}", "{limit}", "{step}",
    ];

    #[test]
    fn test_generate_non_empty_no_unresolved_slots() {
        let mut rng = StdRng::seed_from_u64(7);
        for topic in GENERATOR_TOPICS {
            for complexity in [1u8, 2] {
                let source = generate(&mut rng, topic, complexity);
                assert!(!source.is_empty(), "{topic}/{complexity} produced empty text");
                for token in SLOT_TOKENS {
                    assert!(
                        !source.contains(token),
                        "{topic}/{complexity} left slot {token} unresolved:\n{source}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_generate_deterministic_under_fixed_seed() {
        for topic in GENERATOR_TOPICS {
            for complexity in [1u8, 2] {
                let first = generate(&mut StdRng::seed_from_u64(42), topic, complexity);
                let second = generate(&mut StdRng::seed_from_u64(42), topic, complexity);
                assert_eq!(first, second, "{topic}/{complexity} not deterministic");
            }
        }
    }

    #[test]
    fn test_unknown_topic_yields_fallback() {
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(generate(&mut rng, "databases", 1), FALLBACK_EXAMPLE);
        assert_eq!(generate(&mut rng, "", 2), FALLBACK_EXAMPLE);
    }

    #[test]
    fn test_supports_matches_topic_list() {
        assert!(supports("math"));
        assert!(supports("loops"));
        assert!(supports("strings"));
        assert!(supports("functions"));
        assert!(!supports("variables"));
    }

    #[test]
    fn test_batch_is_exactly_sized_and_labeled() {
        let mut rng = StdRng::seed_from_u64(1);
        let batch = generate_batch(&mut rng, "loops", 5);
        assert_eq!(batch.len(), 5);
        for (i, example) in batch.iter().enumerate() {
            assert_eq!(example.label, format!("Example {}", i + 1));
            assert!(!example.source.is_empty());
        }
    }

    // Complexity escalates every two entries: 1, 1, 2, 2, 3.
    #[test]
    fn test_batch_complexity_escalates_every_two() {
        let mut rng = StdRng::seed_from_u64(9);
        let batch = generate_batch(&mut rng, "math", 5);
        for example in &batch[..2] {
            assert!(
                example.source.starts_with("# Simple math operation"),
                "entries 1-2 should be simple:\n{}",
                example.source
            );
        }
        for example in &batch[2..] {
            assert!(
                example.source.starts_with("# Combined math operations"),
                "entries 3+ should be the nested variant:\n{}",
                example.source
            );
        }
    }

    #[test]
    fn test_batch_zero_count_is_empty() {
        let mut rng = StdRng::seed_from_u64(3);
        assert!(generate_batch(&mut rng, "math", 0).is_empty());
    }

    // The divisor guard: right operands are never zero under a dividing operator.
    #[test]
    fn test_binary_operands_never_zero_divisor() {
        let mut rng = StdRng::seed_from_u64(1234);
        for _ in 0..500 {
            for op in OPERATORS {
                let (_, right) = binary_operands(&mut rng, op);
                if divides(op) {
                    assert_ne!(right, 0, "zero divisor drawn for '{op}'");
                }
            }
        }
    }

    // Literal divisor positions in rendered text: "op 0" must never appear.
    #[test]
    fn test_rendered_examples_never_divide_by_zero_literal() {
        let mut rng = StdRng::seed_from_u64(99);
        for _ in 0..500 {
            for topic in ["math", "functions"] {
                for complexity in [1u8, 2] {
                    let source = generate(&mut rng, topic, complexity);
                    assert!(
                        !source.contains("/ 0") && !source.contains("% 0"),
                        "{topic}/{complexity} rendered a zero divisor:\n{source}"
                    );
                }
            }
        }
    }
}
