//! Local fallback generator
//!
//! The availability backstop: a pure function from prompt text to a
//! complete, self-contained page. No I/O, no randomness, no network
//! resources, and it never fails, so the system can always render
//! something even with zero external dependencies reachable.

/// Generate a deterministic baseline document from a prompt.
#[must_use]
pub fn generate(prompt: &str) -> String {
    let prompt = prompt.trim();
    let title = if prompt.is_empty() {
        "Your new site".to_string()
    } else {
        escape_html(&leading_words(prompt, 8))
    };
    let tagline = if prompt.is_empty() {
        "Describe the site you want and refine it from there.".to_string()
    } else {
        escape_html(prompt)
    };
    let hue = prompt_hue(prompt);

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<style>
  :root {{ --accent: hsl({hue}, 70%, 45%); --accent-soft: hsl({hue}, 70%, 92%); }}
  body {{ margin: 0; font-family: system-ui, sans-serif; color: #1a1a1a; }}
  header {{ background: linear-gradient(135deg, var(--accent), var(--accent-soft)); padding: 6rem 2rem; text-align: center; color: #fff; }}
  header h1 {{ margin: 0 0 1rem; font-size: 2.5rem; }}
  header p {{ margin: 0 auto; max-width: 40rem; opacity: 0.9; }}
  main {{ display: grid; grid-template-columns: repeat(auto-fit, minmax(14rem, 1fr)); gap: 1.5rem; padding: 3rem 2rem; max-width: 64rem; margin: 0 auto; }}
  main article {{ border: 1px solid #e4e4e4; border-radius: 0.75rem; padding: 1.5rem; }}
  main h2 {{ margin-top: 0; color: var(--accent); }}
  footer {{ padding: 2rem; text-align: center; color: #777; font-size: 0.875rem; }}
</style>
</head>
<body>
<header id="hero">
<h1>{title}</h1>
<p>{tagline}</p>
</header>
<main id="features">
<article><h2>Fast</h2><p>Generated in place, ready to refine.</p></article>
<article><h2>Self-contained</h2><p>One file, no external resources.</p></article>
<article><h2>Editable</h2><p>Ask for changes and only the targeted section moves.</p></article>
</main>
<footer id="footer">Drafted locally from your prompt.</footer>
</body>
</html>"#
    )
}

/// First `count` whitespace-separated words of the prompt.
fn leading_words(prompt: &str, count: usize) -> String {
    prompt
        .split_whitespace()
        .take(count)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Stable accent hue in `0..360` derived from the prompt bytes (FNV-1a).
fn prompt_hue(prompt: &str) -> u32 {
    let mut hash: u32 = 0x811c_9dc5;
    for byte in prompt.bytes() {
        hash ^= u32::from(byte);
        hash = hash.wrapping_mul(0x0100_0193);
    }
    hash % 360
}

fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic_for_same_prompt() {
        assert_eq!(generate("a coffee shop"), generate("a coffee shop"));
    }

    #[test]
    fn different_prompts_differ() {
        assert_ne!(generate("a coffee shop"), generate("a record store"));
    }

    #[test]
    fn empty_prompt_still_produces_a_page() {
        let html = generate("");
        assert!(html.contains("<html"));
        assert!(html.contains("Your new site"));
    }

    #[test]
    fn output_is_a_complete_document() {
        let html = generate("portfolio for a photographer");
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("</html>"));
        assert!(html.contains(r#"<header id="hero">"#));
        assert!(html.contains(r#"<main id="features">"#));
    }

    #[test]
    fn no_network_resources() {
        let html = generate("landing page");
        assert!(!html.contains("http://"));
        assert!(!html.contains("https://"));
    }

    #[test]
    fn prompt_text_is_escaped() {
        let html = generate("<script>alert('x')</script>");
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn hue_is_stable_and_bounded() {
        assert_eq!(prompt_hue("abc"), prompt_hue("abc"));
        assert!(prompt_hue("anything at all") < 360);
    }

    #[test]
    fn title_is_capped_to_leading_words() {
        let long = "one two three four five six seven eight nine ten";
        assert_eq!(leading_words(long, 8), "one two three four five six seven eight");
    }
}
