//! Prompt templates with two positional `%s` slots: output language, then prompt body.

use once_cell::sync::Lazy;
use std::collections::HashMap;

pub const DEFAULT_PROMPT: &str = "Simplify the following Kubernetes error message delimited by triple dashes written in --- %s --- language; --- %s ---.
	Provide the most possible solution in a step by step style in no more than 280 characters. Write the output in the following format:
	Error: {Explain error here}
	Solution: {Step by step solution here}
	";

pub const TRIVY_VULNERABILITY_PROMPT: &str = "Explain the following trivy scan result and the detail risk or root cause of the CVE ID, then provide a solution. Response in %s: %s";

pub const TRIVY_CONFIG_AUDIT_PROMPT: &str = "Explain the following trivy scan result and the detail risk or root cause of the security check, then provide a solution. Response in %s: %s";

/// Named templates, keyed the way analyzers refer to them.
pub static PROMPT_MAP: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("default", DEFAULT_PROMPT),
        ("VulnerabilityReport", TRIVY_VULNERABILITY_PROMPT),
        ("ConfigAuditReport", TRIVY_CONFIG_AUDIT_PROMPT),
    ])
});

/// Look up a named template, falling back to the default one.
pub fn template_for(name: &str) -> &'static str {
    PROMPT_MAP.get(name).copied().unwrap_or(DEFAULT_PROMPT)
}

/// Number of `%s` slots in `template` (`%%` is a literal percent sign).
pub fn slot_count(template: &str) -> usize {
    let mut count = 0;
    let mut chars = template.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '%' {
            continue;
        }
        match chars.peek() {
            Some('s') => {
                count += 1;
                chars.next();
            }
            Some('%') => {
                chars.next();
            }
            _ => {}
        }
    }
    count
}

/// Render `template` with `language` in the first slot and `prompt` in the
/// second. An empty template renders the default one.
///
/// Substituted text is never rescanned, so a prompt that itself contains
/// `%s` is sent verbatim. Slots beyond the second are left as-is.
pub fn render(template: &str, language: &str, prompt: &str) -> String {
    let template = if template.is_empty() {
        DEFAULT_PROMPT
    } else {
        template
    };

    let mut args = [language, prompt].into_iter();
    let mut out = String::with_capacity(template.len() + language.len() + prompt.len());
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        match chars.peek() {
            Some('%') => {
                chars.next();
                out.push('%');
            }
            Some('s') => {
                chars.next();
                match args.next() {
                    Some(arg) => out.push_str(arg),
                    None => out.push_str("%s"),
                }
            }
            _ => out.push('%'),
        }
    }

    out
}
