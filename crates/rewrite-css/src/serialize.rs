//! Printing the rewritten rule tree back to CSS text.
//!
//! Rules print through lightningcss, except `@import`, whose target is
//! always written in the `url("...")` form regardless of how it was spelled.

use lightningcss::error::PrinterError;
use lightningcss::rules::CssRule;
use lightningcss::rules::import::ImportRule;
use lightningcss::rules::supports::SupportsCondition;
use lightningcss::stylesheet::{PrinterOptions, StyleSheet};
use lightningcss::traits::ToCss;

use crate::extract::wrap_url;

fn printer_options(minify: bool) -> PrinterOptions<'static> {
    PrinterOptions {
        minify,
        ..PrinterOptions::default()
    }
}

/// Print every top-level rule in document order.
pub(crate) fn print_stylesheet(
    stylesheet: &StyleSheet<'_>,
    minify: bool,
) -> Result<String, PrinterError> {
    let mut out = String::new();
    let mut first = true;
    let mut last_without_block = false;

    for rule in &stylesheet.rules.0 {
        if matches!(rule, CssRule::Ignored) {
            continue;
        }
        let without_block = matches!(
            rule,
            CssRule::Import(_) | CssRule::Namespace(_) | CssRule::LayerStatement(_)
        );

        if !first && !minify {
            out.push('\n');
            // Consecutive statements stay together, blocks get a blank line.
            if !(last_without_block && without_block) {
                out.push('\n');
            }
        }
        first = false;

        match rule {
            CssRule::Import(import) => out.push_str(&print_import(import, minify)?),
            rule => out.push_str(&rule.to_css_string(printer_options(minify))?),
        }
        last_without_block = without_block;
    }

    if !minify && !out.is_empty() {
        out.push('\n');
    }
    Ok(out)
}

/// `@import url("<target>") [layer[(name)]] [supports(...)] [media];`
pub(crate) fn print_import(import: &ImportRule<'_>, minify: bool) -> Result<String, PrinterError> {
    let mut out = String::from("@import ");
    out.push_str(&wrap_url(&import.url)?);

    if let Some(layer) = &import.layer {
        out.push_str(" layer");
        if let Some(name) = layer {
            out.push('(');
            out.push_str(&name.to_css_string(printer_options(minify))?);
            out.push(')');
        }
    }

    if let Some(supports) = &import.supports {
        out.push_str(" supports");
        // A lone declaration already prints its own parentheses.
        if matches!(supports, SupportsCondition::Declaration { .. }) {
            out.push_str(&supports.to_css_string(printer_options(minify))?);
        } else {
            out.push('(');
            out.push_str(&supports.to_css_string(printer_options(minify))?);
            out.push(')');
        }
    }

    if !import.media.media_queries.is_empty() {
        out.push(' ');
        out.push_str(&import.media.to_css_string(printer_options(minify))?);
    }

    out.push(';');
    Ok(out)
}
