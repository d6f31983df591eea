//! Token substitution into SVG templates.

use std::path::Path;

use tracing::debug;

use weather_common::{DisplayError, DisplayResult};

use crate::context::RenderContext;

/// Replace every `$TOKEN` known to `ctx` in a single left-to-right pass.
///
/// At each `$` the longest matching token wins, so `$CHH` is not read as
/// `$CH` followed by `H`. Substituted values are never rescanned. Tokens
/// without a value are left in place.
pub fn render(template: &str, ctx: &RenderContext) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    let mut replaced = 0usize;

    while let Some(pos) = rest.find('$') {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];

        match longest_match(after, ctx) {
            Some((len, value)) => {
                out.push_str(value);
                rest = &after[len..];
                replaced += 1;
            }
            None => {
                out.push('$');
                rest = after;
            }
        }
    }
    out.push_str(rest);

    debug!(replaced, "Rendered template");
    out
}

// Tries the longest candidate first, so a token that is a prefix of another
// (`$CH` and `$CHH`) can never shadow it. The shipped vocabulary has no such
// pairs, but the result must not depend on that.
fn longest_match<'a>(text: &str, ctx: &'a RenderContext) -> Option<(usize, &'a str)> {
    let max = ctx.longest_token().min(text.len());
    (1..=max)
        .rev()
        .filter_map(|len| text.get(..len))
        .find_map(|candidate| ctx.get(candidate).map(|value| (candidate.len(), value)))
}

/// Read a template file.
pub fn load_template(path: &Path) -> DisplayResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| DisplayError::Template(format!("{}: {}", path.display(), e)))
}
