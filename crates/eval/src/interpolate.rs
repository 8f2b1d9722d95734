//! `${...}` template interpolation against the evaluation context.

use crate::context::Context;

/// Substitutes every `${path}` span in `template`, left to right.
///
/// Each placeholder runs from `${` to the first following `}` -- there is
/// no nested-brace support. Occurrences resolve independently, without
/// caching. A path missing from the context renders as the empty string; an
/// unterminated `${` is copied through verbatim.
pub fn interpolate(template: &str, ctx: &Context) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find('}') {
            Some(end) => {
                if let Some(value) = ctx.lookup(&after[..end]) {
                    out.push_str(&value.render());
                }
                rest = &after[end + 1..];
            }
            None => {
                out.push_str(&rest[start..]);
                return out;
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use yurei_core::Value;

    fn ctx_with<'a>(
        payload: &'a BTreeMap<String, Value>,
        empty: &'a BTreeMap<String, Value>,
    ) -> Context<'a> {
        Context {
            kind: "t",
            payload,
            vars: empty,
            strings: empty,
        }
    }

    #[test]
    fn substitutes_known_paths() {
        let mut payload = BTreeMap::new();
        payload.insert("name".to_string(), Value::Text("Aya".into()));
        let empty = BTreeMap::new();
        let ctx = ctx_with(&payload, &empty);
        assert_eq!(interpolate("Hello ${name}", &ctx), "Hello Aya");
    }

    #[test]
    fn missing_paths_render_empty() {
        let payload = BTreeMap::new();
        let empty = BTreeMap::new();
        let ctx = ctx_with(&payload, &empty);
        assert_eq!(interpolate("X${missing.path}Y", &ctx), "XY");
    }

    #[test]
    fn each_occurrence_resolves_independently() {
        let mut payload = BTreeMap::new();
        payload.insert("n".to_string(), Value::Int(7));
        let empty = BTreeMap::new();
        let ctx = ctx_with(&payload, &empty);
        assert_eq!(interpolate("${n}+${n}=${missing}${n}", &ctx), "7+7=7");
    }

    #[test]
    fn non_text_values_render() {
        let mut payload = BTreeMap::new();
        payload.insert("ok".to_string(), Value::Bool(true));
        payload.insert("count".to_string(), Value::Int(3));
        let empty = BTreeMap::new();
        let ctx = ctx_with(&payload, &empty);
        assert_eq!(interpolate("${ok}/${count}", &ctx), "true/3");
    }

    #[test]
    fn unterminated_placeholder_copies_verbatim() {
        let payload = BTreeMap::new();
        let empty = BTreeMap::new();
        let ctx = ctx_with(&payload, &empty);
        assert_eq!(interpolate("tail ${open", &ctx), "tail ${open");
    }

    #[test]
    fn no_placeholders_is_identity() {
        let payload = BTreeMap::new();
        let empty = BTreeMap::new();
        let ctx = ctx_with(&payload, &empty);
        assert_eq!(interpolate("plain text", &ctx), "plain text");
    }
}
