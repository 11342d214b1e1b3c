// HTML text helpers shared by the serializer and the section renderer:
// escaping, tag stripping, currency formatting and the rich-text allowlist
// sanitizer.

use std::sync::OnceLock;

use regex::Regex;

/// Escape text for an HTML text node or a double-quoted attribute value.
///
/// Apostrophes are left alone; every attribute this crate emits is
/// double-quoted.
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            other => escaped.push(other),
        }
    }
    escaped
}

fn tag_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"<[^>]*>").expect("tag pattern should compile"))
}

/// Remove every `<...>` tag and trim the result.
pub fn strip_tags(html: &str) -> String {
    tag_pattern().replace_all(html, "").trim().to_string()
}

// ── Currency ───────────────────────────────────────────────────────

/// Round half away from zero at `digits` fractional digits.
pub fn round_half_up(value: f64, digits: u32) -> f64 {
    let factor = 10f64.powi(digits as i32);
    (value * factor).round() / factor
}

/// Block-editor currency display: `$` prefix, exactly two decimals.
///
/// Callers pass full-precision totals; this is the only rounding step.
pub fn format_usd(value: f64) -> String {
    // `+ 0.0` folds negative zero into zero.
    format!("${:.2}", round_half_up(value, 2) + 0.0)
}

/// Locale-style (en-US) currency formatting for an ISO 4217 code:
/// known symbol, thousands separators, the currency's minor digits.
/// Unrecognized codes are written as a prefix, e.g. `XYZ 1,250.00`.
pub fn format_currency(value: f64, currency: &str) -> String {
    let code = currency.trim().to_ascii_uppercase();
    let (symbol, digits) = match code.as_str() {
        "" | "USD" => ("$".to_string(), 2),
        "EUR" => ("€".to_string(), 2),
        "GBP" => ("£".to_string(), 2),
        "JPY" => ("¥".to_string(), 0),
        "KRW" => ("₩".to_string(), 0),
        "INR" => ("₹".to_string(), 2),
        "CAD" => ("CA$".to_string(), 2),
        "AUD" => ("A$".to_string(), 2),
        "NZD" => ("NZ$".to_string(), 2),
        "MXN" => ("MX$".to_string(), 2),
        "BRL" => ("R$".to_string(), 2),
        "CNY" => ("CN¥".to_string(), 2),
        other => (format!("{other} "), 2),
    };

    let rounded = round_half_up(value.abs(), digits);
    let fixed = format!("{rounded:.prec$}", prec = digits as usize);
    let (whole, fraction) = match fixed.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (fixed.as_str(), None),
    };

    let mut formatted = String::new();
    if value < 0.0 && rounded != 0.0 {
        formatted.push('-');
    }
    formatted.push_str(&symbol);
    formatted.push_str(&group_thousands(whole));
    if let Some(fraction) = fraction {
        formatted.push('.');
        formatted.push_str(fraction);
    }
    formatted
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut grouped = String::with_capacity(len + len / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (len - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

// ── Rich-text sanitization ─────────────────────────────────────────

/// Tags the block editor's rich-text toolbar can produce.
const ALLOWED_TAGS: &[&str] = &[
    "h1", "h2", "h3", "h4", "h5", "h6", "p", "br", "hr", "blockquote", "pre", "code", "em",
    "strong", "b", "i", "u", "s", "del", "sub", "sup", "ul", "ol", "li", "a", "img", "table",
    "thead", "tbody", "tr", "th", "td", "div", "span",
];

/// Elements whose body is dropped together with the tag.
const RAW_TEXT_TAGS: &[&str] = &["script", "style", "iframe", "object", "embed", "template"];

const ALLOWED_ATTRS: &[(&str, &[&str])] = &[
    ("a", &["href", "title", "target", "rel"]),
    ("img", &["src", "alt", "title", "width", "height"]),
    ("td", &["align", "colspan", "rowspan"]),
    ("th", &["align", "colspan", "rowspan"]),
    ("ol", &["start"]),
];

/// Attributes allowed on every permitted tag.
const GLOBAL_ATTRS: &[&str] = &["class", "style"];

const ALLOWED_URL_SCHEMES: &[&str] = &["http", "https", "mailto", "tel"];

/// Allowlist sanitizer for rich-text block HTML.
///
/// Drops tags outside [`ALLOWED_TAGS`] (keeping their text), drops script-like
/// elements with their body, removes `on*` handlers and attributes not in the
/// allowlist, and rejects `href`/`src` values with unsafe schemes. `data:`
/// URIs are accepted only for image sources. Operates tag by tag without
/// building a DOM.
pub fn sanitize_rich_text(input: &str) -> String {
    let mut output = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find('<') {
        output.push_str(&rest[..start]);
        let tail = &rest[start..];
        if !opens_tag(tail) {
            output.push_str("&lt;");
            rest = &tail[1..];
            continue;
        }
        let end = tag_end(tail);
        let tag = &tail[..end];
        rest = &tail[end..];

        let name = tag_name(tag);
        if !tag.starts_with("</") && RAW_TEXT_TAGS.contains(&name.as_str()) {
            rest = skip_raw_text(rest, &name);
            continue;
        }
        if let Some(sanitized) = sanitize_tag(tag) {
            output.push_str(&sanitized);
        }
    }

    output.push_str(rest);
    output
}

/// A `<` starts markup only when followed by a letter, `/` or `!`.
fn opens_tag(tail: &str) -> bool {
    tail[1..]
        .chars()
        .next()
        .is_some_and(|ch| ch.is_ascii_alphabetic() || ch == '/' || ch == '!')
}

/// Byte length of the tag starting at `<`, respecting quoted attribute values.
fn tag_end(tail: &str) -> usize {
    let mut in_quote: Option<char> = None;
    for (index, ch) in tail.char_indices() {
        match in_quote {
            Some(quote) if ch == quote => in_quote = None,
            Some(_) => {}
            None if ch == '"' || ch == '\'' => in_quote = Some(ch),
            None if ch == '>' => return index + 1,
            None => {}
        }
    }
    tail.len()
}

fn tag_name(tag: &str) -> String {
    tag.trim_start_matches('<')
        .trim_start_matches('/')
        .split(|c: char| c.is_whitespace() || c == '>' || c == '/')
        .next()
        .unwrap_or("")
        .to_ascii_lowercase()
}

fn skip_raw_text<'a>(rest: &'a str, name: &str) -> &'a str {
    // ASCII lowercasing keeps byte offsets aligned with `rest`.
    let lower = rest.to_ascii_lowercase();
    let closing = format!("</{name}");
    match lower.find(&closing) {
        Some(index) => {
            let after = &rest[index..];
            &after[tag_end(after)..]
        }
        None => "",
    }
}

fn sanitize_tag(tag: &str) -> Option<String> {
    let inner = tag.trim_start_matches('<').trim_end_matches('>').trim();

    if let Some(rest) = inner.strip_prefix('/') {
        let name = rest.split_whitespace().next().unwrap_or("").to_ascii_lowercase();
        return ALLOWED_TAGS.contains(&name.as_str()).then(|| format!("</{name}>"));
    }

    let mut parts = inner.splitn(2, |c: char| c.is_whitespace());
    let name = parts.next().unwrap_or("").trim_end_matches('/').to_ascii_lowercase();
    if !ALLOWED_TAGS.contains(&name.as_str()) {
        return None;
    }

    let attrs = sanitize_attrs(&name, parts.next().unwrap_or(""));
    let mut result = format!("<{name}");
    if !attrs.is_empty() {
        result.push(' ');
        result.push_str(&attrs);
    }
    if inner.ends_with('/') {
        result.push_str(" />");
    } else {
        result.push('>');
    }
    Some(result)
}

fn allowed_attrs_for(tag: &str) -> &'static [&'static str] {
    ALLOWED_ATTRS
        .iter()
        .find(|(name, _)| *name == tag)
        .map(|(_, attrs)| *attrs)
        .unwrap_or(&[])
}

fn sanitize_attrs(tag: &str, attrs: &str) -> String {
    let allowed = allowed_attrs_for(tag);
    let mut result = Vec::new();
    let mut remaining = attrs.trim();

    while !remaining.is_empty() {
        remaining = remaining.trim_start();
        if remaining.is_empty() || remaining.starts_with('/') {
            break;
        }

        let name_end =
            remaining.find(|c: char| c == '=' || c.is_whitespace()).unwrap_or(remaining.len());
        let attr = remaining[..name_end].to_ascii_lowercase();
        remaining = remaining[name_end..].trim_start();

        let value = match remaining.strip_prefix('=') {
            Some(rest) => {
                let (value, rest) = extract_attr_value(rest.trim_start());
                remaining = rest;
                Some(value)
            }
            None => None,
        };

        let permitted = allowed.contains(&attr.as_str()) || GLOBAL_ATTRS.contains(&attr.as_str());
        if attr.starts_with("on") || !permitted {
            continue;
        }

        match value {
            Some(value) => {
                if (attr == "href" || attr == "src") && !is_safe_url(&value, attr == "src") {
                    continue;
                }
                if attr == "style" && !is_safe_style(&value) {
                    continue;
                }
                result.push(format!("{attr}=\"{}\"", escape(&value)));
            }
            None => result.push(attr),
        }
    }

    result.join(" ")
}

fn extract_attr_value(s: &str) -> (String, &str) {
    for quote in ['"', '\''] {
        if let Some(body) = s.strip_prefix(quote) {
            return match body.find(quote) {
                Some(end) => (body[..end].to_string(), &body[end + 1..]),
                None => (body.to_string(), ""),
            };
        }
    }
    let end = s.find(|c: char| c.is_whitespace() || c == '>' || c == '/').unwrap_or(s.len());
    (s[..end].to_string(), &s[end..])
}

fn is_safe_url(url: &str, image_source: bool) -> bool {
    let trimmed = url.trim();
    if trimmed.starts_with('/') || trimmed.starts_with('#') || trimmed.starts_with('?') {
        return true;
    }
    match trimmed.find(':') {
        Some(colon) => {
            let scheme = trimmed[..colon].to_ascii_lowercase();
            if scheme == "data" {
                return image_source && trimmed[colon + 1..].to_ascii_lowercase().starts_with("image/");
            }
            ALLOWED_URL_SCHEMES.contains(&scheme.as_str())
        }
        None => true,
    }
}

fn is_safe_style(style: &str) -> bool {
    let lower = style.to_ascii_lowercase();
    !(lower.contains("expression(") || lower.contains("javascript:") || lower.contains("url("))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_covers_markup_characters() {
        assert_eq!(
            escape(r#"<a href="x">Tom & Jerry's</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; Jerry's&lt;/a&gt;"
        );
    }

    #[test]
    fn strip_tags_removes_markup_and_trims() {
        assert_eq!(strip_tags("  <p>Hello <strong>world</strong></p>\n"), "Hello world");
    }

    #[test]
    fn usd_rounds_once_at_display() {
        assert_eq!(format_usd(2.0 * 10.005), "$20.01");
        assert_eq!(format_usd(0.0), "$0.00");
        assert_eq!(format_usd(1234.5), "$1234.50");
    }

    #[test]
    fn usd_never_shows_negative_zero() {
        assert_eq!(format_usd(-0.0), "$0.00");
        assert_eq!(format_usd(-0.001), "$0.00");
    }

    #[test]
    fn round_half_up_rounds_ties_away_from_zero() {
        assert_eq!(round_half_up(0.125, 2), 0.13);
        assert_eq!(round_half_up(2.5, 0), 3.0);
    }

    #[test]
    fn locale_currency_groups_thousands() {
        assert_eq!(format_currency(1_234_567.891, "USD"), "$1,234,567.89");
        assert_eq!(format_currency(999.0, "usd"), "$999.00");
        assert_eq!(format_currency(5000.0, "EUR"), "€5,000.00");
    }

    #[test]
    fn locale_currency_respects_minor_digits_and_unknown_codes() {
        assert_eq!(format_currency(1234.6, "JPY"), "¥1,235");
        assert_eq!(format_currency(1250.0, "XYZ"), "XYZ 1,250.00");
        assert_eq!(format_currency(-42.0, "GBP"), "-£42.00");
    }

    #[test]
    fn sanitizer_keeps_editor_markup() {
        let html = r#"<h2>Intro</h2><p class="lead">We <strong>deliver</strong>.</p><ul><li>One</li></ul>"#;
        assert_eq!(sanitize_rich_text(html), html);
    }

    #[test]
    fn sanitizer_drops_script_elements_with_body() {
        let html = "<p>Hi</p><script>alert('x')</script><p>Bye</p>";
        assert_eq!(sanitize_rich_text(html), "<p>Hi</p><p>Bye</p>");
    }

    #[test]
    fn sanitizer_drops_unclosed_script_body() {
        assert_eq!(sanitize_rich_text("ok<SCRIPT>steal()"), "ok");
    }

    #[test]
    fn sanitizer_removes_event_handlers_and_unsafe_urls() {
        let html = r#"<a href="javascript:alert(1)" onclick="x()">link</a><img src="x.png" onerror="bad()">"#;
        assert_eq!(sanitize_rich_text(html), r#"<a>link</a><img src="x.png">"#);
    }

    #[test]
    fn sanitizer_allows_data_uri_only_for_images() {
        let html = r#"<img src="data:image/png;base64,AAA="><a href="data:text/html,hi">x</a>"#;
        assert_eq!(
            sanitize_rich_text(html),
            r#"<img src="data:image/png;base64,AAA="><a>x</a>"#
        );
    }

    #[test]
    fn sanitizer_unwraps_unknown_tags() {
        assert_eq!(sanitize_rich_text("<font color=red>text</font>"), "text");
    }

    #[test]
    fn sanitizer_rejects_style_expressions() {
        let html = r#"<span style="background:url(javascript:x)">a</span><span style="color:red">b</span>"#;
        assert_eq!(
            sanitize_rich_text(html),
            r#"<span>a</span><span style="color:red">b</span>"#
        );
    }

    #[test]
    fn sanitizer_tolerates_unterminated_attribute_quotes() {
        assert_eq!(
            sanitize_rich_text(r#"<a href="https://x.dev>x"#),
            r#"<a href="https://x.dev&gt;x">"#
        );
    }

    #[test]
    fn bare_less_than_is_text_not_a_tag() {
        assert_eq!(
            sanitize_rich_text("<p>Scale from 1 < 10 users</p><p>Next steps</p>"),
            "<p>Scale from 1 &lt; 10 users</p><p>Next steps</p>"
        );
        assert_eq!(sanitize_rich_text("<p>a <= b</p>"), "<p>a &lt;= b</p>");
        assert_eq!(sanitize_rich_text("trailing <"), "trailing &lt;");
    }
}
