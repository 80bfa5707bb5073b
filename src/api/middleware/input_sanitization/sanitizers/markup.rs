//! Allow-list HTML cleaning
//!
//! The cleaner never builds a DOM. It walks the input once, emits escaped
//! text, re-serializes the tags the level allows and discards everything
//! else. Anything it cannot parse is treated as hostile and dropped.

use super::{escape_html, starts_with_entity, strip_control_chars, strip_executable_sequences, Sanitizer};

/// Tag allow-list selector for [`Sanitizer::sanitize_markup`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkupLevel {
    /// No tags, text only
    Strict,
    /// Inline formatting
    Basic,
    /// Inline formatting plus block structure for legal documents
    Rich,
}

const BASIC_TAGS: &[&str] = &[
    "b", "strong", "i", "em", "u", "s", "br", "span", "code", "sub", "sup", "small", "mark",
];

const RICH_TAGS: &[&str] = &[
    "p", "div", "h1", "h2", "h3", "h4", "h5", "h6", "ul", "ol", "li", "blockquote", "pre", "hr",
    "table", "thead", "tbody", "tfoot", "tr", "th", "td", "caption", "a",
];

const VOID_TAGS: &[&str] = &["br", "hr"];

/// Elements whose content is executable or never meant as text
const DROP_CONTENT_TAGS: &[&str] = &[
    "script", "style", "iframe", "object", "embed", "noscript", "template", "svg", "math", "xmp",
    "noembed", "noframes", "frameset", "applet",
];

const MARKUP_SCHEMES: &[&str] = &["javascript:", "vbscript:"];

const SAFE_HREF_SCHEMES: &[&str] = &["http", "https", "mailto", "tel"];

impl MarkupLevel {
    fn allows_tag(&self, name: &str) -> bool {
        match self {
            MarkupLevel::Strict => false,
            MarkupLevel::Basic => BASIC_TAGS.contains(&name),
            MarkupLevel::Rich => BASIC_TAGS.contains(&name) || RICH_TAGS.contains(&name),
        }
    }
}

impl Sanitizer {
    /// Strip every tag and attribute the level does not allow.
    ///
    /// Encoded markup (`&lt;script&gt;`, `%3Cscript%3E`) is kept as inert
    /// text and never decoded.
    pub fn sanitize_markup(input: &str, level: MarkupLevel) -> String {
        let input = strip_control_chars(input, true);
        let cleaned = clean_markup(&input, level);
        strip_executable_sequences(&cleaned, MARKUP_SCHEMES, true)
    }
}

struct Attribute<'a> {
    name: String,
    value: Option<&'a str>,
}

struct Tag<'a> {
    name: String,
    closing: bool,
    attributes: Vec<Attribute<'a>>,
    /// Byte offset just past the closing `>`
    end: usize,
}

fn clean_markup(input: &str, level: MarkupLevel) -> String {
    let bytes = input.as_bytes();
    let lower = input.to_ascii_lowercase();
    let len = bytes.len();

    let mut out = String::with_capacity(len);
    let mut text_start = 0;
    let mut i = 0;

    while i < len {
        if bytes[i] != b'<' {
            i += 1;
            continue;
        }

        let starts_construct = match (bytes.get(i + 1), bytes.get(i + 2)) {
            (Some(b), _) if b.is_ascii_alphabetic() => true,
            (Some(b'/'), Some(b)) => b.is_ascii_alphabetic(),
            (Some(b'!'), _) | (Some(b'?'), _) => true,
            _ => false,
        };
        if !starts_construct {
            i += 1;
            continue;
        }

        out.push_str(&escape_html(&input[text_start..i], false));

        let next = match bytes[i + 1] {
            b'!' | b'?' => skip_comment(&lower, i),
            _ => match parse_tag(input, i) {
                Some(tag) => emit_tag(&mut out, &lower, tag, level),
                None => None,
            },
        };

        match next {
            Some(next) => {
                i = next;
                text_start = next;
            }
            // Unterminated construct: drop the remainder
            None => {
                text_start = len;
                break;
            }
        }
    }

    if text_start < len {
        out.push_str(&escape_html(&input[text_start..], false));
    }
    out
}

/// Offset after a comment, doctype or processing instruction
fn skip_comment(lower: &str, start: usize) -> Option<usize> {
    if lower[start..].starts_with("<!--") {
        lower[start + 4..].find("-->").map(|pos| start + 4 + pos + 3)
    } else {
        lower[start + 2..].find('>').map(|pos| start + 2 + pos + 1)
    }
}

fn is_space(b: u8) -> bool {
    b.is_ascii_whitespace()
}

fn parse_tag(input: &str, start: usize) -> Option<Tag<'_>> {
    let bytes = input.as_bytes();
    let len = bytes.len();

    let closing = bytes.get(start + 1) == Some(&b'/');
    let mut k = if closing { start + 2 } else { start + 1 };

    let name_start = k;
    while k < len && !is_space(bytes[k]) && bytes[k] != b'/' && bytes[k] != b'>' {
        k += 1;
    }
    let name = input[name_start..k].to_ascii_lowercase();

    let mut attributes = Vec::new();
    loop {
        while k < len && (is_space(bytes[k]) || bytes[k] == b'/') {
            k += 1;
        }
        if k >= len {
            return None;
        }
        if bytes[k] == b'>' {
            k += 1;
            break;
        }

        let attr_start = k;
        while k < len
            && !is_space(bytes[k])
            && bytes[k] != b'/'
            && bytes[k] != b'>'
            && (k == attr_start || bytes[k] != b'=')
        {
            k += 1;
        }
        let attr_name = input[attr_start..k].to_ascii_lowercase();

        while k < len && is_space(bytes[k]) {
            k += 1;
        }

        let mut value = None;
        if k < len && bytes[k] == b'=' {
            k += 1;
            while k < len && is_space(bytes[k]) {
                k += 1;
            }
            if k >= len {
                return None;
            }
            match bytes[k] {
                quote @ (b'"' | b'\'') => {
                    let close = input[k + 1..].find(quote as char)? + k + 1;
                    value = Some(&input[k + 1..close]);
                    k = close + 1;
                }
                _ => {
                    let value_start = k;
                    while k < len && !is_space(bytes[k]) && bytes[k] != b'>' {
                        k += 1;
                    }
                    value = Some(&input[value_start..k]);
                }
            }
        }

        attributes.push(Attribute {
            name: attr_name,
            value,
        });
    }

    Some(Tag {
        name,
        closing,
        attributes,
        end: k,
    })
}

/// Write the allowed form of `tag` and return where scanning resumes
fn emit_tag(out: &mut String, lower: &str, tag: Tag<'_>, level: MarkupLevel) -> Option<usize> {
    if !tag.closing && DROP_CONTENT_TAGS.contains(&tag.name.as_str()) {
        let closing = format!("</{}", tag.name);
        let close_at = lower[tag.end..].find(&closing)? + tag.end;
        let gt = lower[close_at..].find('>')? + close_at;
        return Some(gt + 1);
    }

    if !level.allows_tag(&tag.name) {
        return Some(tag.end);
    }

    if tag.closing {
        if !VOID_TAGS.contains(&tag.name.as_str()) {
            out.push_str("</");
            out.push_str(&tag.name);
            out.push('>');
        }
        return Some(tag.end);
    }

    out.push('<');
    out.push_str(&tag.name);
    let mut seen: Vec<&str> = Vec::new();
    for attribute in &tag.attributes {
        if seen.contains(&attribute.name.as_str()) {
            continue;
        }
        seen.push(attribute.name.as_str());

        if let Some(value) = allowed_attribute_value(level, &tag.name, attribute) {
            out.push(' ');
            out.push_str(&attribute.name);
            out.push_str("=\"");
            out.push_str(&escape_attribute(&value));
            out.push('"');
        }
    }
    out.push('>');
    Some(tag.end)
}

fn allowed_attribute_value(level: MarkupLevel, tag: &str, attribute: &Attribute<'_>) -> Option<String> {
    if level != MarkupLevel::Rich {
        return None;
    }
    let value = decode_entities(attribute.value.unwrap_or(""));

    match (tag, attribute.name.as_str()) {
        (_, "title") => Some(value),
        ("a", "href") if is_safe_href(&value) => Some(value),
        ("td" | "th", "colspan" | "rowspan") => {
            let digits = value.trim();
            let ok = (1..=3).contains(&digits.len()) && digits.bytes().all(|b| b.is_ascii_digit());
            ok.then(|| digits.to_string())
        }
        _ => None,
    }
}

/// Relative URLs and a small set of navigation schemes only
fn is_safe_href(decoded: &str) -> bool {
    let compact: String = decoded
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .collect::<String>()
        .to_ascii_lowercase();

    match compact.find([':', '/', '?', '#']) {
        Some(idx) if compact[idx..].starts_with(':') => SAFE_HREF_SCHEMES.contains(&&compact[..idx]),
        Some(idx) => !compact[..idx].contains('&'),
        // An undecoded reference could still hide a scheme separator
        None => !compact.contains('&'),
    }
}

/// Full escape for attribute values that have already been decoded
fn escape_attribute(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

fn named_entity(name: &str) -> Option<char> {
    let c = match name.to_ascii_lowercase().as_str() {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => '\u{a0}',
        "colon" => ':',
        "tab" => '\t',
        "newline" => '\n',
        "sol" => '/',
        "lpar" => '(',
        "rpar" => ')',
        "period" => '.',
        "num" => '#',
        "excl" => '!',
        "equals" => '=',
        "semi" => ';',
        _ => return None,
    };
    Some(c)
}

/// Decode character references once; unknown names stay literal.
/// Control characters other than line whitespace are dropped.
fn decode_entities(value: &str) -> String {
    let bytes = value.as_bytes();
    let mut out = String::with_capacity(value.len());
    let mut rest_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'&' || !starts_with_entity(bytes, i) {
            i += 1;
            continue;
        }
        let Some(semi) = value[i..].find(';').map(|pos| i + pos) else {
            break;
        };
        let body = &value[i + 1..semi];
        let decoded = if let Some(num) = body.strip_prefix('#') {
            let code = match num.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok(),
                None => num.parse::<u32>().ok(),
            };
            Some(code.and_then(char::from_u32).unwrap_or('\u{fffd}'))
        } else {
            named_entity(body)
        };

        if let Some(c) = decoded {
            out.push_str(&value[rest_start..i]);
            out.push(c);
            rest_start = semi + 1;
        }
        i = semi + 1;
    }
    out.push_str(&value[rest_start..]);

    strip_control_chars(&out, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strict(input: &str) -> String {
        Sanitizer::sanitize_markup(input, MarkupLevel::Strict)
    }

    fn basic(input: &str) -> String {
        Sanitizer::sanitize_markup(input, MarkupLevel::Basic)
    }

    fn rich(input: &str) -> String {
        Sanitizer::sanitize_markup(input, MarkupLevel::Rich)
    }

    #[test]
    fn test_strict_keeps_text_only() {
        assert_eq!(strict("<p>Hello <b>World</b></p>"), "Hello World");
        assert_eq!(strict("a < b"), "a &lt; b");
    }

    #[test]
    fn test_basic_keeps_inline_tags() {
        assert_eq!(basic("<B>bold</B> <p>para</p>"), "<b>bold</b> para");
        assert_eq!(basic("line<br/>break</br>"), "line<br>break");
    }

    #[test]
    fn test_basic_drops_attributes() {
        assert_eq!(basic("<span title=\"t\" style=\"x\">s</span>"), "<span>s</span>");
    }

    #[test]
    fn test_rich_keeps_structure() {
        let out = rich("<h2>Facts</h2><ul><li>one</li></ul><table><tr><td colspan=2>c</td></tr></table>");
        assert_eq!(
            out,
            "<h2>Facts</h2><ul><li>one</li></ul><table><tr><td colspan=\"2\">c</td></tr></table>"
        );
    }

    #[test]
    fn test_script_content_dropped() {
        assert_eq!(rich("Hello <script>alert('x')</script>World"), "Hello World");
        assert_eq!(rich("a<STYLE>body{}</style>b"), "ab");
        assert_eq!(rich("a<svg><g onload=alert(1)></g></svg>b"), "ab");
    }

    #[test]
    fn test_nested_malformed_script() {
        let out = rich("<scr<script>ipt>alert(1)</script>");
        assert!(!out.to_lowercase().contains("<script"));
        assert_eq!(out, "ipt&gt;alert(1)");
    }

    #[test]
    fn test_unterminated_script_drops_rest() {
        assert_eq!(rich("ok<script>alert(1)"), "ok");
        assert_eq!(rich("ok<img src=x onerror=alert(1)"), "ok");
    }

    #[test]
    fn test_event_handlers_removed() {
        let out = rich("<a href=\"https://a.example\" onclick=\"steal()\">x</a>");
        assert_eq!(out, "<a href=\"https://a.example\">x</a>");
    }

    #[test]
    fn test_dangerous_href_dropped() {
        for href in [
            "javascript:alert(1)",
            "JaVaScRiPt:alert(1)",
            " javascript:alert(1)",
            "java\tscript:alert(1)",
            "javascript&colon;alert(1)",
            "&#106;avascript:alert(1)",
            "data:text/html;base64,PHNjcmlwdD4=",
            "vbscript:msgbox(1)",
            "jav&#x09;ascript:alert(1)",
        ] {
            let out = rich(&format!("<a href=\"{}\">x</a>", href));
            assert_eq!(out, "<a>x</a>", "href {:?}", href);
        }
    }

    #[test]
    fn test_safe_href_kept() {
        assert_eq!(
            rich("<a href='/cases?id=1&amp;tab=2'>x</a>"),
            "<a href=\"/cases?id=1&amp;tab=2\">x</a>"
        );
        assert_eq!(
            rich("<a href=\"mailto:clerk@court.example\">mail</a>"),
            "<a href=\"mailto:clerk@court.example\">mail</a>"
        );
    }

    #[test]
    fn test_encoded_markup_stays_inert() {
        assert_eq!(rich("&lt;script&gt;alert(1)&lt;/script&gt;"), "&lt;script&gt;alert(1)&lt;/script&gt;");
        assert_eq!(rich("%3Cscript%3E"), "%3Cscript%3E");
    }

    #[test]
    fn test_comments_removed() {
        assert_eq!(rich("a<!-- <script>x</script> -->b"), "ab");
        assert_eq!(rich("a<!doctype html>b"), "ab");
        assert_eq!(rich("a<!-- never closed"), "a");
    }

    #[test]
    fn test_idempotent_on_tricky_input() {
        let inputs = [
            "<a href=\"x&amp;y\" title='q\"uote'>t</a>",
            "&amjavascript:p;",
            "<td rowspan=\" 12 \">x</td>",
            "x onnclick=1 y",
            "<<script>script>",
            "&#1;<b title=\"&#1;\">b</b>",
        ];
        for input in inputs {
            let once = rich(input);
            assert_eq!(rich(&once), once, "input {:?}", input);
        }
    }

    #[test]
    fn test_duplicate_attribute_keeps_first() {
        assert_eq!(rich("<b title=a title=b>x</b>"), "<b title=\"a\">x</b>");
    }
}
