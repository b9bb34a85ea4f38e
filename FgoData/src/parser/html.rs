//! Minimal HTML scanning for wiki pages
//!
//! The wiki markup is regular enough that pages are sliced by tag blocks
//! instead of being parsed into a DOM. Lowercasing is ASCII-only so byte
//! offsets in the lowered copy stay valid for the original text.

/// ASCII-lowercase without changing byte offsets
pub fn to_lower(s: &str) -> String {
    s.to_ascii_lowercase()
}

/// Find the next `<tag ...>...</tag>` block at or after `from`.
///
/// Returns byte offsets `(start, end)` of the whole block. Nested blocks of
/// the same tag are balanced.
pub fn next_tag_block(s: &str, tag: &str, from: usize) -> Option<(usize, usize)> {
    let lc = to_lower(s);
    let tag = to_lower(tag);
    next_tag_block_lc(s, &lc, &tag, from)
}

fn next_tag_block_lc(s: &str, lc: &str, tag: &str, from: usize) -> Option<(usize, usize)> {
    let start = find_open(lc, tag, from)?;
    let open_end = s[start..].find('>')? + start + 1;
    if s[..open_end].ends_with("/>") {
        return Some((start, open_end));
    }

    let close = format!("/{tag}");
    let mut depth = 1usize;
    let mut pos = open_end;
    while depth > 0 {
        let next_close = find_open(lc, &close, pos)?;
        match find_open(lc, tag, pos) {
            Some(next_open) if next_open < next_close => {
                depth += 1;
                pos = next_open + tag.len() + 1;
            }
            _ => {
                depth -= 1;
                pos = next_close + close.len() + 1;
            }
        }
    }
    let end = s[pos..].find('>').map_or(s.len(), |i| pos + i + 1);
    Some((start, end))
}

/// Offset of the next `<tag` that is a whole tag name (not `<tagx`).
///
/// Passing `/tag` finds closing tags the same way.
fn find_open(lc: &str, tag: &str, from: usize) -> Option<usize> {
    let open = format!("<{tag}");
    let mut pos = from;
    loop {
        let at = lc.get(pos..)?.find(&open)? + pos;
        let after = lc[at + open.len()..].chars().next();
        if matches!(after, Some(c) if c.is_ascii_whitespace() || c == '>' || c == '/') {
            return Some(at);
        }
        pos = at + open.len();
    }
}

/// Every top-level `<tag>` block in `s`, in document order
pub fn tag_blocks<'a>(s: &'a str, tag: &str) -> Vec<&'a str> {
    let lc = to_lower(s);
    let tag = to_lower(tag);
    let mut blocks = Vec::new();
    let mut pos = 0;
    while let Some((start, end)) = next_tag_block_lc(s, &lc, &tag, pos) {
        blocks.push(&s[start..end]);
        pos = end;
    }
    blocks
}

/// Opening tags of every `<tag ...>` in `s`, void elements such as `<img>` included
pub fn open_tags<'a>(s: &'a str, tag: &str) -> Vec<&'a str> {
    let lc = to_lower(s);
    let tag = to_lower(tag);
    let mut tags = Vec::new();
    let mut pos = 0;
    while let Some(start) = find_open(&lc, &tag, pos) {
        let Some(len) = s[start..].find('>') else {
            break;
        };
        tags.push(&s[start..=start + len]);
        pos = start + len + 1;
    }
    tags
}

/// The opening tag of a block, e.g. `<td rowspan="2">`
pub fn open_tag(block: &str) -> &str {
    block.find('>').map_or(block, |i| &block[..=i])
}

/// The content between a block's opening and closing tags
pub fn inner_html(block: &str) -> &str {
    let Some(open_end) = block.find('>') else {
        return "";
    };
    match block.rfind("</") {
        Some(close) if close > open_end => &block[open_end + 1..close],
        _ => &block[open_end + 1..],
    }
}

/// Value of `name` in an opening tag; quoted or bare
pub fn attribute(open_tag: &str, name: &str) -> Option<String> {
    let lc = to_lower(open_tag);
    let needle = format!("{}=", to_lower(name));
    let mut pos = 0;
    let at = loop {
        let at = lc.get(pos..)?.find(&needle)? + pos;
        let boundary = lc[..at].chars().next_back();
        if matches!(boundary, Some(c) if c.is_ascii_whitespace()) {
            break at;
        }
        pos = at + needle.len();
    };
    let rest = &open_tag[at + needle.len()..];
    let value = match rest.chars().next()? {
        quote @ ('"' | '\'') => {
            let body = &rest[1..];
            &body[..body.find(quote)?]
        }
        _ => {
            let end = rest
                .find(|c: char| c.is_ascii_whitespace() || c == '>' || c == '/')
                .unwrap_or(rest.len());
            &rest[..end]
        }
    };
    Some(decode_entities(value))
}

/// Decode the character references the wiki emits
pub fn decode_entities(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];
        let decoded = rest.find(';').filter(|&semi| semi <= 10).and_then(|semi| {
            let entity = &rest[1..semi];
            let ch = match entity {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "nbsp" => Some(' '),
                _ => entity.strip_prefix('#').and_then(|num| {
                    let code = match num.strip_prefix(['x', 'X']) {
                        Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                        None => num.parse().ok()?,
                    };
                    char::from_u32(code)
                }),
            };
            ch.map(|ch| (ch, semi))
        });
        match decoded {
            Some((ch, semi)) => {
                out.push(ch);
                rest = &rest[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Visible text of an HTML fragment.
///
/// Tags are dropped, `<br>` becomes a newline, entities are decoded and the
/// result is trimmed.
pub fn text_content(fragment: &str) -> String {
    let mut out = String::with_capacity(fragment.len());
    let mut rest = fragment;
    while let Some(lt) = rest.find('<') {
        out.push_str(&rest[..lt]);
        let Some(gt) = rest[lt..].find('>') else {
            rest = "";
            break;
        };
        let tag = to_lower(&rest[lt + 1..lt + gt]);
        if tag.starts_with("br") {
            out.push('\n');
        }
        rest = &rest[lt + gt + 1..];
    }
    out.push_str(rest);
    decode_entities(&out).trim().to_string()
}

/// Text with runs of whitespace collapsed to one space (XPath `normalize-space`)
pub fn normalize_space(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Slice of `html` after the `<tag>` heading whose text is `title`, up to the
/// next `<tag>` heading (or the end of the input)
pub fn section_after<'a>(html: &'a str, tag: &str, title: &str) -> Option<&'a str> {
    let lc = to_lower(html);
    let tag = to_lower(tag);
    let mut pos = 0;
    while let Some((start, end)) = next_tag_block_lc(html, &lc, &tag, pos) {
        if normalize_space(&text_content(&html[start..end])) == title {
            let section_end = find_open(&lc, &tag, end).unwrap_or(html.len());
            return Some(&html[end..section_end]);
        }
        pos = end;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_content() {
        assert_eq!(text_content("<td> <b>英雄の証</b>,x5<br/>QP,x1万 </td>"), "英雄の証,x5\nQP,x1万");
        assert_eq!(text_content("a&amp;b&nbsp;c &#x41;&#66;"), "a&b c AB");
        assert_eq!(text_content("R&D &unknown; x"), "R&D &unknown; x");
    }

    #[test]
    fn test_open_tags_include_void_elements() {
        let html = r#"<span><a href="/i"><IMG alt="凶骨" src="a.png"></a></span>2個<img alt='x'/>"#;
        let tags = open_tags(html, "img");
        assert_eq!(tags.len(), 2);
        assert_eq!(attribute(tags[0], "alt").as_deref(), Some("凶骨"));
        assert_eq!(attribute(tags[1], "alt").as_deref(), Some("x"));
    }

    #[test]
    fn test_nested_blocks_are_balanced() {
        let html = "<div id=a><div>inner</div>tail</div><div>next</div>";
        let blocks = tag_blocks(html, "div");
        assert_eq!(blocks.len(), 2);
        assert_eq!(inner_html(blocks[0]), "<div>inner</div>tail");
        assert_eq!(text_content(blocks[1]), "next");
    }

    #[test]
    fn test_tag_name_boundary() {
        let html = "<thead><th>x</th></thead><th>y</th>";
        let blocks = tag_blocks(html, "th");
        assert_eq!(blocks, vec!["<th>x</th>", "<th>y</th>"]);
    }

    #[test]
    fn test_attribute() {
        let tag = r#"<td class="icon" rowspan=2 data-rowspan="9">"#;
        assert_eq!(attribute(tag, "rowspan"), Some("2".to_string()));
        assert_eq!(attribute(tag, "class"), Some("icon".to_string()));
        assert_eq!(attribute(tag, "href"), None);
        let link = r#"<a href='//w.atwiki.jp/f_go/pages/1.html?a=1&amp;b=2'>"#;
        assert_eq!(
            attribute(link, "href"),
            Some("//w.atwiki.jp/f_go/pages/1.html?a=1&b=2".to_string())
        );
    }

    #[test]
    fn test_section_after() {
        let html = "<h3>保有スキル</h3><h4>Skill1：A</h4><h3> 霊基再臨 </h3><table></table>";
        assert_eq!(section_after(html, "h3", "保有スキル"), Some("<h4>Skill1：A</h4>"));
        assert_eq!(section_after(html, "h3", "霊基再臨"), Some("<table></table>"));
        assert_eq!(section_after(html, "h3", "スキル強化"), None);
    }
}
