/// Tags that are interactive on their own, as the DOM reports them
pub const INTERACTIVE_TAGS: [&str; 7] = ["INPUT", "TEXTAREA", "SELECT", "BUTTON", "A", "IFRAME", "VIDEO"];

/// Decide whether an element counts as interactive.
///
/// True for one of the fixed interactive tags, for an element with a legacy
/// `onclick` handler, or for one whose resolved cursor is `pointer`. The tag
/// comparison is exact, so lower-case foreign elements (an SVG `a`) do not
/// match by tag.
pub fn is_interactive(tag_name: &str, has_click_handler: bool, cursor: &str) -> bool {
    INTERACTIVE_TAGS.contains(&tag_name) || has_click_handler || cursor == "pointer"
}

/// Whitespace as page scripts see it: the Unicode white space set without
/// NEL (U+0085), plus the byte order mark (U+FEFF)
pub fn is_page_whitespace(ch: char) -> bool {
    match ch {
        '\u{feff}' => true,
        '\u{85}' => false,
        _ => ch.is_whitespace(),
    }
}

/// Collapse the element's text the way descriptors expose it: trim, then
/// replace every run of two or more whitespace characters with one space.
pub fn normalize_text(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut run = String::new();

    for ch in raw.trim_matches(is_page_whitespace).chars() {
        if is_page_whitespace(ch) {
            run.push(ch);
            continue;
        }
        flush_whitespace(&mut out, &mut run);
        out.push(ch);
    }
    flush_whitespace(&mut out, &mut run);

    out
}

fn flush_whitespace(out: &mut String, run: &mut String) {
    match run.chars().count() {
        0 => {}
        1 => out.push_str(run),
        _ => out.push(' '),
    }
    run.clear();
}
