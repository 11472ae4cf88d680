use community_feed::sanitize::sanitize;

#[test]
fn empty_input_yields_empty_output() {
    assert_eq!(sanitize("", 300), "");
}

#[test]
fn removes_images_without_substitution() {
    assert_eq!(sanitize("<p>hi <img src=x> there</p>", 300), "hi there");
    assert_eq!(
        sanitize("before <img src=\"a.jpg\" alt=\"alt text\" /> after", 300),
        "before after"
    );
}

#[test]
fn removes_shortcodes_both_forms() {
    assert_eq!(
        sanitize("[caption id=\"attachment_1\"]photo day[/caption] more", 300),
        "photo day more"
    );
    assert_eq!(sanitize("a [gallery ids=\"1,2,3\"] b", 300), "a b");
}

#[test]
fn strips_remaining_tags_but_keeps_text() {
    assert_eq!(
        sanitize("<div><p>Hello <strong>world</strong></p></div>", 300),
        "Hello world"
    );
}

#[test]
fn collapses_whitespace_and_line_breaks() {
    assert_eq!(
        sanitize("  first\n\nsecond\t\tthird   fourth  ", 300),
        "first second third fourth"
    );
}

#[test]
fn truncates_with_single_ellipsis() {
    let input = "a".repeat(400);
    let out = sanitize(&input, 300);
    assert_eq!(out.chars().count(), 301);
    assert!(out.chars().take(300).all(|c| c == 'a'));
    assert_eq!(out.chars().last(), Some('\u{2026}'));
}

#[test]
fn short_input_is_not_truncated() {
    let input = "b".repeat(300);
    assert_eq!(sanitize(&input, 300), input);
}

#[test]
fn does_not_panic_on_malformed_markup() {
    let samples = [
        "<p unclosed",
        "text > stray < brackets",
        "<><><",
        "[caption unterminated",
        "]stray[",
        "<img",
    ];
    for sample in samples {
        let _ = sanitize(sample, 300);
    }
}

#[test]
fn sanitize_is_idempotent() {
    let long = "a".repeat(400);
    let samples = [
        "<p>hi <img src=x> there</p>",
        "[caption]photo[/caption] plain",
        long.as_str(),
        "  spaced\nout\ttext  ",
        "no markup at all",
        "[[caption]nested]",
        "<div><p>deep <em>markup</em></p></div>",
    ];
    for sample in samples {
        let once = sanitize(sample, 300);
        let twice = sanitize(&once, 300);
        assert_eq!(once, twice, "not idempotent for {:?}", sample);
    }
}
