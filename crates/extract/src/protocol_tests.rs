use super::*;

#[test]
fn render_block_formats_header_and_body() {
    let block = render_block("claude", "hello there").unwrap();
    assert_eq!(block, "--- claude ---\nhello there");
}

#[test]
fn render_block_rejects_empty_body() {
    assert!(render_block("codex", "   ").is_err());
}

#[test]
fn strip_injected_context_extracts_last_user_block() {
    let message = "--- claude ---\nearlier reply\n--- user ---\nplease check this\n--- codex ---\nanother reply";
    assert_eq!(strip_injected_context(message), "please check this");
}

#[test]
fn strip_injected_context_returns_original_when_no_header() {
    let message = "plain message with no framing";
    assert_eq!(strip_injected_context(message), message);
}

#[test]
fn strip_injected_context_returns_original_when_no_user_block() {
    let message = "--- claude ---\nreply one\n--- codex ---\nreply two";
    assert_eq!(strip_injected_context(message), message);
}

#[test]
fn strip_injected_context_picks_the_last_user_block_when_several_exist() {
    let message = "--- user ---\nfirst\n--- claude ---\nreply\n--- user ---\nsecond";
    assert_eq!(strip_injected_context(message), "second");
}

#[test]
fn strip_injected_context_returns_original_when_a_line_before_the_first_header_is_not_one() {
    let message = "--- foo\n--- user ---\nhi";
    assert_eq!(strip_injected_context(message), message);
}

#[test]
fn count_words_counts_whitespace_separated_tokens() {
    assert_eq!(count_words("one two  three\nfour"), 4);
    assert_eq!(count_words(""), 0);
}
