//! The fixed answering prompt.

/// Placed between retrieved chunk texts in the context block.
pub const CONTEXT_SEPARATOR: &str = "\n\n---\n\n";

/// Join retrieved chunk texts into one context block.
pub fn build_context<'a>(texts: impl IntoIterator<Item = &'a str>) -> String {
    texts.into_iter().collect::<Vec<_>>().join(CONTEXT_SEPARATOR)
}

/// Render the prompt for `question` over `context`.
///
/// Substitution is single-pass, so braces inside the context or question are
/// left alone.
pub fn render_prompt(context: &str, question: &str) -> String {
    format!(
        "\nAnswer the question below, use the given context if necessary:\n\
         \n\
         {context}\n\
         \n\
         ---\n\
         \n\
         Answer the question, rely on the context given above if needed and do not refer to \
         the context in your response. The user providing the question is not privy to the \
         context: {question}\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_joined_with_separator() {
        let context = build_context(["first", "second", "third"]);
        assert_eq!(context, "first\n\n---\n\nsecond\n\n---\n\nthird");
    }

    #[test]
    fn empty_context() {
        assert_eq!(build_context(std::iter::empty()), "");
    }

    #[test]
    fn prompt_layout() {
        let prompt = render_prompt("CTX", "How many houses?");
        assert_eq!(
            prompt,
            "\nAnswer the question below, use the given context if necessary:\n\nCTX\n\n---\n\n\
             Answer the question, rely on the context given above if needed and do not refer to \
             the context in your response. The user providing the question is not privy to the \
             context: How many houses?\n"
        );
    }

    #[test]
    fn placeholders_in_context_not_expanded() {
        let prompt = render_prompt("literal {question} here", "Q");
        assert!(prompt.contains("literal {question} here"));
        assert!(prompt.ends_with("context: Q\n"));
    }
}
