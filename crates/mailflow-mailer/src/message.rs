/// A fully composed message for one recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Combine a dispatch body with its optional footer: the footer text follows
/// the body after one blank line. A missing or empty footer leaves the body
/// untouched.
pub fn compose_body(body: &str, footer_text: Option<&str>) -> String {
    match footer_text {
        Some(footer) if !footer.is_empty() => format!("{body}\n\n{footer}"),
        _ => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn footer_follows_blank_line() {
        let composed = compose_body("Hello there.", Some("Unsubscribe: reply STOP"));
        assert_eq!(composed, "Hello there.\n\nUnsubscribe: reply STOP");
    }

    #[test]
    fn no_footer_leaves_body_untouched() {
        assert_eq!(compose_body("Hello there.", None), "Hello there.");
    }

    #[test]
    fn empty_footer_adds_nothing() {
        assert_eq!(compose_body("Hello there.", Some("")), "Hello there.");
    }
}
