//! Event handler naming.
//!
//! A field named `on` followed by a lowercase letter is an event handler
//! for the event type that follows the prefix. Lifecycle hooks use an
//! uppercase letter after `on` and so never collide.

/// The event type handled by a field named `name`, if it names a handler.
pub fn event_type(name: &str) -> Option<&str> {
    let rest = name.strip_prefix("on")?;
    rest.chars()
        .next()
        .is_some_and(|c| c.is_ascii_lowercase())
        .then_some(rest)
}

/// The field name holding the handler for `event_type`.
pub fn handler_name(event_type: &str) -> String {
    format!("on{event_type}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_handler_names() {
        assert_eq!(event_type("onclick"), Some("click"));
        assert_eq!(event_type("oninput"), Some("input"));
        assert_eq!(event_type("onMount"), None);
        assert_eq!(event_type("on"), None);
        assert_eq!(event_type("on-click"), None);
        assert_eq!(event_type("render"), None);
        assert_eq!(handler_name("keypress"), "onkeypress");
    }
}
