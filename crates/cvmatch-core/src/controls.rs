//! Small stateless helpers behind the form's auxiliary controls

/// Display state of the API key input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyVisibility {
    #[default]
    Masked,
    Plain,
}

impl KeyVisibility {
    /// Read the state back from the input's `type` attribute
    pub fn from_input_type(input_type: &str) -> Self {
        if input_type.eq_ignore_ascii_case("password") {
            KeyVisibility::Masked
        } else {
            KeyVisibility::Plain
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            KeyVisibility::Masked => KeyVisibility::Plain,
            KeyVisibility::Plain => KeyVisibility::Masked,
        }
    }

    pub fn input_type(self) -> &'static str {
        match self {
            KeyVisibility::Masked => "password",
            KeyVisibility::Plain => "text",
        }
    }

    /// Font Awesome icon offering the opposite action
    pub fn icon_class(self) -> &'static str {
        match self {
            KeyVisibility::Masked => "fas fa-eye",
            KeyVisibility::Plain => "fas fa-eye-slash",
        }
    }
}

/// Ctrl+Enter submits the form
pub fn is_submit_shortcut(ctrl_key: bool, key: &str) -> bool {
    ctrl_key && key == "Enter"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_round_trip() {
        let start = KeyVisibility::from_input_type("password");
        assert_eq!(start, KeyVisibility::Masked);
        assert_eq!(start.icon_class(), "fas fa-eye");

        let shown = start.toggled();
        assert_eq!(shown.input_type(), "text");
        assert_eq!(shown.icon_class(), "fas fa-eye-slash");
        assert_eq!(shown.toggled(), KeyVisibility::Masked);
    }

    #[test]
    fn test_unknown_type_reads_as_plain() {
        assert_eq!(KeyVisibility::from_input_type("text"), KeyVisibility::Plain);
        assert_eq!(KeyVisibility::from_input_type(""), KeyVisibility::Plain);
    }

    #[test]
    fn test_submit_shortcut() {
        assert!(is_submit_shortcut(true, "Enter"));
        assert!(!is_submit_shortcut(false, "Enter"));
        assert!(!is_submit_shortcut(true, "a"));
    }
}
