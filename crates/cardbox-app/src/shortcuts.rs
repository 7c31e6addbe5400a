//! Keyboard shortcut registry and documentation.

/// A keyboard shortcut definition.
#[derive(Debug, Clone)]
pub struct Shortcut {
    pub key: &'static str,
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
    pub description: &'static str,
}

impl Shortcut {
    pub const fn new(key: &'static str, ctrl: bool, shift: bool, alt: bool, description: &'static str) -> Self {
        Self {
            key,
            ctrl,
            shift,
            alt,
            description,
        }
    }

    /// Format the shortcut for display (e.g., "Shift+Arrow").
    pub fn format(&self) -> String {
        let mut parts = Vec::new();
        if self.ctrl {
            parts.push("Ctrl");
        }
        if self.shift {
            parts.push("Shift");
        }
        if self.alt {
            parts.push("Alt");
        }
        parts.push(self.key);
        parts.join("+")
    }
}

/// Registry of all board shortcuts.
pub struct ShortcutRegistry;

impl ShortcutRegistry {
    /// Get all registered shortcuts.
    pub fn all() -> Vec<Shortcut> {
        vec![
            Shortcut::new("Arrow", false, false, false, "Select the nearest card in that direction"),
            Shortcut::new("Arrow", false, true, false, "Add the nearest card to the selection"),
            Shortcut::new("Arrow", false, false, true, "Move the selected cards"),
            Shortcut::new("Delete", false, false, false, "Delete selected cards"),
            Shortcut::new("Escape", false, false, false, "Clear the selection"),
            Shortcut::new("A", true, false, false, "Select all cards"),
            Shortcut::new("C", true, false, false, "Copy cards"),
            Shortcut::new("V", true, false, false, "Paste cards"),
            Shortcut::new("G", true, false, false, "Group selected cards"),
            Shortcut::new("Click", true, false, false, "Toggle a card in the selection"),
            Shortcut::new("Click", false, false, false, "Select a card, again to cycle its groups"),
        ]
    }

    /// Print all shortcuts to console.
    pub fn print_all() {
        println!("\n=== Keyboard Shortcuts ===");
        for shortcut in Self::all() {
            println!("  {:20} {}", shortcut.format(), shortcut.description);
        }
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format() {
        assert_eq!(Shortcut::new("Arrow", false, true, false, "").format(), "Shift+Arrow");
        assert_eq!(Shortcut::new("G", true, false, false, "").format(), "Ctrl+G");
        assert_eq!(Shortcut::new("Delete", false, false, false, "").format(), "Delete");
    }

    #[test]
    fn test_registry_has_no_duplicates() {
        let all = ShortcutRegistry::all();
        let mut formatted: Vec<String> = all.iter().map(Shortcut::format).collect();
        formatted.sort();
        formatted.dedup();
        assert_eq!(formatted.len(), all.len());
    }
}
