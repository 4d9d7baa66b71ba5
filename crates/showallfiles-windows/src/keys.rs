/// Named keys and their virtual key codes. The first alias is canonical.
const NAMED_KEYS: &[(&[&str], u32)] = &[
    (&["PERIOD", "DOT"], 0xBE),
    (&["COMMA"], 0xBC),
    (&["MINUS"], 0xBD),
    (&["PLUS", "EQUALS"], 0xBB),
    (&["SLASH"], 0xBF),
    (&["BACKSLASH"], 0xDC),
    (&["SEMICOLON"], 0xBA),
    (&["QUOTE"], 0xDE),
    (&["BACKTICK", "GRAVE"], 0xC0),
    (&["LBRACKET"], 0xDB),
    (&["RBRACKET"], 0xDD),
    (&["SPACE"], 0x20),
    (&["ENTER", "RETURN"], 0x0D),
    (&["TAB"], 0x09),
    (&["ESCAPE", "ESC"], 0x1B),
    (&["BACKSPACE"], 0x08),
    (&["INSERT", "INS"], 0x2D),
    (&["DELETE", "DEL"], 0x2E),
    (&["HOME"], 0x24),
    (&["END"], 0x23),
    (&["PAGEUP", "PGUP"], 0x21),
    (&["PAGEDOWN", "PGDN"], 0x22),
    (&["LEFT"], 0x25),
    (&["UP"], 0x26),
    (&["RIGHT"], 0x27),
    (&["DOWN"], 0x28),
];

/// Converts a key name to a Windows virtual key code.
///
/// Accepts a single letter or digit, `F1`-`F24`, or one of the named
/// keys above. Matching is case-insensitive.
pub fn vk_from_name(name: &str) -> Option<u32> {
    let upper = name.trim().to_ascii_uppercase();

    if let [ch] = upper.as_bytes()
        && ch.is_ascii_alphanumeric()
    {
        // VK codes for A-Z and 0-9 equal their ASCII values.
        return Some(u32::from(*ch));
    }

    if let Some(n) = upper.strip_prefix('F').and_then(|n| n.parse::<u32>().ok())
        && (1..=24).contains(&n)
    {
        return Some(0x70 + n - 1);
    }

    NAMED_KEYS
        .iter()
        .find(|(aliases, _)| aliases.contains(&upper.as_str()))
        .map(|&(_, vk)| vk)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_hotkey_key_is_oem_period() {
        assert_eq!(vk_from_name("Period"), Some(0xBE));
        assert_eq!(vk_from_name("dot"), Some(0xBE));
    }

    #[test]
    fn letters_and_digits_map_to_ascii() {
        assert_eq!(vk_from_name("h"), Some(0x48));
        assert_eq!(vk_from_name("Z"), Some(0x5A));
        assert_eq!(vk_from_name("7"), Some(0x37));
    }

    #[test]
    fn function_keys() {
        assert_eq!(vk_from_name("F1"), Some(0x70));
        assert_eq!(vk_from_name("f12"), Some(0x7B));
        assert_eq!(vk_from_name("F24"), Some(0x87));
        assert_eq!(vk_from_name("F25"), None);
    }

    #[test]
    fn unknown_names_are_rejected() {
        assert_eq!(vk_from_name(""), None);
        assert_eq!(vk_from_name("Hyper"), None);
        assert_eq!(vk_from_name("!"), None);
    }
}
