//! Host key code to Apple 1 key code translation.

/// Map a host key code onto the 7-bit code the replica's keyboard port
/// expects. Total over all inputs; codes with no translation pass through
/// (truncated to a byte, as the keyboard channel's range check runs on the
/// byte value).
pub fn map_to_target_code(code: u16) -> u8 {
    let code = match code {
        // Host ESC key
        203 => 27,
        // Ctrl-A .. Ctrl-Z
        577..=602 => code - 576,
        // The target has no lowercase
        97..=122 => code - 32,
        _ => code,
    };
    code as u8
}

#[cfg(test)]
mod tests {
    use super::map_to_target_code;
    use test_case::test_case;

    #[test_case(203, 27; "host escape key")]
    #[test_case(577, 1; "ctrl a")]
    #[test_case(588, 12; "ctrl l")]
    #[test_case(602, 26; "ctrl z")]
    #[test_case(97, 65; "lowercase a folds")]
    #[test_case(104, 72; "lowercase h folds")]
    #[test_case(122, 90; "lowercase z folds")]
    #[test_case(65, 65; "uppercase passes")]
    #[test_case(13, 13; "carriage return passes")]
    #[test_case(27, 27; "plain escape passes")]
    #[test_case(96, 96; "backtick passes")]
    #[test_case(123, 123; "left brace passes")]
    fn maps(code: u16, expected: u8) {
        assert_eq!(map_to_target_code(code), expected);
    }

    #[test]
    fn idempotent_once_mapped() {
        for code in 0..=255u16 {
            let mapped = map_to_target_code(code);
            assert_eq!(map_to_target_code(mapped as u16), mapped);
        }
    }
}
