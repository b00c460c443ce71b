//! Unit tests for the SMS backends and registry.


use super::{is_valid_phone_number, mask_phone_number};

#[test]
fn mask_phone_number_keeps_last_four_digits() {
    assert_eq!(mask_phone_number("+1234567890"), "+******7890");
    assert_eq!(mask_phone_number("+12345678901234"), "+**********1234");
    assert_eq!(mask_phone_number("1234567890"), "******7890");
    assert_eq!(mask_phone_number("123"), "***");
    assert_eq!(mask_phone_number("1234"), "****");
}

#[test]
fn mask_phone_number_handles_non_ascii_input() {
    // Invalid numbers still flow through masking on error paths, so
    // multi-byte characters must not split.
    assert_eq!(mask_phone_number("+٠١٢٣٤٥٦٧٨٩"), "+******٦٧٨٩");
    assert_eq!(mask_phone_number("téléphone"), "*****hone");
    assert_eq!(mask_phone_number("numé"), "****");
}

#[test]
fn e164_validation() {
    assert!(is_valid_phone_number("+1234567890"));
    assert!(is_valid_phone_number("+123456789012345"));

    assert!(!is_valid_phone_number("1234567890")); // no plus
    assert!(!is_valid_phone_number("+123")); // too short
    assert!(!is_valid_phone_number("+1234567890123456")); // too long
    assert!(!is_valid_phone_number("+123abc4567")); // letters
    assert!(!is_valid_phone_number("+"));
}
