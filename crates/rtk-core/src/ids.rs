//! ID prefix constants and format validation.
//!
//! Store-generated ids have the shape `{prefix}-{8 lowercase hex}`, e.g.
//! `std-a3f8b2c1`. Every operation that takes an id from a caller checks the
//! shape first so malformed references surface as a bad-identifier failure
//! instead of a silent miss.

pub const PREFIX_TEMPLATE: &str = "mdt";
pub const PREFIX_STUDY: &str = "std";
pub const PREFIX_POOL: &str = "qpl";
pub const PREFIX_ASSESSMENT: &str = "asm";

/// Length of the random hex suffix.
const SUFFIX_LEN: usize = 8;

/// Check that `id` is a well-formed store id for the given prefix.
#[must_use]
pub fn is_valid_id(id: &str, prefix: &str) -> bool {
    let Some(rest) = id.strip_prefix(prefix) else {
        return false;
    };
    let Some(suffix) = rest.strip_prefix('-') else {
        return false;
    };
    suffix.len() == SUFFIX_LEN
        && suffix
            .chars()
            .all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_well_formed_ids() {
        assert!(is_valid_id("std-a3f8b2c1", PREFIX_STUDY));
        assert!(is_valid_id("qpl-00000000", PREFIX_POOL));
        assert!(is_valid_id("mdt-deadbeef", PREFIX_TEMPLATE));
        assert!(is_valid_id("asm-0123abcd", PREFIX_ASSESSMENT));
    }

    #[test]
    fn rejects_malformed_ids() {
        assert!(!is_valid_id("", PREFIX_STUDY));
        assert!(!is_valid_id("std-", PREFIX_STUDY));
        assert!(!is_valid_id("std-a3f8b2", PREFIX_STUDY)); // too short
        assert!(!is_valid_id("std-a3f8b2c1ff", PREFIX_STUDY)); // too long
        assert!(!is_valid_id("std-A3F8B2C1", PREFIX_STUDY)); // uppercase hex
        assert!(!is_valid_id("std-a3f8b2cg", PREFIX_STUDY)); // non-hex
        assert!(!is_valid_id("qpl-a3f8b2c1", PREFIX_STUDY)); // wrong prefix
        assert!(!is_valid_id("stda3f8b2c1", PREFIX_STUDY)); // missing dash
    }
}
