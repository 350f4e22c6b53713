//! Shared error alias.
//!
//! Crates keep their own error enums next to the code that raises them and
//! wrap lower failures with rootcause's `.context()`, so a handler-level
//! report carries the whole chain down to the failing service call.

use rootcause::Report;

/// Result whose error is a rootcause report with context `C`.
pub type Result<T, C = ()> = std::result::Result<T, Report<C>>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt;

    #[derive(Debug)]
    struct Lookup;

    impl fmt::Display for Lookup {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("lookup failed")
        }
    }

    impl std::error::Error for Lookup {}

    fn lookup(found: bool) -> Result<u8, Lookup> {
        if found { Ok(7) } else { Err(Report::new(Lookup)) }
    }

    #[test]
    fn carries_typed_context() {
        assert_eq!(lookup(true).expect("found"), 7);

        let report = lookup(false).unwrap_err();
        assert!(report.to_string().contains("lookup failed"));
    }
}
