//! Field-level validation that collects every failure instead of stopping at the first.

use std::collections::BTreeMap;

/// Field name to human-readable message. Empty means valid.
pub type ValidationErrors = BTreeMap<String, String>;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Validator {
    pub errors: ValidationErrors,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Records `message` under `key` unless that key already failed.
    pub fn add_error(&mut self, key: &str, message: &str) {
        self.errors
            .entry(key.to_string())
            .or_insert_with(|| message.to_string());
    }

    pub fn check(&mut self, ok: bool, key: &str, message: &str) {
        if !ok {
            self.add_error(key, message);
        }
    }

    pub fn into_errors(self) -> ValidationErrors {
        self.errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_message_per_key_wins() {
        let mut v = Validator::new();
        v.check(false, "title", "must be provided");
        v.check(false, "title", "must not be more than 100 bytes long");
        assert_eq!(v.errors.len(), 1);
        assert_eq!(v.errors["title"], "must be provided");
    }

    #[test]
    fn passing_checks_leave_validator_valid() {
        let mut v = Validator::new();
        v.check(true, "title", "must be provided");
        v.check(1 + 1 == 2, "description", "unreachable");
        assert!(v.valid());
        assert!(v.into_errors().is_empty());
    }

    #[test]
    fn independent_keys_accumulate() {
        let mut v = Validator::new();
        v.check(false, "title", "bad");
        v.check(false, "description", "bad");
        v.check(true, "nutritionValue", "bad");
        let errs = v.into_errors();
        assert_eq!(errs.keys().collect::<Vec<_>>(), vec!["description", "title"]);
    }
}
