//! Entity id utilities

use uuid::Uuid;

/// Generate a new random entity id (UUIDv4, hyphenated)
pub fn generate() -> String {
    Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_are_unique_and_parseable() {
        let a = generate();
        let b = generate();
        assert_ne!(a, b);
        assert!(Uuid::parse_str(&a).is_ok());
    }
}
