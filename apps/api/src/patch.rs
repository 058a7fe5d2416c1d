//! Tri-state field override: distinguishes a key that was never sent from a
//! key explicitly set to null from a key carrying a value.
//!
//! Fields typed `Patch<T>` must be annotated `#[serde(default)]` so a missing
//! key deserializes to `Absent` instead of failing.

use serde::{Deserialize, Deserializer};

#[derive(Debug, Clone, PartialEq)]
pub enum Patch<T> {
    /// Key not present in the payload: keep whatever value already exists.
    Absent,
    /// Key present with an explicit null: clear the value.
    Null,
    /// Key present with a value: replace.
    Value(T),
}

// A derived impl would demand `T: Default`, which dates and lists don't need.
impl<T> Default for Patch<T> {
    fn default() -> Self {
        Patch::Absent
    }
}

impl<T> Patch<T> {
    /// Presence-wins merge: `Absent` keeps the live value, `Null` clears it,
    /// `Value` replaces it.
    pub fn resolve(self, live: Option<T>) -> Option<T> {
        match self {
            Patch::Absent => live,
            Patch::Null => None,
            Patch::Value(value) => Some(value),
        }
    }

    /// In-place variant of [`Patch::resolve`] for partial updates.
    pub fn apply_to(self, slot: &mut Option<T>) {
        match self {
            Patch::Absent => {}
            Patch::Null => *slot = None,
            Patch::Value(value) => *slot = Some(value),
        }
    }
}

impl<'de, T> Deserialize<'de> for Patch<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<T>::deserialize(deserializer)? {
            None => Patch::Null,
            Some(value) => Patch::Value(value),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Payload {
        #[serde(default)]
        name: Patch<String>,
    }

    #[test]
    fn test_missing_key_is_absent() {
        let payload: Payload = serde_json::from_str("{}").unwrap();
        assert_eq!(payload.name, Patch::Absent);
    }

    #[test]
    fn test_explicit_null_is_null() {
        let payload: Payload = serde_json::from_str(r#"{"name": null}"#).unwrap();
        assert_eq!(payload.name, Patch::Null);
    }

    #[test]
    fn test_value_is_value() {
        let payload: Payload = serde_json::from_str(r#"{"name": "x"}"#).unwrap();
        assert_eq!(payload.name, Patch::Value("x".to_string()));
    }

    #[test]
    fn test_resolve_absent_keeps_live() {
        let patch: Patch<i32> = Patch::Absent;
        assert_eq!(patch.resolve(Some(7)), Some(7));
    }

    #[test]
    fn test_resolve_null_clears_live() {
        let patch: Patch<i32> = Patch::Null;
        assert_eq!(patch.resolve(Some(7)), None);
    }

    #[test]
    fn test_resolve_value_replaces_live() {
        assert_eq!(Patch::Value(3).resolve(Some(7)), Some(3));
    }

    #[test]
    fn test_apply_to() {
        let mut slot = Some("old".to_string());
        Patch::Absent.apply_to(&mut slot);
        assert_eq!(slot.as_deref(), Some("old"));
        Patch::Value("new".to_string()).apply_to(&mut slot);
        assert_eq!(slot.as_deref(), Some("new"));
        Patch::<String>::Null.apply_to(&mut slot);
        assert_eq!(slot, None);
    }
}
