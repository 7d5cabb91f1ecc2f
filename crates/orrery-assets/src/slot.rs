//! The three-state container for an asynchronously loaded asset.

use crate::AssetError;

/// An asset that may not have arrived yet.
///
/// Transitions only go `Pending -> Loaded` or `Pending -> Failed`. Once settled
/// a slot never changes again.
#[derive(Debug, Clone, PartialEq)]
pub enum AssetSlot<T> {
    Pending,
    Loaded(T),
    /// Human-readable reason, kept for logs.
    Failed(String),
}

impl<T> Default for AssetSlot<T> {
    fn default() -> Self {
        AssetSlot::Pending
    }
}

impl<T> AssetSlot<T> {
    pub fn get(&self) -> Option<&T> {
        match self {
            AssetSlot::Loaded(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, AssetSlot::Pending)
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, AssetSlot::Loaded(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, AssetSlot::Failed(_))
    }

    /// Settle a pending slot with a load result. Returns `false` and leaves
    /// the slot untouched if it was already settled.
    pub fn resolve(&mut self, result: Result<T, AssetError>) -> bool {
        if !self.is_pending() {
            return false;
        }
        *self = match result {
            Ok(value) => AssetSlot::Loaded(value),
            Err(e) => AssetSlot::Failed(e.to_string()),
        };
        true
    }

    /// Short state name for logging.
    pub fn state_name(&self) -> &'static str {
        match self {
            AssetSlot::Pending => "pending",
            AssetSlot::Loaded(_) => "loaded",
            AssetSlot::Failed(_) => "failed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn empty_error() -> AssetError {
        AssetError::Empty {
            path: PathBuf::from("ambient.mp3"),
        }
    }

    #[test]
    fn test_starts_pending() {
        let slot: AssetSlot<u32> = AssetSlot::default();
        assert!(slot.is_pending());
        assert_eq!(slot.get(), None);
        assert_eq!(slot.state_name(), "pending");
    }

    #[test]
    fn test_resolve_ok() {
        let mut slot = AssetSlot::Pending;
        assert!(slot.resolve(Ok(7u32)));
        assert_eq!(slot.get(), Some(&7));
        assert!(slot.is_loaded());
    }

    #[test]
    fn test_resolve_err_keeps_reason() {
        let mut slot: AssetSlot<u32> = AssetSlot::Pending;
        assert!(slot.resolve(Err(empty_error())));
        assert!(slot.is_failed());
        assert_eq!(slot.get(), None);
        match slot {
            AssetSlot::Failed(reason) => assert!(reason.contains("ambient.mp3")),
            other => panic!("expected Failed, got {other:?}"),
        }
    }

    #[test]
    fn test_settled_slot_is_final() {
        let mut slot = AssetSlot::Pending;
        slot.resolve(Ok(1u32));
        assert!(!slot.resolve(Ok(2)));
        assert!(!slot.resolve(Err(empty_error())));
        assert_eq!(slot.get(), Some(&1));

        let mut failed: AssetSlot<u32> = AssetSlot::Failed("gone".into());
        assert!(!failed.resolve(Ok(3)));
        assert!(failed.is_failed());
    }
}
