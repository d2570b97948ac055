use std::sync::Arc;

use parking_lot::RwLock;

pub mod constants;

pub use constants::*;

/// A shared, lock-protected value.
pub type Atomic<T> = Arc<RwLock<T>>;

#[inline]
pub fn atomic<T>(t: T) -> Atomic<T> {
    Arc::new(RwLock::new(t))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_atomic() {
        let atomic_value = atomic(5);
        assert_eq!(*atomic_value.read(), 5);
        *atomic_value.write() = 10;
        assert_eq!(*atomic_value.read(), 10);
    }
}
