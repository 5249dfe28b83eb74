//! Per-engine font descriptor cache.
//!
//! Maps `(weight, size)` to a shared `FontHandle` carrying the CSS-style
//! descriptor string handed to drawing backends. Inserts are idempotent, so a
//! racing double-insert is harmless; reads take the shared lock only.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::layout::font_metrics::FontWeight;

/// Font family name written into every descriptor.
pub const FONT_FAMILY: &str = "Arial";

/// A resolved font: weight, pixel size and backend descriptor.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct FontHandle(Arc<FontHandleInner>);

#[derive(PartialEq, Eq, Hash)]
struct FontHandleInner {
    weight: FontWeight,
    size_px: u32,
    descriptor: String,
}

impl FontHandle {
    fn new(weight: FontWeight, size_px: u32) -> Self {
        let descriptor = format!("{} {}px {}", weight.as_css(), size_px, FONT_FAMILY);
        Self(Arc::new(FontHandleInner {
            weight,
            size_px,
            descriptor,
        }))
    }

    pub fn weight(&self) -> FontWeight {
        self.0.weight
    }

    pub fn size_px(&self) -> u32 {
        self.0.size_px
    }

    /// e.g. `"bold 64px Arial"`.
    pub fn descriptor(&self) -> &str {
        &self.0.descriptor
    }
}

impl fmt::Debug for FontHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("FontHandle").field(&self.0.descriptor).finish()
    }
}

#[derive(Default)]
pub struct FontCache {
    fonts: RwLock<HashMap<(FontWeight, u32), FontHandle>>,
}

impl FontCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn font(&self, weight: FontWeight, size_px: u32) -> FontHandle {
        if let Some(handle) = self.fonts.read().get(&(weight, size_px)) {
            return handle.clone();
        }

        self.fonts
            .write()
            .entry((weight, size_px))
            .or_insert_with(|| FontHandle::new(weight, size_px))
            .clone()
    }

    pub fn len(&self) -> usize {
        self.fonts.read().len()
    }
}

impl fmt::Debug for FontCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FontCache")
            .field("entries", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_format() {
        let cache = FontCache::new();
        assert_eq!(
            cache.font(FontWeight::Bold, 64).descriptor(),
            "bold 64px Arial"
        );
        assert_eq!(
            cache.font(FontWeight::Normal, 48).descriptor(),
            "normal 48px Arial"
        );
    }

    #[test]
    fn test_repeated_lookup_reuses_entry() {
        let cache = FontCache::new();
        let a = cache.font(FontWeight::Normal, 64);
        let b = cache.font(FontWeight::Normal, 64);
        assert!(Arc::ptr_eq(&a.0, &b.0));
        assert_eq!(cache.len(), 1);
        cache.font(FontWeight::Bold, 64);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_concurrent_inserts_converge() {
        let cache = Arc::new(FontCache::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let cache = Arc::clone(&cache);
                std::thread::spawn(move || {
                    for size in 40..60 {
                        let weight = if i % 2 == 0 { FontWeight::Bold } else { FontWeight::Normal };
                        cache.font(weight, size);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(cache.len(), 40);
    }
}
