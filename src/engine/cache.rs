use std::sync::Arc;
use std::time::{Duration, Instant};

use image::RgbImage;
use indexmap::IndexMap;
use serde::Serialize;

use crate::config::SegmentationMode;
use crate::raster::content_checksum;
use crate::segmentation::SegmentationResult;

pub const DEFAULT_TTL: Duration = Duration::from_secs(60);
pub const DEFAULT_CAPACITY_KB: usize = 10 * 1024;

/// Single-slot cache for the most recent whole-image result. A hit must match
/// the stored mode and land inside the validity window; anything else is a
/// miss, and a mode switch wipes the slot outright.
#[derive(Debug)]
pub struct HotCache {
    validity: Duration,
    slot: Option<HotEntry>,
}

#[derive(Debug)]
struct HotEntry {
    mode: SegmentationMode,
    stored_at: Instant,
    result: Arc<SegmentationResult>,
}

impl HotCache {
    pub fn new(validity: Duration) -> Self {
        Self {
            validity,
            slot: None,
        }
    }

    pub fn get(&self, mode: SegmentationMode) -> Option<Arc<SegmentationResult>> {
        let entry = self.slot.as_ref()?;
        if entry.mode != mode || entry.stored_at.elapsed() >= self.validity {
            return None;
        }
        Some(Arc::clone(&entry.result))
    }

    pub fn store(&mut self, mode: SegmentationMode, result: Arc<SegmentationResult>) {
        self.slot = Some(HotEntry {
            mode,
            stored_at: Instant::now(),
            result,
        });
    }

    pub fn invalidate(&mut self) {
        self.slot = None;
    }

    pub fn age_ms(&self) -> Option<u64> {
        self.slot
            .as_ref()
            .map(|e| e.stored_at.elapsed().as_millis() as u64)
    }
}

/// Cache key for auxiliary payloads: raster identity is approximated by
/// dimensions plus a sampled content checksum.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub width: u32,
    pub height: u32,
    pub mode: SegmentationMode,
    pub sensitivity: u8,
    pub content_hash: u64,
}

impl CacheKey {
    pub fn for_image(image: &RgbImage, mode: SegmentationMode, sensitivity: u8) -> Self {
        Self {
            width: image.width(),
            height: image.height(),
            mode,
            sensitivity,
            content_hash: content_checksum(image),
        }
    }
}

struct CacheEntry<V> {
    value: V,
    stored_at: Instant,
    kilobytes: usize,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct CacheStats {
    pub entries: usize,
    pub kilobytes: usize,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

/// LRU cache with a byte budget and a TTL checked on read. Insertion order in
/// the map doubles as the recency order: reads move the entry to the back,
/// evictions pop the front.
pub struct AnalysisCache<V> {
    entries: IndexMap<CacheKey, CacheEntry<V>>,
    ttl: Duration,
    max_kilobytes: usize,
    stored_kilobytes: usize,
    hits: u64,
    misses: u64,
    evictions: u64,
}

impl<V> AnalysisCache<V> {
    pub fn new(ttl: Duration, max_kilobytes: usize) -> Self {
        Self {
            entries: IndexMap::new(),
            ttl,
            max_kilobytes,
            stored_kilobytes: 0,
            hits: 0,
            misses: 0,
            evictions: 0,
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(DEFAULT_TTL, DEFAULT_CAPACITY_KB)
    }

    pub fn insert(&mut self, key: CacheKey, value: V, kilobytes: usize) {
        if let Some(old) = self.entries.shift_remove(&key) {
            self.stored_kilobytes -= old.kilobytes;
        }
        self.entries.insert(
            key,
            CacheEntry {
                value,
                stored_at: Instant::now(),
                kilobytes,
            },
        );
        self.stored_kilobytes += kilobytes;

        while self.stored_kilobytes > self.max_kilobytes && !self.entries.is_empty() {
            if let Some((_, dropped)) = self.entries.shift_remove_index(0) {
                self.stored_kilobytes -= dropped.kilobytes;
                self.evictions += 1;
            }
        }
    }

    pub fn get(&mut self, key: &CacheKey) -> Option<&V> {
        let Some((owned_key, entry)) = self.entries.shift_remove_entry(key) else {
            self.misses += 1;
            return None;
        };
        if entry.stored_at.elapsed() >= self.ttl {
            self.stored_kilobytes -= entry.kilobytes;
            self.misses += 1;
            return None;
        }
        self.hits += 1;
        self.entries.insert(owned_key, entry);
        self.entries.get(key).map(|e| &e.value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.stored_kilobytes = 0;
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.entries.len(),
            kilobytes: self.stored_kilobytes,
            hits: self.hits,
            misses: self.misses,
            evictions: self.evictions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segmentation::SegmentationResult;

    fn key(tag: u64) -> CacheKey {
        CacheKey {
            width: 100,
            height: 100,
            mode: SegmentationMode::Streaming,
            sensitivity: 50,
            content_hash: tag,
        }
    }

    #[test]
    fn hot_cache_hits_only_the_stored_mode() {
        let mut hot = HotCache::new(Duration::from_secs(2));
        let result = Arc::new(SegmentationResult::completed(
            Vec::new(),
            3,
            SegmentationMode::Streaming,
        ));
        hot.store(SegmentationMode::Streaming, Arc::clone(&result));

        let hit = hot.get(SegmentationMode::Streaming).expect("hit");
        assert!(Arc::ptr_eq(&hit, &result));
        assert!(hot.get(SegmentationMode::Precision).is_none());

        hot.invalidate();
        assert!(hot.get(SegmentationMode::Streaming).is_none());
    }

    #[test]
    fn hot_cache_expires_after_the_validity_window() {
        let mut hot = HotCache::new(Duration::from_millis(15));
        let result = Arc::new(SegmentationResult::completed(
            Vec::new(),
            1,
            SegmentationMode::Streaming,
        ));
        hot.store(SegmentationMode::Streaming, result);
        assert!(hot.get(SegmentationMode::Streaming).is_some());

        std::thread::sleep(Duration::from_millis(40));
        assert!(hot.get(SegmentationMode::Streaming).is_none());
    }

    #[test]
    fn reads_refresh_recency_before_eviction() {
        let mut cache: AnalysisCache<u32> = AnalysisCache::new(Duration::from_secs(60), 3);
        cache.insert(key(1), 10, 1);
        cache.insert(key(2), 20, 1);
        cache.insert(key(3), 30, 1);

        // Touch the oldest entry, then overflow the budget by one.
        assert_eq!(cache.get(&key(1)), Some(&10));
        cache.insert(key(4), 40, 1);

        assert!(cache.get(&key(2)).is_none());
        assert_eq!(cache.get(&key(1)), Some(&10));
        assert_eq!(cache.get(&key(3)), Some(&30));
        assert_eq!(cache.get(&key(4)), Some(&40));
        assert_eq!(cache.len(), 3);
    }

    #[test]
    fn ttl_expiry_is_checked_on_read() {
        let mut cache: AnalysisCache<&'static str> =
            AnalysisCache::new(Duration::from_millis(15), 100);
        cache.insert(key(7), "payload", 1);
        assert_eq!(cache.get(&key(7)), Some(&"payload"));

        std::thread::sleep(Duration::from_millis(40));
        assert!(cache.get(&key(7)).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn byte_budget_evicts_least_recent_first() {
        let mut cache: AnalysisCache<u8> = AnalysisCache::new(Duration::from_secs(60), 4);
        cache.insert(key(1), 1, 2);
        cache.insert(key(2), 2, 2);
        cache.insert(key(3), 3, 2);

        assert!(cache.get(&key(1)).is_none());
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.stats().kilobytes, 4);
        assert_eq!(cache.stats().evictions, 1);
    }

    #[test]
    fn keys_track_content_and_parameters() {
        let a: RgbImage = image::ImageBuffer::from_pixel(16, 16, image::Rgb([5, 5, 5]));
        let mut b = a.clone();
        b.put_pixel(0, 0, image::Rgb([200, 0, 0]));

        let ka = CacheKey::for_image(&a, SegmentationMode::Streaming, 50);
        assert_eq!(
            ka,
            CacheKey::for_image(&a, SegmentationMode::Streaming, 50)
        );
        assert_ne!(ka, CacheKey::for_image(&b, SegmentationMode::Streaming, 50));
        assert_ne!(ka, CacheKey::for_image(&a, SegmentationMode::Precision, 50));
        assert_ne!(ka, CacheKey::for_image(&a, SegmentationMode::Streaming, 10));
    }

    #[test]
    fn counters_add_up() {
        let mut cache: AnalysisCache<u8> = AnalysisCache::new(Duration::from_secs(60), 100);
        cache.insert(key(1), 1, 1);
        cache.get(&key(1));
        cache.get(&key(2));
        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.entries, 1);
    }
}
