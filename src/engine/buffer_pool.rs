use std::ops::{Deref, DerefMut};
use std::sync::{Arc, Mutex};

use image::RgbImage;
use serde::Serialize;
use tracing::debug;

const MAX_POOLED: usize = 5;

/// Reusable processing-raster buffers for one fixed size. Repeated calls at
/// the same resolution stop allocating after the first few frames. Returned
/// buffers are not cleared; every consumer overwrites the full raster.
#[derive(Debug)]
pub struct BufferPool {
    width: u32,
    height: u32,
    shelf: Arc<Mutex<Vec<RgbImage>>>,
    created: u64,
    reused: u64,
}

/// RAII handle to a pooled raster. Dropping it on any exit path puts the
/// buffer back on the shelf, up to the retention cap.
pub struct PooledBuffer {
    buffer: Option<RgbImage>,
    shelf: Arc<Mutex<Vec<RgbImage>>>,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct PoolStats {
    pub width: u32,
    pub height: u32,
    pub available: usize,
    pub created: u64,
    pub reused: u64,
}

impl BufferPool {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            shelf: Arc::new(Mutex::new(Vec::new())),
            created: 0,
            reused: 0,
        }
    }

    /// Points the pool at a new buffer size. Retained buffers of the old size
    /// are dropped; a matching size is a no-op.
    pub fn reset(&mut self, width: u32, height: u32) {
        if self.width == width && self.height == height {
            return;
        }
        debug!(
            "Buffer pool resized {}x{} -> {}x{}",
            self.width, self.height, width, height
        );
        self.width = width;
        self.height = height;
        self.shelf.lock().unwrap().clear();
    }

    pub fn acquire(&mut self) -> PooledBuffer {
        let recycled = self.shelf.lock().unwrap().pop();
        let buffer = match recycled {
            Some(buf) => {
                self.reused += 1;
                buf
            }
            None => {
                self.created += 1;
                RgbImage::new(self.width, self.height)
            }
        };
        PooledBuffer {
            buffer: Some(buffer),
            shelf: Arc::clone(&self.shelf),
        }
    }

    pub fn clear(&mut self) {
        self.shelf.lock().unwrap().clear();
    }

    pub fn stats(&self) -> PoolStats {
        PoolStats {
            width: self.width,
            height: self.height,
            available: self.shelf.lock().unwrap().len(),
            created: self.created,
            reused: self.reused,
        }
    }
}

impl Deref for PooledBuffer {
    type Target = RgbImage;

    fn deref(&self) -> &RgbImage {
        self.buffer.as_ref().expect("buffer taken")
    }
}

impl DerefMut for PooledBuffer {
    fn deref_mut(&mut self) -> &mut RgbImage {
        self.buffer.as_mut().expect("buffer taken")
    }
}

impl Drop for PooledBuffer {
    fn drop(&mut self) {
        if let Some(buffer) = self.buffer.take() {
            let mut shelf = self.shelf.lock().unwrap();
            if shelf.len() < MAX_POOLED {
                shelf.push(buffer);
            }
        }
    }
}
