use std::collections::HashMap;

use crate::foundation::error::{GlowreelError, GlowreelResult};
use crate::foundation::math::mul_div255_u16;
use crate::render::frame::FrameRGBA;

/// Alpha at or above this is treated as fully opaque and takes the cheap path.
const OPAQUE_TOLERANCE: f64 = 0.999;

/// Pool configuration for cached output buffers.
#[derive(Debug, Clone, Copy)]
pub struct BufferPoolOpts {
    /// Maximum bytes retained across all buckets.
    pub max_pool_bytes: usize,
    /// Maximum number of retained buffers per size bucket.
    pub max_buffers_per_bucket: usize,
}

impl Default for BufferPoolOpts {
    fn default() -> Self {
        Self {
            // A handful of 1000x1000 RGBA frames.
            max_pool_bytes: 64 * 1024 * 1024,
            max_buffers_per_bucket: 4,
        }
    }
}

/// Counters describing pool behavior over a run.
#[derive(Debug, Default, Clone)]
pub struct BufferPoolStats {
    /// Buffers currently parked in the pool.
    pub retained_buffers: usize,
    /// Bytes currently parked in the pool.
    pub retained_bytes: usize,
    /// Fresh allocations that missed the pool.
    pub alloc_buffers: u64,
    /// Bytes freshly allocated over the run.
    pub alloc_bytes: u64,
    /// Releases dropped because a cap was hit.
    pub dropped_on_release: u64,
}

struct Bucket {
    byte_len: usize,
    buffers: Vec<Vec<u8>>,
}

/// Bounded pooled allocator for encoder-bound byte buffers.
///
/// Keyed by byte length. Borrow/release happens at frame granularity.
struct BufferPool {
    opts: BufferPoolOpts,
    stats: BufferPoolStats,
    bucket_idx_by_len: HashMap<usize, usize>,
    buckets: Vec<Bucket>,
}

impl BufferPool {
    fn new(opts: BufferPoolOpts) -> Self {
        Self {
            opts,
            stats: BufferPoolStats::default(),
            bucket_idx_by_len: HashMap::new(),
            buckets: Vec::new(),
        }
    }

    fn borrow(&mut self, byte_len: usize) -> GlowreelResult<Vec<u8>> {
        if let Some(&bi) = self.bucket_idx_by_len.get(&byte_len)
            && let Some(buf) = self.buckets[bi].buffers.pop()
        {
            self.stats.retained_buffers = self.stats.retained_buffers.saturating_sub(1);
            self.stats.retained_bytes = self.stats.retained_bytes.saturating_sub(byte_len);
            return Ok(buf);
        }

        self.stats.alloc_buffers = self.stats.alloc_buffers.saturating_add(1);
        self.stats.alloc_bytes = self.stats.alloc_bytes.saturating_add(byte_len as u64);

        let mut buf = Vec::new();
        buf.try_reserve_exact(byte_len).map_err(|_| {
            GlowreelError::buffer_alloc(format!("failed to allocate {byte_len} byte frame buffer"))
        })?;
        buf.resize(byte_len, 0);
        Ok(buf)
    }

    fn release(&mut self, buf: Vec<u8>) {
        if self.opts.max_pool_bytes == 0 || self.opts.max_buffers_per_bucket == 0 {
            self.stats.dropped_on_release = self.stats.dropped_on_release.saturating_add(1);
            return;
        }

        let byte_len = buf.len();
        if self.stats.retained_bytes.saturating_add(byte_len) > self.opts.max_pool_bytes {
            self.stats.dropped_on_release = self.stats.dropped_on_release.saturating_add(1);
            return;
        }

        let bi = match self.bucket_idx_by_len.get(&byte_len).copied() {
            Some(i) => i,
            None => {
                let i = self.buckets.len();
                self.buckets.push(Bucket {
                    byte_len,
                    buffers: Vec::new(),
                });
                self.bucket_idx_by_len.insert(byte_len, i);
                i
            }
        };

        let bucket = &mut self.buckets[bi];
        if bucket.buffers.len() >= self.opts.max_buffers_per_bucket {
            self.stats.dropped_on_release = self.stats.dropped_on_release.saturating_add(1);
            return;
        }

        bucket.buffers.push(buf);
        self.stats.retained_buffers = self.stats.retained_buffers.saturating_add(1);
        self.stats.retained_bytes = self.stats.retained_bytes.saturating_add(bucket.byte_len);
    }
}

/// One encoder-ready frame buffer: opaque RGBA8, exclusively owned until
/// released back through [`PixelBufferBridge::release`].
#[derive(Debug)]
pub struct PixelBuffer {
    /// Opaque RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Buffer width in pixels.
    pub width: u32,
    /// Buffer height in pixels.
    pub height: u32,
}

/// Converts composed premultiplied frames into opaque encoder buffers,
/// applying the scene-transition alpha in the same pass.
pub struct PixelBufferBridge {
    pool: BufferPool,
}

impl Default for PixelBufferBridge {
    fn default() -> Self {
        Self::new()
    }
}

impl PixelBufferBridge {
    /// Bridge with default pool caps.
    pub fn new() -> Self {
        Self::with_opts(BufferPoolOpts::default())
    }

    /// Bridge with explicit pool caps.
    pub fn with_opts(opts: BufferPoolOpts) -> Self {
        Self {
            pool: BufferPool::new(opts),
        }
    }

    /// Pool counters for diagnostics.
    pub fn stats(&self) -> BufferPoolStats {
        self.pool.stats.clone()
    }

    /// Flatten `frame` over black at the given uniform `alpha` into a pooled
    /// opaque buffer.
    ///
    /// `alpha >= 0.999` takes a direct blit; lower alphas scale every channel
    /// toward black, which is what produces the fade-in/out look.
    pub fn to_buffer(&mut self, frame: &FrameRGBA, alpha: f64) -> GlowreelResult<PixelBuffer> {
        let expected = (frame.width as usize)
            .saturating_mul(frame.height as usize)
            .saturating_mul(4);
        if frame.data.len() != expected {
            return Err(GlowreelError::validation(format!(
                "frame byte length {} does not match {}x{}",
                frame.data.len(),
                frame.width,
                frame.height
            )));
        }
        if !frame.premultiplied {
            return Err(GlowreelError::validation(
                "pixel buffer bridge expects premultiplied frames",
            ));
        }

        let mut data = self.pool.borrow(expected)?;

        if alpha >= OPAQUE_TOLERANCE {
            // Premul over opaque black: color channels pass through.
            for (d, s) in data.chunks_exact_mut(4).zip(frame.data.chunks_exact(4)) {
                d[0] = s[0];
                d[1] = s[1];
                d[2] = s[2];
                d[3] = 255;
            }
        } else {
            let a = (alpha.clamp(0.0, 1.0) * 255.0).round() as u16;
            for (d, s) in data.chunks_exact_mut(4).zip(frame.data.chunks_exact(4)) {
                d[0] = mul_div255_u16(u16::from(s[0]), a) as u8;
                d[1] = mul_div255_u16(u16::from(s[1]), a) as u8;
                d[2] = mul_div255_u16(u16::from(s[2]), a) as u8;
                d[3] = 255;
            }
        }

        Ok(PixelBuffer {
            data,
            width: frame.width,
            height: frame.height,
        })
    }

    /// Return a consumed buffer to the pool.
    pub fn release(&mut self, buffer: PixelBuffer) {
        self.pool.release(buffer.data);
    }
}
