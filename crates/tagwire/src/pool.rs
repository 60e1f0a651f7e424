//! Reusable encode buffers
//!
//! A [`BufferPool`] hands out zeroed buffers as [`PooledBuffer`] guards. The
//! guard gives its storage back to the pool when dropped, whatever path the
//! caller leaves by.

use std::ops::{Deref, DerefMut};
use std::sync::{Mutex, MutexGuard, PoisonError};

use log::debug;

use crate::builder::verify;
use crate::errors::Result;
use crate::field::Marshal;

/// Limits on what a [`BufferPool`] keeps around
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolConfig {
    /// Most idle buffers retained at once
    pub max_buffers: usize,
    /// Buffers with a larger capacity are freed instead of retained
    pub max_retained_capacity: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_buffers: 16,
            max_retained_capacity: 64 * 1024,
        }
    }
}

impl PoolConfig {
    /// Set the number of idle buffers retained
    pub fn with_max_buffers(mut self, max_buffers: usize) -> Self {
        self.max_buffers = max_buffers;
        self
    }

    /// Set the largest capacity a buffer may have to be retained
    pub fn with_max_retained_capacity(mut self, capacity: usize) -> Self {
        self.max_retained_capacity = capacity;
        self
    }
}

/// A shared set of reusable byte buffers
#[derive(Debug, Default)]
pub struct BufferPool {
    config: PoolConfig,
    idle: Mutex<Vec<Vec<u8>>>,
}

impl BufferPool {
    /// Create an empty pool
    pub fn new(config: PoolConfig) -> Self {
        Self {
            config,
            idle: Mutex::new(Vec::new()),
        }
    }

    /// The pool's limits
    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Number of buffers currently waiting to be reused
    pub fn idle(&self) -> usize {
        self.lock().len()
    }

    /// Borrow a zeroed buffer of exactly `len` bytes
    pub fn acquire(&self, len: usize) -> PooledBuffer<'_> {
        let mut storage = self.lock().pop().unwrap_or_default();
        storage.clear();
        storage.resize(len, 0);
        PooledBuffer {
            pool: self,
            storage,
        }
    }

    /// Encode `value` into a pooled buffer of exactly its size
    pub fn encode<T: Marshal + ?Sized>(&self, value: &T) -> Result<PooledBuffer<'_>> {
        let size = value.size();
        let mut buf = self.acquire(size);
        let written = value.marshal(0, &mut buf)?;
        verify(size, written)?;
        Ok(buf)
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Vec<u8>>> {
        // idle buffers are plain bytes, a poisoned lock still guards a valid list
        self.idle.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn release(&self, mut storage: Vec<u8>) {
        if storage.capacity() == 0 {
            return;
        }
        if storage.capacity() > self.config.max_retained_capacity {
            debug!(
                "dropping pooled buffer of capacity {} (limit {})",
                storage.capacity(),
                self.config.max_retained_capacity
            );
            return;
        }

        let mut idle = self.lock();
        if idle.len() >= self.config.max_buffers {
            debug!("dropping pooled buffer: {} already idle", idle.len());
            return;
        }
        storage.clear();
        idle.push(storage);
    }
}

/// A buffer on loan from a [`BufferPool`]
#[derive(Debug)]
pub struct PooledBuffer<'p> {
    pool: &'p BufferPool,
    storage: Vec<u8>,
}

impl PooledBuffer<'_> {
    /// Take the bytes out of the pool for good
    pub fn into_vec(mut self) -> Vec<u8> {
        std::mem::take(&mut self.storage)
    }
}

impl Deref for PooledBuffer<'_> {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.storage
    }
}

impl DerefMut for PooledBuffer<'_> {
    fn deref_mut(&mut self) -> &mut [u8] {
        &mut self.storage
    }
}

impl AsRef<[u8]> for PooledBuffer<'_> {
    fn as_ref(&self) -> &[u8] {
        &self.storage
    }
}

impl Drop for PooledBuffer<'_> {
    fn drop(&mut self) {
        self.pool.release(std::mem::take(&mut self.storage));
    }
}
