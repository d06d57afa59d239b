//! # Chunk Worker Pool
//!
//! Generates chunks on a fixed set of named threads.
//!
//! ```text
//! submit(coord) ──► job channel ──► worker 0..N (own GenerationScratch)
//!                                        │
//! recv() ◄──────── result channel ◄──────┘
//! ```
//!
//! Workers share one `Arc<TerrainGenerator>` and one biome source. Results
//! arrive in completion order; [`ChunkWorkerPool::generate_all`] sorts them
//! by coordinate. Output is byte-identical to sequential generation.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{unbounded, Receiver, Sender};

use crate::biome::BiomeSource;
use crate::chunk::ChunkCoord;
use crate::error::{TerrainError, TerrainResult};
use crate::generator::{GeneratedChunk, GenerationScratch, TerrainGenerator};

/// Fixed-size pool of chunk generation threads.
pub struct ChunkWorkerPool {
    job_tx: Option<Sender<ChunkCoord>>,
    result_rx: Receiver<GeneratedChunk>,
    workers: Vec<JoinHandle<()>>,
    running: Arc<AtomicBool>,
    pending: AtomicUsize,
}

impl ChunkWorkerPool {
    /// Starts `workers` threads (at least one).
    ///
    /// # Errors
    ///
    /// Returns [`TerrainError::WorkerSpawn`] if a thread cannot be started.
    /// Threads started before the failure exit on their own.
    pub fn new(
        generator: Arc<TerrainGenerator>,
        source: Arc<dyn BiomeSource>,
        workers: usize,
    ) -> TerrainResult<Self> {
        let count = workers.max(1);
        let (job_tx, job_rx) = unbounded::<ChunkCoord>();
        let (result_tx, result_rx) = unbounded::<GeneratedChunk>();
        let running = Arc::new(AtomicBool::new(true));

        let mut handles = Vec::with_capacity(count);
        for id in 0..count {
            let jobs = job_rx.clone();
            let results = result_tx.clone();
            let generator = Arc::clone(&generator);
            let source = Arc::clone(&source);
            let running = Arc::clone(&running);

            let handle = thread::Builder::new()
                .name(format!("terrain-worker-{id}"))
                .spawn(move || {
                    let mut scratch = GenerationScratch::new();
                    while let Ok(coord) = jobs.recv() {
                        if !running.load(Ordering::Acquire) {
                            break;
                        }
                        let chunk = generator.generate_from_source(coord, &*source, &mut scratch);
                        if results.send(chunk).is_err() {
                            break;
                        }
                    }
                    tracing::debug!("Terrain worker {} exiting", id);
                })
                .map_err(|e| TerrainError::WorkerSpawn(e.to_string()))?;
            handles.push(handle);
        }

        tracing::info!("Terrain worker pool started: {} workers", count);

        Ok(Self {
            job_tx: Some(job_tx),
            result_rx,
            workers: handles,
            running,
            pending: AtomicUsize::new(0),
        })
    }

    /// Pool sized from the generator's `workers` setting.
    ///
    /// # Errors
    ///
    /// Returns [`TerrainError::WorkerSpawn`] if a thread cannot be started.
    pub fn from_config(
        generator: Arc<TerrainGenerator>,
        source: Arc<dyn BiomeSource>,
    ) -> TerrainResult<Self> {
        let workers = generator.config().workers;
        Self::new(generator, source, workers)
    }

    /// Number of worker threads.
    #[must_use]
    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Chunks submitted but not yet received.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::Acquire)
    }

    /// Queues one chunk.
    ///
    /// # Errors
    ///
    /// Returns [`TerrainError::ChunkOutOfRange`] for coordinates whose block
    /// positions do not fit in `i32`, and [`TerrainError::PoolClosed`] after
    /// shutdown.
    pub fn submit(&self, coord: ChunkCoord) -> TerrainResult<()> {
        coord.validate()?;
        let jobs = self.job_tx.as_ref().ok_or(TerrainError::PoolClosed)?;

        // Counted before the send: a receiver may take the result right away
        self.pending.fetch_add(1, Ordering::AcqRel);
        if jobs.send(coord).is_err() {
            self.pending.fetch_sub(1, Ordering::AcqRel);
            return Err(TerrainError::PoolClosed);
        }
        Ok(())
    }

    /// Waits for the next finished chunk.
    ///
    /// Returns `None` when nothing is pending or the workers are gone.
    pub fn recv(&self) -> Option<GeneratedChunk> {
        if self.pending() == 0 {
            return None;
        }
        let chunk = self.result_rx.recv().ok()?;
        self.pending.fetch_sub(1, Ordering::AcqRel);
        Some(chunk)
    }

    /// Like [`Self::recv`], giving up after `timeout`.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<GeneratedChunk> {
        if self.pending() == 0 {
            return None;
        }
        let chunk = self.result_rx.recv_timeout(timeout).ok()?;
        self.pending.fetch_sub(1, Ordering::AcqRel);
        Some(chunk)
    }

    /// Generates a batch and returns it sorted by coordinate.
    ///
    /// # Errors
    ///
    /// Returns [`TerrainError::PoolClosed`] if the pool stops before every
    /// chunk is back.
    pub fn generate_all(&self, coords: &[ChunkCoord]) -> TerrainResult<Vec<GeneratedChunk>> {
        for &coord in coords {
            self.submit(coord)?;
        }

        let mut chunks = Vec::with_capacity(coords.len());
        while chunks.len() < coords.len() {
            chunks.push(self.recv().ok_or(TerrainError::PoolClosed)?);
        }
        chunks.sort_by_key(GeneratedChunk::coord);
        Ok(chunks)
    }

    /// Stops accepting work, lets workers finish their current chunk and
    /// joins them. Queued but unstarted jobs are dropped.
    pub fn shutdown(&mut self) {
        if self.job_tx.is_none() {
            return;
        }
        self.running.store(false, Ordering::Release);
        self.job_tx = None;

        let workers = self.workers.len();
        for handle in self.workers.drain(..) {
            if handle.join().is_err() {
                tracing::error!("Terrain worker panicked");
            }
        }
        tracing::info!("Terrain worker pool stopped ({} workers)", workers);
    }
}

impl Drop for ChunkWorkerPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for ChunkWorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChunkWorkerPool")
            .field("workers", &self.workers.len())
            .field("pending", &self.pending())
            .field("open", &self.job_tx.is_some())
            .finish()
    }
}
