use bevy::prelude::*;
use crossbeam_channel::RecvTimeoutError;
use std::time::{Duration, Instant};

use crate::game::tiles::TileGrid;

use super::loader::{ChunkLoader, LoaderBatch, LoaderCommand};
use super::tile_world::TileWorld;

/// Chunks that changed residency during one drain.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ChunkDiff {
    pub loaded: Vec<IVec2>,
    pub unloaded: Vec<IVec2>,
}

impl ChunkDiff {
    pub fn is_empty(&self) -> bool {
        self.loaded.is_empty() && self.unloaded.is_empty()
    }

    fn extend(&mut self, other: ChunkDiff) {
        self.loaded.extend(other.loaded);
        self.unloaded.extend(other.unloaded);
    }
}

/// Streaming counters for diagnostics.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StreamingStats {
    pub scans: u64,
    pub loads: u64,
    pub unloads: u64,
    /// Loads deferred because the pool was full.
    pub skipped: u64,
}

/// Main-thread side of chunk streaming: keeps one scan in flight on the loader thread
/// and drains finished batches into the [`TileWorld`].
#[derive(Resource)]
pub struct ChunkStreamer {
    loader: ChunkLoader,
    target: IVec2,
    scan_in_flight: bool,
    /// Latched once the loader thread is found gone; streaming does not resume.
    loader_gone: bool,
    stats: StreamingStats,
}

impl ChunkStreamer {
    pub fn new(loader: ChunkLoader) -> Self {
        Self {
            loader,
            target: IVec2::ZERO,
            scan_in_flight: false,
            loader_gone: false,
            stats: StreamingStats::default(),
        }
    }

    /// Move the point chunks stream around. Takes effect on the next scan.
    pub fn set_target(&mut self, target: IVec2) {
        self.target = target;
    }

    pub fn target(&self) -> IVec2 {
        self.target
    }

    pub fn stats(&self) -> StreamingStats {
        self.stats
    }

    /// False once the loader thread has stopped.
    pub fn is_streaming(&self) -> bool {
        !self.loader_gone
    }

    fn request_scan(&mut self, world: &TileWorld) {
        if self.loader_gone {
            return;
        }
        let sent = self.loader.send(LoaderCommand::Scan {
            target: self.target,
            resident: world.resident_coords(),
            free_slots: world.pooled_count(),
        });
        self.scan_in_flight = sent;
        if !sent {
            self.loader_gone = true;
            warn!("[LOADER] Loader thread is gone, chunk streaming stopped");
        }
    }

    /// Per-tick step. Never blocks: if the loader has not finished its scan, nothing
    /// changes this tick.
    pub fn update(&mut self, world: &mut TileWorld) -> ChunkDiff {
        if self.loader_gone {
            return ChunkDiff::default();
        }
        if !self.scan_in_flight {
            self.request_scan(world);
            return ChunkDiff::default();
        }
        match self.loader.try_recv() {
            Ok(Some(batch)) => {
                let diff = self.apply_batch(world, batch);
                self.request_scan(world);
                diff
            }
            Ok(None) => ChunkDiff::default(),
            Err(_) => {
                warn!("[LOADER] Batch channel disconnected, chunk streaming stopped");
                self.scan_in_flight = false;
                self.loader_gone = true;
                ChunkDiff::default()
            }
        }
    }

    /// Block until the loader reports nothing left to do around the current target, or
    /// `timeout` passes. Used once at startup so the first frame has terrain.
    pub fn prefill_blocking(&mut self, world: &mut TileWorld, timeout: Duration) -> ChunkDiff {
        let deadline = Instant::now() + timeout;
        let mut total = ChunkDiff::default();
        loop {
            if !self.scan_in_flight {
                self.request_scan(world);
                if !self.scan_in_flight {
                    break;
                }
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.loader.recv_timeout(remaining) {
                Ok(batch) => {
                    let settled = batch.is_empty();
                    total.extend(self.apply_batch(world, batch));
                    self.scan_in_flight = false;
                    if settled {
                        break;
                    }
                }
                Err(RecvTimeoutError::Timeout) => {
                    warn!("[LOADER] Prefill timed out after {:?}", timeout);
                    break;
                }
                Err(RecvTimeoutError::Disconnected) => {
                    warn!("[LOADER] Batch channel disconnected during prefill");
                    self.scan_in_flight = false;
                    self.loader_gone = true;
                    break;
                }
            }
        }
        info!(
            "[LOADER] Prefill loaded {} chunks around {}",
            total.loaded.len(),
            self.target
        );
        total
    }

    /// Drain one batch: removals first, then additions. Displaced tile buffers go back
    /// to the loader.
    fn apply_batch(&mut self, world: &mut TileWorld, batch: LoaderBatch) -> ChunkDiff {
        let mut diff = ChunkDiff::default();
        for coord in batch.removals {
            if world.unload_chunk(coord) {
                diff.unloaded.push(coord);
            }
        }

        let mut recycled: Vec<TileGrid> = Vec::with_capacity(batch.additions.len());
        for mut generated in batch.additions {
            if world.load_chunk(generated.coord, &mut generated.tiles) {
                diff.loaded.push(generated.coord);
            } else {
                self.stats.skipped += 1;
            }
            recycled.push(generated.tiles);
        }
        if !recycled.is_empty() {
            self.loader.send(LoaderCommand::Recycle(recycled));
        }

        self.stats.scans += 1;
        self.stats.loads += diff.loaded.len() as u64;
        self.stats.unloads += diff.unloaded.len() as u64;
        self.stats.skipped += batch.skipped as u64;

        if !diff.is_empty() {
            debug!(
                "[CHUNKS] Applied batch for target {}: +{} -{} (resident {}, pooled {})",
                batch.target,
                diff.loaded.len(),
                diff.unloaded.len(),
                world.resident_count(),
                world.pooled_count()
            );
        }
        diff
    }
}
