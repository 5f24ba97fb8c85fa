//! Background chunk loader.
//!
//! # Protocol
//!
//! The loader thread owns nothing the main thread reads. It blocks on a command
//! channel and answers each [`LoaderCommand::Scan`] with exactly one [`LoaderBatch`]:
//!
//! 1. resident chunks farther than the view distance from the target are proposed for
//!    removal (capped per scan);
//! 2. in-range coordinates that are not resident are generated, nearest first, and
//!    staged for addition (same cap, and never more than the pool can take);
//! 3. the batch goes back on the batch channel.
//!
//! The main thread polls the batch channel without blocking, applies removals before
//! additions, then recycles the displaced tile buffers and requests the next scan.
//! Only one scan is ever in flight, so the snapshot the loader scans is exactly the
//! resident set the batch will be applied to.

use bevy::prelude::*;
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crate::game::config::WorldConfig;
use crate::game::math::GridLayout;
use crate::game::tiles::{TileGrid, TileRegistry};

use super::generation::TerrainGenerator;

pub enum LoaderCommand {
    Scan {
        /// Viewer position in tile space.
        target: IVec2,
        /// Snapshot of resident chunk coordinates.
        resident: Vec<IVec2>,
        /// Free chunk pool slots when the snapshot was taken.
        free_slots: usize,
    },
    /// Tile buffers displaced by loads, handed back for reuse.
    Recycle(Vec<TileGrid>),
    Shutdown,
}

pub struct GeneratedChunk {
    pub coord: IVec2,
    pub tiles: TileGrid,
}

/// The staged result of one scan.
#[derive(Default)]
pub struct LoaderBatch {
    pub target: IVec2,
    pub removals: Vec<IVec2>,
    pub additions: Vec<GeneratedChunk>,
    /// In-range chunks left out because the pool had no room.
    pub skipped: usize,
}

impl LoaderBatch {
    pub fn is_empty(&self) -> bool {
        self.removals.is_empty() && self.additions.is_empty()
    }
}

/// Parameters the loader scans with; copied out of [`WorldConfig`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScanSettings {
    pub layout: GridLayout,
    pub view_distance_chunks: i32,
    pub view_distance_sqr: f32,
    pub max_chunks_to_process: usize,
}

impl ScanSettings {
    pub fn from_config(config: &WorldConfig) -> Self {
        Self {
            layout: config.layout(),
            view_distance_chunks: config.view_distance_chunks,
            view_distance_sqr: config.view_distance_sqr(),
            max_chunks_to_process: config.max_chunks_to_process,
        }
    }
}

/// Coordinates one scan decided on, before any tiles are generated.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ScanPlan {
    pub removals: Vec<IVec2>,
    pub additions: Vec<IVec2>,
    pub skipped: usize,
}

fn distance_sqr(layout: &GridLayout, coord: IVec2, target: Vec2) -> f32 {
    layout.chunk_center(coord).distance_squared(target)
}

/// Decide which chunks to drop and which to load for a viewer at `target`.
pub fn plan_scan(settings: &ScanSettings, target: IVec2, resident: &[IVec2], free_slots: usize) -> ScanPlan {
    let layout = &settings.layout;
    let cap = settings.max_chunks_to_process;
    let target_pos = target.as_vec2();

    let removals: Vec<IVec2> = resident
        .iter()
        .copied()
        .filter(|&coord| distance_sqr(layout, coord, target_pos) > settings.view_distance_sqr)
        .take(cap)
        .collect();

    let center_chunk = layout.tile_to_chunk(target);
    let radius = settings.view_distance_chunks;
    let mut candidates: Vec<(f32, IVec2)> = Vec::new();
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            let coord = center_chunk + IVec2::new(dx, dy);
            let dist = distance_sqr(layout, coord, target_pos);
            if dist <= settings.view_distance_sqr && !resident.contains(&coord) {
                candidates.push((dist, coord));
            }
        }
    }
    // Nearest first; coordinate order breaks ties so the plan is deterministic.
    candidates.sort_by(|a, b| a.0.total_cmp(&b.0).then((a.1.y, a.1.x).cmp(&(b.1.y, b.1.x))));

    let wanted = candidates.len().min(cap);
    let room = free_slots + removals.len();
    let additions: Vec<IVec2> = candidates.iter().take(wanted.min(room)).map(|&(_, c)| c).collect();
    let skipped = wanted - additions.len();

    ScanPlan {
        removals,
        additions,
        skipped,
    }
}

struct LoaderWorker {
    settings: ScanSettings,
    generator: TerrainGenerator,
    registry: TileRegistry,
    spare: Vec<TileGrid>,
}

impl LoaderWorker {
    fn scan(&mut self, target: IVec2, resident: &[IVec2], free_slots: usize) -> LoaderBatch {
        let plan = plan_scan(&self.settings, target, resident, free_slots);
        let layout = self.settings.layout;
        let additions = plan
            .additions
            .iter()
            .map(|&coord| {
                let mut tiles = self
                    .spare
                    .pop()
                    .unwrap_or_else(|| TileGrid::new(layout.chunk_size));
                self.generator.fill_chunk(coord, &layout, &self.registry, &mut tiles);
                GeneratedChunk { coord, tiles }
            })
            .collect();
        LoaderBatch {
            target,
            removals: plan.removals,
            additions,
            skipped: plan.skipped,
        }
    }

    fn run(mut self, commands: Receiver<LoaderCommand>, batches: Sender<LoaderBatch>, shutdown: Arc<AtomicBool>) {
        while !shutdown.load(Ordering::Acquire) {
            match commands.recv() {
                Ok(LoaderCommand::Scan {
                    target,
                    resident,
                    free_slots,
                }) => {
                    let batch = self.scan(target, &resident, free_slots);
                    if batches.send(batch).is_err() {
                        break;
                    }
                }
                Ok(LoaderCommand::Recycle(buffers)) => {
                    self.spare.extend(buffers);
                }
                Ok(LoaderCommand::Shutdown) | Err(_) => break,
            }
        }
    }
}

/// Handle to the loader thread. Dropping it shuts the thread down.
pub struct ChunkLoader {
    commands: Sender<LoaderCommand>,
    batches: Receiver<LoaderBatch>,
    shutdown: Arc<AtomicBool>,
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
    shutdown_timeout: Duration,
}

impl ChunkLoader {
    pub fn spawn(config: &WorldConfig, registry: TileRegistry) -> std::io::Result<Self> {
        let (command_tx, command_rx) = bounded(8);
        let (batch_tx, batch_rx) = bounded(1);
        let shutdown = Arc::new(AtomicBool::new(false));
        let running = Arc::new(AtomicBool::new(true));

        let worker = LoaderWorker {
            settings: ScanSettings::from_config(config),
            generator: TerrainGenerator::new(config),
            registry,
            spare: Vec::new(),
        };
        let thread_shutdown = shutdown.clone();
        let thread_running = running.clone();
        let handle = std::thread::Builder::new()
            .name("chunk-loader".into())
            .spawn(move || {
                worker.run(command_rx, batch_tx, thread_shutdown);
                thread_running.store(false, Ordering::Release);
            })?;

        info!("[LOADER] Chunk loader thread started");
        Ok(Self {
            commands: command_tx,
            batches: batch_rx,
            shutdown,
            running,
            handle: Some(handle),
            shutdown_timeout: Duration::from_millis(config.loader_shutdown_timeout_ms),
        })
    }

    /// Queue a command. Returns false if the loader thread is gone.
    pub fn send(&self, command: LoaderCommand) -> bool {
        self.commands.send(command).is_ok()
    }

    /// Non-blocking probe for a finished batch.
    pub fn try_recv(&self) -> Result<Option<LoaderBatch>, TryRecvError> {
        match self.batches.try_recv() {
            Ok(batch) => Ok(Some(batch)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Result<LoaderBatch, RecvTimeoutError> {
        self.batches.recv_timeout(timeout)
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Stop the thread: raise the flag, wake it, poll briefly until it stops, then join.
    pub fn shutdown(&mut self) {
        let Some(handle) = self.handle.take() else {
            return;
        };
        self.shutdown.store(true, Ordering::Release);
        // A full queue is fine: the thread checks the flag after every command.
        let _ = self.commands.try_send(LoaderCommand::Shutdown);

        let deadline = Instant::now() + self.shutdown_timeout;
        while self.is_running() && Instant::now() < deadline {
            // Unblock a worker waiting to hand over a finished batch.
            while self.batches.try_recv().is_ok() {}
            std::thread::sleep(Duration::from_millis(1));
        }
        if self.is_running() {
            warn!(
                "[LOADER] Loader thread still busy after {:?}, joining anyway",
                self.shutdown_timeout
            );
        }
        if handle.join().is_err() {
            error!("[LOADER] Loader thread panicked");
        } else {
            info!("[LOADER] Chunk loader thread stopped");
        }
    }
}

impl Drop for ChunkLoader {
    fn drop(&mut self) {
        self.shutdown();
    }
}
