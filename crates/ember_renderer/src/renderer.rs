//! Multi-threaded bucket scheduler.
//!
//! The bucket list is built once per render. Workers claim bucket indices
//! from a shared atomic counter until it runs past the end, then retire.
//! The last worker to retire marks the render finished and runs the finish
//! callback.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};

use rand::rngs::SmallRng;
use rand::{RngCore, SeedableRng};
use thiserror::Error;

use crate::bucket::{generate_buckets, Bucket, BucketOrder, WorkUnit};
use crate::integrator::PixelRenderer;

/// Errors reported by the scheduler.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to spawn render worker: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("a render worker panicked")]
    WorkerPanicked,

    #[error("a render is already in progress")]
    Busy,
}

pub type RenderResult<T> = Result<T, RenderError>;

/// Lifecycle of a render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum RenderState {
    Idle = 0,
    /// Buckets are being generated
    Scheduling = 1,
    /// Workers are claiming buckets
    Draining = 2,
    /// Every worker has retired
    Finished = 3,
}

impl RenderState {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => RenderState::Scheduling,
            2 => RenderState::Draining,
            3 => RenderState::Finished,
            _ => RenderState::Idle,
        }
    }
}

/// Called once, from the last worker to retire.
pub type FinishCallback = Arc<dyn Fn() + Send + Sync>;

/// Scheduler configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderConfig {
    pub unit: WorkUnit,
    pub order: BucketOrder,
    /// Worker count, `None` for the available parallelism
    pub threads: Option<usize>,
    /// Base seed for the per-worker generators, `None` for entropy
    pub seed: Option<u64>,
}

impl RenderConfig {
    pub fn with_unit(mut self, unit: WorkUnit) -> Self {
        self.unit = unit;
        self
    }

    pub fn with_order(mut self, order: BucketOrder) -> Self {
        self.order = order;
        self
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Number of workers a render will use, at least one.
    pub fn worker_count(&self) -> usize {
        self.threads
            .unwrap_or_else(|| thread::available_parallelism().map_or(1, |n| n.get()))
            .max(1)
    }
}

/// Bucket counter shared between a render and its observers.
///
/// Outlives the bucket list, so `progress` still answers after a render has
/// finished and its schedule has been dropped.
#[derive(Default)]
struct Progress {
    next: AtomicUsize,
    total: AtomicUsize,
}

impl Progress {
    fn reset(&self, total: usize) {
        self.next.store(0, Ordering::Relaxed);
        self.total.store(total, Ordering::Relaxed);
    }

    fn get(&self) -> (usize, usize) {
        let total = self.total.load(Ordering::Relaxed);
        (self.next.load(Ordering::Relaxed).min(total), total)
    }
}

/// Shared state of one render invocation, dropped with its last worker.
struct Schedule {
    buckets: Vec<Bucket>,
    progress: Arc<Progress>,
    exited: AtomicUsize,
    workers: usize,
    seed: Option<u64>,
    state: Arc<AtomicU8>,
    on_finish: Option<FinishCallback>,
}

impl Schedule {
    fn run(&self, task: &dyn PixelRenderer, worker: usize) {
        // Retire even if the task panics, so completion still fires.
        let _retire = Retire(self);
        let mut rng = match self.seed {
            Some(seed) => SmallRng::seed_from_u64(seed.wrapping_add(worker as u64)),
            None => SmallRng::from_entropy(),
        };
        self.drain(task, &mut rng);
    }

    fn drain(&self, task: &dyn PixelRenderer, rng: &mut dyn RngCore) {
        loop {
            let index = self.progress.next.fetch_add(1, Ordering::Relaxed);
            let Some(bucket) = self.buckets.get(index) else {
                break;
            };
            for (col, row) in bucket.pixels() {
                task.render_pixel(col, row, rng);
            }
        }
    }

    fn retire(&self) {
        if self.exited.fetch_add(1, Ordering::AcqRel) + 1 == self.workers {
            self.state
                .store(RenderState::Finished as u8, Ordering::Release);
            log::debug!("All {} render workers retired", self.workers);
            if let Some(on_finish) = &self.on_finish {
                on_finish();
            }
        }
    }
}

struct Retire<'a>(&'a Schedule);

impl Drop for Retire<'_> {
    fn drop(&mut self) {
        self.0.retire();
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Distributes the pixels of a `PixelRenderer` over worker threads.
///
/// One render runs at a time. A renderer can be reused once the previous
/// render has finished.
pub struct Renderer {
    config: RenderConfig,
    state: Arc<AtomicU8>,
    on_finish: Mutex<Option<FinishCallback>>,
    progress: Arc<Progress>,
    handles: Mutex<Vec<JoinHandle<()>>>,
}

impl Renderer {
    pub fn new(config: RenderConfig) -> Self {
        Self {
            config,
            state: Arc::new(AtomicU8::new(RenderState::Idle as u8)),
            on_finish: Mutex::new(None),
            progress: Arc::new(Progress::default()),
            handles: Mutex::new(Vec::new()),
        }
    }

    pub fn config(&self) -> RenderConfig {
        self.config
    }

    pub fn state(&self) -> RenderState {
        RenderState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Install the callback run when a render finishes.
    pub fn set_finish_callback<F>(&self, on_finish: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        *lock(&self.on_finish) = Some(Arc::new(on_finish));
    }

    /// Claimed and total buckets of the current or last render.
    pub fn progress(&self) -> (usize, usize) {
        self.progress.get()
    }

    /// Render every pixel of `task`, blocking until done.
    ///
    /// Uses `N - 1` scoped workers and the calling thread. A panic on any of
    /// them, the caller included, is reported as `WorkerPanicked`.
    pub fn render(&self, task: &dyn PixelRenderer) -> RenderResult<()> {
        self.begin()?;
        let schedule = self.schedule(task);
        let mut panicked = false;

        thread::scope(|scope| {
            let mut handles = Vec::with_capacity(schedule.workers - 1);
            for worker in 1..schedule.workers {
                let schedule = schedule.as_ref();
                let spawned = thread::Builder::new()
                    .name(format!("ember-worker-{}", worker))
                    .spawn_scoped(scope, move || schedule.run(task, worker));
                match spawned {
                    Ok(handle) => handles.push(handle),
                    Err(err) => {
                        log::warn!("Failed to spawn render worker {}: {}", worker, err);
                        schedule.retire();
                    }
                }
            }

            panicked |= panic::catch_unwind(AssertUnwindSafe(|| schedule.run(task, 0))).is_err();

            for handle in handles {
                panicked |= handle.join().is_err();
            }
        });

        if panicked {
            return Err(RenderError::WorkerPanicked);
        }
        Ok(())
    }

    /// Start rendering `task` on `N` worker threads and return immediately.
    ///
    /// Fails with `Busy` while another render is in flight. Use
    /// `wait_for_finish` to join the workers.
    pub fn render_async(&self, task: Arc<dyn PixelRenderer>) -> RenderResult<()> {
        self.begin()?;
        let schedule = self.schedule(task.as_ref());
        let mut handles = lock(&self.handles);
        let mut failures = Vec::new();

        for worker in 0..schedule.workers {
            let shared = Arc::clone(&schedule);
            let task = Arc::clone(&task);
            let spawned = thread::Builder::new()
                .name(format!("ember-worker-{}", worker))
                .spawn(move || shared.run(task.as_ref(), worker));
            match spawned {
                Ok(handle) => handles.push(handle),
                Err(err) => {
                    log::warn!("Failed to spawn render worker {}: {}", worker, err);
                    failures.push(err);
                }
            }
        }

        if handles.is_empty() {
            if let Some(err) = failures.pop() {
                self.state.store(RenderState::Idle as u8, Ordering::Release);
                return Err(RenderError::Spawn(err));
            }
        }
        for _ in failures {
            schedule.retire();
        }
        Ok(())
    }

    /// Block until the workers of the last `render_async` have exited.
    pub fn wait_for_finish(&self) -> RenderResult<()> {
        let handles = std::mem::take(&mut *lock(&self.handles));
        let mut panicked = false;
        for handle in handles {
            panicked |= handle.join().is_err();
        }
        if panicked {
            return Err(RenderError::WorkerPanicked);
        }
        Ok(())
    }

    fn begin(&self) -> RenderResult<()> {
        let claim = |from: RenderState| {
            self.state
                .compare_exchange(
                    from as u8,
                    RenderState::Scheduling as u8,
                    Ordering::AcqRel,
                    Ordering::Acquire,
                )
                .is_ok()
        };
        if !(claim(RenderState::Idle) || claim(RenderState::Finished)) {
            return Err(RenderError::Busy);
        }

        // Workers of a finished async render may still be unwinding.
        for handle in std::mem::take(&mut *lock(&self.handles)) {
            if handle.join().is_err() {
                log::warn!("Previous render had a panicked worker");
            }
        }
        Ok(())
    }

    fn schedule(&self, task: &dyn PixelRenderer) -> Arc<Schedule> {
        let viewport = task.viewport();
        let buckets = generate_buckets(
            viewport.width,
            viewport.height,
            self.config.unit,
            self.config.order,
        );
        let workers = self.config.worker_count();
        log::info!(
            "Rendering {}x{} in {} buckets on {} threads",
            viewport.width,
            viewport.height,
            buckets.len(),
            workers
        );

        self.progress.reset(buckets.len());
        let schedule = Arc::new(Schedule {
            buckets,
            progress: Arc::clone(&self.progress),
            exited: AtomicUsize::new(0),
            workers,
            seed: self.config.seed,
            state: Arc::clone(&self.state),
            on_finish: lock(&self.on_finish).clone(),
        });
        self.state
            .store(RenderState::Draining as u8, Ordering::Release);
        schedule
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new(RenderConfig::default())
    }
}

impl Drop for Renderer {
    fn drop(&mut self) {
        if self.wait_for_finish().is_err() {
            log::warn!("Render worker panicked before shutdown");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::viewport::Viewport;
    use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64};

    struct CountingTask {
        viewport: Viewport,
        hits: Vec<AtomicU32>,
    }

    impl CountingTask {
        fn new(width: u32, height: u32) -> Self {
            let viewport = Viewport::new(width, height);
            Self {
                viewport,
                hits: (0..viewport.pixel_count()).map(|_| AtomicU32::new(0)).collect(),
            }
        }

        fn all_once(&self) -> bool {
            self.hits.iter().all(|h| h.load(Ordering::Relaxed) == 1)
        }
    }

    impl PixelRenderer for CountingTask {
        fn viewport(&self) -> Viewport {
            self.viewport
        }

        fn render_pixel(&self, col: u32, row: u32, _rng: &mut dyn RngCore) {
            let index = (row * self.viewport.width + col) as usize;
            self.hits[index].fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Blocks every pixel until the gate opens.
    struct GateTask {
        open: AtomicBool,
    }

    impl PixelRenderer for GateTask {
        fn viewport(&self) -> Viewport {
            Viewport::new(4, 4)
        }

        fn render_pixel(&self, _col: u32, _row: u32, _rng: &mut dyn RngCore) {
            while !self.open.load(Ordering::Acquire) {
                thread::yield_now();
            }
        }
    }

    #[test]
    fn test_every_pixel_rendered_once() {
        let units = [
            WorkUnit::Pixels,
            WorkUnit::Tiles(1),
            WorkUnit::Tiles(7),
            WorkUnit::Tiles(64),
        ];
        for threads in [1, 2, 3, 8] {
            for unit in units {
                for order in [BucketOrder::Raster, BucketOrder::Spiral] {
                    let config = RenderConfig::default()
                        .with_threads(threads)
                        .with_unit(unit)
                        .with_order(order);
                    let renderer = Renderer::new(config);
                    let task = CountingTask::new(37, 23);

                    renderer.render(&task).unwrap();
                    assert!(task.all_once(), "{} threads, {:?}, {:?}", threads, unit, order);
                    assert_eq!(renderer.state(), RenderState::Finished);
                }
            }
        }
    }

    #[test]
    fn test_async_render_fires_callback_once() {
        let renderer = Renderer::new(RenderConfig::default().with_threads(4).with_unit(WorkUnit::Tiles(3)));
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = fired.clone();
        renderer.set_finish_callback(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let task = Arc::new(CountingTask::new(20, 11));
        renderer.render_async(task.clone()).unwrap();
        renderer.wait_for_finish().unwrap();

        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert!(task.all_once());
        assert_eq!(renderer.state(), RenderState::Finished);
        let (claimed, total) = renderer.progress();
        assert_eq!(claimed, total);
        assert_eq!(total, 7 * 4);
    }

    #[test]
    fn test_second_render_is_busy() {
        let renderer = Renderer::new(RenderConfig::default().with_threads(2));
        let gate = Arc::new(GateTask {
            open: AtomicBool::new(false),
        });

        renderer.render_async(gate.clone()).unwrap();
        assert_eq!(renderer.state(), RenderState::Draining);
        assert!(matches!(renderer.render_async(gate.clone()), Err(RenderError::Busy)));
        assert!(matches!(renderer.render(gate.as_ref()), Err(RenderError::Busy)));

        gate.open.store(true, Ordering::Release);
        renderer.wait_for_finish().unwrap();
        assert_eq!(renderer.state(), RenderState::Finished);

        // A finished renderer accepts the next job.
        let task = CountingTask::new(5, 5);
        renderer.render(&task).unwrap();
        assert!(task.all_once());
    }

    #[test]
    fn test_worker_panic_is_reported() {
        struct Exploding;
        impl PixelRenderer for Exploding {
            fn viewport(&self) -> Viewport {
                Viewport::new(2, 2)
            }
            fn render_pixel(&self, _col: u32, _row: u32, _rng: &mut dyn RngCore) {
                panic!("boom");
            }
        }

        let renderer = Renderer::new(RenderConfig::default().with_threads(2));
        renderer.render_async(Arc::new(Exploding)).unwrap();
        assert!(matches!(renderer.wait_for_finish(), Err(RenderError::WorkerPanicked)));
        assert_eq!(renderer.state(), RenderState::Finished);

        // Blocking path, where the calling thread does all the work.
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = fired.clone();
        let blocking = Renderer::new(RenderConfig::default().with_threads(1));
        blocking.set_finish_callback(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        assert!(matches!(blocking.render(&Exploding), Err(RenderError::WorkerPanicked)));
        assert_eq!(blocking.state(), RenderState::Finished);
        assert_eq!(fired.load(Ordering::SeqCst), 1);

        // Mixed: spawned workers and the caller all panic.
        let mixed = Renderer::new(RenderConfig::default().with_threads(3));
        assert!(matches!(mixed.render(&Exploding), Err(RenderError::WorkerPanicked)));
        assert_eq!(mixed.state(), RenderState::Finished);
    }

    #[test]
    fn test_finished_render_releases_schedule() {
        let renderer = Renderer::new(RenderConfig::default().with_threads(2).with_unit(WorkUnit::Pixels));
        let task = Arc::new(CountingTask::new(6, 5));
        renderer.render_async(task.clone()).unwrap();
        renderer.wait_for_finish().unwrap();

        // Only the counter is left behind once the workers are gone.
        assert_eq!(Arc::strong_count(&renderer.progress), 1);
        assert_eq!(Arc::strong_count(&task), 1);
        assert_eq!(renderer.progress(), (30, 30));

        renderer.render(task.as_ref()).unwrap();
        assert_eq!(Arc::strong_count(&renderer.progress), 1);
        assert_eq!(renderer.progress(), (30, 30));
    }

    #[test]
    fn test_seeded_render_is_repeatable() {
        struct Noise {
            sum: AtomicU64,
        }
        impl PixelRenderer for Noise {
            fn viewport(&self) -> Viewport {
                Viewport::new(8, 8)
            }
            fn render_pixel(&self, _col: u32, _row: u32, rng: &mut dyn RngCore) {
                self.sum.fetch_add(rng.next_u32() as u64, Ordering::Relaxed);
            }
        }

        let renderer = Renderer::new(RenderConfig::default().with_threads(1).with_seed(7));
        let first = Noise { sum: AtomicU64::new(0) };
        let second = Noise { sum: AtomicU64::new(0) };
        renderer.render(&first).unwrap();
        renderer.render(&second).unwrap();
        assert_eq!(first.sum.load(Ordering::Relaxed), second.sum.load(Ordering::Relaxed));
    }

    #[test]
    fn test_empty_viewport_finishes() {
        let renderer = Renderer::new(RenderConfig::default().with_threads(3));
        let task = CountingTask::new(0, 0);
        renderer.render(&task).unwrap();
        assert_eq!(renderer.state(), RenderState::Finished);
        assert_eq!(renderer.progress(), (0, 0));
    }
}
