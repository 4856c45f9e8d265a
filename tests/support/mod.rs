//! Shared fixtures for the integration tests: fake capability strategies that count native
//! objects, and a renderer that reports every callback over a channel.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender, unbounded};
use dpi::PhysicalSize;
use gl_render_view::{
    BoxError, ConfigAttributes, ContextFactory, NativeConfig, NativeContext, NativeSurface,
    NativeWindow, PresentOutcome, RenderCoordinator, Renderer, Strategies, ViewConfig,
    WindowSurfaceFactory,
};

/// Upper bound for every wait in the tests.
pub const TIMEOUT: Duration = Duration::from_secs(5);

/// How long to watch for something that must NOT happen.
pub const QUIET: Duration = Duration::from_millis(150);

pub const WINDOW: NativeWindow = NativeWindow(0xA11CE);

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

// =============================================================================
// Recording renderer
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    SurfaceCreated(NativeConfig),
    SurfaceChanged(PhysicalSize<u32>),
    DrawFrame,
    /// Emitted by tasks queued from the tests, with the name of the thread that ran them.
    Task(usize, Option<String>),
}

pub struct RecordingRenderer {
    events: Sender<Event>,
    fail_draw_at: Option<usize>,
    draws: usize,
}

impl RecordingRenderer {
    pub fn new(events: Sender<Event>) -> Self {
        Self {
            events,
            fail_draw_at: None,
            draws: 0,
        }
    }

    /// Fails the `n`-th `on_draw_frame` call (1-based).
    pub fn failing_at(mut self, n: usize) -> Self {
        self.fail_draw_at = Some(n);
        self
    }
}

impl Renderer for RecordingRenderer {
    fn on_surface_created(&mut self, config: NativeConfig) -> Result<(), BoxError> {
        let _ = self.events.send(Event::SurfaceCreated(config));
        Ok(())
    }

    fn on_surface_changed(&mut self, size: PhysicalSize<u32>) -> Result<(), BoxError> {
        let _ = self.events.send(Event::SurfaceChanged(size));
        Ok(())
    }

    fn on_draw_frame(&mut self) -> Result<(), BoxError> {
        self.draws += 1;
        if self.fail_draw_at == Some(self.draws) {
            return Err("draw failed".into());
        }
        let _ = self.events.send(Event::DrawFrame);
        Ok(())
    }
}

/// Queues a task that reports its id and the name of the thread it ran on.
pub fn report_task(events: &Sender<Event>, id: usize) -> impl FnOnce() + Send + 'static {
    let events = events.clone();
    move || {
        let name = std::thread::current().name().map(str::to_owned);
        let _ = events.send(Event::Task(id, name));
    }
}

/// Counts how many tasks built by [`DropTally::task`] were dropped, run or not.
#[derive(Clone, Default)]
pub struct DropTally(Arc<AtomicUsize>);

struct Tallied(Arc<AtomicUsize>);

impl Drop for Tallied {
    fn drop(&mut self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

impl DropTally {
    /// A task that bumps `ran` when it runs and this tally when it is dropped.
    pub fn task(&self, ran: &Arc<AtomicUsize>) -> impl FnOnce() + Send + 'static {
        let token = Tallied(self.0.clone());
        let ran = ran.clone();
        move || {
            let _token = token;
            ran.fetch_add(1, Ordering::SeqCst);
        }
    }

    pub fn dropped(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

// =============================================================================
// Fake strategies
// =============================================================================

#[derive(Default)]
pub struct CountersInner {
    pub configs_chosen: AtomicUsize,
    pub contexts_created: AtomicUsize,
    pub contexts_destroyed: AtomicUsize,
    pub surfaces_created: AtomicUsize,
    pub surfaces_destroyed: AtomicUsize,
    pub presents: AtomicUsize,
    pub lose_context_once: AtomicBool,
    pub fail_choose_config: AtomicBool,
}

/// Counts native objects created and destroyed by the fake strategies.
#[derive(Clone, Default)]
pub struct Counters(pub Arc<CountersInner>);

impl Counters {
    pub fn contexts_created(&self) -> usize {
        self.0.contexts_created.load(Ordering::SeqCst)
    }

    pub fn contexts_destroyed(&self) -> usize {
        self.0.contexts_destroyed.load(Ordering::SeqCst)
    }

    pub fn surfaces_created(&self) -> usize {
        self.0.surfaces_created.load(Ordering::SeqCst)
    }

    pub fn surfaces_destroyed(&self) -> usize {
        self.0.surfaces_destroyed.load(Ordering::SeqCst)
    }

    pub fn live_contexts(&self) -> usize {
        self.contexts_created() - self.contexts_destroyed()
    }

    pub fn live_surfaces(&self) -> usize {
        self.surfaces_created() - self.surfaces_destroyed()
    }

    pub fn presents(&self) -> usize {
        self.0.presents.load(Ordering::SeqCst)
    }
}

struct FakeContextFactory(Counters);

impl ContextFactory for FakeContextFactory {
    fn create_context(
        &mut self,
        _config: NativeConfig,
        _client_version: u32,
    ) -> Result<NativeContext, BoxError> {
        let n = self.0.0.contexts_created.fetch_add(1, Ordering::SeqCst);
        Ok(NativeContext(100 + n as u64))
    }

    fn destroy_context(&mut self, _context: NativeContext) -> Result<(), BoxError> {
        self.0.0.contexts_destroyed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

struct FakeSurfaceFactory(Counters);

impl WindowSurfaceFactory for FakeSurfaceFactory {
    fn create_window_surface(
        &mut self,
        _config: NativeConfig,
        _context: NativeContext,
        _window: NativeWindow,
    ) -> Result<NativeSurface, BoxError> {
        let n = self.0.0.surfaces_created.fetch_add(1, Ordering::SeqCst);
        Ok(NativeSurface(200 + n as u64))
    }

    fn destroy_surface(&mut self, _surface: NativeSurface) -> Result<(), BoxError> {
        self.0.0.surfaces_destroyed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn make_current(
        &mut self,
        _context: NativeContext,
        _surface: NativeSurface,
    ) -> Result<(), BoxError> {
        Ok(())
    }

    fn present(
        &mut self,
        _context: NativeContext,
        _surface: NativeSurface,
    ) -> Result<PresentOutcome, BoxError> {
        self.0.0.presents.fetch_add(1, Ordering::SeqCst);
        if self.0.0.lose_context_once.swap(false, Ordering::SeqCst) {
            return Ok(PresentOutcome::ContextLost);
        }
        Ok(PresentOutcome::Presented)
    }
}

pub const CONFIG: NativeConfig = NativeConfig(7);

pub fn fake_strategies(counters: &Counters) -> Strategies {
    let chooser_counters = counters.clone();
    Strategies {
        config_chooser: Box::new(move |_: &ConfigAttributes| -> Result<NativeConfig, BoxError> {
            chooser_counters
                .0
                .configs_chosen
                .fetch_add(1, Ordering::SeqCst);
            if chooser_counters.0.fail_choose_config.load(Ordering::SeqCst) {
                return Err("no matching config".into());
            }
            Ok(CONFIG)
        }),
        context_factory: Box::new(FakeContextFactory(counters.clone())),
        window_surface_factory: Box::new(FakeSurfaceFactory(counters.clone())),
    }
}

// =============================================================================
// Harness
// =============================================================================

pub struct Harness {
    pub coordinator: RenderCoordinator,
    pub events: Receiver<Event>,
    pub sender: Sender<Event>,
    pub counters: Counters,
}

impl Harness {
    /// Coordinator with fake strategies installed but no renderer yet.
    pub fn unconfigured(config: ViewConfig) -> Self {
        init_logging();
        let (sender, events) = unbounded();
        let counters = Counters::default();
        let mut coordinator = RenderCoordinator::with_config(config);
        coordinator
            .set_strategies(fake_strategies(&counters))
            .expect("strategies accepted before configuration");
        Self {
            coordinator,
            events,
            sender,
            counters,
        }
    }

    /// Coordinator with a recording renderer configured.
    pub fn configured(config: ViewConfig) -> Self {
        let mut harness = Self::unconfigured(config);
        let renderer = RecordingRenderer::new(harness.sender.clone());
        harness
            .coordinator
            .configure_renderer(renderer)
            .expect("first configuration succeeds");
        harness
    }

    pub fn surface_available(&self, width: u32, height: u32) {
        self.coordinator.notify_surface_available(WINDOW, width, height);
    }

    /// Receives events until `matches` accepts one; panics on timeout.
    pub fn expect(&self, what: &str, mut matches: impl FnMut(&Event) -> bool) -> Event {
        let deadline = Instant::now() + TIMEOUT;
        loop {
            let left = deadline.saturating_duration_since(Instant::now());
            match self.events.recv_timeout(left) {
                Ok(event) if matches(&event) => return event,
                Ok(_) => continue,
                Err(_) => panic!("timed out waiting for {what}"),
            }
        }
    }

    pub fn expect_draw(&self) {
        self.expect("a frame", |event| *event == Event::DrawFrame);
    }

    /// Collects events until nothing arrives for [`QUIET`].
    pub fn drain_quiet(&self) -> Vec<Event> {
        let mut seen = Vec::new();
        while let Ok(event) = self.events.recv_timeout(QUIET) {
            seen.push(event);
            if seen.len() > 100_000 {
                panic!("event stream never went quiet");
            }
        }
        seen
    }

    /// Drops everything currently buffered.
    pub fn clear(&self) {
        while self.events.try_recv().is_ok() {}
    }
}

/// Polls `done` until it returns true or [`TIMEOUT`] elapses.
pub fn eventually(mut done: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + TIMEOUT;
    while Instant::now() < deadline {
        if done() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(1));
    }
    done()
}
