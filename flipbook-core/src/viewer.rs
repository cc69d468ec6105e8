//! The façade a host drives: one command in, host events and draw ops out.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use crate::animation::{AnimationController, ControllerEvent, Corner, Timings, TurnView};
use crate::audio::AudioFeedback;
use crate::cache::{DirectoryFetcher, PageCache};
use crate::config::{DocumentManifest, EngineConfig};
use crate::error::{FlipbookError, Result};
use crate::geometry::{Point, Size};
use crate::input::{PointerAdapter, PointerEvent};
use crate::layout::{detect_format, LayoutState, PageFormat};
use crate::mode::{AlternateFactory, ModeCoordinator, SlideFactory, ViewMode};
use crate::overlay::{hit_test, place_overlays, Hotspot, HotspotAction, PlacedHotspot};
use crate::render::{DrawOp, FoldRenderer};
use crate::spread::{self, Direction, PageIndicator, Spread};

/// Everything a host can ask of the viewer.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Next,
    Prev,
    GoTo(i64),
    First,
    Last,
    DragStart { corner: Corner, point: Point },
    DragMove(Point),
    DragEnd,
    Resize { width: f32, height: f32 },
    /// Switch display mode by name; unknown names select the default mode.
    SetMode(String),
    ToggleSound,
    /// Hit-test hotspots at a surface point.
    Activate(Point),
    Tick(Instant),
}

/// Notifications for the host's chrome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewerEvent {
    CurrentPageChanged {
        display_text: String,
        at_start: bool,
        at_end: bool,
    },
    ModeChanged(String),
    OpenLink(String),
}

impl From<PageIndicator> for ViewerEvent {
    fn from(indicator: PageIndicator) -> Self {
        ViewerEvent::CurrentPageChanged {
            display_text: indicator.display_text,
            at_start: indicator.at_start,
            at_end: indicator.at_end,
        }
    }
}

/// Snapshot of what the viewer is showing.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewerState {
    pub current_page: u32,
    pub total_pages: u32,
    pub mode: ViewMode,
    pub layout: LayoutState,
    pub format: PageFormat,
    pub viewport: Size,
    pub muted: bool,
}

/// A page directory plus its optional manifest.
#[derive(Debug, Clone)]
pub struct Document {
    pub root: PathBuf,
    pub manifest: DocumentManifest,
    pub total_pages: u32,
}

impl Document {
    /// Open `dir`. The page count comes from the manifest when it names one,
    /// otherwise from the page files present.
    pub fn open(dir: &Path) -> Result<Self> {
        if !dir.is_dir() {
            return Err(FlipbookError::Io {
                path: dir.to_path_buf(),
                source: io::Error::new(io::ErrorKind::NotFound, "document directory not found"),
            });
        }
        let manifest = DocumentManifest::load_from_dir(dir)?.unwrap_or_default();
        let found = DirectoryFetcher::new(dir).count_pages();
        let total_pages = if manifest.page_count > 0 {
            if manifest.page_count != found {
                tracing::warn!(
                    "Manifest lists {} pages but {} page files were found",
                    manifest.page_count,
                    found
                );
            }
            manifest.page_count
        } else {
            found
        };
        tracing::info!("Opened document {} ({} pages)", dir.display(), total_pages);
        Ok(Self {
            root: dir.to_path_buf(),
            manifest,
            total_pages,
        })
    }

    pub fn title(&self) -> String {
        self.manifest
            .title
            .clone()
            .unwrap_or_else(|| self.root.file_name().map_or_else(String::new, |name| name.to_string_lossy().into_owned()))
    }

    /// Fetch every page; returns once all fetches have finished.
    pub async fn preload(&self) -> PageCache {
        PageCache::preload_all(Arc::new(DirectoryFetcher::new(&self.root)), self.total_pages).await
    }
}

/// Start-up settings for a [`Viewer`].
pub struct ViewerOptions {
    pub config: EngineConfig,
    pub mode: ViewMode,
    pub hotspots: Vec<Hotspot>,
    pub viewport: Size,
    pub start_page: u32,
    pub factory: Box<dyn AlternateFactory>,
}

impl ViewerOptions {
    pub fn new(config: EngineConfig, viewport: Size) -> Self {
        let mode = ViewMode::from_name_or_default(&config.default_mode);
        Self {
            config,
            mode,
            hotspots: Vec::new(),
            viewport,
            start_page: 1,
            factory: Box::new(SlideFactory),
        }
    }

    /// Take the mode and hotspots a document manifest carries.
    pub fn with_manifest(mut self, manifest: &DocumentManifest) -> Self {
        if let Some(mode) = manifest.mode.as_deref() {
            self.mode = ViewMode::from_name_or_default(mode);
        }
        self.hotspots = manifest.hotspots.clone();
        self
    }

    pub fn with_mode(mut self, mode: ViewMode) -> Self {
        self.mode = mode;
        self
    }
}

pub struct Viewer {
    controller: AnimationController,
    pages: PageCache,
    modes: ModeCoordinator,
    audio: AudioFeedback,
    hotspots: Vec<Hotspot>,
    pointer: PointerAdapter,
    viewport: Size,
    last_indicator: Option<PageIndicator>,
    events: Vec<ViewerEvent>,
}

impl std::fmt::Debug for Viewer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Viewer")
            .field("controller", &self.controller)
            .field("modes", &self.modes)
            .field("audio", &self.audio)
            .finish_non_exhaustive()
    }
}

impl Viewer {
    /// Build a viewer over fully preloaded pages.
    pub fn new(pages: PageCache, audio: AudioFeedback, options: ViewerOptions) -> Self {
        let total_pages = pages.len();
        let format = detect_format(pages.get(1));
        let timings = Timings::from(&options.config);
        let controller = AnimationController::new(total_pages, format, options.viewport, options.start_page, timings);
        let modes = ModeCoordinator::new(options.mode, total_pages, controller.current_page(), options.factory);

        let mut viewer = Self {
            controller,
            pages,
            modes,
            audio,
            hotspots: options.hotspots,
            pointer: PointerAdapter::new(),
            viewport: options.viewport,
            last_indicator: None,
            events: Vec::new(),
        };
        viewer.publish_indicator();
        viewer
    }

    /// Logical current page, whichever mode is active.
    pub fn current_page(&self) -> u32 {
        match self.modes.alternate() {
            Some(alternate) => alternate.current_page(),
            None => self.controller.current_page(),
        }
    }

    pub fn total_pages(&self) -> u32 {
        self.controller.total_pages()
    }

    pub fn mode(&self) -> ViewMode {
        self.modes.mode()
    }

    pub fn controller(&self) -> &AnimationController {
        &self.controller
    }

    pub fn pages(&self) -> &PageCache {
        &self.pages
    }

    pub fn is_muted(&self) -> bool {
        self.audio.is_muted()
    }

    pub fn state(&self) -> ViewerState {
        ViewerState {
            current_page: self.current_page(),
            total_pages: self.total_pages(),
            mode: self.mode(),
            layout: *self.controller.layout(),
            format: *self.controller.format(),
            viewport: self.viewport,
            muted: self.audio.is_muted(),
        }
    }

    /// Layout of the drawing surface. Slide modes show one page at a time.
    pub fn surface(&self) -> LayoutState {
        let layout = *self.controller.layout();
        if self.modes.is_magazine() {
            layout
        } else {
            LayoutState {
                is_landscape: true,
                ..layout
            }
        }
    }

    pub fn indicator(&self) -> PageIndicator {
        let total = self.total_pages();
        match self.modes.alternate() {
            Some(alternate) => {
                let page = alternate.current_page();
                PageIndicator {
                    display_text: page.to_string(),
                    at_start: page <= 1,
                    at_end: page >= total,
                }
            }
            None => spread::page_indicator(self.controller.current_page(), self.controller.layout().is_landscape, total),
        }
    }

    /// Whether the host should keep sending [`Command::Tick`].
    pub fn needs_frames(&self) -> bool {
        self.controller.needs_frames()
    }

    pub fn drain_events(&mut self) -> Vec<ViewerEvent> {
        std::mem::take(&mut self.events)
    }

    /// Draw operations for the current state.
    pub fn frame(&self) -> Vec<DrawOp> {
        match self.modes.alternate() {
            Some(alternate) => {
                FoldRenderer::new(self.surface(), self.total_pages(), &self.pages).slide(alternate.current_page())
            }
            None => FoldRenderer::new(*self.controller.layout(), self.total_pages(), &self.pages)
                .frame(self.controller.view(), self.controller.spread()),
        }
    }

    /// Hotspots on the pages currently at rest, in surface pixels.
    pub fn overlays(&self) -> Vec<PlacedHotspot> {
        match self.modes.alternate() {
            Some(alternate) => {
                let spread = Spread {
                    left: Some(alternate.current_page()),
                    right: None,
                };
                place_overlays(&self.hotspots, spread, &self.surface(), TurnView::Settled)
            }
            None => place_overlays(
                &self.hotspots,
                self.controller.spread(),
                self.controller.layout(),
                self.controller.view(),
            ),
        }
    }

    pub fn dispatch(&mut self, command: Command) -> bool {
        self.dispatch_at(command, Instant::now())
    }

    /// Apply `command` as of `now`. Returns whether it changed anything.
    pub fn dispatch_at(&mut self, command: Command, now: Instant) -> bool {
        let magazine = self.modes.is_magazine();
        let handled = match command {
            Command::Next => self.turn(Direction::Next, now),
            Command::Prev => self.turn(Direction::Prev, now),
            Command::GoTo(page) => self.go_to(page),
            Command::First => self.go_to(1),
            Command::Last => self.go_to(i64::from(self.total_pages())),
            Command::DragStart { corner, point } => magazine && self.controller.drag_start(corner, point),
            Command::DragMove(point) => {
                let dragging = magazine && self.controller.is_dragging();
                if dragging {
                    self.controller.drag_move(point);
                }
                dragging
            }
            Command::DragEnd => {
                let dragging = magazine && self.controller.is_dragging();
                if dragging {
                    self.controller.drag_end(now);
                }
                dragging
            }
            Command::Resize { width, height } => {
                self.viewport = Size::new(width, height);
                self.controller.resize(self.viewport, now);
                true
            }
            Command::SetMode(name) => self.set_mode(&name),
            Command::ToggleSound => {
                let muted = !self.audio.is_muted();
                self.audio.set_muted(muted);
                tracing::debug!("Page-turn sound {}", if muted { "muted" } else { "on" });
                true
            }
            Command::Activate(point) => self.activate(point),
            Command::Tick(at) => {
                self.controller.tick(at);
                true
            }
        };
        self.pump_controller();
        handled
    }

    /// Route a raw pointer event through the input adapter.
    pub fn pointer(&mut self, event: PointerEvent, now: Instant) -> bool {
        let surface = self.surface();
        let Some(command) = self.pointer.translate(event, &surface) else {
            return false;
        };
        let starts_drag = matches!(command, Command::DragStart { .. });
        let handled = self.dispatch_at(command, now);
        if starts_drag && !handled {
            self.pointer.drag_refused();
        }
        handled
    }

    fn turn(&mut self, direction: Direction, now: Instant) -> bool {
        match self.modes.alternate_mut() {
            Some(alternate) => {
                let moved = match direction {
                    Direction::Next => alternate.next(),
                    Direction::Prev => alternate.prev(),
                };
                if moved {
                    self.publish_indicator();
                }
                moved
            }
            None => match direction {
                Direction::Next => self.controller.next(now),
                Direction::Prev => self.controller.prev(now),
            },
        }
    }

    fn go_to(&mut self, page: i64) -> bool {
        let total = self.total_pages();
        match self.modes.alternate_mut() {
            Some(alternate) => {
                let before = alternate.current_page();
                alternate.go_to(page.clamp(1, i64::from(total.max(1))) as u32);
                let moved = alternate.current_page() != before;
                if moved {
                    self.publish_indicator();
                }
                moved
            }
            None => self.controller.go_to(page),
        }
    }

    fn set_mode(&mut self, name: &str) -> bool {
        let mode = ViewMode::from_name_or_default(name);
        if !self.controller.is_idle() {
            tracing::debug!("Ignoring switch to {} while a page is turning", mode.name());
            return false;
        }
        let page = self.current_page();
        if !self.modes.switch(mode, page) {
            return false;
        }
        if mode == ViewMode::Magazine {
            self.controller.go_to(i64::from(page));
        }
        self.events.push(ViewerEvent::ModeChanged(mode.name().to_string()));
        self.publish_indicator();
        true
    }

    fn activate(&mut self, point: Point) -> bool {
        let placed = self.overlays();
        match hit_test(&placed, point).cloned() {
            Some(HotspotAction::OpenLink(url)) => {
                tracing::debug!("Hotspot link {}", url);
                self.events.push(ViewerEvent::OpenLink(url));
                true
            }
            Some(HotspotAction::GoTo(page)) => self.go_to(i64::from(page)),
            None => false,
        }
    }

    fn pump_controller(&mut self) {
        for event in self.controller.drain_events() {
            match event {
                ControllerEvent::TurnStarted { .. } => self.audio.play_page_turn(),
                ControllerEvent::PageSettled { .. } => self.publish_indicator(),
                ControllerEvent::TurnCancelled => {}
                ControllerEvent::LayoutChanged(_) => self.publish_indicator(),
            }
        }
    }

    /// Queue a page-changed event unless the host already shows it.
    fn publish_indicator(&mut self) {
        let indicator = self.indicator();
        if self.last_indicator.as_ref() == Some(&indicator) {
            return;
        }
        self.last_indicator = Some(indicator.clone());
        self.events.push(indicator.into());
    }
}
