//! Display modes: the magazine fold engine or a pluggable slide renderer.

use std::fmt;

/// Mode used when a requested name is unknown.
pub const DEFAULT_MODE: ViewMode = ViewMode::Alternate(AlternateKind::Standard);

/// Slide-style effects supplied outside the fold engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlternateKind {
    Standard,
    Coverflow,
    Cards,
    Cube,
    Flip,
    Fade,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewMode {
    Magazine,
    Alternate(AlternateKind),
}

impl ViewMode {
    pub const ALL: [ViewMode; 7] = [
        ViewMode::Alternate(AlternateKind::Standard),
        ViewMode::Magazine,
        ViewMode::Alternate(AlternateKind::Coverflow),
        ViewMode::Alternate(AlternateKind::Cards),
        ViewMode::Alternate(AlternateKind::Cube),
        ViewMode::Alternate(AlternateKind::Flip),
        ViewMode::Alternate(AlternateKind::Fade),
    ];

    /// Parse a mode name; `None` for names outside the closed set.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|mode| mode.name() == name)
    }

    /// Parse a mode name, falling back to [`DEFAULT_MODE`].
    pub fn from_name_or_default(name: &str) -> Self {
        Self::from_name(name).unwrap_or_else(|| {
            tracing::warn!("Unknown display mode {:?}, using {}", name, DEFAULT_MODE.name());
            DEFAULT_MODE
        })
    }

    pub fn name(self) -> &'static str {
        match self {
            ViewMode::Magazine => "magazine",
            ViewMode::Alternate(AlternateKind::Standard) => "default",
            ViewMode::Alternate(AlternateKind::Coverflow) => "coverflow",
            ViewMode::Alternate(AlternateKind::Cards) => "cards",
            ViewMode::Alternate(AlternateKind::Cube) => "cube",
            ViewMode::Alternate(AlternateKind::Flip) => "flip",
            ViewMode::Alternate(AlternateKind::Fade) => "fade",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ViewMode::Magazine => "Magazine",
            ViewMode::Alternate(AlternateKind::Standard) => "Standard",
            ViewMode::Alternate(AlternateKind::Coverflow) => "Coverflow",
            ViewMode::Alternate(AlternateKind::Cards) => "Cards",
            ViewMode::Alternate(AlternateKind::Cube) => "Cube",
            ViewMode::Alternate(AlternateKind::Flip) => "Flip",
            ViewMode::Alternate(AlternateKind::Fade) => "Fade",
        }
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A non-fold display mode. Pages are 1-based.
pub trait AlternateRenderer {
    fn kind(&self) -> AlternateKind;
    /// Show `start_page` without a transition.
    fn mount(&mut self, start_page: u32);
    fn current_page(&self) -> u32;
    fn next(&mut self) -> bool;
    fn prev(&mut self) -> bool;
    fn go_to(&mut self, page: u32);
    /// Release whatever the renderer holds before it is dropped.
    fn teardown(&mut self);
}

/// Builds alternate renderers on demand.
pub trait AlternateFactory {
    fn create(&self, kind: AlternateKind, total_pages: u32) -> Box<dyn AlternateRenderer>;
}

/// One page at a time with no simulated paper; transitions are left to the
/// host's styling for `kind`.
#[derive(Debug, Clone)]
pub struct SlideRenderer {
    kind: AlternateKind,
    total_pages: u32,
    index: u32,
    mounted: bool,
}

impl SlideRenderer {
    pub fn new(kind: AlternateKind, total_pages: u32) -> Self {
        Self {
            kind,
            total_pages,
            index: 0,
            mounted: false,
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }
}

impl AlternateRenderer for SlideRenderer {
    fn kind(&self) -> AlternateKind {
        self.kind
    }

    fn mount(&mut self, start_page: u32) {
        self.mounted = true;
        self.go_to(start_page);
    }

    fn current_page(&self) -> u32 {
        self.index + 1
    }

    fn next(&mut self) -> bool {
        if self.index + 1 < self.total_pages {
            self.index += 1;
            true
        } else {
            false
        }
    }

    fn prev(&mut self) -> bool {
        if self.index > 0 {
            self.index -= 1;
            true
        } else {
            false
        }
    }

    fn go_to(&mut self, page: u32) {
        self.index = page.clamp(1, self.total_pages.max(1)) - 1;
    }

    fn teardown(&mut self) {
        self.mounted = false;
    }
}

/// Creates a [`SlideRenderer`] for every alternate.
#[derive(Debug, Clone, Copy, Default)]
pub struct SlideFactory;

impl AlternateFactory for SlideFactory {
    fn create(&self, kind: AlternateKind, total_pages: u32) -> Box<dyn AlternateRenderer> {
        Box::new(SlideRenderer::new(kind, total_pages))
    }
}

/// Owns the active mode and, outside magazine mode, its renderer.
pub struct ModeCoordinator {
    mode: ViewMode,
    total_pages: u32,
    factory: Box<dyn AlternateFactory>,
    alternate: Option<Box<dyn AlternateRenderer>>,
}

impl fmt::Debug for ModeCoordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModeCoordinator")
            .field("mode", &self.mode)
            .field("total_pages", &self.total_pages)
            .field("alternate", &self.alternate.as_ref().map(|r| r.current_page()))
            .finish()
    }
}

impl ModeCoordinator {
    /// Start in `mode` showing `current_page`.
    pub fn new(mode: ViewMode, total_pages: u32, current_page: u32, factory: Box<dyn AlternateFactory>) -> Self {
        let mut coordinator = Self {
            mode,
            total_pages,
            factory,
            alternate: None,
        };
        coordinator.instantiate(current_page);
        coordinator
    }

    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    pub fn is_magazine(&self) -> bool {
        self.mode == ViewMode::Magazine
    }

    pub fn alternate(&self) -> Option<&dyn AlternateRenderer> {
        self.alternate.as_deref()
    }

    pub fn alternate_mut(&mut self) -> Option<&mut (dyn AlternateRenderer + 'static)> {
        self.alternate.as_deref_mut()
    }

    /// Switch to `mode`, carrying `current_page` over. Returns `false` when
    /// `mode` is already active.
    pub fn switch(&mut self, mode: ViewMode, current_page: u32) -> bool {
        if mode == self.mode {
            return false;
        }
        if let Some(mut previous) = self.alternate.take() {
            previous.teardown();
        }
        tracing::debug!("Switching display mode {} -> {} at page {}", self.mode.name(), mode.name(), current_page);
        self.mode = mode;
        self.instantiate(current_page);
        true
    }

    fn instantiate(&mut self, current_page: u32) {
        if let ViewMode::Alternate(kind) = self.mode {
            let mut renderer = self.factory.create(kind, self.total_pages);
            renderer.mount(current_page);
            self.alternate = Some(renderer);
        }
    }
}
