//! Page format detection and page sizing for the current window.

use std::time::{Duration, Instant};

use crate::cache::PageImage;
use crate::geometry::Size;

/// Space reserved around the book for window chrome and the toolbar.
const CHROME_MARGIN: f32 = 60.0;

/// Natural size of the document's pages, sampled from page 1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageFormat {
    pub width: u32,
    pub height: u32,
    pub ratio: f32,
}

impl PageFormat {
    /// Used when page 1 cannot be loaded.
    pub const PLACEHOLDER: PageFormat = PageFormat {
        width: 800,
        height: 1000,
        ratio: 0.8,
    };

    pub fn from_dimensions(width: u32, height: u32) -> Option<Self> {
        if width == 0 || height == 0 {
            return None;
        }
        Some(Self {
            width,
            height,
            ratio: width as f32 / height as f32,
        })
    }

    pub fn is_landscape(&self, threshold: f32) -> bool {
        self.ratio > threshold
    }
}

/// Derive the page format from the first page, falling back to a portrait
/// placeholder when it is unavailable.
pub fn detect_format(first_page: Option<&PageImage>) -> PageFormat {
    match first_page.and_then(|page| PageFormat::from_dimensions(page.width(), page.height())) {
        Some(format) => format,
        None => {
            tracing::warn!("Page 1 unavailable, assuming a portrait page format");
            PageFormat::PLACEHOLDER
        }
    }
}

/// Pixel size of a single page on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSize {
    pub width: u32,
    pub height: u32,
}

/// Fit one page (single mode) or two side-by-side pages (double mode) into the
/// viewport, preserving `ratio`.
pub fn compute_size(viewport: Size, ratio: f32, is_landscape: bool) -> PageSize {
    let max_width = (viewport.width - CHROME_MARGIN).max(1.0);
    let max_height = (viewport.height - CHROME_MARGIN).max(1.0);
    let ratio = if ratio.is_finite() && ratio > 0.0 {
        ratio
    } else {
        PageFormat::PLACEHOLDER.ratio
    };

    let (width, height) = if is_landscape {
        if max_width * 0.9 / ratio <= max_height {
            let width = (max_width * 0.85).floor();
            (width, (width / ratio).floor())
        } else {
            let height = (max_height * 0.95).floor();
            ((height * ratio).floor(), height)
        }
    } else {
        let single_width = max_width * 0.95 / 2.0;
        if single_width / ratio <= max_height {
            let width = single_width.floor();
            (width, (width / ratio).floor())
        } else {
            let height = (max_height * 0.95).floor();
            ((height * ratio).floor(), height)
        }
    };

    PageSize {
        width: (width as u32).max(1),
        height: (height as u32).max(1),
    }
}

/// Orientation and page size for the current viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutState {
    pub is_landscape: bool,
    pub page_width: f32,
    pub page_height: f32,
}

impl LayoutState {
    pub fn compute(format: &PageFormat, viewport: Size, landscape_ratio: f32) -> Self {
        let is_landscape = format.is_landscape(landscape_ratio);
        let size = compute_size(viewport, format.ratio, is_landscape);
        Self {
            is_landscape,
            page_width: size.width as f32,
            page_height: size.height as f32,
        }
    }

    /// Whether the layout shows a two-page spread.
    pub fn is_double(&self) -> bool {
        !self.is_landscape
    }

    /// Width of the whole book surface.
    pub fn canvas_width(&self) -> f32 {
        if self.is_landscape {
            self.page_width
        } else {
            self.page_width * 2.0
        }
    }

    pub fn canvas_size(&self) -> Size {
        Size::new(self.canvas_width(), self.page_height)
    }
}

/// Coalesces window resize events; the most recent size is released once no
/// further resize has arrived for `delay`.
#[derive(Debug, Clone)]
pub struct ResizeDebouncer {
    delay: Duration,
    pending: Option<(Size, Instant)>,
}

impl ResizeDebouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn push(&mut self, size: Size, now: Instant) {
        self.pending = Some((size, now));
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Take the pending size if its quiet period has elapsed.
    pub fn poll(&mut self, now: Instant) -> Option<Size> {
        match self.pending {
            Some((size, at)) if now.saturating_duration_since(at) >= self.delay => {
                self.pending = None;
                Some(size)
            }
            _ => None,
        }
    }
}
