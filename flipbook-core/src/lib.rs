//! Page-turn engine for flipbook viewers.
//!
//! Pages are preloaded into a [`PageCache`], laid out as one page (landscape
//! documents) or a two-page spread, and turned by an [`AnimationController`]
//! either automatically or by dragging a corner. [`FoldRenderer`] turns the
//! controller's state into [`DrawOp`]s any 2D surface can replay; [`Viewer`]
//! ties the pieces together behind a single [`Command`] entry point.
//!
//! ```no_run
//! use flipbook_core::{AudioFeedback, Command, Document, EngineConfig, Size, Viewer, ViewerOptions};
//!
//! # async fn run() -> flipbook_core::Result<()> {
//! let document = Document::open("magazine".as_ref())?;
//! let pages = document.preload().await;
//! let options = ViewerOptions::new(EngineConfig::default(), Size::new(1280.0, 800.0))
//!     .with_manifest(&document.manifest);
//! let mut viewer = Viewer::new(pages, AudioFeedback::silent(), options);
//!
//! viewer.dispatch(Command::Next);
//! for op in viewer.frame() {
//!     println!("{op:?}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod animation;
pub mod audio;
pub mod cache;
pub mod config;
pub mod error;
pub mod geometry;
pub mod input;
pub mod layout;
pub mod mode;
pub mod overlay;
pub mod render;
pub mod spread;
pub mod viewer;

pub use animation::{ease_in_out_cubic, AnimationController, ControllerEvent, Corner, Origin, Timings, TurnState, TurnView};
pub use audio::{synthesize_page_turn, AudioFeedback, SoundSink};
pub use cache::{DirectoryFetcher, ImageFetcher, PageCache, PageImage};
pub use config::{DocumentManifest, EngineConfig};
pub use error::{FlipbookError, Result};
pub use geometry::{Point, Rect, Size};
pub use input::{classify, PointerAdapter, PointerEvent, Region};
pub use layout::{LayoutState, PageFormat};
pub use mode::{AlternateFactory, AlternateKind, AlternateRenderer, ModeCoordinator, SlideRenderer, ViewMode};
pub use overlay::{Hotspot, HotspotAction, PlacedHotspot};
pub use render::{DrawOp, FoldRenderer, GradientStop, Rgba};
pub use spread::{Direction, PageIndicator, Spread, TurnPlan};
pub use viewer::{Command, Document, Viewer, ViewerEvent, ViewerOptions, ViewerState};
