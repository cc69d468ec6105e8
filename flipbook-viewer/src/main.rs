use anyhow::{Context, Result};
use clap::Parser;
use iced::{
    keyboard::{self, key::Named, Key},
    widget::{button, canvas, column, container, horizontal_space, pick_list, row, text},
    window, Color, Element, Length, Subscription, Task, Theme,
};
use std::path::PathBuf;
use std::time::Instant;

mod book;
mod pages;
mod sound;
mod viewport;

use book::BookCanvas;
use flipbook_core::{
    AudioFeedback, Command, Document, EngineConfig, PageCache, PointerEvent, SoundSink, ViewMode, Viewer,
    ViewerEvent, ViewerOptions,
};
use pages::PageHandles;
use sound::CpalSink;
use viewport::Viewport;

const WINDOW_SIZE: iced::Size = iced::Size::new(1280.0, 860.0);
/// Height taken by the toolbar above the book.
const TOOLBAR_HEIGHT: f32 = 52.0;

/// Flipbook viewer: shows a directory of page images as a turnable book.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Directory holding page_<n>.jpg files and an optional flipbook.json
    document: PathBuf,

    /// Display mode (default, magazine, coverflow, cards, cube, flip, fade)
    #[arg(long)]
    mode: Option<String>,

    /// Engine configuration file (JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Start with the page-turn sound off
    #[arg(long)]
    mute: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "flipbook_viewer=debug,flipbook_core=debug,info".into()),
        )
        .init();

    let args = Args::parse();
    let mut config = match &args.config {
        Some(path) => EngineConfig::load(path).with_context(|| format!("Failed to load config {}", path.display()))?,
        None => EngineConfig::default(),
    };
    let document = Document::open(&args.document)
        .with_context(|| format!("Failed to open document {}", args.document.display()))?;
    if let Some(color) = &document.manifest.background_color {
        config.background_color = color.clone();
    }

    let title = document.title();
    iced::application(move |_: &FlipbookApp| title.clone(), FlipbookApp::update, FlipbookApp::view)
        .subscription(FlipbookApp::subscription)
        .theme(|_| Theme::Dark)
        .window_size(WINDOW_SIZE)
        .run_with(move || FlipbookApp::new(args, config, document))?;
    Ok(())
}

#[derive(Debug, Clone)]
enum Message {
    Loaded(PageCache),
    Engine(Command),
    Pointer(PointerEvent),
    Frame(Instant),
    Resized(iced::Size),
    ModeSelected(ViewMode),
    ZoomIn,
    ZoomOut,
    ZoomReset,
    ToggleFullscreen,
}

struct Loaded {
    viewer: Viewer,
    handles: PageHandles,
}

struct FlipbookApp {
    document: Document,
    config: EngineConfig,
    requested_mode: Option<String>,
    muted: bool,
    sink: Option<Box<dyn SoundSink>>,
    window: iced::Size,
    viewport: Viewport,
    fullscreen: bool,
    loaded: Option<Loaded>,
    page_label: String,
    at_start: bool,
    at_end: bool,
}

impl FlipbookApp {
    fn new(args: Args, config: EngineConfig, document: Document) -> (Self, Task<Message>) {
        let sink: Option<Box<dyn SoundSink>> = if config.sound_enabled {
            match CpalSink::open() {
                Ok(sink) => Some(Box::new(sink)),
                Err(e) => {
                    tracing::debug!("Page-turn sound unavailable: {:#}", e);
                    None
                }
            }
        } else {
            None
        };

        let preload = document.clone();
        (
            Self {
                document,
                config,
                requested_mode: args.mode,
                muted: args.mute,
                sink,
                window: WINDOW_SIZE,
                viewport: Viewport::new(),
                fullscreen: false,
                loaded: None,
                page_label: String::new(),
                at_start: true,
                at_end: true,
            },
            Task::perform(async move { preload.preload().await }, Message::Loaded),
        )
    }

    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::Loaded(cache) => {
                let handles = PageHandles::from_cache(&cache);
                let mut options = ViewerOptions::new(self.config.clone(), self.book_area())
                    .with_manifest(&self.document.manifest);
                if let Some(name) = &self.requested_mode {
                    options = options.with_mode(ViewMode::from_name_or_default(name));
                }
                let audio = AudioFeedback::new(self.sink.take(), self.muted);
                let viewer = Viewer::new(cache, audio, options);
                tracing::info!(
                    "Showing {} pages ({} decoded) in {} mode",
                    viewer.total_pages(),
                    handles.len(),
                    viewer.mode().name()
                );
                self.loaded = Some(Loaded { viewer, handles });
                self.drain_viewer_events();
            }
            Message::Engine(command) => {
                if let Some(loaded) = self.loaded.as_mut() {
                    loaded.viewer.dispatch(command);
                }
                self.drain_viewer_events();
            }
            Message::Pointer(event) => {
                if let Some(loaded) = self.loaded.as_mut() {
                    loaded.viewer.pointer(event, Instant::now());
                }
                self.drain_viewer_events();
            }
            Message::Frame(now) => {
                if let Some(loaded) = self.loaded.as_mut() {
                    loaded.viewer.dispatch(Command::Tick(now));
                }
                self.drain_viewer_events();
            }
            Message::Resized(size) => {
                self.window = size;
                let area = self.book_area();
                if let Some(loaded) = self.loaded.as_mut() {
                    loaded.viewer.dispatch(Command::Resize {
                        width: area.width,
                        height: area.height,
                    });
                }
            }
            Message::ModeSelected(mode) => {
                return self.update(Message::Engine(Command::SetMode(mode.name().to_string())));
            }
            Message::ZoomIn => self.viewport.zoom_in(),
            Message::ZoomOut => self.viewport.zoom_out(),
            Message::ZoomReset => self.viewport.reset_zoom(),
            Message::ToggleFullscreen => {
                self.fullscreen = !self.fullscreen;
                let mode = window_mode(self.fullscreen);
                return window::get_latest().and_then(move |id| window::change_mode(id, mode));
            }
        }
        Task::none()
    }

    /// Space available to the book below the toolbar.
    fn book_area(&self) -> flipbook_core::Size {
        flipbook_core::Size::new(self.window.width, (self.window.height - TOOLBAR_HEIGHT).max(1.0))
    }

    fn drain_viewer_events(&mut self) {
        let Some(loaded) = self.loaded.as_mut() else {
            return;
        };
        for event in loaded.viewer.drain_events() {
            match event {
                ViewerEvent::CurrentPageChanged {
                    display_text,
                    at_start,
                    at_end,
                } => {
                    self.page_label = display_text;
                    self.at_start = at_start;
                    self.at_end = at_end;
                }
                ViewerEvent::ModeChanged(name) => {
                    tracing::debug!("Display mode is now {}", name);
                }
                ViewerEvent::OpenLink(url) => {
                    tracing::info!("Hotspot link requested: {}", url);
                }
            }
        }
    }

    fn subscription(&self) -> Subscription<Message> {
        let keys = keyboard::on_key_press(|key, _modifiers| match key.as_ref() {
            Key::Named(Named::ArrowLeft) => Some(Message::Engine(Command::Prev)),
            Key::Named(Named::ArrowRight) => Some(Message::Engine(Command::Next)),
            Key::Named(Named::Home) => Some(Message::Engine(Command::First)),
            Key::Named(Named::End) => Some(Message::Engine(Command::Last)),
            Key::Character("+") | Key::Character("=") => Some(Message::ZoomIn),
            Key::Character("-") => Some(Message::ZoomOut),
            Key::Character("0") => Some(Message::ZoomReset),
            Key::Named(Named::F11) => Some(Message::ToggleFullscreen),
            _ => None,
        });
        let resize = window::resize_events().map(|(_id, size)| Message::Resized(size));

        let animating = self.loaded.as_ref().is_some_and(|loaded| loaded.viewer.needs_frames());
        let frames = if animating {
            window::frames().map(Message::Frame)
        } else {
            Subscription::none()
        };

        Subscription::batch([keys, resize, frames])
    }

    fn view(&self) -> Element<Message> {
        let Some(loaded) = &self.loaded else {
            return container(text(format!("Loading {}...", self.document.title())).size(18))
                .width(Length::Fill)
                .height(Length::Fill)
                .center_x(Length::Fill)
                .center_y(Length::Fill)
                .into();
        };
        let viewer = &loaded.viewer;
        let state = viewer.state();

        let toolbar = row![
            pick_list(ViewMode::ALL, Some(state.mode), Message::ModeSelected),
            horizontal_space(),
            button("−").on_press_maybe(self.viewport.can_zoom_out().then_some(Message::ZoomOut)),
            text(format!("{}%", (self.viewport.zoom() * 100.0) as i32)),
            button("+").on_press_maybe(self.viewport.can_zoom_in().then_some(Message::ZoomIn)),
            button("Reset").on_press(Message::ZoomReset),
            horizontal_space(),
            button("◀").on_press_maybe((!self.at_start).then_some(Message::Engine(Command::Prev))),
            text(format!("{} / {}", self.page_label, state.total_pages)),
            button("▶").on_press_maybe((!self.at_end).then_some(Message::Engine(Command::Next))),
            horizontal_space(),
            button(if state.muted { "Sound off" } else { "Sound on" })
                .on_press(Message::Engine(Command::ToggleSound)),
            button(if self.fullscreen { "Exit full screen" } else { "Full screen" })
                .on_press(Message::ToggleFullscreen),
        ]
        .spacing(10)
        .padding(10)
        .align_y(iced::Alignment::Center);

        let surface = viewer.surface().canvas_size();
        let book = canvas(BookCanvas {
            ops: viewer.frame(),
            overlays: viewer.overlays(),
            handles: &loaded.handles,
            viewport: &self.viewport,
            surface: iced::Size::new(surface.width, surface.height),
            background: background_color(&self.config),
        })
        .width(Length::Fill)
        .height(Length::Fill);

        column![toolbar, book].into()
    }
}

fn background_color(config: &EngineConfig) -> Color {
    let [r, g, b] = config.background_rgb();
    Color::from_rgb8(r, g, b)
}

fn window_mode(fullscreen: bool) -> window::Mode {
    if fullscreen {
        window::Mode::Fullscreen
    } else {
        window::Mode::Windowed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fullscreen_flag_picks_window_mode() {
        assert_eq!(window_mode(true), window::Mode::Fullscreen);
        assert_eq!(window_mode(false), window::Mode::Windowed);
    }
}
