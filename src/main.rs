//! Trellis demo: a header bar, a document sidebar and a scrolling content pane,
//! laid out each frame and drawn in software.

mod documents;
mod ui;

use std::rc::Rc;

use anyhow::{Context, Result};
use tiny_skia::Pixmap;
use trellis_config::TrellisConfig;
use trellis_layout::{
    Capacity, Color, Dimensions, FontId, ImageConfig, LayoutEngine, LayoutError, MeasureText,
    TextConfig, Vector2,
};
use trellis_render::{
    Canvas, FontTable, ImageTable, Mesh, Model, ModelTable, PixmapCanvas, Renderer,
};
use trellis_window::{AppWindow, FrameHandler, FrameInput};

use crate::documents::Selection;
use crate::ui::Screen;

const CLEAR: Color = Color::BLACK;
const MODEL_COLOR: Color = Color::rgb(230, 230, 230);

struct Demo {
    engine: LayoutEngine,
    renderer: Renderer,
    canvas: PixmapCanvas,
    screen: Screen,
    selection: Selection,
    drag_scrolling: bool,
}

impl FrameHandler for Demo {
    fn frame(&mut self, input: &FrameInput) -> Result<&Pixmap> {
        let dimensions = Dimensions::new(input.logical_size[0], input.logical_size[1]);
        self.engine.set_layout_dimensions(dimensions);
        self.engine
            .set_pointer_state(Vector2::new(input.pointer[0], input.pointer[1]), input.left_down);
        self.engine.update_scroll_containers(
            self.drag_scrolling,
            Vector2::new(input.wheel[0], input.wheel[1]),
            input.frame_time,
        );

        let mut layout = self.engine.begin_layout();
        ui::declare(&mut layout, &self.screen, &mut self.selection);
        let commands = self.engine.end_layout()?;

        let (width, height) = input.physical_size();
        self.canvas.resize(width, height, input.scale_factor)?;
        self.canvas.clear(CLEAR);
        self.renderer.render(&mut self.canvas, &commands, dimensions)?;
        Ok(self.canvas.pixmap())
    }
}

fn load_fonts(config: &TrellisConfig) -> Result<(FontTable, FontId)> {
    let mut fonts = FontTable::new();
    let body = match &config.text.font {
        Some(path) => fonts
            .load_file(path)
            .with_context(|| format!("loading font {}", path.display()))?,
        None => fonts
            .load_system_sans_serif()
            .context("no font configured and no system sans-serif found")?,
    };
    Ok((fonts, body))
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = TrellisConfig::load();
    log::debug!("config: {config:?}");

    let (fonts, body_font) = load_fonts(&config)?;
    let fonts = Rc::new(fonts);

    let mut images = ImageTable::new();
    let preview = images.checkerboard(
        128,
        96,
        16,
        Color::rgb(200, 200, 200),
        Color::rgb(110, 110, 110),
    )?;
    let preview = images.dimensions(preview).map(|size| ImageConfig::new(preview, size));

    let mut models = ModelTable::new();
    let model = config
        .demo
        .show_model
        .then(|| models.insert(Model::new(Mesh::cube(1.0), 20.0, MODEL_COLOR)).custom_data());

    let screen = Screen {
        font: body_font,
        body_size: config.text.font_size,
        preview,
        model,
    };

    let capacity = Capacity {
        max_element_count: config.layout.max_element_count,
        max_measure_text_word_cache: config.layout.max_measure_text_word_cache,
    };
    log::info!("layout capacity {capacity:?} ({} bytes)", capacity.min_memory_size());
    let window_size = Dimensions::new(config.window.width as f32, config.window.height as f32);
    let mut engine = LayoutEngine::new(
        capacity,
        window_size,
        Some(Box::new(|error: &LayoutError| log::error!("layout: {error}"))),
    );
    let measure_fonts = Rc::clone(&fonts);
    engine.set_measure_text(move |text: &str, config: &TextConfig| {
        measure_fonts.measure_text(text, config)
    });
    engine.set_scroll_speed(config.layout.scroll_speed);

    let mut renderer = Renderer::new(fonts, images, models);
    renderer.set_model_distance(config.demo.model_distance);

    let window = AppWindow::new(&config.window).context("creating window")?;
    let demo = Demo {
        engine,
        renderer,
        canvas: PixmapCanvas::new(config.window.width, config.window.height, 1.0)?,
        screen,
        selection: Selection::default(),
        drag_scrolling: config.layout.drag_scrolling,
    };
    window.run(demo)
}
