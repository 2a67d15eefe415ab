//! The demo screen: header bar with a File dropdown, a document sidebar and a
//! scrolling content pane.

use trellis_layout::{
    AlignY, AttachPoint, AttachPoints, ChildAlignment, Color, CustomConfig, CustomData, ElementId,
    FloatingConfig, FontId, ImageConfig, LayoutDirection, Padding, PointerState, RectangleConfig,
    ScrollConfig, Sizing, TextConfig, Ui,
};

use crate::documents::{DOCUMENTS, Selection};

const BACKGROUND: Color = Color::rgb(43, 41, 51);
const CONTENT_BACKGROUND: Color = Color::rgb(90, 90, 90);
const BUTTON: Color = Color::rgb(140, 140, 140);
const MENU: Color = Color::rgb(40, 40, 40);
const DOCUMENT_SELECTED: Color = Color::rgb(120, 120, 120);
const DOCUMENT_HOVERED: Color = Color::rgba(120, 120, 120, 120);
const MENU_ITEM_HOVERED: Color = Color::rgb(70, 70, 70);

const BUTTON_FONT_SIZE: f32 = 16.0;
const HEADER_HEIGHT: f32 = 60.0;
const SIDEBAR_WIDTH: f32 = 250.0;
const MENU_WIDTH: f32 = 200.0;
const MODEL_HEIGHT: f32 = 300.0;

/// Resources the screen refers to.
#[derive(Debug, Clone, Copy)]
pub struct Screen {
    pub font: FontId,
    /// Size of document titles and body text.
    pub body_size: f32,
    pub preview: Option<ImageConfig>,
    /// Model drawn by the custom element at the bottom of the content pane.
    pub model: Option<CustomData>,
}

impl Screen {
    fn button_text(&self) -> TextConfig {
        TextConfig::new(self.font, BUTTON_FONT_SIZE, Color::WHITE)
    }

    fn body_text(&self) -> TextConfig {
        TextConfig::new(self.font, self.body_size, Color::WHITE)
    }
}

pub fn declare(ui: &mut Ui<'_>, screen: &Screen, selection: &mut Selection) {
    ui.element()
        .id("OuterContainer")
        .rectangle(RectangleConfig::new(BACKGROUND, 0.0))
        .direction(LayoutDirection::TopToBottom)
        .sizing(Sizing::grow(), Sizing::grow())
        .padding(Padding::all(16.0))
        .child_gap(16.0)
        .children(|ui| {
            header_bar(ui, screen);
            ui.element()
                .id("LowerContent")
                .sizing(Sizing::grow(), Sizing::grow())
                .child_gap(16.0)
                .children(|ui| {
                    sidebar(ui, screen, selection);
                    main_content(ui, screen, *selection);
                });
        });
}

fn header_bar(ui: &mut Ui<'_>, screen: &Screen) {
    ui.element()
        .id("HeaderBar")
        .rectangle(RectangleConfig::new(CONTENT_BACKGROUND, 8.0))
        .sizing(Sizing::grow(), Sizing::fixed(HEADER_HEIGHT))
        .padding(Padding::axes(16.0, 0.0))
        .child_gap(16.0)
        .child_alignment(ChildAlignment { y: AlignY::Center, ..Default::default() })
        .children(|ui| {
            ui.element()
                .id("FileButton")
                .padding(Padding::axes(16.0, 8.0))
                .rectangle(RectangleConfig::new(BUTTON, 5.0))
                .children(|ui| {
                    ui.text("File", screen.button_text());
                    // the menu stays open while the pointer moves from the button onto it
                    let menu_visible = ui.pointer_over(&ElementId::new("FileButton"))
                        || ui.pointer_over(&ElementId::new("FileMenu"));
                    if menu_visible {
                        file_menu(ui, screen);
                    }
                });
            header_button(ui, screen, "Edit");
            ui.element().sizing(Sizing::grow(), Sizing::fit()).empty();
            header_button(ui, screen, "Upload");
            header_button(ui, screen, "Media");
            header_button(ui, screen, "Support");
        });
}

fn header_button(ui: &mut Ui<'_>, screen: &Screen, label: &'static str) {
    ui.element()
        .padding(Padding::axes(16.0, 8.0))
        .rectangle(RectangleConfig::new(BUTTON, 5.0))
        .children(|ui| ui.text(label, screen.button_text()));
}

fn file_menu(ui: &mut Ui<'_>, screen: &Screen) {
    ui.element()
        .id("FileMenu")
        .floating(FloatingConfig {
            attach_points: AttachPoints { parent: AttachPoint::LeftBottom, ..Default::default() },
            ..Default::default()
        })
        .padding(Padding::axes(0.0, 8.0))
        .children(|ui| {
            ui.element()
                .direction(LayoutDirection::TopToBottom)
                .sizing(Sizing::fixed(MENU_WIDTH), Sizing::fit())
                .rectangle(RectangleConfig::new(MENU, 8.0))
                .children(|ui| {
                    for (index, label) in ["New", "Open", "Close"].into_iter().enumerate() {
                        let id = ui.id_local("FileMenuItem", index as u32);
                        let hovered = ui.pointer_over(&id);
                        let mut item = ui
                            .element()
                            .id(id)
                            .sizing(Sizing::grow(), Sizing::fit())
                            .padding(Padding::all(16.0));
                        if hovered {
                            item = item.rectangle(RectangleConfig::new(MENU_ITEM_HOVERED, 8.0));
                        }
                        item.children(|ui| ui.text(label, screen.button_text()));
                    }
                });
        });
}

fn sidebar(ui: &mut Ui<'_>, screen: &Screen, selection: &mut Selection) {
    ui.element()
        .id("Sidebar")
        .rectangle(RectangleConfig::new(CONTENT_BACKGROUND, 8.0))
        .direction(LayoutDirection::TopToBottom)
        .padding(Padding::all(16.0))
        .child_gap(8.0)
        .sizing(Sizing::fixed(SIDEBAR_WIDTH), Sizing::grow())
        .children(|ui| {
            for (index, document) in DOCUMENTS.iter().enumerate() {
                let id = ElementId::indexed("SidebarDocument", index as u32);
                let hovered = ui.pointer_over(&id);
                if hovered && ui.pointer().state == PointerState::PressedThisFrame {
                    log::debug!("selected document {:?}", document.title);
                    selection.select(index);
                }

                let mut item = ui
                    .element()
                    .id(id)
                    .sizing(Sizing::grow(), Sizing::fit())
                    .padding(Padding::all(16.0));
                if index == selection.index() {
                    item = item.rectangle(RectangleConfig::new(DOCUMENT_SELECTED, 8.0));
                } else if hovered {
                    item = item.rectangle(RectangleConfig::new(DOCUMENT_HOVERED, 8.0));
                }
                item.children(|ui| ui.text(document.title, screen.body_text()));
            }
        });
}

fn main_content(ui: &mut Ui<'_>, screen: &Screen, selection: Selection) {
    let document = selection.document();
    ui.element()
        .id("MainContent")
        .rectangle(RectangleConfig::new(CONTENT_BACKGROUND, 8.0))
        .scroll(ScrollConfig { horizontal: false, vertical: true })
        .direction(LayoutDirection::TopToBottom)
        .child_gap(16.0)
        .padding(Padding::all(16.0))
        .sizing(Sizing::grow(), Sizing::grow())
        .children(|ui| {
            ui.text(document.title, screen.body_text());
            ui.text(document.contents, screen.body_text());
            if let Some(preview) = screen.preview {
                ui.element().id("Preview").image(preview).empty();
            }
            if let Some(model) = screen.model {
                ui.element()
                    .id("Model")
                    .sizing(Sizing::grow(), Sizing::fixed(MODEL_HEIGHT))
                    .custom(CustomConfig { data: model, ..Default::default() })
                    .empty();
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use trellis_layout::{
        BoundingBox, Capacity, Dimensions, ImageId, LayoutEngine, RenderCommandKind, RenderCommands,
        Vector2,
    };

    const WINDOW: Dimensions = Dimensions::new(1024.0, 768.0);

    fn screen() -> Screen {
        Screen {
            font: FontId(0),
            body_size: 24.0,
            preview: Some(ImageConfig::new(ImageId(0), Dimensions::new(128.0, 96.0))),
            model: Some(CustomData(0)),
        }
    }

    fn engine() -> LayoutEngine {
        let mut engine = LayoutEngine::new(Capacity::default(), WINDOW, None);
        engine.set_measure_text(|text: &str, config: &TextConfig| {
            Dimensions::new(text.chars().count() as f32 * config.font_size * 0.5, config.font_size)
        });
        engine
    }

    fn frame(engine: &mut LayoutEngine, selection: &mut Selection) -> RenderCommands {
        let mut ui = engine.begin_layout();
        declare(&mut ui, &screen(), selection);
        engine.end_layout().unwrap()
    }

    fn center(b: BoundingBox) -> Vector2 {
        Vector2::new(b.x + b.width / 2.0, b.y + b.height / 2.0)
    }

    #[test]
    fn test_header_and_sidebar_geometry() {
        let mut engine = engine();
        frame(&mut engine, &mut Selection::default());

        let header = engine.element_data(&ElementId::new("HeaderBar")).unwrap();
        assert_eq!(header, BoundingBox::new(16.0, 16.0, 992.0, HEADER_HEIGHT));

        let sidebar = engine.element_data(&ElementId::new("Sidebar")).unwrap();
        assert_eq!(sidebar.width, SIDEBAR_WIDTH);
        assert_eq!(sidebar.y, 16.0 + HEADER_HEIGHT + 16.0);
        assert_eq!(sidebar.y + sidebar.height, WINDOW.height - 16.0);

        let main = engine.element_data(&ElementId::new("MainContent")).unwrap();
        assert_eq!(main.x, 16.0 + SIDEBAR_WIDTH + 16.0);
        assert_eq!(main.x + main.width, WINDOW.width - 16.0);
        assert_eq!((main.y, main.height), (sidebar.y, sidebar.height));
    }

    #[test]
    fn test_wheel_scrolls_main_content() {
        let mut engine = engine();
        let mut selection = Selection::default();
        frame(&mut engine, &mut selection);
        let main = engine.element_data(&ElementId::new("MainContent")).unwrap();
        let data = engine.scroll_container_data(&ElementId::new("MainContent")).unwrap();
        assert_eq!(data.container_dimensions.height, main.height);
        assert!(data.content_dimensions.height > main.height);

        engine.set_pointer_state(center(main), false);
        engine.update_scroll_containers(false, Vector2::new(0.0, -30.0), 0.016);
        let commands = frame(&mut engine, &mut selection);

        let data = engine.scroll_container_data(&ElementId::new("MainContent")).unwrap();
        assert_eq!(data.scroll_position, Vector2::new(0.0, -30.0));
        let title = commands
            .iter()
            .find(|command| {
                matches!(&command.kind, RenderCommandKind::Text(text) if text.text == "Squirrels")
            })
            .unwrap();
        assert_eq!(title.bounding_box.y, main.y + 16.0 - 30.0);
    }

    #[test]
    fn test_hovered_menu_item_is_highlighted() {
        let mut engine = engine();
        let mut selection = Selection::default();
        frame(&mut engine, &mut selection);
        let button = engine.element_data(&ElementId::new("FileButton")).unwrap();
        engine.set_pointer_state(center(button), false);
        frame(&mut engine, &mut selection);

        let menu = engine.element_data(&ElementId::new("FileMenu")).unwrap();
        let pointer = Vector2::new(menu.x + 20.0, menu.y + 8.0 + 16.0);
        engine.set_pointer_state(pointer, false);
        let commands = frame(&mut engine, &mut selection);

        let highlighted: Vec<BoundingBox> = commands
            .iter()
            .filter(|command| match &command.kind {
                RenderCommandKind::Rectangle(rectangle) => rectangle.color == MENU_ITEM_HOVERED,
                _ => false,
            })
            .map(|command| command.bounding_box)
            .collect();
        assert_eq!(highlighted.len(), 1);
        assert!(highlighted[0].contains(pointer));
    }

    #[test]
    fn test_file_menu_follows_hover() {
        let mut engine = engine();
        let mut selection = Selection::default();
        frame(&mut engine, &mut selection);
        assert!(engine.element_data(&ElementId::new("FileMenu")).is_none());

        let button = engine.element_data(&ElementId::new("FileButton")).unwrap();
        engine.set_pointer_state(center(button), false);
        frame(&mut engine, &mut selection);
        let menu = engine.element_data(&ElementId::new("FileMenu")).unwrap();
        assert_eq!((menu.x, menu.y), (button.x, button.y + button.height));
        assert_eq!(menu.width, MENU_WIDTH);

        // moving onto the menu keeps it open
        engine.set_pointer_state(Vector2::new(menu.x + 20.0, menu.y + menu.height - 20.0), false);
        frame(&mut engine, &mut selection);
        assert!(engine.element_data(&ElementId::new("FileMenu")).is_some());

        engine.set_pointer_state(Vector2::new(900.0, 700.0), false);
        frame(&mut engine, &mut selection);
        assert!(engine.element_data(&ElementId::new("FileMenu")).is_none());
    }

    #[test]
    fn test_clicking_a_document_selects_it() {
        let mut engine = engine();
        let mut selection = Selection::default();
        frame(&mut engine, &mut selection);

        let item = engine.element_data(&ElementId::indexed("SidebarDocument", 1)).unwrap();
        engine.set_pointer_state(center(item), false);
        frame(&mut engine, &mut selection);
        assert_eq!(selection.index(), 0);

        engine.set_pointer_state(center(item), true);
        let commands = frame(&mut engine, &mut selection);
        assert_eq!(selection.index(), 1);

        let title_drawn = commands.iter().any(|command| match &command.kind {
            RenderCommandKind::Text(text) => {
                text.text == "Lorem Ipsum" && command.bounding_box.x > item.x + item.width
            }
            _ => false,
        });
        assert!(title_drawn, "selected title shown in the content pane");
    }

    #[test]
    fn test_content_pane_is_clipped() {
        let mut engine = engine();
        let mut selection = Selection::default();
        selection.select(3);
        let commands = frame(&mut engine, &mut selection);
        let main = engine.element_data(&ElementId::new("MainContent")).unwrap();

        let kinds: Vec<&str> = commands
            .iter()
            .filter(|command| command.bounding_box == main)
            .map(|command| command.kind.name())
            .collect();
        assert_eq!(kinds, ["rectangle", "scissor-start", "scissor-end"]);
        assert!(commands.iter().any(|c| matches!(c.kind, RenderCommandKind::Image(_))));
    }
}
