//! Frame lifecycle: element declaration, Taffy layout and command generation.

use std::collections::{HashMap, HashSet};

use taffy::prelude::{AvailableSpace, NodeId, Size, Style, TaffyTree};

use crate::context::LayoutContext;
use crate::elements::{
    BorderConfig, ChildAlignment, CustomConfig, Declaration, FloatingAttachTo, FloatingConfig,
    ImageConfig, LayoutConfig, LayoutDirection, Padding, RectangleConfig, ScrollConfig, Sizing,
    SizingConfig,
};
use crate::error::{ErrorHandler, LayoutError, LayoutErrorKind};
use crate::id::ElementId;
use crate::math::{BoundingBox, Dimensions, Vector2};
use crate::pointer::{resolve_hover, HitEntry, HitRoot, HoverResult, PointerData};
use crate::render_commands::{
    BorderRenderData, CustomRenderData, ImageRenderData, RectangleRenderData, RenderCommand,
    RenderCommandKind, RenderCommands, TextRenderData,
};
use crate::scroll::{ScrollContainerData, ScrollContainers};
use crate::style::{element_style, floating_style, leaf_style, root_style};
use crate::text::{MeasureCache, MeasureText, TextAlignment, TextConfig, TextMeasurer};

const ROOT_LABEL: &str = "Trellis__RootContainer";
const ROOT_INDEX: usize = 0;
/// Placeholder on the open stack for elements dropped over capacity.
const IGNORED: usize = usize::MAX;

/// Upper bounds on per-frame storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capacity {
    pub max_element_count: usize,
    pub max_measure_text_word_cache: usize,
}

impl Default for Capacity {
    fn default() -> Self {
        Self {
            max_element_count: 8192,
            max_measure_text_word_cache: 16384,
        }
    }
}

impl Capacity {
    /// Approximate bytes needed to hold a full frame plus the word cache.
    pub fn min_memory_size(&self) -> usize {
        let per_element = std::mem::size_of::<ElementNode>()
            + std::mem::size_of::<HitEntry>()
            + std::mem::size_of::<(u32, BoundingBox)>()
            + std::mem::size_of::<RenderCommand>();
        self.max_element_count * per_element
            + self.max_measure_text_word_cache * MeasureCache::entry_size()
    }
}

struct ElementNode {
    id: ElementId,
    decl: Declaration,
    text: Option<(String, TextConfig)>,
    parent: usize,
    /// Children that take part in the parent's flow. Floating children are
    /// laid out as separate roots.
    children: Vec<usize>,
    declared_children: u32,
}

#[derive(Default)]
struct FrameTree {
    nodes: Vec<ElementNode>,
    open: Vec<usize>,
    floating: Vec<usize>,
    ids: HashSet<u32>,
    capacity_reported: bool,
    measure_reported: bool,
}

impl FrameTree {
    fn reset(&mut self, dimensions: Dimensions) {
        self.nodes.clear();
        self.open.clear();
        self.floating.clear();
        self.ids.clear();
        self.capacity_reported = false;
        self.measure_reported = false;

        let id = ElementId::new(ROOT_LABEL);
        self.ids.insert(id.id);
        self.nodes.push(ElementNode {
            id,
            decl: Declaration {
                layout: LayoutConfig {
                    sizing: SizingConfig::new(
                        Sizing::fixed(dimensions.width),
                        Sizing::fixed(dimensions.height),
                    ),
                    ..Default::default()
                },
                ..Default::default()
            },
            text: None,
            parent: ROOT_INDEX,
            children: Vec::new(),
            declared_children: 0,
        });
        self.open.push(ROOT_INDEX);
    }

    fn current(&self) -> Option<&ElementNode> {
        self.open.last().and_then(|&index| self.nodes.get(index))
    }
}

/// Retained layout state plus the tree of the frame being declared.
pub struct LayoutEngine {
    capacity: Capacity,
    dimensions: Dimensions,
    measure: Option<Box<dyn MeasureText>>,
    error_handler: Option<ErrorHandler>,
    text_cache: MeasureCache,
    frame: FrameTree,
    pointer: PointerData,
    hover: HoverResult,
    hit_roots: Vec<HitRoot>,
    element_boxes: HashMap<u32, BoundingBox>,
    scroll: ScrollContainers,
    scroll_speed: f32,
}

impl LayoutEngine {
    pub fn new(
        capacity: Capacity,
        dimensions: Dimensions,
        error_handler: Option<ErrorHandler>,
    ) -> Self {
        log::debug!(
            "layout engine: {} elements, {} cached words, ~{} bytes",
            capacity.max_element_count,
            capacity.max_measure_text_word_cache,
            capacity.min_memory_size()
        );
        Self {
            capacity,
            dimensions,
            measure: None,
            error_handler,
            text_cache: MeasureCache::new(capacity.max_measure_text_word_cache),
            frame: FrameTree::default(),
            pointer: PointerData::default(),
            hover: HoverResult::default(),
            hit_roots: Vec::new(),
            element_boxes: HashMap::new(),
            scroll: ScrollContainers::default(),
            scroll_speed: 1.0,
        }
    }

    pub fn set_measure_text(&mut self, measure: impl MeasureText + 'static) {
        self.measure = Some(Box::new(measure));
    }

    pub fn set_error_handler(&mut self, handler: ErrorHandler) {
        self.error_handler = Some(handler);
    }

    pub fn set_layout_dimensions(&mut self, dimensions: Dimensions) {
        self.dimensions = dimensions;
    }

    pub fn layout_dimensions(&self) -> Dimensions {
        self.dimensions
    }

    /// Multiplier applied to wheel deltas.
    pub fn set_scroll_speed(&mut self, speed: f32) {
        self.scroll_speed = speed;
    }

    /// Feed the pointer for this frame. Hover is resolved against the boxes
    /// of the last completed layout.
    pub fn set_pointer_state(&mut self, position: Vector2, is_down: bool) {
        self.pointer = PointerData {
            position,
            state: self.pointer.state.advance(is_down),
        };
        self.hover = resolve_hover(&self.hit_roots, position);
    }

    /// Apply wheel and drag scrolling to the container under the pointer.
    /// Call after [`Self::set_pointer_state`].
    pub fn update_scroll_containers(
        &mut self,
        enable_drag_scrolling: bool,
        wheel_delta: Vector2,
        delta_time: f32,
    ) {
        let speed = self.scroll_speed;
        let wheel = Vector2::new(wheel_delta.x * speed, wheel_delta.y * speed);
        let target = self.hover.scroll_target;
        self.scroll.update(enable_drag_scrolling, wheel, delta_time, self.pointer, target);
    }

    pub fn pointer(&self) -> PointerData {
        self.pointer
    }

    pub fn pointer_over(&self, id: &ElementId) -> bool {
        self.hover.ids.iter().any(|hovered| hovered.id == id.id)
    }

    /// Screen-space box of an element from the last completed layout.
    pub fn element_data(&self, id: &ElementId) -> Option<BoundingBox> {
        self.element_boxes.get(&id.id).copied()
    }

    pub fn scroll_container_data(&self, id: &ElementId) -> Option<ScrollContainerData> {
        self.scroll.data(id.id)
    }

    /// Start declaring a new frame.
    pub fn begin_layout(&mut self) -> Ui<'_> {
        self.frame.reset(self.dimensions);
        self.text_cache.begin_frame();
        Ui { engine: self }
    }

    /// Lay out the declared tree and produce the frame's draw commands.
    pub fn end_layout(&mut self) -> Result<RenderCommands, LayoutError> {
        if self.frame.nodes.is_empty() {
            return Ok(RenderCommands::default());
        }
        if self.frame.open.len() > 1 {
            log::warn!("end_layout with {} unclosed elements", self.frame.open.len() - 1);
        }

        let viewport = BoundingBox::new(0.0, 0.0, self.dimensions.width, self.dimensions.height);
        let measure: &dyn MeasureText = match self.measure.as_deref() {
            Some(measure) => measure,
            None => &ZERO_MEASURE,
        };

        self.scroll.begin_frame();
        let mut pass = LayoutPass {
            nodes: &self.frame.nodes,
            measurer: TextMeasurer { measure, cache: &mut self.text_cache },
            scroll: &mut self.scroll,
            viewport,
            boxes: HashMap::with_capacity(self.frame.nodes.len()),
            problems: Vec::new(),
            commands: Vec::new(),
            hits: Vec::new(),
            z_index: 0,
        };
        let result = pass.run(&self.frame.floating, self.dimensions);
        let LayoutPass { boxes, problems, .. } = pass;
        self.scroll.end_frame();

        for problem in problems {
            self.report(problem);
        }
        if self.text_cache.overflowed() {
            self.report(LayoutError::new(
                LayoutErrorKind::TextMeasurementCapacityExceeded,
                format!(
                    "more than {} distinct words measured",
                    self.capacity.max_measure_text_word_cache
                ),
            ));
        }

        let batches = result?;
        let mut commands = Vec::with_capacity(batches.iter().map(|b| b.commands.len()).sum());
        self.hit_roots.clear();
        for batch in batches {
            commands.extend(batch.commands);
            self.hit_roots.push(batch.hits);
        }
        self.element_boxes = boxes;
        Ok(RenderCommands::new(commands))
    }

    fn report(&mut self, error: LayoutError) {
        match self.error_handler.as_mut() {
            Some(handler) => handler(&error),
            None => log::warn!("layout: {error}"),
        }
    }

    fn open_element(&mut self, id: Option<ElementId>, decl: Declaration) -> ElementId {
        if self.frame.nodes.len() >= self.capacity.max_element_count {
            if !self.frame.capacity_reported {
                self.frame.capacity_reported = true;
                let max = self.capacity.max_element_count;
                self.report(LayoutError::new(
                    LayoutErrorKind::ElementsCapacityExceeded,
                    format!("more than {max} elements declared; the rest of the frame is dropped"),
                ));
            }
            self.frame.open.push(IGNORED);
            return id.unwrap_or_default();
        }

        let parent = match self.frame.open.last() {
            Some(&IGNORED) | None => {
                self.frame.open.push(IGNORED);
                return id.unwrap_or_default();
            }
            Some(&parent) => parent,
        };

        let parent_node = &self.frame.nodes[parent];
        let id = id.unwrap_or_else(|| {
            ElementId::anonymous(parent_node.declared_children, parent_node.id.id)
        });
        if !self.frame.ids.insert(id.id) {
            let label = if id.string_id.is_empty() { "<anonymous>" } else { &id.string_id };
            let message = format!("element id {label} (offset {}) declared twice", id.offset);
            self.report(LayoutError::new(LayoutErrorKind::DuplicateId, message));
        }

        let index = self.frame.nodes.len();
        let floating = decl.floating.is_some();
        self.frame.nodes.push(ElementNode {
            id: id.clone(),
            decl,
            text: None,
            parent,
            children: Vec::new(),
            declared_children: 0,
        });
        let parent_node = &mut self.frame.nodes[parent];
        parent_node.declared_children += 1;
        if floating {
            self.frame.floating.push(index);
        } else {
            parent_node.children.push(index);
        }
        self.frame.open.push(index);
        id
    }

    fn close_element(&mut self) {
        if self.frame.open.len() > 1 {
            self.frame.open.pop();
        } else {
            log::warn!("close_element called on the root");
        }
    }

    fn add_text(&mut self, text: String, config: TextConfig) {
        if self.measure.is_none() {
            if !self.frame.measure_reported {
                self.frame.measure_reported = true;
                self.report(LayoutError::new(
                    LayoutErrorKind::TextMeasurementFunctionNotProvided,
                    "text declared before set_measure_text",
                ));
            }
            return;
        }
        if self.frame.nodes.len() >= self.capacity.max_element_count {
            if !self.frame.capacity_reported {
                self.frame.capacity_reported = true;
                self.report(LayoutError::new(
                    LayoutErrorKind::ElementsCapacityExceeded,
                    format!("more than {} elements declared", self.capacity.max_element_count),
                ));
            }
            return;
        }
        let parent = match self.frame.open.last() {
            Some(&IGNORED) | None => return,
            Some(&parent) => parent,
        };
        let parent_node = &self.frame.nodes[parent];
        let id = ElementId::anonymous(parent_node.declared_children, parent_node.id.id);
        let index = self.frame.nodes.len();
        self.frame.nodes.push(ElementNode {
            id,
            decl: Declaration::default(),
            text: Some((text, config)),
            parent,
            children: Vec::new(),
            declared_children: 0,
        });
        let parent_node = &mut self.frame.nodes[parent];
        parent_node.declared_children += 1;
        parent_node.children.push(index);
    }
}

fn zero_measure(_: &str, _: &TextConfig) -> Dimensions {
    Dimensions::ZERO
}

static ZERO_MEASURE: fn(&str, &TextConfig) -> Dimensions = zero_measure;

/// Declaration handle for the frame being built.
pub struct Ui<'a> {
    engine: &'a mut LayoutEngine,
}

impl<'a> Ui<'a> {
    pub fn element(&mut self) -> ElementBuilder<'_> {
        ElementBuilder {
            engine: &mut *self.engine,
            id: None,
            decl: Declaration::default(),
        }
    }

    pub fn text(&mut self, text: impl Into<String>, config: TextConfig) {
        self.engine.add_text(text.into(), config);
    }

    /// Whether the pointer is over the element currently open.
    pub fn hovered(&self) -> bool {
        self.engine
            .frame
            .current()
            .is_some_and(|node| self.engine.pointer_over(&node.id))
    }

    pub fn pointer_over(&self, id: &ElementId) -> bool {
        self.engine.pointer_over(id)
    }

    pub fn pointer(&self) -> PointerData {
        self.engine.pointer
    }

    /// Id unique below the currently open element.
    pub fn id_local(&self, label: &'static str, index: u32) -> ElementId {
        let parent = self.engine.frame.current().map_or(0, |node| node.id.id);
        ElementId::local(label, index, parent)
    }

    /// Box of an element from the previous frame.
    pub fn element_data(&self, id: &ElementId) -> Option<BoundingBox> {
        self.engine.element_data(id)
    }
}

/// Collects an element's configuration; `children` or `empty` declares it.
#[must_use = "an element is only declared by `children` or `empty`"]
pub struct ElementBuilder<'a> {
    engine: &'a mut LayoutEngine,
    id: Option<ElementId>,
    decl: Declaration,
}

impl<'a> ElementBuilder<'a> {
    pub fn id(mut self, id: impl Into<ElementId>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn layout(mut self, layout: LayoutConfig) -> Self {
        self.decl.layout = layout;
        self
    }

    pub fn sizing(mut self, width: Sizing, height: Sizing) -> Self {
        self.decl.layout.sizing = SizingConfig::new(width, height);
        self
    }

    pub fn padding(mut self, padding: Padding) -> Self {
        self.decl.layout.padding = padding;
        self
    }

    pub fn child_gap(mut self, gap: f32) -> Self {
        self.decl.layout.child_gap = gap;
        self
    }

    pub fn child_alignment(mut self, alignment: ChildAlignment) -> Self {
        self.decl.layout.child_alignment = alignment;
        self
    }

    pub fn direction(mut self, direction: LayoutDirection) -> Self {
        self.decl.layout.direction = direction;
        self
    }

    pub fn rectangle(mut self, rectangle: RectangleConfig) -> Self {
        self.decl.rectangle = Some(rectangle);
        self
    }

    pub fn border(mut self, border: BorderConfig) -> Self {
        self.decl.border = Some(border);
        self
    }

    pub fn image(mut self, image: ImageConfig) -> Self {
        self.decl.image = Some(image);
        self
    }

    pub fn floating(mut self, floating: FloatingConfig) -> Self {
        self.decl.floating = Some(floating);
        self
    }

    pub fn scroll(mut self, scroll: ScrollConfig) -> Self {
        self.decl.scroll = Some(scroll);
        self
    }

    pub fn custom(mut self, custom: CustomConfig) -> Self {
        self.decl.custom = Some(custom);
        self
    }

    /// Declare the element with children added by `f`.
    pub fn children(self, f: impl FnOnce(&mut Ui<'_>)) -> ElementId {
        let ElementBuilder { engine, id, decl } = self;
        let id = engine.open_element(id, decl);
        {
            let mut ui = Ui { engine: &mut *engine };
            f(&mut ui);
        }
        engine.close_element();
        id
    }

    pub fn empty(self) -> ElementId {
        self.children(|_| {})
    }
}

enum NodeContext {
    Text(usize),
    Image(Dimensions),
}

/// Commands and hit entries of one layout root.
struct RootBatch {
    z_index: i16,
    commands: Vec<RenderCommand>,
    hits: HitRoot,
}

struct LayoutPass<'a> {
    nodes: &'a [ElementNode],
    measurer: TextMeasurer<'a>,
    scroll: &'a mut ScrollContainers,
    viewport: BoundingBox,
    boxes: HashMap<u32, BoundingBox>,
    problems: Vec<LayoutError>,
    commands: Vec<RenderCommand>,
    hits: Vec<HitEntry>,
    z_index: i16,
}

fn internal(error: taffy::TaffyError) -> LayoutError {
    LayoutError::new(LayoutErrorKind::InternalError, error.to_string())
}

fn child_style(nodes: &[ElementNode], index: usize, parent_direction: LayoutDirection) -> Style {
    if nodes[index].text.is_some() {
        leaf_style()
    } else {
        element_style(&nodes[index].decl, parent_direction)
    }
}

fn build(
    tree: &mut TaffyTree<NodeContext>,
    nodes: &[ElementNode],
    index: usize,
    style: Style,
) -> taffy::TaffyResult<NodeId> {
    let node = &nodes[index];
    if node.text.is_some() {
        return tree.new_leaf_with_context(style, NodeContext::Text(index));
    }
    if node.children.is_empty() {
        return match node.decl.image {
            Some(image) => {
                tree.new_leaf_with_context(style, NodeContext::Image(image.source_dimensions))
            }
            None => tree.new_leaf(style),
        };
    }
    let direction = node.decl.layout.direction;
    let children = node
        .children
        .iter()
        .map(|&child| build(tree, nodes, child, child_style(nodes, child, direction)))
        .collect::<taffy::TaffyResult<Vec<_>>>()?;
    tree.new_with_children(style, &children)
}

fn measure_node(
    nodes: &[ElementNode],
    measurer: &mut TextMeasurer<'_>,
    known: Size<Option<f32>>,
    available: Size<AvailableSpace>,
    context: Option<&mut NodeContext>,
) -> Size<f32> {
    match context {
        Some(NodeContext::Text(index)) => {
            let Some((text, config)) = &nodes[*index].text else {
                return Size::ZERO;
            };
            let max_width = known.width.or_else(|| match available.width {
                AvailableSpace::Definite(width) => Some(width),
                AvailableSpace::MinContent => Some(measurer.min_content_width(text, config)),
                AvailableSpace::MaxContent => None,
            });
            let wrapped = measurer.wrap(text, config, max_width);
            Size {
                width: known.width.unwrap_or(wrapped.width),
                height: known.height.unwrap_or(wrapped.height()),
            }
        }
        Some(NodeContext::Image(source)) => match (known.width, known.height) {
            (Some(width), None) if source.width > 0.0 => Size {
                width,
                height: width * source.height / source.width,
            },
            (None, Some(height)) if source.height > 0.0 => Size {
                width: height * source.width / source.height,
                height,
            },
            _ => Size {
                width: known.width.unwrap_or(source.width),
                height: known.height.unwrap_or(source.height),
            },
        },
        None => Size::ZERO,
    }
}

impl<'a> LayoutPass<'a> {
    fn run(
        &mut self,
        floating: &[usize],
        dimensions: Dimensions,
    ) -> Result<Vec<RootBatch>, LayoutError> {
        let nodes = self.nodes;
        let mut tree: TaffyTree<NodeContext> = TaffyTree::with_capacity(nodes.len());
        let mut batches = Vec::with_capacity(floating.len() + 1);

        let root = build(&mut tree, nodes, ROOT_INDEX, root_style(dimensions)).map_err(internal)?;
        self.compute(&mut tree, root, Size {
            width: AvailableSpace::Definite(dimensions.width),
            height: AvailableSpace::Definite(dimensions.height),
        })?;
        let mut ctx = LayoutContext::new(Vector2::ZERO);
        self.emit(&tree, ROOT_INDEX, root, &mut ctx, None)?;
        batches.push(self.take_batch(None));

        for &index in floating {
            let node = &nodes[index];
            let Some(config) = node.decl.floating.as_ref() else {
                continue;
            };
            let Some(target) = self.attach_target(index, config) else {
                continue;
            };

            let style = floating_style(&node.decl, target.dimensions(), config.expand);
            let root = build(&mut tree, nodes, index, style).map_err(internal)?;
            self.compute(&mut tree, root, Size {
                width: AvailableSpace::MaxContent,
                height: AvailableSpace::MaxContent,
            })?;
            let layout = *tree.layout(root).map_err(internal)?;

            let (element_x, element_y) = config.attach_points.element.factors();
            let (parent_x, parent_y) = config.attach_points.parent.factors();
            let origin = Vector2::new(
                target.x + target.width * parent_x - layout.size.width * element_x
                    + config.offset.x
                    - layout.location.x,
                target.y + target.height * parent_y - layout.size.height * element_y
                    + config.offset.y
                    - layout.location.y,
            );

            self.z_index = config.z_index;
            let mut ctx = LayoutContext::new(origin);
            self.emit(&tree, index, root, &mut ctx, None)?;
            batches.push(self.take_batch(Some(config)));
        }

        batches.sort_by_key(|batch| batch.z_index);
        Ok(batches)
    }

    fn attach_target(&mut self, index: usize, config: &FloatingConfig) -> Option<BoundingBox> {
        let node = &self.nodes[index];
        let target = match &config.attach_to {
            FloatingAttachTo::Parent => self.boxes.get(&self.nodes[node.parent].id.id).copied(),
            FloatingAttachTo::Element(id) => self.boxes.get(id).copied(),
            FloatingAttachTo::Root => Some(self.viewport),
        };
        if target.is_none() {
            let label =
                if node.id.string_id.is_empty() { "<anonymous>" } else { &node.id.string_id };
            self.problems.push(LayoutError::new(
                LayoutErrorKind::FloatingContainerParentNotFound,
                format!("floating element {label} has no attach target {:?}", config.attach_to),
            ));
        }
        target
    }

    fn compute(
        &mut self,
        tree: &mut TaffyTree<NodeContext>,
        root: NodeId,
        available: Size<AvailableSpace>,
    ) -> Result<(), LayoutError> {
        let nodes = self.nodes;
        let measurer = &mut self.measurer;
        tree.compute_layout_with_measure(root, available, |known, available_space, _, context, _| {
            measure_node(nodes, &mut *measurer, known, available_space, context)
        })
        .map_err(internal)
    }

    fn take_batch(&mut self, floating: Option<&FloatingConfig>) -> RootBatch {
        let z_index = self.z_index;
        self.z_index = 0;
        RootBatch {
            z_index,
            commands: std::mem::take(&mut self.commands),
            hits: HitRoot {
                entries: std::mem::take(&mut self.hits),
                capture: floating.map(|config| config.pointer_capture_mode),
            },
        }
    }

    fn push(&mut self, id: u32, bounding_box: BoundingBox, kind: RenderCommandKind) {
        self.commands.push(RenderCommand {
            bounding_box,
            id,
            z_index: self.z_index,
            kind,
        });
    }

    fn emit(
        &mut self,
        tree: &TaffyTree<NodeContext>,
        index: usize,
        node_id: NodeId,
        ctx: &mut LayoutContext,
        clip: Option<BoundingBox>,
    ) -> Result<(), LayoutError> {
        let nodes = self.nodes;
        let node = &nodes[index];
        let layout = *tree.layout(node_id).map_err(internal)?;
        let bounding_box = ctx.to_bounding_box(&layout);
        let id = node.id.id;

        self.boxes.insert(id, bounding_box);
        self.hits.push(HitEntry {
            id: node.id.clone(),
            bounding_box,
            clip,
            is_scroll: node.decl.scroll.is_some(),
        });

        let visible = self.viewport.intersect(&bounding_box).is_some()
            && clip.map_or(true, |clip| clip.intersect(&bounding_box).is_some());

        if let Some((text, config)) = &node.text {
            if visible {
                self.emit_text(id, bounding_box, text, config);
            }
            return Ok(());
        }

        let decl = &node.decl;
        if visible {
            if let Some(rectangle) = decl.rectangle {
                self.push(id, bounding_box, RenderCommandKind::Rectangle(RectangleRenderData {
                    color: rectangle.color,
                    corner_radius: rectangle.corner_radius,
                }));
            }
            if let Some(image) = decl.image {
                self.push(id, bounding_box, RenderCommandKind::Image(ImageRenderData {
                    image: image.image,
                    tint: image.tint,
                    corner_radius: image.corner_radius,
                }));
            }
            if let Some(custom) = decl.custom {
                self.push(id, bounding_box, RenderCommandKind::Custom(CustomRenderData {
                    data: custom.data,
                    background_color: custom.background_color,
                    corner_radius: custom.corner_radius,
                }));
            }
        }

        let children = tree.children(node_id).map_err(internal)?;
        let mut child_offset = Vector2::ZERO;
        let mut child_clip = clip;
        if let Some(scroll) = decl.scroll {
            let content = content_size(tree, &children, &decl.layout.padding)?;
            child_offset = self.scroll.touch(id, bounding_box, content, scroll);
            child_clip = Some(match clip {
                Some(clip) => clip
                    .intersect(&bounding_box)
                    .unwrap_or(BoundingBox::new(bounding_box.x, bounding_box.y, 0.0, 0.0)),
                None => bounding_box,
            });
            if visible {
                self.push(id, bounding_box, RenderCommandKind::ScissorStart);
            }
        }

        ctx.push(&layout, child_offset);
        for (&child, &child_node) in node.children.iter().zip(children.iter()) {
            self.emit(tree, child, child_node, ctx, child_clip)?;
        }
        ctx.pop();

        if decl.scroll.is_some() && visible {
            self.push(id, bounding_box, RenderCommandKind::ScissorEnd);
        }

        if let Some(border) = decl.border {
            if visible {
                self.push(id, bounding_box, RenderCommandKind::Border(BorderRenderData {
                    color: border.color,
                    width: border.width,
                    corner_radius: border.corner_radius,
                }));
                if border.width.between_children > 0.0 {
                    self.emit_separators(node, bounding_box, &border);
                }
            }
        }
        Ok(())
    }

    fn emit_text(&mut self, id: u32, bounding_box: BoundingBox, text: &str, config: &TextConfig) {
        let wrapped = self.measurer.wrap(text, config, Some(bounding_box.width));
        for (row, line) in wrapped.lines.iter().enumerate() {
            if line.range.is_empty() {
                continue;
            }
            let x = match config.alignment {
                TextAlignment::Left => bounding_box.x,
                TextAlignment::Center => bounding_box.x + (bounding_box.width - line.width) / 2.0,
                TextAlignment::Right => bounding_box.x + bounding_box.width - line.width,
            };
            let line_box = BoundingBox::new(
                x,
                bounding_box.y + row as f32 * wrapped.line_height,
                line.width,
                wrapped.line_height,
            );
            self.push(id, line_box, RenderCommandKind::Text(TextRenderData {
                text: text[line.range.clone()].to_string(),
                color: config.color,
                font_id: config.font_id,
                font_size: config.font_size,
                letter_spacing: config.letter_spacing,
                line_height: wrapped.line_height,
            }));
        }
    }

    /// Separator lines centred in the gaps between flow children.
    fn emit_separators(
        &mut self,
        node: &ElementNode,
        bounding_box: BoundingBox,
        border: &BorderConfig,
    ) {
        let width = border.width.between_children;
        let gap = node.decl.layout.child_gap;
        let rectangle = RectangleRenderData {
            color: border.color,
            corner_radius: Default::default(),
        };
        let child_boxes: Vec<BoundingBox> = node
            .children
            .iter()
            .filter_map(|&child| self.boxes.get(&self.nodes[child].id.id).copied())
            .collect();
        for previous in child_boxes.iter().take(child_boxes.len().saturating_sub(1)) {
            let separator = match node.decl.layout.direction {
                LayoutDirection::LeftToRight => BoundingBox::new(
                    previous.x + previous.width + (gap - width) / 2.0,
                    bounding_box.y,
                    width,
                    bounding_box.height,
                ),
                LayoutDirection::TopToBottom => BoundingBox::new(
                    bounding_box.x,
                    previous.y + previous.height + (gap - width) / 2.0,
                    bounding_box.width,
                    width,
                ),
            };
            self.push(node.id.id, separator, RenderCommandKind::Rectangle(rectangle.clone()));
        }
    }
}

/// Extent of the children relative to the container's border box, plus the
/// trailing padding.
fn content_size(
    tree: &TaffyTree<NodeContext>,
    children: &[NodeId],
    padding: &Padding,
) -> Result<Dimensions, LayoutError> {
    let mut width: f32 = 0.0;
    let mut height: f32 = 0.0;
    for &child in children {
        let layout = tree.layout(child).map_err(internal)?;
        width = width.max(layout.location.x + layout.size.width);
        height = height.max(layout.location.y + layout.size.height);
    }
    Ok(Dimensions::new(width + padding.right, height + padding.bottom))
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::elements::{AttachPoint, AttachPoints, BorderWidth, PointerCaptureMode};
    use crate::math::Color;
    use crate::text::tests::fixed_advance;
    use crate::text::FontId;

    const RED: Color = Color::rgb(255, 0, 0);
    const BLUE: Color = Color::rgb(0, 0, 255);

    fn engine() -> LayoutEngine {
        let mut engine =
            LayoutEngine::new(Capacity::default(), Dimensions::new(800.0, 600.0), None);
        engine.set_measure_text(fixed_advance);
        engine
    }

    fn recording_engine(capacity: Capacity) -> (LayoutEngine, Rc<RefCell<Vec<LayoutErrorKind>>>) {
        let errors = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&errors);
        let handler: ErrorHandler =
            Box::new(move |error: &LayoutError| sink.borrow_mut().push(error.kind));
        let mut engine = LayoutEngine::new(capacity, Dimensions::new(800.0, 600.0), Some(handler));
        engine.set_measure_text(fixed_advance);
        (engine, errors)
    }

    fn kinds(commands: &RenderCommands) -> Vec<&'static str> {
        commands.iter().map(|c| c.kind.name()).collect()
    }

    #[test]
    fn test_fixed_padding_gap_and_grow() {
        let mut engine = engine();
        let mut ui = engine.begin_layout();
        ui.element()
            .id("Outer")
            .sizing(Sizing::fixed(400.0), Sizing::fixed(300.0))
            .padding(Padding::all(10.0))
            .child_gap(5.0)
            .children(|ui| {
                ui.element().id("A").sizing(Sizing::fixed(100.0), Sizing::fixed(50.0)).empty();
                ui.element().id("B").sizing(Sizing::grow(), Sizing::fixed(50.0)).empty();
            });
        engine.end_layout().unwrap();

        let data = |id: &'static str| engine.element_data(&id.into());
        assert_eq!(data("Outer"), Some(BoundingBox::new(0.0, 0.0, 400.0, 300.0)));
        assert_eq!(data("A"), Some(BoundingBox::new(10.0, 10.0, 100.0, 50.0)));
        assert_eq!(data("B"), Some(BoundingBox::new(115.0, 10.0, 275.0, 50.0)));
    }

    #[test]
    fn test_grow_children_share_space_top_to_bottom() {
        let mut engine = engine();
        let mut ui = engine.begin_layout();
        ui.element()
            .id("Column")
            .sizing(Sizing::grow(), Sizing::grow())
            .direction(LayoutDirection::TopToBottom)
            .children(|ui| {
                ui.element().id("Header").sizing(Sizing::grow(), Sizing::fixed(100.0)).empty();
                ui.element().id("Body").sizing(Sizing::grow(), Sizing::grow()).empty();
            });
        engine.end_layout().unwrap();

        let data = |id: &'static str| engine.element_data(&id.into());
        assert_eq!(data("Column"), Some(BoundingBox::new(0.0, 0.0, 800.0, 600.0)));
        assert_eq!(data("Body"), Some(BoundingBox::new(0.0, 100.0, 800.0, 500.0)));
    }

    #[test]
    fn test_command_order_with_scissor_and_border() {
        let mut engine = engine();
        let mut ui = engine.begin_layout();
        ui.element()
            .id("Panel")
            .sizing(Sizing::fixed(200.0), Sizing::fixed(100.0))
            .rectangle(RectangleConfig::new(RED, 4.0))
            .border(BorderConfig {
                color: BLUE,
                width: BorderWidth::outside(2.0),
                ..Default::default()
            })
            .scroll(ScrollConfig { horizontal: false, vertical: true })
            .children(|ui| {
                ui.element()
                    .sizing(Sizing::fixed(50.0), Sizing::fixed(50.0))
                    .rectangle(RectangleConfig::new(BLUE, 0.0))
                    .empty();
            });
        let commands = engine.end_layout().unwrap();
        assert_eq!(
            kinds(&commands),
            vec!["rectangle", "scissor-start", "rectangle", "scissor-end", "border"]
        );
        assert_eq!(commands.as_slice()[1].bounding_box, BoundingBox::new(0.0, 0.0, 200.0, 100.0));
    }

    #[test]
    fn test_text_wraps_into_line_commands() {
        let mut engine = engine();
        let mut ui = engine.begin_layout();
        ui.element()
            .sizing(Sizing::fixed(60.0), Sizing::fit())
            .direction(LayoutDirection::TopToBottom)
            .children(|ui| {
                ui.text("hello big world", TextConfig::new(FontId(0), 10.0, Color::WHITE));
            });
        let commands = engine.end_layout().unwrap();

        let lines: Vec<(String, BoundingBox)> = commands
            .iter()
            .filter_map(|c| match &c.kind {
                RenderCommandKind::Text(text) => Some((text.text.clone(), c.bounding_box)),
                _ => None,
            })
            .collect();
        assert_eq!(lines, vec![
            ("hello big".to_string(), BoundingBox::new(0.0, 0.0, 45.0, 10.0)),
            ("world".to_string(), BoundingBox::new(0.0, 10.0, 25.0, 10.0)),
        ]);
    }

    #[test]
    fn test_floating_attaches_below_parent_and_sorts_by_z() {
        let mut engine = engine();
        let mut ui = engine.begin_layout();
        ui.element()
            .id("Anchor")
            .sizing(Sizing::fixed(100.0), Sizing::fixed(40.0))
            .rectangle(RectangleConfig::new(RED, 0.0))
            .children(|ui| {
                ui.element()
                    .id("High")
                    .sizing(Sizing::fixed(50.0), Sizing::fixed(20.0))
                    .rectangle(RectangleConfig::new(BLUE, 0.0))
                    .floating(FloatingConfig {
                        z_index: 5,
                        attach_points: AttachPoints {
                            element: AttachPoint::LeftTop,
                            parent: AttachPoint::LeftBottom,
                        },
                        ..Default::default()
                    })
                    .empty();
                ui.element()
                    .id("Low")
                    .sizing(Sizing::fixed(10.0), Sizing::fixed(10.0))
                    .rectangle(RectangleConfig::new(BLUE, 0.0))
                    .floating(FloatingConfig {
                        z_index: 1,
                        offset: Vector2::new(3.0, 4.0),
                        attach_points: AttachPoints {
                            element: AttachPoint::CenterCenter,
                            parent: AttachPoint::CenterCenter,
                        },
                        ..Default::default()
                    })
                    .empty();
            });
        let commands = engine.end_layout().unwrap();

        let ids: Vec<u32> = commands.iter().map(|c| c.id).collect();
        let high = ElementId::new("High");
        let low = ElementId::new("Low");
        assert_eq!(ids, vec![ElementId::new("Anchor").id, low.id, high.id]);
        assert_eq!(engine.element_data(&high), Some(BoundingBox::new(0.0, 40.0, 50.0, 20.0)));
        assert_eq!(engine.element_data(&low), Some(BoundingBox::new(48.0, 19.0, 10.0, 10.0)));
        assert_eq!(commands.as_slice()[2].z_index, 5);
    }

    #[test]
    fn test_missing_floating_target_is_reported() {
        let (mut engine, errors) = recording_engine(Capacity::default());
        let mut ui = engine.begin_layout();
        ui.element()
            .sizing(Sizing::fixed(10.0), Sizing::fixed(10.0))
            .floating(FloatingConfig {
                attach_to: FloatingAttachTo::Element(42),
                ..Default::default()
            })
            .empty();
        let commands = engine.end_layout().unwrap();
        assert!(commands.is_empty());
        assert_eq!(*errors.borrow(), vec![LayoutErrorKind::FloatingContainerParentNotFound]);
    }

    #[test]
    fn test_pointer_over_uses_previous_layout() {
        let mut engine = engine();
        let declare = |engine: &mut LayoutEngine| {
            let mut ui = engine.begin_layout();
            ui.element()
                .id("Button")
                .sizing(Sizing::fixed(100.0), Sizing::fixed(40.0))
                .children(|ui| {
                    ui.element()
                        .id("Menu")
                        .sizing(Sizing::fixed(100.0), Sizing::fixed(100.0))
                        .floating(FloatingConfig {
                            attach_points: AttachPoints {
                                element: AttachPoint::LeftTop,
                                parent: AttachPoint::LeftBottom,
                            },
                            pointer_capture_mode: PointerCaptureMode::Capture,
                            ..Default::default()
                        })
                        .empty();
                });
            engine.end_layout().unwrap();
        };
        declare(&mut engine);

        engine.set_pointer_state(Vector2::new(10.0, 10.0), false);
        assert!(engine.pointer_over(&"Button".into()));
        assert!(!engine.pointer_over(&"Menu".into()));

        engine.set_pointer_state(Vector2::new(10.0, 80.0), true);
        assert!(engine.pointer_over(&"Menu".into()));
        assert!(!engine.pointer_over(&ElementId::new(ROOT_LABEL)));
        assert_eq!(engine.pointer().state, crate::pointer::PointerState::PressedThisFrame);
    }

    #[test]
    fn test_hovered_inside_declaration() {
        let mut engine = engine();
        for _ in 0..2 {
            let mut ui = engine.begin_layout();
            ui.element()
                .id("Target")
                .sizing(Sizing::fixed(50.0), Sizing::fixed(50.0))
                .children(|ui| {
                    let hovered = ui.hovered();
                    ui.element().id(if hovered { "Hot" } else { "Cold" }).empty();
                });
            engine.end_layout().unwrap();
            engine.set_pointer_state(Vector2::new(25.0, 25.0), false);
        }
        assert!(engine.element_data(&"Hot".into()).is_some());
    }

    #[test]
    fn test_wheel_scrolls_hovered_container() {
        let mut engine = engine();
        engine.set_scroll_speed(10.0);
        let declare = |engine: &mut LayoutEngine| {
            let mut ui = engine.begin_layout();
            ui.element()
                .id("Scroll")
                .sizing(Sizing::fixed(100.0), Sizing::fixed(100.0))
                .direction(LayoutDirection::TopToBottom)
                .scroll(ScrollConfig { horizontal: false, vertical: true })
                .children(|ui| {
                    ui.element()
                        .id("Content")
                        .sizing(Sizing::fixed(100.0), Sizing::fixed(300.0))
                        .empty();
                });
            engine.end_layout().unwrap()
        };
        declare(&mut engine);

        engine.set_pointer_state(Vector2::new(50.0, 50.0), false);
        engine.update_scroll_containers(false, Vector2::new(0.0, -5.0), 0.016);
        declare(&mut engine);

        let content = engine.element_data(&"Content".into());
        assert_eq!(content, Some(BoundingBox::new(0.0, -50.0, 100.0, 300.0)));
        let data = engine.scroll_container_data(&"Scroll".into()).unwrap();
        assert_eq!(data.content_dimensions, Dimensions::new(100.0, 300.0));
        assert_eq!(data.scroll_position, Vector2::new(0.0, -50.0));
    }

    #[test]
    fn test_offscreen_elements_are_culled() {
        let mut engine = engine();
        let mut ui = engine.begin_layout();
        ui.element().direction(LayoutDirection::TopToBottom).children(|ui| {
            ui.element()
                .id("Tall")
                .sizing(Sizing::fixed(100.0), Sizing::fixed(700.0))
                .rectangle(RectangleConfig::new(RED, 0.0))
                .empty();
            ui.element()
                .id("Below")
                .sizing(Sizing::fixed(100.0), Sizing::fixed(50.0))
                .rectangle(RectangleConfig::new(RED, 0.0))
                .empty();
        });
        let commands = engine.end_layout().unwrap();
        assert_eq!(commands.len(), 1);
        assert_eq!(commands.as_slice()[0].id, ElementId::new("Tall").id);
        assert!(engine.element_data(&"Below".into()).is_some());
    }

    #[test]
    fn test_duplicate_ids_are_reported() {
        let (mut engine, errors) = recording_engine(Capacity::default());
        let mut ui = engine.begin_layout();
        ui.element().id("Same").empty();
        ui.element().id("Same").empty();
        engine.end_layout().unwrap();
        assert_eq!(*errors.borrow(), vec![LayoutErrorKind::DuplicateId]);
    }

    #[test]
    fn test_capacity_exceeded_reported_once() {
        let capacity = Capacity { max_element_count: 3, ..Default::default() };
        let (mut engine, errors) = recording_engine(capacity);
        let mut ui = engine.begin_layout();
        for i in 0..5 {
            ui.element().id(ElementId::indexed("Item", i)).empty();
        }
        engine.end_layout().unwrap();
        assert_eq!(*errors.borrow(), vec![LayoutErrorKind::ElementsCapacityExceeded]);
        assert!(engine.element_data(&ElementId::indexed("Item", 1)).is_some());
        assert!(engine.element_data(&ElementId::indexed("Item", 2)).is_none());
    }

    #[test]
    fn test_text_without_measure_function() {
        let errors = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&errors);
        let mut engine = LayoutEngine::new(
            Capacity::default(),
            Dimensions::new(100.0, 100.0),
            Some(Box::new(move |error: &LayoutError| sink.borrow_mut().push(error.kind))),
        );
        let mut ui = engine.begin_layout();
        ui.text("a", TextConfig::default());
        ui.text("b", TextConfig::default());
        let commands = engine.end_layout().unwrap();
        assert!(commands.is_empty());
        assert_eq!(*errors.borrow(), vec![LayoutErrorKind::TextMeasurementFunctionNotProvided]);
    }

    #[test]
    fn test_between_children_separators() {
        let mut engine = engine();
        let mut ui = engine.begin_layout();
        ui.element()
            .sizing(Sizing::fixed(100.0), Sizing::fixed(20.0))
            .child_gap(10.0)
            .border(BorderConfig {
                color: RED,
                width: BorderWidth { between_children: 2.0, ..Default::default() },
                ..Default::default()
            })
            .children(|ui| {
                ui.element().sizing(Sizing::fixed(20.0), Sizing::fixed(20.0)).empty();
                ui.element().sizing(Sizing::fixed(20.0), Sizing::fixed(20.0)).empty();
            });
        let commands = engine.end_layout().unwrap();
        assert_eq!(kinds(&commands), vec!["border", "rectangle"]);
        assert_eq!(commands.as_slice()[1].bounding_box, BoundingBox::new(24.0, 0.0, 2.0, 20.0));
    }

    #[test]
    fn test_min_memory_size_scales_with_capacity() {
        let small = Capacity { max_element_count: 10, max_measure_text_word_cache: 10 };
        let large = Capacity { max_element_count: 100, max_measure_text_word_cache: 10 };
        assert!(large.min_memory_size() > small.min_memory_size());
    }
}
