//! Annotation panel layout.
//!
//! Each detection gets a panel holding a one-line category label and an
//! optional wrapped content block. The panel starts below the detection,
//! centred on it, and is then nudged back inside the viewport.
//!
//! Text measurement is injected through [`TextMeasure`] so the layout can run
//! against a real font stack or against the fixed-advance [`GlyphMeasure`].

use crate::geometry::{PointF, RectF, ViewportGeometry};

/// Width of the content block relative to the detection width.
const DETECTION_WIDTH_FACTOR: f32 = 2.5;
/// Minimum content width as a share of the viewport width.
const MIN_VIEWPORT_SHARE: f32 = 0.5;
/// Maximum content width as a share of the viewport width.
const MAX_VIEWPORT_SHARE: f32 = 0.9;
/// Average glyph advance as a share of the text size.
const GLYPH_ADVANCE_RATIO: f32 = 0.55;
/// Single line height (ascent + descent) as a share of the text size.
const LINE_HEIGHT_RATIO: f32 = 1.2;

/// Visual constants shared by layout and rendering.
#[derive(Clone, Debug, PartialEq)]
pub struct LayoutStyle {
    pub padding: f32,
    pub corner_radius: f32,
    pub highlight_stroke: f32,
    pub category_text_size: f32,
    pub content_text_size: f32,
    pub line_spacing_mult: f32,
    pub line_spacing_add: f32,
}

impl Default for LayoutStyle {
    fn default() -> Self {
        Self {
            padding: 32.0,
            corner_radius: 16.0,
            highlight_stroke: 8.0,
            category_text_size: 38.0,
            content_text_size: 48.0,
            line_spacing_mult: 1.1,
            line_spacing_add: 4.0,
        }
    }
}

impl LayoutStyle {
    /// Gap kept between a panel and the viewport edges or its detection.
    pub fn edge_margin(&self) -> f32 {
        self.padding / 2.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextRole {
    Category,
    Content,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TextLine {
    pub text: String,
    pub width: f32,
}

/// Measured, pre-wrapped text.
#[derive(Clone, Debug, PartialEq)]
pub struct TextBlock {
    pub lines: Vec<TextLine>,
    pub line_height: f32,
    pub width: f32,
    pub height: f32,
}

impl TextBlock {
    fn from_lines(lines: Vec<TextLine>, line_height: f32) -> Self {
        let width = lines.iter().map(|l| l.width).fold(0.0, f32::max);
        let height = lines.len() as f32 * line_height;
        Self {
            lines,
            line_height,
            width,
            height,
        }
    }
}

/// Text measurement capability.
///
/// `max_width` of `f32::INFINITY` disables wrapping. Empty text still measures
/// as one (empty) line.
pub trait TextMeasure {
    fn measure(&self, role: TextRole, text: &str, max_width: f32) -> TextBlock;
}

/// Fixed-advance measurer with greedy word wrap.
#[derive(Clone, Debug)]
pub struct GlyphMeasure {
    category_size: f32,
    content_size: f32,
    content_line_height: f32,
}

impl GlyphMeasure {
    pub fn new(style: &LayoutStyle) -> Self {
        Self {
            category_size: style.category_text_size,
            content_size: style.content_text_size,
            content_line_height: style.content_text_size
                * LINE_HEIGHT_RATIO
                * style.line_spacing_mult
                + style.line_spacing_add,
        }
    }
}

impl Default for GlyphMeasure {
    fn default() -> Self {
        Self::new(&LayoutStyle::default())
    }
}

impl TextMeasure for GlyphMeasure {
    fn measure(&self, role: TextRole, text: &str, max_width: f32) -> TextBlock {
        let (size, line_height) = match role {
            TextRole::Category => (self.category_size, self.category_size * LINE_HEIGHT_RATIO),
            TextRole::Content => (self.content_size, self.content_line_height),
        };
        let advance = size * GLYPH_ADVANCE_RATIO;
        let max_chars = if max_width.is_finite() {
            ((max_width / advance).floor() as usize).max(1)
        } else {
            usize::MAX
        };
        let lines = wrap_text(text, max_chars)
            .into_iter()
            .map(|text| TextLine {
                width: text.chars().count() as f32 * advance,
                text,
            })
            .collect();
        TextBlock::from_lines(lines, line_height)
    }
}

fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let mut current = String::new();
        let mut current_len = 0usize;
        for word in paragraph.split_whitespace() {
            let word_len = word.chars().count();
            let needed = if current_len == 0 {
                word_len
            } else {
                current_len + 1 + word_len
            };
            if needed <= max_chars {
                if current_len > 0 {
                    current.push(' ');
                }
                current.push_str(word);
                current_len = needed;
                continue;
            }
            if current_len > 0 {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
            }
            if word_len <= max_chars {
                current.push_str(word);
                current_len = word_len;
                continue;
            }
            // Hard-break words that cannot fit on a line of their own.
            let chars: Vec<char> = word.chars().collect();
            let mut chunks = chars.chunks(max_chars).peekable();
            while let Some(chunk) = chunks.next() {
                if chunks.peek().is_some() {
                    lines.push(chunk.iter().collect());
                } else {
                    current = chunk.iter().collect();
                    current_len = chunk.len();
                }
            }
        }
        lines.push(current);
    }
    lines
}

/// Wrapped content and where its first line starts.
#[derive(Clone, Debug, PartialEq)]
pub struct ContentLayout {
    pub origin: PointF,
    pub block: TextBlock,
}

#[derive(Clone, Debug, PartialEq)]
pub struct AnnotationLayout {
    pub panel: RectF,
    /// Top-left of the category line.
    pub category_origin: PointF,
    pub category: TextBlock,
    pub content: Option<ContentLayout>,
}

/// Computes the annotation panel for one detection.
///
/// Boundary correction runs in a fixed order: right edge, left edge, bottom
/// edge (flip above the detection), top edge. The flip decision sees the
/// horizontally corrected panel.
pub fn layout_annotation(
    detection: &RectF,
    category: &str,
    content: &str,
    viewport: &ViewportGeometry,
    measure: &dyn TextMeasure,
    style: &LayoutStyle,
) -> AnnotationLayout {
    let padding = style.padding;
    let margin = style.edge_margin();

    let category_block = measure.measure(TextRole::Category, category, f32::INFINITY);
    let target_width = category_block
        .width
        .max(detection.width() * DETECTION_WIDTH_FACTOR)
        .max(viewport.width * MIN_VIEWPORT_SHARE)
        .min(viewport.width * MAX_VIEWPORT_SHARE);

    let content_block =
        (!content.is_empty()).then(|| measure.measure(TextRole::Content, content, target_width));

    let stack_height = category_block.height
        + content_block
            .as_ref()
            .map_or(0.0, |block| padding / 2.0 + block.height);
    let panel_width = target_width + padding * 2.0;
    let panel_height = stack_height + padding * 2.0;

    let mut panel = RectF::from_origin_size(
        detection.center_x() - panel_width / 2.0,
        detection.bottom + margin,
        panel_width,
        panel_height,
    );

    let margin_x = axis_margin(margin, viewport.width, panel_width);
    let margin_y = axis_margin(margin, viewport.height, panel_height);

    // A corrected edge lands exactly on its bound.
    if panel.right > viewport.width - margin_x {
        panel.right = viewport.width - margin_x;
        panel.left = panel.right - panel_width;
    }
    if panel.left < margin_x {
        panel.left = margin_x;
        panel.right = margin_x + panel_width;
    }
    if panel.bottom > viewport.height - margin_y {
        panel.bottom = detection.top - margin;
        panel.top = panel.bottom - panel_height;
    }
    if panel.top < margin_y {
        panel.top = margin_y;
        panel.bottom = margin_y + panel_height;
    }

    let category_origin = PointF::new(panel.left + padding, panel.top + padding);
    let content = content_block.map(|block| ContentLayout {
        origin: PointF::new(
            category_origin.x,
            category_origin.y + category_block.height + padding / 2.0,
        ),
        block,
    });

    AnnotationLayout {
        panel,
        category_origin,
        category: category_block,
        content,
    }
}

/// Edge margin along one axis. A panel that fits the viewport but not
/// between both margins is centred on that axis instead.
fn axis_margin(margin: f32, extent: f32, size: f32) -> f32 {
    if size <= extent && size > extent - 2.0 * margin {
        (extent - size) / 2.0
    } else {
        margin
    }
}
