use std::sync::Arc;

use gpui::{Hsla, ShapedLine, TextRun, WindowTextSystem, font, px};

use crate::render::TextMeasurer;

const FONT_FAMILY: &str = ".SystemUIFont";

pub(crate) fn shape(
    text_system: &WindowTextSystem,
    text: &str,
    size: f32,
    color: Hsla,
) -> ShapedLine {
    let run = TextRun {
        len: text.len(),
        font: font(FONT_FAMILY),
        color,
        background_color: None,
        underline: None,
        strikethrough: None,
    };
    text_system.shape_line(text.to_string().into(), px(size), &[run], None)
}

/// Measures label widths with the window's text system.
pub(crate) struct GpuiTextMeasurer {
    text_system: Arc<WindowTextSystem>,
}

impl GpuiTextMeasurer {
    pub(crate) fn new(text_system: Arc<WindowTextSystem>) -> Self {
        Self { text_system }
    }
}

impl TextMeasurer for GpuiTextMeasurer {
    fn measure(&self, text: &str, size: f32) -> (f32, f32) {
        if text.is_empty() {
            return (0.0, 0.0);
        }
        let shaped = shape(&self.text_system, text, size, gpui::black());
        let width = f32::from(shaped.width);
        let height = f32::from(shaped.ascent + shaped.descent);
        (width, height.max(size * 1.2))
    }
}
