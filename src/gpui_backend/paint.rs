use gpui::{
    App, BorderStyle, Bounds, ContentMask, Corners, Edges, PathBuilder, Pixels, Point, Window,
    point, px, quad,
};

use crate::geom::{ScreenPoint, ScreenRect};
use crate::render::{Color, LineSegment, RenderCommand, RenderList, Stroke};

use super::config::GpuiViewConfig;
use super::text::shape;

/// Replay recorded commands; `origin` is the top-left of the canvas.
pub(crate) fn paint_commands(
    commands: &RenderList,
    origin: Point<Pixels>,
    config: &GpuiViewConfig,
    window: &mut Window,
    cx: &mut App,
) {
    let offset = Offset(origin);
    let mut clip_stack: Vec<ContentMask<Pixels>> = Vec::new();
    for command in commands.commands() {
        match command {
            RenderCommand::ClipRect(rect) => {
                clip_stack.push(ContentMask {
                    bounds: offset.bounds(*rect),
                });
            }
            RenderCommand::ClipEnd => {
                clip_stack.pop();
            }
            // The view has no backing store to clear; the next fill covers it.
            RenderCommand::Clear(_) => {}
            RenderCommand::LineSegments { segments, stroke } => {
                with_clip(window, &clip_stack, |window| {
                    paint_lines(window, &offset, segments, *stroke, config);
                });
            }
            RenderCommand::Polygon { points, color } => {
                with_clip(window, &clip_stack, |window| {
                    paint_polygon(window, &offset, points, *color);
                });
            }
            RenderCommand::FillRect { rect, color } => {
                with_clip(window, &clip_stack, |window| {
                    paint_rect(window, &offset, *rect, *color);
                });
            }
            RenderCommand::Text {
                position,
                text,
                color,
                size,
            } => {
                with_clip(window, &clip_stack, |window| {
                    paint_text(window, cx, &offset, *position, text, *color, *size);
                });
            }
        }
    }
}

struct Offset(Point<Pixels>);

impl Offset {
    fn point(&self, pt: ScreenPoint) -> Point<Pixels> {
        point(self.0.x + px(pt.x), self.0.y + px(pt.y))
    }

    fn bounds(&self, rect: ScreenRect) -> Bounds<Pixels> {
        Bounds::from_corners(self.point(rect.min), self.point(rect.max))
    }
}

fn paint_lines(
    window: &mut Window,
    offset: &Offset,
    segments: &[LineSegment],
    stroke: Stroke,
    config: &GpuiViewConfig,
) {
    if segments.is_empty() {
        return;
    }
    let width = stroke.width.max(config.min_line_width_px);
    let mut builder = PathBuilder::stroke(px(width));
    for segment in segments {
        builder.move_to(offset.point(segment.start));
        builder.line_to(offset.point(segment.end));
    }
    if let Ok(path) = builder.build() {
        window.paint_path(path, to_rgba(stroke.color));
    }
}

fn paint_polygon(window: &mut Window, offset: &Offset, points: &[ScreenPoint], color: Color) {
    let Some((first, rest)) = points.split_first() else {
        return;
    };
    if rest.len() < 2 {
        return;
    }
    let mut builder = PathBuilder::fill();
    builder.move_to(offset.point(*first));
    for pt in rest {
        builder.line_to(offset.point(*pt));
    }
    builder.close();
    if let Ok(path) = builder.build() {
        window.paint_path(path, to_rgba(color));
    }
}

fn paint_rect(window: &mut Window, offset: &Offset, rect: ScreenRect, color: Color) {
    window.paint_quad(quad(
        offset.bounds(rect),
        Corners::all(px(0.0)),
        to_rgba(color),
        Edges::all(px(0.0)),
        to_rgba(color),
        BorderStyle::default(),
    ));
}

fn paint_text(
    window: &mut Window,
    cx: &mut App,
    offset: &Offset,
    position: ScreenPoint,
    text: &str,
    color: Color,
    size: f32,
) {
    if text.is_empty() {
        return;
    }
    let shaped = shape(window.text_system(), text, size, to_hsla(color));
    let line_height = shaped.ascent + shaped.descent;
    let _ = shaped.paint(offset.point(position), line_height, window, cx);
}

fn to_rgba(color: Color) -> gpui::Rgba {
    gpui::Rgba {
        r: color.r,
        g: color.g,
        b: color.b,
        a: color.a,
    }
}

fn to_hsla(color: Color) -> gpui::Hsla {
    gpui::Hsla::from(to_rgba(color))
}

fn with_clip(window: &mut Window, stack: &[ContentMask<Pixels>], f: impl FnOnce(&mut Window)) {
    if let Some(mask) = stack.last() {
        window.with_content_mask(Some(mask.clone()), f);
    } else {
        f(window);
    }
}
