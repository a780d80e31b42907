use std::f64::consts::PI;

use kurbo::Affine;

use crate::geom::{ScreenPoint, ScreenRect, Vec2};

use super::{
    Color, LineSegment, RenderCommand, RenderList, Stroke, Surface, TextMeasurer, clip_segment,
};

const DEFAULT_FONT_SIZE: f32 = 12.0;
const ARC_SEGMENT_ANGLE: f64 = PI / 16.0;
/// Baseline-to-top distance as a fraction of the font size.
const ASCENT_RATIO: f32 = 0.8;

#[derive(Debug, Clone)]
struct DrawState {
    transform: Affine,
    fill: Color,
    stroke: Color,
    line_width: f64,
    clip: Option<ScreenRect>,
    clip_depth: usize,
}

impl Default for DrawState {
    fn default() -> Self {
        Self {
            transform: Affine::IDENTITY,
            fill: Color::BLACK,
            stroke: Color::BLACK,
            line_width: 1.0,
            clip: None,
            clip_depth: 0,
        }
    }
}

/// A [`Surface`] that records device-space [`RenderCommand`]s.
///
/// Paths are flattened at call time with the transform that is current when
/// each point is added, the same way a canvas context behaves. Clip regions
/// are tracked as the device-space bounding rectangle of the clipping path.
pub struct RecordingSurface {
    size: Vec2,
    font_size: f32,
    measurer: Option<Box<dyn TextMeasurer>>,
    state: DrawState,
    stack: Vec<DrawState>,
    subpaths: Vec<Vec<ScreenPoint>>,
    commands: RenderList,
}

impl RecordingSurface {
    /// Create a surface of the given pixel size without text measurement.
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            size: Vec2::new(width, height),
            font_size: DEFAULT_FONT_SIZE,
            measurer: None,
            state: DrawState::default(),
            stack: Vec::new(),
            subpaths: Vec::new(),
            commands: RenderList::new(),
        }
    }

    /// Attach a text measurer.
    pub fn with_measurer(mut self, measurer: Box<dyn TextMeasurer>) -> Self {
        self.measurer = Some(measurer);
        self
    }

    /// Replace the text measurer.
    pub fn set_measurer(&mut self, measurer: Option<Box<dyn TextMeasurer>>) {
        self.measurer = measurer;
    }

    /// Resize the backing surface.
    pub fn set_size(&mut self, width: f64, height: f64) {
        self.size = Vec2::new(width, height);
    }

    /// Font size used for text, in pixels at unit scale.
    pub fn font_size(&self) -> f32 {
        self.font_size
    }

    /// Set the font size used for text.
    pub fn set_font_size(&mut self, size: f32) {
        self.font_size = size;
    }

    /// Commands recorded since the last [`Surface::begin_frame`].
    pub fn commands(&self) -> &[RenderCommand] {
        self.commands.commands()
    }

    /// Take the recorded commands, leaving an empty list behind.
    pub fn take_commands(&mut self) -> RenderList {
        std::mem::take(&mut self.commands)
    }

    /// Depth of the saved-state stack.
    pub fn save_depth(&self) -> usize {
        self.stack.len()
    }

    /// Current user-to-device transform.
    pub fn current_transform(&self) -> Affine {
        self.state.transform
    }

    /// Map a user-space point through the current transform.
    pub fn to_device(&self, point: Vec2) -> Vec2 {
        Vec2::from(self.state.transform * kurbo::Point::from(point))
    }

    fn device_point(&self, point: Vec2) -> ScreenPoint {
        let p = self.to_device(point);
        ScreenPoint::new(p.x as f32, p.y as f32)
    }

    /// Average device-pixel length of one user unit along x and y.
    fn device_scale(&self) -> Vec2 {
        let [a, b, c, d, _, _] = self.state.transform.as_coeffs();
        Vec2::new(a.hypot(b), c.hypot(d))
    }

    fn device_rect(&self, origin: Vec2, size: Vec2) -> ScreenRect {
        ScreenRect::from_corners(self.device_point(origin), self.device_point(origin + size))
    }

    fn rect_outline(&self, origin: Vec2, size: Vec2) -> Vec<ScreenPoint> {
        let corners = [
            origin,
            Vec2::new(origin.x + size.x, origin.y),
            origin + size,
            Vec2::new(origin.x, origin.y + size.y),
            origin,
        ];
        corners.iter().map(|c| self.device_point(*c)).collect()
    }

    fn current_subpath(&mut self) -> &mut Vec<ScreenPoint> {
        if self.subpaths.is_empty() {
            self.subpaths.push(Vec::new());
        }
        let last = self.subpaths.len() - 1;
        &mut self.subpaths[last]
    }

    fn push_stroke<'a>(&mut self, polylines: impl IntoIterator<Item = &'a [ScreenPoint]>) {
        let clip = self.state.clip;
        let mut segments = Vec::new();
        for polyline in polylines {
            for pair in polyline.windows(2) {
                let (start, end) = (pair[0], pair[1]);
                match clip {
                    Some(rect) => {
                        if let Some((start, end)) = clip_segment(start, end, rect) {
                            segments.push(LineSegment::new(start, end));
                        }
                    }
                    None => segments.push(LineSegment::new(start, end)),
                }
            }
        }
        if segments.is_empty() {
            return;
        }
        let width = (self.state.line_width * self.device_scale().mean()) as f32;
        self.commands.push(RenderCommand::LineSegments {
            segments,
            stroke: Stroke {
                color: self.state.stroke,
                width,
            },
        });
    }
}

impl Surface for RecordingSurface {
    fn size(&self) -> Vec2 {
        self.size
    }

    /// Drop all recorded commands and reset the drawing state.
    fn begin_frame(&mut self) {
        self.state = DrawState::default();
        self.stack.clear();
        self.subpaths.clear();
        self.commands = RenderList::new();
    }

    fn save(&mut self) {
        self.stack.push(self.state.clone());
    }

    fn restore(&mut self) {
        let Some(previous) = self.stack.pop() else {
            return;
        };
        for _ in previous.clip_depth..self.state.clip_depth {
            self.commands.push(RenderCommand::ClipEnd);
        }
        self.state = previous;
    }

    fn translate(&mut self, offset: Vec2) {
        self.state.transform = self.state.transform * Affine::translate((offset.x, offset.y));
    }

    fn scale(&mut self, factor: Vec2) {
        self.state.transform = self.state.transform * Affine::scale_non_uniform(factor.x, factor.y);
    }

    fn reset_transform(&mut self) {
        self.state.transform = Affine::IDENTITY;
    }

    fn begin_path(&mut self) {
        self.subpaths.clear();
    }

    fn move_to(&mut self, point: Vec2) {
        let p = self.device_point(point);
        self.subpaths.push(vec![p]);
    }

    fn line_to(&mut self, point: Vec2) {
        let p = self.device_point(point);
        self.current_subpath().push(p);
    }

    fn arc(&mut self, center: Vec2, radius: f64, start_angle: f64, end_angle: f64) {
        let sweep = end_angle - start_angle;
        let steps = ((sweep.abs() / ARC_SEGMENT_ANGLE).ceil() as usize).max(1);
        let points: Vec<ScreenPoint> = (0..=steps)
            .map(|i| {
                let angle = start_angle + sweep * i as f64 / steps as f64;
                self.device_point(center + Vec2::new(angle.cos(), angle.sin()) * radius)
            })
            .collect();
        self.current_subpath().extend(points);
    }

    fn rect(&mut self, origin: Vec2, size: Vec2) {
        let outline = self.rect_outline(origin, size);
        self.subpaths.push(outline);
    }

    fn close_path(&mut self) {
        let Some(last) = self.subpaths.last_mut() else {
            return;
        };
        if let Some(first) = last.first().copied() {
            if last.len() > 1 && last.last() != Some(&first) {
                last.push(first);
            }
            self.subpaths.push(vec![first]);
        }
    }

    fn clip(&mut self) {
        let mut points = self.subpaths.iter().flatten();
        let Some(first) = points.next() else {
            return;
        };
        let bounds = points.fold(ScreenRect::new(*first, *first), |rect, p| {
            ScreenRect::from_corners(
                ScreenPoint::new(rect.min.x.min(p.x), rect.min.y.min(p.y)),
                ScreenPoint::new(rect.max.x.max(p.x), rect.max.y.max(p.y)),
            )
        });
        let clip = match self.state.clip {
            Some(outer) => outer.intersect(&bounds),
            None => bounds,
        };
        self.state.clip = Some(clip);
        self.state.clip_depth += 1;
        self.commands.push(RenderCommand::ClipRect(clip));
    }

    fn fill(&mut self) {
        let color = self.state.fill;
        let polygons: Vec<Vec<ScreenPoint>> = self
            .subpaths
            .iter()
            .filter(|subpath| subpath.len() >= 3)
            .cloned()
            .collect();
        for points in polygons {
            self.commands.push(RenderCommand::Polygon { points, color });
        }
    }

    fn stroke(&mut self) {
        let subpaths = std::mem::take(&mut self.subpaths);
        self.push_stroke(subpaths.iter().map(Vec::as_slice));
        self.subpaths = subpaths;
    }

    fn fill_rect(&mut self, origin: Vec2, size: Vec2) {
        let rect = self.device_rect(origin, size);
        self.commands.push(RenderCommand::FillRect {
            rect,
            color: self.state.fill,
        });
    }

    fn stroke_rect(&mut self, origin: Vec2, size: Vec2) {
        let outline = self.rect_outline(origin, size);
        self.push_stroke([outline.as_slice()]);
    }

    fn clear_rect(&mut self, origin: Vec2, size: Vec2) {
        let rect = self.device_rect(origin, size);
        self.commands.push(RenderCommand::Clear(rect));
    }

    fn set_fill_color(&mut self, color: Color) {
        self.state.fill = color;
    }

    fn set_stroke_color(&mut self, color: Color) {
        self.state.stroke = color;
    }

    fn set_line_width(&mut self, width: f64) {
        self.state.line_width = width;
    }

    fn measure_text(&self, text: &str) -> Option<f64> {
        let measurer = self.measurer.as_ref()?;
        Some(f64::from(measurer.measure(text, self.font_size).0))
    }

    fn fill_text(&mut self, text: &str, at: Vec2) -> bool {
        let baseline = self.device_point(at);
        let size = self.font_size * self.device_scale().y as f32;
        self.commands.push(RenderCommand::Text {
            position: ScreenPoint::new(baseline.x, baseline.y - size * ASCENT_RATIO),
            text: text.to_string(),
            color: self.state.fill,
            size,
        });
        true
    }
}

impl std::fmt::Debug for RecordingSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordingSurface")
            .field("size", &self.size)
            .field("font_size", &self.font_size)
            .field("has_measurer", &self.measurer.is_some())
            .field("save_depth", &self.stack.len())
            .field("commands", &self.commands.len())
            .finish()
    }
}
