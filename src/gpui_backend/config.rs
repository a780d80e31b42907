/// Configuration for the GPUI viewport view.
#[derive(Debug, Clone)]
pub struct GpuiViewConfig {
    /// Pixels per wheel notch for line-based scroll deltas.
    pub wheel_line_height_px: f32,
    /// Largest wheel delta, in notches, forwarded per scroll event.
    pub max_wheel_notches: f64,
    /// Font size for labels and overlay text.
    pub font_size: f32,
    /// Thinnest stroke painted, in pixels.
    pub min_line_width_px: f32,
}

impl Default for GpuiViewConfig {
    fn default() -> Self {
        Self {
            wheel_line_height_px: 16.0,
            max_wheel_notches: 10.0,
            font_size: 12.0,
            min_line_width_px: 0.5,
        }
    }
}
