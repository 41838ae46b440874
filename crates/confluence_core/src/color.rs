//! Vertex colours for stream rendering.

/// Converts HSL (hue in degrees, saturation and lightness in [0, 1]) to RGB.
pub fn hsl_to_rgb(hue: f64, saturation: f64, lightness: f64) -> [f32; 3] {
    let h = hue.rem_euclid(360.0) / 60.0;
    let s = saturation.clamp(0.0, 1.0);
    let l = lightness.clamp(0.0, 1.0);

    let chroma = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let x = chroma * (1.0 - (h % 2.0 - 1.0).abs());
    let (r, g, b) = match h as u32 {
        0 => (chroma, x, 0.0),
        1 => (x, chroma, 0.0),
        2 => (0.0, chroma, x),
        3 => (0.0, x, chroma),
        4 => (x, 0.0, chroma),
        _ => (chroma, 0.0, x),
    };
    let m = l - chroma / 2.0;
    [(r + m) as f32, (g + m) as f32, (b + m) as f32]
}

/// Colour of a stream vertex; brighter where the sample is more intense.
pub fn vertex_color(hue: f64, intensity: f64) -> [f32; 3] {
    hsl_to_rgb(hue, 0.8, 0.35 + 0.35 * intensity.clamp(0.0, 1.0))
}
