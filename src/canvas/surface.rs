use eframe::egui::Color32;

use crate::canvas::canvas::{alpha_over, apply_opacity_scale};
use crate::utils::vector::{Rect, Vec2, distance_to_segment};

/// A straight piece of an outline in canvas space.
pub type Segment = (Vec2, Vec2);

/// Fixed-size RGBA raster that all drawing primitives write into.
///
/// Pixels are stored row-major as premultiplied `Color32`. Every primitive is
/// anti-aliased by measuring the distance from each pixel center to the ideal
/// shape, and clips silently at the surface edges.
#[derive(Clone, Debug, PartialEq)]
pub struct PixelSurface {
    width: usize,
    height: usize,
    pixels: Vec<Color32>,
}

impl PixelSurface {
    /// Allocate a surface filled with `fill`.
    pub fn new(width: usize, height: usize, fill: Color32) -> Self {
        Self {
            width,
            height,
            pixels: vec![fill; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixels(&self) -> &[Color32] {
        &self.pixels
    }

    pub(crate) fn pixels_mut(&mut self) -> &mut [Color32] {
        &mut self.pixels
    }

    /// Read a pixel, or `None` outside the surface.
    pub fn pixel(&self, x: usize, y: usize) -> Option<Color32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.pixels[y * self.width + x])
    }

    /// Set every pixel to `color`.
    pub fn clear(&mut self, color: Color32) {
        self.pixels.fill(color);
    }

    /// Blend `color` over a single pixel at full coverage.
    pub fn put_pixel(&mut self, x: i32, y: i32, color: Color32) {
        if x < 0 || y < 0 {
            return;
        }
        let (x, y) = (x as usize, y as usize);
        if x >= self.width || y >= self.height {
            return;
        }
        let idx = y * self.width + x;
        self.pixels[idx] = alpha_over(color, self.pixels[idx]);
    }

    /// Line segment of the given stroke width.
    pub fn draw_line(&mut self, p1: Vec2, p2: Vec2, color: Color32, width: f32, round_caps: bool) {
        if round_caps {
            self.stroke_segments(&[(p1, p2)], color, width);
            return;
        }

        let half = width.max(0.0) / 2.0;
        let axis = p2 - p1;
        let len = axis.length();
        if len <= f32::EPSILON {
            return;
        }
        let dir = axis / len;
        self.shade_region(
            Vec2::new(p1.x.min(p2.x) - half, p1.y.min(p2.y) - half),
            Vec2::new(p1.x.max(p2.x) + half, p1.y.max(p2.y) + half),
            color,
            |c| {
                let rel = c - p1;
                let along = rel.dot(dir);
                let across = (rel.x * dir.y - rel.y * dir.x).abs();
                let outside_ends = (-along).max(along - len);
                coverage(across - half).min(coverage(outside_ends))
            },
        );
    }

    /// Filled ellipse centered on `center`.
    pub fn fill_ellipse(&mut self, center: Vec2, radius_x: f32, radius_y: f32, color: Color32) {
        let rx = radius_x.max(0.5);
        let ry = radius_y.max(0.5);
        let reach = Vec2::new(rx, ry);
        self.shade_region(center - reach, center + reach, color, |c| {
            coverage(ellipse_distance(c - center, rx, ry))
        });
    }

    /// Outline of the ellipse inscribed in `rect`.
    pub fn stroke_ellipse(&mut self, rect: Rect, color: Color32, width: f32) {
        let half = width.max(0.0) / 2.0;
        let center = rect.center();
        let rx = (rect.width() / 2.0).abs().max(0.5);
        let ry = (rect.height() / 2.0).abs().max(0.5);
        let reach = Vec2::new(rx + half, ry + half);
        self.shade_region(center - reach, center + reach, color, |c| {
            coverage(ellipse_distance(c - center, rx, ry).abs() - half)
        });
    }

    pub fn stroke_rect(&mut self, rect: Rect, color: Color32, width: f32) {
        self.stroke_polygon(&rect.corners(), color, width);
    }

    /// Closed outline through `points`.
    pub fn stroke_polygon(&mut self, points: &[Vec2], color: Color32, width: f32) {
        let segments = polyline_segments(points, true);
        self.stroke_segments(&segments, color, width);
    }

    /// Dashed outline through `points`, used for non-committed previews.
    pub fn stroke_dashed_polyline(
        &mut self,
        points: &[Vec2],
        closed: bool,
        color: Color32,
        width: f32,
        dash: f32,
        gap: f32,
    ) {
        let dashes = dash_segments(&polyline_segments(points, closed), dash, gap);
        self.stroke_segments(&dashes, color, width);
    }

    /// Stroke a set of segments with round joins and caps.
    ///
    /// Coverage uses the distance to the nearest segment, so pixels where
    /// segments meet are blended once.
    pub fn stroke_segments(&mut self, segments: &[Segment], color: Color32, width: f32) {
        let Some((min, max)) = segments_bounds(segments) else {
            return;
        };
        let half = width.max(0.0) / 2.0;
        let pad = Vec2::new(half, half);
        self.shade_region(min - pad, max + pad, color, |c| {
            let nearest = segments
                .iter()
                .map(|(a, b)| distance_to_segment(c, *a, *b))
                .fold(f32::INFINITY, f32::min);
            coverage(nearest - half)
        });
    }

    /// Visit every pixel whose center may lie inside `min..max` (padded by
    /// one pixel for the anti-aliased fringe) and blend `color` weighted by
    /// `cover(pixel_center)`.
    fn shade_region<F>(&mut self, min: Vec2, max: Vec2, color: Color32, cover: F)
    where
        F: Fn(Vec2) -> f32,
    {
        let Some((x0, y0, x1, y1)) = self.clip(min, max) else {
            return;
        };
        for y in y0..=y1 {
            let row = y * self.width;
            let cy = y as f32 + 0.5;
            for x in x0..=x1 {
                let amount = cover(Vec2::new(x as f32 + 0.5, cy));
                if amount <= 0.0 {
                    continue;
                }
                let scale = (amount * 255.0).round() as u32;
                let src = apply_opacity_scale(color, scale);
                let idx = row + x;
                self.pixels[idx] = alpha_over(src, self.pixels[idx]);
            }
        }
    }

    /// Clip a float bounding box (padded by one pixel) to pixel indices.
    fn clip(&self, min: Vec2, max: Vec2) -> Option<(usize, usize, usize, usize)> {
        if self.width == 0 || self.height == 0 {
            return None;
        }
        if !(min.x.is_finite() && min.y.is_finite() && max.x.is_finite() && max.y.is_finite()) {
            return None;
        }
        let x0 = (min.x.floor() as i64 - 1).max(0);
        let y0 = (min.y.floor() as i64 - 1).max(0);
        let x1 = (max.x.ceil() as i64 + 1).min(self.width as i64 - 1);
        let y1 = (max.y.ceil() as i64 + 1).min(self.height as i64 - 1);
        if x0 > x1 || y0 > y1 {
            return None;
        }
        Some((x0 as usize, y0 as usize, x1 as usize, y1 as usize))
    }
}

/// Fraction of a pixel covered given the signed distance of its center to
/// the shape edge (negative inside).
#[inline]
fn coverage(signed_distance: f32) -> f32 {
    (0.5 - signed_distance).clamp(0.0, 1.0)
}

/// Approximate signed distance from `p` (relative to the center) to an
/// axis-aligned ellipse. Exact for circles.
fn ellipse_distance(p: Vec2, rx: f32, ry: f32) -> f32 {
    if (rx - ry).abs() <= f32::EPSILON {
        return p.length() - rx;
    }
    let k0 = Vec2::new(p.x / rx, p.y / ry).length();
    let k1 = Vec2::new(p.x / (rx * rx), p.y / (ry * ry)).length();
    if k1 <= f32::EPSILON {
        return -rx.min(ry);
    }
    k0 * (k0 - 1.0) / k1
}

/// Consecutive point pairs, optionally closing back to the first point.
pub fn polyline_segments(points: &[Vec2], closed: bool) -> Vec<Segment> {
    let mut segments: Vec<Segment> = points.windows(2).map(|w| (w[0], w[1])).collect();
    if closed && points.len() > 2 {
        segments.push((points[points.len() - 1], points[0]));
    }
    segments
}

/// Split segments into "on" pieces of length `dash` separated by `gap`,
/// carrying the dash phase across segment boundaries.
pub fn dash_segments(segments: &[Segment], dash: f32, gap: f32) -> Vec<Segment> {
    if dash <= 0.0 {
        return Vec::new();
    }
    if gap <= 0.0 {
        return segments.to_vec();
    }

    let mut out = Vec::new();
    let mut drawing = true;
    let mut left_in_phase = dash;

    for &(a, b) in segments {
        let len = (b - a).length();
        if len <= f32::EPSILON {
            continue;
        }
        let dir = (b - a) / len;
        let mut travelled = 0.0;
        while travelled < len {
            let step = left_in_phase.min(len - travelled);
            if drawing {
                out.push((a + dir * travelled, a + dir * (travelled + step)));
            }
            travelled += step;
            left_in_phase -= step;
            if left_in_phase <= f32::EPSILON {
                drawing = !drawing;
                left_in_phase = if drawing { dash } else { gap };
            }
        }
    }
    out
}

fn segments_bounds(segments: &[Segment]) -> Option<(Vec2, Vec2)> {
    let first = segments.first()?;
    let mut min = first.0;
    let mut max = first.0;
    for (a, b) in segments {
        for p in [a, b] {
            min = Vec2::new(min.x.min(p.x), min.y.min(p.y));
            max = Vec2::new(max.x.max(p.x), max.y.max(p.y));
        }
    }
    Some((min, max))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn white(w: usize, h: usize) -> PixelSurface {
        PixelSurface::new(w, h, Color32::WHITE)
    }

    fn painted(surface: &PixelSurface) -> usize {
        surface.pixels().iter().filter(|p| **p != Color32::WHITE).count()
    }

    #[test]
    fn clear_fills_every_pixel() {
        let mut s = white(8, 4);
        s.clear(Color32::BLACK);
        assert!(s.pixels().iter().all(|p| *p == Color32::BLACK));
    }

    #[test]
    fn line_is_solid_on_its_axis_and_absent_far_away() {
        let mut s = white(64, 32);
        s.draw_line(Vec2::new(10.0, 10.0), Vec2::new(50.0, 10.0), Color32::BLACK, 3.0, true);
        assert_eq!(s.pixel(30, 10), Some(Color32::BLACK));
        assert_eq!(s.pixel(30, 9), Some(Color32::BLACK));
        assert_eq!(s.pixel(30, 20), Some(Color32::WHITE));
        assert_eq!(s.pixel(60, 10), Some(Color32::WHITE));
    }

    #[test]
    fn round_caps_extend_past_endpoint_butt_caps_do_not() {
        let mut round = white(40, 20);
        round.draw_line(Vec2::new(10.0, 10.0), Vec2::new(20.0, 10.0), Color32::BLACK, 6.0, true);
        let mut butt = white(40, 20);
        butt.draw_line(Vec2::new(10.0, 10.0), Vec2::new(20.0, 10.0), Color32::BLACK, 6.0, false);
        // pixel 21 has its center 1.5px past the end
        assert_eq!(round.pixel(21, 10), Some(Color32::BLACK));
        assert_eq!(butt.pixel(21, 10), Some(Color32::WHITE));
    }

    #[test]
    fn degenerate_round_line_paints_a_dot() {
        let mut s = white(20, 20);
        let p = Vec2::new(10.0, 10.0);
        s.draw_line(p, p, Color32::BLACK, 4.0, true);
        assert_eq!(s.pixel(10, 10), Some(Color32::BLACK));
        assert_eq!(s.pixel(0, 0), Some(Color32::WHITE));
    }

    #[test]
    fn primitives_clip_at_edges() {
        let mut s = white(16, 16);
        s.draw_line(Vec2::new(-50.0, -50.0), Vec2::new(100.0, 100.0), Color32::BLACK, 2.0, true);
        s.fill_ellipse(Vec2::new(-100.0, 8.0), 4.0, 4.0, Color32::BLACK);
        s.stroke_rect(
            Rect::from_center_size(Vec2::new(15.0, 15.0), 40.0, 40.0),
            Color32::BLACK,
            1.0,
        );
        s.put_pixel(-1, 3, Color32::BLACK);
        s.put_pixel(3, 99, Color32::BLACK);
        assert_eq!(s.pixel(0, 0), Some(Color32::BLACK));
        assert_eq!(s.pixels().len(), 256);
    }

    #[test]
    fn filled_circle_covers_its_disc() {
        let mut s = white(40, 40);
        s.fill_ellipse(Vec2::new(20.0, 20.0), 5.0, 5.0, Color32::BLACK);
        assert_eq!(s.pixel(20, 20), Some(Color32::BLACK));
        assert_eq!(s.pixel(22, 22), Some(Color32::BLACK));
        assert_eq!(s.pixel(30, 20), Some(Color32::WHITE));
        let dark = painted(&s);
        // area of r=5 disc is ~78.5, plus a fringe
        assert!((70..=110).contains(&dark), "painted {dark}");
    }

    #[test]
    fn stroked_ellipse_leaves_center_untouched() {
        let mut s = white(60, 40);
        let rect = Rect::from_center_size(Vec2::new(30.0, 20.0), 40.0, 20.0);
        s.stroke_ellipse(rect, Color32::BLACK, 2.0);
        assert_eq!(s.pixel(30, 20), Some(Color32::WHITE));
        assert_eq!(s.pixel(30, 10), Some(Color32::BLACK));
        assert_eq!(s.pixel(49, 19), Some(Color32::BLACK));
    }

    #[test]
    fn stroked_polygon_closes_the_loop() {
        let mut s = white(40, 40);
        let tri = [Vec2::new(20.0, 5.0), Vec2::new(5.0, 35.0), Vec2::new(35.0, 35.0)];
        s.stroke_polygon(&tri, Color32::BLACK, 2.0);
        assert_eq!(s.pixel(20, 35), Some(Color32::BLACK));
        // closing edge (35,35) -> (20,5)
        assert_eq!(s.pixel(27, 20), Some(Color32::BLACK));
        assert_eq!(s.pixel(20, 25), Some(Color32::WHITE));
    }

    #[test]
    fn dashes_alternate_and_keep_phase() {
        let segs = [(Vec2::new(0.0, 0.0), Vec2::new(10.0, 0.0))];
        let dashes = dash_segments(&segs, 3.0, 2.0);
        assert_eq!(dashes.len(), 2);
        assert_eq!(dashes[0], (Vec2::new(0.0, 0.0), Vec2::new(3.0, 0.0)));
        assert_eq!(dashes[1], (Vec2::new(5.0, 0.0), Vec2::new(8.0, 0.0)));
    }

    #[test]
    fn dashed_outline_has_gaps() {
        let mut solid = white(50, 50);
        let mut dashed = white(50, 50);
        let square = Rect::from_center_size(Vec2::new(25.0, 25.0), 30.0, 30.0).corners();
        solid.stroke_polygon(&square, Color32::BLACK, 1.0);
        dashed.stroke_dashed_polyline(&square, true, Color32::BLACK, 1.0, 4.0, 4.0);
        assert!(painted(&dashed) > 0);
        assert!(painted(&dashed) < painted(&solid));
    }
}
