//! Frame rasterization
//!
//! Poses are drawn in canvas pixels with y pointing down, the same space the
//! bone coordinates are authored in. Each bone is a thick segment from its
//! origin to its tip with a filled disc at the joint.

use glam::DVec2;
use image::{Rgba, RgbaImage};
use log::debug;
use pose_scene::{AbsolutePose, FrameIndex, Scene};

use crate::error::{RenderError, Result};

/// Colours and sizes used when drawing a frame
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOptions {
    pub width: u32,
    pub height: u32,
    pub background: Rgba<u8>,
    pub bone_color: Rgba<u8>,
    /// Segment thickness in pixels
    pub stroke_width: f64,
    /// Radius of the joint disc in pixels
    pub joint_radius: f64,
    pub onion: OnionSkin,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            width: 500,
            height: 500,
            background: Rgba([255, 255, 255, 255]),
            bone_color: Rgba([0, 0, 0, 255]),
            stroke_width: 4.0,
            joint_radius: 4.0,
            onion: OnionSkin::default(),
        }
    }
}

/// Ghosted neighbour frames drawn beneath the current one
#[derive(Debug, Clone, PartialEq)]
pub struct OnionSkin {
    pub previous: bool,
    pub next: bool,
    pub color: Rgba<u8>,
    /// Opacity of the ghost in `0.0..=1.0`
    pub alpha: f32,
    pub stroke_width: f64,
}

impl Default for OnionSkin {
    fn default() -> Self {
        Self {
            previous: false,
            next: false,
            color: Rgba([128, 128, 128, 255]),
            alpha: 0.3,
            stroke_width: 2.0,
        }
    }
}

impl OnionSkin {
    pub fn is_enabled(&self) -> bool {
        self.previous || self.next
    }
}

/// Draw one pose onto a fresh canvas
pub fn draw_pose(pose: &AbsolutePose, options: &RenderOptions) -> Result<RgbaImage> {
    let mut canvas = blank_canvas(options)?;
    paint_pose(
        &mut canvas,
        pose,
        options.bone_color,
        1.0,
        options.stroke_width,
        options.joint_radius,
    );
    Ok(canvas)
}

/// Evaluate and draw a frame of a scene, with onion skinning if enabled
///
/// Neighbour frames are only ghosted when they exist in the frame table.
pub fn render_frame(
    scene: &Scene,
    frame: FrameIndex,
    options: &RenderOptions,
) -> Result<RgbaImage> {
    let mut canvas = blank_canvas(options)?;
    let onion = &options.onion;

    let mut ghosts = Vec::with_capacity(2);
    if onion.previous {
        ghosts.extend(scene.previous_frame(frame));
    }
    if onion.next && frame < scene.max_frame() {
        ghosts.push(frame + 1);
    }
    for ghost in ghosts {
        if scene.skeleton().frame(ghost).is_none() {
            continue;
        }
        let pose = scene.compute_absolute_positions(ghost)?;
        paint_pose(
            &mut canvas,
            &pose,
            onion.color,
            onion.alpha.clamp(0.0, 1.0),
            onion.stroke_width,
            0.0,
        );
    }

    let pose = scene.compute_absolute_positions(frame)?;
    paint_pose(
        &mut canvas,
        &pose,
        options.bone_color,
        1.0,
        options.stroke_width,
        options.joint_radius,
    );
    debug!("Rendered frame {} ({} bones)", frame, pose.len());
    Ok(canvas)
}

fn blank_canvas(options: &RenderOptions) -> Result<RgbaImage> {
    if options.width == 0 || options.height == 0 {
        return Err(RenderError::InvalidCanvas {
            width: options.width,
            height: options.height,
        });
    }
    Ok(RgbaImage::from_pixel(
        options.width,
        options.height,
        options.background,
    ))
}

fn paint_pose(
    canvas: &mut RgbaImage,
    pose: &AbsolutePose,
    color: Rgba<u8>,
    alpha: f32,
    stroke_width: f64,
    joint_radius: f64,
) {
    for (_, bone) in pose.iter() {
        let origin = bone.origin();
        let tip = bone.tip();
        if !(origin.is_finite() && tip.is_finite()) {
            continue;
        }
        let segment = Segment { start: origin, end: tip };
        fill_within(canvas, &segment, stroke_width / 2.0, color, alpha);
        let joint = Segment {
            start: origin,
            end: origin,
        };
        fill_within(canvas, &joint, joint_radius, color, alpha);
    }
}

/// Line segment in canvas space; a zero-length segment is a point
struct Segment {
    start: DVec2,
    end: DVec2,
}

impl Segment {
    fn distance_squared(&self, point: DVec2) -> f64 {
        let direction = self.end - self.start;
        let length_sq = direction.length_squared();
        if length_sq == 0.0 {
            return point.distance_squared(self.start);
        }
        let t = ((point - self.start).dot(direction) / length_sq).clamp(0.0, 1.0);
        point.distance_squared(self.start + direction * t)
    }
}

/// Paint every pixel lying within `radius` of the segment
fn fill_within(
    canvas: &mut RgbaImage,
    segment: &Segment,
    radius: f64,
    color: Rgba<u8>,
    alpha: f32,
) {
    if radius <= 0.0 {
        return;
    }
    let (width, height) = canvas.dimensions();
    let min = segment.start.min(segment.end) - DVec2::splat(radius);
    let max = segment.start.max(segment.end) + DVec2::splat(radius);
    if max.x < 0.0 || max.y < 0.0 || min.x >= width as f64 || min.y >= height as f64 {
        return;
    }

    let x_range = min.x.floor().max(0.0) as u32..=(max.x.ceil() as u32).min(width - 1);
    let y_range = min.y.floor().max(0.0) as u32..=(max.y.ceil() as u32).min(height - 1);
    let radius_sq = radius * radius;

    for py in y_range {
        for px in x_range.clone() {
            let point = DVec2::new(px as f64, py as f64);
            if segment.distance_squared(point) <= radius_sq {
                blend(canvas.get_pixel_mut(px, py), color, alpha);
            }
        }
    }
}

fn blend(pixel: &mut Rgba<u8>, color: Rgba<u8>, alpha: f32) {
    if alpha >= 1.0 {
        *pixel = color;
        return;
    }
    for channel in 0..3 {
        let dst = pixel.0[channel] as f32;
        let src = color.0[channel] as f32;
        pixel.0[channel] = (src * alpha + dst * (1.0 - alpha)).round() as u8;
    }
}
