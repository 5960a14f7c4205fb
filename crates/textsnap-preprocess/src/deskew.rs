use image::{GrayImage, ImageBuffer, Luma, Pixel, Rgb};
use imageproc::edges::canny;
use imageproc::geometric_transformations::{Interpolation, rotate_about_center};
use imageproc::hough::{LineDetectionOptions, detect_lines};

use crate::filters::Buffer;
use crate::frame::Frame;

const CANNY_LOW: f32 = 50.0;
const CANNY_HIGH: f32 = 150.0;
/// Lines tilted further than this from horizontal are not text baselines.
const MAX_SKEW_DEGREES: u32 = 45;

/// Estimate the skew of the dominant near-horizontal lines, in degrees.
///
/// Positive values mean the content slopes down to the right. Resolution is
/// one degree; `None` when no line is found.
pub fn estimate_skew(gray: &GrayImage) -> Option<f32> {
    let (width, height) = gray.dimensions();
    if width < 3 || height < 3 {
        return None;
    }

    let edges = canny(gray, CANNY_LOW, CANNY_HIGH);
    let options = LineDetectionOptions {
        vote_threshold: (width / 4).max(10),
        suppression_radius: 8,
    };

    // Normal angle of a horizontal line is 90
    let mut votes = [0u32; 180];
    for line in detect_lines(&edges, options) {
        let angle = line.angle_in_degrees;
        if angle < 180 && angle.abs_diff(90) <= MAX_SKEW_DEGREES {
            votes[angle as usize] += 1;
        }
    }

    let mut best: Option<(u32, u32)> = None;
    for (angle, &count) in votes.iter().enumerate() {
        if count == 0 {
            continue;
        }
        let angle = angle as u32;
        best = match best {
            Some((best_angle, best_count))
                if best_count > count
                    || (best_count == count && best_angle.abs_diff(90) <= angle.abs_diff(90)) =>
            {
                Some((best_angle, best_count))
            }
            _ => Some((angle, count)),
        };
    }

    best.map(|(angle, _)| angle as f32 - 90.0)
}

/// Rotate by `-skew` degrees, growing the canvas so no content is cropped.
/// Uncovered area is filled white.
pub fn rotate_expanded(frame: Frame, skew: f32) -> Frame {
    let theta = -skew.to_radians();
    match frame {
        Frame::Gray(img) => {
            let white = Luma([255u8]);
            let canvas = expand_canvas(&img, theta, white);
            Frame::Gray(rotate_about_center(&canvas, theta, Interpolation::Bicubic, white))
        }
        Frame::Color(img) => {
            let white = Rgb([255u8, 255, 255]);
            let canvas = expand_canvas(&img, theta, white);
            Frame::Color(rotate_about_center(&canvas, theta, Interpolation::Bicubic, white))
        }
    }
}

fn expand_canvas<P>(image: &Buffer<P>, theta: f32, fill: P) -> Buffer<P>
where
    P: Pixel<Subpixel = u8>,
{
    let (width, height) = image.dimensions();
    let (sin, cos) = (theta.sin().abs(), theta.cos().abs());
    let new_width = (width as f32 * cos + height as f32 * sin).ceil() as u32;
    let new_height = (width as f32 * sin + height as f32 * cos).ceil() as u32;
    let new_width = new_width.max(width);
    let new_height = new_height.max(height);

    let mut canvas = ImageBuffer::from_pixel(new_width, new_height, fill);
    image::imageops::overlay(
        &mut canvas,
        image,
        ((new_width - width) / 2) as i64,
        ((new_height - height) / 2) as i64,
    );
    canvas
}
