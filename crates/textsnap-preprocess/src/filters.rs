//! Pixel kernels used by the pipeline.
//!
//! Gray frames go through `imageproc` morphology and bilateral filtering.
//! `imageproc` only offers those for single-channel images, so colour frames
//! use the rank and bilateral kernels defined here.

use image::{GrayImage, ImageBuffer, Luma, Pixel, RgbImage};
use imageproc::filter::separable_filter;
use imageproc::map::map_colors;
use imageproc::morphology::{
    Mask, grayscale_close, grayscale_dilate, grayscale_erode, grayscale_open,
};
use imageproc::region_labelling::{Connectivity, connected_components};
use textsnap_config::preprocess::AdaptiveMethod;

pub(crate) type Buffer<P> = ImageBuffer<P, Vec<u8>>;

/// Inverse-binary cutoff used before labelling specks.
pub const NOISE_CUTOFF: u8 = 127;
/// Components with fewer pixels than this are treated as noise.
pub const NOISE_MIN_AREA: u32 = 100;

/// Clamp to at least 1 and bump even sizes to the next odd value.
pub fn odd(size: u32) -> u32 {
    let size = size.max(1);
    if size % 2 == 0 { size + 1 } else { size }
}

pub fn box_kernel(size: u32) -> Vec<f32> {
    let size = size.max(1);
    vec![1.0 / size as f32; size as usize]
}

/// 1-D Gaussian weights with sigma derived from the size, small sizes use
/// the usual fixed binomial tables.
pub fn gaussian_kernel(size: u32) -> Vec<f32> {
    let size = odd(size);
    match size {
        1 => vec![1.0],
        3 => vec![0.25, 0.5, 0.25],
        5 => vec![0.0625, 0.25, 0.375, 0.25, 0.0625],
        7 => vec![
            0.03125, 0.109375, 0.21875, 0.28125, 0.21875, 0.109375, 0.03125,
        ],
        _ => {
            let sigma = 0.3 * ((size as f32 - 1.0) * 0.5 - 1.0) + 0.8;
            let center = (size / 2) as f32;
            let mut kernel: Vec<f32> = (0..size)
                .map(|i| {
                    let x = i as f32 - center;
                    (-(x * x) / (2.0 * sigma * sigma)).exp()
                })
                .collect();
            let sum: f32 = kernel.iter().sum();
            kernel.iter_mut().for_each(|v| *v /= sum);
            kernel
        }
    }
}

/// Largest mask side `imageproc` accepts.
const MAX_MASK_SIDE: u32 = 511;

fn positive_or_one(sigma: f32) -> f32 {
    if sigma <= 0.0 { 1.0 } else { sigma }
}

/// Neighbourhood radius for a bilateral diameter. A zero diameter is derived
/// from the spatial sigma.
fn bilateral_radius(diameter: u32, sigma_space: f32) -> u32 {
    if diameter > 0 {
        diameter / 2
    } else {
        (positive_or_one(sigma_space) * 1.5).round() as u32
    }
    .max(1)
}

pub fn bilateral_gray(
    image: &GrayImage,
    diameter: u32,
    sigma_color: f32,
    sigma_space: f32,
) -> GrayImage {
    if image.width() == 0 || image.height() == 0 {
        return image.clone();
    }
    let window = 2 * bilateral_radius(diameter, sigma_space) + 1;
    imageproc::filter::bilateral_filter(
        image,
        window,
        positive_or_one(sigma_color),
        positive_or_one(sigma_space),
    )
}

/// Edge-preserving smoothing for colour frames. Colour distance is the sum of
/// absolute channel differences so all channels share one weight per neighbour.
pub fn bilateral_color(
    image: &RgbImage,
    diameter: u32,
    sigma_color: f32,
    sigma_space: f32,
) -> RgbImage {
    bilateral_filter(image, diameter, sigma_color, sigma_space)
}

fn bilateral_filter<P>(
    image: &Buffer<P>,
    diameter: u32,
    sigma_color: f32,
    sigma_space: f32,
) -> Buffer<P>
where
    P: Pixel<Subpixel = u8>,
{
    let (width, height) = image.dimensions();
    let channels = P::CHANNEL_COUNT as usize;
    let sigma_color = positive_or_one(sigma_color);
    let sigma_space = positive_or_one(sigma_space);
    let radius = bilateral_radius(diameter, sigma_space) as i64;

    let color_coeff = -0.5 / (sigma_color * sigma_color);
    let space_coeff = -0.5 / (sigma_space * sigma_space);

    let color_weights: Vec<f32> = (0..=255 * channels)
        .map(|d| (d as f32 * d as f32 * color_coeff).exp())
        .collect();

    let mut offsets = Vec::new();
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            let dist2 = (dx * dx + dy * dy) as f32;
            if dist2 <= (radius * radius) as f32 {
                offsets.push((dx, dy, (dist2 * space_coeff).exp()));
            }
        }
    }

    let src = image.as_raw();
    let stride = width as usize * channels;
    let at = |x: i64, y: i64| {
        let x = x.clamp(0, width as i64 - 1) as usize;
        let y = y.clamp(0, height as i64 - 1) as usize;
        y * stride + x * channels
    };

    let mut out = src.clone();
    for y in 0..height as i64 {
        for x in 0..width as i64 {
            let center = at(x, y);
            let mut sums = [0f32; 4];
            let mut weight_sum = 0f32;

            for &(dx, dy, space_weight) in &offsets {
                let idx = at(x + dx, y + dy);
                let distance: usize = (0..channels)
                    .map(|c| src[idx + c].abs_diff(src[center + c]) as usize)
                    .sum();
                let weight = space_weight * color_weights[distance];
                for c in 0..channels {
                    sums[c] += weight * src[idx + c] as f32;
                }
                weight_sum += weight;
            }

            for c in 0..channels {
                out[center + c] = (sums[c] / weight_sum).round().clamp(0.0, 255.0) as u8;
            }
        }
    }

    ImageBuffer::from_raw(width, height, out).unwrap_or_else(|| image.clone())
}

/// Drop dark specks smaller than [`NOISE_MIN_AREA`]: inverse-binarise, label
/// 8-connected components, keep the big ones and invert back.
pub fn remove_noise(image: &GrayImage) -> GrayImage {
    let foreground = map_colors(image, |p: Luma<u8>| {
        Luma([if p[0] > NOISE_CUTOFF { 0 } else { 255 }])
    });
    let labels = connected_components(&foreground, Connectivity::Eight, Luma([0u8]));

    let max_label = labels.pixels().map(|p| p[0]).max().unwrap_or(0);
    let mut areas = vec![0u32; max_label as usize + 1];
    for p in labels.pixels() {
        areas[p[0] as usize] += 1;
    }

    let (width, height) = image.dimensions();
    GrayImage::from_fn(width, height, |x, y| {
        let label = labels.get_pixel(x, y)[0];
        if label != 0 && areas[label as usize] >= NOISE_MIN_AREA {
            Luma([0])
        } else {
            Luma([255])
        }
    })
}

pub fn global_threshold(image: &GrayImage, cutoff: u8) -> GrayImage {
    map_colors(image, |p: Luma<u8>| Luma([if p[0] > cutoff { 255 } else { 0 }]))
}

/// Binarise against the local (box or Gaussian weighted) mean minus `offset`.
pub fn adaptive_threshold(
    image: &GrayImage,
    method: AdaptiveMethod,
    block_size: u32,
    offset: i16,
) -> GrayImage {
    let kernel = match method {
        AdaptiveMethod::Mean => box_kernel(block_size),
        AdaptiveMethod::Gaussian => gaussian_kernel(block_size),
    };
    let local: GrayImage = separable_filter(image, &kernel, &kernel);

    let (width, height) = image.dimensions();
    GrayImage::from_fn(width, height, |x, y| {
        let value = image.get_pixel(x, y)[0] as i16;
        let cutoff = local.get_pixel(x, y)[0] as i16 - offset;
        Luma([if value > cutoff { 255 } else { 0 }])
    })
}

#[derive(Debug, Clone, Copy)]
enum Rank {
    Min,
    Max,
}

/// One separable pass of a rectangular min/max filter. The window for a
/// pixel spans `size / 2` before it; samples outside the image are ignored.
fn rank_pass<P>(image: &Buffer<P>, size: u32, horizontal: bool, rank: Rank) -> Buffer<P>
where
    P: Pixel<Subpixel = u8>,
{
    let size = size.max(1);
    if size == 1 {
        return image.clone();
    }

    let (width, height) = image.dimensions();
    let channels = P::CHANNEL_COUNT as usize;
    let before = (size / 2) as i64;
    let after = size as i64 - 1 - before;
    let src = image.as_raw();
    let mut out = src.clone();
    let index = |x: i64, y: i64| (y as usize * width as usize + x as usize) * channels;

    for y in 0..height as i64 {
        for x in 0..width as i64 {
            let (pos, limit) = if horizontal { (x, width) } else { (y, height) };
            let lo = (pos - before).max(0);
            let hi = (pos + after).min(limit as i64 - 1);
            let dst = index(x, y);

            for c in 0..channels {
                let mut acc = src[dst + c];
                for t in lo..=hi {
                    let idx = if horizontal { index(t, y) } else { index(x, t) };
                    let v = src[idx + c];
                    acc = match rank {
                        Rank::Min => acc.min(v),
                        Rank::Max => acc.max(v),
                    };
                }
                out[dst + c] = acc;
            }
        }
    }

    ImageBuffer::from_raw(width, height, out).unwrap_or_else(|| image.clone())
}

fn rank_filter<P>(image: &Buffer<P>, [width, height]: [u32; 2], rank: Rank) -> Buffer<P>
where
    P: Pixel<Subpixel = u8>,
{
    let pass = rank_pass(image, width, true, rank);
    rank_pass(&pass, height, false, rank)
}

/// Rectangular structuring element, anchored `size / 2` from its top left.
fn rect_mask([width, height]: [u32; 2]) -> Mask {
    let width = width.clamp(1, MAX_MASK_SIDE);
    let height = height.clamp(1, MAX_MASK_SIDE);
    let block = GrayImage::from_pixel(width, height, Luma([255]));
    Mask::from_image(&block, (width / 2) as u8, (height / 2) as u8)
}

fn is_empty(image: &GrayImage) -> bool {
    image.width() == 0 || image.height() == 0
}

pub fn erode_gray(image: &GrayImage, kernel: [u32; 2], iterations: u32) -> GrayImage {
    if is_empty(image) {
        return image.clone();
    }
    let mask = rect_mask(kernel);
    let mut out = image.clone();
    for _ in 0..iterations {
        out = grayscale_erode(&out, &mask);
    }
    out
}

pub fn dilate_gray(image: &GrayImage, kernel: [u32; 2], iterations: u32) -> GrayImage {
    if is_empty(image) {
        return image.clone();
    }
    let mask = rect_mask(kernel);
    let mut out = image.clone();
    for _ in 0..iterations {
        out = grayscale_dilate(&out, &mask);
    }
    out
}

pub fn open_gray(image: &GrayImage, kernel: [u32; 2]) -> GrayImage {
    if is_empty(image) {
        return image.clone();
    }
    grayscale_open(image, &rect_mask(kernel))
}

pub fn close_gray(image: &GrayImage, kernel: [u32; 2]) -> GrayImage {
    if is_empty(image) {
        return image.clone();
    }
    grayscale_close(image, &rect_mask(kernel))
}

pub fn erode_color(image: &RgbImage, kernel: [u32; 2], iterations: u32) -> RgbImage {
    let mut out = image.clone();
    for _ in 0..iterations {
        out = rank_filter(&out, kernel, Rank::Min);
    }
    out
}

pub fn dilate_color(image: &RgbImage, kernel: [u32; 2], iterations: u32) -> RgbImage {
    let mut out = image.clone();
    for _ in 0..iterations {
        out = rank_filter(&out, kernel, Rank::Max);
    }
    out
}

pub fn open_color(image: &RgbImage, kernel: [u32; 2]) -> RgbImage {
    dilate_color(&erode_color(image, kernel, 1), kernel, 1)
}

pub fn close_color(image: &RgbImage, kernel: [u32; 2]) -> RgbImage {
    erode_color(&dilate_color(image, kernel, 1), kernel, 1)
}

/// Per-sample saturating `a - b`.
pub fn difference<P>(a: &Buffer<P>, b: &Buffer<P>) -> Buffer<P>
where
    P: Pixel<Subpixel = u8>,
{
    let (width, height) = a.dimensions();
    let out: Vec<u8> = a
        .as_raw()
        .iter()
        .zip(b.as_raw())
        .map(|(x, y)| x.saturating_sub(*y))
        .collect();
    ImageBuffer::from_raw(width, height, out).unwrap_or_else(|| a.clone())
}
