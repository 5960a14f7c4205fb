use image::imageops::FilterType;
use image::{GrayImage, RgbImage};
use imageproc::contrast::otsu_level;
use imageproc::filter::{median_filter, separable_filter};
use textsnap_config::preprocess::{
    AdaptiveMethod, BlurMethod, DeskewPosition, MorphologicalOperation, PreprocessConfig,
    ThresholdMethod,
};

use crate::deskew::{estimate_skew, rotate_expanded};
use crate::error::PreprocessError;
use crate::filters::{self, box_kernel, gaussian_kernel, odd};
use crate::frame::{Frame, each_frame};

/// Constant subtracted from the local mean by adaptive thresholding.
pub const ADAPTIVE_OFFSET: i16 = 2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Blur {
    Average { kernel: [u32; 2] },
    Gaussian { kernel: [u32; 2] },
    Median { aperture: u32 },
    Bilateral { diameter: u32, sigma_color: f32, sigma_space: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Threshold {
    Global { cutoff: u8 },
    Adaptive { method: AdaptiveMethod, block_size: u32, offset: i16 },
    Otsu,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Morphology {
    Erosion { kernel: [u32; 2], iterations: u32 },
    Dilation { kernel: [u32; 2], iterations: u32 },
    Opening { kernel: [u32; 2] },
    Closing { kernel: [u32; 2] },
    Gradient { kernel: [u32; 2] },
    TopHat { kernel: [u32; 2] },
    BlackHat { kernel: [u32; 2] },
}

/// Stages that actually changed the frame during a run, in order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Stage {
    Deskew { angle: f32 },
    Grayscale,
    Scale { factor: f32 },
    Blur(Blur),
    RemoveNoise,
    Threshold { cutoff: Option<u8> },
    Morphology(Morphology),
}

/// Ordered preprocessing plan built from one configuration snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct Pipeline {
    pub deskew: Option<DeskewPosition>,
    pub grayscale: bool,
    pub scale: Option<f32>,
    pub blur: Option<Blur>,
    pub remove_noise: bool,
    pub threshold: Option<Threshold>,
    pub morphology: Option<Morphology>,
}

fn rect(kernel: [u32; 2]) -> [u32; 2] {
    [kernel[0].max(1), kernel[1].max(1)]
}

impl Blur {
    pub fn from_config(config: &PreprocessConfig) -> Self {
        match config.blurring {
            BlurMethod::Average => Blur::Average {
                kernel: rect(config.blur_average_kernel),
            },
            BlurMethod::Gaussian => Blur::Gaussian {
                kernel: [
                    odd(config.blur_gaussian_kernel[0]),
                    odd(config.blur_gaussian_kernel[1]),
                ],
            },
            BlurMethod::Median => Blur::Median {
                aperture: odd(config.blur_median_kernel),
            },
            BlurMethod::Bilateral => {
                let [diameter, sigma_color, sigma_space] = config.blur_bilateral_dcs;
                Blur::Bilateral {
                    diameter,
                    sigma_color: sigma_color as f32,
                    sigma_space: sigma_space as f32,
                }
            }
        }
    }
}

impl Threshold {
    pub fn from_config(config: &PreprocessConfig) -> Self {
        match config.thresholding {
            ThresholdMethod::Global => Threshold::Global {
                cutoff: config.threshold_global,
            },
            ThresholdMethod::Adaptive => Threshold::Adaptive {
                method: config.threshold_adaptive_method,
                block_size: odd(config.threshold_adaptive.max(3)),
                offset: ADAPTIVE_OFFSET,
            },
            ThresholdMethod::Otsu => Threshold::Otsu,
        }
    }
}

impl Morphology {
    pub fn from_config(config: &PreprocessConfig) -> Self {
        let with_iterations = |[w, h, n]: [u32; 3]| (rect([w, h]), n);
        match config.morphological_transformation {
            MorphologicalOperation::Erosion => {
                let (kernel, iterations) = with_iterations(config.erosion_kernel_iteration);
                Morphology::Erosion { kernel, iterations }
            }
            MorphologicalOperation::Dilation => {
                let (kernel, iterations) = with_iterations(config.dilation_kernel_iteration);
                Morphology::Dilation { kernel, iterations }
            }
            MorphologicalOperation::Opening => Morphology::Opening {
                kernel: rect(config.opening_kernel),
            },
            MorphologicalOperation::Closing => Morphology::Closing {
                kernel: rect(config.closing_kernel),
            },
            MorphologicalOperation::Gradient => Morphology::Gradient {
                kernel: rect(config.gradient_kernel),
            },
            MorphologicalOperation::TopHat => Morphology::TopHat {
                kernel: rect(config.top_hat_kernel),
            },
            MorphologicalOperation::BlackHat => Morphology::BlackHat {
                kernel: rect(config.black_hat_kernel),
            },
        }
    }
}

impl Pipeline {
    pub fn from_config(config: &PreprocessConfig) -> Self {
        Self {
            deskew: config.enable_deskew.then_some(config.deskew_position),
            // Noise removal and thresholding only work on single-channel input
            grayscale: config.enable_grayscale
                || config.remove_noise
                || config.enable_thresholding,
            scale: (config.scale_factor != 1.0).then_some(config.scale_factor),
            blur: config.enable_blurring.then(|| Blur::from_config(config)),
            remove_noise: config.remove_noise,
            threshold: config
                .enable_thresholding
                .then(|| Threshold::from_config(config)),
            morphology: config
                .enable_morphological_transformation
                .then(|| Morphology::from_config(config)),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.deskew.is_none()
            && !self.grayscale
            && self.scale.is_none()
            && self.blur.is_none()
            && !self.remove_noise
            && self.threshold.is_none()
            && self.morphology.is_none()
    }

    pub fn run(&self, frame: Frame) -> Result<Frame, PreprocessError> {
        self.run_with_report(frame).map(|(frame, _)| frame)
    }

    /// Run every enabled stage and report which ones changed the frame.
    pub fn run_with_report(&self, frame: Frame) -> Result<(Frame, Vec<Stage>), PreprocessError> {
        let (width, height) = frame.dimensions();
        if width == 0 || height == 0 {
            return Err(PreprocessError::EmptyImage);
        }

        let mut stages = Vec::new();
        let mut frame = frame;

        if self.deskew == Some(DeskewPosition::First) {
            tracing::info!("Deskewing image [First]");
            frame = deskew(frame, &mut stages);
        }

        if self.grayscale && !frame.is_gray() {
            tracing::info!("Converting image to grayscale");
            frame = Frame::Gray(frame.into_gray());
            stages.push(Stage::Grayscale);
        }

        if let Some(factor) = self.scale {
            frame = scale(frame, factor)?;
            stages.push(Stage::Scale { factor });
        }

        if let Some(blur) = self.blur {
            frame = apply_blur(frame, blur);
            stages.push(Stage::Blur(blur));
        }

        if self.remove_noise {
            tracing::info!("Removing noise using inverse binary thresholding and connected components");
            frame = Frame::Gray(filters::remove_noise(&frame.into_gray()));
            stages.push(Stage::RemoveNoise);
        }

        if let Some(threshold) = self.threshold {
            let (binary, cutoff) = apply_threshold(frame.into_gray(), threshold);
            frame = Frame::Gray(binary);
            stages.push(Stage::Threshold { cutoff });
        }

        if let Some(morphology) = self.morphology {
            frame = apply_morphology(frame, morphology);
            stages.push(Stage::Morphology(morphology));
        }

        if self.deskew == Some(DeskewPosition::Last) {
            tracing::info!("Deskewing image [Last]");
            frame = deskew(frame, &mut stages);
        }

        Ok((frame, stages))
    }
}

fn deskew(frame: Frame, stages: &mut Vec<Stage>) -> Frame {
    match estimate_skew(&frame.to_gray()) {
        Some(angle) if angle != 0.0 => {
            tracing::info!("Deskew rotated angle value: {angle}");
            stages.push(Stage::Deskew { angle });
            rotate_expanded(frame, angle)
        }
        _ => {
            tracing::info!("Skipping deskew because rotated angle value is 0.0");
            frame
        }
    }
}

fn scale(frame: Frame, factor: f32) -> Result<Frame, PreprocessError> {
    if !factor.is_finite() || factor <= 0.0 {
        return Err(PreprocessError::InvalidScale(factor));
    }

    let (width, height) = frame.dimensions();
    let new_width = ((width as f32 * factor).round() as u32).max(1);
    let new_height = ((height as f32 * factor).round() as u32).max(1);
    tracing::info!("Resizing image: {factor}x scale ({width}x{height} -> {new_width}x{new_height})");

    Ok(each_frame!(frame, img => image::imageops::resize(
        &img,
        new_width,
        new_height,
        FilterType::CatmullRom,
    )))
}

fn apply_blur(frame: Frame, blur: Blur) -> Frame {
    match blur {
        Blur::Average { kernel } => {
            tracing::info!("Applying average blur: {kernel:?}");
            let (h, v) = (box_kernel(kernel[0]), box_kernel(kernel[1]));
            each_frame!(frame, img => separable_filter(&img, &h, &v))
        }
        Blur::Gaussian { kernel } => {
            tracing::info!("Applying gaussian blur: {kernel:?}");
            let (h, v) = (gaussian_kernel(kernel[0]), gaussian_kernel(kernel[1]));
            each_frame!(frame, img => separable_filter(&img, &h, &v))
        }
        Blur::Median { aperture } => {
            tracing::info!("Applying median blur: {aperture}");
            let radius = aperture / 2;
            each_frame!(frame, img => median_filter(&img, radius, radius))
        }
        Blur::Bilateral {
            diameter,
            sigma_color,
            sigma_space,
        } => {
            tracing::info!("Applying bilateral blur: ({diameter}, {sigma_color}, {sigma_space})");
            match frame {
                Frame::Gray(img) => {
                    Frame::Gray(filters::bilateral_gray(&img, diameter, sigma_color, sigma_space))
                }
                Frame::Color(img) => {
                    Frame::Color(filters::bilateral_color(&img, diameter, sigma_color, sigma_space))
                }
            }
        }
    }
}

fn apply_threshold(image: GrayImage, threshold: Threshold) -> (GrayImage, Option<u8>) {
    match threshold {
        Threshold::Global { cutoff } => {
            tracing::info!("Applying global thresholding: {cutoff}");
            (filters::global_threshold(&image, cutoff), Some(cutoff))
        }
        Threshold::Adaptive {
            method,
            block_size,
            offset,
        } => {
            tracing::info!("Applying adaptive thresholding: {block_size} ({method:?})");
            (
                filters::adaptive_threshold(&image, method, block_size, offset),
                None,
            )
        }
        Threshold::Otsu => {
            let level = otsu_level(&image);
            tracing::info!("Otsu thresholding value: {level}");
            (filters::global_threshold(&image, level), Some(level))
        }
    }
}

fn apply_morphology(frame: Frame, morphology: Morphology) -> Frame {
    tracing::info!("Applying morphological transformation: {morphology:?}");
    match frame {
        Frame::Gray(img) => Frame::Gray(morph_gray(&img, morphology)),
        Frame::Color(img) => Frame::Color(morph_color(&img, morphology)),
    }
}

fn morph_gray(img: &GrayImage, morphology: Morphology) -> GrayImage {
    match morphology {
        Morphology::Erosion { kernel, iterations } => filters::erode_gray(img, kernel, iterations),
        Morphology::Dilation { kernel, iterations } => filters::dilate_gray(img, kernel, iterations),
        Morphology::Opening { kernel } => filters::open_gray(img, kernel),
        Morphology::Closing { kernel } => filters::close_gray(img, kernel),
        Morphology::Gradient { kernel } => filters::difference(
            &filters::dilate_gray(img, kernel, 1),
            &filters::erode_gray(img, kernel, 1),
        ),
        Morphology::TopHat { kernel } => filters::difference(img, &filters::open_gray(img, kernel)),
        Morphology::BlackHat { kernel } => {
            filters::difference(&filters::close_gray(img, kernel), img)
        }
    }
}

fn morph_color(img: &RgbImage, morphology: Morphology) -> RgbImage {
    match morphology {
        Morphology::Erosion { kernel, iterations } => filters::erode_color(img, kernel, iterations),
        Morphology::Dilation { kernel, iterations } => {
            filters::dilate_color(img, kernel, iterations)
        }
        Morphology::Opening { kernel } => filters::open_color(img, kernel),
        Morphology::Closing { kernel } => filters::close_color(img, kernel),
        Morphology::Gradient { kernel } => filters::difference(
            &filters::dilate_color(img, kernel, 1),
            &filters::erode_color(img, kernel, 1),
        ),
        Morphology::TopHat { kernel } => filters::difference(img, &filters::open_color(img, kernel)),
        Morphology::BlackHat { kernel } => {
            filters::difference(&filters::close_color(img, kernel), img)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Luma, Rgb};

    fn enabled() -> PreprocessConfig {
        PreprocessConfig {
            enable_preprocess: true,
            ..Default::default()
        }
    }

    fn color_frame() -> Frame {
        Frame::Color(RgbImage::from_fn(40, 30, |x, y| {
            Rgb([(x * 6) as u8, (y * 8) as u8, 128])
        }))
    }

    #[test]
    fn test_defaults_build_empty_pipeline() {
        assert!(Pipeline::from_config(&enabled()).is_empty());
    }

    #[test]
    fn test_scale_one_is_skipped_and_shrink_allowed() {
        let pipeline = Pipeline::from_config(&enabled());
        assert_eq!(pipeline.scale, None);

        let config = PreprocessConfig {
            scale_factor: 0.5,
            ..enabled()
        };
        let (frame, stages) = Pipeline::from_config(&config)
            .run_with_report(color_frame())
            .unwrap();
        assert_eq!(frame.dimensions(), (20, 15));
        assert_eq!(stages, vec![Stage::Scale { factor: 0.5 }]);
    }

    #[test]
    fn test_upscale_dimensions() {
        let config = PreprocessConfig {
            scale_factor: 2.0,
            ..enabled()
        };
        let frame = Pipeline::from_config(&config).run(color_frame()).unwrap();
        assert_eq!(frame.dimensions(), (80, 60));
        assert!(!frame.is_gray());
    }

    #[test]
    fn test_invalid_scale_is_an_error() {
        let config = PreprocessConfig {
            scale_factor: 0.0,
            ..enabled()
        };
        let result = Pipeline::from_config(&config).run(color_frame());
        assert!(matches!(result, Err(PreprocessError::InvalidScale(_))));
    }

    #[test]
    fn test_even_kernels_coerced_to_odd() {
        let config = PreprocessConfig {
            enable_blurring: true,
            blurring: BlurMethod::Gaussian,
            blur_gaussian_kernel: [4, 0],
            ..enabled()
        };
        assert_eq!(
            Pipeline::from_config(&config).blur,
            Some(Blur::Gaussian { kernel: [5, 1] })
        );

        let config = PreprocessConfig {
            enable_blurring: true,
            blurring: BlurMethod::Median,
            blur_median_kernel: 4,
            ..enabled()
        };
        assert_eq!(
            Pipeline::from_config(&config).blur,
            Some(Blur::Median { aperture: 5 })
        );

        // Average blur accepts even sizes as-is
        let config = PreprocessConfig {
            enable_blurring: true,
            blur_average_kernel: [4, 2],
            ..enabled()
        };
        assert_eq!(
            Pipeline::from_config(&config).blur,
            Some(Blur::Average { kernel: [4, 2] })
        );
    }

    #[test]
    fn test_thresholding_forces_grayscale() {
        let config = PreprocessConfig {
            enable_thresholding: true,
            thresholding: ThresholdMethod::Otsu,
            ..enabled()
        };
        let pipeline = Pipeline::from_config(&config);
        assert!(pipeline.grayscale);

        let (frame, stages) = pipeline.run_with_report(color_frame()).unwrap();
        let Frame::Gray(binary) = frame else {
            panic!("thresholding must produce a gray frame");
        };
        assert!(binary.pixels().all(|p| p[0] == 0 || p[0] == 255));
        assert_eq!(stages[0], Stage::Grayscale);
        assert!(matches!(stages[1], Stage::Threshold { cutoff: Some(_) }));
    }

    #[test]
    fn test_adaptive_block_size_is_odd_and_at_least_three() {
        let config = PreprocessConfig {
            enable_thresholding: true,
            thresholding: ThresholdMethod::Adaptive,
            threshold_adaptive: 1,
            ..enabled()
        };
        assert_eq!(
            Pipeline::from_config(&config).threshold,
            Some(Threshold::Adaptive {
                method: AdaptiveMethod::Gaussian,
                block_size: 3,
                offset: ADAPTIVE_OFFSET,
            })
        );
    }

    #[test]
    fn test_morphology_runs_on_color() {
        let config = PreprocessConfig {
            enable_morphological_transformation: true,
            morphological_transformation: MorphologicalOperation::Gradient,
            ..enabled()
        };
        let frame = Pipeline::from_config(&config).run(color_frame()).unwrap();
        assert!(!frame.is_gray());
        assert_eq!(frame.dimensions(), (40, 30));
    }

    #[test]
    fn test_top_hat_keeps_thin_strokes_on_gray() {
        let config = PreprocessConfig {
            enable_morphological_transformation: true,
            morphological_transformation: MorphologicalOperation::TopHat,
            top_hat_kernel: [5, 5],
            ..enabled()
        };
        let mut page = GrayImage::new(30, 30);
        for y in 0..30 {
            page.put_pixel(20, y, Luma([255]));
        }
        for y in 3..15 {
            for x in 3..15 {
                page.put_pixel(x, y, Luma([255]));
            }
        }

        let frame = Pipeline::from_config(&config)
            .run(Frame::Gray(page))
            .unwrap();
        let Frame::Gray(out) = frame else {
            panic!("morphology changed the frame kind");
        };
        assert_eq!(out.get_pixel(20, 10)[0], 255);
        assert_eq!(out.get_pixel(8, 8)[0], 0);
    }

    #[test]
    fn test_bilateral_defaults_run_on_gray() {
        let config = PreprocessConfig {
            enable_blurring: true,
            blurring: BlurMethod::Bilateral,
            ..enabled()
        };
        let pipeline = Pipeline::from_config(&config);
        assert_eq!(
            pipeline.blur,
            Some(Blur::Bilateral {
                diameter: 1,
                sigma_color: 75.0,
                sigma_space: 75.0,
            })
        );
        let flat = Frame::Gray(GrayImage::from_pixel(12, 9, Luma([140])));
        assert_eq!(pipeline.run(flat.clone()).unwrap(), flat);
    }

    #[test]
    fn test_deskew_skips_straight_image() {
        let config = PreprocessConfig {
            enable_deskew: true,
            deskew_position: DeskewPosition::First,
            ..enabled()
        };
        let blank = Frame::Gray(GrayImage::from_pixel(50, 50, Luma([255])));
        let (frame, stages) = Pipeline::from_config(&config)
            .run_with_report(blank.clone())
            .unwrap();
        assert_eq!(frame, blank);
        assert!(stages.is_empty());
    }

    #[test]
    fn test_every_blur_mode_keeps_dimensions() {
        for blurring in [
            BlurMethod::Average,
            BlurMethod::Gaussian,
            BlurMethod::Median,
            BlurMethod::Bilateral,
        ] {
            let config = PreprocessConfig {
                enable_blurring: true,
                blurring,
                ..enabled()
            };
            let frame = Pipeline::from_config(&config).run(color_frame()).unwrap();
            assert_eq!(frame.dimensions(), (40, 30), "{blurring:?}");
        }
    }
}
