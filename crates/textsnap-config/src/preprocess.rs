use serde::{Deserialize, Serialize};

/// Where the deskew stage runs. Only one placement is active per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeskewPosition {
    First,
    Last,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlurMethod {
    Average,
    Gaussian,
    Median,
    Bilateral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdMethod {
    Global,
    Adaptive,
    Otsu,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdaptiveMethod {
    Mean,
    Gaussian,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MorphologicalOperation {
    Erosion,
    Dilation,
    Opening,
    Closing,
    Gradient,
    TopHat,
    BlackHat,
}

/// Image conditioning settings.
///
/// Every mode keeps its own parameters so switching the selector does not
/// lose the values configured for the other modes.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct PreprocessConfig {
    /// Master toggle, nothing runs when false
    pub enable_preprocess: bool,
    pub scale_factor: f32,
    pub enable_grayscale: bool,
    pub remove_noise: bool,
    pub enable_deskew: bool,
    pub deskew_position: DeskewPosition,

    pub enable_blurring: bool,
    pub blurring: BlurMethod,
    /// (width, height)
    pub blur_average_kernel: [u32; 2],
    /// (width, height), coerced to odd
    pub blur_gaussian_kernel: [u32; 2],
    /// Aperture, coerced to odd
    pub blur_median_kernel: u32,
    /// (diameter, sigma color, sigma space)
    pub blur_bilateral_dcs: [u32; 3],

    pub enable_thresholding: bool,
    pub thresholding: ThresholdMethod,
    pub threshold_global: u8,
    /// Neighbourhood size for adaptive thresholding
    pub threshold_adaptive: u32,
    pub threshold_adaptive_method: AdaptiveMethod,

    pub enable_morphological_transformation: bool,
    pub morphological_transformation: MorphologicalOperation,
    /// (width, height, iterations)
    pub erosion_kernel_iteration: [u32; 3],
    /// (width, height, iterations)
    pub dilation_kernel_iteration: [u32; 3],
    pub opening_kernel: [u32; 2],
    pub closing_kernel: [u32; 2],
    pub gradient_kernel: [u32; 2],
    pub top_hat_kernel: [u32; 2],
    pub black_hat_kernel: [u32; 2],
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            enable_preprocess: false,
            scale_factor: 1.0,
            enable_grayscale: false,
            remove_noise: false,
            enable_deskew: false,
            deskew_position: DeskewPosition::Last,

            enable_blurring: false,
            blurring: BlurMethod::Average,
            blur_average_kernel: [3, 3],
            blur_gaussian_kernel: [3, 3],
            blur_median_kernel: 3,
            blur_bilateral_dcs: [1, 75, 75],

            enable_thresholding: false,
            thresholding: ThresholdMethod::Global,
            threshold_global: 64,
            threshold_adaptive: 31,
            threshold_adaptive_method: AdaptiveMethod::Gaussian,

            enable_morphological_transformation: false,
            morphological_transformation: MorphologicalOperation::Opening,
            erosion_kernel_iteration: [3, 3, 1],
            dilation_kernel_iteration: [3, 3, 1],
            opening_kernel: [5, 5],
            closing_kernel: [5, 5],
            gradient_kernel: [5, 5],
            top_hat_kernel: [13, 5],
            black_hat_kernel: [13, 5],
        }
    }
}
