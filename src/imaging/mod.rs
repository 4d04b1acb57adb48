//! Image decoding, framing, quality checks and tensor preparation.

mod crop;
mod decode;
pub mod quality;
mod tensor;

pub use crop::{CropRegion, apply_crop, crop_region, normalize};
pub use decode::{DecodedImage, content_hash, decode_image_file};
pub use quality::{QualityReport, QualityRule, RuleCheck, assess};
pub use tensor::ModelInput;
