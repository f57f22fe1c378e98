//! ML inference runtime using Candle.
//!
//! Provides model loading and the classifier network for:
//! - eye detection (eye / no eye)
//! - ocular condition classification (five classes)

mod device;
mod loader;
mod models;
mod network;
mod utils;

pub use device::{select_device, DevicePreference};
pub use loader::{load_safetensors, read_tensors, LazyModel};
pub use models::{EyeModels, ModelPaths, CONDITION_MODEL, DETECTION_MODEL};
pub use network::{
    ConvClassifier, CONDITION_CLASSES, CONV_CHANNELS, DETECTION_CLASSES, KERNEL_SIZE,
};
pub use utils::{argmax, check_distribution, top_two};
