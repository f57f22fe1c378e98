//! Device selection for inference.

use candle_core::Device;
use serde::Deserialize;
use tracing::info;

/// Which device the models should run on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DevicePreference {
    /// Use a GPU if the crate was built with one enabled, else the CPU.
    #[default]
    Auto,
    /// Always run on the CPU.
    Cpu,
}

/// Returns the device to run inference on.
///
/// With [`DevicePreference::Auto`], uses Metal on macOS or CUDA when the
/// matching crate feature is enabled and a device is present, falling back
/// to the CPU.
#[must_use]
pub fn select_device(preference: DevicePreference) -> Device {
    if preference == DevicePreference::Cpu {
        info!("Using CPU for inference (requested)");
        return Device::Cpu;
    }

    #[cfg(feature = "metal")]
    {
        if let Ok(device) = Device::new_metal(0) {
            info!("Using Metal device for inference");
            return device;
        }
    }

    #[cfg(feature = "cuda")]
    {
        if let Ok(device) = Device::new_cuda(0) {
            info!("Using CUDA device for inference");
            return device;
        }
    }

    info!("Using CPU for inference");
    Device::Cpu
}
