//! Convolutional image classifier shared by both screening models.
//!
//! The detection and condition models use the same backbone and differ only
//! in the width of the classification head.

use anyhow::{Context, Result};
use candle_core::{Device, Module, Tensor};
use candle_nn::ops::softmax_last_dim;
use candle_nn::{conv2d, linear, Conv2d, Conv2dConfig, Linear, VarBuilder};

use crate::domain::{NormalizedTensor, TENSOR_CHANNELS, TENSOR_HEIGHT, TENSOR_WIDTH};

/// Output channels of the three convolution blocks.
pub const CONV_CHANNELS: [usize; 3] = [16, 32, 64];
/// Square kernel size of every convolution.
pub const KERNEL_SIZE: usize = 3;
/// Classes of the eye detection head.
pub const DETECTION_CLASSES: usize = 2;
/// Classes of the condition head.
pub const CONDITION_CLASSES: usize = 5;

/// Pixel values arrive in `0..=255`; the network works on `0..=1`.
const INPUT_SCALE: f64 = 1.0 / 255.0;

/// Three conv blocks, global average pooling and a linear softmax head.
///
/// Input: `(1, 280, 320, 3)` NHWC tensor of raw RGB values.
/// Output: `(1, num_classes)` probabilities.
pub struct ConvClassifier {
    conv1: Conv2d,
    conv2: Conv2d,
    conv3: Conv2d,
    head: Linear,
    num_classes: usize,
    device: Device,
}

impl ConvClassifier {
    /// Builds the network from weights.
    ///
    /// # Errors
    ///
    /// Returns an error if a tensor is missing or has the wrong shape.
    #[allow(clippy::needless_pass_by_value)]
    pub fn new(vb: VarBuilder, num_classes: usize) -> Result<Self> {
        let device = vb.device().clone();
        let config = Conv2dConfig {
            padding: KERNEL_SIZE / 2,
            ..Conv2dConfig::default()
        };

        let conv1 = conv2d(TENSOR_CHANNELS, CONV_CHANNELS[0], KERNEL_SIZE, config, vb.pp("conv1"))?;
        let conv2 = conv2d(CONV_CHANNELS[0], CONV_CHANNELS[1], KERNEL_SIZE, config, vb.pp("conv2"))?;
        let conv3 = conv2d(CONV_CHANNELS[1], CONV_CHANNELS[2], KERNEL_SIZE, config, vb.pp("conv3"))?;
        let head = linear(CONV_CHANNELS[2], num_classes, vb.pp("head"))?;

        Ok(Self {
            conv1,
            conv2,
            conv3,
            head,
            num_classes,
            device,
        })
    }

    /// Builds the two-class eye detection network.
    ///
    /// # Errors
    ///
    /// See [`Self::new`].
    pub fn detection(vb: VarBuilder) -> Result<Self> {
        Self::new(vb, DETECTION_CLASSES)
    }

    /// Builds the five-class condition network.
    ///
    /// # Errors
    ///
    /// See [`Self::new`].
    pub fn condition(vb: VarBuilder) -> Result<Self> {
        Self::new(vb, CONDITION_CLASSES)
    }

    /// Number of output classes.
    #[must_use]
    pub const fn num_classes(&self) -> usize {
        self.num_classes
    }

    /// Runs a forward pass and returns the class probabilities.
    ///
    /// # Errors
    ///
    /// Returns an error if the forward pass fails.
    pub fn classify(&self, input: &NormalizedTensor) -> Result<Vec<f32>> {
        let x = Tensor::from_slice(
            input.as_slice(),
            (1, TENSOR_HEIGHT, TENSOR_WIDTH, TENSOR_CHANNELS),
            &self.device,
        )
        .context("Failed to create input tensor")?;

        let probs = self.forward(&x)?;
        probs
            .squeeze(0)?
            .to_vec1::<f32>()
            .context("Failed to read probabilities")
    }

    /// Tensor names and shapes a weights file must provide.
    #[must_use]
    pub fn weight_shapes(num_classes: usize) -> Vec<(String, Vec<usize>)> {
        let mut shapes = Vec::new();
        let mut in_channels = TENSOR_CHANNELS;
        for (i, out_channels) in CONV_CHANNELS.into_iter().enumerate() {
            let prefix = format!("conv{}", i + 1);
            shapes.push((
                format!("{prefix}.weight"),
                vec![out_channels, in_channels, KERNEL_SIZE, KERNEL_SIZE],
            ));
            shapes.push((format!("{prefix}.bias"), vec![out_channels]));
            in_channels = out_channels;
        }
        shapes.push(("head.weight".into(), vec![num_classes, in_channels]));
        shapes.push(("head.bias".into(), vec![num_classes]));
        shapes
    }
}

impl Module for ConvClassifier {
    fn forward(&self, x: &Tensor) -> candle_core::Result<Tensor> {
        // NHWC -> NCHW
        let x = x.permute((0, 3, 1, 2))?.contiguous()?;
        let x = x.affine(INPUT_SCALE, 0.0)?;

        // 280x320 -> 140x160 -> 70x80 -> 35x40
        let x = self.conv1.forward(&x)?.relu()?.max_pool2d(2)?;
        let x = self.conv2.forward(&x)?.relu()?.max_pool2d(2)?;
        let x = self.conv3.forward(&x)?.relu()?.max_pool2d(2)?;

        // Global average pool: (1, C, H, W) -> (1, C)
        let x = x.mean(3)?.mean(2)?;

        let logits = self.head.forward(&x)?;
        softmax_last_dim(&logits)
    }
}
