//! Display-range inference and normalization for `imshow`.

use crate::data::{Image, ImageData};
use crate::error::{PlotError, PlotResult};

/// An image normalized for display: RGBA8, row-major, top row first.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageTrace {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<[u8; 4]>,
    pub extra: crate::core::Extra,
}

/// Range the samples are mapped from: explicit, else inferred from the
/// sample type (and, for floats, from the largest finite sample).
pub fn value_range(image: &Image) -> PlotResult<(f64, f64)> {
    if let Some(range) = image.value_range {
        return Ok(range);
    }
    match &image.data {
        ImageData::U8(_) => Ok((0.0, 255.0)),
        ImageData::U16(_) => Ok((0.0, 65535.0)),
        ImageData::F64(values) => {
            let max = values
                .iter()
                .copied()
                .filter(|v| v.is_finite())
                .fold(f64::NEG_INFINITY, f64::max);
            if max < 1.01 {
                Ok((0.0, 1.0))
            } else if max < 255.0 {
                Ok((0.0, 255.0))
            } else if max < 65535.0 {
                Ok((0.0, 65535.0))
            } else {
                Err(PlotError::unsupported(format!(
                    "cannot infer a display range for float samples up to {max}, pass an explicit value range"
                )))
            }
        }
    }
}

pub fn normalize(image: &Image) -> PlotResult<ImageTrace> {
    let Image {
        width,
        height,
        channels,
        ..
    } = *image;
    if !matches!(channels, 1 | 3 | 4) {
        return Err(PlotError::shape(format!(
            "images need 1, 3 or 4 channels, got {channels}"
        )));
    }
    if width == 0 || height == 0 {
        return Err(PlotError::shape("image has no pixels"));
    }
    let expected = width * height * channels;
    if image.data.len() != expected {
        return Err(PlotError::shape(format!(
            "{width}x{height}x{channels} image needs {expected} samples, got {}",
            image.data.len()
        )));
    }

    let (lo, hi) = value_range(image)?;
    if !(hi > lo) {
        return Err(PlotError::configuration(format!(
            "image value range ({lo}, {hi}) is empty"
        )));
    }
    let quantize = |v: f64| {
        let t = if v.is_finite() { (v - lo) / (hi - lo) } else { 0.0 };
        (t.clamp(0.0, 1.0) * 255.0).round() as u8
    };

    let pixels = (0..width * height)
        .map(|p| {
            let at = |c: usize| quantize(image.data.get(p * channels + c));
            match channels {
                1 => {
                    let g = at(0);
                    [g, g, g, 255]
                }
                3 => [at(0), at(1), at(2), 255],
                _ => [at(0), at(1), at(2), at(3)],
            }
        })
        .collect();

    Ok(ImageTrace {
        width,
        height,
        pixels,
        extra: image.extra.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn f64_image(values: Vec<f64>) -> Image {
        Image::gray(values.len(), 1, ImageData::F64(values))
    }

    #[test]
    fn infers_range_from_sample_type() {
        assert_eq!(value_range(&Image::gray(1, 1, ImageData::U8(vec![3]))).unwrap(), (0.0, 255.0));
        assert_eq!(value_range(&Image::gray(1, 1, ImageData::U16(vec![3]))).unwrap(), (0.0, 65535.0));
        assert_eq!(value_range(&f64_image(vec![0.2, 1.0])).unwrap(), (0.0, 1.0));
        assert_eq!(value_range(&f64_image(vec![0.2, 17.0])).unwrap(), (0.0, 255.0));
        assert_eq!(value_range(&f64_image(vec![300.0])).unwrap(), (0.0, 65535.0));
        let err = value_range(&f64_image(vec![1e6])).unwrap_err();
        assert!(matches!(err.current_context(), PlotError::UnsupportedOperation(_)));
    }

    #[test]
    fn explicit_range_wins() {
        let img = f64_image(vec![-1.0, 0.0, 1.0]).value_range(-1.0, 1.0);
        let trace = normalize(&img).unwrap();
        assert_eq!(trace.pixels[0], [0, 0, 0, 255]);
        assert_eq!(trace.pixels[1][0], 128);
        assert_eq!(trace.pixels[2], [255, 255, 255, 255]);
    }

    #[test]
    fn validates_shape() {
        let err = normalize(&Image::rgb(2, 2, ImageData::U8(vec![0; 11]))).unwrap_err();
        assert!(matches!(err.current_context(), PlotError::Shape(_)));
        let err = normalize(&Image::new(1, 1, 2, ImageData::U8(vec![0; 2]))).unwrap_err();
        assert!(matches!(err.current_context(), PlotError::Shape(_)));
    }

    #[test]
    fn rgba_keeps_alpha() {
        let img = Image::new(1, 1, 4, ImageData::U8(vec![10, 20, 30, 40]));
        assert_eq!(normalize(&img).unwrap().pixels, vec![[10, 20, 30, 40]]);
    }
}
