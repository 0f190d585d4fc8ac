use enough::Stop;

use crate::error::InspectError;
use crate::limits::Limits;
use crate::report::{Inspection, PartialInspection};

/// Builder for one inspection.
///
/// ```
/// use bmpinspect::{InspectRequest, Limits, Unstoppable};
///
/// let data: &[u8] = &[0u8; 4];
/// let partial = InspectRequest::new(data)
///     .with_limits(Limits::default())
///     .decode_pixels(false)
///     .inspect_partial(Unstoppable);
/// assert!(partial.error.is_some());
/// ```
#[derive(Clone, Debug)]
pub struct InspectRequest<'a> {
    data: &'a [u8],
    limits: Limits,
    decode_pixels: bool,
}

impl<'a> InspectRequest<'a> {
    /// Inspect `data`, the complete contents of a BMP file.
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            limits: Limits::default(),
            decode_pixels: true,
        }
    }

    /// Replace the default [`Limits`].
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Whether to decode the pixel data into rows or RLE items (default
    /// `true`). Sizes and offsets are reported either way.
    pub fn decode_pixels(mut self, decode: bool) -> Self {
        self.decode_pixels = decode;
        self
    }

    /// Run the inspection, discarding the partial report on a fatal error.
    pub fn inspect(self, stop: impl Stop) -> Result<Inspection, InspectError> {
        self.inspect_partial(stop).into_result()
    }

    /// Run the inspection and keep everything found before a fatal error.
    pub fn inspect_partial(self, stop: impl Stop) -> PartialInspection {
        crate::bmp::inspect(self.data, &self.limits, self.decode_pixels, &stop)
    }
}
