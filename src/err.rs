/*
 * // Copyright (c) Radzivon Bartoshyk 8/2025. All rights reserved.
 * //
 * // Redistribution and use in source and binary forms, with or without modification,
 * // are permitted provided that the following conditions are met:
 * //
 * // 1.  Redistributions of source code must retain the above copyright notice, this
 * // list of conditions and the following disclaimer.
 * //
 * // 2.  Redistributions in binary form must reproduce the above copyright notice,
 * // this list of conditions and the following disclaimer in the documentation
 * // and/or other materials provided with the distribution.
 * //
 * // 3.  Neither the name of the copyright holder nor the names of its
 * // contributors may be used to endorse or promote products derived from
 * // this software without specific prior written permission.
 * //
 * // THIS SOFTWARE IS PROVIDED BY THE COPYRIGHT HOLDERS AND CONTRIBUTORS "AS IS"
 * // AND ANY EXPRESS OR IMPLIED WARRANTIES, INCLUDING, BUT NOT LIMITED TO, THE
 * // IMPLIED WARRANTIES OF MERCHANTABILITY AND FITNESS FOR A PARTICULAR PURPOSE ARE
 * // DISCLAIMED. IN NO EVENT SHALL THE COPYRIGHT HOLDER OR CONTRIBUTORS BE LIABLE
 * // FOR ANY DIRECT, INDIRECT, INCIDENTAL, SPECIAL, EXEMPLARY, OR CONSEQUENTIAL
 * // DAMAGES (INCLUDING, BUT NOT LIMITED TO, PROCUREMENT OF SUBSTITUTE GOODS OR
 * // SERVICES; LOSS OF USE, DATA, OR PROFITS; OR BUSINESS INTERRUPTION) HOWEVER
 * // CAUSED AND ON ANY THEORY OF LIABILITY, WHETHER IN CONTRACT, STRICT LIABILITY,
 * // OR TORT (INCLUDING NEGLIGENCE OR OTHERWISE) ARISING IN ANY WAY OUT OF THE USE
 * // OF THIS SOFTWARE, EVEN IF ADVISED OF THE POSSIBILITY OF SUCH DAMAGE.
 */
use std::error::Error;
use std::fmt::Display;

#[derive(Debug, Copy, Clone, Ord, PartialOrd, Eq, PartialEq)]
/// Shows size mismatching
pub struct MismatchedSize {
    pub expected: usize,
    pub received: usize,
}

#[derive(Debug, Copy, Clone, PartialOrd, PartialEq)]
pub enum FuseError {
    /// Fewer than two exposures were supplied, or none at all.
    InsufficientExposures,
    /// Count of exposure images does not match count of scale factors.
    ExposureCountMismatch(MismatchedSize),
    /// An exposure scale factor is zero, negative or not finite.
    NonPositiveExposureScale(f32),
    ImageSizeMismatch,
    ZeroBaseSize,
    MinimumSliceSizeMismatch(MismatchedSize),
    MinimumStrideSizeMismatch(MismatchedSize),
    LaneMultipleOfChannels,
    /// A pixel channel was classified as neither properly, under
    /// nor over exposed. Indicates a logic defect or malformed input.
    ClassificationInvariant,
    /// Tonemap was requested before any merge produced a radiance buffer.
    UninitializedRadiance,
}

impl Display for FuseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FuseError::InsufficientExposures => {
                f.write_str("At least two exposures are required to merge")
            }
            FuseError::ExposureCountMismatch(size) => f.write_fmt(format_args!(
                "Expected {} exposure scale factors but received {}",
                size.expected, size.received
            )),
            FuseError::NonPositiveExposureScale(value) => f.write_fmt(format_args!(
                "Exposure scale factor must be finite and positive, got {}",
                value
            )),
            FuseError::ImageSizeMismatch => f.write_str("Image size does not match"),
            FuseError::ZeroBaseSize => f.write_str("Image size must not be zero"),
            FuseError::MinimumSliceSizeMismatch(size) => f.write_fmt(format_args!(
                "Minimum image slice size mismatch: expected={}, received={}",
                size.expected, size.received
            )),
            FuseError::MinimumStrideSizeMismatch(size) => f.write_fmt(format_args!(
                "Minimum stride must have size at least {} but it is {}",
                size.expected, size.received
            )),
            FuseError::LaneMultipleOfChannels => {
                f.write_str("Lane length must be a multiple of channel count")
            }
            FuseError::ClassificationInvariant => {
                f.write_str("Pixel channel is neither properly, under nor over exposed")
            }
            FuseError::UninitializedRadiance => {
                f.write_str("Radiance buffer is not initialized, merge must run first")
            }
        }
    }
}

impl Error for FuseError {}
