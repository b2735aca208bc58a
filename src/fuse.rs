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
use crate::err::MismatchedSize;
use crate::fuse_image::{FuseImage, FuseImageMut};
use crate::FuseError;
use log::debug;
use num_traits::AsPrimitive;
use std::fmt::Debug;

/// Fill policy for pixels seen both under- and over-exposed across the
/// bracket with no properly exposed sample left to average.
#[derive(Debug, Copy, Clone, PartialOrd, PartialEq, Default)]
pub enum ConflictFill {
    /// Fixed mid-gray radiance placeholder, value 120.
    #[default]
    MidGray,
    /// Caller supplied radiance value.
    Constant(f32),
}

impl ConflictFill {
    #[inline]
    pub(crate) fn value(self) -> f32 {
        match self {
            ConflictFill::MidGray => 120.,
            ConflictFill::Constant(value) => value,
        }
    }
}

/// Exposure classification thresholds and fallback policy.
#[derive(Debug, Copy, Clone, PartialOrd, PartialEq)]
pub struct FusionParameters {
    /// Samples strictly below this value are under-exposed.
    pub t_min: i32,
    /// Samples strictly above this value are over-exposed.
    pub t_max: i32,
    pub conflict_fill: ConflictFill,
}

impl Default for FusionParameters {
    fn default() -> Self {
        Self {
            t_min: 0,
            t_max: 255,
            conflict_fill: ConflictFill::default(),
        }
    }
}

/// An ordered bracket of equally sized exposures with one positive scale
/// factor per image.
pub struct ExposureStack<'a, T: Clone + Copy + Default + Debug> {
    pub images: &'a [FuseImage<'a, T, 3>],
    pub scales: &'a [f32],
}

impl<'a, T: Clone + Copy + Default + Debug> ExposureStack<'a, T> {
    pub fn new(images: &'a [FuseImage<'a, T, 3>], scales: &'a [f32]) -> Self {
        Self { images, scales }
    }

    pub fn check_layout(&self) -> Result<(), FuseError> {
        if self.images.len() < 2 {
            return Err(FuseError::InsufficientExposures);
        }
        if self.images.len() != self.scales.len() {
            return Err(FuseError::ExposureCountMismatch(MismatchedSize {
                expected: self.images.len(),
                received: self.scales.len(),
            }));
        }
        for &scale in self.scales {
            if !scale.is_finite() || scale <= 0. {
                return Err(FuseError::NonPositiveExposureScale(scale));
            }
        }
        let first = &self.images[0];
        for image in self.images {
            image.check_layout()?;
            image.size_matches(first)?;
        }
        Ok(())
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub(crate) enum SampleClass {
    Under,
    Proper,
    Over,
}

#[inline]
pub(crate) fn classify(value: i32, params: &FusionParameters) -> SampleClass {
    if value > params.t_max {
        SampleClass::Over
    } else if value < params.t_min {
        SampleClass::Under
    } else {
        SampleClass::Proper
    }
}

/// Fuses a bracket of exposures into one linear radiance plane.
///
/// Each properly exposed sample contributes `value / scale` to its pixel
/// channel and the channel ends up with the mean of its contributors. A
/// channel with no properly exposed sample pulls the whole pixel to the
/// global minimum (clipped dark everywhere), to the global maximum
/// (clipped bright everywhere), or to the conflict fill when both
/// clippings were seen across the bracket.
///
/// The sample type is widened to `i32` before classification so the
/// thresholds stay meaningful for decoders that hand out values outside
/// the 8-bit range. For `u8` input neither threshold can trigger.
pub fn fuse_exposures<T>(
    stack: &ExposureStack<'_, T>,
    params: FusionParameters,
    dst: &mut FuseImageMut<'_, f32, 3>,
) -> Result<(), FuseError>
where
    T: Clone + Copy + Default + Debug + AsPrimitive<i32>,
{
    stack.check_layout()?;
    dst.check_layout()?;
    stack.images[0].size_matches_mut(dst)?;

    let width = dst.width;
    let height = dst.height;
    let lanes = width * 3;
    let dst_stride = dst.row_stride();

    let mut properly = vec![false; lanes * height];
    let mut over = vec![false; lanes * height];
    let mut under = vec![false; lanes * height];
    let mut counts = vec![0u32; lanes * height];

    // The accumulator might be handed a dirty borrowed buffer.
    for row in dst.data.borrow_mut().chunks_mut(dst_stride) {
        row[..lanes].fill(0.);
    }

    for (image, &scale) in stack.images.iter().zip(stack.scales.iter()) {
        let src_stride = image.row_stride();
        for ((src_row, dst_row), (row_properly, (row_under, (row_over, row_counts)))) in image
            .data
            .as_ref()
            .chunks(src_stride)
            .zip(dst.data.borrow_mut().chunks_mut(dst_stride))
            .zip(properly.chunks_mut(lanes).zip(
                under
                    .chunks_mut(lanes)
                    .zip(over.chunks_mut(lanes).zip(counts.chunks_mut(lanes))),
            ))
        {
            let src_row = &src_row[..lanes];
            let dst_row = &mut dst_row[..lanes];
            for (k, (&sample, acc)) in src_row.iter().zip(dst_row.iter_mut()).enumerate() {
                let value: i32 = sample.as_();
                match classify(value, &params) {
                    SampleClass::Over => row_over[k] = true,
                    SampleClass::Under => row_under[k] = true,
                    SampleClass::Proper => {
                        row_properly[k] = true;
                        row_counts[k] += 1;
                        *acc += value as f32 / scale;
                    }
                }
            }
        }
    }

    // Extrema are taken over the accumulated sums, before averaging.
    let mut min_properly = f32::INFINITY;
    let mut max_properly = f32::NEG_INFINITY;
    for (dst_row, row_properly) in dst
        .data
        .borrow()
        .chunks(dst_stride)
        .zip(properly.chunks(lanes))
    {
        for (&radiance, &is_proper) in dst_row[..lanes].iter().zip(row_properly.iter()) {
            if is_proper {
                min_properly = min_properly.min(radiance);
                max_properly = max_properly.max(radiance);
            }
        }
    }
    debug!("properly exposed radiance range: [{min_properly}, {max_properly}]");

    let conflict = params.conflict_fill.value();
    for (dst_row, (row_properly, (row_under, (row_over, row_counts)))) in
        dst.data.borrow_mut().chunks_mut(dst_stride).zip(
            properly.chunks(lanes).zip(
                under
                    .chunks(lanes)
                    .zip(over.chunks(lanes).zip(counts.chunks(lanes))),
            ),
        )
    {
        let dst_row = &mut dst_row[..lanes];
        for px in 0..width {
            let at = px * 3;
            for c in 0..3 {
                dst_row[at + c] /= row_counts[at + c].max(1) as f32;
            }
            for c in 0..3 {
                if row_properly[at + c] {
                    continue;
                }
                let fill = if row_under[at + c] && !row_over[at + c] {
                    min_properly
                } else if row_over[at + c] && !row_under[at + c] {
                    max_properly
                } else if row_over[at + c] && row_under[at + c] {
                    conflict
                } else {
                    return Err(FuseError::ClassificationInvariant);
                };
                dst_row[at] = fill;
                dst_row[at + 1] = fill;
                dst_row[at + 2] = fill;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn merge<T: Clone + Copy + Default + Debug + AsPrimitive<i32>>(
        images: &[FuseImage<'_, T, 3>],
        scales: &[f32],
        width: usize,
        height: usize,
    ) -> Result<Vec<f32>, FuseError> {
        let stack = ExposureStack::new(images, scales);
        let mut dst = FuseImageMut::<f32, 3>::alloc(width, height);
        fuse_exposures(&stack, FusionParameters::default(), &mut dst)?;
        Ok(dst.data.borrow().to_vec())
    }

    #[test]
    fn classify_thresholds() {
        let params = FusionParameters::default();
        assert_eq!(classify(-5, &params), SampleClass::Under);
        assert_eq!(classify(0, &params), SampleClass::Proper);
        assert_eq!(classify(255, &params), SampleClass::Proper);
        assert_eq!(classify(300, &params), SampleClass::Over);
    }

    #[test]
    fn averages_scaled_radiance() {
        let a = [100u8, 100, 100];
        let b = [200u8, 200, 200];
        let images = [
            FuseImage::<u8, 3>::borrow(&a, 1, 1),
            FuseImage::<u8, 3>::borrow(&b, 1, 1),
        ];
        let fused = merge(&images, &[1.0, 2.0], 1, 1).unwrap();
        // (100/1 + 200/2) / 2
        for &v in fused.iter() {
            assert_relative_eq!(v, 100.0, max_relative = 1e-6);
        }
    }

    #[test]
    fn merge_is_deterministic() {
        let a = [10u8, 80, 130, 240, 5, 61];
        let b = [90u8, 160, 210, 30, 75, 141];
        let images = [
            FuseImage::<u8, 3>::borrow(&a, 2, 1),
            FuseImage::<u8, 3>::borrow(&b, 2, 1),
        ];
        let first = merge(&images, &[0.5, 2.0], 2, 1).unwrap();
        let second = merge(&images, &[0.5, 2.0], 2, 1).unwrap();
        assert_eq!(first, second);
        assert!(first.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn conflicting_channel_fills_mid_gray() {
        // Channel 0 is under-exposed in the first shot and over-exposed in
        // the second, the remaining channels stay measurable.
        let a = [-5i16, 10, 10];
        let b = [300i16, 20, 20];
        let images = [
            FuseImage::<i16, 3>::borrow(&a, 1, 1),
            FuseImage::<i16, 3>::borrow(&b, 1, 1),
        ];
        let fused = merge(&images, &[1.0, 1.0], 1, 1).unwrap();
        assert_eq!(fused, vec![120.0, 120.0, 120.0]);
    }

    #[test]
    fn clipped_dark_channel_fills_global_minimum() {
        let a = [10i16, 10, 10, -5, 4, 6];
        let b = [20i16, 20, 20, -5, 8, 12];
        let images = [
            FuseImage::<i16, 3>::borrow(&a, 2, 1),
            FuseImage::<i16, 3>::borrow(&b, 2, 1),
        ];
        let fused = merge(&images, &[1.0, 1.0], 2, 1).unwrap();
        // First pixel is a plain mean of the sums.
        assert_eq!(&fused[..3], &[15.0, 15.0, 15.0]);
        // Second pixel channel 0 never measured, minimum accumulated
        // properly exposed sum is 4 + 8 = 12 and floods the pixel.
        assert_eq!(&fused[3..], &[12.0, 12.0, 12.0]);
    }

    #[test]
    fn clipped_bright_channel_fills_global_maximum() {
        let a = [10i16, 10, 10, 300, 4, 6];
        let b = [20i16, 20, 20, 301, 8, 12];
        let images = [
            FuseImage::<i16, 3>::borrow(&a, 2, 1),
            FuseImage::<i16, 3>::borrow(&b, 2, 1),
        ];
        let fused = merge(&images, &[1.0, 1.0], 2, 1).unwrap();
        // Maximum accumulated properly exposed sum is 10 + 20 = 30.
        assert_eq!(&fused[3..], &[30.0, 30.0, 30.0]);
    }

    #[test]
    fn custom_conflict_fill() {
        let a = [-5i16, 10, 10];
        let b = [300i16, 20, 20];
        let images = [
            FuseImage::<i16, 3>::borrow(&a, 1, 1),
            FuseImage::<i16, 3>::borrow(&b, 1, 1),
        ];
        let stack = ExposureStack::new(&images, &[1.0, 1.0]);
        let mut dst = FuseImageMut::<f32, 3>::alloc(1, 1);
        let params = FusionParameters {
            conflict_fill: ConflictFill::Constant(7.5),
            ..Default::default()
        };
        fuse_exposures(&stack, params, &mut dst).unwrap();
        assert_eq!(dst.data.borrow(), &[7.5, 7.5, 7.5]);
    }

    #[test]
    fn single_exposure_is_rejected() {
        let a = [100u8, 100, 100];
        let images = [FuseImage::<u8, 3>::borrow(&a, 1, 1)];
        assert_eq!(
            merge(&images, &[1.0], 1, 1),
            Err(FuseError::InsufficientExposures)
        );
    }

    #[test]
    fn mismatched_scale_count_is_rejected() {
        let a = [100u8, 100, 100];
        let images = [
            FuseImage::<u8, 3>::borrow(&a, 1, 1),
            FuseImage::<u8, 3>::borrow(&a, 1, 1),
        ];
        assert!(matches!(
            merge(&images, &[1.0], 1, 1),
            Err(FuseError::ExposureCountMismatch(_))
        ));
    }

    #[test]
    fn non_positive_scale_is_rejected() {
        let a = [100u8, 100, 100];
        let images = [
            FuseImage::<u8, 3>::borrow(&a, 1, 1),
            FuseImage::<u8, 3>::borrow(&a, 1, 1),
        ];
        assert_eq!(
            merge(&images, &[1.0, 0.0], 1, 1),
            Err(FuseError::NonPositiveExposureScale(0.0))
        );
    }

    #[test]
    fn mismatched_sizes_are_rejected() {
        let a = [100u8, 100, 100];
        let b = [100u8; 6];
        let images = [
            FuseImage::<u8, 3>::borrow(&a, 1, 1),
            FuseImage::<u8, 3>::borrow(&b, 2, 1),
        ];
        assert_eq!(
            merge(&images, &[1.0, 1.0], 1, 1),
            Err(FuseError::ImageSizeMismatch)
        );
    }
}
