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
use crate::fuse::{fuse_exposures, ExposureStack, FusionParameters};
use crate::fuse_image::{FuseImageMut, RadianceBuffer};
use crate::normalize::{normalize_and_clamp, quantize_rgb8};
use crate::tonemap::{tonemap, TonemapParameters};
use crate::yxy::{rgb_to_yxy, yxy_to_rgb};
use crate::FuseError;
use num_traits::AsPrimitive;
use std::fmt::Debug;

/// Drives the whole pipeline over one bracket: fusion, RGB to Yxy, global
/// tonemap on the luminance channel, Yxy back to RGB, clamp, 8-bit pack.
///
/// Every call owns its buffers, independent merges may run on separate
/// threads without synchronization.
pub struct HdrMerger {
    pub fusion: FusionParameters,
    pub tonemap: TonemapParameters,
    radiance: Option<RadianceBuffer<'static>>,
}

impl Default for HdrMerger {
    fn default() -> Self {
        Self::new(FusionParameters::default(), TonemapParameters::default())
    }
}

impl HdrMerger {
    pub fn new(fusion: FusionParameters, tonemap: TonemapParameters) -> Self {
        Self {
            fusion,
            tonemap,
            radiance: None,
        }
    }

    /// Fuses the bracket into a linear radiance buffer and retains it for
    /// [HdrMerger::tonemap_into].
    pub fn merge<T>(&mut self, stack: &ExposureStack<'_, T>) -> Result<(), FuseError>
    where
        T: Clone + Copy + Default + Debug + AsPrimitive<i32>,
    {
        stack.check_layout()?;
        let first = &stack.images[0];
        let mut radiance = FuseImageMut::<f32, 3>::alloc(first.width, first.height);
        fuse_exposures(stack, self.fusion, &mut radiance)?;
        self.radiance = Some(radiance);
        Ok(())
    }

    /// Fused linear radiance of the last merge, if any.
    pub fn radiance(&self) -> Option<&RadianceBuffer<'static>> {
        self.radiance.as_ref()
    }

    /// Tonemaps the retained radiance into an 8-bit RGB image.
    pub fn tonemap_into(&self, dst: &mut FuseImageMut<'_, u8, 3>) -> Result<(), FuseError> {
        let radiance = self
            .radiance
            .as_ref()
            .ok_or(FuseError::UninitializedRadiance)?;
        let width = radiance.width;
        let height = radiance.height;
        let mut yxy = FuseImageMut::<f32, 3>::alloc(width, height);
        rgb_to_yxy(&radiance.to_immutable_ref(), &mut yxy)?;
        let mut mapped = FuseImageMut::<f32, 3>::alloc(width, height);
        tonemap(&yxy.to_immutable_ref(), self.tonemap, &mut mapped)?;
        let mut rgb = FuseImageMut::<f32, 3>::alloc(width, height);
        yxy_to_rgb(&mapped.to_immutable_ref(), &mut rgb)?;
        normalize_and_clamp(&mut rgb)?;
        quantize_rgb8(&rgb.to_immutable_ref(), dst)
    }

    /// Runs merge and tonemap back to back.
    pub fn merge_and_tonemap<T>(
        &mut self,
        stack: &ExposureStack<'_, T>,
        dst: &mut FuseImageMut<'_, u8, 3>,
    ) -> Result<(), FuseError>
    where
        T: Clone + Copy + Default + Debug + AsPrimitive<i32>,
    {
        self.merge(stack)?;
        self.tonemap_into(dst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fuse_image::FuseImage;

    #[test]
    fn tonemap_before_merge_is_rejected() {
        let merger = HdrMerger::default();
        let mut dst = FuseImageMut::<u8, 3>::alloc(1, 1);
        assert_eq!(
            merger.tonemap_into(&mut dst),
            Err(FuseError::UninitializedRadiance)
        );
    }

    #[test]
    fn merge_retains_radiance() {
        let a = [100u8; 12];
        let b = [100u8; 12];
        let images = [
            FuseImage::<u8, 3>::borrow(&a, 2, 2),
            FuseImage::<u8, 3>::borrow(&b, 2, 2),
        ];
        let stack = ExposureStack::new(&images, &[1.0, 1.0]);
        let mut merger = HdrMerger::default();
        merger.merge(&stack).unwrap();
        let radiance = merger.radiance().unwrap();
        assert_eq!(radiance.width, 2);
        assert_eq!(radiance.height, 2);
        assert!(radiance.data.borrow().iter().all(|&v| v == 100.0));
    }
}
