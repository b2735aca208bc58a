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
use crate::fuse_image::{FuseImage, FuseImageMut};
use crate::FuseError;
use log::debug;

/// Reinhard global operator constants.
#[derive(Debug, Copy, Clone, PartialOrd, PartialEq)]
pub struct TonemapParameters {
    /// Middle-gray key value `a` from Reinhard et al., 2002.
    pub key: f32,
    /// Stability epsilon added under the logarithm for zero luminance.
    pub log_epsilon: f32,
}

impl Default for TonemapParameters {
    fn default() -> Self {
        Self {
            key: 0.60,
            log_epsilon: 1e-5,
        }
    }
}

pub(crate) trait ToneMap {
    /// This method always expects first item of a chunk to be luma.
    fn process_luma_lane(&self, in_place: &mut [f32]);
}

/// Compressive global operator `L' = s / (1 + s)` with `s = (a / Lw) * L`.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ReinhardGlobalToneMapper<const CN: usize> {
    pub(crate) scale: f32,
}

impl<const CN: usize> ToneMap for ReinhardGlobalToneMapper<CN> {
    fn process_luma_lane(&self, in_place: &mut [f32]) {
        for chunk in in_place.chunks_exact_mut(CN) {
            let scaled = self.scale * chunk[0];
            chunk[0] = (scaled / (1f32 + scaled)).min(1f32);
        }
    }
}

/// Log-average (geometric mean) luminance of a Yxy plane, the scene key
/// estimate of Reinhard et al., 2002.
pub fn log_average_luminance(
    yxy: &FuseImage<'_, f32, 3>,
    params: TonemapParameters,
) -> Result<f32, FuseError> {
    yxy.check_layout()?;
    let width = yxy.width;
    let stride = yxy.row_stride();
    let mut sum_log = 0f64;
    for row in yxy.data.as_ref().chunks(stride) {
        for px in row[..width * 3].chunks_exact(3) {
            sum_log += f64::from(px[0] + params.log_epsilon).ln();
        }
    }
    let pixels = (width * yxy.height) as f64;
    Ok((sum_log / pixels).exp() as f32)
}

/// Compresses the luminance channel of a Yxy plane into a displayable
/// range, chrominance passes through unchanged. The source plane is left
/// untouched.
pub fn tonemap(
    src: &FuseImage<'_, f32, 3>,
    params: TonemapParameters,
    dst: &mut FuseImageMut<'_, f32, 3>,
) -> Result<(), FuseError> {
    src.check_layout()?;
    dst.check_layout()?;
    src.size_matches_mut(dst)?;
    let lw = log_average_luminance(src, params)?;
    debug!("log-average luminance: {lw}");
    let mapper = ReinhardGlobalToneMapper::<3> {
        scale: params.key / lw,
    };
    let width = src.width;
    let src_stride = src.row_stride();
    let dst_stride = dst.row_stride();
    for (src_row, dst_row) in src
        .data
        .as_ref()
        .chunks(src_stride)
        .zip(dst.data.borrow_mut().chunks_mut(dst_stride))
    {
        let dst_row = &mut dst_row[..width * 3];
        dst_row.copy_from_slice(&src_row[..width * 3]);
        mapper.process_luma_lane(dst_row);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn map_lumas(lumas: &[f32]) -> Vec<f32> {
        let mut data = Vec::with_capacity(lumas.len() * 3);
        for &l in lumas {
            data.extend_from_slice(&[l, 0.3, 0.35]);
        }
        let src = FuseImage::<f32, 3>::borrow(&data, lumas.len(), 1);
        let mut dst = FuseImageMut::<f32, 3>::alloc(lumas.len(), 1);
        tonemap(&src, TonemapParameters::default(), &mut dst).unwrap();
        dst.data
            .borrow()
            .chunks_exact(3)
            .map(|px| px[0])
            .collect()
    }

    #[test]
    fn log_average_of_uniform_plane() {
        let data = [2.0f32, 0.3, 0.35, 2.0, 0.3, 0.35, 2.0, 0.3, 0.35, 2.0, 0.3, 0.35];
        let yxy = FuseImage::<f32, 3>::borrow(&data, 2, 2);
        let lw = log_average_luminance(&yxy, TonemapParameters::default()).unwrap();
        assert_relative_eq!(lw, 2.0 + 1e-5, max_relative = 1e-5);
    }

    #[test]
    fn mapping_is_monotonic_and_bounded() {
        let mapped = map_lumas(&[0.0, 0.1, 1.0, 10.0, 1e6]);
        assert_eq!(mapped[0], 0.0);
        for pair in mapped.windows(2) {
            assert!(pair[0] < pair[1], "expected strictly increasing: {pair:?}");
        }
        assert!(mapped[4] < 1.0);
        assert!(mapped[4] > 0.999);
    }

    #[test]
    fn chrominance_passes_through() {
        let data = [4.0f32, 0.21, 0.42];
        let src = FuseImage::<f32, 3>::borrow(&data, 1, 1);
        let mut dst = FuseImageMut::<f32, 3>::alloc(1, 1);
        tonemap(&src, TonemapParameters::default(), &mut dst).unwrap();
        let out = dst.data.borrow();
        assert_eq!(out[1], 0.21);
        assert_eq!(out[2], 0.42);
        assert!(out[0] < 1.0 && out[0] > 0.0);
    }

    #[test]
    fn source_plane_is_not_mutated() {
        let data = [4.0f32, 0.21, 0.42];
        let src = FuseImage::<f32, 3>::borrow(&data, 1, 1);
        let mut dst = FuseImageMut::<f32, 3>::alloc(1, 1);
        tonemap(&src, TonemapParameters::default(), &mut dst).unwrap();
        assert_eq!(data, [4.0, 0.21, 0.42]);
    }
}
