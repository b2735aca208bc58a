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
use crate::mlaf::mlaf;
use crate::{m_clamp, FuseError};
use log::debug;

/// Clamps a linear RGB plane to the displayable [0, 1] range.
///
/// Per-channel extrema are scanned and reported at debug level only; the
/// observed delta does not rescale the output.
pub fn normalize_and_clamp(image: &mut FuseImageMut<'_, f32, 3>) -> Result<(), FuseError> {
    image.check_layout()?;
    let width = image.width;
    let stride = image.row_stride();
    let mut mins = [f32::INFINITY; 3];
    let mut maxs = [f32::NEG_INFINITY; 3];
    for row in image.data.borrow().chunks(stride) {
        for px in row[..width * 3].chunks_exact(3) {
            for (c, &v) in px.iter().enumerate() {
                mins[c] = mins[c].min(v);
                maxs[c] = maxs[c].max(v);
            }
        }
    }
    debug!("channel minimums {mins:?}, channel maximums {maxs:?}");
    for row in image.data.borrow_mut().chunks_mut(stride) {
        for v in row[..width * 3].iter_mut() {
            *v = m_clamp(*v, 0., 1.);
        }
    }
    Ok(())
}

/// Packs a clamped [0, 1] RGB plane into 8-bit channels with rounding.
pub fn quantize_rgb8(
    src: &FuseImage<'_, f32, 3>,
    dst: &mut FuseImageMut<'_, u8, 3>,
) -> Result<(), FuseError> {
    src.check_layout()?;
    dst.check_layout()?;
    src.size_matches_mut(dst)?;
    let width = src.width;
    let src_stride = src.row_stride();
    let dst_stride = dst.row_stride();
    for (src_row, dst_row) in src
        .data
        .as_ref()
        .chunks(src_stride)
        .zip(dst.data.borrow_mut().chunks_mut(dst_stride))
    {
        for (&v, d) in src_row[..width * 3]
            .iter()
            .zip(dst_row[..width * 3].iter_mut())
        {
            *d = mlaf(0.5f32, v, 255f32) as u8;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_out_of_range_values() {
        let mut data = [-0.5f32, 0.5, 1.5];
        let mut image = FuseImageMut::<f32, 3>::borrow(&mut data, 1, 1);
        normalize_and_clamp(&mut image).unwrap();
        assert_eq!(image.data.borrow(), &[0.0, 0.5, 1.0]);
    }

    #[test]
    fn in_range_values_are_untouched() {
        let mut data = [0.0f32, 0.25, 1.0];
        let mut image = FuseImageMut::<f32, 3>::borrow(&mut data, 1, 1);
        normalize_and_clamp(&mut image).unwrap();
        assert_eq!(image.data.borrow(), &[0.0, 0.25, 1.0]);
    }

    #[test]
    fn quantization_rounds_to_nearest() {
        let data = [0.0f32, 1.0, 0.5019608];
        let src = FuseImage::<f32, 3>::borrow(&data, 1, 1);
        let mut dst = FuseImageMut::<u8, 3>::alloc(1, 1);
        quantize_rgb8(&src, &mut dst).unwrap();
        assert_eq!(dst.data.borrow(), &[0u8, 255, 128]);
    }
}
