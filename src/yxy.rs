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
use crate::FuseError;
use moxcms::Matrix3f;

pub(crate) const RGB_TO_XYZ: Matrix3f = Matrix3f {
    v: [
        [0.5141364, 0.3238786, 0.16036376],
        [0.265068, 0.67023428, 0.06409157],
        [0.0241188, 0.1228178, 0.84442666],
    ],
};

pub(crate) const XYZ_TO_RGB: Matrix3f = Matrix3f {
    v: [
        [2.5651, -1.1665, -0.3986],
        [-1.0217, 1.9777, 0.0439],
        [0.0753, -0.2543, 1.1892],
    ],
};

#[inline(always)]
fn mul_vector(c: &Matrix3f, v: [f32; 3]) -> [f32; 3] {
    [
        mlaf(mlaf(v[0] * c.v[0][0], v[1], c.v[0][1]), v[2], c.v[0][2]),
        mlaf(mlaf(v[0] * c.v[1][0], v[1], c.v[1][1]), v[2], c.v[1][2]),
        mlaf(mlaf(v[0] * c.v[2][0], v[1], c.v[2][1]), v[2], c.v[2][2]),
    ]
}

/// Converts a linear RGB radiance plane to Yxy.
///
/// A pixel whose XYZ components sum to zero or below carries no usable
/// chromaticity and is written out as (0, 0, 0) instead of dividing by
/// the degenerate sum.
pub fn rgb_to_yxy(
    src: &FuseImage<'_, f32, 3>,
    dst: &mut FuseImageMut<'_, f32, 3>,
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
        let src_row = &src_row[..width * 3];
        let dst_row = &mut dst_row[..width * 3];
        for (src_px, dst_px) in src_row.chunks_exact(3).zip(dst_row.chunks_exact_mut(3)) {
            let xyz = mul_vector(&RGB_TO_XYZ, [src_px[0], src_px[1], src_px[2]]);
            let w = xyz[0] + xyz[1] + xyz[2];
            if w > 0. {
                dst_px[0] = xyz[1];
                dst_px[1] = xyz[0] / w;
                dst_px[2] = xyz[1] / w;
            } else {
                dst_px[0] = 0.;
                dst_px[1] = 0.;
                dst_px[2] = 0.;
            }
        }
    }
    Ok(())
}

/// Converts a Yxy plane back to linear RGB.
///
/// Chrominance is reconstructed only for Y > 0, x > 0, y > 0; a degenerate
/// pixel collapses to black. Output is not clamped here, final range
/// handling belongs to [crate::normalize_and_clamp].
pub fn yxy_to_rgb(
    src: &FuseImage<'_, f32, 3>,
    dst: &mut FuseImageMut<'_, f32, 3>,
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
        let src_row = &src_row[..width * 3];
        let dst_row = &mut dst_row[..width * 3];
        for (src_px, dst_px) in src_row.chunks_exact(3).zip(dst_row.chunks_exact_mut(3)) {
            let luma = src_px[0];
            let cx = src_px[1];
            let cy = src_px[2];
            let (x, z) = if luma > 0. && cx > 0. && cy > 0. {
                let x = cx * luma / cy;
                (x, x / cx - x - luma)
            } else {
                (0., 0.)
            };
            let rgb = mul_vector(&XYZ_TO_RGB, [x, luma, z]);
            dst_px[0] = rgb[0];
            dst_px[1] = rgb[1];
            dst_px[2] = rgb[2];
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn round_trip_preserves_rgb() {
        let data = [0.2f32, 0.4, 0.6, 1.5, 0.75, 0.1, 0.01, 0.02, 0.03];
        let rgb = FuseImage::<f32, 3>::borrow(&data, 3, 1);
        let mut yxy = FuseImageMut::<f32, 3>::alloc(3, 1);
        rgb_to_yxy(&rgb, &mut yxy).unwrap();
        let mut back = FuseImageMut::<f32, 3>::alloc(3, 1);
        yxy_to_rgb(&yxy.to_immutable_ref(), &mut back).unwrap();
        // The two matrices are not exact inverses of each other, so a small
        // drift is expected.
        for (&restored, &original) in back.data.borrow().iter().zip(data.iter()) {
            assert_relative_eq!(restored, original, max_relative = 1e-3);
        }
    }

    #[test]
    fn black_pixel_maps_to_zero_luma() {
        let data = [0.0f32; 3];
        let rgb = FuseImage::<f32, 3>::borrow(&data, 1, 1);
        let mut yxy = FuseImageMut::<f32, 3>::alloc(1, 1);
        rgb_to_yxy(&rgb, &mut yxy).unwrap();
        assert_eq!(yxy.data.borrow(), &[0.0f32; 3]);
    }

    #[test]
    fn degenerate_chrominance_collapses_to_black() {
        // Positive luma but zero chromaticity coordinates.
        let data = [0.5f32, 0.0, 0.0];
        let yxy = FuseImage::<f32, 3>::borrow(&data, 1, 1);
        let mut rgb = FuseImageMut::<f32, 3>::alloc(1, 1);
        yxy_to_rgb(&yxy, &mut rgb).unwrap();
        let out = rgb.data.borrow();
        // X = Z = 0, only the Y row of the matrix contributes.
        assert_relative_eq!(out[0], XYZ_TO_RGB.v[0][1] * 0.5, max_relative = 1e-6);
        assert_relative_eq!(out[1], XYZ_TO_RGB.v[1][1] * 0.5, max_relative = 1e-6);
        assert_relative_eq!(out[2], XYZ_TO_RGB.v[2][1] * 0.5, max_relative = 1e-6);
    }

    #[test]
    fn size_mismatch_is_rejected() {
        let data = [0.0f32; 6];
        let rgb = FuseImage::<f32, 3>::borrow(&data, 2, 1);
        let mut yxy = FuseImageMut::<f32, 3>::alloc(1, 1);
        assert_eq!(
            rgb_to_yxy(&rgb, &mut yxy),
            Err(FuseError::ImageSizeMismatch)
        );
    }
}
