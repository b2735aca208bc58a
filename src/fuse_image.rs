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
use crate::FuseError;
use std::fmt::Debug;

#[derive(Debug)]
pub enum BufferStore<'a, T: Copy + Debug> {
    Borrowed(&'a mut [T]),
    Owned(Vec<T>),
}

impl<T: Copy + Debug> BufferStore<'_, T> {
    #[allow(clippy::should_implement_trait)]
    pub fn borrow(&self) -> &[T] {
        match self {
            Self::Borrowed(p_ref) => p_ref,
            Self::Owned(vec) => vec,
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn borrow_mut(&mut self) -> &mut [T] {
        match self {
            Self::Borrowed(p_ref) => p_ref,
            Self::Owned(vec) => vec,
        }
    }
}

/// Immutable image store.
///
/// One bracketed exposure is a `FuseImage<'_, u8, 3>`; intermediate linear
/// radiance and Yxy planes are `f32` with the same layout.
pub struct FuseImage<'a, T: Clone + Copy + Default + Debug, const N: usize> {
    pub data: std::borrow::Cow<'a, [T]>,
    pub width: usize,
    pub height: usize,
    /// Image stride, items per row, might be 0
    pub stride: usize,
}

/// Mutable image store
pub struct FuseImageMut<'a, T: Clone + Copy + Default + Debug, const N: usize> {
    pub data: BufferStore<'a, T>,
    pub width: usize,
    pub height: usize,
    /// Image stride, items per row, might be 0
    pub stride: usize,
}

/// Fused linear-radiance plane, and after conversion a Yxy plane.
pub type RadianceBuffer<'a> = FuseImageMut<'a, f32, 3>;

impl<'a, T: Clone + Copy + Default + Debug, const N: usize> FuseImage<'a, T, N> {
    /// Borrows existing data
    /// Stride will be default `width * N`
    pub fn borrow(arr: &'a [T], width: usize, height: usize) -> Self {
        Self {
            data: std::borrow::Cow::Borrowed(arr),
            width,
            height,
            stride: width * N,
        }
    }

    /// Checks if it is matches the size of the other image
    #[inline]
    pub fn size_matches(&self, other: &FuseImage<'_, T, N>) -> Result<(), FuseError> {
        if self.width == other.width && self.height == other.height {
            return Ok(());
        }
        Err(FuseError::ImageSizeMismatch)
    }

    /// Checks if it is matches the size of the other image
    #[inline]
    pub fn size_matches_mut<J: Clone + Copy + Default + Debug>(
        &self,
        other: &FuseImageMut<'_, J, N>,
    ) -> Result<(), FuseError> {
        if self.width == other.width && self.height == other.height {
            return Ok(());
        }
        Err(FuseError::ImageSizeMismatch)
    }

    /// Returns row stride
    #[inline]
    pub fn row_stride(&self) -> usize {
        if self.stride == 0 {
            self.width * N
        } else {
            self.stride
        }
    }

    #[inline]
    pub fn check_layout(&self) -> Result<(), FuseError> {
        if self.width == 0 || self.height == 0 {
            return Err(FuseError::ZeroBaseSize);
        }
        let row_stride = self.row_stride();
        if self.data.len() < row_stride * (self.height - 1) + self.width * N {
            return Err(FuseError::MinimumSliceSizeMismatch(MismatchedSize {
                expected: row_stride * self.height,
                received: self.data.len(),
            }));
        }
        if row_stride < self.width * N {
            return Err(FuseError::MinimumStrideSizeMismatch(MismatchedSize {
                expected: self.width * N,
                received: row_stride,
            }));
        }
        Ok(())
    }
}

impl<'a, T: Clone + Copy + Default + Debug, const N: usize> FuseImageMut<'a, T, N> {
    /// Allocates default image layout for given N channels count
    pub fn alloc(width: usize, height: usize) -> Self {
        Self {
            data: BufferStore::Owned(vec![T::default(); width * height * N]),
            width,
            height,
            stride: width * N,
        }
    }

    /// Mutable borrows existing data
    /// Stride will be default `width * N`
    pub fn borrow(arr: &'a mut [T], width: usize, height: usize) -> Self {
        Self {
            data: BufferStore::Borrowed(arr),
            width,
            height,
            stride: width * N,
        }
    }

    /// Returns row stride
    #[inline]
    pub fn row_stride(&self) -> usize {
        if self.stride == 0 {
            self.width * N
        } else {
            self.stride
        }
    }

    /// Checks if layout matches necessary requirements
    #[inline]
    pub fn check_layout(&self) -> Result<(), FuseError> {
        if self.width == 0 || self.height == 0 {
            return Err(FuseError::ZeroBaseSize);
        }
        let row_stride = self.row_stride();
        let data_len = self.data.borrow().len();
        if data_len < row_stride * (self.height - 1) + self.width * N {
            return Err(FuseError::MinimumSliceSizeMismatch(MismatchedSize {
                expected: row_stride * self.height,
                received: data_len,
            }));
        }
        if row_stride < self.width * N {
            return Err(FuseError::MinimumStrideSizeMismatch(MismatchedSize {
                expected: self.width * N,
                received: row_stride,
            }));
        }
        Ok(())
    }

    pub fn to_immutable_ref(&self) -> FuseImage<'_, T, N> {
        FuseImage {
            data: std::borrow::Cow::Borrowed(self.data.borrow()),
            stride: self.row_stride(),
            width: self.width,
            height: self.height,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_rejects_zero_size() {
        let image = FuseImage::<u8, 3>::borrow(&[], 0, 0);
        assert_eq!(image.check_layout(), Err(FuseError::ZeroBaseSize));
    }

    #[test]
    fn layout_rejects_short_slice() {
        let data = vec![0u8; 11];
        let image = FuseImage::<u8, 3>::borrow(&data, 2, 2);
        assert!(matches!(
            image.check_layout(),
            Err(FuseError::MinimumSliceSizeMismatch(_))
        ));
    }

    #[test]
    fn alloc_has_valid_layout() {
        let image = FuseImageMut::<f32, 3>::alloc(4, 3);
        assert!(image.check_layout().is_ok());
        assert_eq!(image.row_stride(), 12);
        assert_eq!(image.data.borrow().len(), 36);
    }
}
