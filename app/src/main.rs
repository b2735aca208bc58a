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
use hdrfuse::{ExposureStack, FuseImage, FuseImageMut, HdrMerger};
use image::{ExtendedColorType, ImageEncoder};
use std::env;
use std::fs::File;
use std::io::BufWriter;

fn main() {
    env_logger::init();
    let args: Vec<String> = env::args().skip(1).collect();
    if args.len() < 5 || args.len() % 2 == 0 {
        eprintln!("usage: app <output.png> <exposure.png> <scale> <exposure.png> <scale> ...");
        std::process::exit(2);
    }
    let output_path = &args[0];

    let mut planes: Vec<(Vec<u8>, u32, u32)> = Vec::new();
    let mut scales: Vec<f32> = Vec::new();
    for pair in args[1..].chunks_exact(2) {
        let decoded = image::open(&pair[0])
            .expect("Failed to decode exposure")
            .to_rgb8();
        let scale: f32 = pair[1].parse().expect("Exposure scale must be a number");
        let (width, height) = decoded.dimensions();
        planes.push((decoded.into_raw(), width, height));
        scales.push(scale);
    }

    let images: Vec<FuseImage<'_, u8, 3>> = planes
        .iter()
        .map(|(data, width, height)| {
            FuseImage::<u8, 3>::borrow(data, *width as usize, *height as usize)
        })
        .collect();
    let stack = ExposureStack::new(&images, &scales);

    let (width, height) = (planes[0].1 as usize, planes[0].2 as usize);
    let mut merger = HdrMerger::default();
    let mut fused = FuseImageMut::<u8, 3>::alloc(width, height);
    merger
        .merge_and_tonemap(&stack, &mut fused)
        .expect("HDR merge failed");

    let file = File::create(output_path).expect("Failed to create output file");
    let encoder = image::codecs::png::PngEncoder::new(BufWriter::new(file));
    encoder
        .write_image(
            fused.data.borrow(),
            width as u32,
            height as u32,
            ExtendedColorType::Rgb8,
        )
        .expect("Failed to encode output");
}
