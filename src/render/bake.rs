//! Pixel-level filter bake
//!
//! Writes a filter setting permanently into a captured image:
//! 1. The declarative stack (see `stack.rs`) is rendered on the CPU
//! 2. Channel boosts are added per pixel
//! 3. The result is encoded as JPEG for storage
//!
//! The bake runs on a blocking worker over a freshly decoded, private
//! buffer. Callers that lose interest simply drop the future.

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, RgbImage, RgbaImage};
use tracing::{debug, warn};

use super::source::ImageRef;
use super::stack::{compose_stack, FilterOp};
use crate::color::{ColorOp, Rgba};
use crate::errors::Result;
use crate::state::filters::FilterModel;

/// JPEG quality used for baked photos
pub const DEFAULT_JPEG_QUALITY: u8 = 95;

/// One RGBA pixel, laid out exactly like four bytes of an RGBA buffer
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Pixel {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Pixel {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

/// Channel boosts converted to 8-bit amounts
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ChannelBoost {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub yellow: u8,
}

impl ChannelBoost {
    /// Whether applying this boost changes nothing
    pub fn is_identity(&self) -> bool {
        *self == Self::default()
    }
}

impl From<&FilterModel> for ChannelBoost {
    fn from(filters: &FilterModel) -> Self {
        Self {
            red: boost_amount(filters.red_boost),
            green: boost_amount(filters.green_boost),
            blue: boost_amount(filters.blue_boost),
            yellow: boost_amount(filters.yellow_boost),
        }
    }
}

/// `percent * 255 / 100` in integer arithmetic, percent capped at 100
fn boost_amount(percent: u16) -> u8 {
    (u32::from(percent.min(100)) * 255 / 100) as u8
}

/// Apply channel boosts to a single pixel
///
/// Boosts run in the order red, green, blue, yellow. Each one reads the
/// current channel value, so yellow stacks on top of the red and green
/// boosts. Channels saturate at 255; alpha is never touched.
pub fn boost_pixel(pixel: Pixel, boost: &ChannelBoost) -> Pixel {
    let mut out = pixel;
    out.r = out.r.saturating_add(boost.red);
    out.g = out.g.saturating_add(boost.green);
    out.b = out.b.saturating_add(boost.blue);
    out.r = out.r.saturating_add(boost.yellow);
    out.g = out.g.saturating_add(boost.yellow);
    out
}

/// Apply the channel boosts of `filters` to every pixel in place
pub fn apply_channel_boosts(pixels: &mut [Pixel], filters: &FilterModel) {
    let boost = ChannelBoost::from(filters);
    if boost.is_identity() {
        return;
    }
    for pixel in pixels.iter_mut() {
        *pixel = boost_pixel(*pixel, &boost);
    }
}

/// View an RGBA buffer as pixels
pub fn pixels_mut(image: &mut RgbaImage) -> &mut [Pixel] {
    bytemuck::cast_slice_mut::<u8, Pixel>(&mut **image)
}

/// Render the declarative stack into an RGBA buffer
///
/// Identity operations are skipped. Consecutive color operations are fused
/// into one pass; blur splits the passes because it needs neighbors.
pub fn apply_stack(mut image: RgbaImage, ops: &[FilterOp]) -> RgbaImage {
    let mut pending: Vec<ColorOp> = Vec::new();

    for op in ops.iter().filter(|op| !op.is_identity()) {
        match op.color_op() {
            Some(color_op) => pending.push(color_op),
            None => {
                apply_color_ops(&mut image, &pending);
                pending.clear();
                if let FilterOp::Blur(radius) = *op {
                    image = image::imageops::blur(&image, f32::from(radius));
                }
            }
        }
    }

    apply_color_ops(&mut image, &pending);
    image
}

fn apply_color_ops(image: &mut RgbaImage, ops: &[ColorOp]) {
    if ops.is_empty() {
        return;
    }
    for pixel in pixels_mut(image) {
        let color = ops
            .iter()
            .fold(Rgba::from_bytes([pixel.r, pixel.g, pixel.b, pixel.a]), |color, op| {
                op.apply(color)
            });
        let [r, g, b, a] = color.to_bytes();
        *pixel = Pixel::new(r, g, b, a);
    }
}

/// Bake filters into a decoded image
///
/// Returns a new buffer; the source image is left untouched.
pub fn bake_image(image: &DynamicImage, filters: &FilterModel) -> RgbaImage {
    let mut baked = apply_stack(image.to_rgba8(), &compose_stack(filters));
    apply_channel_boosts(pixels_mut(&mut baked), filters);
    baked
}

/// Encode an RGBA buffer as JPEG
///
/// JPEG has no alpha, so transparency is composited onto black.
pub fn encode_jpeg(image: &RgbaImage, quality: u8) -> Result<Vec<u8>> {
    let flattened = RgbImage::from_fn(image.width(), image.height(), |x, y| {
        let [r, g, b, a] = image.get_pixel(x, y).0;
        let over_black = |c: u8| ((u32::from(c) * u32::from(a) + 127) / 255) as u8;
        image::Rgb([over_black(r), over_black(g), over_black(b)])
    });

    let mut buffer = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut buffer, quality.clamp(1, 100));
    encoder.encode_image(&flattened)?;
    Ok(buffer)
}

/// Decode encoded image bytes, bake, and re-encode as JPEG
pub fn bake_to_jpeg(bytes: &[u8], filters: &FilterModel, quality: u8) -> Result<Vec<u8>> {
    let image = image::load_from_memory(bytes)?;
    debug!(width = image.width(), height = image.height(), "Baking filters");
    let baked = bake_image(&image, filters);
    encode_jpeg(&baked, quality)
}

/// Blocking version of [`bake`]
///
/// Returns a JPEG data URL, or the original reference if it cannot be
/// read or decoded.
pub fn bake_blocking(reference: &ImageRef, filters: &FilterModel, quality: u8) -> ImageRef {
    let baked = reference
        .load_bytes()
        .and_then(|bytes| bake_to_jpeg(&bytes, filters, quality));

    match baked {
        Ok(jpeg) => ImageRef::from_jpeg_bytes(&jpeg),
        Err(e) => {
            warn!(reference = %reference.summary(), error = %e, "Bake failed, keeping original image");
            reference.clone()
        }
    }
}

/// Bake filters into the image behind `reference`
///
/// Never fails: an unreadable source comes back unchanged so a capture is
/// never blocked by the filter step.
pub async fn bake(reference: ImageRef, filters: FilterModel, quality: u8) -> ImageRef {
    // Spawn blocking because decoding and pixel work are CPU-bound
    let source = reference.clone();
    let result =
        tokio::task::spawn_blocking(move || bake_blocking(&source, &filters, quality)).await;

    match result {
        Ok(baked) => baked,
        Err(e) => {
            warn!(error = %e, "Bake task join error, keeping original image");
            reference
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::filters::FilterKey;
    use std::io::Cursor;

    fn gray_image(value: u8) -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            3,
            2,
            image::Rgba([value, value, value, 255]),
        ))
    }

    fn png_bytes(image: &DynamicImage) -> Vec<u8> {
        let mut bytes = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn test_boost_order_stacks_yellow() {
        let filters = FilterModel::default()
            .with(FilterKey::RedBoost, 50)
            .with(FilterKey::YellowBoost, 50);

        let boosted = boost_pixel(Pixel::new(100, 100, 100, 255), &ChannelBoost::from(&filters));

        // red: 100 + 127 = 227, then yellow: 227 + 127 -> 255
        // green: only yellow applies, 100 + 127 = 227
        assert_eq!(boosted, Pixel::new(255, 227, 100, 255));
    }

    #[test]
    fn test_boost_saturates() {
        let filters = FilterModel::default()
            .with(FilterKey::RedBoost, 100)
            .with(FilterKey::GreenBoost, 100)
            .with(FilterKey::BlueBoost, 100);

        let boosted = boost_pixel(Pixel::new(250, 0, 255, 7), &ChannelBoost::from(&filters));

        assert_eq!(boosted, Pixel::new(255, 255, 255, 7));
    }

    #[test]
    fn test_boost_amounts() {
        let boost = ChannelBoost::from(
            &FilterModel::default()
                .with(FilterKey::RedBoost, 1)
                .with(FilterKey::BlueBoost, 100),
        );
        assert_eq!(boost.red, 2);
        assert_eq!(boost.green, 0);
        assert_eq!(boost.blue, 255);
        assert!(ChannelBoost::from(&FilterModel::default()).is_identity());
    }

    #[test]
    fn test_apply_channel_boosts_over_buffer() {
        let mut image = RgbaImage::from_pixel(4, 4, image::Rgba([10, 20, 30, 40]));
        let filters = FilterModel::default().with(FilterKey::BlueBoost, 20);

        apply_channel_boosts(pixels_mut(&mut image), &filters);

        assert!(image.pixels().all(|p| p.0 == [10, 20, 81, 40]));
    }

    #[test]
    fn test_default_bake_is_lossless() {
        let source = DynamicImage::ImageRgba8(RgbaImage::from_fn(8, 5, |x, y| {
            image::Rgba([(x * 31) as u8, (y * 50) as u8, (x * y * 7) as u8, 200 + y as u8])
        }));

        let baked = bake_image(&source, &FilterModel::default());

        assert_eq!(baked, source.to_rgba8());
    }

    #[test]
    fn test_stack_then_boost() {
        // Full invert turns 100 into 155, then the red boost adds 25
        let filters = FilterModel::default()
            .with(FilterKey::Invert, 100)
            .with(FilterKey::RedBoost, 10);

        let baked = bake_image(&gray_image(100), &filters);

        assert!(baked.pixels().all(|p| p.0 == [180, 155, 155, 255]));
    }

    #[test]
    fn test_blur_softens_edges() {
        let source = DynamicImage::ImageRgba8(RgbaImage::from_fn(10, 3, |x, _| {
            let v = if x < 5 { 0 } else { 255 };
            image::Rgba([v, v, v, 255])
        }));

        let baked = bake_image(&source, &FilterModel::default().with(FilterKey::Blur, 2));

        assert_eq!(baked.dimensions(), (10, 3));
        assert!(baked.get_pixel(4, 1).0[0] > 0);
        assert!(baked.get_pixel(5, 1).0[0] < 255);
    }

    #[test]
    fn test_encode_flattens_alpha() {
        let image = RgbaImage::from_pixel(8, 8, image::Rgba([255, 255, 255, 128]));

        let jpeg = encode_jpeg(&image, 95).unwrap();
        let decoded = image::load_from_memory(&jpeg).unwrap().to_rgb8();

        let [r, _, _] = decoded.get_pixel(4, 4).0;
        assert!((125..=131).contains(&r), "got {}", r);
    }

    #[test]
    fn test_bake_to_jpeg_keeps_dimensions() {
        let jpeg = bake_to_jpeg(
            &png_bytes(&gray_image(90)),
            &FilterModel::default().with(FilterKey::Sepia, 80),
            DEFAULT_JPEG_QUALITY,
        )
        .unwrap();

        let decoded = image::load_from_memory(&jpeg).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (3, 2));
    }

    #[tokio::test]
    async fn test_bake_data_url() {
        let reference = ImageRef::from_jpeg_bytes(&png_bytes(&gray_image(60)));
        let filters = FilterModel::default().with(FilterKey::Brightness, 200);

        let baked = bake(reference.clone(), filters, DEFAULT_JPEG_QUALITY).await;

        assert_ne!(baked, reference);
        assert!(baked.as_str().starts_with("data:image/jpeg;base64,"));
        let decoded = image::load_from_memory(&baked.load_bytes().unwrap()).unwrap();
        let [r, _, _, _] = decoded.to_rgba8().get_pixel(1, 1).0;
        assert!((115..=125).contains(&r), "got {}", r);
    }

    #[tokio::test]
    async fn test_undecodable_reference_is_returned_unchanged() {
        let filters = FilterModel::default().with(FilterKey::Invert, 100);

        for reference in [
            ImageRef::new("data:image/jpeg;base64,AAAA"),
            ImageRef::new("/nonexistent/photo-booth/snapshot.jpg"),
            ImageRef::new("https://example.com/photo.jpg"),
        ] {
            let baked = bake(reference.clone(), filters, DEFAULT_JPEG_QUALITY).await;
            assert_eq!(baked, reference);
        }
    }
}
