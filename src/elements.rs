//! Image helpers and custom `genpdf` elements used by the PDF renderer.
//!
//! Besides the scaled image element this module hosts [`PageCounter`] and [`PageMarker`], which
//! together record the page on which a wrapped element is first drawn so section bookmarks can
//! point at it.

use std::cell::Cell;
use std::io::Cursor;
use std::path::Path;
use std::rc::Rc;

use image::{DynamicImage, GenericImageView, ImageOutputFormat};

use genpdf::elements::Image;
use genpdf::error::{Context as _, Error};
use genpdf::style::Style;
use genpdf::{render, Element, Mm, RenderResult, Scale, Size};

const DEFAULT_IMAGE_DPI: f64 = 300.0;
const MM_PER_INCH: f64 = 25.4;

pub(crate) fn mm_from_f64(value: f64) -> Mm {
    Mm::from(printpdf::Mm(value))
}

fn mm_to_f64(value: Mm) -> f64 {
    let mm: printpdf::Mm = value.into();
    mm.0
}

fn estimated_image_size(image: &DynamicImage, dpi: f64) -> Size {
    let (px_width, px_height) = image.dimensions();
    let width_mm = MM_PER_INCH * (px_width as f64) / dpi;
    let height_mm = MM_PER_INCH * (px_height as f64) / dpi;
    Size::new(mm_from_f64(width_mm), mm_from_f64(height_mm))
}

/// Loads an image from in-memory bytes using the [`image`] crate with descriptive errors.
pub fn decode_image_from_bytes(bytes: impl AsRef<[u8]>) -> Result<DynamicImage, Error> {
    image::load_from_memory(bytes.as_ref()).context("Failed to decode image from provided bytes")
}

/// Loads an image from the given path using the [`image`] crate with descriptive errors.
pub fn decode_image_from_path(path: impl AsRef<Path>) -> Result<DynamicImage, Error> {
    let path = path.as_ref();
    let reader = image::io::Reader::open(path)
        .with_context(|| format!("Failed to open image file {}", path.display()))?;
    reader
        .with_guessed_format()
        .context("Unable to determine image format")?
        .decode()
        .with_context(|| format!("Failed to decode image file {}", path.display()))
}

/// Re-encodes an image as PNG, the only raster format embedded in generated documents.
pub fn encode_png(image: &DynamicImage) -> Result<Vec<u8>, Error> {
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), ImageOutputFormat::Png)
        .context("Failed to encode image as PNG")?;
    Ok(bytes)
}

fn image_from_dynamic(image: DynamicImage) -> Result<(Image, Size), Error> {
    let size = estimated_image_size(&image, DEFAULT_IMAGE_DPI);
    // PDF images cannot carry an alpha channel.
    let opaque = DynamicImage::ImageRgb8(image.to_rgb8());
    let image = Image::from_dynamic_image(opaque)?;
    Ok((image, size))
}

/// An image element rescaled to a fixed width while keeping its aspect ratio.
pub struct ScaledImage {
    image: Image,
    natural_size: Size,
    width: Mm,
}

impl ScaledImage {
    /// Decodes `bytes` and scales the image to `width`.
    pub fn from_bytes(bytes: impl AsRef<[u8]>, width: Mm) -> Result<Self, Error> {
        let (image, natural_size) = image_from_dynamic(decode_image_from_bytes(bytes)?)?;
        Ok(Self {
            image,
            natural_size,
            width,
        })
    }

    /// Scale factor from the 300 dpi natural size to the requested width.
    fn scale(&self) -> f64 {
        let natural = mm_to_f64(self.natural_size.width);
        if natural > f64::EPSILON {
            mm_to_f64(self.width) / natural
        } else {
            1.0
        }
    }
}

impl Element for ScaledImage {
    fn render(
        &mut self,
        context: &genpdf::Context,
        area: render::Area<'_>,
        style: Style,
    ) -> Result<RenderResult, Error> {
        let scale = self.scale();
        self.image.set_scale(Scale::new(scale, scale));
        self.image.render(context, area, style)
    }
}

/// Shared 1-based number of the page currently being laid out.
///
/// The page decorator advances it; elements read it while rendering.
#[derive(Clone, Debug, Default)]
pub struct PageCounter(Rc<Cell<usize>>);

impl PageCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of the current page, `0` before the first page is decorated.
    pub fn current(&self) -> usize {
        self.0.get()
    }

    pub fn advance(&self) -> usize {
        let next = self.0.get() + 1;
        self.0.set(next);
        next
    }
}

/// Handle holding the page recorded by a [`PageMarker`].
#[derive(Clone, Debug, Default)]
pub struct PageSlot(Rc<Cell<Option<usize>>>);

impl PageSlot {
    pub fn page(&self) -> Option<usize> {
        self.0.get()
    }
}

/// Wraps an element and records the page on which it first draws something.
pub struct PageMarker<E: Element> {
    inner: E,
    pages: PageCounter,
    slot: PageSlot,
}

impl<E: Element> PageMarker<E> {
    pub fn new(inner: E, pages: PageCounter) -> Self {
        Self {
            inner,
            pages,
            slot: PageSlot::default(),
        }
    }

    /// Returns a handle that observes the recorded page after rendering.
    pub fn slot(&self) -> PageSlot {
        self.slot.clone()
    }
}

impl<E: Element> Element for PageMarker<E> {
    fn render(
        &mut self,
        context: &genpdf::Context,
        area: render::Area<'_>,
        style: Style,
    ) -> Result<RenderResult, Error> {
        let result = self.inner.render(context, area, style)?;
        if self.slot.page().is_none() && mm_to_f64(result.size.height) > 0.0 {
            self.slot.0.set(Some(self.pages.current()));
        }
        Ok(result)
    }
}
