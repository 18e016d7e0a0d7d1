//! Image-per-page PDF generation

use crate::error::{AssemblyError, Result};
use crate::types::PageImage;
use image::codecs::jpeg::JpegDecoder;
use image::{ColorType, ImageDecoder, ImageFormat};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use std::io::Cursor;
use std::path::Path;
use tracing::{debug, info, instrument};

/// Write `images` to `output`, one page per image in list order
///
/// Each page's media box equals the image's pixel size; nothing is scaled or
/// cropped. JPEG data is embedded as-is, other formats are stored as
/// flate-compressed RGB.
#[instrument(skip(images), fields(pages = images.len()))]
pub fn generate(images: &[PageImage], output: &Path) -> Result<()> {
    let mut doc = generate_document(images)?;
    doc.save(output)?;
    info!("Wrote {} page(s) to {}", images.len(), output.display());
    Ok(())
}

/// Build the in-memory document for `images`
pub fn generate_document(images: &[PageImage]) -> Result<Document> {
    if images.is_empty() {
        return Err(AssemblyError::NoPages.into());
    }

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let mut kids: Vec<Object> = Vec::with_capacity(images.len());

    for (i, image) in images.iter().enumerate() {
        let width = i64::from(image.width());
        let height = i64::from(image.height());
        let name = format!("Im{}", i);

        let xobject = encode_image(image)?;
        let image_id = doc.add_object(xobject);

        let content = Content {
            operations: vec![
                Operation::new("q", vec![]),
                Operation::new(
                    "cm",
                    vec![width.into(), 0.into(), 0.into(), height.into(), 0.into(), 0.into()],
                ),
                Operation::new("Do", vec![Object::Name(name.as_bytes().to_vec())]),
                Operation::new("Q", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));

        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), width.into(), height.into()],
            "Contents" => content_id,
            "Resources" => dictionary! {
                "XObject" => dictionary! {
                    name.as_str() => image_id,
                },
            },
        });
        kids.push(page_id.into());
        debug!("Page {} sized {}x{}", i + 1, width, height);
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    Ok(doc)
}

fn encode_image(image: &PageImage) -> Result<Stream> {
    let bytes = std::fs::read(image.path())?;
    let format = image::guess_format(&bytes)?;

    if format == ImageFormat::Jpeg {
        let decoder = JpegDecoder::new(Cursor::new(&bytes))?;
        let (width, height) = decoder.dimensions();
        let color_space = match decoder.color_type() {
            ColorType::L8 | ColorType::L16 => "DeviceGray",
            _ => "DeviceRGB",
        };
        let mut stream = Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => i64::from(width),
                "Height" => i64::from(height),
                "ColorSpace" => color_space,
                "BitsPerComponent" => 8_i64,
                "Filter" => "DCTDecode",
            },
            bytes,
        );
        stream.allows_compression = false;
        return Ok(stream);
    }

    let rgb = image::load_from_memory_with_format(&bytes, format)?.to_rgb8();
    let (width, height) = rgb.dimensions();
    Ok(Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => i64::from(width),
            "Height" => i64::from(height),
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8_i64,
        },
        rgb.into_raw(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn write_png(dir: &Path, name: &str, width: u32, height: u32) -> PageImage {
        let path = dir.join(name);
        RgbImage::from_pixel(width, height, Rgb([200, 10, 10]))
            .save(&path)
            .unwrap();
        PageImage::probe(path).unwrap()
    }

    fn media_box(doc: &Document, page: lopdf::ObjectId) -> Vec<i64> {
        doc.get_dictionary(page)
            .unwrap()
            .get(b"MediaBox")
            .unwrap()
            .as_array()
            .unwrap()
            .iter()
            .map(|o| o.as_i64().unwrap())
            .collect()
    }

    #[test]
    fn test_generate_one_page_per_image() {
        let dir = tempfile::tempdir().unwrap();
        let images = vec![
            write_png(dir.path(), "a.png", 40, 60),
            write_png(dir.path(), "b.png", 80, 20),
        ];
        let out = dir.path().join("out.pdf");
        generate(&images, &out).unwrap();

        let doc = Document::load(&out).unwrap();
        let pages = doc.get_pages();
        assert_eq!(pages.len(), 2);
        assert_eq!(media_box(&doc, pages[&1]), vec![0, 0, 40, 60]);
        assert_eq!(media_box(&doc, pages[&2]), vec![0, 0, 80, 20]);
    }

    #[test]
    fn test_generate_embeds_jpeg_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("p.jpg");
        RgbImage::from_pixel(30, 30, Rgb([1, 2, 3])).save(&path).unwrap();
        let raw = std::fs::read(&path).unwrap();

        let doc = generate_document(&[PageImage::probe(&path).unwrap()]).unwrap();
        let embedded = doc
            .objects
            .values()
            .filter_map(|o| o.as_stream().ok())
            .find(|s| s.dict.get(b"Filter").and_then(Object::as_name).ok() == Some(&b"DCTDecode"[..]))
            .expect("jpeg xobject");
        assert_eq!(embedded.content, raw);
    }

    #[test]
    fn test_generate_rejects_empty_list() {
        let err = generate_document(&[]).unwrap_err();
        assert!(err.to_string().contains("No pages"));
    }

    #[test]
    fn test_generate_missing_image_fails() {
        let dir = tempfile::tempdir().unwrap();
        let missing = PageImage::new(dir.path().join("nope.png"), 10, 10);
        assert!(generate_document(&[missing]).is_err());
    }
}
