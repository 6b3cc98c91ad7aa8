use crate::models::DecodedImage;
use anyhow::{Result, anyhow};
use chrono::Utc;
use flate2::Compression;
use flate2::write::ZlibEncoder;
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};
use std::io::Write;

const PRODUCER: &str = concat!("rust-pdf-converter ", env!("CARGO_PKG_VERSION"));

/// Assemble the images into one PDF, one page per image, in the given order.
///
/// Pages are sized to their image at 72 dpi, so one pixel maps to one point.
pub fn build_pdf(images: &[DecodedImage]) -> Result<Vec<u8>> {
    if images.is_empty() {
        return Err(anyhow!("Cannot build a PDF without pages"));
    }

    let mut doc = Document::with_version("1.4");
    let pages_id = doc.new_object_id();

    let mut kids = Vec::with_capacity(images.len());
    for image in images {
        let width = i64::from(image.width());
        let height = i64::from(image.height());

        let image_id = doc.add_object(image_xobject(image)?);

        let content = Content {
            operations: vec![
                Operation::new("q", vec![]),
                Operation::new(
                    "cm",
                    vec![
                        width.into(),
                        0.into(),
                        0.into(),
                        height.into(),
                        0.into(),
                        0.into(),
                    ],
                ),
                Operation::new("Do", vec![Object::Name(b"Im0".to_vec())]),
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
                    "Im0" => image_id,
                },
            },
        });
        kids.push(Object::Reference(page_id));
    }

    let page_count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count,
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    let info_id = doc.add_object(dictionary! {
        "Producer" => Object::string_literal(PRODUCER),
        "CreationDate" => Object::string_literal(Utc::now().format("D:%Y%m%d%H%M%SZ").to_string()),
    });
    doc.trailer.set("Root", catalog_id);
    doc.trailer.set("Info", info_id);

    let mut output = Vec::new();
    doc.save_to(&mut output)
        .map_err(|e| anyhow!("Failed to write PDF: {}", e))?;
    Ok(output)
}

/// Lossless image XObject holding the raw RGB samples
fn image_xobject(image: &DecodedImage) -> Result<Stream> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(image.bitmap.as_raw())?;
    let data = encoder.finish()?;

    let mut stream = Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => i64::from(image.width()),
            "Height" => i64::from(image.height()),
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8_i64,
            "Filter" => "FlateDecode",
        },
        data,
    );
    // Already deflated above
    stream.allows_compression = false;
    Ok(stream)
}
