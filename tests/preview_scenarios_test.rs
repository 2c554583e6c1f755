// End-to-end scenarios for the preview controller: load -> scale -> render -> export
use std::io::Cursor;

use base64::{Engine as _, engine::general_purpose};
use image::{DynamicImage, ImageBuffer, ImageFormat, Rgba};
use pixel_upscaler::logging::init_logging;
use pixel_upscaler::upscaler::{
    decoder, ExportFormat, ImageSource, MemorySink, PreviewController, SessionState, UpscaleConfig,
    UpscaleError,
};

const QUADRANTS: [[u8; 4]; 4] = [
    [255, 0, 0, 255],
    [0, 255, 0, 255],
    [0, 0, 255, 255],
    [255, 255, 0, 128],
];

fn two_by_two_png() -> Vec<u8> {
    let img = ImageBuffer::from_fn(2, 2, |x, y| Rgba(QUADRANTS[(y * 2 + x) as usize]));
    let mut cursor = Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(img)
        .write_to(&mut cursor, ImageFormat::Png)
        .expect("failed to encode test image");
    cursor.into_inner()
}

fn controller() -> PreviewController {
    init_logging("debug");
    PreviewController::new(UpscaleConfig::default()).expect("controller init failed")
}

#[tokio::test]
async fn two_by_two_at_factor_three_renders_blocks() {
    let controller = controller();
    controller
        .load_image(two_by_two_png(), "tiles.png")
        .await
        .expect("load should succeed");

    let preview = controller.set_scale_factor(3.0).expect("render should succeed");
    assert_eq!(preview.status_text(), "input: 2×2px / factor: 3 / output: 6×6px");
    assert_eq!(preview.output.dimensions(), (6, 6));
    assert_eq!(preview.source.as_ref().map(|s| s.dimensions()), Some((2, 2)));

    for dy in 0..6 {
        for dx in 0..6 {
            let expected = QUADRANTS[((dy / 3) * 2 + dx / 3) as usize];
            assert_eq!(preview.output.pixel_at(dx, dy), Some(expected), "pixel ({dx}, {dy})");
        }
    }
}

#[tokio::test]
async fn export_name_is_sanitized_and_lossless() {
    let controller = controller();
    controller
        .load_image(two_by_two_png(), "My Photo!.png")
        .await
        .expect("load should succeed");
    controller.set_scale_factor(4.0).unwrap();
    controller.set_format(ExportFormat::Png).unwrap();

    let exported = controller.export().await.expect("export should succeed");
    assert_eq!(exported.file_name, "My_Photo__x4.png");
    assert_eq!(exported.mime_type, "image/png");

    let decoded = decoder::decode(&exported.bytes).expect("exported png decodes");
    let rendered = controller.render().unwrap();
    assert_eq!(&decoded, rendered.output.as_ref());
}

#[tokio::test]
async fn lossy_export_keeps_dimensions() {
    let controller = controller();
    controller.load_image(two_by_two_png(), "tiles.png").await.unwrap();
    controller.set_scale_factor(5.0).unwrap();
    assert!(controller.set_format(ExportFormat::Jpeg).unwrap());
    controller.set_quality(0.5).unwrap();

    let exported = controller.export().await.expect("export should succeed");
    assert_eq!(exported.file_name, "tiles_x5.jpg");

    let decoded = decoder::decode(&exported.bytes).expect("exported jpeg decodes");
    assert_eq!(decoded.dimensions(), (10, 10));
}

#[tokio::test]
async fn export_without_image_fails_and_keeps_session() {
    let controller = controller();
    let before = controller.session().unwrap();

    let result = controller.export().await;
    assert!(matches!(result, Err(UpscaleError::NoImage)));

    let after = controller.session().unwrap();
    assert_eq!(after.state(), SessionState::Empty);
    assert_eq!(after.factor(), before.factor());
    assert_eq!(after.name_stem(), before.name_stem());
}

#[tokio::test]
async fn zero_factor_clamps_to_one() {
    let controller = controller();
    controller.load_image(two_by_two_png(), "tiles.png").await.unwrap();

    let preview = controller.set_scale_factor(0.0).expect("zero is clamped, not rejected");
    assert_eq!(preview.status.factor, 1);
    assert_eq!(preview.output.as_ref(), preview.source.as_deref().unwrap());

    assert_eq!(controller.set_scale_factor(2.7).unwrap().status.factor, 2);
    assert_eq!(controller.set_scale_factor(-3.0).unwrap().status.factor, 1);
}

#[tokio::test]
async fn scale_change_without_image_renders_empty_state() {
    let controller = controller();
    let preview = controller.set_scale_factor(4.0).unwrap();

    assert!(preview.source.is_none());
    assert!(preview.output.is_empty());
    assert_eq!(preview.status_text(), "input: 0×0px / factor: 4 / output: 0×0px");
}

#[tokio::test]
async fn pasted_data_url_funnels_into_load() {
    let controller = controller();
    let data_url = format!(
        "data:image/png;base64,{}",
        general_purpose::STANDARD.encode(two_by_two_png())
    );

    let preview = controller
        .load_source(ImageSource::Base64 {
            data: data_url,
            name: "clipboard image".into(),
        })
        .await
        .expect("paste should load");

    assert_eq!(preview.status_text(), "input: 2×2px / factor: 2 / output: 4×4px");
    assert_eq!(controller.session().unwrap().name_stem(), "clipboard_image");
}

#[tokio::test]
async fn export_to_sink_delivers_bytes_and_name() {
    let controller = controller();
    controller
        .load_source(ImageSource::Bytes {
            bytes: two_by_two_png(),
            name: "drop.png".into(),
        })
        .await
        .unwrap();
    controller.apply_preset(10).unwrap();

    let sink = MemorySink::new();
    let file_name = controller.export_to(&sink).await.expect("export to sink");
    assert_eq!(file_name, "drop_x10.png");

    let delivered = sink.take().unwrap();
    assert_eq!(delivered.len(), 1);
    let decoded = decoder::decode(&delivered[0].1).unwrap();
    assert_eq!(decoded.dimensions(), (20, 20));
}

#[tokio::test]
async fn corrupt_input_surfaces_decode_error() {
    let controller = controller();
    let mut png = two_by_two_png();
    png.truncate(png.len() - 20);

    let result = controller.load_image(png, "broken.png").await;
    assert!(matches!(result, Err(UpscaleError::Decode(_))));
    assert_eq!(controller.session().unwrap().state(), SessionState::Empty);
}

#[tokio::test]
async fn large_image_loads_even_when_factor_is_too_big() {
    let controller = controller();
    controller.apply_preset(10).unwrap();

    let img = ImageBuffer::from_pixel(1700, 1700, Rgba([12u8, 34, 56, 255]));
    let mut cursor = Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(img)
        .write_to(&mut cursor, ImageFormat::Png)
        .expect("failed to encode test image");

    let preview = controller
        .load_image(cursor.into_inner(), "poster.png")
        .await
        .expect("decodable image must load");

    assert!(preview.output.is_empty());
    assert!(matches!(preview.output_error, Some(UpscaleError::ResourceLimit(_))));
    assert_eq!(preview.status_text(), "input: 1700×1700px / factor: 10 / output: 17000×17000px");

    let session = controller.session().unwrap();
    assert_eq!(session.state(), SessionState::Loaded);
    assert_eq!(session.name_stem(), "poster");

    let lowered = controller.set_scale_factor(2.0).unwrap();
    assert_eq!(lowered.output.dimensions(), (3400, 3400));
    assert!(lowered.output_error.is_none());
}

#[tokio::test]
async fn every_entry_point_reports_the_same_error() {
    let zip = b"PK\x03\x04rest-of-archive".to_vec();
    let controller = controller();

    let direct = controller.load_image(zip.clone(), "a.zip").await;
    let via_bytes = controller
        .load_source(ImageSource::Bytes {
            bytes: zip.clone(),
            name: "a.zip".into(),
        })
        .await;
    let via_paste = controller
        .load_source(ImageSource::Base64 {
            data: general_purpose::STANDARD.encode(&zip),
            name: "a.zip".into(),
        })
        .await;

    assert!(matches!(direct, Err(UpscaleError::Decode(_))));
    assert_eq!(direct.unwrap_err(), via_bytes.unwrap_err());
    assert!(matches!(via_paste, Err(UpscaleError::Decode(_))));
}

#[tokio::test]
async fn size_cap_applies_to_direct_loads() {
    let png = two_by_two_png();
    let controller = PreviewController::new(UpscaleConfig {
        max_file_size: png.len() as u64 - 1,
        ..UpscaleConfig::default()
    })
    .unwrap();

    let direct = controller.load_image(png.clone(), "tiles.png").await;
    let via_bytes = controller
        .load_source(ImageSource::Bytes {
            bytes: png,
            name: "tiles.png".into(),
        })
        .await;

    assert!(matches!(direct, Err(UpscaleError::ResourceLimit(_))));
    assert!(matches!(via_bytes, Err(UpscaleError::ResourceLimit(_))));
    assert_eq!(controller.session().unwrap().state(), SessionState::Empty);
}
