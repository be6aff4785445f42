use std::fs;

use imagestag_fx::{Bitmap, Error, ExportFormat, FilterParameters, GlitterShape, Renderer, Rgb};
use tempfile::tempdir;

#[test]
fn loads_yaml_parameter_file() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("look.yaml");
    fs::write(
        &path,
        "sepia: 40\nvignette: 25\nglitterShape: star\nlightLeakColor: { r: 10, g: 20, b: 30 }\n",
    )
    .unwrap();

    let params = FilterParameters::load(&path).unwrap();
    assert_eq!(params.sepia, 40.0);
    assert_eq!(params.vignette, 25.0);
    assert_eq!(params.glitter_shape, GlitterShape::Star);
    assert_eq!(params.light_leak_color, Rgb::new(10, 20, 30));
    assert_eq!(params.contrast, 100.0);
}

#[test]
fn loads_json_parameter_file() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("look.JSON");
    fs::write(&path, r#"{"rgbShift": 15, "oldFilm": 70, "flipVertical": true}"#).unwrap();

    let params = FilterParameters::load(&path).unwrap();
    assert_eq!(params.rgb_shift, 15.0);
    assert_eq!(params.old_film, 70.0);
    assert!(params.flip_vertical);
}

#[test]
fn malformed_parameters_are_reported() {
    let err = FilterParameters::from_yaml_str("blur: [not, a, number]").unwrap_err();
    assert!(matches!(err, Error::Parameters(_)));

    let err = FilterParameters::from_json_str("{").unwrap_err();
    assert!(matches!(err, Error::Parameters(_)));
}

#[test]
fn missing_parameter_file_is_io_error() {
    let tmp = tempdir().unwrap();
    let err = FilterParameters::load(tmp.path().join("absent.yaml")).unwrap_err();
    assert!(matches!(err, Error::Io(_)));
}

#[test]
fn export_writes_edited_image_file() {
    let tmp = tempdir().unwrap();
    let src = Bitmap::filled(8, 5, [200, 100, 50, 255]);
    let params = FilterParameters { grayscale: 100.0, ..Default::default() };
    let mut renderer = Renderer::seeded(0);

    for format in [ExportFormat::Png, ExportFormat::Jpeg, ExportFormat::Webp] {
        let path = renderer.export(&src, &params, format, tmp.path()).unwrap();
        assert_eq!(path, tmp.path().join(format!("edited-image.{}", format.extension())));

        let decoded = Bitmap::open(&path).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (8, 5));
    }

    let png = Bitmap::open(tmp.path().join("edited-image.png")).unwrap();
    assert_eq!(png, renderer.render(&src, &params).unwrap());
}

#[test]
fn export_into_missing_directory_fails() {
    let tmp = tempdir().unwrap();
    let src = Bitmap::filled(2, 2, [1, 2, 3, 255]);
    let err = Renderer::seeded(0)
        .export(&src, &FilterParameters::default(), ExportFormat::Png, tmp.path().join("nope"))
        .unwrap_err();
    assert!(matches!(err, Error::Io(_)));
}

#[test]
fn empty_source_encodes_and_exports_without_bytes() {
    let tmp = tempdir().unwrap();
    let src = Bitmap::new(0, 0);
    let params = FilterParameters { sepia: 50.0, ..Default::default() };
    let mut renderer = Renderer::seeded(0);

    for format in [ExportFormat::Png, ExportFormat::Jpeg, ExportFormat::Webp] {
        let bytes = renderer.render_and_encode(&src, &params, format).unwrap();
        assert!(bytes.is_empty(), "{format:?}");

        let path = renderer.export(&src, &params, format, tmp.path()).unwrap();
        assert_eq!(fs::metadata(&path).unwrap().len(), 0);
    }
}

#[test]
fn preset_file_resets_unnamed_fields() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("vintage.yaml");
    fs::write(&path, "sepia: 60\nvignette: 40\noldFilm: 30\n").unwrap();

    let params = FilterParameters::load(&path).unwrap();
    let expected = FilterParameters {
        sepia: 60.0,
        vignette: 40.0,
        old_film: 30.0,
        ..Default::default()
    };
    assert_eq!(params, expected);
}
