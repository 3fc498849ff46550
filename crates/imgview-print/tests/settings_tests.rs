use imgview_print::*;

#[test]
fn test_default_settings_are_valid() {
    let settings = PrintSettings::default();
    assert!(settings.validate().is_ok());
    assert_eq!(settings.page_geometry(), PageGeometry::default());
    assert!(settings.keep_aspect);
    assert_eq!(settings.copies, 1);
    assert_eq!(PaperSize::default(), PaperSize::A4);
    assert_eq!(settings.paper_size, PaperSize::default());
}

#[test]
fn test_validation_catches_bad_values() {
    let settings = PrintSettings {
        margins: Margins::uniform(200.0),
        ..Default::default()
    };
    assert!(matches!(settings.validate(), Err(PrintError::Validation(_))));

    let settings = PrintSettings {
        copies: 0,
        ..Default::default()
    };
    assert!(settings.validate().is_err());

    let settings = PrintSettings {
        square_orientation: Orientation::AutoRotate,
        ..Default::default()
    };
    match settings.validate() {
        Err(PrintError::Config(msg)) => assert!(msg.contains("Square")),
        other => panic!("Expected Config error, got {:?}", other),
    }
}

#[test]
fn test_settings_feed_the_layout() {
    let settings = PrintSettings {
        ignore_margins: true,
        square_orientation: Orientation::Landscape,
        copies: 4,
        color_mode: ColorMode::Grayscale,
        ..Default::default()
    };
    assert!(settings.placement_options().ignore_margins);
    assert_eq!(
        settings.layout_config().square_orientation,
        Orientation::Landscape
    );
    let job = settings.job_settings("photo.jpg");
    assert_eq!(job.copies, 4);
    assert_eq!(job.color_mode, ColorMode::Grayscale);
    assert_eq!(job.document_name, "photo.jpg");
}

#[cfg(feature = "serde")]
#[tokio::test]
async fn test_save_and_load_settings() {
    use tempfile::NamedTempFile;

    let settings = PrintSettings {
        paper_size: PaperSize::Custom {
            width_mm: 100.0,
            height_mm: 150.0,
        },
        orientation: Orientation::Landscape,
        margins: Margins::uniform(5.0),
        centering: Centering::Horizontal,
        size_unit: Unit::Pica,
        resolution_unit: ResolutionUnit::PixelsPerCicero,
        effects: PrintEffects {
            brightness: 12.0,
            grayscale: true,
            ..Default::default()
        },
        copies: 3,
        remember_transform: true,
        ..Default::default()
    };

    let temp_file = NamedTempFile::new().unwrap();
    let path = temp_file.path();

    settings.save(path).await.unwrap();
    let loaded = PrintSettings::load(path).await.unwrap();
    assert_eq!(loaded, settings);
}

#[cfg(feature = "serde")]
#[tokio::test]
async fn test_partial_and_broken_files() {
    use tempfile::NamedTempFile;

    let temp_file = NamedTempFile::new().unwrap();
    let path = temp_file.path();

    tokio::fs::write(path, r#"{ "copies": 2 }"#).await.unwrap();
    let loaded = PrintSettings::load(path).await.unwrap();
    assert_eq!(loaded.copies, 2);
    assert_eq!(loaded.paper_size, PaperSize::A4);

    tokio::fs::write(path, "not json").await.unwrap();
    assert!(matches!(
        PrintSettings::load(path).await,
        Err(PrintError::Config(_))
    ));
}
