use pdf_launcher::resolver::FileTarget;
use pdf_launcher::settings::Settings;
use tempfile::tempdir;

#[test]
fn missing_file_yields_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("settings.json");
    let settings = Settings::load(path.to_str().unwrap()).unwrap();

    assert_eq!(settings.document_extension, "pdf");
    assert_eq!(settings.sibling_extension, "tex");
    assert_eq!(settings.max_path_len, 290);
    assert_eq!(
        settings.default_viewer,
        FileTarget {
            verb: "Open".into(),
            handler: "Acrobat.Document.DC".into()
        }
    );
    assert_eq!(settings.alternate_viewer.verb, "open");
    assert!(!settings.debug_logging);
}

#[test]
fn partial_file_keeps_other_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("settings.json");
    std::fs::write(
        &path,
        r#"{ "debug_logging": true, "alternate_viewer": { "verb": "open", "handler": "SumatraPDF" } }"#,
    )
    .unwrap();

    let settings = Settings::load(path.to_str().unwrap()).unwrap();

    assert!(settings.debug_logging);
    assert_eq!(settings.alternate_viewer.handler, "SumatraPDF");
    assert_eq!(settings.default_viewer.handler, "Acrobat.Document.DC");
    assert_eq!(settings.sibling_extension, "tex");
}

#[test]
fn malformed_file_is_an_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("settings.json");
    std::fs::write(&path, "{ not json").unwrap();

    assert!(Settings::load(path.to_str().unwrap()).is_err());
}

#[test]
fn unusable_extensions_are_replaced() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("settings.json");
    std::fs::write(&path, r#"{ "document_extension": "pdfx", "sibling_extension": "" }"#).unwrap();

    let settings = Settings::load(path.to_str().unwrap()).unwrap();

    assert_eq!(settings.document_extension, "pdf");
    assert_eq!(settings.sibling_extension, "tex");
}

#[test]
fn save_then_load_keeps_applications() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("settings.json");
    let mut settings = Settings::default();
    settings
        .applications
        .insert("MiKTeX.pdf.2.9".into(), "okular".into());
    settings.log_file = Some("launcher.log".into());
    settings.save(path.to_str().unwrap()).unwrap();

    let loaded = Settings::load(path.to_str().unwrap()).unwrap();
    assert_eq!(loaded.applications.get("MiKTeX.pdf.2.9").map(String::as_str), Some("okular"));
    assert_eq!(loaded.log_file.as_deref(), Some("launcher.log"));
}

#[test]
fn unreadable_path_is_an_error() {
    let dir = tempdir().unwrap();

    let err = Settings::load(dir.path().to_str().unwrap()).unwrap_err();

    assert!(format!("{err:#}").contains("reading settings"));
}

#[test]
fn parse_error_names_the_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("settings.json");
    std::fs::write(&path, "[1, 2").unwrap();

    let err = Settings::load(path.to_str().unwrap()).unwrap_err();

    assert!(err.to_string().contains("settings.json"));
}
