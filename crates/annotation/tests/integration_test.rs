use cellnet_annotation::{xml_as_tensor, Annotation};
use cellnet_common::{ClassVocabulary, DatasetError};
use std::fs;
use tempfile::TempDir;

fn write_annotation(dir: &TempDir, name: &str, body: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, body).unwrap();
    path
}

fn vocab() -> ClassVocabulary {
    ClassVocabulary::new(
        vec!["cat".to_string(), "dog".to_string()],
        [("cat", "cat"), ("golden retriever", "dog")],
    )
}

#[test]
fn test_xml_file_to_tensor() {
    let dir = TempDir::new().unwrap();
    let path = write_annotation(
        &dir,
        "a.xml",
        r#"<annotation>
            <size><width>100</width><height>100</height></size>
            <object>
                <name>CAT</name>
                <bndbox><xmin>0</xmin><ymin>0</ymin><xmax>50</xmax><ymax>50</ymax></bndbox>
            </object>
        </annotation>"#,
    );

    let label = xml_as_tensor(&path, 10, &vocab()).unwrap();
    assert_eq!(label.dim(), (10, 10, 2));
    assert_eq!(label.sum(), 25.0);
    assert_eq!(label[[4, 4, 0]], 1.0);
    assert_eq!(label[[5, 5, 0]], 0.0);
}

#[test]
fn test_mapped_name_selects_plane() {
    let dir = TempDir::new().unwrap();
    let path = write_annotation(
        &dir,
        "b.xml",
        r#"<annotation>
            <size><width>64</width><height>32</height></size>
            <object>
                <name>Golden Retriever </name>
                <bndbox><xmin>32</xmin><ymin>0</ymin><xmax>64</xmax><ymax>32</ymax></bndbox>
            </object>
        </annotation>"#,
    );

    let label = xml_as_tensor(&path, 8, &vocab()).unwrap();
    // Right half of the dog plane, stretched from 64x32 to 8x8
    assert_eq!(label.sum(), 32.0);
    assert_eq!(label[[7, 4, 1]], 1.0);
    assert_eq!(label[[7, 3, 1]], 0.0);
}

#[test]
fn test_zero_width_file_fails() {
    let dir = TempDir::new().unwrap();
    let path = write_annotation(
        &dir,
        "c.xml",
        "<annotation><size><width>0</width><height>10</height></size></annotation>",
    );

    let err = xml_as_tensor(&path, 10, &vocab()).unwrap_err();
    assert!(matches!(err, DatasetError::InvalidAnnotation(_)));
}

#[test]
fn test_missing_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nope.xml");

    let err = Annotation::from_path(&path).unwrap_err();
    assert!(matches!(err, DatasetError::MissingFile(p) if p == path));
}

#[test]
fn test_malformed_file_names_path() {
    let dir = TempDir::new().unwrap();
    let path = write_annotation(&dir, "broken.xml", "<annotation>");

    let err = Annotation::from_path(&path).unwrap_err();
    match err {
        DatasetError::MalformedAnnotation(msg) => assert!(msg.contains("broken.xml")),
        other => panic!("unexpected error: {other:?}"),
    }
}
