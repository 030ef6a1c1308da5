use rstest::{fixture, rstest};
use std::io::Cursor;
use std::sync::Arc;
use xmlshare::{
    ArrayRequest, DocumentError, DocumentReader, DocumentSource, ParseOptions, SharedDocument,
    TypedArray,
};

const MEASUREMENTS: &str = r#"<?xml version="1.0"?>
<measurements unit="m">
  <point x="0" y="3"/>
  <point x="1" y="4"/>
  <total>7</total>
</measurements>"#;

#[fixture]
fn shared() -> Arc<SharedDocument> {
    Arc::new(SharedDocument::from_bytes(MEASUREMENTS.as_bytes(), ParseOptions::default()).unwrap())
}

#[rstest]
#[case("<root/>", "root")]
#[case("<?xml version=\"1.0\"?><!-- lead --><doc><x/></doc>", "doc")]
#[case("\u{feff}<bom>1</bom>", "bom")]
#[case("<ns:item xmlns:ns=\"urn:x\"/>", "ns:item")]
#[case("<?xml version=\"1.0\"?><!DOCTYPE r [<!ENTITY e \"x\">]><r>&e;</r>", "r")]
fn parses_valid_input(#[case] input: &str, #[case] root: &str) {
    let doc = SharedDocument::from_bytes(input.as_bytes(), ParseOptions::default()).unwrap();
    assert_eq!(doc.share_count(), 0);
    assert_eq!(doc.handle().root_name(), Some(root));
}

#[rstest]
#[case("")]
#[case("<root>")]
#[case("<root><a></root>")]
#[case("<a/><b/>")]
#[case("just text")]
#[case("<r>&bogus;</r>")]
fn rejects_malformed_input(#[case] input: &str) {
    let err = SharedDocument::from_bytes(input.as_bytes(), ParseOptions::default()).unwrap_err();
    assert!(matches!(err, DocumentError::Parse(_)), "{input:?}: {err}");
    assert!(!err.is_usage_violation());
}

#[rstest]
#[case(1)]
#[case(3)]
#[case(16)]
fn balanced_shares_then_underflow(shared: Arc<SharedDocument>, #[case] n: usize) {
    for _ in 0..n {
        shared.acquire();
    }
    assert_eq!(shared.share_count(), n);
    for _ in 0..n {
        shared.release().unwrap();
    }
    assert_eq!(shared.share_count(), 0);

    let err = shared.release().unwrap_err();
    assert!(err.is_usage_violation());
    assert_eq!(shared.share_count(), 0);
}

#[rstest]
fn reads_from_path_and_stream() {
    let path = std::env::temp_dir().join(format!("xmlshare-{}.xml", std::process::id()));
    std::fs::write(&path, MEASUREMENTS).unwrap();
    let from_path = SharedDocument::from_path(&path, ParseOptions::default());
    std::fs::remove_file(&path).unwrap();
    let from_path = from_path.unwrap();

    let mut cursor = Cursor::new(MEASUREMENTS.as_bytes().to_vec());
    let from_stream = SharedDocument::from_reader(&mut cursor, ParseOptions::default()).unwrap();
    assert_eq!(cursor.position() as usize, MEASUREMENTS.len());
    assert_eq!(
        from_path.tree().node_count(),
        from_stream.tree().node_count()
    );
}

#[rstest]
fn expands_internal_entities() {
    let doc = SharedDocument::from_bytes(
        br#"<?xml version="1.0"?><!DOCTYPE r [<!ENTITY e "x">]><r>&e;</r>"#,
        ParseOptions::default(),
    )
    .unwrap();
    assert_eq!(doc.tree().string_value(doc.tree().root_element_id()), "x");
}

#[rstest]
fn missing_path_is_parse_failure() {
    let source = DocumentSource::path("/nonexistent/xmlshare/input.xml");
    let err = SharedDocument::from_source(source, ParseOptions::default()).unwrap_err();
    assert!(matches!(err, DocumentError::Parse(_)));
}

#[rstest]
fn readers_hold_shares(shared: Arc<SharedDocument>) {
    let readers: Vec<_> = (0..4).map(|_| DocumentReader::new(Arc::clone(&shared))).collect();
    assert_eq!(shared.share_count(), 4);
    drop(readers);
    assert_eq!(shared.share_count(), 0);
}

#[rstest]
fn handle_survives_document(shared: Arc<SharedDocument>) {
    let reader = DocumentReader::new(Arc::clone(&shared));
    let handle = shared.handle();
    drop(reader);
    drop(shared);
    assert_eq!(handle.root_name(), Some("measurements"));
}

#[rstest]
fn extracts_arrays_for_math(shared: Arc<SharedDocument>) {
    let reader = DocumentReader::new(shared);
    let x: TypedArray<f64> = reader.extract(&ArrayRequest::attribute("x", "point", "x")).unwrap();
    let y: TypedArray<f64> = reader.extract(&ArrayRequest::attribute("y", "point", "y")).unwrap();
    assert_eq!(y.norm2(), Ok(25.0));

    let sum = (&x + &y).unwrap();
    assert_eq!(sum.as_slice(), &[3.0, 5.0]);

    let total: TypedArray<i32> = reader.extract(&ArrayRequest::text("total", "total")).unwrap();
    assert_eq!(total.as_slice(), &[7]);
}
