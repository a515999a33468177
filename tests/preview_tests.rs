use pagecraft::{
    build_preview_document, parse_build_response, ApiError, FileKind, FilePayload,
    MemoryHistoryStore, ProjectFile, Session, NO_PREVIEW_DOCUMENT,
};
use pretty_assertions::assert_eq;

fn file(name: &str, kind: FileKind, content: &str) -> ProjectFile {
    ProjectFile::new(name, kind, content)
}

// --- Preview compilation ---

#[test]
fn link_tag_becomes_inline_style() {
    let files = vec![
        file("index.html", FileKind::Html, "<link rel=\"stylesheet\" href=\"style.css\">"),
        file("style.css", FileKind::Css, "body{color:red}"),
    ];
    let doc = build_preview_document(&files);
    assert_eq!(doc, "<style>\nbody{color:red}\n</style>");
    assert!(!doc.contains("style.css"), "no remaining reference to the sheet");
}

#[test]
fn stylesheet_imports_and_assets_are_fully_flattened() {
    let files = vec![
        file(
            "index.html",
            FileKind::Html,
            "<head><link rel=\"stylesheet\" href=\"css/main.css\"></head>",
        ),
        file(
            "css/main.css",
            FileKind::Css,
            "@import \"theme.css\";\n.hero{background:url(../img/hero.png)}",
        ),
        file("css/theme.css", FileKind::Css, ":root{--accent:#f59e0b}"),
        file("img/hero.png", FileKind::Image, "data:image/png;base64,HERO"),
    ];
    let doc = build_preview_document(&files);
    assert_eq!(
        doc,
        "<head><style>\n:root{--accent:#f59e0b}\n.hero{background:url(data:image/png;base64,HERO)}\n</style></head>"
    );
}

#[test]
fn script_src_is_inlined_for_javascript_files() {
    let files = vec![
        file(
            "index.html",
            FileKind::Html,
            "<body><script src=\"js/app.js\"></script></body>",
        ),
        file("js/app.js", FileKind::Javascript, "console.log('hi');"),
    ];
    assert_eq!(
        build_preview_document(&files),
        "<body><script>console.log('hi');</script></body>"
    );
}

#[test]
fn img_src_and_poster_are_replaced_with_data_uris() {
    let files = vec![
        file(
            "index.html",
            FileKind::Html,
            "<img src=\"logo.png\"><video poster=\"still.png\" src=\"clip.mp4\"></video>",
        ),
        file("logo.png", FileKind::Image, "data:image/png;base64,LOGO"),
        file("still.png", FileKind::Image, "data:image/png;base64,STILL"),
    ];
    let doc = build_preview_document(&files);
    assert!(doc.contains("<img src=\"data:image/png;base64,LOGO\">"));
    assert!(doc.contains("poster=\"data:image/png;base64,STILL\""));
    assert!(doc.contains("src=\"clip.mp4\""), "unresolved src survives");
}

#[test]
fn srcset_resolves_candidates_independently() {
    let files = vec![
        file("index.html", FileKind::Html, "<img srcset=\"a.png 1x, b.png 2x\">"),
        file("a.png", FileKind::Image, "data:image/png;base64,AAAA"),
    ];
    assert_eq!(
        build_preview_document(&files),
        "<img srcset=\"data:image/png;base64,AAAA 1x, b.png 2x\">"
    );
}

#[test]
fn project_without_html_yields_placeholder() {
    let files = vec![file("style.css", FileKind::Css, "body{}")];
    assert_eq!(build_preview_document(&files), NO_PREVIEW_DOCUMENT);
    assert_eq!(build_preview_document(&[]), NO_PREVIEW_DOCUMENT);
}

#[test]
fn external_references_are_never_touched() {
    let doc = concat!(
        "<link rel=\"stylesheet\" href=\"https://fonts.example/roboto.css\">",
        "<img src=\"//cdn.example/logo.png\">",
        "<img src=\"data:image/png;base64,ALREADY\">"
    );
    let files = vec![file("index.html", FileKind::Html, doc)];
    assert_eq!(build_preview_document(&files), doc);
}

#[test]
fn preview_is_idempotent_across_rebuilds() {
    let files = vec![
        file("index.html", FileKind::Html, "<link rel=\"stylesheet\" href=\"style.css\">"),
        file("style.css", FileKind::Css, "body{margin:0}"),
    ];
    assert_eq!(build_preview_document(&files), build_preview_document(&files));
}

// --- End-to-end session flows ---

#[test]
fn builder_round_trip_updates_project_and_preview() {
    let mut session = Session::new(MemoryHistoryStore::default());
    let request = session.begin_prompt("build a landing page").unwrap();
    assert!(request.files.is_empty());

    let body = concat!(
        "{\"files\":[",
        "{\"name\":\"index.html\",\"content\":\"<link rel=\\\"stylesheet\\\" href=\\\"style.css\\\">\"},",
        "{\"name\":\"style.css\",\"content\":\"h1{color:blue}\"}",
        "],\"message\":\"Here is your landing page.\"}"
    );
    let response = parse_build_response(200, Some("application/json"), body).unwrap();
    session.apply_response(&response);

    assert_eq!(session.project().files().len(), 2);
    assert_eq!(
        build_preview_document(session.project().files()),
        "<style>\nh1{color:blue}\n</style>"
    );

    // A follow-up that deletes the sheet leaves the link unresolved, which
    // the compiler preserves as-is.
    session.begin_prompt("drop the styling").unwrap();
    session.apply_response(&pagecraft::BuildResponse {
        files: vec![FilePayload::new("style.css", "DELETE")],
        message: "Removed the stylesheet.".into(),
    });
    assert_eq!(
        build_preview_document(session.project().files()),
        "<link rel=\"stylesheet\" href=\"style.css\">"
    );
}

#[test]
fn gateway_timeout_surfaces_the_friendly_message() {
    let error = parse_build_response(504, Some("text/html"), "<html>timeout</html>").unwrap_err();
    assert_eq!(error, ApiError::GatewayTimeout);
    assert!(error.to_string().contains("breaking your request into smaller steps"));
}

fn fixture_zip(entries: &[(&str, &[u8])]) -> std::io::Cursor<Vec<u8>> {
    use std::io::Write;

    let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
    for (name, bytes) in entries {
        writer
            .start_file(*name, zip::write::SimpleFileOptions::default())
            .unwrap();
        writer.write_all(bytes).unwrap();
    }
    let mut cursor = writer.finish().unwrap();
    cursor.set_position(0);
    cursor
}

#[test]
fn archive_import_feeds_the_preview() {
    let cursor = fixture_zip(&[
        ("index.html", b"<link rel=\"stylesheet\" href=\"css/style.css\">".as_slice()),
        ("css/style.css", b"p{padding:4px}".as_slice()),
    ]);

    let files = pagecraft::import_archive(cursor).unwrap();
    let mut session = Session::new(MemoryHistoryStore::default());
    session.load_archive("site.zip", files);

    assert_eq!(session.project().open_tabs(), ["index.html"]);
    assert_eq!(
        build_preview_document(session.project().files()),
        "<style>\np{padding:4px}\n</style>"
    );
}
