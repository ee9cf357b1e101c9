//! Library-level conversion tests against saved transcript fixtures

mod common;

use std::fs;

use common::{fixture_dir, fixture_path, transcript};
use transcript_md::config::Config;
use transcript_md::convert::{
    convert_file, extract_turns, ConvertError, ConvertOptions, DocumentOptions, DocumentStyle,
};

#[test]
fn test_fixture_full_document() {
    let dir = fixture_dir(&["hair-density.html"]);
    let input = dir.path().join("hair-density.html");

    let result = convert_file(&input, None, &ConvertOptions::default()).unwrap();
    assert_eq!(result.turns, 2);
    assert_eq!(result.title, "Hair Density");

    let md = fs::read_to_string(dir.path().join("hair-density.md")).unwrap();
    assert!(md.starts_with("# Hair Density\n\n## Turn 1\n\n### User\n"));
    assert!(md.contains("How do I measure **hair density** at home?"));
    assert!(md.contains("## Turn 2"));
    assert!(md.contains("#### Quick method\n\nPart your hair"));
    assert!(md.contains("strands in a *1 cm* square."));
    assert!(md.contains("1. Wash and dry\n2. Part in the **crown**"));
    assert!(md.contains("Use `strands / cm2` as the unit."));
    assert!(md.contains("```\ndensity = strands / area\n```"));
    assert!(!md.contains("```python"));
    assert!(md.ends_with("---\n"));
}

#[test]
fn test_fixture_drops_head_and_decorations() {
    let dir = fixture_dir(&["hair-density.html"]);
    let input = dir.path().join("hair-density.html");
    convert_file(&input, None, &ConvertOptions::default()).unwrap();

    let md = fs::read_to_string(dir.path().join("hair-density.md")).unwrap();
    assert!(!md.contains("analytics"));
    assert!(!md.contains("font-family"));
    assert!(!md.contains("Saved conversation"));
    assert!(!md.contains("M0 0"));
    assert!(!md.contains("\n\n\n"), "blank runs should be collapsed");
}

#[test]
fn test_fixture_turn_order() {
    let html = fs::read_to_string(fixture_path("hair-density.html")).unwrap();
    let turns = extract_turns(&html);
    assert_eq!(turns.len(), 2);
    assert!(turns[0].user().unwrap().contains("hair density"));
    assert!(turns[1].user().unwrap().contains("Show it as code"));
    assert!(turns[1].assistant().unwrap().starts_with("Here:"));
}

#[test]
fn test_fixture_without_conversation() {
    let dir = fixture_dir(&["no-conversation.html"]);
    let input = dir.path().join("no-conversation.html");

    let err = convert_file(&input, None, &ConvertOptions::default()).unwrap_err();
    assert!(matches!(err, ConvertError::NoConversationFound(_)));
    assert!(!dir.path().join("no-conversation.md").exists());
}

#[test]
fn test_simple_style_with_custom_labels() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("chat.html");
    fs::write(&input, transcript(2)).unwrap();

    let opts = ConvertOptions {
        document: DocumentOptions {
            style: DocumentStyle::Simple,
            user_label: "Me".to_string(),
            assistant_label: "Gemini".to_string(),
        },
        ..Default::default()
    };
    convert_file(&input, None, &opts).unwrap();

    let md = fs::read_to_string(dir.path().join("chat.md")).unwrap();
    assert_eq!(
        md,
        "**Me:**\nquestion 1\n\n**Gemini:**\nanswer 1\n\n---\n\n\
         **Me:**\nquestion 2\n\n**Gemini:**\nanswer 2\n\n---\n"
    );
}

#[test]
fn test_config_drives_custom_tags() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join(".transcript-md.toml"),
        "user_tag = \"human-turn\"\nmodel_tag = \"bot-turn\"\nassistant_label = \"Bot\"\n",
    )
    .unwrap();
    let input = dir.path().join("custom.html");
    fs::write(
        &input,
        "<human-turn>ping</human-turn><bot-turn>pong</bot-turn>",
    )
    .unwrap();

    let config = Config::load(dir.path());
    let opts = ConvertOptions {
        extractor: config.extractor().unwrap(),
        document: config.document_options(),
        ..Default::default()
    };
    let result = convert_file(&input, None, &opts).unwrap();
    assert_eq!(result.turns, 1);

    let md = fs::read_to_string(&result.output).unwrap();
    assert!(md.contains("### User\nping\n"));
    assert!(md.contains("### Bot\npong\n"));
}

#[test]
fn test_non_utf8_input_is_decoded_lossily() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("latin1.html");
    let mut bytes = b"<user-query>caf".to_vec();
    bytes.push(0xE9);
    bytes.extend_from_slice(b"</user-query><model-response>ok</model-response>");
    fs::write(&input, bytes).unwrap();

    let result = convert_file(&input, None, &ConvertOptions::default()).unwrap();
    let md = fs::read_to_string(&result.output).unwrap();
    assert!(md.contains("caf\u{FFFD}"));
}
