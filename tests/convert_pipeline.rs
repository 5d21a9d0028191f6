use std::io::Read as _;

use flate2::read::GzDecoder;
use lottie_tgs::{
    ErrorKind, ParsedAnimation, Stage, TgsError, WRAPPER_ASSET_ID, parse, transcode,
};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

const LONG_PORTRAIT: &[u8] = include_bytes!("data/long_portrait.json");
const SHORT_SQUARE: &[u8] = include_bytes!("data/short_square.json");

fn parse_json(bytes: &[u8]) -> ParsedAnimation {
    parse(bytes, "application/json").unwrap()
}

fn convert_text(parsed: &ParsedAnimation) -> String {
    let bytes = transcode(&parsed.document).unwrap();
    let mut text = String::new();
    GzDecoder::new(bytes.as_slice())
        .read_to_string(&mut text)
        .unwrap();
    text
}

fn convert(parsed: &ParsedAnimation) -> Value {
    serde_json::from_str(&convert_text(parsed)).unwrap()
}

fn without(key: &str) -> Vec<u8> {
    let mut v: Value = serde_json::from_slice(SHORT_SQUARE).unwrap();
    v.as_object_mut().unwrap().remove(key);
    serde_json::to_vec(&v).unwrap()
}

#[test]
fn each_missing_field_is_named() {
    for (key, field) in [
        ("w", "width"),
        ("h", "height"),
        ("fr", "frameRate"),
        ("op", "outPoint"),
        ("ip", "inPoint"),
    ] {
        let err = parse(&without(key), "application/json").unwrap_err();
        match err {
            TgsError::MissingRequiredField { field: f, key: k } => {
                assert_eq!((f, k), (field, key));
            }
            other => panic!("expected missing {field}, got {other:?}"),
        }
    }
}

#[test]
fn wrong_type_counts_as_missing() {
    let err = parse(
        br#"{"w":512,"h":512,"fr":30,"ip":0,"op":null}"#,
        "application/json",
    )
    .unwrap_err();
    assert!(matches!(
        err,
        TgsError::MissingRequiredField { key: "op", .. }
    ));
}

#[test]
fn non_json_is_malformed() {
    let inputs: [&[u8]; 4] = [b"hello", b"", b"{\"w\":", b"{\"w\":1}}"];
    for input in inputs {
        let err = parse(input, "application/json").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedJson, "input {input:?}");
    }
}

#[test]
fn non_json_media_type_is_rejected() {
    let err = parse(SHORT_SQUARE, "image/gif").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnsupportedMediaType);
}

#[test]
fn zero_frame_rate_never_yields_a_duration() {
    let err = parse(
        br#"{"w":512,"h":512,"fr":0,"ip":0,"op":60}"#,
        "application/json",
    )
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidTiming);
}

#[test]
fn long_animations_are_clamped_to_three_seconds() {
    let parsed = parse_json(LONG_PORTRAIT);
    assert_eq!(parsed.metadata.duration_secs, 5.0);

    let out = convert(&parsed);
    assert_eq!(out["ip"], 0);
    assert_eq!(out["op"], 180);
    assert_eq!(out["fr"], 60);
    assert_eq!(out["layers"][0]["op"], 180);
}

#[test]
fn short_animations_keep_their_timing() {
    let parsed = parse(
        br#"{"w":512,"h":512,"fr":60,"ip":0,"op":120,"layers":[]}"#,
        "application/json",
    )
    .unwrap();
    let out = convert(&parsed);
    assert_eq!(out["op"], 120);
    assert_eq!(out["ip"], 0);
}

#[test]
fn wrapper_fits_longest_side() {
    let out = convert(&parse_json(LONG_PORTRAIT));
    let ks = &out["layers"][0]["ks"];
    let percent = 512.0 / 200.0 * 100.0;
    assert_eq!(ks["s"]["k"][0].as_f64(), Some(percent));
    assert_eq!(ks["s"]["k"][1].as_f64(), Some(percent));
    assert_eq!(ks["a"]["k"], json!([50, 100]));
    assert_eq!(ks["p"]["k"], json!([256, 256]));
    assert_eq!(ks["r"]["k"], 0);
    assert_eq!(ks["o"]["k"], 100);
    assert_eq!(out["layers"][0]["w"], 100);
    assert_eq!(out["layers"][0]["h"], 200);
    assert_eq!(out["layers"][0]["bm"], 0);
    assert_eq!((out["w"].clone(), out["h"].clone()), (json!(512), json!(512)));
}

#[test]
fn canvas_is_square_for_any_aspect() {
    for (w, h) in [(1920, 1080), (1, 4000), (512, 512), (33, 33)] {
        let src = format!(r#"{{"w":{w},"h":{h},"fr":30,"ip":0,"op":30,"layers":[]}}"#);
        let out = convert(&parse_json(src.as_bytes()));
        assert_eq!(out["w"], 512);
        assert_eq!(out["h"], 512);
    }
}

#[test]
fn transcoding_is_deterministic_and_leaves_source_alone() {
    let parsed = parse_json(LONG_PORTRAIT);
    let before = serde_json::to_string(&parsed.document).unwrap();

    let a = transcode(&parsed.document).unwrap();
    let b = transcode(&parsed.document).unwrap();
    assert_eq!(a, b);

    assert_eq!(serde_json::to_string(&parsed.document).unwrap(), before);
    assert_eq!(parsed.document.timeline().out_point, 300.0);
    assert_eq!(parsed.document.canvas().width, 100.0);
    assert!(parsed.document.contains("markers"));
}

#[test]
fn expressions_and_markers_are_stripped() {
    let out = convert(&parse_json(LONG_PORTRAIT));
    let obj = out.as_object().unwrap();
    assert!(!obj.contains_key("expressions"));
    assert!(!obj.contains_key("markers"));
    assert_eq!(obj["nm"], "long portrait");
}

#[test]
fn documents_without_stripped_fields_keep_their_extras() {
    let text = convert_text(&parse_json(SHORT_SQUARE));
    let out = parse_json(text.as_bytes());
    let keys: Vec<&str> = out.document.keys().collect();
    assert_eq!(
        keys,
        ["v", "fr", "ip", "op", "w", "h", "nm", "layers", "assets"]
    );
}

#[test]
fn original_layers_move_into_one_new_asset() {
    let source: Value = serde_json::from_slice(LONG_PORTRAIT).unwrap();
    let out = convert(&parse_json(LONG_PORTRAIT));

    let layers = out["layers"].as_array().unwrap();
    assert_eq!(layers.len(), 1);
    assert_eq!(layers[0]["ty"], 0);
    assert_eq!(layers[0]["refId"], WRAPPER_ASSET_ID);

    let assets = out["assets"].as_array().unwrap();
    assert_eq!(assets.len(), 2);
    assert_eq!(assets[0], source["assets"][0]);

    let added: Vec<&Value> = assets
        .iter()
        .filter(|a| a["id"] == WRAPPER_ASSET_ID)
        .collect();
    assert_eq!(added.len(), 1);
    assert_eq!(added[0]["layers"], source["layers"]);
}

#[test]
fn wrapper_starts_at_in_point() {
    let out = convert(&parse_json(SHORT_SQUARE));
    let wrapper = &out["layers"][0];
    assert_eq!(wrapper["ip"], 10);
    assert_eq!(wrapper["st"], 10);
    assert_eq!(wrapper["op"], 70);
    assert_eq!(wrapper["ks"]["s"]["k"], json!([100, 100]));
}

#[test]
fn reserved_asset_id_is_a_conflict_not_an_overwrite() {
    let parsed = parse(
        br#"{"w":64,"h":64,"fr":30,"ip":0,"op":30,"layers":[],"assets":[{"id":"tgs_wrapper_comp","layers":[]}]}"#,
        "application/json",
    )
    .unwrap();
    let err = transcode(&parsed.document).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AssetIdConflict);
}

#[test]
fn empty_canvas_fails_with_stage() {
    let parsed = parse(
        br#"{"w":0,"h":0,"fr":30,"ip":0,"op":30,"layers":[]}"#,
        "application/json",
    )
    .unwrap();
    match transcode(&parsed.document).unwrap_err() {
        TgsError::TranscodeFailure { stage, .. } => assert_eq!(stage, Stage::Precompose),
        other => panic!("unexpected error {other:?}"),
    }
}
