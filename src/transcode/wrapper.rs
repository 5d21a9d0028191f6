use std::borrow::Cow;

use serde_json::value::RawValue;

use crate::foundation::core::{CanvasSize, Timeline};

/// Lottie layer type for a precomposition reference.
const LAYER_TYPE_PRECOMP: u8 = 0;
/// Lottie blend mode "normal".
const BLEND_MODE_NORMAL: u8 = 0;

/// JSON number that is written as an integer whenever it has no fractional part.
///
/// Keeps synthetic values such as `512` or `256` looking the way authoring tools write them.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Num(pub f64);

impl serde::Serialize for Num {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        const MAX_EXACT: f64 = 9_007_199_254_740_992.0; // 2^53
        let v = self.0;
        if !v.is_finite() {
            // serde_json would silently write `null`.
            return Err(serde::ser::Error::custom(format!(
                "{v} is not a finite number"
            )));
        }
        if v.fract() == 0.0 && v.abs() <= MAX_EXACT {
            serializer.serialize_i64(v as i64)
        } else {
            serializer.serialize_f64(v)
        }
    }
}

/// Non-animated Lottie property: `{"a":0,"k":value}`.
#[derive(serde::Serialize)]
struct Static<T> {
    a: u8,
    k: T,
}

impl<T> Static<T> {
    fn new(k: T) -> Self {
        Self { a: 0, k }
    }
}

#[derive(serde::Serialize)]
struct LayerTransform {
    o: Static<Num>,
    r: Static<Num>,
    p: Static<[Num; 2]>,
    a: Static<[Num; 2]>,
    s: Static<[Num; 2]>,
}

/// The single top-level layer of a sticker: re-centers and re-scales the original composition,
/// which it references as a precomposition asset.
#[derive(serde::Serialize)]
pub(crate) struct WrapperLayer<'a> {
    ddd: u8,
    ind: u32,
    ty: u8,
    nm: &'a str,
    #[serde(rename = "refId")]
    ref_id: &'a str,
    sr: Num,
    ks: LayerTransform,
    ao: u8,
    w: Num,
    h: Num,
    ip: Num,
    op: Num,
    st: Num,
    bm: u8,
}

impl<'a> WrapperLayer<'a> {
    /// Layer placing `source` centered on a `target`-pixel square canvas, scaled by `scale`.
    pub(crate) fn new(
        name: &'a str,
        asset_id: &'a str,
        source: CanvasSize,
        timeline: Timeline,
        target: f64,
        scale: f64,
    ) -> Self {
        let [cx, cy] = source.center();
        let percent = Num(scale * 100.0);
        Self {
            ddd: 0,
            ind: 1,
            ty: LAYER_TYPE_PRECOMP,
            nm: name,
            ref_id: asset_id,
            sr: Num(1.0),
            ks: LayerTransform {
                o: Static::new(Num(100.0)),
                r: Static::new(Num(0.0)),
                p: Static::new([Num(target / 2.0), Num(target / 2.0)]),
                a: Static::new([Num(cx), Num(cy)]),
                s: Static::new([percent, percent]),
            },
            ao: 0,
            w: Num(source.width),
            h: Num(source.height),
            ip: Num(timeline.in_point),
            op: Num(timeline.out_point),
            st: Num(timeline.in_point),
            bm: BLEND_MODE_NORMAL,
        }
    }
}

/// Precomposition asset whose body is the original top-level layer sequence, copied verbatim.
#[derive(serde::Serialize)]
pub(crate) struct PrecompAsset<'a> {
    pub(crate) id: &'a str,
    pub(crate) layers: &'a RawValue,
}

#[derive(serde::Deserialize)]
struct AssetHeader<'a> {
    #[serde(borrow, default)]
    id: Option<Cow<'a, str>>,
}

/// String id of an asset record. Records without one, or that are not objects, yield `None`.
pub(crate) fn asset_id(raw: &RawValue) -> Option<Cow<'_, str>> {
    serde_json::from_str::<AssetHeader<'_>>(raw.get()).ok()?.id
}
