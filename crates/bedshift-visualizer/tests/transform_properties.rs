//! Property tests for the offset transform engine

use bedshift_core::Offset;
use bedshift_visualizer::{Document, GcodeLine, OffsetTransform, Token};
use proptest::prelude::*;

fn thousandths() -> impl Strategy<Value = f64> {
    (-200_000i64..200_000).prop_map(|k| k as f64 / 1000.0)
}

fn motion_line() -> impl Strategy<Value = String> {
    (
        prop_oneof![Just("G0"), Just("G1")],
        proptest::option::of(thousandths()),
        proptest::option::of(thousandths()),
        proptest::option::of(1u32..5000),
        proptest::option::of((-50_000i64..50_000).prop_map(|k| k as f64 / 1000.0)),
        proptest::option::of(0u32..100_000),
    )
        .prop_map(|(code, x, y, f, z, e)| {
            let mut line = code.to_string();
            if let Some(x) = x {
                line.push_str(&format!(" X{x:.3}"));
            }
            if let Some(y) = y {
                line.push_str(&format!(" Y{y:.3}"));
            }
            if let Some(z) = z {
                line.push_str(&format!(" Z{z}"));
            }
            if let Some(f) = f {
                line.push_str(&format!(" F{f}"));
            }
            if let Some(e) = e {
                line.push_str(&format!(" E{}.{:05}", e / 100_000, e % 100_000));
            }
            line
        })
}

fn passthrough_line() -> impl Strategy<Value = String> {
    "[;M][A-Za-z0-9 .]{0,20}"
}

fn program() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(prop_oneof![motion_line(), passthrough_line()], 0..40)
}

fn strip_header(text: &str) -> &str {
    match text.find('\n') {
        Some(i) => &text[i + 1..],
        None => "",
    }
}

proptest! {
    #[test]
    fn line_count_is_preserved_plus_header(lines in program(), dx in thousandths(), dy in thousandths()) {
        let text = lines.iter().map(|l| format!("{l}\n")).collect::<String>();
        let out = OffsetTransform::new(Offset::new(dx, dy)).transform_str(&text).unwrap();
        prop_assert_eq!(out.lines().count(), lines.len() + 1);
    }

    #[test]
    fn round_trip_restores_coordinates(lines in program(), dx in thousandths(), dy in thousandths()) {
        let text = lines.iter().map(|l| format!("{l}\n")).collect::<String>();
        let offset = Offset::new(dx, dy);
        let forward = OffsetTransform::new(offset).transform_str(&text).unwrap();
        let back = OffsetTransform::new(offset.inverse())
            .transform_str(strip_header(&forward))
            .unwrap();

        let original = Document::parse(&text).unwrap();
        let restored = Document::parse(strip_header(&back)).unwrap();
        prop_assert_eq!(original.len(), restored.len());

        for (a, b) in original.lines().iter().zip(restored.lines()) {
            match (a, b) {
                (GcodeLine::Motion(a), GcodeLine::Motion(b)) => {
                    prop_assert_eq!(a.tokens().len(), b.tokens().len());
                    for (ta, tb) in a.tokens().iter().zip(b.tokens()) {
                        match (ta, tb) {
                            (Token::Word(wa), Token::Word(wb)) => prop_assert_eq!(wa, wb),
                            (
                                Token::Coordinate { axis: xa, .. },
                                Token::Coordinate { axis: xb, .. },
                            ) => prop_assert_eq!(xa, xb),
                            _ => prop_assert!(false, "token kind changed: {:?} vs {:?}", ta, tb),
                        }
                    }
                    if let (Some(ax), Some(bx)) = (a.x(), b.x()) {
                        prop_assert!((ax - bx).abs() <= 0.0005);
                    }
                    if let (Some(ay), Some(by)) = (a.y(), b.y()) {
                        prop_assert!((ay - by).abs() <= 0.0005);
                    }
                    prop_assert_eq!(a.x().is_some(), b.x().is_some());
                    prop_assert_eq!(a.y().is_some(), b.y().is_some());
                }
                (GcodeLine::Passthrough(a), GcodeLine::Passthrough(b)) => prop_assert_eq!(a, b),
                _ => prop_assert!(false, "line kind changed"),
            }
        }
    }

    #[test]
    fn passthrough_lines_are_byte_identical(lines in prop::collection::vec(passthrough_line(), 1..20), dx in thousandths()) {
        let text = lines.join("\r\n");
        let out = OffsetTransform::new(Offset::new(dx, -dx)).transform_str(&text).unwrap();
        prop_assert_eq!(strip_header(&out), text.as_str());
    }
}

#[test]
fn non_coordinate_tokens_survive_unchanged() {
    let out = OffsetTransform::new(Offset::new(1.0, 1.0))
        .transform_str("G1 X0 Y0 Z0.2 E1.23456 F1800\n")
        .unwrap();
    assert!(out.ends_with("G1 X1.000 Y1.000 Z0.2 E1.23456 F1800\n"));
}
