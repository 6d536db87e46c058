use super::*;

fn sample_plan() -> MarkPlan {
    let mut plan = MarkPlan::empty(40, 30);
    plan.marks.push(Mark::Line {
        from: Point::new(1.0, 2.0),
        to: Point::new(3.456, 4.0),
        width: 2.994,
        color: Rgb8::new(10, 20, 30),
    });
    plan.marks.push(Mark::Circle {
        center: Point::new(20.0, 15.0),
        radius: 4.0,
        color: Rgb8::BLACK,
    });
    plan.marks.push(Mark::Quad {
        from: Point::new(0.0, 0.0),
        control: Point::new(5.0, 5.0),
        to: Point::new(10.0, 0.0),
        width: 1.0,
        color: Rgb8::BLACK,
    });
    plan
}

#[test]
fn one_primitive_per_mark_in_order() {
    let doc = emit_vector(&sample_plan());
    assert_eq!(doc.primitives().len(), 3);
    assert!(matches!(doc.primitives()[0], Primitive::Line { .. }));
    assert!(matches!(doc.primitives()[1], Primitive::Circle { .. }));
    assert!(matches!(doc.primitives()[2], Primitive::Path { .. }));
}

#[test]
fn svg_text_has_header_background_and_two_decimals() {
    let svg = emit_vector(&sample_plan()).to_svg_string();
    assert!(svg.starts_with("<?xml"));
    assert!(svg.contains(r#"<svg width="40" height="30""#));
    assert!(svg.contains(r#"<rect width="100%" height="100%" fill="white"/>"#));
    assert!(svg.contains(r#"x2="3.46""#));
    assert!(svg.contains(r#"stroke-width="2.99""#));
    assert!(svg.contains(r#"stroke="rgb(10, 20, 30)""#));
    assert!(svg.contains(r#"d="M0.00,0.00 Q5.00,5.00 10.00,0.00""#));
    assert!(svg.trim_end().ends_with("</svg>"));
}

#[test]
fn emitted_svg_parses() {
    let tree = emit_vector(&sample_plan()).to_tree().unwrap();
    assert_eq!(tree.size().width(), 40.0);
}

#[test]
fn rasterized_circle_is_inked() {
    let bmp = emit_vector(&sample_plan()).rasterize().unwrap();
    assert_eq!(bmp.dims(), (40, 30));
    assert_eq!(bmp.pixel(20, 15), Some([0, 0, 0, 255]));
    assert_eq!(bmp.pixel(35, 25), Some([255, 255, 255, 255]));
}

#[test]
fn background_can_be_dropped() {
    let doc = VectorDocument::new(4, 4).without_background();
    assert!(!doc.to_svg_string().contains("fill=\"white\""));
    let bmp = doc.rasterize().unwrap();
    assert!(bmp.pixels().chunks_exact(4).all(|px| px[3] == 0));
}
