use super::*;

#[test]
fn png_encode_then_decode_keeps_pixels() {
    let src = Bitmap::from_rgba8(2, 1, vec![10, 20, 30, 255, 200, 100, 50, 128]).unwrap();
    let png = encode_png(&src).unwrap();
    assert_eq!(&png[1..4], b"PNG");
    let back = decode_image(&png).unwrap();
    assert_eq!(back, src);
}

#[test]
fn decode_rejects_garbage() {
    assert!(decode_image(b"not an image").is_err());
}

#[test]
fn resize_changes_dims_and_keeps_flat_color() {
    let src = Bitmap::filled(8, 4, [90, 90, 90, 255]).unwrap();
    let out = resize_bitmap(&src, 4, 2).unwrap();
    assert_eq!(out.dims(), (4, 2));
    assert!(out.pixels().chunks_exact(4).all(|px| px == [90, 90, 90, 255]));
}

#[test]
fn resize_rejects_empty_target() {
    let src = Bitmap::white(2, 2).unwrap();
    assert!(resize_bitmap(&src, 0, 2).is_err());
}
