use super::*;

#[test]
fn from_rgba8_rejects_wrong_len() {
    assert!(Bitmap::from_rgba8(2, 2, vec![0; 15]).is_err());
    assert!(Bitmap::from_rgba8(2, 2, vec![0; 16]).is_ok());
}

#[test]
fn pixel_is_none_outside_bounds() {
    let bmp = Bitmap::filled(3, 2, [1, 2, 3, 4]).unwrap();
    assert_eq!(bmp.pixel(2, 1), Some([1, 2, 3, 4]));
    assert_eq!(bmp.pixel(3, 0), None);
    assert_eq!(bmp.pixel(0, -1), None);
}

#[test]
fn pixels_mut_does_not_touch_shared_copy() {
    let a = Bitmap::white(2, 2).unwrap();
    let mut b = a.clone();
    b.pixels_mut()[0] = 0;
    assert_eq!(a.pixels()[0], 255);
    assert_eq!(b.pixels()[0], 0);
}

#[test]
fn hex_form_is_lowercase() {
    assert_eq!(Rgb8::new(255, 0, 171).to_hex(), "#ff00ab");
}
