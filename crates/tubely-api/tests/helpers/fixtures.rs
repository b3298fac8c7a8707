use axum_test::multipart::{MultipartForm, Part};

/// Bytes standing in for an MP4; the fake media tool never parses them.
pub fn fake_mp4(len: usize) -> Vec<u8> {
    let mut data = b"\x00\x00\x00\x18ftypmp42".to_vec();
    data.resize(len.max(data.len()), 0xAB);
    data
}

/// Multipart form with one file part.
pub fn video_form(field: &str, data: Vec<u8>, mime: &str) -> MultipartForm {
    MultipartForm::new().add_part(
        field,
        Part::bytes(bytes::Bytes::from(data)).file_name("clip.mp4").mime_type(mime),
    )
}

pub fn mp4_form(data: Vec<u8>) -> MultipartForm {
    video_form("video", data, "video/mp4")
}
