use serde_json::json;

use crate::common::{TestApp, routes};

/// Tiny but valid-enough PNG header for upload payloads; the server
/// trusts the declared MIME type, not the bytes.
fn png_bytes() -> Vec<u8> {
    let mut bytes = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
    bytes.extend_from_slice(&[0u8; 64]);
    bytes
}

mod upload {
    use super::*;

    #[tokio::test]
    async fn upload_requires_an_admin_token() {
        let app = TestApp::spawn().await;
        let regular = app.create_authenticated_user("bob", "securepass").await;

        let res = app
            .upload_with_token(
                routes::FILES_UPLOAD,
                "photo.png",
                png_bytes(),
                "image/png",
                &regular,
            )
            .await;
        assert_eq!(res.status, 403);

        let res = app
            .upload_with_token(
                routes::FILES_UPLOAD,
                "photo.png",
                png_bytes(),
                "image/png",
                "garbage-token",
            )
            .await;
        assert_eq!(res.status, 401);
    }

    #[tokio::test]
    async fn admin_can_upload_an_image() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin("admin").await;

        let res = app
            .upload_with_token(
                routes::FILES_UPLOAD,
                "product-shot.png",
                png_bytes(),
                "image/png",
                &admin,
            )
            .await;

        assert_eq!(res.status, 201, "upload failed: {}", res.text);
        assert_eq!(res.body["originalName"], "product-shot.png");
        assert_eq!(res.body["mimetype"], "image/png");
        assert_eq!(res.body["size"], png_bytes().len() as i64);

        let filename = res.body["filename"].as_str().unwrap();
        assert!(filename.ends_with(".png"));
        assert_ne!(filename, "product-shot.png");
    }

    #[tokio::test]
    async fn non_image_uploads_are_rejected() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin("admin").await;

        let res = app
            .upload_with_token(
                routes::FILES_UPLOAD,
                "notes.txt",
                b"just text".to_vec(),
                "text/plain",
                &admin,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["message"], "Only image files are allowed");
    }

    #[tokio::test]
    async fn oversized_uploads_are_rejected() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin("admin").await;

        let res = app
            .upload_with_token(
                routes::FILES_UPLOAD,
                "huge.png",
                vec![0u8; 5 * 1024 * 1024 + 1],
                "image/png",
                &admin,
            )
            .await;

        assert_eq!(res.status, 400);
    }
}

mod retrieval {
    use super::*;

    #[tokio::test]
    async fn uploaded_file_can_be_fetched_publicly() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin("admin").await;

        let uploaded = app
            .upload_with_token(
                routes::FILES_UPLOAD,
                "photo.png",
                png_bytes(),
                "image/png",
                &admin,
            )
            .await;
        assert_eq!(uploaded.status, 201);
        let filename = uploaded.body["filename"].as_str().unwrap();

        let res = app
            .client
            .get(format!("http://{}{}", app.addr, routes::file(filename)))
            .send()
            .await
            .expect("Failed to fetch file");

        assert_eq!(res.status().as_u16(), 200);
        assert_eq!(
            res.headers()
                .get("content-type")
                .and_then(|v| v.to_str().ok()),
            Some("image/png")
        );
        let bytes = res.bytes().await.expect("Failed to read body");
        assert_eq!(bytes.to_vec(), png_bytes());
    }

    #[tokio::test]
    async fn unknown_filename_is_a_404() {
        let app = TestApp::spawn().await;

        let res = app
            .get_without_token(&routes::file("no-such-file.png"))
            .await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["message"], "File not found");
    }

    #[tokio::test]
    async fn traversal_and_hidden_names_are_rejected() {
        let app = TestApp::spawn().await;

        // Percent-encoded ".." survives URL normalization.
        let res = app.get_without_token(&routes::file("%2E%2E")).await;
        assert_eq!(res.status, 400);

        let res = app.get_without_token(&routes::file(".env")).await;
        assert_eq!(res.status, 400);
    }

    #[tokio::test]
    async fn uploaded_image_can_back_a_catalog_item() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin("admin").await;

        let uploaded = app
            .upload_with_token(
                routes::FILES_UPLOAD,
                "tee.png",
                png_bytes(),
                "image/png",
                &admin,
            )
            .await;
        let filename = uploaded.body["filename"].as_str().unwrap();

        let res = app
            .post_with_token(
                routes::ITEMS,
                &json!({
                    "code": "TS-1",
                    "title": "Plain Tee",
                    "price": "19.90",
                    "stock": 5,
                    "type": "tshirt",
                    "size": "m",
                    "image": filename,
                }),
                &admin,
            )
            .await;

        assert_eq!(res.status, 201);
        assert_eq!(res.body["image"], *filename);
    }
}
