// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use distance_leaderboard::config::Config;
use distance_leaderboard::routes::create_router;
use distance_leaderboard::AppState;
use std::sync::Arc;
use tempfile::TempDir;

pub const BOUNDARY: &str = "----leaderboard-test-boundary";

/// Create a test app backed by a scratch directory.
/// Returns the router, the shared state and the directory guard.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>, TempDir) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config = Config::test_default(dir.path());
    let state = Arc::new(AppState::open(config).expect("Failed to open app state"));

    (create_router(state.clone()), state, dir)
}

/// One submission as multipart form fields.
#[allow(dead_code)]
pub struct Submission<'a> {
    pub name: &'a str,
    pub gender: &'a str,
    pub bike: &'a str,
    pub treadmill: &'a str,
    pub rowing: &'a str,
    pub photo: Option<(&'a str, &'a [u8])>,
}

#[allow(dead_code)]
impl<'a> Submission<'a> {
    pub fn new(
        name: &'a str,
        gender: &'a str,
        bike: &'a str,
        treadmill: &'a str,
        rowing: &'a str,
    ) -> Self {
        Self {
            name,
            gender,
            bike,
            treadmill,
            rowing,
            photo: Some(("proof.jpg", b"not really a jpeg")),
        }
    }

    /// Encode as a `multipart/form-data` body using [`BOUNDARY`].
    pub fn to_multipart(&self) -> Vec<u8> {
        let mut body = Vec::new();
        for (field, value) in [
            ("name", self.name),
            ("gender", self.gender),
            ("bike", self.bike),
            ("treadmill", self.treadmill),
            ("rowing", self.rowing),
        ] {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"\r\n\r\n{value}\r\n"
                )
                .as_bytes(),
            );
        }
        if let Some((file_name, bytes)) = self.photo {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"photo\"; filename=\"{file_name}\"\r\nContent-Type: image/jpeg\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(bytes);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        body
    }
}
