//! Sample glucose charts shipped inside the binary.

use include_dir::{include_dir, Dir};

use crate::models::ExampleInfo;

static EXAMPLE_DIR: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/assets/examples");

pub const EXAMPLE_ROUTE_PREFIX: &str = "/examples";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExampleImage {
    pub name: &'static str,
    pub title: &'static str,
    pub media_type: &'static str,
}

pub const EXAMPLE_IMAGES: &[ExampleImage] = &[
    ExampleImage { name: "stable-day.png", title: "Stable day", media_type: "image/png" },
    ExampleImage { name: "post-meal-spikes.png", title: "Post-meal spikes", media_type: "image/png" },
    ExampleImage { name: "nocturnal-lows.png", title: "Nocturnal lows", media_type: "image/png" },
];

impl ExampleImage {
    pub fn url(&self) -> String {
        format!("{}/{}", EXAMPLE_ROUTE_PREFIX, self.name)
    }

    pub fn bytes(&self) -> Option<&'static [u8]> {
        EXAMPLE_DIR.get_file(self.name).map(|file| file.contents())
    }
}

pub fn find(name: &str) -> Option<&'static ExampleImage> {
    EXAMPLE_IMAGES.iter().find(|example| example.name == name)
}

pub fn catalog() -> Vec<ExampleInfo> {
    EXAMPLE_IMAGES
        .iter()
        .map(|example| ExampleInfo {
            name: example.name.to_string(),
            title: example.title.to_string(),
            url: example.url(),
            media_type: example.media_type.to_string(),
        })
        .collect()
}
