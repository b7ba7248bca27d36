#![allow(dead_code)]

use modkit_resources::Resource;
use serde::Serialize;

#[derive(Serialize, Resource)]
#[resource("/items/{id}")]
struct Item {
    id: u64,
    #[resource(flatten)]
    expand: Option<String>,
}

fn main() {}
