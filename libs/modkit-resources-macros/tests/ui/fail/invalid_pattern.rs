#![allow(dead_code)]

use modkit_resources::Resource;

#[derive(Resource)]
#[resource("/items/{id")]
struct Item {
    id: u64,
}

fn main() {}
