#![allow(dead_code)]

use modkit_resources::Resource;
use serde::Serialize;

#[derive(Serialize, Resource)]
#[resource("/items/{id}")]
struct Item {
    #[resource(optional)]
    id: u64,
}

fn main() {}
