#![allow(dead_code)]

use modkit_resources::Resource;
use serde::Serialize;

#[derive(Serialize, Resource)]
#[resource("/root")]
struct Root;

#[derive(Serialize, Resource)]
#[resource("/items/{id}")]
struct Item {
    #[resource(parent)]
    first: Root,
    #[resource(parent)]
    second: Root,
    id: u64,
}

fn main() {}
