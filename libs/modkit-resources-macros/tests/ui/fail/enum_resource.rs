#![allow(dead_code)]

use modkit_resources::Resource;

#[derive(Resource)]
#[resource("/kinds")]
enum Kind {
    A,
}

fn main() {}
