use modkit_resources::Resource;
use serde::Serialize;

#[derive(Serialize, Resource)]
#[resource("/health")]
struct Health;

fn main() {
    let template = Health::url_template().unwrap();
    assert_eq!(template.as_str(), "/health");
}
