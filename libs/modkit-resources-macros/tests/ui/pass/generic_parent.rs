use modkit_resources::Resource;
use serde::Serialize;

#[derive(Serialize, Resource)]
#[resource(path = "/tenants/{tenant}")]
struct Tenant<T: Serialize> {
    tenant: T,
}

#[derive(Serialize, Resource)]
#[resource("/jobs/{id...}")]
struct Job<T: Serialize> {
    #[resource(parent)]
    parent: Tenant<T>,
    id: Vec<String>,
    #[serde(skip)]
    _local: (),
}

fn main() {
    let template = Job::<u64>::url_template().unwrap();
    assert_eq!(template.as_str(), "/tenants/{tenant}/jobs/{id...}");
}
