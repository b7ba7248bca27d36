use modkit_resources::Resource;
use serde::Serialize;

#[derive(Serialize, Resource)]
#[resource("/search")]
#[serde(rename_all = "camelCase")]
struct Search {
    #[serde(rename = "q")]
    query: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    tags: Vec<String>,
    #[resource(optional)]
    #[serde(with = "plain")]
    limit: u32,
    sort_order: Option<String>,
}

mod plain {
    pub fn serialize<S: serde::Serializer>(value: &u32, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u32(*value)
    }
}

fn main() {
    let template = Search::url_template().unwrap();
    assert_eq!(template.as_str(), "/search?q={q}&tags={tags?}&limit={limit?}&sortOrder={sortOrder?}");
}
