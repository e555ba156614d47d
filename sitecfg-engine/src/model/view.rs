use serde::Serialize;
use sitecfg_protocol::StructureId;

/// Named filter over the elements offered to editors
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ElementView {
    pub id: StructureId,
    pub title: String,
    pub root_path: String,
    pub order: Option<i32>,
}
