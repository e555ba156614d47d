//! One-shot configuration queries

use std::collections::BTreeMap;

use serde::Serialize;
use sitecfg_engine::{ElementView, Repository, ResolvedConfig};
use sitecfg_utils::Result;

use super::{print_json, Session};

#[derive(Debug, Serialize)]
struct Resolution<'a> {
    path: &'a str,
    #[serde(flatten)]
    config: ResolvedConfig,
}

#[derive(Debug, Serialize)]
struct DetailPageCheck<'a> {
    path: &'a str,
    detail_page: bool,
}

pub fn resolve(session: &Session, path: &str) -> Result<i32> {
    let facade = session.manager.lookup(path, session.project);
    print_json(&Resolution {
        path,
        config: facade.resolve_all(),
    })?;
    Ok(0)
}

pub fn detail_pages(session: &Session, type_name: &str) -> Result<i32> {
    let pages = session
        .manager
        .detail_pages_for_type(type_name, session.project);
    print_json(&pages)?;
    Ok(0)
}

pub fn folder_types(session: &Session) -> Result<i32> {
    let sorted: BTreeMap<String, String> = session
        .manager
        .folder_types(session.project)
        .into_iter()
        .collect();
    print_json(&sorted)?;
    Ok(0)
}

/// Exit code 0 for a detail page, 1 otherwise
pub fn is_detail_page(session: &Session, path: &str) -> Result<i32> {
    let resource = session.repository.read_resource_by_path(path)?;
    let detail_page = session.manager.is_detail_page(&resource, session.project);
    print_json(&DetailPageCheck { path, detail_page })?;
    Ok(if detail_page { 0 } else { 1 })
}

pub fn element_views(session: &Session) -> Result<i32> {
    let views: Vec<ElementView> = session.manager.element_views(session.project);
    print_json(&views)?;
    Ok(0)
}
