use std::sync::Arc;
use std::time::Duration;

use sitecfg_protocol::type_names;
use tokio::runtime::Handle;

use super::*;
use crate::repository::{to_repository_events, FsRepository, InMemoryRepository, Repository};

const A_CONFIG: &str = r#"
[[resource_type]]
type_name = "x"

[[property]]
name = "p1"
"#;

const AB_CONFIG: &str = r#"
[[resource_type]]
type_name = "x"
disabled = true

[[property]]
name = "p2"
"#;

fn cache_for(repo: &Arc<InMemoryRepository>) -> Arc<ConfigCache> {
    ConfigCache::new(
        "test",
        ConfigReader::new(repo.clone()),
        CacheSettings::fast(),
        Handle::current(),
    )
}

fn nested_repo() -> Arc<InMemoryRepository> {
    let repo = Arc::new(InMemoryRepository::new());
    repo.put_file("/a/.content/.config", type_names::SITEMAP_CONFIG, A_CONFIG);
    repo.put_file("/a/b/.content/.config", type_names::SITEMAP_CONFIG, AB_CONFIG);
    repo
}

fn type_names_at(cache: &ConfigCache, path: &str) -> Vec<String> {
    cache
        .lookup(path)
        .resource_types()
        .into_iter()
        .map(|t| t.type_name)
        .collect()
}

#[tokio::test]
async fn test_uninitialized_lookup_is_empty() {
    let repo = nested_repo();
    let cache = cache_for(&repo);

    assert_eq!(cache.status(), CacheStatus::Uninitialized);
    let facade = cache.lookup("/a/b/c");
    assert!(facade.is_module_config());
    assert!(facade.resource_types().is_empty());
    assert!(cache.folder_types().is_empty());
}

#[tokio::test]
async fn test_initialize_failure_then_recovery() {
    let repo = Arc::new(InMemoryRepository::without_types());
    let cache = cache_for(&repo);

    assert!(cache.initialize().is_err());
    assert_eq!(cache.status(), CacheStatus::Uninitialized);
    assert!(!cache.has_snapshot());
    assert!(cache.lookup("/a").resource_types().is_empty());

    for t in [
        type_names::SITEMAP_CONFIG,
        type_names::MASTER_CONFIG,
        type_names::MODULE_CONFIG,
        type_names::ELEMENT_VIEW,
    ] {
        repo.register_type(t);
    }
    repo.put_file("/a/.content/.config", type_names::SITEMAP_CONFIG, A_CONFIG);

    cache.initialize().unwrap();
    assert_eq!(cache.status(), CacheStatus::Initialized);
    assert_eq!(type_names_at(&cache, "/a/page"), vec!["x"]);
    cache.cancel();
}

#[tokio::test]
async fn test_nested_lookup() {
    let repo = nested_repo();
    let cache = cache_for(&repo);
    cache.initialize().unwrap();

    let facade = cache.lookup("/a/b/c");
    assert_eq!(facade.base_path(), Some("/a/b"));
    assert!(type_names_at(&cache, "/a/b/c").is_empty());
    let props: Vec<String> = facade.properties().into_iter().map(|p| p.name).collect();
    assert!(props.contains(&"p1".to_string()));
    assert!(props.contains(&"p2".to_string()));
    cache.cancel();
}

#[tokio::test]
async fn test_idle_cycle_keeps_snapshot() {
    let repo = nested_repo();
    let cache = cache_for(&repo);
    cache.initialize().unwrap();

    let before = cache.state();
    assert_eq!(cache.perform_update(), UpdateOutcome::Idle);
    assert!(Arc::ptr_eq(&before, &cache.state()));
    cache.cancel();
}

#[tokio::test]
async fn test_incremental_update_is_copy_on_write() {
    let repo = nested_repo();
    let cache = cache_for(&repo);
    cache.initialize().unwrap();
    let before = cache.state();

    let changed = repo.put_file(
        "/a/.content/.config",
        type_names::SITEMAP_CONFIG,
        "[[resource_type]]\ntype_name = \"y\"",
    );
    assert_eq!(
        cache.handle_changed_resource(&changed),
        Some(DirtyId::Resource(changed.id))
    );
    assert_eq!(
        cache.perform_update(),
        UpdateOutcome::Incremental { updated: 1 }
    );

    assert_eq!(type_names_at(&cache, "/a/page"), vec!["y"]);
    let old: Vec<String> = before
        .lookup("/a/page")
        .resource_types()
        .into_iter()
        .map(|t| t.type_name)
        .collect();
    assert_eq!(old, vec!["x"]);
    cache.cancel();
}

#[tokio::test]
async fn test_deleted_config_falls_back_to_parent() {
    let repo = nested_repo();
    let cache = cache_for(&repo);
    cache.initialize().unwrap();

    for deleted in repo.delete("/a/b/.content/.config") {
        cache.handle_changed_resource(&deleted);
    }
    cache.perform_update();

    assert_eq!(cache.lookup("/a/b/c").base_path(), Some("/a"));
    assert_eq!(type_names_at(&cache, "/a/b/c"), vec!["x"]);
    cache.cancel();
}

#[tokio::test]
async fn test_broken_document_is_removed() {
    let repo = nested_repo();
    let cache = cache_for(&repo);
    cache.initialize().unwrap();

    let broken = repo.put_file("/a/b/.content/.config", type_names::SITEMAP_CONFIG, "[[");
    cache.handle_changed_resource(&broken);
    cache.perform_update();

    assert_eq!(cache.lookup("/a/b/c").base_path(), Some("/a"));
    cache.cancel();
}

#[tokio::test]
async fn test_module_change_reloads_modules() {
    let repo = nested_repo();
    let cache = cache_for(&repo);
    cache.initialize().unwrap();
    assert!(!cache.folder_types().contains_key("/shared/articles/"));

    let module = repo.put_file(
        "/system/modules/news/.config",
        type_names::MODULE_CONFIG,
        "[[resource_type]]\ntype_name = \"article\"\nfolder_path = \"/shared/articles\"",
    );
    assert_eq!(
        cache.handle_changed_resource(&module),
        Some(DirtyId::ReloadModules)
    );
    cache.perform_update();

    assert_eq!(
        cache.folder_types().get("/shared/articles/").map(String::as_str),
        Some("article")
    );
    assert!(type_names_at(&cache, "/elsewhere").contains(&"article".to_string()));

    let folder = repo.ensure_folder("/shared/articles/");
    assert_eq!(
        cache.handle_changed_resource(&folder),
        Some(DirtyId::RecomputeFolderTypes)
    );
    cache.cancel();
}

#[tokio::test]
async fn test_unrelated_resource_is_ignored() {
    let repo = nested_repo();
    let cache = cache_for(&repo);
    cache.initialize().unwrap();

    let page = repo.put_file("/a/index.page", type_names::CONTAINER_PAGE, "");
    assert_eq!(cache.handle_changed_resource(&page), None);
    assert_eq!(cache.pending(), 0);
    cache.cancel();
}

#[tokio::test]
async fn test_element_views_reload() {
    let repo = nested_repo();
    let cache = cache_for(&repo);
    cache.initialize().unwrap();
    assert!(cache.element_views().is_empty());

    repo.put_file("/views/b.view", type_names::ELEMENT_VIEW, "title = \"B\"");
    let first = repo.put_file("/views/a.view", type_names::ELEMENT_VIEW, "title = \"A\"\norder = 1");
    assert_eq!(
        cache.handle_changed_resource(&first),
        Some(DirtyId::ReloadElementViews)
    );
    cache.perform_update();

    let titles: Vec<String> = cache.element_views().into_iter().map(|v| v.title).collect();
    assert_eq!(titles, vec!["A", "B"]);
    cache.cancel();
}

#[tokio::test]
async fn test_mark_all_dirty_rereads_everything() {
    let repo = nested_repo();
    let cache = cache_for(&repo);
    cache.initialize().unwrap();

    // Changed without notification
    repo.put_file("/a/.content/.config", type_names::SITEMAP_CONFIG, "");
    cache.mark_all_dirty();
    assert_eq!(cache.perform_update(), UpdateOutcome::Full);
    assert!(type_names_at(&cache, "/a/page").is_empty());
    cache.cancel();
}

fn detail_repo() -> Arc<InMemoryRepository> {
    let repo = Arc::new(InMemoryRepository::new());
    repo.ensure_folder("/a/news/");
    repo.put_file("/a/events/index.page", type_names::CONTAINER_PAGE, "");
    repo.put_file("/a/other/x.page", type_names::CONTAINER_PAGE, "");
    repo.put_file(
        "/a/.content/.config",
        type_names::SITEMAP_CONFIG,
        r#"
[[detail_page]]
type_name = "article"
page = "/a/news/"

[[detail_page]]
type_name = "event"
page = "/a/events/index.page"
"#,
    );
    repo
}

#[tokio::test]
async fn test_is_detail_page() {
    let repo = detail_repo();
    let cache = cache_for(&repo);
    cache.initialize().unwrap();

    let news_item = repo.put_file("/a/news/item.page", type_names::CONTAINER_PAGE, "");
    assert!(cache.is_detail_page(&news_item));
    let news_folder = repo.read_resource_by_path("/a/news/").unwrap();
    assert!(cache.is_detail_page(&news_folder));

    // Page file inside the folder configured as detail page
    let event = repo.put_file("/a/events/e1.page", type_names::CONTAINER_PAGE, "");
    assert!(cache.is_detail_page(&event));

    let other = repo.read_resource_by_path("/a/other/x.page").unwrap();
    assert!(!cache.is_detail_page(&other));

    let orphan = Resource::file(
        StructureId::new_v4(),
        "/missing/q.page",
        type_names::CONTAINER_PAGE,
    );
    assert!(!cache.is_detail_page(&orphan));
    cache.cancel();
}

#[tokio::test]
async fn test_detail_pages_follow_moves() {
    let repo = detail_repo();
    let cache = cache_for(&repo);
    cache.initialize().unwrap();

    assert_eq!(cache.detail_pages_for_type("event"), vec!["/a/events/index.page"]);
    assert!(cache.detail_pages_for_type("unknown").is_empty());

    let (source, _) = repo
        .move_file("/a/events/index.page", "/a/calendar/index.page")
        .unwrap();
    cache.evict_path(source.id);
    assert_eq!(
        cache.detail_pages_for_type("event"),
        vec!["/a/calendar/index.page"]
    );
    cache.cancel();
}

#[tokio::test]
async fn test_master_created_after_referencing_sitemap() {
    let repo = Arc::new(InMemoryRepository::new());
    repo.put_file(
        "/a/.content/.config",
        type_names::SITEMAP_CONFIG,
        "master_config = \"/shared/m.masterconfig\"",
    );
    let cache = cache_for(&repo);
    cache.initialize().unwrap();
    assert_eq!(cache.lookup("/a/page").sequence().records().len(), 2);

    let master = repo.put_file(
        "/shared/m.masterconfig",
        type_names::MASTER_CONFIG,
        "[[property]]\nname = \"from_master\"",
    );
    cache.handle_changed_resource(&master);
    assert_eq!(cache.perform_update(), UpdateOutcome::Incremental { updated: 1 });

    let facade = cache.lookup("/a/page");
    assert_eq!(facade.sequence().records().len(), 3);
    assert!(facade.properties().iter().any(|p| p.name == "from_master"));
    cache.cancel();
}

#[tokio::test]
async fn test_detail_page_created_after_config() {
    let repo = Arc::new(InMemoryRepository::new());
    repo.put_file(
        "/a/.content/.config",
        type_names::SITEMAP_CONFIG,
        "[[detail_page]]\ntype_name = \"article\"\npage = \"/a/news/\"",
    );
    let cache = cache_for(&repo);
    cache.initialize().unwrap();
    assert!(cache.detail_pages_for_type("article").is_empty());

    let news = repo.ensure_folder("/a/news/");
    cache.handle_changed_resource(&news);
    assert_eq!(cache.pending(), 1);
    cache.perform_update();
    assert_eq!(cache.detail_pages_for_type("article"), vec!["/a/news/"]);

    // Edits to the page itself leave the configuration alone
    cache.handle_changed_resource(&news);
    assert_eq!(cache.pending(), 0);
    cache.cancel();
}

#[tokio::test]
async fn test_missing_detail_target_is_remembered() {
    let repo = detail_repo();
    let cache = cache_for(&repo);
    cache.initialize().unwrap();

    let news = repo.read_resource_by_path("/a/news/").unwrap();
    repo.delete("/a/news/");
    assert_eq!(cache.path_for_id(news.id), None);
    assert!(cache.paths.get(&news.id).is_some_and(|entry| entry.is_none()));
    assert_eq!(cache.detail_pages_for_type("article"), vec!["/a/news/"]);

    cache.handle_changed_resource(&news);
    assert!(cache.paths.get(&news.id).is_none());
    cache.cancel();
}

#[tokio::test]
async fn test_renamed_site_directory_moves_configuration() {
    let dir = tempfile::TempDir::new().unwrap();
    std::fs::create_dir_all(dir.path().join("a/.content")).unwrap();
    std::fs::write(dir.path().join("a/.content/.config"), A_CONFIG).unwrap();
    let repo = Arc::new(FsRepository::new(dir.path()).unwrap());
    let cache = ConfigCache::new(
        "test",
        ConfigReader::new(repo.clone()),
        CacheSettings::fast(),
        Handle::current(),
    );
    cache.initialize().unwrap();
    assert_eq!(cache.lookup("/a/page").base_path(), Some("/a"));

    std::fs::rename(dir.path().join("a"), dir.path().join("z")).unwrap();
    let rename = notify::Event {
        kind: notify::EventKind::Modify(notify::event::ModifyKind::Name(
            notify::event::RenameMode::Both,
        )),
        paths: vec![dir.path().join("a"), dir.path().join("z")],
        attrs: Default::default(),
    };
    for event in to_repository_events(&repo, &rename) {
        for resource in event.resources() {
            cache.handle_changed_resource(resource);
        }
    }
    assert_eq!(cache.perform_update(), UpdateOutcome::Incremental { updated: 2 });

    assert_eq!(cache.lookup("/a/page").base_path(), None);
    assert_eq!(cache.lookup("/z/page").base_path(), Some("/z"));
    assert_eq!(type_names_at(&cache, "/z/page"), vec!["x"]);
    cache.cancel();
}

#[tokio::test]
async fn test_scheduled_refresh_applies_changes() {
    let repo = nested_repo();
    let cache = cache_for(&repo);
    cache.initialize().unwrap();

    for deleted in repo.delete("/a/b/.content/.config") {
        cache.handle_changed_resource(&deleted);
    }
    tokio::time::timeout(Duration::from_secs(5), cache.wait_for_update())
        .await
        .expect("refresh cycle did not complete");

    assert_eq!(cache.lookup("/a/b/c").base_path(), Some("/a"));
    assert!(cache.update_count() >= 1);
    cache.cancel();
}

#[tokio::test]
async fn test_reinitialize_replaces_task() {
    let repo = nested_repo();
    let cache = cache_for(&repo);

    assert!(!cache.cancel());
    cache.initialize().unwrap();
    cache.initialize().unwrap();
    assert!(cache.cancel());
    assert!(!cache.cancel());
}
