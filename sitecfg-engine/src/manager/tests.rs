use std::sync::Arc;
use std::time::Duration;

use sitecfg_protocol::{type_names, ClearScope, RepositoryEvent};
use tokio::runtime::Handle;

use super::*;
use crate::repository::InMemoryRepository;

struct Fixture {
    offline: Arc<InMemoryRepository>,
    online: Arc<InMemoryRepository>,
    manager: ConfigurationManager,
}

fn fixture() -> Fixture {
    let offline = Arc::new(InMemoryRepository::new());
    let online = Arc::new(InMemoryRepository::new());
    let manager = ConfigurationManager::new(
        ConfigReader::new(offline.clone()),
        ConfigReader::new(online.clone()),
        CacheSettings::fast(),
        Handle::current(),
    );
    Fixture {
        offline,
        online,
        manager,
    }
}

/// Write the same document to both views
fn put_both(f: &Fixture, path: &str, type_name: &str, body: &str) {
    f.offline.put_file(path, type_name, body);
    f.online.put_file(path, type_name, body);
}

fn types_at(manager: &ConfigurationManager, path: &str, project: Project) -> Vec<String> {
    manager
        .lookup(path, project)
        .resource_types()
        .into_iter()
        .map(|t| t.type_name)
        .collect()
}

#[tokio::test]
async fn test_nested_sitemaps_resolve_to_deepest() {
    let f = fixture();
    put_both(
        &f,
        "/a/.content/.config",
        type_names::SITEMAP_CONFIG,
        "[[resource_type]]\ntype_name = \"X\"\n\n[[property]]\nname = \"p1\"",
    );
    put_both(
        &f,
        "/a/b/.content/.config",
        type_names::SITEMAP_CONFIG,
        "[[resource_type]]\ntype_name = \"X\"\ndisabled = true\n\n[[property]]\nname = \"p2\"",
    );
    assert!(f.manager.initialize());

    let facade = f.manager.lookup("/a/b/c", Project::Offline);
    assert_eq!(facade.base_path(), Some("/a/b"));
    assert!(!facade.is_type_enabled("X"));
    assert!(facade.resource_type("X").is_none());

    let props: Vec<String> = facade.properties().into_iter().map(|p| p.name).collect();
    assert_eq!(props, vec!["p2", "p1"]);

    assert!(f.manager.lookup("/a/c", Project::Offline).is_type_enabled("X"));
}

#[tokio::test]
async fn test_function_references_only_from_modules() {
    let f = fixture();
    put_both(&f, "/system/functions/f.fn", type_names::PLAIN, "");
    put_both(&f, "/system/functions/g.fn", type_names::PLAIN, "");
    put_both(
        &f,
        "/system/modules/core/.config",
        type_names::MODULE_CONFIG,
        "[[function_ref]]\nname = \"F\"\nfunction = \"/system/functions/f.fn\"\norder = 5",
    );
    put_both(
        &f,
        "/a/.content/.config",
        type_names::SITEMAP_CONFIG,
        "[[function_ref]]\nname = \"G\"\nfunction = \"/system/functions/g.fn\"",
    );
    f.manager.initialize();

    let facade = f.manager.lookup("/a/page", Project::Online);
    assert!(!facade.is_module_config());
    let refs = facade.function_references();
    assert_eq!(refs.len(), 1);
    assert_eq!(refs[0].name, "F");
    assert_eq!(refs[0].order, Some(5));
}

#[tokio::test]
async fn test_deleting_config_falls_back_after_refresh() {
    let f = fixture();
    put_both(&f, "/a/.content/.config", type_names::SITEMAP_CONFIG, "");
    put_both(&f, "/a/b/.content/.config", type_names::SITEMAP_CONFIG, "");
    f.manager.initialize();
    assert_eq!(
        f.manager.lookup("/a/b/c", Project::Offline).base_path(),
        Some("/a/b")
    );

    let deleted = f.offline.delete("/a/b/.content/.config");
    f.manager.handle_event(&RepositoryEvent::ResourceDeleted(deleted));

    tokio::time::timeout(
        Duration::from_secs(5),
        f.manager.wait_for_update(Project::Offline),
    )
    .await
    .expect("offline refresh did not run");

    assert_eq!(
        f.manager.lookup("/a/b/c", Project::Offline).base_path(),
        Some("/a")
    );
    // Not published yet
    assert_eq!(
        f.manager.lookup("/a/b/c", Project::Online).base_path(),
        Some("/a/b")
    );
}

#[tokio::test]
async fn test_edits_reach_online_only_when_published() {
    let f = fixture();
    put_both(&f, "/a/.content/.config", type_names::SITEMAP_CONFIG, "");
    f.manager.initialize();

    let body = "[[resource_type]]\ntype_name = \"article\"";
    let edited = f
        .offline
        .put_file("/a/.content/.config", type_names::SITEMAP_CONFIG, body);
    f.manager
        .handle_event(&RepositoryEvent::ResourceModified(edited));
    assert_eq!(f.manager.cache(Project::Offline).pending(), 1);
    assert_eq!(f.manager.cache(Project::Online).pending(), 0);

    f.manager.cache(Project::Offline).perform_update();
    assert_eq!(types_at(&f.manager, "/a/x", Project::Offline), vec!["article"]);
    assert!(types_at(&f.manager, "/a/x", Project::Online).is_empty());

    let published = f
        .online
        .put_file("/a/.content/.config", type_names::SITEMAP_CONFIG, body);
    f.manager.handle_event(&RepositoryEvent::ProjectPublished {
        resources: vec![published],
    });
    f.manager.cache(Project::Online).perform_update();
    assert_eq!(types_at(&f.manager, "/a/x", Project::Online), vec!["article"]);
}

#[tokio::test]
async fn test_publish_without_resources_reloads_online() {
    let f = fixture();
    f.manager.initialize();

    // Written without any per-resource notification
    f.online.put_file(
        "/a/.content/.config",
        type_names::SITEMAP_CONFIG,
        "[[resource_type]]\ntype_name = \"article\"",
    );
    f.manager
        .handle_event(&RepositoryEvent::ProjectPublished { resources: vec![] });

    let online = f.manager.cache(Project::Online);
    assert_eq!(online.perform_update(), crate::cache::UpdateOutcome::Full);
    assert_eq!(types_at(&f.manager, "/a/x", Project::Online), vec!["article"]);
}

#[tokio::test]
async fn test_cache_clear_scopes() {
    let f = fixture();
    f.manager.initialize();

    f.manager
        .handle_event(&RepositoryEvent::CachesCleared(ClearScope::OnlineOnly));
    assert_eq!(f.manager.cache(Project::Offline).pending(), 0);
    assert_eq!(f.manager.cache(Project::Online).pending(), 1);

    f.manager
        .handle_event(&RepositoryEvent::CachesCleared(ClearScope::All));
    assert_eq!(f.manager.cache(Project::Offline).pending(), 1);
    // Same sentinel, still one entry
    assert_eq!(f.manager.cache(Project::Online).pending(), 1);
}

#[tokio::test]
async fn test_uninitialized_manager_answers_empty() {
    let f = fixture();
    put_both(
        &f,
        "/a/.content/.config",
        type_names::SITEMAP_CONFIG,
        "[[resource_type]]\ntype_name = \"article\"",
    );

    let facade = f.manager.lookup("/a/x", Project::Offline);
    assert!(facade.resource_types().is_empty());
    assert!(f.manager.folder_types(Project::Online).is_empty());
    assert!(f.manager.detail_pages_for_type("article", Project::Offline).is_empty());
    assert!(f.manager.element_views(Project::Offline).is_empty());
}

#[tokio::test]
async fn test_master_config_cycle_terminates() {
    let f = fixture();
    for path in ["/shared/m1.masterconfig", "/shared/m2.masterconfig"] {
        put_both(&f, path, type_names::MASTER_CONFIG, "");
    }
    put_both(
        &f,
        "/shared/m1.masterconfig",
        type_names::MASTER_CONFIG,
        "master_config = \"/shared/m2.masterconfig\"\n[[resource_type]]\ntype_name = \"m1\"",
    );
    put_both(
        &f,
        "/shared/m2.masterconfig",
        type_names::MASTER_CONFIG,
        "master_config = \"/shared/m1.masterconfig\"\n[[resource_type]]\ntype_name = \"m2\"",
    );
    put_both(
        &f,
        "/a/.content/.config",
        type_names::SITEMAP_CONFIG,
        "master_config = \"/shared/m1.masterconfig\"\n[[resource_type]]\ntype_name = \"own\"",
    );
    f.manager.initialize();

    let types = types_at(&f.manager, "/a/x", Project::Offline);
    assert_eq!(types, vec!["own", "m1", "m2"]);
    // Master configurations are not reachable by path
    assert!(types_at(&f.manager, "/shared/x", Project::Offline).is_empty());
}

#[tokio::test]
async fn test_moved_detail_page_and_refresh() {
    let f = fixture();
    f.offline.ensure_folder("/a/news/");
    f.offline.put_file(
        "/a/.content/.config",
        type_names::SITEMAP_CONFIG,
        "[[detail_page]]\ntype_name = \"article\"\npage = \"/a/news/\"",
    );
    f.manager.initialize();
    assert_eq!(
        f.manager.detail_pages_for_type("article", Project::Offline),
        vec!["/a/news/"]
    );

    let page = f.offline.put_file("/a/news/index.page", type_names::CONTAINER_PAGE, "");
    let (source, destination) = f
        .offline
        .move_file("/a/news/index.page", "/a/archive/index.page")
        .unwrap();
    f.manager.handle_event(&RepositoryEvent::ResourceMoved {
        source,
        destination: destination.clone(),
    });
    assert_eq!(page.id, destination.id);
    assert!(!f.manager.is_detail_page(&destination, Project::Offline));

    f.manager.refresh();
    assert_eq!(f.manager.cache(Project::Offline).pending(), 1);
    f.manager.shutdown();
}
