//! Listing engine tests: filtering, pinning, ordering, pagination

use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde_json::json;
use tempfile::TempDir;

use llg_gallery::models::{FilterSpec, PageRequest, TagMode};
use llg_gallery::services::listing::list_loras;
use llg_gallery::services::resolver::{FsResolver, LoraResolver};
use llg_gallery::services::sidecar::SidecarStore;

struct Fixture {
    _dir: TempDir,
    resolver: Arc<dyn LoraResolver>,
    store: SidecarStore,
}

impl Fixture {
    fn new(names: &[&str]) -> Self {
        let dir = tempfile::tempdir().unwrap();
        for name in names {
            let path = dir.path().join(name);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(&path, b"").unwrap();
        }
        let resolver: Arc<dyn LoraResolver> =
            Arc::new(FsResolver::new(vec![dir.path().to_path_buf()]));
        let store = SidecarStore::new(resolver.clone());
        Self {
            _dir: dir,
            resolver,
            store,
        }
    }

    fn write_sidecar(&self, name: &str, doc: serde_json::Value) {
        let serde_json::Value::Object(doc) = doc else {
            panic!("sidecar fixture must be an object");
        };
        self.store.write(name, doc, false).unwrap();
    }

    fn list(&self, filter: &FilterSpec, page: usize, per_page: usize) -> llg_gallery::models::ListingPage {
        list_loras(
            self.resolver.as_ref(),
            &self.store,
            filter,
            PageRequest { page, per_page },
        )
        .unwrap()
    }
}

fn names(page: &llg_gallery::models::ListingPage) -> Vec<&str> {
    page.loras.iter().map(|l| l.name.as_str()).collect()
}

fn touch(path: &Path) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, b"").unwrap();
}

#[test]
fn test_first_page_of_three_assets() {
    let fx = Fixture::new(&["a.safetensors", "b.safetensors", "c.safetensors"]);
    let page = fx.list(&FilterSpec::default(), 1, 2);

    assert_eq!(names(&page), vec!["a.safetensors", "b.safetensors"]);
    assert_eq!(page.total_pages, 2);
    assert_eq!(page.current_page, 1);
}

#[test]
fn test_pages_concatenate_to_full_ordering() {
    let all = [
        "a.safetensors",
        "b.safetensors",
        "c.safetensors",
        "d.safetensors",
        "e.safetensors",
        "f.safetensors",
        "g.safetensors",
    ];
    let fx = Fixture::new(&all);

    let first = fx.list(&FilterSpec::default(), 1, 3);
    assert_eq!(first.total_pages, 3);

    let mut collected = Vec::new();
    for page_no in 1..=first.total_pages {
        let page = fx.list(&FilterSpec::default(), page_no, 3);
        collected.extend(page.loras.into_iter().map(|l| l.name));
    }
    assert_eq!(collected, all.to_vec());
}

#[test]
fn test_out_of_range_page_is_empty_not_error() {
    let fx = Fixture::new(&["a.safetensors", "b.safetensors"]);
    let page = fx.list(&FilterSpec::default(), 9, 50);
    assert!(page.loras.is_empty());
    assert_eq!(page.total_pages, 1);
    assert_eq!(page.current_page, 9);
}

#[test]
fn test_non_positive_page_is_caller_error() {
    let fx = Fixture::new(&["a.safetensors"]);
    let err = list_loras(
        fx.resolver.as_ref(),
        &fx.store,
        &FilterSpec::default(),
        PageRequest { page: 0, per_page: 10 },
    );
    assert!(err.is_err());

    let err = list_loras(
        fx.resolver.as_ref(),
        &fx.store,
        &FilterSpec::default(),
        PageRequest { page: 1, per_page: 0 },
    );
    assert!(err.is_err());
}

#[test]
fn test_name_filter_is_case_insensitive() {
    let fx = Fixture::new(&["Anime_Style.safetensors", "realism.safetensors"]);
    let filter = FilterSpec {
        name: "anime".to_string(),
        ..Default::default()
    };
    let page = fx.list(&filter, 1, 50);
    assert_eq!(names(&page), vec!["Anime_Style.safetensors"]);
}

#[test]
fn test_folder_filter_and_census() {
    let fx = Fixture::new(&[
        "root_level.safetensors",
        "styles/a.safetensors",
        "styles/b.safetensors",
        "chars/c.safetensors",
    ]);

    let filter = FilterSpec {
        folder: Some("styles".to_string()),
        ..Default::default()
    };
    let page = fx.list(&filter, 1, 50);
    assert_eq!(names(&page), vec!["styles/a.safetensors", "styles/b.safetensors"]);

    // Folder census covers the whole universe, independent of the filter.
    assert_eq!(page.folders, vec![".", "chars", "styles"]);
}

#[test]
fn test_dot_folder_matches_root_level_assets() {
    let fx = Fixture::new(&["root_level.safetensors", "styles/a.safetensors"]);
    let filter = FilterSpec {
        folder: Some(".".to_string()),
        ..Default::default()
    };
    let page = fx.list(&filter, 1, 50);
    assert_eq!(names(&page), vec!["root_level.safetensors"]);
}

#[test]
fn test_tag_filter_and_mode_requires_all() {
    let fx = Fixture::new(&["a.safetensors", "b.safetensors", "c.safetensors"]);
    fx.write_sidecar("a.safetensors", json!({ "tags": ["Anime", "style"] }));
    fx.write_sidecar("b.safetensors", json!({ "tags": ["anime"] }));

    let filter = FilterSpec {
        tags: vec!["anime".to_string(), "style".to_string()],
        mode: TagMode::And,
        ..Default::default()
    };
    let page = fx.list(&filter, 1, 50);
    // AND: each returned asset's tag set is a superset of the request.
    assert_eq!(names(&page), vec!["a.safetensors"]);
}

#[test]
fn test_tag_filter_or_mode_requires_any() {
    let fx = Fixture::new(&["a.safetensors", "b.safetensors", "c.safetensors"]);
    fx.write_sidecar("a.safetensors", json!({ "tags": ["anime", "style"] }));
    fx.write_sidecar("b.safetensors", json!({ "tags": ["realism"] }));

    let filter = FilterSpec {
        tags: vec!["anime".to_string(), "realism".to_string()],
        mode: TagMode::Or,
        ..Default::default()
    };
    let page = fx.list(&filter, 1, 50);
    assert_eq!(names(&page), vec!["a.safetensors", "b.safetensors"]);
}

#[test]
fn test_pinned_assets_lead_in_pinned_order() {
    let fx = Fixture::new(&[
        "a.safetensors",
        "b.safetensors",
        "c.safetensors",
        "d.safetensors",
    ]);

    let filter = FilterSpec {
        pinned: vec!["c.safetensors".to_string(), "a.safetensors".to_string()],
        ..Default::default()
    };
    let page = fx.list(&filter, 1, 50);
    assert_eq!(
        names(&page),
        vec![
            "c.safetensors",
            "a.safetensors",
            "b.safetensors",
            "d.safetensors"
        ]
    );
}

#[test]
fn test_pinned_asset_failing_filter_disappears() {
    let fx = Fixture::new(&["anime_a.safetensors", "realism_b.safetensors"]);

    let filter = FilterSpec {
        name: "anime".to_string(),
        pinned: vec!["realism_b.safetensors".to_string()],
        ..Default::default()
    };
    let page = fx.list(&filter, 1, 50);
    assert_eq!(names(&page), vec!["anime_a.safetensors"]);
}

#[test]
fn test_summary_defaults() {
    let fx = Fixture::new(&["bare.safetensors"]);
    let page = fx.list(&FilterSpec::default(), 1, 50);

    let summary = &page.loras[0];
    assert_eq!(summary.preferred_weight, 1.0);
    assert_eq!(summary.sd_version, "Unknown");
    assert_eq!(summary.activation_text, "");
    assert_eq!(summary.negative_text, "");
    assert_eq!(summary.notes, "");
    assert!(summary.tags.is_empty());
    assert_eq!(summary.preview_url, "");
}

#[test]
fn test_summary_reflects_sidecar_and_preview() {
    let dir = tempfile::tempdir().unwrap();
    touch(&dir.path().join("x.safetensors"));
    touch(&dir.path().join("x.png"));

    let resolver: Arc<dyn LoraResolver> =
        Arc::new(FsResolver::new(vec![dir.path().to_path_buf()]));
    let store = SidecarStore::new(resolver.clone());
    let mut doc = serde_json::Map::new();
    doc.insert("tags".to_string(), json!(["anime"]));
    doc.insert("preferred weight".to_string(), json!(0.8));
    doc.insert("sd version".to_string(), json!("SDXL"));
    store.write("x.safetensors", doc, true).unwrap();

    let page = list_loras(
        resolver.as_ref(),
        &store,
        &FilterSpec::default(),
        PageRequest { page: 1, per_page: 10 },
    )
    .unwrap();

    let summary = &page.loras[0];
    assert_eq!(summary.tags, vec!["anime"]);
    assert_eq!(summary.preferred_weight, 0.8);
    assert_eq!(summary.sd_version, "SDXL");
    assert!(summary.preview_url.contains("filename=x.png"));
}
