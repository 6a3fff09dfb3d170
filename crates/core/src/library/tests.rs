use std::fs as stdfs;

use anyhow::Result;
use tempfile::{tempdir, TempDir};

use super::*;
use crate::{
    assets::fetch::testing::{Canned, StaticSource},
    config::FilterList,
    models::Images,
};

const PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 7, 7];

fn touch(root: &Path, relative: &str) {
    let path = root.join(relative);
    stdfs::create_dir_all(path.parent().unwrap()).unwrap();
    stdfs::write(path, b"MZ").unwrap();
}

fn library(root: &Path, exclusions: &str) -> Library {
    Library::new(LibrarySettings {
        root: root.to_path_buf(),
        filters: ScanFilters::new(FilterList::parse(".exe"), FilterList::parse(exclusions)),
    })
}

/// `/Games/Foo/Foo.exe` plus an empty `/Games/Bar`.
fn sample_tree() -> TempDir {
    let dir = tempdir().unwrap();
    touch(dir.path(), "Foo/Foo.exe");
    stdfs::create_dir_all(dir.path().join("Bar")).unwrap();
    dir
}

#[tokio::test]
async fn discovers_games_and_writes_sidecars() -> Result<()> {
    let dir = sample_tree();
    let library = library(dir.path(), "");

    assert_eq!(library.discover().await?, 1);
    let games = library.games();
    let foo = &games[0];
    assert_eq!(foo.name, "Foo");
    assert_eq!(foo.path, dir.path().join("Foo"));
    assert_eq!(foo.actions.default.as_deref(), Some("Foo.exe"));
    assert_eq!(foo.actions.others, vec!["Foo.exe"]);

    assert!(dir.path().join("Foo/Playdeck/metadata.json").is_file());
    assert!(!dir.path().join("Bar/Playdeck").exists());
    Ok(())
}

#[tokio::test]
async fn excluded_files_never_become_actions() -> Result<()> {
    let dir = sample_tree();
    touch(dir.path(), "Foo/unins000.exe");
    let library = library(dir.path(), "unins");

    library.discover().await?;
    let foo = library.find("Foo").expect("Foo should be discovered");
    assert_eq!(foo.actions.default.as_deref(), Some("Foo.exe"));
    assert_eq!(foo.actions.others, vec!["Foo.exe"]);
    Ok(())
}

#[tokio::test]
async fn rediscovery_keeps_ids_stable() -> Result<()> {
    let dir = sample_tree();
    let first = library(dir.path(), "");
    first.discover().await?;
    let before = first.games();

    first.discover().await?;
    assert_eq!(first.games(), before);

    let fresh = library(dir.path(), "");
    fresh.discover().await?;
    assert_eq!(fresh.games()[0].id, before[0].id);
    Ok(())
}

#[tokio::test]
async fn existing_sidecar_is_used_even_without_files() -> Result<()> {
    let dir = sample_tree();
    let bar_path = dir.path().join("Bar");
    let mut bar = GameRecord::new("Bar Deluxe", &bar_path, Actions::default());
    bar.id = "bar0001".to_string();
    metadata::save(&bar)?;

    let library = library(dir.path(), "");
    assert_eq!(library.discover().await?, 2);
    let names: Vec<_> = library.games_sorted().into_iter().map(|g| g.name).collect();
    assert_eq!(names, vec!["Bar Deluxe", "Foo"]);
    assert_eq!(library.find("bar0001").map(|g| g.path), Some(bar_path));
    Ok(())
}

#[tokio::test]
async fn nested_only_games_are_skipped() -> Result<()> {
    let dir = tempdir()?;
    touch(dir.path(), "Deep/bin/x64/Deep.exe");
    touch(dir.path(), ".hidden/Hidden.exe");

    let library = library(dir.path(), "");
    assert_eq!(library.discover().await?, 0);
    assert!(!dir.path().join("Deep/Playdeck").exists());
    assert!(!dir.path().join(".hidden/Playdeck").exists());
    Ok(())
}

#[tokio::test]
async fn missing_library_root_is_an_error() {
    let library = Library::new(LibrarySettings::default());
    assert!(library.discover().await.is_err());
}

#[test]
fn several_first_level_candidates_leave_default_unset() -> Result<()> {
    let dir = tempdir()?;
    let game = dir.path().join("Multi");
    touch(&game, "launcher.exe");
    touch(&game, "Game.exe");
    touch(&game, "tools/editor.exe");
    let filters = ScanFilters::new(FilterList::parse(".exe"), FilterList::default());

    let record = discover_game("Multi", &game, &filters).expect("game should be created");
    assert_eq!(record.actions.default, None);
    assert_eq!(
        record.actions.others,
        vec!["Game.exe", "launcher.exe", "tools/editor.exe"]
    );
    Ok(())
}

#[test]
fn actions_union_has_no_duplicates() {
    let shallow = vec!["b.exe".to_string()];
    let deep = vec![
        "b.exe".to_string(),
        "sub/a.exe".to_string(),
        "a.exe".to_string(),
    ];
    let actions = synthesize_actions(&shallow, deep);
    assert_eq!(actions.default.as_deref(), Some("b.exe"));
    assert_eq!(actions.others, vec!["a.exe", "b.exe", "sub/a.exe"]);
}

#[test]
fn actions_resolve_under_the_game_root() -> Result<()> {
    let root = Path::new("/Games/Foo");
    assert_eq!(
        resolve_action(root, "bin\\x64/./Foo.exe")?,
        root.join("bin").join("x64").join("Foo.exe")
    );
    assert!(resolve_action(root, "../Bar/Bar.exe").is_err());
    assert!(resolve_action(root, "bin\\..\\..\\evil.exe").is_err());
    Ok(())
}

#[test]
fn launch_refuses_actions_outside_the_game() {
    let library = Library::new(LibrarySettings::default());
    let mut game = GameRecord::new("Foo", "/Games/Foo", Actions::default());
    game.actions.default = Some("../Bar/Bar.exe".to_string());
    assert!(library.launch(&game, None).is_err());
}

#[tokio::test]
async fn foreign_sidecar_is_kept_as_is() -> Result<()> {
    let dir = sample_tree();
    let foo = dir.path().join("Foo");
    let sidecar = metadata::sidecar_path(&foo);
    stdfs::create_dir_all(sidecar.parent().unwrap())?;
    let raw = r#"{"id": 4242, "name": "Foo", "path": "x", "favourite": true}"#;
    stdfs::write(&sidecar, raw)?;

    let library = library(dir.path(), "");
    assert_eq!(library.discover().await?, 1);
    let game = library.find("4242").expect("numeric id should be kept");
    assert_eq!(game.name, "Foo");
    assert_eq!(game.extra.get("favourite"), Some(&serde_json::json!(true)));
    assert_eq!(stdfs::read_to_string(&sidecar)?, raw);
    Ok(())
}

#[tokio::test]
async fn sidecar_without_identity_is_completed_from_the_folder() -> Result<()> {
    let dir = sample_tree();
    let bar = dir.path().join("Bar");
    let sidecar = metadata::sidecar_path(&bar);
    stdfs::create_dir_all(sidecar.parent().unwrap())?;
    stdfs::write(&sidecar, r#"{"favourite": true}"#)?;

    let library = library(dir.path(), "");
    assert_eq!(library.discover().await?, 2);
    let game = library.find("Bar").expect("Bar should be included");
    assert_eq!(game.path, bar);
    assert!(!game.id.is_empty());
    assert_eq!(metadata::load(&bar).map(|saved| saved.id), Some(game.id));
    Ok(())
}

#[tokio::test]
async fn unwritable_sidecar_excludes_only_that_game() -> Result<()> {
    let dir = sample_tree();
    touch(dir.path(), "Blocked/Blocked.exe");
    // A plain file where the sidecar directory belongs.
    stdfs::write(dir.path().join("Blocked").join(metadata::SIDECAR_DIR), "x")?;

    let library = library(dir.path(), "");
    assert_eq!(library.discover().await?, 1);
    assert!(library.find("Blocked").is_none());
    assert!(library.find("Foo").is_some());
    Ok(())
}

#[tokio::test]
async fn missing_image_is_cleared_and_save_succeeds() -> Result<()> {
    let dir = sample_tree();
    let library = library(dir.path(), "");
    library.discover().await?;

    let mut game = library.find("Foo").expect("Foo should be discovered");
    game.images = Some(Images {
        icon: "https://example.test/missing.png".to_string(),
        logo: "https://example.test/logo.png".to_string(),
        ..Images::default()
    });
    let source = StaticSource::default()
        .with("https://example.test/missing.png", Canned::Missing)
        .with("https://example.test/logo.png", Canned::Body(PNG.to_vec()));

    let saved = library.save_game_metadata(&source, game).await?;
    let images = saved.images.clone().expect("images should be kept");
    assert_eq!(images.icon, "");
    let logo = PathBuf::from(&images.logo);
    assert!(logo.starts_with(dir.path().join("Foo/Playdeck")));
    assert_eq!(logo.extension().and_then(|ext| ext.to_str()), Some("png"));
    assert_eq!(stdfs::read(&logo)?, PNG);

    assert_eq!(metadata::load(&saved.path), Some(saved.clone()));
    assert_eq!(library.find(&saved.id), Some(saved));
    Ok(())
}

#[tokio::test]
async fn empty_download_is_treated_as_missing() -> Result<()> {
    let dir = sample_tree();
    let library = library(dir.path(), "");
    library.discover().await?;

    let mut game = library.find("Foo").expect("Foo should be discovered");
    game.images = Some(Images {
        icon: "https://example.test/empty.png".to_string(),
        ..Images::default()
    });
    let source =
        StaticSource::default().with("https://example.test/empty.png", Canned::Body(Vec::new()));

    let saved = library.save_game_metadata(&source, game).await?;
    assert_eq!(saved.images.map(|images| images.icon), Some(String::new()));
    Ok(())
}

#[tokio::test]
async fn extra_image_slots_are_downloaded_and_kept() -> Result<()> {
    let dir = sample_tree();
    let library = library(dir.path(), "");
    library.discover().await?;

    let mut game = library.find("Foo").expect("Foo should be discovered");
    let mut images = Images::default();
    images.extra.insert(
        "banner".to_string(),
        serde_json::json!("https://example.test/banner.png"),
    );
    images.extra.insert("rating".to_string(), serde_json::json!(5));
    game.images = Some(images);
    let source = StaticSource::default()
        .with("https://example.test/banner.png", Canned::Body(PNG.to_vec()));

    let saved = library.save_game_metadata(&source, game).await?;
    let images = saved.images.clone().expect("images should be kept");
    let banner = images.extra["banner"].as_str().expect("banner is a path");
    assert!(Path::new(banner).starts_with(dir.path().join("Foo/Playdeck")));
    assert_eq!(images.extra["rating"], serde_json::json!(5));
    assert_eq!(metadata::load(&saved.path), Some(saved));
    Ok(())
}

#[tokio::test]
async fn failed_download_abandons_the_edit() -> Result<()> {
    let dir = sample_tree();
    let library = library(dir.path(), "");
    library.discover().await?;
    let original = library.find("Foo").expect("Foo should be discovered");
    let sidecar = metadata::sidecar_path(&original.path);
    let sidecar_before = stdfs::read_to_string(&sidecar)?;

    let mut edited = original.clone();
    edited.description = Some("edited".to_string());
    edited.images = Some(Images {
        icon: "https://example.test/icon.png".to_string(),
        header: "https://example.test/header.jpg".to_string(),
        vertical_cover: "https://example.test/cover.jpg".to_string(),
        ..Images::default()
    });
    let source = StaticSource::default()
        .with("https://example.test/icon.png", Canned::Body(PNG.to_vec()))
        .with("https://example.test/header.jpg", Canned::Status(500))
        .with("https://example.test/cover.jpg", Canned::Body(PNG.to_vec()));

    assert!(library.save_game_metadata(&source, edited).await.is_err());
    assert_eq!(
        source.requests(),
        vec![
            "https://example.test/icon.png",
            "https://example.test/header.jpg"
        ]
    );
    assert_eq!(library.find(&original.id), Some(original));
    assert_eq!(stdfs::read_to_string(&sidecar)?, sidecar_before);
    Ok(())
}

#[tokio::test]
async fn unknown_games_are_rejected_before_downloading() -> Result<()> {
    let dir = sample_tree();
    let library = library(dir.path(), "");
    library.discover().await?;

    let mut stranger = GameRecord::new("Stranger", dir.path().join("Bar"), Actions::default());
    stranger.images = Some(Images {
        icon: "https://example.test/icon.png".to_string(),
        ..Images::default()
    });
    let source = StaticSource::default();

    assert!(library.save_game_metadata(&source, stranger).await.is_err());
    assert!(source.requests().is_empty());
    assert!(!dir.path().join("Bar/Playdeck").exists());
    Ok(())
}

#[tokio::test]
async fn matching_filters_by_descriptive_fields() -> Result<()> {
    let dir = sample_tree();
    touch(dir.path(), "Quux/Quux.exe");
    let library = library(dir.path(), "");
    library.discover().await?;

    let mut foo = library.find("foo").expect("lookup is case-insensitive");
    foo.developers = vec!["Acme Studios".to_string()];
    let source = StaticSource::default();
    library.save_game_metadata(&source, foo).await?;

    let hits: Vec<_> = library
        .games_matching("acme")
        .into_iter()
        .map(|game| game.name)
        .collect();
    assert_eq!(hits, vec!["Foo"]);
    assert_eq!(library.games_matching("  ").len(), 2);
    Ok(())
}

#[test]
fn launch_without_default_action_fails() {
    let library = Library::new(LibrarySettings::default());
    let game = GameRecord::new("Foo", "/Games/Foo", Actions::default());
    assert!(library.launch(&game, None).is_err());
}
