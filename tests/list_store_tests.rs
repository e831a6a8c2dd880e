use std::fs;
use std::path::{Path, PathBuf};

use creator_desk::core::anchor::Anchor;
use creator_desk::core::identifiers::IdentifierList;
use creator_desk::core::list_store::{Edit, ListStore, StoreError, load_entries, save_entries};
use creator_desk::core::platform::PlatformBinding;

// ============================================================================
// Helper Functions
// ============================================================================

const SETTINGS: &str = "config/settings.py";

fn binding(attribute: &str) -> PlatformBinding {
    PlatformBinding::new("foo", "Foo", SETTINGS, attribute)
}

fn write_settings(root: &Path, content: &str) -> PathBuf {
    let path = root.join(SETTINGS);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, content).unwrap();
    path
}

fn entries(store: &ListStore) -> Vec<&str> {
    store.ids().iter().collect()
}

// ============================================================================
// Load / Save
// ============================================================================

#[test]
fn test_append_keeps_layout_and_trailing_text() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_settings(dir.path(), "FOO = [\n  \"a\",\n  \"b\"\n]\nBAR = 1");

    let mut store = ListStore::open(&binding("FOO"), dir.path());
    assert_eq!(entries(&store), vec!["a", "b"]);

    assert_eq!(store.add("c").unwrap(), Edit::Added("c".to_string()));
    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "FOO = [\n  \"a\",\n  \"b\",\n  \"c\"\n]\nBAR = 1"
    );
}

#[test]
fn test_missing_attribute_loads_empty_and_refuses_save() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_settings(dir.path(), "OTHER = ['x']\n");

    let mut store = ListStore::open(&binding("FOO"), dir.path());
    assert!(store.is_empty());
    assert!(matches!(store.load_issue(), Some(StoreError::AnchorMissing { .. })));

    let err = store.add("x").unwrap_err();
    assert!(matches!(err, StoreError::AnchorMissing { .. }));
    assert_eq!(fs::read_to_string(path).unwrap(), "OTHER = ['x']\n");
}

#[test]
fn test_save_then_load_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_settings(dir.path(), "# creators\nFOO = []\n");
    let anchor = Anchor::new("FOO").unwrap();

    let list = IdentifierList::from_entries(["https://example.com/u/1", "plain-id", "x y"]);
    save_entries(&path, &anchor, &list).unwrap();

    assert_eq!(load_entries(&path, &anchor).unwrap(), list);
    assert!(fs::read_to_string(&path).unwrap().starts_with("# creators\nFOO = [\n"));
}

#[test]
fn test_second_save_is_byte_identical() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_settings(dir.path(), "FOO = ['a', \"b\"]\n");
    let anchor = Anchor::new("FOO").unwrap();

    let list = load_entries(&path, &anchor).unwrap();
    save_entries(&path, &anchor, &list).unwrap();
    let first = fs::read_to_string(&path).unwrap();
    save_entries(&path, &anchor, &load_entries(&path, &anchor).unwrap()).unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), first);
}

#[test]
fn test_neighbouring_lists_are_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let original = "FOO = ['a']\nOLD_FOO = ['z']\nBAR = ['b']\n";
    let path = write_settings(dir.path(), original);

    let mut bar = ListStore::open(&binding("BAR"), dir.path());
    bar.add("b2").unwrap();

    let content = fs::read_to_string(&path).unwrap();
    assert!(content.starts_with("FOO = ['a']\nOLD_FOO = ['z']\n"));
    assert!(content.contains("\"b2\""));

    let foo = ListStore::open(&binding("FOO"), dir.path());
    assert_eq!(entries(&foo), vec!["a"]);
}

// ============================================================================
// Editing
// ============================================================================

#[test]
fn test_duplicates_and_blanks_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    write_settings(dir.path(), "FOO = ['a', 'a', '  ']\n");

    let mut store = ListStore::open(&binding("FOO"), dir.path());
    assert_eq!(entries(&store), vec!["a"]);

    assert_eq!(store.add("a").unwrap(), Edit::Unchanged);
    assert_eq!(store.add(" a ").unwrap(), Edit::Unchanged);
    assert_eq!(store.add("   ").unwrap(), Edit::Unchanged);
    assert_eq!(store.len(), 1);
}

#[test]
fn test_remove_by_index_and_out_of_range() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_settings(dir.path(), "FOO = ['a', 'b', 'c']\n");

    let mut store = ListStore::open(&binding("FOO"), dir.path());
    assert_eq!(
        store.remove_at(1).unwrap(),
        Edit::Removed {
            index: 1,
            value: "b".to_string()
        }
    );
    assert_eq!(store.remove_at(7).unwrap(), Edit::Unchanged);
    assert_eq!(entries(&store), vec!["a", "c"]);

    store.remove_at(0).unwrap();
    store.remove_at(0).unwrap();
    assert_eq!(fs::read_to_string(path).unwrap(), "FOO = []\n");
}

#[test]
fn test_external_edit_is_seen_after_reload() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_settings(dir.path(), "FOO = ['a']\n");
    let mut store = ListStore::open(&binding("FOO"), dir.path());

    fs::write(&path, "FOO = ['a', 'from-editor']\n").unwrap();
    store.reload();
    assert_eq!(entries(&store), vec!["a", "from-editor"]);
}

// ============================================================================
// Awkward Values
// ============================================================================

#[test]
fn test_url_with_brackets_round_trips_and_spares_neighbours() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_settings(dir.path(), "FOO = [\n    \"a\"\n]\nBAR = 1\n");

    let mut store = ListStore::open(&binding("FOO"), dir.path());
    let url = "https://x.com/u?ids[]=1";
    assert_eq!(store.add(url).unwrap(), Edit::Added(url.to_string()));

    let mut reopened = ListStore::open(&binding("FOO"), dir.path());
    assert_eq!(entries(&reopened), vec!["a", url]);

    reopened.add("c").unwrap();
    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "FOO = [\n    \"a\",\n    \"https://x.com/u?ids[]=1\",\n    \"c\"\n]\nBAR = 1\n"
    );
}

#[test]
fn test_lone_brackets_and_either_quote_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    write_settings(dir.path(), "FOO = []\nBAR = ['b']\n");

    let values = ["]", "[", "it's", "say \"hi\""];
    let mut store = ListStore::open(&binding("FOO"), dir.path());
    for value in values {
        assert_eq!(store.add(value).unwrap(), Edit::Added(value.to_string()));
    }

    let reopened = ListStore::open(&binding("FOO"), dir.path());
    assert_eq!(entries(&reopened), values.to_vec());
    let bar = ListStore::open(&binding("BAR"), dir.path());
    assert_eq!(entries(&bar), vec!["b"]);
}

#[test]
fn test_unstorable_values_are_rejected_without_writing() {
    let dir = tempfile::tempdir().unwrap();
    let original = "FOO = ['a']\nBAR = 1\n";
    let path = write_settings(dir.path(), original);
    let mut store = ListStore::open(&binding("FOO"), dir.path());

    for value in ["two\nlines", "carriage\rreturn", "say \"it's\""] {
        assert!(matches!(store.add(value).unwrap(), Edit::Rejected { .. }));
    }
    assert_eq!(entries(&store), vec!["a"]);
    assert_eq!(fs::read_to_string(&path).unwrap(), original);
}

// ============================================================================
// Writing
// ============================================================================

#[cfg(unix)]
#[test]
fn test_save_through_symlink_keeps_link() {
    let dir = tempfile::tempdir().unwrap();
    let real = dir.path().join("shared.py");
    fs::write(&real, "FOO = []\n").unwrap();
    let link = dir.path().join(SETTINGS);
    fs::create_dir_all(link.parent().unwrap()).unwrap();
    std::os::unix::fs::symlink(&real, &link).unwrap();

    let mut store = ListStore::open(&binding("FOO"), dir.path());
    store.add("x").unwrap();

    assert!(fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
    assert_eq!(fs::read_to_string(&real).unwrap(), "FOO = [\n    \"x\"\n]\n");
}

#[test]
fn test_save_leaves_existing_tmp_sibling_alone() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_settings(dir.path(), "FOO = []\n");
    let sibling = path.with_file_name("settings.py.tmp");
    fs::write(&sibling, "keep me").unwrap();

    let mut store = ListStore::open(&binding("FOO"), dir.path());
    store.add("x").unwrap();

    assert_eq!(fs::read_to_string(&sibling).unwrap(), "keep me");
    let leftovers = fs::read_dir(path.parent().unwrap()).unwrap().count();
    assert_eq!(leftovers, 2);
}
