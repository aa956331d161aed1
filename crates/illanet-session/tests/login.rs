//! Integration tests for login state, persistence and character filtering.

use illanet_protocol::Command;
use illanet_session::store::keys;
use illanet_session::{
    CharEntry, CharListDocument, CharListOutcome, ConfigStore, Deployment, JsonFileStore,
    ListedCharacter, Login, MemoryStore, SessionError,
};
use serde_json::json;

// =========================================================================
// Helpers
// =========================================================================

const USER_DIR: &str = "/home/ada/.illarion";

fn listed(name: &str, server: &str) -> ListedCharacter {
    ListedCharacter {
        name: name.into(),
        status: 0,
        server: server.into(),
    }
}

fn mixed_document() -> CharListDocument {
    CharListDocument::Characters {
        lang: Some("us".into()),
        characters: vec![
            listed("Dev", "devserver"),
            listed("Test", "testserver"),
            listed("Real", "illarionserver"),
        ],
    }
}

fn names(login: &Login) -> Vec<String> {
    login.characters().iter().map(|c| c.name.clone()).collect()
}

fn login_for(build: Deployment, selected: Deployment) -> Login {
    let mut login = Login::new(build, USER_DIR);
    login.set_server(selected);
    login.set_login_data("ada", "secret");
    login
}

// =========================================================================
// Character-list filtering
// =========================================================================

#[test]
fn test_apply_charlist_real_server_keeps_only_illarionserver() {
    let mut login = login_for(Deployment::RealServer, Deployment::RealServer);
    let mut store = MemoryStore::new();

    let code = login.apply_charlist_document(mixed_document(), &mut store);

    assert_eq!(code, 0);
    assert_eq!(names(&login), ["Real"]);
}

#[test]
fn test_apply_charlist_dev_and_test_filter_by_tag() {
    let mut store = MemoryStore::new();

    let mut dev = login_for(Deployment::DevServer, Deployment::DevServer);
    dev.apply_charlist_document(mixed_document(), &mut store);
    assert_eq!(names(&dev), ["Dev"]);

    let mut test = login_for(Deployment::DevServer, Deployment::TestServer);
    test.apply_charlist_document(mixed_document(), &mut store);
    assert_eq!(names(&test), ["Test"]);
}

#[test]
fn test_apply_charlist_custom_and_local_are_unfiltered() {
    for deployment in [Deployment::CustomServer, Deployment::LocalServer] {
        let mut login = login_for(Deployment::DevServer, deployment);
        let mut store = MemoryStore::new();

        login.apply_charlist_document(mixed_document(), &mut store);

        assert_eq!(names(&login), ["Dev", "Test", "Real"], "{deployment}");
    }
}

#[test]
fn test_apply_charlist_real_build_ignores_selection() {
    let mut login = login_for(Deployment::RealServer, Deployment::DevServer);
    let mut store = MemoryStore::new();

    login.apply_charlist_document(mixed_document(), &mut store);

    assert_eq!(login.server(), Deployment::RealServer);
    assert_eq!(names(&login), ["Real"]);
}

#[test]
fn test_apply_charlist_error_leaves_list_unchanged() {
    let mut login = login_for(Deployment::RealServer, Deployment::RealServer);
    let mut store = MemoryStore::new();
    login.apply_charlist_document(mixed_document(), &mut store);
    let before = login.characters().to_vec();

    let code = login.apply_charlist_document(CharListDocument::Error { code: 3 }, &mut store);

    assert_eq!(code, 3);
    assert_eq!(login.characters(), before.as_slice());
    assert_eq!(
        login.characters(),
        &[CharEntry {
            name: "Real".into(),
            status: 0
        }]
    );
}

#[test]
fn test_apply_charlist_failure_is_code_two_and_keeps_list() {
    let mut login = login_for(Deployment::RealServer, Deployment::RealServer);
    let mut store = MemoryStore::new();
    login.apply_charlist_document(mixed_document(), &mut store);

    let code = login.apply_charlist(CharListOutcome::Failed("timeout".into()), &mut store);

    assert_eq!(code, 2);
    assert_eq!(names(&login), ["Real"]);
}

#[test]
fn test_apply_charlist_sets_locale_from_lang() {
    let mut login = login_for(Deployment::RealServer, Deployment::RealServer);
    let mut store = MemoryStore::new();

    login.apply_charlist_document(
        CharListDocument::Characters {
            lang: Some("de".into()),
            characters: vec![],
        },
        &mut store,
    );
    assert_eq!(store.get_string(keys::LOCALE).as_deref(), Some("de"));

    login.apply_charlist_document(mixed_document(), &mut store);
    assert_eq!(store.get_string(keys::LOCALE).as_deref(), Some("en"));
}

// =========================================================================
// Persistence
// =========================================================================

#[test]
fn test_store_and_restore_roundtrip_with_password() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("illanet.json");

    let mut login = login_for(Deployment::DevServer, Deployment::TestServer);
    let mut store = JsonFileStore::open(&path).unwrap();
    login.store(&mut store, true).unwrap();

    let on_disk = JsonFileStore::open(&path).unwrap();
    let fingerprint = on_disk.get_string(keys::FINGERPRINT).unwrap();
    assert!(!fingerprint.is_empty());
    assert_ne!(fingerprint, "secret");

    let mut restored = Login::new(Deployment::DevServer, USER_DIR);
    restored.restore(&on_disk);

    assert_eq!(restored.account(), "ada");
    assert_eq!(restored.password(), "secret");
    assert!(restored.is_password_saved());
    assert_eq!(restored.server(), Deployment::TestServer);
}

#[test]
fn test_store_without_password_removes_fingerprint() {
    let mut store = MemoryStore::new();
    let mut login = login_for(Deployment::DevServer, Deployment::DevServer);
    login.store(&mut store, true).unwrap();
    assert!(store.get(keys::FINGERPRINT).is_some());

    login.store(&mut store, false).unwrap();

    assert!(store.get(keys::FINGERPRINT).is_none());
    assert!(!store.get_bool(keys::SAVE_PASSWORD));
}

#[test]
fn test_store_local_server_skips_account_data() {
    let mut store = MemoryStore::new();
    let mut login = login_for(Deployment::DevServer, Deployment::LocalServer);

    login.store(&mut store, true).unwrap();

    assert_eq!(store.get_int(keys::SERVER), Some(4));
    assert!(store.get(keys::LAST_LOGIN).is_none());
    assert!(store.get(keys::FINGERPRINT).is_none());
}

#[test]
fn test_store_real_build_does_not_write_server() {
    let mut store = MemoryStore::new();
    let mut login = login_for(Deployment::RealServer, Deployment::DevServer);

    login.store(&mut store, false).unwrap();

    assert!(store.get(keys::SERVER).is_none());
    assert_eq!(store.get_string(keys::LAST_LOGIN).as_deref(), Some("ada"));
}

#[test]
fn test_restore_with_wrong_key_does_not_recover_password() {
    let mut store = MemoryStore::new();
    login_for(Deployment::DevServer, Deployment::DevServer)
        .store(&mut store, true)
        .unwrap();

    let mut elsewhere = Login::new(Deployment::DevServer, "/srv/other/place");
    elsewhere.restore(&store);

    assert_eq!(elsewhere.account(), "ada");
    assert_ne!(elsewhere.password(), "secret");
}

#[test]
fn test_restore_unknown_server_index_falls_back_to_dev() {
    let mut store = MemoryStore::new();
    store.set(keys::SERVER, json!(42));
    let mut login = Login::new(Deployment::TestServer, USER_DIR);

    login.restore(&store);

    assert_eq!(login.server(), Deployment::DevServer);
}

// =========================================================================
// Game login
// =========================================================================

#[test]
fn test_character_list_requirement_per_deployment() {
    let mut store = MemoryStore::new();

    assert!(login_for(Deployment::DevServer, Deployment::DevServer).is_character_list_required(&store));
    assert!(!login_for(Deployment::DevServer, Deployment::LocalServer).is_character_list_required(&store));

    let custom = login_for(Deployment::DevServer, Deployment::CustomServer);
    assert!(!custom.is_character_list_required(&store));
    store.set(keys::SERVER_ACCOUNT_LOGIN, json!(true));
    assert!(custom.is_character_list_required(&store));
}

#[test]
fn test_login_command_uses_account_name_without_character_list() {
    let store = MemoryStore::new();
    let login = login_for(Deployment::DevServer, Deployment::LocalServer);

    let cmd = login.login_command(&store).unwrap();

    assert_eq!(
        cmd,
        Command::Login {
            character: "ada".into(),
            password: "secret".into(),
            client_version: Deployment::DevServer.builtin_client_version(),
        }
    );
}

#[test]
fn test_login_command_requires_chosen_character() {
    let store = MemoryStore::new();
    let mut login = login_for(Deployment::RealServer, Deployment::RealServer);

    assert!(matches!(login.login_command(&store), Err(SessionError::NoCharacter)));

    login.set_login_character("Real");
    match login.login_command(&store).unwrap() {
        Command::Login { character, .. } => assert_eq!(character, "Real"),
        other => panic!("unexpected command {other:?}"),
    }
}

#[test]
fn test_client_version_override_only_for_non_real_builds() {
    let mut store = MemoryStore::new();
    store.set(keys::CLIENT_VERSION, json!(77));

    let dev = login_for(Deployment::DevServer, Deployment::DevServer);
    let real = login_for(Deployment::RealServer, Deployment::RealServer);

    assert_eq!(dev.client_version(&store), 77);
    assert_eq!(
        real.client_version(&store),
        Deployment::RealServer.builtin_client_version()
    );
}

#[test]
fn test_endpoint_custom_server_reads_store() {
    let mut store = MemoryStore::new();
    store.set(keys::SERVER_ADDRESS, json!("game.example.net"));
    store.set(keys::SERVER_PORT, json!(4000));

    let custom = login_for(Deployment::DevServer, Deployment::CustomServer);
    let endpoint = custom.endpoint(&store);

    assert_eq!(endpoint.to_string(), "game.example.net:4000");
    assert_eq!(
        login_for(Deployment::RealServer, Deployment::CustomServer).endpoint(&store),
        Deployment::RealServer.default_endpoint()
    );
}

#[test]
fn test_debug_output_hides_password() {
    let login = login_for(Deployment::DevServer, Deployment::DevServer);
    assert!(!format!("{login:?}").contains("secret"));
}
