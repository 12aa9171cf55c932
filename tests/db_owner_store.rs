mod test_util;

use publists::domain::owner::driven_ports::{OwnerReader, OwnerWriter};
use publists::domain::owner::{OwnerLogin, PublicLists};
use publists::persistence::ExternalConnectivity;
use publists::persistence::db_owner_driven_ports::DbOwnerStore;

fn login(wid: &str, access_token: &str, name: &str) -> OwnerLogin {
    OwnerLogin {
        wid: wid.to_owned(),
        access_token: access_token.to_owned(),
        name: name.to_owned(),
    }
}

#[test]
#[cfg_attr(not(feature = "integration_test"), ignore)]
fn first_login_creates_owner_with_nothing_public() {
    test_util::prepare_db_and_test(|db| async move {
        let mut ext_cxn = ExternalConnectivity::new(db).expect("connectivity should build");
        let store = DbOwnerStore {};

        let created = store
            .upsert_login(&login("42", "token-a", "Jane"), &mut ext_cxn)
            .await
            .expect("upsert should succeed");
        assert!(created.public_lists.is_empty());

        let fetched = store
            .owner_by_wid("42", &mut ext_cxn)
            .await
            .expect("read should succeed");
        assert_eq!(Some(created), fetched);
    });
}

#[test]
#[cfg_attr(not(feature = "integration_test"), ignore)]
fn relogin_refreshes_token_and_keeps_visibility() {
    test_util::prepare_db_and_test(|db| async move {
        let mut ext_cxn = ExternalConnectivity::new(db).expect("connectivity should build");
        let store = DbOwnerStore {};

        store
            .upsert_login(&login("42", "token-a", "Jane"), &mut ext_cxn)
            .await
            .expect("first login should succeed");
        store
            .update_public_lists("42", &PublicLists::from([("100".to_owned(), true)]), &mut ext_cxn)
            .await
            .expect("update should succeed");

        let relogged = store
            .upsert_login(&login("42", "token-b", "Jane D."), &mut ext_cxn)
            .await
            .expect("second login should succeed");

        assert_eq!("token-b", relogged.access_token);
        assert_eq!("Jane D.", relogged.name);
        assert!(relogged.is_list_public("100"));
    });
}

#[test]
#[cfg_attr(not(feature = "integration_test"), ignore)]
fn update_replaces_the_whole_map() {
    test_util::prepare_db_and_test(|db| async move {
        let mut ext_cxn = ExternalConnectivity::new(db).expect("connectivity should build");
        let store = DbOwnerStore {};

        store
            .upsert_login(&login("42", "token-a", "Jane"), &mut ext_cxn)
            .await
            .expect("login should succeed");
        store
            .update_public_lists(
                "42",
                &PublicLists::from([("100".to_owned(), true), ("200".to_owned(), true)]),
                &mut ext_cxn,
            )
            .await
            .expect("first update should succeed");

        let updated = store
            .update_public_lists("42", &PublicLists::from([("200".to_owned(), false)]), &mut ext_cxn)
            .await
            .expect("second update should succeed")
            .expect("owner should exist");

        assert_eq!(PublicLists::from([("200".to_owned(), false)]), updated.public_lists);
        assert!(!updated.is_list_public("100"));
    });
}

#[test]
#[cfg_attr(not(feature = "integration_test"), ignore)]
fn unknown_owner_is_absent() {
    test_util::prepare_db_and_test(|db| async move {
        let mut ext_cxn = ExternalConnectivity::new(db).expect("connectivity should build");
        let store = DbOwnerStore {};

        let fetched = store
            .owner_by_wid("nobody", &mut ext_cxn)
            .await
            .expect("read should succeed");
        assert_eq!(None, fetched);

        let updated = store
            .update_public_lists("nobody", &PublicLists::new(), &mut ext_cxn)
            .await
            .expect("update should succeed");
        assert_eq!(None, updated);
    });
}
