//! The process-wide container. Kept in its own test binary with a single test
//! because installation is once per process.

use quarry::app::{bootstrap, controllers::UsersController, names};
use quarry::config::AppConfig;
use quarry::{global, DiError, Registry};

#[tokio::test]
async fn test_install_once_then_resolve_globally() {
    assert!(global::container().is_none());

    let container = bootstrap(&AppConfig::default()).unwrap().seal().unwrap();
    let installed = global::install(container).unwrap();
    assert!(installed.contains(names::USERS_CONTROLLER));

    let again = global::install(Registry::new().seal().unwrap());
    assert!(matches!(again, Err(DiError::AlreadyInstalled)));

    let shared = global::container().unwrap();
    assert_eq!(shared.len(), installed.len());
    assert!(shared
        .resolve_as::<UsersController>(names::USERS_CONTROLLER)
        .await
        .is_ok());
}
