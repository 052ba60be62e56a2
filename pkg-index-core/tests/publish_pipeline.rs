use std::time::Duration;

use pkg_index_core::config::{PollConfig, PublishConfig, SiteConfig};
use pkg_index_core::contract::{DeployState, Deployment, MockBucketLister, MockDeployApi};
use pkg_index_core::publish::{await_ready, publish, PublishError};

fn test_config() -> PublishConfig {
    PublishConfig {
        site: SiteConfig {
            bucket: "wheels".to_string(),
            storage_host: "storage.example.com".to_string(),
        },
        poll: fast_poll(5),
    }
}

/// Millisecond intervals so the backoff path runs without slowing the suite.
fn fast_poll(max_attempts: u32) -> PollConfig {
    PollConfig {
        max_attempts,
        initial_interval: Duration::from_millis(1),
        max_interval: Duration::from_millis(4),
    }
}

#[tokio::test]
async fn publish_happy_flow_deploys_and_polls_to_ready() {
    let mut lister = MockBucketLister::new();
    lister.expect_list_objects().return_once(|| {
        Ok(vec![
            "pkgA/a.whl".to_string(),
            "pkgA/b.whl".to_string(),
            "pkgB/c.whl".to_string(),
            "pkgA/".to_string(),
        ])
    });

    let mut deployer = MockDeployApi::new();
    deployer
        .expect_create_deploy()
        .withf(|archive| !archive.is_empty())
        .return_once(|_| {
            Ok(Deployment {
                id: "dep-1".to_string(),
                state: DeployState::Pending,
            })
        });

    // Status sequence pending, pending, ready: exactly 3 requests.
    let mut polls = 0;
    deployer
        .expect_get_deploy()
        .times(3)
        .returning(move |deploy_id| {
            polls += 1;
            let state = if polls < 3 {
                DeployState::Pending
            } else {
                DeployState::Ready
            };
            Ok(Deployment {
                id: deploy_id.to_string(),
                state,
            })
        });

    let report = publish(&test_config(), &lister, &deployer)
        .await
        .expect("publish should succeed");

    assert_eq!(report.packages, 2, "Folder marker must not count as a package");
    assert_eq!(report.files, 3);
    assert_eq!(report.deploy_id, "dep-1");
    assert_eq!(report.poll_attempts, 3);
}

#[tokio::test]
async fn malformed_creation_response_aborts_before_any_poll() {
    let mut lister = MockBucketLister::new();
    lister
        .expect_list_objects()
        .return_once(|| Ok(vec!["pkgA/a.whl".to_string()]));

    let mut deployer = MockDeployApi::new();
    deployer
        .expect_create_deploy()
        .return_once(|_| Err("deploy creation response had no id".to_string().into()));
    deployer.expect_get_deploy().times(0);

    let err = publish(&test_config(), &lister, &deployer)
        .await
        .expect_err("publish should fail");

    assert!(
        matches!(err, PublishError::Deploy(_)),
        "Expected a Deploy error, got: {err:?}"
    );
}

#[tokio::test]
async fn listing_failure_aborts_before_any_deploy() {
    let mut lister = MockBucketLister::new();
    lister
        .expect_list_objects()
        .return_once(|| Err("storage unreachable".to_string().into()));

    let mut deployer = MockDeployApi::new();
    deployer.expect_create_deploy().times(0);
    deployer.expect_get_deploy().times(0);

    let err = publish(&test_config(), &lister, &deployer)
        .await
        .expect_err("publish should fail");

    assert!(
        matches!(err, PublishError::List(_)),
        "Expected a List error, got: {err:?}"
    );
}

#[tokio::test]
async fn await_ready_issues_one_request_per_state_in_sequence() {
    let mut deployer = MockDeployApi::new();
    let mut polls = 0;
    deployer
        .expect_get_deploy()
        .times(3)
        .returning(move |deploy_id| {
            polls += 1;
            let state = if polls < 3 {
                DeployState::Pending
            } else {
                DeployState::Ready
            };
            Ok(Deployment {
                id: deploy_id.to_string(),
                state,
            })
        });

    let attempts = await_ready(&deployer, "dep-7", &fast_poll(10))
        .await
        .expect("poll should reach ready");

    assert_eq!(attempts, 3);
}

#[tokio::test]
async fn await_ready_times_out_after_the_attempt_budget() {
    let mut deployer = MockDeployApi::new();
    deployer
        .expect_get_deploy()
        .times(4)
        .returning(|deploy_id| {
            Ok(Deployment {
                id: deploy_id.to_string(),
                state: DeployState::Pending,
            })
        });

    let err = await_ready(&deployer, "dep-stuck", &fast_poll(4))
        .await
        .expect_err("poll should time out");

    match err {
        PublishError::DeployTimedOut {
            deploy_id,
            attempts,
        } => {
            assert_eq!(deploy_id, "dep-stuck");
            assert_eq!(attempts, 4);
        }
        other => panic!("Expected DeployTimedOut, got: {other:?}"),
    }
}

#[tokio::test]
async fn await_ready_stops_on_remote_error_state() {
    let mut deployer = MockDeployApi::new();
    deployer
        .expect_get_deploy()
        .times(1)
        .returning(|deploy_id| {
            Ok(Deployment {
                id: deploy_id.to_string(),
                state: DeployState::Error,
            })
        });

    let err = await_ready(&deployer, "dep-broken", &fast_poll(10))
        .await
        .expect_err("poll should stop on error state");

    assert!(
        matches!(err, PublishError::DeployFailed { ref deploy_id } if deploy_id == "dep-broken"),
        "Expected DeployFailed, got: {err:?}"
    );
}

#[tokio::test]
async fn await_ready_treats_unknown_states_as_in_flight() {
    // Provider-specific states like "uploading" deserialize to Unknown and
    // must keep the poll loop going.
    let mut deployer = MockDeployApi::new();
    let mut polls = 0;
    deployer
        .expect_get_deploy()
        .times(2)
        .returning(move |deploy_id| {
            polls += 1;
            let state = if polls < 2 {
                DeployState::Unknown
            } else {
                DeployState::Ready
            };
            Ok(Deployment {
                id: deploy_id.to_string(),
                state,
            })
        });

    let attempts = await_ready(&deployer, "dep-2", &fast_poll(10))
        .await
        .expect("poll should reach ready");

    assert_eq!(attempts, 2);
}

#[tokio::test]
async fn status_transport_failure_aborts_mid_poll() {
    let mut deployer = MockDeployApi::new();
    let mut polls = 0;
    deployer
        .expect_get_deploy()
        .times(2)
        .returning(move |deploy_id| {
            polls += 1;
            if polls < 2 {
                Ok(Deployment {
                    id: deploy_id.to_string(),
                    state: DeployState::Pending,
                })
            } else {
                Err("connection reset".to_string().into())
            }
        });

    let err = await_ready(&deployer, "dep-3", &fast_poll(10))
        .await
        .expect_err("poll should surface the transport failure");

    assert!(
        matches!(err, PublishError::Status(_)),
        "Expected a Status error, got: {err:?}"
    );
}

#[test]
fn deploy_states_deserialize_from_provider_strings() {
    let ready: DeployState = serde_json::from_str("\"ready\"").expect("ready parses");
    let pending: DeployState = serde_json::from_str("\"pending\"").expect("pending parses");
    let error: DeployState = serde_json::from_str("\"error\"").expect("error parses");
    let failed: DeployState = serde_json::from_str("\"failed\"").expect("failed parses");
    let uploading: DeployState = serde_json::from_str("\"uploading\"").expect("uploading parses");

    assert_eq!(ready, DeployState::Ready);
    assert_eq!(pending, DeployState::Pending);
    assert_eq!(error, DeployState::Error);
    assert_eq!(failed, DeployState::Error);
    assert_eq!(uploading, DeployState::Unknown);
}

#[test]
fn deployment_requires_an_id() {
    let err = serde_json::from_str::<Deployment>(r#"{"state":"pending"}"#);
    assert!(err.is_err(), "A creation response without an id is malformed");

    let ok: Deployment =
        serde_json::from_str(r#"{"id":"dep-9"}"#).expect("id alone is enough");
    assert_eq!(ok.id, "dep-9");
    assert_eq!(ok.state, DeployState::Pending, "state defaults to pending");
}
