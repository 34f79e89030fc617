use crate::helpers::{CollectingSink, FakeAdmin, eventually, fast_config, local_instance};

use tooling_core::manager::ToolingManager;

use models::ServerInstance;

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

const RECORD: &str = "[#|2026-10-19T09:15:30.123+0000|INFO|Payara 6.2024.6|javax.enterprise.logging|_ThreadID=1;|Server started|#]\n";

fn manager(sink: Arc<CollectingSink>) -> ToolingManager {
    ToolingManager::builder()
        .with_config(fast_config())
        .with_admin(Arc::new(FakeAdmin::reporting("6.2024.6")))
        .with_sink(sink)
        .build()
        .unwrap()
}

/// **VALUE**: Verifies the server log is tailed and its records rendered.
///
/// **WHY THIS MATTERS**: Servers started outside this tool only show up through their
/// `server.log`; records appended after attaching must reach the view.
#[tokio::test]
async fn given_domain_log_when_followed_then_appended_records_rendered() {
    // GIVEN: A domain with an existing server.log
    let domains = tempfile::tempdir().unwrap();
    let log_dir = domains.path().join("domain1").join("logs");
    std::fs::create_dir_all(&log_dir).unwrap();
    let log_path = log_dir.join("server.log");
    std::fs::write(&log_path, RECORD).unwrap();

    let sink = Arc::new(CollectingSink::default());
    let manager = manager(sink.clone());
    manager
        .register(local_instance("payara6", domains.path(), 4848))
        .unwrap();

    // WHEN: Following from the start, then appending a record
    let readers = manager.follow_server_log("payara6", true).unwrap();
    assert_eq!(readers, 1);
    assert!(eventually(Duration::from_secs(3), || !sink.lines().is_empty()).await);

    let mut file = std::fs::OpenOptions::new().append(true).open(&log_path).unwrap();
    file.write_all(RECORD.replace("Server started", "Deployed app").as_bytes())
        .unwrap();
    file.flush().unwrap();

    // THEN: Both records arrive rendered with their level
    assert!(eventually(Duration::from_secs(3), || sink.lines().len() >= 2).await);
    let lines = sink.lines();
    assert_eq!(lines[0], "INFO: Server started\n");
    assert_eq!(lines[1], "INFO: Deployed app\n");

    assert!(manager.log_views().stop("payara6"));
    assert_eq!(manager.log_views().active_readers("payara6"), 0);
    manager.shutdown();
}

#[tokio::test]
async fn given_remote_instance_when_log_followed_then_error() {
    let manager = manager(Arc::new(CollectingSink::default()));
    let remote = ServerInstance::builder()
        .with_name("remote")
        .with_host("db.example.com")
        .build()
        .unwrap();
    manager.register(remote).unwrap();

    assert!(manager.follow_server_log("remote", false).is_err());
}

#[tokio::test]
async fn given_domain_log_when_read_once_then_all_records_rendered_without_reader() {
    let domains = tempfile::tempdir().unwrap();
    let log_dir = domains.path().join("domain1").join("logs");
    std::fs::create_dir_all(&log_dir).unwrap();
    let content = format!(
        "{RECORD}{}",
        "[#|2026-10-19T09:15:31.000+0000|SEVERE|Payara 6.2024.6|app|_ThreadID=2;|Boom\n\tat com.example.Main.run(Main.java:42)|#]\n"
    );
    std::fs::write(log_dir.join("server.log"), content).unwrap();

    let sink = Arc::new(CollectingSink::default());
    let manager = manager(sink.clone());
    manager
        .register(local_instance("payara6", domains.path(), 4848))
        .unwrap();

    let count = manager.read_server_log("payara6").await.unwrap();

    assert_eq!(count, 3);
    assert_eq!(
        sink.lines(),
        vec![
            String::from("INFO: Server started\n"),
            String::from("SEVERE: Boom\n"),
            String::from("\tat com.example.Main.run(Main.java:42)\n"),
        ]
    );
    assert_eq!(manager.log_views().active_readers("payara6"), 0);
}

#[tokio::test]
async fn given_missing_log_when_read_once_then_nothing_rendered() {
    let domains = tempfile::tempdir().unwrap();
    let sink = Arc::new(CollectingSink::default());
    let manager = manager(sink.clone());
    manager
        .register(local_instance("payara6", domains.path(), 4848))
        .unwrap();

    assert_eq!(manager.read_server_log("payara6").await.unwrap(), 0);
    assert!(sink.lines().is_empty());
}

/// **VALUE**: Verifies overlapping reader starts leave exactly one reader set behind.
///
/// **WHY THIS MATTERS**: A start task attaches the launched process output while the user
/// may be following server.log for the same instance; both replace the reader set.
///
/// **BUG THIS CATCHES**: Would catch a replaced set being dropped without abort, which
/// leaves an orphaned reader that renders every appended record a second time.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn given_concurrent_follows_when_record_appended_then_rendered_once() {
    // GIVEN: An existing server.log
    let domains = tempfile::tempdir().unwrap();
    let log_path = domains.path().join("server.log");
    std::fs::write(&log_path, RECORD).unwrap();
    let sink = Arc::new(CollectingSink::default());
    let manager = manager(sink.clone());
    let views = Arc::clone(manager.log_views());

    // WHEN: Many follows of the same instance race each other
    let tasks: Vec<_> = (0..16)
        .map(|_| {
            let views = Arc::clone(&views);
            let path = log_path.clone();
            tokio::spawn(async move { views.follow_file("payara6", path, false) })
        })
        .collect();
    for task in tasks {
        task.await.unwrap();
    }
    assert_eq!(views.active_readers("payara6"), 1);

    let mut file = std::fs::OpenOptions::new().append(true).open(&log_path).unwrap();
    file.write_all(RECORD.replace("Server started", "Deployed app").as_bytes())
        .unwrap();
    file.flush().unwrap();

    // THEN: The appended record is rendered by a single reader
    assert!(eventually(Duration::from_secs(3), || !sink.lines().is_empty()).await);
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(sink.lines(), vec!["INFO: Deployed app\n"]);
    manager.shutdown();
}
