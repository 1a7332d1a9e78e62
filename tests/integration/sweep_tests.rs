//! End-to-end sweeps against mock target sites

use contact_sweep::config::{
    load_config_with_hash, Config, DiscoveryConfig, FetcherConfig, OutputConfig, SchedulerConfig,
    UserAgentConfig,
};
use contact_sweep::crawler::{run_backlog, Coordinator};
use contact_sweep::state::TargetStatus;
use contact_sweep::storage::{RunStatus, SqliteStore, TargetStore};
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration with pauses disabled
fn create_test_config(db_path: &Path) -> Config {
    Config {
        scheduler: SchedulerConfig {
            batch_size: 2,
            per_target_timeout_secs: 10,
            memory_threshold_pct: 100.0,
            memory_pause_secs: 0,
            inter_batch_pause_secs: 0,
        },
        user_agent: UserAgentConfig {
            crawler_name: "TestBot".to_string(),
            crawler_version: "1.0.0".to_string(),
            contact_url: "https://example.com/bot".to_string(),
            contact_email: "test@example.com".to_string(),
        },
        fetcher: FetcherConfig::default(),
        discovery: DiscoveryConfig::default(),
        output: OutputConfig {
            database_path: db_path.to_string_lossy().to_string(),
        },
        blacklist: vec![],
    }
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(
        format!("<html><body>{}</body></html>", body),
        "text/html; charset=utf-8",
    )
}

async fn mount_page(server: &MockServer, page: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(page))
        .respond_with(html(body))
        .mount(server)
        .await;
}

struct Harness {
    _dir: TempDir,
    db_path: std::path::PathBuf,
    store: SqliteStore,
}

impl Harness {
    fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let db_path = dir.path().join("sweep.db");
        let store = SqliteStore::new(&db_path).expect("Failed to open store");
        Self {
            _dir: dir,
            db_path,
            store,
        }
    }

    fn add(&mut self, name: &str, site_url: &str) -> i64 {
        self.store
            .insert_target(name, site_url)
            .expect("Failed to insert target")
    }

    fn status(&self, id: i64, site_url: &str) -> TargetStatus {
        self.store.get_target(id, site_url).unwrap().status
    }

    fn emails(&self, id: i64) -> Vec<String> {
        self.store
            .emails_for_target(id)
            .unwrap()
            .into_iter()
            .map(|e| e.address)
            .collect()
    }

    fn config(&self) -> Config {
        create_test_config(&self.db_path)
    }
}

#[tokio::test]
async fn test_email_found_on_contact_page() {
    let site = MockServer::start().await;
    mount_page(
        &site,
        "/",
        r#"<h1>Acme</h1><nav><a href="/contacto">Contacto</a><a href="/blog">Blog</a></nav>"#,
    )
    .await;
    mount_page(&site, "/contacto", "<p>Escríbenos a info@example.com</p>").await;
    Mock::given(method("GET"))
        .and(path("/blog"))
        .respond_with(html("blog@example.com"))
        .expect(0)
        .mount(&site)
        .await;

    let mut harness = Harness::new();
    let site_url = site.uri();
    let id = harness.add("Acme", &site_url);

    let summary = run_backlog(harness.config(), "test_hash")
        .await
        .expect("Sweep failed");

    assert_eq!(summary.with_email, 1);
    assert_eq!(summary.emails_inserted, 1);
    assert_eq!(harness.status(id, &site_url), TargetStatus::SuccessWithEmail);
    assert_eq!(harness.emails(id), vec!["info@example.com"]);

    let run = harness.store.get_latest_run().unwrap().unwrap();
    assert_eq!(run.status, RunStatus::Completed);
    assert_eq!(run.totals.with_email, 1);
}

#[tokio::test]
async fn test_mixed_outcomes_in_one_run() {
    let with_email = MockServer::start().await;
    mount_page(
        &with_email,
        "/",
        r#"<footer><a href="mailto:Ventas@Acme.example">Ventas@Acme.example</a></footer>"#,
    )
    .await;

    let without_email = MockServer::start().await;
    mount_page(&without_email, "/", "<p>Bienvenidos</p>").await;

    let broken = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&broken)
        .await;

    let mut harness = Harness::new();
    let a = harness.add("Acme", &with_email.uri());
    let b = harness.add("Beta", &without_email.uri());
    let c = harness.add("Gamma", &broken.uri());
    let d = harness.add("Social", "www.facebook.com/gamma");

    let summary = run_backlog(harness.config(), "test_hash")
        .await
        .expect("Sweep failed");

    assert_eq!(summary.targets_seen, 4);
    assert_eq!(summary.batches, 2);
    assert_eq!(summary.with_email, 1);
    assert_eq!(summary.without_email, 1);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.targets_skipped, 1);

    assert_eq!(
        harness.status(a, &with_email.uri()),
        TargetStatus::SuccessWithEmail
    );
    assert_eq!(harness.emails(a), vec!["ventas@acme.example"]);
    assert_eq!(
        harness.status(b, &without_email.uri()),
        TargetStatus::SuccessNoEmail
    );
    assert_eq!(harness.status(c, &broken.uri()), TargetStatus::Failed);
    assert!(harness.emails(c).is_empty());
    assert_eq!(
        harness.status(d, "www.facebook.com/gamma"),
        TargetStatus::Pending
    );
}

#[tokio::test]
async fn test_slow_site_times_out_without_partial_emails() {
    let site = MockServer::start().await;
    mount_page(
        &site,
        "/",
        r#"info@slow.example <a href="/contact">Contact us</a>"#,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/contact"))
        .respond_with(html("ventas@slow.example").set_delay(Duration::from_secs(5)))
        .mount(&site)
        .await;

    let mut harness = Harness::new();
    let id = harness.add("Slow", &site.uri());

    let mut config = harness.config();
    config.scheduler.per_target_timeout_secs = 1;

    let summary = run_backlog(config, "test_hash").await.expect("Sweep failed");

    assert_eq!(summary.failed, 1);
    assert_eq!(harness.status(id, &site.uri()), TargetStatus::Failed);
    assert!(harness.emails(id).is_empty());
}

#[tokio::test]
async fn test_cross_site_contact_links_not_followed() {
    let other = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/contact"))
        .respond_with(html("leak@other.example"))
        .expect(0)
        .mount(&other)
        .await;

    let site = MockServer::start().await;
    let base_page = format!(
        r#"<a href="{}/contact">Contact</a><a href="/about">About</a>"#,
        other.uri()
    );
    mount_page(&site, "/", &base_page).await;
    mount_page(&site, "/about", "<p>Equipo Acme</p>").await;

    let mut harness = Harness::new();
    let id = harness.add("Acme", &site.uri());

    run_backlog(harness.config(), "test_hash")
        .await
        .expect("Sweep failed");

    assert_eq!(harness.status(id, &site.uri()), TargetStatus::SuccessNoEmail);
}

#[tokio::test]
async fn test_non_html_base_page_fails() {
    let site = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw("info@pdf.example", "application/pdf"),
        )
        .mount(&site)
        .await;

    let mut harness = Harness::new();
    let id = harness.add("Pdf", &site.uri());

    run_backlog(harness.config(), "test_hash")
        .await
        .expect("Sweep failed");

    assert_eq!(harness.status(id, &site.uri()), TargetStatus::Failed);
    assert!(harness.emails(id).is_empty());
}

#[tokio::test]
async fn test_finished_targets_not_recrawled() {
    let site = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html("hola@acme.example"))
        .expect(1)
        .mount(&site)
        .await;

    let mut harness = Harness::new();
    harness.add("Acme", &site.uri());

    let first = run_backlog(harness.config(), "test_hash")
        .await
        .expect("First sweep failed");
    assert_eq!(first.with_email, 1);

    let second = run_backlog(harness.config(), "test_hash")
        .await
        .expect("Second sweep failed");
    assert_eq!(second.targets_seen, 0);
    assert_eq!(harness.store.count_emails().unwrap(), 1);
}

#[tokio::test]
async fn test_sweep_from_config_file() {
    let site = MockServer::start().await;
    mount_page(&site, "/", r#"<a href="/kontakt">Kontakt</a>"#).await;
    mount_page(&site, "/kontakt", "buero@firma.example").await;

    let mut harness = Harness::new();
    let id = harness.add("Firma", &site.uri());

    let config_path = harness.db_path.with_file_name("sweep.toml");
    let toml = format!(
        r#"
[scheduler]
memory-threshold-pct = 100.0
memory-pause-secs = 0
inter-batch-pause-secs = 0

[user-agent]
crawler-name = "TestBot"
crawler-version = "1.0"
contact-url = "https://example.com/bot"
contact-email = "test@example.com"

[discovery]
extra-keywords = ["kontakt"]

[output]
database-path = "{}"
"#,
        harness.db_path.display()
    );
    std::fs::write(&config_path, toml).expect("Failed to write config");

    let (config, hash) = load_config_with_hash(&config_path).expect("Failed to load config");
    let summary = run_backlog(config, &hash).await.expect("Sweep failed");

    assert_eq!(summary.with_email, 1);
    assert_eq!(harness.emails(id), vec!["buero@firma.example"]);

    let run = harness.store.get_latest_run().unwrap().unwrap();
    assert_eq!(run.config_hash, hash);
}

#[tokio::test]
async fn test_dry_run_preview_does_not_fetch() {
    let site = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(html("never@fetched.example"))
        .expect(0)
        .mount(&site)
        .await;

    let mut harness = Harness::new();
    harness.add("Acme", &site.uri());
    harness.add("Empty", "");

    let coordinator = Coordinator::new(harness.config(), "test_hash").unwrap();
    let preview = coordinator.preview().unwrap();

    assert_eq!(preview.len(), 2);
    assert!(preview[0].1.is_ok());
    assert!(preview[1].1.is_err());
    assert_eq!(harness.store.list_pending_targets().unwrap().len(), 2);
}
