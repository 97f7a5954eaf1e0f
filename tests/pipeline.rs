//! End-to-end job tests: sheet input, mocked providers, local tables.

mod common;

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use crawler::error::Result;
use crawler::models::{Config, UrlInfo};
use crawler::pipeline::{JobContext, JobReport, JobRunner, ProgressReporter, UrlsJob};
use crawler::storage::{LocalTableStore, ProgressTracker, TableStore};
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{config_for, credentials, input_sheet, instagram_item, instagram_media};

const DOC: &str = "doc";
const SHEET: &str = "Лист1";

fn setup(config: Config) -> (TempDir, Arc<LocalTableStore>, JobRunner) {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(LocalTableStore::new(dir.path()));
    let ctx = JobContext::new(config, &credentials(), store.clone()).unwrap();
    (dir, store, JobRunner::new(ctx))
}

#[tokio::test]
async fn test_urls_job_writes_rows_and_progress() {
    let server = MockServer::start().await;
    let reel = "https://www.instagram.com/reel/DAbc/";
    Mock::given(method("GET"))
        .and(path("/v1/media_info"))
        .and(query_param("code_or_id_or_url", reel))
        .respond_with(ResponseTemplate::new(200).set_body_json(instagram_media("DAbc", 173514, 3891)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/video.get"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let (_dir, store, runner) = setup(config_for(&server.uri()));
    store
        .put_rows(
            DOC,
            SHEET,
            input_sheet(
                "видео",
                &[
                    (reel, true, 0),
                    ("https://vk.com/clip-1_2", true, 0),
                    ("https://t.me/channel/5", true, 0),
                ],
            ),
        )
        .await
        .unwrap();

    let report = runner.submit_urls(false, SHEET, DOC).wait().await.unwrap();
    let JobReport::Urls(outcome) = report else {
        panic!("expected urls report");
    };
    assert_eq!(outcome.rows.len(), 2);
    assert_eq!(outcome.placeholders, 1);
    assert!(outcome.written);

    let rows = store.read_rows(DOC, "Сырые данные", 1).await.unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0][0], reel);
    assert_eq!(rows[0][1], 173514);
    assert_eq!(rows[0][2], 3891);
    assert_eq!(rows[1][0], "https://vk.com/clip-1_2");
    assert_eq!(rows[1][1], 0);
    assert_eq!(rows[1][8], "unknown");

    let progress = store.read_rows(DOC, "Прогресс", 1).await.unwrap();
    assert_eq!(progress[1][1], 2);
    assert_eq!(progress[1][2], 2);
    assert!(!progress[1][3].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn test_urls_job_respects_selection() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/media_info"))
        .respond_with(ResponseTemplate::new(200).set_body_json(instagram_media("x", 1, 1)))
        .expect(1)
        .mount(&server)
        .await;

    let (_dir, store, runner) = setup(config_for(&server.uri()));
    store
        .put_rows(
            DOC,
            SHEET,
            input_sheet(
                "видео",
                &[
                    ("https://www.instagram.com/reel/a/", true, 0),
                    ("https://www.instagram.com/reel/b/", false, 0),
                ],
            ),
        )
        .await
        .unwrap();

    let report = runner.submit_urls(true, SHEET, DOC).wait().await.unwrap();
    let JobReport::Urls(outcome) = report else {
        panic!("expected urls report");
    };
    assert_eq!(outcome.processed, 1);
}

#[derive(Default)]
struct UpdateLog {
    updates: Mutex<Vec<usize>>,
}

#[async_trait]
impl ProgressTracker for UpdateLog {
    async fn ensure_progress_sheet(&self, _spreadsheet: &str) -> Result<()> {
        Ok(())
    }

    async fn start_parsing(&self, _spreadsheet: &str, _total: usize) -> Result<usize> {
        Ok(2)
    }

    async fn update_progress(&self, _spreadsheet: &str, _row: usize, processed: usize) -> Result<()> {
        self.updates.lock().unwrap().push(processed);
        Ok(())
    }

    async fn finish_parsing(&self, _spreadsheet: &str, _row: usize) -> Result<()> {
        Ok(())
    }
}

#[tokio::test]
async fn test_urls_run_reports_after_each_batch() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/media_info"))
        .respond_with(ResponseTemplate::new(200).set_body_json(instagram_media("x", 5, 1)))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let store = Arc::new(LocalTableStore::new(dir.path()));
    let ctx = JobContext::new(config_for(&server.uri()), &credentials(), store).unwrap();
    let log = Arc::new(UpdateLog::default());

    let items: Vec<UrlInfo> = ["a", "b", "c", "d", "e"]
        .iter()
        .map(|code| UrlInfo::new(format!("https://www.instagram.com/reel/{code}/"), 0))
        .collect();
    let mut reporter = ProgressReporter::new(log.clone(), DOC);
    reporter.begin(items.len()).await;

    let outcome = UrlsJob::new(&ctx).run(&items, 2, &mut reporter).await;

    assert_eq!(*log.updates.lock().unwrap(), vec![2, 4, 5]);
    let urls: Vec<_> = outcome.rows.iter().map(|r| r.url.as_str()).collect();
    let expected: Vec<_> = items.iter().map(|i| i.url.as_str()).collect();
    assert_eq!(urls, expected);
}

#[tokio::test]
async fn test_accounts_job_writes_per_account() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/user_reels"))
        .and(query_param("username_or_id", "someone"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "ok",
            "data": {
                "items": [
                    {"media": instagram_item("R1", 100, 10)},
                    {"media": instagram_item("R2", 200, 20)},
                    {"media": instagram_item("R3", 300, 30)}
                ],
                "paging_info": {"max_id": "next", "more_available": true}
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (_dir, store, runner) = setup(config_for(&server.uri()));
    store
        .put_rows(
            DOC,
            SHEET,
            input_sheet(
                "аккаунт",
                &[
                    ("https://www.instagram.com/someone", true, 2),
                    ("https://vk.com/", true, 5),
                ],
            ),
        )
        .await
        .unwrap();

    let report = runner.submit_accounts(false, SHEET, DOC).wait().await.unwrap();
    let JobReport::Accounts(outcome) = report else {
        panic!("expected accounts report");
    };
    assert_eq!(outcome.processed, 2);
    assert_eq!(outcome.skipped, 1);
    assert_eq!(outcome.rows_written, 2);

    let rows = store.read_rows(DOC, "Данные аккаунтов", 1).await.unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0][0], "https://www.instagram.com/someone");
    assert_eq!(rows[0][1], "https://www.instagram.com/reel/R1/");
    assert_eq!(rows[1][1], "https://www.instagram.com/reel/R2/");
    assert_eq!(rows[1][2], 200);
}

#[tokio::test]
async fn test_failed_listing_leaves_placeholder() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/clips"))
        .and(query_param("owner_id", "chplk:-5"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let (_dir, store, runner) = setup(config_for(&server.uri()));
    store
        .put_rows(
            DOC,
            SHEET,
            input_sheet("аккаунт", &[("https://vk.com/club5", true, 0)]),
        )
        .await
        .unwrap();

    let report = runner.submit_accounts(false, SHEET, DOC).wait().await.unwrap();
    let JobReport::Accounts(outcome) = report else {
        panic!("expected accounts report");
    };
    assert_eq!(outcome.truncated, 1);
    assert_eq!(outcome.rows_written, 1);

    let rows = store.read_rows(DOC, "Данные аккаунтов", 1).await.unwrap();
    assert_eq!(rows[0][0], "https://vk.com/club5");
    assert_eq!(rows[0][1], "https://vk.com/club5");
    assert_eq!(rows[0][9], "unknown");
}

#[tokio::test]
async fn test_vk_account_resolves_group_before_listing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/groups.getById"))
        .and(query_param("group_id", "somegroup"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "response": {"groups": [{"id": 42}]}
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/users/clips"))
        .and(query_param("owner_id", "chplk:-42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "ok",
            "data": {
                "clips": [{
                    "id": 9, "owner_id": -42, "description": "clip",
                    "views": 100, "comments": 1, "date": 1704067200,
                    "likes": {"count": 10}, "reposts": {"count": 2}
                }],
                "cursor": ""
            }
        })))
        .expect(2)
        .mount(&server)
        .await;

    let (_dir, store, runner) = setup(config_for(&server.uri()));
    store
        .put_rows(
            DOC,
            SHEET,
            input_sheet(
                "аккаунт",
                &[
                    ("https://vk.com/somegroup", true, 0),
                    ("https://vk.com/somegroup?w=wall", true, 0),
                ],
            ),
        )
        .await
        .unwrap();

    let report = runner.submit_accounts(false, SHEET, DOC).wait().await.unwrap();
    let JobReport::Accounts(outcome) = report else {
        panic!("expected accounts report");
    };
    assert_eq!(outcome.skipped, 0);
    assert_eq!(outcome.rows_written, 2);

    let rows = store.read_rows(DOC, "Данные аккаунтов", 1).await.unwrap();
    assert_eq!(rows[0][1], "https://vk.com/clip-42_9");
    assert_eq!(rows[0][2], 100);
}

#[tokio::test]
async fn test_parse_account_returns_rows() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/user/posts"))
        .and(query_param("unique_id", "dancer"))
        .and(query_param("cursor", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 0,
            "msg": "success",
            "data": {
                "videos": [
                    {"video_id": "111", "title": "one", "play_count": 1000, "digg_count": 50,
                     "comment_count": 5, "share_count": 3, "create_time": 1704067200},
                    {"video_id": "222", "title": "two", "play_count": 0, "digg_count": 0,
                     "comment_count": 0, "share_count": 0, "create_time": 1704067200}
                ],
                "cursor": "2",
                "hasMore": false
            }
        })))
        .mount(&server)
        .await;

    let (_dir, _store, runner) = setup(config_for(&server.uri()));
    let rows = runner
        .parse_account("https://www.tiktok.com/@dancer")
        .await
        .unwrap();

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].account_url, "https://www.tiktok.com/@dancer");
    assert_eq!(rows[0].row.url, "https://www.tiktok.com/@dancer/video/111");
    assert_eq!(rows[0].row.er, "5.80%");
    assert_eq!(rows[0].row.virality, "0.30%");
    assert_eq!(rows[0].row.publish_date, "01.01.2024 03:00");
    assert_eq!(rows[1].row.er, "0");
}

#[tokio::test]
async fn test_missing_key_still_yields_rows() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let store = Arc::new(LocalTableStore::new(dir.path()));
    let mut creds = credentials();
    creds.rapidapi_key = None;
    let ctx = JobContext::new(config_for(&server.uri()), &creds, store.clone()).unwrap();
    store
        .put_rows(
            DOC,
            SHEET,
            input_sheet("видео", &[("https://www.instagram.com/reel/a/", true, 0)]),
        )
        .await
        .unwrap();

    let report = JobRunner::new(ctx)
        .submit_urls(false, SHEET, DOC)
        .wait()
        .await
        .unwrap();
    let JobReport::Urls(outcome) = report else {
        panic!("expected urls report");
    };
    assert_eq!(outcome.placeholders, 1);
    assert!(outcome.rows[0].is_placeholder());
}
