//! Log output of the upload units spawned by a batch

use async_trait::async_trait;
use bridge_traits::error::{BridgeError, Result as BridgeResult};
use bridge_traits::{
    DialogLine, HttpClient, HttpMethod, HttpRequest, HttpResponse, NoopProgress, RecordRange,
    RecordSource, SubtitleRecord,
};
use core_auth::AuthData;
use core_sync::{SubtitleApi, SubtitleUploader, UploadOptions};
use futures::stream::{self, BoxStream, StreamExt};
use std::sync::{Arc, Mutex};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::Layer;

/// Records the span names enclosing every event, root first
#[derive(Clone, Default)]
struct ScopeRecorder {
    scopes: Arc<Mutex<Vec<Vec<String>>>>,
}

impl<S> Layer<S> for ScopeRecorder
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
        let names = ctx
            .event_scope(event)
            .map(|scope| scope.from_root().map(|span| span.name().to_string()).collect())
            .unwrap_or_default();
        self.scopes.lock().unwrap().push(names);
    }
}

/// Knows no file and refuses every create
struct RefusingService;

/// Already holds every file
struct KnowingService;

#[async_trait]
impl HttpClient for KnowingService {
    async fn execute(&self, _request: HttpRequest) -> BridgeResult<HttpResponse> {
        Ok(HttpResponse::new(200, r#"{"id":"f9","sha1":"aaa111"}"#))
    }
}

#[async_trait]
impl HttpClient for RefusingService {
    async fn execute(&self, request: HttpRequest) -> BridgeResult<HttpResponse> {
        Ok(match request.method {
            HttpMethod::Get => HttpResponse::new(404, r#"{"detail":"Not Found"}"#),
            _ => HttpResponse::new(500, r#"{"detail":"boom"}"#),
        })
    }
}

struct TwoRecords;

#[async_trait]
impl RecordSource for TwoRecords {
    async fn count(&self, range: RecordRange) -> BridgeResult<u64> {
        Ok(range.clamp_count(2))
    }

    fn iterate(&self, _range: RecordRange) -> BoxStream<'_, BridgeResult<SubtitleRecord>> {
        let records = ["aaa111", "bbb222"].map(|sha1| {
            Ok::<_, BridgeError>(SubtitleRecord {
                sha1: sha1.to_string(),
                filename: format!("{}.ass", sha1),
                series_id: Some("s1".to_string()),
                series_name: Some("Frieren".to_string()),
                path: format!("/subs/{}.ass", sha1),
                dialogs: vec![DialogLine::new("hello", 0, 500)],
            })
        });
        stream::iter(records).boxed()
    }
}

/// Run a two-record batch against `client`, returning the scope of each event
async fn recorded_scopes(client: Arc<dyn HttpClient>) -> Vec<Vec<String>> {
    let recorder = ScopeRecorder::default();
    let subscriber = tracing_subscriber::registry().with(recorder.clone());
    let _guard = tracing::subscriber::set_default(subscriber);

    let uploader = SubtitleUploader::new(
        SubtitleApi::new(client, "http://subs.test", AuthData::new("tok", "u1")),
        Arc::new(TwoRecords),
        Arc::new(NoopProgress),
        UploadOptions::default().with_parallel(2),
    );
    uploader.run(RecordRange::all()).await.unwrap();

    let scopes = recorder.scopes.lock().unwrap().clone();
    scopes
}

fn unit_scopes(scopes: &[Vec<String>]) -> Vec<&Vec<String>> {
    scopes
        .iter()
        .filter(|names| names.iter().any(|name| name == "upload_subtitles"))
        .collect()
}

#[core_async::test]
async fn test_unit_events_carry_batch_span() {
    let scopes = recorded_scopes(Arc::new(RefusingService)).await;
    let units = unit_scopes(&scopes);

    assert!(!units.is_empty());
    for names in units {
        assert_eq!(names.first().map(String::as_str), Some("upload_batch"));
    }
}

#[core_async::test]
async fn test_skipped_file_is_logged_once() {
    let scopes = recorded_scopes(Arc::new(KnowingService)).await;

    // One line per skipped record
    assert_eq!(unit_scopes(&scopes).len(), 2);
}
