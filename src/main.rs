//! `subsync` - upload locally indexed subtitles to a remote subtitle service.
//!
//! Reads subtitle files and their dialog lines from the local SQLite index
//! and creates the ones the service does not know yet, a few files at a time.

use anyhow::Context;
use bridge_desktop::{NoopProgress, ReqwestHttpClient, SqliteRecordSource, TerminalProgress};
use bridge_traits::{HttpClient, ProgressSink, RecordRange};
use clap::Parser;
use core_auth::{FileTokenProvider, StaticTokenProvider, TokenProvider};
use core_runtime::config::{SyncConfig, TokenSource, DEFAULT_PARALLEL, DEFAULT_UPLOAD_SLICE};
use core_runtime::logging::{init_logging, strip_path, LogFormat, LogLevel, LoggingConfig};
use core_sync::{SubtitleApi, SubtitleUploader, UploadOptions};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "subsync",
    version,
    about = "Upload locally indexed subtitle files and dialogs to a subtitle service"
)]
struct Args {
    /// Local subtitle database to read from.
    #[arg(long, value_name = "PATH")]
    database: PathBuf,

    /// Root URL of the subtitle service.
    #[arg(long, env = "SUBSYNC_BASE_URL")]
    base_url: String,

    /// Offset of the first record to upload.
    #[arg(long, default_value_t = 0)]
    begin: u64,

    /// Offset one past the last record to upload; 0 uploads to the end.
    #[arg(long, default_value_t = 0)]
    end: u64,

    /// Number of files uploaded at the same time.
    #[arg(long, default_value_t = DEFAULT_PARALLEL)]
    parallel: usize,

    /// Dialogs sent per bulk request.
    #[arg(long, default_value_t = DEFAULT_UPLOAD_SLICE)]
    slice: usize,

    /// Bearer token for the service.
    #[arg(long, env = "SUBSYNC_TOKEN", hide_env_values = true, conflicts_with = "token_file")]
    token: Option<String>,

    /// Account id stamped on every uploaded entity.
    #[arg(long, env = "SUBSYNC_USER_ID", conflicts_with = "token_file")]
    user_id: Option<String>,

    /// JSON file holding `token` and `id`.
    #[arg(long, value_name = "PATH")]
    token_file: Option<PathBuf>,

    /// Log level for the uploader crates (`trace` to `error`).
    #[arg(long, default_value = "info")]
    log_level: LogLevel,

    /// Log output format (`compact`, `pretty` or `json`).
    #[arg(long, default_value = "compact")]
    log_format: LogFormat,

    /// Full filter directive, overriding --log-level.
    #[arg(long, env = "RUST_LOG")]
    log_filter: Option<String>,

    /// Do not draw the progress bar.
    #[arg(long)]
    no_progress: bool,
}

impl Args {
    fn token_source(&self) -> Option<TokenSource> {
        if let Some(path) = &self.token_file {
            return Some(TokenSource::File(path.clone()));
        }
        match (&self.token, &self.user_id) {
            (Some(token), Some(user_id)) => Some(TokenSource::Static {
                token: token.clone(),
                user_id: user_id.clone(),
            }),
            _ => None,
        }
    }

    fn sync_config(&self) -> core_runtime::Result<SyncConfig> {
        let mut builder = SyncConfig::builder()
            .base_url(self.base_url.clone())
            .database_path(self.database.clone())
            .parallel(self.parallel)
            .upload_slice(self.slice)
            .range(RecordRange::new(self.begin, self.end));

        if let Some(source) = self.token_source() {
            builder = builder.token(source);
        }

        builder.build()
    }

    fn logging_config(&self) -> LoggingConfig {
        let config = LoggingConfig::default()
            .with_format(self.log_format)
            .with_level(self.log_level);

        match &self.log_filter {
            Some(filter) if !filter.trim().is_empty() => config.with_filter(filter.clone()),
            _ => config,
        }
    }
}

fn token_provider(source: &TokenSource) -> Box<dyn TokenProvider> {
    match source {
        TokenSource::Static { token, user_id } => {
            Box::new(StaticTokenProvider::new(token.clone(), user_id.clone()))
        }
        TokenSource::File(path) => Box::new(FileTokenProvider::new(path.clone())),
    }
}

#[core_async::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    init_logging(args.logging_config()).context("failed to initialise logging")?;
    let config = args.sync_config().context("invalid configuration")?;

    info!(
        base_url = %config.base_url,
        database = %strip_path(&config.database_path.to_string_lossy()),
        parallel = config.parallel,
        slice = config.upload_slice,
        range = %config.range,
        "Starting subsync"
    );

    let http_client: Arc<dyn HttpClient> =
        Arc::new(ReqwestHttpClient::new().context("failed to build HTTP client")?);
    let provider = token_provider(&config.token);
    let api = SubtitleApi::from_provider(http_client, &config.base_url, provider.as_ref())
        .await
        .context("failed to obtain credentials")?
        .with_upload_slice(config.upload_slice);

    let records = SqliteRecordSource::connect(&config.database_path)
        .await
        .with_context(|| {
            format!(
                "failed to open subtitle database {}",
                config.database_path.display()
            )
        })?;

    let progress: Arc<dyn ProgressSink> = if args.no_progress {
        Arc::new(NoopProgress)
    } else {
        Arc::new(TerminalProgress::new())
    };

    let uploader = SubtitleUploader::new(
        api,
        Arc::new(records),
        progress,
        UploadOptions::default()
            .with_parallel(config.parallel)
            .with_upload_slice(config.upload_slice),
    );

    uploader
        .run(config.range)
        .await
        .context("upload batch aborted")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(extra: &[&str]) -> Args {
        let mut argv = vec![
            "subsync",
            "--database",
            "/data/subtitles.db",
            "--base-url",
            "https://subs.example.com/",
        ];
        argv.extend_from_slice(extra);
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_defaults() {
        let args = parse(&["--token", "secret", "--user-id", "u1"]);
        let config = args.sync_config().unwrap();

        assert_eq!(config.base_url, "https://subs.example.com");
        assert_eq!(config.parallel, 2);
        assert_eq!(config.upload_slice, 400);
        assert_eq!(config.range, RecordRange::all());
        assert_eq!(args.log_level, LogLevel::Info);
        assert_eq!(args.log_format, LogFormat::Compact);
        assert!(!args.no_progress);
    }

    #[test]
    fn test_range_and_tuning() {
        let args = parse(&[
            "--token-file",
            "/secrets/token.json",
            "--begin",
            "10",
            "--end",
            "20",
            "--parallel",
            "4",
            "--slice",
            "100",
            "--log-format",
            "json",
        ]);
        let config = args.sync_config().unwrap();

        assert_eq!(config.range, RecordRange::new(10, 20));
        assert_eq!(config.parallel, 4);
        assert_eq!(config.upload_slice, 100);
        assert_eq!(
            config.token,
            TokenSource::File(PathBuf::from("/secrets/token.json"))
        );
        assert_eq!(args.log_format, LogFormat::Json);
    }

    #[test]
    fn test_missing_credentials_is_reported() {
        let args = Args {
            database: PathBuf::from("/data/subtitles.db"),
            base_url: "https://subs.example.com".to_string(),
            begin: 0,
            end: 0,
            parallel: DEFAULT_PARALLEL,
            slice: DEFAULT_UPLOAD_SLICE,
            token: Some("secret".to_string()),
            user_id: None,
            token_file: None,
            log_level: LogLevel::Info,
            log_format: LogFormat::Compact,
            log_filter: None,
            no_progress: false,
        };

        assert!(args.token_source().is_none());
        let err = args.sync_config().unwrap_err();
        assert!(err.to_string().contains("--token-file"));
    }

    #[test]
    fn test_token_file_conflicts_with_token() {
        let result = Args::try_parse_from([
            "subsync",
            "--database",
            "/data/subtitles.db",
            "--base-url",
            "https://subs.example.com",
            "--token",
            "secret",
            "--token-file",
            "/secrets/token.json",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_log_level_rejected() {
        let result = Args::try_parse_from([
            "subsync",
            "--database",
            "/data/subtitles.db",
            "--base-url",
            "https://subs.example.com",
            "--log-level",
            "loud",
        ]);
        assert!(result.is_err());
    }
}
