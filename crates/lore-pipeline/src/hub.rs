//! Pipeline orchestrator: Extract -> Summarize -> Write -> Record.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::info;

use lore_core::{
    find_related, CancelFlag, ContentType, Error, EventBus, ExtractionResult, HubConfig,
    NewContent, PipelineEvent, PipelineStage, RelatedItem, Result, RetryPolicy, SavedImage,
    retry_with_backoff,
};
use lore_db::{ContentStore, SqlitePool};
use lore_extract::{
    download_article_images, ArticleExtractor, FileExtractor, Locator, VideoExtractor,
};
use lore_inference::{backend_from_config, SummarizationBackend, SummarizationRequest};

use crate::note::parse_sections;
use crate::writer::{NoteMetadata, NoteWriter};

/// Outcome of one successful pipeline run.
#[derive(Debug, Clone)]
pub struct ProcessedNote {
    pub content_id: i64,
    pub note_path: PathBuf,
    pub title: String,
    pub tags: Vec<String>,
}

/// The knowledge hub: one instance per vault, shared by all callers.
pub struct Hub {
    config: HubConfig,
    backend: Arc<dyn SummarizationBackend>,
    store: ContentStore,
    article: ArticleExtractor,
    video: VideoExtractor,
    files: FileExtractor,
    writer: NoteWriter,
    image_client: reqwest::Client,
    events: EventBus,
    cancel: CancelFlag,
}

impl Hub {
    pub fn new(config: HubConfig, pool: SqlitePool) -> Result<Self> {
        let backend = backend_from_config(&config)?;
        Ok(Self {
            article: ArticleExtractor::new(&config),
            video: VideoExtractor::new(&config),
            files: FileExtractor::new(),
            writer: NoteWriter::new(&config),
            store: ContentStore::new(pool),
            image_client: reqwest::Client::new(),
            events: EventBus::default(),
            cancel: CancelFlag::new(),
            backend,
            config,
        })
    }

    /// Swap the summarization backend. Used by tests and demos.
    pub fn with_backend(mut self, backend: Arc<dyn SummarizationBackend>) -> Self {
        self.backend = backend;
        self
    }

    /// Swap the video extractor. Used by tests to stub the downloader.
    pub fn with_video_extractor(mut self, video: VideoExtractor) -> Self {
        self.video = video;
        self
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Advisory cancellation handle, checked between stages.
    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    pub fn store(&self) -> &ContentStore {
        &self.store
    }

    pub fn config(&self) -> &HubConfig {
        &self.config
    }

    /// Run the full ingestion pipeline for one locator.
    ///
    /// Errors from any stage propagate untouched so callers can render
    /// the kind, message and suggested action. A set cancel flag stops
    /// the run at the next stage boundary with [`Error::Cancelled`].
    pub async fn process(
        &self,
        locator: &Locator,
        context: Option<String>,
    ) -> Result<ProcessedNote> {
        info!(
            subsystem = "pipeline",
            component = "hub",
            op = "process",
            source_url = %locator.source(),
            "Pipeline started"
        );

        let extraction = self
            .run_stage(PipelineStage::Extract, self.extract(locator))
            .await?;

        let request = SummarizationRequest {
            title: extraction.title.clone(),
            text: extraction.text.clone(),
            context,
        };
        let backend = self.backend.clone();
        let summary = self
            .run_stage(
                PipelineStage::Summarize,
                retry_with_backoff(RetryPolicy::default(), "OpenAI", move || {
                    let backend = backend.clone();
                    let request = request.clone();
                    async move { backend.summarize(&request).await }
                }),
            )
            .await?;

        let note_path = self
            .run_stage(PipelineStage::Write, async {
                let images = self.fetch_images(locator, &extraction).await?;
                self.writer.write_note(
                    &summary,
                    &extraction.title,
                    url_of(locator),
                    &images,
                    NoteMetadata::from_extraction(&extraction).as_ref(),
                )
            })
            .await?;

        let processed = self
            .run_stage(
                PipelineStage::Record,
                self.record(locator, &extraction, &summary, &note_path),
            )
            .await?;

        self.events.emit(PipelineEvent::Completed {
            note_path: processed.note_path.display().to_string(),
            content_id: processed.content_id,
            title: processed.title.clone(),
        });
        info!(
            subsystem = "pipeline",
            component = "hub",
            op = "process",
            content_id = processed.content_id,
            file_path = %processed.note_path.display(),
            "Pipeline completed"
        );
        Ok(processed)
    }

    /// Items related to a stored item, scored against the whole vault.
    pub async fn related(&self, id: i64) -> Result<Vec<RelatedItem>> {
        let source = self
            .store
            .get_by_id(id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("content item {}", id)))?;
        let candidates = self.store.list(None, None).await?;
        Ok(find_related(
            &source,
            &candidates,
            self.config.related_min_score,
            self.config.related_max,
        ))
    }

    async fn run_stage<T, F>(&self, stage: PipelineStage, work: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        if self.cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        self.events.emit(PipelineEvent::StageStarted { stage });
        match work.await {
            Ok(value) => {
                self.events.emit(PipelineEvent::StageCompleted { stage });
                Ok(value)
            }
            Err(e) => {
                self.events.emit(PipelineEvent::Failed {
                    stage,
                    error: e.to_string(),
                });
                Err(e)
            }
        }
    }

    async fn extract(&self, locator: &Locator) -> Result<ExtractionResult> {
        match locator {
            Locator::Url(url) if locator.is_video() => self.video.extract(url).await,
            Locator::Url(url) => self.article.extract(url).await,
            Locator::File(path) => self.files.extract(path).await,
        }
    }

    /// Article image side-channel. Single-image failures are skipped
    /// inside the downloader; only vault-level failures surface here.
    async fn fetch_images(
        &self,
        locator: &Locator,
        extraction: &ExtractionResult,
    ) -> Result<Vec<SavedImage>> {
        let is_article = extraction.content_type == Some(ContentType::Article);
        if !is_article || extraction.image_urls.is_empty() || url_of(locator).is_none() {
            return Ok(Vec::new());
        }
        download_article_images(
            &self.image_client,
            &extraction.image_urls,
            &extraction.title,
            self.writer.vault_dir(),
            self.config.max_images,
            self.config.max_image_bytes,
        )
        .await
    }

    async fn record(
        &self,
        locator: &Locator,
        extraction: &ExtractionResult,
        summary: &str,
        note_path: &Path,
    ) -> Result<ProcessedNote> {
        let sections = parse_sections(summary);
        let tags = sections.suggested_tags();
        let file_size = std::fs::metadata(note_path)
            .map(|m| m.len() as i64)
            .unwrap_or(0);

        let new = NewContent {
            file_path: note_path.display().to_string(),
            title: extraction.title.clone(),
            content_type: extraction.content_type.unwrap_or(ContentType::Text),
            source_url: url_of(locator).map(str::to_string),
            file_size,
            tags: tags.clone(),
            summary: sections.summary().map(str::to_string),
            key_takeaways: sections.key_takeaways().map(str::to_string),
            author: extraction.authors.first().cloned(),
            word_count: extraction.word_count as i64,
        };
        let content_id = self.store.add_content(&new).await?;

        Ok(ProcessedNote {
            content_id,
            note_path: note_path.to_path_buf(),
            title: extraction.title.clone(),
            tags,
        })
    }
}

fn url_of(locator: &Locator) -> Option<&str> {
    match locator {
        Locator::Url(url) => Some(url.as_str()),
        Locator::File(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lore_db::{create_pool, init_schema};
    use lore_inference::MockBackend;
    use std::path::Path;

    async fn hub_in(dir: &Path) -> Hub {
        let config = HubConfig {
            vault_path: dir.display().to_string(),
            backend: "mock".to_string(),
            ..HubConfig::default()
        };
        let pool = create_pool(config.database_path()).await.unwrap();
        init_schema(&pool).await.unwrap();
        Hub::new(config, pool).unwrap()
    }

    fn sample_file(dir: &Path) -> PathBuf {
        let path = dir.join("reading_list.txt");
        std::fs::write(
            &path,
            "ownership ownership borrowing borrowing lifetimes in depth notes",
        )
        .unwrap();
        path
    }

    #[tokio::test]
    async fn test_full_run_writes_note_and_records_row() {
        let dir = tempfile::tempdir().unwrap();
        let hub = hub_in(dir.path()).await;
        let source = sample_file(dir.path());

        let processed = hub
            .process(&Locator::file(&source), None)
            .await
            .unwrap();

        assert!(processed.note_path.exists());
        assert_eq!(processed.title, "Reading List");
        assert!(processed.tags.contains(&"ownership".to_string()));

        let stored = hub
            .store()
            .get_by_id(processed.content_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.title, "Reading List");
        assert_eq!(stored.content_type, ContentType::Text);
        assert_eq!(stored.tags, processed.tags);
        assert!(stored.summary.is_some());
        assert!(stored.file_size > 0);
    }

    #[tokio::test]
    async fn test_stage_events_emitted_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let hub = hub_in(dir.path()).await;
        let source = sample_file(dir.path());
        let mut events = hub.events().subscribe();

        hub.process(&Locator::file(&source), None).await.unwrap();

        let mut stages_started = Vec::new();
        let mut completed = false;
        while let Ok(event) = events.try_recv() {
            match event {
                PipelineEvent::StageStarted { stage } => stages_started.push(stage),
                PipelineEvent::Completed { .. } => completed = true,
                _ => {}
            }
        }
        assert_eq!(
            stages_started,
            vec![
                PipelineStage::Extract,
                PipelineStage::Summarize,
                PipelineStage::Write,
                PipelineStage::Record,
            ]
        );
        assert!(completed);
    }

    #[tokio::test]
    async fn test_cancel_before_run_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let hub = hub_in(dir.path()).await;
        let source = sample_file(dir.path());

        hub.cancel_flag().cancel();
        let err = hub
            .process(&Locator::file(&source), None)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Cancelled));

        let notes: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().map(|x| x == "md").unwrap_or(false))
            .collect();
        assert!(notes.is_empty());
        assert!(hub.store().list(None, None).await.unwrap().is_empty());
    }

    /// Backend that requests cancellation while summarizing, so the flag
    /// is first observed at the next stage boundary.
    #[derive(Debug)]
    struct CancellingBackend {
        inner: MockBackend,
        flag: CancelFlag,
    }

    #[async_trait::async_trait]
    impl SummarizationBackend for CancellingBackend {
        async fn summarize(&self, request: &SummarizationRequest) -> Result<String> {
            self.flag.cancel();
            self.inner.summarize(request).await
        }

        fn name(&self) -> &str {
            "mock"
        }
    }

    #[tokio::test]
    async fn test_cancel_mid_run_stops_before_write() {
        let dir = tempfile::tempdir().unwrap();
        let hub = hub_in(dir.path()).await;
        let flag = hub.cancel_flag();
        let hub = hub.with_backend(Arc::new(CancellingBackend {
            inner: MockBackend::new(),
            flag,
        }));
        let source = sample_file(dir.path());
        let mut events = hub.events().subscribe();

        let err = hub
            .process(&Locator::file(&source), None)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Cancelled));

        // Extract and Summarize ran to completion; Write never started.
        let mut stages_started = Vec::new();
        while let Ok(event) = events.try_recv() {
            if let PipelineEvent::StageStarted { stage } = event {
                stages_started.push(stage);
            }
        }
        assert_eq!(
            stages_started,
            vec![PipelineStage::Extract, PipelineStage::Summarize]
        );

        let notes: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().map(|x| x == "md").unwrap_or(false))
            .collect();
        assert!(notes.is_empty());
        assert!(hub.store().list(None, None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failing_backend_emits_failed_event() {
        let dir = tempfile::tempdir().unwrap();
        let hub = hub_in(dir.path())
            .await
            .with_backend(Arc::new(MockBackend::new().failing()));
        let source = sample_file(dir.path());
        let mut events = hub.events().subscribe();

        let err = hub
            .process(&Locator::file(&source), None)
            .await
            .unwrap_err();
        assert!(err.is_retryable());

        let mut failed_stage = None;
        while let Ok(event) = events.try_recv() {
            if let PipelineEvent::Failed { stage, .. } = event {
                failed_stage = Some(stage);
            }
        }
        assert_eq!(failed_stage, Some(PipelineStage::Summarize));
    }

    #[tokio::test]
    async fn test_reprocessing_same_file_keeps_one_note_per_path() {
        let dir = tempfile::tempdir().unwrap();
        let hub = hub_in(dir.path()).await;
        let source = sample_file(dir.path());

        let first = hub.process(&Locator::file(&source), None).await.unwrap();
        let second = hub.process(&Locator::file(&source), None).await.unwrap();

        // The writer never overwrites, so the second run produces a new
        // file and therefore a new row.
        assert_ne!(first.note_path, second.note_path);
        assert_eq!(hub.store().list(None, None).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_related_requires_existing_item() {
        let dir = tempfile::tempdir().unwrap();
        let hub = hub_in(dir.path()).await;
        let err = hub.related(999).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }
}
