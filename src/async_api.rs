use crate::document::TemporaryDocument;
use crate::{ConverterConfig, Engine, Error, PageConfiguration, Result};
use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;
use tokio::sync::oneshot;
use url::Url;

const PDF_MAGIC: &[u8] = b"%PDF-";

struct RenderJob {
    url: Url,
    page: PageConfiguration,
    // Fired when a worker takes the job off the queue
    started: oneshot::Sender<()>,
    resp: oneshot::Sender<Result<Vec<u8>>>,
}

enum Command {
    Render(RenderJob),
    Close(oneshot::Sender<Result<()>>),
}

/// An async HTML to PDF converter backed by a pool of worker threads.
///
/// Each worker thread owns one engine instance and executes requests pulled
/// from a shared queue, so an engine never handles more than one conversion
/// at a time and at most `pool_size` conversions run in parallel. Callers
/// await a one-shot completion per request.
///
/// `timeout_ms` bounds the time an engine spends on a request, starting when
/// a worker picks it up; time spent queued behind other requests does not
/// count. Requests whose caller has gone away while queued are skipped.
#[derive(Clone)]
pub struct Converter {
    cmd_tx: Sender<Command>,
    config: Arc<ConverterConfig>,
}

impl Converter {
    /// Create a converter backed by headless Chrome.
    #[cfg(feature = "cdp")]
    pub async fn new(config: ConverterConfig) -> Result<Self> {
        Self::with_engine::<crate::cdp::CdpEngine>(config).await
    }

    /// Create a converter backed by engine type `E`.
    ///
    /// Spawns `config.pool_size` worker threads; each one builds its own
    /// engine. Fails if any engine fails to initialize.
    pub async fn with_engine<E: Engine + 'static>(config: ConverterConfig) -> Result<Self> {
        config.validate()?;

        let (cmd_tx, cmd_rx) = mpsc::channel::<Command>();
        let cmd_rx = Arc::new(Mutex::new(cmd_rx));
        let config = Arc::new(config);

        let mut pending = Vec::with_capacity(config.pool_size);
        for id in 0..config.pool_size {
            let (init_tx, init_rx) = oneshot::channel::<Result<()>>();
            let rx = Arc::clone(&cmd_rx);
            let cfg = Arc::clone(&config);

            thread::Builder::new()
                .name(format!("html-to-pdf-worker-{}", id))
                .spawn(move || worker_loop::<E>(id, &cfg, &rx, init_tx))
                .map_err(|e| Error::InitializationError(format!("Failed to spawn worker: {}", e)))?;
            pending.push(init_rx);
        }

        // Dropping `cmd_tx` on failure stops the workers that did come up
        for init_rx in pending {
            init_rx
                .await
                .map_err(|e| Error::InitializationError(format!("Worker init canceled: {}", e)))??;
        }

        info!("converter ready with {} engine(s)", config.pool_size);
        Ok(Self { cmd_tx, config })
    }

    pub fn config(&self) -> &ConverterConfig {
        &self.config
    }

    /// Render `html` and write the PDF to `destination`.
    ///
    /// An existing file at `destination` is overwritten. The temporary HTML
    /// document is removed whether or not the conversion succeeds; a failure
    /// to remove it is only reported when nothing else went wrong, and in
    /// that case the PDF has already been written to `destination`.
    pub async fn convert(
        &self,
        html: &str,
        destination: impl AsRef<Path>,
        page: &PageConfiguration,
    ) -> Result<()> {
        self.run(html, page, Some(destination.as_ref())).await.map(|_| ())
    }

    /// Render `html` and write the PDF to `directory/<title>.pdf`.
    pub async fn convert_to_directory(
        &self,
        html: &str,
        title: &str,
        directory: impl AsRef<Path>,
        page: &PageConfiguration,
    ) -> Result<()> {
        self.convert(html, titled_destination(directory.as_ref(), title), page)
            .await
    }

    /// Render `html` and return the PDF bytes without touching a destination.
    pub async fn render(&self, html: &str, page: &PageConfiguration) -> Result<Vec<u8>> {
        self.run(html, page, None).await
    }

    /// Render through a temporary document, optionally persist the PDF, then
    /// remove the document.
    async fn run(&self, html: &str, page: &PageConfiguration, destination: Option<&Path>) -> Result<Vec<u8>> {
        page.validate()?;

        let document = TemporaryDocument::create(&self.config.temp_dir(), html)?;
        let outcome = match (self.request_pdf(document.url().clone(), *page).await, destination) {
            (Ok(pdf), Some(destination)) => write_pdf(destination, &pdf).await.map(|_| pdf),
            (outcome, _) => outcome,
        };
        let cleanup = document.remove();

        match (outcome, cleanup) {
            (Ok(pdf), Ok(())) => Ok(pdf),
            (Ok(_), Err(e)) => Err(e),
            (Err(e), Ok(())) => Err(e),
            (Err(e), Err(cleanup_err)) => {
                warn!("{} (suppressed in favour of: {})", cleanup_err, e);
                Err(e)
            }
        }
    }

    async fn request_pdf(&self, url: Url, page: PageConfiguration) -> Result<Vec<u8>> {
        let (started, started_rx) = oneshot::channel();
        let (resp, rx) = oneshot::channel();
        debug!("queueing render of {}", url);
        self.cmd_tx
            .send(Command::Render(RenderJob { url, page, started, resp }))
            .map_err(|_| Error::Other("Converter is closed".into()))?;

        started_rx
            .await
            .map_err(|e| Error::RenderError(format!("Engine worker exited: {}", e)))?;

        let timeout_ms = self.config.timeout_ms;
        let pdf = tokio::time::timeout(Duration::from_millis(timeout_ms), rx)
            .await
            .map_err(|_| Error::Timeout(timeout_ms))?
            .map_err(|e| Error::RenderError(format!("Engine worker exited: {}", e)))??;

        if !pdf.starts_with(PDF_MAGIC) {
            return Err(Error::RenderError("Engine output is not a PDF document".into()));
        }
        Ok(pdf)
    }

    /// Shut down every worker and close its engine.
    ///
    /// Clones of this converter stop working once it is closed.
    pub async fn close(self) -> Result<()> {
        let mut acks = Vec::with_capacity(self.config.pool_size);
        for _ in 0..self.config.pool_size {
            let (tx, rx) = oneshot::channel();
            if self.cmd_tx.send(Command::Close(tx)).is_err() {
                break;
            }
            acks.push(rx);
        }

        let mut result = Ok(());
        for rx in acks {
            let res = rx
                .await
                .map_err(|e| Error::Other(format!("Close canceled: {}", e)))
                .and_then(|r| r);
            if result.is_ok() {
                result = res;
            }
        }
        result
    }
}

async fn write_pdf(destination: &Path, pdf: &[u8]) -> Result<()> {
    tokio::fs::write(destination, pdf)
        .await
        .map_err(|source| Error::WriteError {
            path: destination.to_path_buf(),
            source,
        })?;

    info!("wrote {} byte PDF to {}", pdf.len(), destination.display());
    Ok(())
}

/// `directory/<title>.pdf`
pub(crate) fn titled_destination(directory: &Path, title: &str) -> PathBuf {
    directory.join(format!("{}.pdf", title))
}

fn worker_loop<E: Engine>(
    id: usize,
    config: &ConverterConfig,
    cmd_rx: &Mutex<Receiver<Command>>,
    init_tx: oneshot::Sender<Result<()>>,
) {
    // Initialize engine on the worker thread
    let mut engine = match E::new(config) {
        Ok(e) => e,
        Err(err) => {
            let _ = init_tx.send(Err(err));
            return;
        }
    };
    let _ = init_tx.send(Ok(()));

    loop {
        // Hold the lock only while waiting for the next command
        let cmd = match cmd_rx.lock() {
            Ok(rx) => rx.recv(),
            Err(_) => break,
        };

        match cmd {
            Ok(Command::Render(job)) => {
                if job.resp.is_closed() || job.started.send(()).is_err() {
                    debug!("worker {}: skipping {}, caller went away while queued", id, job.url);
                    continue;
                }
                debug!("worker {} rendering {}", id, job.url);
                let res = engine.load_file(&job.url).and_then(|_| engine.print_pdf(&job.page));
                if job.resp.send(res).is_err() {
                    debug!("worker {}: caller went away before {} finished", id, job.url);
                }
            }
            Ok(Command::Close(resp)) => {
                let _ = resp.send(engine.close());
                return;
            }
            // Every sender is gone
            Err(_) => break,
        }
    }

    if let Err(e) = engine.close() {
        warn!("worker {} failed to close its engine: {}", id, e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoEngine {
        html: String,
    }

    impl Engine for EchoEngine {
        fn new(_config: &ConverterConfig) -> Result<Self> {
            Ok(Self { html: String::new() })
        }

        fn load_file(&mut self, url: &Url) -> Result<()> {
            let path = url.to_file_path().map_err(|_| Error::RenderError("not a file URL".into()))?;
            self.html = std::fs::read_to_string(path).map_err(|e| Error::RenderError(e.to_string()))?;
            Ok(())
        }

        fn print_pdf(&mut self, _page: &PageConfiguration) -> Result<Vec<u8>> {
            Ok(format!("%PDF-1.4\n{}", self.html).into_bytes())
        }

        fn close(self) -> Result<()> {
            Ok(())
        }
    }

    struct PlainTextEngine;

    impl Engine for PlainTextEngine {
        fn new(_config: &ConverterConfig) -> Result<Self> {
            Ok(Self)
        }

        fn load_file(&mut self, _url: &Url) -> Result<()> {
            Ok(())
        }

        fn print_pdf(&mut self, _page: &PageConfiguration) -> Result<Vec<u8>> {
            Ok(b"definitely not a pdf".to_vec())
        }

        fn close(self) -> Result<()> {
            Ok(())
        }
    }

    fn config_in(dir: &Path) -> ConverterConfig {
        ConverterConfig {
            temp_dir: Some(dir.to_path_buf()),
            timeout_ms: 5000,
            ..Default::default()
        }
    }

    #[test]
    fn test_titled_destination() {
        assert_eq!(
            titled_destination(Path::new("/out"), "helloWorld"),
            PathBuf::from("/out/helloWorld.pdf")
        );
    }

    #[tokio::test]
    async fn test_render_returns_engine_bytes() {
        let tmp = tempfile::tempdir().unwrap();
        let converter = Converter::with_engine::<EchoEngine>(config_in(tmp.path())).await.unwrap();

        let pdf = converter.render("<b>hi</b>", &PageConfiguration::default()).await.unwrap();
        assert_eq!(pdf, b"%PDF-1.4\n<b>hi</b>");

        converter.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_non_pdf_output_is_render_error() {
        let tmp = tempfile::tempdir().unwrap();
        let converter = Converter::with_engine::<PlainTextEngine>(config_in(tmp.path())).await.unwrap();

        let res = converter.render("x", &PageConfiguration::default()).await;
        assert!(matches!(res, Err(Error::RenderError(_))));
        assert_eq!(std::fs::read_dir(tmp.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_invalid_page_rejected_before_engine() {
        let tmp = tempfile::tempdir().unwrap();
        let converter = Converter::with_engine::<EchoEngine>(config_in(tmp.path())).await.unwrap();

        let page = PageConfiguration::a4(crate::Insets::uniform(500.0));
        let res = converter.render("x", &page).await;
        assert!(matches!(res, Err(Error::InvalidPage(_))));
    }

    #[tokio::test]
    async fn test_closed_converter_rejects_work() {
        let tmp = tempfile::tempdir().unwrap();
        let converter = Converter::with_engine::<EchoEngine>(config_in(tmp.path())).await.unwrap();
        let clone = converter.clone();
        converter.close().await.unwrap();

        let res = clone.render("x", &PageConfiguration::default()).await;
        assert!(res.is_err());
        assert_eq!(std::fs::read_dir(tmp.path()).unwrap().count(), 0);
    }
}
