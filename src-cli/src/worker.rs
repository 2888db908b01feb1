//! Background redaction worker.
//!
//! OCR runs for hundreds of milliseconds per pass, so front-ends hand images
//! to this worker and receive progress and results as messages instead of
//! blocking their own thread.

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread::JoinHandle;

use aadhaar_core::{CoreError, OcrEngine, Pipeline, PipelineOptions, PipelineState, Redaction, Redactor};
use image::DynamicImage;

pub type JobId = u64;

struct Job {
    id: JobId,
    image: DynamicImage,
}

/// Messages posted back from the worker thread
#[derive(Debug)]
pub enum WorkerEvent {
    Progress {
        job: JobId,
        state: PipelineState,
    },
    Finished {
        job: JobId,
        result: Result<Redaction, CoreError>,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum WorkerError {
    #[error("failed to start worker thread: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("worker thread has stopped")]
    Disconnected,
}

pub struct RedactionWorker {
    jobs: Option<Sender<Job>>,
    events: Receiver<WorkerEvent>,
    handle: Option<JoinHandle<()>>,
    next_id: JobId,
}

impl RedactionWorker {
    pub fn spawn(
        engine: Arc<dyn OcrEngine>,
        redactor: Redactor,
        options: PipelineOptions,
    ) -> Result<Self, WorkerError> {
        let (job_tx, job_rx) = mpsc::channel::<Job>();
        let (event_tx, event_rx) = mpsc::channel::<WorkerEvent>();

        let handle = std::thread::Builder::new()
            .name("redaction-worker".to_string())
            .spawn(move || {
                let pipeline = Pipeline::new(engine.as_ref())
                    .with_redactor(redactor)
                    .with_options(options);

                for job in job_rx {
                    log::debug!("[Worker] job {} started", job.id);
                    let result = pipeline.run_with_observer(&job.image, |state| {
                        let _ = event_tx.send(WorkerEvent::Progress { job: job.id, state });
                    });
                    if event_tx
                        .send(WorkerEvent::Finished {
                            job: job.id,
                            result,
                        })
                        .is_err()
                    {
                        // receiver gone, nobody is listening any more
                        break;
                    }
                }
                log::debug!("[Worker] stopped");
            })?;

        Ok(Self {
            jobs: Some(job_tx),
            events: event_rx,
            handle: Some(handle),
            next_id: 1,
        })
    }

    /// Queue an image, returning its job id
    pub fn submit(&mut self, image: DynamicImage) -> Result<JobId, WorkerError> {
        let id = self.next_id;
        let sender = self.jobs.as_ref().ok_or(WorkerError::Disconnected)?;
        sender
            .send(Job { id, image })
            .map_err(|_| WorkerError::Disconnected)?;
        self.next_id += 1;
        Ok(id)
    }

    /// Block until `job` finishes, passing its progress states to `on_progress`.
    /// Events of other jobs are dropped.
    pub fn wait<F>(&self, job: JobId, mut on_progress: F) -> Result<Result<Redaction, CoreError>, WorkerError>
    where
        F: FnMut(PipelineState),
    {
        loop {
            match self.events.recv().map_err(|_| WorkerError::Disconnected)? {
                WorkerEvent::Progress { job: id, state } if id == job => on_progress(state),
                WorkerEvent::Finished { job: id, result } if id == job => return Ok(result),
                _ => {}
            }
        }
    }
}

impl Drop for RedactionWorker {
    fn drop(&mut self) {
        // closing the job channel ends the worker loop
        self.jobs.take();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aadhaar_ocr::{RecognizedWord, Rect, ScriptedEngine};
    use image::RgbImage;

    fn image() -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::new(100, 50))
    }

    #[test]
    fn test_job_reports_progress_and_result() {
        let engine = Arc::new(ScriptedEngine::new(
            "Aadhaar 1234 5678 9012",
            vec![RecognizedWord::new("123456789", Rect::new(10, 10, 40, 10))],
        ));
        let mut worker =
            RedactionWorker::spawn(engine, Redactor::default(), PipelineOptions::default()).unwrap();

        let job = worker.submit(image()).unwrap();
        let mut states = Vec::new();
        let result = worker.wait(job, |state| states.push(state)).unwrap();

        let redaction = result.unwrap();
        assert_eq!(redaction.id_number.as_str(), "1234 5678 9012");
        assert_eq!(states.first(), Some(&PipelineState::Recognizing));
        assert_eq!(states.last(), Some(&PipelineState::Done));
    }

    #[test]
    fn test_jobs_are_independent() {
        let engine = Arc::new(ScriptedEngine::new("nothing here", Vec::new()));
        let mut worker =
            RedactionWorker::spawn(engine.clone(), Redactor::default(), PipelineOptions::default())
                .unwrap();

        let first = worker.submit(image()).unwrap();
        let second = worker.submit(image()).unwrap();
        assert_ne!(first, second);

        let first_result = worker.wait(first, |_| {}).unwrap();
        let second_result = worker.wait(second, |_| {}).unwrap();
        assert!(matches!(first_result, Err(CoreError::NumberNotFound)));
        assert!(matches!(second_result, Err(CoreError::NumberNotFound)));

        drop(worker);
        assert_eq!(engine.text_calls(), 2);
    }
}
