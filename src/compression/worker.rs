use colored::Colorize;
use tokio::runtime::{Handle, RuntimeFlavor};
use tokio::sync::{mpsc, oneshot};
use tokio::task;

use crate::compression::compress_image::{compress_image, CompressionOptions};
use crate::session::{AcceptedImage, CompressedImage};

const JOB_QUEUE_CAPACITY: usize = 32;

/// Reply sent back by the background worker for one job.
#[derive(Debug)]
pub enum CompressionMessage {
    Success(CompressedImage),
    Error(String),
}

struct CompressionJob {
    image: AcceptedImage,
    reply: oneshot::Sender<CompressionMessage>,
}

/// Handle to the compression worker.
///
/// Jobs are submitted over a channel and answered on a per-job reply channel,
/// so the worker never shares state with the caller. Without a worker the
/// compression runs in the calling context.
pub struct CompressionWorker {
    options: CompressionOptions,
    sender: Option<mpsc::Sender<CompressionJob>>,
}

impl CompressionWorker {
    /// Starts the background worker. Must be called from inside a Tokio runtime.
    pub fn spawn(options: CompressionOptions) -> Self {
        let (sender, mut receiver) = mpsc::channel::<CompressionJob>(JOB_QUEUE_CAPACITY);

        tokio::spawn(async move {
            while let Some(CompressionJob { image, reply }) = receiver.recv().await {
                let message = match task::spawn_blocking(move || compress_image(&image, &options)).await {
                    Ok(Ok(compressed)) => CompressionMessage::Success(compressed),
                    Ok(Err(e)) => CompressionMessage::Error(format!("{:#}", e)),
                    Err(e) => CompressionMessage::Error(format!("Compression task failed: {}", e)),
                };

                // The caller may have given up on the result
                let _ = reply.send(message);
            }
        });

        CompressionWorker {
            options,
            sender: Some(sender),
        }
    }

    /// A worker that compresses on the calling task.
    pub fn inline(options: CompressionOptions) -> Self {
        CompressionWorker {
            options,
            sender: None,
        }
    }

    /// Compresses `image`, falling back to the original payload on failure.
    pub async fn compress(&self, image: &AcceptedImage) -> CompressedImage {
        if let Some(sender) = &self.sender {
            let (reply, response) = oneshot::channel();
            let job = CompressionJob {
                image: image.clone(),
                reply,
            };

            if sender.send(job).await.is_ok() {
                match response.await {
                    Ok(CompressionMessage::Success(compressed)) => return compressed,
                    Ok(CompressionMessage::Error(error)) => {
                        eprintln!("{} {}: {}", "Worker error:".red(), image.url, error);
                        return CompressedImage::from_original(image);
                    }
                    Err(_) => {
                        eprintln!("{}", "Compression worker stopped. Falling back to inline processing.".yellow());
                    }
                }
            } else {
                eprintln!("{}", "Compression worker is not running. Falling back to inline processing.".yellow());
            }
        }

        self.compress_inline(image)
    }

    /// On a multi-threaded runtime the work is moved off the async worker
    /// thread with `block_in_place`. A current-thread runtime cannot do that,
    /// so there the other in-flight fetches wait until it returns.
    fn compress_inline(&self, image: &AcceptedImage) -> CompressedImage {
        let compress = || match compress_image(image, &self.options) {
            Ok(compressed) => compressed,
            Err(e) => {
                eprintln!("{} {}: {:#}", "Compression failed:".red(), image.url, e);
                CompressedImage::from_original(image)
            }
        };

        match Handle::try_current() {
            Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
                task::block_in_place(compress)
            }
            _ => compress(),
        }
    }
}
