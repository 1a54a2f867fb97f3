//! Parallel fan-out of identical generation calls
//!
//! Every call gets the same prompt. Results are gathered once all calls have
//! finished; the first failure cancels the rest and fails the whole batch.

use crate::ai::ImageGenerationService;
use crate::models::{GeneratedImage, PromptRequest};
use crate::{Error, Result};
use std::future::Future;
use std::sync::Arc;
use tokio::task::JoinSet;

/// Run `count` tasks concurrently and return their outputs ordered by task
/// index, regardless of completion order.
///
/// The tasks live in a `JoinSet` owned by this call: on the first error the
/// remaining tasks are aborted and no partial output is returned.
pub async fn join_all_ordered<T, F, Fut>(count: usize, mut make_task: F) -> Result<Vec<T>>
where
    F: FnMut(usize) -> Fut,
    Fut: Future<Output = Result<T>> + Send + 'static,
    T: Send + 'static,
{
    let mut workers = JoinSet::new();
    for index in 0..count {
        let task = make_task(index);
        workers.spawn(async move { task.await.map(|output| (index, output)) });
    }

    let mut outputs = Vec::with_capacity(count);
    while let Some(joined) = workers.join_next().await {
        match joined {
            Ok(Ok(output)) => outputs.push(output),
            Ok(Err(e)) => {
                workers.abort_all();
                return Err(e);
            }
            Err(join_err) => {
                workers.abort_all();
                return Err(Error::Worker(join_err.to_string()));
            }
        }
    }

    outputs.sort_by_key(|(index, _)| *index);
    Ok(outputs.into_iter().map(|(_, output)| output).collect())
}

/// Issue `count` identical generation calls and flatten their images, call 0
/// first.
///
/// Calls still in flight when another call fails are cancelled, not awaited;
/// their requests may or may not have reached the provider.
pub async fn fan_out(
    service: Arc<dyn ImageGenerationService>,
    prompt: Arc<PromptRequest>,
    count: usize,
) -> Result<Vec<GeneratedImage>> {
    if count == 0 {
        return Err(Error::Config(
            "Image count must be at least 1".to_string(),
        ));
    }

    let per_call = join_all_ordered(count, |call_index| {
        let service = Arc::clone(&service);
        let prompt = Arc::clone(&prompt);
        async move {
            let images = service.generate_images(&prompt).await.map_err(|e| {
                tracing::error!("Generation call {} failed: {}", call_index, e);
                e
            })?;
            tracing::debug!("Generation call {} returned {} images", call_index, images.len());
            Ok::<_, Error>(images)
        }
    })
    .await?;

    Ok(per_call.into_iter().flatten().collect())
}
