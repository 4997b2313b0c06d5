//! Stream Chorus use case — the multiplexed variant of the batch flow.
//!
//! Instead of waiting for full completions, each model's token chunks are
//! forwarded as they arrive, tagged with the model's identity, onto one
//! ordered event channel. The request moves through connect → per-model
//! streaming → optional synthesis sub-stream → done; a setup failure before
//! any model starts emits a single terminal `error` event.
//!
//! Ordering: chunks within one model's stream are forwarded by that model's
//! own task, sequentially, so per-model order is preserved; chunks of
//! different models interleave arbitrarily. The `done` event is sent only
//! after every per-model task has been joined and the synthesis sub-stream
//! (if any) has finished, so it is always last.
//!
//! Cancellation: a caller that drops the receiver stops all observable
//! emission — every send is fallible and ignored on error — while in-flight
//! provider streams are still drained to completion and their results
//! discarded. Synthesis is skipped outright once the channel is closed.

use crate::config::ExecutionParams;
use crate::ports::llm_gateway::LlmGateway;
use crate::use_cases::orchestrate::ChorusInput;
use chorus_domain::{
    InvocationOutcome, InvocationRequest, ModelDescriptor, ModelRegistry, StreamEvent,
    SynthesisPrompt, TokenEvent, estimate_tokens,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

/// Use case for running one fan-out as a live event stream.
#[derive(Clone)]
pub struct StreamChorusUseCase {
    gateway: Arc<dyn LlmGateway>,
    registry: Arc<ModelRegistry>,
    params: ExecutionParams,
}

impl StreamChorusUseCase {
    pub fn new(
        gateway: Arc<dyn LlmGateway>,
        registry: Arc<ModelRegistry>,
        params: ExecutionParams,
    ) -> Self {
        Self {
            gateway,
            registry,
            params,
        }
    }

    /// Start the request and hand back the event channel.
    ///
    /// The driver runs in its own task; dropping the receiver cancels all
    /// observable output without tearing down in-flight provider calls.
    pub fn execute(&self, input: ChorusInput) -> mpsc::Receiver<StreamEvent> {
        let (tx, rx) = mpsc::channel(self.params.channel_capacity);
        let this = self.clone();
        tokio::spawn(async move {
            this.drive(input, tx).await;
        });
        rx
    }

    async fn drive(self, input: ChorusInput, tx: mpsc::Sender<StreamEvent>) {
        let _ = tx
            .send(StreamEvent::Connected {
                timestamp: now_ms(),
            })
            .await;

        let models = if input.selection.is_empty() {
            self.registry.default_selection()
        } else {
            match self.registry.resolve(&input.selection) {
                Ok(models) => models,
                Err(e) => {
                    let _ = tx
                        .send(StreamEvent::Error {
                            message: e.to_string(),
                        })
                        .await;
                    return;
                }
            }
        };

        let total_models = models.len();
        info!("Streaming fan-out to {} models", total_models);

        let mut join_set = JoinSet::new();
        for (idx, model) in models.iter().cloned().enumerate() {
            let gateway = Arc::clone(&self.gateway);
            let request = input.request.clone();
            let tx = tx.clone();
            let deadline = self.params.invocation_timeout;

            join_set.spawn(async move {
                let outcome = stream_one_model(gateway, model, request, tx, deadline).await;
                (idx, outcome)
            });
        }

        let mut slots: Vec<Option<InvocationOutcome>> = vec![None; total_models];
        while let Some(result) = join_set.join_next().await {
            match result {
                Ok((idx, outcome)) => slots[idx] = Some(outcome),
                Err(e) => warn!("Task join error: {}", e),
            }
        }
        let outcomes: Vec<InvocationOutcome> = slots
            .into_iter()
            .enumerate()
            .map(|(idx, slot)| {
                slot.unwrap_or_else(|| InvocationOutcome::failure(models[idx].clone(), 0))
            })
            .collect();

        let success_count = outcomes.iter().filter(|o| o.succeeded).count();

        // Synthesis only when more than one model answered, and only while
        // someone is still listening.
        if success_count > 1 {
            if tx.is_closed() {
                debug!("Client disconnected, skipping synthesis");
            } else {
                self.stream_synthesis(&outcomes, &tx).await;
            }
        }

        let _ = tx
            .send(StreamEvent::Done {
                total_models,
                success_count,
                timestamp: now_ms(),
            })
            .await;
    }

    async fn stream_synthesis(&self, outcomes: &[InvocationOutcome], tx: &mpsc::Sender<StreamEvent>) {
        let contributions: Vec<(String, String)> = outcomes
            .iter()
            .filter(|o| o.succeeded)
            .map(|o| {
                (
                    o.model.name.clone(),
                    o.text.clone().unwrap_or_default(),
                )
            })
            .collect();
        let request = SynthesisPrompt::request(&contributions);
        let model = self.registry.synthesis_model().clone();

        let _ = tx
            .send(StreamEvent::SynthesisStart {
                model: model.name.clone(),
            })
            .await;

        let started = Instant::now();
        let fed = tokio::time::timeout(
            self.params.invocation_timeout,
            forward_stream(&*self.gateway, &model, &request, tx, |text| {
                StreamEvent::SynthesisChunk { text }
            }),
        )
        .await;
        let duration_ms = started.elapsed().as_millis() as u64;

        match fed {
            Ok(Ok(text)) if !text.trim().is_empty() => {
                let _ = tx
                    .send(StreamEvent::SynthesisComplete { duration_ms })
                    .await;
            }
            Ok(Ok(_)) => {
                let _ = tx
                    .send(StreamEvent::SynthesisError {
                        reason: "empty response".to_string(),
                    })
                    .await;
            }
            Ok(Err(reason)) => {
                warn!("Synthesis stream failed: {}", reason);
                let _ = tx.send(StreamEvent::SynthesisError { reason }).await;
            }
            Err(_) => {
                let _ = tx
                    .send(StreamEvent::SynthesisError {
                        reason: timeout_reason(self.params.invocation_timeout),
                    })
                    .await;
            }
        }
    }
}

/// Stream one model: start event, forwarded chunks, exactly one terminal.
async fn stream_one_model(
    gateway: Arc<dyn LlmGateway>,
    model: ModelDescriptor,
    request: InvocationRequest,
    tx: mpsc::Sender<StreamEvent>,
    deadline: Duration,
) -> InvocationOutcome {
    let started = Instant::now();
    let _ = tx
        .send(StreamEvent::ModelStart {
            model: model.name.clone(),
            color: model.display_color.clone(),
        })
        .await;

    let name = model.name.clone();
    let fed = tokio::time::timeout(
        deadline,
        forward_stream(&*gateway, &model, &request, &tx, |text| {
            StreamEvent::ModelChunk {
                model: name.clone(),
                text,
            }
        }),
    )
    .await;
    let duration_ms = started.elapsed().as_millis() as u64;

    match fed {
        Ok(Ok(text)) if !text.trim().is_empty() => {
            let _ = tx
                .send(StreamEvent::ModelComplete {
                    model: model.name.clone(),
                    duration_ms,
                    token_estimate: estimate_tokens(&text),
                })
                .await;
            InvocationOutcome::success(model, text, duration_ms)
        }
        Ok(Ok(_)) => {
            let _ = tx
                .send(StreamEvent::ModelError {
                    model: model.name.clone(),
                    reason: "empty response".to_string(),
                })
                .await;
            InvocationOutcome::failure(model, duration_ms)
        }
        Ok(Err(reason)) => {
            warn!("Model {} stream failed: {}", model.name, reason);
            let _ = tx
                .send(StreamEvent::ModelError {
                    model: model.name.clone(),
                    reason,
                })
                .await;
            InvocationOutcome::failure(model, duration_ms)
        }
        Err(_) => {
            warn!("Model {} stream timed out", model.name);
            let _ = tx
                .send(StreamEvent::ModelError {
                    model: model.name.clone(),
                    reason: timeout_reason(deadline),
                })
                .await;
            InvocationOutcome::failure(model, duration_ms)
        }
    }
}

/// Consume one provider stream, forwarding each delta as an envelope event.
///
/// Sends are best-effort: a closed channel means the client is gone, and
/// the provider stream is still drained so the call runs to completion with
/// nothing observable. Returns the accumulated text or the failure reason.
async fn forward_stream<F>(
    gateway: &dyn LlmGateway,
    model: &ModelDescriptor,
    request: &InvocationRequest,
    tx: &mpsc::Sender<StreamEvent>,
    make_chunk: F,
) -> Result<String, String>
where
    F: Fn(String) -> StreamEvent,
{
    let mut handle = gateway
        .complete_streaming(model, request)
        .await
        .map_err(|e| e.to_string())?;

    let mut full = String::new();
    while let Some(event) = handle.receiver.recv().await {
        match event {
            TokenEvent::Delta(chunk) => {
                full.push_str(&chunk);
                let _ = tx.send(make_chunk(chunk)).await;
            }
            TokenEvent::Completed(text) => {
                // A non-streaming adapter delivers everything in one
                // Completed; surface it as a single chunk.
                if full.is_empty() && !text.is_empty() {
                    let _ = tx.send(make_chunk(text.clone())).await;
                    full = text;
                }
                return Ok(full);
            }
            TokenEvent::Error(reason) => return Err(reason),
        }
    }
    Ok(full)
}

fn now_ms() -> u64 {
    chrono::Utc::now().timestamp_millis() as u64
}

fn timeout_reason(deadline: Duration) -> String {
    format!("timed out after {}s", deadline.as_secs())
}
