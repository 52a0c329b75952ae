//! Session-keyed processor chain
//!
//! Every open session owns one task. The task runs a frame through all stages
//! before it takes the next frame, so a session's decisions and trace records
//! follow the order its frames were sent. A session id may have at most one
//! open stream; `EndOfStream` closes it and frees the id.

use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::mpsc;
use voice_interrupt_core::{Frame, FrameProcessor, ProcessorContext};

use crate::PipelineError;

/// Channel capacity for session input and output
const DEFAULT_CHANNEL_CAPACITY: usize = 64;

/// Ordered stages shared by every session
pub struct ProcessorChain {
    name: String,
    stages: Vec<Arc<dyn FrameProcessor>>,
    channel_capacity: usize,
    open_sessions: Arc<Mutex<HashSet<String>>>,
}

impl ProcessorChain {
    pub fn builder(name: impl Into<String>) -> ProcessorChainBuilder {
        ProcessorChainBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of stages
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Is a stream currently open for `session_id`?
    pub fn is_open(&self, session_id: &str) -> bool {
        self.open_sessions.lock().contains(session_id)
    }

    /// Open the ordered stream for `context.session_id`
    ///
    /// Fails with [`PipelineError::SessionActive`] while a stream for the
    /// same id is still running. Must be called inside a tokio runtime.
    pub fn open_session(&self, context: ProcessorContext) -> Result<SessionStream, PipelineError> {
        let session_id = context.session_id.clone();
        if !self.open_sessions.lock().insert(session_id.clone()) {
            return Err(PipelineError::SessionActive(session_id));
        }

        let (input_tx, input_rx) = mpsc::channel::<Frame>(self.channel_capacity);
        let (output_tx, output_rx) = mpsc::channel::<Frame>(self.channel_capacity);

        tokio::spawn(drive_session(
            self.stages.clone(),
            context,
            input_rx,
            output_tx,
            Arc::clone(&self.open_sessions),
        ));

        tracing::debug!(chain = %self.name, session_id = %session_id, "Session opened");

        Ok(SessionStream {
            session_id,
            input: input_tx,
            output: output_rx,
        })
    }
}

/// Input and output ends of one session
pub struct SessionStream {
    session_id: String,
    input: mpsc::Sender<Frame>,
    output: mpsc::Receiver<Frame>,
}

impl SessionStream {
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub async fn send(&self, frame: Frame) -> Result<(), PipelineError> {
        self.input
            .send(frame)
            .await
            .map_err(|_| PipelineError::ChannelClosed)
    }

    /// Next output frame; `None` once the session has closed and drained
    pub async fn recv(&mut self) -> Option<Frame> {
        self.output.recv().await
    }

    /// Separate the ends so one task can produce while another consumes
    pub fn split(self) -> (mpsc::Sender<Frame>, mpsc::Receiver<Frame>) {
        (self.input, self.output)
    }
}

/// Session task: strict one-frame-at-a-time through every stage
async fn drive_session(
    stages: Vec<Arc<dyn FrameProcessor>>,
    mut context: ProcessorContext,
    mut input: mpsc::Receiver<Frame>,
    output: mpsc::Sender<Frame>,
    open_sessions: Arc<Mutex<HashSet<String>>>,
) {
    for stage in &stages {
        if let Err(e) = stage.on_start(&mut context).await {
            tracing::error!(stage = stage.name(), session_id = %context.session_id, error = %e, "Stage on_start failed");
        }
    }

    let mut frames_in = 0usize;
    'session: while let Some(frame) = input.recv().await {
        frames_in += 1;
        let is_eos = frame.is_end_of_stream();

        for out in run_stages(&stages, frame, &mut context).await {
            if output.send(out).await.is_err() {
                tracing::debug!(session_id = %context.session_id, "Session output dropped");
                break 'session;
            }
        }

        if is_eos {
            break;
        }
    }

    for stage in &stages {
        if let Err(e) = stage.on_stop(&mut context).await {
            tracing::error!(stage = stage.name(), session_id = %context.session_id, error = %e, "Stage on_stop failed");
        }
    }

    // Free the id before the output closes, so a reader that saw the end
    // can reopen immediately
    open_sessions.lock().remove(&context.session_id);
    tracing::debug!(session_id = %context.session_id, frames = frames_in, "Session closed");
}

/// Fan one frame through the stages in order. A failing stage turns that
/// frame into a recoverable error frame, which later stages still see.
async fn run_stages(
    stages: &[Arc<dyn FrameProcessor>],
    frame: Frame,
    context: &mut ProcessorContext,
) -> Vec<Frame> {
    let mut frames = vec![frame];

    for stage in stages {
        let mut next = Vec::with_capacity(frames.len());
        for f in frames {
            match stage.process(f, context).await {
                Ok(out) => next.extend(out),
                Err(e) => {
                    tracing::warn!(stage = stage.name(), session_id = %context.session_id, error = %e, "Stage failed");
                    next.push(Frame::Error {
                        stage: stage.name().to_string(),
                        message: e.to_string(),
                        recoverable: true,
                    });
                }
            }
        }
        frames = next;
    }

    frames
}

/// Builder for ProcessorChain
pub struct ProcessorChainBuilder {
    chain: ProcessorChain,
}

impl ProcessorChainBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            chain: ProcessorChain {
                name: name.into(),
                stages: Vec::new(),
                channel_capacity: DEFAULT_CHANNEL_CAPACITY,
                open_sessions: Arc::new(Mutex::new(HashSet::new())),
            },
        }
    }

    pub fn processor<P: FrameProcessor>(mut self, processor: P) -> Self {
        self.chain.stages.push(Arc::new(processor));
        self
    }

    /// Add a stage the caller keeps a handle to
    pub fn processor_shared(mut self, processor: Arc<dyn FrameProcessor>) -> Self {
        self.chain.stages.push(processor);
        self
    }

    pub fn channel_capacity(mut self, capacity: usize) -> Self {
        self.chain.channel_capacity = capacity.max(1);
        self
    }

    pub fn build(self) -> ProcessorChain {
        self.chain
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processors::InterruptGate;
    use crate::InterruptClassifier;
    use voice_interrupt_core::{Decision, Error, Result, TranscriptEvent};

    /// Fails on every transcript, passes everything else
    struct FailingProcessor;

    #[async_trait::async_trait]
    impl FrameProcessor for FailingProcessor {
        async fn process(&self, frame: Frame, _context: &mut ProcessorContext) -> Result<Vec<Frame>> {
            match frame {
                Frame::Transcript(_) => Err(Error::Pipeline("recognizer glitch".into())),
                other => Ok(vec![other]),
            }
        }

        fn name(&self) -> &'static str {
            "failing"
        }
    }

    fn transcript(text: &str, confidence: f32) -> Frame {
        Frame::Transcript(TranscriptEvent::new(text, confidence))
    }

    async fn drain(mut stream: SessionStream) -> Vec<Frame> {
        let mut received = Vec::new();
        while let Some(frame) = stream.recv().await {
            received.push(frame);
        }
        received
    }

    fn gate_chain(classifier: &Arc<InterruptClassifier>, capacity: usize) -> ProcessorChain {
        ProcessorChain::builder("gate")
            .processor(InterruptGate::new(Arc::clone(classifier)))
            .channel_capacity(capacity)
            .build()
    }

    #[tokio::test]
    async fn test_empty_chain_passes_frames() {
        let chain = ProcessorChain::builder("empty").build();
        assert!(chain.is_empty());

        let stream = chain.open_session(ProcessorContext::new("s")).unwrap();
        stream.send(Frame::AgentSpeaking).await.unwrap();
        stream.send(Frame::EndOfStream).await.unwrap();

        let frames = drain(stream).await;
        assert_eq!(frames.len(), 2);
        assert!(matches!(frames[0], Frame::AgentSpeaking));
    }

    #[tokio::test]
    async fn test_session_preserves_order_beyond_capacity() {
        let classifier = Arc::new(InterruptClassifier::default());
        let chain = gate_chain(&classifier, 4);

        let (tx, mut rx) = chain.open_session(ProcessorContext::new("order")).unwrap().split();
        let producer = tokio::spawn(async move {
            tx.send(Frame::AgentSpeaking).await.unwrap();
            for i in 0..20 {
                tx.send(transcript(&format!("point {i}"), 0.9)).await.unwrap();
            }
            tx.send(Frame::EndOfStream).await.unwrap();
        });

        let mut received = Vec::new();
        while let Some(frame) = rx.recv().await {
            received.push(frame);
        }
        producer.await.unwrap();

        assert_eq!(received.len(), 22);
        assert!(received.last().unwrap().is_end_of_stream());

        let texts: Vec<_> = classifier.trace().into_iter().map(|r| r.text).collect();
        let expected: Vec<_> = (0..20).map(|i| format!("point {i}")).collect();
        assert_eq!(texts, expected);
    }

    #[tokio::test]
    async fn test_interleaved_sessions_keep_their_own_order() {
        let classifier = Arc::new(InterruptClassifier::default());
        let chain = gate_chain(&classifier, 2);

        let mut producers = Vec::new();
        let mut streams = Vec::new();
        for session in ["alpha", "beta", "gamma"] {
            let (tx, rx) = chain.open_session(ProcessorContext::new(session)).unwrap().split();
            producers.push(tokio::spawn(async move {
                for i in 0..15 {
                    tx.send(transcript(&format!("{session} turn {i}"), 0.9)).await.unwrap();
                    tokio::task::yield_now().await;
                }
                tx.send(Frame::EndOfStream).await.unwrap();
            }));
            streams.push(rx);
        }

        let consumers: Vec<_> = streams
            .into_iter()
            .map(|mut rx| tokio::spawn(async move { while rx.recv().await.is_some() {} }))
            .collect();
        for task in producers.into_iter().chain(consumers) {
            task.await.unwrap();
        }

        let trace = classifier.trace();
        assert_eq!(trace.len(), 45);
        for session in ["alpha", "beta", "gamma"] {
            let texts: Vec<_> = trace
                .iter()
                .filter(|r| r.metadata["session_id"] == serde_json::json!(session))
                .map(|r| r.text.clone())
                .collect();
            let expected: Vec<_> = (0..15).map(|i| format!("{session} turn {i}")).collect();
            assert_eq!(texts, expected, "session {session}");
        }
    }

    #[tokio::test]
    async fn test_session_id_exclusive_until_end_of_stream() {
        let classifier = Arc::new(InterruptClassifier::default());
        let chain = gate_chain(&classifier, 8);

        let stream = chain.open_session(ProcessorContext::new("call-7")).unwrap();
        assert!(chain.is_open("call-7"));
        assert!(matches!(
            chain.open_session(ProcessorContext::new("call-7")),
            Err(PipelineError::SessionActive(id)) if id == "call-7"
        ));

        stream.send(transcript("hello", 0.9)).await.unwrap();
        stream.send(Frame::EndOfStream).await.unwrap();
        drain(stream).await;

        assert!(!chain.is_open("call-7"));
        assert!(chain.open_session(ProcessorContext::new("call-7")).is_ok());
    }

    #[tokio::test]
    async fn test_frames_after_end_of_stream_are_rejected() {
        let chain = ProcessorChain::builder("eos").build();
        let mut stream = chain.open_session(ProcessorContext::new("s")).unwrap();

        stream.send(Frame::EndOfStream).await.unwrap();
        assert!(stream.recv().await.unwrap().is_end_of_stream());
        assert!(stream.recv().await.is_none());
        assert!(matches!(
            stream.send(Frame::AgentSilent).await,
            Err(PipelineError::ChannelClosed)
        ));
    }

    #[tokio::test]
    async fn test_stage_error_becomes_frame() {
        let chain = ProcessorChain::builder("errors")
            .processor(FailingProcessor)
            .processor(InterruptGate::default())
            .build();
        assert_eq!(chain.len(), 2);

        let stream = chain.open_session(ProcessorContext::default()).unwrap();
        stream.send(transcript("stop", 0.9)).await.unwrap();
        stream.send(transcript("hmm", 0.9)).await.unwrap();
        stream.send(Frame::EndOfStream).await.unwrap();

        let received = drain(stream).await;
        assert_eq!(received.len(), 3);
        match &received[0] {
            Frame::Error { stage, recoverable, .. } => {
                assert_eq!(stage, "failing");
                assert!(*recoverable);
            }
            other => panic!("expected error frame, got {:?}", other),
        }
        assert!(received[1].is_error());
    }

    #[tokio::test]
    async fn test_shared_stage_and_decisions() {
        let gate = Arc::new(InterruptGate::default());
        let classifier = gate.classifier();
        let chain = ProcessorChain::builder("shared")
            .processor_shared(gate)
            .channel_capacity(0)
            .build();
        assert_eq!(chain.name(), "shared");

        let stream = chain.open_session(ProcessorContext::new("s")).unwrap();
        assert_eq!(stream.session_id(), "s");
        stream.send(Frame::AgentSpeaking).await.unwrap();
        stream.send(transcript("umm okay stop", 0.95)).await.unwrap();
        stream.send(transcript("hmm", 0.9)).await.unwrap();
        stream.send(Frame::EndOfStream).await.unwrap();

        let decisions: Vec<_> = drain(stream)
            .await
            .into_iter()
            .filter_map(|f| match f {
                Frame::Decision { decision, .. } => Some(decision),
                _ => None,
            })
            .collect();
        assert_eq!(decisions, vec![Decision::Interrupt, Decision::Ignored]);
        assert_eq!(classifier.trace_len(), 2);
    }
}
