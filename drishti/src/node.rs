//! Recognition node.
//!
//! Wires the frame buffer, parameter snapshot, model registry, engine and
//! result sink together and owns the recognition thread. Dropping the node
//! stops and joins the thread.

use std::sync::Arc;

use crate::algorithms::segmentation::SurfaceRemover;
use crate::config::AppConfig;
use crate::engine::{
    ModelRegistry, RecognitionDriver, RecognitionEngine, StaticTransforms, TransformLookup,
};
use crate::error::Result;
use crate::io::{FrameBuffer, FrameIngest, ResultPublisher, ResultSink};
use crate::state::{ReconfigureRequest, RuntimeParams, SharedParams};
use crate::threads::{LoopState, LoopStats, RecognitionPipeline, RecognitionThread};

/// Running recognition node.
pub struct RecognitionNode {
    ingest: FrameIngest,
    params: SharedParams,
    registry: Arc<ModelRegistry>,
    thread: RecognitionThread,
}

impl RecognitionNode {
    /// Build the node from configuration and start the recognition thread.
    ///
    /// Models are loaded from `config.models`; frame transforms come from
    /// `config.transforms`. Fails only on invalid configuration.
    pub fn new(
        config: &AppConfig,
        engine: Box<dyn RecognitionEngine>,
        sink: Box<dyn ResultSink>,
    ) -> Result<Self> {
        let transforms = Arc::new(StaticTransforms::from_configs(&config.transforms));
        Self::with_transforms(config, engine, sink, transforms)
    }

    /// Same as [`RecognitionNode::new`] with an explicit transform source.
    pub fn with_transforms(
        config: &AppConfig,
        engine: Box<dyn RecognitionEngine>,
        sink: Box<dyn ResultSink>,
        transforms: Arc<dyn TransformLookup>,
    ) -> Result<Self> {
        config.validate()?;

        let registry = Arc::new(ModelRegistry::load(&config.models, &config.retriever()));

        let params = SharedParams::new(config.runtime_params());
        let buffer = Arc::new(FrameBuffer::new(
            config.interface.n_clouds_per_recognition,
        ));

        let world_frame = config.interface.world_frame.clone();
        let driver = RecognitionDriver::new(engine, &registry, transforms, world_frame.clone());
        if driver.model_count() < config.models.len() {
            log::warn!(
                "Only {} of {} configured models available for recognition",
                driver.model_count(),
                config.models.len()
            );
        }
        let publisher = ResultPublisher::new(sink, Arc::clone(&registry), world_frame);
        let pipeline = RecognitionPipeline::new(
            Arc::clone(&buffer),
            params.clone(),
            SurfaceRemover::new(config.ransac),
            driver,
            publisher,
        );

        let thread = RecognitionThread::spawn(config.scheduler, pipeline);
        log::info!("Recognition node constructed");

        Ok(Self {
            ingest: FrameIngest::new(buffer, params.clone()),
            params,
            registry,
            thread,
        })
    }

    /// Producer handle for sensor callbacks.
    pub fn ingest(&self) -> FrameIngest {
        self.ingest.clone()
    }

    /// Apply a live reconfiguration; takes effect from the next tick.
    pub fn reconfigure(&self, request: &ReconfigureRequest) -> Result<()> {
        self.params.reconfigure(request)?;
        log::info!("Parameters reconfigured");
        Ok(())
    }

    /// Current parameter snapshot.
    pub fn params(&self) -> Arc<RuntimeParams> {
        self.params.snapshot()
    }

    /// Loaded models.
    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    /// Recognition loop state.
    pub fn state(&self) -> LoopState {
        self.thread.state()
    }

    /// Recognition loop counters.
    pub fn stats(&self) -> LoopStats {
        self.thread.stats()
    }

    /// Stop the recognition thread and wait for it.
    pub fn shutdown(self) {
        if self.thread.join().is_err() {
            log::error!("Recognition thread panicked");
        }
    }
}
