//! Shared application state.

use saree_labels::{Dispatcher, LabelConfig, LabelPipeline, SpoolHost};

/// Everything a handler needs, built once at startup.
#[derive(Debug)]
pub struct AppState {
    pub labels: LabelConfig,
    pub pipeline: LabelPipeline,
    pub dispatcher: Dispatcher<SpoolHost>,
}

impl AppState {
    pub fn new(labels: LabelConfig) -> Self {
        let pipeline = labels.pipeline();
        let dispatcher = Dispatcher::new(labels.spool_host(), labels.dispatch_options());
        AppState {
            labels,
            pipeline,
            dispatcher,
        }
    }
}
