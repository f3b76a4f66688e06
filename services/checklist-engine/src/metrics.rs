use lazy_static::lazy_static;
use prometheus::{Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();

    pub static ref CHECKLISTS_GENERATED: IntCounter = IntCounter::new(
        "checklists_generated_total",
        "Total checklist generation requests that reached storage"
    ).expect("metric can be created");

    pub static ref CHECKLIST_ITEMS_INSERTED: IntCounter = IntCounter::new(
        "checklist_items_inserted_total",
        "Total checklist rows inserted"
    ).expect("metric can be created");

    pub static ref CHECKLIST_ITEMS_UPDATED: IntCounter = IntCounter::new(
        "checklist_items_updated_total",
        "Total checklist item status/notes updates"
    ).expect("metric can be created");

    pub static ref CHECKLIST_EXPORTS: IntCounterVec = IntCounterVec::new(
        Opts::new("checklist_exports_total", "Total checklist exports"),
        &["format"]
    ).expect("metric can be created");

    pub static ref STORAGE_ERRORS: IntCounterVec = IntCounterVec::new(
        Opts::new("checklist_storage_errors_total", "Total storage failures"),
        &["operation"]
    ).expect("metric can be created");
}

/// Register all metrics with the given registry
pub fn register_metrics(registry: &Registry) -> Result<(), prometheus::Error> {
    registry.register(Box::new(CHECKLISTS_GENERATED.clone()))?;
    registry.register(Box::new(CHECKLIST_ITEMS_INSERTED.clone()))?;
    registry.register(Box::new(CHECKLIST_ITEMS_UPDATED.clone()))?;
    registry.register(Box::new(CHECKLIST_EXPORTS.clone()))?;
    registry.register(Box::new(STORAGE_ERRORS.clone()))?;

    // CPU, memory and fd usage of this process
    #[cfg(target_os = "linux")]
    registry.register(Box::new(
        prometheus::process_collector::ProcessCollector::for_self(),
    ))?;

    Ok(())
}

/// Metrics in Prometheus text format
pub fn gather_metrics(registry: &Registry) -> Result<String, Box<dyn std::error::Error>> {
    let encoder = TextEncoder::new();
    let metric_families = registry.gather();
    let mut buffer = vec![];
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}
