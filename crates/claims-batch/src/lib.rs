mod orchestrator;
mod persist;
mod scan;

pub use orchestrator::BatchOrchestrator;
pub use persist::write_results;
pub use scan::list_images;
