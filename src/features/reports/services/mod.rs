pub mod priority;
mod report_service;

pub use report_service::ReportService;
