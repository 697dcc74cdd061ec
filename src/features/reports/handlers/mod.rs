pub mod report_handler;
