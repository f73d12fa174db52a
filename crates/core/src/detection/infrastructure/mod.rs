pub mod inline_detector;
pub mod scripted_detector;
pub mod threaded_detector;
